pub trait FloatExt {
    /// Absolute-difference comparison against [`crate::EPSILON`].
    fn approximately_eq(self, other: Self) -> bool;
    /// Absolute-difference comparison against a caller-chosen tolerance.
    fn approximately_eq_within(self, other: Self, tolerance: Self) -> bool;
}

impl FloatExt for f64 {
    fn approximately_eq(self, other: Self) -> bool {
        (self - other).abs() < crate::EPSILON
    }

    fn approximately_eq_within(self, other: Self, tolerance: Self) -> bool {
        (self - other).abs() < tolerance
    }
}
