//! Single-step 7-parameter (Bursa-Wolf) similarity transform.
//!
//! Uses the linearized small-angle rotation model: the rotation matrix is
//! `I + skew(rx, ry, rz)`, not a full trigonometric rotation. Parameter
//! records in geodetic catalogs are fit for exactly this model, so swapping
//! in exact rotations would shift results at the sub-centimeter level.

use glam::{DMat3, DVec3};

use crate::params::TransformParameters;

pub const ARCSEC_TO_RAD: f64 = std::f64::consts::PI / (180.0 * 3600.0);
pub const PPM_TO_FRACTION: f64 = 1e-6;

/// First-order rotation matrix `I + skew(r)` for rotations given in
/// arc-seconds. Row-major layout:
///
/// ```text
/// [  1   rz  -ry ]
/// [ -rz   1   rx ]
/// [  ry  -rx   1 ]
/// ```
pub fn rotation_matrix(rotation_arcsec: DVec3) -> DMat3 {
    let r = rotation_arcsec * ARCSEC_TO_RAD;
    // glam matrices are column-major
    DMat3::from_cols(
        DVec3::new(1.0, -r.z, r.y),
        DVec3::new(r.z, 1.0, -r.x),
        DVec3::new(-r.y, r.x, 1.0),
    )
}

/// Forward transform: `X' = (1 + s) * R * X + T`.
pub fn forward(params: &TransformParameters, point: DVec3) -> DVec3 {
    let scale = 1.0 + params.scale_ppm * PPM_TO_FRACTION;
    let rotation = rotation_matrix(params.rotation_arcsec);
    scale * (rotation * point) + params.translation_m
}

/// Algebraic inverse of [`forward`]: `X = R^T * ((X' - T) / (1 + s))`.
///
/// The transpose stands in for the inverse of the first-order rotation
/// matrix, which is orthogonal up to second-order terms in the (tiny)
/// rotation angles. Round-trips close to ~1e-12 relative for catalog-scale
/// rotations.
pub fn inverse(params: &TransformParameters, point: DVec3) -> DVec3 {
    let scale = 1.0 + params.scale_ppm * PPM_TO_FRACTION;
    let rotation = rotation_matrix(params.rotation_arcsec);
    rotation.transpose() * ((point - params.translation_m) / scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::FrameCode;
    use common::FloatExt;

    fn params(translation: DVec3, rotation: DVec3, scale_ppm: f64) -> TransformParameters {
        TransformParameters {
            from: FrameCode::from("A"),
            to: FrameCode::from("B"),
            translation_m: translation,
            rotation_arcsec: rotation,
            scale_ppm,
            epoch: None,
        }
    }

    #[test]
    fn translation_only() {
        let p = params(DVec3::new(10.0, 20.0, 30.0), DVec3::ZERO, 0.0);

        let transformed = forward(&p, DVec3::ZERO);
        assert_eq!(transformed, DVec3::new(10.0, 20.0, 30.0));

        let back = inverse(&p, transformed);
        assert_eq!(back, DVec3::ZERO);
    }

    #[test]
    fn scale_only() {
        let p = params(DVec3::ZERO, DVec3::ZERO, 1.0);

        // 1 ppm on a 1e6 m coordinate is exactly 1 m
        let transformed = forward(&p, DVec3::new(1.0e6, 0.0, 0.0));
        assert!(transformed.x.approximately_eq(1.0e6 + 1.0));
        assert_eq!(transformed.y, 0.0);
        assert_eq!(transformed.z, 0.0);
    }

    #[test]
    fn rotation_sign_convention() {
        // rz of 1 arcsec, point on the X axis: X' = (x, -rz*x, 0)
        let p = params(DVec3::ZERO, DVec3::new(0.0, 0.0, 1.0), 0.0);
        let x = 1.0e6;

        let transformed = forward(&p, DVec3::new(x, 0.0, 0.0));
        assert!(transformed.x.approximately_eq_within(x, 1e-3));
        assert!(transformed
            .y
            .approximately_eq_within(-ARCSEC_TO_RAD * x, 1e-9));
        assert_eq!(transformed.z, 0.0);
    }

    #[test]
    fn rotation_matrix_layout() {
        let m = rotation_matrix(DVec3::new(1.0, 2.0, 3.0));
        let c = ARCSEC_TO_RAD;

        // rows reconstructed from glam's column-major storage
        assert_eq!(m.row(0), DVec3::new(1.0, 3.0 * c, -2.0 * c));
        assert_eq!(m.row(1), DVec3::new(-3.0 * c, 1.0, 1.0 * c));
        assert_eq!(m.row(2), DVec3::new(2.0 * c, -1.0 * c, 1.0));
    }

    #[test]
    fn round_trip_with_realistic_parameters() {
        // SK-42 -> PZ-90.11 catalog values
        let p = params(
            DVec3::new(23.557, -140.844, -79.778),
            DVec3::new(-0.0023, -0.34646, -0.79421),
            -0.2274,
        );
        let point = DVec3::new(2_850_123.456, 2_199_456.789, 5_250_789.123);

        let there = forward(&p, point);
        let back = inverse(&p, there);

        let relative = (back - point).length() / point.length();
        assert!(relative < 1e-9, "round-trip relative error {relative}");
    }

    #[test]
    fn inverse_is_algebraic_not_negation() {
        let p = params(DVec3::new(1.0, -2.0, 3.0), DVec3::ZERO, 5.0);
        let negated = params(-p.translation_m, -p.rotation_arcsec, -p.scale_ppm);
        let point = DVec3::new(4.0e6, 3.0e6, 3.5e6);

        let exact = inverse(&p, forward(&p, point));
        let approximate = forward(&negated, forward(&p, point));

        // with zero rotation the algebraic inverse is exact up to rounding,
        // while negation leaves scale cross terms of order s^2 * |X| + s * |T|
        let exact_error = (exact - point).length();
        let negation_error = (approximate - point).length();
        assert!(exact_error < 1e-6, "exact inverse error {exact_error}");
        assert!(negation_error > 1e-5, "negation error {negation_error}");
        assert!(negation_error > exact_error);
    }
}
