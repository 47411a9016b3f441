use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a geodetic reference frame, e.g. "SK-42" or "GSK-2011".
///
/// Frames have no structure beyond identity; everything the engine knows
/// about a frame lives in the parameter records that mention it.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct FrameCode(String);

impl FrameCode {
    pub fn new(code: impl Into<String>) -> FrameCode {
        FrameCode(code.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for FrameCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for FrameCode {}

impl From<&str> for FrameCode {
    fn from(code: &str) -> FrameCode {
        FrameCode(code.to_string())
    }
}

impl From<String> for FrameCode {
    fn from(code: String) -> FrameCode {
        FrameCode(code)
    }
}

/// The set of reference frames known to the engine.
///
/// Built once at load time and read-only afterwards. Codes are kept sorted
/// so enumeration order is stable across runs.
#[derive(Clone, Default, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRegistry {
    codes: Vec<FrameCode>,
}

impl FrameRegistry {
    pub fn new<I>(codes: I) -> FrameRegistry
    where
        I: IntoIterator<Item = FrameCode>,
    {
        let mut codes: Vec<FrameCode> = codes.into_iter().collect();
        codes.sort();
        codes.dedup();
        FrameRegistry { codes }
    }

    pub fn is_known(&self, code: &FrameCode) -> bool {
        self.codes.binary_search(code).is_ok()
    }

    /// Known frame codes in lexical order.
    pub fn known_frames(&self) -> &[FrameCode] {
        self.codes.as_slice()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}
