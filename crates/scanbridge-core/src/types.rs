use crate::{catalog, codec, error::DecodeError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Matcher strictness on the vendor's 9-point scale.
///
/// Higher levels lower the false-accept rate at the cost of more false
/// rejects. The ordinal is what the driver receives.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityLevel {
    Lowest,
    Lower,
    Low,
    BelowNormal,
    #[default]
    Normal,
    AboveNormal,
    High,
    Higher,
    Highest,
}

impl SecurityLevel {
    /// All levels in ordinal order.
    pub const ALL: [SecurityLevel; 9] = [
        SecurityLevel::Lowest,
        SecurityLevel::Lower,
        SecurityLevel::Low,
        SecurityLevel::BelowNormal,
        SecurityLevel::Normal,
        SecurityLevel::AboveNormal,
        SecurityLevel::High,
        SecurityLevel::Higher,
        SecurityLevel::Highest,
    ];

    /// Resolve a level from its name.
    ///
    /// Matching ignores case and surrounding whitespace. Unrecognized names
    /// fall back to [`SecurityLevel::Normal`].
    ///
    /// # Examples
    ///
    /// ```
    /// use scanbridge_core::SecurityLevel;
    ///
    /// assert_eq!(SecurityLevel::from_name("high"), SecurityLevel::High);
    /// assert_eq!(SecurityLevel::from_name("bogus"), SecurityLevel::Normal);
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.name().eq_ignore_ascii_case(name))
            .unwrap_or(SecurityLevel::Normal)
    }

    /// Canonical upper-case name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            SecurityLevel::Lowest => "LOWEST",
            SecurityLevel::Lower => "LOWER",
            SecurityLevel::Low => "LOW",
            SecurityLevel::BelowNormal => "BELOW_NORMAL",
            SecurityLevel::Normal => "NORMAL",
            SecurityLevel::AboveNormal => "ABOVE_NORMAL",
            SecurityLevel::High => "HIGH",
            SecurityLevel::Higher => "HIGHER",
            SecurityLevel::Highest => "HIGHEST",
        }
    }

    /// Position on the vendor scale (0 = lowest, 8 = highest).
    #[must_use]
    pub fn ordinal(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Non-zero status code returned by a driver primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VendorCode(i32);

impl VendorCode {
    /// Wrap a raw driver status.
    #[must_use]
    pub fn new(code: i32) -> Self {
        VendorCode(code)
    }

    /// The raw status value.
    #[must_use]
    pub fn as_i32(&self) -> i32 {
        self.0
    }

    /// Catalog phrase for this code.
    #[must_use]
    pub fn description(&self) -> &'static str {
        catalog::lookup(self.0)
    }
}

impl fmt::Display for VendorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{} ({})", self.0, self.description())
    }
}

/// Opaque fingerprint template.
///
/// The bytes are handed to the vendor matcher verbatim and never inspected
/// here; equality between two templates is only meaningful to the matcher.
#[derive(Clone)]
pub struct Template(Vec<u8>);

impl Template {
    /// Decode a template from a request field.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Missing`] if the field is absent or blank, and
    /// [`DecodeError::Malformed`] if it is not valid base64.
    pub fn from_field(field: &str, text: Option<&str>) -> Result<Self, DecodeError> {
        let text = text.map(str::trim).unwrap_or_default();
        if text.is_empty() {
            return Err(DecodeError::missing(field));
        }
        codec::decode(text).map(Template)
    }

    /// Template bytes exactly as decoded.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Template").field("len", &self.0.len()).finish()
    }
}
