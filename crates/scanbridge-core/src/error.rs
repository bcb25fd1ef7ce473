use thiserror::Error;

/// Errors raised while turning transport text back into template bytes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The request did not carry the field at all, or carried an empty string.
    #[error("{field} is missing")]
    Missing { field: String },

    /// The text is not valid base64.
    #[error("Invalid template encoding: {message}")]
    Malformed { message: String },
}

impl DecodeError {
    /// Create a new missing field error.
    pub fn missing(field: impl Into<String>) -> Self {
        Self::Missing {
            field: field.into(),
        }
    }

    /// Create a new malformed encoding error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DecodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_display() {
        let error = DecodeError::missing("template1");
        assert_eq!(error.to_string(), "template1 is missing");
    }

    #[test]
    fn test_malformed_display() {
        let error = DecodeError::malformed("Invalid byte 33, offset 0.");
        assert!(matches!(error, DecodeError::Malformed { .. }));
        assert!(error.to_string().starts_with("Invalid template encoding"));
    }
}
