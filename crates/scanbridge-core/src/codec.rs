//! Transport-safe text encoding for templates and images.
//!
//! Binary blobs travel through JSON as standard (padded) base64. The codec is a
//! byte-exact round trip for any input, including the empty buffer.
//!
//! ```
//! use scanbridge_core::codec::{decode, encode};
//!
//! let bytes = vec![0u8, 1, 2, 254, 255];
//! assert_eq!(decode(&encode(&bytes)).unwrap(), bytes);
//! assert!(decode("not base64!").is_err());
//! ```

use base64::{Engine, engine::general_purpose::STANDARD};

use crate::error::{DecodeError, Result};

/// Encode bytes as base64 text.
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode base64 text back into bytes.
///
/// Leading and trailing whitespace is ignored.
///
/// # Errors
///
/// Returns [`DecodeError::Malformed`] if the text is not valid base64.
pub fn decode(text: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(text.trim())
        .map_err(|e| DecodeError::malformed(e.to_string()))
}
