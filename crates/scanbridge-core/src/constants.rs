//! Core constants for the scanbridge fingerprint bridge.
//!
//! This module centralizes the vendor-defined sizes and the request defaults
//! shared by the hardware, service and network crates.
//!
//! # Usage
//!
//! ```
//! use scanbridge_core::constants::*;
//!
//! // Template buffers are fixed-size on the vendor side
//! let template = vec![0u8; TEMPLATE_SIZE];
//! assert_eq!(template.len(), 400);
//!
//! // Capture defaults used when a request omits them
//! assert_eq!(DEFAULT_CAPTURE_TIMEOUT_MS, 10_000);
//! assert_eq!(DEFAULT_QUALITY_THRESHOLD, 50);
//! ```

// ============================================================================
// Vendor Buffer Sizes
// ============================================================================

/// Size in bytes of a fingerprint template produced by the vendor extractor.
///
/// Templates are opaque to scanbridge; this value only sizes the buffers the
/// simulated driver hands out.
pub const TEMPLATE_SIZE: usize = 400;

/// Length of the serial number field in the device parameter block.
///
/// The driver fills the buffer with ASCII and pads the remainder with NUL
/// bytes, which are trimmed before the value is reported.
pub const SERIAL_NUMBER_LEN: usize = 16;

// ============================================================================
// Vendor Status Codes
// ============================================================================

/// Status code for a capture that ran past the driver timeout.
pub const ERROR_TIMEOUT: i32 = 54;

/// Status code the driver reports once the scanner has been unplugged.
///
/// A device session that sees this code from any hardware primitive drops
/// its handle so the next request enumerates again.
pub const ERROR_DEVICE_NOT_FOUND: i32 = 55;

// ============================================================================
// Request Defaults
// ============================================================================

/// Capture timeout forwarded to the driver when a request omits it.
pub const DEFAULT_CAPTURE_TIMEOUT_MS: u32 = 10_000;

/// Image quality threshold forwarded to the driver when a request omits it.
///
/// Values 0-49 are considered poor quality, 50-100 are acceptable.
pub const DEFAULT_QUALITY_THRESHOLD: u32 = 50;

/// Security level name applied when a request omits it.
pub const DEFAULT_SECURITY_LEVEL: &str = "NORMAL";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_security_level_resolves_to_normal() {
        assert_eq!(
            crate::SecurityLevel::from_name(DEFAULT_SECURITY_LEVEL),
            crate::SecurityLevel::Normal
        );
    }
}
