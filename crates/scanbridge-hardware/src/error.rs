//! Error types for device session operations.
//!
//! This module defines the failures a device session can report: a missing
//! scanner, a failed initialization sequence, and non-zero status codes from
//! individual driver primitives.

use scanbridge_core::{VendorCode, catalog};

use crate::types::Primitive;

/// Result type alias for device session operations.
pub type Result<T> = std::result::Result<T, DeviceError>;

/// Result type returned by driver primitives: the value, or the vendor status.
pub type DriverResult<T> = std::result::Result<T, VendorCode>;

/// Errors that can occur while talking to the scanner.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    /// Enumeration failed or listed no devices.
    #[error("No fingerprint device found")]
    NoDeviceFound,

    /// A primitive of the open sequence failed.
    #[error("Initialization failed: {}", catalog::describe(.primitive.name(), .code.as_i32()))]
    InitializationFailed { primitive: Primitive, code: VendorCode },

    /// A hardware primitive returned a non-zero status.
    #[error("{}", catalog::describe(.primitive.name(), .code.as_i32()))]
    OperationFailed { primitive: Primitive, code: VendorCode },

    /// A hardware call was attempted without an open device.
    #[error("Device not initialized")]
    NotInitialized,
}

impl DeviceError {
    /// Create a new initialization failed error.
    pub fn initialization_failed(primitive: Primitive, code: VendorCode) -> Self {
        Self::InitializationFailed { primitive, code }
    }

    /// Create a new operation failed error.
    pub fn operation_failed(primitive: Primitive, code: VendorCode) -> Self {
        Self::OperationFailed { primitive, code }
    }

    /// Whether the error means there is no usable device handle.
    ///
    /// Clients see these as "device not initialized".
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::NoDeviceFound | Self::InitializationFailed { .. } | Self::NotInitialized
        )
    }

    /// Vendor status carried by the error, if any.
    pub fn vendor_code(&self) -> Option<VendorCode> {
        match self {
            Self::InitializationFailed { code, .. } | Self::OperationFailed { code, .. } => {
                Some(*code)
            }
            Self::NoDeviceFound | Self::NotInitialized => None,
        }
    }
}
