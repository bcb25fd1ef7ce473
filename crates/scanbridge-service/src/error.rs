//! Failures of a dispatched operation.
//!
//! Both variants end up as the `message` of a `{success:false}` response.
//! A device that cannot be opened is reported uniformly as "device not
//! initialized" with the underlying cause in parentheses.

use scanbridge_core::DecodeError;
use scanbridge_hardware::DeviceError;

/// Result type alias for dispatcher operations.
pub type Result<T> = std::result::Result<T, OperationError>;

/// Errors that can occur while serving an operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OperationError {
    /// The device session reported a failure.
    #[error("{}", device_message(.0))]
    Device(#[from] DeviceError),

    /// A template field could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl OperationError {
    /// Whether the failure came from client input rather than the device.
    pub fn is_bad_input(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

fn device_message(error: &DeviceError) -> String {
    if error.is_unavailable() {
        format!("Device not initialized - please check device connection ({error})")
    } else {
        error.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanbridge_core::VendorCode;
    use scanbridge_hardware::Primitive;

    #[test]
    fn test_no_device_message() {
        let error = OperationError::from(DeviceError::NoDeviceFound);
        assert_eq!(
            error.to_string(),
            "Device not initialized - please check device connection (No fingerprint device found)"
        );
        assert!(!error.is_bad_input());
    }

    #[test]
    fn test_initialization_failure_message() {
        let error = OperationError::from(DeviceError::initialization_failed(
            Primitive::OpenDevice,
            VendorCode::new(52),
        ));
        let message = error.to_string();
        assert!(message.starts_with("Device not initialized"));
        assert!(message.contains("OpenDevice() error #52: Failed to initialize the device"));
    }

    #[test]
    fn test_operation_failure_message() {
        let error = OperationError::from(DeviceError::operation_failed(
            Primitive::GetImage,
            VendorCode::new(54),
        ));
        assert_eq!(error.to_string(), "GetImage() error #54: Time out");
    }

    #[test]
    fn test_decode_message() {
        let error = OperationError::from(DecodeError::missing("template1"));
        assert_eq!(error.to_string(), "template1 is missing");
        assert!(error.is_bad_input());
    }
}
