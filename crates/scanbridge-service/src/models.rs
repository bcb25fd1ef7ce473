//! Request and response bodies of the fingerprint API.
//!
//! Field names are camelCase on the wire. Every request type has a
//! `Default` so a missing or unreadable body still yields a usable request;
//! every response carries `success` and `message`, and omits its payload
//! fields on failure.

use chrono::{DateTime, Utc};
use scanbridge_core::constants::{
    DEFAULT_CAPTURE_TIMEOUT_MS, DEFAULT_QUALITY_THRESHOLD, DEFAULT_SECURITY_LEVEL,
};
use scanbridge_hardware::DeviceParams;
use serde::{Deserialize, Serialize};

fn default_security_level() -> String {
    DEFAULT_SECURITY_LEVEL.to_string()
}

/// Body of `POST /api/fingerprint/capture`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptureRequest {
    /// Capture timeout forwarded to the driver.
    #[serde(alias = "timeout")]
    pub timeout_ms: u32,

    /// Minimum image quality forwarded to the driver.
    #[serde(alias = "quality")]
    pub quality_threshold: u32,
}

impl Default for CaptureRequest {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_CAPTURE_TIMEOUT_MS,
            quality_threshold: DEFAULT_QUALITY_THRESHOLD,
        }
    }
}

/// Body of `POST /api/fingerprint/compare` and `POST /api/fingerprint/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareRequest {
    #[serde(default)]
    pub template1: Option<String>,
    #[serde(default)]
    pub template2: Option<String>,
    #[serde(default = "default_security_level")]
    pub security_level: String,
}

impl Default for CompareRequest {
    fn default() -> Self {
        Self {
            template1: None,
            template2: None,
            security_level: default_security_level(),
        }
    }
}

/// Registration takes the same two-template body as comparison.
pub type RegisterRequest = CompareRequest;

/// Body of `POST /api/fingerprint/verify`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    #[serde(default)]
    pub registered_template: Option<String>,
    #[serde(default)]
    pub verify_template: Option<String>,
    #[serde(default = "default_security_level")]
    pub security_level: String,
}

impl Default for VerifyRequest {
    fn default() -> Self {
        Self {
            registered_template: None,
            verify_template: None,
            security_level: default_security_level(),
        }
    }
}

/// Liveness answer; never touches the device.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Session status: whether a device handle is currently open.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub success: bool,
    pub message: String,
    pub device_initialized: bool,
    pub timestamp: DateTime<Utc>,
}

/// Echo of a capture request, answered without touching the device.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaptureResponse {
    pub success: bool,
    pub message: String,
    /// The request as parsed, defaults filled in.
    pub received_request: CaptureRequest,
    pub timestamp: DateTime<Utc>,
}

/// Result of a capture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureResponse {
    pub success: bool,
    pub message: String,
    /// Base64 of the PNG-encoded frame.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_encoded: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_time_ms: Option<u64>,
    /// Base64 of the extracted template.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_encoded: Option<String>,
}

impl CaptureResponse {
    /// Failed response carrying only `message`.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            ..Self::default()
        }
    }
}

/// Result of a comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
}

impl CompareResponse {
    /// Failed response carrying only `message`.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            ..Self::default()
        }
    }
}

/// Result of a registration attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registered: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    /// The first template, echoed back unchanged when registration succeeds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registered_template: Option<String>,
}

impl RegisterResponse {
    /// Failed response carrying only `message`.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            ..Self::default()
        }
    }
}

/// Result of a verification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
}

impl VerifyResponse {
    /// Failed response carrying only `message`.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            ..Self::default()
        }
    }
}

/// Device parameters as presented to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub device_id: u32,
    /// Serial number with trailing NUL padding removed.
    pub serial_number: String,
    pub image_width: u32,
    pub image_height: u32,
    #[serde(rename = "imageDPI")]
    pub image_dpi: u32,
    /// Uppercase hexadecimal, no prefix.
    pub firmware_version: String,
    pub brightness: u32,
    pub contrast: u32,
    pub gain: u32,
}

impl From<&DeviceParams> for DeviceInfo {
    fn from(params: &DeviceParams) -> Self {
        Self {
            device_id: params.device_id,
            serial_number: params.serial_number_text(),
            image_width: params.image_width,
            image_height: params.image_height,
            image_dpi: params.image_dpi,
            firmware_version: params.firmware_version_hex(),
            brightness: params.brightness,
            contrast: params.contrast,
            gain: params.gain,
        }
    }
}

/// Result of a device information query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfoResponse {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub info: Option<DeviceInfo>,
}

impl DeviceInfoResponse {
    /// Failed response carrying only `message`.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            info: None,
        }
    }
}
