//! Common types shared by the driver interface and the device session.
//!
//! This module defines the values that cross the driver boundary (device
//! descriptors, parameter blocks) and the values a session hands back to the
//! dispatcher (capture results, match outcomes).

use scanbridge_core::constants::SERIAL_NUMBER_LEN;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Driver primitive names, as reported in failure messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Primitive {
    EnumerateDevice,
    OpenDevice,
    GetDeviceInfo,
    GetImage,
    GetImageQuality,
    CreateTemplate,
    MatchTemplate,
    GetMatchingScore,
    CloseDevice,
}

impl Primitive {
    /// Vendor API name of the primitive.
    pub fn name(&self) -> &'static str {
        match self {
            Primitive::EnumerateDevice => "EnumerateDevice",
            Primitive::OpenDevice => "OpenDevice",
            Primitive::GetDeviceInfo => "GetDeviceInfo",
            Primitive::GetImage => "GetImage",
            Primitive::GetImageQuality => "GetImageQuality",
            Primitive::CreateTemplate => "CreateTemplate",
            Primitive::MatchTemplate => "MatchTemplate",
            Primitive::GetMatchingScore => "GetMatchingScore",
            Primitive::CloseDevice => "CloseDevice",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One entry of the driver's enumeration list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    /// Driver-level device name (e.g., "FDU05").
    pub name: String,

    /// Device index the driver expects when opening.
    pub id: u32,
}

impl DeviceDescriptor {
    /// Create a new DeviceDescriptor.
    pub fn new(name: impl Into<String>, id: u32) -> Self {
        Self {
            name: name.into(),
            id,
        }
    }
}

/// Parameter block read back from an open device.
///
/// Contains the image geometry the capture path sizes its buffers from, plus
/// identification and sensor tuning values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceParams {
    /// Vendor device identifier.
    pub device_id: u32,

    /// Serial number, NUL-padded ASCII.
    pub serial_number: [u8; SERIAL_NUMBER_LEN],

    /// Image width in pixels.
    pub image_width: u32,

    /// Image height in pixels.
    pub image_height: u32,

    /// Sensor resolution in dots per inch.
    pub image_dpi: u32,

    /// Firmware version word.
    pub firmware_version: u32,

    /// Sensor brightness setting.
    pub brightness: u32,

    /// Sensor contrast setting.
    pub contrast: u32,

    /// Sensor gain setting.
    pub gain: u32,
}

impl DeviceParams {
    /// Number of bytes in one raw grayscale frame.
    pub fn frame_len(&self) -> usize {
        self.image_width as usize * self.image_height as usize
    }

    /// Serial number with trailing NUL padding removed.
    ///
    /// # Examples
    ///
    /// ```
    /// use scanbridge_hardware::types::DeviceParams;
    ///
    /// let mut serial = [0u8; 16];
    /// serial[..6].copy_from_slice(b"H54120");
    /// let params = DeviceParams { serial_number: serial, ..DeviceParams::default() };
    /// assert_eq!(params.serial_number_text(), "H54120");
    /// ```
    pub fn serial_number_text(&self) -> String {
        let end = self
            .serial_number
            .iter()
            .rposition(|&b| b != 0)
            .map_or(0, |pos| pos + 1);
        String::from_utf8_lossy(&self.serial_number[..end]).into_owned()
    }

    /// Firmware version as upper-case hexadecimal without prefix.
    pub fn firmware_version_hex(&self) -> String {
        format!("{:X}", self.firmware_version)
    }
}

impl Default for DeviceParams {
    fn default() -> Self {
        Self {
            device_id: 0,
            serial_number: [0; SERIAL_NUMBER_LEN],
            image_width: 0,
            image_height: 0,
            image_dpi: 0,
            firmware_version: 0,
            brightness: 0,
            contrast: 0,
            gain: 0,
        }
    }
}

/// Output of one capture call.
///
/// Transient: the session hands it to the dispatcher and keeps nothing.
#[derive(Debug, Clone)]
pub struct CaptureResult {
    /// Raw grayscale pixels, row-major, `width * height` bytes.
    pub raw_image: Vec<u8>,

    /// Frame width in pixels.
    pub width: u32,

    /// Frame height in pixels.
    pub height: u32,

    /// PNG encoding of the raw frame (empty if encoding failed).
    pub png_image: Vec<u8>,

    /// Quality score as reported by the driver.
    pub quality: u32,

    /// Wall time spent inside the capture primitive.
    pub capture_time_ms: u64,

    /// Template extracted from the raw frame.
    pub template: Vec<u8>,
}

/// Result of comparing two templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// Whether the matcher accepted the pair at the requested level.
    pub matched: bool,

    /// Similarity score reported by the matcher.
    pub score: u32,
}
