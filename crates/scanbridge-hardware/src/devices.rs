//! Enum wrapper for scanner driver dispatch.
//!
//! [`ScannerDriver`] returns `impl Future` and is therefore not object-safe,
//! so `Box<dyn ScannerDriver>` is not available. The binary picks its driver
//! at startup through [`AnyScannerDriver`] instead, which keeps static
//! dispatch for every variant.
//!
//! # Examples
//!
//! ```
//! use scanbridge_hardware::devices::AnyScannerDriver;
//! use scanbridge_hardware::mock::MockScanner;
//!
//! let (scanner, _handle) = MockScanner::new();
//! let driver = AnyScannerDriver::Mock(scanner);
//! ```

use scanbridge_core::SecurityLevel;

use crate::error::DriverResult;
use crate::mock::MockScanner;
use crate::traits::ScannerDriver;
use crate::types::{DeviceDescriptor, DeviceParams};

/// Enum wrapper for scanner driver dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyScannerDriver {
    /// Simulated scanner for development and testing.
    Mock(MockScanner),
    // TODO: FFI-backed variant over the vendor SDK (FDx Pro libsgfplib),
    // gated behind a `hardware-secugen` feature.
}

impl ScannerDriver for AnyScannerDriver {
    async fn enumerate(&mut self) -> DriverResult<Vec<DeviceDescriptor>> {
        match self {
            Self::Mock(driver) => driver.enumerate().await,
        }
    }

    async fn open(&mut self, device: &DeviceDescriptor) -> DriverResult<()> {
        match self {
            Self::Mock(driver) => driver.open(device).await,
        }
    }

    async fn device_params(&mut self) -> DriverResult<DeviceParams> {
        match self {
            Self::Mock(driver) => driver.device_params().await,
        }
    }

    async fn get_image(
        &mut self,
        buffer: &mut [u8],
        timeout_ms: u32,
        quality_threshold: u32,
    ) -> DriverResult<()> {
        match self {
            Self::Mock(driver) => driver.get_image(buffer, timeout_ms, quality_threshold).await,
        }
    }

    async fn image_quality(&mut self, width: u32, height: u32, image: &[u8]) -> DriverResult<u32> {
        match self {
            Self::Mock(driver) => driver.image_quality(width, height, image).await,
        }
    }

    async fn create_template(&mut self, image: &[u8]) -> DriverResult<Vec<u8>> {
        match self {
            Self::Mock(driver) => driver.create_template(image).await,
        }
    }

    async fn match_templates(
        &mut self,
        first: &[u8],
        second: &[u8],
        level: SecurityLevel,
    ) -> DriverResult<bool> {
        match self {
            Self::Mock(driver) => driver.match_templates(first, second, level).await,
        }
    }

    async fn matching_score(&mut self, first: &[u8], second: &[u8]) -> DriverResult<u32> {
        match self {
            Self::Mock(driver) => driver.matching_score(first, second).await,
        }
    }

    async fn close(&mut self) -> DriverResult<()> {
        match self {
            Self::Mock(driver) => driver.close().await,
        }
    }
}
