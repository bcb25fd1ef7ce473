//! Scanner driver capability interface.
//!
//! This module defines the contract between the device session and the vendor
//! SDK. Each method is one driver primitive: it either yields its value or the
//! non-zero vendor status code it failed with. The session owns all sequencing
//! and state; a driver only executes the call it is given.
//!
//! Methods return `impl Future + Send` (Edition 2024 RPITIT) so a session over
//! any driver can be driven from spawned Tokio tasks. Implementations may still
//! write `async fn`.

use std::future::Future;

use scanbridge_core::SecurityLevel;

use crate::error::DriverResult;
use crate::types::{DeviceDescriptor, DeviceParams};

/// Fingerprint scanner driver.
///
/// A driver wraps exactly one vendor SDK instance. It is never called
/// concurrently: the device session serializes every call behind its lock,
/// so implementations need no internal synchronization.
///
/// # Object Safety and Dynamic Dispatch
///
/// **NOTE**: This trait is NOT object-safe because its methods return
/// `impl Future`. Use generics, or
/// [`AnyScannerDriver`](crate::devices::AnyScannerDriver) for runtime
/// selection.
///
/// # Examples
///
/// ```no_run
/// use scanbridge_hardware::traits::ScannerDriver;
/// use scanbridge_hardware::error::DriverResult;
///
/// async fn first_device_name<D: ScannerDriver>(driver: &mut D) -> DriverResult<Option<String>> {
///     let devices = driver.enumerate().await?;
///     Ok(devices.first().map(|d| d.name.clone()))
/// }
/// ```
pub trait ScannerDriver: Send + Sync {
    /// List connected devices in driver order.
    fn enumerate(&mut self) -> impl Future<Output = DriverResult<Vec<DeviceDescriptor>>> + Send;

    /// Open the given device; subsequent primitives address it.
    fn open(
        &mut self,
        device: &DeviceDescriptor,
    ) -> impl Future<Output = DriverResult<()>> + Send;

    /// Read the parameter block of the open device.
    fn device_params(&mut self) -> impl Future<Output = DriverResult<DeviceParams>> + Send;

    /// Capture one raw grayscale frame into `buffer`.
    ///
    /// `buffer` is exactly `image_width * image_height` bytes. The driver's
    /// own `timeout_ms` handling is authoritative.
    fn get_image(
        &mut self,
        buffer: &mut [u8],
        timeout_ms: u32,
        quality_threshold: u32,
    ) -> impl Future<Output = DriverResult<()>> + Send;

    /// Assess the quality of a raw frame.
    fn image_quality(
        &mut self,
        width: u32,
        height: u32,
        image: &[u8],
    ) -> impl Future<Output = DriverResult<u32>> + Send;

    /// Extract a template from a raw frame.
    fn create_template(&mut self, image: &[u8]) -> impl Future<Output = DriverResult<Vec<u8>>> + Send;

    /// Decide whether two templates belong to the same finger.
    fn match_templates(
        &mut self,
        first: &[u8],
        second: &[u8],
        level: SecurityLevel,
    ) -> impl Future<Output = DriverResult<bool>> + Send;

    /// Similarity score between two templates.
    fn matching_score(
        &mut self,
        first: &[u8],
        second: &[u8],
    ) -> impl Future<Output = DriverResult<u32>> + Send;

    /// Release the open device.
    fn close(&mut self) -> impl Future<Output = DriverResult<()>> + Send;
}
