//! Device session: the single owner of the scanner handle.
//!
//! A [`DeviceSession`] wraps one driver behind a FIFO async mutex so that at
//! most one hardware primitive runs at any instant, no matter how many
//! requests are waiting. Every public operation takes the lock once and runs
//! its whole sequence (lazy initialization included) under it.
//!
//! # States
//!
//! ```text
//!                 ensure_initialized / any operation
//!  ┌───────────────┐  enumerate → open → read params  ┌─────────┐
//!  │ Uninitialized │ ────────────────────────────────► │  Ready  │
//!  └───────────────┘ ◄──────────────────────────────── └─────────┘
//!          ▲            dispose / device lost (#55)         │
//!          └──── any failed step (handle closed again) ─────┘
//! ```
//!
//! Device geometry is only read while holding the lock, so a capture can
//! never size its buffer from a half-finished initialization.
//!
//! # Examples
//!
//! ```
//! use scanbridge_hardware::mock::MockScanner;
//! use scanbridge_hardware::session::DeviceSession;
//! use scanbridge_core::SecurityLevel;
//!
//! #[tokio::main]
//! async fn main() -> scanbridge_hardware::Result<()> {
//!     let (driver, handle) = MockScanner::new();
//!     let session = DeviceSession::new(driver);
//!
//!     let capture = session.capture_image(50, 10_000).await?;
//!     let outcome = session
//!         .match_templates(&capture.template, &capture.template, SecurityLevel::Normal)
//!         .await?;
//!     assert!(outcome.matched);
//!
//!     session.dispose().await;
//!     assert!(!handle.is_open());
//!     Ok(())
//! }
//! ```

use std::time::Instant;

use scanbridge_core::SecurityLevel;
use scanbridge_core::constants::ERROR_DEVICE_NOT_FOUND;
use tokio::sync::Mutex;
use tracing::{debug, info, trace, warn};

use crate::error::{DeviceError, Result};
use crate::imaging::encode_grayscale_png;
use crate::traits::ScannerDriver;
use crate::types::{CaptureResult, DeviceDescriptor, DeviceParams, MatchOutcome, Primitive};

#[derive(Debug)]
enum SessionState {
    Uninitialized,
    Ready {
        device: DeviceDescriptor,
        params: DeviceParams,
    },
}

#[derive(Debug)]
struct Inner<D> {
    driver: D,
    state: SessionState,
}

/// Serialized, lazily initialized access to one scanner.
#[derive(Debug)]
pub struct DeviceSession<D> {
    inner: Mutex<Inner<D>>,
}

impl<D: ScannerDriver> DeviceSession<D> {
    /// Wrap a driver. Nothing touches the hardware until the first operation.
    pub fn new(driver: D) -> Self {
        Self {
            inner: Mutex::new(Inner {
                driver,
                state: SessionState::Uninitialized,
            }),
        }
    }

    /// Whether a device handle is currently open.
    pub async fn is_initialized(&self) -> bool {
        matches!(self.inner.lock().await.state, SessionState::Ready { .. })
    }

    /// Open the first enumerated device unless one is already open.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::NoDeviceFound`] if enumeration fails or lists
    /// nothing, and [`DeviceError::InitializationFailed`] if opening the
    /// device or reading its parameters fails. The session stays
    /// uninitialized on any error.
    pub async fn ensure_initialized(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.ensure_ready().await.map(|_| ())
    }

    /// Capture a frame, assess it, and extract a template.
    ///
    /// `quality_threshold` and `timeout_ms` are forwarded to the driver's
    /// capture primitive. No retry is attempted.
    ///
    /// # Errors
    ///
    /// Returns the initialization error if no device can be opened, or
    /// [`DeviceError::OperationFailed`] naming the first failing primitive.
    pub async fn capture_image(&self, quality_threshold: u32, timeout_ms: u32) -> Result<CaptureResult> {
        let mut inner = self.inner.lock().await;
        let params = inner.ensure_ready().await?;
        let result = inner.capture(&params, quality_threshold, timeout_ms).await;
        inner.settle(result).await
    }

    /// Compare two templates at the given security level.
    ///
    /// # Errors
    ///
    /// Returns the initialization error if no device can be opened, or
    /// [`DeviceError::OperationFailed`] from the match or scoring primitive.
    pub async fn match_templates(
        &self,
        first: &[u8],
        second: &[u8],
        level: SecurityLevel,
    ) -> Result<MatchOutcome> {
        let mut inner = self.inner.lock().await;
        inner.ensure_ready().await?;
        let result = inner.compare(first, second, level).await;
        inner.settle(result).await
    }

    /// Read the live parameter block of the device.
    ///
    /// # Errors
    ///
    /// Returns the initialization error if no device can be opened, or
    /// [`DeviceError::OperationFailed`] if the readback fails.
    pub async fn device_info(&self) -> Result<DeviceParams> {
        let mut inner = self.inner.lock().await;
        inner.ensure_ready().await?;
        let result = inner
            .driver
            .device_params()
            .await
            .map_err(|code| DeviceError::operation_failed(Primitive::GetDeviceInfo, code));
        if let (Ok(params), SessionState::Ready { params: cached, .. }) = (&result, &mut inner.state) {
            *cached = params.clone();
        }
        inner.settle(result).await
    }

    /// Close the device if open. Safe to call any number of times.
    pub async fn dispose(&self) {
        let mut inner = self.inner.lock().await;
        inner.release().await;
    }
}

impl<D: ScannerDriver> Inner<D> {
    /// Bring the session to `Ready` and return the current parameters.
    async fn ensure_ready(&mut self) -> Result<DeviceParams> {
        if let SessionState::Ready { params, .. } = &self.state {
            trace!("Device already initialized");
            return Ok(params.clone());
        }

        debug!("Enumerating devices");
        let devices = match self.driver.enumerate().await {
            Ok(devices) => devices,
            Err(code) => {
                warn!(code = code.as_i32(), "Device enumeration failed: {}", code.description());
                return Err(DeviceError::NoDeviceFound);
            }
        };
        let Some(device) = devices.into_iter().next() else {
            warn!("No fingerprint device connected");
            return Err(DeviceError::NoDeviceFound);
        };

        debug!(device = %device.name, id = device.id, "Opening device");
        self.driver
            .open(&device)
            .await
            .map_err(|code| init_failed(Primitive::OpenDevice, code))?;

        let params = match self.driver.device_params().await {
            Ok(params) => params,
            Err(code) => {
                if let Err(close_code) = self.driver.close().await {
                    warn!(code = close_code.as_i32(), "Failed to close half-open device");
                }
                return Err(init_failed(Primitive::GetDeviceInfo, code));
            }
        };

        info!(
            device = %device.name,
            width = params.image_width,
            height = params.image_height,
            dpi = params.image_dpi,
            "Device initialized"
        );
        self.state = SessionState::Ready {
            device,
            params: params.clone(),
        };
        Ok(params)
    }

    async fn capture(
        &mut self,
        params: &DeviceParams,
        quality_threshold: u32,
        timeout_ms: u32,
    ) -> Result<CaptureResult> {
        let (width, height) = (params.image_width, params.image_height);
        let mut raw_image = vec![0u8; params.frame_len()];

        let started = Instant::now();
        self.driver
            .get_image(&mut raw_image, timeout_ms, quality_threshold)
            .await
            .map_err(|code| DeviceError::operation_failed(Primitive::GetImage, code))?;
        let capture_time_ms = started.elapsed().as_millis() as u64;

        let quality = self
            .driver
            .image_quality(width, height, &raw_image)
            .await
            .map_err(|code| DeviceError::operation_failed(Primitive::GetImageQuality, code))?;

        let png_image = encode_grayscale_png(width, height, &raw_image).unwrap_or_else(|e| {
            warn!(error = %e, width, height, "PNG encoding failed, returning empty image");
            Vec::new()
        });

        let template = self
            .driver
            .create_template(&raw_image)
            .await
            .map_err(|code| DeviceError::operation_failed(Primitive::CreateTemplate, code))?;

        debug!(quality, capture_time_ms, template_len = template.len(), "Capture completed");
        Ok(CaptureResult {
            raw_image,
            width,
            height,
            png_image,
            quality,
            capture_time_ms,
            template,
        })
    }

    async fn compare(&mut self, first: &[u8], second: &[u8], level: SecurityLevel) -> Result<MatchOutcome> {
        let matched = self
            .driver
            .match_templates(first, second, level)
            .await
            .map_err(|code| DeviceError::operation_failed(Primitive::MatchTemplate, code))?;
        let score = self
            .driver
            .matching_score(first, second)
            .await
            .map_err(|code| DeviceError::operation_failed(Primitive::GetMatchingScore, code))?;

        debug!(matched, score, level = %level, "Templates compared");
        Ok(MatchOutcome { matched, score })
    }

    /// Drop the handle when the driver reports the device is gone.
    async fn settle<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(DeviceError::OperationFailed { primitive, code }) = &result
            && code.as_i32() == ERROR_DEVICE_NOT_FOUND
        {
            warn!(%primitive, "Device lost, session will re-initialize on next request");
            self.release().await;
        }
        result
    }

    async fn release(&mut self) {
        if let SessionState::Ready { device, .. } =
            std::mem::replace(&mut self.state, SessionState::Uninitialized)
        {
            match self.driver.close().await {
                Ok(()) => info!(device = %device.name, "Device closed"),
                Err(code) => warn!(
                    device = %device.name,
                    code = code.as_i32(),
                    "Close failed: {}",
                    code.description()
                ),
            }
        }
    }
}

fn init_failed(primitive: Primitive, code: scanbridge_core::VendorCode) -> DeviceError {
    warn!(%primitive, code = code.as_i32(), "Device initialization failed: {}", code.description());
    DeviceError::initialization_failed(primitive, code)
}
