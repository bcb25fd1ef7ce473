//! Mock scanner driver for testing and development.
//!
//! This module provides a simulated vendor driver whose behavior can be
//! steered at runtime through a [`MockScannerHandle`]: which devices are
//! attached, what frame and template a capture produces, what the matcher
//! answers, and which primitive should fail with which status code. The
//! handle also counts calls and detects overlapping primitive invocations.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use scanbridge_core::SecurityLevel;
use scanbridge_core::VendorCode;
use scanbridge_core::constants::{ERROR_DEVICE_NOT_FOUND, SERIAL_NUMBER_LEN, TEMPLATE_SIZE};

use crate::error::DriverResult;
use crate::traits::ScannerDriver;
use crate::types::{DeviceDescriptor, DeviceParams, MatchOutcome, Primitive};

/// Status returned by primitives that need an open device when none is open.
const ERROR_FUNCTION_FAILED: i32 = 2;

/// How the simulated matcher decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchPolicy {
    /// Byte-identical templates match with `score`; anything else scores 0.
    Identical { score: u32 },

    /// Every comparison yields the configured outcome.
    Fixed(MatchOutcome),
}

#[derive(Debug)]
struct MockState {
    devices: Vec<DeviceDescriptor>,
    params: DeviceParams,
    frame: Vec<u8>,
    quality: u32,
    template: Vec<u8>,
    match_policy: MatchPolicy,
    failures: HashMap<Primitive, VendorCode>,
    capture_delay: Duration,
    open: Option<DeviceDescriptor>,
    calls: HashMap<Primitive, usize>,
    last_security_level: Option<SecurityLevel>,
    last_capture_args: Option<(u32, u32)>,
}

#[derive(Debug, Default)]
struct CallGuard {
    in_flight: AtomicBool,
    overlaps: AtomicUsize,
}

#[derive(Debug)]
struct Shared {
    state: Mutex<MockState>,
    guard: CallGuard,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, MockState> {
        // A panicking test thread must not hide the state from the others.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record entry into a primitive, flagging re-entrant calls.
    fn enter(&self, primitive: Primitive) -> Option<VendorCode> {
        if self.guard.in_flight.swap(true, Ordering::SeqCst) {
            self.guard.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        let mut state = self.state();
        *state.calls.entry(primitive).or_insert(0) += 1;
        state.failures.get(&primitive).copied()
    }

    fn exit(&self) {
        self.guard.in_flight.store(false, Ordering::SeqCst);
    }
}

/// Mock scanner driver for testing and development.
///
/// # Examples
///
/// ```
/// use scanbridge_hardware::mock::MockScanner;
/// use scanbridge_hardware::traits::ScannerDriver;
///
/// #[tokio::main]
/// async fn main() {
///     let (mut driver, handle) = MockScanner::new();
///     handle.set_quality(77);
///
///     let devices = driver.enumerate().await.unwrap();
///     driver.open(&devices[0]).await.unwrap();
///
///     let frame = vec![0u8; 4];
///     let quality = driver.image_quality(2, 2, &frame).await.unwrap();
///     assert_eq!(quality, 77);
/// }
/// ```
#[derive(Debug)]
pub struct MockScanner {
    shared: Arc<Shared>,
}

impl MockScanner {
    /// Create a mock driver with one simulated device attached.
    ///
    /// Returns a tuple of (MockScanner, MockScannerHandle) where the handle
    /// steers and inspects the simulated device.
    pub fn new() -> (Self, MockScannerHandle) {
        let params = default_params();
        let frame = synthetic_frame(params.image_width, params.image_height);
        Self::with_state(MockState {
            devices: vec![DeviceDescriptor::new("Simulated FDU05", 0)],
            params,
            frame,
            quality: 80,
            template: synthetic_template(),
            match_policy: MatchPolicy::Identical { score: 199 },
            failures: HashMap::new(),
            capture_delay: Duration::ZERO,
            open: None,
            calls: HashMap::new(),
            last_security_level: None,
            last_capture_args: None,
        })
    }

    /// Create a mock driver that enumerates no devices.
    pub fn absent() -> (Self, MockScannerHandle) {
        let (scanner, handle) = Self::new();
        handle.unplug();
        (scanner, handle)
    }

    fn with_state(state: MockState) -> (Self, MockScannerHandle) {
        let shared = Arc::new(Shared {
            state: Mutex::new(state),
            guard: CallGuard::default(),
        });
        (
            Self {
                shared: Arc::clone(&shared),
            },
            MockScannerHandle { shared },
        )
    }

    /// Run a primitive that needs an open device.
    fn with_open<T>(
        &self,
        primitive: Primitive,
        f: impl FnOnce(&mut MockState) -> T,
    ) -> DriverResult<T> {
        let injected = self.shared.enter(primitive);
        let result = {
            let mut state = self.shared.state();
            if let Some(code) = injected {
                Err(code)
            } else if state.open.is_none() {
                Err(VendorCode::new(if state.devices.is_empty() {
                    ERROR_DEVICE_NOT_FOUND
                } else {
                    ERROR_FUNCTION_FAILED
                }))
            } else {
                Ok(f(&mut state))
            }
        };
        self.shared.exit();
        result
    }
}

impl ScannerDriver for MockScanner {
    async fn enumerate(&mut self) -> DriverResult<Vec<DeviceDescriptor>> {
        let injected = self.shared.enter(Primitive::EnumerateDevice);
        let result = match injected {
            Some(code) => Err(code),
            None => Ok(self.shared.state().devices.clone()),
        };
        self.shared.exit();
        result
    }

    async fn open(&mut self, device: &DeviceDescriptor) -> DriverResult<()> {
        let injected = self.shared.enter(Primitive::OpenDevice);
        let result = {
            let mut state = self.shared.state();
            if let Some(code) = injected {
                Err(code)
            } else if !state.devices.contains(device) {
                Err(VendorCode::new(ERROR_DEVICE_NOT_FOUND))
            } else {
                state.open = Some(device.clone());
                Ok(())
            }
        };
        self.shared.exit();
        result
    }

    async fn device_params(&mut self) -> DriverResult<DeviceParams> {
        self.with_open(Primitive::GetDeviceInfo, |state| state.params.clone())
    }

    async fn get_image(
        &mut self,
        buffer: &mut [u8],
        timeout_ms: u32,
        quality_threshold: u32,
    ) -> DriverResult<()> {
        let injected = self.shared.enter(Primitive::GetImage);
        let delay = self.shared.state().capture_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let result = {
            let mut state = self.shared.state();
            state.last_capture_args = Some((timeout_ms, quality_threshold));
            if let Some(code) = injected {
                Err(code)
            } else if state.open.is_none() {
                Err(VendorCode::new(ERROR_DEVICE_NOT_FOUND))
            } else {
                let n = buffer.len().min(state.frame.len());
                buffer[..n].copy_from_slice(&state.frame[..n]);
                buffer[n..].fill(0);
                Ok(())
            }
        };
        self.shared.exit();
        result
    }

    async fn image_quality(&mut self, _width: u32, _height: u32, _image: &[u8]) -> DriverResult<u32> {
        self.with_open(Primitive::GetImageQuality, |state| state.quality)
    }

    async fn create_template(&mut self, _image: &[u8]) -> DriverResult<Vec<u8>> {
        self.with_open(Primitive::CreateTemplate, |state| state.template.clone())
    }

    async fn match_templates(
        &mut self,
        first: &[u8],
        second: &[u8],
        level: SecurityLevel,
    ) -> DriverResult<bool> {
        self.with_open(Primitive::MatchTemplate, |state| {
            state.last_security_level = Some(level);
            match state.match_policy {
                MatchPolicy::Identical { .. } => first == second,
                MatchPolicy::Fixed(outcome) => outcome.matched,
            }
        })
    }

    async fn matching_score(&mut self, first: &[u8], second: &[u8]) -> DriverResult<u32> {
        self.with_open(Primitive::GetMatchingScore, |state| match state.match_policy {
            MatchPolicy::Identical { score } if first == second => score,
            MatchPolicy::Identical { .. } => 0,
            MatchPolicy::Fixed(outcome) => outcome.score,
        })
    }

    async fn close(&mut self) -> DriverResult<()> {
        let injected = self.shared.enter(Primitive::CloseDevice);
        let result = {
            let mut state = self.shared.state();
            match injected {
                Some(code) => Err(code),
                None => {
                    state.open = None;
                    Ok(())
                }
            }
        };
        self.shared.exit();
        result
    }
}

/// Handle for steering and inspecting a mock scanner.
///
/// Cloning the handle is cheap; all clones observe the same device.
#[derive(Debug, Clone)]
pub struct MockScannerHandle {
    shared: Arc<Shared>,
}

impl MockScannerHandle {
    /// Detach every device; an open handle starts failing with "device not found".
    pub fn unplug(&self) {
        let mut state = self.shared.state();
        state.devices.clear();
        state.open = None;
    }

    /// Attach a device at the end of the enumeration list.
    pub fn plug_in(&self, device: DeviceDescriptor) {
        self.shared.state().devices.push(device);
    }

    /// Replace the parameter block reported by the device.
    pub fn set_params(&self, params: DeviceParams) {
        self.shared.state().params = params;
    }

    /// Set the frame geometry and the raw pixels the next captures return.
    pub fn set_frame(&self, width: u32, height: u32, frame: Vec<u8>) {
        let mut state = self.shared.state();
        state.params.image_width = width;
        state.params.image_height = height;
        state.frame = frame;
    }

    /// Set the quality score the driver reports.
    pub fn set_quality(&self, quality: u32) {
        self.shared.state().quality = quality;
    }

    /// Set the template the extractor produces.
    pub fn set_template(&self, template: Vec<u8>) {
        self.shared.state().template = template;
    }

    /// Make every comparison yield a fixed outcome.
    pub fn set_match_result(&self, matched: bool, score: u32) {
        self.shared.state().match_policy = MatchPolicy::Fixed(MatchOutcome { matched, score });
    }

    /// Make `primitive` fail with `code` until cleared.
    pub fn fail_with(&self, primitive: Primitive, code: i32) {
        self.shared
            .state()
            .failures
            .insert(primitive, VendorCode::new(code));
    }

    /// Stop injecting a failure into `primitive`.
    pub fn clear_failure(&self, primitive: Primitive) {
        self.shared.state().failures.remove(&primitive);
    }

    /// Hold every capture for `delay` before returning.
    pub fn set_capture_delay(&self, delay: Duration) {
        self.shared.state().capture_delay = delay;
    }

    /// Number of times `primitive` has been invoked.
    pub fn call_count(&self, primitive: Primitive) -> usize {
        self.shared
            .state()
            .calls
            .get(&primitive)
            .copied()
            .unwrap_or(0)
    }

    /// Number of primitive calls that started while another was in flight.
    pub fn overlapping_calls(&self) -> usize {
        self.shared.guard.overlaps.load(Ordering::SeqCst)
    }

    /// Whether a device is currently open.
    pub fn is_open(&self) -> bool {
        self.shared.state().open.is_some()
    }

    /// Security level passed to the most recent match call.
    pub fn last_security_level(&self) -> Option<SecurityLevel> {
        self.shared.state().last_security_level
    }

    /// `(timeout_ms, quality_threshold)` passed to the most recent capture.
    pub fn last_capture_args(&self) -> Option<(u32, u32)> {
        self.shared.state().last_capture_args
    }

    /// Template the extractor currently produces.
    pub fn template(&self) -> Vec<u8> {
        self.shared.state().template.clone()
    }
}

fn default_params() -> DeviceParams {
    let mut serial_number = [0u8; SERIAL_NUMBER_LEN];
    serial_number[..10].copy_from_slice(b"SIM0000001");
    DeviceParams {
        device_id: 0,
        serial_number,
        image_width: 260,
        image_height: 300,
        image_dpi: 500,
        firmware_version: 0x1040,
        brightness: 70,
        contrast: 50,
        gain: 1,
    }
}

/// Concentric ridge pattern so the simulated image looks like a print.
fn synthetic_frame(width: u32, height: u32) -> Vec<u8> {
    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    (0..height)
        .flat_map(|y| {
            (0..width).map(move |x| {
                let d = ((x as f32 - cx).powi(2) + (y as f32 - cy).powi(2)).sqrt();
                if (d / 6.0) as u32 % 2 == 0 { 60 } else { 200 }
            })
        })
        .collect()
}

fn synthetic_template() -> Vec<u8> {
    (0..TEMPLATE_SIZE).map(|i| (i * 7 % 251) as u8).collect()
}
