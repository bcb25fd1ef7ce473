//! Scanner abstraction and device session for the scanbridge fingerprint bridge.
//!
//! This crate sits between the HTTP surface and the vendor SDK. It defines
//! the driver contract every scanner backend implements, and the session that
//! owns the single device handle on top of it.
//!
//! # Layers
//!
//! - [`ScannerDriver`]: one method per vendor primitive, each returning the
//!   value or the raw status code.
//! - [`DeviceSession`]: lazy initialization, strict serialization of all
//!   primitives, device-lost recovery, and translation of status codes into
//!   [`DeviceError`].
//! - [`mock::MockScanner`]: a steerable simulated scanner used by tests and by
//!   the binary when no hardware backend is compiled in.
//!
//! ```no_run
//! use scanbridge_hardware::{DeviceSession, Result, ScannerDriver};
//!
//! async fn quick_check<D: ScannerDriver>(session: &DeviceSession<D>) -> Result<u32> {
//!     let capture = session.capture_image(50, 10_000).await?;
//!     Ok(capture.quality)
//! }
//! ```
//!
//! # Thread Safety
//!
//! Drivers are `Send + Sync` and a session can be shared through an `Arc`
//! across Tokio tasks. Callers never need their own locking.

pub mod devices;
pub mod error;
pub mod imaging;
pub mod mock;
pub mod session;
pub mod traits;
pub mod types;

pub use devices::AnyScannerDriver;
pub use error::{DeviceError, DriverResult, Result};
pub use session::DeviceSession;
pub use traits::ScannerDriver;
pub use types::{CaptureResult, DeviceDescriptor, DeviceParams, MatchOutcome, Primitive};
