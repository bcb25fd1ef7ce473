//! Operation dispatcher for the scanbridge fingerprint API.
//!
//! Maps the API operations (health, status, capture, compare, register,
//! verify, device info) onto a shared [`DeviceSession`], and shapes every
//! outcome into a serializable response. Expected failures never escape as
//! errors or panics; they become `success: false` responses.
//!
//! [`DeviceSession`]: scanbridge_hardware::DeviceSession

pub mod error;
pub mod models;
pub mod service;

pub use error::{OperationError, Result};
pub use service::FingerprintService;
