//! Shared vocabulary for the scanbridge fingerprint bridge.
//!
//! - [`catalog`]: vendor status code phrases
//! - [`codec`]: base64 transport encoding for templates and images
//! - [`SecurityLevel`], [`Template`], [`VendorCode`]: domain values passed
//!   between the device session and the HTTP surface

pub mod catalog;
pub mod codec;
pub mod constants;
pub mod error;
pub mod types;

pub use error::{DecodeError, Result};
pub use types::*;
