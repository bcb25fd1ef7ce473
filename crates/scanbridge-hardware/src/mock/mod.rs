//! Mock driver implementations for testing and development.
//!
//! This module provides a simulated scanner driver that can be controlled
//! programmatically without requiring physical hardware.

pub mod scanner;

// Re-export commonly used types
pub use scanner::{MockScanner, MockScannerHandle};
