//! Helper functions shared by the filters, the spectral analysis and the
//! evaluation harness.

/// Power, error and decibel helpers used elsewhere in the project
pub mod math;
