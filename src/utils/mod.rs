//! The `utils` module provides a collection of utility functions and common
//! definitions used across the `sensorcast` application.
//!
//! It holds the crate-wide error type and the tracing setup.

pub mod error;
pub mod logging;
