//! Shared utilities for the ORNG oracle.

pub mod logging;

pub use logging::{init_logging, LogFormat, LoggingError};
