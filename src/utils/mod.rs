//! Utilities module for logging and error handling
//!
//! - Structured logging with tracing
//! - Startup error types

pub mod error;
pub mod logging;

// Re-export main types for convenience
pub use error::{AgriError, Result, ResultExt};
pub use logging::{init_logging, LogConfig, LogLevel};
