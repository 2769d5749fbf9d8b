//! # pyview Utilities
//!
//! Shared logging and configuration for pyview.
//!
//! This crate holds the ambient pieces that are not part of the visualization
//! pipeline itself: `tracing` subscriber setup and the process-wide
//! [`DebuggerOptions`] the pipeline reads.

pub mod config;
pub mod logging;

pub use config::DebuggerOptions;
// Re-export commonly used logging functions for convenience
pub use logging::{init_logging, init_logging_for_host, init_logging_with_level, LogFormat, LogLevel, LoggingError};
