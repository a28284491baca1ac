//! Shared utilities for s3-probe CLI binaries.
//!
//! This crate provides argument types, logging setup and formatting helpers
//! shared by the `sp-walker` binary and any future probe binaries.

pub mod args;
pub mod format;
pub mod logging;

pub use args::LogLevel;
pub use format::{format_duration, format_number};
pub use logging::init_logging;
