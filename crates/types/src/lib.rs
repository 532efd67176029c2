//! Shared types for confkit
//!
//! This crate contains the property value model and the error types used
//! across the converter, filesystem and configuration crates.

pub mod error;
pub mod value;

// Re-export commonly used types
pub use error::{ConfigurationError, ConversionError, FileSystemError, InterpolationError, Result};
pub use value::Value;
