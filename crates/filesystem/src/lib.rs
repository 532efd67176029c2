//! Byte-stream resolution for configuration sources
//!
//! This crate turns a base path and a file name into a readable stream or a
//! writable sink, for local files as well as HTTP locations.

pub mod default;
pub mod location;
pub mod sink;
pub mod traits;

pub use default::*;
pub use location::*;
pub use sink::*;
pub use traits::*;
