//! Property conversion utilities
//!
//! This crate holds the list tokenizer used for multi-valued properties,
//! the flattening of nested values, `${...}` variable interpolation and
//! scalar type converters.

pub mod convert;
pub mod flatten;
pub mod interpolation;
pub mod split;

pub use convert::{BooleanConverter, DoubleConverter, IntegerConverter, TypeConverter};
pub use flatten::{flatten, to_iter, Flattenable};
pub use interpolation::{interpolate, EnvironmentLookup, Interpolator, VariableLookup};
pub use split::{escape, escape_with, split, split_with_escape, LIST_DELIMITER, LIST_ESCAPE};
