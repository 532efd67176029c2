//! Error types for the confkit libraries

use thiserror::Error;

/// Main error type for configuration operations
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// Variable interpolation failed
    #[error("Interpolation error: {0}")]
    Interpolation(#[from] InterpolationError),

    /// A value could not be converted to the requested type
    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// Reading or writing a configuration source failed
    #[error("File system error: {0}")]
    FileSystem(#[from] FileSystemError),

    /// The store does not support modification
    #[error("Configuration is read-only: cannot {operation}")]
    ReadOnly { operation: String },

    /// Malformed configuration source
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Loading through a provider (YAML, environment) failed
    #[error("Failed to load configuration: {0}")]
    Load(String),

    /// Bean construction failed
    #[error("Cannot create bean {bean}: {message}")]
    BeanCreation { bean: String, message: String },

    /// Missing required key
    #[error("Missing required configuration key: {key}")]
    MissingKey { key: String },

    /// Settings validation error
    #[error("Configuration validation error: {field}: {message}")]
    Validation { field: String, message: String },
}

/// Result type alias for configuration operations
pub type Result<T> = std::result::Result<T, ConfigurationError>;

/// Interpolation specific errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InterpolationError {
    /// A variable was reached again while it was still being resolved
    #[error("Infinite loop in property interpolation of {variable}: {chain}")]
    CyclicInterpolation { variable: String, chain: String },
}

/// Type conversion specific errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// Text that does not parse as the target type
    #[error("Cannot convert '{value}' to {target}")]
    InvalidValue { target: &'static str, value: String },

    /// Numeric value outside of the target range
    #[error("Value {value} is out of range for {target}")]
    OutOfRange { target: &'static str, value: String },

    /// Value kind with no conversion to the target type
    #[error("Cannot convert a {kind} value to {target}")]
    Unsupported { target: &'static str, kind: &'static str },
}

/// Byte-stream resolution specific errors
#[derive(Error, Debug)]
pub enum FileSystemError {
    /// Nothing found at the resolved location
    #[error("Cannot locate configuration source {name}")]
    NotFound { name: String },

    /// The location resolved to a directory
    #[error("Cannot load a configuration from a directory: {path}")]
    Directory { path: String },

    /// Base path and file name do not form a usable location
    #[error("Invalid location {location}: {message}")]
    InvalidLocation { location: String, message: String },

    /// Local IO failure
    #[error("IO error on {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },

    /// HTTP response with an error status
    #[error("HTTP error {status} from {url}")]
    Http { url: String, status: u16 },

    /// HTTP request could not be completed
    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },
}

impl FileSystemError {
    /// Wrap an IO error with the location it occurred on
    pub fn io(location: impl ToString, source: std::io::Error) -> Self {
        FileSystemError::Io {
            location: location.to_string(),
            source,
        }
    }
}
