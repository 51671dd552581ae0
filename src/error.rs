//! Error types for the tariff engine.
//!
//! Only startup can fail: acquiring the dataset or binding the server. Once
//! a [`TariffIndex`](crate::config::TariffIndex) exists, [`evaluate`](crate::evaluate) always produces a result and reports
//! degradations as audit warnings instead.

use thiserror::Error;

/// The main error type for the tariff engine.
///
/// # Example
///
/// ```
/// use tariff_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/tariff.json".to_string(),
/// };
/// assert_eq!(error.to_string(), "Tariff dataset not found: /missing/tariff.json");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// The dataset file was not found or could not be read.
    #[error("Tariff dataset not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// The dataset file could not be parsed.
    #[error("Failed to parse tariff dataset '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// The dataset file has an extension the loader does not understand.
    #[error("Unsupported dataset format '{path}' (expected .json, .yaml or .yml)")]
    UnsupportedFormat {
        /// The offending path.
        path: String,
    },

    /// The HTTP server could not bind or stopped with an error.
    #[error("Server error: {message}")]
    Server {
        /// A description of the failure.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
