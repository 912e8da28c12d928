//! Error types for eventmap.
//!
//! Uses `thiserror` for library-style error definitions.

use thiserror::Error;

/// Errors that can occur in eventmap operations.
#[derive(Error, Debug)]
pub enum EventMapError {
    /// Reading a catalog file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing failed
    #[error("Failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Event validation failed
    #[error("Invalid event data: {0}")]
    Validation(String),

    /// City code not present in the location catalog
    #[error("Unknown city: {0}")]
    UnknownCity(String),

    /// State code not present in the location catalog
    #[error("Unknown state: {0}")]
    UnknownState(String),
}
