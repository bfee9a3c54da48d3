//! Error types for the data-loader crate.
//!
//! Every failure a load can hit is one variant here. A load either returns a
//! complete, validated `DataStore` or one of these errors; partially parsed
//! state is dropped with the error.

use thiserror::Error;

/// Errors that can occur while loading the movie and rating files
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Unable to open file {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading an already opened file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A data line did not yield its leading identifier token
    #[error("Malformed line {line} in {file}: {reason}")]
    MalformedLine {
        file: String,
        line: usize,
        reason: String,
    },

    /// A numeric field had an invalid value
    #[error("Invalid value for {field} at line {line} in {file}: {value}")]
    InvalidValue {
        file: String,
        line: usize,
        field: String,
        value: String,
    },

    /// A user row does not carry one token per movie in the header
    #[error("Expected {expected} ratings but found {found} at line {line} in {file}")]
    FieldCountMismatch {
        file: String,
        expected: usize,
        found: usize,
        line: usize,
    },

    /// Attribute vectors disagree on their dimensionality
    #[error("Movie {movie} has {found} attributes, expected {expected}")]
    DimensionMismatch {
        movie: String,
        expected: usize,
        found: usize,
    },

    /// Referenced entity doesn't exist (e.g., a rated movie with no attributes)
    #[error("Missing reference: {entity} {name}")]
    MissingReference { entity: String, name: String },

    /// The same movie or user name appears twice
    #[error("Duplicate {entity} {name}")]
    Duplicate { entity: String, name: String },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
