//! Error types for recommendation queries.

use data_loader::DataLoadError;
use thiserror::Error;

/// Errors a recommendation query can return.
///
/// Query errors are values, never panics: user and movie names come from
/// callers and may be anything.
#[derive(Error, Debug)]
pub enum RecommendError {
    /// The user has no row in the rating table
    #[error("User not found: {user}")]
    InvalidUser { user: String },

    /// The movie has no attribute vector
    #[error("Movie not found: {movie}")]
    InvalidMovie { movie: String },

    /// Neighbourhood size outside `1..=history`
    #[error("Invalid k {k}: user has {history} rated movies")]
    InvalidK { k: i64, history: usize },

    /// A similarity or average had a zero denominator
    #[error("Division by zero: {0}")]
    DivisionByZero(String),

    /// A rating column with no movie in the rating header
    #[error("Rating column {index} has no movie in the header")]
    UnknownColumn { index: usize },

    /// Two vectors of different lengths were combined
    #[error("Vector length mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    /// Loading the underlying data failed
    #[error(transparent)]
    Load(#[from] DataLoadError),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, RecommendError>;
