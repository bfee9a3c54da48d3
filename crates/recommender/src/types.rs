//! Result types shared by the recommenders.

use data_loader::MovieName;
use serde::{Deserialize, Serialize};

/// A movie paired with a score: a similarity or a predicted rating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMovie {
    pub name: MovieName,
    pub score: f64,
}

impl ScoredMovie {
    pub fn new(name: impl Into<MovieName>, score: f64) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

/// A content-based candidate and its similarity to the user's preference
/// vector.
///
/// `similarity` is `None` when it is undefined because the preference
/// vector or the movie's attribute vector is all zeros.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentMatch {
    pub name: MovieName,
    pub similarity: Option<f64>,
}
