//! Core domain types for the recommendation data.
//!
//! Two flat inputs feed everything here:
//! - a movie catalog mapping each movie name to its attribute vector
//! - a rating table whose header fixes the movie order and whose rows give
//!   each user's ratings in that order
//!
//! Ratedness is carried by `Option`, not by a magic value, so a rating that
//! happens to be `0.0` is still a rating.

use crate::error::{DataLoadError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique movie name, as it appears in both input files
pub type MovieName = String;

/// Unique user name, the leading token of a rating row
pub type UserName = String;

/// Numeric trait scores describing a movie
pub type AttributeVector = Vec<f64>;

// =============================================================================
// Rating Vector
// =============================================================================

/// One user's ratings, aligned to the store's movie order.
///
/// `None` means "not rated".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingVector {
    ratings: Vec<Option<f64>>,
}

impl RatingVector {
    pub fn new(ratings: Vec<Option<f64>>) -> Self {
        Self { ratings }
    }

    /// Number of slots, rated or not
    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    /// Rating at a movie-order index, `None` if unrated or out of range
    pub fn get(&self, index: usize) -> Option<f64> {
        self.ratings.get(index).copied().flatten()
    }

    pub fn is_rated(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    /// Iterate over `(movie index, rating)` for rated slots only
    pub fn rated(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.ratings
            .iter()
            .enumerate()
            .filter_map(|(idx, r)| r.map(|value| (idx, value)))
    }

    /// Iterate over movie-order indices the user has not rated
    pub fn unrated(&self) -> impl Iterator<Item = usize> + '_ {
        self.ratings
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_none())
            .map(|(idx, _)| idx)
    }

    pub fn rated_count(&self) -> usize {
        self.ratings.iter().filter(|r| r.is_some()).count()
    }

    /// Mean over rated slots only. A user with no ratings has mean 0.
    pub fn mean(&self) -> f64 {
        let count = self.rated_count();
        if count == 0 {
            return 0.0;
        }
        let total: f64 = self.rated().map(|(_, r)| r).sum();
        total / count as f64
    }
}

impl From<Vec<Option<f64>>> for RatingVector {
    fn from(ratings: Vec<Option<f64>>) -> Self {
        Self::new(ratings)
    }
}

// =============================================================================
// DataStore - The In-Memory Catalog
// =============================================================================

/// Holds the movie catalog, the movie order and every user's ratings.
///
/// A store is built once (by the loader or by hand in tests) and is
/// read-only afterwards, so it can be shared across threads behind an `Arc`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataStore {
    /// Attribute vector per movie
    pub(crate) movies: HashMap<MovieName, AttributeVector>,
    /// Column order of every rating vector
    pub(crate) movie_order: Vec<MovieName>,
    /// Reverse lookup for `movie_order`
    pub(crate) order_index: HashMap<MovieName, usize>,
    /// Ratings per user
    pub(crate) users: HashMap<UserName, RatingVector>,
}

impl DataStore {
    /// Creates a new, empty DataStore
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute vector of a movie
    pub fn get_movie(&self, name: &str) -> Option<&AttributeVector> {
        self.movies.get(name)
    }

    /// Rating vector of a user
    pub fn get_user(&self, name: &str) -> Option<&RatingVector> {
        self.users.get(name)
    }

    pub fn contains_movie(&self, name: &str) -> bool {
        self.movies.contains_key(name)
    }

    pub fn contains_user(&self, name: &str) -> bool {
        self.users.contains_key(name)
    }

    /// Movie names in rating-column order
    pub fn movie_order(&self) -> &[MovieName] {
        &self.movie_order
    }

    /// Position of a movie in the rating columns
    pub fn movie_index(&self, name: &str) -> Option<usize> {
        self.order_index.get(name).copied()
    }

    /// Attribute dimensionality shared by every movie, `None` for an empty catalog
    pub fn dimension(&self) -> Option<usize> {
        self.movie_order
            .first()
            .and_then(|name| self.movies.get(name))
            .or_else(|| self.movies.values().next())
            .map(Vec::len)
    }

    /// User names, in no particular order
    pub fn user_names(&self) -> impl Iterator<Item = &str> {
        self.users.keys().map(String::as_str)
    }

    /// Get counts for debugging/validation: (users, movies)
    pub fn counts(&self) -> (usize, usize) {
        (self.users.len(), self.movies.len())
    }

    // Mutators used while building the store

    /// Insert a movie, returning the attributes it replaced if the name was taken
    pub fn insert_movie(
        &mut self,
        name: impl Into<MovieName>,
        attributes: AttributeVector,
    ) -> Option<AttributeVector> {
        self.movies.insert(name.into(), attributes)
    }

    /// Fix the rating-column order
    pub fn set_movie_order(&mut self, order: Vec<MovieName>) -> Result<()> {
        let mut order_index = HashMap::with_capacity(order.len());
        for (idx, name) in order.iter().enumerate() {
            if order_index.insert(name.clone(), idx).is_some() {
                return Err(DataLoadError::Duplicate {
                    entity: "movie column".to_string(),
                    name: name.clone(),
                });
            }
        }
        self.movie_order = order;
        self.order_index = order_index;
        Ok(())
    }

    /// Insert a user's ratings, returning the vector it replaced if the name was taken
    pub fn insert_user(
        &mut self,
        name: impl Into<UserName>,
        ratings: impl Into<RatingVector>,
    ) -> Option<RatingVector> {
        self.users.insert(name.into(), ratings.into())
    }
}
