//! The query surface exposed to harnesses.
//!
//! `Recommender` owns a shared, read-only `DataStore` and answers the three
//! queries in two flavours:
//! - `try_*` methods return typed errors
//! - the plain methods collapse failures into sentinel values, for callers
//!   that print one result line per query

use crate::collaborative::CollaborativePredictor;
use crate::content::ContentRecommender;
use crate::error::{RecommendError, Result};
use data_loader::{DataStore, MovieName};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Returned by the string queries when the user is unknown
pub const INVALID_USER: &str = "USER NOT FOUND";

/// Returned by the score query when the user or the movie is unknown
pub const NOT_FOUND: f64 = -1.0;

/// Content-based and collaborative recommendations over one loaded data set
#[derive(Debug, Clone)]
pub struct Recommender {
    store: Arc<DataStore>,
}

impl Recommender {
    /// Wrap an already built store
    pub fn new(store: impl Into<Arc<DataStore>>) -> Self {
        Self {
            store: store.into(),
        }
    }

    /// Load both input files and wrap the result
    pub fn load(movies_path: &Path, ratings_path: &Path) -> Result<Self> {
        let store = DataStore::load(movies_path, ratings_path)?;
        Ok(Self::new(store))
    }

    pub fn store(&self) -> &DataStore {
        &self.store
    }

    pub fn content(&self) -> ContentRecommender<'_> {
        ContentRecommender::new(&self.store)
    }

    pub fn collaborative(&self) -> CollaborativePredictor<'_> {
        CollaborativePredictor::new(&self.store)
    }

    // Typed queries

    #[instrument(skip(self))]
    pub fn try_recommend_by_content(&self, user: &str) -> Result<Option<MovieName>> {
        let result = self.content().recommend(user)?;
        debug!(?result, "Content recommendation");
        Ok(result)
    }

    #[instrument(skip(self))]
    pub fn try_predict(&self, movie: &str, user: &str, k: i64) -> Result<f64> {
        self.collaborative().predict(movie, user, k)
    }

    #[instrument(skip(self))]
    pub fn try_recommend_by_cf(&self, user: &str, k: i64) -> Result<Option<MovieName>> {
        let result = self.collaborative().recommend(user, k)?;
        debug!(?result, "Collaborative recommendation");
        Ok(result)
    }

    // Sentinel queries

    /// Best unrated movie by content, [`INVALID_USER`] for an unknown user,
    /// empty when nothing can be recommended
    pub fn recommend_by_content(&self, user: &str) -> String {
        collapse(self.try_recommend_by_content(user))
    }

    /// Predicted rating, [`NOT_FOUND`] for an unknown user or movie, NaN when
    /// `k` is out of range or the prediction is undefined
    #[instrument(skip(self))]
    pub fn predict_movie_score_for_user(&self, movie: &str, user: &str, k: i64) -> f64 {
        score_or_sentinel(&self.try_predict(movie, user, k))
    }

    /// Best unrated movie by predicted rating, [`INVALID_USER`] for an
    /// unknown user, empty when nothing can be recommended
    pub fn recommend_by_cf(&self, user: &str, k: i64) -> String {
        collapse(self.try_recommend_by_cf(user, k))
    }
}

/// Collapse a typed prediction into the score query's sentinels
pub fn score_or_sentinel(prediction: &Result<f64>) -> f64 {
    match prediction {
        Ok(score) => *score,
        Err(RecommendError::InvalidUser { .. } | RecommendError::InvalidMovie { .. }) => NOT_FOUND,
        Err(e) => {
            warn!(error = %e, "Prediction failed");
            f64::NAN
        }
    }
}

fn collapse(result: Result<Option<MovieName>>) -> String {
    match result {
        Ok(name) => name.unwrap_or_default(),
        Err(RecommendError::InvalidUser { .. }) => INVALID_USER.to_string(),
        Err(e) => {
            warn!(error = %e, "Recommendation failed");
            String::new()
        }
    }
}
