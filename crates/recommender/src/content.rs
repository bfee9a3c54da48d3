//! Content-based recommendation.
//!
//! ## Algorithm
//! 1. Center the user's ratings on their mean (rated movies only)
//! 2. Preference vector = sum of (centered rating × attribute vector) over
//!    rated movies
//! 3. Score each unrated movie by cosine similarity between its attributes
//!    and the preference vector
//! 4. Recommend the highest score; ties go to the earlier movie in the
//!    rating-column order
//!
//! A similarity is undefined when either vector is all zeros (for example a
//! user whose ratings all equal their mean). Such candidates rank below every
//! defined score, and when no candidate has a defined score the first
//! unrated movie is returned.

use crate::error::{RecommendError, Result};
use crate::similarity::{cosine_similarity, scaled_add};
use crate::types::ContentMatch;
use data_loader::{AttributeVector, DataStore, MovieName, RatingVector};
use tracing::{debug, instrument, warn};

/// Recommends movies whose attributes point the same way as the user's taste
#[derive(Debug, Clone, Copy)]
pub struct ContentRecommender<'a> {
    store: &'a DataStore,
}

impl<'a> ContentRecommender<'a> {
    pub fn new(store: &'a DataStore) -> Self {
        Self { store }
    }

    fn ratings(&self, user: &str) -> Result<&'a RatingVector> {
        self.store
            .get_user(user)
            .ok_or_else(|| RecommendError::InvalidUser {
                user: user.to_string(),
            })
    }

    fn attributes_at(&self, index: usize) -> Result<(&'a MovieName, &'a AttributeVector)> {
        let name = self
            .store
            .movie_order()
            .get(index)
            .ok_or(RecommendError::UnknownColumn { index })?;
        let attributes = self
            .store
            .get_movie(name)
            .ok_or_else(|| RecommendError::InvalidMovie {
                movie: name.clone(),
            })?;
        Ok((name, attributes))
    }

    /// The user's ratings minus their mean, `None` where unrated.
    ///
    /// A rating equal to the mean stays `Some(0.0)`.
    pub fn centered_ratings(&self, user: &str) -> Result<Vec<Option<f64>>> {
        let ratings = self.ratings(user)?;
        let mean = ratings.mean();
        Ok((0..ratings.len())
            .map(|idx| ratings.get(idx).map(|r| r - mean))
            .collect())
    }

    /// Weighted sum of the attribute vectors of every movie the user rated
    pub fn preference_vector(&self, user: &str) -> Result<Vec<f64>> {
        let ratings = self.ratings(user)?;
        let mean = ratings.mean();
        let mut preference = vec![0.0; self.store.dimension().unwrap_or(0)];

        for (idx, rating) in ratings.rated() {
            let (_, attributes) = self.attributes_at(idx)?;
            scaled_add(&mut preference, rating - mean, attributes)?;
        }
        Ok(preference)
    }

    /// Similarity of every unrated movie to the user's preference vector,
    /// in rating-column order
    #[instrument(skip(self))]
    pub fn rank(&self, user: &str) -> Result<Vec<ContentMatch>> {
        let ratings = self.ratings(user)?;
        let preference = self.preference_vector(user)?;

        let mut matches = Vec::new();
        for idx in ratings.unrated() {
            let (name, attributes) = self.attributes_at(idx)?;
            let similarity = match cosine_similarity(attributes, &preference) {
                Ok(score) => Some(score),
                Err(RecommendError::DivisionByZero(reason)) => {
                    warn!(movie = %name, %reason, "Similarity undefined");
                    None
                }
                Err(e) => return Err(e),
            };
            matches.push(ContentMatch {
                name: name.clone(),
                similarity,
            });
        }

        debug!(candidates = matches.len(), "Ranked content candidates");
        Ok(matches)
    }

    /// Best unrated movie for the user, `None` if they rated everything
    pub fn recommend(&self, user: &str) -> Result<Option<MovieName>> {
        let matches = self.rank(user)?;

        let mut best: Option<(&ContentMatch, f64)> = None;
        for candidate in &matches {
            if let Some(score) = candidate.similarity
                && best.is_none_or(|(_, best_score)| score > best_score)
            {
                best = Some((candidate, score));
            }
        }

        Ok(best
            .map(|(candidate, _)| candidate)
            .or_else(|| matches.first())
            .map(|candidate| candidate.name.clone()))
    }
}
