//! Item-based collaborative filtering (k nearest neighbours).
//!
//! ## Algorithm
//! 1. Take the movies the user rated (their history)
//! 2. Score each history movie by cosine similarity to the target movie
//! 3. Keep the `k` most similar (stable sort, so ties keep column order)
//! 4. Predicted rating = Σ(similarity × rating) / Σ(similarity)
//!
//! Recommending runs the prediction for every unrated movie and keeps the
//! highest; predictions are computed in parallel and compared in column
//! order, so the earliest movie wins a tie.

use crate::error::{RecommendError, Result};
use crate::similarity::cosine_similarity;
use crate::types::ScoredMovie;
use data_loader::{DataStore, MovieName, RatingVector};
use rayon::prelude::*;
use tracing::{debug, instrument};

/// A rated movie: its column index and the user's rating
type HistoryEntry = (usize, f64);

/// Predicts ratings from the user's ratings of similar movies
#[derive(Debug, Clone, Copy)]
pub struct CollaborativePredictor<'a> {
    store: &'a DataStore,
}

impl<'a> CollaborativePredictor<'a> {
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

    fn attributes(&self, movie: &str) -> Result<&'a [f64]> {
        self.store
            .get_movie(movie)
            .map(Vec::as_slice)
            .ok_or_else(|| RecommendError::InvalidMovie {
                movie: movie.to_string(),
            })
    }

    fn movie_at(&self, index: usize) -> Result<&'a MovieName> {
        self.store
            .movie_order()
            .get(index)
            .ok_or(RecommendError::UnknownColumn { index })
    }

    /// The `k` rated movies most similar to `movie`, most similar first
    pub fn neighbours(&self, movie: &str, user: &str, k: i64) -> Result<Vec<ScoredMovie>> {
        let target = self.attributes(movie)?;
        let ratings = self.ratings(user)?;
        let history: Vec<HistoryEntry> = ratings.rated().collect();

        self.nearest(target, &history, k)?
            .into_iter()
            .map(|(idx, similarity, _)| -> Result<ScoredMovie> {
                Ok(ScoredMovie::new(self.movie_at(idx)?.clone(), similarity))
            })
            .collect()
    }

    /// Predicted rating of `movie` for `user` from the `k` nearest rated movies
    #[instrument(skip(self))]
    pub fn predict(&self, movie: &str, user: &str, k: i64) -> Result<f64> {
        let target = self.attributes(movie)?;
        let ratings = self.ratings(user)?;
        let history: Vec<HistoryEntry> = ratings.rated().collect();

        let score = self.predict_with_history(target, &history, k)?;
        debug!(score, "Predicted rating");
        Ok(score)
    }

    /// Predicted rating of every unrated movie, in column order
    #[instrument(skip(self))]
    pub fn rank(&self, user: &str, k: i64) -> Result<Vec<ScoredMovie>> {
        let ratings = self.ratings(user)?;
        let history: Vec<HistoryEntry> = ratings.rated().collect();
        let unrated: Vec<usize> = ratings.unrated().collect();

        let predictions: Vec<Result<ScoredMovie>> = unrated
            .par_iter()
            .map(|&idx| -> Result<ScoredMovie> {
                let name = self.movie_at(idx)?;
                let target = self.attributes(name)?;
                let score = self.predict_with_history(target, &history, k)?;
                Ok(ScoredMovie::new(name.clone(), score))
            })
            .collect();

        // Sequential pass so the first failure in column order is the one reported
        let scored = predictions.into_iter().collect::<Result<Vec<_>>>()?;

        debug!(candidates = scored.len(), "Ranked collaborative candidates");
        Ok(scored)
    }

    /// Unrated movie with the highest predicted rating, `None` if the user rated everything
    pub fn recommend(&self, user: &str, k: i64) -> Result<Option<MovieName>> {
        let scored = self.rank(user, k)?;

        let mut best: Option<&ScoredMovie> = None;
        for candidate in &scored {
            if best.is_none_or(|b| candidate.score > b.score) {
                best = Some(candidate);
            }
        }
        Ok(best.map(|candidate| candidate.name.clone()))
    }

    /// Top `k` history entries by similarity to `target`: (index, similarity, rating)
    fn nearest(
        &self,
        target: &[f64],
        history: &[HistoryEntry],
        k: i64,
    ) -> Result<Vec<(usize, f64, f64)>> {
        let k = usize::try_from(k)
            .ok()
            .filter(|&k| k > 0 && k <= history.len())
            .ok_or(RecommendError::InvalidK {
                k,
                history: history.len(),
            })?;

        let mut similarities = history
            .iter()
            .map(|&(idx, rating)| -> Result<(usize, f64, f64)> {
                let attributes = self.attributes(self.movie_at(idx)?)?;
                Ok((idx, cosine_similarity(attributes, target)?, rating))
            })
            .collect::<Result<Vec<_>>>()?;

        // `sort_by` is stable: equal similarities keep column order
        similarities.sort_by(|a, b| b.1.total_cmp(&a.1));
        similarities.truncate(k);
        Ok(similarities)
    }

    fn predict_with_history(&self, target: &[f64], history: &[HistoryEntry], k: i64) -> Result<f64> {
        let neighbours = self.nearest(target, history, k)?;

        let (numerator, denominator) = neighbours
            .iter()
            .fold((0.0, 0.0), |(num, den), &(_, similarity, rating)| {
                (num + similarity * rating, den + similarity)
            });

        if denominator == 0.0 {
            return Err(RecommendError::DivisionByZero(
                "similarities of the nearest movies sum to zero".to_string(),
            ));
        }
        Ok(numerator / denominator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_store() -> DataStore {
        DataStore::load_from_str(
            "A 1 0 0\nB 1 1 0\nC 0 1 0\nD 0 0 1\nE 1 1 1\n",
            "A B C D E\n\
             u1 5 NA 1 NA NA\n\
             u2 4 2 NA NA NA\n\
             u3 NA NA NA NA NA\n",
        )
        .unwrap()
    }

    #[test]
    fn test_neighbours_sorted_by_similarity() {
        let store = create_test_store();
        let cf = CollaborativePredictor::new(&store);

        // Target E = [1,1,1]: A and C are equally similar, A comes first
        let neighbours = cf.neighbours("E", "u1", 2).unwrap();
        let names: Vec<_> = neighbours.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
        assert_eq!(neighbours[0].score, neighbours[1].score);

        // Target B = [1,1,0] is closer to B itself than to A
        let neighbours = cf.neighbours("B", "u2", 2).unwrap();
        assert_eq!(neighbours[0].name, "B");
        assert!((neighbours[0].score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_predict_weighted_average() {
        let store = create_test_store();
        let cf = CollaborativePredictor::new(&store);

        // B is equally similar to A and C: plain average of 5 and 1
        let score = cf.predict("B", "u1", 2).unwrap();
        assert!((score - 3.0).abs() < 1e-12);

        // With k = 1 only the first of the tied neighbours counts
        let score = cf.predict("B", "u1", 1).unwrap();
        assert!((score - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_predict_invalid_k() {
        let store = create_test_store();
        let cf = CollaborativePredictor::new(&store);

        let err = cf.predict("B", "u1", 3).unwrap_err();
        assert!(matches!(err, RecommendError::InvalidK { k: 3, history: 2 }));

        let err = cf.predict("B", "u1", 0).unwrap_err();
        assert!(matches!(err, RecommendError::InvalidK { k: 0, .. }));

        // Negative k reports the real history size
        let err = cf.predict("B", "u1", -1).unwrap_err();
        assert!(matches!(err, RecommendError::InvalidK { k: -1, history: 2 }));

        // No history at all
        let err = cf.predict("B", "u3", 1).unwrap_err();
        assert!(matches!(err, RecommendError::InvalidK { history: 0, .. }));
    }

    #[test]
    fn test_names_checked_before_k() {
        let store = create_test_store();
        let cf = CollaborativePredictor::new(&store);

        assert!(matches!(
            cf.predict("A", "nobody", -1).unwrap_err(),
            RecommendError::InvalidUser { .. }
        ));
        assert!(matches!(
            cf.predict("Z", "u1", 0).unwrap_err(),
            RecommendError::InvalidMovie { .. }
        ));
        assert!(matches!(
            cf.recommend("nobody", -1).unwrap_err(),
            RecommendError::InvalidUser { .. }
        ));
    }

    #[test]
    fn test_predict_zero_similarity() {
        let store = create_test_store();
        let cf = CollaborativePredictor::new(&store);

        // D is orthogonal to everything u1 rated
        let err = cf.predict("D", "u1", 2).unwrap_err();
        assert!(matches!(err, RecommendError::DivisionByZero(_)));
    }

    #[test]
    fn test_predict_unknown_names() {
        let store = create_test_store();
        let cf = CollaborativePredictor::new(&store);

        assert!(matches!(
            cf.predict("Z", "u1", 1).unwrap_err(),
            RecommendError::InvalidMovie { .. }
        ));
        assert!(matches!(
            cf.predict("A", "nobody", 1).unwrap_err(),
            RecommendError::InvalidUser { .. }
        ));
    }

    #[test]
    fn test_predict_is_repeatable() {
        let store = create_test_store();
        let cf = CollaborativePredictor::new(&store);

        let first = cf.predict("E", "u2", 2).unwrap();
        for _ in 0..10 {
            assert_eq!(cf.predict("E", "u2", 2).unwrap(), first);
        }
    }

    #[test]
    fn test_recommend_picks_highest_prediction() {
        let store = DataStore::load_from_str(
            "A 1 0\nB 0 1\nC 1 0.1\nD 0.1 1\n",
            "A B C D\nu 5 1 NA NA\n",
        )
        .unwrap();
        let cf = CollaborativePredictor::new(&store);

        let ranked = cf.rank("u", 2).unwrap();
        assert_eq!(ranked.len(), 2);
        assert!(ranked[0].score > ranked[1].score);
        assert_eq!(cf.recommend("u", 2).unwrap(), Some("C".to_string()));
    }

    #[test]
    fn test_recommend_tie_goes_to_first_in_order() {
        // X and Y share attributes, so their predictions are identical
        let store = DataStore::load_from_str(
            "A 1 0\nB 0 1\nX 1 1\nY 1 1\n",
            "A B Y X\nu 5 1 NA NA\n",
        )
        .unwrap();
        let cf = CollaborativePredictor::new(&store);

        let ranked = cf.rank("u", 2).unwrap();
        assert_eq!(ranked[0].score, ranked[1].score);

        // Y comes first in the column order
        assert_eq!(cf.recommend("u", 2).unwrap(), Some("Y".to_string()));
    }

    #[test]
    fn test_rating_column_without_movie() {
        let mut store = DataStore::new();
        store.insert_movie("A", vec![1.0, 0.0]);
        store.set_movie_order(vec!["A".to_string()]).unwrap();
        store.insert_user("u", vec![Some(4.0), None]);
        let cf = CollaborativePredictor::new(&store);

        let err = cf.recommend("u", 1).unwrap_err();
        assert!(matches!(err, RecommendError::UnknownColumn { index: 1 }));
    }

    #[test]
    fn test_recommend_propagates_failures() {
        let store = create_test_store();
        let cf = CollaborativePredictor::new(&store);

        // D cannot be predicted for u1, so the whole query fails
        let err = cf.recommend("u1", 2).unwrap_err();
        assert!(matches!(err, RecommendError::DivisionByZero(_)));

        let err = cf.recommend("u1", 5).unwrap_err();
        assert!(matches!(err, RecommendError::InvalidK { .. }));
    }
}
