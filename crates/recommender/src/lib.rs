//! # Recommender Crate
//!
//! Movie recommendations over a loaded [`data_loader::DataStore`].
//!
//! ## Components
//!
//! ### Content recommender
//! Builds a preference vector from the user's mean-centered ratings and
//! recommends the unrated movie whose attributes are most cosine-similar to it.
//!
//! ### Collaborative predictor
//! Predicts a rating for a movie as the similarity-weighted average of the
//! user's ratings on the `k` most similar movies they rated, and recommends the
//! unrated movie with the highest prediction.
//!
//! ## Example Usage
//!
//! ```ignore
//! use recommender::Recommender;
//! use std::path::Path;
//!
//! let rec = Recommender::load(Path::new("data/movies.txt"), Path::new("data/ranks.txt"))?;
//!
//! println!("{}", rec.recommend_by_content("Sofia"));
//! println!("{}", rec.predict_movie_score_for_user("Titanic", "Sofia", 2));
//! println!("{}", rec.recommend_by_cf("Sofia", 2));
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod similarity;
pub mod content;
pub mod collaborative;
pub mod recommender;

// Re-export commonly used types
pub use collaborative::CollaborativePredictor;
pub use data_loader::{DataLoadError, DataStore};
pub use content::ContentRecommender;
pub use error::{RecommendError, Result};
pub use recommender::{score_or_sentinel, Recommender, INVALID_USER, NOT_FOUND};
pub use types::{ContentMatch, ScoredMovie};
