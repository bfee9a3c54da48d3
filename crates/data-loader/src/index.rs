//! Building a `DataStore` from the parsed input files.
//!
//! Loading is all-or-nothing: both files are parsed into temporaries, the
//! store is assembled from them and validated, and only a store that passed
//! validation is handed back.

use crate::error::{DataLoadError, Result};
use crate::parser::{self, ParsedRatings};
use crate::types::*;
use std::path::Path;
use tracing::{debug, info};

impl DataStore {
    /// Load the movie catalog and the rating table.
    ///
    /// Steps:
    /// 1. Parse both files (in parallel)
    /// 2. Insert movies, then the rating header and rows
    /// 3. Validate the cross-file invariants
    pub fn load(movies_path: &Path, ratings_path: &Path) -> Result<Self> {
        debug!(?movies_path, ?ratings_path, "Loading recommendation data");

        let (movies, ratings) = rayon::join(
            || parser::parse_movies(movies_path),
            || parser::parse_ratings(ratings_path),
        );
        let movies = movies?;
        let ratings = ratings?;

        let store = Self::from_parsed(movies, ratings)?;

        let (users, movies) = store.counts();
        info!(
            users,
            movies,
            dimension = store.dimension().unwrap_or(0),
            "Recommendation data loaded"
        );
        Ok(store)
    }

    /// Load from text already in memory, with the same checks as [`DataStore::load`]
    pub fn load_from_str(movies: &str, ratings: &str) -> Result<Self> {
        let movies = parser::parse_movies_str(movies, "movies")?;
        let ratings = parser::parse_ratings_str(ratings, "ratings")?;
        Self::from_parsed(movies, ratings)
    }

    /// Assemble and validate a store from parsed records
    pub fn from_parsed(
        movies: Vec<(MovieName, AttributeVector)>,
        ratings: ParsedRatings,
    ) -> Result<Self> {
        let mut store = DataStore::new();

        for (name, attributes) in movies {
            if store.movies.contains_key(&name) {
                return Err(DataLoadError::Duplicate {
                    entity: "movie".to_string(),
                    name,
                });
            }
            store.insert_movie(name, attributes);
        }

        store.set_movie_order(ratings.movie_order)?;

        for (name, user_ratings) in ratings.users {
            if store.users.contains_key(&name) {
                return Err(DataLoadError::Duplicate {
                    entity: "user".to_string(),
                    name,
                });
            }
            store.insert_user(name, user_ratings);
        }

        store.validate()?;
        Ok(store)
    }

    /// Validate data integrity
    ///
    /// Check that:
    /// - every movie shares one attribute dimension
    /// - every movie in the rating header has attributes
    /// - every rating vector has one slot per header column
    pub fn validate(&self) -> Result<()> {
        if let Some(expected) = self.dimension() {
            for (name, attributes) in &self.movies {
                if attributes.len() != expected {
                    return Err(DataLoadError::DimensionMismatch {
                        movie: name.clone(),
                        expected,
                        found: attributes.len(),
                    });
                }
            }
        }

        for name in &self.movie_order {
            if !self.movies.contains_key(name) {
                return Err(DataLoadError::MissingReference {
                    entity: "Movie".to_string(),
                    name: name.clone(),
                });
            }
        }

        for (name, ratings) in &self.users {
            if ratings.len() != self.movie_order.len() {
                return Err(DataLoadError::FieldCountMismatch {
                    file: format!("user {name}"),
                    expected: self.movie_order.len(),
                    found: ratings.len(),
                    line: 0,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_from_files() {
        let movies = write_temp("A 1 0\nB 0 1\nC 1 1\n");
        let ratings = write_temp("A B C\nu1 5 NA 2\nu2 NA 4 NA\n");

        let store = DataStore::load(movies.path(), ratings.path()).unwrap();
        assert_eq!(store.counts(), (2, 3));
        assert_eq!(store.dimension(), Some(2));
        assert_eq!(store.movie_order(), ["A", "B", "C"]);
        assert_eq!(store.movie_index("C"), Some(2));
        assert_eq!(store.get_user("u1").unwrap().rated_count(), 2);
        assert_eq!(store.get_movie("C"), Some(&vec![1.0, 1.0]));
    }

    #[test]
    fn test_load_missing_file() {
        let movies = write_temp("A 1 0\n");
        let err = DataStore::load(movies.path(), Path::new("/no/such/ranks.txt")).unwrap_err();
        match err {
            DataLoadError::FileNotFound { path } => assert!(path.contains("ranks.txt")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = DataStore::load_from_str("A 1 0\nB 1\n", "A B\nu1 1 2\n").unwrap_err();
        assert!(matches!(err, DataLoadError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_header_movie_without_attributes() {
        let err = DataStore::load_from_str("A 1 0\n", "A Z\nu1 1 2\n").unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::MissingReference { ref name, .. } if name == "Z"
        ));
    }

    #[test]
    fn test_duplicates_rejected() {
        let err = DataStore::load_from_str("A 1 0\nA 0 1\n", "A\nu1 1\n").unwrap_err();
        assert!(matches!(err, DataLoadError::Duplicate { .. }));

        let err = DataStore::load_from_str("A 1 0\n", "A\nu1 1\nu1 2\n").unwrap_err();
        assert!(matches!(err, DataLoadError::Duplicate { .. }));

        let err = DataStore::load_from_str("A 1 0\n", "A A\nu1 1 2\n").unwrap_err();
        assert!(matches!(err, DataLoadError::Duplicate { .. }));
    }

    #[test]
    fn test_catalog_may_hold_unrated_columns() {
        // Movies absent from the header are kept in the catalog
        let store = DataStore::load_from_str("A 1 0\nB 0 1\n", "A\nu1 3\n").unwrap();
        assert_eq!(store.counts(), (1, 2));
        assert!(store.contains_movie("B"));
        assert_eq!(store.movie_index("B"), None);
    }

    #[test]
    fn test_validate_hand_built_store() {
        let mut store = DataStore::new();
        store.insert_movie("A", vec![1.0, 0.0]);
        store.set_movie_order(vec!["A".to_string()]).unwrap();
        store.insert_user("u1", vec![Some(4.0), None]);

        let err = store.validate().unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::FieldCountMismatch { expected: 1, found: 2, .. }
        ));
    }
}
