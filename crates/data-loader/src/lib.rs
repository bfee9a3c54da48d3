//! # Data Loader Crate
//!
//! This crate loads the movie attribute catalog and the user rating table
//! into a read-only [`DataStore`].
//!
//! ## Main Components
//!
//! - **types**: Core domain types (RatingVector, DataStore)
//! - **parser**: Parse the two whitespace-delimited input files
//! - **index**: Assemble and validate a DataStore
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::DataStore;
//! use std::path::Path;
//!
//! let store = DataStore::load(Path::new("data/movies.txt"), Path::new("data/ranks.txt"))?;
//!
//! let attributes = store.get_movie("Titanic").unwrap();
//! let ratings = store.get_user("Sofia").unwrap();
//!
//! println!("Sofia rated {} movies", ratings.rated_count());
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod index;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use parser::NOT_RATED;
pub use types::{
    // Type aliases
    AttributeVector,
    MovieName,
    UserName,
    // Core types
    DataStore,
    RatingVector,
};
