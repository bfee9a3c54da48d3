//! Parsers for the two whitespace-delimited input files.
//!
//! - movie attributes: `<movieName> <attr_1> ... <attr_d>`
//! - user ratings: a header `<movie_1> ... <movie_n>` followed by rows
//!   `<userName> <rating_1> ... <rating_n>`, where a rating is a number or `NA`
//!
//! Each file has a `parse_*` entry point that reads from disk and a
//! `parse_*_str` twin that works on text already in memory.

use crate::error::{DataLoadError, Result};
use crate::types::{AttributeVector, MovieName, RatingVector, UserName};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Token marking an unrated movie in the ratings file
pub const NOT_RATED: &str = "NA";

/// Parsed ratings file, before it is checked against the catalog
#[derive(Debug, Clone, Default)]
pub struct ParsedRatings {
    /// Header line, the column order of every row
    pub movie_order: Vec<MovieName>,
    /// Rows in file order
    pub users: Vec<(UserName, RatingVector)>,
}

/// Read a whole file, mapping an open failure to `FileNotFound`
fn read_file(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|_| DataLoadError::FileNotFound {
        path: path.display().to_string(),
    })?;
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(content)
}

/// Label used in error messages for a file
fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Parse the movie attributes file
pub fn parse_movies(path: &Path) -> Result<Vec<(MovieName, AttributeVector)>> {
    let content = read_file(path)?;
    parse_movies_str(&content, &file_label(path))
}

/// Parse movie attribute lines held in memory.
///
/// `file` only names the source in error messages.
pub fn parse_movies_str(content: &str, file: &str) -> Result<Vec<(MovieName, AttributeVector)>> {
    let mut movies = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let mut tokens = line.split_whitespace();

        let name = tokens.next().ok_or_else(|| DataLoadError::MalformedLine {
            file: file.to_string(),
            line: line_no,
            reason: "Missing movie name".to_string(),
        })?;

        let attributes = tokens
            .map(|token| parse_number(token, file, line_no, "attribute"))
            .collect::<Result<AttributeVector>>()?;

        movies.push((name.to_string(), attributes));
    }

    Ok(movies)
}

/// Parse the user ratings file
pub fn parse_ratings(path: &Path) -> Result<ParsedRatings> {
    let content = read_file(path)?;
    parse_ratings_str(&content, &file_label(path))
}

/// Parse a ratings table held in memory.
///
/// The first line is the header; every later line is a user row that must
/// carry exactly one token per header column.
pub fn parse_ratings_str(content: &str, file: &str) -> Result<ParsedRatings> {
    let mut lines = content.lines().enumerate();

    let movie_order: Vec<MovieName> = match lines.next() {
        Some((_, header)) => header.split_whitespace().map(str::to_string).collect(),
        None => Vec::new(),
    };
    if movie_order.is_empty() {
        return Err(DataLoadError::MalformedLine {
            file: file.to_string(),
            line: 1,
            reason: "Missing movie header".to_string(),
        });
    }

    let mut users = Vec::new();
    for (idx, line) in lines {
        let line_no = idx + 1;
        let (name, ratings) = parse_rating_row(line, movie_order.len(), file, line_no)?;
        users.push((name, ratings));
    }

    Ok(ParsedRatings { movie_order, users })
}

fn parse_rating_row(
    line: &str,
    expected: usize,
    file: &str,
    line_no: usize,
) -> Result<(UserName, RatingVector)> {
    let mut tokens = line.split_whitespace();

    let name = tokens.next().ok_or_else(|| DataLoadError::MalformedLine {
        file: file.to_string(),
        line: line_no,
        reason: "Missing user name".to_string(),
    })?;

    let ratings = tokens
        .map(|token| match token {
            NOT_RATED => Ok(None),
            _ => parse_number(token, file, line_no, "rating").map(Some),
        })
        .collect::<Result<Vec<Option<f64>>>>()?;

    if ratings.len() != expected {
        return Err(DataLoadError::FieldCountMismatch {
            file: file.to_string(),
            expected,
            found: ratings.len(),
            line: line_no,
        });
    }

    Ok((name.to_string(), RatingVector::new(ratings)))
}

/// Parse a finite floating point token
fn parse_number(token: &str, file: &str, line_no: usize, field: &str) -> Result<f64> {
    let invalid = || DataLoadError::InvalidValue {
        file: file.to_string(),
        line: line_no,
        field: field.to_string(),
        value: token.to_string(),
    };
    let value: f64 = token.parse().map_err(|_| invalid())?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(invalid())
    }
}
