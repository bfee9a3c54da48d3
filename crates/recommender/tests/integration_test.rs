//! Integration tests for the recommender.
//!
//! These load real files from disk and drive the public query surface the
//! way a harness does.

use recommender::{INVALID_USER, NOT_FOUND, RecommendError, Recommender};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

fn write_temp(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn load(movies: &str, ratings: &str) -> Recommender {
    let movies = write_temp(movies);
    let ratings = write_temp(ratings);
    Recommender::load(movies.path(), ratings.path()).unwrap()
}

const MOVIES: &str = "\
Titanic 7 2 9 1
Twilight 3 1 8 2
Batman 2 9 1 8
StarWars 1 8 3 9
Amelie 6 1 7 1
Matrix 2 7 2 9
";

const RATINGS: &str = "\
Titanic Twilight Batman StarWars Amelie Matrix
Sofia 8 NA 2 NA NA 3
Michael 2 1 9 NA 3 NA
Nicole NA 9 NA 2 8 NA
Arik NA NA NA NA NA NA
";

#[test]
fn test_two_movie_scenario() {
    let rec = load("A 1 0\nB 0 1\n", "A B\nu1 5 NA\n");

    // B is the only unrated movie
    assert_eq!(rec.recommend_by_content("u1"), "B");

    // A and B are orthogonal, so the weighted average is undefined
    assert!(rec.predict_movie_score_for_user("B", "u1", 1).is_nan());
    assert!(matches!(
        rec.try_predict("B", "u1", 1).unwrap_err(),
        RecommendError::DivisionByZero(_)
    ));
}

#[test]
fn test_single_neighbour_prediction() {
    let rec = load("A 1 0\nB 1 2\n", "A B\nu1 5 NA\n");

    let score = rec.predict_movie_score_for_user("B", "u1", 1);
    assert!((score - 5.0).abs() < 1e-9);
}

#[test]
fn test_recommendations_skip_rated_movies() {
    let rec = load(MOVIES, RATINGS);
    let store = rec.store();

    for user in ["Sofia", "Michael", "Nicole"] {
        let ratings = store.get_user(user).unwrap();

        let by_content = rec.recommend_by_content(user);
        let idx = store.movie_index(&by_content).unwrap();
        assert!(!ratings.is_rated(idx), "{user} already rated {by_content}");

        let by_cf = rec.recommend_by_cf(user, 2);
        let idx = store.movie_index(&by_cf).unwrap();
        assert!(!ratings.is_rated(idx), "{user} already rated {by_cf}");
    }
}

#[test]
fn test_content_matches_taste() {
    let rec = load(MOVIES, RATINGS);

    // Sofia loves Titanic and dislikes the action titles
    assert_eq!(rec.recommend_by_content("Sofia"), "Amelie");
    // Michael loves Batman; Matrix leans further towards it than StarWars
    assert_eq!(rec.recommend_by_content("Michael"), "Matrix");
}

#[test]
fn test_cf_matches_taste() {
    let rec = load(MOVIES, RATINGS);

    assert_eq!(rec.recommend_by_cf("Sofia", 2), "Amelie");
    assert_eq!(rec.recommend_by_cf("Michael", 3), "Matrix");
    assert_eq!(rec.recommend_by_cf("Nicole", 2), "Titanic");
}

#[test]
fn test_prediction_bounded_by_neighbour_ratings() {
    let rec = load(MOVIES, RATINGS);

    // All attribute values are positive, so every similarity is positive and
    // the prediction is a convex combination of the user's ratings.
    for k in 1..=3 {
        let score = rec.predict_movie_score_for_user("Amelie", "Sofia", k);
        assert!((2.0..=8.0).contains(&score), "k={k} score={score}");
    }
}

#[test]
fn test_full_history_prediction_is_stable() {
    let rec = load(MOVIES, RATINGS);
    let history = rec.store().get_user("Michael").unwrap().rated_count() as i64;

    let first = rec.predict_movie_score_for_user("Matrix", "Michael", history);
    let second = rec.predict_movie_score_for_user("Matrix", "Michael", history);
    assert_eq!(first, second);
}

#[test]
fn test_user_without_ratings() {
    let rec = load(MOVIES, RATINGS);

    // No history: content falls back to the first unrated movie and CF has no k
    assert_eq!(rec.recommend_by_content("Arik"), "Titanic");
    assert_eq!(rec.recommend_by_cf("Arik", 1), "");
    assert!(rec.predict_movie_score_for_user("Titanic", "Arik", 1).is_nan());
}

#[test]
fn test_unknown_names() {
    let rec = load(MOVIES, RATINGS);

    assert_eq!(rec.recommend_by_content("Nobody"), INVALID_USER);
    assert_eq!(rec.recommend_by_cf("Nobody", 1), INVALID_USER);
    assert_eq!(rec.predict_movie_score_for_user("Titanic", "Nobody", 1), NOT_FOUND);
    assert_eq!(rec.predict_movie_score_for_user("Psycho", "Sofia", 1), NOT_FOUND);
}

#[test]
fn test_load_failure_is_reported() {
    let movies = write_temp(MOVIES);
    let err = Recommender::load(movies.path(), Path::new("/missing/ranks.txt")).unwrap_err();
    assert!(matches!(err, RecommendError::Load(_)));
    assert!(err.to_string().contains("ranks.txt"));
}
