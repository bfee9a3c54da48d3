use data_loader::DataStore;
use std::env;
use std::path::PathBuf;
use std::time::Instant;

fn main() {
    let mut args = env::args().skip(1);
    let movies = args.next().map(PathBuf::from).unwrap_or_else(|| "data/movies.txt".into());
    let ratings = args.next().map(PathBuf::from).unwrap_or_else(|| "data/ranks.txt".into());

    println!("Loading {} and {}...\n", movies.display(), ratings.display());

    let start = Instant::now();
    let store = DataStore::load(&movies, &ratings)
        .expect("Failed to load data");
    let elapsed = start.elapsed();

    let (users, movie_count) = store.counts();

    println!("=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Users: {}", users);
    println!("Movies: {}", movie_count);
    println!("Attribute dimension: {}", store.dimension().unwrap_or(0));
}
