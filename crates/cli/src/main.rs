use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use recommender::{ContentMatch, Recommender, ScoredMovie, score_or_sentinel};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

mod replay;

/// movie-recs - content-based and collaborative movie recommendations
#[derive(Parser)]
#[command(name = "movie-recs")]
#[command(about = "Movie recommendations from attribute vectors and user ratings", long_about = None)]
struct Cli {
    /// Movie attributes file: `<movie> <attr_1> ... <attr_d>` per line
    #[arg(short, long, default_value = "data/movies.txt")]
    movies: PathBuf,

    /// User ratings file: header of movie names, then `<user> <rating|NA> ...` rows
    #[arg(short, long, default_value = "data/ranks.txt")]
    ratings: PathBuf,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend the unrated movie closest to the user's taste
    ByContent {
        /// User name
        #[arg(long)]
        user: String,

        /// Show the similarity of every candidate
        #[arg(long)]
        explain: bool,
    },

    /// Predict a user's rating for a movie from its k nearest rated movies
    Predict {
        /// Movie name
        #[arg(long)]
        movie: String,

        /// User name
        #[arg(long)]
        user: String,

        /// Number of neighbours
        #[arg(short, long)]
        k: i64,
    },

    /// Recommend the unrated movie with the highest predicted rating
    BestPredict {
        /// User name
        #[arg(long)]
        user: String,

        /// Number of neighbours
        #[arg(short, long)]
        k: i64,

        /// Show the prediction for every candidate
        #[arg(long)]
        explain: bool,
    },

    /// Replay an instruction file (`predicc`, `best_predicc`, `by_content`)
    Replay {
        /// Instruction file, one operation per line
        instructions: PathBuf,

        /// Where to write the results
        #[arg(short, long, default_value = "test_out.txt")]
        output: PathBuf,
    },
}

/// JSON shape of a single query result
#[derive(Serialize)]
struct QueryOutput<'a, T: Serialize> {
    query: &'a str,
    user: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    movie: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    k: Option<i64>,
    result: T,
}

fn main() -> Result<()> {
    // Initialize tracing; stay quiet unless RUST_LOG asks for more
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let start = Instant::now();
    let rec = Recommender::load(&cli.movies, &cli.ratings).with_context(|| {
        format!(
            "Failed to load {} and {}",
            cli.movies.display(),
            cli.ratings.display()
        )
    })?;
    info!(elapsed = ?start.elapsed(), "Data loaded");

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::ByContent { user, explain } => handle_by_content(&rec, &user, explain, cli.json)?,
        Commands::Predict { movie, user, k } => handle_predict(&rec, &movie, &user, k, cli.json)?,
        Commands::BestPredict { user, k, explain } => {
            handle_best_predict(&rec, &user, k, explain, cli.json)?
        }
        Commands::Replay {
            instructions,
            output,
        } => handle_replay(&rec, &instructions, &output)?,
    }

    Ok(())
}

/// Handle the 'by-content' command
fn handle_by_content(rec: &Recommender, user: &str, explain: bool, json: bool) -> Result<()> {
    let result = rec.recommend_by_content(user);

    if json {
        return print_json(&QueryOutput {
            query: "by_content",
            user,
            movie: None,
            k: None,
            result,
        });
    }

    println!("{}", result.bold().green());
    if explain && let Ok(matches) = rec.content().rank(user) {
        print_content_matches(&matches);
    }
    Ok(())
}

/// Handle the 'predict' command
fn handle_predict(rec: &Recommender, movie: &str, user: &str, k: i64, json: bool) -> Result<()> {
    let prediction = rec.try_predict(movie, user, k);
    let result = score_or_sentinel(&prediction);

    if json {
        // JSON has no NaN; an undefined prediction is null
        return print_json(&QueryOutput {
            query: "predicc",
            user,
            movie: Some(movie),
            k: Some(k),
            result: result.is_finite().then_some(result),
        });
    }

    println!("{}", result.to_string().bold().green());
    if let Err(e) = prediction {
        eprintln!("{} {}", "•".yellow(), e);
    }
    Ok(())
}

/// Handle the 'best-predict' command
fn handle_best_predict(
    rec: &Recommender,
    user: &str,
    k: i64,
    explain: bool,
    json: bool,
) -> Result<()> {
    let result = rec.recommend_by_cf(user, k);

    if json {
        return print_json(&QueryOutput {
            query: "best_predicc",
            user,
            movie: None,
            k: Some(k),
            result,
        });
    }

    println!("{}", result.bold().green());
    if explain
        && let Ok(scored) = rec.collaborative().rank(user, k)
    {
        print_predictions(&scored);
    }
    Ok(())
}

/// Handle the 'replay' command
fn handle_replay(rec: &Recommender, instructions: &Path, output: &Path) -> Result<()> {
    let operations = replay::load_operations(instructions)?;

    let file = File::create(output)
        .with_context(|| format!("Unable to create output file {}", output.display()))?;
    let mut out = BufWriter::new(file);
    replay::run(rec, &operations, &mut out)?;
    out.flush()?;

    println!(
        "{} Replayed {} operations into {}",
        "✓".green(),
        operations.len(),
        output.display()
    );
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Helper function to print content candidates, best first
fn print_content_matches(matches: &[ContentMatch]) {
    let mut sorted: Vec<&ContentMatch> = matches.iter().collect();
    sorted.sort_by(|a, b| {
        let a = a.similarity.unwrap_or(f64::NEG_INFINITY);
        let b = b.similarity.unwrap_or(f64::NEG_INFINITY);
        b.total_cmp(&a)
    });

    println!("{}", "Candidates:".bold().blue());
    for (rank, candidate) in sorted.iter().enumerate() {
        let similarity = candidate
            .similarity
            .map(|s| format!("{s:.4}"))
            .unwrap_or_else(|| "undefined".to_string());
        println!(
            "{}. {} - similarity: {}",
            (rank + 1).to_string().green(),
            candidate.name,
            similarity
        );
    }
}

/// Helper function to print collaborative predictions, best first
fn print_predictions(scored: &[ScoredMovie]) {
    let mut sorted: Vec<&ScoredMovie> = scored.iter().collect();
    sorted.sort_by(|a, b| b.score.total_cmp(&a.score));

    println!("{}", "Predicted ratings:".bold().blue());
    for (rank, movie) in sorted.iter().enumerate() {
        println!(
            "{}. {} - predicted: {:.3}",
            (rank + 1).to_string().green(),
            movie.name,
            movie.score
        );
    }
}
