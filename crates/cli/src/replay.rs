//! Replaying an instruction file against a loaded recommender.
//!
//! Each non-empty line is one operation:
//! - `predicc <movie> <user> <k>`
//! - `best_predicc <user> <k>`
//! - `by_content <user>`
//!
//! Every operation writes the instruction, its result and a blank line.

use anyhow::{Context, Result, anyhow, bail};
use recommender::Recommender;
use std::fmt;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// One line of an instruction file
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Predict { movie: String, user: String, k: i64 },
    BestPredict { user: String, k: i64 },
    ByContent { user: String },
}

impl Operation {
    /// Run the operation and render its result line
    pub fn execute(&self, rec: &Recommender) -> String {
        match self {
            Operation::Predict { movie, user, k } => {
                format_score(rec.predict_movie_score_for_user(movie, user, *k))
            }
            Operation::BestPredict { user, k } => rec.recommend_by_cf(user, *k),
            Operation::ByContent { user } => rec.recommend_by_content(user),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Predict { movie, user, k } => write!(f, "predicc {movie} {user} {k}"),
            Operation::BestPredict { user, k } => write!(f, "best_predicc {user} {k}"),
            Operation::ByContent { user } => write!(f, "by_content {user}"),
        }
    }
}

/// Render a score with six significant digits, trailing zeros dropped
/// (`3.33333`, `8`, `-1`, `nan`, `1.5e+07`)
pub fn format_score(score: f64) -> String {
    if score.is_nan() {
        return "nan".to_string();
    }
    if score.is_infinite() {
        return if score > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    // Round to six significant digits first so the exponent accounts for carries
    let scientific = format!("{score:.5e}");
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if (-4..6).contains(&exponent) {
        let decimals = usize::try_from(5 - exponent).unwrap_or(0);
        trim_zeros(&format!("{score:.decimals$}")).to_string()
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", trim_zeros(mantissa), exponent.abs())
    }
}

fn trim_zeros(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

/// Parse a single instruction line
pub fn parse_operation(line: &str) -> Result<Operation> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let parse_k = |token: &str| {
        token
            .parse::<i64>()
            .with_context(|| format!("Invalid k: {token}"))
    };

    match tokens.as_slice() {
        ["predicc", movie, user, k] => Ok(Operation::Predict {
            movie: movie.to_string(),
            user: user.to_string(),
            k: parse_k(*k)?,
        }),
        ["best_predicc", user, k] => Ok(Operation::BestPredict {
            user: user.to_string(),
            k: parse_k(*k)?,
        }),
        ["by_content", user] => Ok(Operation::ByContent {
            user: user.to_string(),
        }),
        [command, ..] => bail!("Unknown command or wrong argument count: {command}"),
        [] => Err(anyhow!("Empty instruction")),
    }
}

/// Parse a whole instruction file, skipping blank lines
pub fn parse_operations(content: &str) -> Result<Vec<Operation>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            parse_operation(line).with_context(|| format!("Instruction line {}", idx + 1))
        })
        .collect()
}

/// Read and parse an instruction file
pub fn load_operations(path: &Path) -> Result<Vec<Operation>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Unable to open file {}", path.display()))?;
    parse_operations(&content)
}

/// Run every operation, writing one block per operation to `out`
pub fn run(rec: &Recommender, operations: &[Operation], out: &mut impl Write) -> Result<()> {
    for op in operations {
        let result = op.execute(rec);
        debug!(%op, %result, "Replayed operation");
        writeln!(out, "{op}")?;
        writeln!(out, "{result}")?;
        writeln!(out)?;
    }
    Ok(())
}
