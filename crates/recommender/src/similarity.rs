//! Vector math over attribute and preference vectors.

use crate::error::{RecommendError, Result};

/// Sum of elementwise products. Both slices must have the same length.
pub fn dot(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(RecommendError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(a.iter().zip(b).map(|(x, y)| x * y).sum())
}

/// Euclidean norm
pub fn norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Cosine of the angle between two vectors.
///
/// Undefined when either vector is all zeros; that case is reported as
/// `DivisionByZero` instead of letting a NaN leak into comparisons.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Result<f64> {
    let product = dot(a, b)?;
    let denominator = norm(a) * norm(b);
    if denominator == 0.0 {
        return Err(RecommendError::DivisionByZero(
            "cosine similarity of a zero vector".to_string(),
        ));
    }
    Ok(product / denominator)
}

/// `acc += scale * v`
pub fn scaled_add(acc: &mut [f64], scale: f64, v: &[f64]) -> Result<()> {
    if acc.len() != v.len() {
        return Err(RecommendError::DimensionMismatch {
            left: acc.len(),
            right: v.len(),
        });
    }
    for (a, x) in acc.iter_mut().zip(v) {
        *a += scale * x;
    }
    Ok(())
}
