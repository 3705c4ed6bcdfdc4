
use std::cmp::Ordering;

use crate::index::IndexedFragment;
use crate::{EngineError, Result};

/// A fragment paired with its similarity score for one query.
#[derive(Debug, Clone)]
pub struct RankedFragment<'a> {
    pub fragment: &'a IndexedFragment,
    pub score: f32,
}

/// Cosine similarity `dot(a,b) / (‖a‖·‖b‖)`.
///
/// Vectors of different lengths come from different embedding strategies
/// and are never comparable; that is surfaced as an error rather than
/// coerced into a meaningless score. A zero-magnitude vector on either
/// side scores `0.0`.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(EngineError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denominator = norm_a.sqrt() * norm_b.sqrt();
    if denominator == 0.0 {
        return Ok(0.0);
    }
    Ok(dot / denominator)
}

/// Score every fragment against the query vector and return the top `k`,
/// highest first. Ties keep insertion order (stable sort). An empty
/// collection ranks to an empty result; `k` larger than the collection
/// returns everything.
#[inline]
pub fn rank<'a>(
    query: &[f32],
    fragments: &'a [IndexedFragment],
    k: usize,
) -> Result<Vec<RankedFragment<'a>>> {
    let mut ranked = Vec::with_capacity(fragments.len());
    for fragment in fragments {
        let score = cosine_similarity(query, &fragment.vector)?;
        ranked.push(RankedFragment { fragment, score });
    }

    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
    });
    ranked.truncate(k);
    Ok(ranked)
}
