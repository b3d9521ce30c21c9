//! Side-by-side explanation of two style vectors
//!
//! Shows which interpretable features separate two pages, so a similarity
//! score can be traced back to concrete design differences.

use ordered_float::OrderedFloat;
use serde::Serialize;
use std::fmt;
use stylevec_core::{Error, Result};

use crate::assemble::StyleVector;

/// Below this absolute difference two pages look the same on a feature
pub const TOO_CLOSE_DELTA: f64 = 0.05;
/// Below this they are similar, above it distinct
pub const SIMILAR_DELTA: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    TooClose,
    Similar,
    Distinct,
}

impl Verdict {
    pub fn from_delta(delta: f64) -> Self {
        let delta = delta.abs();
        if delta < TOO_CLOSE_DELTA {
            Verdict::TooClose
        } else if delta < SIMILAR_DELTA {
            Verdict::Similar
        } else {
            Verdict::Distinct
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Verdict::TooClose => "too close",
            Verdict::Similar => "similar",
            Verdict::Distinct => "distinct",
        })
    }
}

/// One feature compared across the two vectors
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureDelta {
    pub name: String,
    pub left: f64,
    pub right: f64,
    /// `right - left`
    pub delta: f64,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, Serialize)]
pub struct VectorComparison {
    /// Cosine similarity of the full combined vectors
    pub combined_similarity: f32,
    /// Cosine similarity of the interpretable blocks only
    pub interpretable_similarity: f32,
    pub deltas: Vec<FeatureDelta>,
}

impl VectorComparison {
    /// Features with the largest absolute difference; ties keep feature order
    pub fn top_differentiators(&self, n: usize) -> Vec<&FeatureDelta> {
        let mut ranked: Vec<&FeatureDelta> = self.deltas.iter().collect();
        ranked.sort_by_key(|d| std::cmp::Reverse(OrderedFloat(d.delta.abs())));
        ranked.truncate(n);
        ranked
    }

    pub fn count(&self, verdict: Verdict) -> usize {
        self.deltas.iter().filter(|d| d.verdict == verdict).count()
    }
}

/// Compare two vectors of the same kind and feature schema
pub fn compare_vectors(left: &StyleVector, right: &StyleVector) -> Result<VectorComparison> {
    if left.kind() != right.kind() || left.interpretable.names() != right.interpretable.names() {
        return Err(Error::SchemaMismatch {
            kind: format!("{} vs {}", left.kind(), right.kind()),
            expected: left.interpretable.len(),
            actual: right.interpretable.len(),
            breakdown: "feature schemas differ".to_string(),
        });
    }
    if left.combined.dim() != right.combined.dim() {
        return Err(Error::InvalidDimension {
            expected: left.combined.dim(),
            actual: right.combined.dim(),
        });
    }

    let deltas = left
        .interpretable
        .iter()
        .zip(right.interpretable.values())
        .map(|((name, l), r)| {
            let delta = r - l;
            FeatureDelta {
                name: name.to_string(),
                left: l,
                right: *r,
                delta,
                verdict: Verdict::from_delta(delta),
            }
        })
        .collect();

    Ok(VectorComparison {
        combined_similarity: left.combined.cosine_similarity(&right.combined),
        interpretable_similarity: left
            .interpretable
            .to_vector()
            .cosine_similarity(&right.interpretable.to_vector()),
        deltas,
    })
}
