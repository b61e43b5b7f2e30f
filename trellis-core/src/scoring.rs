//! Weighted multi-factor scoring
//!
//! One scoring formula shared by every pipeline stage. Each stage supplies
//! its own immutable [`WeightProfile`]; the formula, ranking, and filtering
//! behave identically whether the items are trends, ideas, or leads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::stage::StageItem;

/// Result type alias for scoring operations
pub type Result<T> = std::result::Result<T, ScoreError>;

/// Errors raised when scoring inputs are malformed
///
/// These are caller errors, rejected synchronously; nothing in this module
/// retries or recovers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    /// A factor value lies outside the normalized [0,1] range
    #[error("factor '{factor}' has value {value}, expected a value in [0,1]")]
    ValueOutOfRange { factor: String, value: f64 },

    /// A weight is negative
    #[error("factor '{factor}' has negative weight {weight}")]
    NegativeWeight { factor: String, weight: f64 },

    /// The factor and weight maps do not cover the same keys
    #[error("factor keys and weight keys differ")]
    KeyMismatch,

    /// Every weight is zero, so no weighted average exists
    #[error("weights sum to zero")]
    ZeroWeightSum,
}

/// Compute the weighted-average score of normalized factors, on a 0-100 scale
///
/// `score = 100 * (Σ w_f * v_f) / (Σ w_f)` — weights need not sum to any
/// particular total, so uniformly scaling all weights leaves the score
/// unchanged.
pub fn weighted_score(
    factors: &BTreeMap<String, f64>,
    weights: &BTreeMap<String, f64>,
) -> Result<f64> {
    if factors.len() != weights.len() || !factors.keys().eq(weights.keys()) {
        return Err(ScoreError::KeyMismatch);
    }

    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;

    for (factor, value) in factors {
        if !(0.0..=1.0).contains(value) || !value.is_finite() {
            return Err(ScoreError::ValueOutOfRange {
                factor: factor.clone(),
                value: *value,
            });
        }

        let weight = weights[factor];
        if weight < 0.0 || !weight.is_finite() {
            return Err(ScoreError::NegativeWeight {
                factor: factor.clone(),
                weight,
            });
        }

        weighted_sum += weight * value;
        weight_total += weight;
    }

    if weight_total == 0.0 {
        return Err(ScoreError::ZeroWeightSum);
    }

    Ok(100.0 * weighted_sum / weight_total)
}

/// A candidate item annotated with its computed score
///
/// The score is derived in [`ScoredItem::new`] and never set directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredItem {
    pub item: StageItem,
    pub factors: BTreeMap<String, f64>,
    pub weights: BTreeMap<String, f64>,
    pub score: f64,
}

impl ScoredItem {
    /// Score an item against a weight profile
    pub fn new(
        item: StageItem,
        factors: BTreeMap<String, f64>,
        weights: &WeightProfile,
    ) -> Result<Self> {
        let weights = weights.as_map().clone();
        let score = weighted_score(&factors, &weights)?;
        Ok(Self {
            item,
            factors,
            weights,
            score,
        })
    }
}

/// Immutable named weight map for one stage domain
///
/// Profiles are configuration values passed in stage definitions, never
/// shared mutable state. The tables mirror the scoring models of each
/// agent in the venture pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightProfile(BTreeMap<String, f64>);

impl WeightProfile {
    /// Build a profile from arbitrary named weights
    pub fn new(weights: BTreeMap<String, f64>) -> Self {
        Self(weights)
    }

    pub fn as_map(&self) -> &BTreeMap<String, f64> {
        &self.0
    }

    /// Trend potential: popularity 30, engagement 25, market size 20,
    /// category 15, novelty 10
    pub fn trend() -> Self {
        Self(BTreeMap::from([
            ("popularity".to_string(), 30.0),
            ("engagement".to_string(), 25.0),
            ("market_size".to_string(), 20.0),
            ("category".to_string(), 15.0),
            ("novelty".to_string(), 10.0),
        ]))
    }

    /// Idea priority: revenue 30, feasibility 25, competition 20,
    /// market size 15, trend strength 10
    pub fn idea() -> Self {
        Self(BTreeMap::from([
            ("revenue_potential".to_string(), 30.0),
            ("feasibility".to_string(), 25.0),
            ("competition".to_string(), 20.0),
            ("market_size".to_string(), 15.0),
            ("trend_strength".to_string(), 10.0),
        ]))
    }

    /// Lead qualification: engagement 30, company size 20, role 20,
    /// industry 15, budget 15
    pub fn lead() -> Self {
        Self(BTreeMap::from([
            ("engagement".to_string(), 30.0),
            ("company_size".to_string(), 20.0),
            ("role".to_string(), 20.0),
            ("industry".to_string(), 15.0),
            ("budget".to_string(), 15.0),
        ]))
    }

    /// Build artifacts rank on deployment readiness alone
    pub fn build() -> Self {
        Self(BTreeMap::from([("readiness".to_string(), 100.0)]))
    }

    /// Campaign assets: reach 40, relevance 35, cost efficiency 25
    pub fn campaign() -> Self {
        Self(BTreeMap::from([
            ("reach".to_string(), 40.0),
            ("relevance".to_string(), 35.0),
            ("cost_efficiency".to_string(), 25.0),
        ]))
    }
}

/// Sort items by score descending, breaking ties with a caller-supplied
/// secondary key (descending)
///
/// The sort is stable: items equal on both keys keep their input order,
/// and ranking an already-ranked sequence yields the same order.
pub fn rank<K, F>(mut items: Vec<ScoredItem>, secondary: F) -> Vec<ScoredItem>
where
    K: Ord,
    F: Fn(&ScoredItem) -> K,
{
    items.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| secondary(b).cmp(&secondary(a)))
    });
    items
}

/// Keep items scoring at or above `min_score`, preserving rank order
pub fn filter(items: Vec<ScoredItem>, min_score: f64) -> Vec<ScoredItem> {
    items.into_iter().filter(|i| i.score >= min_score).collect()
}
