//! Scoring engine: normalises raw answers to 0..100, aggregates them per group
//! and in total, classifies the total into a tier and ranks the strongest
//! contributors. Every function here is pure.

pub mod aggregate;
pub mod classify;
pub mod contributors;
pub mod engine;
pub mod variable;

use serde::{Deserialize, Serialize};

use crate::variables::{GroupKey, VariableKey};
use classify::Tier;

pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 100.0;

/// Clamp to the 0..100 score range. NaN maps to 0.
pub fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        return SCORE_MIN;
    }
    value.clamp(SCORE_MIN, SCORE_MAX)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct VariableContribution {
    pub key: VariableKey,
    pub score: f64,
    pub weight: f64,
    pub contribution: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupComputation {
    pub group: GroupKey,
    pub group_score: f64,
    /// In fixed group-membership order.
    pub contributions: Vec<VariableContribution>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RankedContributor {
    pub key: VariableKey,
    pub group: GroupKey,
    pub score: f64,
    pub weight: f64,
    pub group_weight: f64,
    pub magnitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Classification {
    pub code: Tier,
    pub lead: String,
    pub color: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopContributor {
    pub key: VariableKey,
    pub title: String,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupScore {
    pub key: GroupKey,
    pub title: String,
    pub score: f64,
    pub score_label: String,
    pub progress: f64,
}

/// Output of one scoring pass, as consumed by presentation and export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassifierResult {
    /// Raw weighted sum of group scores; exceeds 100 when group weights sum above 1.
    pub total_score: f64,
    pub total_score_label: String,
    pub total_score_progress: f64,
    pub classification: Classification,
    pub top_contributors: Vec<TopContributor>,
    pub group_scores: Vec<GroupScore>,
}

impl ClassifierResult {
    pub fn group_score(&self, group: GroupKey) -> Option<f64> {
        self.group_scores
            .iter()
            .find(|entry| entry.key == group)
            .map(|entry| entry.score)
    }
}

#[cfg(test)]
mod tests {
    use super::clamp_score;

    #[test]
    fn clamps_into_score_range() {
        assert_eq!(clamp_score(-3.0), 0.0);
        assert_eq!(clamp_score(42.5), 42.5);
        assert_eq!(clamp_score(250.0), 100.0);
        assert_eq!(clamp_score(f64::INFINITY), 100.0);
        assert_eq!(clamp_score(f64::NAN), 0.0);
    }
}
