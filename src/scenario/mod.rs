pub mod compare;

use serde::{Deserialize, Serialize};

use crate::scoring::engine::Scenario;
use crate::scoring::Classification;
use crate::variables::GroupKey;

/// A scenario snapshot with the label it is compared under ("Scenario A",
/// a preset name, a file path).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamedScenario {
    pub name: String,
    #[serde(flatten)]
    pub scenario: Scenario,
}

impl NamedScenario {
    pub fn new(name: impl Into<String>, scenario: Scenario) -> Self {
        Self {
            name: name.into(),
            scenario,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioSide {
    pub name: String,
    pub total_score: f64,
    /// Clamped to 0..100, one decimal.
    pub total_score_label: String,
    pub classification: Classification,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupDelta {
    pub group: GroupKey,
    pub a: f64,
    pub b: f64,
    pub delta: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioComparison {
    pub a: ScenarioSide,
    pub b: ScenarioSide,
    /// `b - a` on the raw totals.
    pub total_delta: f64,
    pub tier_changed: bool,
    pub group_deltas: Vec<GroupDelta>,
    pub identical: bool,
}
