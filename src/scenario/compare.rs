use tracing::debug;

use crate::scenario::{GroupDelta, NamedScenario, ScenarioComparison, ScenarioSide};
use crate::scoring::ClassifierResult;
use crate::variables::GroupKey;

pub fn compare_scenarios(a: &NamedScenario, b: &NamedScenario) -> ScenarioComparison {
    let before = a.scenario.evaluate();
    let after = b.scenario.evaluate();

    let group_deltas = group_deltas(&before, &after);
    let total_delta = after.total_score - before.total_score;
    let tier_changed = before.classification.code != after.classification.code;
    let identical = a.scenario.fingerprint() == b.scenario.fingerprint();
    debug!(
        a = %a.name,
        b = %b.name,
        total_delta,
        tier_changed,
        "compared scenarios"
    );

    ScenarioComparison {
        a: side(&a.name, before),
        b: side(&b.name, after),
        total_delta,
        tier_changed,
        group_deltas,
        identical,
    }
}

fn side(name: &str, result: ClassifierResult) -> ScenarioSide {
    ScenarioSide {
        name: name.to_string(),
        total_score: result.total_score,
        total_score_label: result.total_score_label,
        classification: result.classification,
    }
}

fn group_deltas(before: &ClassifierResult, after: &ClassifierResult) -> Vec<GroupDelta> {
    GroupKey::ALL
        .iter()
        .map(|group| {
            let a = before.group_score(*group).unwrap_or(0.0);
            let b = after.group_score(*group).unwrap_or(0.0);
            GroupDelta {
                group: *group,
                a,
                b,
                delta: b - a,
            }
        })
        .collect()
}
