use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::inputs::ClassifierInput;
use crate::scoring::aggregate::{compute_all_groups, display_total, total_score};
use crate::scoring::classify::classify;
use crate::scoring::contributors::{describe, top_contributors};
use crate::scoring::{clamp_score, ClassifierResult, GroupScore};
use crate::weights::{validate_weights, ConfigWarning, GroupWeights, Thresholds, VarWeights};

/// Full caller-owned snapshot of one scoring configuration. Field names match
/// the persisted preset bundle.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub inputs: ClassifierInput,
    pub gw: GroupWeights,
    pub vw: VarWeights,
    pub th: Thresholds,
}

impl Scenario {
    pub fn evaluate(&self) -> ClassifierResult {
        compute_result(&self.inputs, &self.gw, &self.vw, &self.th)
    }

    pub fn warnings(&self, sum_tolerance: f64) -> Vec<ConfigWarning> {
        validate_weights(&self.gw, &self.vw, &self.th, sum_tolerance)
    }

    /// SHA-256 over sorted-key JSON, so option label order does not matter.
    pub fn fingerprint(&self) -> String {
        let canonical = serde_json::to_value(self)
            .map(|value| value.to_string())
            .unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

pub fn compute_result(
    input: &ClassifierInput,
    group_weights: &GroupWeights,
    var_weights: &VarWeights,
    thresholds: &Thresholds,
) -> ClassifierResult {
    let groups = compute_all_groups(input, var_weights);
    let total = total_score(&groups, group_weights);
    let classification = classify(total, thresholds);
    let top = top_contributors(&groups, group_weights);
    debug!(
        total,
        tier = %classification.code,
        "scored snapshot"
    );

    let shown = display_total(total);
    ClassifierResult {
        total_score: total,
        total_score_label: format!("{shown:.1}"),
        total_score_progress: shown,
        classification,
        top_contributors: top.iter().map(describe).collect(),
        group_scores: groups
            .iter()
            .map(|computation| GroupScore {
                key: computation.group,
                title: computation.group.title().to_string(),
                score: computation.group_score,
                score_label: format!("{:.1}", computation.group_score),
                progress: clamp_score(computation.group_score),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{compute_result, Scenario};
    use crate::inputs::ClassifierInput;
    use crate::scoring::classify::Tier;
    use crate::scoring::variable::score_variable;
    use crate::variables::{GroupKey, MultiSelectField, VariableKey};
    use crate::weights::{GroupWeights, Thresholds, VarWeights};

    const GOLDEN_TOTAL: f64 = 37.501_363_636_4;

    #[test]
    fn default_scenario_golden_value() {
        let result = Scenario::default().evaluate();
        assert!(
            (result.total_score - GOLDEN_TOTAL).abs() < 1e-6,
            "total was {}",
            result.total_score
        );
        assert_eq!(result.total_score_label, "37.5");
        assert_eq!(result.classification.code, Tier::A3);
        assert_eq!(result.classification.label, "A3 — 4–6 weken");
        let keys: Vec<_> = result.top_contributors.iter().map(|c| c.key).collect();
        assert_eq!(
            keys,
            vec![
                VariableKey::TypeKoppeling,
                VariableKey::ScopeWijzigingen,
                VariableKey::ServiceUitbreiding,
            ]
        );
        let labels: Vec<_> = result
            .group_scores
            .iter()
            .map(|g| g.score_label.as_str())
            .collect();
        assert_eq!(
            labels,
            vec!["29.9", "36.0", "44.3", "35.8", "45.3", "50.0", "30.0"]
        );
    }

    #[test]
    fn unknown_platform_uses_fallback() {
        let mut scenario = Scenario::default();
        scenario.inputs.platform_type = "UnknownPlatform".to_string();
        assert_eq!(
            score_variable(VariableKey::PlatformType, &scenario.inputs),
            50.0
        );
        let result = scenario.evaluate();
        let technisch = result
            .group_score(GroupKey::Technisch)
            .expect("technisch score");
        assert!((technisch - (50.0 * 0.4 + 70.0 * 0.4) / 1.0).abs() < 1e-9);
    }

    #[test]
    fn result_serializes_camel_case() {
        let value = serde_json::to_value(Scenario::default().evaluate()).expect("serialize");
        assert_eq!(value["totalScoreLabel"], serde_json::json!("37.5"));
        assert_eq!(value["classification"]["code"], serde_json::json!("A3"));
        assert_eq!(value["groupScores"][0]["key"], serde_json::json!("operationeel"));
        assert_eq!(value["topContributors"][0]["key"], serde_json::json!("typeKoppeling"));
    }

    #[test]
    fn overweighted_groups_keep_raw_total_but_clamp_display() {
        let mut scenario = Scenario::default();
        scenario.inputs.sku_count = 10_000.0;
        scenario.gw = GroupWeights {
            operationeel: 3.0,
            technisch: 3.0,
            configuratie: 3.0,
            organisatie: 3.0,
            processen: 3.0,
            rapportage: 3.0,
            contract: 3.0,
        };
        let result = scenario.evaluate();
        assert!(result.total_score > 100.0);
        assert_eq!(result.total_score_label, "100.0");
        assert_eq!(result.total_score_progress, 100.0);
        assert_eq!(result.classification.code, Tier::C1);
    }

    #[test]
    fn fingerprint_ignores_label_order_but_not_values() {
        let base = Scenario::default();
        let mut reordered = base.clone();
        reordered.inputs.postnl_apis.reverse();
        assert_eq!(base.fingerprint(), reordered.fingerprint());

        let mut changed = base.clone();
        changed.inputs.order_peak = 9_000.0;
        assert_ne!(base.fingerprint(), changed.fingerprint());
    }

    fn arb_input() -> impl Strategy<Value = ClassifierInput> {
        (
            0.0..50_000.0f64,
            0.0..100_000.0f64,
            0.0..100_000.0f64,
            -10.0..150.0f64,
            -2.0..12.0f64,
            proptest::collection::vec(any::<bool>(), 0..6),
            proptest::collection::vec(any::<bool>(), 0..6),
            proptest::sample::select(vec!["Shopify", "Magento", "Bol.com", "Exotic", ""]),
        )
            .prop_map(|(sku, volume, peak, retour, afd, vas, apis, platform)| {
                let mut input = ClassifierInput::default();
                input.sku_count = sku;
                input.order_volume = volume;
                input.order_peak = peak;
                input.retour_percentage = retour;
                input.aantal_afdelingen = afd;
                input.platform_type = platform.to_string();
                input.vas_activiteiten = vas
                    .into_iter()
                    .enumerate()
                    .map(|(i, on)| (format!("vas-{i}"), on))
                    .collect();
                input.postnl_apis = apis
                    .into_iter()
                    .enumerate()
                    .map(|(i, on)| (format!("api-{i}"), on))
                    .collect();
                input
            })
    }

    fn arb_var_weights() -> impl Strategy<Value = VarWeights> {
        proptest::collection::vec(0.0..2.0f64, 24).prop_map(|weights| {
            let mut vw = VarWeights::default();
            for (key, weight) in VariableKey::ALL.into_iter().zip(weights) {
                vw.set(key, weight);
            }
            vw
        })
    }

    proptest! {
        #[test]
        fn scores_stay_in_range(input in arb_input(), vw in arb_var_weights()) {
            for key in VariableKey::ALL {
                let score = score_variable(key, &input);
                prop_assert!((0.0..=100.0).contains(&score), "{key} scored {score}");
            }
            let result = compute_result(&input, &GroupWeights::default(), &vw, &Thresholds::default());
            for group in &result.group_scores {
                prop_assert!(group.score >= 0.0 && group.score <= 100.0 + 1e-9);
            }
            prop_assert!((0.0..=100.0).contains(&result.total_score_progress));
            prop_assert_eq!(result.top_contributors.len(), 3);
        }

        #[test]
        fn identical_arguments_give_identical_results(input in arb_input(), vw in arb_var_weights()) {
            let first = compute_result(&input, &GroupWeights::default(), &vw, &Thresholds::default());
            let second = compute_result(&input, &GroupWeights::default(), &vw, &Thresholds::default());
            prop_assert_eq!(first, second);
        }

        #[test]
        fn sku_count_is_monotone(input in arb_input(), bump in 0.0..5_000.0f64) {
            let gw = GroupWeights::default();
            let vw = VarWeights::default();
            let th = Thresholds::default();
            let mut larger = input.clone();
            larger.sku_count += bump;
            prop_assert!(
                score_variable(VariableKey::SkuCount, &larger)
                    >= score_variable(VariableKey::SkuCount, &input)
            );
            let before = compute_result(&input, &gw, &vw, &th).total_score;
            let after = compute_result(&larger, &gw, &vw, &th).total_score;
            prop_assert!(after >= before - 1e-9);
        }

        #[test]
        fn selecting_options_moves_scores_in_opposite_directions(input in arb_input(), label in "[a-z]{1,8}") {
            let mut toggled = input.clone();
            toggled.set_option(MultiSelectField::VasActiviteiten, format!("x-{label}"), true);
            toggled.set_option(MultiSelectField::PostnlApis, format!("x-{label}"), true);
            let mut unselected = input.clone();
            unselected.set_option(MultiSelectField::VasActiviteiten, format!("x-{label}"), false);
            unselected.set_option(MultiSelectField::PostnlApis, format!("x-{label}"), false);

            prop_assert!(
                score_variable(VariableKey::PostnlApis, &toggled)
                    <= score_variable(VariableKey::PostnlApis, &unselected)
            );
            prop_assert!(
                score_variable(VariableKey::VasActiviteiten, &toggled)
                    >= score_variable(VariableKey::VasActiviteiten, &unselected)
            );
        }
    }
}
