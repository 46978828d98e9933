use crate::scoring::{GroupComputation, RankedContributor, TopContributor};
use crate::weights::GroupWeights;

pub const TOP_CONTRIBUTORS: usize = 3;

/// Every (group, variable) contribution in group/membership order, with its
/// magnitude `|score * weight * group_weight|`.
pub fn collect_contributions(
    groups: &[GroupComputation],
    group_weights: &GroupWeights,
) -> Vec<RankedContributor> {
    groups
        .iter()
        .flat_map(|computation| {
            let group_weight = group_weights.weight(computation.group);
            computation
                .contributions
                .iter()
                .map(move |c| RankedContributor {
                    key: c.key,
                    group: computation.group,
                    score: c.score,
                    weight: c.weight,
                    group_weight,
                    magnitude: (c.score * c.weight * group_weight).abs(),
                })
        })
        .collect()
}

/// Largest magnitudes first. The sort is stable, so ties keep enumeration order.
pub fn rank_contributors(
    mut contributions: Vec<RankedContributor>,
    limit: usize,
) -> Vec<RankedContributor> {
    contributions.sort_by(|a, b| b.magnitude.total_cmp(&a.magnitude));
    contributions.truncate(limit);
    contributions
}

pub fn top_contributors(
    groups: &[GroupComputation],
    group_weights: &GroupWeights,
) -> Vec<RankedContributor> {
    rank_contributors(
        collect_contributions(groups, group_weights),
        TOP_CONTRIBUTORS,
    )
}

pub fn describe(contributor: &RankedContributor) -> TopContributor {
    TopContributor {
        key: contributor.key,
        title: contributor.key.to_string(),
        detail: format!(
            "Score {:.1} • gewicht {:.2} • groep {} ({:.2})",
            contributor.score,
            contributor.weight,
            contributor.group.as_slug(),
            contributor.group_weight
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::{collect_contributions, describe, rank_contributors, top_contributors};
    use crate::inputs::ClassifierInput;
    use crate::scoring::aggregate::compute_all_groups;
    use crate::scoring::RankedContributor;
    use crate::variables::{GroupKey, VariableKey};
    use crate::weights::{GroupWeights, VarWeights};

    fn contributor(key: VariableKey, magnitude: f64) -> RankedContributor {
        RankedContributor {
            key,
            group: key.group(),
            score: 0.0,
            weight: 0.0,
            group_weight: 0.0,
            magnitude,
        }
    }

    #[test]
    fn default_scenario_top_three() {
        let groups = compute_all_groups(&ClassifierInput::default(), &VarWeights::default());
        let top = top_contributors(&groups, &GroupWeights::default());
        let keys: Vec<_> = top.iter().map(|c| c.key).collect();
        assert_eq!(
            keys,
            vec![
                VariableKey::TypeKoppeling,
                VariableKey::ScopeWijzigingen,
                VariableKey::ServiceUitbreiding,
            ]
        );
        assert!((top[0].magnitude - 4.2).abs() < 1e-9);
    }

    #[test]
    fn ties_keep_enumeration_order() {
        let ranked = rank_contributors(
            vec![
                contributor(VariableKey::DashboardGebruik, 2.0),
                contributor(VariableKey::RapportageBehoefte, 2.0),
                contributor(VariableKey::SkuCount, 1.0),
                contributor(VariableKey::ServiceUitbreiding, 2.0),
            ],
            3,
        );
        let keys: Vec<_> = ranked.iter().map(|c| c.key).collect();
        assert_eq!(
            keys,
            vec![
                VariableKey::DashboardGebruik,
                VariableKey::RapportageBehoefte,
                VariableKey::ServiceUitbreiding,
            ]
        );
    }

    #[test]
    fn fewer_than_limit_is_fine() {
        let ranked = rank_contributors(vec![contributor(VariableKey::SkuCount, 1.0)], 3);
        assert_eq!(ranked.len(), 1);
        assert!(rank_contributors(Vec::new(), 3).is_empty());
    }

    #[test]
    fn magnitude_uses_absolute_value() {
        let mut gw = GroupWeights::default();
        gw.set(GroupKey::Contract, -1.0);
        let groups = compute_all_groups(&ClassifierInput::default(), &VarWeights::default());
        let all = collect_contributions(&groups, &gw);
        assert_eq!(all.len(), 24);
        let service = all
            .iter()
            .find(|c| c.key == VariableKey::ServiceUitbreiding)
            .expect("service contribution");
        assert!((service.magnitude - 30.0).abs() < 1e-9);
    }

    #[test]
    fn formats_detail_line() {
        let groups = compute_all_groups(&ClassifierInput::default(), &VarWeights::default());
        let top = top_contributors(&groups, &GroupWeights::default());
        let described = describe(&top[0]);
        assert_eq!(described.title, "typeKoppeling");
        assert_eq!(
            described.detail,
            "Score 70.0 • gewicht 0.40 • groep technisch (0.15)"
        );
    }
}
