use crate::inputs::ClassifierInput;
use crate::scoring::variable::score_variable;
use crate::scoring::{clamp_score, GroupComputation, VariableContribution};
use crate::variables::GroupKey;
use crate::weights::{GroupWeights, VarWeights};

/// Weighted average of the group's variable scores. A group whose variable
/// weights sum to zero scores 0.
pub fn compute_group_score(
    group: GroupKey,
    input: &ClassifierInput,
    var_weights: &VarWeights,
) -> GroupComputation {
    let members = group.members();
    let mut contributions = Vec::with_capacity(members.len());
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;

    for key in members {
        let score = score_variable(*key, input);
        let weight = var_weights.weight(*key);
        let contribution = score * weight;
        weighted_sum += contribution;
        weight_total += weight;
        contributions.push(VariableContribution {
            key: *key,
            score,
            weight,
            contribution,
        });
    }

    let group_score = if weight_total > 0.0 {
        weighted_sum / weight_total
    } else {
        0.0
    };

    GroupComputation {
        group,
        group_score,
        contributions,
    }
}

/// All seven groups in fixed order.
pub fn compute_all_groups(
    input: &ClassifierInput,
    var_weights: &VarWeights,
) -> Vec<GroupComputation> {
    GroupKey::ALL
        .iter()
        .map(|group| compute_group_score(*group, input, var_weights))
        .collect()
}

/// Raw weighted sum of group scores. Not renormalised by the group weight sum
/// and not clamped.
pub fn total_score(groups: &[GroupComputation], group_weights: &GroupWeights) -> f64 {
    groups
        .iter()
        .map(|computation| computation.group_score * group_weights.weight(computation.group))
        .sum()
}

pub fn display_total(total: f64) -> f64 {
    clamp_score(total)
}
