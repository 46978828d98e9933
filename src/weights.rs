use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scoring::classify::Tier;
use crate::variables::{GroupKey, VariableKey};

pub const DEFAULT_WEIGHT_SUM_TOLERANCE: f64 = 0.0001;

/// Group-level weights used by the total aggregation. Expected to sum to 1.0,
/// but the total is never renormalised.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GroupWeights {
    pub operationeel: f64,
    pub technisch: f64,
    pub configuratie: f64,
    pub organisatie: f64,
    pub processen: f64,
    pub rapportage: f64,
    pub contract: f64,
}

impl Default for GroupWeights {
    fn default() -> Self {
        Self {
            operationeel: 0.25,
            technisch: 0.15,
            configuratie: 0.15,
            organisatie: 0.14,
            processen: 0.11,
            rapportage: 0.1,
            contract: 0.1,
        }
    }
}

impl GroupWeights {
    pub fn weight(&self, group: GroupKey) -> f64 {
        match group {
            GroupKey::Operationeel => self.operationeel,
            GroupKey::Technisch => self.technisch,
            GroupKey::Configuratie => self.configuratie,
            GroupKey::Organisatie => self.organisatie,
            GroupKey::Processen => self.processen,
            GroupKey::Rapportage => self.rapportage,
            GroupKey::Contract => self.contract,
        }
    }

    pub fn set(&mut self, group: GroupKey, to: f64) {
        let slot = match group {
            GroupKey::Operationeel => &mut self.operationeel,
            GroupKey::Technisch => &mut self.technisch,
            GroupKey::Configuratie => &mut self.configuratie,
            GroupKey::Organisatie => &mut self.organisatie,
            GroupKey::Processen => &mut self.processen,
            GroupKey::Rapportage => &mut self.rapportage,
            GroupKey::Contract => &mut self.contract,
        };
        *slot = to;
    }

    pub fn sum(&self) -> f64 {
        GroupKey::ALL.iter().map(|group| self.weight(*group)).sum()
    }
}

/// Per-variable weights. Only used for in-group normalisation, so they need
/// not sum to 1 globally.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VarWeights {
    pub sku_count: f64,
    pub order_volume: f64,
    pub order_peak: f64,
    pub retour_percentage: f64,
    pub sku_complexity: f64,
    pub seizoensinvloed: f64,
    pub vas_activiteiten: f64,
    pub inbound_bijzonderheden: f64,
    pub platform_type: f64,
    pub type_koppeling: f64,
    pub postnl_apis: f64,
    pub config_door: f64,
    pub mate_maatwerk: f64,
    pub mapping_complexiteit: f64,
    pub test_capaciteit: f64,
    pub aantal_afdelingen: f64,
    pub scope_wijzigingen: f64,
    pub voorraad_beheer: f64,
    pub replenishment: f64,
    pub verzend_methoden: f64,
    pub retour_proces: f64,
    pub dashboard_gebruik: f64,
    pub rapportage_behoefte: f64,
    pub service_uitbreiding: f64,
}

impl Default for VarWeights {
    fn default() -> Self {
        Self {
            sku_count: 0.25,
            order_volume: 0.2,
            order_peak: 0.1,
            retour_percentage: 0.1,
            sku_complexity: 0.15,
            seizoensinvloed: 0.05,
            vas_activiteiten: 0.15,
            inbound_bijzonderheden: 0.1,
            platform_type: 0.4,
            type_koppeling: 0.4,
            postnl_apis: 0.2,
            config_door: 0.3,
            mate_maatwerk: 0.3,
            mapping_complexiteit: 0.25,
            test_capaciteit: 0.15,
            aantal_afdelingen: 0.5,
            scope_wijzigingen: 0.5,
            voorraad_beheer: 0.35,
            replenishment: 0.3,
            verzend_methoden: 0.2,
            retour_proces: 0.15,
            dashboard_gebruik: 0.5,
            rapportage_behoefte: 0.5,
            service_uitbreiding: 1.0,
        }
    }
}

impl VarWeights {
    fn slot_mut(&mut self, key: VariableKey) -> &mut f64 {
        match key {
            VariableKey::SkuCount => &mut self.sku_count,
            VariableKey::OrderVolume => &mut self.order_volume,
            VariableKey::OrderPeak => &mut self.order_peak,
            VariableKey::RetourPercentage => &mut self.retour_percentage,
            VariableKey::AantalAfdelingen => &mut self.aantal_afdelingen,
            VariableKey::SkuComplexity => &mut self.sku_complexity,
            VariableKey::Seizoensinvloed => &mut self.seizoensinvloed,
            VariableKey::PlatformType => &mut self.platform_type,
            VariableKey::TypeKoppeling => &mut self.type_koppeling,
            VariableKey::ConfigDoor => &mut self.config_door,
            VariableKey::MateMaatwerk => &mut self.mate_maatwerk,
            VariableKey::MappingComplexiteit => &mut self.mapping_complexiteit,
            VariableKey::TestCapaciteit => &mut self.test_capaciteit,
            VariableKey::VoorraadBeheer => &mut self.voorraad_beheer,
            VariableKey::Replenishment => &mut self.replenishment,
            VariableKey::VerzendMethoden => &mut self.verzend_methoden,
            VariableKey::RetourProces => &mut self.retour_proces,
            VariableKey::DashboardGebruik => &mut self.dashboard_gebruik,
            VariableKey::RapportageBehoefte => &mut self.rapportage_behoefte,
            VariableKey::ServiceUitbreiding => &mut self.service_uitbreiding,
            VariableKey::ScopeWijzigingen => &mut self.scope_wijzigingen,
            VariableKey::VasActiviteiten => &mut self.vas_activiteiten,
            VariableKey::InboundBijzonderheden => &mut self.inbound_bijzonderheden,
            VariableKey::PostnlApis => &mut self.postnl_apis,
        }
    }

    pub fn weight(&self, key: VariableKey) -> f64 {
        match key {
            VariableKey::SkuCount => self.sku_count,
            VariableKey::OrderVolume => self.order_volume,
            VariableKey::OrderPeak => self.order_peak,
            VariableKey::RetourPercentage => self.retour_percentage,
            VariableKey::AantalAfdelingen => self.aantal_afdelingen,
            VariableKey::SkuComplexity => self.sku_complexity,
            VariableKey::Seizoensinvloed => self.seizoensinvloed,
            VariableKey::PlatformType => self.platform_type,
            VariableKey::TypeKoppeling => self.type_koppeling,
            VariableKey::ConfigDoor => self.config_door,
            VariableKey::MateMaatwerk => self.mate_maatwerk,
            VariableKey::MappingComplexiteit => self.mapping_complexiteit,
            VariableKey::TestCapaciteit => self.test_capaciteit,
            VariableKey::VoorraadBeheer => self.voorraad_beheer,
            VariableKey::Replenishment => self.replenishment,
            VariableKey::VerzendMethoden => self.verzend_methoden,
            VariableKey::RetourProces => self.retour_proces,
            VariableKey::DashboardGebruik => self.dashboard_gebruik,
            VariableKey::RapportageBehoefte => self.rapportage_behoefte,
            VariableKey::ServiceUitbreiding => self.service_uitbreiding,
            VariableKey::ScopeWijzigingen => self.scope_wijzigingen,
            VariableKey::VasActiviteiten => self.vas_activiteiten,
            VariableKey::InboundBijzonderheden => self.inbound_bijzonderheden,
            VariableKey::PostnlApis => self.postnl_apis,
        }
    }

    pub fn set(&mut self, key: VariableKey, to: f64) {
        *self.slot_mut(key) = to;
    }

    /// Sum of member weights for one group.
    pub fn group_sum(&self, group: GroupKey) -> f64 {
        group.members().iter().map(|key| self.weight(*key)).sum()
    }
}

/// Inclusive upper bounds per tier. `C1` is carried for completeness; scores
/// above `B2` always fall through to C1.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Thresholds {
    #[serde(rename = "A1")]
    pub a1: f64,
    #[serde(rename = "A2")]
    pub a2: f64,
    #[serde(rename = "A3")]
    pub a3: f64,
    #[serde(rename = "B1")]
    pub b1: f64,
    #[serde(rename = "B2")]
    pub b2: f64,
    #[serde(rename = "C1")]
    pub c1: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            a1: 20.0,
            a2: 35.0,
            a3: 50.0,
            b1: 65.0,
            b2: 80.0,
            c1: 100.0,
        }
    }
}

impl Thresholds {
    pub fn bound(&self, tier: Tier) -> f64 {
        match tier {
            Tier::A1 => self.a1,
            Tier::A2 => self.a2,
            Tier::A3 => self.a3,
            Tier::B1 => self.b1,
            Tier::B2 => self.b2,
            Tier::C1 => self.c1,
        }
    }

    pub fn set(&mut self, tier: Tier, to: f64) {
        let slot = match tier {
            Tier::A1 => &mut self.a1,
            Tier::A2 => &mut self.a2,
            Tier::A3 => &mut self.a3,
            Tier::B1 => &mut self.b1,
            Tier::B2 => &mut self.b2,
            Tier::C1 => &mut self.c1,
        };
        *slot = to;
    }

    /// Bounds in declaration order.
    pub fn ordered(&self) -> [(Tier, f64); 6] {
        Tier::ALL.map(|tier| (tier, self.bound(tier)))
    }
}

/// Advisory findings about a weight/threshold configuration. None of these
/// block scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigWarning {
    GroupWeightSum { sum: f64 },
    NegativeGroupWeight { group: GroupKey, weight: f64 },
    NegativeVariableWeight { variable: VariableKey, weight: f64 },
    ZeroGroupVariableWeights { group: GroupKey },
    ThresholdsNotMonotonic { lower: Tier, upper: Tier },
    ThresholdOutOfRange { tier: Tier, value: f64 },
}

impl Display for ConfigWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GroupWeightSum { sum } => {
                write!(f, "group weights sum to {sum:.4}, expected 1.0")
            }
            Self::NegativeGroupWeight { group, weight } => {
                write!(f, "group {group} has negative weight {weight}")
            }
            Self::NegativeVariableWeight { variable, weight } => {
                write!(f, "variable {variable} has negative weight {weight}")
            }
            Self::ZeroGroupVariableWeights { group } => {
                write!(f, "all variable weights in group {group} are zero; group scores 0")
            }
            Self::ThresholdsNotMonotonic { lower, upper } => {
                write!(f, "threshold {upper} is below threshold {lower}")
            }
            Self::ThresholdOutOfRange { tier, value } => {
                write!(f, "threshold {tier} = {value} is outside 0..100")
            }
        }
    }
}

pub fn validate_weights(
    group_weights: &GroupWeights,
    var_weights: &VarWeights,
    thresholds: &Thresholds,
    sum_tolerance: f64,
) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();

    let sum = group_weights.sum();
    if (1.0 - sum).abs() > sum_tolerance {
        warnings.push(ConfigWarning::GroupWeightSum { sum });
    }
    for group in GroupKey::ALL {
        let weight = group_weights.weight(group);
        if weight < 0.0 {
            warnings.push(ConfigWarning::NegativeGroupWeight { group, weight });
        }
        if var_weights.group_sum(group) <= 0.0 {
            warnings.push(ConfigWarning::ZeroGroupVariableWeights { group });
        }
    }
    for variable in VariableKey::ALL {
        let weight = var_weights.weight(variable);
        if weight < 0.0 {
            warnings.push(ConfigWarning::NegativeVariableWeight { variable, weight });
        }
    }

    let ordered = thresholds.ordered();
    for (tier, value) in ordered {
        if !(0.0..=100.0).contains(&value) {
            warnings.push(ConfigWarning::ThresholdOutOfRange { tier, value });
        }
    }
    for pair in ordered.windows(2) {
        let (lower, lower_value) = pair[0];
        let (upper, upper_value) = pair[1];
        if upper_value < lower_value {
            warnings.push(ConfigWarning::ThresholdsNotMonotonic { lower, upper });
        }
    }

    warnings
}

#[derive(Debug, Error, PartialEq)]
#[error("expected `key=number`, got `{0}`")]
pub struct WeightAssignmentParseError(pub String);

/// A `key=value` edit of a group weight, variable weight or threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assignment<K> {
    pub key: K,
    pub value: f64,
}

impl<K: FromStr> FromStr for Assignment<K> {
    type Err = WeightAssignmentParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || WeightAssignmentParseError(s.to_string());
        let (key, value) = s.split_once('=').ok_or_else(invalid)?;
        let key = K::from_str(key).map_err(|_| invalid())?;
        let value = value.trim().parse::<f64>().map_err(|_| invalid())?;
        Ok(Self { key, value })
    }
}
