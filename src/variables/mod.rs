pub mod category;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use category::{CategoricalField, CategoryTable};

/// One of the seven thematic groups that partition all scoreable variables.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    Operationeel,
    Technisch,
    Configuratie,
    Organisatie,
    Processen,
    Rapportage,
    Contract,
}

impl GroupKey {
    /// Fixed evaluation order. Contributor tie-breaks depend on it.
    pub const ALL: [GroupKey; 7] = [
        GroupKey::Operationeel,
        GroupKey::Technisch,
        GroupKey::Configuratie,
        GroupKey::Organisatie,
        GroupKey::Processen,
        GroupKey::Rapportage,
        GroupKey::Contract,
    ];

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Operationeel => "operationeel",
            Self::Technisch => "technisch",
            Self::Configuratie => "configuratie",
            Self::Organisatie => "organisatie",
            Self::Processen => "processen",
            Self::Rapportage => "rapportage",
            Self::Contract => "contract",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Operationeel => "Operationeel",
            Self::Technisch => "Technisch",
            Self::Configuratie => "Configuratie",
            Self::Organisatie => "Organisatie",
            Self::Processen => "Processen",
            Self::Rapportage => "Rapportage",
            Self::Contract => "Contract",
        }
    }

    /// Ordered member variables of this group.
    pub fn members(&self) -> &'static [VariableKey] {
        use VariableKey::*;
        match self {
            Self::Operationeel => &[
                SkuCount,
                OrderVolume,
                OrderPeak,
                RetourPercentage,
                SkuComplexity,
                Seizoensinvloed,
                VasActiviteiten,
                InboundBijzonderheden,
            ],
            Self::Technisch => &[PlatformType, TypeKoppeling, PostnlApis],
            Self::Configuratie => &[
                ConfigDoor,
                MateMaatwerk,
                MappingComplexiteit,
                TestCapaciteit,
            ],
            Self::Organisatie => &[AantalAfdelingen, ScopeWijzigingen],
            Self::Processen => &[
                VoorraadBeheer,
                Replenishment,
                VerzendMethoden,
                RetourProces,
            ],
            Self::Rapportage => &[DashboardGebruik, RapportageBehoefte],
            Self::Contract => &[ServiceUitbreiding],
        }
    }
}

impl Display for GroupKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_slug())
    }
}

#[derive(Debug, Error)]
#[error("unknown group: {0}")]
pub struct GroupKeyParseError(pub String);

impl FromStr for GroupKey {
    type Err = GroupKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        GroupKey::ALL
            .into_iter()
            .find(|group| group.as_slug() == normalized)
            .ok_or_else(|| GroupKeyParseError(s.to_string()))
    }
}

/// Semantic kind of a variable, which decides how it is normalised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Linear,
    Categorical(CategoricalField),
    MultiSelect(MultiSelectField),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum MultiSelectField {
    VasActiviteiten,
    InboundBijzonderheden,
    PostnlApis,
}

impl MultiSelectField {
    pub const ALL: [MultiSelectField; 3] = [
        MultiSelectField::VasActiviteiten,
        MultiSelectField::InboundBijzonderheden,
        MultiSelectField::PostnlApis,
    ];

    /// More PostNL APIs in use means less onboarding work, so this one scores inverted.
    pub fn is_inverted(&self) -> bool {
        matches!(self, Self::PostnlApis)
    }

    pub fn variable(&self) -> VariableKey {
        match self {
            Self::VasActiviteiten => VariableKey::VasActiviteiten,
            Self::InboundBijzonderheden => VariableKey::InboundBijzonderheden,
            Self::PostnlApis => VariableKey::PostnlApis,
        }
    }
}

impl FromStr for MultiSelectField {
    type Err = VariableKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match VariableKey::from_str(s)?.kind() {
            VariableKind::MultiSelect(field) => Ok(field),
            _ => Err(VariableKeyParseError(s.to_string())),
        }
    }
}

/// Every scoreable questionnaire field. Wire names match the input field names.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum VariableKey {
    SkuCount,
    OrderVolume,
    OrderPeak,
    RetourPercentage,
    AantalAfdelingen,
    SkuComplexity,
    Seizoensinvloed,
    PlatformType,
    TypeKoppeling,
    ConfigDoor,
    MateMaatwerk,
    MappingComplexiteit,
    TestCapaciteit,
    VoorraadBeheer,
    Replenishment,
    VerzendMethoden,
    RetourProces,
    DashboardGebruik,
    RapportageBehoefte,
    ServiceUitbreiding,
    ScopeWijzigingen,
    VasActiviteiten,
    InboundBijzonderheden,
    PostnlApis,
}

impl VariableKey {
    pub const ALL: [VariableKey; 24] = [
        VariableKey::SkuCount,
        VariableKey::OrderVolume,
        VariableKey::OrderPeak,
        VariableKey::RetourPercentage,
        VariableKey::AantalAfdelingen,
        VariableKey::SkuComplexity,
        VariableKey::Seizoensinvloed,
        VariableKey::PlatformType,
        VariableKey::TypeKoppeling,
        VariableKey::ConfigDoor,
        VariableKey::MateMaatwerk,
        VariableKey::MappingComplexiteit,
        VariableKey::TestCapaciteit,
        VariableKey::VoorraadBeheer,
        VariableKey::Replenishment,
        VariableKey::VerzendMethoden,
        VariableKey::RetourProces,
        VariableKey::DashboardGebruik,
        VariableKey::RapportageBehoefte,
        VariableKey::ServiceUitbreiding,
        VariableKey::ScopeWijzigingen,
        VariableKey::VasActiviteiten,
        VariableKey::InboundBijzonderheden,
        VariableKey::PostnlApis,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SkuCount => "skuCount",
            Self::OrderVolume => "orderVolume",
            Self::OrderPeak => "orderPeak",
            Self::RetourPercentage => "retourPercentage",
            Self::AantalAfdelingen => "aantalAfdelingen",
            Self::SkuComplexity => "skuComplexity",
            Self::Seizoensinvloed => "seizoensinvloed",
            Self::PlatformType => "platformType",
            Self::TypeKoppeling => "typeKoppeling",
            Self::ConfigDoor => "configDoor",
            Self::MateMaatwerk => "mateMaatwerk",
            Self::MappingComplexiteit => "mappingComplexiteit",
            Self::TestCapaciteit => "testCapaciteit",
            Self::VoorraadBeheer => "voorraadBeheer",
            Self::Replenishment => "replenishment",
            Self::VerzendMethoden => "verzendMethoden",
            Self::RetourProces => "retourProces",
            Self::DashboardGebruik => "dashboardGebruik",
            Self::RapportageBehoefte => "rapportageBehoefte",
            Self::ServiceUitbreiding => "serviceUitbreiding",
            Self::ScopeWijzigingen => "scopeWijzigingen",
            Self::VasActiviteiten => "vasActiviteiten",
            Self::InboundBijzonderheden => "inboundBijzonderheden",
            Self::PostnlApis => "postnlApis",
        }
    }

    pub fn kind(&self) -> VariableKind {
        match self {
            Self::SkuCount
            | Self::OrderVolume
            | Self::OrderPeak
            | Self::RetourPercentage
            | Self::AantalAfdelingen => VariableKind::Linear,
            Self::SkuComplexity => VariableKind::Categorical(CategoricalField::SkuComplexity),
            Self::Seizoensinvloed => VariableKind::Categorical(CategoricalField::Seizoensinvloed),
            Self::PlatformType => VariableKind::Categorical(CategoricalField::PlatformType),
            Self::TypeKoppeling => VariableKind::Categorical(CategoricalField::TypeKoppeling),
            Self::ConfigDoor => VariableKind::Categorical(CategoricalField::ConfigDoor),
            Self::MateMaatwerk => VariableKind::Categorical(CategoricalField::MateMaatwerk),
            Self::MappingComplexiteit => {
                VariableKind::Categorical(CategoricalField::MappingComplexiteit)
            }
            Self::TestCapaciteit => VariableKind::Categorical(CategoricalField::TestCapaciteit),
            Self::VoorraadBeheer => VariableKind::Categorical(CategoricalField::VoorraadBeheer),
            Self::Replenishment => VariableKind::Categorical(CategoricalField::Replenishment),
            Self::VerzendMethoden => VariableKind::Categorical(CategoricalField::VerzendMethoden),
            Self::RetourProces => VariableKind::Categorical(CategoricalField::RetourProces),
            Self::DashboardGebruik => {
                VariableKind::Categorical(CategoricalField::DashboardGebruik)
            }
            Self::RapportageBehoefte => {
                VariableKind::Categorical(CategoricalField::RapportageBehoefte)
            }
            Self::ServiceUitbreiding => {
                VariableKind::Categorical(CategoricalField::ServiceUitbreiding)
            }
            Self::ScopeWijzigingen => {
                VariableKind::Categorical(CategoricalField::ScopeWijzigingen)
            }
            Self::VasActiviteiten => VariableKind::MultiSelect(MultiSelectField::VasActiviteiten),
            Self::InboundBijzonderheden => {
                VariableKind::MultiSelect(MultiSelectField::InboundBijzonderheden)
            }
            Self::PostnlApis => VariableKind::MultiSelect(MultiSelectField::PostnlApis),
        }
    }

    /// The group this variable belongs to. Membership is total and disjoint.
    pub fn group(&self) -> GroupKey {
        GroupKey::ALL
            .into_iter()
            .find(|group| group.members().contains(self))
            .unwrap_or(GroupKey::Operationeel)
    }
}

impl Display for VariableKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown variable: {0}")]
pub struct VariableKeyParseError(pub String);

impl FromStr for VariableKey {
    type Err = VariableKeyParseError;

    /// Accepts the camelCase wire name as well as snake_case / kebab-case spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '_'], "");
        VariableKey::ALL
            .into_iter()
            .find(|key| key.as_str().to_ascii_lowercase() == normalized)
            .ok_or_else(|| VariableKeyParseError(s.to_string()))
    }
}
