use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::variables::{VariableKey, VariableKeyParseError, VariableKind};

/// Score table for one categorical field. Every table carries its own fallback
/// for values outside the known option set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryTable {
    pub options: &'static [(&'static str, f64)],
    pub fallback: f64,
}

impl CategoryTable {
    /// Exact, case-sensitive lookup. Unknown values score the fallback.
    pub fn score(&self, value: &str) -> f64 {
        self.options
            .iter()
            .find(|(option, _)| *option == value)
            .map(|(_, score)| *score)
            .unwrap_or(self.fallback)
    }

    pub fn contains(&self, value: &str) -> bool {
        self.options.iter().any(|(option, _)| *option == value)
    }

    pub fn option_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.options.iter().map(|(option, _)| *option)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum CategoricalField {
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
}

impl CategoricalField {
    pub const ALL: [CategoricalField; 16] = [
        CategoricalField::SkuComplexity,
        CategoricalField::Seizoensinvloed,
        CategoricalField::PlatformType,
        CategoricalField::TypeKoppeling,
        CategoricalField::ConfigDoor,
        CategoricalField::MateMaatwerk,
        CategoricalField::MappingComplexiteit,
        CategoricalField::TestCapaciteit,
        CategoricalField::VoorraadBeheer,
        CategoricalField::Replenishment,
        CategoricalField::VerzendMethoden,
        CategoricalField::RetourProces,
        CategoricalField::DashboardGebruik,
        CategoricalField::RapportageBehoefte,
        CategoricalField::ServiceUitbreiding,
        CategoricalField::ScopeWijzigingen,
    ];

    // Higher score means more onboarding complexity.
    pub fn table(&self) -> CategoryTable {
        match self {
            Self::SkuComplexity => CategoryTable {
                options: &[("standaard", 10.0), ("varianten", 50.0), ("bundels", 80.0)],
                fallback: 40.0,
            },
            Self::Seizoensinvloed => CategoryTable {
                options: &[("laag", 10.0), ("medium", 45.0), ("hoog", 80.0)],
                fallback: 45.0,
            },
            Self::PlatformType => CategoryTable {
                options: &[
                    ("Shopify", 20.0),
                    ("Magento", 60.0),
                    ("WooCommerce", 40.0),
                    ("Lightspeed", 25.0),
                    ("Bol.com", 50.0),
                    ("API", 70.0),
                ],
                fallback: 50.0,
            },
            Self::TypeKoppeling => CategoryTable {
                options: &[
                    ("API", 70.0),
                    ("SFTP", 40.0),
                    ("plugin", 30.0),
                    ("handmatig", 80.0),
                ],
                fallback: 50.0,
            },
            Self::ConfigDoor => CategoryTable {
                options: &[("klant", 60.0), ("postnl", 30.0), ("hybride", 50.0)],
                fallback: 50.0,
            },
            Self::MateMaatwerk => CategoryTable {
                options: &[("geen", 10.0), ("licht", 45.0), ("zwaar", 85.0)],
                fallback: 50.0,
            },
            Self::MappingComplexiteit => CategoryTable {
                options: &[("standaard", 20.0), ("custom", 60.0), ("dynamisch", 80.0)],
                fallback: 50.0,
            },
            Self::TestCapaciteit => CategoryTable {
                options: &[("laag", 80.0), ("gemiddeld", 45.0), ("hoog", 20.0)],
                fallback: 50.0,
            },
            Self::VoorraadBeheer => CategoryTable {
                options: &[("realtime", 30.0), ("batch", 55.0), ("handmatig", 85.0)],
                fallback: 50.0,
            },
            Self::Replenishment => CategoryTable {
                options: &[
                    ("geautomatiseerd", 30.0),
                    ("periodiek", 55.0),
                    ("handmatig", 80.0),
                ],
                fallback: 50.0,
            },
            Self::VerzendMethoden => CategoryTable {
                options: &[("standaard", 25.0), ("maatwerk", 65.0), ("externe", 75.0)],
                fallback: 50.0,
            },
            Self::RetourProces => CategoryTable {
                options: &[("portaal", 35.0), ("handmatig", 75.0)],
                fallback: 55.0,
            },
            Self::DashboardGebruik => CategoryTable {
                options: &[("dagelijks", 20.0), ("wekelijks", 45.0), ("zelden", 70.0)],
                fallback: 45.0,
            },
            Self::RapportageBehoefte => CategoryTable {
                options: &[("standaard", 30.0), ("uitgebreid", 55.0), ("maatwerk", 80.0)],
                fallback: 55.0,
            },
            Self::ServiceUitbreiding => CategoryTable {
                options: &[("nee", 30.0), ("ja", 75.0)],
                fallback: 30.0,
            },
            Self::ScopeWijzigingen => CategoryTable {
                options: &[("weinig", 30.0), ("gemiddeld", 55.0), ("veel", 80.0)],
                fallback: 55.0,
            },
        }
    }

    pub fn variable(&self) -> VariableKey {
        match self {
            Self::SkuComplexity => VariableKey::SkuComplexity,
            Self::Seizoensinvloed => VariableKey::Seizoensinvloed,
            Self::PlatformType => VariableKey::PlatformType,
            Self::TypeKoppeling => VariableKey::TypeKoppeling,
            Self::ConfigDoor => VariableKey::ConfigDoor,
            Self::MateMaatwerk => VariableKey::MateMaatwerk,
            Self::MappingComplexiteit => VariableKey::MappingComplexiteit,
            Self::TestCapaciteit => VariableKey::TestCapaciteit,
            Self::VoorraadBeheer => VariableKey::VoorraadBeheer,
            Self::Replenishment => VariableKey::Replenishment,
            Self::VerzendMethoden => VariableKey::VerzendMethoden,
            Self::RetourProces => VariableKey::RetourProces,
            Self::DashboardGebruik => VariableKey::DashboardGebruik,
            Self::RapportageBehoefte => VariableKey::RapportageBehoefte,
            Self::ServiceUitbreiding => VariableKey::ServiceUitbreiding,
            Self::ScopeWijzigingen => VariableKey::ScopeWijzigingen,
        }
    }
}

impl FromStr for CategoricalField {
    type Err = VariableKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match VariableKey::from_str(s)?.kind() {
            VariableKind::Categorical(field) => Ok(field),
            _ => Err(VariableKeyParseError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CategoricalField;
    use crate::variables::{VariableKey, VariableKind};

    #[test]
    fn known_values_score_from_table() {
        assert_eq!(CategoricalField::SkuComplexity.table().score("bundels"), 80.0);
        assert_eq!(CategoricalField::TestCapaciteit.table().score("laag"), 80.0);
        assert_eq!(CategoricalField::PlatformType.table().score("Bol.com"), 50.0);
    }

    #[test]
    fn unknown_values_use_per_field_fallback() {
        let expected = [
            (CategoricalField::SkuComplexity, 40.0),
            (CategoricalField::Seizoensinvloed, 45.0),
            (CategoricalField::PlatformType, 50.0),
            (CategoricalField::RetourProces, 55.0),
            (CategoricalField::DashboardGebruik, 45.0),
            (CategoricalField::RapportageBehoefte, 55.0),
            (CategoricalField::ServiceUitbreiding, 30.0),
            (CategoricalField::ScopeWijzigingen, 55.0),
            (CategoricalField::TypeKoppeling, 50.0),
        ];
        for (field, fallback) in expected {
            assert_eq!(field.table().score("onbekend"), fallback, "{field:?}");
            assert_eq!(field.table().score(""), fallback, "{field:?}");
        }
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let table = CategoricalField::PlatformType.table();
        assert!(table.contains("Shopify"));
        assert_eq!(table.score("shopify"), table.fallback);
    }

    #[test]
    fn every_field_maps_back_to_its_variable() {
        for field in CategoricalField::ALL {
            assert_eq!(
                field.variable().kind(),
                VariableKind::Categorical(field),
                "{field:?}"
            );
        }
        let categorical = VariableKey::ALL
            .iter()
            .filter(|key| matches!(key.kind(), VariableKind::Categorical(_)))
            .count();
        assert_eq!(categorical, CategoricalField::ALL.len());
    }
}
