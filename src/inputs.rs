use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::variables::{CategoricalField, MultiSelectField, VariableKey};

/// Option label -> selected. The label set is open: presets may carry labels
/// beyond the built-in defaults.
pub type MultiOptions = IndexMap<String, bool>;

/// Raw questionnaire answers for one prospective client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassifierInput {
    pub sku_count: f64,
    pub order_volume: f64,
    pub order_peak: f64,
    pub retour_percentage: f64,
    pub aantal_afdelingen: f64,
    pub sku_complexity: String,
    pub seizoensinvloed: String,
    pub platform_type: String,
    pub type_koppeling: String,
    pub config_door: String,
    pub mate_maatwerk: String,
    pub mapping_complexiteit: String,
    pub test_capaciteit: String,
    pub voorraad_beheer: String,
    pub replenishment: String,
    pub verzend_methoden: String,
    pub retour_proces: String,
    pub dashboard_gebruik: String,
    pub rapportage_behoefte: String,
    pub service_uitbreiding: String,
    pub scope_wijzigingen: String,
    #[serde(default, deserialize_with = "deserialize_options")]
    pub vas_activiteiten: MultiOptions,
    #[serde(default, deserialize_with = "deserialize_options")]
    pub inbound_bijzonderheden: MultiOptions,
    #[serde(default, deserialize_with = "deserialize_options")]
    pub postnl_apis: MultiOptions,
}

/// Accepts any JSON-like value per option and keeps its truthiness, so `1`
/// or `"ja"` select and `0`, `""` or `null` do not. Anything other than an
/// object reads as no options.
fn deserialize_options<'de, D>(deserializer: D) -> Result<MultiOptions, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawOptions {
        Labelled(IndexMap<String, serde_json::Value>),
        Other(serde_json::Value),
    }

    Ok(match RawOptions::deserialize(deserializer)? {
        RawOptions::Labelled(map) => map
            .into_iter()
            .map(|(label, value)| (label, is_truthy(&value)))
            .collect(),
        RawOptions::Other(_) => MultiOptions::new(),
    })
}

fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(flag) => *flag,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        serde_json::Value::String(text) => !text.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    }
}

impl Default for ClassifierInput {
    fn default() -> Self {
        Self {
            sku_count: 300.0,
            order_volume: 5000.0,
            order_peak: 8000.0,
            retour_percentage: 7.0,
            aantal_afdelingen: 2.0,
            sku_complexity: "varianten".to_string(),
            seizoensinvloed: "medium".to_string(),
            platform_type: "Shopify".to_string(),
            type_koppeling: "API".to_string(),
            config_door: "postnl".to_string(),
            mate_maatwerk: "licht".to_string(),
            mapping_complexiteit: "custom".to_string(),
            test_capaciteit: "gemiddeld".to_string(),
            voorraad_beheer: "realtime".to_string(),
            replenishment: "periodiek".to_string(),
            verzend_methoden: "maatwerk".to_string(),
            retour_proces: "portaal".to_string(),
            dashboard_gebruik: "wekelijks".to_string(),
            rapportage_behoefte: "uitgebreid".to_string(),
            service_uitbreiding: "nee".to_string(),
            scope_wijzigingen: "gemiddeld".to_string(),
            vas_activiteiten: options(&[
                ("stickeren", true),
                ("bundelen", false),
                ("inspectie", false),
            ]),
            inbound_bijzonderheden: options(&[
                ("kwaliteitscontrole", true),
                ("afwijkende verpakking", false),
                ("barcodering", true),
            ]),
            postnl_apis: options(&[
                ("Locatie", true),
                ("Checkout", true),
                ("Retour", true),
                ("Track & Trace", true),
            ]),
        }
    }
}

fn options(pairs: &[(&str, bool)]) -> MultiOptions {
    pairs
        .iter()
        .map(|(label, selected)| (label.to_string(), *selected))
        .collect()
}

impl ClassifierInput {
    /// An empty questionnaire: zero numbers, empty choices, no options.
    pub fn blank() -> Self {
        Self {
            sku_count: 0.0,
            order_volume: 0.0,
            order_peak: 0.0,
            retour_percentage: 0.0,
            aantal_afdelingen: 0.0,
            sku_complexity: String::new(),
            seizoensinvloed: String::new(),
            platform_type: String::new(),
            type_koppeling: String::new(),
            config_door: String::new(),
            mate_maatwerk: String::new(),
            mapping_complexiteit: String::new(),
            test_capaciteit: String::new(),
            voorraad_beheer: String::new(),
            replenishment: String::new(),
            verzend_methoden: String::new(),
            retour_proces: String::new(),
            dashboard_gebruik: String::new(),
            rapportage_behoefte: String::new(),
            service_uitbreiding: String::new(),
            scope_wijzigingen: String::new(),
            vas_activiteiten: MultiOptions::new(),
            inbound_bijzonderheden: MultiOptions::new(),
            postnl_apis: MultiOptions::new(),
        }
    }

    /// Raw value of a linear numeric variable; `None` for other kinds.
    pub fn numeric(&self, key: VariableKey) -> Option<f64> {
        let value = match key {
            VariableKey::SkuCount => self.sku_count,
            VariableKey::OrderVolume => self.order_volume,
            VariableKey::OrderPeak => self.order_peak,
            VariableKey::RetourPercentage => self.retour_percentage,
            VariableKey::AantalAfdelingen => self.aantal_afdelingen,
            _ => return None,
        };
        Some(value)
    }

    pub fn choice(&self, field: CategoricalField) -> &str {
        match field {
            CategoricalField::SkuComplexity => &self.sku_complexity,
            CategoricalField::Seizoensinvloed => &self.seizoensinvloed,
            CategoricalField::PlatformType => &self.platform_type,
            CategoricalField::TypeKoppeling => &self.type_koppeling,
            CategoricalField::ConfigDoor => &self.config_door,
            CategoricalField::MateMaatwerk => &self.mate_maatwerk,
            CategoricalField::MappingComplexiteit => &self.mapping_complexiteit,
            CategoricalField::TestCapaciteit => &self.test_capaciteit,
            CategoricalField::VoorraadBeheer => &self.voorraad_beheer,
            CategoricalField::Replenishment => &self.replenishment,
            CategoricalField::VerzendMethoden => &self.verzend_methoden,
            CategoricalField::RetourProces => &self.retour_proces,
            CategoricalField::DashboardGebruik => &self.dashboard_gebruik,
            CategoricalField::RapportageBehoefte => &self.rapportage_behoefte,
            CategoricalField::ServiceUitbreiding => &self.service_uitbreiding,
            CategoricalField::ScopeWijzigingen => &self.scope_wijzigingen,
        }
    }

    fn choice_mut(&mut self, field: CategoricalField) -> &mut String {
        match field {
            CategoricalField::SkuComplexity => &mut self.sku_complexity,
            CategoricalField::Seizoensinvloed => &mut self.seizoensinvloed,
            CategoricalField::PlatformType => &mut self.platform_type,
            CategoricalField::TypeKoppeling => &mut self.type_koppeling,
            CategoricalField::ConfigDoor => &mut self.config_door,
            CategoricalField::MateMaatwerk => &mut self.mate_maatwerk,
            CategoricalField::MappingComplexiteit => &mut self.mapping_complexiteit,
            CategoricalField::TestCapaciteit => &mut self.test_capaciteit,
            CategoricalField::VoorraadBeheer => &mut self.voorraad_beheer,
            CategoricalField::Replenishment => &mut self.replenishment,
            CategoricalField::VerzendMethoden => &mut self.verzend_methoden,
            CategoricalField::RetourProces => &mut self.retour_proces,
            CategoricalField::DashboardGebruik => &mut self.dashboard_gebruik,
            CategoricalField::RapportageBehoefte => &mut self.rapportage_behoefte,
            CategoricalField::ServiceUitbreiding => &mut self.service_uitbreiding,
            CategoricalField::ScopeWijzigingen => &mut self.scope_wijzigingen,
        }
    }

    pub fn options(&self, field: MultiSelectField) -> &MultiOptions {
        match field {
            MultiSelectField::VasActiviteiten => &self.vas_activiteiten,
            MultiSelectField::InboundBijzonderheden => &self.inbound_bijzonderheden,
            MultiSelectField::PostnlApis => &self.postnl_apis,
        }
    }

    fn options_mut(&mut self, field: MultiSelectField) -> &mut MultiOptions {
        match field {
            MultiSelectField::VasActiviteiten => &mut self.vas_activiteiten,
            MultiSelectField::InboundBijzonderheden => &mut self.inbound_bijzonderheden,
            MultiSelectField::PostnlApis => &mut self.postnl_apis,
        }
    }

    /// Selected labels of a multi-select, in stored order.
    pub fn selected_labels(&self, field: MultiSelectField) -> Vec<&str> {
        self.options(field)
            .iter()
            .filter(|(_, selected)| **selected)
            .map(|(label, _)| label.as_str())
            .collect()
    }

    /// Returns false when `key` is not a linear numeric variable.
    pub fn set_numeric(&mut self, key: VariableKey, to: f64) -> bool {
        match key {
            VariableKey::SkuCount => self.sku_count = to,
            VariableKey::OrderVolume => self.order_volume = to,
            VariableKey::OrderPeak => self.order_peak = to,
            VariableKey::RetourPercentage => self.retour_percentage = to,
            VariableKey::AantalAfdelingen => self.aantal_afdelingen = to,
            _ => return false,
        }
        true
    }

    pub fn set_choice(&mut self, field: CategoricalField, value: impl Into<String>) {
        *self.choice_mut(field) = value.into();
    }

    /// Sets a label; labels not seen before are appended.
    pub fn set_option(&mut self, field: MultiSelectField, label: impl Into<String>, selected: bool) {
        self.options_mut(field).insert(label.into(), selected);
    }

    pub fn apply_overrides(&mut self, overrides: &InputOverrides) {
        if let Some(v) = overrides.sku_count {
            self.sku_count = v;
        }
        if let Some(v) = overrides.order_volume {
            self.order_volume = v;
        }
        if let Some(v) = overrides.order_peak {
            self.order_peak = v;
        }
        if let Some(v) = overrides.retour_percentage {
            self.retour_percentage = v;
        }
        if let Some(v) = overrides.aantal_afdelingen {
            self.aantal_afdelingen = v;
        }
        for choice in &overrides.choices {
            self.set_choice(choice.field, choice.value.clone());
        }
        for toggle in &overrides.toggles {
            self.set_option(toggle.field, toggle.label.clone(), toggle.selected);
        }
    }
}

/// Field edits applied on top of a loaded snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputOverrides {
    pub sku_count: Option<f64>,
    pub order_volume: Option<f64>,
    pub order_peak: Option<f64>,
    pub retour_percentage: Option<f64>,
    pub aantal_afdelingen: Option<f64>,
    #[serde(default)]
    pub choices: Vec<ChoiceOverride>,
    #[serde(default)]
    pub toggles: Vec<OptionToggle>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceOverride {
    pub field: CategoricalField,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionToggle {
    pub field: MultiSelectField,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Error, PartialEq)]
pub enum FieldParseError {
    #[error("expected `field=value`, got `{0}`")]
    MissingValue(String),
    #[error("expected `field:label=true|false`, got `{0}`")]
    MissingLabel(String),
    #[error("`{0}` is not a categorical field")]
    NotCategorical(String),
    #[error("`{0}` is not a multi-select field")]
    NotMultiSelect(String),
    #[error("invalid boolean `{0}`")]
    InvalidBool(String),
}

impl FromStr for ChoiceOverride {
    type Err = FieldParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, value) = s
            .split_once('=')
            .ok_or_else(|| FieldParseError::MissingValue(s.to_string()))?;
        let field = CategoricalField::from_str(field)
            .map_err(|_| FieldParseError::NotCategorical(field.trim().to_string()))?;
        Ok(Self {
            field,
            value: value.trim().to_string(),
        })
    }
}

impl FromStr for OptionToggle {
    type Err = FieldParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (target, flag) = s.rsplit_once('=').unwrap_or((s, "true"));
        let (field, label) = target
            .split_once(':')
            .ok_or_else(|| FieldParseError::MissingLabel(s.to_string()))?;
        let field = MultiSelectField::from_str(field)
            .map_err(|_| FieldParseError::NotMultiSelect(field.trim().to_string()))?;
        let selected = match flag.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "ja" | "on" => true,
            "false" | "0" | "nee" | "off" => false,
            other => return Err(FieldParseError::InvalidBool(other.to_string())),
        };
        Ok(Self {
            field,
            label: label.trim().to_string(),
            selected,
        })
    }
}
