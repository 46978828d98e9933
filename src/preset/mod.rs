pub mod migrations;
pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::inputs::ClassifierInput;
use crate::scoring::engine::Scenario;
use crate::weights::{GroupWeights, Thresholds, VarWeights};

/// Names shorter than this are rejected; a blank name gets a generated one.
pub const MIN_PRESET_NAME_LEN: usize = 3;

pub const BUNDLE_KEYS: [&str; 4] = ["inputs", "gw", "vw", "th"];

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("incomplete preset bundle, missing: {}", .0.join(", "))]
    Incomplete(Vec<&'static str>),
    #[error("malformed preset bundle: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Error, PartialEq)]
pub enum PresetError {
    #[error("preset name `{0}` is too short (minimum {} characters)", MIN_PRESET_NAME_LEN)]
    NameTooShort(String),
    #[error("preset not found: {0}")]
    NotFound(String),
}

/// A bundle as received from a file, request body or database row. Every key
/// is optional here so that missing keys can be reported together.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BundleDraft {
    #[serde(default)]
    pub inputs: Option<ClassifierInput>,
    #[serde(default)]
    pub gw: Option<GroupWeights>,
    #[serde(default)]
    pub vw: Option<VarWeights>,
    #[serde(default)]
    pub th: Option<Thresholds>,
    #[serde(default)]
    pub label: Option<String>,
}

impl BundleDraft {
    pub fn missing_keys(&self) -> Vec<&'static str> {
        let present = [
            self.inputs.is_some(),
            self.gw.is_some(),
            self.vw.is_some(),
            self.th.is_some(),
        ];
        BUNDLE_KEYS
            .into_iter()
            .zip(present)
            .filter(|(_, present)| !present)
            .map(|(key, _)| key)
            .collect()
    }

    pub fn into_payload(self) -> Result<PresetPayload, BundleError> {
        match (self.inputs, self.gw, self.vw, self.th) {
            (Some(inputs), Some(gw), Some(vw), Some(th)) => Ok(PresetPayload {
                inputs,
                gw,
                vw,
                th,
                label: self.label,
            }),
            (inputs, gw, vw, th) => Err(BundleError::Incomplete(
                BundleDraft {
                    inputs,
                    gw,
                    vw,
                    th,
                    label: None,
                }
                .missing_keys(),
            )),
        }
    }
}

/// Stored preset data: a complete scenario plus an optional version label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PresetPayload {
    pub inputs: ClassifierInput,
    pub gw: GroupWeights,
    pub vw: VarWeights,
    pub th: Thresholds,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl PresetPayload {
    /// Parses from text so multi-select labels keep their stored order.
    pub fn from_json(raw: &str) -> Result<Self, BundleError> {
        serde_json::from_str::<BundleDraft>(raw)?.into_payload()
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, BundleError> {
        serde_json::from_value::<BundleDraft>(value)?.into_payload()
    }

    pub fn from_scenario(scenario: Scenario, label: Option<String>) -> Self {
        Self {
            inputs: scenario.inputs,
            gw: scenario.gw,
            vw: scenario.vw,
            th: scenario.th,
            label,
        }
    }

    pub fn scenario(&self) -> Scenario {
        self.clone().into_scenario()
    }

    pub fn into_scenario(self) -> Scenario {
        Scenario {
            inputs: self.inputs,
            gw: self.gw,
            vw: self.vw,
            th: self.th,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PresetRecord {
    pub id: i64,
    pub name: String,
    pub data: PresetPayload,
    pub fingerprint: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub updated: usize,
    pub id: Option<i64>,
}

/// Row lookup key: a numeric id, otherwise an exact name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresetRef {
    Id(i64),
    Name(String),
}

impl PresetRef {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<i64>() {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Name(trimmed.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{BundleError, PresetPayload, PresetRef};
    use crate::scoring::engine::Scenario;

    fn bundle() -> serde_json::Value {
        serde_json::to_value(PresetPayload::from_scenario(
            Scenario::default(),
            Some("v1.0.2".to_string()),
        ))
        .expect("serialize")
    }

    #[test]
    fn accepts_complete_bundle() {
        let payload = PresetPayload::from_value(bundle()).expect("payload");
        assert_eq!(payload.label.as_deref(), Some("v1.0.2"));
        assert_eq!(payload.into_scenario(), Scenario::default());
    }

    #[test]
    fn reports_every_missing_key() {
        let mut value = bundle();
        let map = value.as_object_mut().expect("object");
        map.remove("gw");
        map.remove("th");
        match PresetPayload::from_value(value) {
            Err(BundleError::Incomplete(missing)) => assert_eq!(missing, vec!["gw", "th"]),
            other => panic!("expected incomplete bundle, got {other:?}"),
        }

        let err = PresetPayload::from_value(json!({ "label": "smoke" })).expect_err("empty");
        assert_eq!(
            err.to_string(),
            "incomplete preset bundle, missing: inputs, gw, vw, th"
        );
    }

    #[test]
    fn null_keys_count_as_missing() {
        let mut value = bundle();
        value["vw"] = serde_json::Value::Null;
        assert!(matches!(
            PresetPayload::from_value(value),
            Err(BundleError::Incomplete(missing)) if missing == vec!["vw"]
        ));
    }

    #[test]
    fn malformed_sections_are_rejected() {
        let mut value = bundle();
        value["th"] = json!({ "A1": "twenty" });
        assert!(matches!(
            PresetPayload::from_value(value),
            Err(BundleError::Malformed(_))
        ));
    }

    #[test]
    fn text_parsing_keeps_option_order() {
        let mut scenario = Scenario::default();
        scenario.inputs.postnl_apis.reverse();
        let raw = serde_json::to_string(&PresetPayload::from_scenario(scenario, None))
            .expect("serialize");
        let payload = PresetPayload::from_json(&raw).expect("payload");
        let labels: Vec<_> = payload.inputs.postnl_apis.keys().cloned().collect();
        assert_eq!(labels, vec!["Track & Trace", "Retour", "Checkout", "Locatie"]);
    }

    #[test]
    fn parses_references() {
        assert_eq!(PresetRef::parse("12"), PresetRef::Id(12));
        assert_eq!(
            PresetRef::parse(" Webshop XL "),
            PresetRef::Name("Webshop XL".to_string())
        );
    }
}
