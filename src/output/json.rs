use anyhow::Result;
use serde::Serialize;

use crate::scoring::engine::Scenario;
use crate::scoring::ClassifierResult;
use crate::weights::ConfigWarning;

/// Everything a caller needs after one scoring run.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreReport<'a> {
    pub preset: Option<&'a str>,
    pub fingerprint: String,
    pub result: &'a ClassifierResult,
    pub warnings: &'a [ConfigWarning],
    pub scenario: &'a Scenario,
}

pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::{render_json, ScoreReport};
    use crate::scoring::engine::Scenario;

    #[test]
    fn report_carries_result_and_snapshot() {
        let scenario = Scenario::default();
        let result = scenario.evaluate();
        let report = ScoreReport {
            preset: Some("Webshop"),
            fingerprint: scenario.fingerprint(),
            result: &result,
            warnings: &[],
            scenario: &scenario,
        };
        let rendered = render_json(&report).expect("render");
        let value: serde_json::Value = serde_json::from_str(&rendered).expect("parse");
        assert_eq!(value["preset"], "Webshop");
        assert_eq!(value["result"]["totalScoreLabel"], "37.5");
        assert_eq!(value["scenario"]["th"]["A1"], 20.0);
        assert!(value["warnings"].as_array().expect("array").is_empty());
    }
}
