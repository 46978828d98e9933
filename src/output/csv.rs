use anyhow::Result;

use crate::inputs::ClassifierInput;
use crate::preset::PresetRecord;
use crate::scenario::ScenarioComparison;
use crate::scoring::ClassifierResult;
use crate::variables::{GroupKey, VariableKey, VariableKind};

/// Raw input value as exported: numbers as written, multi-selects as their
/// selected labels joined by `separator`.
pub fn input_value(input: &ClassifierInput, key: VariableKey, separator: &str) -> String {
    match key.kind() {
        VariableKind::Linear => input
            .numeric(key)
            .map(|v| v.to_string())
            .unwrap_or_default(),
        VariableKind::Categorical(field) => input.choice(field).to_string(),
        VariableKind::MultiSelect(field) => input.selected_labels(field).join(separator),
    }
}

pub fn result_to_csv(input: &ClassifierInput, result: &ClassifierResult) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);

    let mut header = vec![
        "totalScore".to_string(),
        "class".to_string(),
        "lead".to_string(),
    ];
    header.extend(VariableKey::ALL.iter().map(|key| key.as_str().to_string()));
    header.extend(
        result
            .group_scores
            .iter()
            .map(|group| format!("group_{}", group.key)),
    );
    writer.write_record(&header)?;

    let mut row = vec![
        result.total_score_label.clone(),
        result.classification.code.to_string(),
        result.classification.lead.clone(),
    ];
    row.extend(
        VariableKey::ALL
            .iter()
            .map(|key| input_value(input, *key, "; ")),
    );
    row.extend(
        result
            .group_scores
            .iter()
            .map(|group| group.score_label.clone()),
    );
    writer.write_record(&row)?;

    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn comparison_to_csv(cmp: &ScenarioComparison) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    let mut header = vec![
        "scenario".to_string(),
        "totalScore".to_string(),
        "class".to_string(),
        "lead".to_string(),
    ];
    header.extend(GroupKey::ALL.iter().map(|group| format!("group_{group}")));
    writer.write_record(&header)?;

    for (side, pick_b) in [(&cmp.a, false), (&cmp.b, true)] {
        let mut row = vec![
            side.name.clone(),
            side.total_score_label.clone(),
            side.classification.code.to_string(),
            side.classification.lead.clone(),
        ];
        row.extend(cmp.group_deltas.iter().map(|delta| {
            let score = if pick_b { delta.b } else { delta.a };
            format!("{score:.1}")
        }));
        writer.write_record(&row)?;
    }

    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn presets_to_csv(presets: &[PresetRecord]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["id", "name", "label", "created_at", "fingerprint"])?;
    for preset in presets {
        writer.write_record([
            preset.id.to_string(),
            preset.name.clone(),
            preset.data.label.clone().unwrap_or_default(),
            preset.created_at.to_rfc3339(),
            preset.fingerprint.clone(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}
