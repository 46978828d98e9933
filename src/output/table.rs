use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::preset::PresetRecord;
use crate::scenario::ScenarioComparison;
use crate::scoring::classify::Tier;
use crate::scoring::ClassifierResult;
use crate::weights::ConfigWarning;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn tier_cell(tier: Tier) -> Cell {
    let color = match tier {
        Tier::A1 | Tier::A2 | Tier::A3 => Color::Green,
        Tier::B1 | Tier::B2 => Color::Yellow,
        Tier::C1 => Color::Red,
    };
    Cell::new(tier.to_string()).fg(color)
}

pub fn render_result_table(result: &ClassifierResult) -> String {
    let mut table = new_table();
    table.set_header(vec!["Score", "Tier", "Lead time", "Progress"]);
    table.add_row(Row::from(vec![
        Cell::new(&result.total_score_label),
        tier_cell(result.classification.code),
        Cell::new(&result.classification.lead),
        Cell::new(format!("{:.0}%", result.total_score_progress)),
    ]));

    let mut out = table.to_string();
    out.push('\n');
    out.push_str(&render_groups_table(result));
    out.push('\n');
    out.push_str(&render_contributors_table(result));
    out
}

pub fn render_groups_table(result: &ClassifierResult) -> String {
    let mut table = new_table();
    table.set_header(vec!["Group", "Score"]);
    for group in &result.group_scores {
        table.add_row(vec![group.title.clone(), group.score_label.clone()]);
    }
    table.to_string()
}

pub fn render_contributors_table(result: &ClassifierResult) -> String {
    let mut table = new_table();
    table.set_header(vec!["Rank", "Variable", "Detail"]);
    for (idx, contributor) in result.top_contributors.iter().enumerate() {
        table.add_row(vec![
            (idx + 1).to_string(),
            contributor.title.clone(),
            contributor.detail.clone(),
        ]);
    }
    table.to_string()
}

pub fn render_warnings_table(warnings: &[ConfigWarning]) -> String {
    let mut table = new_table();
    table.set_header(vec!["Warning"]);
    for warning in warnings {
        table.add_row(Row::from(vec![
            Cell::new(warning.to_string()).fg(Color::Yellow)
        ]));
    }
    table.to_string()
}

pub fn render_presets_table(presets: &[PresetRecord]) -> String {
    let mut table = new_table();
    table.set_header(vec!["Id", "Name", "Label", "Score", "Tier", "Saved"]);
    for preset in presets {
        let result = preset.data.scenario().evaluate();
        table.add_row(Row::from(vec![
            Cell::new(preset.id),
            Cell::new(&preset.name),
            Cell::new(preset.data.label.as_deref().unwrap_or("-")),
            Cell::new(&result.total_score_label),
            tier_cell(result.classification.code),
            Cell::new(preset.created_at.format("%Y-%m-%d %H:%M").to_string()),
        ]));
    }
    table.to_string()
}

pub fn render_comparison_table(cmp: &ScenarioComparison) -> String {
    let mut table = new_table();
    table.set_header(vec![
        String::new(),
        cmp.a.name.clone(),
        cmp.b.name.clone(),
        "Change".to_string(),
    ]);
    table.add_row(vec![
        "Total".to_string(),
        cmp.a.total_score_label.clone(),
        cmp.b.total_score_label.clone(),
        format!("{:+.1}", cmp.total_delta),
    ]);
    table.add_row(Row::from(vec![
        Cell::new("Tier"),
        tier_cell(cmp.a.classification.code),
        tier_cell(cmp.b.classification.code),
        Cell::new(if cmp.tier_changed { "changed" } else { "-" }),
    ]));
    for delta in &cmp.group_deltas {
        table.add_row(vec![
            delta.group.title().to_string(),
            format!("{:.1}", delta.a),
            format!("{:.1}", delta.b),
            format!("{:+.1}", delta.delta),
        ]);
    }

    let mut out = table.to_string();
    if cmp.identical {
        out.push_str("\nScenarios are identical.");
    }
    out
}
