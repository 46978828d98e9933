use chrono::{DateTime, Utc};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use serde::Serialize;

use crate::inputs::{ClassifierInput, MultiOptions};
use crate::scoring::classify::Tier;
use crate::scoring::ClassifierResult;

pub const REPORT_TITLE: &str = "Onboarding Classifier — Samenvatting";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReportSection {
    pub title: String,
    pub rows: Vec<(String, String)>,
}

/// Document data for a one-page summary. Rendering to PDF is left to the
/// consumer; [`render_report`] gives a terminal version.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Report {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub preset: Option<String>,
    pub classification: Tier,
    pub lead_time: String,
    pub total_score_label: String,
    pub sections: Vec<ReportSection>,
}

fn row(label: &str, value: impl ToString) -> (String, String) {
    (label.to_string(), value.to_string())
}

fn selected_list(options: &MultiOptions) -> String {
    let active: Vec<&str> = options
        .iter()
        .filter(|(_, on)| **on)
        .map(|(label, _)| label.as_str())
        .collect();
    if active.is_empty() {
        "Geen".to_string()
    } else {
        active.join(", ")
    }
}

fn section(title: &str, rows: Vec<(String, String)>) -> ReportSection {
    ReportSection {
        title: title.to_string(),
        rows,
    }
}

pub fn build_report(
    preset_name: Option<&str>,
    input: &ClassifierInput,
    result: &ClassifierResult,
) -> Report {
    let sections = vec![
        section(
            "Operationele kenmerken",
            vec![
                row("Aantal SKU's", input.sku_count),
                row("SKU-complexiteit", &input.sku_complexity),
                row("Ordervolume/mnd (gem.)", input.order_volume),
                row("Piekvolume", input.order_peak),
                row("Seizoensinvloeden", &input.seizoensinvloed),
                row("Retourpercentage", format!("{}%", input.retour_percentage)),
                row("VAS-activiteiten", selected_list(&input.vas_activiteiten)),
                row(
                    "Inbound bijzonderheden",
                    selected_list(&input.inbound_bijzonderheden),
                ),
            ],
        ),
        section(
            "Technische integratie",
            vec![
                row("Platformtype", &input.platform_type),
                row("Type koppeling", &input.type_koppeling),
                row("PostNL API's", selected_list(&input.postnl_apis)),
                row("Kanalen", &input.verzend_methoden),
            ],
        ),
        section(
            "Configuratie",
            vec![
                row("Configuratie door", &input.config_door),
                row("Mate van maatwerk", &input.mate_maatwerk),
                row("Mappingcomplexiteit", &input.mapping_complexiteit),
                row("Testcapaciteit", &input.test_capaciteit),
            ],
        ),
        section(
            "Organisatie",
            vec![
                row("Aantal afdelingen", input.aantal_afdelingen),
                row("Scopewijzigingen", &input.scope_wijzigingen),
            ],
        ),
        section(
            "Processen",
            vec![
                row("Voorraadbeheer", &input.voorraad_beheer),
                row("Replenishment", &input.replenishment),
                row("Retourproces", &input.retour_proces),
            ],
        ),
        section(
            "Rapportage & contract",
            vec![
                row("Dashboardgebruik", &input.dashboard_gebruik),
                row("Rapportagebehoefte", &input.rapportage_behoefte),
                row("Serviceuitbreiding", &input.service_uitbreiding),
            ],
        ),
        section(
            "Groepsscores",
            result
                .group_scores
                .iter()
                .map(|group| row(&group.title, &group.score_label))
                .collect(),
        ),
    ];

    Report {
        title: REPORT_TITLE.to_string(),
        generated_at: Utc::now(),
        preset: preset_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string),
        classification: result.classification.code,
        lead_time: result.classification.lead.clone(),
        total_score_label: result.total_score_label.clone(),
        sections,
    }
}

pub fn render_report(report: &Report) -> String {
    let mut out = String::new();
    out.push_str(&report.title);
    out.push('\n');
    out.push_str(&format!(
        "Datum: {}",
        report.generated_at.format("%Y-%m-%d %H:%M")
    ));
    if let Some(preset) = &report.preset {
        out.push_str(&format!("   •   Preset: {preset}"));
    }
    out.push_str(&format!(
        "\nClassificatie: {}    |    Verwachte doorlooptijd: {}    |    Score: {}\n",
        report.classification, report.lead_time, report.total_score_label
    ));

    for section in &report.sections {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Parameter", "Waarde"]);
        for (label, value) in &section.rows {
            table.add_row(vec![label.as_str(), value.as_str()]);
        }
        out.push_str(&format!("\n{}\n{}\n", section.title, table));
    }
    out
}
