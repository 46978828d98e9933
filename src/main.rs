use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use onboarding_classifier::config::{Config, ConfigOverrides};
use onboarding_classifier::inputs::{ChoiceOverride, InputOverrides, OptionToggle};
use onboarding_classifier::output::csv::{comparison_to_csv, presets_to_csv, result_to_csv};
use onboarding_classifier::output::json::{render_json, ScoreReport};
use onboarding_classifier::output::report::{build_report, render_report};
use onboarding_classifier::output::table::{
    render_comparison_table, render_presets_table, render_result_table, render_warnings_table,
};
use onboarding_classifier::preset::store::PresetStore;
use onboarding_classifier::preset::{PresetPayload, PresetRecord};
use onboarding_classifier::scenario::compare::compare_scenarios;
use onboarding_classifier::scenario::{NamedScenario, ScenarioComparison};
use onboarding_classifier::scoring::classify::Tier;
use onboarding_classifier::scoring::engine::Scenario;
use onboarding_classifier::server::run_server;
use onboarding_classifier::variables::{GroupKey, VariableKey};
use onboarding_classifier::weights::Assignment;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ExportFormat {
    Csv,
    Report,
}

#[derive(Debug, Parser)]
#[command(
    name = "onboarding-classifier",
    about = "Onboarding complexity scoring and tier classification"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long)]
    db: Option<String>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[command(subcommand)]
    command: Commands,
}

/// Where the starting snapshot comes from.
#[derive(Debug, clap::Args, Clone, Default)]
struct SourceArgs {
    /// JSON bundle with `inputs`, `gw`, `vw` and `th`.
    #[arg(long)]
    scenario: Option<PathBuf>,
    /// Stored preset id or name.
    #[arg(long)]
    preset: Option<String>,
}

#[derive(Debug, clap::Args, Clone, Default)]
struct EditArgs {
    #[arg(long = "sku-count")]
    sku_count: Option<f64>,
    #[arg(long = "order-volume")]
    order_volume: Option<f64>,
    #[arg(long = "order-peak")]
    order_peak: Option<f64>,
    #[arg(long = "retour-percentage")]
    retour_percentage: Option<f64>,
    #[arg(long = "aantal-afdelingen")]
    aantal_afdelingen: Option<f64>,
    /// Categorical answer, `field=value`.
    #[arg(long = "set")]
    choices: Vec<ChoiceOverride>,
    /// Multi-select option, `field:label=true|false`.
    #[arg(long = "toggle")]
    toggles: Vec<OptionToggle>,
    #[arg(long = "group-weight")]
    group_weights: Vec<Assignment<GroupKey>>,
    #[arg(long = "var-weight")]
    var_weights: Vec<Assignment<VariableKey>>,
    #[arg(long = "threshold")]
    thresholds: Vec<Assignment<Tier>>,
}

impl EditArgs {
    fn input_overrides(&self) -> InputOverrides {
        InputOverrides {
            sku_count: self.sku_count,
            order_volume: self.order_volume,
            order_peak: self.order_peak,
            retour_percentage: self.retour_percentage,
            aantal_afdelingen: self.aantal_afdelingen,
            choices: self.choices.clone(),
            toggles: self.toggles.clone(),
        }
    }

    fn apply(&self, scenario: &mut Scenario) {
        scenario.inputs.apply_overrides(&self.input_overrides());
        for edit in &self.group_weights {
            scenario.gw.set(edit.key, edit.value);
        }
        for edit in &self.var_weights {
            scenario.vw.set(edit.key, edit.value);
        }
        for edit in &self.thresholds {
            scenario.th.set(edit.key, edit.value);
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    Score {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        edits: EditArgs,
    },
    Compare {
        /// Scenario file path or preset id/name.
        #[arg(long)]
        a: String,
        #[arg(long)]
        b: String,
    },
    Preset {
        #[command(subcommand)]
        action: PresetCommand,
    },
    Export {
        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        edits: EditArgs,
    },
    Defaults,
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[derive(Debug, Subcommand)]
enum PresetCommand {
    List,
    Show {
        target: String,
    },
    Save {
        #[arg(long, default_value = "")]
        name: String,
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        edits: EditArgs,
    },
    Update {
        target: String,
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        edits: EditArgs,
    },
    Delete {
        target: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    config.apply_overrides(ConfigOverrides {
        db_path: cli.db.clone(),
    });

    match &cli.command {
        Commands::Config { init, show } => {
            handle_config_command(*init, *show, &config, &config_path)?;
        }
        Commands::Serve { host, port } => {
            let host = host.clone().unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let bind = format!("{host}:{port}");
            let addr: SocketAddr = bind
                .parse()
                .map_err(|e| anyhow!("invalid bind address {bind}: {e}"))?;
            return run_server(config, addr).await;
        }
        Commands::Defaults => {
            let payload = PresetPayload::from_scenario(
                config.default_scenario(),
                Some(config.scoring.preset_label.clone()),
            );
            println!("{}", render_json(&payload)?);
        }
        Commands::Score { source, edits } => {
            let (name, scenario) = load_source(&config, source, edits)?;
            print_score(&config, name.as_deref(), &scenario, cli.output)?;
        }
        Commands::Compare { a, b } => {
            let a = resolve_named(&config, a)?;
            let b = resolve_named(&config, b)?;
            print_comparison(&compare_scenarios(&a, &b), cli.output)?;
        }
        Commands::Export {
            format,
            source,
            edits,
        } => {
            let (name, scenario) = load_source(&config, source, edits)?;
            let result = scenario.evaluate();
            match format {
                ExportFormat::Csv => print!("{}", result_to_csv(&scenario.inputs, &result)?),
                ExportFormat::Report => {
                    let report = build_report(name.as_deref(), &scenario.inputs, &result);
                    match cli.output {
                        OutputFormat::Json => println!("{}", render_json(&report)?),
                        _ => println!("{}", render_report(&report)),
                    }
                }
            }
        }
        Commands::Preset { action } => handle_preset_command(&config, action, cli.output)?,
    }

    Ok(())
}

fn handle_config_command(init: bool, show: bool, config: &Config, config_path: &Path) -> Result<()> {
    if init {
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if show || !init {
        println!("{}", render_json(config)?);
    }
    Ok(())
}

fn handle_preset_command(
    config: &Config,
    action: &PresetCommand,
    format: OutputFormat,
) -> Result<()> {
    let store = open_store(config)?;
    match action {
        PresetCommand::List => print_presets(&store.list()?, format)?,
        PresetCommand::Show { target } => {
            let record = store.require(target)?;
            let scenario = record.data.scenario();
            print_score(config, Some(&record.name), &scenario, format)?;
        }
        PresetCommand::Save {
            name,
            source,
            edits,
        } => {
            let (_, scenario) = load_source(config, source, edits)?;
            let payload = PresetPayload::from_scenario(
                scenario,
                Some(config.scoring.preset_label.clone()),
            );
            let record = store.save(name, &payload)?;
            println!("Saved preset {} (id {})", record.name, record.id);
        }
        PresetCommand::Update {
            target,
            name,
            source,
            edits,
        } => {
            let scenario = if source.scenario.is_none() && source.preset.is_none() {
                let mut scenario = store.require(target)?.data.into_scenario();
                edits.apply(&mut scenario);
                scenario
            } else {
                load_source(config, source, edits)?.1
            };
            let payload = PresetPayload::from_scenario(
                scenario,
                Some(config.scoring.preset_label.clone()),
            );
            let outcome = store.update(target, name.as_deref(), &payload)?;
            if outcome.updated == 0 {
                return Err(anyhow!("no preset matches {target}"));
            }
            println!("Updated preset {target}");
        }
        PresetCommand::Delete { target } => {
            let removed = store.delete(target)?;
            if removed == 0 {
                warn!("no preset matches {target}");
            }
            println!("Deleted {removed} preset(s)");
        }
    }
    Ok(())
}

fn open_store(config: &Config) -> Result<PresetStore> {
    let db_path = config.resolved_db_path();
    PresetStore::open(&db_path)
}

fn read_scenario_file(path: &Path) -> Result<Scenario> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed reading scenario: {}", path.display()))?;
    let payload = PresetPayload::from_json(&raw)
        .with_context(|| format!("invalid scenario file: {}", path.display()))?;
    Ok(payload.into_scenario())
}

/// Scenario file, stored preset or configured defaults, with CLI edits on top.
fn load_source(
    config: &Config,
    source: &SourceArgs,
    edits: &EditArgs,
) -> Result<(Option<String>, Scenario)> {
    let (name, mut scenario) = match (&source.scenario, &source.preset) {
        (Some(_), Some(_)) => return Err(anyhow!("use either --scenario or --preset, not both")),
        (Some(path), None) => (None, read_scenario_file(path)?),
        (None, Some(target)) => {
            let record = open_store(config)?.require(target)?;
            (Some(record.name), record.data.into_scenario())
        }
        (None, None) => (None, config.default_scenario()),
    };
    edits.apply(&mut scenario);
    Ok((name, scenario))
}

fn resolve_named(config: &Config, source: &str) -> Result<NamedScenario> {
    let path = Path::new(source);
    if path.is_file() {
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| source.to_string());
        return Ok(NamedScenario::new(name, read_scenario_file(path)?));
    }
    let record = open_store(config)?.require(source)?;
    info!("comparing preset {} (id {})", record.name, record.id);
    Ok(NamedScenario::new(record.name, record.data.into_scenario()))
}

fn print_score(
    config: &Config,
    preset: Option<&str>,
    scenario: &Scenario,
    format: OutputFormat,
) -> Result<()> {
    let warnings = scenario.warnings(config.scoring.weight_sum_tolerance);
    for warning in &warnings {
        warn!("{warning}");
    }
    let result = scenario.evaluate();
    match format {
        OutputFormat::Table => {
            if let Some(name) = preset {
                println!("Preset: {name}");
            }
            println!("{}", render_result_table(&result));
            if !warnings.is_empty() {
                println!("{}", render_warnings_table(&warnings));
            }
        }
        OutputFormat::Json => {
            let report = ScoreReport {
                preset,
                fingerprint: scenario.fingerprint(),
                result: &result,
                warnings: &warnings,
                scenario,
            };
            println!("{}", render_json(&report)?);
        }
        OutputFormat::Csv => print!("{}", result_to_csv(&scenario.inputs, &result)?),
    }
    Ok(())
}

fn print_comparison(cmp: &ScenarioComparison, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_comparison_table(cmp)),
        OutputFormat::Json => println!("{}", render_json(cmp)?),
        OutputFormat::Csv => print!("{}", comparison_to_csv(cmp)?),
    }
    Ok(())
}

fn print_presets(presets: &[PresetRecord], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_presets_table(presets)),
        OutputFormat::Json => println!("{}", render_json(presets)?),
        OutputFormat::Csv => print!("{}", presets_to_csv(presets)?),
    }
    Ok(())
}
