use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::inputs::ClassifierInput;
use crate::scoring::engine::Scenario;
use crate::weights::{GroupWeights, Thresholds, VarWeights, DEFAULT_WEIGHT_SUM_TOLERANCE};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_weight_sum_tolerance")]
    pub weight_sum_tolerance: f64,
    #[serde(default = "default_preset_label")]
    pub preset_label: String,
}

/// Replacements for the built-in default weights and thresholds. A section
/// that is present must be complete.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DefaultsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gw: Option<GroupWeights>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vw: Option<VarWeights>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub th: Option<Thresholds>,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub db_path: Option<String>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/onboarding-classifier/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        Ok(parsed)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(db_path) = overrides.db_path {
            self.storage.db_path = db_path;
        }
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }

    /// Starting scenario: default inputs with configured weights and thresholds.
    pub fn default_scenario(&self) -> Scenario {
        Scenario {
            inputs: ClassifierInput::default(),
            gw: self.defaults.gw.unwrap_or_default(),
            vw: self.defaults.vw.unwrap_or_default(),
            th: self.defaults.th.unwrap_or_default(),
        }
    }

    pub fn default_template() -> String {
        let template = r#"[storage]
db_path = "~/.local/share/onboarding-classifier/presets.db"

[server]
host = "127.0.0.1"
port = 3001

[scoring]
# Group weights whose sum differs from 1.0 by more than this raise a warning.
weight_sum_tolerance = 0.0001
preset_label = "v1.0.2"

# Uncomment to replace the built-in defaults. Each section must list every key.
# [defaults.gw]
# operationeel = 0.25
# technisch = 0.15
# configuratie = 0.15
# organisatie = 0.14
# processen = 0.11
# rapportage = 0.1
# contract = 0.1
#
# [defaults.th]
# A1 = 20
# A2 = 35
# A3 = 50
# B1 = 65
# B2 = 80
# C1 = 100
"#;
        template.to_string()
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weight_sum_tolerance: default_weight_sum_tolerance(),
            preset_label: default_preset_label(),
        }
    }
}

fn default_db_path() -> String {
    "~/.local/share/onboarding-classifier/presets.db".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_weight_sum_tolerance() -> f64 {
    DEFAULT_WEIGHT_SUM_TOLERANCE
}

fn default_preset_label() -> String {
    "v1.0.2".to_string()
}

#[cfg(test)]
mod tests {
    use super::{Config, ConfigOverrides};
    use crate::scoring::engine::Scenario;
    use crate::weights::Thresholds;

    #[test]
    fn template_parses_to_defaults() {
        let parsed: Config = toml::from_str(&Config::default_template()).expect("template");
        assert_eq!(parsed.server.port, 3001);
        assert_eq!(parsed.scoring.preset_label, "v1.0.2");
        assert_eq!(parsed.scoring.weight_sum_tolerance, 0.0001);
        assert!(parsed.defaults.gw.is_none());
        assert_eq!(parsed.default_scenario(), Scenario::default());
    }

    #[test]
    fn defaults_sections_replace_builtins() {
        let parsed: Config = toml::from_str(
            r#"
[defaults.th]
A1 = 10
A2 = 30
A3 = 45
B1 = 60
B2 = 75
C1 = 100
"#,
        )
        .expect("config");
        let scenario = parsed.default_scenario();
        assert_eq!(
            scenario.th,
            Thresholds {
                a1: 10.0,
                a2: 30.0,
                a3: 45.0,
                b1: 60.0,
                b2: 75.0,
                c1: 100.0,
            }
        );
        assert_eq!(scenario.gw, Scenario::default().gw);
    }

    #[test]
    fn overrides_and_missing_file() {
        let mut config =
            Config::load(Some(std::path::Path::new("/nonexistent/onboarding.toml")))
                .expect("defaults");
        config.apply_overrides(ConfigOverrides {
            db_path: Some("/tmp/presets.db".to_string()),
        });
        assert_eq!(
            config.resolved_db_path(),
            std::path::PathBuf::from("/tmp/presets.db")
        );
    }
}
