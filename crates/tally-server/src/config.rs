//! Server configuration.

use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;
use tally_core::CalculatorConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    /// Persist failed calculations with their error message.
    #[serde(default)]
    pub record_failures: bool,
    #[serde(default = "default_history_limit")]
    pub default_history_limit: u32,
    #[serde(default = "default_max_history_limit")]
    pub max_history_limit: u32,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("./static")
}

fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tally")
        .join("calculator.db")
}

fn default_history_limit() -> u32 {
    50
}

fn default_max_history_limit() -> u32 {
    500
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            db_path: default_db_path(),
            record_failures: false,
            default_history_limit: default_history_limit(),
            max_history_limit: default_max_history_limit(),
        }
    }
}

impl Config {
    /// Load config from a specific file path.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load config from default location (config/default.toml) or fall back to defaults.
    pub fn load() -> Result<Self> {
        let config_path = PathBuf::from("config/default.toml");
        if config_path.exists() {
            return Self::load_from(&config_path);
        }

        Ok(Config::default())
    }

    /// Settings handed to the calculator core.
    pub fn calculator_config(&self) -> CalculatorConfig {
        CalculatorConfig {
            record_failures: self.record_failures,
            default_history_limit: self.default_history_limit,
            max_history_limit: self.max_history_limit.max(self.default_history_limit),
        }
    }
}
