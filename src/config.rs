use std::{path::Path, str::FromStr};

use bankmodel_core::BigDecimal;
use clap::Parser;
use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;

#[derive(Parser, Debug)]
#[command(name = "bankmodel", about = "Run account transfers against an in-memory bank")]
pub struct CliArgs {
    /// Path to config file
    #[arg(short, long, default_value = "bank.toml")]
    pub config: String,

    /// Log level (overrides config file)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Emit logs as JSON (overrides config file)
    #[arg(long)]
    pub json_logs: bool,

    /// Bank name (overrides config file)
    #[arg(short, long)]
    pub bank_name: Option<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_logging")]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub bank: BankConfig,

    #[serde(default)]
    pub accounts: Vec<AccountConfig>,

    #[serde(default)]
    pub transfers: Vec<TransferConfig>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct BankConfig {
    /// Left unset when absent, matching a freshly created bank.
    #[serde(default)]
    pub name: Option<String>,
}

/// An account opened at startup. Amounts are strings so no precision is lost
/// to TOML floats.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AccountConfig {
    pub owner: String,
    #[serde(deserialize_with = "deserialize_amount")]
    pub balance: BigDecimal,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TransferConfig {
    pub from: String,
    pub to: String,
    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: BigDecimal,
}

/// Amounts must be TOML strings; a bare float would already have lost
/// digits before it reached us.
fn deserialize_amount<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    BigDecimal::from_str(raw.trim()).map_err(serde::de::Error::custom)
}

fn default_logging() -> LoggingConfig {
    LoggingConfig {
        level: default_log_level(),
        json: false,
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            logging: default_logging(),
            bank: BankConfig::default(),
            accounts: Vec::new(),
            transfers: Vec::new(),
        }
    }
}

impl Config {
    /// Reads the config file named on the command line and applies CLI
    /// overrides. A missing file yields the defaults; a malformed one is an
    /// error.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(&cli.config)?;

        // CLI overrides
        if let Some(ref level) = cli.log_level {
            config.logging.level = level.clone();
        }
        if cli.json_logs {
            config.logging.json = true;
        }
        if let Some(ref name) = cli.bank_name {
            config.bank.name = Some(name.clone());
        }

        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file not found, using defaults");
                Ok(Config::default())
            }
            Err(e) => Err(ConfigError::Io(e)),
        }
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }
}
