//! Dashboard configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! environment variables, then command-line flags.
//!
//! ```toml
//! data_path = "US_Accidents_March23.csv"
//! row_limit = 100000
//! sample_size = 1000
//! timestamp_policy = "skip"
//! bind_addr = "0.0.0.0"
//! port = 8080
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;

use accident_dashboard_loader::{DEFAULT_ROW_LIMIT, TimestampPolicy};
use accident_dashboard_spatial::DEFAULT_SAMPLE_SIZE;
use serde::{Deserialize, Serialize};

/// Environment variable overriding [`DashboardConfig::data_path`].
pub const ENV_DATA_PATH: &str = "ACCIDENTS_CSV";
/// Environment variable overriding [`DashboardConfig::row_limit`].
pub const ENV_ROW_LIMIT: &str = "ACCIDENTS_ROW_LIMIT";
/// Environment variable overriding [`DashboardConfig::sample_size`].
pub const ENV_SAMPLE_SIZE: &str = "ACCIDENTS_SAMPLE_SIZE";
/// Environment variable overriding [`DashboardConfig::timestamp_policy`].
pub const ENV_TIMESTAMP_POLICY: &str = "ACCIDENTS_TIMESTAMP_POLICY";
/// Environment variable overriding [`DashboardConfig::bind_addr`].
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
/// Environment variable overriding [`DashboardConfig::port`].
pub const ENV_PORT: &str = "PORT";

/// Errors that can occur while building the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        /// Config file path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML or has unknown keys.
    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    /// An environment variable holds a value of the wrong shape.
    #[error("Invalid value '{value}' for {key}")]
    InvalidValue {
        /// Variable name.
        key: &'static str,
        /// Raw value.
        value: String,
    },
}

/// Runtime configuration for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Accident CSV to load.
    pub data_path: PathBuf,
    /// Maximum number of data rows read from the CSV.
    pub row_limit: usize,
    /// Number of accident locations drawn on the map.
    pub sample_size: usize,
    /// What to do with rows whose `Start_Time` cannot be parsed.
    pub timestamp_policy: TimestampPolicy,
    /// Address the HTTP server binds to.
    pub bind_addr: String,
    /// Port the HTTP server listens on.
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("US_Accidents_March23.csv"),
            row_limit: DEFAULT_ROW_LIMIT,
            sample_size: DEFAULT_SAMPLE_SIZE,
            timestamp_policy: TimestampPolicy::default(),
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl DashboardConfig {
    /// Parses a config from TOML. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the TOML is malformed or contains
    /// unknown keys.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::de::from_str(toml_str)?)
    }

    /// Reads a config from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Builds the config from defaults, the optional file, and the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, or an
    /// environment variable holds an invalid value.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match file {
            Some(path) => {
                log::info!("Reading config from {}", path.display());
                Self::from_file(path)?
            }
            None => Self::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    /// Applies overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a variable cannot be parsed.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `var`, which maps a variable name to its value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a value cannot be parsed.
    pub fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(value) = var(ENV_DATA_PATH) {
            self.data_path = PathBuf::from(value);
        }
        if let Some(value) = var(ENV_ROW_LIMIT) {
            self.row_limit = parse_var(ENV_ROW_LIMIT, &value)?;
        }
        if let Some(value) = var(ENV_SAMPLE_SIZE) {
            self.sample_size = parse_var(ENV_SAMPLE_SIZE, &value)?;
        }
        if let Some(value) = var(ENV_TIMESTAMP_POLICY) {
            self.timestamp_policy = parse_var(ENV_TIMESTAMP_POLICY, &value)?;
        }
        if let Some(value) = var(ENV_BIND_ADDR) {
            self.bind_addr = value;
        }
        if let Some(value) = var(ENV_PORT) {
            self.port = parse_var(ENV_PORT, &value)?;
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        })
}

fn parse_policy(value: &str) -> Result<TimestampPolicy, String> {
    value
        .parse()
        .map_err(|_| format!("expected `fail` or `skip`, got '{value}'"))
}

/// Command-line flags shared by every binary that builds a
/// [`DashboardConfig`].
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ConfigArgs {
    /// TOML config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Accident CSV to load
    #[arg(long, value_name = "PATH")]
    pub data: Option<PathBuf>,

    /// Maximum number of CSV rows to read
    #[arg(long, value_name = "N")]
    pub row_limit: Option<usize>,

    /// Number of accident locations drawn on the map
    #[arg(long, value_name = "N")]
    pub sample_size: Option<usize>,

    /// What to do with unparseable timestamps (`fail` or `skip`)
    #[arg(long, value_name = "POLICY", value_parser = parse_policy)]
    pub timestamp_policy: Option<TimestampPolicy>,

    /// Address to bind the server to
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Port to listen on
    #[arg(long)]
    pub port: Option<u16>,
}

impl ConfigArgs {
    /// Loads the layered config and applies these flags on top.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file or environment is invalid.
    pub fn resolve(&self) -> Result<DashboardConfig, ConfigError> {
        let mut config = DashboardConfig::load(self.config.as_deref())?;
        self.apply_to(&mut config);
        Ok(config)
    }

    /// Overwrites every field of `config` that has a flag set.
    pub fn apply_to(&self, config: &mut DashboardConfig) {
        if let Some(data) = &self.data {
            config.data_path.clone_from(data);
        }
        if let Some(row_limit) = self.row_limit {
            config.row_limit = row_limit;
        }
        if let Some(sample_size) = self.sample_size {
            config.sample_size = sample_size;
        }
        if let Some(policy) = self.timestamp_policy {
            config.timestamp_policy = policy;
        }
        if let Some(bind) = &self.bind {
            config.bind_addr.clone_from(bind);
        }
        if let Some(port) = self.port {
            config.port = port;
        }
    }
}
