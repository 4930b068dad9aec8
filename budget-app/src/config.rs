//! Optional `budget.toml` configuration.
//!
//! ```toml
//! data_dir = "data"
//! output_dir = "out"
//! log_level = "debug"
//! log_file = "budget.log"
//!
//! [pricing]
//! distributor_discount = 0.05
//! ```
//!
//! Every key is optional. Command-line flags override file values.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use budget_core::PricingConfig;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// File picked up from the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "budget.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Directory holding `clients.json`, `products.json` and `rates.json`.
    pub data_dir: PathBuf,

    /// Directory exported budgets are written to.
    pub output_dir: PathBuf,

    /// `EnvFilter` directive; `RUST_LOG` wins when neither file nor flag set it.
    pub log_level: Option<String>,

    pub log_file: Option<PathBuf>,

    pub pricing: PricingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("."),
            log_level: None,
            log_file: None,
            pricing: PricingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parses configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Reads and parses the file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Loads `path` when given. Otherwise loads [`DEFAULT_CONFIG_FILE`] from
    /// the working directory if it exists, and falls back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        if fallback.is_file() {
            return Self::load(fallback);
        }
        debug!("no configuration file, using defaults");
        Ok(Self::default())
    }
}

impl fmt::Display for AppConfig {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "Data directory:   {}", self.data_dir.display())?;
        writeln!(f, "Output directory: {}", self.output_dir.display())?;
        writeln!(
            f,
            "Log level:        {}",
            self.log_level.as_deref().unwrap_or("(default)")
        )?;
        match &self.log_file {
            Some(path) => writeln!(f, "Log file:         {}", path.display())?,
            None => writeln!(f, "Log file:         (none)")?,
        }
        write!(
            f,
            "Pricing:          factor {} / discount {} / credit {} / output tax {}",
            self.pricing.embedded_cost_factor,
            self.pricing.distributor_discount,
            self.pricing.purchase_icms_credit,
            self.pricing.output_tax
        )
    }
}
