//! Optional TOML configuration for the `fairsplit` binary.
//!
//! Every key is optional; anything missing falls back to [`Config::default`].
//!
//! ```toml
//! backend = "sqlite"
//! connection_string = "fairsplit.db"
//! default_tax_year = 2024
//! log_level = "info"
//! log_file = "fairsplit.log"
//! ```
//!
//! Command-line flags override values read from the file.

use std::path::{Path, PathBuf};

use fairsplit_core::db::DbConfig;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub backend: String,
    pub connection_string: String,
    /// Year used when a household file or command does not name one.
    pub default_tax_year: i32,
    /// Bare level or full `EnvFilter` directive. `RUST_LOG` wins when set.
    pub log_level: String,
    /// Log records are also appended here when set.
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: "fairsplit.db".to_string(),
            default_tax_year: 2024,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

impl Config {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Reads `path` when given, otherwise returns the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Replaces the storage settings with any given on the command line.
    pub fn with_overrides(
        mut self,
        backend: Option<String>,
        connection_string: Option<String>,
    ) -> Self {
        if let Some(backend) = backend {
            self.backend = backend;
        }
        if let Some(connection_string) = connection_string {
            self.connection_string = connection_string;
        }
        self
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            backend: self.backend.clone(),
            connection_string: self.connection_string.clone(),
        }
    }
}
