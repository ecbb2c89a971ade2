//! Configuration loading and config file resolution
//!
//! Config file resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. `RECSYS_CONFIG` environment variable
//! 3. User config directory (`<config_dir>/recsys/config.toml`)
//! 4. Compiled defaults (fallback)
//!
//! An explicitly named file (CLI or environment) must exist and parse. A missing
//! file at the default location only produces a warning.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "RECSYS_CONFIG";

/// Canopy loose threshold (C1)
pub const DEFAULT_LOOSE_THRESHOLD: f64 = 6.0;
/// Canopy tight threshold (C2)
pub const DEFAULT_TIGHT_THRESHOLD: f64 = 2.0;
/// Number of top subjects used as distance dimensions
pub const DEFAULT_TOP_SUBJECTS: usize = 5;

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Source platform database (profiles, subjects, learning objects)
    pub source_database: PathBuf,
    /// Recommender database (clusters, memberships, rankings)
    pub recsys_database: PathBuf,
    pub clustering: ClusteringConfig,
    pub ranking: RankingConfig,
    pub logging: LoggingConfig,
}

/// Canopy clustering parameters
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Maximum distance for (overlapping) membership
    pub loose: f64,
    /// Distance below which a candidate leaves the pool
    pub tight: f64,
    pub top_subjects: usize,
    /// Id given to the first canopy of a run
    pub canopy_id_base: i64,
}

/// Ranking pass parameters
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Clusters ranked concurrently
    pub concurrency: usize,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for TomlConfig {
    fn default() -> Self {
        let data_dir = default_data_dir();
        Self {
            source_database: data_dir.join("vish.db"),
            recsys_database: data_dir.join("recsys.db"),
            clustering: ClusteringConfig::default(),
            ranking: RankingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            loose: DEFAULT_LOOSE_THRESHOLD,
            tight: DEFAULT_TIGHT_THRESHOLD,
            top_subjects: DEFAULT_TOP_SUBJECTS,
            canopy_id_base: 1,
        }
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self { concurrency: 4 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl ClusteringConfig {
    /// Check `loose > tight >= 0` and a non-empty dimension count
    pub fn validate(&self) -> Result<()> {
        validate_thresholds(self.loose, self.tight)?;
        if self.top_subjects == 0 {
            return Err(Error::Config(
                "clustering.top_subjects must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl RankingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(Error::Config(
                "ranking.concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Canopy threshold invariant: both finite, `loose > tight >= 0`
pub fn validate_thresholds(loose: f64, tight: f64) -> Result<()> {
    if !loose.is_finite() || !tight.is_finite() {
        return Err(Error::Config(format!(
            "canopy thresholds must be finite (loose = {}, tight = {})",
            loose, tight
        )));
    }
    if tight < 0.0 {
        return Err(Error::Config(format!(
            "tight threshold must be >= 0 (tight = {})",
            tight
        )));
    }
    if loose <= tight {
        return Err(Error::Config(format!(
            "loose threshold must be greater than tight threshold (loose = {}, tight = {})",
            loose, tight
        )));
    }
    Ok(())
}

impl TomlConfig {
    /// Parse a TOML document; absent keys take compiled defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid config: {}", e)))
    }

    /// Read and parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
    }

    pub fn validate(&self) -> Result<()> {
        self.clustering.validate()?;
        self.ranking.validate()
    }
}

/// Where the config file came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLocation {
    /// Named on the command line or in `RECSYS_CONFIG`; must exist
    Explicit(PathBuf),
    /// Platform default location; may be absent
    Default(PathBuf),
    /// No config directory on this platform
    Unavailable,
}

/// Resolves and loads the config file
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
    env_var_name: String,
}

impl ConfigResolver {
    pub fn new(cli_path: Option<PathBuf>) -> Self {
        Self {
            cli_path,
            env_var_name: CONFIG_ENV_VAR.to_string(),
        }
    }

    /// Use a different environment variable (tests)
    pub fn with_env_var(mut self, name: impl Into<String>) -> Self {
        self.env_var_name = name.into();
        self
    }

    pub fn locate(&self) -> ConfigLocation {
        if let Some(path) = &self.cli_path {
            return ConfigLocation::Explicit(path.clone());
        }

        if let Ok(path) = std::env::var(&self.env_var_name) {
            if !path.is_empty() {
                return ConfigLocation::Explicit(PathBuf::from(path));
            }
        }

        match dirs::config_dir() {
            Some(dir) => ConfigLocation::Default(dir.join("recsys").join("config.toml")),
            None => ConfigLocation::Unavailable,
        }
    }

    /// Load and validate the effective configuration
    pub fn load(&self) -> Result<TomlConfig> {
        let config = match self.locate() {
            ConfigLocation::Explicit(path) => {
                info!("Loading config: {}", path.display());
                TomlConfig::from_file(&path)?
            }
            ConfigLocation::Default(path) if path.exists() => {
                info!("Loading config: {}", path.display());
                TomlConfig::from_file(&path)?
            }
            ConfigLocation::Default(path) => {
                warn!(
                    "Config file not found at {}, using compiled defaults",
                    path.display()
                );
                TomlConfig::default()
            }
            ConfigLocation::Unavailable => {
                warn!("No config directory on this platform, using compiled defaults");
                TomlConfig::default()
            }
        };

        config.validate()?;
        Ok(config)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("recsys"))
        .unwrap_or_else(|| PathBuf::from("./recsys_data"))
}
