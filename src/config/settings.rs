//! TOML-based configuration for groundwork.
//!
//! Supports a config file (groundwork.toml) with environment variable
//! expansion in paths. Every section is optional.
//!
//! Example configuration:
//! ```toml
//! [metadata]
//! catalog_path = "${GROUNDWORK_HOME}/catalog.json"
//!
//! [resolver]
//! column_threshold = 0.7
//! sample_threshold = 0.8
//! sql_pair_default_confidence = 0.7
//! heuristic_confidence = 0.6
//! column_top_k = 3
//! sample_top_k = 3
//! sql_pair_top_k = 3
//!
//! [context]
//! table_top_k = 3
//!
//! [temporal]
//! default_window_days = 30
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::filters::temporal::DEFAULT_WINDOW_DAYS;
use crate::resolver::{thresholds, ResolverConfig};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "GROUNDWORK_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "groundwork.toml";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Metadata catalog location.
    pub metadata: MetadataSettings,

    /// Entity -> column cascade tuning.
    pub resolver: ResolverSettings,

    /// Primary-table selection.
    pub context: ContextSettings,

    /// Relative date resolution.
    pub temporal: TemporalSettings,
}

/// Metadata configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MetadataSettings {
    /// Path to a JSON catalog (supports ${ENV_VAR} expansion).
    pub catalog_path: Option<String>,
}

impl MetadataSettings {
    /// The catalog path with environment variables expanded.
    pub fn resolved_catalog_path(&self) -> Result<Option<PathBuf>, SettingsError> {
        self.catalog_path
            .as_deref()
            .map(|p| expand_env_vars(p).map(PathBuf::from))
            .transpose()
    }
}

/// Resolution cascade thresholds.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// Stage 1 acceptance, exclusive.
    pub column_threshold: f64,

    /// Stage 2 acceptance, exclusive.
    pub sample_threshold: f64,

    /// Stage 3 confidence when a stored mapping carries none.
    pub sql_pair_default_confidence: f64,

    /// Stage 5 confidence.
    pub heuristic_confidence: f64,

    pub column_top_k: usize,
    pub sample_top_k: usize,
    pub sql_pair_top_k: usize,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            column_threshold: thresholds::COLUMN_METADATA,
            sample_threshold: thresholds::SAMPLE_VALUE,
            sql_pair_default_confidence: thresholds::SQL_PAIR_DEFAULT,
            heuristic_confidence: thresholds::HEURISTIC,
            column_top_k: thresholds::TOP_K,
            sample_top_k: thresholds::TOP_K,
            sql_pair_top_k: thresholds::TOP_K,
        }
    }
}

impl From<&ResolverSettings> for ResolverConfig {
    fn from(settings: &ResolverSettings) -> Self {
        Self {
            column_threshold: settings.column_threshold,
            sample_threshold: settings.sample_threshold,
            sql_pair_default_confidence: settings.sql_pair_default_confidence,
            heuristic_confidence: settings.heuristic_confidence,
            column_top_k: settings.column_top_k,
            sample_top_k: settings.sample_top_k,
            sql_pair_top_k: settings.sql_pair_top_k,
        }
    }
}

/// Context assembly settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ContextSettings {
    /// Tables requested from the primary-table search.
    pub table_top_k: usize,
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            table_top_k: thresholds::TOP_K,
        }
    }
}

/// Temporal settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TemporalSettings {
    /// Window for unrecognized relative expressions.
    pub default_window_days: u64,
}

impl Default for TemporalSettings {
    fn default() -> Self {
        Self {
            default_window_days: DEFAULT_WINDOW_DAYS,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `GROUNDWORK_CONFIG`
    /// 2. `./groundwork.toml`
    /// 3. `~/.config/groundwork/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("groundwork").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Reject thresholds outside [0, 1] and zero search depths.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let r = &self.resolver;
        let unit_values = [
            ("resolver.column_threshold", r.column_threshold),
            ("resolver.sample_threshold", r.sample_threshold),
            ("resolver.sql_pair_default_confidence", r.sql_pair_default_confidence),
            ("resolver.heuristic_confidence", r.heuristic_confidence),
        ];
        for (key, value) in unit_values {
            if !(0.0..=1.0).contains(&value) {
                return Err(SettingsError::InvalidConfig(format!(
                    "{} must be between 0 and 1, got {}",
                    key, value
                )));
            }
        }

        let depths = [
            ("resolver.column_top_k", r.column_top_k),
            ("resolver.sample_top_k", r.sample_top_k),
            ("resolver.sql_pair_top_k", r.sql_pair_top_k),
            ("context.table_top_k", self.context.table_top_k),
        ];
        for (key, value) in depths {
            if value == 0 {
                return Err(SettingsError::InvalidConfig(format!(
                    "{} must be at least 1",
                    key
                )));
            }
        }

        Ok(())
    }

    /// Cascade configuration derived from `[resolver]`.
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig::from(&self.resolver)
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax. A lone `$` is kept as is.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.next_if_eq(&'{').is_some() {
            chars.by_ref().take_while(|&ch| ch != '}').collect()
        } else {
            let mut name = String::new();
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                name.push(ch);
            }
            if name.is_empty() {
                result.push('$');
                continue;
            }
            name
        };

        let value = env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name))?;
        result.push_str(&value);
    }

    Ok(result)
}
