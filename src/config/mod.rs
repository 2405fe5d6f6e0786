//! Configuration module for groundwork.
//!
//! Handles the TOML settings file and environment variable expansion.

mod settings;

pub use settings::{
    expand_env_vars, ContextSettings, MetadataSettings, ResolverSettings, Settings, SettingsError,
    TemporalSettings, CONFIG_ENV_VAR, LOCAL_CONFIG_FILE,
};
