//! Configuration module for intentql.
//!
//! Handles compiler defaults, the catalog source and logging settings.

mod settings;

pub use settings::{
    expand_env_vars, CatalogSettings, CatalogSource, LoggingSettings, Settings, SettingsError,
    CONFIG_ENV_VAR,
};
