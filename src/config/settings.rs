//! TOML-based configuration for intentql.
//!
//! Supports a config file (intentql.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [compiler]
//! order_fallback = "metric_desc"
//! default_limit = 1000
//! max_limit = 10000
//! reference_date = "2024-05-15"  # pin relative ranges (tests, backfills)
//!
//! [catalog]
//! path = "${INTENTQL_HOME}/catalog.toml"
//! # or: sample = "multi_schema"
//!
//! [logging]
//! level = "info"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::samples::SampleCatalog;
use crate::compile::CompileOptions;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "INTENTQL_CONFIG";

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
    /// Compilation defaults.
    pub compiler: CompileOptions,

    /// Where the semantic catalog comes from.
    pub catalog: CatalogSettings,

    pub logging: LoggingSettings,
}

/// Catalog source. At most one of `path` and `sample` may be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Catalog definition file (supports ${ENV_VAR} expansion).
    pub path: Option<String>,

    /// Name of a built-in sample catalog.
    pub sample: Option<String>,
}

/// Where to load the catalog from, once settings are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    File(PathBuf),
    Sample(SampleCatalog),
}

impl CatalogSettings {
    /// Resolve the configured source, or `None` when nothing is configured.
    pub fn source(&self) -> Result<Option<CatalogSource>, SettingsError> {
        match (&self.path, &self.sample) {
            (Some(_), Some(_)) => Err(SettingsError::InvalidConfig(
                "catalog.path and catalog.sample are mutually exclusive".to_string(),
            )),
            (Some(path), None) => Ok(Some(CatalogSource::File(PathBuf::from(expand_env_vars(
                path,
            )?)))),
            (None, Some(sample)) => sample
                .parse::<SampleCatalog>()
                .map(|s| Some(CatalogSource::Sample(s)))
                .map_err(|e| SettingsError::InvalidConfig(e.to_string())),
            (None, None) => Ok(None),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter used when `RUST_LOG` is unset (e.g. "info", "intentql=debug").
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
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
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        if settings.compiler.max_limit == 0 {
            return Err(SettingsError::InvalidConfig(
                "compiler.max_limit must be positive".to_string(),
            ));
        }
        if let Some(limit) = settings.compiler.default_limit {
            if limit == 0 || limit > settings.compiler.max_limit {
                return Err(SettingsError::InvalidConfig(format!(
                    "compiler.default_limit must be between 1 and {}",
                    settings.compiler.max_limit
                )));
            }
        }
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `INTENTQL_CONFIG`
    /// 2. `./intentql.toml`
    /// 3. `~/.config/intentql/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("intentql.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("intentql").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
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

        let mut var_name = String::new();
        if chars.peek() == Some(&'{') {
            chars.next();
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                var_name.push(ch);
            }
            if !closed {
                return Err(SettingsError::InvalidConfig(format!(
                    "unterminated '${{{}' in '{}'",
                    var_name, s
                )));
            }
        } else {
            while let Some(&ch) = chars.peek() {
                if !(ch.is_alphanumeric() || ch == '_') {
                    break;
                }
                var_name.push(ch);
                chars.next();
            }
            if var_name.is_empty() {
                result.push('$');
                continue;
            }
        }

        let value = env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name))?;
        result.push_str(&value);
    }

    Ok(result)
}
