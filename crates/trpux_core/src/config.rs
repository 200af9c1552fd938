//! Configuration system for TRPUX
//!
//! This module provides configuration structures and utilities for loading
//! and persisting TRPUX settings as TOML.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::{CoreError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrpuxConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub service: ServiceConfig,
}

/// Database configuration for SQLite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the catalog database file.
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("trpux")
                .join("catalog.db"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Lowest level to log, in `EnvFilter` syntax
    pub level: String,
    /// Directory for daily log files; file logging is off when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
    /// Write logs to the console
    pub console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            console: true,
        }
    }
}

/// Concurrency limits of the source service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Servers enumerated at once during a refresh
    pub refresh_concurrency: usize,
    /// Card fetches in flight at once
    pub fetch_concurrency: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            refresh_concurrency: 4,
            fetch_concurrency: 8,
        }
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        for (field, value) in [
            ("service.refresh_concurrency", self.refresh_concurrency),
            ("service.fetch_concurrency", self.fetch_concurrency),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Resolve a path relative to a base directory
/// If the path is absolute, return it as-is
pub fn resolve_path(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Load configuration from a TOML file.
///
/// Relative paths in the file are resolved against the file's directory.
pub async fn load_config(path: &Path) -> Result<TrpuxConfig> {
    let config_path = path.display().to_string();

    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        CoreError::config(
            &config_path,
            "file",
            "readable TOML file",
            ConfigError::Io(e.to_string()),
        )
    })?;

    let mut config: TrpuxConfig = toml::from_str(&content).map_err(|e| {
        CoreError::config(
            &config_path,
            "content",
            "valid TOML configuration",
            ConfigError::TomlParse(e.to_string()),
        )
    })?;

    config.service.validate().map_err(|cause| {
        let field = match &cause {
            ConfigError::InvalidValue { field, .. } => field.clone(),
            _ => "service".to_string(),
        };
        CoreError::config(&config_path, field, "a positive integer", cause)
    })?;

    let base_dir = path.parent().unwrap_or(Path::new("."));
    config.database.path = resolve_path(base_dir, &config.database.path);
    if let Some(directory) = &config.logging.directory {
        config.logging.directory = Some(resolve_path(base_dir, directory));
    }

    Ok(config)
}

/// Save configuration to a TOML file, creating its directory.
pub async fn save_config(config: &TrpuxConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                CoreError::config(
                    parent.display().to_string(),
                    "directory",
                    "writable directory",
                    ConfigError::Io(e.to_string()),
                )
            })?;
        }
    }

    let content = toml::to_string_pretty(config).map_err(|e| {
        CoreError::config(
            path.display().to_string(),
            "serialization",
            "serializable config structure",
            ConfigError::TomlSerialize(e.to_string()),
        )
    })?;

    tokio::fs::write(path, content).await.map_err(|e| {
        CoreError::config(
            path.display().to_string(),
            "file",
            "writable file location",
            ConfigError::Io(e.to_string()),
        )
    })?;

    Ok(())
}

/// Standard configuration locations, most specific first.
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // Project-specific config
    paths.push(PathBuf::from("trpux.toml"));

    // User config directory
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("trpux").join("config.toml"));
    }

    // Home directory fallback
    if let Some(home_dir) = dirs::home_dir() {
        paths.push(home_dir.join(".trpux").join("config.toml"));
    }

    paths
}

/// Load the first configuration found in the standard locations.
pub async fn load_config_from_standard_locations() -> Result<TrpuxConfig> {
    for path in config_paths() {
        if path.exists() {
            return load_config(&path).await;
        }
    }

    // No config found, return default
    Ok(TrpuxConfig::default())
}
