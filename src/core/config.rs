//! Configuration parsing and validation.
//!
//! Strata configuration is loaded from TOML files with CLI overrides. The
//! sections mirror the architectural components: the store path, the engine
//! variant bound at startup, and telemetry.

use crate::engine::EngineKind;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level Strata configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Store configuration.
    #[serde(default)]
    pub store: StoreConfig,

    /// Execution engine configuration.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Telemetry and observability configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store directory path. Created on first open.
    #[serde(default = "default_store_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

/// Execution engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Engine variant: "noop" or "arithmetic".
    #[serde(default = "default_engine_kind")]
    pub kind: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            kind: default_engine_kind(),
        }
    }
}

/// Telemetry and observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_store_path() -> String {
    "data/state".to_string()
}

fn default_engine_kind() -> String {
    "noop".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            engine: EngineConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| "failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).with_context(|| "failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    /// Apply CLI overrides to the configuration.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(ref log_level) = overrides.log_level {
            self.telemetry.log_level = log_level.clone();
        }
        if let Some(ref store_path) = overrides.store_path {
            self.store.path = store_path.clone();
        }
        if let Some(ref engine) = overrides.engine {
            self.engine.kind = engine.clone();
        }
    }

    /// Validate configuration consistency.
    pub fn validate(&self) -> Result<()> {
        self.validate_store()?;
        self.validate_engine()?;
        self.validate_telemetry()?;
        Ok(())
    }

    /// Resolve the configured engine variant.
    pub fn engine_kind(&self) -> Result<EngineKind> {
        match self.engine.kind.as_str() {
            "noop" => Ok(EngineKind::Noop),
            "arithmetic" => Ok(EngineKind::Arithmetic),
            other => anyhow::bail!("engine.kind must be 'noop' or 'arithmetic', got: {}", other),
        }
    }

    fn validate_store(&self) -> Result<()> {
        if self.store.path.is_empty() {
            anyhow::bail!("store.path must not be empty");
        }
        Ok(())
    }

    fn validate_engine(&self) -> Result<()> {
        self.engine_kind().map(|_| ())
    }

    fn validate_telemetry(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.telemetry.log_level.as_str()) {
            anyhow::bail!(
                "telemetry.log_level must be one of {:?}, got: {}",
                valid_levels,
                self.telemetry.log_level
            );
        }
        Ok(())
    }
}

/// CLI override options that can be applied to configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Override log level.
    pub log_level: Option<String>,
    /// Override store path.
    pub store_path: Option<String>,
    /// Override engine variant.
    pub engine: Option<String>,
}
