//! # Configuration
//!
//! [`AutoInstrumentConfig`] gathers the settings of one process: which
//! instrumentors to skip, which distro and configurator to select, and how
//! the bootstrap planner talks to the package manager. Files are JSON, YAML
//! or TOML, picked by extension; environment variables override file values.
pub mod error;

#[cfg(test)]
mod tests;

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::kernel::constants;
use crate::plugin_system::exclusion::ExclusionSet;
use crate::plugin_system::manager::ActivationSettings;

pub use error::ConfigError;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }

    /// Deserialize a value from a string in this format
    pub fn deserialize<T: DeserializeOwned>(&self, data: &str) -> Result<T, ConfigError> {
        let failed = |source: Box<dyn std::error::Error + Send + Sync>| ConfigError::DeserializationError {
            format: self.extension().to_string(),
            source,
        };
        match self {
            ConfigFormat::Json => serde_json::from_str(data).map_err(|e| failed(Box::new(e))),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(data).map_err(|e| failed(Box::new(e))),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data).map_err(|e| failed(Box::new(e))),
        }
    }

    /// Serialize a value to a string in this format
    pub fn serialize<T: Serialize>(&self, value: &T) -> Result<String, ConfigError> {
        let failed = |source: Box<dyn std::error::Error + Send + Sync>| ConfigError::SerializationError {
            format: self.extension().to_string(),
            source,
        };
        match self {
            ConfigFormat::Json => serde_json::to_string_pretty(value).map_err(|e| failed(Box::new(e))),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::to_string(value).map_err(|e| failed(Box::new(e))),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::to_string_pretty(value).map_err(|e| failed(Box::new(e))),
        }
    }
}

/// Reads `path` and deserializes it in the format its extension names.
pub fn load_file<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let format = ConfigFormat::from_path(path)
        .ok_or_else(|| ConfigError::UnsupportedConfigFormat(path.display().to_string()))?;
    let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    format.deserialize(&data)
}

fn to_command(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|p| p.to_string()).collect()
}

/// How the bootstrap planner and installer reach the package manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Library registry file; the built-in registry when unset
    pub registry: Option<PathBuf>,
    /// Command printing the installed packages as JSON
    pub list_command: Vec<String>,
    /// Command installing one package; `{package}` is replaced by its identifier
    pub install_command: Vec<String>,
    /// Environment-wide consistency check run after installing
    pub check_command: Vec<String>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            registry: None,
            list_command: to_command(constants::DEFAULT_LIST_COMMAND),
            install_command: to_command(constants::DEFAULT_INSTALL_COMMAND),
            check_command: to_command(constants::DEFAULT_CHECK_COMMAND),
        }
    }
}

/// Process configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoInstrumentConfig {
    /// Comma-separated instrumentor names to skip, or `*`
    pub disabled_instrumentations: String,
    /// Distro to select; the first discovered when unset
    pub distro: Option<String>,
    /// Configurator to run; the first discovered when unset
    pub configurator: Option<String>,
    pub bootstrap: BootstrapConfig,
}

impl AutoInstrumentConfig {
    /// Loads a configuration file, format chosen by extension.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config: Self = load_file(path)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Loads `path` when given (defaults otherwise), then applies the
    /// process environment on top.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Applies the `AUTOINSTR_*` environment variables.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from `lookup`, keyed by environment variable name.
    /// Empty distro or configurator values count as unset.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(disabled) = lookup(constants::ENV_DISABLED_INSTRUMENTATIONS) {
            self.disabled_instrumentations = disabled;
        }
        if let Some(distro) = lookup(constants::ENV_DISTRO) {
            self.distro = Some(distro).filter(|d| !d.trim().is_empty());
        }
        if let Some(configurator) = lookup(constants::ENV_CONFIGURATOR) {
            self.configurator = Some(configurator).filter(|c| !c.trim().is_empty());
        }
    }

    pub fn exclusions(&self) -> ExclusionSet {
        ExclusionSet::parse(&self.disabled_instrumentations)
    }

    /// Settings for one activation pass.
    pub fn activation_settings(&self) -> ActivationSettings {
        ActivationSettings {
            excluded: self.exclusions(),
            distro: self.distro.clone(),
            configurator: self.configurator.clone(),
        }
    }
}
