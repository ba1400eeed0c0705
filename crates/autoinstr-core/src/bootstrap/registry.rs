use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bootstrap::error::BootstrapError;
use crate::config;
use crate::plugin_system::dependency::DependencyRequirement;

const BUILTIN_REGISTRY: &str = include_str!("../../data/registry.json");

/// One conditional registry entry: install `instrumentation` when `library`
/// is installed at a compatible version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub library: DependencyRequirement,
    /// Instrumentation package identifier, optionally pinned
    pub instrumentation: String,
}

/// Static mapping of library requirements to instrumentation packages, plus
/// the packages that always apply.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryRegistry {
    /// Installed unconditionally, in this order
    pub default_instrumentations: Vec<String>,
    /// Checked against the environment, in this order
    pub libraries: Vec<RegistryEntry>,
}

impl LibraryRegistry {
    /// The registry shipped with this crate.
    pub fn builtin() -> Result<Self, BootstrapError> {
        serde_json::from_str(BUILTIN_REGISTRY).map_err(BootstrapError::BuiltinRegistry)
    }

    /// Loads a registry file (JSON, YAML or TOML by extension).
    pub fn load(path: &Path) -> Result<Self, BootstrapError> {
        let registry: Self = config::load_file(path).map_err(|source| BootstrapError::RegistryLoad {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!(
            "Loaded library registry from {}: {} defaults, {} libraries",
            path.display(),
            registry.default_instrumentations.len(),
            registry.libraries.len()
        );
        Ok(registry)
    }

    /// `path` when given, the built-in registry otherwise.
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self, BootstrapError> {
        match path {
            Some(path) => Self::load(path),
            None => Self::builtin(),
        }
    }

    pub fn with_default(mut self, instrumentation: &str) -> Self {
        self.default_instrumentations.push(instrumentation.to_string());
        self
    }

    pub fn with_library(mut self, library: DependencyRequirement, instrumentation: &str) -> Self {
        self.libraries.push(RegistryEntry {
            library,
            instrumentation: instrumentation.to_string(),
        });
        self
    }
}
