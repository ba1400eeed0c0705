//! # Kernel Errors
//!
//! [`Error`] rolls the typed errors of every subsystem into one enum, with a
//! `From` conversion for each, so callers can use `?` across subsystems.
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::bootstrap::BootstrapError;
use crate::config::ConfigError;
use crate::environment::EnvironmentError;
use crate::plugin_system::conflict::ConsistencyCheckError;
use crate::plugin_system::dependency::DependencyError;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::version::VersionError;

#[derive(Debug, ThisError)]
pub enum Error {
    /// Activation engine error
    #[error("Plugin system error: {0}")]
    PluginSystem(#[from] PluginSystemError),

    /// Planner or installer error
    #[error("Bootstrap error: {0}")]
    Bootstrap(#[from] BootstrapError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Environment error: {0}")]
    Environment(#[from] EnvironmentError),

    #[error("Version error: {0}")]
    Version(#[from] VersionError),

    #[error("Dependency error: {0}")]
    Dependency(#[from] DependencyError),

    #[error("Consistency check error: {0}")]
    ConsistencyCheck(#[from] ConsistencyCheckError),
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;
