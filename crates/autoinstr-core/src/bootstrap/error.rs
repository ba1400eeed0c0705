use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

use crate::config::ConfigError;
use crate::environment::EnvironmentError;
use crate::plugin_system::conflict::{ConflictReport, ConsistencyCheckError};

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Failed to load library registry '{path}': {source}")]
    RegistryLoad {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },

    #[error("Built-in library registry is invalid: {0}")]
    BuiltinRegistry(#[source] serde_json::Error),

    #[error("Install command is empty")]
    EmptyInstallCommand,

    #[error("Error calling system command \"{command}\" for package \"{package}\": {source}")]
    Spawn {
        command: String,
        package: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command \"{command}\" for package \"{package}\" exited with {status}")]
    InstallCommandFailed {
        command: String,
        package: String,
        status: ExitStatus,
    },

    #[error(transparent)]
    ConsistencyCheck(#[from] ConsistencyCheckError),

    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    #[error("Failed to write install plan: {0}")]
    Output(#[source] std::io::Error),

    #[error("Dependency conflict found: {0}")]
    Conflict(ConflictReport),

    #[error("Failed to install: {}", packages.join(", "))]
    InstallFailed { packages: Vec<String> },

    #[error("Unknown bootstrap action '{0}' (expected 'install' or 'requirements')")]
    UnknownAction(String),
}
