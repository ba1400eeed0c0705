//! # Plugin System Errors
//!
//! [`ActivationError`] is what a plugin returns when loading or activating
//! it fails; its variant decides whether the engine skips the plugin or
//! aborts the pass. [`PluginSystemError`] is what the engine itself returns.
// crates/autoinstr-core/src/plugin_system/error.rs
use crate::plugin_system::dependency::DependencyConflict;
use crate::plugin_system::outcome::ActivationReport;
use crate::plugin_system::traits::PluginGroup;

/// Boxed error returned by hooks, distros and configurators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure while loading or activating a single instrumentor.
#[derive(Debug, thiserror::Error)]
pub enum ActivationError {
    /// The target library is not present. Expected; the plugin is skipped.
    #[error("target library '{library}' is not installed")]
    MissingDependency { library: String },

    /// The plugin's code cannot run here (binary/ABI/platform mismatch).
    /// Tolerated; the plugin is skipped.
    #[error("environment mismatch: {message}")]
    EnvironmentMismatch {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The plugin detected a version conflict while activating.
    #[error("dependency conflict: {0}")]
    DependencyConflict(DependencyConflict),

    /// Anything else. Fatal for the pass.
    #[error("{message}")]
    Failed {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl ActivationError {
    pub fn missing(library: impl Into<String>) -> Self {
        ActivationError::MissingDependency { library: library.into() }
    }

    pub fn environment(message: impl Into<String>) -> Self {
        ActivationError::EnvironmentMismatch { message: message.into(), source: None }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        ActivationError::Failed { message: message.into(), source: None }
    }
}

impl From<DependencyConflict> for ActivationError {
    fn from(conflict: DependencyConflict) -> Self {
        ActivationError::DependencyConflict(conflict)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    /// An instrumentor failed in an unclassified way; the pass was aborted.
    /// `report` holds every outcome up to and including the failure.
    #[error("Instrumenting of '{plugin}' failed: {source}")]
    ActivationAborted {
        plugin: String,
        report: ActivationReport,
        #[source]
        source: ActivationError,
    },

    #[error("{group} hook '{plugin}' failed: {source}")]
    HookFailed {
        plugin: String,
        group: PluginGroup,
        #[source]
        source: BoxError,
    },

    #[error("Distribution '{plugin}' configuration failed: {source}")]
    DistroFailed {
        plugin: String,
        #[source]
        source: BoxError,
    },

    #[error("Configuration of '{plugin}' failed: {source}")]
    ConfiguratorFailed {
        plugin: String,
        #[source]
        source: BoxError,
    },

    #[error("Plugin '{plugin}' could not be loaded: {source}")]
    LoadFailed {
        plugin: String,
        group: PluginGroup,
        #[source]
        source: ActivationError,
    },

    #[error("Plugin registration error for '{plugin_id}': {message}")]
    RegistrationError { plugin_id: String, message: String },

    #[error("Instrumentors were already activated by this plugin manager")]
    AlreadyActivated,

    #[error("Auto-instrumentation was already initialized in this process")]
    AlreadyInitialized,
}
