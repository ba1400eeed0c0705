use std::fmt;

use crate::plugin_system::dependency::InstrumentationDependencies;
use crate::plugin_system::error::{ActivationError, BoxError};

/// Discovery groups a plugin can be registered under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PluginGroup {
    /// Candidates for the single distro of a pass
    Distro,
    /// Hooks run before any instrumentor
    PreHook,
    /// Instrumentation plugins proper
    Instrumentor,
    /// Hooks run after the instrumentor loop
    PostHook,
    /// Candidates for the single configurator of a pass
    Configurator,
}

impl PluginGroup {
    /// All groups, in the order a pass touches them.
    pub const ALL: [PluginGroup; 5] = [
        PluginGroup::Distro,
        PluginGroup::Configurator,
        PluginGroup::PreHook,
        PluginGroup::Instrumentor,
        PluginGroup::PostHook,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PluginGroup::Distro => "distro",
            PluginGroup::PreHook => "pre-hook",
            PluginGroup::Instrumentor => "instrumentor",
            PluginGroup::PostHook => "post-hook",
            PluginGroup::Configurator => "configurator",
        }
    }
}

impl fmt::Display for PluginGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Adds observability to one target library.
///
/// How the interception is done (wrapping, middleware registration, codegen)
/// is the implementor's business; the engine only activates and
/// deactivates.
pub trait Instrumentor: Send + Sync {
    /// Requirements on the target library. Checked before `activate`.
    fn instrumentation_dependencies(&self) -> InstrumentationDependencies {
        InstrumentationDependencies::none()
    }

    /// Installs the instrumentation.
    ///
    /// Return [`ActivationError::MissingDependency`] when the target library
    /// is absent, [`ActivationError::EnvironmentMismatch`] when the
    /// instrumentation cannot run on this platform, and
    /// [`ActivationError::DependencyConflict`] for a late version conflict.
    /// Anything else aborts the whole pass.
    fn activate(&self) -> Result<(), ActivationError>;

    /// Removes the instrumentation.
    fn deactivate(&self) -> Result<(), ActivationError> {
        Ok(())
    }
}

/// Supplies the default configuration for a whole activation pass.
pub trait Distro: Send + Sync {
    /// Called once, after selection and before any configurator runs.
    fn configure(&self) -> Result<(), BoxError> {
        Ok(())
    }

    /// Activates one instrumentor on behalf of the engine. Distros may
    /// override this to wrap or customize activation.
    fn load_instrumentor(&self, name: &str, instrumentor: &dyn Instrumentor) -> Result<(), ActivationError> {
        log::trace!("Activating instrumentor {} through distro", name);
        instrumentor.activate()
    }
}

/// The distro used when none is registered or selected.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultDistro;

impl Distro for DefaultDistro {}

/// Runs additional setup after the distro has configured itself.
pub trait Configurator: Send + Sync {
    /// `auto_instrumentation_version` is the version of this crate.
    fn configure(&self, auto_instrumentation_version: &str) -> Result<(), BoxError>;
}

/// A pre- or post-activation hook.
pub trait Hook: Send + Sync {
    fn run(&self) -> Result<(), BoxError>;
}

impl<F> Hook for F
where
    F: Fn() -> Result<(), BoxError> + Send + Sync,
{
    fn run(&self) -> Result<(), BoxError> {
        self()
    }
}
