use std::sync::atomic::{AtomicBool, Ordering};

use crate::kernel::constants;
use crate::kernel::error::Result;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::manager::{ActivationSettings, PluginManager};
use crate::plugin_system::outcome::ActivationReport;

/// Set by the first [`initialize`] call of the process.
static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Options for [`initialize`].
#[derive(Debug, Clone, Copy)]
pub struct InitializeOptions {
    /// Log failures of the pass and return `Ok(None)` instead of
    /// propagating them. Defaults to `true` so instrumentation never takes
    /// the host program down.
    pub swallow_errors: bool,
}

impl Default for InitializeOptions {
    fn default() -> Self {
        Self { swallow_errors: true }
    }
}

/// Runs the full start-up sequence once per process: select and configure
/// the distro, run the configurator, then activate instrumentors.
///
/// A second call returns [`PluginSystemError::AlreadyInitialized`] whatever
/// `options` say; the first call claims the process even when its pass fails.
pub fn initialize(
    manager: &mut PluginManager,
    settings: &ActivationSettings,
    options: InitializeOptions,
) -> Result<Option<ActivationReport>> {
    initialize_with_guard(&INITIALIZED, manager, settings, options)
}

pub(crate) fn initialize_with_guard(
    guard: &AtomicBool,
    manager: &mut PluginManager,
    settings: &ActivationSettings,
    options: InitializeOptions,
) -> Result<Option<ActivationReport>> {
    if guard
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        log::warn!("Attempting to instrument while already instrumented");
        return Err(PluginSystemError::AlreadyInitialized.into());
    }

    log::info!("Initializing {} v{}", constants::APP_NAME, constants::AUTO_INSTRUMENTATION_VERSION);

    match run_pass(manager, settings) {
        Ok(report) => Ok(Some(report)),
        Err(e) if options.swallow_errors => {
            log::error!("Failed to auto initialize instrumentation: {}", e);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn run_pass(
    manager: &mut PluginManager,
    settings: &ActivationSettings,
) -> std::result::Result<ActivationReport, PluginSystemError> {
    manager.select_distro(settings.distro.as_deref())?;
    manager.load_configurator(settings.configurator.as_deref())?;
    manager.activate(&settings.excluded)
}
