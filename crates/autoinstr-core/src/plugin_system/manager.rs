use std::error::Error as StdError;
use std::fmt::{self, Debug};
use std::sync::Arc;

use crate::environment::EnvironmentInspector;
use crate::kernel::constants;
use crate::plugin_system::conflict::ConflictResolver;
use crate::plugin_system::error::{ActivationError, PluginSystemError};
use crate::plugin_system::exclusion::ExclusionSet;
use crate::plugin_system::outcome::{ActivationOutcome, ActivationReport};
use crate::plugin_system::registry::{PluginDescriptor, PluginRegistry};
use crate::plugin_system::traits::{DefaultDistro, Distro, Hook, Instrumentor};

/// Name reported for the built-in distro.
pub const DEFAULT_DISTRO_NAME: &str = "default";

/// Per-pass settings, usually taken from configuration.
#[derive(Debug, Clone, Default)]
pub struct ActivationSettings {
    /// Instrumentors to skip
    pub excluded: ExclusionSet,
    /// Name of the distro to select; first discovered when unset
    pub distro: Option<String>,
    /// Name of the configurator to run; first discovered when unset
    pub configurator: Option<String>,
}

/// Renders an error with its whole `source()` chain.
fn describe_chain(error: &dyn StdError) -> String {
    let mut out = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

/// How the instrumentor loop proceeds after a failed load or activation.
enum Disposition {
    Skip(ActivationOutcome, String),
    Abort,
}

/// Sorts an activation failure into the skip/abort taxonomy, logging it at
/// the level its kind calls for.
fn classify(name: &str, error: &ActivationError) -> Disposition {
    match error {
        ActivationError::MissingDependency { .. } => {
            log::debug!("Skipping instrumentation {}: {}", name, error);
            Disposition::Skip(ActivationOutcome::SkippedMissingDependency, error.to_string())
        }
        ActivationError::DependencyConflict(conflict) => {
            log::debug!("Skipping instrumentation {}: {}", name, conflict);
            Disposition::Skip(ActivationOutcome::SkippedIncompatible, conflict.to_string())
        }
        ActivationError::EnvironmentMismatch { .. } => {
            let detail = describe_chain(error);
            log::error!("Importing of {} failed, skipping it: {}", name, detail);
            Disposition::Skip(ActivationOutcome::SkippedEnvironmentMismatch, detail)
        }
        ActivationError::Failed { .. } => {
            log::error!("Instrumenting of {} failed: {}", name, describe_chain(error));
            Disposition::Abort
        }
    }
}

/// The activation engine.
///
/// Owns the plugin registry for its lifetime and runs at most one
/// activation pass: pre-hooks, the instrumentor loop, then post-hooks. Distro
/// and configurator selection happen separately, before the pass.
pub struct PluginManager {
    name: &'static str,
    registry: PluginRegistry,
    environment: Arc<dyn EnvironmentInspector>,
    distro: Option<(String, Arc<dyn Distro>)>,
    configurator: Option<String>,
    active: Vec<(String, Arc<dyn Instrumentor>)>,
    activated: bool,
}

impl PluginManager {
    pub fn new(registry: PluginRegistry, environment: Arc<dyn EnvironmentInspector>) -> Self {
        Self {
            name: "PluginManager",
            registry,
            environment,
            distro: None,
            configurator: None,
            active: Vec::new(),
            activated: false,
        }
    }

    /// Name of the selected distro, once [`select_distro`](Self::select_distro) ran.
    pub fn selected_distro(&self) -> Option<&str> {
        self.distro.as_ref().map(|(name, _)| name.as_str())
    }

    /// Name of the configurator that ran, if any.
    pub fn selected_configurator(&self) -> Option<&str> {
        self.configurator.as_deref()
    }

    /// Names of the instrumentors currently active, in activation order.
    pub fn active_instrumentors(&self) -> Vec<&str> {
        self.active.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Selects and configures the distro for this pass.
    ///
    /// The first distro whose name matches `configured` wins (the first one
    /// discovered when `configured` is `None`). Every other candidate is
    /// skipped with a warning. Falls back to [`DefaultDistro`] when nothing
    /// matches. A distro that is already selected is kept.
    pub fn select_distro(&mut self, configured: Option<&str>) -> Result<String, PluginSystemError> {
        if let Some((current, _)) = &self.distro {
            log::warn!("Distribution already selected ({}); ignoring new selection", current);
            return Ok(current.clone());
        }

        let mut selected: Option<(String, Arc<dyn Distro>)> = None;
        for candidate in self.registry.distros() {
            if let Some((chosen, _)) = &selected {
                log::warn!(
                    "Distribution {} not loaded, {} already selected",
                    candidate.name(),
                    chosen
                );
                continue;
            }
            if let Some(wanted) = configured.filter(|wanted| *wanted != candidate.name()) {
                log::warn!(
                    "Distribution {} not loaded because {} is configured",
                    candidate.name(),
                    wanted
                );
                continue;
            }
            let distro = load_plugin(candidate)?;
            log::debug!("Distribution {} will be configured", candidate.name());
            selected = Some((candidate.name().to_string(), distro));
        }

        let (name, distro) = match selected {
            Some(found) => found,
            None => {
                if let Some(wanted) = configured {
                    log::warn!("Distribution {} not found, using the default distribution", wanted);
                }
                (DEFAULT_DISTRO_NAME.to_string(), Arc::new(DefaultDistro) as Arc<dyn Distro>)
            }
        };

        distro.configure().map_err(|source| {
            log::error!("Distribution {} configuration failed: {}", name, source);
            PluginSystemError::DistroFailed { plugin: name.clone(), source }
        })?;

        self.distro = Some((name.clone(), distro));
        Ok(name)
    }

    /// Runs the configurator for this pass, chosen by the same first-match
    /// rule as the distro. Later candidates are skipped with a warning and
    /// never replace the first.
    pub fn load_configurator(&mut self, configured: Option<&str>) -> Result<Option<String>, PluginSystemError> {
        for candidate in self.registry.configurators() {
            if let Some(current) = &self.configurator {
                log::warn!(
                    "Configuration of {} not loaded, {} already loaded",
                    candidate.name(),
                    current
                );
                continue;
            }
            if let Some(wanted) = configured.filter(|wanted| *wanted != candidate.name()) {
                log::warn!(
                    "Configuration of {} not loaded because {} is configured",
                    candidate.name(),
                    wanted
                );
                continue;
            }

            let configurator = load_plugin(candidate)?;
            configurator
                .configure(constants::AUTO_INSTRUMENTATION_VERSION)
                .map_err(|source| {
                    log::error!("Configuration of {} failed: {}", candidate.name(), source);
                    PluginSystemError::ConfiguratorFailed {
                        plugin: candidate.name().to_string(),
                        source,
                    }
                })?;
            log::debug!("Configurator {} loaded", candidate.name());
            self.configurator = Some(candidate.name().to_string());
        }
        Ok(self.configurator.clone())
    }

    /// Runs one activation pass and returns its outcomes.
    ///
    /// Pre-hooks always run. Instrumentors run in discovery order unless
    /// `excluded` is the wildcard. Post-hooks run unless an instrumentor
    /// failed fatally, in which case the failure is returned as
    /// [`PluginSystemError::ActivationAborted`] carrying the partial report.
    pub fn activate(&mut self, excluded: &ExclusionSet) -> Result<ActivationReport, PluginSystemError> {
        if self.activated {
            return Err(PluginSystemError::AlreadyActivated);
        }
        self.activated = true;

        let distro: Arc<dyn Distro> = match &self.distro {
            Some((_, distro)) => Arc::clone(distro),
            None => Arc::new(DefaultDistro),
        };

        run_hooks(self.registry.pre_hooks())?;

        let resolver = ConflictResolver::new(self.environment.as_ref());
        let mut report = ActivationReport::new();

        for descriptor in self.registry.instrumentors() {
            let name = descriptor.name();

            if excluded.is_all() {
                log::debug!("All instrumentations are excluded");
                break;
            }
            if excluded.contains(name) {
                log::debug!("Instrumentation skipped for library {}", name);
                report.record(name, ActivationOutcome::SkippedExcluded, None);
                continue;
            }

            if let Some(conflict) = resolver.dependency_conflict(descriptor.dependencies()) {
                let outcome = if conflict.is_missing() {
                    ActivationOutcome::SkippedMissingDependency
                } else {
                    ActivationOutcome::SkippedIncompatible
                };
                log::debug!("Skipping instrumentation {}: {}", name, conflict);
                report.record(name, outcome, Some(conflict.to_string()));
                continue;
            }

            let attempt = descriptor
                .load()
                .and_then(|instrumentor| distro.load_instrumentor(name, instrumentor.as_ref()).map(|()| instrumentor));

            match attempt {
                Ok(instrumentor) => {
                    log::debug!("Instrumented {}", name);
                    report.record(name, ActivationOutcome::Activated, None);
                    self.active.push((name.to_string(), instrumentor));
                }
                Err(error) => match classify(name, &error) {
                    Disposition::Skip(outcome, detail) => report.record(name, outcome, Some(detail)),
                    Disposition::Abort => {
                        report.record(name, ActivationOutcome::Failed, Some(describe_chain(&error)));
                        return Err(PluginSystemError::ActivationAborted {
                            plugin: name.to_string(),
                            report,
                            source: error,
                        });
                    }
                },
            }
        }

        run_hooks(self.registry.post_hooks())?;

        log::info!(
            "Activation finished: {} of {} attempted instrumentors active",
            report.activated().len(),
            report.len()
        );
        Ok(report)
    }

    /// Deactivates every active instrumentor, most recently activated first.
    /// Failures are logged and do not stop the remaining deactivations.
    pub fn deactivate_all(&mut self) -> usize {
        let mut count = 0;
        while let Some((name, instrumentor)) = self.active.pop() {
            match instrumentor.deactivate() {
                Ok(()) => {
                    log::debug!("Uninstrumented {}", name);
                    count += 1;
                }
                Err(e) => log::warn!("Uninstrumenting of {} failed: {}", name, describe_chain(&e)),
            }
        }
        count
    }
}

fn load_plugin<P: ?Sized>(descriptor: &PluginDescriptor<P>) -> Result<Arc<P>, PluginSystemError> {
    descriptor.load().map_err(|source| {
        log::error!("Loading of {} {} failed: {}", descriptor.group(), descriptor.name(), describe_chain(&source));
        PluginSystemError::LoadFailed {
            plugin: descriptor.name().to_string(),
            group: descriptor.group(),
            source,
        }
    })
}

fn run_hooks(hooks: &[PluginDescriptor<dyn Hook>]) -> Result<(), PluginSystemError> {
    for descriptor in hooks {
        let hook = load_plugin(descriptor)?;
        log::trace!("Running {} {}", descriptor.group(), descriptor.name());
        hook.run().map_err(|source| {
            log::error!("{} {} failed: {}", descriptor.group(), descriptor.name(), source);
            PluginSystemError::HookFailed {
                plugin: descriptor.name().to_string(),
                group: descriptor.group(),
                source,
            }
        })?;
    }
    Ok(())
}

impl Debug for PluginManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginManager")
            .field("name", &self.name)
            .field("registry", &self.registry)
            .field("distro", &self.selected_distro())
            .field("configurator", &self.configurator)
            .field("active", &self.active_instrumentors())
            .field("activated", &self.activated)
            .finish()
    }
}
