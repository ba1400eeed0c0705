use std::fmt;
use std::sync::Arc;

use crate::plugin_system::dependency::InstrumentationDependencies;
use crate::plugin_system::error::{ActivationError, PluginSystemError};
use crate::plugin_system::traits::{Configurator, Distro, Hook, Instrumentor, PluginGroup};

/// Produces the plugin implementation on demand.
pub type PluginLoader<P> = Arc<dyn Fn() -> Result<Arc<P>, ActivationError> + Send + Sync>;

/// A discovered plugin: its name, group, declared requirements and a way
/// to load it. Loading is deferred until the engine decides to activate.
pub struct PluginDescriptor<P: ?Sized> {
    name: String,
    group: PluginGroup,
    dependencies: InstrumentationDependencies,
    loader: PluginLoader<P>,
}

impl<P: ?Sized> PluginDescriptor<P> {
    pub fn new<F>(name: &str, group: PluginGroup, loader: F) -> Self
    where
        F: Fn() -> Result<Arc<P>, ActivationError> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            group,
            dependencies: InstrumentationDependencies::none(),
            loader: Arc::new(loader),
        }
    }

    /// Attaches the requirements checked before loading.
    pub fn with_dependencies(mut self, dependencies: InstrumentationDependencies) -> Self {
        self.dependencies = dependencies;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn group(&self) -> PluginGroup {
        self.group
    }

    pub fn dependencies(&self) -> &InstrumentationDependencies {
        &self.dependencies
    }

    /// Loads the plugin implementation.
    pub fn load(&self) -> Result<Arc<P>, ActivationError> {
        (self.loader)()
    }
}

impl<P: ?Sized> Clone for PluginDescriptor<P> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            group: self.group,
            dependencies: self.dependencies.clone(),
            loader: Arc::clone(&self.loader),
        }
    }
}

impl<P: ?Sized> fmt::Debug for PluginDescriptor<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginDescriptor")
            .field("name", &self.name)
            .field("group", &self.group)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

/// Registration table of plugins, one ordered list per discovery group.
///
/// Built once at process start; discovery order is registration order.
#[derive(Default)]
pub struct PluginRegistry {
    distros: Vec<PluginDescriptor<dyn Distro>>,
    configurators: Vec<PluginDescriptor<dyn Configurator>>,
    pre_hooks: Vec<PluginDescriptor<dyn Hook>>,
    instrumentors: Vec<PluginDescriptor<dyn Instrumentor>>,
    post_hooks: Vec<PluginDescriptor<dyn Hook>>,
}

fn ensure_unique<P: ?Sized>(
    existing: &[PluginDescriptor<P>],
    name: &str,
    group: PluginGroup,
) -> Result<(), PluginSystemError> {
    if name.trim().is_empty() {
        return Err(PluginSystemError::RegistrationError {
            plugin_id: name.to_string(),
            message: format!("{} plugins need a non-empty name", group),
        });
    }
    if existing.iter().any(|d| d.name() == name) {
        return Err(PluginSystemError::RegistrationError {
            plugin_id: name.to_string(),
            message: format!("already registered in the {} group", group),
        });
    }
    Ok(())
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a distro candidate
    pub fn register_distro<F>(&mut self, name: &str, loader: F) -> Result<(), PluginSystemError>
    where
        F: Fn() -> Result<Arc<dyn Distro>, ActivationError> + Send + Sync + 'static,
    {
        ensure_unique(&self.distros, name, PluginGroup::Distro)?;
        self.distros.push(PluginDescriptor::new(name, PluginGroup::Distro, loader));
        Ok(())
    }

    /// Register a configurator candidate
    pub fn register_configurator<F>(&mut self, name: &str, loader: F) -> Result<(), PluginSystemError>
    where
        F: Fn() -> Result<Arc<dyn Configurator>, ActivationError> + Send + Sync + 'static,
    {
        ensure_unique(&self.configurators, name, PluginGroup::Configurator)?;
        self.configurators.push(PluginDescriptor::new(name, PluginGroup::Configurator, loader));
        Ok(())
    }

    /// Register an instrumentor with the requirements it declares
    pub fn register_instrumentor<F>(
        &mut self,
        name: &str,
        dependencies: InstrumentationDependencies,
        loader: F,
    ) -> Result<(), PluginSystemError>
    where
        F: Fn() -> Result<Arc<dyn Instrumentor>, ActivationError> + Send + Sync + 'static,
    {
        ensure_unique(&self.instrumentors, name, PluginGroup::Instrumentor)?;
        self.instrumentors.push(
            PluginDescriptor::new(name, PluginGroup::Instrumentor, loader).with_dependencies(dependencies),
        );
        Ok(())
    }

    /// Register an already-constructed instrumentor. Its declared
    /// requirements are read once, here.
    pub fn register_instrumentor_instance(
        &mut self,
        name: &str,
        instrumentor: Arc<dyn Instrumentor>,
    ) -> Result<(), PluginSystemError> {
        let dependencies = instrumentor.instrumentation_dependencies();
        self.register_instrumentor(name, dependencies, move || Ok(Arc::clone(&instrumentor)))
    }

    pub fn register_pre_hook<H>(&mut self, name: &str, hook: H) -> Result<(), PluginSystemError>
    where
        H: Hook + 'static,
    {
        ensure_unique(&self.pre_hooks, name, PluginGroup::PreHook)?;
        let hook: Arc<dyn Hook> = Arc::new(hook);
        self.pre_hooks
            .push(PluginDescriptor::new(name, PluginGroup::PreHook, move || Ok(Arc::clone(&hook))));
        Ok(())
    }

    pub fn register_post_hook<H>(&mut self, name: &str, hook: H) -> Result<(), PluginSystemError>
    where
        H: Hook + 'static,
    {
        ensure_unique(&self.post_hooks, name, PluginGroup::PostHook)?;
        let hook: Arc<dyn Hook> = Arc::new(hook);
        self.post_hooks
            .push(PluginDescriptor::new(name, PluginGroup::PostHook, move || Ok(Arc::clone(&hook))));
        Ok(())
    }

    pub fn distros(&self) -> &[PluginDescriptor<dyn Distro>] {
        &self.distros
    }

    pub fn configurators(&self) -> &[PluginDescriptor<dyn Configurator>] {
        &self.configurators
    }

    pub fn pre_hooks(&self) -> &[PluginDescriptor<dyn Hook>] {
        &self.pre_hooks
    }

    pub fn instrumentors(&self) -> &[PluginDescriptor<dyn Instrumentor>] {
        &self.instrumentors
    }

    pub fn post_hooks(&self) -> &[PluginDescriptor<dyn Hook>] {
        &self.post_hooks
    }

    /// Plugin names of one group, in discovery order.
    pub fn names(&self, group: PluginGroup) -> Vec<&str> {
        match group {
            PluginGroup::Distro => self.distros.iter().map(|d| d.name()).collect(),
            PluginGroup::Configurator => self.configurators.iter().map(|d| d.name()).collect(),
            PluginGroup::PreHook => self.pre_hooks.iter().map(|d| d.name()).collect(),
            PluginGroup::Instrumentor => self.instrumentors.iter().map(|d| d.name()).collect(),
            PluginGroup::PostHook => self.post_hooks.iter().map(|d| d.name()).collect(),
        }
    }

    /// Total number of registered plugins across all groups.
    pub fn len(&self) -> usize {
        self.distros.len()
            + self.configurators.len()
            + self.pre_hooks.len()
            + self.instrumentors.len()
            + self.post_hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("distros", &self.names(PluginGroup::Distro))
            .field("configurators", &self.names(PluginGroup::Configurator))
            .field("pre_hooks", &self.names(PluginGroup::PreHook))
            .field("instrumentors", &self.names(PluginGroup::Instrumentor))
            .field("post_hooks", &self.names(PluginGroup::PostHook))
            .finish()
    }
}
