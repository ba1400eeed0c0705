//! Statically registered plugins of this binary.
use std::sync::Arc;

use autoinstr_core::plugin_system::manager::DEFAULT_DISTRO_NAME;
use autoinstr_core::plugin_system::{DefaultDistro, Distro, PluginRegistry, PluginSystemError};

/// Builds the plugin table. Embedders add their instrumentors, hooks,
/// distros and configurators here, in discovery order.
pub fn registry() -> Result<PluginRegistry, PluginSystemError> {
    let mut registry = PluginRegistry::new();
    registry.register_distro(DEFAULT_DISTRO_NAME, || Ok(Arc::new(DefaultDistro) as Arc<dyn Distro>))?;
    Ok(registry)
}
