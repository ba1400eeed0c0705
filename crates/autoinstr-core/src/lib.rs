//! # autoinstr-core
//!
//! Plugin activation engine and bootstrap planner for auto-instrumentation.
//!
//! - [`plugin_system`]: discovers instrumentation plugins from a static
//!   registry and activates those that apply, with skip-or-abort failure
//!   handling and pre/post hooks.
//! - [`bootstrap`]: matches a library registry against the installed
//!   environment, then prints or installs the resulting plan.
//! - [`environment`]: answers "is this package installed, at which version".
//! - [`config`]: file and environment configuration.
//! - [`kernel`]: the process-wide [`initialize`] entry point and the
//!   crate-wide error type.
pub mod bootstrap;
pub mod config;
pub mod environment;
pub mod kernel;
pub mod plugin_system;

#[cfg(test)]
mod test_support;

pub use config::AutoInstrumentConfig;
pub use kernel::error::Error as KernelError;
pub use kernel::{initialize, InitializeOptions};
pub use plugin_system::{ActivationReport, PluginManager, PluginRegistry};
