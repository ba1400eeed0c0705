//! # Plugin System
//!
//! Discovery, selection and activation of instrumentation plugins.
//!
//! Plugins are registered statically into a [`PluginRegistry`], one ordered
//! list per [`PluginGroup`](traits::PluginGroup). The [`PluginManager`]
//! selects a single distro and configurator, then runs one activation pass:
//! pre-hooks, every instrumentor not excluded, post-hooks. Each instrumentor
//! attempt ends in an [`ActivationOutcome`], collected into an
//! [`ActivationReport`].
//!
//! ## Submodules
//!
//! - **[`version`]**: lenient version parsing and requirement ranges.
//! - **[`dependency`]**: requirement strings, name normalization and the
//!   [`DependencyConflict`](dependency::DependencyConflict) value.
//! - **[`conflict`]**: the [`ConflictResolver`] that checks requirements
//!   against the installed environment and scans consistency-check output.
//! - **[`exclusion`]**: the disabled-instrumentations set.
//! - **[`outcome`]**: per-plugin outcomes and the activation report.
//! - **[`registry`]**: plugin descriptors and the registration table.
//! - **[`manager`]**: the activation engine.
//! - **[`traits`]**: the plugin contracts.
//! - **[`error`]**: [`ActivationError`] and [`PluginSystemError`].
pub mod conflict;
pub mod dependency;
pub mod error;
pub mod exclusion;
pub mod manager;
pub mod outcome;
pub mod registry;
pub mod traits;
pub mod version;

pub use conflict::ConflictResolver;
pub use dependency::{DependencyConflict, DependencyRequirement, InstrumentationDependencies};
pub use error::{ActivationError, BoxError, PluginSystemError};
pub use exclusion::ExclusionSet;
pub use manager::{ActivationSettings, PluginManager};
pub use outcome::{ActivationOutcome, ActivationReport};
pub use registry::PluginRegistry;
pub use traits::{Configurator, DefaultDistro, Distro, Hook, Instrumentor, PluginGroup};
pub use version::VersionRange;

#[cfg(test)]
mod tests;
