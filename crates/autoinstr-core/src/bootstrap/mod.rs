//! # Bootstrap
//!
//! Detects the libraries installed in the target environment and computes
//! which instrumentation packages apply to them. The `requirements` action
//! prints that plan; the `install` action installs it and verifies the
//! environment afterwards.
pub mod error;
pub mod installer;
pub mod planner;
pub mod registry;

#[cfg(test)]
mod tests;

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use crate::environment::EnvironmentInspector;
use crate::plugin_system::conflict::ConsistencyCheck;

pub use error::BootstrapError;
pub use installer::{CommandInstaller, InstallReport, Installer, PackageInstaller};
pub use planner::{BootstrapPlanner, InstallPlan};
pub use registry::{LibraryRegistry, RegistryEntry};

/// What a bootstrap run does with its plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BootstrapAction {
    /// Print the plan, one identifier per line
    #[default]
    Requirements,
    /// Install the plan and check for conflicts
    Install,
}

impl BootstrapAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BootstrapAction::Requirements => "requirements",
            BootstrapAction::Install => "install",
        }
    }
}

impl fmt::Display for BootstrapAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BootstrapAction {
    type Err = BootstrapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "requirements" => Ok(BootstrapAction::Requirements),
            "install" => Ok(BootstrapAction::Install),
            other => Err(BootstrapError::UnknownAction(other.to_string())),
        }
    }
}

/// Writes the plan to `out`, one identifier per line.
pub fn run_requirements<W: Write>(plan: &InstallPlan, out: &mut W) -> Result<(), BootstrapError> {
    if plan.is_empty() {
        return Ok(());
    }
    writeln!(out, "{}", plan.render()).map_err(BootstrapError::Output)
}

/// Installs the plan. Fails when any package failed to install or the
/// consistency check reports a conflict with a planned package.
pub fn run_install(
    plan: &InstallPlan,
    installer: &dyn PackageInstaller,
    check: &dyn ConsistencyCheck,
    environment: &dyn EnvironmentInspector,
) -> Result<InstallReport, BootstrapError> {
    let report = Installer::new(installer, check, environment).install(plan)?;
    if let Some(conflict) = &report.conflict {
        return Err(BootstrapError::Conflict(conflict.clone()));
    }
    if !report.failed.is_empty() {
        return Err(BootstrapError::InstallFailed {
            packages: report.failed.clone(),
        });
    }
    log::info!("Installed {} instrumentation packages", report.installed.len());
    Ok(report)
}
