use std::process::{Command, Stdio};

use crate::bootstrap::error::BootstrapError;
use crate::bootstrap::planner::InstallPlan;
use crate::environment::EnvironmentInspector;
use crate::kernel::constants::PACKAGE_PLACEHOLDER;
use crate::plugin_system::conflict::{ConflictReport, ConflictResolver, ConsistencyCheck};

/// Installs a single package.
pub trait PackageInstaller {
    fn install(&self, package: &str) -> Result<(), BootstrapError>;
}

/// Runs an install command template per package. Every `{package}` in the
/// template is replaced by the identifier; a template without the
/// placeholder gets the identifier appended. The child inherits stdio.
#[derive(Debug, Clone)]
pub struct CommandInstaller {
    template: Vec<String>,
}

impl CommandInstaller {
    pub fn new(template: Vec<String>) -> Result<Self, BootstrapError> {
        if template.is_empty() {
            return Err(BootstrapError::EmptyInstallCommand);
        }
        Ok(Self { template })
    }

    /// The command line for `package`.
    pub fn render(&self, package: &str) -> Vec<String> {
        let mut args: Vec<String> = self
            .template
            .iter()
            .map(|part| part.replace(PACKAGE_PLACEHOLDER, package))
            .collect();
        if !self.template.iter().any(|part| part.contains(PACKAGE_PLACEHOLDER)) {
            args.push(package.to_string());
        }
        args
    }
}

impl PackageInstaller for CommandInstaller {
    fn install(&self, package: &str) -> Result<(), BootstrapError> {
        let args = self.render(package);
        let command = args.join(" ");
        let (program, rest) = args.split_first().ok_or(BootstrapError::EmptyInstallCommand)?;

        log::info!("Installing {}", package);
        let status = Command::new(program)
            .args(rest)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| BootstrapError::Spawn {
                command: command.clone(),
                package: package.to_string(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(BootstrapError::InstallCommandFailed {
                command,
                package: package.to_string(),
                status,
            })
        }
    }
}

/// What an install run did.
#[derive(Debug, Clone, Default)]
pub struct InstallReport {
    /// Packages whose install command succeeded, in plan order
    pub installed: Vec<String>,
    /// Packages whose install command failed, in plan order
    pub failed: Vec<String>,
    /// Conflict reported by the consistency check, if any
    pub conflict: Option<ConflictReport>,
}

impl InstallReport {
    /// True when every package installed and no conflict was found.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.conflict.is_none()
    }
}

/// Executes an [`InstallPlan`], then verifies the environment.
pub struct Installer<'a> {
    installer: &'a dyn PackageInstaller,
    check: &'a dyn ConsistencyCheck,
    resolver: ConflictResolver<'a>,
}

impl<'a> Installer<'a> {
    pub fn new(
        installer: &'a dyn PackageInstaller,
        check: &'a dyn ConsistencyCheck,
        environment: &'a dyn EnvironmentInspector,
    ) -> Self {
        Self {
            installer,
            check,
            resolver: ConflictResolver::new(environment),
        }
    }

    /// Installs every package of `plan`, best-effort, then runs the
    /// consistency check over the whole plan. Only a failure to run the
    /// check itself is returned as `Err`.
    pub fn install(&self, plan: &InstallPlan) -> Result<InstallReport, BootstrapError> {
        let mut report = InstallReport::default();

        for package in plan {
            match self.installer.install(package) {
                Ok(()) => report.installed.push(package.clone()),
                Err(e) => {
                    log::error!("{}", e);
                    report.failed.push(package.clone());
                }
            }
        }

        report.conflict = self.resolver.check_install_conflicts(self.check, plan.packages())?;
        if let Some(conflict) = &report.conflict {
            log::error!("{}", conflict);
        }
        Ok(report)
    }
}
