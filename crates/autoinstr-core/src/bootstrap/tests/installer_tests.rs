#![cfg(test)]

use crate::bootstrap::{
    run_install, BootstrapError, CommandInstaller, InstallPlan, Installer, PackageInstaller,
};
use crate::environment::StaticEnvironment;
use crate::plugin_system::conflict::{ConsistencyCheck, ConsistencyCheckError};
use std::cell::RefCell;

/// Records every install call; fails for the listed packages.
struct RecordingInstaller {
    calls: RefCell<Vec<String>>,
    failing: Vec<&'static str>,
}

impl RecordingInstaller {
    fn new(failing: Vec<&'static str>) -> Self {
        Self { calls: RefCell::new(Vec::new()), failing }
    }
}

impl PackageInstaller for RecordingInstaller {
    fn install(&self, package: &str) -> Result<(), BootstrapError> {
        self.calls.borrow_mut().push(package.to_string());
        if self.failing.iter().any(|f| *f == package) {
            return Err(BootstrapError::EmptyInstallCommand);
        }
        Ok(())
    }
}

struct FixedCheck(&'static str);

impl ConsistencyCheck for FixedCheck {
    fn run(&self) -> Result<String, ConsistencyCheckError> {
        Ok(self.0.to_string())
    }
}

fn plan() -> InstallPlan {
    InstallPlan::new(vec!["otel-core==0.61b0".to_string(), "otel-flask==0.61b0".to_string()])
}

#[test]
fn test_install_all_succeed_without_conflict() {
    let installer = RecordingInstaller::new(vec![]);
    let env = StaticEnvironment::new();

    let report = Installer::new(&installer, &FixedCheck("No broken requirements found."), &env)
        .install(&plan())
        .unwrap();

    assert!(report.is_success());
    assert_eq!(report.installed, plan().packages());
    assert_eq!(*installer.calls.borrow(), plan().packages());
}

#[test]
fn test_single_install_failure_does_not_stop_the_rest() {
    let installer = RecordingInstaller::new(vec!["otel-core==0.61b0"]);
    let env = StaticEnvironment::new();

    let report = Installer::new(&installer, &FixedCheck(""), &env).install(&plan()).unwrap();

    assert_eq!(installer.calls.borrow().len(), 2);
    assert_eq!(report.failed, vec!["otel-core==0.61b0"]);
    assert_eq!(report.installed, vec!["otel-flask==0.61b0"]);
    assert!(!report.is_success());
}

#[test]
fn test_conflict_after_successful_installs_fails_the_run() {
    let installer = RecordingInstaller::new(vec![]);
    let env = StaticEnvironment::new();
    let check = FixedCheck("otel-flask 0.61b0 has requirement flask<3, but you have flask 3.0.0.");

    let report = Installer::new(&installer, &check, &env).install(&plan()).unwrap();
    assert!(report.failed.is_empty());
    assert!(!report.is_success());
    assert_eq!(report.conflict.as_ref().unwrap().packages, vec!["otel-flask==0.61b0"]);

    let err = run_install(&plan(), &installer, &check, &env).unwrap_err();
    assert!(matches!(err, BootstrapError::Conflict(_)));
}

#[test]
fn test_run_install_reports_failed_packages() {
    let installer = RecordingInstaller::new(vec!["otel-flask==0.61b0"]);
    let env = StaticEnvironment::new();

    let err = run_install(&plan(), &installer, &FixedCheck(""), &env).unwrap_err();
    match err {
        BootstrapError::InstallFailed { packages } => assert_eq!(packages, vec!["otel-flask==0.61b0"]),
        other => panic!("Expected InstallFailed, got {:?}", other),
    }
}

#[test]
fn test_command_installer_renders_placeholder() {
    let installer = CommandInstaller::new(vec![
        "pip".to_string(),
        "install".to_string(),
        "{package}".to_string(),
    ])
    .unwrap();
    assert_eq!(installer.render("otel-flask==0.61b0"), vec!["pip", "install", "otel-flask==0.61b0"]);

    let appended = CommandInstaller::new(vec!["pip".to_string(), "install".to_string()]).unwrap();
    assert_eq!(appended.render("otel-core"), vec!["pip", "install", "otel-core"]);

    assert!(matches!(CommandInstaller::new(vec![]), Err(BootstrapError::EmptyInstallCommand)));
}

#[cfg(unix)]
#[test]
fn test_command_installer_exit_status() {
    let ok = CommandInstaller::new(vec!["true".to_string()]).unwrap();
    assert!(ok.install("anything").is_ok());

    let failing = CommandInstaller::new(vec!["sh".to_string(), "-c".to_string(), "exit 1".to_string()]).unwrap();
    assert!(matches!(
        failing.install("otel-core"),
        Err(BootstrapError::InstallCommandFailed { ref package, .. }) if package == "otel-core"
    ));

    let missing = CommandInstaller::new(vec!["/nonexistent/autoinstr-installer".to_string()]).unwrap();
    assert!(matches!(missing.install("otel-core"), Err(BootstrapError::Spawn { .. })));
}
