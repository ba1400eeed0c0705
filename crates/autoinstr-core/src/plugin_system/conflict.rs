use std::fmt;
use std::process::{Command, Stdio};

use thiserror::Error;

use crate::environment::EnvironmentInspector;
use crate::plugin_system::dependency::{
    leading_name, normalize_name, DependencyConflict, DependencyRequirement,
    InstrumentationDependencies,
};

/// Result of testing one requirement against the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compatibility {
    /// Installed and inside the constraint
    Compatible { installed: String },
    /// Installed, but outside the constraint (or unparsable)
    Incompatible { installed: String },
    /// Not installed at all
    Missing,
}

impl Compatibility {
    pub fn is_compatible(&self) -> bool {
        matches!(self, Compatibility::Compatible { .. })
    }
}

/// Decides whether requirements hold in the current environment, and scans
/// post-install consistency output for conflicts.
pub struct ConflictResolver<'a> {
    environment: &'a dyn EnvironmentInspector,
}

impl<'a> ConflictResolver<'a> {
    pub fn new(environment: &'a dyn EnvironmentInspector) -> Self {
        Self { environment }
    }

    /// Tests `requirement` against the installed version. Never logs.
    pub fn check(&self, requirement: &DependencyRequirement) -> Compatibility {
        match self.environment.installed_version(&requirement.package) {
            None => Compatibility::Missing,
            Some(installed) if requirement.is_satisfied_by(&installed) => {
                Compatibility::Compatible { installed }
            }
            Some(installed) => Compatibility::Incompatible { installed },
        }
    }

    /// True iff the package is installed and its version satisfies the
    /// constraint. A missing package is simply `false`; an installed but
    /// out-of-range package also logs a warning.
    pub fn is_compatible(&self, requirement: &DependencyRequirement) -> bool {
        match self.check(requirement) {
            Compatibility::Compatible { .. } => true,
            Compatibility::Missing => false,
            Compatibility::Incompatible { installed } => {
                log::warn!(
                    "instrumentation for package {} is available but version {} is installed. Skipping.",
                    requirement,
                    installed
                );
                false
            }
        }
    }

    /// First unsatisfied requirement of an instrumentor, if any.
    pub fn dependency_conflict(
        &self,
        dependencies: &InstrumentationDependencies,
    ) -> Option<DependencyConflict> {
        for requirement in &dependencies.all {
            match self.check(requirement) {
                Compatibility::Compatible { .. } => {}
                Compatibility::Missing => return Some(DependencyConflict::new(requirement, None)),
                Compatibility::Incompatible { installed } => {
                    let found = format!("{} {}", requirement.package, installed);
                    return Some(DependencyConflict::new(requirement, Some(found)));
                }
            }
        }

        if dependencies.any.is_empty() {
            return None;
        }

        let mut found = None;
        for requirement in &dependencies.any {
            match self.check(requirement) {
                Compatibility::Compatible { .. } => return None,
                Compatibility::Incompatible { installed } => {
                    // Report the first installed candidate, if there is one.
                    found.get_or_insert_with(|| format!("{} {}", requirement.package, installed));
                }
                Compatibility::Missing => {}
            }
        }
        Some(DependencyConflict::any_of(&dependencies.any, found))
    }

    /// Runs the environment-wide consistency check and reports whether any of
    /// `package_ids` is named in its output.
    pub fn check_install_conflicts(
        &self,
        check: &dyn ConsistencyCheck,
        package_ids: &[String],
    ) -> Result<Option<ConflictReport>, ConsistencyCheckError> {
        let output = check.run()?;
        Ok(scan_conflicts(&output, package_ids))
    }
}

/// Conflicts found after an install, limited to the packages that run
/// installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictReport {
    /// Lines of the check output that name one of `packages`
    pub details: String,
    /// Installed identifiers the conflict concerns, in plan order
    pub packages: Vec<String>,
}

impl fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dependency conflict found for {}: {}",
            self.packages.join(", "),
            self.details
        )
    }
}

/// Package name an identifier refers to: `otel-flask==0.61b0` → `otel-flask`.
/// Identifiers that are not plain requirements (`otel-flask @ https://...`)
/// still resolve to their leading name.
fn identifier_key(identifier: &str) -> String {
    DependencyRequirement::parse(identifier)
        .map(|req| req.key())
        .unwrap_or_else(|_| normalize_name(leading_name(identifier.trim())))
}

/// Package-name tokens of one output line.
fn line_names(line: &str) -> Vec<String> {
    line.split_whitespace()
        .filter_map(|word| {
            let word = word.trim_start_matches(|c: char| !c.is_ascii_alphanumeric());
            let end = word
                .char_indices()
                .find(|(_, c)| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
                .map(|(i, _)| i)
                .unwrap_or(word.len());
            let name = normalize_name(&word[..end]);
            (!name.is_empty()).then_some(name)
        })
        .collect()
}

/// Scans consistency-check output for lines naming one of `package_ids`.
///
/// Matching compares whole package-name tokens, so `otel-flask` does not
/// match a line about `otel-flask-extras`.
pub fn scan_conflicts(output: &str, package_ids: &[String]) -> Option<ConflictReport> {
    let keys: Vec<(String, &String)> = package_ids.iter().map(|id| (identifier_key(id), id)).collect();
    let mut packages: Vec<String> = Vec::new();
    let mut details = Vec::new();

    for line in output.lines() {
        let names = line_names(line);
        let mut hit = false;
        for (key, id) in &keys {
            if names.iter().any(|n| n == key) {
                hit = true;
                if !packages.contains(*id) {
                    packages.push((*id).clone());
                }
            }
        }
        if hit {
            details.push(line.trim());
        }
    }

    if packages.is_empty() {
        return None;
    }
    // Keep plan order regardless of output order.
    packages.sort_by_key(|p| package_ids.iter().position(|id| id == p));
    Some(ConflictReport {
        details: details.join("\n"),
        packages,
    })
}

/// Error running the post-install consistency check
#[derive(Debug, Error)]
pub enum ConsistencyCheckError {
    #[error("Consistency check command is empty")]
    EmptyCommand,

    #[error("Error calling system command \"{command}\": {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// An environment-wide dependency consistency check (e.g. `pip check`).
pub trait ConsistencyCheck {
    /// Runs the check and returns its report text.
    fn run(&self) -> Result<String, ConsistencyCheckError>;
}

/// Runs an external command and returns its stdout. The exit status is not
/// interpreted; only the output is scanned.
#[derive(Debug, Clone)]
pub struct CommandConsistencyCheck {
    command: Vec<String>,
}

impl CommandConsistencyCheck {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

impl ConsistencyCheck for CommandConsistencyCheck {
    fn run(&self) -> Result<String, ConsistencyCheckError> {
        let (program, args) = self.command.split_first().ok_or(ConsistencyCheckError::EmptyCommand)?;
        let rendered = self.command.join(" ");
        log::debug!("Running consistency check '{}'", rendered);
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|source| ConsistencyCheckError::Spawn { command: rendered, source })?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
