//! # Environment Inspection
//!
//! Answers one question for the rest of the crate: "is package P installed,
//! and if so at what version?"
//!
//! - [`EnvironmentInspector`]: the read-only query interface.
//! - [`StaticEnvironment`]: an in-memory snapshot, built in code or loaded
//!   from a JSON snapshot file.
//! - [`CommandEnvironment`]: runs a package-listing command once (by default
//!   `python3 -m pip list --format=json`) and serves lookups from its output.
//!
//! Lookups compare normalized package names, so `Flask`, `flask` and
//! `FLASK` resolve to the same entry, as do `zope.interface` and
//! `zope-interface`.
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Deserialize;
use thiserror::Error;

use crate::plugin_system::dependency::normalize_name;

/// Errors raised while taking an environment snapshot
#[derive(Debug, Error)]
pub enum EnvironmentError {
    #[error("Failed to read environment snapshot '{path}': {source}")]
    ReadSnapshot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse environment snapshot: {0}")]
    ParseSnapshot(#[from] serde_json::Error),

    #[error("Package listing command is empty")]
    EmptyCommand,

    #[error("Failed to run package listing command '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Package listing command '{command}' exited with {status}")]
    CommandFailed { command: String, status: String },
}

/// Read-only view of the packages installed in the current environment.
pub trait EnvironmentInspector {
    /// Installed version of `package`, or `None` when it is not installed.
    fn installed_version(&self, package: &str) -> Option<String>;

    /// Convenience wrapper over [`installed_version`](Self::installed_version).
    fn is_installed(&self, package: &str) -> bool {
        self.installed_version(package).is_some()
    }
}

/// A fixed snapshot of installed packages.
#[derive(Debug, Clone, Default)]
pub struct StaticEnvironment {
    packages: BTreeMap<String, String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotFormat {
    /// `{"flask": "2.3.0"}`
    Map(BTreeMap<String, String>),
    /// `[{"name": "flask", "version": "2.3.0"}]`, the pip list format
    List(Vec<ListedPackage>),
}

#[derive(Deserialize)]
struct ListedPackage {
    name: String,
    version: String,
}

impl StaticEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with_package(mut self, name: &str, version: &str) -> Self {
        self.insert(name, version);
        self
    }

    pub fn insert(&mut self, name: &str, version: &str) {
        self.packages.insert(normalize_name(name), version.trim().to_string());
    }

    /// Parses a JSON snapshot, either a `{name: version}` object or a
    /// `[{name, version}]` array.
    pub fn from_json(data: &str) -> Result<Self, EnvironmentError> {
        let mut env = Self::new();
        match serde_json::from_str::<SnapshotFormat>(data)? {
            SnapshotFormat::Map(map) => {
                for (name, version) in map {
                    env.insert(&name, &version);
                }
            }
            SnapshotFormat::List(list) => {
                for pkg in list {
                    env.insert(&pkg.name, &pkg.version);
                }
            }
        }
        Ok(env)
    }

    /// Loads a JSON snapshot file.
    pub fn load(path: &Path) -> Result<Self, EnvironmentError> {
        let data = fs::read_to_string(path).map_err(|source| EnvironmentError::ReadSnapshot {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&data)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl EnvironmentInspector for StaticEnvironment {
    fn installed_version(&self, package: &str) -> Option<String> {
        self.packages.get(&normalize_name(package)).cloned()
    }
}

/// Snapshot taken from the output of a package-listing command.
#[derive(Debug, Clone)]
pub struct CommandEnvironment {
    snapshot: StaticEnvironment,
}

impl CommandEnvironment {
    /// Runs `command` (program followed by arguments) and parses its JSON
    /// output. The command's stderr is inherited.
    pub fn capture(command: &[String]) -> Result<Self, EnvironmentError> {
        let (program, args) = command.split_first().ok_or(EnvironmentError::EmptyCommand)?;
        let rendered = command.join(" ");
        log::debug!("Listing installed packages with '{}'", rendered);

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|source| EnvironmentError::Spawn {
                command: rendered.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(EnvironmentError::CommandFailed {
                command: rendered,
                status: output.status.to_string(),
            });
        }

        let snapshot = StaticEnvironment::from_json(&String::from_utf8_lossy(&output.stdout))?;
        log::info!("Found {} installed packages", snapshot.len());
        Ok(Self { snapshot })
    }
}

impl EnvironmentInspector for CommandEnvironment {
    fn installed_version(&self, package: &str) -> Option<String> {
        self.snapshot.installed_version(package)
    }
}
