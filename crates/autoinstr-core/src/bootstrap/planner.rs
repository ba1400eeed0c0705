use std::fmt;

use crate::bootstrap::registry::LibraryRegistry;
use crate::environment::EnvironmentInspector;
use crate::plugin_system::conflict::ConflictResolver;

/// Ordered instrumentation package identifiers a bootstrap run will install:
/// defaults first, then the conditional entries that apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallPlan {
    packages: Vec<String>,
}

impl InstallPlan {
    pub fn new(packages: Vec<String>) -> Self {
        Self { packages }
    }

    pub fn packages(&self) -> &[String] {
        &self.packages
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// One identifier per line, the `requirements` output format.
    pub fn render(&self) -> String {
        self.packages.join("\n")
    }
}

impl fmt::Display for InstallPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl<'a> IntoIterator for &'a InstallPlan {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.packages.iter()
    }
}

/// Walks a [`LibraryRegistry`] against the installed environment.
pub struct BootstrapPlanner<'a> {
    resolver: ConflictResolver<'a>,
}

impl<'a> BootstrapPlanner<'a> {
    pub fn new(environment: &'a dyn EnvironmentInspector) -> Self {
        Self {
            resolver: ConflictResolver::new(environment),
        }
    }

    /// Computes the install plan. Deterministic for a given registry and
    /// environment; entries whose library is installed at an incompatible
    /// version are skipped with a warning.
    pub fn plan(&self, registry: &LibraryRegistry) -> InstallPlan {
        let mut packages = registry.default_instrumentations.clone();
        for entry in &registry.libraries {
            if self.resolver.is_compatible(&entry.library) {
                log::debug!("{} is installed, planning {}", entry.library, entry.instrumentation);
                packages.push(entry.instrumentation.clone());
            }
        }
        InstallPlan::new(packages)
    }
}
