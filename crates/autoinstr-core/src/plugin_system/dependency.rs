use std::fmt;
use std::str::FromStr;
use crate::plugin_system::version::{VersionError, VersionRange};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Normalizes a package name for comparison: lowercase, with every run of
/// `-`, `_` and `.` collapsed to a single `-`.
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;
    for c in name.trim().chars() {
        if matches!(c, '-' | '_' | '.') {
            pending_sep = true;
            continue;
        }
        if pending_sep && !out.is_empty() {
            out.push('-');
        }
        pending_sep = false;
        out.push(c.to_ascii_lowercase());
    }
    out
}

/// A package name plus the version constraint it must satisfy,
/// e.g. `flask >= 1.0, < 3.0`.
#[derive(Debug, Clone)]
pub struct DependencyRequirement {
    /// Package name as written
    pub package: String,
    /// Acceptable versions
    pub version_range: VersionRange,
    raw: String,
}

/// Error that can occur when parsing or resolving dependencies
#[derive(Debug, Error)]
pub enum DependencyError {
    /// The requirement string has no package name
    #[error("Invalid requirement '{0}': missing package name")]
    MissingName(String),

    /// The extras section was not closed
    #[error("Invalid requirement '{0}': unterminated extras")]
    UnterminatedExtras(String),

    /// The version constraint could not be parsed
    #[error("Invalid requirement '{requirement}': {source}")]
    InvalidConstraint {
        requirement: String,
        #[source]
        source: VersionError,
    },
}

/// Leading package-name part of a requirement or identifier string.
pub(crate) fn leading_name(spec: &str) -> &str {
    let end = spec
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        .map(|(i, _)| i)
        .unwrap_or(spec.len());
    &spec[..end]
}

impl DependencyRequirement {
    /// Parses a requirement such as `flask>=1.0`, `requests ~= 2.0`,
    /// `psycopg[binary] >= 3` or `django`. Environment markers after `;`
    /// are ignored.
    pub fn parse(requirement: &str) -> Result<Self, DependencyError> {
        let raw = requirement.trim();
        let spec = raw.split(';').next().unwrap_or_default().trim();

        let package = leading_name(spec);
        let name_end = package.len();
        if package.is_empty() {
            return Err(DependencyError::MissingName(raw.to_string()));
        }

        let mut rest = spec[name_end..].trim_start();
        if let Some(extras) = rest.strip_prefix('[') {
            let close = extras
                .find(']')
                .ok_or_else(|| DependencyError::UnterminatedExtras(raw.to_string()))?;
            rest = extras[close + 1..].trim_start();
        }
        // `name (>=1.0)` is an older but still valid spelling.
        let rest = rest
            .strip_prefix('(')
            .and_then(|r| r.strip_suffix(')'))
            .unwrap_or(rest);

        let version_range = VersionRange::from_constraint(rest).map_err(|source| {
            DependencyError::InvalidConstraint {
                requirement: raw.to_string(),
                source,
            }
        })?;

        Ok(Self {
            package: package.to_string(),
            version_range,
            raw: raw.to_string(),
        })
    }

    /// Normalized package name used for lookups.
    pub fn key(&self) -> String {
        normalize_name(&self.package)
    }

    /// Check if this requirement accepts the given installed version string
    pub fn is_satisfied_by(&self, version: &str) -> bool {
        self.version_range.includes_str(version)
    }

    /// The requirement as originally written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for DependencyRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl FromStr for DependencyRequirement {
    type Err = DependencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DependencyRequirement::parse(s)
    }
}

impl Serialize for DependencyRequirement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for DependencyRequirement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DependencyRequirement::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// The requirements an instrumentor places on its target library.
///
/// Every entry of `all` must be satisfied. When `any` is non-empty, at least
/// one of its entries must be satisfied as well.
#[derive(Debug, Clone, Default)]
pub struct InstrumentationDependencies {
    pub all: Vec<DependencyRequirement>,
    pub any: Vec<DependencyRequirement>,
}

impl InstrumentationDependencies {
    /// No requirements at all.
    pub fn none() -> Self {
        Self::default()
    }

    /// Parses every string in `requirements` into the `all` set.
    pub fn requires<I, S>(requirements: I) -> Result<Self, DependencyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let all = requirements
            .into_iter()
            .map(|r| DependencyRequirement::parse(r.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { all, any: Vec::new() })
    }

    /// Adds an either/or set; one of them has to be satisfied.
    pub fn with_any<I, S>(mut self, requirements: I) -> Result<Self, DependencyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for r in requirements {
            self.any.push(DependencyRequirement::parse(r.as_ref())?);
        }
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty() && self.any.is_empty()
    }
}

/// A requirement that the current environment does not satisfy.
#[derive(Debug, Clone)]
pub struct DependencyConflict {
    /// The unsatisfied requirement, if it came from the `all` set
    pub required: Option<String>,
    /// What is installed instead, as `name version`; `None` when absent
    pub found: Option<String>,
    /// The either/or set when none of it was satisfied
    pub required_any: Vec<String>,
}

impl DependencyConflict {
    pub fn new(required: &DependencyRequirement, found: Option<String>) -> Self {
        Self {
            required: Some(required.to_string()),
            found,
            required_any: Vec::new(),
        }
    }

    pub fn any_of(required_any: &[DependencyRequirement], found: Option<String>) -> Self {
        Self {
            required: None,
            found,
            required_any: required_any.iter().map(ToString::to_string).collect(),
        }
    }

    /// True when the required package is simply not installed.
    pub fn is_missing(&self) -> bool {
        self.found.is_none()
    }
}

impl fmt::Display for DependencyConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let found = self.found.as_deref().unwrap_or("nothing");
        match &self.required {
            Some(required) => write!(f, "requested \"{}\" but found \"{}\"", required, found),
            None => write!(
                f,
                "requested any of \"{}\" but found \"{}\"",
                self.required_any.join("\", \""),
                found
            ),
        }
    }
}
