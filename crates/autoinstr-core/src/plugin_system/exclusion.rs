use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// The value that excludes every instrumentor.
pub const EXCLUDE_ALL_WILDCARD: &str = "*";

/// Instrumentors to skip during one activation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExclusionSet {
    /// Skip every instrumentor-group plugin
    All,
    /// Skip the named plugins
    Names(BTreeSet<String>),
}

impl ExclusionSet {
    /// Excludes nothing.
    pub fn none() -> Self {
        ExclusionSet::Names(BTreeSet::new())
    }

    /// Parses the configuration value: empty, a comma-separated list of
    /// names (whitespace around each is trimmed), or `*`. A `*` anywhere in
    /// the list means everything is excluded.
    pub fn parse(value: &str) -> Self {
        let names: BTreeSet<String> = value
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();

        if names.contains(EXCLUDE_ALL_WILDCARD) {
            ExclusionSet::All
        } else {
            ExclusionSet::Names(names)
        }
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ExclusionSet::Names(names.into_iter().map(Into::into).collect())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, ExclusionSet::All)
    }

    /// Whether the named plugin is excluded.
    pub fn contains(&self, name: &str) -> bool {
        match self {
            ExclusionSet::All => true,
            ExclusionSet::Names(names) => names.contains(name),
        }
    }
}

impl Default for ExclusionSet {
    fn default() -> Self {
        Self::none()
    }
}

impl FromStr for ExclusionSet {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ExclusionSet::parse(s))
    }
}

impl fmt::Display for ExclusionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionSet::All => f.write_str(EXCLUDE_ALL_WILDCARD),
            ExclusionSet::Names(names) => {
                let joined: Vec<&str> = names.iter().map(String::as_str).collect();
                f.write_str(&joined.join(","))
            }
        }
    }
}
