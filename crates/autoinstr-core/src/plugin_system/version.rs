use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use semver::{BuildMetadata, Prerelease, Version, VersionReq};
use thiserror::Error;

/// Error type for version and constraint parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("Invalid version format: '{0}'")]
    InvalidFormat(String),
    #[error("Version parse error: {0}")]
    ParseError(String),
}

/// Parses an installed-package version string into a `semver::Version`.
///
/// Package metadata rarely carries strict semver, so the release segment is
/// padded or truncated to three components and any trailing tag is kept:
/// `2.3` → `2.3.0`, `0.61b0` → `0.61.0-b0`, `1.0.post1` → `1.0.0+post1`.
/// Local version labels (`+cpu`) are dropped. Wildcards are only valid in
/// constraints and are rejected here.
pub fn parse_version(raw: &str) -> Result<Version, VersionError> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix(['v', 'V']).unwrap_or(trimmed);
    let public = trimmed.split('+').next().unwrap_or_default();
    if public.contains('*') {
        return Err(VersionError::InvalidFormat(raw.to_string()));
    }

    let release = release_segment(public);
    let tag = public[release.len()..].trim_start_matches(['.', '-', '_']);
    let release = release.trim_end_matches('.');

    if release.is_empty() {
        return Err(VersionError::InvalidFormat(raw.to_string()));
    }

    let mut parts = [0u64; 3];
    for (slot, piece) in release.split('.').take(3).enumerate() {
        parts[slot] = piece
            .parse::<u64>()
            .map_err(|e| VersionError::ParseError(format!("'{}': {}", raw, e)))?;
    }

    let mut version = Version::new(parts[0], parts[1], parts[2]);
    if !tag.is_empty() {
        let tag: String = tag
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '-' })
            .collect();
        if tag.starts_with("post") {
            // Kept as build metadata; `compare_versions` orders it after the release.
            version.build = BuildMetadata::new(&tag)
                .map_err(|e| VersionError::ParseError(format!("'{}': {}", raw, e)))?;
        } else {
            version.pre = Prerelease::new(&tag)
                .map_err(|e| VersionError::ParseError(format!("'{}': {}", raw, e)))?;
        }
    }
    Ok(version)
}

/// Leading `digits(.digits)*` part of a version string.
fn release_segment(raw: &str) -> &str {
    let end = raw
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_digit() || *c == '.'))
        .map(|(i, _)| i)
        .unwrap_or(raw.len());
    &raw[..end]
}

/// Release phase in package-index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Phase {
    Dev,
    Alpha,
    Beta,
    Candidate,
    Final,
    Post,
}

fn phase(version: &Version) -> (Phase, u64) {
    if version.pre.is_empty() {
        return match version.build.as_str().strip_prefix("post") {
            Some(rest) => (Phase::Post, leading_number(rest)),
            None => (Phase::Final, 0),
        };
    }
    let tag = version.pre.as_str();
    let label_end = tag.find(|c: char| !c.is_ascii_alphabetic()).unwrap_or(tag.len());
    let phase = match &tag[..label_end] {
        "dev" => Phase::Dev,
        "b" | "beta" => Phase::Beta,
        "rc" | "c" | "pre" | "preview" => Phase::Candidate,
        _ => Phase::Alpha,
    };
    (phase, leading_number(&tag[label_end..]))
}

fn leading_number(raw: &str) -> u64 {
    let digits = raw.trim_start_matches(['.', '-']);
    let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
    digits[..end].parse().unwrap_or(0)
}

/// Orders versions produced by [`parse_version`] the way package indexes
/// do: `1.0.dev1 < 1.0a1 < 1.0b1 < 1.0rc1 < 1.0 < 1.0.post1`.
pub fn compare_versions(a: &Version, b: &Version) -> Ordering {
    (a.major, a.minor, a.patch)
        .cmp(&(b.major, b.minor, b.patch))
        .then_with(|| phase(a).cmp(&phase(b)))
        .then_with(|| a.pre.cmp(&b.pre))
        .then_with(|| a.build.cmp(&b.build))
}

fn same_release(a: &Version, b: &Version) -> bool {
    (a.major, a.minor, a.patch) == (b.major, b.minor, b.patch)
}

/// `<V` does not admit pre-releases of V unless V is one itself.
fn is_prerelease_of(version: &Version, bound: &Version) -> bool {
    same_release(version, bound) && phase(version).0 < Phase::Final && phase(bound).0 >= Phase::Final
}

/// `>V` does not admit post releases of V unless V is one itself.
fn is_post_release_of(version: &Version, bound: &Version) -> bool {
    same_release(version, bound) && phase(version).0 == Phase::Post && phase(bound).0 != Phase::Post
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

#[derive(Debug, Clone)]
enum Clause {
    Compare(Op, Version),
    /// `==1.4.*` (or `!=1.4.*` when negated): leading release components
    /// must (or must not) match.
    Prefix { release: Vec<u64>, negated: bool },
    /// Cargo-style clause (`^1.2`, `~1.2`, `*`).
    Semver(VersionReq),
}

impl Clause {
    fn matches(&self, version: &Version) -> bool {
        match self {
            Clause::Compare(op, bound) => {
                let ord = compare_versions(version, bound);
                match op {
                    Op::Eq => ord == Ordering::Equal,
                    Op::Ne => ord != Ordering::Equal,
                    Op::Gt => ord == Ordering::Greater && !is_post_release_of(version, bound),
                    Op::Ge => ord != Ordering::Less,
                    Op::Lt => ord == Ordering::Less && !is_prerelease_of(version, bound),
                    Op::Le => ord != Ordering::Greater,
                }
            }
            Clause::Prefix { release, negated } => {
                let have = [version.major, version.minor, version.patch];
                let matched = release.iter().zip(have.iter()).all(|(want, have)| want == have);
                matched != *negated
            }
            Clause::Semver(req) => req.matches(version),
        }
    }
}

/// Represents a version requirement range.
///
/// Accepts packaging-style clauses (`>=1.0, <3.0`, `~=2.2`, `==1.4.*`,
/// `!=1.5.0`) as well as cargo-style ones (`^1.2`, `~1.2`).
#[derive(Debug, Clone)]
pub struct VersionRange {
    /// The original constraint string (e.g., ">=1.0, <3.0")
    constraint: String,
    clauses: Vec<Clause>,
}

impl VersionRange {
    /// A range that accepts any version.
    pub fn any() -> Self {
        Self {
            constraint: String::new(),
            clauses: Vec::new(),
        }
    }

    /// Creates a new version range from a constraint string.
    pub fn from_constraint(constraint: &str) -> Result<Self, VersionError> {
        let mut clauses = Vec::new();

        for clause in constraint.split(',').map(str::trim).filter(|c| !c.is_empty()) {
            if let Some(rest) = clause.strip_prefix("~=") {
                let lower = parse_version(rest)?;
                let upper = match release_segment(rest.trim()).trim_end_matches('.').split('.').count() {
                    0 | 1 => {
                        return Err(VersionError::ParseError(format!(
                            "'~=' needs at least two release components in '{}'",
                            clause
                        )));
                    }
                    2 => Version::new(lower.major + 1, 0, 0),
                    _ => Version::new(lower.major, lower.minor + 1, 0),
                };
                clauses.push(Clause::Compare(Op::Ge, lower));
                clauses.push(Clause::Compare(Op::Lt, upper));
            } else if let Some((negated, rest)) = split_equality(clause) {
                match rest.strip_suffix(".*") {
                    Some(prefix) => clauses.push(Clause::Prefix {
                        release: parse_prefix(prefix, clause)?,
                        negated,
                    }),
                    None => {
                        let op = if negated { Op::Ne } else { Op::Eq };
                        clauses.push(Clause::Compare(op, parse_version(rest)?));
                    }
                }
            } else if let Some((op, rest)) = split_operator(clause) {
                clauses.push(Clause::Compare(op, parse_version(rest)?));
            } else {
                let req = VersionReq::parse(clause).map_err(|e| {
                    VersionError::ParseError(format!("Invalid version constraint '{}': {}", constraint, e))
                })?;
                clauses.push(Clause::Semver(req));
            }
        }

        Ok(Self {
            constraint: constraint.trim().to_string(),
            clauses,
        })
    }

    /// Checks if a specific `semver::Version` satisfies this range.
    pub fn includes(&self, version: &Version) -> bool {
        self.clauses.iter().all(|clause| clause.matches(version))
    }

    /// Parses `version` leniently and checks it against the range.
    /// Unparsable versions never satisfy a range.
    pub fn includes_str(&self, version: &str) -> bool {
        match parse_version(version) {
            Ok(v) => self.includes(&v),
            Err(e) => {
                log::debug!("Could not parse version '{}' against '{}': {}", version, self.constraint, e);
                false
            }
        }
    }

    /// Returns the original constraint string.
    pub fn constraint_string(&self) -> &str {
        &self.constraint
    }

    /// True when the range places no constraint on the version.
    pub fn is_any(&self) -> bool {
        self.clauses.is_empty()
    }
}

fn parse_prefix(prefix: &str, clause: &str) -> Result<Vec<u64>, VersionError> {
    prefix
        .split('.')
        .map(|p| {
            p.parse::<u64>()
                .map_err(|_| VersionError::InvalidFormat(clause.to_string()))
        })
        .collect()
}

/// `==`, `===` or `!=`, with whether the clause is negated.
fn split_equality(clause: &str) -> Option<(bool, &str)> {
    for (token, negated) in [("===", false), ("==", false), ("!=", true)] {
        if let Some(rest) = clause.strip_prefix(token) {
            return Some((negated, rest.trim()));
        }
    }
    None
}

fn split_operator(clause: &str) -> Option<(Op, &str)> {
    // Two-character operators first so ">=" is not read as ">".
    for (token, op) in [(">=", Op::Ge), ("<=", Op::Le), (">", Op::Gt), ("<", Op::Lt)] {
        if let Some(rest) = clause.strip_prefix(token) {
            return Some((op, rest.trim()));
        }
    }
    None
}

/// Implement Display to show the original constraint string.
impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.constraint)
    }
}

/// Allow parsing directly from a string slice.
impl FromStr for VersionRange {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VersionRange::from_constraint(s)
    }
}
