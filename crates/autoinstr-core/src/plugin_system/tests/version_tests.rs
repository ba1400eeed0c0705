// crates/autoinstr-core/src/plugin_system/tests/version_tests.rs
#![cfg(test)]

use crate::plugin_system::version::{compare_versions, parse_version, VersionError, VersionRange};
use std::cmp::Ordering;
use semver::Version;
use std::str::FromStr;

#[test]
fn test_parse_version_pads_release() {
    assert_eq!(parse_version("2").unwrap(), Version::new(2, 0, 0));
    assert_eq!(parse_version("2.3").unwrap(), Version::new(2, 3, 0));
    assert_eq!(parse_version("v1.2.3").unwrap(), Version::new(1, 2, 3));
    // Extra components are dropped
    assert_eq!(parse_version("1.2.3.4").unwrap(), Version::new(1, 2, 3));
}

#[test]
fn test_parse_version_tags() {
    let beta = parse_version("0.61b0").unwrap();
    assert_eq!((beta.major, beta.minor, beta.patch), (0, 61, 0));
    assert_eq!(beta.pre.as_str(), "b0");

    let post = parse_version("1.0.post1").unwrap();
    assert!(post.pre.is_empty());
    assert_eq!(post.build.as_str(), "post1");

    let local = parse_version("2.1.0+cpu").unwrap();
    assert_eq!(local, Version::new(2, 1, 0));
}

#[test]
fn test_parse_version_rejects_garbage() {
    assert!(matches!(parse_version("abc"), Err(VersionError::InvalidFormat(_))));
    assert!(parse_version("").is_err());
}

#[test]
fn test_range_lower_and_upper_bound() {
    let range = VersionRange::from_str(">=1.0, <3.0").unwrap();
    assert!(range.includes_str("1.0"));
    assert!(range.includes_str("2.9.9"));
    assert!(!range.includes_str("0.9"));
    assert!(!range.includes_str("3.0.0"));
    assert_eq!(range.constraint_string(), ">=1.0, <3.0");
    assert_eq!(range.to_string(), ">=1.0, <3.0");
}

#[test]
fn test_range_accepts_prerelease_above_lower_bound() {
    let range = VersionRange::from_str(">=0.50").unwrap();
    assert!(range.includes_str("0.61b0"));
    assert!(!range.includes_str("0.49"));
}

#[test]
fn test_range_compatible_release() {
    let two = VersionRange::from_str("~=2.2").unwrap();
    assert!(two.includes_str("2.2"));
    assert!(two.includes_str("2.9.1"));
    assert!(!two.includes_str("3.0"));

    let three = VersionRange::from_str("~=1.4.5").unwrap();
    assert!(three.includes_str("1.4.9"));
    assert!(!three.includes_str("1.5.0"));

    assert!(VersionRange::from_str("~=1").is_err());
}

#[test]
fn test_range_equality_and_wildcards() {
    let exact = VersionRange::from_str("==0.61b0").unwrap();
    assert!(exact.includes_str("0.61b0"));
    assert!(!exact.includes_str("0.61"));

    let prefix = VersionRange::from_str("==1.4.*").unwrap();
    assert!(prefix.includes_str("1.4.0"));
    assert!(prefix.includes_str("1.4.12"));
    assert!(!prefix.includes_str("1.5.0"));

    let not = VersionRange::from_str("!=1.5.0").unwrap();
    assert!(not.includes_str("1.4.0"));
    assert!(!not.includes_str("1.5"));
}

#[test]
fn test_range_cargo_style_clause() {
    let caret = VersionRange::from_str("^1.2").unwrap();
    assert!(caret.includes_str("1.9.0"));
    assert!(!caret.includes_str("2.0.0"));
}

#[test]
fn test_range_any() {
    let any = VersionRange::from_str("").unwrap();
    assert!(any.is_any());
    assert!(any.includes_str("0.0.1"));
    assert!(VersionRange::any().includes_str("99.0"));
}

#[test]
fn test_unparsable_installed_version_never_satisfies() {
    let range = VersionRange::from_str(">=1.0").unwrap();
    assert!(!range.includes_str("not-a-version"));
}

#[test]
fn test_invalid_constraint() {
    assert!(VersionRange::from_str(">=abc").is_err());
    assert!(VersionRange::from_str("==1.x.*").is_err());
}

#[test]
fn test_parse_version_rejects_wildcard() {
    assert!(matches!(parse_version("1.4.*"), Err(VersionError::InvalidFormat(_))));
    assert!(VersionRange::from_str(">=1.*").is_err());
}

#[test]
fn test_release_phase_ordering() {
    let ordered = ["1.0.dev1", "1.0a1", "1.0b2", "1.0rc1", "1.0", "1.0.post1", "1.0.post2", "1.1.dev0"];
    for pair in ordered.windows(2) {
        let lower = parse_version(pair[0]).unwrap();
        let higher = parse_version(pair[1]).unwrap();
        assert_eq!(compare_versions(&lower, &higher), Ordering::Less, "{} < {}", pair[0], pair[1]);
    }
    let a = parse_version("2.0").unwrap();
    assert_eq!(compare_versions(&a, &parse_version("2.0.0").unwrap()), Ordering::Equal);
}

#[test]
fn test_upper_bound_excludes_its_own_prereleases() {
    let range = VersionRange::from_str(">=1.0, <2.0").unwrap();
    assert!(range.includes_str("1.9.9"));
    assert!(!range.includes_str("2.0rc1"));
    assert!(!range.includes_str("2.0.dev3"));

    // A pre-release bound admits earlier pre-releases of the same version
    let pre_bound = VersionRange::from_str("<2.0rc2").unwrap();
    assert!(pre_bound.includes_str("2.0rc1"));
    assert!(!pre_bound.includes_str("2.0"));

    // Inclusive bounds keep the plain ordering
    let inclusive = VersionRange::from_str("<=2.0").unwrap();
    assert!(inclusive.includes_str("2.0rc1"));
}

#[test]
fn test_compatible_release_excludes_next_major_prerelease() {
    let range = VersionRange::from_str("~=3.0").unwrap();
    assert!(range.includes_str("3.9.5"));
    assert!(!range.includes_str("4.0.0a1"));
    assert!(!range.includes_str("3.0rc1"));
}

#[test]
fn test_post_releases() {
    assert!(VersionRange::from_str(">=1.0").unwrap().includes_str("1.0.post1"));
    assert!(VersionRange::from_str(">0.9").unwrap().includes_str("1.0.post1"));
    assert!(!VersionRange::from_str("==1.0").unwrap().includes_str("1.0.post1"));
    assert!(!VersionRange::from_str("<=1.0").unwrap().includes_str("1.0.post1"));
    assert!(VersionRange::from_str("!=1.0").unwrap().includes_str("1.0.post1"));

    // `>V` skips post releases of V itself but not of a post-release bound
    assert!(!VersionRange::from_str(">1.0").unwrap().includes_str("1.0.post1"));
    assert!(VersionRange::from_str(">1.0.post1").unwrap().includes_str("1.0.post2"));
    assert!(VersionRange::from_str(">1.0").unwrap().includes_str("1.0.1"));
}

#[test]
fn test_negated_prefix() {
    let range = VersionRange::from_str("!=1.4.*").unwrap();
    assert!(!range.includes_str("1.4.0"));
    assert!(!range.includes_str("1.4.2"));
    assert!(range.includes_str("1.5.0"));
    assert!(range.includes_str("1.3.9"));

    let combined = VersionRange::from_str(">=1.0, != 1.4.*").unwrap();
    assert!(combined.includes_str("1.2"));
    assert!(!combined.includes_str("1.4.7"));
}
