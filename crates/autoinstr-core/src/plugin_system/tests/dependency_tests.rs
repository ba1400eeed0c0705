// crates/autoinstr-core/src/plugin_system/tests/dependency_tests.rs
#![cfg(test)]

use crate::plugin_system::dependency::{
    normalize_name, DependencyConflict, DependencyError, DependencyRequirement,
    InstrumentationDependencies,
};
use std::str::FromStr;

#[test]
fn test_normalize_name() {
    assert_eq!(normalize_name("Flask"), "flask");
    assert_eq!(normalize_name("zope.interface"), "zope-interface");
    assert_eq!(normalize_name("Foo__Bar-.baz"), "foo-bar-baz");
    assert_eq!(normalize_name("  requests "), "requests");
}

#[test]
fn test_parse_plain_name() {
    let req = DependencyRequirement::parse("django").unwrap();
    assert_eq!(req.package, "django");
    assert!(req.version_range.is_any());
    assert!(req.is_satisfied_by("4.2"));
}

#[test]
fn test_parse_with_constraint_and_spaces() {
    let req = DependencyRequirement::parse("flask >= 1.0, < 3.0").unwrap();
    assert_eq!(req.package, "flask");
    assert!(req.is_satisfied_by("2.3.2"));
    assert!(!req.is_satisfied_by("3.0.0"));
    assert_eq!(req.to_string(), "flask >= 1.0, < 3.0");
    assert_eq!(req.as_str(), "flask >= 1.0, < 3.0");
}

#[test]
fn test_parse_strips_extras_markers_and_parentheses() {
    let extras = DependencyRequirement::parse("psycopg[binary] >= 3").unwrap();
    assert_eq!(extras.package, "psycopg");
    assert!(extras.is_satisfied_by("3.1.8"));

    let marker = DependencyRequirement::parse("requests ~= 2.0; python_version > '3.8'").unwrap();
    assert_eq!(marker.package, "requests");
    assert!(marker.is_satisfied_by("2.31.0"));
    assert!(!marker.is_satisfied_by("3.0"));

    let parens = DependencyRequirement::parse("Jinja2 (>=2.7)").unwrap();
    assert_eq!(parens.key(), "jinja2");
    assert!(parens.is_satisfied_by("3.1"));
}

#[test]
fn test_parse_errors() {
    assert!(matches!(
        DependencyRequirement::parse(">=1.0"),
        Err(DependencyError::MissingName(_))
    ));
    assert!(matches!(
        DependencyRequirement::parse("psycopg[binary >= 3"),
        Err(DependencyError::UnterminatedExtras(_))
    ));
    assert!(matches!(
        DependencyRequirement::from_str("flask >= banana"),
        Err(DependencyError::InvalidConstraint { .. })
    ));
}

#[test]
fn test_requirement_serde_as_string() {
    let req: DependencyRequirement = serde_json::from_str("\"flask>=1.0\"").unwrap();
    assert_eq!(req.package, "flask");
    assert_eq!(serde_json::to_string(&req).unwrap(), "\"flask>=1.0\"");

    let bad: Result<DependencyRequirement, _> = serde_json::from_str("\"[oops\"");
    assert!(bad.is_err());
}

#[test]
fn test_instrumentation_dependencies_builders() {
    assert!(InstrumentationDependencies::none().is_empty());

    let deps = InstrumentationDependencies::requires(["flask >= 1.0"])
        .unwrap()
        .with_any(["psycopg2 >= 2.7", "psycopg2-binary >= 2.7"])
        .unwrap();
    assert_eq!(deps.all.len(), 1);
    assert_eq!(deps.any.len(), 2);
    assert!(!deps.is_empty());

    assert!(InstrumentationDependencies::requires(["", "flask"]).is_err());
}

#[test]
fn test_dependency_conflict_display() {
    let req = DependencyRequirement::parse("flask >= 2.0").unwrap();
    let conflict = DependencyConflict::new(&req, Some("flask 1.1".to_string()));
    assert!(!conflict.is_missing());
    assert_eq!(conflict.to_string(), "requested \"flask >= 2.0\" but found \"flask 1.1\"");

    let missing = DependencyConflict::new(&req, None);
    assert!(missing.is_missing());
    assert_eq!(missing.to_string(), "requested \"flask >= 2.0\" but found \"nothing\"");

    let a = DependencyRequirement::parse("psycopg2").unwrap();
    let b = DependencyRequirement::parse("psycopg2-binary").unwrap();
    let either = DependencyConflict::any_of(&[a, b], None);
    assert_eq!(either.required, None);
    assert_eq!(
        either.to_string(),
        "requested any of \"psycopg2\", \"psycopg2-binary\" but found \"nothing\""
    );
}

#[test]
fn test_requirement_rejects_next_major_prerelease() {
    let req = DependencyRequirement::parse("aiohttp ~= 3.0").unwrap();
    assert!(req.is_satisfied_by("3.9.5"));
    assert!(!req.is_satisfied_by("4.0.0a1"));

    let bounded = DependencyRequirement::parse("flask >= 1.0, < 2.0").unwrap();
    assert!(!bounded.is_satisfied_by("2.0rc1"));
}
