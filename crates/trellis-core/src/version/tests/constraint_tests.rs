#![cfg(test)]

use crate::version::{satisfies, CompareOp, Constraint, SemanticVersion};
use std::str::FromStr;

#[test]
fn test_constraint_parse_forms() {
    assert!(matches!(Constraint::parse("1.2.3"), Ok(Constraint::Exact(_))));
    assert!(matches!(Constraint::parse("=1.2.3"), Ok(Constraint::Exact(_))));
    assert!(matches!(Constraint::parse("^1.2.3"), Ok(Constraint::Caret(_))));
    assert!(matches!(Constraint::parse("~1.2.3"), Ok(Constraint::Tilde(_))));
    assert!(matches!(
        Constraint::parse(">=1.2.3"),
        Ok(Constraint::Compare(CompareOp::GreaterEq, _))
    ));
    assert!(matches!(
        Constraint::parse(">1.2.3"),
        Ok(Constraint::Compare(CompareOp::Greater, _))
    ));
    assert!(matches!(
        Constraint::parse("<=1.2.3"),
        Ok(Constraint::Compare(CompareOp::LessEq, _))
    ));
    assert!(matches!(
        Constraint::parse("<1.2.3"),
        Ok(Constraint::Compare(CompareOp::Less, _))
    ));
}

#[test]
fn test_constraint_parse_rejects_unknown_shapes() {
    for bad in ["", "*", "1.x", "^^1.2.3", ">= 1.2", "1.2.3 || 2.0.0", "~=1.2.3"] {
        assert!(Constraint::from_str(bad).is_err(), "expected '{}' rejected", bad);
    }
}

#[test]
fn test_exact_match() {
    assert!(satisfies("1.2.3", "1.2.3"));
    assert!(satisfies("1.2.3", "=1.2.3"));
    assert!(!satisfies("1.2.4", "=1.2.3"));
    assert!(!satisfies("1.2.3-alpha", "1.2.3"));
}

#[test]
fn test_caret_major_nonzero() {
    assert!(satisfies("1.2.3", "^1.2.0"));
    assert!(satisfies("1.9.0", "^1.2.0"));
    assert!(!satisfies("2.0.0", "^1.2.0"));
    assert!(!satisfies("1.1.9", "^1.2.0"));
}

#[test]
fn test_caret_zero_major() {
    assert!(satisfies("0.2.5", "^0.2.3"));
    assert!(!satisfies("0.3.0", "^0.2.3"));
    assert!(!satisfies("0.2.2", "^0.2.3"));
}

#[test]
fn test_caret_zero_major_zero_minor() {
    assert!(satisfies("0.0.3", "^0.0.3"));
    assert!(!satisfies("0.0.4", "^0.0.3"));
    assert!(!satisfies("0.0.2", "^0.0.3"));
}

#[test]
fn test_tilde() {
    assert!(satisfies("1.2.3", "~1.2.3"));
    assert!(satisfies("1.2.9", "~1.2.3"));
    assert!(!satisfies("1.3.0", "~1.2.3"));
    assert!(!satisfies("1.2.2", "~1.2.3"));
    assert!(!satisfies("2.2.3", "~1.2.3"));
}

#[test]
fn test_comparison_operators() {
    assert!(satisfies("2.0.0", ">=2.0.0"));
    assert!(satisfies("2.0.1", ">=2.0.0"));
    assert!(!satisfies("1.9.9", ">=2.0.0"));

    assert!(satisfies("2.0.1", ">2.0.0"));
    assert!(!satisfies("2.0.0", ">2.0.0"));

    assert!(satisfies("2.0.0", "<=2.0.0"));
    assert!(!satisfies("2.0.1", "<=2.0.0"));

    assert!(satisfies("1.9.9", "<2.0.0"));
    assert!(!satisfies("2.0.0", "<2.0.0"));

    // Prerelease ranks below its release for the comparison forms
    assert!(satisfies("2.0.0-rc.1", "<2.0.0"));
}

#[test]
fn test_satisfies_is_total() {
    // Malformed version or constraint degrades to false, never an error
    assert!(!satisfies("garbage", "^1.0.0"));
    assert!(!satisfies("1.0.0", "garbage"));
    assert!(!satisfies("1.0.0", "*"));
    assert!(!satisfies("", ""));
}

#[test]
fn test_matches_with_parsed_inputs() {
    let constraint = Constraint::parse("^1.4.0").unwrap();
    assert!(constraint.matches(&SemanticVersion::parse("1.5.2").unwrap()));
    assert!(!constraint.matches(&SemanticVersion::parse("2.0.0").unwrap()));
}
