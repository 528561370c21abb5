#![cfg(test)]

use crate::version::SemanticVersion;
use std::cmp::Ordering;

fn v(s: &str) -> SemanticVersion {
    SemanticVersion::parse(s).unwrap()
}

#[test]
fn test_numeric_precedence() {
    assert_eq!(v("1.0.0").compare(&v("2.0.0")), Ordering::Less);
    assert_eq!(v("2.1.0").compare(&v("2.0.9")), Ordering::Greater);
    assert_eq!(v("2.0.1").compare(&v("2.0.0")), Ordering::Greater);
    assert_eq!(v("1.2.3").compare(&v("1.2.3")), Ordering::Equal);
    // Numeric, not lexicographic, on the core components
    assert_eq!(v("1.10.0").compare(&v("1.9.0")), Ordering::Greater);
}

#[test]
fn test_prerelease_ranks_below_release() {
    assert_eq!(v("1.0.0-alpha").compare(&v("1.0.0")), Ordering::Less);
    assert_eq!(v("1.0.0").compare(&v("1.0.0-rc.9")), Ordering::Greater);
    // But a higher core version beats a release of a lower one
    assert_eq!(v("1.0.1-alpha").compare(&v("1.0.0")), Ordering::Greater);
}

#[test]
fn test_prerelease_lexicographic() {
    // Plain string comparison between prereleases, by design
    assert_eq!(v("1.0.0-alpha").compare(&v("1.0.0-beta")), Ordering::Less);
    assert_eq!(v("1.0.0-rc.2").compare(&v("1.0.0-rc.10")), Ordering::Greater);
    assert_eq!(v("1.0.0-rc.1").compare(&v("1.0.0-rc.1")), Ordering::Equal);
}

#[test]
fn test_build_metadata_ignored() {
    assert_eq!(v("1.0.0+a").compare(&v("1.0.0+b")), Ordering::Equal);
    assert_eq!(v("1.0.0+build").compare(&v("1.0.0")), Ordering::Equal);
}

#[test]
fn test_antisymmetry() {
    let samples = [
        "0.0.1", "0.1.0", "1.0.0", "1.0.0-alpha", "1.0.0-beta", "1.2.3",
        "2.0.0", "2.0.0-rc.1",
    ];
    for a in &samples {
        for b in &samples {
            assert_eq!(
                v(a).compare(&v(b)),
                v(b).compare(&v(a)).reverse(),
                "antisymmetry violated for {} / {}",
                a,
                b
            );
        }
    }
}

#[test]
fn test_transitivity() {
    let samples = [
        "0.0.1", "0.1.0", "1.0.0-alpha", "1.0.0", "1.2.3", "2.0.0-rc.1", "2.0.0",
    ];
    for a in &samples {
        for b in &samples {
            for c in &samples {
                if v(a).compare(&v(b)) == Ordering::Less
                    && v(b).compare(&v(c)) == Ordering::Less
                {
                    assert_eq!(
                        v(a).compare(&v(c)),
                        Ordering::Less,
                        "transitivity violated for {} < {} < {}",
                        a,
                        b,
                        c
                    );
                }
            }
        }
    }
}
