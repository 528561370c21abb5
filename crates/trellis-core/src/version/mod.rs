//! # Trellis Version Resolver
//!
//! Parses and compares semantic versions and evaluates range constraints
//! against them. The grammar here is deliberately stricter and simpler than
//! the full public semantic-versioning grammar used for manifest validation
//! (see [`crate::manifest::validator`]): `MAJOR.MINOR.PATCH[-pre][+build]`
//! with unpadded numeric components and opaque dot-separated prerelease and
//! build identifiers.
//!
//! Prerelease precedence is plain lexicographic string comparison, not the
//! per-identifier numeric/alphanumeric rules of full SemVer precedence.
//! Build metadata never participates in precedence.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error type for version and constraint parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    /// The version string does not match the resolver's grammar
    #[error("Invalid version: '{0}'")]
    InvalidVersion(String),

    /// The constraint string matches none of the five supported forms
    #[error("Invalid version constraint: '{0}'")]
    InvalidConstraint(String),
}

/// A parsed semantic version. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    /// Opaque dot-separated prerelease identifiers (e.g. `alpha.1`)
    pub prerelease: Option<String>,
    /// Opaque build metadata; ignored for precedence
    pub build: Option<String>,
}

impl SemanticVersion {
    /// Create a version with no prerelease or build metadata
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self { major, minor, patch, prerelease: None, build: None }
    }

    /// Parse a version string like `1.2.3`, `1.2.3-alpha.1` or `1.2.3+build.5`
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let fail = || VersionError::InvalidVersion(input.to_string());
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(fail());
        }

        let (core, build) = match trimmed.split_once('+') {
            Some((core, build)) => (core, Some(build)),
            None => (trimmed, None),
        };
        let (numbers, prerelease) = match core.split_once('-') {
            Some((numbers, pre)) => (numbers, Some(pre)),
            None => (core, None),
        };

        let mut parts = numbers.split('.');
        let major = parse_numeric(parts.next().ok_or_else(fail)?).ok_or_else(fail)?;
        let minor = parse_numeric(parts.next().ok_or_else(fail)?).ok_or_else(fail)?;
        let patch = parse_numeric(parts.next().ok_or_else(fail)?).ok_or_else(fail)?;
        if parts.next().is_some() {
            return Err(fail());
        }

        if let Some(pre) = prerelease {
            if !valid_identifiers(pre) {
                return Err(fail());
            }
        }
        if let Some(build) = build {
            if !valid_identifiers(build) {
                return Err(fail());
            }
        }

        Ok(Self {
            major,
            minor,
            patch,
            prerelease: prerelease.map(str::to_string),
            build: build.map(str::to_string),
        })
    }

    /// Parse without producing an error value; for validation contexts that
    /// only care whether the string is well-formed.
    pub fn parse_lenient(input: &str) -> Option<Self> {
        Self::parse(input).ok()
    }

    /// Total order over versions: major, minor, patch numerically; a version
    /// without a prerelease outranks an otherwise-equal one with a
    /// prerelease; two prereleases compare lexicographically.
    pub fn compare(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
            .then_with(|| match (&self.prerelease, &other.prerelease) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }

    /// True when this version has a prerelease component
    pub fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }
}

/// Numeric component: all ASCII digits, no leading zero padding
fn parse_numeric(part: &str) -> Option<u64> {
    if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if part.len() > 1 && part.starts_with('0') {
        return None;
    }
    part.parse().ok()
}

/// Dot-separated identifiers, each non-empty and `[0-9A-Za-z-]`
fn valid_identifiers(s: &str) -> bool {
    !s.is_empty()
        && s.split('.').all(|id| {
            !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.prerelease {
            write!(f, "-{}", pre)?;
        }
        if let Some(build) = &self.build {
            write!(f, "+{}", build)?;
        }
        Ok(())
    }
}

impl FromStr for SemanticVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SemanticVersion::parse(s)
    }
}

/// Comparison operator for the `>=`, `>`, `<=`, `<` constraint forms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Less,
    LessEq,
    Greater,
    GreaterEq,
}

/// A version range constraint in one of the five supported grammars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// `1.2.3` or `=1.2.3`: exact equality after normalization
    Exact(SemanticVersion),
    /// `^1.2.3`: compatible-with per the caret rules
    Caret(SemanticVersion),
    /// `~1.2.3`: major and minor locked, patch may advance
    Tilde(SemanticVersion),
    /// `>=X.Y.Z`, `>X.Y.Z`, `<=X.Y.Z`, `<X.Y.Z`
    Compare(CompareOp, SemanticVersion),
}

impl Constraint {
    /// Parse a constraint string. Any shape outside the five grammars is an
    /// error; callers needing total evaluation should use [`satisfies`].
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let trimmed = input.trim();
        let fail = |_| VersionError::InvalidConstraint(input.to_string());

        if let Some(rest) = trimmed.strip_prefix('^') {
            return SemanticVersion::parse(rest).map(Constraint::Caret).map_err(fail);
        }
        if let Some(rest) = trimmed.strip_prefix('~') {
            return SemanticVersion::parse(rest).map(Constraint::Tilde).map_err(fail);
        }
        if let Some(rest) = trimmed.strip_prefix(">=") {
            return SemanticVersion::parse(rest)
                .map(|v| Constraint::Compare(CompareOp::GreaterEq, v))
                .map_err(fail);
        }
        if let Some(rest) = trimmed.strip_prefix("<=") {
            return SemanticVersion::parse(rest)
                .map(|v| Constraint::Compare(CompareOp::LessEq, v))
                .map_err(fail);
        }
        if let Some(rest) = trimmed.strip_prefix('>') {
            return SemanticVersion::parse(rest)
                .map(|v| Constraint::Compare(CompareOp::Greater, v))
                .map_err(fail);
        }
        if let Some(rest) = trimmed.strip_prefix('<') {
            return SemanticVersion::parse(rest)
                .map(|v| Constraint::Compare(CompareOp::Less, v))
                .map_err(fail);
        }
        if let Some(rest) = trimmed.strip_prefix('=') {
            return SemanticVersion::parse(rest).map(Constraint::Exact).map_err(fail);
        }
        SemanticVersion::parse(trimmed).map(Constraint::Exact).map_err(fail)
    }

    /// Evaluate this constraint against a parsed version
    pub fn matches(&self, version: &SemanticVersion) -> bool {
        match self {
            Constraint::Exact(wanted) => version == wanted,
            Constraint::Caret(base) => {
                if version.major != base.major {
                    return false;
                }
                if base.major > 0 {
                    return version.compare(base) != Ordering::Less;
                }
                if base.minor > 0 {
                    // 0.x: minor locked, patch may advance
                    return version.minor == base.minor
                        && version.compare(base) != Ordering::Less;
                }
                // 0.0.x: patch must match exactly
                version.minor == 0
                    && version.patch == base.patch
                    && version.compare(base) != Ordering::Less
            }
            Constraint::Tilde(base) => {
                version.major == base.major
                    && version.minor == base.minor
                    && version.compare(base) != Ordering::Less
            }
            Constraint::Compare(op, base) => {
                let ordering = version.compare(base);
                match op {
                    CompareOp::Less => ordering == Ordering::Less,
                    CompareOp::LessEq => ordering != Ordering::Greater,
                    CompareOp::Greater => ordering == Ordering::Greater,
                    CompareOp::GreaterEq => ordering != Ordering::Less,
                }
            }
        }
    }
}

impl FromStr for Constraint {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Constraint::parse(s)
    }
}

/// Total constraint evaluation: `false` for any unparsable version or
/// unrecognized constraint shape, never an error. Callers that need to
/// distinguish "no" from "malformed" parse the inputs themselves.
pub fn satisfies(version: &str, constraint: &str) -> bool {
    let Some(version) = SemanticVersion::parse_lenient(version) else {
        return false;
    };
    match Constraint::parse(constraint) {
        Ok(constraint) => constraint.matches(&version),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests;
