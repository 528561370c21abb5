//! # Trellis Dependency Graph Checker
//!
//! Validates a candidate plugin's declared dependencies and conflicts
//! against a snapshot of the registry. All findings are aggregated; the
//! lifecycle engine refuses to move a plugin into `Installing` while any
//! issue is present.
//!
//! Cycle detection is depth-1 only: A requiring B while B requires A is
//! flagged, but a longer loop (A -> B -> C -> A) is not. This is a known,
//! documented limitation carried over from the platform's dependency
//! model, not an oversight.

use std::collections::HashMap;

use thiserror::Error;

use crate::manifest::PluginManifest;
use crate::version::satisfies;

/// A single dependency-validation finding
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DependencyIssue {
    /// A required dependency is not present in the registry
    #[error("Required dependency '{id}' is not in the registry")]
    MissingRequired { id: String },

    /// An optional dependency references an unknown plugin id
    #[error("Optional dependency '{id}' is not in the registry")]
    MissingOptional { id: String },

    /// The same id appears both as a dependency and as a conflict
    #[error("Plugin '{id}' is declared both as a dependency and as a conflict")]
    ConflictContradiction { id: String },

    /// The candidate and a required dependency require each other
    #[error("Circular dependency: '{candidate}' and '{other}' require each other")]
    DirectCycle { candidate: String, other: String },

    /// A required dependency exists at a version outside the constraint
    #[error("Dependency '{id}' version {found} does not satisfy '{constraint}'")]
    UnsatisfiedConstraint {
        id: String,
        constraint: String,
        found: String,
    },
}

/// Check a candidate manifest's dependency declarations against the given
/// registry snapshot (plugin id -> current manifest). Returns every issue
/// found; an empty list means the candidate may install.
pub fn check_dependencies(
    candidate: &PluginManifest,
    snapshot: &HashMap<String, PluginManifest>,
) -> Vec<DependencyIssue> {
    let mut issues = Vec::new();
    let deps = &candidate.dependencies;

    // Authoring contradiction: conflicting with something you depend on
    for id in &deps.conflicts {
        if deps.required.contains_key(id) || deps.optional.contains_key(id) {
            issues.push(DependencyIssue::ConflictContradiction { id: id.clone() });
        }
    }

    for (id, constraint) in &deps.required {
        let Some(dependency) = snapshot.get(id) else {
            issues.push(DependencyIssue::MissingRequired { id: id.clone() });
            continue;
        };

        if !satisfies(&dependency.version, constraint) {
            issues.push(DependencyIssue::UnsatisfiedConstraint {
                id: id.clone(),
                constraint: constraint.clone(),
                found: dependency.version.clone(),
            });
        }

        // Depth-1 cycle only: does the dependency require us back?
        if dependency.dependencies.required.contains_key(&candidate.id) {
            issues.push(DependencyIssue::DirectCycle {
                candidate: candidate.id.clone(),
                other: id.clone(),
            });
        }
    }

    for (id, constraint) in &deps.optional {
        let Some(dependency) = snapshot.get(id) else {
            issues.push(DependencyIssue::MissingOptional { id: id.clone() });
            continue;
        };

        if !satisfies(&dependency.version, constraint) {
            issues.push(DependencyIssue::UnsatisfiedConstraint {
                id: id.clone(),
                constraint: constraint.clone(),
                found: dependency.version.clone(),
            });
        }
    }

    issues
}

#[cfg(test)]
mod tests;
