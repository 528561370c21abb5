//! # Trellis Core
//!
//! Core library of the Trellis plugin registry and lifecycle engine for
//! multi-tenant platforms. It provides:
//!
//! - [`version`]: semantic-version parsing, precedence, and range
//!   constraints (`^`, `~`, comparison operators)
//! - [`manifest`]: plugin manifest types, a builder, and structural
//!   validation of ids, versions, config fields, and permissions
//! - [`dependency`]: registry-wide dependency, conflict, and
//!   circular-dependency checking for install candidates
//! - [`hooks`]: the hook dispatcher plugins extend the platform through,
//!   with broadcast and pipeline dispatch and per-handler fault isolation
//! - [`lifecycle`]: the per-plugin state machine and the engine driving
//!   install, enable, disable, update, uninstall, cancel, and retry

pub mod dependency;
pub mod error;
pub mod hooks;
pub mod lifecycle;
pub mod manifest;
pub mod version;

pub use error::{Error, Result};
pub use hooks::{HookContext, HookDispatcher, SharedHookDispatcher, SystemHook};
pub use lifecycle::{LifecycleEngine, LifecycleState, PluginAction};
pub use manifest::{ManifestBuilder, PluginManifest};
pub use version::{satisfies, Constraint, SemanticVersion};

#[cfg(test)]
mod tests;
