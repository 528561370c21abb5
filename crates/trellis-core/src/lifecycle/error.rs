//! # Trellis Lifecycle Errors
//!
//! Every rejected transition carries the reason: the blocking state, count,
//! or failing step. Silent no-ops are not acceptable at this boundary.

use thiserror::Error;

use crate::dependency::DependencyIssue;
use crate::lifecycle::state::{LifecycleState, PluginAction};

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Plugin not found: {0}")]
    PluginNotFound(String),

    #[error("Plugin already published: {0}")]
    AlreadyPublished(String),

    #[error("Version {version} of plugin '{plugin_id}' is already published")]
    VersionAlreadyPublished { plugin_id: String, version: String },

    #[error("Manifest for '{plugin_id}' is invalid: {}", errors.join("; "))]
    ManifestInvalid { plugin_id: String, errors: Vec<String> },

    #[error("Cannot {action} plugin '{plugin_id}' while it is {state}")]
    InvalidTransition {
        plugin_id: String,
        state: LifecycleState,
        action: PluginAction,
    },

    #[error("Dependency check failed for '{plugin_id}': {}", issues.iter().map(|i| i.to_string()).collect::<Vec<_>>().join("; "))]
    DependencyCheckFailed {
        plugin_id: String,
        issues: Vec<DependencyIssue>,
    },

    #[error("Another operation is already in flight for plugin '{0}'")]
    OperationInFlight(String),

    #[error("Uninstall blocked: {active_tenants} tenant(s) still have plugin '{plugin_id}' enabled")]
    BlockedByTenants { plugin_id: String, active_tenants: usize },

    #[error("Update of '{plugin_id}' to {target} contains breaking changes; pass the plugin name '{expected}' to confirm")]
    ConfirmationRequired {
        plugin_id: String,
        target: String,
        expected: String,
    },

    #[error("No published version of '{plugin_id}' matches '{target}'")]
    NoMatchingVersion { plugin_id: String, target: String },

    #[error("Step {number} ('{step}') failed during {action} of '{plugin_id}': {message}")]
    StepFailed {
        plugin_id: String,
        action: PluginAction,
        step: String,
        number: usize,
        message: String,
        suggestion: Option<String>,
    },

    #[error("No operation is in flight for plugin '{0}'")]
    NoOperationInFlight(String),

    #[error("Only install can be cancelled; the operation in flight for '{plugin_id}' is {action}")]
    CancelNotSupported { plugin_id: String, action: PluginAction },

    #[error("Nothing to retry for plugin '{0}': no failed operation recorded")]
    NothingToRetry(String),

    #[error("Tenant '{tenant_id}' does not have plugin '{plugin_id}' installed")]
    TenantNotInstalled { tenant_id: String, plugin_id: String },

    #[error("Update target is required for the update action")]
    MissingUpdateTarget,
}
