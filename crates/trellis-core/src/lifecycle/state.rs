//! Lifecycle states, actions, and per-tenant installation records.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Registry-wide status of a plugin, one per plugin id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleState {
    /// Manifest published, nothing installed
    Registered,
    /// Install steps in progress
    Installing,
    /// Installed but not serving
    Installed,
    /// Serving; tenants may enable it
    Active,
    /// Stopped by an operator; tenant data retained
    Disabled,
    /// Uninstall steps in progress
    Uninstalling,
    /// Logically destroyed; terminal
    Uninstalled,
}

impl LifecycleState {
    /// Whether the given action may be requested from this state. Actions
    /// with extra preconditions (dependency checks, tenant counts,
    /// confirmations) are still rejected later even when this allows them.
    pub fn permits(&self, action: PluginAction) -> bool {
        use LifecycleState::*;
        match action {
            PluginAction::Install => *self == Registered,
            PluginAction::Enable => matches!(self, Installed | Disabled),
            PluginAction::Disable => *self == Active,
            PluginAction::Update => *self == Active,
            PluginAction::Uninstall => matches!(self, Active | Disabled),
            PluginAction::Cancel => *self == Installing,
            // Retry re-runs a failed install (back at Registered) or a
            // rolled-back update (back at Active)
            PluginAction::Retry => matches!(self, Registered | Active),
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Registered => "REGISTERED",
            LifecycleState::Installing => "INSTALLING",
            LifecycleState::Installed => "INSTALLED",
            LifecycleState::Active => "ACTIVE",
            LifecycleState::Disabled => "DISABLED",
            LifecycleState::Uninstalling => "UNINSTALLING",
            LifecycleState::Uninstalled => "UNINSTALLED",
        };
        write!(f, "{}", name)
    }
}

/// Operator-initiated lifecycle action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginAction {
    Install,
    Enable,
    Disable,
    Update,
    Uninstall,
    Cancel,
    Retry,
}

impl fmt::Display for PluginAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PluginAction::Install => "install",
            PluginAction::Enable => "enable",
            PluginAction::Disable => "disable",
            PluginAction::Update => "update",
            PluginAction::Uninstall => "uninstall",
            PluginAction::Cancel => "cancel",
            PluginAction::Retry => "retry",
        };
        write!(f, "{}", name)
    }
}

/// Per-tenant enablement status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstallationStatus {
    Active,
    Inactive,
}

/// A tenant's installation record for one plugin. The count of `Active`
/// records gates uninstall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantInstallation {
    pub tenant_id: String,
    pub plugin_id: String,
    pub status: InstallationStatus,
    /// Unix timestamp (seconds) of the initial enablement
    pub installed_at: u64,
}

impl TenantInstallation {
    pub fn new(tenant_id: &str, plugin_id: &str) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            plugin_id: plugin_id.to_string(),
            status: InstallationStatus::Active,
            installed_at: unix_now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == InstallationStatus::Active
    }
}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
