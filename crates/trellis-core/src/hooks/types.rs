//! Standard hook vocabulary for platform events.
//!
//! Plugins may register handlers for arbitrary hook names; this enum names
//! the events the platform itself emits, so core code and plugins agree on
//! the dotted strings without scattering literals.

use std::fmt;

/// Events the platform emits through the hook dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemHook {
    TenantCreated,
    TenantUpdated,
    TenantDeleted,
    UserCreated,
    UserUpdated,
    UserDeleted,
    AuthSuccess,
    AuthFailure,
    ApiRequest,
    ApiResponse,
    ApiError,
    DataCreated,
    DataUpdated,
    DataDeleted,
    PluginInstalling,
    PluginInstalled,
    PluginEnabled,
    PluginDisabled,
    PluginUpdated,
    PluginUninstalled,
}

impl SystemHook {
    /// The dotted hook name used for registration and dispatch
    pub fn name(&self) -> &'static str {
        match self {
            SystemHook::TenantCreated => "tenant.created",
            SystemHook::TenantUpdated => "tenant.updated",
            SystemHook::TenantDeleted => "tenant.deleted",
            SystemHook::UserCreated => "user.created",
            SystemHook::UserUpdated => "user.updated",
            SystemHook::UserDeleted => "user.deleted",
            SystemHook::AuthSuccess => "auth.success",
            SystemHook::AuthFailure => "auth.failure",
            SystemHook::ApiRequest => "api.request",
            SystemHook::ApiResponse => "api.response",
            SystemHook::ApiError => "api.error",
            SystemHook::DataCreated => "data.created",
            SystemHook::DataUpdated => "data.updated",
            SystemHook::DataDeleted => "data.deleted",
            SystemHook::PluginInstalling => "plugin.installing",
            SystemHook::PluginInstalled => "plugin.installed",
            SystemHook::PluginEnabled => "plugin.enabled",
            SystemHook::PluginDisabled => "plugin.disabled",
            SystemHook::PluginUpdated => "plugin.updated",
            SystemHook::PluginUninstalled => "plugin.uninstalled",
        }
    }
}

impl fmt::Display for SystemHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
