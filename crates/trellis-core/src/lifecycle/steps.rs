//! Ordered lifecycle steps and the provisioner seam.
//!
//! Long-running transitions execute as a sequence of named steps. The
//! engine owns step bookkeeping; the actual external work (schema, routes,
//! container orchestration intents) goes through [`Provisioner`], which the
//! composition root injects. The engine issues intents and observes
//! results; it never schedules containers itself.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::lifecycle::state::PluginAction;

/// Ordered step names for an install operation
pub const INSTALL_STEPS: &[&str] = &[
    "validate manifest",
    "register schema",
    "register routes",
    "register permissions",
    "register event subscriptions",
    "register frontend module",
];

/// Ordered step names for an update operation
pub const UPDATE_STEPS: &[&str] = &[
    "snapshot current version",
    "stage new version",
    "migrate schema",
    "swap routes",
    "refresh event subscriptions",
];

/// Ordered step names for an uninstall operation
pub const UNINSTALL_STEPS: &[&str] = &[
    "remove routes",
    "remove permissions",
    "remove event subscriptions",
    "remove frontend module",
];

/// Extra uninstall step appended when the operator asks to purge tenant data
pub const PURGE_TENANT_DATA_STEP: &str = "purge tenant data";

/// State of one step within an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepState {
    Pending,
    Running,
    Complete,
    Failed,
    Skipped,
}

/// One named, ordered step of an in-flight operation. Transient: owned by
/// the engine for the operation's lifetime and exposed to observers as part
/// of a progress snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallStep {
    /// 1-based position in the operation
    pub number: usize,
    pub name: String,
    pub state: StepState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_suggestion: Option<String>,
}

impl InstallStep {
    pub fn pending(number: usize, name: &str) -> Self {
        Self {
            number,
            name: name.to_string(),
            state: StepState::Pending,
            detail: None,
            error_message: None,
            error_suggestion: None,
        }
    }
}

/// Failure reported by a provisioner step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    pub message: String,
    /// Optional remediation hint surfaced to the operator
    pub suggestion: Option<String>,
}

impl StepFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), suggestion: None }
    }

    pub fn with_suggestion(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self { message: message.into(), suggestion: Some(suggestion.into()) }
    }
}

/// The engine's seam to the provisioning backend. Implementations perform
/// (or forward) the external effect of a step and return a human-readable
/// detail line on success.
#[async_trait]
pub trait Provisioner: Send + Sync {
    async fn run_step(
        &self,
        plugin_id: &str,
        action: PluginAction,
        step: &str,
    ) -> Result<String, StepFailure>;
}

/// Provisioner that performs no external work; every step succeeds. The
/// default for compositions that only exercise registry bookkeeping.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProvisioner;

#[async_trait]
impl Provisioner for NoopProvisioner {
    async fn run_step(
        &self,
        plugin_id: &str,
        action: PluginAction,
        step: &str,
    ) -> Result<String, StepFailure> {
        log::debug!("noop provisioner: {} {} '{}'", action, step, plugin_id);
        Ok(format!("{} complete", step))
    }
}
