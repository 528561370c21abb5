//! Pollable progress for in-flight (and recently finished) operations.
//!
//! The step-execution loop writes through an [`OperationHandle`]; observers
//! read immutable [`OperationSnapshot`]s. Reading is idempotent and
//! side-effect free, so progress can be exposed over any transport without
//! touching engine internals. Snapshots survive completion for post-mortem
//! polling.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::lifecycle::state::PluginAction;
use crate::lifecycle::steps::{InstallStep, StepFailure, StepState};

/// Terminal (or running) status of one operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "status")]
pub enum OperationOutcome {
    Running,
    Succeeded,
    Failed { step: String, message: String },
    Cancelled,
}

/// Immutable view of an operation's progress at one poll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationSnapshot {
    pub op_id: String,
    pub plugin_id: String,
    pub action: PluginAction,
    pub steps: Vec<InstallStep>,
    pub outcome: OperationOutcome,
}

impl OperationSnapshot {
    /// The failed step, when the operation failed
    pub fn failed_step(&self) -> Option<&InstallStep> {
        self.steps.iter().find(|s| s.state == StepState::Failed)
    }
}

/// Shared, internally synchronized progress record for one operation.
/// The engine's step loop mutates it; pollers snapshot it.
#[derive(Debug)]
pub struct OperationHandle {
    op_id: String,
    plugin_id: String,
    action: PluginAction,
    steps: Mutex<Vec<InstallStep>>,
    outcome: Mutex<OperationOutcome>,
    cancel_requested: AtomicBool,
}

impl OperationHandle {
    pub fn new(op_id: &str, plugin_id: &str, action: PluginAction, step_names: &[&str]) -> Self {
        let steps = step_names
            .iter()
            .enumerate()
            .map(|(index, name)| InstallStep::pending(index + 1, name))
            .collect();
        Self {
            op_id: op_id.to_string(),
            plugin_id: plugin_id.to_string(),
            action,
            steps: Mutex::new(steps),
            outcome: Mutex::new(OperationOutcome::Running),
            cancel_requested: AtomicBool::new(false),
        }
    }

    pub fn op_id(&self) -> &str {
        &self.op_id
    }

    pub fn plugin_id(&self) -> &str {
        &self.plugin_id
    }

    pub fn action(&self) -> PluginAction {
        self.action
    }

    /// Cooperative cancel: observed by the step loop between steps; a step
    /// already running completes (or fails) first.
    pub fn request_cancel(&self) {
        self.cancel_requested.store(true, Ordering::SeqCst);
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.cancel_requested.load(Ordering::SeqCst)
    }

    pub(crate) fn begin_step(&self, index: usize) {
        let mut steps = self.steps.lock().unwrap_or_else(|e| e.into_inner());
        steps[index].state = StepState::Running;
    }

    pub(crate) fn complete_step(&self, index: usize, detail: String) {
        let mut steps = self.steps.lock().unwrap_or_else(|e| e.into_inner());
        steps[index].state = StepState::Complete;
        steps[index].detail = Some(detail);
    }

    pub(crate) fn fail_step(&self, index: usize, failure: &StepFailure) {
        let mut steps = self.steps.lock().unwrap_or_else(|e| e.into_inner());
        steps[index].state = StepState::Failed;
        steps[index].error_message = Some(failure.message.clone());
        steps[index].error_suggestion = failure.suggestion.clone();
        let name = steps[index].name.clone();
        drop(steps);
        *self.outcome.lock().unwrap_or_else(|e| e.into_inner()) =
            OperationOutcome::Failed { step: name, message: failure.message.clone() };
    }

    /// Mark every step from `from` onward as skipped
    pub(crate) fn skip_remaining(&self, from: usize) {
        let mut steps = self.steps.lock().unwrap_or_else(|e| e.into_inner());
        for step in steps.iter_mut().skip(from) {
            if step.state == StepState::Pending {
                step.state = StepState::Skipped;
            }
        }
    }

    pub(crate) fn mark_succeeded(&self) {
        *self.outcome.lock().unwrap_or_else(|e| e.into_inner()) = OperationOutcome::Succeeded;
    }

    pub(crate) fn mark_cancelled(&self) {
        *self.outcome.lock().unwrap_or_else(|e| e.into_inner()) = OperationOutcome::Cancelled;
    }

    pub fn outcome(&self) -> OperationOutcome {
        self.outcome.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Snapshot the current step states and outcome
    pub fn snapshot(&self) -> OperationSnapshot {
        OperationSnapshot {
            op_id: self.op_id.clone(),
            plugin_id: self.plugin_id.clone(),
            action: self.action,
            steps: self.steps.lock().unwrap_or_else(|e| e.into_inner()).clone(),
            outcome: self.outcome(),
        }
    }
}
