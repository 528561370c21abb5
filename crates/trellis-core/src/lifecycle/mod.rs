//! # Trellis Lifecycle
//!
//! The per-plugin lifecycle state machine and the engine that drives it:
//! publishing manifests, installing through ordered steps with pollable
//! progress, enabling and disabling, constraint-resolved updates with
//! automatic rollback, tenant-gated uninstall, cooperative cancellation,
//! and retry of the last failed operation.

pub mod engine;
pub mod error;
pub mod progress;
pub mod state;
pub mod steps;

pub use engine::{
    DisableReport, EnableReport, LifecycleEngine, TransitionCommand, TransitionOutcome,
};
pub use error::LifecycleError;
pub use progress::{OperationHandle, OperationOutcome, OperationSnapshot};
pub use state::{InstallationStatus, LifecycleState, PluginAction, TenantInstallation};
pub use steps::{
    InstallStep, NoopProvisioner, Provisioner, StepFailure, StepState, INSTALL_STEPS,
    PURGE_TENANT_DATA_STEP, UNINSTALL_STEPS, UPDATE_STEPS,
};

#[cfg(test)]
mod tests;
