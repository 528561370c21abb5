//! The lifecycle engine: per-plugin state machines under a single-writer
//! discipline.
//!
//! At most one lifecycle transition is in flight per plugin id; concurrent
//! requests for the same plugin are rejected, not queued, so step-progress
//! reporting stays unambiguous. Transitions on different plugins proceed in
//! parallel: step execution happens outside the engine lock, which is held
//! only to check preconditions, commit state, and serve snapshots. The one
//! cross-entity invariant — uninstall blocked while tenants are enabled —
//! is checked and committed under the same lock acquisition.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::json;
use tokio::sync::Mutex;

use crate::dependency::check_dependencies;
use crate::hooks::{HookContext, SharedHookDispatcher, SystemHook};
use crate::manifest::{validate_manifest, PermissionDeclaration, PluginManifest};
use crate::lifecycle::error::LifecycleError;
use crate::lifecycle::progress::{OperationHandle, OperationSnapshot};
use crate::lifecycle::state::{LifecycleState, PluginAction, TenantInstallation};
use crate::lifecycle::steps::{
    NoopProvisioner, Provisioner, StepFailure, INSTALL_STEPS, PURGE_TENANT_DATA_STEP,
    UNINSTALL_STEPS, UPDATE_STEPS,
};
use crate::version::{Constraint, SemanticVersion};

/// What the operator is about to activate, surfaced before (and by) enable
#[derive(Debug, Clone)]
pub struct EnableReport {
    pub plugin_id: String,
    pub permissions: Vec<PermissionDeclaration>,
    pub event_subscriptions: usize,
}

/// Impact of disabling: how many tenants currently run the plugin
#[derive(Debug, Clone)]
pub struct DisableReport {
    pub plugin_id: String,
    pub affected_tenants: usize,
}

/// Generic inbound transition request
#[derive(Debug, Clone)]
pub struct TransitionCommand {
    pub plugin_id: String,
    pub action: PluginAction,
    /// Exact version or range constraint; required for update
    pub target_version: Option<String>,
    /// Name-match confirmation for breaking-change updates
    pub confirm: Option<String>,
    /// Purge per-tenant data on uninstall (irreversible)
    pub delete_tenant_data: bool,
}

impl TransitionCommand {
    pub fn new(plugin_id: &str, action: PluginAction) -> Self {
        Self {
            plugin_id: plugin_id.to_string(),
            action,
            target_version: None,
            confirm: None,
            delete_tenant_data: false,
        }
    }
}

/// Result of a generic transition request
#[derive(Debug)]
pub enum TransitionOutcome {
    Operation(OperationSnapshot),
    Enabled(EnableReport),
    Disabled(DisableReport),
    CancelRequested,
}

/// The last failed step-driven operation, kept for explicit retry
#[derive(Debug, Clone)]
enum FailedOperation {
    Install,
    /// Target version string; confirmation already passed when it failed
    Update { target_version: String },
}

/// How a step loop ended
enum StepRun {
    Completed,
    Failed { number: usize, step: String, failure: StepFailure },
    Cancelled,
}

struct PluginRecord {
    /// The currently effective manifest (the active version's)
    manifest: PluginManifest,
    /// Every published version, superseded records included
    versions: Vec<PluginManifest>,
    state: LifecycleState,
    tenants: HashMap<String, TenantInstallation>,
    last_failed: Option<FailedOperation>,
}

impl PluginRecord {
    fn active_tenant_count(&self) -> usize {
        self.tenants.values().filter(|t| t.is_active()).count()
    }
}

#[derive(Default)]
struct EngineState {
    plugins: HashMap<String, PluginRecord>,
    in_flight: HashSet<String>,
    operations: HashMap<String, Arc<OperationHandle>>,
    latest_op: HashMap<String, String>,
    next_op_id: u64,
}

impl EngineState {
    fn new_operation(
        &mut self,
        plugin_id: &str,
        action: PluginAction,
        steps: &[&str],
    ) -> Arc<OperationHandle> {
        self.next_op_id += 1;
        let op_id = format!("op-{}", self.next_op_id);
        let handle = Arc::new(OperationHandle::new(&op_id, plugin_id, action, steps));
        self.operations.insert(op_id.clone(), Arc::clone(&handle));
        self.latest_op.insert(plugin_id.to_string(), op_id);
        handle
    }

    fn registry_snapshot(&self) -> HashMap<String, PluginManifest> {
        self.plugins
            .iter()
            .map(|(id, record)| (id.clone(), record.manifest.clone()))
            .collect()
    }

    fn record(&self, plugin_id: &str) -> Result<&PluginRecord, LifecycleError> {
        self.plugins
            .get(plugin_id)
            .ok_or_else(|| LifecycleError::PluginNotFound(plugin_id.to_string()))
    }

    fn record_mut(&mut self, plugin_id: &str) -> Result<&mut PluginRecord, LifecycleError> {
        self.plugins
            .get_mut(plugin_id)
            .ok_or_else(|| LifecycleError::PluginNotFound(plugin_id.to_string()))
    }

    fn ensure_idle(&self, plugin_id: &str) -> Result<(), LifecycleError> {
        if self.in_flight.contains(plugin_id) {
            return Err(LifecycleError::OperationInFlight(plugin_id.to_string()));
        }
        Ok(())
    }
}

fn ensure_permits(
    record: &PluginRecord,
    plugin_id: &str,
    action: PluginAction,
) -> Result<(), LifecycleError> {
    if !record.state.permits(action) {
        return Err(LifecycleError::InvalidTransition {
            plugin_id: plugin_id.to_string(),
            state: record.state,
            action,
        });
    }
    Ok(())
}

/// Plugin registry and lifecycle engine
#[derive(Clone)]
pub struct LifecycleEngine {
    state: Arc<Mutex<EngineState>>,
    hooks: SharedHookDispatcher,
    provisioner: Arc<dyn Provisioner>,
}

impl LifecycleEngine {
    /// Engine with its own hook dispatcher and a no-op provisioner
    pub fn new() -> Self {
        Self::with_parts(SharedHookDispatcher::new(), Arc::new(NoopProvisioner))
    }

    /// Engine wired to an existing dispatcher and provisioning backend
    pub fn with_parts(hooks: SharedHookDispatcher, provisioner: Arc<dyn Provisioner>) -> Self {
        Self {
            state: Arc::new(Mutex::new(EngineState::default())),
            hooks,
            provisioner,
        }
    }

    /// The dispatcher plugins register their hook handlers with
    pub fn hooks(&self) -> SharedHookDispatcher {
        self.hooks.clone()
    }

    // ---- registry surface ----

    /// Publish a new plugin's manifest; the plugin enters `Registered`
    pub async fn publish(&self, manifest: PluginManifest) -> Result<(), LifecycleError> {
        let report = validate_manifest(&manifest);
        if !report.is_valid() {
            return Err(LifecycleError::ManifestInvalid {
                plugin_id: manifest.id.clone(),
                errors: report.errors,
            });
        }

        let mut state = self.state.lock().await;
        if state.plugins.contains_key(&manifest.id) {
            return Err(LifecycleError::AlreadyPublished(manifest.id.clone()));
        }
        log::info!("publishing plugin '{}' v{}", manifest.id, manifest.version);
        state.plugins.insert(
            manifest.id.clone(),
            PluginRecord {
                versions: vec![manifest.clone()],
                manifest,
                state: LifecycleState::Registered,
                tenants: HashMap::new(),
                last_failed: None,
            },
        );
        Ok(())
    }

    /// Publish a new version of an existing plugin. The record is appended,
    /// not mutated; the running version changes only through `update`.
    pub async fn publish_version(&self, manifest: PluginManifest) -> Result<(), LifecycleError> {
        let report = validate_manifest(&manifest);
        if !report.is_valid() {
            return Err(LifecycleError::ManifestInvalid {
                plugin_id: manifest.id.clone(),
                errors: report.errors,
            });
        }

        let mut state = self.state.lock().await;
        let record = state.record_mut(&manifest.id)?;
        if record.versions.iter().any(|m| m.version == manifest.version) {
            return Err(LifecycleError::VersionAlreadyPublished {
                plugin_id: manifest.id.clone(),
                version: manifest.version.clone(),
            });
        }
        log::info!("publishing plugin '{}' version {}", manifest.id, manifest.version);
        record.versions.push(manifest);
        Ok(())
    }

    pub async fn plugin_ids(&self) -> Vec<String> {
        let state = self.state.lock().await;
        let mut ids: Vec<String> = state.plugins.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub async fn state_of(&self, plugin_id: &str) -> Result<LifecycleState, LifecycleError> {
        let state = self.state.lock().await;
        Ok(state.record(plugin_id)?.state)
    }

    /// The currently effective manifest for a plugin
    pub async fn manifest_of(&self, plugin_id: &str) -> Result<PluginManifest, LifecycleError> {
        let state = self.state.lock().await;
        Ok(state.record(plugin_id)?.manifest.clone())
    }

    /// Current manifests of every known plugin, for dependency checking
    pub async fn registry_snapshot(&self) -> HashMap<String, PluginManifest> {
        let state = self.state.lock().await;
        state.registry_snapshot()
    }

    // ---- tenant surface ----

    /// Enable the plugin for a tenant. The plugin must be `Active`.
    pub async fn enable_for_tenant(
        &self,
        plugin_id: &str,
        tenant_id: &str,
    ) -> Result<(), LifecycleError> {
        let mut state = self.state.lock().await;
        let record = state.record_mut(plugin_id)?;
        if record.state != LifecycleState::Active {
            return Err(LifecycleError::InvalidTransition {
                plugin_id: plugin_id.to_string(),
                state: record.state,
                action: PluginAction::Enable,
            });
        }
        record
            .tenants
            .insert(tenant_id.to_string(), TenantInstallation::new(tenant_id, plugin_id));
        Ok(())
    }

    /// Disable the plugin for a tenant; the installation record is retained
    /// with its data, only the active count drops.
    pub async fn disable_for_tenant(
        &self,
        plugin_id: &str,
        tenant_id: &str,
    ) -> Result<(), LifecycleError> {
        let mut state = self.state.lock().await;
        let record = state.record_mut(plugin_id)?;
        match record.tenants.get_mut(tenant_id) {
            Some(installation) => {
                installation.status = crate::lifecycle::state::InstallationStatus::Inactive;
                Ok(())
            }
            None => Err(LifecycleError::TenantNotInstalled {
                tenant_id: tenant_id.to_string(),
                plugin_id: plugin_id.to_string(),
            }),
        }
    }

    pub async fn active_tenant_count(&self, plugin_id: &str) -> Result<usize, LifecycleError> {
        let state = self.state.lock().await;
        Ok(state.record(plugin_id)?.active_tenant_count())
    }

    // ---- progress surface ----

    /// Pure read of an operation's progress; idempotent, side-effect free
    pub async fn operation_progress(&self, op_id: &str) -> Option<OperationSnapshot> {
        let state = self.state.lock().await;
        state.operations.get(op_id).map(|h| h.snapshot())
    }

    /// Progress of the plugin's most recent operation, finished or not
    pub async fn current_operation(&self, plugin_id: &str) -> Option<OperationSnapshot> {
        let state = self.state.lock().await;
        let op_id = state.latest_op.get(plugin_id)?;
        state.operations.get(op_id).map(|h| h.snapshot())
    }

    // ---- transitions ----

    /// Generic inbound entry point for transition commands
    pub async fn perform(
        &self,
        command: TransitionCommand,
    ) -> Result<TransitionOutcome, LifecycleError> {
        let plugin_id = command.plugin_id.as_str();
        match command.action {
            PluginAction::Install => {
                self.install(plugin_id).await.map(TransitionOutcome::Operation)
            }
            PluginAction::Enable => self.enable(plugin_id).await.map(TransitionOutcome::Enabled),
            PluginAction::Disable => {
                self.disable(plugin_id).await.map(TransitionOutcome::Disabled)
            }
            PluginAction::Update => {
                let target = command
                    .target_version
                    .as_deref()
                    .ok_or(LifecycleError::MissingUpdateTarget)?;
                self.update(plugin_id, target, command.confirm.as_deref())
                    .await
                    .map(TransitionOutcome::Operation)
            }
            PluginAction::Uninstall => self
                .uninstall(plugin_id, command.delete_tenant_data)
                .await
                .map(TransitionOutcome::Operation),
            PluginAction::Cancel => {
                self.cancel(plugin_id).await.map(|_| TransitionOutcome::CancelRequested)
            }
            PluginAction::Retry => {
                self.retry(plugin_id).await.map(TransitionOutcome::Operation)
            }
        }
    }

    /// Install a registered plugin. Rejected up front unless the plugin is
    /// `Registered`, no operation is in flight, and the dependency checker
    /// reports zero issues against the current registry snapshot.
    pub async fn install(&self, plugin_id: &str) -> Result<OperationSnapshot, LifecycleError> {
        let (handle, manifest) = {
            let mut state = self.state.lock().await;
            state.ensure_idle(plugin_id)?;
            let record = state.record(plugin_id)?;
            ensure_permits(record, plugin_id, PluginAction::Install)?;

            let snapshot = state.registry_snapshot();
            let issues = check_dependencies(&record.manifest, &snapshot);
            if !issues.is_empty() {
                return Err(LifecycleError::DependencyCheckFailed {
                    plugin_id: plugin_id.to_string(),
                    issues,
                });
            }

            let manifest = record.manifest.clone();
            let handle = state.new_operation(plugin_id, PluginAction::Install, INSTALL_STEPS);
            if let Some(record) = state.plugins.get_mut(plugin_id) {
                record.state = LifecycleState::Installing;
            }
            state.in_flight.insert(plugin_id.to_string());
            (handle, manifest)
        };

        log::info!("installing plugin '{}' v{}", plugin_id, manifest.version);
        self.emit(SystemHook::PluginInstalling, plugin_id).await;

        let run = self.run_steps(&handle, plugin_id, Some(&manifest)).await;

        {
            let mut state = self.state.lock().await;
            state.in_flight.remove(plugin_id);
            if let Some(record) = state.plugins.get_mut(plugin_id) {
                match &run {
                    StepRun::Completed => {
                        record.state = LifecycleState::Installed;
                        record.last_failed = None;
                    }
                    StepRun::Failed { .. } => {
                        // Install rolled back: no partial state survives
                        record.state = LifecycleState::Registered;
                        record.last_failed = Some(FailedOperation::Install);
                    }
                    StepRun::Cancelled => {
                        record.state = LifecycleState::Registered;
                    }
                }
            }
        }

        match run {
            StepRun::Completed => {
                self.emit(SystemHook::PluginInstalled, plugin_id).await;
                Ok(handle.snapshot())
            }
            StepRun::Cancelled => {
                log::info!("install of '{}' cancelled; plugin back to REGISTERED", plugin_id);
                Ok(handle.snapshot())
            }
            StepRun::Failed { number, step, failure } => Err(LifecycleError::StepFailed {
                plugin_id: plugin_id.to_string(),
                action: PluginAction::Install,
                step,
                number,
                message: failure.message,
                suggestion: failure.suggestion,
            }),
        }
    }

    /// Request cooperative cancellation of an in-flight install. Observed
    /// between steps; the running step finishes first.
    pub async fn cancel(&self, plugin_id: &str) -> Result<(), LifecycleError> {
        let state = self.state.lock().await;
        state.record(plugin_id)?;
        if !state.in_flight.contains(plugin_id) {
            return Err(LifecycleError::NoOperationInFlight(plugin_id.to_string()));
        }
        let handle = state
            .latest_op
            .get(plugin_id)
            .and_then(|op_id| state.operations.get(op_id))
            .ok_or_else(|| LifecycleError::NoOperationInFlight(plugin_id.to_string()))?;
        if handle.action() != PluginAction::Install {
            return Err(LifecycleError::CancelNotSupported {
                plugin_id: plugin_id.to_string(),
                action: handle.action(),
            });
        }
        handle.request_cancel();
        Ok(())
    }

    /// Re-run the plugin's last failed install or update
    pub async fn retry(&self, plugin_id: &str) -> Result<OperationSnapshot, LifecycleError> {
        let failed = {
            let state = self.state.lock().await;
            state
                .record(plugin_id)?
                .last_failed
                .clone()
                .ok_or_else(|| LifecycleError::NothingToRetry(plugin_id.to_string()))?
        };
        match failed {
            FailedOperation::Install => self.install(plugin_id).await,
            // Confirmation already passed when the original attempt started
            FailedOperation::Update { target_version } => {
                self.update_resolved(plugin_id, &target_version, None, true).await
            }
        }
    }

    /// What enabling would activate, without changing state
    pub async fn enable_preview(&self, plugin_id: &str) -> Result<EnableReport, LifecycleError> {
        let state = self.state.lock().await;
        let record = state.record(plugin_id)?;
        ensure_permits(record, plugin_id, PluginAction::Enable)?;
        Ok(enable_report(plugin_id, record))
    }

    /// Enable an installed (or disabled) plugin; returns the same report as
    /// the preview so callers can show what went live.
    pub async fn enable(&self, plugin_id: &str) -> Result<EnableReport, LifecycleError> {
        let report = {
            let mut state = self.state.lock().await;
            state.ensure_idle(plugin_id)?;
            let record = state.record_mut(plugin_id)?;
            ensure_permits(record, plugin_id, PluginAction::Enable)?;
            record.state = LifecycleState::Active;
            enable_report(plugin_id, record)
        };
        log::info!("plugin '{}' enabled", plugin_id);
        self.emit(SystemHook::PluginEnabled, plugin_id).await;
        Ok(report)
    }

    /// Impact of disabling, without changing state
    pub async fn disable_preview(&self, plugin_id: &str) -> Result<DisableReport, LifecycleError> {
        let state = self.state.lock().await;
        let record = state.record(plugin_id)?;
        ensure_permits(record, plugin_id, PluginAction::Disable)?;
        Ok(DisableReport {
            plugin_id: plugin_id.to_string(),
            affected_tenants: record.active_tenant_count(),
        })
    }

    /// Disable an active plugin. Always succeeds once preconditions hold;
    /// the report carries the tenant impact. Tenant data is untouched.
    pub async fn disable(&self, plugin_id: &str) -> Result<DisableReport, LifecycleError> {
        let report = {
            let mut state = self.state.lock().await;
            state.ensure_idle(plugin_id)?;
            let record = state.record_mut(plugin_id)?;
            ensure_permits(record, plugin_id, PluginAction::Disable)?;
            record.state = LifecycleState::Disabled;
            DisableReport {
                plugin_id: plugin_id.to_string(),
                affected_tenants: record.active_tenant_count(),
            }
        };
        if report.affected_tenants > 0 {
            log::warn!(
                "plugin '{}' disabled with {} tenant(s) still enabled",
                plugin_id,
                report.affected_tenants
            );
        } else {
            log::info!("plugin '{}' disabled", plugin_id);
        }
        self.emit(SystemHook::PluginDisabled, plugin_id).await;
        Ok(report)
    }

    /// Update an active plugin to a target version or range. Breaking
    /// changes require a name-match confirmation; any step failure
    /// automatically restores the previously active version.
    pub async fn update(
        &self,
        plugin_id: &str,
        target: &str,
        confirm: Option<&str>,
    ) -> Result<OperationSnapshot, LifecycleError> {
        self.update_resolved(plugin_id, target, confirm, false).await
    }

    async fn update_resolved(
        &self,
        plugin_id: &str,
        target: &str,
        confirm: Option<&str>,
        skip_confirmation: bool,
    ) -> Result<OperationSnapshot, LifecycleError> {
        let (handle, target_manifest, previous) = {
            let mut state = self.state.lock().await;
            state.ensure_idle(plugin_id)?;
            let record = state.record(plugin_id)?;
            ensure_permits(record, plugin_id, PluginAction::Update)?;

            let target_manifest = resolve_target(record, target).ok_or_else(|| {
                LifecycleError::NoMatchingVersion {
                    plugin_id: plugin_id.to_string(),
                    target: target.to_string(),
                }
            })?;

            if target_manifest.breaking_changes && !skip_confirmation {
                let expected = record.manifest.name.clone();
                if confirm != Some(expected.as_str()) {
                    return Err(LifecycleError::ConfirmationRequired {
                        plugin_id: plugin_id.to_string(),
                        target: target_manifest.version.clone(),
                        expected,
                    });
                }
            }

            let previous = record.manifest.clone();
            let handle = state.new_operation(plugin_id, PluginAction::Update, UPDATE_STEPS);
            if let Some(record) = state.plugins.get_mut(plugin_id) {
                // Stage the new version; rolled back below on failure
                record.manifest = target_manifest.clone();
            }
            state.in_flight.insert(plugin_id.to_string());
            (handle, target_manifest, previous)
        };

        log::info!(
            "updating plugin '{}' {} -> {}",
            plugin_id,
            previous.version,
            target_manifest.version
        );

        let run = self.run_steps(&handle, plugin_id, None).await;

        {
            let mut state = self.state.lock().await;
            state.in_flight.remove(plugin_id);
            if let Some(record) = state.plugins.get_mut(plugin_id) {
                match &run {
                    StepRun::Completed => {
                        record.last_failed = None;
                    }
                    StepRun::Failed { .. } => {
                        // Automatic rollback to the previously active version
                        record.manifest = previous.clone();
                        record.last_failed = Some(FailedOperation::Update {
                            target_version: target_manifest.version.clone(),
                        });
                    }
                    StepRun::Cancelled => {
                        record.manifest = previous.clone();
                    }
                }
            }
        }

        match run {
            StepRun::Completed => {
                self.emit(SystemHook::PluginUpdated, plugin_id).await;
                Ok(handle.snapshot())
            }
            StepRun::Cancelled => Ok(handle.snapshot()),
            StepRun::Failed { number, step, failure } => {
                log::warn!(
                    "update of '{}' failed at step {}; restored v{}",
                    plugin_id,
                    number,
                    previous.version
                );
                Err(LifecycleError::StepFailed {
                    plugin_id: plugin_id.to_string(),
                    action: PluginAction::Update,
                    step,
                    number,
                    message: failure.message,
                    suggestion: failure.suggestion,
                })
            }
        }
    }

    /// Uninstall an inactive-for-all-tenants plugin. Refused without state
    /// change while any tenant still has it enabled; the tenant count is
    /// re-checked under the same lock that commits the transition, so a
    /// tenant enabling in between cannot slip through.
    pub async fn uninstall(
        &self,
        plugin_id: &str,
        delete_tenant_data: bool,
    ) -> Result<OperationSnapshot, LifecycleError> {
        let (handle, prior_state) = {
            let mut state = self.state.lock().await;
            state.ensure_idle(plugin_id)?;
            let record = state.record(plugin_id)?;
            ensure_permits(record, plugin_id, PluginAction::Uninstall)?;

            let active = record.active_tenant_count();
            if active > 0 {
                return Err(LifecycleError::BlockedByTenants {
                    plugin_id: plugin_id.to_string(),
                    active_tenants: active,
                });
            }

            let prior_state = record.state;
            let mut steps: Vec<&str> = UNINSTALL_STEPS.to_vec();
            if delete_tenant_data {
                steps.push(PURGE_TENANT_DATA_STEP);
            }
            let handle = state.new_operation(plugin_id, PluginAction::Uninstall, &steps);
            if let Some(record) = state.plugins.get_mut(plugin_id) {
                record.state = LifecycleState::Uninstalling;
            }
            state.in_flight.insert(plugin_id.to_string());
            (handle, prior_state)
        };

        log::info!(
            "uninstalling plugin '{}' (delete tenant data: {})",
            plugin_id,
            delete_tenant_data
        );

        let run = self.run_steps(&handle, plugin_id, None).await;

        {
            let mut state = self.state.lock().await;
            state.in_flight.remove(plugin_id);
            if let Some(record) = state.plugins.get_mut(plugin_id) {
                match &run {
                    StepRun::Completed => {
                        record.state = LifecycleState::Uninstalled;
                        if delete_tenant_data {
                            record.tenants.clear();
                        }
                    }
                    StepRun::Failed { .. } => {
                        record.state = prior_state;
                    }
                    StepRun::Cancelled => {
                        record.state = prior_state;
                    }
                }
            }
        }

        match run {
            StepRun::Completed => {
                let removed = self.hooks.unregister_plugin(plugin_id).await;
                if removed > 0 {
                    log::debug!("removed {} hook handler(s) of '{}'", removed, plugin_id);
                }
                self.emit(SystemHook::PluginUninstalled, plugin_id).await;
                Ok(handle.snapshot())
            }
            StepRun::Cancelled => Ok(handle.snapshot()),
            StepRun::Failed { number, step, failure } => Err(LifecycleError::StepFailed {
                plugin_id: plugin_id.to_string(),
                action: PluginAction::Uninstall,
                step,
                number,
                message: failure.message,
                suggestion: failure.suggestion,
            }),
        }
    }

    // ---- internals ----

    /// Execute the operation's steps in order. The engine lock is NOT held
    /// here; only the operation handle is touched, so other plugins'
    /// transitions proceed concurrently. The cancel flag is checked between
    /// steps — a running step always finishes or fails first.
    async fn run_steps(
        &self,
        handle: &OperationHandle,
        plugin_id: &str,
        candidate: Option<&PluginManifest>,
    ) -> StepRun {
        let step_names: Vec<String> =
            handle.snapshot().steps.into_iter().map(|s| s.name).collect();

        for (index, step) in step_names.iter().enumerate() {
            if handle.is_cancel_requested() {
                handle.skip_remaining(index);
                handle.mark_cancelled();
                return StepRun::Cancelled;
            }

            handle.begin_step(index);
            let result = match candidate {
                Some(manifest) if step == INSTALL_STEPS[0] => validate_step(manifest),
                _ => self.provisioner.run_step(plugin_id, handle.action(), step).await,
            };

            match result {
                Ok(detail) => handle.complete_step(index, detail),
                Err(failure) => {
                    log::error!(
                        "{} of '{}' failed at step {} ('{}'): {}",
                        handle.action(),
                        plugin_id,
                        index + 1,
                        step,
                        failure.message
                    );
                    handle.fail_step(index, &failure);
                    handle.skip_remaining(index + 1);
                    return StepRun::Failed {
                        number: index + 1,
                        step: step.clone(),
                        failure,
                    };
                }
            }
        }

        handle.mark_succeeded();
        StepRun::Completed
    }

    async fn emit(&self, hook: SystemHook, plugin_id: &str) {
        let context = HookContext::new(hook.name(), json!({ "plugin_id": plugin_id }));
        let outcomes = self.hooks.trigger(hook.name(), &context).await;
        log::debug!("emitted {} to {} handler(s)", hook, outcomes.len());
    }
}

impl Default for LifecycleEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn enable_report(plugin_id: &str, record: &PluginRecord) -> EnableReport {
    EnableReport {
        plugin_id: plugin_id.to_string(),
        permissions: record.manifest.permissions.clone(),
        event_subscriptions: record.manifest.events.len(),
    }
}

/// The install-time manifest re-validation step
fn validate_step(manifest: &PluginManifest) -> Result<String, StepFailure> {
    let report = validate_manifest(manifest);
    if report.is_valid() {
        Ok("manifest valid".to_string())
    } else {
        Err(StepFailure::with_suggestion(
            report.errors.join("; "),
            "fix the manifest and publish a corrected version",
        ))
    }
}

/// Resolve an update target among the plugin's published versions: an exact
/// version when the string parses as one, otherwise the highest published
/// version satisfying the constraint.
fn resolve_target(record: &PluginRecord, target: &str) -> Option<PluginManifest> {
    if let Some(wanted) = SemanticVersion::parse_lenient(target) {
        return record
            .versions
            .iter()
            .find(|m| SemanticVersion::parse_lenient(&m.version).as_ref() == Some(&wanted))
            .cloned();
    }
    let constraint = Constraint::parse(target).ok()?;
    record
        .versions
        .iter()
        .filter_map(|m| SemanticVersion::parse_lenient(&m.version).map(|v| (v, m)))
        .filter(|(v, _)| constraint.matches(v))
        .max_by(|(a, _), (b, _)| a.compare(b))
        .map(|(_, m)| m.clone())
}
