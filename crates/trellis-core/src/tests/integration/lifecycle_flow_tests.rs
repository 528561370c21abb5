#![cfg(test)]

use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::hooks::{sync_hook_handler, SystemHook};
use crate::lifecycle::{LifecycleEngine, LifecycleState, OperationOutcome};
use crate::manifest::{ManifestBuilder, PluginManifest};

fn manifest(id: &str, name: &str, version: &str) -> PluginManifest {
    ManifestBuilder::new(id, name, version)
        .description("integration test plugin")
        .category("operations")
        .author("Platform Team")
        .license("Apache-2.0")
        .build()
}

/// Record every plugin.* lifecycle hook the engine emits
async fn observe_lifecycle_hooks(engine: &LifecycleEngine) -> Arc<Mutex<Vec<String>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    for hook in [
        SystemHook::PluginInstalling,
        SystemHook::PluginInstalled,
        SystemHook::PluginEnabled,
        SystemHook::PluginDisabled,
        SystemHook::PluginUpdated,
        SystemHook::PluginUninstalled,
    ] {
        let seen = Arc::clone(&seen);
        engine
            .hooks()
            .register_hook(
                hook.name(),
                "observer",
                sync_hook_handler(move |context| {
                    seen.lock().unwrap().push(context.hook.clone());
                    Ok(Value::Null)
                }),
            )
            .await;
    }
    seen
}

#[tokio::test]
async fn test_full_lifecycle_with_dependency_and_tenants() {
    let engine = LifecycleEngine::new();
    let seen = observe_lifecycle_hooks(&engine).await;

    // A dependency and a plugin requiring it
    engine.publish(manifest("billing", "Billing", "1.2.0")).await.unwrap();
    let mut crm = manifest("crm-sync", "Crm Sync", "1.0.0");
    crm.dependencies.required.insert("billing".to_string(), "^1.0.0".to_string());
    engine.publish(crm).await.unwrap();

    // Install, enable, and serve two tenants
    engine.install("billing").await.unwrap();
    let snapshot = engine.install("crm-sync").await.unwrap();
    assert_eq!(snapshot.outcome, OperationOutcome::Succeeded);

    engine.enable("billing").await.unwrap();
    engine.enable("crm-sync").await.unwrap();
    engine.enable_for_tenant("crm-sync", "acme").await.unwrap();
    engine.enable_for_tenant("crm-sync", "globex").await.unwrap();
    assert_eq!(engine.active_tenant_count("crm-sync").await.unwrap(), 2);

    // Roll forward through a published update
    engine.publish_version(manifest("crm-sync", "Crm Sync", "1.3.0")).await.unwrap();
    engine.update("crm-sync", "~1.3.0", None).await.unwrap();
    assert_eq!(engine.manifest_of("crm-sync").await.unwrap().version, "1.3.0");
    assert_eq!(engine.state_of("crm-sync").await.unwrap(), LifecycleState::Active);

    // Wind down: tenants off, disable, uninstall with purge
    engine.disable_for_tenant("crm-sync", "acme").await.unwrap();
    engine.disable_for_tenant("crm-sync", "globex").await.unwrap();
    engine.disable("crm-sync").await.unwrap();
    engine.uninstall("crm-sync", true).await.unwrap();
    assert_eq!(engine.state_of("crm-sync").await.unwrap(), LifecycleState::Uninstalled);

    let seen = seen.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![
            "plugin.installing", // billing
            "plugin.installed",
            "plugin.installing", // crm-sync
            "plugin.installed",
            "plugin.enabled", // billing
            "plugin.enabled", // crm-sync
            "plugin.updated",
            "plugin.disabled",
            "plugin.uninstalled",
        ]
    );
}

#[tokio::test]
async fn test_registry_snapshot_reflects_running_versions() {
    let engine = LifecycleEngine::new();
    engine.publish(manifest("billing", "Billing", "1.0.0")).await.unwrap();
    engine.publish(manifest("crm-sync", "Crm Sync", "2.0.0")).await.unwrap();

    let snapshot = engine.registry_snapshot().await;
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot["billing"].version, "1.0.0");
    assert_eq!(snapshot["crm-sync"].version, "2.0.0");
}
