#![cfg(test)]

use serde_json::{json, Value};

use crate::hooks::{sync_hook_handler, HookContext, HookError, SystemHook};
use crate::lifecycle::LifecycleEngine;
use crate::manifest::{ManifestBuilder, PluginManifest};

fn manifest(id: &str, version: &str) -> PluginManifest {
    ManifestBuilder::new(id, "Audit Log", version)
        .description("records platform activity")
        .author("Platform Team")
        .license("Apache-2.0")
        .events(&[SystemHook::TenantCreated.name(), SystemHook::ApiRequest.name()])
        .build()
}

#[tokio::test]
async fn test_plugins_observe_tenant_events_through_engine_dispatcher() {
    let engine = LifecycleEngine::new();
    engine.publish(manifest("audit-log", "1.0.0")).await.unwrap();

    let hooks = engine.hooks();
    hooks
        .register_hook(
            SystemHook::TenantCreated.name(),
            "audit-log",
            sync_hook_handler(|context| {
                Ok(json!({
                    "logged": context.data["tenant_id"],
                    "for": context.tenant_id,
                }))
            }),
        )
        .await;

    let context = HookContext::for_tenant(
        SystemHook::TenantCreated.name(),
        json!({ "tenant_id": "acme" }),
        "acme",
    );
    let outcomes = hooks.trigger(SystemHook::TenantCreated.name(), &context).await;

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].plugin_id, "audit-log");
    let value = outcomes[0].result.as_ref().unwrap();
    assert_eq!(value["logged"], "acme");
    assert_eq!(value["for"], "acme");
}

#[tokio::test]
async fn test_request_pipeline_survives_failing_transform() {
    let engine = LifecycleEngine::new();
    let hooks = engine.hooks();

    hooks
        .register_hook(
            SystemHook::ApiRequest.name(),
            "header-stamper",
            sync_hook_handler(|context| {
                let mut data = context.data.clone();
                data["headers"]["x-trellis"] = Value::String("stamped".to_string());
                Ok(data)
            }),
        )
        .await;
    hooks
        .register_hook(
            SystemHook::ApiRequest.name(),
            "broken-rewriter",
            sync_hook_handler(|_| Err(HookError::failed("rewrite rules unavailable"))),
        )
        .await;
    hooks
        .register_hook(
            SystemHook::ApiRequest.name(),
            "rate-limiter",
            sync_hook_handler(|context| {
                let mut data = context.data.clone();
                data["rate_limited"] = Value::Bool(false);
                Ok(data)
            }),
        )
        .await;

    let context = HookContext::new(
        SystemHook::ApiRequest.name(),
        json!({ "path": "/v1/contacts", "headers": {} }),
    );
    let result = hooks.chain(SystemHook::ApiRequest.name(), context).await;

    // The broken transform is dropped; both good transforms apply
    assert_eq!(result["headers"]["x-trellis"], "stamped");
    assert_eq!(result["rate_limited"], false);
    assert_eq!(result["path"], "/v1/contacts");
}

#[tokio::test]
async fn test_uninstalled_plugin_loses_its_subscriptions() {
    let engine = LifecycleEngine::new();
    engine.publish(manifest("audit-log", "1.0.0")).await.unwrap();
    engine.install("audit-log").await.unwrap();
    engine.enable("audit-log").await.unwrap();

    let hooks = engine.hooks();
    hooks
        .register_hook(
            SystemHook::TenantCreated.name(),
            "audit-log",
            sync_hook_handler(|_| Ok(Value::Null)),
        )
        .await;
    assert!(hooks.has_hook(SystemHook::TenantCreated.name()).await);

    engine.disable("audit-log").await.unwrap();
    engine.uninstall("audit-log", false).await.unwrap();

    let context = HookContext::new(SystemHook::TenantCreated.name(), Value::Null);
    let outcomes = hooks.trigger(SystemHook::TenantCreated.name(), &context).await;
    assert!(outcomes.is_empty());
}
