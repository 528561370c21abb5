//! Hook dispatcher: a per-hook registry of plugin handlers with broadcast
//! (`trigger`) and pipeline (`chain`) dispatch.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::timeout;

use crate::hooks::{BoxFuture, HookContext, HookError, HookHandler, HookOutcome};

const DEFAULT_HANDLER_TIMEOUT: Duration = Duration::from_secs(5);

/// One registered handler for a hook
struct HookRegistration {
    plugin_id: String,
    handler: HookHandler,
}

impl fmt::Debug for HookRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistration")
            .field("plugin_id", &self.plugin_id)
            .finish_non_exhaustive()
    }
}

/// Hook dispatcher (internal, wrapped by [`SharedHookDispatcher`])
pub struct HookDispatcher {
    hooks: HashMap<String, Vec<HookRegistration>>,
    handler_timeout: Duration,
}

impl fmt::Debug for HookDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handler_count: usize = self.hooks.values().map(|v| v.len()).sum();
        f.debug_struct("HookDispatcher")
            .field("hooks", &self.hooks.len())
            .field("handlers", &handler_count)
            .field("handler_timeout", &self.handler_timeout)
            .finish()
    }
}

impl HookDispatcher {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_HANDLER_TIMEOUT)
    }

    /// Create a dispatcher with a custom per-handler timeout
    pub fn with_timeout(handler_timeout: Duration) -> Self {
        Self { hooks: HashMap::new(), handler_timeout }
    }

    /// Register a handler for a hook on behalf of a plugin. A plugin may
    /// register any number of handlers for the same hook; invocation order
    /// is registration order.
    pub fn register_hook(&mut self, hook: &str, plugin_id: &str, handler: HookHandler) {
        self.hooks.entry(hook.to_string()).or_default().push(HookRegistration {
            plugin_id: plugin_id.to_string(),
            handler,
        });
    }

    /// Remove every handler a plugin registered, across all hooks. Hooks
    /// left with zero handlers are pruned. Returns the number removed.
    pub fn unregister_plugin(&mut self, plugin_id: &str) -> usize {
        let mut removed = 0;
        self.hooks.retain(|_, registrations| {
            let before = registrations.len();
            registrations.retain(|r| r.plugin_id != plugin_id);
            removed += before - registrations.len();
            !registrations.is_empty()
        });
        removed
    }

    async fn invoke(&self, registration: &HookRegistration, context: &HookContext) -> Result<Value, HookError> {
        match timeout(self.handler_timeout, (registration.handler)(context)).await {
            Ok(result) => result,
            Err(_) => Err(HookError::TimedOut {
                timeout_ms: self.handler_timeout.as_millis() as u64,
            }),
        }
    }

    /// Broadcast dispatch: invoke every handler registered for the hook,
    /// sequentially, passing the same immutable context to each. Each
    /// handler's result is recorded; a failure or timeout never aborts the
    /// remaining handlers.
    pub async fn trigger(&self, hook: &str, context: &HookContext) -> Vec<HookOutcome> {
        let Some(registrations) = self.hooks.get(hook) else {
            return Vec::new();
        };

        let mut outcomes = Vec::with_capacity(registrations.len());
        for registration in registrations {
            let result = self.invoke(registration, context).await;
            if let Err(error) = &result {
                log::warn!(
                    "Hook '{}' handler from plugin '{}' failed: {}",
                    hook,
                    registration.plugin_id,
                    error
                );
            }
            outcomes.push(HookOutcome {
                plugin_id: registration.plugin_id.clone(),
                result,
            });
        }
        outcomes
    }

    /// Pipeline dispatch: each handler receives the previous handler's
    /// output as the context's `data` and returns the next value. A failing
    /// or timed-out handler's transformation is dropped — the chain keeps
    /// the last successful value and continues with the next handler.
    pub async fn chain(&self, hook: &str, context: HookContext) -> Value {
        let Some(registrations) = self.hooks.get(hook) else {
            return context.data;
        };

        let mut data = context.data.clone();
        for registration in registrations {
            let stage = context.with_data(data.clone());
            match self.invoke(registration, &stage).await {
                Ok(next) => data = next,
                Err(error) => {
                    log::warn!(
                        "Hook chain '{}' dropping transform from plugin '{}': {}",
                        hook,
                        registration.plugin_id,
                        error
                    );
                }
            }
        }
        data
    }

    /// Whether any handler is registered for the hook
    pub fn has_hook(&self, hook: &str) -> bool {
        self.hooks.contains_key(hook)
    }

    /// Names of all hooks with at least one handler
    pub fn registered_hooks(&self) -> Vec<String> {
        let mut names: Vec<String> = self.hooks.keys().cloned().collect();
        names.sort();
        names
    }

    /// Plugin ids with handlers on the hook, in registration order, deduped
    pub fn plugins_for_hook(&self, hook: &str) -> Vec<String> {
        let mut plugins = Vec::new();
        if let Some(registrations) = self.hooks.get(hook) {
            for registration in registrations {
                if !plugins.contains(&registration.plugin_id) {
                    plugins.push(registration.plugin_id.clone());
                }
            }
        }
        plugins
    }
}

impl Default for HookDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe shared hook dispatcher. Owned by the engine's composition
/// root and injected into components that trigger or chain events; never a
/// process-wide singleton, so each test constructs its own instance.
#[derive(Clone)]
pub struct SharedHookDispatcher {
    inner: Arc<Mutex<HookDispatcher>>,
}

impl fmt::Debug for SharedHookDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedHookDispatcher").finish_non_exhaustive()
    }
}

impl SharedHookDispatcher {
    pub fn new() -> Self {
        Self { inner: Arc::new(Mutex::new(HookDispatcher::new())) }
    }

    pub fn with_timeout(handler_timeout: Duration) -> Self {
        Self { inner: Arc::new(Mutex::new(HookDispatcher::with_timeout(handler_timeout))) }
    }

    pub async fn register_hook(&self, hook: &str, plugin_id: &str, handler: HookHandler) {
        let mut dispatcher = self.inner.lock().await;
        dispatcher.register_hook(hook, plugin_id, handler);
    }

    pub async fn unregister_plugin(&self, plugin_id: &str) -> usize {
        let mut dispatcher = self.inner.lock().await;
        dispatcher.unregister_plugin(plugin_id)
    }

    pub async fn trigger(&self, hook: &str, context: &HookContext) -> Vec<HookOutcome> {
        let dispatcher = self.inner.lock().await;
        dispatcher.trigger(hook, context).await
    }

    pub async fn chain(&self, hook: &str, context: HookContext) -> Value {
        let dispatcher = self.inner.lock().await;
        dispatcher.chain(hook, context).await
    }

    pub async fn has_hook(&self, hook: &str) -> bool {
        let dispatcher = self.inner.lock().await;
        dispatcher.has_hook(hook)
    }

    pub async fn registered_hooks(&self) -> Vec<String> {
        let dispatcher = self.inner.lock().await;
        dispatcher.registered_hooks()
    }

    pub async fn plugins_for_hook(&self, hook: &str) -> Vec<String> {
        let dispatcher = self.inner.lock().await;
        dispatcher.plugins_for_hook(hook)
    }
}

impl Default for SharedHookDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Wrap a synchronous closure as a hook handler
pub fn sync_hook_handler<F>(f: F) -> HookHandler
where
    F: Fn(&HookContext) -> Result<Value, HookError> + Send + Sync + 'static,
{
    Box::new(move |context| {
        let result = f(context);
        Box::pin(async move { result }) as BoxFuture<'_>
    })
}
