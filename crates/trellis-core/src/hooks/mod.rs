//! # Trellis Hook System
//!
//! Named extension points plugins subscribe handlers to. Dispatch runs in
//! two modes: `trigger` broadcasts an immutable context to every handler
//! and collects a typed per-handler outcome, while `chain` threads a data
//! value through handlers in sequence as a transform pipeline.
//!
//! The critical contract is per-handler fault isolation: a failing (or
//! hung) handler is recorded and skipped past — it never blocks other
//! handlers or the core operation that raised the event.

pub mod dispatcher;
pub mod error;
pub mod types;

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

pub use dispatcher::{sync_hook_handler, HookDispatcher, SharedHookDispatcher};
pub use error::HookError;
pub use types::SystemHook;

/// An owned future resolving to a handler's result
pub type BoxFuture<'a> = Pin<Box<dyn Future<Output = Result<Value, HookError>> + Send + 'a>>;

/// A hook handler: an async closure over an immutable context
pub type HookHandler = Box<dyn Fn(&HookContext) -> BoxFuture<'_> + Send + Sync>;

/// Immutable context passed to hook handlers
#[derive(Debug, Clone)]
pub struct HookContext {
    /// The hook being dispatched
    pub hook: String,
    /// Event payload; in `chain` mode, the previous handler's output
    pub data: Value,
    /// Tenant the event concerns, when scoped
    pub tenant_id: Option<String>,
}

impl HookContext {
    pub fn new(hook: &str, data: Value) -> Self {
        Self { hook: hook.to_string(), data, tenant_id: None }
    }

    pub fn for_tenant(hook: &str, data: Value, tenant_id: &str) -> Self {
        Self { hook: hook.to_string(), data, tenant_id: Some(tenant_id.to_string()) }
    }

    /// A copy of this context carrying different data; used by `chain` to
    /// thread the pipeline value through
    pub fn with_data(&self, data: Value) -> Self {
        Self { hook: self.hook.clone(), data, tenant_id: self.tenant_id.clone() }
    }
}

/// The recorded result of one handler invocation during a `trigger`
#[derive(Debug)]
pub struct HookOutcome {
    /// Plugin that registered the handler
    pub plugin_id: String,
    /// The handler's value, or the isolated failure
    pub result: Result<Value, HookError>,
}
