//! Typed client for the remote collection engine.
//!
//! Every engine call goes through a [`Transport`], which only knows how to
//! send a method name with positional JSON parameters and hand back the raw
//! JSON result. [`EngineClient`] layers the call contract on top of that.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::{
    ActionOutcome, Configuration, EngineStats, FinishedTask, HistoryEntry, SettingValue, Task,
};

/// Failure of a single remote call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The bridge could not be reached or the connection dropped.
    #[error("engine unreachable: {0}")]
    Transport(String),
    /// The bridge answered with a non-success HTTP status.
    #[error("engine bridge returned HTTP {0}")]
    Status(u16),
    /// The reply did not have the expected shape.
    #[error("unexpected reply to {method}: {reason}")]
    Decode { method: String, reason: String },
    /// The engine refused the request and gave a reason.
    #[error("{0}")]
    Rejected(String),
}

pub type CallFuture<'a> = Pin<Box<dyn Future<Output = Result<Value, EngineError>> + Send + 'a>>;

/// A bridge to the engine that can invoke a named method.
pub trait Transport: Send + Sync {
    /// Short name used in log lines (e.g. "http", "mock").
    fn name(&self) -> &str;

    /// Invoke `method` with positional `params`, returning the raw result.
    fn call<'a>(&'a self, method: &'a str, params: Vec<Value>) -> CallFuture<'a>;
}

/// Typed view of the engine's call contract.
#[derive(Clone)]
pub struct EngineClient {
    transport: Arc<dyn Transport>,
}

impl EngineClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub fn transport_name(&self) -> &str {
        self.transport.name()
    }

    async fn raw(&self, method: &'static str, params: Vec<Value>) -> Result<Value, EngineError> {
        tracing::debug!(transport = self.transport.name(), method, "engine call");
        let result = self.transport.call(method, params).await;
        if let Err(e) = &result {
            tracing::debug!(method, error = %e, "engine call failed");
        }
        result
    }

    async fn call_as<T: DeserializeOwned>(
        &self,
        method: &'static str,
        params: Vec<Value>,
    ) -> Result<T, EngineError> {
        let value = self.raw(method, params).await?;
        decode(method, value)
    }

    /// Like [`call_as`](Self::call_as) but a `null` reply means an empty list.
    async fn call_list<T: DeserializeOwned>(
        &self,
        method: &'static str,
        params: Vec<Value>,
    ) -> Result<Vec<T>, EngineError> {
        match self.raw(method, params).await? {
            Value::Null => Ok(Vec::new()),
            value => decode(method, value),
        }
    }

    async fn action(
        &self,
        method: &'static str,
        params: Vec<Value>,
    ) -> Result<ActionOutcome, EngineError> {
        self.call_as(method, params).await
    }

    async fn call_void(&self, method: &'static str, params: Vec<Value>) -> Result<(), EngineError> {
        self.raw(method, params).await.map(|_| ())
    }

    // --- settings ---------------------------------------------------------

    pub async fn get_settings(&self) -> Result<Configuration, EngineError> {
        self.call_as("get_settings", vec![]).await
    }

    pub async fn update_setting(&self, key: &str, value: &SettingValue) -> Result<(), EngineError> {
        self.call_void("update_setting", vec![json!(key), json!(value)])
            .await
    }

    /// Ask the engine host to show a folder picker. `None` if cancelled.
    pub async fn select_folder(&self) -> Result<Option<String>, EngineError> {
        match self.raw("select_folder", vec![]).await? {
            Value::String(s) if !s.is_empty() => Ok(Some(s)),
            _ => Ok(None),
        }
    }

    pub async fn check_save_path(&self) -> Result<bool, EngineError> {
        Ok(truthy(&self.raw("check_save_path", vec![]).await?))
    }

    // --- account ----------------------------------------------------------

    pub async fn check_login_status(&self) -> Result<bool, EngineError> {
        Ok(truthy(&self.raw("check_login_status", vec![]).await?))
    }

    pub async fn run_login(&self) -> Result<ActionOutcome, EngineError> {
        self.action("run_login", vec![]).await
    }

    pub async fn export_cookies(&self) -> Result<ActionOutcome, EngineError> {
        self.action("export_cookies", vec![]).await
    }

    // --- engine lifecycle ---------------------------------------------------

    pub async fn get_engine_status(&self) -> Result<bool, EngineError> {
        Ok(truthy(&self.raw("get_engine_status", vec![]).await?))
    }

    pub async fn start_engine(&self) -> Result<ActionOutcome, EngineError> {
        self.action("start_engine", vec![]).await
    }

    pub async fn stop_engine(&self) -> Result<(), EngineError> {
        self.call_void("stop_engine", vec![]).await
    }

    pub async fn pause_all(&self) -> Result<(), EngineError> {
        self.call_void("pause_all", vec![]).await
    }

    pub async fn resume_all(&self) -> Result<(), EngineError> {
        self.call_void("resume_all", vec![]).await
    }

    // --- tasks --------------------------------------------------------------

    /// Queue every profile id found in `spec` (free text, `@` optional).
    pub async fn add_tasks(&self, spec: &str) -> Result<ActionOutcome, EngineError> {
        self.action("add_tasks", vec![json!(spec)]).await
    }

    pub async fn add_my_likes(&self) -> Result<ActionOutcome, EngineError> {
        self.action("add_my_likes", vec![]).await
    }

    pub async fn add_my_bookmarks(&self) -> Result<ActionOutcome, EngineError> {
        self.action("add_my_bookmarks", vec![]).await
    }

    pub async fn delete_task(&self, id: &str) -> Result<(), EngineError> {
        self.call_void("delete_task", vec![json!(id)]).await
    }

    pub async fn pause_single_task(&self, id: &str) -> Result<(), EngineError> {
        self.call_void("pause_single_task", vec![json!(id)]).await
    }

    pub async fn start_single_task(&self, id: &str) -> Result<(), EngineError> {
        self.call_void("start_single_task", vec![json!(id)]).await
    }

    pub async fn clear_all_tasks(&self) -> Result<(), EngineError> {
        self.call_void("clear_all_tasks", vec![]).await
    }

    pub async fn get_queue_status(&self) -> Result<Vec<Task>, EngineError> {
        self.call_list("get_queue_status", vec![]).await
    }

    pub async fn get_finished_tasks(&self) -> Result<Vec<FinishedTask>, EngineError> {
        self.call_list("get_finished_tasks", vec![]).await
    }

    // --- history ------------------------------------------------------------

    pub async fn get_history(&self) -> Result<Vec<HistoryEntry>, EngineError> {
        self.call_list("get_history", vec![]).await
    }

    pub async fn delete_history_item(&self, id: &str) -> Result<ActionOutcome, EngineError> {
        self.action("delete_history_item", vec![json!(id)]).await
    }

    pub async fn clear_all_history(&self) -> Result<ActionOutcome, EngineError> {
        self.action("clear_all_history", vec![]).await
    }

    pub async fn get_stats(&self) -> Result<EngineStats, EngineError> {
        let value = self.raw("get_stats", vec![]).await?;
        // The engine reports a missing save path as `{"error": ...}`.
        if let Some(reason) = value.get("error").and_then(Value::as_str) {
            return Err(EngineError::Rejected(reason.to_string()));
        }
        decode("get_stats", value)
    }
}

fn decode<T: DeserializeOwned>(method: &str, value: Value) -> Result<T, EngineError> {
    serde_json::from_value(value).map_err(|e| EngineError::Decode {
        method: method.to_string(),
        reason: e.to_string(),
    })
}

/// Loose truthiness for boolean-ish replies (`null`, `""` and `0` are false).
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(_) => true,
    }
}
