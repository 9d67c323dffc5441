//! HTTP bridge to the engine.
//!
//! Calls are `POST {base}/rpc` with `{"method", "params"}`; push
//! notifications are long-polled from `GET {base}/events?after=<seq>`.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::engine::{CallFuture, EngineError, Transport};
use crate::notify::LogLevel;
use crate::push::{EngineEvent, EventSender, forward};
use crate::Task;

const CALL_TIMEOUT: Duration = Duration::from_secs(120);
const EVENTS_TIMEOUT: Duration = Duration::from_secs(40);
const RETRY_DELAY: Duration = Duration::from_secs(2);

pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct RpcReply {
    ok: bool,
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventBatch {
    next: u64,
    /// Decoded one by one so a single unknown kind cannot poison the batch.
    #[serde(default)]
    events: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum WireEvent {
    Log {
        message: String,
        #[serde(default)]
        level: LogLevel,
    },
    TaskUpdate {
        tasks: Vec<Task>,
    },
    Progress {
        id: String,
        count: u64,
    },
    EngineStatus {
        running: bool,
    },
}

impl From<WireEvent> for EngineEvent {
    fn from(e: WireEvent) -> Self {
        match e {
            WireEvent::Log { message, level } => EngineEvent::Log { message, level },
            WireEvent::TaskUpdate { tasks } => EngineEvent::TaskUpdate { tasks },
            WireEvent::Progress { id, count } => EngineEvent::Progress { id, count },
            WireEvent::EngineStatus { running } => EngineEvent::EngineStatus { running },
        }
    }
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| EngineError::Transport(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post(&self, method: &str, params: Vec<Value>) -> Result<Value, EngineError> {
        let url = format!("{}/rpc", self.base_url);
        let resp = self
            .client
            .post(&url)
            .timeout(CALL_TIMEOUT)
            .json(&json!({ "method": method, "params": params }))
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        if !resp.status().is_success() {
            return Err(EngineError::Status(resp.status().as_u16()));
        }
        let body: Value = resp.json().await.map_err(|e| EngineError::Decode {
            method: method.to_string(),
            reason: e.to_string(),
        })?;
        parse_reply(method, body)
    }

    async fn fetch_events(&self, after: u64) -> Result<(u64, Vec<EngineEvent>), EngineError> {
        let url = format!("{}/events?after={}", self.base_url, after);
        let resp = self
            .client
            .get(&url)
            .timeout(EVENTS_TIMEOUT)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        if !resp.status().is_success() {
            return Err(EngineError::Status(resp.status().as_u16()));
        }
        let body: Value = resp.json().await.map_err(|e| EngineError::Decode {
            method: "events".to_string(),
            reason: e.to_string(),
        })?;
        decode_batch(body)
    }

    /// Long-poll the event endpoint and forward every event until `cancel`
    /// fires. Connection errors are retried after a short delay.
    pub fn spawn_event_stream(
        self: Arc<Self>,
        tx: EventSender,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut after = 0u64;
            let mut connected = false;
            loop {
                let fetched = tokio::select! {
                    _ = cancel.cancelled() => break,
                    r = self.fetch_events(after) => r,
                };
                match fetched {
                    Ok((next, events)) => {
                        if !connected {
                            tracing::info!(url = %self.base_url, "event stream connected");
                            connected = true;
                        }
                        after = next;
                        for event in events {
                            forward(&tx, event);
                        }
                        if tx.is_closed() {
                            break;
                        }
                    }
                    Err(e) => {
                        if connected {
                            tracing::warn!(error = %e, "event stream interrupted");
                            connected = false;
                        } else {
                            tracing::debug!(error = %e, "event stream unavailable");
                        }
                        tokio::select! {
                            _ = cancel.cancelled() => break,
                            _ = tokio::time::sleep(RETRY_DELAY) => {}
                        }
                    }
                }
            }
            tracing::debug!("event stream stopped");
        })
    }
}

impl Transport for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }

    fn call<'a>(&'a self, method: &'a str, params: Vec<Value>) -> CallFuture<'a> {
        Box::pin(self.post(method, params))
    }
}

fn transport_error(e: &reqwest::Error) -> EngineError {
    if e.is_timeout() {
        EngineError::Transport("request timed out".to_string())
    } else if e.is_connect() {
        EngineError::Transport("cannot connect to the engine bridge".to_string())
    } else {
        EngineError::Transport(e.to_string())
    }
}

fn parse_reply(method: &str, body: Value) -> Result<Value, EngineError> {
    let reply: RpcReply = serde_json::from_value(body).map_err(|e| EngineError::Decode {
        method: method.to_string(),
        reason: e.to_string(),
    })?;
    if reply.ok {
        Ok(reply.result)
    } else {
        Err(EngineError::Rejected(
            reply.error.unwrap_or_else(|| format!("{} failed", method)),
        ))
    }
}

fn decode_batch(body: Value) -> Result<(u64, Vec<EngineEvent>), EngineError> {
    let batch: EventBatch = serde_json::from_value(body).map_err(|e| EngineError::Decode {
        method: "events".to_string(),
        reason: e.to_string(),
    })?;
    let events = batch
        .events
        .into_iter()
        .filter_map(|raw| match serde_json::from_value::<WireEvent>(raw) {
            Ok(event) => Some(event.into()),
            Err(e) => {
                tracing::debug!(error = %e, "skipping engine event");
                None
            }
        })
        .collect();
    Ok((batch.next, events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TaskStatus;

    #[test]
    fn ok_reply_yields_result() {
        let v = parse_reply("get_engine_status", json!({"ok": true, "result": true})).unwrap();
        assert_eq!(v, json!(true));
    }

    #[test]
    fn ok_reply_without_result_is_null() {
        let v = parse_reply("stop_engine", json!({"ok": true})).unwrap();
        assert_eq!(v, Value::Null);
    }

    #[test]
    fn error_reply_is_rejected() {
        let err = parse_reply("update_setting", json!({"ok": false, "error": "disk full"}))
            .unwrap_err();
        assert_eq!(err, EngineError::Rejected("disk full".into()));
    }

    #[test]
    fn garbage_reply_is_decode_error() {
        let err = parse_reply("get_settings", json!([1, 2])).unwrap_err();
        assert!(matches!(err, EngineError::Decode { .. }));
    }

    #[test]
    fn event_batch_decodes_every_kind() {
        let body = json!({
            "next": 7,
            "events": [
                {"kind": "log", "message": "started", "level": "success"},
                {"kind": "task_update", "tasks": [{"id": "a", "status": "running", "progress": 2}]},
                {"kind": "progress", "id": "a", "count": 3},
                {"kind": "engine_status", "running": false}
            ]
        });
        let (next, events) = decode_batch(body).unwrap();
        assert_eq!(next, 7);
        assert_eq!(
            events,
            vec![
                EngineEvent::Log {
                    message: "started".into(),
                    level: LogLevel::Success
                },
                EngineEvent::TaskUpdate {
                    tasks: vec![Task::new("a", TaskStatus::Running, 2)]
                },
                EngineEvent::Progress {
                    id: "a".into(),
                    count: 3
                },
                EngineEvent::EngineStatus { running: false },
            ]
        );
    }

    #[test]
    fn unknown_event_kinds_are_skipped() {
        let body = json!({
            "next": 5,
            "events": [
                {"kind": "progress", "id": "a", "count": 4},
                {"kind": "task_finished", "id": "a"},
                {"kind": "engine_status"},
                {"kind": "log", "message": "download failed", "level": "danger"}
            ]
        });
        let (next, events) = decode_batch(body).unwrap();
        assert_eq!(next, 5);
        assert_eq!(
            events,
            vec![
                EngineEvent::Progress {
                    id: "a".into(),
                    count: 4
                },
                EngineEvent::Log {
                    message: "download failed".into(),
                    level: LogLevel::Error
                },
            ]
        );
    }

    #[test]
    fn trailing_slash_trimmed() {
        let t = HttpTransport::new("http://127.0.0.1:8765/").unwrap();
        assert_eq!(t.base_url(), "http://127.0.0.1:8765");
    }
}
