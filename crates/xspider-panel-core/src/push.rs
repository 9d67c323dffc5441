//! Inbound traffic: engine push notifications, poll results and worker
//! replies share one channel so they are applied in receipt order.

use tokio::sync::mpsc;

use crate::engine::EngineError;
use crate::notify::LogLevel;
use crate::settings::CommitError;
use crate::worker::Operation;
use crate::{Configuration, EngineStats, FinishedTask, HistoryEntry, SettingValue, Task};

/// Something the engine told us, either pushed or polled.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Log { message: String, level: LogLevel },
    /// Full queue snapshot pushed by the engine.
    TaskUpdate { tasks: Vec<Task> },
    /// Full queue snapshot fetched by polling or an explicit refresh.
    QueuePolled { tasks: Vec<Task> },
    Progress { id: String, count: u64 },
    EngineStatus { running: bool },
}

/// Everything the UI loop receives.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    Engine(EngineEvent),
    SettingsLoaded(Result<Configuration, EngineError>),
    SettingWritten { key: String, value: SettingValue },
    CommitFinished(Result<(), CommitError>),
    LoginStatus(Result<bool, EngineError>),
    /// A one-shot engine operation completed. `Ok` may carry an info message.
    OperationDone {
        op: Operation,
        result: Result<Option<String>, EngineError>,
    },
    HistoryLoaded(Result<Vec<HistoryEntry>, EngineError>),
    FinishedLoaded(Result<Vec<FinishedTask>, EngineError>),
    StatsLoaded(Result<EngineStats, EngineError>),
    SavePathChecked(Result<bool, EngineError>),
    FolderSelected(Result<Option<String>, EngineError>),
}

impl From<EngineEvent> for BackendEvent {
    fn from(e: EngineEvent) -> Self {
        Self::Engine(e)
    }
}

pub type EventSender = mpsc::UnboundedSender<BackendEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<BackendEvent>;

pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Forward an engine event, ignoring a closed receiver.
pub fn forward(tx: &EventSender, event: impl Into<BackendEvent>) {
    let _ = tx.send(event.into());
}
