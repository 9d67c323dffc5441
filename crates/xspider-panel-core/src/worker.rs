//! Executes panel commands against the engine, one at a time.

use std::time::Duration;

use tokio::sync::mpsc;

use crate::engine::{EngineClient, EngineError};
use crate::poller::PollScheduler;
use crate::push::{BackendEvent, EngineEvent, EventSender, forward};
use crate::settings::{CommitError, CommitPlan};
use crate::{ActionOutcome, MY_BOOKMARKS, MY_LIKES};

/// How a failed operation is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Blocking modal.
    Alert,
    /// Transient toast.
    Toast,
    /// Activity log only.
    Log,
}

/// One-shot engine operations reported through [`BackendEvent::OperationDone`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Login,
    ExportCookies,
    StartEngine,
    StopEngine,
    PauseAll,
    ResumeAll,
    AddTasks,
    AddMyLikes,
    AddMyBookmarks,
    ReAddHistory,
    PauseTask,
    StartTask,
    DeleteTask,
    ClearTasks,
    RefreshQueue,
    DeleteHistoryItem,
    ClearHistory,
    SaveSettings,
    LoadSettings,
}

impl Operation {
    pub fn label(self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::ExportCookies => "Export cookies",
            Self::StartEngine => "Start engine",
            Self::StopEngine => "Stop engine",
            Self::PauseAll => "Pause all",
            Self::ResumeAll => "Resume all",
            Self::AddTasks => "Add tasks",
            Self::AddMyLikes => "Add my likes",
            Self::AddMyBookmarks => "Add my bookmarks",
            Self::ReAddHistory => "Re-add from history",
            Self::PauseTask => "Pause task",
            Self::StartTask => "Start task",
            Self::DeleteTask => "Delete task",
            Self::ClearTasks => "Clear tasks",
            Self::RefreshQueue => "Refresh queue",
            Self::DeleteHistoryItem => "Delete history",
            Self::ClearHistory => "Clear history",
            Self::SaveSettings => "Save settings",
            Self::LoadSettings => "Load settings",
        }
    }

    pub fn failure_class(self) -> FailureClass {
        match self {
            Self::Login
            | Self::ExportCookies
            | Self::StartEngine
            | Self::AddTasks
            | Self::AddMyLikes
            | Self::AddMyBookmarks
            | Self::ReAddHistory
            | Self::DeleteHistoryItem
            | Self::ClearHistory => FailureClass::Alert,
            Self::SaveSettings | Self::LoadSettings => FailureClass::Toast,
            Self::StopEngine
            | Self::PauseAll
            | Self::ResumeAll
            | Self::PauseTask
            | Self::StartTask
            | Self::DeleteTask
            | Self::ClearTasks
            | Self::RefreshQueue => FailureClass::Log,
        }
    }

    /// Queue operations that are followed by a refresh of the task list.
    fn refreshes_queue(self) -> bool {
        matches!(
            self,
            Self::PauseAll
                | Self::ResumeAll
                | Self::AddTasks
                | Self::AddMyLikes
                | Self::AddMyBookmarks
                | Self::ReAddHistory
                | Self::PauseTask
                | Self::StartTask
                | Self::DeleteTask
                | Self::ClearTasks
        )
    }
}

/// Commands from the UI loop to the worker.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCommand {
    LoadSettings,
    Commit(CommitPlan),
    CheckSavePath,
    SelectFolder,
    CheckLogin,
    Login,
    ExportCookies,
    QueryEngineStatus,
    StartEngine,
    StopEngine,
    PauseAll,
    ResumeAll,
    AddTasks(String),
    AddMyLikes,
    AddMyBookmarks,
    /// Queue a history entry again by id.
    ReAddHistory(String),
    PauseTask(String),
    StartTask(String),
    DeleteTask(String),
    ClearTasks,
    RefreshQueue,
    LoadHistory,
    DeleteHistoryItem(String),
    ClearHistory,
    LoadFinished,
    LoadStats,
    SetPolling(bool),
}

/// Run the worker until the command channel closes.
///
/// Commands are executed strictly in order; every result, including
/// failures, is reported on `tx`.
pub async fn run_worker(
    client: EngineClient,
    mut commands: mpsc::UnboundedReceiver<BackendCommand>,
    tx: EventSender,
    poll_interval: Duration,
) {
    let mut poller = PollScheduler::new(client.clone(), tx.clone(), poll_interval);
    while let Some(command) = commands.recv().await {
        execute(&client, command, &tx, &mut poller).await;
    }
    poller.set_running(false);
    tracing::debug!("worker stopped");
}

async fn execute(
    client: &EngineClient,
    command: BackendCommand,
    tx: &EventSender,
    poller: &mut PollScheduler,
) {
    tracing::trace!(?command, "executing");
    match command {
        BackendCommand::LoadSettings => {
            let result = client.get_settings().await;
            let _ = tx.send(BackendEvent::SettingsLoaded(result));
        }
        BackendCommand::Commit(plan) => commit(client, plan, tx).await,
        BackendCommand::CheckSavePath => {
            let result = client.check_save_path().await;
            let _ = tx.send(BackendEvent::SavePathChecked(result));
        }
        BackendCommand::SelectFolder => {
            let result = client.select_folder().await;
            let _ = tx.send(BackendEvent::FolderSelected(result));
        }
        BackendCommand::CheckLogin => {
            let result = client.check_login_status().await;
            let _ = tx.send(BackendEvent::LoginStatus(result));
        }
        BackendCommand::Login => {
            let result = client.run_login().await;
            report_outcome(tx, Operation::Login, result);
        }
        BackendCommand::ExportCookies => {
            let result = client.export_cookies().await;
            report_outcome(tx, Operation::ExportCookies, result);
        }
        BackendCommand::QueryEngineStatus => match client.get_engine_status().await {
            Ok(running) => forward(tx, EngineEvent::EngineStatus { running }),
            Err(e) => tracing::debug!(error = %e, "engine status query failed"),
        },
        BackendCommand::StartEngine => {
            let result = client.start_engine().await;
            if report_outcome(tx, Operation::StartEngine, result) {
                forward(tx, EngineEvent::EngineStatus { running: true });
            }
        }
        BackendCommand::StopEngine => {
            let result = client.stop_engine().await;
            report(tx, Operation::StopEngine, result.map(|_| None));
            forward(tx, EngineEvent::EngineStatus { running: false });
        }
        BackendCommand::PauseAll => {
            let result = client.pause_all().await;
            void_then_refresh(client, tx, Operation::PauseAll, result).await;
        }
        BackendCommand::ResumeAll => {
            let result = client.resume_all().await;
            void_then_refresh(client, tx, Operation::ResumeAll, result).await;
        }
        BackendCommand::AddTasks(spec) => {
            let result = client.add_tasks(&spec).await;
            outcome_then_refresh(client, tx, Operation::AddTasks, result).await;
        }
        BackendCommand::AddMyLikes => {
            let result = client.add_my_likes().await;
            outcome_then_refresh(client, tx, Operation::AddMyLikes, result).await;
        }
        BackendCommand::AddMyBookmarks => {
            let result = client.add_my_bookmarks().await;
            outcome_then_refresh(client, tx, Operation::AddMyBookmarks, result).await;
        }
        BackendCommand::ReAddHistory(id) => {
            let result = match id.as_str() {
                MY_LIKES => client.add_my_likes().await,
                MY_BOOKMARKS => client.add_my_bookmarks().await,
                _ => client.add_tasks(&format!("@{}", id)).await,
            };
            outcome_then_refresh(client, tx, Operation::ReAddHistory, result).await;
        }
        BackendCommand::PauseTask(id) => {
            let result = client.pause_single_task(&id).await;
            void_then_refresh(client, tx, Operation::PauseTask, result).await;
        }
        BackendCommand::StartTask(id) => {
            let result = client.start_single_task(&id).await;
            void_then_refresh(client, tx, Operation::StartTask, result).await;
        }
        BackendCommand::DeleteTask(id) => {
            let result = client.delete_task(&id).await;
            void_then_refresh(client, tx, Operation::DeleteTask, result).await;
        }
        BackendCommand::ClearTasks => {
            let result = client.clear_all_tasks().await;
            void_then_refresh(client, tx, Operation::ClearTasks, result).await;
        }
        BackendCommand::RefreshQueue => refresh_queue(client, tx).await,
        BackendCommand::LoadHistory => load_history(client, tx).await,
        BackendCommand::DeleteHistoryItem(id) => {
            let result = client.delete_history_item(&id).await;
            if report_outcome(tx, Operation::DeleteHistoryItem, result) {
                load_history(client, tx).await;
            }
        }
        BackendCommand::ClearHistory => {
            let result = client.clear_all_history().await;
            if report_outcome(tx, Operation::ClearHistory, result) {
                load_history(client, tx).await;
            }
        }
        BackendCommand::LoadFinished => {
            let result = client.get_finished_tasks().await;
            let _ = tx.send(BackendEvent::FinishedLoaded(result));
        }
        BackendCommand::LoadStats => {
            let result = client.get_stats().await;
            let _ = tx.send(BackendEvent::StatsLoaded(result));
        }
        BackendCommand::SetPolling(running) => poller.set_running(running),
    }
}

async fn commit(client: &EngineClient, plan: CommitPlan, tx: &EventSender) {
    let mut written = Vec::with_capacity(plan.len());
    for (key, value) in plan.writes {
        if let Err(source) = client.update_setting(&key, &value).await {
            tracing::warn!(key = %key, error = %source, "setting write failed");
            let _ = tx.send(BackendEvent::CommitFinished(Err(CommitError::Partial {
                key,
                written,
                source,
            })));
            return;
        }
        let _ = tx.send(BackendEvent::SettingWritten {
            key: key.clone(),
            value,
        });
        written.push(key);
    }
    let _ = tx.send(BackendEvent::CommitFinished(Ok(())));
}

async fn refresh_queue(client: &EngineClient, tx: &EventSender) {
    match client.get_queue_status().await {
        Ok(tasks) => forward(tx, EngineEvent::QueuePolled { tasks }),
        Err(e) => report(tx, Operation::RefreshQueue, Err(e)),
    }
}

async fn load_history(client: &EngineClient, tx: &EventSender) {
    let result = client.get_history().await;
    let _ = tx.send(BackendEvent::HistoryLoaded(result));
}

/// Fire-and-forget queue control: always followed by one refresh.
async fn void_then_refresh(
    client: &EngineClient,
    tx: &EventSender,
    op: Operation,
    result: Result<(), EngineError>,
) {
    report(tx, op, result.map(|_| None));
    if op.refreshes_queue() {
        refresh_queue(client, tx).await;
    }
}

/// Add-style actions: refresh only when the engine accepted them.
async fn outcome_then_refresh(
    client: &EngineClient,
    tx: &EventSender,
    op: Operation,
    result: Result<ActionOutcome, EngineError>,
) {
    if report_outcome(tx, op, result) && op.refreshes_queue() {
        refresh_queue(client, tx).await;
    }
}

/// Report an [`ActionOutcome`]. Returns true on success.
fn report_outcome(
    tx: &EventSender,
    op: Operation,
    result: Result<ActionOutcome, EngineError>,
) -> bool {
    let result = result.and_then(ActionOutcome::into_result);
    let ok = result.is_ok();
    report(tx, op, result);
    ok
}

fn report(tx: &EventSender, op: Operation, result: Result<Option<String>, EngineError>) {
    if let Err(e) = &result {
        tracing::debug!(op = op.label(), error = %e, "operation failed");
    }
    let _ = tx.send(BackendEvent::OperationDone { op, result });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_actions_alert() {
        assert_eq!(Operation::Login.failure_class(), FailureClass::Alert);
        assert_eq!(Operation::StartEngine.failure_class(), FailureClass::Alert);
        assert_eq!(Operation::ClearHistory.failure_class(), FailureClass::Alert);
        assert_eq!(Operation::SaveSettings.failure_class(), FailureClass::Toast);
        assert_eq!(Operation::PauseTask.failure_class(), FailureClass::Log);
    }
}
