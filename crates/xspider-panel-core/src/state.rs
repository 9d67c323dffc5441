//! Panel state: owns every component and applies inbound events.
//!
//! All mutation happens here on the UI loop. Methods return the follow-up
//! [`BackendCommand`]s the caller should send to the worker.

use std::time::Instant;

use crate::notify::{LogLevel, NotificationChannel};
use crate::push::{BackendEvent, EngineEvent};
use crate::queue::{TaskControl, TaskQueueReconciler};
use crate::settings::{CommitError, SettingsStore};
use crate::theme::{Appearance, ThemePreference, ThemeResolver};
use crate::threshold::threshold_enabled;
use crate::worker::{BackendCommand, FailureClass, Operation};
use crate::{
    EngineStats, FinishedTask, HistoryEntry, SettingValue, display_name, keys,
};

/// A destructive action waiting for the user to confirm it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingConfirmation {
    DeleteHistoryItem(String),
    ClearHistory,
}

impl PendingConfirmation {
    pub fn prompt(&self) -> String {
        match self {
            Self::DeleteHistoryItem(id) => {
                format!("Delete the history record and files of {}?", display_name(id))
            }
            Self::ClearHistory => "Delete all history records and downloaded files?".to_string(),
        }
    }
}

pub struct PanelState {
    pub settings: SettingsStore,
    pub queue: TaskQueueReconciler,
    pub theme: ThemeResolver,
    pub notify: NotificationChannel,
    pub engine_running: bool,
    /// `None` until the first login check answers.
    pub logged_in: Option<bool>,
    pub settings_loaded: bool,
    pub save_path_ok: Option<bool>,
    pub history: Vec<HistoryEntry>,
    pub finished: Vec<FinishedTask>,
    pub stats: Option<EngineStats>,
    pending: Option<PendingConfirmation>,
}

impl PanelState {
    pub fn new(theme: ThemePreference, os: Appearance) -> Self {
        Self {
            settings: SettingsStore::default(),
            queue: TaskQueueReconciler::default(),
            theme: ThemeResolver::new(theme, os),
            notify: NotificationChannel::new(),
            engine_running: false,
            logged_in: None,
            settings_loaded: false,
            save_path_ok: None,
            history: Vec::new(),
            finished: Vec::new(),
            stats: None,
            pending: None,
        }
    }

    /// Commands to issue once at startup.
    pub fn startup(&self) -> Vec<BackendCommand> {
        vec![
            BackendCommand::LoadSettings,
            BackendCommand::CheckLogin,
            BackendCommand::QueryEngineStatus,
            BackendCommand::RefreshQueue,
            BackendCommand::LoadHistory,
        ]
    }

    // --- inbound ------------------------------------------------------------

    pub fn apply(&mut self, event: BackendEvent) -> Vec<BackendCommand> {
        match event {
            BackendEvent::Engine(e) => self.apply_engine(e),
            BackendEvent::SettingsLoaded(Ok(cfg)) => {
                self.settings.load(cfg);
                self.settings_loaded = true;
                self.theme.sync_from(self.settings.draft());
                vec![BackendCommand::CheckSavePath]
            }
            BackendEvent::SettingsLoaded(Err(e)) => {
                self.fail(Operation::LoadSettings, &e.to_string());
                Vec::new()
            }
            BackendEvent::SettingWritten { key, value } => {
                self.settings.record_written(&key, value);
                Vec::new()
            }
            BackendEvent::CommitFinished(result) => self.finish_commit(result),
            BackendEvent::LoginStatus(Ok(logged_in)) => {
                self.logged_in = Some(logged_in);
                Vec::new()
            }
            BackendEvent::LoginStatus(Err(e)) => {
                tracing::debug!(error = %e, "login check failed");
                Vec::new()
            }
            BackendEvent::OperationDone { op, result } => match result {
                Ok(info) => self.succeeded(op, info),
                Err(e) => {
                    self.fail(op, &e.to_string());
                    Vec::new()
                }
            },
            BackendEvent::HistoryLoaded(result) => {
                match result {
                    Ok(history) => self.history = history,
                    Err(e) => self.log(format!("Could not load history: {}", e), LogLevel::Error),
                }
                Vec::new()
            }
            BackendEvent::FinishedLoaded(result) => {
                match result {
                    Ok(finished) => self.finished = finished,
                    Err(e) => tracing::debug!(error = %e, "finished list failed"),
                }
                Vec::new()
            }
            BackendEvent::StatsLoaded(result) => {
                match result {
                    Ok(stats) => self.stats = Some(stats),
                    Err(e) => {
                        self.stats = None;
                        self.log(format!("Stats unavailable: {}", e), LogLevel::Warning);
                    }
                }
                Vec::new()
            }
            BackendEvent::SavePathChecked(result) => {
                self.save_path_ok = result.ok();
                Vec::new()
            }
            BackendEvent::FolderSelected(Ok(Some(folder))) => {
                self.settings.set_draft(keys::SAVE_PATH, folder);
                Vec::new()
            }
            BackendEvent::FolderSelected(Ok(None)) => Vec::new(),
            BackendEvent::FolderSelected(Err(e)) => {
                self.log(format!("Folder picker failed: {}", e), LogLevel::Error);
                Vec::new()
            }
        }
    }

    fn apply_engine(&mut self, event: EngineEvent) -> Vec<BackendCommand> {
        match event {
            EngineEvent::Log { message, level } => {
                self.notify.log(message, level);
                Vec::new()
            }
            EngineEvent::TaskUpdate { tasks } | EngineEvent::QueuePolled { tasks } => {
                self.queue.apply_full_snapshot(tasks);
                Vec::new()
            }
            EngineEvent::Progress { id, count } => {
                if !self.queue.apply_progress_delta(&id, count) {
                    tracing::trace!(id = %id, "progress for unknown task");
                }
                Vec::new()
            }
            EngineEvent::EngineStatus { running } => {
                if running == self.engine_running {
                    return Vec::new();
                }
                self.engine_running = running;
                tracing::info!(running, "engine status changed");
                vec![BackendCommand::SetPolling(running)]
            }
        }
    }

    fn finish_commit(&mut self, result: Result<(), CommitError>) -> Vec<BackendCommand> {
        match self.settings.finish_commit(result) {
            Ok(()) => {
                self.toast("Settings saved", LogLevel::Success);
                vec![BackendCommand::CheckSavePath]
            }
            Err(CommitError::Partial { key, source, .. }) => {
                let message = format!("Could not save {}: {}", key, source);
                self.log(message.clone(), LogLevel::Error);
                self.toast(message, LogLevel::Warning);
                Vec::new()
            }
            Err(CommitError::InFlight) => Vec::new(),
        }
    }

    fn succeeded(&mut self, op: Operation, info: Option<String>) -> Vec<BackendCommand> {
        match op {
            Operation::Login => {
                self.notify.alert(
                    "Login",
                    "Log in through the browser window that opened, then close it.",
                );
                Vec::new()
            }
            Operation::ExportCookies => {
                self.notify
                    .alert("Export cookies", "Cookies exported to cookies_backup.json");
                Vec::new()
            }
            Operation::AddTasks
            | Operation::AddMyLikes
            | Operation::AddMyBookmarks
            | Operation::ReAddHistory => {
                if let Some(info) = info {
                    self.toast(info, LogLevel::Success);
                }
                Vec::new()
            }
            Operation::DeleteHistoryItem | Operation::ClearHistory => {
                self.toast("History updated", LogLevel::Success);
                Vec::new()
            }
            Operation::StopEngine => vec![BackendCommand::LoadFinished],
            _ => Vec::new(),
        }
    }

    /// Surface a failure the way its operation class asks for.
    fn fail(&mut self, op: Operation, reason: &str) {
        let line = format!("{} failed: {}", op.label(), reason);
        self.notify.log(line.clone(), LogLevel::Error);
        match op.failure_class() {
            FailureClass::Alert => self.notify.alert(format!("{} failed", op.label()), reason),
            FailureClass::Toast => self.toast(line, LogLevel::Warning),
            FailureClass::Log => {}
        }
    }

    fn toast(&mut self, message: impl Into<String>, level: LogLevel) {
        self.notify.toast(message, level, Instant::now());
    }

    fn log(&mut self, message: impl Into<String>, level: LogLevel) {
        self.notify.log(message, level);
    }

    // --- settings intents ---------------------------------------------------

    pub fn threshold_enabled(&self) -> bool {
        threshold_enabled(self.settings.draft().bool(keys::DEEP_SCAN).unwrap_or(false))
    }

    /// Edit one draft value. Edits to the stop threshold are refused while
    /// deep scan is on. Returns whether the edit was applied.
    pub fn set_setting(&mut self, key: &str, value: impl Into<SettingValue>) -> bool {
        if key == keys::STOP_THRESH && !self.threshold_enabled() {
            return false;
        }
        if key == keys::THEME {
            let value = value.into();
            if let Some(pref) = value.as_str().and_then(|s| s.parse::<ThemePreference>().ok()) {
                self.select_theme(pref);
                return true;
            }
            return false;
        }
        self.settings.set_draft(key, value);
        true
    }

    pub fn select_theme(&mut self, pref: ThemePreference) -> Appearance {
        self.theme.select(pref, &mut self.settings)
    }

    pub fn os_appearance_changed(&mut self, os: Appearance) -> Option<Appearance> {
        self.theme.on_os_signal(os)
    }

    pub fn undo_settings(&mut self) {
        self.settings.undo();
        self.theme.sync_from(self.settings.draft());
    }

    pub fn reset_settings(&mut self) {
        self.settings.reset_to_defaults();
        self.theme.sync_from(self.settings.draft());
    }

    pub fn confirm_settings(&mut self) -> Vec<BackendCommand> {
        match self.settings.begin_commit() {
            Ok(plan) if plan.is_empty() => {
                let _ = self.settings.finish_commit(Ok(()));
                Vec::new()
            }
            Ok(plan) => vec![BackendCommand::Commit(plan)],
            Err(e) => {
                tracing::debug!(error = %e, "confirm ignored");
                Vec::new()
            }
        }
    }

    pub fn select_folder(&self) -> Vec<BackendCommand> {
        vec![BackendCommand::SelectFolder]
    }

    // --- account / engine intents --------------------------------------------

    pub fn login(&mut self) -> Vec<BackendCommand> {
        self.log("Starting login wizard...", LogLevel::Info);
        vec![BackendCommand::Login]
    }

    pub fn export_cookies(&mut self) -> Vec<BackendCommand> {
        self.log("Exporting cookies...", LogLevel::Info);
        vec![BackendCommand::ExportCookies]
    }

    pub fn toggle_engine(&self) -> Vec<BackendCommand> {
        if self.engine_running {
            vec![BackendCommand::StopEngine]
        } else {
            vec![BackendCommand::StartEngine]
        }
    }

    pub fn pause_all(&self) -> Vec<BackendCommand> {
        vec![BackendCommand::PauseAll]
    }

    pub fn resume_all(&self) -> Vec<BackendCommand> {
        vec![BackendCommand::ResumeAll]
    }

    // --- queue intents --------------------------------------------------------

    pub fn add_tasks(&self, spec: &str) -> Vec<BackendCommand> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Vec::new();
        }
        vec![BackendCommand::AddTasks(spec.to_string())]
    }

    pub fn add_my_likes(&self) -> Vec<BackendCommand> {
        vec![BackendCommand::AddMyLikes]
    }

    pub fn add_my_bookmarks(&self) -> Vec<BackendCommand> {
        vec![BackendCommand::AddMyBookmarks]
    }

    /// The pause / start / restart control of task `id`. Unknown ids are
    /// forwarded as a start and left to the engine.
    pub fn task_primary_control(&self, id: &str) -> Vec<BackendCommand> {
        let control = self
            .queue
            .find(id)
            .map(|t| TaskControl::for_status(t.status))
            .unwrap_or(TaskControl::Start);
        match control {
            TaskControl::Pause => vec![BackendCommand::PauseTask(id.to_string())],
            TaskControl::Start | TaskControl::Restart => {
                vec![BackendCommand::StartTask(id.to_string())]
            }
        }
    }

    pub fn delete_task(&self, id: &str) -> Vec<BackendCommand> {
        vec![BackendCommand::DeleteTask(id.to_string())]
    }

    pub fn clear_tasks(&self) -> Vec<BackendCommand> {
        vec![BackendCommand::ClearTasks]
    }

    pub fn refresh(&self) -> Vec<BackendCommand> {
        vec![BackendCommand::RefreshQueue, BackendCommand::LoadHistory]
    }

    // --- history intents ------------------------------------------------------

    pub fn re_add_history(&self, id: &str) -> Vec<BackendCommand> {
        vec![BackendCommand::ReAddHistory(id.to_string())]
    }

    pub fn request_delete_history(&mut self, id: &str) {
        self.pending = Some(PendingConfirmation::DeleteHistoryItem(id.to_string()));
    }

    pub fn request_clear_history(&mut self) {
        self.pending = Some(PendingConfirmation::ClearHistory);
    }

    pub fn pending_confirmation(&self) -> Option<&PendingConfirmation> {
        self.pending.as_ref()
    }

    pub fn cancel_pending(&mut self) {
        self.pending = None;
    }

    /// Issue the destructive action the user just confirmed.
    pub fn confirm_pending(&mut self) -> Vec<BackendCommand> {
        match self.pending.take() {
            Some(PendingConfirmation::DeleteHistoryItem(id)) => {
                vec![BackendCommand::DeleteHistoryItem(id)]
            }
            Some(PendingConfirmation::ClearHistory) => vec![BackendCommand::ClearHistory],
            None => Vec::new(),
        }
    }

    pub fn load_stats(&self) -> Vec<BackendCommand> {
        vec![BackendCommand::LoadStats]
    }

    pub fn load_finished(&self) -> Vec<BackendCommand> {
        vec![BackendCommand::LoadFinished]
    }
}
