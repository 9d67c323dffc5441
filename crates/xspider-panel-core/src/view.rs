//! View models: pure functions from state to what the panel shows.

use crate::queue::TaskControl;
use crate::state::PanelState;
use crate::threshold::ThresholdField;
use crate::{EngineStats, FinishedTask, HistoryEntry, HistoryKind, Task, TaskStatus, display_name};

/// Colour class of a task status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Active,
    Waiting,
    Paused,
    Failed,
    Neutral,
}

impl StatusTone {
    pub fn for_status(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Running => Self::Active,
            TaskStatus::Queued | TaskStatus::Pending => Self::Waiting,
            TaskStatus::Paused => Self::Paused,
            TaskStatus::Error => Self::Failed,
            TaskStatus::Unknown => Self::Neutral,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub id: String,
    pub name: String,
    pub status: &'static str,
    pub tone: StatusTone,
    /// Only present once something was downloaded.
    pub progress: Option<String>,
    pub control: TaskControl,
}

pub fn task_row(task: &Task) -> TaskRow {
    TaskRow {
        id: task.id.clone(),
        name: display_name(&task.id),
        status: task.status.label(),
        tone: StatusTone::for_status(task.status),
        progress: (task.progress > 0).then(|| format!("{} downloaded", task.progress)),
        control: TaskControl::for_status(task.status),
    }
}

pub fn task_rows(tasks: &[Task]) -> Vec<TaskRow> {
    tasks.iter().map(task_row).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    pub id: String,
    pub kind: HistoryKind,
    pub name: String,
    /// e.g. `Profile · 12 files`.
    pub detail: String,
}

pub fn history_row(entry: &HistoryEntry) -> HistoryRow {
    HistoryRow {
        id: entry.id.clone(),
        kind: entry.kind,
        name: entry.display_name(),
        detail: format!("{} · {} files", entry.kind.label(), entry.count),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedRow {
    pub name: String,
    pub time: String,
}

pub fn finished_row(task: &FinishedTask) -> FinishedRow {
    FinishedRow {
        name: display_name(&task.id),
        time: task.time.clone(),
    }
}

/// State of the settings confirm / undo bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionBar {
    pub visible: bool,
    pub saving: bool,
}

pub fn action_bar(state: &PanelState) -> ActionBar {
    ActionBar {
        visible: state.settings.is_dirty(),
        saving: state.settings.is_committing(),
    }
}

pub fn threshold_field(state: &PanelState) -> ThresholdField {
    ThresholdField::from_config(state.settings.draft())
}

pub fn login_label(logged_in: Option<bool>) -> &'static str {
    match logged_in {
        Some(true) => "Update cookies",
        _ => "Start login",
    }
}

pub fn engine_toggle_label(running: bool) -> &'static str {
    if running { "Stop engine" } else { "Start engine" }
}

/// Summary lines for the stats box, largest profiles first.
pub fn stats_lines(stats: &EngineStats, max_profiles: usize) -> Vec<String> {
    let mut lines = vec![
        format!("Total: {}", stats.total()),
        format!("Likes: {}", stats.likes),
        format!("Bookmarks: {}", stats.bookmarks),
    ];
    let mut users: Vec<(&String, &u64)> = stats.users.iter().collect();
    users.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    lines.extend(
        users
            .into_iter()
            .take(max_profiles)
            .map(|(id, n)| format!("@{}: {}", id, n)),
    );
    lines
}
