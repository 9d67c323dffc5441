use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub mod engine;
pub mod mock;
pub mod notify;
pub mod poller;
pub mod push;
pub mod queue;
pub mod rpc;
pub mod settings;
pub mod state;
pub mod theme;
pub mod threshold;
pub mod view;
pub mod worker;

// Re-export for convenience
pub use engine::{EngineClient, EngineError, Transport};
pub use notify::{LogLevel, NotificationChannel};
pub use push::{BackendEvent, EngineEvent, EventReceiver, EventSender};
pub use queue::{TaskControl, TaskQueueReconciler};
pub use settings::{CommitError, CommitPlan, SettingsStore};
pub use state::PanelState;
pub use theme::{Appearance, ThemePreference, ThemeResolver};
pub use worker::{BackendCommand, Operation, run_worker};

/// Reserved task id for the "my likes" collection.
pub const MY_LIKES: &str = "MY_LIKES";
/// Reserved task id for the "my bookmarks" collection.
pub const MY_BOOKMARKS: &str = "MY_BOOKMARKS";

/// Setting keys understood by the engine.
pub mod keys {
    pub const SAVE_PATH: &str = "save_path";
    pub const CONCURRENCY: &str = "concurrency";
    pub const DOWNLOAD_THREADS: &str = "download_threads";
    pub const MAX_SCROLLS: &str = "max_scrolls";
    pub const STOP_THRESH: &str = "stop_thresh";
    pub const MAX_VIDEO_SIZE: &str = "max_video_size";
    pub const DL_IMAGES: &str = "dl_images";
    pub const DL_GIFS: &str = "dl_gifs";
    pub const BROWSER_TYPE: &str = "browser_type";
    pub const CREATE_LINK_FILE: &str = "create_link_file";
    pub const USE_TMP_FILES: &str = "use_tmp_files";
    pub const DEEP_SCAN: &str = "deep_scan";
    pub const HEADLESS: &str = "headless";
    pub const THEME: &str = "theme";
    pub const TIMEOUT: &str = "timeout";
}

/// A single configuration value as the engine stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl SettingValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(v) => write!(f, "{}", v),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for SettingValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for SettingValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for SettingValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<f64> for SettingValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for SettingValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// Flat key → value configuration snapshot.
///
/// Keys iterate in ascending order, which is also the order in which a commit
/// writes them. Cloning produces a fully independent copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Configuration(BTreeMap<String, SettingValue>);

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.0.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<SettingValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<SettingValue> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(SettingValue::as_bool)
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(SettingValue::as_int)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(SettingValue::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SettingValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Entries of `self` whose value is missing from or different in `other`,
    /// in commit order.
    pub fn changes_against<'a>(
        &'a self,
        other: &'a Configuration,
    ) -> impl Iterator<Item = (&'a str, &'a SettingValue)> + 'a {
        self.iter().filter(move |(k, v)| other.get(k) != Some(*v))
    }
}

impl FromIterator<(String, SettingValue)> for Configuration {
    fn from_iter<I: IntoIterator<Item = (String, SettingValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Processing status of a collection task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Queued,
    Running,
    Paused,
    Error,
    /// Any status string this client does not know about.
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Queued => "Queued",
            Self::Running => "Running",
            Self::Paused => "Paused",
            Self::Error => "Failed",
            Self::Unknown => "Unknown",
        }
    }

    pub fn is_active(self) -> bool {
        matches!(self, Self::Running | Self::Queued)
    }
}

/// One collection job as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub progress: u64,
}

impl Task {
    pub fn new(id: impl Into<String>, status: TaskStatus, progress: u64) -> Self {
        Self {
            id: id.into(),
            status,
            progress,
        }
    }
}

/// Human-readable name for a task or history id.
pub fn display_name(id: &str) -> String {
    match id {
        MY_LIKES => "My Likes".to_string(),
        MY_BOOKMARKS => "My Bookmarks".to_string(),
        _ => format!("@{}", id),
    }
}

/// Kind of a previously collected target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    #[serde(alias = "user")]
    Profile,
    Likes,
    Bookmarks,
}

impl HistoryKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Profile => "Profile",
            Self::Likes => "Likes",
            Self::Bookmarks => "Bookmarks",
        }
    }
}

/// A previously completed or queued target, as reported by `get_history`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: HistoryKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub count: u64,
}

impl HistoryEntry {
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("@{}", self.id),
        }
    }
}

/// A task the engine finished during the current session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishedTask {
    pub id: String,
    pub time: String,
}

/// Download totals reported by `get_stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub bookmarks: u64,
    #[serde(default)]
    pub users: BTreeMap<String, u64>,
}

impl EngineStats {
    pub fn total(&self) -> u64 {
        self.likes + self.bookmarks + self.users.values().sum::<u64>()
    }
}

/// Reply shape of the engine's primary actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub info: Option<String>,
    #[serde(default)]
    pub count: Option<u32>,
}

impl ActionOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(reason.into()),
            ..Default::default()
        }
    }

    /// Convert into a `Result`, keeping the optional info message on success.
    pub fn into_result(self) -> Result<Option<String>, EngineError> {
        if self.success {
            Ok(self.info)
        } else {
            Err(EngineError::Rejected(
                self.error.unwrap_or_else(|| "unknown error".to_string()),
            ))
        }
    }
}
