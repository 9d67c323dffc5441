//! In-memory engine for tests.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::{Value, json};

use crate::engine::{CallFuture, EngineError, Transport};
use crate::{
    ActionOutcome, Configuration, FinishedTask, HistoryEntry, HistoryKind, MY_BOOKMARKS, MY_LIKES,
    SettingValue, Task, TaskStatus, keys,
};

#[derive(Default)]
struct EngineModel {
    settings: Configuration,
    tasks: Vec<Task>,
    history: Vec<HistoryEntry>,
    finished: Vec<FinishedTask>,
    running: bool,
    logged_in: bool,
    folder_choice: Option<String>,
}

/// A hand-rolled engine implementing [`Transport`] for tests.
///
/// Keeps a small model of engine state (settings, queue, history) and
/// answers calls against it. Supports:
/// - Scripted one-shot failures per method via [`fail_next`](MockEngine::fail_next).
/// - Persistent rejection of individual setting keys via [`reject_setting`](MockEngine::reject_setting).
/// - Optional per-call latency.
/// - A log of every call with its parameters.
pub struct MockEngine {
    model: Mutex<EngineModel>,
    failures: Mutex<HashMap<String, VecDeque<EngineError>>>,
    rejected_keys: Mutex<HashSet<String>>,
    calls: Mutex<Vec<(String, Vec<Value>)>>,
    call_count: AtomicUsize,
    delay: Option<Duration>,
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            model: Mutex::new(EngineModel::default()),
            failures: Mutex::new(HashMap::new()),
            rejected_keys: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
            delay: None,
        }
    }

    pub fn with_settings(self, settings: Configuration) -> Self {
        lock(&self.model).settings = settings;
        self
    }

    pub fn with_tasks(self, tasks: Vec<Task>) -> Self {
        lock(&self.model).tasks = tasks;
        self
    }

    pub fn with_history(self, history: Vec<HistoryEntry>) -> Self {
        lock(&self.model).history = history;
        self
    }

    pub fn with_finished(self, finished: Vec<FinishedTask>) -> Self {
        lock(&self.model).finished = finished;
        self
    }

    pub fn with_login(self, logged_in: bool) -> Self {
        lock(&self.model).logged_in = logged_in;
        self
    }

    pub fn with_running(self, running: bool) -> Self {
        lock(&self.model).running = running;
        self
    }

    /// Folder returned by the next `select_folder` calls.
    pub fn with_folder_choice(self, folder: Option<&str>) -> Self {
        lock(&self.model).folder_choice = folder.map(str::to_string);
        self
    }

    /// Set simulated latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Make the next call to `method` fail with `error`. Stacks in FIFO order.
    pub fn fail_next(&self, method: &str, error: EngineError) {
        lock(&self.failures)
            .entry(method.to_string())
            .or_default()
            .push_back(error);
    }

    /// Make every `update_setting` for `key` fail.
    pub fn reject_setting(&self, key: &str) {
        lock(&self.rejected_keys).insert(key.to_string());
    }

    pub fn set_tasks(&self, tasks: Vec<Task>) {
        lock(&self.model).tasks = tasks;
    }

    pub fn settings(&self) -> Configuration {
        lock(&self.model).settings.clone()
    }

    pub fn tasks(&self) -> Vec<Task> {
        lock(&self.model).tasks.clone()
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        lock(&self.model).history.clone()
    }

    pub fn is_running(&self) -> bool {
        lock(&self.model).running
    }

    /// Every call so far, in order, with its parameters.
    pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
        lock(&self.calls).clone()
    }

    /// Names of the methods called so far, in order.
    pub fn methods(&self) -> Vec<String> {
        lock(&self.calls).iter().map(|(m, _)| m.clone()).collect()
    }

    /// How many times `method` has been called.
    pub fn count_of(&self, method: &str) -> usize {
        lock(&self.calls).iter().filter(|(m, _)| m == method).count()
    }

    /// Total number of calls.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    fn scripted_failure(&self, method: &str) -> Option<EngineError> {
        lock(&self.failures)
            .get_mut(method)
            .and_then(VecDeque::pop_front)
    }

    fn dispatch(&self, method: &str, params: &[Value]) -> Result<Value, EngineError> {
        if let Some(err) = self.scripted_failure(method) {
            return Err(err);
        }
        let text_param = |i: usize| -> Result<String, EngineError> {
            params
                .get(i)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| EngineError::Rejected(format!("{method}: missing parameter {i}")))
        };

        let mut m = lock(&self.model);
        match method {
            "get_settings" => Ok(to_value(&m.settings)),
            "update_setting" => {
                let key = text_param(0)?;
                if lock(&self.rejected_keys).contains(&key) {
                    return Err(EngineError::Rejected(format!("cannot save {key}")));
                }
                let value: SettingValue = params
                    .get(1)
                    .cloned()
                    .and_then(|v| serde_json::from_value(v).ok())
                    .ok_or_else(|| EngineError::Rejected("update_setting: bad value".into()))?;
                m.settings.set(key, value);
                Ok(json!(true))
            }
            "select_folder" => {
                let choice = m.folder_choice.clone();
                if let Some(folder) = &choice {
                    m.settings.set(keys::SAVE_PATH, folder.as_str());
                }
                Ok(json!(choice))
            }
            "check_save_path" => Ok(json!(has_save_path(&m.settings))),
            "check_login_status" => Ok(json!(m.logged_in)),
            "run_login" => {
                m.logged_in = true;
                Ok(to_value(&ActionOutcome::ok()))
            }
            "export_cookies" => {
                if m.logged_in {
                    Ok(to_value(&ActionOutcome::ok()))
                } else {
                    Ok(to_value(&ActionOutcome::failed("not logged in")))
                }
            }
            "get_engine_status" => Ok(json!(m.running)),
            "start_engine" => {
                if !m.logged_in {
                    return Ok(to_value(&ActionOutcome::failed("please log in first")));
                }
                if !has_save_path(&m.settings) {
                    return Ok(to_value(&ActionOutcome::failed("set a valid save path first")));
                }
                m.running = true;
                for task in m.tasks.iter_mut() {
                    if task.status == TaskStatus::Pending {
                        task.status = TaskStatus::Queued;
                    }
                }
                Ok(to_value(&ActionOutcome::ok()))
            }
            "stop_engine" => {
                m.running = false;
                Ok(Value::Null)
            }
            "pause_all" => {
                for task in m.tasks.iter_mut().filter(|t| t.status.is_active()) {
                    task.status = TaskStatus::Paused;
                }
                Ok(json!({"success": true}))
            }
            "resume_all" => {
                for task in m.tasks.iter_mut() {
                    if task.status == TaskStatus::Paused {
                        task.status = TaskStatus::Queued;
                    }
                }
                Ok(json!({"success": true}))
            }
            "add_tasks" => {
                let ids = parse_profile_ids(&text_param(0)?);
                if ids.is_empty() {
                    return Ok(to_value(&ActionOutcome::failed("no valid profile id found")));
                }
                let added = ids.iter().filter(|id| enqueue(&mut m, id)).count();
                Ok(to_value(&ActionOutcome {
                    success: true,
                    count: Some(added as u32),
                    info: (added < ids.len()).then(|| "some ids were already queued".to_string()),
                    error: None,
                }))
            }
            "add_my_likes" => {
                enqueue(&mut m, MY_LIKES);
                Ok(to_value(&ActionOutcome::ok()))
            }
            "add_my_bookmarks" => {
                enqueue(&mut m, MY_BOOKMARKS);
                Ok(to_value(&ActionOutcome::ok()))
            }
            "delete_task" => {
                let id = text_param(0)?;
                m.tasks.retain(|t| t.id != id);
                Ok(json!({"success": true}))
            }
            "pause_single_task" => {
                let id = text_param(0)?;
                if let Some(task) = m.tasks.iter_mut().find(|t| t.id == id) {
                    task.status = TaskStatus::Paused;
                }
                Ok(json!({"success": true}))
            }
            "start_single_task" => {
                let id = text_param(0)?;
                if let Some(task) = m.tasks.iter_mut().find(|t| t.id == id) {
                    task.status = TaskStatus::Queued;
                }
                Ok(json!({"success": true}))
            }
            "clear_all_tasks" => {
                m.tasks.clear();
                Ok(json!({"success": true}))
            }
            "get_queue_status" => Ok(to_value(&m.tasks)),
            "get_finished_tasks" => Ok(to_value(&m.finished)),
            "get_history" => Ok(to_value(&m.history)),
            "delete_history_item" => {
                let id = text_param(0)?;
                let before = m.history.len();
                m.history.retain(|h| h.id != id);
                if m.history.len() == before {
                    Ok(to_value(&ActionOutcome::failed(format!("no history for {id}"))))
                } else {
                    Ok(to_value(&ActionOutcome::ok()))
                }
            }
            "clear_all_history" => {
                m.history.clear();
                Ok(to_value(&ActionOutcome::ok()))
            }
            "get_stats" => {
                if !has_save_path(&m.settings) {
                    return Ok(json!({"error": "save path does not exist"}));
                }
                let mut users = BTreeMap::new();
                let (mut likes, mut bookmarks) = (0, 0);
                for entry in &m.history {
                    match entry.kind {
                        HistoryKind::Likes => likes += entry.count,
                        HistoryKind::Bookmarks => bookmarks += entry.count,
                        HistoryKind::Profile => {
                            users.insert(entry.id.clone(), entry.count);
                        }
                    }
                }
                Ok(json!({"likes": likes, "bookmarks": bookmarks, "users": users}))
            }
            other => Err(EngineError::Rejected(format!("unknown method {other}"))),
        }
    }
}

impl Transport for MockEngine {
    fn name(&self) -> &str {
        "mock"
    }

    fn call<'a>(&'a self, method: &'a str, params: Vec<Value>) -> CallFuture<'a> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        lock(&self.calls).push((method.to_string(), params.clone()));
        let delay = self.delay;

        Box::pin(async move {
            if let Some(d) = delay {
                tokio::time::sleep(d).await;
            }
            self.dispatch(method, &params)
        })
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn to_value<T: serde::Serialize>(v: &T) -> Value {
    serde_json::to_value(v).unwrap_or(Value::Null)
}

fn has_save_path(settings: &Configuration) -> bool {
    settings.text(keys::SAVE_PATH).is_some_and(|p| !p.is_empty())
}

fn enqueue(m: &mut EngineModel, id: &str) -> bool {
    if m.tasks.iter().any(|t| t.id == id) {
        return false;
    }
    let status = if m.running {
        TaskStatus::Queued
    } else {
        TaskStatus::Pending
    };
    m.tasks.push(Task::new(id, status, 0));
    true
}

/// Profile ids in free text: runs of `[A-Za-z0-9_]`, minus URL fragments.
fn parse_profile_ids(spec: &str) -> Vec<String> {
    const EXCLUDED: [&str; 6] = ["x", "com", "https", "http", "twitter", "www"];
    let mut ids: Vec<String> = Vec::new();
    for word in spec.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_')) {
        if word.is_empty() || EXCLUDED.contains(&word.to_ascii_lowercase().as_str()) {
            continue;
        }
        if !ids.iter().any(|i| i == word) {
            ids.push(word.to_string());
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_ids_skip_url_noise() {
        let ids = parse_profile_ids("https://x.com/alice, @bob bob\nwww.twitter.com/carol_1");
        assert_eq!(ids, vec!["alice", "bob", "carol_1"]);
    }

    #[tokio::test]
    async fn fail_next_is_one_shot() {
        let engine = MockEngine::new();
        engine.fail_next("get_queue_status", EngineError::Status(502));

        assert!(engine.call("get_queue_status", vec![]).await.is_err());
        assert!(engine.call("get_queue_status", vec![]).await.is_ok());
        assert_eq!(engine.count_of("get_queue_status"), 2);
    }

    #[tokio::test]
    async fn add_tasks_enqueues_new_ids_only() {
        let engine = MockEngine::new().with_tasks(vec![Task::new("bob", TaskStatus::Paused, 0)]);
        let reply = engine
            .call("add_tasks", vec![json!("@alice @bob")])
            .await
            .unwrap();
        let outcome: ActionOutcome = serde_json::from_value(reply).unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.count, Some(1));
        assert!(outcome.info.is_some());
        assert_eq!(engine.tasks().len(), 2);
    }

    #[tokio::test]
    async fn start_requires_login_and_save_path() {
        let engine = MockEngine::new().with_login(true);
        let reply = engine.call("start_engine", vec![]).await.unwrap();
        assert_eq!(reply["success"], json!(false));
        assert!(!engine.is_running());
    }
}
