//! Draft / committed settings with explicit confirm, undo and reset.

use tokio::sync::watch;

use crate::engine::{EngineClient, EngineError};
use crate::{Configuration, SettingValue, keys};

/// Save path used by a reset when neither the draft nor the committed
/// configuration has one.
pub const FALLBACK_SAVE_PATH: &str = "Download";

/// Built-in defaults applied by [`SettingsStore::reset_to_defaults`].
/// `save_path` is deliberately absent.
pub fn defaults() -> Configuration {
    let mut cfg = Configuration::new();
    cfg.set(keys::CONCURRENCY, 3);
    cfg.set(keys::DOWNLOAD_THREADS, 16);
    cfg.set(keys::MAX_SCROLLS, 1000);
    cfg.set(keys::STOP_THRESH, 300);
    cfg.set(keys::MAX_VIDEO_SIZE, 5);
    cfg.set(keys::DL_IMAGES, true);
    cfg.set(keys::DL_GIFS, true);
    cfg.set(keys::BROWSER_TYPE, "Edge");
    cfg.set(keys::CREATE_LINK_FILE, true);
    cfg.set(keys::USE_TMP_FILES, true);
    cfg.set(keys::DEEP_SCAN, false);
    cfg.set(keys::HEADLESS, false);
    cfg.set(keys::THEME, "system");
    cfg.set(keys::TIMEOUT, 60);
    cfg
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommitError {
    #[error("a settings commit is already in progress")]
    InFlight,
    /// Writing `key` failed; `written` were saved before it.
    #[error("failed to save {key}: {source}")]
    Partial {
        key: String,
        written: Vec<String>,
        source: EngineError,
    },
}

/// The keys a commit will write, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitPlan {
    pub writes: Vec<(String, SettingValue)>,
}

impl CommitPlan {
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }
}

/// Holds the committed configuration and the locally edited draft.
///
/// Only the store mutates either snapshot. Dirty-state changes are published
/// on a watch channel (see [`subscribe`](Self::subscribe)).
pub struct SettingsStore {
    committed: Configuration,
    draft: Configuration,
    reset_pending: bool,
    /// Draft snapshot being written by the outstanding commit.
    in_flight: Option<Configuration>,
    dirty_tx: watch::Sender<bool>,
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new(Configuration::new())
    }
}

impl SettingsStore {
    pub fn new(initial: Configuration) -> Self {
        let (dirty_tx, _) = watch::channel(false);
        Self {
            committed: initial.clone(),
            draft: initial,
            reset_pending: false,
            in_flight: None,
            dirty_tx,
        }
    }

    /// Replace both snapshots with `initial`.
    pub fn load(&mut self, initial: Configuration) {
        self.committed = initial.clone();
        self.draft = initial;
        self.reset_pending = false;
        self.publish();
    }

    pub fn committed(&self) -> &Configuration {
        &self.committed
    }

    pub fn draft(&self) -> &Configuration {
        &self.draft
    }

    pub fn set_draft(&mut self, key: impl Into<String>, value: impl Into<SettingValue>) {
        self.draft.set(key, value);
        self.publish();
    }

    pub fn is_dirty(&self) -> bool {
        self.reset_pending || self.draft != self.committed
    }

    pub fn is_committing(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Receive the dirty flag whenever it may have changed.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.dirty_tx.subscribe()
    }

    pub fn undo(&mut self) {
        self.draft = self.committed.clone();
        self.reset_pending = false;
        self.publish();
    }

    /// Replace the draft with [`defaults`], keeping the current save path.
    /// Always leaves the store dirty until the next confirm, undo or load.
    pub fn reset_to_defaults(&mut self) {
        let save_path = self
            .draft
            .get(keys::SAVE_PATH)
            .or_else(|| self.committed.get(keys::SAVE_PATH))
            .cloned()
            .unwrap_or_else(|| SettingValue::from(FALLBACK_SAVE_PATH));

        let mut draft = defaults();
        draft.set(keys::SAVE_PATH, save_path);
        self.draft = draft;
        self.reset_pending = true;
        self.publish();
    }

    /// Start a commit of every key whose draft value differs from committed.
    pub fn begin_commit(&mut self) -> Result<CommitPlan, CommitError> {
        if self.in_flight.is_some() {
            return Err(CommitError::InFlight);
        }
        let writes: Vec<(String, SettingValue)> = self
            .draft
            .changes_against(&self.committed)
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        tracing::debug!(keys = writes.len(), "settings commit started");
        self.in_flight = Some(self.draft.clone());
        Ok(CommitPlan { writes })
    }

    /// Record one key the engine acknowledged.
    pub fn record_written(&mut self, key: &str, value: SettingValue) {
        self.committed.set(key, value);
        self.publish();
    }

    /// Close the outstanding commit. On success `committed` becomes the
    /// snapshot the commit was planned from; edits made since stay dirty.
    pub fn finish_commit(
        &mut self,
        outcome: Result<(), CommitError>,
    ) -> Result<(), CommitError> {
        let Some(snapshot) = self.in_flight.take() else {
            return outcome;
        };
        match &outcome {
            Ok(()) => {
                self.committed = snapshot;
                self.reset_pending = false;
                tracing::info!("settings saved");
            }
            Err(e) => tracing::warn!(error = %e, "settings commit failed"),
        }
        self.publish();
        outcome
    }

    /// Write the differing keys through `client` one at a time, stopping at
    /// the first failure.
    pub async fn confirm(&mut self, client: &EngineClient) -> Result<(), CommitError> {
        let plan = self.begin_commit()?;
        let mut written = Vec::with_capacity(plan.len());
        for (key, value) in plan.writes {
            if let Err(source) = client.update_setting(&key, &value).await {
                return self.finish_commit(Err(CommitError::Partial {
                    key,
                    written,
                    source,
                }));
            }
            self.record_written(&key, value);
            written.push(key);
        }
        self.finish_commit(Ok(()))
    }

    fn publish(&self) {
        let dirty = self.is_dirty();
        self.dirty_tx.send_if_modified(|current| {
            let changed = *current != dirty;
            *current = dirty;
            changed
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn committed() -> Configuration {
        let mut cfg = Configuration::new();
        cfg.set(keys::BROWSER_TYPE, "Edge");
        cfg.set(keys::TIMEOUT, 60);
        cfg
    }

    #[test]
    fn dirty_iff_some_key_differs() {
        let mut store = SettingsStore::new(committed());
        assert!(!store.is_dirty());

        store.set_draft(keys::TIMEOUT, 120);
        assert!(store.is_dirty());

        store.set_draft(keys::TIMEOUT, 60);
        assert!(!store.is_dirty());

        store.set_draft(keys::DEEP_SCAN, true);
        assert!(store.is_dirty());
    }

    #[test]
    fn undo_restores_committed() {
        let mut store = SettingsStore::new(committed());
        store.set_draft(keys::TIMEOUT, 120);
        store.set_draft(keys::BROWSER_TYPE, "Chrome");
        store.undo();

        assert_eq!(store.draft(), store.committed());
        assert_eq!(store.draft().int(keys::TIMEOUT), Some(60));
        assert!(!store.is_dirty());
    }

    #[test]
    fn reset_keeps_draft_save_path() {
        let mut initial = committed();
        initial.set(keys::SAVE_PATH, "D:/old");
        let mut store = SettingsStore::new(initial);
        store.set_draft(keys::SAVE_PATH, "D:/new");
        store.reset_to_defaults();

        let mut expected = defaults();
        expected.set(keys::SAVE_PATH, "D:/new");
        assert_eq!(store.draft(), &expected);
    }

    #[test]
    fn reset_falls_back_to_download() {
        let mut store = SettingsStore::new(Configuration::new());
        store.reset_to_defaults();
        assert_eq!(store.draft().text(keys::SAVE_PATH), Some(FALLBACK_SAVE_PATH));
    }

    #[test]
    fn reset_is_dirty_even_when_equal() {
        let mut initial = defaults();
        initial.set(keys::SAVE_PATH, "D:/x");
        let mut store = SettingsStore::new(initial);
        store.reset_to_defaults();
        assert_eq!(store.draft(), store.committed());
        assert!(store.is_dirty());

        store.undo();
        assert!(!store.is_dirty());
    }

    #[test]
    fn second_begin_is_refused() {
        let mut store = SettingsStore::new(committed());
        store.set_draft(keys::TIMEOUT, 90);
        let plan = store.begin_commit().unwrap();
        assert_eq!(plan.writes, vec![("timeout".to_string(), SettingValue::Int(90))]);
        assert_eq!(store.begin_commit(), Err(CommitError::InFlight));
    }

    #[test]
    fn edits_during_commit_stay_dirty() {
        let mut store = SettingsStore::new(committed());
        store.set_draft(keys::TIMEOUT, 90);
        let plan = store.begin_commit().unwrap();
        store.set_draft(keys::BROWSER_TYPE, "Chrome");

        for (k, v) in plan.writes {
            store.record_written(&k, v);
        }
        store.finish_commit(Ok(())).unwrap();

        assert_eq!(store.committed().int(keys::TIMEOUT), Some(90));
        assert_eq!(store.committed().text(keys::BROWSER_TYPE), Some("Edge"));
        assert!(store.is_dirty());
    }

    #[test]
    fn subscription_sees_dirty_transitions() {
        let mut store = SettingsStore::new(committed());
        let mut rx = store.subscribe();
        assert!(!*rx.borrow_and_update());

        store.set_draft(keys::TIMEOUT, 120);
        assert!(rx.has_changed().unwrap());
        assert!(*rx.borrow_and_update());

        // Still dirty: no change published.
        store.set_draft(keys::TIMEOUT, 130);
        assert!(!rx.has_changed().unwrap());

        store.undo();
        assert!(!*rx.borrow_and_update());
    }
}
