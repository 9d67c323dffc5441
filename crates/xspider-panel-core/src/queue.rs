//! Authoritative task list fed by push updates and polling.

use std::collections::HashMap;

use crate::{Task, TaskStatus};

/// The primary control shown for a task, besides delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskControl {
    Pause,
    Start,
    /// Start again after a failure.
    Restart,
}

impl TaskControl {
    pub fn for_status(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Running | TaskStatus::Queued => Self::Pause,
            TaskStatus::Error => Self::Restart,
            _ => Self::Start,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pause => "Pause",
            Self::Start => "Start",
            Self::Restart => "Restart",
        }
    }
}

/// Ordered task list keyed by id.
///
/// Snapshots replace the whole list; progress deltas patch one field of an
/// existing task and never create one.
#[derive(Debug, Default)]
pub struct TaskQueueReconciler {
    tasks: Vec<Task>,
    index: HashMap<String, usize>,
}

impl TaskQueueReconciler {
    pub fn new(initial: Vec<Task>) -> Self {
        let mut queue = Self::default();
        queue.apply_full_snapshot(initial);
        queue
    }

    /// Replace the list with `tasks`, keeping their order. A repeated id
    /// keeps its first occurrence.
    pub fn apply_full_snapshot(&mut self, tasks: Vec<Task>) {
        self.tasks.clear();
        self.index.clear();
        for task in tasks {
            if self.index.contains_key(&task.id) {
                tracing::debug!(id = %task.id, "duplicate task id in snapshot");
                continue;
            }
            self.index.insert(task.id.clone(), self.tasks.len());
            self.tasks.push(task);
        }
    }

    /// Set the progress of task `id`. Returns false for unknown ids.
    pub fn apply_progress_delta(&mut self, id: &str, count: u64) -> bool {
        match self.index.get(id) {
            Some(&i) => {
                self.tasks[i].progress = count;
                true
            }
            None => false,
        }
    }

    pub fn get(&self) -> &[Task] {
        &self.tasks
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        self.index.get(id).map(|&i| &self.tasks[i])
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(id: &str, progress: u64) -> Task {
        Task::new(id, TaskStatus::Running, progress)
    }

    #[test]
    fn snapshot_is_idempotent() {
        let snapshot = vec![running("a", 1), Task::new("b", TaskStatus::Queued, 0)];
        let mut q = TaskQueueReconciler::default();
        q.apply_full_snapshot(snapshot.clone());
        let once = q.get().to_vec();
        q.apply_full_snapshot(snapshot);
        assert_eq!(q.get(), once.as_slice());
    }

    #[test]
    fn progress_delta_patches_known_ids_only() {
        let mut q = TaskQueueReconciler::new(vec![running("a", 5)]);
        assert!(q.apply_progress_delta("a", 6));
        assert!(!q.apply_progress_delta("b", 1));
        assert_eq!(q.get(), &[running("a", 6)]);
    }

    #[test]
    fn snapshot_drops_tasks_missing_from_it() {
        let mut q = TaskQueueReconciler::new(vec![running("a", 5), running("b", 2)]);
        q.apply_full_snapshot(vec![running("b", 3)]);
        assert_eq!(q.len(), 1);
        assert!(q.find("a").is_none());
        // A late delta for the removed task does not bring it back.
        assert!(!q.apply_progress_delta("a", 9));
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn duplicate_ids_keep_first() {
        let q = TaskQueueReconciler::new(vec![running("a", 1), running("a", 7)]);
        assert_eq!(q.get(), &[running("a", 1)]);
    }

    #[test]
    fn controls_follow_status() {
        assert_eq!(TaskControl::for_status(TaskStatus::Running), TaskControl::Pause);
        assert_eq!(TaskControl::for_status(TaskStatus::Queued), TaskControl::Pause);
        assert_eq!(TaskControl::for_status(TaskStatus::Error), TaskControl::Restart);
        assert_eq!(TaskControl::for_status(TaskStatus::Paused), TaskControl::Start);
        assert_eq!(TaskControl::for_status(TaskStatus::Pending), TaskControl::Start);
        assert_eq!(TaskControl::for_status(TaskStatus::Unknown), TaskControl::Start);
        assert_ne!(TaskControl::Restart.label(), TaskControl::Start.label());
    }
}
