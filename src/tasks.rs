//! One-shot scheduled tasks.
//!
//! The engine's two timers (soft auto-hide, takeover delay) are modeled as
//! fire-once tasks with cancellation handles rather than bare callbacks,
//! so tests can drive them with a virtual clock. There are no internal
//! threads: the caller polls [`TaskQueue::take_due`] with an explicit `now`,
//! the same way the engine itself is ticked by its host.

/// What a due task should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Return a still-soft overlay to idle.
    SoftAutoHide,
    /// Fire the takeover once the warn cue has run its course.
    HardTakeover,
}

/// Cancellation handle for a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskId(u64);

#[derive(Debug)]
struct Entry {
    id: TaskId,
    kind: TaskKind,
    due_ms: u64,
    canceled: bool,
}

/// Fire-once task queue, polled with an explicit clock.
#[derive(Debug, Default)]
pub struct TaskQueue {
    next_id: u64,
    entries: Vec<Entry>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, kind: TaskKind, due_ms: u64) -> TaskId {
        self.next_id += 1;
        let id = TaskId(self.next_id);
        self.entries.push(Entry {
            id,
            kind,
            due_ms,
            canceled: false,
        });
        id
    }

    /// Returns false if the task already fired or was already canceled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        for entry in &mut self.entries {
            if entry.id == id && !entry.canceled {
                entry.canceled = true;
                return true;
            }
        }
        false
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Earliest due time among live tasks.
    pub fn next_due(&self) -> Option<u64> {
        self.entries
            .iter()
            .filter(|e| !e.canceled)
            .map(|e| e.due_ms)
            .min()
    }

    /// Remove and return every live task due at or before `now`, in due
    /// order (scheduling order breaks ties).
    pub fn take_due(&mut self, now_ms: u64) -> Vec<TaskKind> {
        let mut due: Vec<(u64, u64, TaskKind)> = Vec::new();
        self.entries.retain(|e| {
            if e.canceled {
                return false;
            }
            if e.due_ms <= now_ms {
                due.push((e.due_ms, e.id.0, e.kind));
                return false;
            }
            true
        });
        due.sort_by_key(|&(due_ms, id, _)| (due_ms, id));
        due.into_iter().map(|(_, _, kind)| kind).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|e| e.canceled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_tasks_fire_once() {
        let mut q = TaskQueue::new();
        q.schedule(TaskKind::SoftAutoHide, 1_000);
        assert!(q.take_due(999).is_empty());
        assert_eq!(q.take_due(1_000), vec![TaskKind::SoftAutoHide]);
        assert!(q.take_due(10_000).is_empty());
    }

    #[test]
    fn canceled_task_never_fires() {
        let mut q = TaskQueue::new();
        let id = q.schedule(TaskKind::HardTakeover, 500);
        assert!(q.cancel(id));
        assert!(!q.cancel(id));
        assert!(q.take_due(1_000).is_empty());
        assert!(q.is_empty());
    }

    #[test]
    fn due_order_breaks_ties_by_schedule_order() {
        let mut q = TaskQueue::new();
        q.schedule(TaskKind::HardTakeover, 2_000);
        q.schedule(TaskKind::SoftAutoHide, 1_000);
        q.schedule(TaskKind::SoftAutoHide, 2_000);
        assert_eq!(
            q.take_due(2_000),
            vec![
                TaskKind::SoftAutoHide,
                TaskKind::HardTakeover,
                TaskKind::SoftAutoHide
            ]
        );
    }

    #[test]
    fn next_due_skips_canceled() {
        let mut q = TaskQueue::new();
        let early = q.schedule(TaskKind::SoftAutoHide, 100);
        q.schedule(TaskKind::HardTakeover, 200);
        assert_eq!(q.next_due(), Some(100));
        q.cancel(early);
        assert_eq!(q.next_due(), Some(200));
    }

    #[test]
    fn clear_drops_everything() {
        let mut q = TaskQueue::new();
        q.schedule(TaskKind::SoftAutoHide, 100);
        q.clear();
        assert_eq!(q.next_due(), None);
    }
}
