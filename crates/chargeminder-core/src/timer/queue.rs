//! Cooperative timer queue.
//!
//! Holds one-shot and recurring entries keyed by epoch milliseconds. It owns
//! no thread: the caller calls [`TimerQueue::poll`] with the current time
//! and receives the tasks that came due, in due order.
//!
//! ```text
//! schedule_once / schedule_every -> pending -> poll(now >= due) -> fired
//!                                      |                            |
//!                                   cancel()              Every: re-armed
//! ```

use serde::{Deserialize, Serialize};

/// Opaque handle returned by the schedule calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recurrence {
    Once,
    Every { interval_ms: i64 },
}

#[derive(Debug, Clone)]
struct Entry<T> {
    handle: TimerHandle,
    due_ms: i64,
    recurrence: Recurrence,
    task: T,
}

/// A task that came due during [`TimerQueue::poll`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<T> {
    pub handle: TimerHandle,
    pub due_ms: i64,
    pub task: T,
}

#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    entries: Vec<Entry<T>>,
    next_id: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }
}

impl<T: Clone> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire `task` once, `delay_ms` after `now_ms`.
    pub fn schedule_once(&mut self, now_ms: i64, delay_ms: i64, task: T) -> TimerHandle {
        self.push(now_ms + delay_ms.max(0), Recurrence::Once, task)
    }

    /// Fire `task` every `interval_ms`, first at `now_ms + interval_ms`.
    ///
    /// Intervals below one millisecond are raised to one.
    pub fn schedule_every(&mut self, now_ms: i64, interval_ms: i64, task: T) -> TimerHandle {
        let interval_ms = interval_ms.max(1);
        self.push(now_ms + interval_ms, Recurrence::Every { interval_ms }, task)
    }

    fn push(&mut self, due_ms: i64, recurrence: Recurrence, task: T) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            handle,
            due_ms,
            recurrence,
            task,
        });
        tracing::debug!(?handle, due_ms, "timer scheduled");
        handle
    }

    /// Returns false if the handle was unknown or already fired.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }

    pub fn is_scheduled(&self, handle: TimerHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    /// Earliest due time, if anything is pending.
    pub fn next_due(&self) -> Option<i64> {
        self.entries.iter().map(|e| e.due_ms).min()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Collect every task due at or before `now_ms`.
    ///
    /// A recurring entry that missed several periods fires once and is
    /// re-armed at its next period after `now_ms`.
    pub fn poll(&mut self, now_ms: i64) -> Vec<Fired<T>> {
        let mut fired = Vec::new();
        let mut kept = Vec::with_capacity(self.entries.len());

        for mut entry in self.entries.drain(..) {
            if entry.due_ms > now_ms {
                kept.push(entry);
                continue;
            }
            fired.push(Fired {
                handle: entry.handle,
                due_ms: entry.due_ms,
                task: entry.task.clone(),
            });
            if let Recurrence::Every { interval_ms } = entry.recurrence {
                let missed = (now_ms - entry.due_ms) / interval_ms + 1;
                entry.due_ms += missed * interval_ms;
                kept.push(entry);
            }
        }

        self.entries = kept;
        fired.sort_by_key(|f| f.due_ms);
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn once_fires_a_single_time() {
        let mut q = TimerQueue::new();
        let h = q.schedule_once(0, 100, "a");
        assert!(q.poll(99).is_empty());
        let fired = q.poll(100);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].handle, h);
        assert!(q.poll(10_000).is_empty());
        assert!(q.is_empty());
    }

    #[test]
    fn every_rearms() {
        let mut q = TimerQueue::new();
        q.schedule_every(0, 50, "tick");
        assert_eq!(q.poll(50).len(), 1);
        assert_eq!(q.next_due(), Some(100));
        assert_eq!(q.poll(100).len(), 1);
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn missed_periods_collapse_into_one_fire() {
        let mut q = TimerQueue::new();
        q.schedule_every(0, 10, "tick");
        assert_eq!(q.poll(95).len(), 1);
        assert_eq!(q.next_due(), Some(100));
    }

    #[test]
    fn cancel_removes_pending() {
        let mut q = TimerQueue::new();
        let h = q.schedule_once(0, 10, 1);
        assert!(q.is_scheduled(h));
        assert!(q.cancel(h));
        assert!(!q.cancel(h));
        assert!(q.poll(100).is_empty());
    }

    #[test]
    fn fired_in_due_order() {
        let mut q = TimerQueue::new();
        q.schedule_once(0, 30, "late");
        q.schedule_once(0, 10, "early");
        let tasks: Vec<_> = q.poll(30).into_iter().map(|f| f.task).collect();
        assert_eq!(tasks, vec!["early", "late"]);
    }

    #[test]
    fn negative_delay_fires_immediately() {
        let mut q = TimerQueue::new();
        q.schedule_once(500, -100, ());
        assert_eq!(q.poll(500).len(), 1);
    }

    #[test]
    fn cancel_all_clears() {
        let mut q = TimerQueue::new();
        q.schedule_every(0, 10, 1);
        q.schedule_once(0, 10, 2);
        q.cancel_all();
        assert!(q.is_empty());
        assert_eq!(q.next_due(), None);
    }
}
