//! Counting completion barrier: tasks enter, their guards leave on drop, `wait` blocks until zero.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Default)]
struct Counter {
    in_flight: Mutex<usize>,
    idle: Condvar,
}

impl Counter {
    fn lock(&self) -> MutexGuard<'_, usize> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Shared in-flight counter. New tasks may enter while another thread is waiting; the wait only
/// returns once the count is zero.
#[derive(Clone, Default)]
pub struct TaskTracker {
    inner: Arc<Counter>,
}

impl TaskTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one task in. The task is counted out when the returned guard drops (normal return
    /// or unwind).
    pub fn enter(&self) -> TaskGuard {
        *self.inner.lock() += 1;
        TaskGuard {
            tracker: self.clone(),
        }
    }

    pub fn in_flight(&self) -> usize {
        *self.inner.lock()
    }

    pub fn wait(&self) {
        let mut n = self.inner.lock();
        while *n > 0 {
            n = self
                .inner
                .idle
                .wait(n)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Like [`wait`](Self::wait) but gives up after `timeout`. Returns true when the count reached zero.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let n = self.inner.lock();
        let (n, _) = self
            .inner
            .idle
            .wait_timeout_while(n, timeout, |n| *n > 0)
            .unwrap_or_else(PoisonError::into_inner);
        *n == 0
    }
}

/// Keeps one task counted in [`TaskTracker`] until dropped.
#[must_use = "the task is counted out as soon as the guard is dropped"]
pub struct TaskGuard {
    tracker: TaskTracker,
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        let mut n = self.tracker.inner.lock();
        *n = n.saturating_sub(1);
        if *n == 0 {
            self.tracker.inner.idle.notify_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn wait_returns_immediately_when_idle() {
        let tracker = TaskTracker::new();
        tracker.wait();
        assert_eq!(tracker.in_flight(), 0);
    }

    #[test]
    fn guards_count_in_and_out() {
        let tracker = TaskTracker::new();
        let a = tracker.enter();
        let b = tracker.enter();
        assert_eq!(tracker.in_flight(), 2);
        drop(a);
        assert_eq!(tracker.in_flight(), 1);
        drop(b);
        assert_eq!(tracker.in_flight(), 0);
    }

    #[test]
    fn wait_covers_tasks_entered_by_other_tasks() {
        let tracker = TaskTracker::new();
        let outer = tracker.enter();
        let t = tracker.clone();
        let handle = thread::spawn(move || {
            let inner = t.enter();
            drop(outer);
            thread::sleep(Duration::from_millis(20));
            drop(inner);
        });
        tracker.wait();
        assert_eq!(tracker.in_flight(), 0);
        handle.join().unwrap();
    }

    #[test]
    fn wait_timeout_reports_stragglers() {
        let tracker = TaskTracker::new();
        let guard = tracker.enter();
        assert!(!tracker.wait_timeout(Duration::from_millis(10)));
        drop(guard);
        assert!(tracker.wait_timeout(Duration::from_millis(10)));
    }
}
