//! # AliveTracker: which background tasks are running right now.
//!
//! The [`Scheduler`](crate::Scheduler) registers every task before it is
//! handed to the runtime and holds an [`AliveGuard`] for as long as the task
//! future exists. Dropping the guard (normal exit, failure, panic, runtime
//! shutdown) unregisters the task, so the set never depends on event delivery.
//!
//! ```text
//! Scheduler::spawn(task)
//!   ├─► guard = tracker.enter(name)      running[name] += 1
//!   └─► rt.spawn { run_once(..); drop(guard) }
//!                                         running[name] -= 1 (removed at 0)
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

/// Thread-safe set of running background tasks.
#[derive(Debug, Default)]
pub struct AliveTracker {
    running: Mutex<BTreeMap<String, usize>>,
}

impl AliveTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one running instance of `name` until the guard is dropped.
    pub(crate) fn enter(self: &Arc<Self>, name: &str) -> AliveGuard {
        *self.running.lock().entry(name.to_string()).or_insert(0) += 1;
        AliveGuard {
            tracker: Arc::clone(self),
            name: name.to_string(),
        }
    }

    fn leave(&self, name: &str) {
        let mut running = self.running.lock();
        if let Some(n) = running.get_mut(name) {
            *n -= 1;
            if *n == 0 {
                running.remove(name);
            }
        }
    }

    /// Sorted names of the running tasks.
    #[must_use]
    pub fn snapshot(&self) -> Vec<String> {
        self.running.lock().keys().cloned().collect()
    }

    /// True while at least one task named `name` is running.
    pub fn is_alive(&self, name: &str) -> bool {
        self.running.lock().contains_key(name)
    }

    /// Number of distinct running task names.
    pub fn len(&self) -> usize {
        self.running.lock().len()
    }

    /// True when nothing is running.
    pub fn is_empty(&self) -> bool {
        self.running.lock().is_empty()
    }
}

/// Keeps a task registered in its [`AliveTracker`] while alive.
pub(crate) struct AliveGuard {
    tracker: Arc<AliveTracker>,
    name: String,
}

impl Drop for AliveGuard {
    fn drop(&mut self) {
        self.tracker.leave(&self.name);
    }
}
