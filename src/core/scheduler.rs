//! # Background task scheduler.
//!
//! [`Scheduler`] spawns one-shot [`Task`](crate::Task)s on a runtime handle.
//! Every task gets a child of the current root token and runs through
//! `runner::run_once`, so its lifecycle shows up on the [`Bus`]. The
//! [`AliveTracker`] is updated directly around each run.
//!
//! ```text
//! spawn(task) ──► guard = alive.enter(name)
//!                 rt.spawn(run_once(task, root.child_token(), bus); drop(guard))
//! cancel_all() ─► old root cancelled, fresh root installed
//!                 running tasks see ctx.cancelled(); later spawns run normally
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::{runtime::Handle, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::{
    core::{alive::AliveTracker, runner},
    events::Bus,
    tasks::TaskRef,
};

/// Spawns background tasks under a shared, replaceable cancellation root.
#[derive(Clone)]
pub struct Scheduler {
    rt: Handle,
    bus: Bus,
    alive: Arc<AliveTracker>,
    root: Arc<Mutex<CancellationToken>>,
}

impl Scheduler {
    /// Creates a scheduler spawning on `rt`, publishing to `bus` and
    /// registering running tasks in `alive`.
    pub fn new(rt: Handle, bus: Bus, alive: Arc<AliveTracker>) -> Self {
        Self {
            rt,
            bus,
            alive,
            root: Arc::new(Mutex::new(CancellationToken::new())),
        }
    }

    /// Runs `task` once in the background.
    ///
    /// The task is listed in [`alive`](Self::alive) before this returns. The
    /// returned handle may be dropped; the task keeps running.
    pub fn spawn(&self, task: TaskRef) -> JoinHandle<()> {
        let token = self.root.lock().clone();
        let bus = self.bus.clone();
        let guard = self.alive.enter(task.name());
        self.rt.spawn(async move {
            let _guard = guard;
            let _ = runner::run_once(task.as_ref(), &token, &bus).await;
        })
    }

    /// Cancels every task spawned so far.
    ///
    /// Tasks spawned afterwards get a fresh root and are not affected.
    pub fn cancel_all(&self) {
        let old = std::mem::replace(&mut *self.root.lock(), CancellationToken::new());
        old.cancel();
    }

    /// Tracker of the tasks currently running.
    pub fn alive(&self) -> &Arc<AliveTracker> {
        &self.alive
    }

    /// Runtime handle tasks are spawned on.
    pub fn handle(&self) -> &Handle {
        &self.rt
    }
}
