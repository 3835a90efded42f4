//! # Closure-backed tasks.
//!
//! Every background job the supervisor runs (`engine-run`, `readiness`,
//! `tunnel-proxy`, `exit-hook`, `throttle-apply#N`) is a [`TaskFn`]: a name plus
//! a closure called once per run with that run's [`CancellationToken`]. The
//! closure clones whatever it captured (engine handle, weak supervisor
//! reference, request) into the returned future.
//!
//! ## Example
//! A debounced apply that gives up when cancelled during its wait:
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use routervisor::{Task, TaskError, TaskFn, TaskRef};
//!
//! let window = Duration::from_millis(2000);
//! let apply: TaskRef = TaskFn::arc("throttle-apply#7", move |ctx: CancellationToken| {
//!     async move {
//!         tokio::select! {
//!             _ = ctx.cancelled() => Err(TaskError::Canceled),
//!             _ = tokio::time::sleep(window) => Ok(()),
//!         }
//!     }
//! });
//!
//! assert_eq!(apply.name(), "throttle-apply#7");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::tasks::task::{BoxTaskFuture, Task};

/// A named closure producing one future per run.
#[derive(Debug)]
pub struct TaskFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> TaskFn<F> {
    /// Wraps `f` under `name`.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Same as [`new`](Self::new), ready to hand to the scheduler.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F, Fut> Task for TaskFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn spawn(&self, ctx: CancellationToken) -> BoxTaskFuture {
        Box::pin((self.f)(ctx))
    }
}
