//! # Task abstraction.
//!
//! A [`Task`] has a stable [`name`](Task::name) and produces a fresh future per
//! [`spawn`](Task::spawn). The future receives a [`CancellationToken`] and should
//! check it at its suspension points so the scheduler can cancel it.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Boxed future returned by [`Task::spawn`].
pub type BoxTaskFuture = Pin<Box<dyn Future<Output = Result<(), TaskError>> + Send + 'static>>;

/// Shared handle to a task.
pub type TaskRef = Arc<dyn Task>;

/// One-shot unit of background work run by the [`Scheduler`](crate::Scheduler).
///
/// Implement it directly when the work carries its own state; closures are
/// easier through [`TaskFn`](crate::TaskFn).
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use tokio_util::sync::CancellationToken;
/// use routervisor::{BoxTaskFuture, Task, TaskError, TunnelProxy};
///
/// struct ServeProxy(Arc<dyn TunnelProxy>);
///
/// impl Task for ServeProxy {
///     fn name(&self) -> &str { "tunnel-proxy" }
///
///     fn spawn(&self, ctx: CancellationToken) -> BoxTaskFuture {
///         let proxy = Arc::clone(&self.0);
///         Box::pin(async move {
///             tokio::select! {
///                 _ = ctx.cancelled() => Err(TaskError::Canceled),
///                 res = proxy.run() => res,
///             }
///         })
///     }
/// }
/// ```
pub trait Task: Send + Sync + 'static {
    /// Returns a stable, human-readable task name.
    fn name(&self) -> &str;

    /// Creates the future for one execution of the task.
    fn spawn(&self, ctx: CancellationToken) -> BoxTaskFuture;
}
