//! Error types used by the routervisor runtime and its collaborators.
//!
//! This module defines the error enums surfaced by the crate:
//!
//! - [`SupervisorError`] - errors raised by the lifecycle supervisor itself.
//! - [`ThrottleError`] - errors raised while applying a bandwidth limit.
//! - [`TaskError`] - errors raised by individual background task executions.
//! - [`EngineError`] - errors reported by the embedded engine's accessors.
//! - [`ProxyError`] - errors raised while constructing the tunnel proxy.
//!
//! The first three provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::path::PathBuf;

use thiserror::Error;

/// # Errors produced by the lifecycle supervisor.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SupervisorError {
    /// The operation needs a running engine, but `start()` has not created one yet.
    #[error("engine not started")]
    NotStarted,

    /// The engine was already created and stopped; it is never recreated.
    #[error("engine already stopped; it cannot be started again")]
    AlreadyStopped,

    /// The engine factory refused to build an engine.
    #[error("failed to create engine: {0}")]
    EngineCreate(#[source] EngineError),

    /// Applying a bandwidth limit failed.
    #[error(transparent)]
    Throttle(#[from] ThrottleError),
}

impl SupervisorError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use routervisor::SupervisorError;
    ///
    /// assert_eq!(SupervisorError::NotStarted.as_label(), "supervisor_not_started");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SupervisorError::NotStarted => "supervisor_not_started",
            SupervisorError::AlreadyStopped => "supervisor_already_stopped",
            SupervisorError::EngineCreate(_) => "supervisor_engine_create",
            SupervisorError::Throttle(e) => e.as_label(),
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SupervisorError::NotStarted => "engine not started".to_string(),
            SupervisorError::AlreadyStopped => "engine already stopped".to_string(),
            SupervisorError::EngineCreate(e) => format!("engine create: {e}"),
            SupervisorError::Throttle(e) => e.as_message(),
        }
    }
}

/// # Errors produced while applying a bandwidth limit.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ThrottleError {
    /// The engine reported that the new limits could not be saved.
    #[error("error saving the new bandwidth limit ({kbps} KB/s)")]
    Persist {
        /// Desired rate that failed to persist.
        kbps: u32,
    },
}

impl ThrottleError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ThrottleError::Persist { .. } => "throttle_persist_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ThrottleError::Persist { kbps } => format!("persist failed: rate={kbps}KB/s"),
        }
    }
}

/// # Errors produced by background task execution.
///
/// A task that fails is logged and reported through the event bus; it is never restarted.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// Non-recoverable error; the task gives up.
    #[error("fatal error: {error}")]
    Fatal {
        /// The underlying error message.
        error: String,
    },

    /// Task execution failed.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Task was cancelled due to parent context shutdown.
    #[error("context cancelled")]
    Canceled,
}

impl TaskError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use routervisor::TaskError;
    ///
    /// let err = TaskError::Fail { error: "boom".into() };
    /// assert_eq!(err.as_label(), "task_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fatal { .. } => "task_fatal",
            TaskError::Fail { .. } => "task_failed",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fatal { error } => format!("fatal: {error}"),
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Canceled => "context cancelled".to_string(),
        }
    }
}

/// Error reported by an [`Engine`](crate::Engine) accessor or factory.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct EngineError(pub String);

impl EngineError {
    /// Builds an error from any displayable message.
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// # Errors produced while bringing up the tunnel proxy.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ProxyError {
    /// The engine configuration does not name a configuration directory.
    #[error("configuration property `{0}` is not set")]
    MissingConfigDir(String),

    /// The proxy factory failed to build a proxy for `dir`.
    #[error("failed to create tunnel proxy in {dir:?}: {reason}")]
    Create {
        /// Directory the proxy was asked to use.
        dir: PathBuf,
        /// Factory-provided reason.
        reason: String,
    },
}

impl From<ProxyError> for TaskError {
    fn from(e: ProxyError) -> Self {
        TaskError::Fatal {
            error: e.to_string(),
        }
    }
}
