//! Runtime core: lifecycle supervision and background scheduling.
//!
//! The public API from this module is [`Supervisor`] (built by
//! [`SupervisorBuilder`]), its [`Config`], the [`LifecycleState`] it reports,
//! the [`Scheduler`] it runs background work on and the [`AliveTracker`]
//! listing that work.
//!
//! Internal modules:
//! - [`alive`]: the set of background tasks currently running;
//! - [`runner`]: executes one background task with panic isolation and event publishing;
//! - [`scheduler`]: spawns tasks under a shared cancellation root;
//! - [`supervisor`]: engine lifecycle, readiness and tunnel proxy bring-up;
//! - [`exit_hook`]: stops the supervisor and ends the process on a termination signal.

mod alive;
mod builder;
mod config;
mod exit_hook;
mod runner;
mod scheduler;
mod state;
mod supervisor;

pub use alive::AliveTracker;
pub use builder::SupervisorBuilder;
pub use config::Config;
pub use scheduler::Scheduler;
pub use state::LifecycleState;
pub use supervisor::Supervisor;
