//! # Tunnel proxy collaborator.
//!
//! Constructed once the engine is alive, with the engine handle and a
//! configuration-derived directory. Its `run` future is driven by a background
//! task; `stop` is called first during supervisor shutdown.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::engine::Engine;
use crate::error::{ProxyError, TaskError};

/// Encrypted tunnel proxy running on top of the engine.
#[async_trait]
pub trait TunnelProxy: Send + Sync + 'static {
    /// Serves until stopped.
    async fn run(&self) -> Result<(), TaskError>;

    /// Requests the proxy to stop; `run` returns afterwards.
    fn stop(&self);
}

/// Builds the tunnel proxy.
pub trait TunnelProxyFactory: Send + Sync + 'static {
    /// Creates a proxy bound to `engine`, keeping its state under `dir`.
    fn create(
        &self,
        engine: Arc<dyn Engine>,
        dir: &Path,
    ) -> Result<Arc<dyn TunnelProxy>, ProxyError>;
}
