use std::sync::Arc;

use parking_lot::RwLock;
use tokio::{runtime::Handle, sync::broadcast::error::RecvError};
use tracing::warn;

use super::{AliveTracker, Config, Scheduler, supervisor::Supervisor};
use crate::{
    engine::{EngineFactory, Properties, TunnelProxyFactory},
    events::Bus,
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing a [`Supervisor`].
pub struct SupervisorBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
    properties: Properties,
    runtime: Option<Handle>,
}

impl SupervisorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            properties: Properties::new(),
            runtime: None,
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events through dedicated workers with
    /// bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Sets the configuration handed to the engine factory.
    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    /// Spawns background work on `rt` instead of the current runtime.
    pub fn with_runtime(mut self, rt: Handle) -> Self {
        self.runtime = Some(rt);
        self
    }

    /// Builds the supervisor. The engine is not created until `start()`.
    ///
    /// # Panics
    /// Without [`with_runtime`](Self::with_runtime), panics when called outside a Tokio runtime.
    pub fn build(
        self,
        engines: Arc<dyn EngineFactory>,
        proxies: Arc<dyn TunnelProxyFactory>,
    ) -> Arc<Supervisor> {
        let rt = self.runtime.unwrap_or_else(Handle::current);
        let bus = Bus::new(self.cfg.bus_capacity_clamped());

        let subs = Arc::new(SubscriberSet::new(self.subscribers, bus.clone(), &rt));
        spawn_listener(&rt, &bus, Arc::clone(&subs));

        let scheduler = Scheduler::new(rt, bus.clone(), Arc::new(AliveTracker::new()));
        Arc::new(Supervisor::new_internal(
            self.cfg,
            bus,
            subs,
            scheduler,
            engines,
            proxies,
            Arc::new(RwLock::new(self.properties)),
        ))
    }
}

/// Forwards bus events to the subscriber set until the bus closes.
fn spawn_listener(rt: &Handle, bus: &Bus, set: Arc<SubscriberSet>) {
    let mut rx = bus.subscribe();
    rt.spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ev) => set.emit(&ev),
                Err(RecvError::Lagged(n)) => {
                    warn!(skipped = n, "subscriber listener lagged behind the bus");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}
