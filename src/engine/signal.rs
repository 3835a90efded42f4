//! # One-shot liveness signal.
//!
//! The supervisor hands an [`AliveSignal`] to the engine factory. The engine
//! marks it once operational; the readiness task waits on it with the
//! fixed poll interval as a fallback.

use tokio::sync::watch;

/// One-shot "engine is alive" notifier backed by a `watch` channel.
#[derive(Clone, Debug)]
pub struct AliveSignal {
    tx: watch::Sender<bool>,
}

impl AliveSignal {
    /// Creates a new, not yet signalled notifier.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Marks the engine alive. Repeated calls are no-ops.
    pub fn mark_alive(&self) {
        self.tx.send_if_modified(|alive| !std::mem::replace(alive, true));
    }

    /// True once [`mark_alive`](Self::mark_alive) has been called.
    pub fn is_marked(&self) -> bool {
        *self.tx.borrow()
    }

    /// Waits until the signal is marked. Returns immediately if it already is.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // the sender lives in `self`, so the channel cannot close while we wait
        let _ = rx.wait_for(|alive| *alive).await;
    }
}

impl Default for AliveSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn wait_returns_after_mark() {
        let signal = AliveSignal::new();
        assert!(!signal.is_marked());

        let waiter = {
            let signal = signal.clone();
            tokio::spawn(async move { signal.wait().await })
        };
        signal.mark_alive();
        signal.mark_alive();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(signal.is_marked());
    }

    #[tokio::test]
    async fn wait_on_marked_signal_is_immediate() {
        let signal = AliveSignal::new();
        signal.mark_alive();
        tokio::time::timeout(Duration::from_millis(10), signal.wait())
            .await
            .unwrap();
    }
}
