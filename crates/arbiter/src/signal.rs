//! Cooperative cancellation for a running game.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;
use tracing::{info, warn};

#[derive(Debug, Default)]
struct Inner {
    stopped: AtomicBool,
    notify: Notify,
}

/// Thread-safe stop flag that async tasks can also wait on.
///
/// Cheaply cloneable; every clone observes the same flag. Once stopped it
/// stays stopped.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    inner: Arc<Inner>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.inner.stopped.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::SeqCst)
    }

    /// Resolve once [`stop`](Self::stop) has been called.
    pub async fn stopped(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.is_stopped() {
                return;
            }
            notified.await;
        }
    }

    /// Stop on the first Ctrl-C.
    pub fn install_ctrl_c(&self) {
        let signal = self.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("interrupt received, stopping game");
                    signal.stop();
                }
                Err(e) => warn!(error = %e, "failed to listen for Ctrl-C"),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_stopped_resolves_for_every_clone() {
        let signal = StopSignal::new();
        let waiter = signal.clone();
        let task = tokio::spawn(async move { waiter.stopped().await });

        tokio::task::yield_now().await;
        assert!(!signal.is_stopped());
        signal.stop();

        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("waiter woke up")
            .unwrap();
        assert!(signal.is_stopped());
    }

    #[tokio::test]
    async fn test_already_stopped_returns_immediately() {
        let signal = StopSignal::new();
        signal.stop();
        signal.stopped().await;
        assert!(signal.clone().is_stopped());
    }
}
