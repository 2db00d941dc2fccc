use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

/// The server's RUNNING -> STOPPED switch.
///
/// The transition happens at most once: the first [`Lifecycle::stop`] flips the flag and
/// wakes the accept loop, later calls are no-ops.
#[derive(Debug, Default)]
pub struct Lifecycle {
    stopped: AtomicBool,
    notify: Notify,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` for the call that actually stopped the server.
    pub fn stop(&self) -> bool {
        let won = self
            .stopped
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if won {
            self.notify.notify_waiters();
        }
        won
    }

    /// After a STOP request this turns `true` once its response has been handed to the
    /// connection.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Resolves once the server has been stopped.
    pub async fn stopped(&self) {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        // Register before checking the flag, or a stop landing in between would be missed.
        notified.as_mut().enable();
        if self.is_stopped() {
            return;
        }
        notified.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn only_the_first_stop_wins() {
        let lifecycle = Lifecycle::new();
        assert!(!lifecycle.is_stopped());
        assert!(lifecycle.stop());
        assert!(!lifecycle.stop());
        assert!(lifecycle.is_stopped());
    }

    #[tokio::test]
    async fn waiters_wake_up_on_stop() {
        let lifecycle = Arc::new(Lifecycle::new());
        let waiter = {
            let lifecycle = lifecycle.clone();
            tokio::spawn(async move { lifecycle.stopped().await })
        };

        lifecycle.stop();
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn every_waiter_is_woken() {
        let lifecycle = Arc::new(Lifecycle::new());
        let waiters: Vec<_> = (0..3)
            .map(|_| {
                let lifecycle = lifecycle.clone();
                tokio::spawn(async move { lifecycle.stopped().await })
            })
            .collect();

        lifecycle.stop();
        for waiter in waiters {
            waiter.await.unwrap();
        }
    }

    #[tokio::test]
    async fn waiting_after_the_fact_returns_immediately() {
        let lifecycle = Lifecycle::new();
        lifecycle.stop();
        lifecycle.stopped().await;
    }
}
