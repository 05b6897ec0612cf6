use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct FlagInner {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Cooperative cancellation signal shared between the runner and an effect
///
/// Cancelling only raises the flag. Work observes it either by polling
/// [`is_cancelled`](Self::is_cancelled) or by awaiting [`cancelled`](Self::cancelled).
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    inner: Arc<FlagInner>,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag. Returns `true` only for the call that raised it.
    pub fn cancel(&self) -> bool {
        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.inner.notify.notify_waiters();
        true
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolve once the flag has been raised
    pub async fn cancelled(&self) {
        loop {
            // Register before checking so a concurrent cancel cannot slip between.
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_cancel_is_idempotent() {
        let flag = CancellationFlag::new();
        assert!(!flag.is_cancelled());
        assert!(flag.cancel());
        assert!(!flag.cancel());
        assert!(flag.clone().is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_wakes_waiters() {
        let flag = CancellationFlag::new();
        let waiter = {
            let flag = flag.clone();
            tokio::spawn(async move { flag.cancelled().await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        flag.cancel();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake up")
            .unwrap();
    }

    #[tokio::test]
    async fn test_cancelled_returns_immediately_when_raised() {
        let flag = CancellationFlag::new();
        flag.cancel();
        flag.cancelled().await;
    }
}
