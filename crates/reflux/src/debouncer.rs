//! Time-windowed value coalescing
//!
//! A [`Debouncer`] remembers the latest value it received and delivers it to
//! its callbacks once no newer value has arrived for `interval`. Each receipt
//! re-arms the timer, so a steady stream faster than the interval produces no
//! firing at all until it pauses.
//!
//! Used for write-behind persistence in [`CacheCell`](crate::cache::CacheCell)
//! and for turning a rapidly changing input into a stream of settled values.

use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

type Callback<T> = Arc<dyn Fn(T) + Send + Sync>;

struct Inner<T> {
    latest: Option<T>,
    received_at: Option<Instant>,
    /// Bumped on every receipt; a firing only delivers if it still matches
    generation: u64,
    /// Last generation delivered or discarded
    settled: u64,
    pending: Option<JoinHandle<()>>,
    callbacks: Vec<Callback<T>>,
}

/// Coalesces bursts of values into one delivery after a quiet period
pub struct Debouncer<T> {
    interval: Duration,
    handle: Handle,
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> Clone for Debouncer<T> {
    fn clone(&self) -> Self {
        Self {
            interval: self.interval,
            handle: self.handle.clone(),
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + 'static> Debouncer<T> {
    /// Create a debouncer on the current tokio runtime
    ///
    /// Panics when called outside a runtime, like `tokio::spawn`.
    pub fn new(interval: Duration) -> Self {
        Self::with_handle(interval, Handle::current())
    }

    /// Create a debouncer whose timers run on `handle`
    pub fn with_handle(interval: Duration, handle: Handle) -> Self {
        Self {
            interval,
            handle,
            inner: Arc::new(Mutex::new(Inner {
                latest: None,
                received_at: None,
                generation: 0,
                settled: 0,
                pending: None,
                callbacks: Vec::new(),
            })),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Register a callback invoked with every settled value
    pub fn on_fire<F>(&self, callback: F)
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        self.inner.lock().callbacks.push(Arc::new(callback));
    }

    /// Stream of settled values
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.on_fire(move |value| {
            // A dropped receiver just stops listening.
            let _ = tx.send(value);
        });
        rx
    }

    /// Record `value` and re-arm the timer
    pub fn receive(&self, value: T) {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.latest = Some(value);
        inner.received_at = Some(Instant::now());
        if let Some(pending) = inner.pending.take() {
            pending.abort();
        }

        let generation = inner.generation;
        let interval = self.interval;
        let weak = Arc::downgrade(&self.inner);
        inner.pending = Some(self.handle.spawn(async move {
            tokio::time::sleep(interval).await;
            Self::fire(&weak, generation);
        }));
    }

    /// Deliver the pending value right away, if there is one
    pub fn flush(&self) -> bool {
        let generation = {
            let mut inner = self.inner.lock();
            if let Some(pending) = inner.pending.take() {
                pending.abort();
            }
            inner.generation
        };
        Self::fire(&Arc::downgrade(&self.inner), generation)
    }

    /// Drop the pending value without delivering it
    pub fn cancel(&self) {
        let mut inner = self.inner.lock();
        if let Some(pending) = inner.pending.take() {
            pending.abort();
        }
        inner.settled = inner.generation;
    }

    /// The most recently received value, settled or not
    pub fn latest(&self) -> Option<T> {
        self.inner.lock().latest.clone()
    }

    /// When the most recent value was received
    pub fn received_at(&self) -> Option<Instant> {
        self.inner.lock().received_at
    }

    /// Whether a received value is still waiting for its quiet period
    pub fn is_pending(&self) -> bool {
        let inner = self.inner.lock();
        inner.settled != inner.generation
    }

    fn fire(inner: &Weak<Mutex<Inner<T>>>, generation: u64) -> bool {
        let Some(inner) = inner.upgrade() else {
            return false;
        };

        let (value, callbacks) = {
            let mut inner = inner.lock();
            // A newer receipt or an earlier delivery makes this firing stale.
            if inner.generation != generation || inner.settled == generation {
                return false;
            }
            let Some(value) = inner.latest.clone() else {
                return false;
            };
            inner.settled = generation;
            inner.pending = None;
            (value, inner.callbacks.clone())
        };

        for callback in callbacks {
            callback(value.clone());
        }
        true
    }
}
