//! Effects: cancellable asynchronous work resolving to one action
//!
//! ```text
//! Middleware ──execute(effect, key)──► EffectRunner ──spawn──► work
//!                                          │                    │
//!                                    TaskRegistry ◄──complete───┤
//!                                          │                    ▼
//!                                     cancel(key)      Dispatcher::dispatch(result)
//! ```
//!
//! A middleware owns one [`EffectRunner`]. The runner keeps at most one live
//! effect per [`CancelKey`](crate::CancelKey) and turns every outcome into an
//! ordinary action: the mapped result, `SystemAction::Error`, or
//! `SystemAction::DidCancelEffect`.

mod flag;
mod registry;
mod runner;

pub use flag::CancellationFlag;
pub use registry::TaskRegistry;
pub use runner::EffectRunner;

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};

/// BoxFuture type alias for effect work
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Process-unique identifier used to correlate an effect with its error action
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EffectId(u64);

impl EffectId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "effect#{}", self.0)
    }
}

type Work<T> = Box<dyn FnOnce(CancellationFlag) -> BoxFuture<'static, anyhow::Result<T>> + Send>;

/// One unit of asynchronous work producing a `T`
///
/// Nothing runs until the effect is handed to an [`EffectRunner`].
pub struct Effect<T> {
    id: EffectId,
    work: Work<T>,
}

impl<T: Send + 'static> Effect<T> {
    /// Work that does not look at the cancellation flag itself
    ///
    /// The runner still stops awaiting it at its next suspension point once
    /// the effect is cancelled.
    pub fn new<F>(work: F) -> Self
    where
        F: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        Self {
            id: EffectId::next(),
            work: Box::new(move |_| Box::pin(work)),
        }
    }

    /// Work that receives the flag and may check it between steps
    pub fn cancellable<F, Fut>(work: F) -> Self
    where
        F: FnOnce(CancellationFlag) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        Self {
            id: EffectId::next(),
            work: Box::new(move |flag| Box::pin(work(flag))),
        }
    }

    /// An effect that resolves immediately to `value`
    pub fn ready(value: T) -> Self {
        Self::new(async move { Ok(value) })
    }

    pub fn id(&self) -> EffectId {
        self.id
    }

    pub(crate) fn start(self, flag: CancellationFlag) -> BoxFuture<'static, anyhow::Result<T>> {
        (self.work)(flag)
    }
}

impl<T> fmt::Debug for Effect<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect").field("id", &self.id).finish()
    }
}
