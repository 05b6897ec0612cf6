//! Action vocabulary shared by every store
//!
//! Applications define their own closed action enum and implement [`Action`]
//! for it. The only actions the core produces on its own are the
//! [`SystemAction`]s emitted by the effect runner, which is why every action
//! type must be constructible from one.

use crate::cancel_key::CancelKey;
use crate::effect::EffectId;
use std::fmt;

/// Scheduling hint attached to an accepted action
///
/// Priority never reorders the store's FIFO queue; it is carried for logging
/// and for collaborators that want to prioritise their own follow-up work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Normal => write!(f, "normal"),
            Priority::High => write!(f, "high"),
        }
    }
}

/// Actions produced by the core itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemAction {
    /// The effect registered under `key` was cancelled before delivering its result
    DidCancelEffect { key: CancelKey },
    /// The effect `id` failed; `error` is the rendered error chain
    Error { error: String, id: EffectId },
}

/// An immutable description of something that happened
pub trait Action: fmt::Debug + Clone + Send + Sync + 'static + From<SystemAction> {
    /// Silent actions are never handed to the action logger
    fn is_silent(&self) -> bool {
        false
    }

    /// Used by [`LogFilter::errors_only`](crate::LogFilter::errors_only)
    fn is_error(&self) -> bool {
        false
    }

    /// Default priority used by [`Store::dispatch`](crate::Store::dispatch)
    fn priority(&self) -> Priority {
        Priority::Normal
    }

    /// Human-readable rendering handed to the action logger
    fn describe(&self) -> String {
        format!("{:?}", self)
    }
}
