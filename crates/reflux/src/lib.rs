//! Reflux - unidirectional state store with cancellable effects
//!
//! A [`Store`] owns one state tree and applies actions to it strictly in
//! order on a dedicated tokio task. After each action the new state is
//! published, hooks are evaluated and every active [`Middleware`] observes
//! the action. Middlewares start asynchronous work through an
//! [`EffectRunner`], which reports every outcome back as an action.

mod action;
mod action_group;
pub mod cache;
mod cancel_key;
mod debouncer;
mod dispatcher;
pub mod effect;
mod error;
mod hook;
mod logger;
mod merge;
mod middleware;
mod paginator;
mod state;
mod store;

pub use action::{Action, Priority, SystemAction};
pub use action_group::{ActionGroup, IntoActions};
pub use cancel_key::CancelKey;
pub use debouncer::Debouncer;
pub use dispatcher::Dispatcher;
pub use effect::{CancellationFlag, Effect, EffectId, EffectRunner, TaskRegistry};
pub use error::{StorageError, StoreError};
pub use hook::{Hook, HookId, HookKind};
pub use logger::{ActionLogger, LogActionLogger, LogFilter};
pub use merge::Merge;
pub use middleware::{FromStore, Middleware, MiddlewareStatus};
pub use paginator::{Page, Paginator, PaginatorAction};
pub use state::{Reducible, StoreState};
pub use store::{Published, Store};
