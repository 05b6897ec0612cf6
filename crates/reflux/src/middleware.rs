//! Middleware - observers that turn actions into further work
//!
//! Middlewares are owned by the store actor and run after each action has
//! been reduced and published, so they always see the authoritative new
//! state. They never mutate state; they dispatch new actions instead,
//! usually through an [`EffectRunner`](crate::EffectRunner).

use crate::dispatcher::Dispatcher;
use crate::state::StoreState;

/// Readiness gate evaluated against the freshly published state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MiddlewareStatus {
    #[default]
    Active,
    /// Skip this middleware for the current action only
    Suspended,
}

/// Middleware trait - reacts to actions after reduction
pub trait Middleware<S: StoreState>: Send + 'static {
    /// Whether this middleware wants to see actions given `state`
    fn status(&self, _state: &S) -> MiddlewareStatus {
        MiddlewareStatus::Active
    }

    /// Observe an action
    ///
    /// - `action`: The action that was just applied
    /// - `state`: The state it produced (read-only snapshot)
    fn reduce(&mut self, action: &S::Action, state: &S);

    /// Name used in store logs
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Middlewares constructible from a store's dispatcher plus an environment
///
/// The environment bundles runtime dependencies (backends, clocks, paths) so
/// tests can swap them without touching the middleware itself.
pub trait FromStore<S: StoreState>: Middleware<S> + Sized {
    type Environment: Send + 'static;

    fn from_store(dispatcher: Dispatcher<S::Action>, environment: Self::Environment) -> Self;
}

impl<S: StoreState> Middleware<S> for Box<dyn Middleware<S>> {
    fn status(&self, state: &S) -> MiddlewareStatus {
        self.as_ref().status(state)
    }

    fn reduce(&mut self, action: &S::Action, state: &S) {
        self.as_mut().reduce(action, state)
    }

    fn name(&self) -> &'static str {
        self.as_ref().name()
    }
}
