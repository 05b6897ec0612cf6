//! Hooks: predicate-gated callbacks evaluated after each publication
//!
//! A hook fires when its condition goes from false to true. One-shot hooks
//! are removed in the same step that runs their block, so two back-to-back
//! qualifying states can never run them twice. Recurring hooks stay armed
//! and fire again on the next false to true transition.

use crate::dispatcher::Dispatcher;
use crate::state::StoreState;
use std::fmt;
use std::sync::Arc;

/// Identifies a hook for replacement and removal
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HookId(Arc<str>);

impl HookId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(Arc::from(id.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HookId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for HookId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    Once,
    Recurring,
}

type Condition<S> = Box<dyn Fn(&S) -> bool + Send>;
type Block<S> = Box<dyn FnMut(&S, &Dispatcher<<S as StoreState>::Action>) + Send>;

pub struct Hook<S: StoreState> {
    id: HookId,
    kind: HookKind,
    condition: Condition<S>,
    block: Block<S>,
    held: bool,
}

impl<S: StoreState> Hook<S> {
    /// Fire `block` the first time `condition` holds, then disarm
    ///
    /// The block runs on the store task and only gets the new state and a
    /// [`Dispatcher`]. It can dispatch actions but cannot subscribe
    /// middlewares or arm hooks, including re-arming itself; use a
    /// [`recurring`](Self::recurring) hook or a middleware holding a `Store`
    /// handle for that.
    pub fn once<C, B>(id: impl Into<HookId>, condition: C, block: B) -> Self
    where
        C: Fn(&S) -> bool + Send + 'static,
        B: FnMut(&S, &Dispatcher<S::Action>) + Send + 'static,
    {
        Self::build(id.into(), HookKind::Once, Box::new(condition), Box::new(block))
    }

    /// Fire `block` every time `condition` becomes true
    ///
    /// Like [`once`](Self::once), the block is limited to dispatching.
    pub fn recurring<C, B>(id: impl Into<HookId>, condition: C, block: B) -> Self
    where
        C: Fn(&S) -> bool + Send + 'static,
        B: FnMut(&S, &Dispatcher<S::Action>) + Send + 'static,
    {
        Self::build(id.into(), HookKind::Recurring, Box::new(condition), Box::new(block))
    }

    fn build(id: HookId, kind: HookKind, condition: Condition<S>, block: Block<S>) -> Self {
        Self {
            id,
            kind,
            condition,
            block,
            held: false,
        }
    }

    pub fn id(&self) -> &HookId {
        &self.id
    }

    pub fn kind(&self) -> HookKind {
        self.kind
    }
}

impl<S: StoreState> fmt::Debug for Hook<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("held", &self.held)
            .finish_non_exhaustive()
    }
}

/// Armed hooks, in registration order
pub(crate) struct HookSet<S: StoreState> {
    hooks: Vec<Hook<S>>,
}

impl<S: StoreState> HookSet<S> {
    pub(crate) fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Arm `hook`, replacing any hook with the same id
    pub(crate) fn add(&mut self, hook: Hook<S>) -> bool {
        if let Some(existing) = self.hooks.iter_mut().find(|h| h.id == hook.id) {
            log::debug!("Store: replacing hook '{}'", hook.id);
            *existing = hook;
            return true;
        }
        log::debug!("Store: arming hook '{}' ({:?})", hook.id, hook.kind);
        self.hooks.push(hook);
        false
    }

    pub(crate) fn remove(&mut self, id: &HookId) -> bool {
        let before = self.hooks.len();
        self.hooks.retain(|h| &h.id != id);
        before != self.hooks.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Run every hook whose condition just became true; returns how many fired
    pub(crate) fn evaluate(&mut self, state: &S, dispatcher: &Dispatcher<S::Action>) -> usize {
        let mut fired = 0;
        self.hooks.retain_mut(|hook| {
            let holds = (hook.condition)(state);
            let rising = holds && !hook.held;
            hook.held = holds;
            if !rising {
                return true;
            }
            log::debug!("Store: hook '{}' fired", hook.id);
            (hook.block)(state, dispatcher);
            fired += 1;
            hook.kind == HookKind::Recurring
        });
        fired
    }
}
