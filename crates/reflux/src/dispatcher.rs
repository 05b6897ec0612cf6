//! Dispatcher for middleware and effect action dispatch
//!
//! Middlewares live inside the store actor and effects run on spawned tasks;
//! both need to feed actions back into the store without keeping it alive.
//! The Dispatcher therefore holds a weak sender: once every [`Store`](crate::Store)
//! handle is gone the channel closes and dispatching becomes a logged no-op.

use crate::action::{Action, Priority};
use crate::action_group::ActionGroup;
use tokio::sync::{mpsc, oneshot};

/// A batch of actions accepted by the store in one step
pub(crate) struct Envelope<A> {
    pub(crate) actions: Vec<A>,
    pub(crate) priority: Priority,
    pub(crate) ack: Option<oneshot::Sender<()>>,
}

impl<A: Action> Envelope<A> {
    pub(crate) fn single(action: A, priority: Priority) -> Self {
        Self {
            actions: vec![action],
            priority,
            ack: None,
        }
    }

    pub(crate) fn batch(actions: Vec<A>) -> Self {
        let priority = actions
            .iter()
            .map(Action::priority)
            .max()
            .unwrap_or_default();
        Self {
            actions,
            priority,
            ack: None,
        }
    }
}

/// Non-owning handle for sending actions to a store
pub struct Dispatcher<A> {
    tx: mpsc::WeakUnboundedSender<Envelope<A>>,
}

impl<A> Clone for Dispatcher<A> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<A: Action> Dispatcher<A> {
    pub(crate) fn new(tx: &mpsc::UnboundedSender<Envelope<A>>) -> Self {
        Self { tx: tx.downgrade() }
    }

    /// Dispatch an action with its own default priority
    ///
    /// Returns `false` if the store has already stopped.
    pub fn dispatch(&self, action: A) -> bool {
        let priority = action.priority();
        self.send(Envelope::single(action, priority))
    }

    /// Dispatch an action with an explicit priority hint
    pub fn dispatch_with_priority(&self, action: A, priority: Priority) -> bool {
        self.send(Envelope::single(action, priority))
    }

    /// Dispatch a group of actions as one contiguous batch
    ///
    /// Empty groups are dropped without touching the store.
    pub fn dispatch_group(&self, group: ActionGroup<A>) -> bool {
        if group.is_empty() {
            return true;
        }
        self.send(Envelope::batch(group.into_vec()))
    }

    /// Check whether the store behind this dispatcher is still running
    pub fn is_connected(&self) -> bool {
        self.tx.upgrade().is_some_and(|tx| !tx.is_closed())
    }

    pub(crate) fn send(&self, envelope: Envelope<A>) -> bool {
        let Some(tx) = self.tx.upgrade() else {
            log::warn!(
                "Dispatcher: store is gone, dropping {} action(s)",
                envelope.actions.len()
            );
            return false;
        };
        if let Err(e) = tx.send(envelope) {
            log::error!(
                "Dispatcher: failed to send {} action(s): store closed",
                e.0.actions.len()
            );
            return false;
        }
        true
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// A dispatcher wired to a bare channel instead of a running store
    pub(crate) struct Probe<A> {
        pub(crate) dispatcher: Dispatcher<A>,
        _tx: mpsc::UnboundedSender<Envelope<A>>,
        pub(crate) rx: mpsc::UnboundedReceiver<Envelope<A>>,
    }

    impl<A: Action> Probe<A> {
        pub(crate) fn new() -> Self {
            let (tx, rx) = mpsc::unbounded_channel();
            let dispatcher = Dispatcher::new(&tx);
            Self {
                dispatcher,
                _tx: tx,
                rx,
            }
        }

        /// Wait for the next dispatched action
        pub(crate) async fn next(&mut self) -> Option<A> {
            let envelope = self.rx.recv().await?;
            envelope.actions.into_iter().next()
        }

        /// Collect everything dispatched so far without waiting
        pub(crate) fn drain(&mut self) -> Vec<A> {
            let mut actions = Vec::new();
            while let Ok(envelope) = self.rx.try_recv() {
                actions.extend(envelope.actions);
            }
            actions
        }
    }
}
