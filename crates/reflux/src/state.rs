//! State tree traits
//!
//! A store owns one root state implementing [`StoreState`]. The root forwards
//! each action to its children, which implement [`Reducible`] over whatever
//! action vocabulary they understand. Reduction is total: an action a node
//! does not recognise leaves it untouched.

use crate::action::Action;

/// A node of the state tree
pub trait Reducible {
    /// The actions this node reacts to
    type Action;

    /// Apply `action` to this node. Must be deterministic and free of I/O.
    fn reduce(&mut self, action: &Self::Action);
}

/// The root of a store's state tree
///
/// Every dispatch reduces a fresh clone of the current root, so versions
/// handed out to observers never change underneath them.
pub trait StoreState: Clone + Send + Sync + 'static {
    type Action: Action;

    /// Apply `action` to the root. Unmatched actions are no-ops.
    fn reduce(&mut self, action: &Self::Action);

    /// Called on the published state once observers have been notified
    fn post_reduce(&self, _action: &Self::Action) {}
}
