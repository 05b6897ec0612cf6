//! Declarative action groups
//!
//! An [`ActionGroup`] is an ordered batch of actions dispatched together.
//! Groups are built from anything implementing [`IntoActions`]: a single
//! action, an `Option` (where `None` contributes nothing), a `Vec`, or another
//! group. Rust's `if`/`else` and `match` are expressions, so conditionals and
//! switches compose directly; loops go through `collect()`.
//!
//! ```rust,ignore
//! let group: ActionGroup<Action> = action_group![
//!     Action::Refresh,
//!     if offline { Action::GoOffline } else { Action::GoOnline },
//!     show_banner.then(|| Action::ShowBanner),
//!     match tab {
//!         Tab::Feed => Some(Action::LoadFeed),
//!         Tab::Settings => None,
//!     },
//!     ids.iter().map(|id| Action::Prefetch(*id)).collect::<ActionGroup<_>>(),
//! ];
//! store.dispatch_group(group);
//! ```

use crate::action::Action;

/// Something that contributes zero or more actions to a group
pub trait IntoActions<A> {
    fn append_to(self, actions: &mut Vec<A>);
}

impl<A: Action> IntoActions<A> for A {
    fn append_to(self, actions: &mut Vec<A>) {
        actions.push(self);
    }
}

impl<A: Action> IntoActions<A> for Option<A> {
    fn append_to(self, actions: &mut Vec<A>) {
        actions.extend(self);
    }
}

impl<A: Action> IntoActions<A> for Vec<A> {
    fn append_to(mut self, actions: &mut Vec<A>) {
        actions.append(&mut self);
    }
}

impl<A: Action> IntoActions<A> for ActionGroup<A> {
    fn append_to(mut self, actions: &mut Vec<A>) {
        actions.append(&mut self.actions);
    }
}

/// Ordered collection of actions dispatched as one batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionGroup<A> {
    actions: Vec<A>,
}

impl<A> Default for ActionGroup<A> {
    fn default() -> Self {
        Self {
            actions: Vec::new(),
        }
    }
}

impl<A> ActionGroup<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append whatever `part` contributes, keeping written order
    pub fn push<T: IntoActions<A>>(&mut self, part: T) {
        part.append_to(&mut self.actions);
    }

    /// Builder form of [`push`](Self::push)
    pub fn with<T: IntoActions<A>>(mut self, part: T) -> Self {
        self.push(part);
        self
    }

    /// Append the result of `part` only when `condition` holds
    pub fn with_if<T, F>(mut self, condition: bool, part: F) -> Self
    where
        T: IntoActions<A>,
        F: FnOnce() -> T,
    {
        if condition {
            self.push(part());
        }
        self
    }

    /// Append one contribution per item, in iteration order
    pub fn with_each<I, T, F>(mut self, items: I, mut part: F) -> Self
    where
        I: IntoIterator,
        T: IntoActions<A>,
        F: FnMut(I::Item) -> T,
    {
        for item in items {
            self.push(part(item));
        }
        self
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, A> {
        self.actions.iter()
    }

    pub fn into_vec(self) -> Vec<A> {
        self.actions
    }
}

impl<A, T: IntoActions<A>> FromIterator<T> for ActionGroup<A> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut group = Self::new();
        group.extend(iter);
        group
    }
}

impl<A, T: IntoActions<A>> Extend<T> for ActionGroup<A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for part in iter {
            self.push(part);
        }
    }
}

impl<A> IntoIterator for ActionGroup<A> {
    type Item = A;
    type IntoIter = std::vec::IntoIter<A>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.into_iter()
    }
}

impl<'a, A> IntoIterator for &'a ActionGroup<A> {
    type Item = &'a A;
    type IntoIter = std::slice::Iter<'a, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.iter()
    }
}

/// Build an [`ActionGroup`] from a comma separated list of contributions
#[macro_export]
macro_rules! action_group {
    () => {
        $crate::ActionGroup::new()
    };
    ($($part:expr),+ $(,)?) => {{
        let mut group = $crate::ActionGroup::new();
        $(group.push($part);)+
        group
    }};
}
