//! Store - actor-isolated owner of the application state
//!
//! ```text
//! Store / Dispatcher ──Envelope──► actor ──reduce──► new state
//!                                    │                  │
//!                         Control ──►│        watch + broadcast ──► observers
//!                                    │                  │
//!                                    │             post_reduce, hooks
//!                                    ▼                  │
//!                              middlewares ◄────────────┘
//! ```
//!
//! One spawned task owns the state, the middlewares and the hooks. Actions
//! arrive on a FIFO channel and are applied strictly one at a time, so no
//! two reductions ever overlap. Control requests (subscriptions, hooks,
//! logger changes, shutdown) travel on a separate channel the actor checks
//! first between envelopes.

use crate::action::{Action, Priority};
use crate::action_group::ActionGroup;
use crate::dispatcher::{Dispatcher, Envelope};
use crate::error::StoreError;
use crate::hook::{Hook, HookId, HookSet};
use crate::logger::{ActionLogger, LogFilter, LoggingSink};
use crate::middleware::{FromStore, Middleware, MiddlewareStatus};
use crate::state::StoreState;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};

/// Publications buffered per observer before the slowest one starts lagging
const OBSERVER_CAPACITY: usize = 256;

/// One applied action and the state it produced
pub struct Published<S: StoreState> {
    pub state: Arc<S>,
    pub action: S::Action,
}

impl<S: StoreState> Clone for Published<S> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            action: self.action.clone(),
        }
    }
}

impl<S: StoreState + std::fmt::Debug> std::fmt::Debug for Published<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Published")
            .field("state", &self.state)
            .field("action", &self.action)
            .finish()
    }
}

enum Control<S: StoreState> {
    Subscribe(Vec<Box<dyn Middleware<S>>>, oneshot::Sender<()>),
    AddHook(Hook<S>, oneshot::Sender<bool>),
    RemoveHook(HookId, oneshot::Sender<bool>),
    SetLogger(Option<LoggingSink<S::Action>>),
    Shutdown(oneshot::Sender<()>),
}

/// Cloneable handle to a running store
///
/// The actor stops once every handle is dropped or [`Store::shutdown`] is
/// called. [`Dispatcher`]s do not keep it alive.
pub struct Store<S: StoreState> {
    actions: mpsc::UnboundedSender<Envelope<S::Action>>,
    control: mpsc::UnboundedSender<Control<S>>,
    state: watch::Receiver<Arc<S>>,
    events: broadcast::Sender<Published<S>>,
}

impl<S: StoreState> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            actions: self.actions.clone(),
            control: self.control.clone(),
            state: self.state.clone(),
            events: self.events.clone(),
        }
    }
}

impl<S: StoreState> Store<S> {
    /// Spawn the actor on the current tokio runtime
    pub fn new(initial_state: S) -> Self {
        let (actions_tx, actions_rx) = mpsc::unbounded_channel();
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let initial = Arc::new(initial_state);
        let (state_tx, state_rx) = watch::channel(Arc::clone(&initial));
        let (events_tx, _) = broadcast::channel(OBSERVER_CAPACITY);

        let actor = StoreActor {
            state: initial,
            middlewares: Vec::new(),
            hooks: HookSet::new(),
            logger: None,
            dispatcher: Dispatcher::new(&actions_tx),
            state_tx,
            events: events_tx.clone(),
        };
        tokio::spawn(actor.run(actions_rx, control_rx));
        log::debug!("Store: actor started");

        Self {
            actions: actions_tx,
            control: control_tx,
            state: state_rx,
            events: events_tx,
        }
    }

    /// Enqueue an action with its default priority
    ///
    /// Returns `false` if the store has stopped.
    pub fn dispatch(&self, action: S::Action) -> bool {
        let priority = action.priority();
        self.send(Envelope::single(action, priority))
    }

    /// Enqueue an action with an explicit priority hint
    ///
    /// Priority is carried for logging only; the queue stays FIFO.
    pub fn dispatch_with_priority(&self, action: S::Action, priority: Priority) -> bool {
        self.send(Envelope::single(action, priority))
    }

    /// Enqueue an action and wait until it has been applied and published
    pub async fn dispatch_and_wait(&self, action: S::Action) -> Result<(), StoreError> {
        let priority = action.priority();
        let (ack_tx, ack_rx) = oneshot::channel();
        let mut envelope = Envelope::single(action, priority);
        envelope.ack = Some(ack_tx);

        if !self.send(envelope) {
            return Err(StoreError::Closed);
        }
        ack_rx.await.map_err(|_| StoreError::Dropped("dispatch"))
    }

    /// Apply a group of actions back to back, with nothing interleaved
    pub fn dispatch_group(&self, group: ActionGroup<S::Action>) -> bool {
        if group.is_empty() {
            return true;
        }
        self.send(Envelope::batch(group.into_vec()))
    }

    /// Register a middleware; resolves once it will see the next action
    pub async fn subscribe<M: Middleware<S>>(&self, middleware: M) -> Result<(), StoreError> {
        let boxed: Box<dyn Middleware<S>> = Box::new(middleware);
        self.subscribe_all(vec![boxed]).await
    }

    /// Register several middlewares in order
    pub async fn subscribe_all(
        &self,
        middlewares: Vec<Box<dyn Middleware<S>>>,
    ) -> Result<(), StoreError> {
        let (tx, rx) = oneshot::channel();
        self.request(Control::Subscribe(middlewares, tx), rx, "subscribe").await
    }

    /// Build a middleware from this store's dispatcher and `environment`, then register it
    pub async fn subscribe_with<M: FromStore<S>>(
        &self,
        environment: M::Environment,
    ) -> Result<(), StoreError> {
        let middleware = M::from_store(self.dispatcher(), environment);
        self.subscribe(middleware).await
    }

    /// Arm a hook; returns `true` if it replaced one with the same id
    pub async fn add_hook(&self, hook: Hook<S>) -> Result<bool, StoreError> {
        let (tx, rx) = oneshot::channel();
        self.request(Control::AddHook(hook, tx), rx, "add_hook").await
    }

    /// Disarm a hook; returns `true` if it was still armed
    pub async fn remove_hook(&self, id: impl Into<HookId>) -> Result<bool, StoreError> {
        let (tx, rx) = oneshot::channel();
        self.request(Control::RemoveHook(id.into(), tx), rx, "remove_hook").await
    }

    /// Install the action logging sink, replacing any previous one
    ///
    /// An action reaches `logger` only if every filter allows it.
    pub fn set_logger<L>(&self, logger: L, filters: Vec<LogFilter<S::Action>>) -> bool
    where
        L: ActionLogger<S::Action>,
    {
        let sink = LoggingSink::new(Box::new(logger), filters);
        self.control.send(Control::SetLogger(Some(sink))).is_ok()
    }

    pub fn clear_logger(&self) -> bool {
        self.control.send(Control::SetLogger(None)).is_ok()
    }

    /// The latest published state
    pub fn state(&self) -> Arc<S> {
        Arc::clone(&self.state.borrow())
    }

    /// A receiver that is notified whenever a new state is published
    pub fn watch(&self) -> watch::Receiver<Arc<S>> {
        self.state.clone()
    }

    /// Every `(state, action)` publication from now on
    pub fn observe(&self) -> broadcast::Receiver<Published<S>> {
        self.events.subscribe()
    }

    /// Non-owning handle for middlewares and effects
    pub fn dispatcher(&self) -> Dispatcher<S::Action> {
        Dispatcher::new(&self.actions)
    }

    pub fn is_running(&self) -> bool {
        !self.actions.is_closed()
    }

    /// Apply every action accepted so far, then stop the actor
    ///
    /// Middlewares are dropped when the actor exits.
    pub async fn shutdown(&self) -> Result<(), StoreError> {
        let (tx, rx) = oneshot::channel();
        self.request(Control::Shutdown(tx), rx, "shutdown").await
    }

    fn send(&self, envelope: Envelope<S::Action>) -> bool {
        if let Err(e) = self.actions.send(envelope) {
            log::error!("Store: dispatch of {} action(s) failed: store closed", e.0.actions.len());
            return false;
        }
        true
    }

    async fn request<T>(
        &self,
        command: Control<S>,
        rx: oneshot::Receiver<T>,
        what: &'static str,
    ) -> Result<T, StoreError> {
        if self.control.send(command).is_err() {
            return Err(StoreError::Closed);
        }
        rx.await.map_err(|_| StoreError::Dropped(what))
    }
}

struct StoreActor<S: StoreState> {
    state: Arc<S>,
    middlewares: Vec<Box<dyn Middleware<S>>>,
    hooks: HookSet<S>,
    logger: Option<LoggingSink<S::Action>>,
    dispatcher: Dispatcher<S::Action>,
    state_tx: watch::Sender<Arc<S>>,
    events: broadcast::Sender<Published<S>>,
}

impl<S: StoreState> StoreActor<S> {
    async fn run(
        mut self,
        mut actions: mpsc::UnboundedReceiver<Envelope<S::Action>>,
        mut control: mpsc::UnboundedReceiver<Control<S>>,
    ) {
        let mut shutdown_ack = None;
        loop {
            tokio::select! {
                biased;

                command = control.recv() => match command {
                    Some(Control::Shutdown(ack)) => {
                        self.drain(&mut actions);
                        shutdown_ack = Some(ack);
                        break;
                    }
                    Some(command) => self.handle_control(command),
                    None => {
                        self.drain(&mut actions);
                        break;
                    }
                },
                envelope = actions.recv() => match envelope {
                    Some(envelope) => self.process(envelope),
                    None => break,
                },
            }
        }
        log::debug!(
            "Store: actor stopped ({} middleware(s), {} hook(s) dropped)",
            self.middlewares.len(),
            self.hooks.len()
        );

        // Release middlewares and close the queue before acknowledging
        drop(self);
        drop(actions);
        drop(control);
        if let Some(ack) = shutdown_ack {
            let _ = ack.send(());
        }
    }

    fn handle_control(&mut self, command: Control<S>) {
        match command {
            Control::Subscribe(middlewares, ack) => {
                for middleware in middlewares {
                    log::debug!("Store: subscribed {}", middleware.name());
                    self.middlewares.push(middleware);
                }
                let _ = ack.send(());
            }
            Control::AddHook(hook, ack) => {
                let replaced = self.hooks.add(hook);
                let _ = ack.send(replaced);
            }
            Control::RemoveHook(id, ack) => {
                let removed = self.hooks.remove(&id);
                let _ = ack.send(removed);
            }
            Control::SetLogger(sink) => {
                let change = if sink.is_some() { "installed" } else { "removed" };
                log::debug!("Store: action logger {}", change);
                self.logger = sink;
            }
            Control::Shutdown(ack) => {
                let _ = ack.send(());
            }
        }
    }

    /// Apply everything already queued, including follow-ups dispatched while draining
    fn drain(&mut self, actions: &mut mpsc::UnboundedReceiver<Envelope<S::Action>>) {
        let mut drained = 0;
        while let Ok(envelope) = actions.try_recv() {
            drained += envelope.actions.len();
            self.process(envelope);
        }
        log::debug!("Store: drained {} action(s) before stopping", drained);
    }

    fn process(&mut self, envelope: Envelope<S::Action>) {
        let Envelope {
            actions,
            priority,
            ack,
        } = envelope;
        for action in actions {
            self.apply(action, priority);
        }
        if let Some(ack) = ack {
            let _ = ack.send(());
        }
    }

    fn apply(&mut self, action: S::Action, priority: Priority) {
        log::trace!("Store: applying action ({} priority)", priority);

        let mut next = S::clone(&self.state);
        next.reduce(&action);

        if let Some(logger) = self.logger.as_mut() {
            logger.record(&action);
        }

        let next = Arc::new(next);
        self.state = Arc::clone(&next);
        self.state_tx.send_replace(Arc::clone(&next));
        // No observers is fine
        let _ = self.events.send(Published {
            state: Arc::clone(&next),
            action: action.clone(),
        });

        next.post_reduce(&action);
        self.hooks.evaluate(&next, &self.dispatcher);

        for middleware in self.middlewares.iter_mut() {
            match middleware.status(&next) {
                MiddlewareStatus::Active => middleware.reduce(&action, &next),
                MiddlewareStatus::Suspended => {
                    log::trace!("Store: {} suspended, skipping action", middleware.name());
                }
            }
        }
    }
}
