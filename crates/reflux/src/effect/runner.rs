//! EffectRunner - drives effects through the task registry
//!
//! Replaces ad-hoc `tokio::spawn` calls in middlewares: every spawned unit is
//! registered under a cancellation key and reports back through the store.

use super::{Effect, TaskRegistry};
use crate::action::{Action, SystemAction};
use crate::cancel_key::CancelKey;
use crate::dispatcher::Dispatcher;
use tokio::runtime::Handle;

/// Runs effects for one middleware and dispatches their outcome
///
/// Policy per key is single-flight: starting an effect under a key that is
/// still running is dropped. Callers that want restart semantics cancel first.
pub struct EffectRunner<A> {
    dispatcher: Dispatcher<A>,
    registry: TaskRegistry,
}

impl<A> Clone for EffectRunner<A> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: self.dispatcher.clone(),
            registry: self.registry.clone(),
        }
    }
}

impl<A: Action> EffectRunner<A> {
    pub fn new(dispatcher: Dispatcher<A>) -> Self {
        Self {
            dispatcher,
            registry: TaskRegistry::new(),
        }
    }

    /// Start `effect` under `key`, dispatching its action when it resolves
    ///
    /// Returns `false` when the key is already taken and nothing was started.
    pub fn execute(&self, effect: Effect<A>, key: impl Into<CancelKey>) -> bool {
        self.execute_map(effect, key, |action| action)
    }

    /// Start `effect` under `key`, passing its value through `map` before dispatch
    ///
    /// Returns `false` without registering anything when called outside a
    /// tokio runtime.
    pub fn execute_map<T, F>(&self, effect: Effect<T>, key: impl Into<CancelKey>, map: F) -> bool
    where
        T: Send + 'static,
        F: FnOnce(T) -> A + Send + 'static,
    {
        let key = key.into();
        let id = effect.id();

        let Ok(handle) = Handle::try_current() else {
            log::warn!("EffectRunner: no tokio runtime, dropping {} under {:?}", id, key);
            return false;
        };

        let Some(flag) = self.registry.register(&key, id) else {
            log::debug!("EffectRunner: {:?} is already running, dropping {}", key, id);
            return false;
        };
        log::debug!("EffectRunner: starting {} under {:?}", id, key);

        let registry = self.registry.clone();
        let dispatcher = self.dispatcher.clone();
        let work = effect.start(flag.clone());

        handle.spawn(async move {
            let outcome = tokio::select! {
                biased;
                _ = flag.cancelled() => None,
                result = work => Some(result),
            };

            registry.complete(&key, id);

            // A raised flag wins over whatever the work produced.
            let action = match outcome {
                Some(Ok(value)) if !flag.is_cancelled() => map(value),
                Some(Err(error)) if !flag.is_cancelled() => {
                    log::warn!("EffectRunner: {} failed: {:#}", id, error);
                    A::from(SystemAction::Error {
                        error: format!("{:#}", error),
                        id,
                    })
                }
                _ => {
                    log::debug!("EffectRunner: {} cancelled under {:?}", id, key);
                    A::from(SystemAction::DidCancelEffect { key })
                }
            };

            dispatcher.dispatch(action);
        });

        true
    }

    /// Cancel the effect running under `key`
    ///
    /// The key is released immediately; the cancelled effect still reports
    /// `DidCancelEffect` once it stops.
    pub fn cancel(&self, key: impl Into<CancelKey>) -> bool {
        let key = key.into();
        let cancelled = self.registry.cancel(&key);
        if cancelled {
            log::debug!("EffectRunner: cancel requested for {:?}", key);
        }
        cancelled
    }

    /// Cancel every running effect
    pub fn cancel_all(&self) -> usize {
        let count = self.registry.cancel_all();
        if count > 0 {
            log::debug!("EffectRunner: cancelled {} effect(s)", count);
        }
        count
    }

    pub fn is_running(&self, key: impl Into<CancelKey>) -> bool {
        self.registry.contains(&key.into())
    }

    pub fn running_count(&self) -> usize {
        self.registry.len()
    }

    pub fn dispatcher(&self) -> &Dispatcher<A> {
        &self.dispatcher
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::test_support::Probe;
    use crate::effect::CancellationFlag;
    use std::time::Duration;
    use tokio::sync::oneshot;

    #[derive(Debug, Clone, PartialEq)]
    enum TestAction {
        Loaded(u32),
        System(SystemAction),
    }

    impl From<SystemAction> for TestAction {
        fn from(action: SystemAction) -> Self {
            TestAction::System(action)
        }
    }

    impl Action for TestAction {}

    #[test]
    fn test_no_runtime_leaves_key_free() {
        let probe = Probe::<TestAction>::new();
        let runner = EffectRunner::new(probe.dispatcher.clone());

        assert!(!runner.execute(Effect::ready(TestAction::Loaded(1)), "load"));
        assert!(!runner.is_running("load"));
        assert_eq!(runner.running_count(), 0);
    }

    #[tokio::test]
    async fn test_success_dispatches_result() {
        let mut probe = Probe::new();
        let runner = EffectRunner::new(probe.dispatcher.clone());

        assert!(runner.execute(Effect::ready(TestAction::Loaded(1)), "load"));

        assert_eq!(probe.next().await, Some(TestAction::Loaded(1)));
        assert!(!runner.is_running("load"));
    }

    #[tokio::test]
    async fn test_map_transforms_result() {
        let mut probe = Probe::new();
        let runner = EffectRunner::new(probe.dispatcher.clone());

        runner.execute_map(Effect::ready(20u32), "load", |n| TestAction::Loaded(n + 1));

        assert_eq!(probe.next().await, Some(TestAction::Loaded(21)));
    }

    #[tokio::test]
    async fn test_single_flight_drops_second_start() {
        let mut probe = Probe::new();
        let runner = EffectRunner::new(probe.dispatcher.clone());
        let (release, gate) = oneshot::channel::<()>();

        let first = Effect::new(async move {
            gate.await?;
            Ok::<_, anyhow::Error>(TestAction::Loaded(1))
        });
        let second = Effect::ready(TestAction::Loaded(2));

        assert!(runner.execute(first, "load"));
        assert!(!runner.execute(second, "load"));
        assert_eq!(runner.running_count(), 1);

        release.send(()).unwrap();

        assert_eq!(probe.next().await, Some(TestAction::Loaded(1)));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(probe.drain().is_empty());
    }

    #[tokio::test]
    async fn test_failure_dispatches_error_with_effect_id() {
        let mut probe = Probe::new();
        let runner = EffectRunner::new(probe.dispatcher.clone());
        let effect: Effect<TestAction> =
            Effect::new(async { anyhow::bail!("backend unavailable") });
        let id = effect.id();

        runner.execute(effect, "load");

        match probe.next().await {
            Some(TestAction::System(SystemAction::Error { error, id: failed })) => {
                assert_eq!(failed, id);
                assert!(error.contains("backend unavailable"));
            }
            other => panic!("expected error action, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancellation_wins_over_error() {
        let mut probe = Probe::new();
        let runner = EffectRunner::new(probe.dispatcher.clone());
        let (started_tx, started) = oneshot::channel::<()>();

        // Fails as soon as it notices the cancel signal.
        let effect = Effect::cancellable(move |flag: CancellationFlag| async move {
            let _ = started_tx.send(());
            while !flag.is_cancelled() {
                tokio::task::yield_now().await;
            }
            anyhow::bail!("interrupted")
        });

        runner.execute(effect, "load");
        started.await.unwrap();
        assert!(runner.cancel("load"));
        assert!(!runner.is_running("load"));

        assert_eq!(
            probe.next().await,
            Some(TestAction::System(SystemAction::DidCancelEffect {
                key: CancelKey::from("load")
            }))
        );
    }

    #[tokio::test]
    async fn test_cancel_stops_pending_work() {
        let mut probe = Probe::new();
        let runner = EffectRunner::new(probe.dispatcher.clone());

        runner.execute(
            Effect::new(async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(TestAction::Loaded(1))
            }),
            "slow",
        );
        assert!(runner.cancel("slow"));
        assert!(!runner.cancel("slow"));

        let action = tokio::time::timeout(Duration::from_secs(1), probe.next())
            .await
            .expect("cancelled effect should report promptly");
        assert_eq!(
            action,
            Some(TestAction::System(SystemAction::DidCancelEffect {
                key: CancelKey::from("slow")
            }))
        );
    }

    #[tokio::test]
    async fn test_key_reusable_after_cancel() {
        let mut probe = Probe::new();
        let runner = EffectRunner::new(probe.dispatcher.clone());

        runner.execute(
            Effect::new(async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(TestAction::Loaded(1))
            }),
            "feed",
        );
        runner.cancel("feed");
        assert!(runner.execute(Effect::ready(TestAction::Loaded(2)), "feed"));

        let mut seen = vec![probe.next().await.unwrap(), probe.next().await.unwrap()];
        seen.sort_by_key(|action| matches!(action, TestAction::Loaded(_)));
        assert_eq!(
            seen,
            vec![
                TestAction::System(SystemAction::DidCancelEffect {
                    key: CancelKey::from("feed")
                }),
                TestAction::Loaded(2),
            ]
        );
    }

    #[tokio::test]
    async fn test_cancel_all() {
        let mut probe = Probe::new();
        let runner = EffectRunner::new(probe.dispatcher.clone());

        for key in 0..3u32 {
            runner.execute(
                Effect::new(async {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(TestAction::Loaded(0))
                }),
                key,
            );
        }

        assert_eq!(runner.cancel_all(), 3);
        for _ in 0..3 {
            assert!(matches!(
                probe.next().await,
                Some(TestAction::System(SystemAction::DidCancelEffect { .. }))
            ));
        }
    }
}
