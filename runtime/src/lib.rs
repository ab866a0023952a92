//! # Wave Sport Hub Runtime
//!
//! The Store runtime that coordinates reducer execution and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: owns the state, runs the reducer, executes effects
//! - **Feedback loop**: actions produced by effects are dispatched back into
//!   the reducer before `send` returns
//! - **Subscriptions**: views observe state snapshots (`subscribe_state`) and
//!   effect-produced actions (`subscribe_actions`)
//!
//! The store is cooperative: effects are awaited inline by the caller of
//! [`Store::send`] and nothing is spawned. A booking view therefore sees the
//! availability check and the submission finish before its `send` resolves.
//!
//! ## Example
//!
//! ```ignore
//! use wavehub_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action
//! store.send(Action::DoSomething).await?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//! ```

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Effects kept producing actions past the configured limit
        ///
        /// The remaining queued actions are dropped; the state reflects every
        /// action reduced before the limit was hit.
        #[error("Effect feedback exceeded {0} chained actions")]
        FeedbackLimitExceeded(usize),
    }
}

/// Store module - the runtime for reducers
pub mod store {
    use crate::error::StoreError;
    use std::collections::VecDeque;
    use tokio::sync::{RwLock, broadcast, watch};
    use wavehub_core::{SmallVec, effect::Effect, reducer::Reducer};

    /// Default maximum number of actions one `send` may chain through effects
    pub const DEFAULT_FEEDBACK_LIMIT: usize = 64;

    /// The Store - runtime coordinator for a reducer
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: RwLock<S>,
        reducer: R,
        environment: E,
        feedback_limit: usize,
        /// Actions produced by effects, for observers
        action_broadcast: broadcast::Sender<A>,
        /// Latest state snapshot, republished after every reduction
        state_watch: watch::Sender<S>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
        S: Clone,
        A: Clone + Send + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            let (action_broadcast, _) = broadcast::channel(16);
            let (state_watch, _) = watch::channel(initial_state.clone());

            Self {
                state: RwLock::new(initial_state),
                reducer,
                environment,
                feedback_limit: DEFAULT_FEEDBACK_LIMIT,
                action_broadcast,
                state_watch,
            }
        }

        /// Override the maximum number of chained actions per `send`
        #[must_use]
        pub fn with_feedback_limit(mut self, limit: usize) -> Self {
            self.feedback_limit = limit;
            self
        }

        /// Send an action to the store
        ///
        /// Reduces the action, then awaits every effect the reducer returned.
        /// Actions produced by effects are broadcast and reduced in turn,
        /// until no effect produces anything further.
        ///
        /// State subscribers are notified after each reduction, before the
        /// effects of that reduction start.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::FeedbackLimitExceeded`] when effects chain
        /// more actions than the configured limit.
        ///
        /// # Panics
        ///
        /// If the reducer panics, the panic propagates to the caller.
        #[tracing::instrument(skip_all, name = "store_send")]
        pub async fn send(&self, action: A) -> Result<(), StoreError> {
            let mut pending = VecDeque::from([action]);
            let mut dispatched = 0usize;

            while let Some(action) = pending.pop_front() {
                dispatched += 1;
                if dispatched > self.feedback_limit {
                    tracing::error!(
                        limit = self.feedback_limit,
                        dropped = pending.len() + 1,
                        "Effect feedback limit exceeded"
                    );
                    return Err(StoreError::FeedbackLimitExceeded(self.feedback_limit));
                }

                let effects = self.reduce(action).await;

                for effect in effects {
                    metrics::counter!("store.effects.executed", "type" => effect.kind())
                        .increment(1);
                    if let Some(produced) = run_effect(effect).await {
                        tracing::trace!("Effect produced an action, dispatching");
                        // No receivers is fine
                        let _ = self.action_broadcast.send(produced.clone());
                        pending.push_back(produced);
                    }
                }
            }

            Ok(())
        }

        async fn reduce(&self, action: A) -> SmallVec<[Effect<A>; 4]> {
            let mut state = self.state.write().await;
            let effects = self.reducer.reduce(&mut *state, action, &self.environment);
            self.state_watch.send_replace(state.clone());
            metrics::counter!("store.actions.processed").increment(1);
            effects
        }

        /// Read the current state through a closure
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Subscribe to actions produced by effects
        ///
        /// Only feedback actions are broadcast, not the ones passed to `send`.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Subscribe to state snapshots
        ///
        /// The receiver starts at the latest snapshot and is marked changed
        /// after every reduction.
        #[must_use]
        pub fn subscribe_state(&self) -> watch::Receiver<S> {
            self.state_watch.subscribe()
        }

        /// Access the injected environment
        #[must_use]
        pub const fn environment(&self) -> &E {
            &self.environment
        }
    }

    /// Execute one effect, returning the action it produced, if any
    async fn run_effect<A>(effect: Effect<A>) -> Option<A> {
        match effect {
            Effect::None => None,
            Effect::Future(fut) => fut.await,
        }
    }
}

// Re-export for convenience
pub use error::StoreError;
pub use store::Store;
