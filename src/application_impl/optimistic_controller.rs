//! Optimistic toggle for one displayed entity.
//!
//! `toggle` applies the change to the visible state at once and fires the
//! matching mutation in the background. A failed mutation is compensated by
//! undoing that one transition against whatever the state is by then; a
//! success leaves the optimistic state in place until the next
//! authoritative read is fed in through `reconcile`.

use crate::application_port::{ApiError, ToggleMutations};
use crate::domain_model::{EntityRef, InteractionKind, InteractionState, MutationKind, Transition};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ToggleOutcome {
    Confirmed,
    Reverted { error: ApiError },
    /// The mutation failed after the controller was dropped; nothing to undo.
    Detached,
}

pub struct PendingToggle {
    pub state: InteractionState,
    pub transition: Transition,
    handle: JoinHandle<ToggleOutcome>,
}

impl PendingToggle {
    pub async fn settle(self) -> ToggleOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("toggle mutation task failed: {e}");
                ToggleOutcome::Detached
            }
        }
    }
}

pub struct OptimisticController {
    target: EntityRef,
    kind: InteractionKind,
    state: Arc<watch::Sender<InteractionState>>,
    mutations: Arc<dyn ToggleMutations>,
    pending: Arc<AtomicUsize>,
    version: Arc<AtomicU64>,
}

impl OptimisticController {
    pub fn new(
        target: EntityRef,
        kind: InteractionKind,
        initial: InteractionState,
        mutations: Arc<dyn ToggleMutations>,
    ) -> Self {
        let (state, _) = watch::channel(initial);
        Self {
            target,
            kind,
            state: Arc::new(state),
            mutations,
            pending: Arc::new(AtomicUsize::new(0)),
            version: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn target(&self) -> &EntityRef {
        &self.target
    }

    pub fn kind(&self) -> InteractionKind {
        self.kind
    }

    pub fn state(&self) -> InteractionState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<InteractionState> {
        self.state.subscribe()
    }

    /// True while a toggle's mutation has not come back yet.
    pub fn has_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire) > 0
    }

    /// Bumped by every local change (toggle or revert).
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Like `reconcile`, but only if nothing changed locally since `version`
    /// was read. Returns whether the server state was applied.
    pub fn reconcile_if(&self, version: u64, authoritative: InteractionState) -> bool {
        let mut applied = false;
        let mut previous = authoritative;
        self.state.send_if_modified(|state| {
            if self.version.load(Ordering::Acquire) != version {
                return false;
            }
            applied = true;
            previous = *state;
            *state = authoritative;
            previous != authoritative
        });
        if applied && previous != authoritative {
            tracing::debug!(entity = %self.target, kind = %self.kind, ?previous, ?authoritative, "reconciled");
        } else if !applied {
            tracing::debug!(entity = %self.target, kind = %self.kind, "local change since read, kept");
        }
        applied
    }

    /// Overwrite local state with server truth.
    pub fn reconcile(&self, authoritative: InteractionState) {
        let previous = self.state.send_replace(authoritative);
        if previous != authoritative {
            tracing::debug!(entity = %self.target, kind = %self.kind, ?previous, ?authoritative, "reconciled");
        }
    }

    /// Must be called inside a tokio runtime; the mutation runs as a task.
    pub fn toggle(&self) -> PendingToggle {
        let mut applied = self.state.borrow().toggle();
        self.state.send_modify(|state| {
            applied = state.toggle();
            *state = applied.0;
            self.version.fetch_add(1, Ordering::AcqRel);
        });
        let (state, transition) = applied;

        let mutation = MutationKind::for_toggle(self.kind, transition.direction);
        tracing::debug!(entity = %self.target, %mutation, ?state, "optimistic toggle");

        let weak_state = Arc::downgrade(&self.state);
        let mutations = self.mutations.clone();
        let target = self.target.clone();
        let pending = self.pending.clone();
        let version = self.version.clone();
        pending.fetch_add(1, Ordering::AcqRel);
        let handle = tokio::spawn(async move {
            let outcome = match mutations.apply(&target, transition.direction).await {
                Ok(()) => ToggleOutcome::Confirmed,
                Err(error) => match weak_state.upgrade() {
                    Some(state) => {
                        state.send_modify(|s| {
                            *s = s.compensate(&transition);
                            version.fetch_add(1, Ordering::AcqRel);
                        });
                        tracing::warn!(entity = %target, %mutation, %error, "mutation failed, reverted");
                        ToggleOutcome::Reverted { error }
                    }
                    None => {
                        tracing::debug!(entity = %target, %mutation, %error, "mutation failed after view closed");
                        ToggleOutcome::Detached
                    }
                },
            };
            pending.fetch_sub(1, Ordering::AcqRel);
            outcome
        });

        PendingToggle {
            state,
            transition,
            handle,
        }
    }
}
