//! Process-wide session refresh state.
//!
//! At most one refresh is in flight. The first caller to hit an expired
//! session gets a [`RefreshLease`] and performs the renewal; everyone else
//! arriving while it runs is queued as a waiter and settled, in arrival
//! order, with the leader's outcome. Dropping a lease without settling it
//! settles the waiters with [`RefreshError::Abandoned`], so no waiter is
//! ever left pending.

use crate::application_port::RefreshError;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

type Waiter = oneshot::Sender<Result<(), RefreshError>>;

#[derive(Default)]
struct PendingRefresh {
    refreshing: bool,
    waiters: VecDeque<Waiter>,
    generation: u64,
}

#[derive(Default)]
pub struct RefreshCoordinator {
    state: Mutex<PendingRefresh>,
}

pub enum RefreshTicket<'a> {
    Lead(RefreshLease<'a>),
    Wait(RefreshWait),
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the in-flight refresh, or start one if none is running.
    /// The flag is set before returning, so no second caller can also lead.
    pub fn begin(&self) -> RefreshTicket<'_> {
        let mut state = self.lock();
        if state.refreshing {
            let (tx, rx) = oneshot::channel();
            state.waiters.push_back(tx);
            tracing::debug!(waiters = state.waiters.len(), "refresh in flight, queued");
            RefreshTicket::Wait(RefreshWait { rx })
        } else {
            state.refreshing = true;
            RefreshTicket::Lead(RefreshLease {
                coordinator: self,
                generation: state.generation,
                settled: false,
            })
        }
    }

    pub fn is_refreshing(&self) -> bool {
        self.lock().refreshing
    }

    pub fn waiter_count(&self) -> usize {
        self.lock().waiters.len()
    }

    /// Session lifecycle reset (logout). Pending waiters are rejected with
    /// [`RefreshError::Reset`]; a lease from before the reset settles nothing.
    pub fn reset(&self) {
        let waiters = {
            let mut state = self.lock();
            state.refreshing = false;
            state.generation = state.generation.wrapping_add(1);
            std::mem::take(&mut state.waiters)
        };
        if !waiters.is_empty() {
            tracing::info!(waiters = waiters.len(), "refresh state reset");
        }
        for waiter in waiters {
            let _ = waiter.send(Err(RefreshError::Reset));
        }
    }

    /// Waiters of the refresh `generation`, in the order they were queued.
    fn drain(&self, generation: u64) -> Option<VecDeque<Waiter>> {
        let mut state = self.lock();
        if state.generation != generation {
            return None;
        }
        state.refreshing = false;
        Some(std::mem::take(&mut state.waiters))
    }

    fn settle(&self, generation: u64, outcome: Result<(), RefreshError>) {
        let Some(waiters) = self.drain(generation) else {
            return;
        };
        tracing::debug!(waiters = waiters.len(), ok = outcome.is_ok(), "refresh settled");
        for waiter in waiters {
            // a waiter whose caller went away has nothing to settle
            let _ = waiter.send(outcome.clone());
        }
    }

    fn lock(&self) -> MutexGuard<'_, PendingRefresh> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct RefreshLease<'a> {
    coordinator: &'a RefreshCoordinator,
    generation: u64,
    settled: bool,
}

impl RefreshLease<'_> {
    pub fn settle(mut self, outcome: Result<(), RefreshError>) {
        self.settled = true;
        self.coordinator.settle(self.generation, outcome);
    }
}

impl Drop for RefreshLease<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!("refresh lease dropped before settling");
            self.coordinator
                .settle(self.generation, Err(RefreshError::Abandoned));
        }
    }
}

pub struct RefreshWait {
    rx: oneshot::Receiver<Result<(), RefreshError>>,
}

impl RefreshWait {
    pub async fn outcome(self) -> Result<(), RefreshError> {
        self.rx.await.unwrap_or(Err(RefreshError::Abandoned))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(coordinator: &RefreshCoordinator) -> RefreshLease<'_> {
        match coordinator.begin() {
            RefreshTicket::Lead(lease) => lease,
            RefreshTicket::Wait(_) => panic!("expected to lead"),
        }
    }

    fn wait(coordinator: &RefreshCoordinator) -> RefreshWait {
        match coordinator.begin() {
            RefreshTicket::Wait(wait) => wait,
            RefreshTicket::Lead(_) => panic!("expected to wait"),
        }
    }

    #[tokio::test]
    async fn only_first_caller_leads() {
        let coordinator = RefreshCoordinator::new();
        let lease = lead(&coordinator);
        let first = wait(&coordinator);
        let second = wait(&coordinator);
        assert!(coordinator.is_refreshing());
        assert_eq!(coordinator.waiter_count(), 2);

        lease.settle(Ok(()));
        assert_eq!(first.outcome().await, Ok(()));
        assert_eq!(second.outcome().await, Ok(()));
        assert!(!coordinator.is_refreshing());
        assert_eq!(coordinator.waiter_count(), 0);
    }

    #[tokio::test]
    async fn failure_rejects_every_waiter() {
        let coordinator = RefreshCoordinator::new();
        let lease = lead(&coordinator);
        let waiters: Vec<_> = (0..3).map(|_| wait(&coordinator)).collect();
        let error = RefreshError::Rejected {
            status: 401,
            message: "refresh token expired".to_string(),
        };

        lease.settle(Err(error.clone()));
        for waiter in waiters {
            assert_eq!(waiter.outcome().await, Err(error.clone()));
        }
        assert!(!coordinator.is_refreshing());
    }

    #[tokio::test]
    async fn dropped_lease_abandons_waiters() {
        let coordinator = RefreshCoordinator::new();
        let lease = lead(&coordinator);
        let waiter = wait(&coordinator);
        drop(lease);
        assert_eq!(waiter.outcome().await, Err(RefreshError::Abandoned));
        assert!(!coordinator.is_refreshing());
    }

    #[tokio::test]
    async fn reset_rejects_waiters_and_ignores_stale_lease() {
        let coordinator = RefreshCoordinator::new();
        let stale = lead(&coordinator);
        let waiter = wait(&coordinator);

        coordinator.reset();
        assert_eq!(waiter.outcome().await, Err(RefreshError::Reset));

        let fresh = lead(&coordinator);
        let next_waiter = wait(&coordinator);
        stale.settle(Err(RefreshError::Abandoned));
        assert!(coordinator.is_refreshing());
        assert_eq!(coordinator.waiter_count(), 1);

        fresh.settle(Ok(()));
        assert_eq!(next_waiter.outcome().await, Ok(()));
    }

    #[tokio::test]
    async fn waiters_are_settled_in_queue_order() {
        let coordinator = RefreshCoordinator::new();
        let lease = lead(&coordinator);
        // every second caller gives up, which closes its sender
        let mut kept = Vec::new();
        for i in 0..4 {
            let waiter = wait(&coordinator);
            if i % 2 == 0 {
                kept.push(waiter);
            }
        }

        let drained = coordinator.drain(lease.generation).unwrap();
        let closed: Vec<bool> = drained.iter().map(|tx| tx.is_closed()).collect();
        assert_eq!(closed, vec![false, true, false, true]);
        assert!(!coordinator.is_refreshing());
        lease.settle(Ok(()));
    }
}
