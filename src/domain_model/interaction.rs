//! Toggle state for likes and bookmarks.
//!
//! `count` is unsigned, so it cannot go negative; a decrement from zero is
//! clamped and recorded in the [`Transition`] so that compensation undoes
//! exactly what was applied.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Like,
    Bookmark,
}

impl InteractionKind {
    /// Path segment of the toggle endpoint.
    pub fn segment(&self) -> &'static str {
        match self {
            InteractionKind::Like => "like",
            InteractionKind::Bookmark => "bookmark",
        }
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ToggleDirection {
    Activate,
    Deactivate,
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct InteractionState {
    pub active: bool,
    pub count: u32,
}

/// What a single toggle changed. `delta` is the change actually applied to
/// `count`: `+1`, `-1`, or `0` when the change was clamped at either end.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Transition {
    pub direction: ToggleDirection,
    pub prior_active: bool,
    pub delta: i8,
}

impl InteractionState {
    pub fn new(active: bool, count: u32) -> Self {
        Self { active, count }
    }

    pub fn toggle(self) -> (InteractionState, Transition) {
        if self.active {
            let delta = if self.count > 0 { -1 } else { 0 };
            let next = InteractionState {
                active: false,
                count: self.count.saturating_sub(1),
            };
            (
                next,
                Transition {
                    direction: ToggleDirection::Deactivate,
                    prior_active: true,
                    delta,
                },
            )
        } else {
            let delta = if self.count < u32::MAX { 1 } else { 0 };
            let next = InteractionState {
                active: true,
                count: self.count.saturating_add(1),
            };
            (
                next,
                Transition {
                    direction: ToggleDirection::Activate,
                    prior_active: false,
                    delta,
                },
            )
        }
    }

    /// Undo one transition against the current state. Only that
    /// transition's own delta is reverted, so concurrent toggles keep theirs.
    pub fn compensate(self, transition: &Transition) -> InteractionState {
        let count = match transition.delta {
            d if d > 0 => self.count.saturating_sub(d as u32),
            d if d < 0 => self.count.saturating_add(d.unsigned_abs() as u32),
            _ => self.count,
        };
        InteractionState {
            active: transition.prior_active,
            count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn toggle_inactive_increments() {
        let (next, transition) = InteractionState::new(false, 5).toggle();
        assert_eq!(next, InteractionState::new(true, 6));
        assert_eq!(transition.direction, ToggleDirection::Activate);
        assert_eq!(transition.delta, 1);
    }

    #[test]
    fn toggle_active_decrements() {
        let (next, transition) = InteractionState::new(true, 3).toggle();
        assert_eq!(next, InteractionState::new(false, 2));
        assert_eq!(transition.direction, ToggleDirection::Deactivate);
        assert_eq!(transition.delta, -1);
    }

    #[test]
    fn decrement_clamps_at_zero_and_compensates_to_zero() {
        let before = InteractionState::new(true, 0);
        let (next, transition) = before.toggle();
        assert_eq!(next, InteractionState::new(false, 0));
        assert_eq!(transition.delta, 0);
        assert_eq!(next.compensate(&transition), before);
    }

    #[test]
    fn failed_like_reverts_to_prior_state() {
        let before = InteractionState::new(false, 5);
        let (optimistic, transition) = before.toggle();
        assert_eq!(optimistic, InteractionState::new(true, 6));
        assert_eq!(optimistic.compensate(&transition), before);
    }

    #[test]
    fn increment_clamps_at_max_and_compensates_to_max() {
        let before = InteractionState::new(false, u32::MAX);
        let (next, transition) = before.toggle();
        assert_eq!(next, InteractionState::new(true, u32::MAX));
        assert_eq!(transition.delta, 0);
        assert_eq!(next.compensate(&transition), before);
    }

    proptest! {
        #[test]
        fn apply_then_compensate_is_identity(active in any::<bool>(), count in any::<u32>()) {
            let before = InteractionState::new(active, count);
            let (after, transition) = before.toggle();
            prop_assert_eq!(after.compensate(&transition), before);
        }

        #[test]
        fn toggle_sequences_keep_count_consistent(
            start in 0u32..50,
            steps in proptest::collection::vec(any::<bool>(), 0..64),
        ) {
            // each step toggles, and `true` means the mutation failed
            let mut state = InteractionState::new(false, start);
            for failed in steps {
                let (next, transition) = state.toggle();
                state = if failed { next.compensate(&transition) } else { next };
                prop_assert_eq!(state.count, start + state.active as u32);
            }
        }
    }
}
