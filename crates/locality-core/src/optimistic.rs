//! Optimistic like/unlike toggling as a pure reducer.
//!
//! The UI flips the like immediately ([`ToggleAction::Toggle`]), then settles it
//! once the backend answers: [`ToggleAction::Confirm`] keeps the new value and
//! [`ToggleAction::Fail`] restores the snapshot taken before the flip.

use serde::{Deserialize, Serialize};

/// The part of the state that is rolled back on failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeSnapshot {
    pub liked: bool,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum TogglePhase {
    Idle,
    /// A request is in flight; `previous` is restored if it fails.
    Pending { previous: LikeSnapshot },
    Committed,
    RolledBack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeState {
    pub liked: bool,
    pub count: u64,
    pub phase: TogglePhase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    Toggle,
    Confirm,
    Fail,
}

impl LikeState {
    #[must_use]
    pub fn new(liked: bool, count: u64) -> Self {
        Self {
            liked,
            count,
            phase: TogglePhase::Idle,
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> LikeSnapshot {
        LikeSnapshot {
            liked: self.liked,
            count: self.count,
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self.phase, TogglePhase::Pending { .. })
    }
}

/// Apply `action` to `state`.
///
/// A `Toggle` while a request is pending is ignored so the UI cannot stack
/// unconfirmed flips. `Confirm` and `Fail` outside `Pending` are no-ops.
#[must_use]
pub fn reduce(state: LikeState, action: ToggleAction) -> LikeState {
    match (state.phase, action) {
        (TogglePhase::Pending { .. }, ToggleAction::Toggle) => state,
        (_, ToggleAction::Toggle) => {
            let liked = !state.liked;
            let count = if liked {
                state.count.saturating_add(1)
            } else {
                state.count.saturating_sub(1)
            };
            LikeState {
                liked,
                count,
                phase: TogglePhase::Pending {
                    previous: state.snapshot(),
                },
            }
        }
        (TogglePhase::Pending { .. }, ToggleAction::Confirm) => LikeState {
            phase: TogglePhase::Committed,
            ..state
        },
        (TogglePhase::Pending { previous }, ToggleAction::Fail) => LikeState {
            liked: previous.liked,
            count: previous.count,
            phase: TogglePhase::RolledBack,
        },
        (_, ToggleAction::Confirm | ToggleAction::Fail) => state,
    }
}
