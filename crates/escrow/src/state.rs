//! Lifecycle states of an escrow.

use liveness_types::Side;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Where a game is in its lifecycle.
///
/// Round timing lives inside [`EscrowState::RoundActive`], so a round start
/// time exists exactly while a round is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscrowState {
    /// Challenger has deposited; waiting for the responder.
    Initialized,

    /// Both halves deposited; no round has been played yet.
    Funded,

    /// A round is open.
    RoundActive {
        /// Node time at which the round was started.
        started_at: Duration,
        /// Whether the responder acknowledged inside the window.
        responded: bool,
    },

    /// The last round has been scored.
    RoundSettled {
        /// Side credited for the last round.
        last_winner: Side,
    },

    /// The pot has been paid out.
    Finished {
        /// Side that reached the win threshold.
        winner: Side,
    },

    /// Cancelled before the responder joined; the challenger was refunded.
    Cancelled,
}

impl EscrowState {
    /// Terminal states accept no further operations.
    pub fn is_terminal(&self) -> bool {
        matches!(self, EscrowState::Finished { .. } | EscrowState::Cancelled)
    }

    /// Whether both halves of the pot have been locked.
    pub fn is_funded(&self) -> bool {
        !matches!(self, EscrowState::Initialized | EscrowState::Cancelled)
    }

    /// Get a human-readable name for this state.
    pub fn name(&self) -> &'static str {
        match self {
            EscrowState::Initialized => "Initialized",
            EscrowState::Funded => "Funded",
            EscrowState::RoundActive { .. } => "RoundActive",
            EscrowState::RoundSettled { .. } => "RoundSettled",
            EscrowState::Finished { .. } => "Finished",
            EscrowState::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for EscrowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EscrowState::Finished { winner } => write!(f, "Finished({})", winner),
            other => f.write_str(other.name()),
        }
    }
}
