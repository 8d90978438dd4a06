//! Error types for escrow operations.

use crate::{EscrowState, OperationKind};
use liveness_types::{Amount, ParticipantId, RoundNumber, Side};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Rejection of an escrow operation.
///
/// Every variant is recoverable: the escrow is left exactly as it was and the
/// caller may retry with corrected parameters or after time has passed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EscrowError {
    /// The caller is not the participant the operation requires.
    #[error("{caller} may not {operation}: only the {required} can")]
    Unauthorized {
        operation: OperationKind,
        caller: ParticipantId,
        required: Side,
    },

    /// The operation is not legal in the current state.
    #[error("cannot {operation} while the game is {state}")]
    InvalidState {
        operation: OperationKind,
        state: EscrowState,
    },

    /// `endRound` before the response window closed.
    #[error("{round} is still open until {deadline:?} (now {now:?})")]
    RoundNotExpired {
        round: RoundNumber,
        deadline: Duration,
        now: Duration,
    },

    /// `respondRound` after the response window closed.
    #[error("{round} closed at {deadline:?}; a response at {now:?} is too late")]
    RoundAlreadySettled {
        round: RoundNumber,
        deadline: Duration,
        now: Duration,
    },

    /// `respondRound` twice in the same round.
    #[error("{round} has already been answered")]
    AlreadyResponded { round: RoundNumber },

    /// `endGame` before either side reached the threshold.
    #[error(
        "no side has {threshold} wins yet (challenger {challenger_wins}, responder {responder_wins})"
    )]
    ThresholdNotReached {
        threshold: u32,
        challenger_wins: u32,
        responder_wins: u32,
    },

    /// A deposit that is not exactly half the pot.
    #[error("{operation} requires a deposit of exactly {required}, got {supplied}")]
    InsufficientFunds {
        operation: OperationKind,
        required: Amount,
        supplied: Amount,
    },

    /// Game parameters rejected at creation.
    #[error("invalid game configuration: {reason}")]
    InvalidConfig {
        operation: OperationKind,
        reason: String,
    },
}

impl EscrowError {
    /// The kind of this error, without its context.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EscrowError::Unauthorized { .. } => ErrorKind::Unauthorized,
            EscrowError::InvalidState { .. } => ErrorKind::InvalidState,
            EscrowError::RoundNotExpired { .. } => ErrorKind::RoundNotExpired,
            EscrowError::RoundAlreadySettled { .. } => ErrorKind::RoundAlreadySettled,
            EscrowError::AlreadyResponded { .. } => ErrorKind::AlreadyResponded,
            EscrowError::ThresholdNotReached { .. } => ErrorKind::ThresholdNotReached,
            EscrowError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            EscrowError::InvalidConfig { .. } => ErrorKind::InvalidConfig,
        }
    }
}

/// Flat classification of rejections, used for counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Unauthorized,
    InvalidState,
    RoundNotExpired,
    RoundAlreadySettled,
    AlreadyResponded,
    ThresholdNotReached,
    InsufficientFunds,
    InvalidConfig,
    UnknownGame,
    StaleSequence,
    SettlementInFlight,
    LedgerFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A broken escrow invariant.
///
/// These are never caused by callers; seeing one means the state machine has
/// a defect, and the settlement layer treats it as fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("deposits {deposited} exceed the pot {pot}")]
    DepositsExceedPot { deposited: Amount, pot: Amount },

    #[error("game is {state} but deposits are {challenger} / {responder} (stake {stake})")]
    Underfunded {
        state: EscrowState,
        challenger: Amount,
        responder: Amount,
        stake: Amount,
    },

    #[error("{released} released in state {state}, expected {expected}")]
    ReleaseMismatch {
        state: EscrowState,
        released: Amount,
        expected: Amount,
    },

    #[error("{state} reached with {wins} wins against a threshold of {threshold}")]
    WinnerMismatch {
        state: EscrowState,
        wins: u32,
        threshold: u32,
    },

    #[error("round counter {round} is behind {scored} scored rounds")]
    RoundCounterBehind { round: RoundNumber, scored: u64 },
}
