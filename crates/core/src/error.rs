//! Errors returned to submitters.

use liveness_escrow::{ErrorKind, EscrowError, OperationKind};
use liveness_types::GameId;
use thiserror::Error;

/// Why a submission was not committed.
///
/// A rejected submission never changes the game: no escrow field, no
/// sequence number and no ledger balance moves.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// The escrow state machine refused the operation.
    #[error(transparent)]
    Escrow(#[from] EscrowError),

    /// No game with this id exists.
    #[error("unknown game {0}")]
    UnknownGame(GameId),

    /// The caller acted on an outdated view of the game.
    #[error("{game} is at sequence {actual}, submission expected {expected}")]
    StaleSequence {
        game: GameId,
        expected: u64,
        actual: u64,
    },

    /// A previous operation on this game is waiting for its ledger effect.
    #[error("{game} has a settlement in flight")]
    SettlementInFlight { game: GameId },

    /// The ledger refused the funds movement; the transition was discarded.
    #[error("ledger rejected {operation}: {reason}")]
    LedgerFailure {
        operation: OperationKind,
        reason: String,
    },
}

impl SubmissionError {
    /// The kind of this error, without its context.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SubmissionError::Escrow(e) => e.kind(),
            SubmissionError::UnknownGame(_) => ErrorKind::UnknownGame,
            SubmissionError::StaleSequence { .. } => ErrorKind::StaleSequence,
            SubmissionError::SettlementInFlight { .. } => ErrorKind::SettlementInFlight,
            SubmissionError::LedgerFailure { .. } => ErrorKind::LedgerFailure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liveness_types::RoundNumber;

    #[test]
    fn test_kind_passes_through_escrow_errors() {
        let err: SubmissionError = EscrowError::AlreadyResponded {
            round: RoundNumber(1),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::AlreadyResponded);
        assert_eq!(err.to_string(), "Round(1) has already been answered");
    }

    #[test]
    fn test_node_level_kinds() {
        let game = GameId::derive("test", &liveness_types::ParticipantId::from_name("a"), 0);
        assert_eq!(
            SubmissionError::UnknownGame(game).kind(),
            ErrorKind::UnknownGame
        );
        assert_eq!(
            SubmissionError::StaleSequence {
                game,
                expected: 1,
                actual: 2
            }
            .kind(),
            ErrorKind::StaleSequence
        );
    }
}
