//! Operations submitted by participants and the receipts they get back.

use liveness_escrow::OperationKind;
use liveness_types::{Amount, GameId, ParticipantId, RoundNumber, Side};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// An escrow operation with its parameters.
///
/// The caller is not part of the operation; it travels on the
/// [`Submission`] so the node can check it against the game configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Create a game with the caller as challenger.
    InitGame {
        responder: ParticipantId,
        pot: Amount,
        round_duration: Duration,
        win_threshold: u32,
        deposit: Amount,
    },
    /// Lock the responder's half.
    JoinGame { game: GameId, deposit: Amount },
    /// Withdraw an unjoined game.
    CancelGame { game: GameId },
    /// Open a new round.
    StartRound { game: GameId },
    /// Acknowledge the open round.
    RespondRound { game: GameId },
    /// Settle an expired round.
    EndRound { game: GameId },
    /// Pay out a decided game.
    EndGame { game: GameId },
}

impl Operation {
    /// The kind of this operation.
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::InitGame { .. } => OperationKind::InitGame,
            Operation::JoinGame { .. } => OperationKind::JoinGame,
            Operation::CancelGame { .. } => OperationKind::CancelGame,
            Operation::StartRound { .. } => OperationKind::StartRound,
            Operation::RespondRound { .. } => OperationKind::RespondRound,
            Operation::EndRound { .. } => OperationKind::EndRound,
            Operation::EndGame { .. } => OperationKind::EndGame,
        }
    }

    /// The game this operation targets; `None` for `initGame`.
    pub fn game(&self) -> Option<GameId> {
        match self {
            Operation::InitGame { .. } => None,
            Operation::JoinGame { game, .. }
            | Operation::CancelGame { game }
            | Operation::StartRound { game }
            | Operation::RespondRound { game }
            | Operation::EndRound { game }
            | Operation::EndGame { game } => Some(*game),
        }
    }
}

/// An operation together with who sent it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    /// Identity of the sender, checked against the game's participants.
    pub caller: ParticipantId,
    /// What to do.
    pub operation: Operation,
    /// Sequence number of the game the caller last observed.
    ///
    /// When set, the submission is rejected if the game has since moved on.
    pub expected_sequence: Option<u64>,
}

impl Submission {
    /// Submission without a sequence check.
    pub fn new(caller: ParticipantId, operation: Operation) -> Self {
        Self {
            caller,
            operation,
            expected_sequence: None,
        }
    }

    /// Require the game to be at `sequence` when the submission is processed.
    pub fn with_expected_sequence(mut self, sequence: u64) -> Self {
        self.expected_sequence = Some(sequence);
        self
    }

    /// Create a game.
    pub fn init_game(
        challenger: ParticipantId,
        responder: ParticipantId,
        pot: Amount,
        round_duration: Duration,
        win_threshold: u32,
    ) -> Self {
        Self::new(
            challenger,
            Operation::InitGame {
                responder,
                pot,
                round_duration,
                win_threshold,
                deposit: pot.half(),
            },
        )
    }

    /// Join `game` with the given deposit.
    pub fn join_game(caller: ParticipantId, game: GameId, deposit: Amount) -> Self {
        Self::new(caller, Operation::JoinGame { game, deposit })
    }

    /// Cancel `game`.
    pub fn cancel_game(caller: ParticipantId, game: GameId) -> Self {
        Self::new(caller, Operation::CancelGame { game })
    }

    /// Start a round in `game`.
    pub fn start_round(caller: ParticipantId, game: GameId) -> Self {
        Self::new(caller, Operation::StartRound { game })
    }

    /// Respond to the open round in `game`.
    pub fn respond_round(caller: ParticipantId, game: GameId) -> Self {
        Self::new(caller, Operation::RespondRound { game })
    }

    /// Settle the open round in `game`.
    pub fn end_round(caller: ParticipantId, game: GameId) -> Self {
        Self::new(caller, Operation::EndRound { game })
    }

    /// Pay out `game`.
    pub fn end_game(caller: ParticipantId, game: GameId) -> Self {
        Self::new(caller, Operation::EndGame { game })
    }
}

/// What a committed operation did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    GameCreated { stake: Amount },
    GameFunded { pot: Amount },
    GameCancelled { refund: Amount },
    RoundStarted { round: RoundNumber, deadline: Duration },
    Responded { round: RoundNumber },
    RoundSettled { round: RoundNumber, winner: Side },
    GameFinished { winner: Side, payout: Amount },
}

impl Outcome {
    /// Get a human-readable name for this outcome.
    pub fn type_name(&self) -> &'static str {
        match self {
            Outcome::GameCreated { .. } => "GameCreated",
            Outcome::GameFunded { .. } => "GameFunded",
            Outcome::GameCancelled { .. } => "GameCancelled",
            Outcome::RoundStarted { .. } => "RoundStarted",
            Outcome::Responded { .. } => "Responded",
            Outcome::RoundSettled { .. } => "RoundSettled",
            Outcome::GameFinished { .. } => "GameFinished",
        }
    }

    /// Whether the game reached a terminal state with this outcome.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Outcome::GameCancelled { .. } | Outcome::GameFinished { .. }
        )
    }
}

/// Confirmation of a committed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Game the operation applied to.
    pub game: GameId,
    /// Sequence number of the game after the operation.
    pub sequence: u64,
    /// What happened.
    pub outcome: Outcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_targets() {
        let alice = ParticipantId::from_name("alice");
        let bob = ParticipantId::from_name("bob");
        let game = GameId::derive("test", &alice, 0);

        let init = Submission::init_game(alice, bob, Amount(100), Duration::from_secs(1), 2);
        assert_eq!(init.operation.kind(), OperationKind::InitGame);
        assert_eq!(init.operation.game(), None);
        assert!(matches!(
            init.operation,
            Operation::InitGame { deposit: Amount(50), .. }
        ));

        let respond = Submission::respond_round(bob, game).with_expected_sequence(3);
        assert_eq!(respond.operation.kind(), OperationKind::RespondRound);
        assert_eq!(respond.operation.game(), Some(game));
        assert_eq!(respond.expected_sequence, Some(3));
    }

    #[test]
    fn test_submission_json_shape() {
        let alice = ParticipantId::from_name("alice");
        let game = GameId::derive("test", &alice, 0);
        let submission = Submission::end_round(alice, game);

        let json = serde_json::to_value(&submission).unwrap();
        assert!(json["operation"]["end_round"]["game"].is_array());
        assert!(json["expected_sequence"].is_null());

        let back: Submission = serde_json::from_value(json).unwrap();
        assert_eq!(back, submission);
    }

    #[test]
    fn test_terminal_outcomes() {
        assert!(Outcome::GameCancelled { refund: Amount(5) }.is_terminal());
        assert!(Outcome::GameFinished {
            winner: Side::Responder,
            payout: Amount(10)
        }
        .is_terminal());
        assert!(!Outcome::GameFunded { pot: Amount(10) }.is_terminal());
        assert!(!Outcome::RoundSettled {
            round: RoundNumber(1),
            winner: Side::Challenger
        }
        .is_terminal());
    }
}
