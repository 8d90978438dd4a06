//! Ledger accounts and the fund movements the escrow asks the ledger to make.

use crate::{Amount, GameId, ParticipantId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An account held by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountId {
    /// A participant's wallet.
    Participant(ParticipantId),
    /// The custodial account of one game.
    Escrow(GameId),
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountId::Participant(id) => write!(f, "{}", id),
            AccountId::Escrow(game) => write!(f, "Escrow({})", game),
        }
    }
}

impl From<ParticipantId> for AccountId {
    fn from(id: ParticipantId) -> Self {
        AccountId::Participant(id)
    }
}

impl From<GameId> for AccountId {
    fn from(game: GameId) -> Self {
        AccountId::Escrow(game)
    }
}

/// A single fund movement paired with an escrow transition.
///
/// The escrow never moves funds itself: a transition that needs funds to move
/// yields one of these, and the transition only commits once the ledger has
/// applied it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEffect {
    /// Lock `amount` from a participant's wallet into a game's escrow.
    Deposit {
        from: ParticipantId,
        game: GameId,
        amount: Amount,
    },
    /// Release `amount` from a game's escrow to a participant.
    Payout {
        game: GameId,
        to: ParticipantId,
        amount: Amount,
    },
}

impl LedgerEffect {
    /// The game whose escrow this effect touches.
    pub fn game(&self) -> GameId {
        match self {
            LedgerEffect::Deposit { game, .. } | LedgerEffect::Payout { game, .. } => *game,
        }
    }

    /// The amount moved.
    pub fn amount(&self) -> Amount {
        match self {
            LedgerEffect::Deposit { amount, .. } | LedgerEffect::Payout { amount, .. } => *amount,
        }
    }

    /// Get a human-readable name for this effect.
    pub fn type_name(&self) -> &'static str {
        match self {
            LedgerEffect::Deposit { .. } => "Deposit",
            LedgerEffect::Payout { .. } => "Payout",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_accessors() {
        let alice = ParticipantId::from_name("alice");
        let game = GameId::derive("test", &alice, 0);

        let deposit = LedgerEffect::Deposit {
            from: alice,
            game,
            amount: Amount(50),
        };
        assert_eq!(deposit.game(), game);
        assert_eq!(deposit.amount(), Amount(50));
        assert_eq!(deposit.type_name(), "Deposit");
    }

    #[test]
    fn test_effect_json_tagging() {
        let alice = ParticipantId::from_name("alice");
        let game = GameId::derive("test", &alice, 0);
        let payout = LedgerEffect::Payout {
            game,
            to: alice,
            amount: Amount(100),
        };

        let json = serde_json::to_value(payout).unwrap();
        assert_eq!(json["payout"]["amount"], 100);
        assert!(json["payout"]["to"].is_array());
    }
}
