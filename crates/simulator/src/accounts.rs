//! Participant management for simulations.
//!
//! Provides a `PlayerPool` of named participants whose wallets are funded on
//! the ledger before the first game.

use liveness_ledger::{InMemoryLedger, LedgerError};
use liveness_types::{Amount, ParticipantId};
use rand::Rng;
use tracing::info;

/// A simulated participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Player {
    /// Ledger identity.
    pub id: ParticipantId,
}

impl Player {
    /// Derive the player with the given index.
    pub fn new(index: usize) -> Self {
        Self {
            id: ParticipantId::from_name(&format!("player-{}", index)),
        }
    }
}

/// Pool of funded players.
pub struct PlayerPool {
    players: Vec<Player>,
}

impl PlayerPool {
    /// Create `count` players.
    pub fn new(count: usize) -> Self {
        Self {
            players: (0..count).map(Player::new).collect(),
        }
    }

    /// Fund every player's wallet with `balance`.
    pub fn fund_all(
        &self,
        ledger: &mut InMemoryLedger,
        balance: Amount,
    ) -> Result<(), LedgerError> {
        for player in &self.players {
            ledger.fund(player.id, balance)?;
        }
        info!(players = self.players.len(), %balance, "Funded player wallets");
        Ok(())
    }

    /// Pick a challenger and a distinct responder.
    ///
    /// Returns `None` if the pool has fewer than two players.
    pub fn pair(&self, rng: &mut impl Rng) -> Option<(Player, Player)> {
        let n = self.players.len();
        if n < 2 {
            return None;
        }
        let challenger = rng.gen_range(0..n);
        // Shift by 1..n so the responder is never the challenger.
        let responder = (challenger + rng.gen_range(1..n)) % n;
        Some((self.players[challenger], self.players[responder]))
    }
}
