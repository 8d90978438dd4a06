//! Domain-specific identifier types.

use crate::Hash;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque participant identifier.
///
/// Authentication happens outside the escrow; by the time a submission reaches
/// the state machine the caller id is trusted and only compared against the
/// identities named in the game configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub Hash);

impl ParticipantId {
    /// Derive a participant id from a human-readable name.
    pub fn from_name(name: &str) -> Self {
        Self(Hash::from_parts(&[b"participant", name.as_bytes()]))
    }

    /// Get the bytes as a slice.
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Participant({}..)", self.0.short())
    }
}

/// Game identifier (the escrow's address).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub Hash);

impl GameId {
    /// Derive the address of a game from a domain tag, the challenger and a
    /// per-challenger nonce.
    ///
    /// The same inputs always produce the same id, so a challenger can compute
    /// the address of the game it is about to create.
    pub fn derive(domain: &str, challenger: &ParticipantId, nonce: u64) -> Self {
        Self(Hash::from_parts(&[
            domain.as_bytes(),
            challenger.as_bytes(),
            &nonce.to_le_bytes(),
        ]))
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Game({}..)", self.0.short())
    }
}

/// Round number within a game.
///
/// Counts rounds started; zero means no round has been started yet.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RoundNumber(pub u64);

impl RoundNumber {
    /// No round started yet.
    pub const NONE: Self = RoundNumber(0);

    /// Get the next round number.
    pub fn next(self) -> Self {
        RoundNumber(self.0 + 1)
    }
}

impl fmt::Display for RoundNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Round({})", self.0)
    }
}

/// One of the two seats at the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Initiates the game and starts every round.
    Challenger,
    /// Must acknowledge each round within its window.
    Responder,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Challenger => write!(f, "challenger"),
            Side::Responder => write!(f, "responder"),
        }
    }
}
