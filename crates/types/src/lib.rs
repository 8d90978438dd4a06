//! Core types for the liveness escrow game.
//!
//! Shared by every other crate in the workspace:
//!
//! - [`ParticipantId`], [`GameId`], [`RoundNumber`], [`Side`]: identifiers
//! - [`Amount`]: exact integer token amounts
//! - [`Hash`]: Blake3 hash used for address derivation
//! - [`AccountId`], [`LedgerEffect`]: the vocabulary between escrow and ledger

mod amount;
mod effect;
mod hash;
mod identifiers;

pub use amount::Amount;
pub use effect::{AccountId, LedgerEffect};
pub use hash::Hash;
pub use identifiers::{GameId, ParticipantId, RoundNumber, Side};
