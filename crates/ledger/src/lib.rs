//! External collaborators of the escrow node.
//!
//! - [`Ledger`]: custody of funds. The node never touches balances directly;
//!   it asks for [`LedgerEffect`]s and the runner applies them here.
//! - [`Clock`]: the only source of time for round expiry.
//!
//! Both come with in-process implementations: [`InMemoryLedger`] for tests
//! and simulation, [`SystemClock`] and [`ManualClock`] for real and
//! controlled time.
//!
//! [`LedgerEffect`]: liveness_types::LedgerEffect

mod clock;
mod error;
mod memory;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::LedgerError;
pub use memory::InMemoryLedger;

use liveness_types::{AccountId, Amount, GameId, LedgerEffect, ParticipantId};

/// Custody of funds.
///
/// Each call is atomic: it either moves the full amount or fails without
/// changing any balance.
pub trait Ledger {
    /// Move `amount` from a participant's wallet into a game's escrow.
    fn deposit(
        &mut self,
        from: &ParticipantId,
        escrow: &GameId,
        amount: Amount,
    ) -> Result<(), LedgerError>;

    /// Move `amount` out of a game's escrow to a participant.
    fn payout(
        &mut self,
        escrow: &GameId,
        recipient: &ParticipantId,
        amount: Amount,
    ) -> Result<(), LedgerError>;

    /// Current balance of an account; zero if it does not exist.
    fn balance_of(&self, account: &AccountId) -> Amount;

    /// Apply an effect produced by the escrow.
    fn apply(&mut self, effect: &LedgerEffect) -> Result<(), LedgerError> {
        match effect {
            LedgerEffect::Deposit { from, game, amount } => self.deposit(from, game, *amount),
            LedgerEffect::Payout { game, to, amount } => self.payout(game, to, *amount),
        }
    }
}
