//! In-memory ledger.

use crate::{Ledger, LedgerError};
use im::HashMap;
use liveness_types::{AccountId, Amount, GameId, ParticipantId};
use tracing::{debug, warn};

/// Ledger holding balances in memory.
///
/// Balances live in an `im::HashMap`, so [`InMemoryLedger::snapshot`] is
/// O(1) and snapshots are unaffected by later writes.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    balances: HashMap<AccountId, Amount>,
    reject_next: Option<String>,
}

impl InMemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit a participant's wallet with new funds.
    pub fn fund(&mut self, participant: ParticipantId, amount: Amount) -> Result<(), LedgerError> {
        let account = AccountId::Participant(participant);
        let balance = self.balances.get(&account).copied().unwrap_or(Amount::ZERO);
        let credited = balance
            .checked_add(amount)
            .ok_or(LedgerError::Overflow { account, amount })?;
        self.balances.insert(account, credited);
        Ok(())
    }

    /// Make the next deposit or payout fail with [`LedgerError::Rejected`].
    pub fn reject_next(&mut self, reason: impl Into<String>) {
        self.reject_next = Some(reason.into());
    }

    /// Frozen copy of the current balances.
    pub fn snapshot(&self) -> HashMap<AccountId, Amount> {
        self.balances.clone()
    }

    /// Sum of all balances.
    pub fn total(&self) -> u128 {
        self.balances.values().map(|a| u128::from(a.0)).sum()
    }

    /// Move `amount` between two accounts, all or nothing.
    fn transfer(
        &mut self,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        if let Some(reason) = self.reject_next.take() {
            warn!(%from, %to, %amount, %reason, "Ledger rejecting transfer");
            return Err(LedgerError::Rejected(reason));
        }

        let available = *self
            .balances
            .get(&from)
            .ok_or(LedgerError::UnknownAccount(from))?;
        let debited = available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                account: from,
                available,
                required: amount,
            })?;

        // Self-transfers are not produced by the escrow, but keep them exact.
        if from == to {
            return Ok(());
        }

        let current = self.balances.get(&to).copied().unwrap_or(Amount::ZERO);
        let credited = current
            .checked_add(amount)
            .ok_or(LedgerError::Overflow {
                account: to,
                amount,
            })?;

        self.balances.insert(from, debited);
        self.balances.insert(to, credited);
        debug!(%from, %to, %amount, "Transfer applied");
        Ok(())
    }
}

impl Ledger for InMemoryLedger {
    fn deposit(
        &mut self,
        from: &ParticipantId,
        escrow: &GameId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        self.transfer(
            AccountId::Participant(*from),
            AccountId::Escrow(*escrow),
            amount,
        )
    }

    fn payout(
        &mut self,
        escrow: &GameId,
        recipient: &ParticipantId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        self.transfer(
            AccountId::Escrow(*escrow),
            AccountId::Participant(*recipient),
            amount,
        )
    }

    fn balance_of(&self, account: &AccountId) -> Amount {
        self.balances.get(account).copied().unwrap_or(Amount::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liveness_types::LedgerEffect;
    use tracing_test::traced_test;

    fn alice() -> ParticipantId {
        ParticipantId::from_name("alice")
    }

    fn game() -> GameId {
        GameId::derive("test", &alice(), 0)
    }

    #[test]
    fn test_deposit_and_payout() {
        let mut ledger = InMemoryLedger::new();
        ledger.fund(alice(), Amount(100)).unwrap();

        ledger.deposit(&alice(), &game(), Amount(40)).unwrap();
        assert_eq!(ledger.balance_of(&alice().into()), Amount(60));
        assert_eq!(ledger.balance_of(&game().into()), Amount(40));

        ledger.payout(&game(), &alice(), Amount(40)).unwrap();
        assert_eq!(ledger.balance_of(&alice().into()), Amount(100));
        assert_eq!(ledger.balance_of(&game().into()), Amount::ZERO);
        assert_eq!(ledger.total(), 100);
    }

    #[test]
    fn test_insufficient_balance_changes_nothing() {
        let mut ledger = InMemoryLedger::new();
        ledger.fund(alice(), Amount(10)).unwrap();
        let before = ledger.snapshot();

        let err = ledger.deposit(&alice(), &game(), Amount(11)).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientBalance {
                account: alice().into(),
                available: Amount(10),
                required: Amount(11),
            }
        );
        assert_eq!(ledger.snapshot(), before);
    }

    #[test]
    fn test_unknown_accounts() {
        let mut ledger = InMemoryLedger::new();
        let err = ledger.payout(&game(), &alice(), Amount(1)).unwrap_err();
        assert_eq!(err, LedgerError::UnknownAccount(game().into()));
    }

    #[test]
    fn test_overflow_is_rejected() {
        let mut ledger = InMemoryLedger::new();
        ledger.fund(alice(), Amount(u64::MAX)).unwrap();
        assert!(matches!(
            ledger.fund(alice(), Amount(1)),
            Err(LedgerError::Overflow { .. })
        ));
    }

    #[traced_test]
    #[test]
    fn test_reject_next_is_one_shot() {
        let mut ledger = InMemoryLedger::new();
        ledger.fund(alice(), Amount(100)).unwrap();
        ledger.reject_next("maintenance");

        let effect = LedgerEffect::Deposit {
            from: alice(),
            game: game(),
            amount: Amount(50),
        };
        assert_eq!(
            ledger.apply(&effect),
            Err(LedgerError::Rejected("maintenance".to_string()))
        );
        assert_eq!(ledger.balance_of(&alice().into()), Amount(100));
        assert!(logs_contain("Ledger rejecting transfer"));

        ledger.apply(&effect).unwrap();
        assert_eq!(ledger.balance_of(&game().into()), Amount(50));
    }

    #[test]
    fn test_snapshot_is_isolated() {
        let mut ledger = InMemoryLedger::new();
        ledger.fund(alice(), Amount(100)).unwrap();
        let snapshot = ledger.snapshot();

        ledger.deposit(&alice(), &game(), Amount(30)).unwrap();
        assert_eq!(snapshot.get(&AccountId::from(alice())), Some(&Amount(100)));
    }
}
