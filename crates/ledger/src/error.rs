//! Ledger error types.

use liveness_types::{AccountId, Amount};
use thiserror::Error;

/// Errors from a ledger operation. No balance changes when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The source account holds less than the amount to move.
    #[error("{account} holds {available}, cannot move {required}")]
    InsufficientBalance {
        account: AccountId,
        available: Amount,
        required: Amount,
    },

    /// The source account has never been funded.
    #[error("unknown account {0}")]
    UnknownAccount(AccountId),

    /// The destination balance would overflow.
    #[error("crediting {amount} to {account} overflows")]
    Overflow { account: AccountId, amount: Amount },

    /// The ledger refused the operation for its own reasons.
    #[error("rejected: {0}")]
    Rejected(String),
}
