//! Client request tracking.

use serde::{Deserialize, Serialize};

/// Opaque identifier for tracking a submission through the node.
///
/// The runner allocates one per submission and uses it to match the node's
/// [`Action`](crate::Action)s back to the caller. A submission that needs a
/// ledger effect produces an `ApplyLedgerEffect` carrying its id; the runner
/// answers with `LedgerEffectApplied` or `LedgerEffectFailed` under the same
/// id, and the node finally emits `EmitOutcome` for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub u64);

impl RequestId {
    /// Create a new request ID.
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "req-{}", self.0)
    }
}
