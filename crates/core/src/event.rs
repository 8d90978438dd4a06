//! Events delivered to the node.

use crate::{RequestId, Submission};

/// Input to the node state machine.
#[derive(Debug, Clone)]
pub enum Event {
    // ═══════════════════════════════════════════════════════════════════════
    // Client Events
    // ═══════════════════════════════════════════════════════════════════════
    /// A participant submitted an operation.
    OperationSubmitted {
        request_id: RequestId,
        submission: Submission,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Ledger Callbacks
    // ═══════════════════════════════════════════════════════════════════════
    /// The ledger applied the effect requested for `request_id`.
    LedgerEffectApplied { request_id: RequestId },

    /// The ledger refused the effect requested for `request_id`.
    LedgerEffectFailed {
        request_id: RequestId,
        reason: String,
    },
}

impl Event {
    /// Get a human-readable name for this event type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Event::OperationSubmitted { .. } => "OperationSubmitted",
            Event::LedgerEffectApplied { .. } => "LedgerEffectApplied",
            Event::LedgerEffectFailed { .. } => "LedgerEffectFailed",
        }
    }

    /// The request this event belongs to.
    pub fn request_id(&self) -> RequestId {
        match self {
            Event::OperationSubmitted { request_id, .. }
            | Event::LedgerEffectApplied { request_id }
            | Event::LedgerEffectFailed { request_id, .. } => *request_id,
        }
    }
}
