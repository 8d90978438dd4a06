//! Actions requested by the node.

use crate::{Receipt, RequestId, SubmissionError};
use liveness_types::LedgerEffect;

/// Output of the node state machine, performed by the runner.
#[derive(Debug, Clone)]
pub enum Action {
    /// Move funds. The runner must answer with `LedgerEffectApplied` or
    /// `LedgerEffectFailed` for the same request before the game accepts
    /// further operations.
    ApplyLedgerEffect {
        request_id: RequestId,
        effect: LedgerEffect,
    },

    /// Final result of a submission.
    EmitOutcome {
        request_id: RequestId,
        result: Result<Receipt, SubmissionError>,
    },
}

impl Action {
    /// Get a human-readable name for this action type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Action::ApplyLedgerEffect { .. } => "ApplyLedgerEffect",
            Action::EmitOutcome { .. } => "EmitOutcome",
        }
    }

    /// The request this action belongs to.
    pub fn request_id(&self) -> RequestId {
        match self {
            Action::ApplyLedgerEffect { request_id, .. }
            | Action::EmitOutcome { request_id, .. } => *request_id,
        }
    }
}
