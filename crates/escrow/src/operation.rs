//! Names of the operations a participant can submit.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of an escrow operation, used for error context and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    InitGame,
    JoinGame,
    CancelGame,
    StartRound,
    RespondRound,
    EndRound,
    EndGame,
}

impl OperationKind {
    /// Get a human-readable name for this operation.
    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::InitGame => "initGame",
            OperationKind::JoinGame => "joinGame",
            OperationKind::CancelGame => "cancelGame",
            OperationKind::StartRound => "startRound",
            OperationKind::RespondRound => "respondRound",
            OperationKind::EndRound => "endRound",
            OperationKind::EndGame => "endGame",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
