//! Settlement node.
//!
//! [`EscrowNode`] owns every game and is a deterministic
//! [`StateMachine`](liveness_core::StateMachine): it validates submissions,
//! stages transitions and asks for ledger effects, but never touches funds or
//! reads a clock. [`SettlementRunner`] wires the node to a
//! [`Ledger`](liveness_ledger::Ledger) and a [`Clock`](liveness_ledger::Clock)
//! and turns each submission into a [`Receipt`](liveness_core::Receipt) or a
//! [`SubmissionError`](liveness_core::SubmissionError).
//!
//! ```text
//!  Submission ──▶ SettlementRunner ──set_time/handle──▶ EscrowNode
//!                      │    ▲                              │
//!                      │    └── LedgerEffectApplied/Failed ┘ ApplyLedgerEffect
//!                      ▼
//!                   Ledger
//! ```

mod config;
mod runner;
mod state;

pub use config::{NodeConfig, DEFAULT_DOMAIN};
pub use runner::SettlementRunner;
pub use state::EscrowNode;
