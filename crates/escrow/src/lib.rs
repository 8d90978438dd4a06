//! Escrow state machine for the liveness game.
//!
//! Two participants each lock half of a pot. The challenger starts timed
//! rounds; the responder must acknowledge each round inside its window. A
//! round with an acknowledgment is a win for the responder, a silent round is
//! a win for the challenger. The first side to reach the configured win
//! threshold takes the whole pot.
//!
//! # Transitions
//!
//! ```text
//!  initGame      joinGame        startRound          endRound          endGame
//! ─────────▶ Initialized ──▶ Funded ──▶ RoundActive ──────────▶ RoundSettled ──▶ Finished
//!               │                        ▲  │ respondRound        │
//!               │ cancelGame             │  └──(flag only)        │
//!               ▼                        └────── startRound ──────┘
//!           Cancelled
//! ```
//!
//! The [`Escrow`] is a plain value: it never touches funds or reads a clock.
//! Operations that need funds to move return a [`LedgerEffect`] and the
//! caller commits the transition only after the ledger applies it. Time is
//! passed in by the settlement layer.
//!
//! [`LedgerEffect`]: liveness_types::LedgerEffect

mod config;
mod error;
mod escrow;
mod operation;
mod scoreboard;
mod state;
mod timer;

pub use config::{GameConfig, GameLimits};
pub use error::{ErrorKind, EscrowError, InvariantViolation};
pub use escrow::Escrow;
pub use operation::OperationKind;
pub use scoreboard::{compute_payout, Scoreboard};
pub use state::EscrowState;
pub use timer::RoundTimer;
