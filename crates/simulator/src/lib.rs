//! Liveness Escrow Simulator
//!
//! Plays many games against a single settlement node on a manual clock and
//! reports how they ended. Participants can be configured to miss rounds,
//! answer late, resubmit operations and cancel games, and the ledger can be
//! made to fail, so the run doubles as a consistency check: at the end the
//! ledger supply must be unchanged and every escrow account must hold exactly
//! what its record says.
//!
//! # Example
//!
//! ```ignore
//! use liveness_simulator::{Simulator, SimulatorConfig, WorkloadConfig};
//! use std::time::Duration;
//!
//! let config = SimulatorConfig::new(200)
//!     .with_round_duration(Duration::from_millis(500))
//!     .with_workload(WorkloadConfig::default().with_responder_availability(0.8));
//!
//! let report = Simulator::new(config)?.run();
//! report.print();
//! assert!(report.ledger.is_consistent());
//! ```

pub mod accounts;
pub mod config;
pub mod metrics;
pub mod runner;
pub mod workload;

pub use accounts::{Player, PlayerPool};
pub use config::{ConfigError, SimulatorConfig, WorkloadConfig};
pub use metrics::{LedgerAudit, MetricsCollector, SimulationReport};
pub use runner::{Simulator, SimulatorError};
pub use workload::{GameDriver, Session};
