//! Metrics collection and the final simulation report.

use liveness_core::{Outcome, Receipt, SubmissionError};
use liveness_escrow::ErrorKind;
use liveness_types::Side;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Accumulates counters while the simulation runs.
#[derive(Debug, Default)]
pub struct MetricsCollector {
    submissions: u64,
    accepted: u64,
    rejections: BTreeMap<ErrorKind, u64>,
    games_created: u64,
    games_cancelled: u64,
    games_finished: u64,
    challenger_games: u64,
    responder_games: u64,
    rounds_settled: u64,
    challenger_rounds: u64,
    responder_rounds: u64,
}

impl MetricsCollector {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the result of one submission.
    pub fn record(&mut self, result: &Result<Receipt, SubmissionError>) {
        self.submissions += 1;
        match result {
            Ok(receipt) => {
                self.accepted += 1;
                self.record_outcome(&receipt.outcome);
            }
            Err(e) => *self.rejections.entry(e.kind()).or_default() += 1,
        }
    }

    fn record_outcome(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::GameCreated { .. } => self.games_created += 1,
            Outcome::GameCancelled { .. } => self.games_cancelled += 1,
            Outcome::RoundSettled { winner, .. } => {
                self.rounds_settled += 1;
                match winner {
                    Side::Challenger => self.challenger_rounds += 1,
                    Side::Responder => self.responder_rounds += 1,
                }
            }
            Outcome::GameFinished { winner, .. } => {
                self.games_finished += 1;
                match winner {
                    Side::Challenger => self.challenger_games += 1,
                    Side::Responder => self.responder_games += 1,
                }
            }
            Outcome::GameFunded { .. }
            | Outcome::RoundStarted { .. }
            | Outcome::Responded { .. } => {}
        }
    }

    /// Rejections of one kind so far.
    pub fn rejections(&self, kind: ErrorKind) -> u64 {
        self.rejections.get(&kind).copied().unwrap_or(0)
    }

    /// Produce the final report.
    pub fn finalize(self, ledger: LedgerAudit, simulated_time: Duration) -> SimulationReport {
        SimulationReport {
            submissions: self.submissions,
            accepted: self.accepted,
            rejections: self.rejections,
            games_created: self.games_created,
            games_cancelled: self.games_cancelled,
            games_finished: self.games_finished,
            challenger_games: self.challenger_games,
            responder_games: self.responder_games,
            rounds_settled: self.rounds_settled,
            challenger_rounds: self.challenger_rounds,
            responder_rounds: self.responder_rounds,
            ledger,
            simulated_time_ms: u64::try_from(simulated_time.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// Ledger state checked at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerAudit {
    /// Sum of all balances before the first game.
    pub supply_before: u128,

    /// Sum of all balances after the last submission.
    pub supply_after: u128,

    /// Games whose escrow account disagrees with the escrow record.
    pub escrow_mismatches: u64,

    /// Funds still locked in unfinished games.
    pub locked: u128,
}

impl LedgerAudit {
    /// Whether no funds were created or destroyed and every escrow account
    /// matches its record.
    pub fn is_consistent(&self) -> bool {
        self.supply_before == self.supply_after && self.escrow_mismatches == 0
    }
}

/// Results of a simulation run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub submissions: u64,
    pub accepted: u64,
    pub rejections: BTreeMap<ErrorKind, u64>,
    pub games_created: u64,
    pub games_cancelled: u64,
    pub games_finished: u64,
    pub challenger_games: u64,
    pub responder_games: u64,
    pub rounds_settled: u64,
    pub challenger_rounds: u64,
    pub responder_rounds: u64,
    pub ledger: LedgerAudit,
    pub simulated_time_ms: u64,
}

impl SimulationReport {
    /// Total rejected submissions.
    pub fn rejected(&self) -> u64 {
        self.rejections.values().sum()
    }

    /// Rejections of one kind.
    pub fn rejections_of(&self, kind: ErrorKind) -> u64 {
        self.rejections.get(&kind).copied().unwrap_or(0)
    }

    /// Render the report as pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Print a human-readable summary.
    pub fn print(&self) {
        println!("=== Simulation Report ===");
        println!(
            "Simulated time:     {}",
            humantime::format_duration(Duration::from_millis(self.simulated_time_ms))
        );
        println!(
            "Submissions:        {} ({} accepted, {} rejected)",
            self.submissions,
            self.accepted,
            self.rejected()
        );
        println!(
            "Games:              {} created, {} finished, {} cancelled",
            self.games_created, self.games_finished, self.games_cancelled
        );
        println!(
            "Game winners:       challenger {}, responder {}",
            self.challenger_games, self.responder_games
        );
        println!(
            "Rounds settled:     {} (challenger {}, responder {})",
            self.rounds_settled, self.challenger_rounds, self.responder_rounds
        );
        if !self.rejections.is_empty() {
            println!("Rejections:");
            for (kind, count) in &self.rejections {
                println!("  {:<22} {}", kind.to_string(), count);
            }
        }
        println!(
            "Ledger:             supply {} -> {}, {} locked, {} escrow mismatches",
            self.ledger.supply_before,
            self.ledger.supply_after,
            self.ledger.locked,
            self.ledger.escrow_mismatches
        );
    }
}
