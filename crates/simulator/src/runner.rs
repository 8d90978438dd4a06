//! Simulation loop.

use crate::accounts::PlayerPool;
use crate::config::{ConfigError, SimulatorConfig};
use crate::metrics::{LedgerAudit, MetricsCollector, SimulationReport};
use crate::workload::{GameDriver, Session};
use liveness_ledger::{Clock, InMemoryLedger, Ledger, LedgerError, ManualClock};
use liveness_node::{NodeConfig, SettlementRunner};
use liveness_types::AccountId;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Errors setting up a simulation.
#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to fund players: {0}")]
    Funding(#[from] LedgerError),
}

/// Deterministic game simulator.
///
/// Plays `config.games` games concurrently against one settlement node, on a
/// manual clock. The same config and seed always produce the same report.
pub struct Simulator {
    config: SimulatorConfig,
    session: Session,
    clock: ManualClock,
    drivers: Vec<GameDriver>,
    supply_before: u128,
}

impl Simulator {
    /// Set up players, ledger and node.
    pub fn new(config: SimulatorConfig) -> Result<Self, SimulatorError> {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let pool = PlayerPool::new(config.players);
        let mut ledger = InMemoryLedger::new();
        pool.fund_all(&mut ledger, config.starting_balance)?;
        let supply_before = ledger.total();

        let drivers = (0..config.games)
            .filter_map(|_| pool.pair(&mut rng))
            .map(|(challenger, responder)| {
                GameDriver::new(
                    challenger,
                    responder,
                    config.pot,
                    config.round_duration,
                    config.win_threshold,
                )
            })
            .collect();

        let clock = ManualClock::new();
        let node_config = NodeConfig::default().with_limits(config.limits());
        let runner = SettlementRunner::new(node_config, ledger, clock.clone());

        Ok(Self {
            session: Session {
                runner,
                rng,
                metrics: MetricsCollector::new(),
                workload: config.workload.clone(),
            },
            config,
            clock,
            drivers,
            supply_before,
        })
    }

    /// Time advanced per tick.
    fn tick(&self) -> Duration {
        (self.config.round_duration / 4).max(Duration::from_nanos(1))
    }

    /// Upper bound on ticks, so a run with a permanently failing ledger ends.
    fn max_ticks(&self) -> u64 {
        let rounds = u64::from(self.config.win_threshold.max(1)) * 2;
        // Create, join, finish and every round's start, respond and settle,
        // with generous room for retries.
        (rounds * 8 + 16) * 4 + self.config.games as u64
    }

    /// Run until every game is done or the tick budget is spent.
    pub fn run(mut self) -> SimulationReport {
        info!(
            games = self.drivers.len(),
            players = self.config.players,
            seed = self.config.seed,
            "Starting simulation"
        );

        let tick = self.tick();
        let max_ticks = self.max_ticks();
        let mut ticks = 0;
        let mut order: Vec<usize> = (0..self.drivers.len()).collect();

        while ticks < max_ticks && self.drivers.iter().any(|d| !d.is_done()) {
            order.shuffle(&mut self.session.rng);
            let now = self.clock.now();
            for &i in &order {
                self.drivers[i].step(&mut self.session, now, tick);
            }
            self.clock.advance(tick);
            ticks += 1;
        }

        let unfinished = self.drivers.iter().filter(|d| !d.is_done()).count();
        if unfinished > 0 {
            warn!(unfinished, ticks, "Tick budget exhausted with games still open");
        }

        let audit = self.audit();
        let report = self.session.metrics.finalize(audit, self.clock.now());
        info!(
            submissions = report.submissions,
            finished = report.games_finished,
            cancelled = report.games_cancelled,
            "Simulation complete"
        );
        report
    }

    /// Compare the ledger against the node's escrow records.
    fn audit(&self) -> LedgerAudit {
        let runner = &self.session.runner;
        let ledger = runner.ledger();

        let mut escrow_mismatches = 0;
        let mut locked: u128 = 0;
        for (game, escrow) in runner.node().games() {
            let balance = ledger.balance_of(&AccountId::Escrow(*game));
            if balance != escrow.held() {
                warn!(%game, %balance, held = %escrow.held(), "Escrow account mismatch");
                escrow_mismatches += 1;
            }
            locked += u128::from(balance.get());
        }

        LedgerAudit {
            supply_before: self.supply_before,
            supply_after: ledger.total(),
            escrow_mismatches,
            locked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorkloadConfig;
    use liveness_escrow::ErrorKind;
    use liveness_types::Amount;
    use tracing_test::traced_test;

    fn quick(games: usize) -> SimulatorConfig {
        SimulatorConfig::new(games)
            .with_players(4)
            .with_round_duration(Duration::from_millis(100))
    }

    #[traced_test]
    #[test]
    fn test_honest_run_finishes_every_game() {
        let config = quick(10).with_workload(WorkloadConfig::honest());
        let report = Simulator::new(config).unwrap().run();

        assert_eq!(report.games_created, 10);
        assert_eq!(report.games_finished, 10);
        assert_eq!(report.responder_games, 10);
        assert_eq!(report.rejected(), 0);
        assert!(report.ledger.is_consistent());
        assert_eq!(report.ledger.locked, 0);
        assert!(logs_contain("Simulation complete"));
    }

    #[test]
    fn test_absent_responders_lose() {
        let workload = WorkloadConfig::honest().with_responder_availability(0.0);
        let report = Simulator::new(quick(5).with_workload(workload))
            .unwrap()
            .run();

        assert_eq!(report.challenger_games, 5);
        assert_eq!(report.responder_rounds, 0);
        assert_eq!(report.rounds_settled, 10);
    }

    #[test]
    fn test_adversarial_run_stays_consistent() {
        let workload = WorkloadConfig::default()
            .with_duplicate_ratio(0.5)
            .with_late_response_ratio(1.0)
            .with_responder_availability(0.3)
            .with_ledger_fault_ratio(0.2)
            .with_cancel_ratio(0.1);
        let report = Simulator::new(quick(40).with_seed(99).with_workload(workload))
            .unwrap()
            .run();

        assert!(report.ledger.is_consistent());
        assert_eq!(
            report.games_finished + report.games_cancelled,
            report.games_created
        );
        assert!(report.rejections_of(ErrorKind::LedgerFailure) > 0);
        assert!(report.rejections_of(ErrorKind::RoundAlreadySettled) > 0);
        assert!(
            report.rejections_of(ErrorKind::StaleSequence)
                + report.rejections_of(ErrorKind::InvalidState)
                + report.rejections_of(ErrorKind::AlreadyResponded)
                > 0
        );
    }

    #[test]
    fn test_same_seed_same_report() {
        let config = quick(20).with_seed(5);
        let a = Simulator::new(config.clone()).unwrap().run();
        let b = Simulator::new(config).unwrap().run();
        assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
    }

    #[test]
    fn test_invalid_game_parameters_are_reported() {
        let config = quick(3).with_pot(Amount(7));
        let report = Simulator::new(config).unwrap().run();

        assert_eq!(report.games_created, 0);
        assert_eq!(report.rejections_of(ErrorKind::InvalidConfig), 3);
        assert!(report.ledger.is_consistent());
    }

    #[test]
    fn test_rejects_single_player() {
        let config = quick(1).with_players(1);
        assert!(matches!(
            Simulator::new(config),
            Err(SimulatorError::Config(_))
        ));
    }
}
