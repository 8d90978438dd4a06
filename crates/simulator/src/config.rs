//! Configuration types for the simulator.

use liveness_escrow::GameLimits;
use liveness_types::Amount;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors loading a simulator configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid simulator config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid simulator config: {0}")]
    Invalid(String),
}

/// Configuration for a simulation run.
///
/// Every field has a default, so a TOML file only needs to name what it
/// changes:
///
/// ```toml
/// games = 200
/// round_duration = "500ms"
/// responder_availability = 0.3
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Number of games to play.
    pub games: usize,

    /// Number of participants to draw challengers and responders from.
    pub players: usize,

    /// Initial wallet balance of each participant.
    pub starting_balance: Amount,

    /// Pot of every game.
    pub pot: Amount,

    /// Response window of every round.
    #[serde(with = "humantime_serde")]
    pub round_duration: Duration,

    /// Round wins needed to take the pot.
    pub win_threshold: u32,

    /// Random seed for deterministic simulation.
    pub seed: u64,

    /// Workload behaviour.
    pub workload: WorkloadConfig,
}

impl SimulatorConfig {
    /// Create a configuration for `games` games with default behaviour.
    pub fn new(games: usize) -> Self {
        Self {
            games,
            players: 8,
            starting_balance: Amount(1_000_000_000_000),
            pot: Amount(10_000_000_000),
            round_duration: Duration::from_secs(1),
            win_threshold: 2,
            seed: 12345,
            workload: WorkloadConfig::default(),
        }
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check the parameters that would make the run meaningless.
    ///
    /// Game parameters themselves are not checked here; invalid games are
    /// rejected by the node and show up in the report.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.players < 2 {
            return Err(ConfigError::Invalid(format!(
                "need at least 2 players, got {}",
                self.players
            )));
        }
        if self.round_duration.is_zero() {
            return Err(ConfigError::Invalid("round duration must be non-zero".into()));
        }
        self.workload.validate()
    }

    /// Set the number of games.
    pub fn with_games(mut self, games: usize) -> Self {
        self.games = games;
        self
    }

    /// Set the number of players.
    pub fn with_players(mut self, players: usize) -> Self {
        self.players = players;
        self
    }

    /// Set the pot of every game.
    pub fn with_pot(mut self, pot: Amount) -> Self {
        self.pot = pot;
        self
    }

    /// Set the round duration.
    pub fn with_round_duration(mut self, duration: Duration) -> Self {
        self.round_duration = duration;
        self
    }

    /// Set the win threshold.
    pub fn with_win_threshold(mut self, threshold: u32) -> Self {
        self.win_threshold = threshold;
        self
    }

    /// Set the workload configuration.
    pub fn with_workload(mut self, workload: WorkloadConfig) -> Self {
        self.workload = workload;
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Admission limits for the simulated node.
    ///
    /// The defaults reject rounds shorter than 100ms; the simulator runs on a
    /// manual clock, so it allows anything down to one millisecond.
    pub fn limits(&self) -> GameLimits {
        let limits = GameLimits::default();
        let max = limits.max_round_duration;
        limits.with_round_duration_range(Duration::from_millis(1), max)
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self::new(100)
    }
}

/// How participants behave.
///
/// Ratios are probabilities in `[0, 1]`. The builders clamp; values read from
/// a file are rejected by [`WorkloadConfig::validate`] instead.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkloadConfig {
    /// Chance that the responder answers a round inside its window.
    pub responder_availability: f64,

    /// Chance that a responder who missed the window answers late anyway.
    pub late_response_ratio: f64,

    /// Chance that an accepted submission is sent a second time.
    pub duplicate_ratio: f64,

    /// Chance that a challenger cancels instead of waiting for the join.
    pub cancel_ratio: f64,

    /// Chance that the ledger refuses a funds movement.
    pub ledger_fault_ratio: f64,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            responder_availability: 0.5,
            late_response_ratio: 0.2,
            duplicate_ratio: 0.1,
            cancel_ratio: 0.05,
            ledger_fault_ratio: 0.02,
        }
    }
}

impl WorkloadConfig {
    /// Check that every ratio is a probability.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ratios = [
            ("responder_availability", self.responder_availability),
            ("late_response_ratio", self.late_response_ratio),
            ("duplicate_ratio", self.duplicate_ratio),
            ("cancel_ratio", self.cancel_ratio),
            ("ledger_fault_ratio", self.ledger_fault_ratio),
        ];
        for (name, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Well-behaved participants and a reliable ledger.
    pub fn honest() -> Self {
        Self {
            responder_availability: 1.0,
            late_response_ratio: 0.0,
            duplicate_ratio: 0.0,
            cancel_ratio: 0.0,
            ledger_fault_ratio: 0.0,
        }
    }

    /// Set the responder availability.
    pub fn with_responder_availability(mut self, ratio: f64) -> Self {
        self.responder_availability = ratio.clamp(0.0, 1.0);
        self
    }

    /// Set the late response ratio.
    pub fn with_late_response_ratio(mut self, ratio: f64) -> Self {
        self.late_response_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    /// Set the duplicate submission ratio.
    pub fn with_duplicate_ratio(mut self, ratio: f64) -> Self {
        self.duplicate_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    /// Set the cancel ratio.
    pub fn with_cancel_ratio(mut self, ratio: f64) -> Self {
        self.cancel_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    /// Set the ledger fault ratio.
    pub fn with_ledger_fault_ratio(mut self, ratio: f64) -> Self {
        self.ledger_fault_ratio = ratio.clamp(0.0, 1.0);
        self
    }
}
