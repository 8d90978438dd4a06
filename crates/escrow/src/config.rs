//! Game configuration and admission limits.

use crate::{EscrowError, OperationKind};
use liveness_types::{Amount, ParticipantId, Side};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Immutable parameters of one game, fixed at `initGame`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Participant who created the game and starts every round.
    pub challenger: ParticipantId,

    /// Participant who must answer each round.
    pub responder: ParticipantId,

    /// Total stake. Each participant deposits exactly half.
    pub pot: Amount,

    /// How long the responder has to answer a round.
    pub round_duration: Duration,

    /// Round wins needed to take the pot.
    pub win_threshold: u32,
}

impl GameConfig {
    /// Create a new game configuration.
    pub fn new(
        challenger: ParticipantId,
        responder: ParticipantId,
        pot: Amount,
        round_duration: Duration,
        win_threshold: u32,
    ) -> Self {
        Self {
            challenger,
            responder,
            pot,
            round_duration,
            win_threshold,
        }
    }

    /// The deposit each participant must lock: exactly half the pot.
    pub fn stake(&self) -> Amount {
        self.pot.half()
    }

    /// The participant sitting on `side`.
    pub fn participant(&self, side: Side) -> ParticipantId {
        match side {
            Side::Challenger => self.challenger,
            Side::Responder => self.responder,
        }
    }

    /// Which side `id` sits on, if any.
    pub fn side_of(&self, id: &ParticipantId) -> Option<Side> {
        if *id == self.challenger {
            Some(Side::Challenger)
        } else if *id == self.responder {
            Some(Side::Responder)
        } else {
            None
        }
    }

    /// Validate the configuration against the node's admission limits.
    pub fn validate(&self, limits: &GameLimits) -> Result<(), EscrowError> {
        let invalid = |reason: String| EscrowError::InvalidConfig {
            operation: OperationKind::InitGame,
            reason,
        };

        if self.challenger == self.responder {
            return Err(invalid("challenger and responder must differ".into()));
        }
        if self.pot.is_zero() {
            return Err(invalid("pot must be greater than zero".into()));
        }
        if !self.pot.is_even() {
            return Err(invalid(format!(
                "pot {} cannot be split into two equal deposits",
                self.pot
            )));
        }
        if self.pot > limits.max_pot {
            return Err(invalid(format!(
                "pot {} exceeds the maximum of {}",
                self.pot, limits.max_pot
            )));
        }
        if self.round_duration < limits.min_round_duration
            || self.round_duration > limits.max_round_duration
        {
            return Err(invalid(format!(
                "round duration {:?} outside [{:?}, {:?}]",
                self.round_duration, limits.min_round_duration, limits.max_round_duration
            )));
        }
        if self.win_threshold == 0 || self.win_threshold > limits.max_win_threshold {
            return Err(invalid(format!(
                "win threshold {} outside [1, {}]",
                self.win_threshold, limits.max_win_threshold
            )));
        }

        Ok(())
    }
}

/// Admission limits applied to every new game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameLimits {
    /// Shortest round window accepted.
    pub min_round_duration: Duration,

    /// Longest round window accepted.
    pub max_round_duration: Duration,

    /// Largest win threshold accepted.
    pub max_win_threshold: u32,

    /// Largest pot accepted.
    pub max_pot: Amount,
}

impl Default for GameLimits {
    fn default() -> Self {
        Self {
            min_round_duration: Duration::from_millis(100),
            max_round_duration: Duration::from_secs(u32::MAX as u64),
            max_win_threshold: u8::MAX as u32,
            max_pot: Amount(u64::MAX - 1),
        }
    }
}

impl GameLimits {
    /// Set the accepted round duration range.
    pub fn with_round_duration_range(mut self, min: Duration, max: Duration) -> Self {
        self.min_round_duration = min;
        self.max_round_duration = max;
        self
    }

    /// Set the largest accepted win threshold.
    pub fn with_max_win_threshold(mut self, max: u32) -> Self {
        self.max_win_threshold = max;
        self
    }

    /// Set the largest accepted pot.
    pub fn with_max_pot(mut self, max: Amount) -> Self {
        self.max_pot = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GameConfig {
        GameConfig::new(
            ParticipantId::from_name("alice"),
            ParticipantId::from_name("bob"),
            Amount(10_000_000_000),
            Duration::from_secs(1),
            2,
        )
    }

    fn reason(result: Result<(), EscrowError>) -> String {
        match result {
            Err(EscrowError::InvalidConfig { reason, .. }) => reason,
            other => panic!("expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_config() {
        let config = config();
        assert!(config.validate(&GameLimits::default()).is_ok());
        assert_eq!(config.stake(), Amount(5_000_000_000));
        assert_eq!(config.side_of(&config.challenger), Some(Side::Challenger));
        assert_eq!(config.side_of(&config.responder), Some(Side::Responder));
        assert_eq!(config.side_of(&ParticipantId::from_name("carol")), None);
        assert_eq!(config.participant(Side::Responder), config.responder);
    }

    #[test]
    fn test_rejects_self_play() {
        let mut config = config();
        config.responder = config.challenger;
        assert!(reason(config.validate(&GameLimits::default())).contains("must differ"));
    }

    #[test]
    fn test_rejects_odd_and_empty_pot() {
        let mut config = config();
        config.pot = Amount(7);
        assert!(reason(config.validate(&GameLimits::default())).contains("two equal"));

        config.pot = Amount::ZERO;
        assert!(reason(config.validate(&GameLimits::default())).contains("greater than zero"));
    }

    #[test]
    fn test_rejects_out_of_range_parameters() {
        let limits = GameLimits::default()
            .with_round_duration_range(Duration::from_secs(1), Duration::from_secs(60))
            .with_max_win_threshold(5)
            .with_max_pot(Amount(1_000));

        let mut config = config();
        config.pot = Amount(1_000);

        config.round_duration = Duration::from_millis(500);
        assert!(reason(config.validate(&limits)).contains("round duration"));
        config.round_duration = Duration::from_secs(61);
        assert!(reason(config.validate(&limits)).contains("round duration"));
        config.round_duration = Duration::from_secs(1);

        config.win_threshold = 0;
        assert!(reason(config.validate(&limits)).contains("win threshold"));
        config.win_threshold = 6;
        assert!(reason(config.validate(&limits)).contains("win threshold"));
        config.win_threshold = 5;

        config.pot = Amount(1_002);
        assert!(reason(config.validate(&limits)).contains("maximum"));
    }
}
