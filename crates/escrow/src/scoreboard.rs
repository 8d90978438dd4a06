//! Win counting and payout computation.

use liveness_types::{Amount, Side};
use serde::{Deserialize, Serialize};

/// Round-win counters for both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    challenger_wins: u32,
    responder_wins: u32,
    win_threshold: u32,
}

impl Scoreboard {
    /// Create an empty scoreboard.
    pub fn new(win_threshold: u32) -> Self {
        Self {
            challenger_wins: 0,
            responder_wins: 0,
            win_threshold,
        }
    }

    /// Credit one round to `side`.
    pub fn record(&mut self, side: Side) {
        match side {
            Side::Challenger => self.challenger_wins += 1,
            Side::Responder => self.responder_wins += 1,
        }
    }

    /// Rounds won by `side`.
    pub fn wins(&self, side: Side) -> u32 {
        match side {
            Side::Challenger => self.challenger_wins,
            Side::Responder => self.responder_wins,
        }
    }

    /// Round wins needed to take the pot.
    pub fn win_threshold(&self) -> u32 {
        self.win_threshold
    }

    /// Rounds scored so far.
    pub fn rounds_scored(&self) -> u64 {
        self.challenger_wins as u64 + self.responder_wins as u64
    }

    /// The side that has reached the threshold, if any.
    ///
    /// # Panics
    ///
    /// Panics if both sides are at the threshold. Each settled round credits
    /// exactly one side and no round starts once a side has won, so this can
    /// only happen through a logic defect.
    pub fn has_winner(&self) -> Option<Side> {
        let challenger = self.challenger_wins >= self.win_threshold;
        let responder = self.responder_wins >= self.win_threshold;
        assert!(
            !(challenger && responder),
            "both sides reached the win threshold ({} / {} of {})",
            self.challenger_wins,
            self.responder_wins,
            self.win_threshold
        );

        match (challenger, responder) {
            (true, _) => Some(Side::Challenger),
            (_, true) => Some(Side::Responder),
            _ => None,
        }
    }
}

/// Amount paid to the winner out of `pot`.
///
/// The winner takes the entire pot. Proportional or partial payout variants
/// would hook in here.
pub fn compute_payout(pot: Amount, _winner: Side) -> Amount {
    pot
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_to_threshold_wins() {
        let mut scoreboard = Scoreboard::new(2);
        assert_eq!(scoreboard.has_winner(), None);

        scoreboard.record(Side::Challenger);
        scoreboard.record(Side::Responder);
        assert_eq!(scoreboard.has_winner(), None);
        assert_eq!(scoreboard.rounds_scored(), 2);

        scoreboard.record(Side::Responder);
        assert_eq!(scoreboard.has_winner(), Some(Side::Responder));
        assert_eq!(scoreboard.wins(Side::Responder), 2);
        assert_eq!(scoreboard.wins(Side::Challenger), 1);
    }

    #[test]
    #[should_panic(expected = "both sides reached the win threshold")]
    fn test_double_winner_is_fatal() {
        let mut scoreboard = Scoreboard::new(1);
        scoreboard.record(Side::Challenger);
        scoreboard.record(Side::Responder);
        scoreboard.has_winner();
    }

    #[test]
    fn test_payout_is_whole_pot() {
        let pot = Amount(10_000_000_000);
        assert_eq!(compute_payout(pot, Side::Challenger), pot);
        assert_eq!(compute_payout(pot, Side::Responder), pot);
    }
}
