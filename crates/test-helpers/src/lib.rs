//! Shared fixtures for liveness escrow tests.
//!
//! The standard game matches the reference scenarios: a pot of
//! 10,000,000,000 units, one-second rounds and two wins to take the pot.

use liveness_core::{Receipt, Submission, SubmissionError};
use liveness_ledger::{InMemoryLedger, Ledger, ManualClock};
use liveness_node::{NodeConfig, SettlementRunner};
use liveness_types::{AccountId, Amount, GameId, ParticipantId};
use std::time::Duration;

/// Pot of the standard game.
pub const POT: Amount = Amount(10_000_000_000);

/// Round duration of the standard game.
pub const ROUND_DURATION: Duration = Duration::from_secs(1);

/// Win threshold of the standard game.
pub const WIN_THRESHOLD: u32 = 2;

/// Wallet balance each standard participant starts with.
pub const STARTING_BALANCE: Amount = Amount(50_000_000_000);

/// Runner type used throughout the tests.
pub type TestRunner = SettlementRunner<InMemoryLedger, ManualClock>;

/// The standard challenger.
pub fn alice() -> ParticipantId {
    ParticipantId::from_name("alice")
}

/// The standard responder.
pub fn bob() -> ParticipantId {
    ParticipantId::from_name("bob")
}

/// A bystander with a funded wallet and no seat in any game.
pub fn carol() -> ParticipantId {
    ParticipantId::from_name("carol")
}

/// Ledger with alice, bob and carol each holding [`STARTING_BALANCE`].
pub fn funded_ledger() -> InMemoryLedger {
    let mut ledger = InMemoryLedger::new();
    for participant in [alice(), bob(), carol()] {
        ledger
            .fund(participant, STARTING_BALANCE)
            .expect("starting balance fits in a fresh ledger");
    }
    ledger
}

/// Test harness: a runner on a funded ledger plus a handle on its clock.
pub struct Harness {
    pub runner: TestRunner,
    pub clock: ManualClock,
}

impl Harness {
    /// Runner with default node config, funded ledger and clock at zero.
    pub fn new() -> Self {
        Self::with_config(NodeConfig::default())
    }

    /// Runner with the given node config.
    pub fn with_config(config: NodeConfig) -> Self {
        let clock = ManualClock::new();
        let runner = SettlementRunner::new(config, funded_ledger(), clock.clone());
        Self { runner, clock }
    }

    /// Submit an operation.
    pub fn submit(&mut self, submission: Submission) -> Result<Receipt, SubmissionError> {
        self.runner.submit(submission)
    }

    /// Move time forward.
    pub fn advance(&self, delta: Duration) {
        self.clock.advance(delta);
    }

    /// Balance of a participant's wallet.
    pub fn wallet(&self, participant: ParticipantId) -> Amount {
        self.runner
            .ledger()
            .balance_of(&AccountId::Participant(participant))
    }

    /// Balance of a game's escrow account.
    pub fn escrow_balance(&self, game: GameId) -> Amount {
        self.runner.ledger().balance_of(&AccountId::Escrow(game))
    }

    /// Create the standard game between alice and bob.
    pub fn create_game(&mut self) -> Result<GameId, SubmissionError> {
        let receipt = self.submit(Submission::init_game(
            alice(),
            bob(),
            POT,
            ROUND_DURATION,
            WIN_THRESHOLD,
        ))?;
        Ok(receipt.game)
    }

    /// Create and fund the standard game.
    pub fn funded_game(&mut self) -> Result<GameId, SubmissionError> {
        let game = self.create_game()?;
        self.submit(Submission::join_game(bob(), game, POT.half()))?;
        Ok(game)
    }

    /// Play one round: start it, optionally respond halfway through the
    /// window, then settle it right after the deadline.
    pub fn play_round(&mut self, game: GameId, respond: bool) -> Result<Receipt, SubmissionError> {
        self.submit(Submission::start_round(alice(), game))?;
        if respond {
            self.advance(ROUND_DURATION / 2);
            self.submit(Submission::respond_round(bob(), game))?;
            self.advance(ROUND_DURATION / 2);
        } else {
            self.advance(ROUND_DURATION);
        }
        self.advance(Duration::from_millis(1));
        self.submit(Submission::end_round(carol(), game))
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
