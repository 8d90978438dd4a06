//! Per-game participant behaviour.
//!
//! Each simulated game is driven by a [`GameDriver`], a small state machine
//! that decides what its two players submit next. Drivers are stepped once
//! per tick; a tick is a quarter of the round duration.

use crate::accounts::Player;
use crate::config::WorkloadConfig;
use crate::metrics::MetricsCollector;
use liveness_core::{Outcome, Receipt, Submission, SubmissionError};
use liveness_escrow::ErrorKind;
use liveness_ledger::{InMemoryLedger, ManualClock};
use liveness_node::SettlementRunner;
use liveness_types::{Amount, GameId};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;
use tracing::{debug, trace};

/// Shared state every driver submits through.
pub struct Session {
    pub runner: SettlementRunner<InMemoryLedger, ManualClock>,
    pub rng: ChaCha8Rng,
    pub metrics: MetricsCollector,
    pub workload: WorkloadConfig,
}

impl Session {
    /// Submit, record the result, and maybe send a duplicate afterwards.
    ///
    /// `moves_funds` marks submissions that pair with a ledger effect; those
    /// are exposed to injected ledger faults.
    fn submit(
        &mut self,
        submission: Submission,
        moves_funds: bool,
        duplicable: bool,
    ) -> Result<Receipt, SubmissionError> {
        if moves_funds && self.rng.gen_bool(self.workload.ledger_fault_ratio) {
            self.runner.ledger_mut().reject_next("injected fault");
        }

        let result = self.runner.submit(submission.clone());
        self.metrics.record(&result);
        trace!(operation = %submission.operation.kind(), ok = result.is_ok(), "Submitted");

        if let Ok(receipt) = &result {
            if duplicable && self.rng.gen_bool(self.workload.duplicate_ratio) {
                // Half the retries carry the sequence seen before the original
                // was committed, the other half rely on the state guards.
                let retry = if self.rng.gen_bool(0.5) {
                    submission.with_expected_sequence(receipt.sequence.saturating_sub(1))
                } else {
                    submission
                };
                let duplicate = self.runner.submit(retry);
                self.metrics.record(&duplicate);
                if duplicate.is_ok() {
                    debug!(game = %receipt.game, "Duplicate submission was accepted");
                }
            }
        }

        result
    }
}

/// Where a driver is in its game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Create,
    Join,
    Start,
    InRound {
        deadline: Duration,
        respond_at: Option<Duration>,
        late: bool,
    },
    Finish,
    Done,
}

/// Drives one game from creation to payout or cancellation.
#[derive(Debug, Clone)]
pub struct GameDriver {
    challenger: Player,
    responder: Player,
    pot: Amount,
    round_duration: Duration,
    win_threshold: u32,
    game: Option<GameId>,
    phase: Phase,
}

impl GameDriver {
    /// Create a driver for a game between two players.
    pub fn new(
        challenger: Player,
        responder: Player,
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
            game: None,
            phase: Phase::Create,
        }
    }

    /// Whether the game has reached a terminal state or was abandoned.
    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Take the next action for this game at time `now`.
    pub fn step(&mut self, session: &mut Session, now: Duration, tick: Duration) {
        self.phase = match (self.phase, self.game) {
            (Phase::Create, _) => self.create(session),
            (Phase::Done, _) => Phase::Done,
            (_, None) => Phase::Done,
            (Phase::Join, Some(game)) => self.join(session, game),
            (Phase::Start, Some(game)) => self.start(session, game, now, tick),
            (
                Phase::InRound {
                    deadline,
                    respond_at,
                    late,
                },
                Some(game),
            ) => self.in_round(session, game, now, deadline, respond_at, late),
            (Phase::Finish, Some(game)) => self.finish(session, game),
        };
    }

    fn create(&mut self, session: &mut Session) -> Phase {
        let submission = Submission::init_game(
            self.challenger.id,
            self.responder.id,
            self.pot,
            self.round_duration,
            self.win_threshold,
        );
        match session.submit(submission, true, false) {
            Ok(receipt) => {
                self.game = Some(receipt.game);
                Phase::Join
            }
            Err(e) if e.kind() == ErrorKind::LedgerFailure => Phase::Create,
            Err(e) => {
                debug!(error = %e, "Game could not be created, abandoning");
                Phase::Done
            }
        }
    }

    fn join(&mut self, session: &mut Session, game: GameId) -> Phase {
        if session.rng.gen_bool(session.workload.cancel_ratio) {
            let submission = Submission::cancel_game(self.challenger.id, game);
            return match session.submit(submission, true, true) {
                Ok(receipt) if receipt.outcome.is_terminal() => Phase::Done,
                _ => Phase::Join,
            };
        }

        let submission = Submission::join_game(self.responder.id, game, self.pot.half());
        match session.submit(submission, true, true) {
            Ok(_) => Phase::Start,
            Err(_) => Phase::Join,
        }
    }

    fn start(
        &mut self,
        session: &mut Session,
        game: GameId,
        now: Duration,
        tick: Duration,
    ) -> Phase {
        let submission = Submission::start_round(self.challenger.id, game);
        let deadline = match session.submit(submission, false, true) {
            Ok(Receipt {
                outcome: Outcome::RoundStarted { deadline, .. },
                ..
            }) => deadline,
            Ok(_) => return Phase::Start,
            Err(e) if e.kind() == ErrorKind::InvalidState => return Phase::Finish,
            Err(_) => return Phase::Start,
        };

        let workload = &session.workload;
        let (respond_at, late) = if session.rng.gen_bool(workload.responder_availability) {
            // One or two ticks in, always inside the window.
            let ticks = session.rng.gen_range(1..3u32);
            (Some(now + tick * ticks), false)
        } else {
            (None, session.rng.gen_bool(workload.late_response_ratio))
        };

        Phase::InRound {
            deadline,
            respond_at,
            late,
        }
    }

    fn in_round(
        &mut self,
        session: &mut Session,
        game: GameId,
        now: Duration,
        deadline: Duration,
        respond_at: Option<Duration>,
        late: bool,
    ) -> Phase {
        if let Some(at) = respond_at {
            if now >= at && now < deadline {
                let submission = Submission::respond_round(self.responder.id, game);
                let _ = session.submit(submission, false, true);
                return Phase::InRound {
                    deadline,
                    respond_at: None,
                    late,
                };
            }
        }

        if now < deadline {
            return Phase::InRound {
                deadline,
                respond_at,
                late,
            };
        }

        if late {
            let submission = Submission::respond_round(self.responder.id, game);
            let _ = session.submit(submission, false, false);
        }

        // Settlement is permissionless; either player may do it.
        let settler = if session.rng.gen_bool(0.5) {
            self.challenger.id
        } else {
            self.responder.id
        };
        match session.submit(Submission::end_round(settler, game), false, true) {
            Ok(_) => {}
            Err(_) => {
                return Phase::InRound {
                    deadline,
                    respond_at: None,
                    late: false,
                }
            }
        }

        let decided = session
            .runner
            .escrow(&game)
            .is_some_and(|escrow| escrow.scoreboard().has_winner().is_some());
        if decided {
            Phase::Finish
        } else {
            Phase::Start
        }
    }

    fn finish(&mut self, session: &mut Session, game: GameId) -> Phase {
        let caller = if session.rng.gen_bool(0.5) {
            self.challenger.id
        } else {
            self.responder.id
        };
        match session.submit(Submission::end_game(caller, game), true, true) {
            Ok(receipt) if receipt.outcome.is_terminal() => Phase::Done,
            _ => Phase::Finish,
        }
    }
}
