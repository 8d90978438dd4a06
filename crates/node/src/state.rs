//! Escrow node state machine.

use crate::NodeConfig;
use indexmap::IndexMap;
use liveness_core::{
    Action, Event, Operation, Outcome, Receipt, RequestId, StateMachine, Submission,
    SubmissionError,
};
use liveness_escrow::{Escrow, EscrowError, GameConfig, OperationKind};
use liveness_types::{GameId, LedgerEffect, ParticipantId};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// One game in the arena.
#[derive(Debug, Clone)]
struct GameSlot {
    escrow: Escrow,
    /// Committed transitions so far; zero before the game is created.
    sequence: u64,
    /// Request whose ledger effect is outstanding. The game accepts no other
    /// operation until it resolves.
    in_flight: Option<RequestId>,
}

/// A transition computed on a copy of the escrow, waiting to be committed.
#[derive(Debug, Clone)]
struct StagedTransition {
    game: GameId,
    operation: OperationKind,
    escrow: Escrow,
    outcome: Outcome,
}

/// Result of validating a submission.
struct Staged {
    transition: StagedTransition,
    effect: Option<LedgerEffect>,
}

/// Settlement node owning every game.
///
/// Games live in an arena keyed by [`GameId`]. Each submission is validated
/// against the current slot and applied to a copy of its escrow. Transitions
/// without a ledger effect commit at once; the others commit only after the
/// runner reports the effect as applied, and are dropped if it fails. Every
/// commit bumps the slot's sequence number.
pub struct EscrowNode {
    config: NodeConfig,
    games: IndexMap<GameId, GameSlot>,
    staged: HashMap<RequestId, StagedTransition>,
    /// Next game nonce per challenger.
    nonces: HashMap<ParticipantId, u64>,
    now: Duration,
}

impl EscrowNode {
    /// Create an empty node.
    pub fn new(config: NodeConfig) -> Self {
        Self {
            config,
            games: IndexMap::new(),
            staged: HashMap::new(),
            nonces: HashMap::new(),
            now: Duration::ZERO,
        }
    }

    /// Node configuration.
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Escrow of a committed game.
    pub fn escrow(&self, game: &GameId) -> Option<&Escrow> {
        self.games.get(game).map(|slot| &slot.escrow)
    }

    /// Sequence number of a committed game.
    pub fn sequence(&self, game: &GameId) -> Option<u64> {
        self.games.get(game).map(|slot| slot.sequence)
    }

    /// Whether a game is waiting for a ledger effect.
    pub fn is_in_flight(&self, game: &GameId) -> bool {
        self.games
            .get(game)
            .is_some_and(|slot| slot.in_flight.is_some())
    }

    /// All committed games, in creation order.
    pub fn games(&self) -> impl Iterator<Item = (&GameId, &Escrow)> {
        self.games.iter().map(|(id, slot)| (id, &slot.escrow))
    }

    /// Number of committed games.
    pub fn game_count(&self) -> usize {
        self.games.len()
    }

    /// Number of transitions waiting for the ledger.
    pub fn staged_count(&self) -> usize {
        self.staged.len()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Event Handlers
    // ═══════════════════════════════════════════════════════════════════════

    fn on_submission(&mut self, request_id: RequestId, submission: Submission) -> Vec<Action> {
        let kind = submission.operation.kind();
        let Staged { transition, effect } = match self.stage(&submission) {
            Ok(staged) => staged,
            Err(error) => {
                debug!(
                    %request_id,
                    operation = %kind,
                    caller = %submission.caller,
                    %error,
                    "Submission rejected"
                );
                return vec![Action::EmitOutcome {
                    request_id,
                    result: Err(error),
                }];
            }
        };

        match effect {
            None => {
                let receipt = self.commit(transition);
                vec![Action::EmitOutcome {
                    request_id,
                    result: Ok(receipt),
                }]
            }
            Some(effect) => {
                if let Some(slot) = self.games.get_mut(&transition.game) {
                    slot.in_flight = Some(request_id);
                }
                debug!(
                    %request_id,
                    game = %transition.game,
                    operation = %kind,
                    effect = effect.type_name(),
                    amount = %effect.amount(),
                    "Transition staged, awaiting ledger"
                );
                self.staged.insert(request_id, transition);
                vec![Action::ApplyLedgerEffect { request_id, effect }]
            }
        }
    }

    fn on_effect_applied(&mut self, request_id: RequestId) -> Vec<Action> {
        let Some(transition) = self.staged.remove(&request_id) else {
            warn!(%request_id, "Ledger confirmation for unknown request");
            return vec![];
        };
        let receipt = self.commit(transition);
        vec![Action::EmitOutcome {
            request_id,
            result: Ok(receipt),
        }]
    }

    fn on_effect_failed(&mut self, request_id: RequestId, reason: String) -> Vec<Action> {
        let Some(transition) = self.staged.remove(&request_id) else {
            warn!(%request_id, "Ledger failure for unknown request");
            return vec![];
        };
        if let Some(slot) = self.games.get_mut(&transition.game) {
            slot.in_flight = None;
        }
        warn!(
            %request_id,
            game = %transition.game,
            operation = %transition.operation,
            %reason,
            "Ledger rejected effect, transition discarded"
        );
        vec![Action::EmitOutcome {
            request_id,
            result: Err(SubmissionError::LedgerFailure {
                operation: transition.operation,
                reason,
            }),
        }]
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Staging
    // ═══════════════════════════════════════════════════════════════════════

    /// Validate a submission and compute its transition without committing.
    fn stage(&mut self, submission: &Submission) -> Result<Staged, SubmissionError> {
        let caller = submission.caller;

        let staged = match &submission.operation {
            Operation::InitGame {
                responder,
                pot,
                round_duration,
                win_threshold,
                deposit,
            } => {
                if let Some(expected) = submission.expected_sequence {
                    if expected != 0 {
                        return Err(SubmissionError::StaleSequence {
                            game: self.peek_game_id(&caller),
                            expected,
                            actual: 0,
                        });
                    }
                }
                let config =
                    GameConfig::new(caller, *responder, *pot, *round_duration, *win_threshold);
                let game = self.peek_game_id(&caller);
                let (escrow, effect) =
                    Escrow::open(game, config, *deposit, &self.config.limits)?;
                // Burn the nonce even if the ledger later refuses the deposit,
                // so a game id is never handed out twice.
                *self.nonces.entry(caller).or_default() += 1;

                Staged {
                    transition: StagedTransition {
                        game,
                        operation: OperationKind::InitGame,
                        outcome: Outcome::GameCreated {
                            stake: escrow.config().stake(),
                        },
                        escrow,
                    },
                    effect: Some(effect),
                }
            }
            operation => {
                let Some(game) = operation.game() else {
                    unreachable!("only initGame has no target game");
                };
                let slot = self
                    .games
                    .get(&game)
                    .ok_or(SubmissionError::UnknownGame(game))?;
                if slot.in_flight.is_some() {
                    return Err(SubmissionError::SettlementInFlight { game });
                }
                if let Some(expected) = submission.expected_sequence {
                    if expected != slot.sequence {
                        return Err(SubmissionError::StaleSequence {
                            game,
                            expected,
                            actual: slot.sequence,
                        });
                    }
                }

                let mut escrow = slot.escrow.clone();
                let (outcome, effect) = apply(&mut escrow, operation, &caller, self.now)?;
                Staged {
                    transition: StagedTransition {
                        game,
                        operation: operation.kind(),
                        escrow,
                        outcome,
                    },
                    effect,
                }
            }
        };

        if let Err(violation) = staged.transition.escrow.check_invariants() {
            panic!(
                "escrow invariant violated by {} on {}: {}",
                staged.transition.operation, staged.transition.game, violation
            );
        }

        Ok(staged)
    }

    /// Game id the next `initGame` from `challenger` would get.
    fn peek_game_id(&self, challenger: &ParticipantId) -> GameId {
        let nonce = self.nonces.get(challenger).copied().unwrap_or(0);
        GameId::derive(&self.config.domain, challenger, nonce)
    }

    /// Install a staged transition and bump the game's sequence.
    fn commit(&mut self, transition: StagedTransition) -> Receipt {
        let StagedTransition {
            game,
            operation,
            escrow,
            outcome,
        } = transition;

        let sequence = match self.games.get_mut(&game) {
            Some(slot) => {
                slot.escrow = escrow;
                slot.sequence += 1;
                slot.in_flight = None;
                slot.sequence
            }
            None => {
                self.games.insert(
                    game,
                    GameSlot {
                        escrow,
                        sequence: 1,
                        in_flight: None,
                    },
                );
                1
            }
        };

        log_commit(game, operation, sequence, &outcome);

        Receipt {
            game,
            sequence,
            outcome,
        }
    }
}

/// Run one operation against an escrow copy.
fn apply(
    escrow: &mut Escrow,
    operation: &Operation,
    caller: &ParticipantId,
    now: Duration,
) -> Result<(Outcome, Option<LedgerEffect>), EscrowError> {
    Ok(match operation {
        Operation::InitGame { .. } => unreachable!("initGame is staged without an escrow"),
        Operation::JoinGame { deposit, .. } => {
            let effect = escrow.join(caller, *deposit)?;
            let pot = escrow.config().pot;
            (Outcome::GameFunded { pot }, Some(effect))
        }
        Operation::CancelGame { .. } => {
            let effect = escrow.cancel(caller)?;
            (
                Outcome::GameCancelled {
                    refund: effect.amount(),
                },
                Some(effect),
            )
        }
        Operation::StartRound { .. } => {
            let round = escrow.start_round(caller, now)?;
            let deadline = escrow
                .round_timer()
                .map(|timer| timer.deadline())
                .unwrap_or(now);
            (Outcome::RoundStarted { round, deadline }, None)
        }
        Operation::RespondRound { .. } => {
            let round = escrow.respond_round(caller, now)?;
            (Outcome::Responded { round }, None)
        }
        Operation::EndRound { .. } => {
            let round = escrow.round_number();
            let winner = escrow.end_round(now)?;
            (Outcome::RoundSettled { round, winner }, None)
        }
        Operation::EndGame { .. } => {
            let (winner, effect) = escrow.end_game()?;
            (
                Outcome::GameFinished {
                    winner,
                    payout: effect.amount(),
                },
                Some(effect),
            )
        }
    })
}

fn log_commit(game: GameId, operation: OperationKind, sequence: u64, outcome: &Outcome) {
    debug!(%game, %operation, sequence, outcome = outcome.type_name(), "Transition committed");
    match outcome {
        Outcome::GameCreated { stake } => {
            info!(%game, sequence, %stake, "Game created")
        }
        Outcome::GameFunded { pot } => info!(%game, sequence, %pot, "Game funded"),
        Outcome::GameCancelled { refund } => {
            info!(%game, sequence, %refund, "Game cancelled, challenger refunded")
        }
        Outcome::RoundStarted { round, deadline } => {
            debug!(%game, sequence, %round, deadline = ?deadline, "Round started")
        }
        Outcome::Responded { round } => debug!(%game, sequence, %round, "Responder answered"),
        Outcome::RoundSettled { round, winner } => {
            debug!(%game, sequence, %round, %winner, "Round settled")
        }
        Outcome::GameFinished { winner, payout } => {
            info!(%game, sequence, %winner, %payout, "Game finished")
        }
    }
}

impl StateMachine for EscrowNode {
    fn handle(&mut self, event: Event) -> Vec<Action> {
        match event {
            Event::OperationSubmitted {
                request_id,
                submission,
            } => self.on_submission(request_id, submission),
            Event::LedgerEffectApplied { request_id } => self.on_effect_applied(request_id),
            Event::LedgerEffectFailed { request_id, reason } => {
                self.on_effect_failed(request_id, reason)
            }
        }
    }

    fn set_time(&mut self, now: Duration) {
        self.now = now;
    }

    fn now(&self) -> Duration {
        self.now
    }
}
