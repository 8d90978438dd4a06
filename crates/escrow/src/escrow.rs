//! The escrow record and its guarded transitions.

use crate::{
    compute_payout, EscrowError, EscrowState, GameConfig, GameLimits, InvariantViolation,
    OperationKind, RoundTimer, Scoreboard,
};
use liveness_types::{Amount, GameId, LedgerEffect, ParticipantId, RoundNumber, Side};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Mutable state of one game.
///
/// Every operation checks all of its guards before touching any field, so a
/// rejected operation leaves the escrow unchanged. Guards are evaluated in a
/// fixed order:
///
/// 1. terminal state → [`EscrowError::InvalidState`]
/// 2. caller identity → [`EscrowError::Unauthorized`]
/// 3. state, timing and amount guards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Escrow {
    id: GameId,
    config: GameConfig,
    state: EscrowState,
    round: RoundNumber,
    scoreboard: Scoreboard,
    deposited_challenger: Amount,
    deposited_responder: Amount,
    released: Amount,
}

impl Escrow {
    // ═══════════════════════════════════════════════════════════════════════
    // Creation
    // ═══════════════════════════════════════════════════════════════════════

    /// `initGame`: open a new escrow with the challenger's half locked.
    ///
    /// The challenger is `config.challenger`. Returns the escrow together with
    /// the deposit the ledger must apply before the game exists.
    pub fn open(
        id: GameId,
        config: GameConfig,
        deposit: Amount,
        limits: &GameLimits,
    ) -> Result<(Self, LedgerEffect), EscrowError> {
        config.validate(limits)?;
        let stake = config.stake();
        require_stake(OperationKind::InitGame, stake, deposit)?;

        let effect = LedgerEffect::Deposit {
            from: config.challenger,
            game: id,
            amount: stake,
        };
        let escrow = Self {
            id,
            scoreboard: Scoreboard::new(config.win_threshold),
            config,
            state: EscrowState::Initialized,
            round: RoundNumber::NONE,
            deposited_challenger: stake,
            deposited_responder: Amount::ZERO,
            released: Amount::ZERO,
        };

        Ok((escrow, effect))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Funding
    // ═══════════════════════════════════════════════════════════════════════

    /// `joinGame`: the responder locks its half and the game becomes funded.
    pub fn join(
        &mut self,
        caller: &ParticipantId,
        deposit: Amount,
    ) -> Result<LedgerEffect, EscrowError> {
        let operation = OperationKind::JoinGame;
        self.require_live(operation)?;
        self.require_caller(operation, caller, Side::Responder)?;
        if self.state != EscrowState::Initialized {
            return Err(self.invalid_state(operation));
        }
        let stake = self.config.stake();
        require_stake(operation, stake, deposit)?;

        self.deposited_responder = stake;
        self.state = EscrowState::Funded;

        Ok(LedgerEffect::Deposit {
            from: self.config.responder,
            game: self.id,
            amount: stake,
        })
    }

    /// `cancelGame`: the challenger withdraws before anyone joined.
    ///
    /// Returns the refund of the challenger's half. Once the responder has
    /// joined there is no way out other than playing to the threshold.
    pub fn cancel(&mut self, caller: &ParticipantId) -> Result<LedgerEffect, EscrowError> {
        let operation = OperationKind::CancelGame;
        self.require_live(operation)?;
        self.require_caller(operation, caller, Side::Challenger)?;
        if self.state != EscrowState::Initialized {
            return Err(self.invalid_state(operation));
        }

        let refund = self.deposited_challenger;
        self.released = refund;
        self.state = EscrowState::Cancelled;

        Ok(LedgerEffect::Payout {
            game: self.id,
            to: self.config.challenger,
            amount: refund,
        })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Rounds
    // ═══════════════════════════════════════════════════════════════════════

    /// `startRound`: open a new response window at `now`.
    pub fn start_round(
        &mut self,
        caller: &ParticipantId,
        now: Duration,
    ) -> Result<RoundNumber, EscrowError> {
        let operation = OperationKind::StartRound;
        self.require_live(operation)?;
        self.require_caller(operation, caller, Side::Challenger)?;
        match self.state {
            EscrowState::Funded => {}
            EscrowState::RoundSettled { .. } if self.scoreboard.has_winner().is_none() => {}
            _ => return Err(self.invalid_state(operation)),
        }

        self.round = self.round.next();
        self.state = EscrowState::RoundActive {
            started_at: now,
            responded: false,
        };

        Ok(self.round)
    }

    /// `respondRound`: the responder proves it is online.
    ///
    /// Only sets the responded flag; the score changes when the round is
    /// settled. A response after the window closed is rejected even if the
    /// round has not been settled yet.
    pub fn respond_round(
        &mut self,
        caller: &ParticipantId,
        now: Duration,
    ) -> Result<RoundNumber, EscrowError> {
        let operation = OperationKind::RespondRound;
        self.require_live(operation)?;
        self.require_caller(operation, caller, Side::Responder)?;
        let EscrowState::RoundActive {
            started_at,
            responded,
        } = self.state
        else {
            return Err(self.invalid_state(operation));
        };

        let timer = RoundTimer::new(started_at, self.config.round_duration);
        if timer.is_expired(now) {
            return Err(EscrowError::RoundAlreadySettled {
                round: self.round,
                deadline: timer.deadline(),
                now,
            });
        }
        if responded {
            return Err(EscrowError::AlreadyResponded { round: self.round });
        }

        self.state = EscrowState::RoundActive {
            started_at,
            responded: true,
        };

        Ok(self.round)
    }

    /// `endRound`: score the current round once its window has closed.
    ///
    /// Anyone may settle. Returns the side credited with the round.
    pub fn end_round(&mut self, now: Duration) -> Result<Side, EscrowError> {
        let operation = OperationKind::EndRound;
        self.require_live(operation)?;
        let EscrowState::RoundActive {
            started_at,
            responded,
        } = self.state
        else {
            return Err(self.invalid_state(operation));
        };

        let timer = RoundTimer::new(started_at, self.config.round_duration);
        if !timer.is_expired(now) {
            return Err(EscrowError::RoundNotExpired {
                round: self.round,
                deadline: timer.deadline(),
                now,
            });
        }

        let winner = if responded {
            Side::Responder
        } else {
            Side::Challenger
        };
        self.scoreboard.record(winner);
        self.state = EscrowState::RoundSettled {
            last_winner: winner,
        };

        Ok(winner)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Payout
    // ═══════════════════════════════════════════════════════════════════════

    /// `endGame`: pay the pot to the side that reached the threshold.
    ///
    /// Anyone may finish a decided game. Returns the winner and the payout
    /// the ledger must apply.
    pub fn end_game(&mut self) -> Result<(Side, LedgerEffect), EscrowError> {
        let operation = OperationKind::EndGame;
        self.require_live(operation)?;
        if !matches!(self.state, EscrowState::RoundSettled { .. }) {
            return Err(self.invalid_state(operation));
        }
        let Some(winner) = self.scoreboard.has_winner() else {
            return Err(EscrowError::ThresholdNotReached {
                threshold: self.scoreboard.win_threshold(),
                challenger_wins: self.scoreboard.wins(Side::Challenger),
                responder_wins: self.scoreboard.wins(Side::Responder),
            });
        };

        let payout = compute_payout(self.config.pot, winner);
        self.released = payout;
        self.state = EscrowState::Finished { winner };

        Ok((
            winner,
            LedgerEffect::Payout {
                game: self.id,
                to: self.config.participant(winner),
                amount: payout,
            },
        ))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Accessors
    // ═══════════════════════════════════════════════════════════════════════

    /// Game identifier.
    pub fn id(&self) -> GameId {
        self.id
    }

    /// Immutable game parameters.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EscrowState {
        self.state
    }

    /// Number of rounds started.
    pub fn round_number(&self) -> RoundNumber {
        self.round
    }

    /// Start of the open round, if one is open.
    pub fn round_started_at(&self) -> Option<Duration> {
        match self.state {
            EscrowState::RoundActive { started_at, .. } => Some(started_at),
            _ => None,
        }
    }

    /// Whether the responder has answered the open round.
    pub fn responded_this_round(&self) -> bool {
        matches!(
            self.state,
            EscrowState::RoundActive {
                responded: true,
                ..
            }
        )
    }

    /// Timer of the open round, if one is open.
    pub fn round_timer(&self) -> Option<RoundTimer> {
        self.round_started_at()
            .map(|started_at| RoundTimer::new(started_at, self.config.round_duration))
    }

    /// Win counters.
    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    /// Amount deposited by `side`.
    pub fn deposited(&self, side: Side) -> Amount {
        match side {
            Side::Challenger => self.deposited_challenger,
            Side::Responder => self.deposited_responder,
        }
    }

    /// Amount released out of the escrow.
    pub fn released(&self) -> Amount {
        self.released
    }

    /// Funds the escrow should currently hold.
    pub fn held(&self) -> Amount {
        Amount(
            (self.deposited_challenger.0 + self.deposited_responder.0)
                .saturating_sub(self.released.0),
        )
    }

    /// Winner of a finished game.
    pub fn winner(&self) -> Option<Side> {
        match self.state {
            EscrowState::Finished { winner } => Some(winner),
            _ => None,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Invariants
    // ═══════════════════════════════════════════════════════════════════════

    /// Check the structural invariants of the record.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let pot = self.config.pot;
        let stake = self.config.stake();

        let deposited = self
            .deposited_challenger
            .checked_add(self.deposited_responder)
            .unwrap_or(Amount(u64::MAX));
        if deposited > pot {
            return Err(InvariantViolation::DepositsExceedPot { deposited, pot });
        }

        let expected_responder = if self.state.is_funded() {
            stake
        } else {
            Amount::ZERO
        };
        let underfunded =
            self.deposited_challenger != stake || self.deposited_responder != expected_responder;
        if underfunded {
            return Err(InvariantViolation::Underfunded {
                state: self.state,
                challenger: self.deposited_challenger,
                responder: self.deposited_responder,
                stake,
            });
        }

        let expected_release = match self.state {
            EscrowState::Finished { winner } => compute_payout(pot, winner),
            EscrowState::Cancelled => self.deposited_challenger,
            _ => Amount::ZERO,
        };
        if self.released != expected_release {
            return Err(InvariantViolation::ReleaseMismatch {
                state: self.state,
                released: self.released,
                expected: expected_release,
            });
        }

        let threshold = self.scoreboard.win_threshold();
        let decided = self.scoreboard.has_winner();
        match self.state {
            EscrowState::Finished { winner } if decided != Some(winner) => {
                return Err(InvariantViolation::WinnerMismatch {
                    state: self.state,
                    wins: self.scoreboard.wins(winner),
                    threshold,
                });
            }
            EscrowState::RoundActive { .. } if decided.is_some() => {
                return Err(InvariantViolation::WinnerMismatch {
                    state: self.state,
                    wins: threshold,
                    threshold,
                });
            }
            _ => {}
        }

        let scored = self.scoreboard.rounds_scored();
        let open = u64::from(matches!(self.state, EscrowState::RoundActive { .. }));
        if self.round.0 != scored + open {
            return Err(InvariantViolation::RoundCounterBehind {
                round: self.round,
                scored,
            });
        }

        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Guards
    // ═══════════════════════════════════════════════════════════════════════

    fn require_live(&self, operation: OperationKind) -> Result<(), EscrowError> {
        if self.state.is_terminal() {
            return Err(self.invalid_state(operation));
        }
        Ok(())
    }

    fn require_caller(
        &self,
        operation: OperationKind,
        caller: &ParticipantId,
        required: Side,
    ) -> Result<(), EscrowError> {
        if *caller != self.config.participant(required) {
            return Err(EscrowError::Unauthorized {
                operation,
                caller: *caller,
                required,
            });
        }
        Ok(())
    }

    fn invalid_state(&self, operation: OperationKind) -> EscrowError {
        EscrowError::InvalidState {
            operation,
            state: self.state,
        }
    }
}

fn require_stake(
    operation: OperationKind,
    required: Amount,
    supplied: Amount,
) -> Result<(), EscrowError> {
    if supplied != required {
        return Err(EscrowError::InsufficientFunds {
            operation,
            required,
            supplied,
        });
    }
    Ok(())
}
