//! Synchronous runner driving the node against a ledger and a clock.

use crate::{EscrowNode, NodeConfig};
use liveness_core::{Action, Event, Receipt, RequestId, StateMachine, Submission, SubmissionError};
use liveness_escrow::Escrow;
use liveness_ledger::{Clock, Ledger};
use liveness_types::GameId;
use std::collections::VecDeque;
use tracing::trace;

/// Owns an [`EscrowNode`], a [`Ledger`] and a [`Clock`], and processes one
/// submission at a time to completion.
///
/// For each submission the runner reads the clock, hands the node the event,
/// and executes the returned actions. Ledger effects are applied immediately
/// and their result fed back to the node, so by the time
/// [`SettlementRunner::submit`] returns, the game is either committed or
/// untouched.
pub struct SettlementRunner<L, C> {
    node: EscrowNode,
    ledger: L,
    clock: C,
    next_request_id: u64,
}

impl<L: Ledger, C: Clock> SettlementRunner<L, C> {
    /// Create a runner with a fresh node.
    pub fn new(config: NodeConfig, ledger: L, clock: C) -> Self {
        Self {
            node: EscrowNode::new(config),
            ledger,
            clock,
            next_request_id: 0,
        }
    }

    /// Process a submission and return its outcome.
    pub fn submit(&mut self, submission: Submission) -> Result<Receipt, SubmissionError> {
        let request_id = RequestId::new(self.next_request_id);
        self.next_request_id += 1;

        self.node.set_time(self.clock.now());
        let mut queue: VecDeque<Action> = self
            .node
            .handle(Event::OperationSubmitted {
                request_id,
                submission,
            })
            .into();

        while let Some(action) = queue.pop_front() {
            trace!(
                request_id = %action.request_id(),
                action = action.type_name(),
                "Executing action"
            );
            match action {
                Action::ApplyLedgerEffect { request_id, effect } => {
                    let event = match self.ledger.apply(&effect) {
                        Ok(()) => Event::LedgerEffectApplied { request_id },
                        Err(e) => Event::LedgerEffectFailed {
                            request_id,
                            reason: e.to_string(),
                        },
                    };
                    queue.extend(self.node.handle(event));
                }
                Action::EmitOutcome {
                    request_id: emitted,
                    result,
                } if emitted == request_id => return result,
                Action::EmitOutcome { request_id, .. } => {
                    panic!("outcome for {} emitted while processing another request", request_id)
                }
            }
        }

        panic!("node produced no outcome for {}", request_id)
    }

    /// The node.
    pub fn node(&self) -> &EscrowNode {
        &self.node
    }

    /// Escrow of a committed game.
    pub fn escrow(&self, game: &GameId) -> Option<&Escrow> {
        self.node.escrow(game)
    }

    /// Sequence number of a committed game.
    pub fn sequence(&self, game: &GameId) -> Option<u64> {
        self.node.sequence(game)
    }

    /// The ledger.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Mutable access to the ledger, e.g. to fund accounts or inject faults.
    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    /// The clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }
}
