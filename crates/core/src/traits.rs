//! Core traits for state machines.

use crate::{Action, Event};
use std::time::Duration;

/// A state machine that processes events.
///
/// The settlement node is implemented as a state machine that is:
///
/// - **Synchronous**: No async, no `.await`
/// - **Deterministic**: Same state + event = same actions
/// - **Pure-ish**: Mutates self, but performs no I/O
///
/// Moving funds and reading the clock are the runner's job. The node asks for
/// ledger effects through [`Action::ApplyLedgerEffect`] and learns the result
/// through a follow-up [`Event`].
///
/// # Example
///
/// ```ignore
/// impl StateMachine for EscrowNode {
///     fn handle(&mut self, event: Event) -> Vec<Action> {
///         match event {
///             Event::OperationSubmitted { request_id, submission } => {
///                 self.on_submission(request_id, submission)
///             }
///             Event::LedgerEffectApplied { request_id } => self.on_effect_applied(request_id),
///             // ... etc
///         }
///     }
///
///     fn set_time(&mut self, now: Duration) {
///         self.now = now;
///     }
/// }
/// ```
pub trait StateMachine {
    /// Process an event, returning actions to perform.
    ///
    /// # Guarantees
    ///
    /// - **Synchronous**: This method never blocks or awaits
    /// - **Deterministic**: Given the same state and event, always returns the same actions
    /// - **No I/O**: All I/O is performed by the runner via the returned actions
    fn handle(&mut self, event: Event) -> Vec<Action>;

    /// Set the current time.
    ///
    /// Called by the runner before each `handle()` call with the time read
    /// from its clock.
    fn set_time(&mut self, now: Duration);

    /// Get the current time.
    ///
    /// Returns the time that was last set via `set_time()`.
    fn now(&self) -> Duration;
}
