//! Core types for the liveness escrow node: events, actions, submissions and
//! the [`StateMachine`] trait.
//!
//! Nothing here performs I/O. The node consumes [`Event`]s and produces
//! [`Action`]s; a runner owns the ledger and the clock and carries actions
//! out.

mod action;
mod error;
mod event;
mod request;
mod submission;
mod traits;

pub use action::Action;
pub use error::SubmissionError;
pub use event::Event;
pub use request::RequestId;
pub use submission::{Operation, Outcome, Receipt, Submission};
pub use traits::StateMachine;
