//! End-to-end game scenarios through the settlement runner.

use liveness_core::{Outcome, Submission, SubmissionError};
use liveness_escrow::{ErrorKind, EscrowState};
use liveness_test_helpers::{
    alice, bob, carol, Harness, POT, ROUND_DURATION, STARTING_BALANCE, WIN_THRESHOLD,
};
use liveness_types::{Amount, RoundNumber, Side};
use std::time::Duration;
use tracing_test::traced_test;

fn stake() -> Amount {
    POT.half()
}

#[test]
fn create_game_locks_challenger_half() {
    let mut h = Harness::new();
    let game = h.create_game().unwrap();

    let escrow = h.runner.escrow(&game).unwrap();
    assert_eq!(escrow.state(), EscrowState::Initialized);
    assert_eq!(escrow.round_number(), RoundNumber::NONE);
    assert_eq!(escrow.config().win_threshold, WIN_THRESHOLD);
    assert_eq!(h.escrow_balance(game), stake());
    assert_eq!(
        h.wallet(alice()),
        STARTING_BALANCE.checked_sub(stake()).unwrap()
    );
}

#[test]
fn join_game_funds_pot() {
    let mut h = Harness::new();
    let game = h.funded_game().unwrap();

    assert_eq!(h.runner.escrow(&game).unwrap().state(), EscrowState::Funded);
    assert_eq!(h.escrow_balance(game), POT);
    assert_eq!(h.wallet(bob()), STARTING_BALANCE.checked_sub(stake()).unwrap());
}

#[traced_test]
#[test]
fn silent_responder_loses_pot() {
    let mut h = Harness::new();
    let game = h.funded_game().unwrap();

    for _ in 0..WIN_THRESHOLD {
        let receipt = h.play_round(game, false).unwrap();
        assert!(matches!(
            receipt.outcome,
            Outcome::RoundSettled {
                winner: Side::Challenger,
                ..
            }
        ));
    }

    let receipt = h.submit(Submission::end_game(carol(), game)).unwrap();
    assert_eq!(
        receipt.outcome,
        Outcome::GameFinished {
            winner: Side::Challenger,
            payout: POT
        }
    );
    assert_eq!(
        h.runner.escrow(&game).unwrap().state(),
        EscrowState::Finished {
            winner: Side::Challenger
        }
    );
    assert_eq!(h.escrow_balance(game), Amount::ZERO);
    // Challenger gets its own half back plus the responder's half.
    assert_eq!(
        h.wallet(alice()),
        STARTING_BALANCE.checked_add(stake()).unwrap()
    );
    assert_eq!(h.wallet(bob()), STARTING_BALANCE.checked_sub(stake()).unwrap());
    assert_eq!(h.wallet(carol()), STARTING_BALANCE);
    assert!(logs_contain("Game finished"));
}

#[test]
fn online_responder_takes_pot() {
    let mut h = Harness::new();
    let game = h.funded_game().unwrap();
    let after_deposit = h.wallet(bob());

    for _ in 0..WIN_THRESHOLD {
        let receipt = h.play_round(game, true).unwrap();
        assert!(matches!(
            receipt.outcome,
            Outcome::RoundSettled {
                winner: Side::Responder,
                ..
            }
        ));
    }
    h.submit(Submission::end_game(alice(), game)).unwrap();

    assert_eq!(
        h.runner.escrow(&game).unwrap().winner(),
        Some(Side::Responder)
    );
    assert_eq!(h.escrow_balance(game), Amount::ZERO);
    assert_eq!(h.wallet(bob()), after_deposit.checked_add(POT).unwrap());
}

#[test]
fn late_response_does_not_flip_round() {
    let mut h = Harness::new();
    let game = h.funded_game().unwrap();

    h.submit(Submission::start_round(alice(), game)).unwrap();
    h.advance(ROUND_DURATION);

    let err = h.submit(Submission::respond_round(bob(), game)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RoundAlreadySettled);

    let receipt = h.submit(Submission::end_round(bob(), game)).unwrap();
    assert_eq!(
        receipt.outcome,
        Outcome::RoundSettled {
            round: RoundNumber(1),
            winner: Side::Challenger
        }
    );

    let err = h.submit(Submission::respond_round(bob(), game)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(
        h.runner.escrow(&game).unwrap().scoreboard().wins(Side::Responder),
        0
    );
}

#[test]
fn end_round_before_expiry_fails() {
    let mut h = Harness::new();
    let game = h.funded_game().unwrap();

    h.submit(Submission::start_round(alice(), game)).unwrap();
    h.advance(ROUND_DURATION - Duration::from_millis(1));

    let err = h.submit(Submission::end_round(carol(), game)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RoundNotExpired);

    h.advance(Duration::from_millis(1));
    h.submit(Submission::end_round(carol(), game)).unwrap();
}

#[test]
fn cancel_before_join_refunds_challenger() {
    let mut h = Harness::new();
    let game = h.create_game().unwrap();

    let err = h.submit(Submission::cancel_game(bob(), game)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    let receipt = h.submit(Submission::cancel_game(alice(), game)).unwrap();
    assert_eq!(receipt.outcome, Outcome::GameCancelled { refund: stake() });
    assert_eq!(h.wallet(alice()), STARTING_BALANCE);
    assert_eq!(h.escrow_balance(game), Amount::ZERO);

    let err = h
        .submit(Submission::join_game(bob(), game, stake()))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(h.wallet(bob()), STARTING_BALANCE);
}

#[test]
fn finished_game_rejects_everything() {
    let mut h = Harness::new();
    let game = h.funded_game().unwrap();
    h.play_round(game, false).unwrap();
    h.play_round(game, false).unwrap();
    h.submit(Submission::end_game(alice(), game)).unwrap();
    let sequence = h.runner.sequence(&game);
    let alice_balance = h.wallet(alice());

    let submissions = [
        Submission::join_game(bob(), game, stake()),
        Submission::cancel_game(alice(), game),
        Submission::start_round(alice(), game),
        Submission::respond_round(bob(), game),
        Submission::end_round(carol(), game),
        Submission::end_game(alice(), game),
        Submission::end_game(bob(), game),
    ];
    for submission in submissions {
        let err = h.submit(submission).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState, "{}", err);
    }

    assert_eq!(h.runner.sequence(&game), sequence);
    assert_eq!(h.wallet(alice()), alice_balance);
    assert_eq!(h.escrow_balance(game), Amount::ZERO);
}

#[traced_test]
#[test]
fn ledger_failure_leaves_game_untouched() {
    let mut h = Harness::new();
    let game = h.create_game().unwrap();
    let sequence = h.runner.sequence(&game);

    h.runner.ledger_mut().reject_next("ledger unavailable");
    let err = h
        .submit(Submission::join_game(bob(), game, stake()))
        .unwrap_err();
    assert!(matches!(err, SubmissionError::LedgerFailure { .. }));
    assert_eq!(
        h.runner.escrow(&game).unwrap().state(),
        EscrowState::Initialized
    );
    assert_eq!(h.runner.sequence(&game), sequence);
    assert_eq!(h.wallet(bob()), STARTING_BALANCE);
    assert!(logs_contain("transition discarded"));

    h.submit(Submission::join_game(bob(), game, stake())).unwrap();
    assert_eq!(h.escrow_balance(game), POT);
}

#[test]
fn failed_creation_leaves_no_game() {
    let mut h = Harness::new();
    h.runner.ledger_mut().reject_next("ledger unavailable");

    let err = h.create_game().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LedgerFailure);
    assert_eq!(h.runner.node().game_count(), 0);
    assert_eq!(h.wallet(alice()), STARTING_BALANCE);
}

#[test]
fn unfunded_challenger_cannot_create() {
    let mut h = Harness::new();
    let game = h.create_game().unwrap();
    let poor = liveness_types::ParticipantId::from_name("dave");

    let err = h
        .submit(Submission::init_game(
            poor,
            alice(),
            POT,
            ROUND_DURATION,
            WIN_THRESHOLD,
        ))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LedgerFailure);
    assert_eq!(h.runner.node().game_count(), 1);
    assert_eq!(h.runner.escrow(&game).unwrap().state(), EscrowState::Initialized);
}

#[test]
fn duplicate_and_out_of_order_submissions() {
    let mut h = Harness::new();
    let game = h.create_game().unwrap();

    // Rounds before funding.
    let err = h.submit(Submission::start_round(alice(), game)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    // Double join.
    h.submit(Submission::join_game(bob(), game, stake())).unwrap();
    let err = h
        .submit(Submission::join_game(bob(), game, stake()))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(h.escrow_balance(game), POT);

    // Respond and settle before any round.
    let err = h.submit(Submission::respond_round(bob(), game)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    let err = h.submit(Submission::end_round(bob(), game)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    // Double start and double respond.
    h.submit(Submission::start_round(alice(), game)).unwrap();
    let err = h.submit(Submission::start_round(alice(), game)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    h.submit(Submission::respond_round(bob(), game)).unwrap();
    let err = h.submit(Submission::respond_round(bob(), game)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyResponded);

    // Settle twice.
    h.advance(ROUND_DURATION);
    h.submit(Submission::end_round(carol(), game)).unwrap();
    let err = h.submit(Submission::end_round(carol(), game)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    // Pay out early.
    let err = h.submit(Submission::end_game(alice(), game)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ThresholdNotReached);

    let escrow = h.runner.escrow(&game).unwrap();
    assert_eq!(escrow.round_number(), RoundNumber(1));
    assert_eq!(escrow.scoreboard().wins(Side::Responder), 1);
}

#[test]
fn retried_submission_with_stale_sequence() {
    let mut h = Harness::new();
    let game = h.funded_game().unwrap();
    let seen = h.runner.sequence(&game).unwrap();

    h.submit(Submission::start_round(alice(), game).with_expected_sequence(seen))
        .unwrap();

    // A retry of the same start, based on the old view.
    let err = h
        .submit(Submission::start_round(alice(), game).with_expected_sequence(seen))
        .unwrap_err();
    assert_eq!(
        err,
        SubmissionError::StaleSequence {
            game,
            expected: seen,
            actual: seen + 1
        }
    );
    assert_eq!(h.runner.escrow(&game).unwrap().round_number(), RoundNumber(1));
}

#[test]
fn impostors_are_rejected() {
    let mut h = Harness::new();
    let game = h.create_game().unwrap();

    let err = h
        .submit(Submission::join_game(carol(), game, stake()))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    h.submit(Submission::join_game(bob(), game, stake())).unwrap();

    let err = h.submit(Submission::start_round(bob(), game)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    h.submit(Submission::start_round(alice(), game)).unwrap();
    let err = h.submit(Submission::respond_round(carol(), game)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
}

#[test]
fn invalid_configs_are_rejected() {
    let mut h = Harness::new();

    let cases = [
        Submission::init_game(alice(), alice(), POT, ROUND_DURATION, WIN_THRESHOLD),
        Submission::init_game(alice(), bob(), Amount(0), ROUND_DURATION, WIN_THRESHOLD),
        Submission::init_game(alice(), bob(), Amount(101), ROUND_DURATION, WIN_THRESHOLD),
        Submission::init_game(alice(), bob(), POT, Duration::ZERO, WIN_THRESHOLD),
        Submission::init_game(alice(), bob(), POT, ROUND_DURATION, 0),
    ];
    for submission in cases {
        let err = h.submit(submission).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig, "{}", err);
    }
    assert_eq!(h.runner.node().game_count(), 0);
    assert_eq!(h.wallet(alice()), STARTING_BALANCE);
}

#[test]
fn concurrent_games_are_independent() {
    let mut h = Harness::new();
    let first = h.funded_game().unwrap();
    let second = h.funded_game().unwrap();
    assert_ne!(first, second);

    h.play_round(first, false).unwrap();
    h.play_round(first, false).unwrap();
    h.submit(Submission::end_game(alice(), first)).unwrap();

    assert_eq!(
        h.runner.escrow(&second).unwrap().state(),
        EscrowState::Funded
    );
    assert_eq!(h.escrow_balance(second), POT);
}
