//! Integration tests for the wargame
//!
//! Tests the full stack: rules, search, and the turn loop with scripted input

use std::io::{self, Cursor};
use std::sync::Arc;

use wargame_cli::MatchRunner;
use wargame_core::{Coord, GameError, GameState, GameType, Move, Options, Player, Unit, UnitType};

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn options(game_type: GameType, max_turns: u32) -> Options {
    Options {
        game_type,
        max_depth: 2,
        min_depth: 1,
        max_time: 60.0,
        max_turns: Some(max_turns),
        seed: Some(7),
        ..Default::default()
    }
}

fn output(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap()
}

// ============================================================================
// FULL MATCHES
// ============================================================================

#[test]
fn test_computer_match_runs_to_completion() {
    let runner = MatchRunner::new(options(GameType::CompVsComp, 6), Cursor::new(""), io::sink()).unwrap();
    let outcome = runner.play().unwrap();

    assert!(outcome.turns_played <= 6);
    assert!(outcome.final_state.is_finished());
    assert!(outcome.stats.total_evaluations() > 0);
    assert!(outcome
        .trace
        .as_str()
        .ends_with(&format!("{} wins in {} turns", outcome.winner, outcome.turns_played)));
    assert!(outcome.trace.as_str().contains("Computer Attacker has"));
}

#[test]
fn test_manual_match_with_scripted_input() {
    let input = Cursor::new("zz\nE3 D3\nC4 B4\nA2 B2\n");
    let mut out = Vec::new();
    let runner = MatchRunner::new(options(GameType::AttackerVsDefender, 2), input, &mut out).unwrap();
    let outcome = runner.play().unwrap();

    assert_eq!(outcome.winner, Player::Defender);
    assert_eq!(outcome.turns_played, 2);
    assert_eq!(
        outcome.final_state.get(Coord::new(1, 4)),
        Some(&Unit::new(Player::Attacker, UnitType::Standard))
    );
    assert_eq!(
        outcome.final_state.get(Coord::new(1, 2)),
        Some(&Unit::new(Player::Defender, UnitType::Barrier))
    );

    let printed = output(out);
    assert!(printed.contains("Invalid coordinates! Try again."));
    assert!(printed.contains("The move is not valid! Try again."));
    assert!(printed.contains("Player Attacker has moved C4 to B4"));
    assert!(printed.contains("Player Defender has moved A2 to B2"));
    assert!(printed.contains("Defender wins!"));
}

#[test]
fn test_human_attacker_against_computer() {
    let mut out = Vec::new();
    let runner = MatchRunner::new(
        options(GameType::AttackerVsComp, 2),
        Cursor::new("C4 B4\n"),
        &mut out,
    )
    .unwrap();
    let outcome = runner.play().unwrap();

    assert_eq!(outcome.winner, Player::Defender);
    let printed = output(out);
    assert!(printed.contains("Computer Defender has"));
    assert!(printed.contains("Heuristic score: "));
    assert!(outcome.trace.as_str().contains("Player 1: Human\nPlayer 2: AI\n"));
}

// ============================================================================
// SCENARIOS
// ============================================================================

#[test]
fn test_fast_attacker_destroys_command() {
    let units = [
        (Coord::new(0, 0), Unit::new(Player::Defender, UnitType::Command)),
        (Coord::new(1, 0), Unit::new(Player::Attacker, UnitType::FastAttacker)),
        (Coord::new(4, 4), Unit::new(Player::Attacker, UnitType::Command)),
    ];
    let game = GameState::from_units(
        Arc::new(options(GameType::AttackerVsDefender, 100)),
        &units,
    );

    let runner = MatchRunner::with_state(game, Cursor::new("B0 A0\n"), io::sink()).unwrap();
    let outcome = runner.play().unwrap();

    assert_eq!(outcome.winner, Player::Attacker);
    assert_eq!(outcome.turns_played, 1);
    assert!(outcome.final_state.is_empty(Coord::new(0, 0)));
    assert_eq!(outcome.final_state.get(Coord::new(1, 0)).map(|u| u.health), Some(6));
    assert!(outcome.trace.as_str().ends_with("Attacker wins in 1 turns"));
}

#[test]
fn test_fast_attacker_cannot_repair_own_barrier() {
    let mut game = GameState::new(Options::default());
    let mv = Move::from_quad(4, 3, 3, 3);
    assert!(matches!(game.perform_move(mv), Err(GameError::IllegalMove(m)) if m == mv));
    assert_eq!(game.turns_played(), 0);
}

#[test]
fn test_search_timeout_forfeits_match() {
    let options = Options {
        max_time: 1e-9,
        ..options(GameType::CompVsComp, 100)
    };
    let mut out = Vec::new();
    let runner = MatchRunner::new(options, Cursor::new(""), &mut out).unwrap();
    let outcome = runner.play().unwrap();

    assert_eq!(outcome.winner, Player::Defender);
    assert_eq!(outcome.turns_played, 0);
    assert!(!outcome.final_state.has_command(Player::Attacker));
    assert!(outcome
        .trace
        .as_str()
        .contains("Computer timed out!\n\n"));
    assert!(outcome.trace.as_str().ends_with("Defender wins in 0 turns"));

    let printed = output(out);
    assert!(printed.contains("Computer timed out!"));
    assert!(printed.contains("Computer doesn't know what to do!!!"));
}
