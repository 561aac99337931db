//! Tests for draw detection in chess
//!
//! This module tests all draw conditions through the public game API:
//! - Stalemate
//! - Fifty-move rule
//! - Threefold repetition
//! - Insufficient material

use chess_core::{Color, DrawRule, Game, Position, TerminationStatus, legal_moves};

fn pos(fen: &str) -> Position {
    Position::from_fen(fen).expect("valid FEN")
}

fn play(game: &mut Game, moves: &[&str]) {
    for mv in moves {
        game.apply_uci(mv)
            .unwrap_or_else(|e| panic!("{mv} rejected: {e}"));
    }
}

// =============================================================================
// Stalemate Tests
// =============================================================================

#[test]
fn test_stalemate_king_in_corner() {
    // Black king on a8, white queen on b6, white king on c7
    let p = pos("k7/2K5/1Q6/8/8/8/8/8 b - - 0 1");
    assert!(legal_moves(&p).is_empty(), "Stalemate position should have no legal moves");
    assert!(!p.in_check(Color::Black), "Stalemate means king is not in check");
    assert_eq!(Game::new(p).status(), &TerminationStatus::Stalemate);
}

#[test]
fn test_stalemate_king_and_pawn_endgame() {
    // White king on g6, white pawn on g7, black king on g8
    let game = Game::from_fen("6k1/6P1/6K1/8/8/8/8/8 b - - 0 1").unwrap();
    assert_eq!(game.status(), &TerminationStatus::Stalemate);
    assert_eq!(game.status().result(), "1/2-1/2");
}

#[test]
fn test_stalemate_is_not_checkmate() {
    // Same material, but the queen gives check from a6 with b-file covered.
    let game = Game::from_fen("k7/2K5/Q7/8/8/8/8/8 b - - 0 1").unwrap();
    assert_eq!(
        game.status(),
        &TerminationStatus::Checkmate {
            winner: Color::White
        }
    );
}

// =============================================================================
// Fifty-Move Rule Tests
// =============================================================================

#[test]
fn test_fifty_move_rule_at_100_halfmoves() {
    let p = pos("8/8/8/4k3/8/4K3/8/R7 w - - 100 60");
    assert!(p.is_fifty_move_draw());
    assert_eq!(
        Game::new(p).status(),
        &TerminationStatus::Draw(DrawRule::FiftyMove)
    );
}

#[test]
fn test_fifty_move_rule_at_99_halfmoves() {
    let p = pos("8/8/8/4k3/8/4K3/8/R7 w - - 99 60");
    assert!(!p.is_fifty_move_draw());
}

#[test]
fn test_fifty_move_rule_reset_on_pawn_move() {
    let mut game = Game::from_fen("8/8/8/4k3/8/3K4/4P3/R7 w - - 99 60").unwrap();
    play(&mut game, &["e2e3"]);
    assert_eq!(game.position().halfmove_clock, 0);
    assert_eq!(game.status(), &TerminationStatus::Ongoing);
}

#[test]
fn test_fifty_move_rule_reset_on_capture() {
    let mut game = Game::from_fen("8/8/8/4k3/8/3K4/8/R6n w - - 99 60").unwrap();
    play(&mut game, &["a1h1"]);
    assert_eq!(game.position().halfmove_clock, 0);
    assert_eq!(game.status(), &TerminationStatus::Ongoing);
}

// =============================================================================
// Insufficient Material Tests
// =============================================================================

#[test]
fn test_insufficient_material_cases() {
    let drawn = [
        ("8/8/8/4k3/8/4K3/8/8 w - - 0 1", "king vs king"),
        ("8/8/8/4k3/8/4KB2/8/8 w - - 0 1", "king and bishop vs king"),
        ("8/8/8/4k3/8/4KN2/8/8 w - - 0 1", "king and knight vs king"),
        ("8/8/4b3/4k3/8/4K3/8/8 w - - 0 1", "king vs king and bishop"),
        ("8/8/4n3/4k3/8/4K3/8/8 w - - 0 1", "king vs king and knight"),
        ("5b2/8/8/4k3/8/4K3/8/2B5 w - - 0 1", "bishops on the same colour"),
    ];
    for (fen, name) in drawn {
        assert!(pos(fen).is_insufficient_material(), "{name} should be a draw");
        assert_eq!(
            Game::from_fen(fen).unwrap().status(),
            &TerminationStatus::Draw(DrawRule::InsufficientMaterial),
            "{name}"
        );
    }
}

#[test]
fn test_sufficient_material_cases() {
    let playable = [
        ("2b5/8/8/4k3/8/4K3/8/2B5 w - - 0 1", "bishops on opposite colours"),
        ("8/8/8/4k3/8/4K3/4P3/8 w - - 0 1", "a pawn"),
        ("8/8/8/4k3/8/4K3/8/4R3 w - - 0 1", "a rook"),
        ("8/8/8/4k3/8/4K3/8/4Q3 w - - 0 1", "a queen"),
        ("8/8/8/4k3/8/4K3/3NN3/8 w - - 0 1", "two knights"),
        ("8/8/4n3/4k3/8/4K3/8/2B5 w - - 0 1", "bishop vs knight"),
    ];
    for (fen, name) in playable {
        assert!(!pos(fen).is_insufficient_material(), "{name} is not a draw");
    }
}

// =============================================================================
// Threefold Repetition Tests
// =============================================================================

#[test]
fn test_repetition_key_same_position() {
    let a = pos("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3");
    let b = pos("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 6 5");
    assert_eq!(
        a.repetition_key(),
        b.repetition_key(),
        "Move counters do not matter for repetition"
    );
}

#[test]
fn test_repetition_key_differences() {
    let base = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    let others = [
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq - 0 1",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w Kq - 0 1",
    ];
    for other in others {
        assert_ne!(pos(base).repetition_key(), pos(other).repetition_key(), "{other}");
    }

    let with_ep = pos("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1");
    let without = pos("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1");
    assert_ne!(with_ep.repetition_key(), without.repetition_key());
}

#[test]
fn test_threefold_repetition_knight_dance() {
    let mut game = Game::startpos();
    let dance = ["g1f3", "g8f6", "f3g1", "f6g8"];
    play(&mut game, &dance);
    assert_eq!(game.status(), &TerminationStatus::Ongoing);
    play(&mut game, &dance);
    assert_eq!(
        game.status(),
        &TerminationStatus::Draw(DrawRule::Repetition)
    );
    assert_eq!(game.ply_count(), 8);
}

#[test]
fn test_repetition_broken_by_pawn_move() {
    let mut game = Game::startpos();
    play(&mut game, &["g1f3", "g8f6", "f3g1", "f6g8", "e2e3", "e7e6"]);
    play(&mut game, &["g1f3", "g8f6", "f3g1", "f6g8"]);
    assert_eq!(game.status(), &TerminationStatus::Ongoing);
    assert_eq!(game.repetition_count(), 2);
}
