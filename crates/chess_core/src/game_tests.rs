use super::*;
use crate::types::{PieceKind, coord_to_sq};

fn play(game: &mut Game, moves: &str) {
    for token in moves.split_whitespace() {
        game.apply_uci(token)
            .unwrap_or_else(|e| panic!("{token} rejected: {e}"));
    }
}

#[test]
fn test_fools_mate_is_checkmate_for_black() {
    let mut game = Game::startpos();
    play(&mut game, "f2f3 e7e5 g2g4 d8h4");
    assert_eq!(
        game.status(),
        &TerminationStatus::Checkmate {
            winner: Color::Black
        }
    );
    assert_eq!(game.status().result(), "0-1");
    assert!(game.legal_moves().is_empty());
}

#[test]
fn test_ruy_lopez_opening_sequence() {
    let mut game = Game::startpos();
    play(&mut game, "e2e4 e7e5 g1f3 b8c6 f1b5");
    let bishop = game.position().piece_at(coord_to_sq("b5").unwrap());
    assert_eq!(bishop.map(|p| (p.color, p.kind)), Some((Color::White, PieceKind::Bishop)));
    assert_eq!(game.status(), &TerminationStatus::Ongoing);

    // Black to move, so a white king move is refused.
    assert!(matches!(game.apply_uci("e1e2"), Err(GameError::Illegal(_))));

    play(&mut game, "a7a6");
    // The queen on d1 is blocked by the d2 pawn; the king may step to e2.
    assert!(matches!(game.apply_uci("d1d3"), Err(GameError::Illegal(_))));
    play(&mut game, "e1e2");
    assert_eq!(game.ply_count(), 7);
}

#[test]
fn test_pawns_capture_only_diagonally() {
    let mut game = Game::startpos();
    play(&mut game, "d2d4 e7e5");
    let capture = game.legal_moves().iter().find(|m| m.to_string() == "d4e5").copied();
    assert!(capture.is_some_and(|m| m.is_capture));

    play(&mut game, "e2e4");
    // Black to move: the white pawn on d4 cannot be played.
    assert!(matches!(game.apply_uci("d4e5"), Err(GameError::Illegal(_))));

    // A straight push onto an occupied square is never a capture.
    let mut game = Game::startpos();
    play(&mut game, "d2d4 d7d5");
    assert!(matches!(game.apply_uci("d4d5"), Err(GameError::Illegal(_))));
}

#[test]
fn test_threefold_repetition_on_completing_ply() {
    let mut game = Game::startpos();
    play(&mut game, "g1f3 g8f6 f3g1 f6g8 g1f3 g8f6 f3g1");
    assert_eq!(game.status(), &TerminationStatus::Ongoing);
    assert_eq!(game.repetition_count(), 2);

    play(&mut game, "f6g8");
    assert_eq!(game.repetition_count(), 3);
    assert_eq!(game.status(), &TerminationStatus::Draw(DrawRule::Repetition));
}

#[test]
fn test_repetition_distinguishes_castling_rights() {
    // Rook shuffles lose the castling right, so the start position never recurs
    // with the same rights.
    let mut game =
        Game::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1").unwrap();
    play(&mut game, "h1g1 h8g8 g1h1 g8h8 h1g1 h8g8 g1h1 g8h8");
    assert_eq!(game.repetition_count(), 2);
    assert_eq!(game.status(), &TerminationStatus::Ongoing);
}

#[test]
fn test_fifty_move_rule() {
    let mut game = Game::from_fen("8/8/8/4k3/8/4K3/8/R7 w - - 99 60").unwrap();
    assert_eq!(game.status(), &TerminationStatus::Ongoing);
    play(&mut game, "a1a2");
    assert_eq!(game.status(), &TerminationStatus::Draw(DrawRule::FiftyMove));
}

#[test]
fn test_capture_into_insufficient_material() {
    let mut game = Game::from_fen("8/8/8/4k3/8/4K3/8/r3B3 b - - 0 1").unwrap();
    play(&mut game, "a1e1");
    assert_eq!(game.status(), &TerminationStatus::Ongoing);

    // The knight takes the last rook, leaving king and knight against king.
    let mut game = Game::from_fen("8/8/8/4k3/8/4K3/2N5/r7 w - - 0 1").unwrap();
    play(&mut game, "c2a1");
    assert_eq!(
        game.status(),
        &TerminationStatus::Draw(DrawRule::InsufficientMaterial)
    );
}

#[test]
fn test_king_takes_last_piece() {
    let mut game = Game::from_fen("8/8/8/4k3/8/8/3r4/4K3 w - - 0 1").unwrap();
    play(&mut game, "e1d2");
    assert_eq!(
        game.status(),
        &TerminationStatus::Draw(DrawRule::InsufficientMaterial)
    );
}

#[test]
fn test_stalemate_after_quiet_move() {
    let mut game = Game::from_fen("k7/8/2Q5/8/8/8/8/1K6 w - - 0 1").unwrap();
    play(&mut game, "c6b6");
    assert_eq!(game.status(), &TerminationStatus::Stalemate);
    assert_eq!(game.status().result(), "1/2-1/2");
}

#[test]
fn test_move_limit() {
    let mut game = Game::startpos().with_move_limit(3);
    play(&mut game, "e2e4 e7e5");
    assert_eq!(game.status(), &TerminationStatus::Ongoing);
    play(&mut game, "g1f3");
    assert_eq!(
        game.status(),
        &TerminationStatus::MoveLimitReached { limit: 3 }
    );
}

#[test]
fn test_checkmate_wins_over_move_limit() {
    let mut game = Game::startpos().with_move_limit(4);
    play(&mut game, "f2f3 e7e5 g2g4 d8h4");
    assert_eq!(
        game.status(),
        &TerminationStatus::Checkmate {
            winner: Color::Black
        }
    );
}

#[test]
fn test_terminal_game_rejects_moves() {
    let mut game = Game::startpos();
    play(&mut game, "f2f3 e7e5 g2g4 d8h4");
    let err = game.apply_uci("a2a3").unwrap_err();
    assert!(matches!(err, GameError::Over(_)));
    assert!(game.abort("late").is_err());
    assert_eq!(game.ply_count(), 4);
}

#[test]
fn test_abort_keeps_history() {
    let mut game = Game::startpos();
    play(&mut game, "e2e4 e7e5");
    game.abort("user interrupt").unwrap();
    assert_eq!(
        game.status(),
        &TerminationStatus::Aborted {
            reason: "user interrupt".to_string()
        }
    );
    assert_eq!(game.record().uci_moves(), vec!["e2e4", "e7e5"]);
    assert_eq!(game.status().to_string(), "aborted: user interrupt");
    assert!(matches!(game.apply_uci("g1f3"), Err(GameError::Over(_))));
}

#[test]
fn test_draw_by_agreement() {
    let mut game = Game::startpos();
    game.agree_draw().unwrap();
    assert_eq!(game.status(), &TerminationStatus::Draw(DrawRule::Agreement));
}

#[test]
fn test_promotion_defaults_to_queen() {
    let mut game = Game::from_fen("8/4P3/8/8/8/8/k7/4K3 w - - 0 1").unwrap();
    play(&mut game, "e7e8");
    let promoted = game.position().piece_at(coord_to_sq("e8").unwrap());
    assert_eq!(promoted.map(|p| p.kind), Some(PieceKind::Queen));
    assert_eq!(game.record().uci_moves(), vec!["e7e8q"]);
}

#[test]
fn test_parse_errors_are_reported() {
    let mut game = Game::startpos();
    assert!(matches!(game.apply_uci("E2E4"), Err(GameError::Parse(_))));
    assert!(matches!(game.apply_uci("e2"), Err(GameError::Parse(_))));
    assert_eq!(game.ply_count(), 0);
}

#[test]
fn test_terminal_start_position() {
    let game = Game::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
    assert_eq!(game.status(), &TerminationStatus::Stalemate);

    let game = Game::from_fen("7k/6Q1/6K1/8/8/8/8/8 b - - 0 1").unwrap();
    assert_eq!(
        game.status(),
        &TerminationStatus::Checkmate {
            winner: Color::White
        }
    );
}

#[test]
fn test_record_positions_follow_moves() {
    let mut game = Game::startpos();
    play(&mut game, "e2e4 c7c5");
    let record = game.record();
    assert_eq!(record.positions().count(), 3);
    assert_eq!(record.initial(), &Position::startpos());
    assert_eq!(
        record.current().to_fen(),
        "rnbqkbnr/pp1ppppp/8/2p5/4P3/8/PPPP1PPP/RNBQKBNR w KQkq c6 0 2"
    );
    assert_eq!(record.last_move().map(|m| m.to_string()), Some("c7c5".to_string()));
}
