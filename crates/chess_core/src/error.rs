//! Error types for the rules engine.

use thiserror::Error;

use crate::game::TerminationStatus;
use crate::types::Color;

/// A move token that does not follow the `<from><to>[promo]` grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("move token {0:?} must be 4 or 5 characters")]
    Length(String),
    #[error("move token {0:?} contains non-ASCII characters")]
    NonAscii(String),
    #[error("invalid square {square:?} in move token {token:?}")]
    Square { token: String, square: String },
    #[error("invalid promotion piece {piece:?} in move token {token:?}")]
    Promotion { token: String, piece: char },
    #[error("no move token found in {0:?}")]
    NoMoveToken(String),
}

/// A well-formed move that the position does not allow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("illegal move {uci}: {reason}")]
pub struct IllegalMoveError {
    pub uci: String,
    pub reason: &'static str,
}

impl IllegalMoveError {
    pub fn new(uci: impl Into<String>, reason: &'static str) -> Self {
        Self {
            uci: uci.into(),
            reason,
        }
    }
}

/// A move was submitted after the game reached a terminal status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("game is already over: {status}")]
pub struct GameOverError {
    pub status: TerminationStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("expected 4 or 6 fields, found {0}")]
    FieldCount(usize),
    #[error("invalid piece placement: {0}")]
    Placement(String),
    #[error("invalid side to move {0:?}")]
    SideToMove(String),
    #[error("invalid castling field {0:?}")]
    Castling(String),
    #[error("invalid en-passant field {0:?}")]
    EnPassant(String),
    #[error("invalid move counter {0:?}")]
    Counter(String),
    #[error("{color} has {count} kings")]
    KingCount { color: Color, count: usize },
    #[error("pawn on back rank at {0}")]
    PawnOnBackRank(String),
}

/// Everything [`crate::Game`] can reject a move for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Illegal(#[from] IllegalMoveError),
    #[error(transparent)]
    Over(#[from] GameOverError),
}
