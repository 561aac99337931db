//! Game state machine: move history, termination detection and the final record.
//!
//! A [`Game`] starts `Ongoing` and moves to exactly one terminal status, after
//! which every further move is refused with [`GameOverError`].

use std::fmt;

use tracing::debug;

use crate::board::Position;
use crate::error::{FenError, GameError, GameOverError, IllegalMoveError};
use crate::movegen::{find_legal, legal_moves};
use crate::types::{Color, Move};
use crate::uci::UciMove;

/// Which drawing rule ended the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DrawRule {
    InsufficientMaterial,
    Repetition,
    FiftyMove,
    Agreement,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TerminationStatus {
    Ongoing,
    Checkmate { winner: Color },
    Stalemate,
    Draw(DrawRule),
    Aborted { reason: String },
    MoveLimitReached { limit: u32 },
}

impl TerminationStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TerminationStatus::Ongoing)
    }

    pub fn winner(&self) -> Option<Color> {
        match self {
            TerminationStatus::Checkmate { winner } => Some(*winner),
            _ => None,
        }
    }

    /// PGN-style result tag. Aborted and unfinished games are `*`.
    pub fn result(&self) -> &'static str {
        match self {
            TerminationStatus::Checkmate {
                winner: Color::White,
            } => "1-0",
            TerminationStatus::Checkmate {
                winner: Color::Black,
            } => "0-1",
            TerminationStatus::Stalemate
            | TerminationStatus::Draw(_)
            | TerminationStatus::MoveLimitReached { .. } => "1/2-1/2",
            TerminationStatus::Ongoing | TerminationStatus::Aborted { .. } => "*",
        }
    }
}

/// Human-readable reason, suitable for the final game report.
impl fmt::Display for TerminationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationStatus::Ongoing => write!(f, "game in progress"),
            TerminationStatus::Checkmate { winner } => write!(f, "checkmate, {winner} wins"),
            TerminationStatus::Stalemate => write!(f, "stalemate"),
            TerminationStatus::Draw(DrawRule::InsufficientMaterial) => {
                write!(f, "draw by insufficient material")
            }
            TerminationStatus::Draw(DrawRule::Repetition) => write!(f, "draw by threefold repetition"),
            TerminationStatus::Draw(DrawRule::FiftyMove) => write!(f, "draw by the fifty-move rule"),
            TerminationStatus::Draw(DrawRule::Agreement) => write!(f, "draw by agreement"),
            TerminationStatus::Aborted { reason } => write!(f, "aborted: {reason}"),
            TerminationStatus::MoveLimitReached { limit } => {
                write!(f, "move limit of {limit} reached")
            }
        }
    }
}

/// One applied move and the position it produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ply {
    pub mv: Move,
    pub uci: String,
    pub position: Position,
}

/// Everything that happened in a game, in play order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameRecord {
    initial: Position,
    plies: Vec<Ply>,
    status: TerminationStatus,
}

impl GameRecord {
    fn new(initial: Position) -> Self {
        Self {
            initial,
            plies: Vec::new(),
            status: TerminationStatus::Ongoing,
        }
    }

    pub fn initial(&self) -> &Position {
        &self.initial
    }

    pub fn plies(&self) -> &[Ply] {
        &self.plies
    }

    pub fn status(&self) -> &TerminationStatus {
        &self.status
    }

    /// Position after the last applied move (or the initial one).
    pub fn current(&self) -> &Position {
        self.plies.last().map(|p| &p.position).unwrap_or(&self.initial)
    }

    pub fn last_move(&self) -> Option<Move> {
        self.plies.last().map(|p| p.mv)
    }

    pub fn uci_moves(&self) -> Vec<String> {
        self.plies.iter().map(|p| p.uci.clone()).collect()
    }

    /// Initial position followed by every position after a move.
    pub fn positions(&self) -> impl DoubleEndedIterator<Item = &Position> + '_ {
        std::iter::once(&self.initial).chain(self.plies.iter().map(|p| &p.position))
    }
}

#[derive(Clone, Debug)]
pub struct Game {
    position: Position,
    legal: Vec<Move>,
    record: GameRecord,
    max_plies: Option<u32>,
}

impl Game {
    pub fn new(start: Position) -> Self {
        let legal = legal_moves(&start);
        let mut game = Self {
            position: start.clone(),
            legal,
            record: GameRecord::new(start),
            max_plies: None,
        };
        game.evaluate();
        game
    }

    pub fn startpos() -> Self {
        Self::new(Position::startpos())
    }

    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Ok(Self::new(Position::from_fen(fen)?))
    }

    /// End the game as `MoveLimitReached` once this many plies are applied.
    pub fn with_move_limit(mut self, max_plies: u32) -> Self {
        self.max_plies = Some(max_plies);
        self.evaluate();
        self
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn side_to_move(&self) -> Color {
        self.position.side_to_move
    }

    /// Legal moves of the current position.
    pub fn legal_moves(&self) -> &[Move] {
        &self.legal
    }

    pub fn record(&self) -> &GameRecord {
        &self.record
    }

    pub fn into_record(self) -> GameRecord {
        self.record
    }

    pub fn status(&self) -> &TerminationStatus {
        &self.record.status
    }

    pub fn is_over(&self) -> bool {
        self.record.status.is_terminal()
    }

    pub fn ply_count(&self) -> usize {
        self.record.plies.len()
    }

    /// Apply a move and re-evaluate termination.
    ///
    /// Only origin, destination and promotion of `mv` are looked at; a
    /// promoting move without a piece promotes to a queen.
    pub fn apply(&mut self, mv: Move) -> Result<&TerminationStatus, GameError> {
        self.ensure_ongoing()?;
        let legal = find_legal(&self.legal, mv.from, mv.to, mv.promo).ok_or_else(|| {
            IllegalMoveError::new(mv.to_string(), "not a legal move in this position")
        })?;

        let next = self.position.apply(legal)?;
        self.legal = legal_moves(&next);
        self.position = next.clone();
        self.record.plies.push(Ply {
            mv: legal,
            uci: legal.to_string(),
            position: next,
        });
        self.evaluate();
        Ok(&self.record.status)
    }

    pub fn apply_uci(&mut self, token: &str) -> Result<&TerminationStatus, GameError> {
        let token: UciMove = token.parse()?;
        let mut mv = Move::new(token.from, token.to);
        mv.promo = token.promo;
        self.apply(mv)
    }

    /// Stop the game with a reason; the history so far is kept.
    pub fn abort(&mut self, reason: impl Into<String>) -> Result<(), GameOverError> {
        self.finish(TerminationStatus::Aborted {
            reason: reason.into(),
        })
    }

    pub fn agree_draw(&mut self) -> Result<(), GameOverError> {
        self.finish(TerminationStatus::Draw(DrawRule::Agreement))
    }

    /// How many times the current position has occurred, counting itself.
    pub fn repetition_count(&self) -> usize {
        let key = self.position.repetition_key();
        // Nothing before the last pawn move or capture can repeat.
        let window = self.position.halfmove_clock as usize + 1;
        self.record
            .positions()
            .rev()
            .take(window)
            .filter(|p| p.repetition_key() == key)
            .count()
    }

    fn ensure_ongoing(&self) -> Result<(), GameOverError> {
        if self.is_over() {
            return Err(GameOverError {
                status: self.record.status.clone(),
            });
        }
        Ok(())
    }

    fn finish(&mut self, status: TerminationStatus) -> Result<(), GameOverError> {
        self.ensure_ongoing()?;
        debug!(%status, plies = self.ply_count(), "game finished");
        self.record.status = status;
        Ok(())
    }

    fn evaluate(&mut self) {
        if self.is_over() {
            return;
        }
        let pos = &self.position;
        let status = if self.legal.is_empty() {
            if pos.in_check(pos.side_to_move) {
                TerminationStatus::Checkmate {
                    winner: pos.side_to_move.other(),
                }
            } else {
                TerminationStatus::Stalemate
            }
        } else if pos.is_insufficient_material() {
            TerminationStatus::Draw(DrawRule::InsufficientMaterial)
        } else if pos.is_fifty_move_draw() {
            TerminationStatus::Draw(DrawRule::FiftyMove)
        } else if self.repetition_count() >= 3 {
            TerminationStatus::Draw(DrawRule::Repetition)
        } else if let Some(limit) = self.max_plies
            && self.ply_count() >= limit as usize
        {
            TerminationStatus::MoveLimitReached { limit }
        } else {
            return;
        };
        let _ = self.finish(status);
    }
}

#[cfg(test)]
#[path = "game_tests.rs"]
mod game_tests;
