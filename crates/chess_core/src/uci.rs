//! UCI move tokens: `<from><to>[promo]`, all lowercase, e.g. `e2e4`, `e7e8q`.

use std::fmt;
use std::str::FromStr;

use crate::board::Position;
use crate::error::{IllegalMoveError, ParseError};
use crate::movegen::{find_legal, legal_moves};
use crate::types::*;

/// A syntactically valid move token that has not been checked against a position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UciMove {
    pub from: u8,
    pub to: u8,
    pub promo: Option<PieceKind>,
}

impl FromStr for UciMove {
    type Err = ParseError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        if !token.is_ascii() {
            return Err(ParseError::NonAscii(token.to_string()));
        }
        if !(4..=5).contains(&token.len()) {
            return Err(ParseError::Length(token.to_string()));
        }
        let square = |range: std::ops::Range<usize>| {
            let text = &token[range];
            coord_to_sq(text).ok_or_else(|| ParseError::Square {
                token: token.to_string(),
                square: text.to_string(),
            })
        };
        let from = square(0..2)?;
        let to = square(2..4)?;

        let promo = match token[4..].chars().next() {
            None => None,
            Some(c) => match PieceKind::from_char(c) {
                Some(kind) if PieceKind::PROMOTIONS.contains(&kind) => Some(kind),
                _ => {
                    return Err(ParseError::Promotion {
                        token: token.to_string(),
                        piece: c,
                    });
                }
            },
        };

        Ok(UciMove { from, to, promo })
    }
}

impl fmt::Display for UciMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", sq_to_coord(self.from), sq_to_coord(self.to))?;
        if let Some(p) = self.promo {
            write!(f, "{}", p.to_char())?;
        }
        Ok(())
    }
}

impl From<Move> for UciMove {
    fn from(mv: Move) -> Self {
        UciMove {
            from: mv.from,
            to: mv.to,
            promo: mv.promo,
        }
    }
}

pub fn move_to_uci(mv: Move) -> String {
    mv.to_string()
}

/// Match a token against the legal moves of `pos` so the returned move
/// carries the right capture, castle and en-passant flags.
pub fn resolve_move(pos: &Position, token: UciMove) -> Result<Move, IllegalMoveError> {
    find_legal(&legal_moves(pos), token.from, token.to, token.promo)
        .ok_or_else(|| IllegalMoveError::new(token.to_string(), "not a legal move in this position"))
}

/// Find the first word in free text that is a well-formed move token.
///
/// Words are maximal runs of ASCII letters, digits and `_`, so `"e2e4."`
/// and `"Move: e2e4 (center)"` both yield `e2e4`, while `"e2e4e5"` does not.
/// Matching is case-sensitive: `"E2E4"` is not a move token. Callers that
/// accept mixed case (the human console) lowercase before parsing.
pub fn extract_uci_move(text: &str) -> Result<UciMove, ParseError> {
    text.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|word| (4..=5).contains(&word.len()))
        .find_map(|word| word.parse::<UciMove>().ok())
        .ok_or_else(|| ParseError::NoMoveToken(text.trim().to_string()))
}

#[cfg(test)]
#[path = "uci_tests.rs"]
mod uci_tests;
