//! Forsyth-Edwards Notation.
//!
//! `from_fen` accepts the full six fields or the four-field EPD form (clocks
//! default to `0 1`) and refuses positions that break the board invariants:
//! one king per side and no pawns on the first or last rank.

use crate::board::{CastlingRights, Position};
use crate::error::FenError;
use crate::types::*;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl Position {
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() != 4 && parts.len() != 6 {
            return Err(FenError::FieldCount(parts.len()));
        }

        let board = parse_placement(parts[0])?;

        let side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::SideToMove(other.to_string())),
        };

        let castling = parse_castling(parts[2])?;

        let en_passant = match parts[3] {
            "-" => None,
            field => {
                let s = coord_to_sq(field).ok_or_else(|| FenError::EnPassant(field.to_string()))?;
                // The target sits behind a pawn of the side that just moved.
                let expected_rank = match side_to_move {
                    Color::White => 5,
                    Color::Black => 2,
                };
                if rank_of(s) != expected_rank {
                    return Err(FenError::EnPassant(field.to_string()));
                }
                Some(s)
            }
        };

        let (halfmove_clock, fullmove_number) = if parts.len() == 6 {
            (parse_counter(parts[4])?, parse_counter(parts[5])?)
        } else {
            (0, 1)
        };
        if fullmove_number == 0 {
            return Err(FenError::Counter(parts[5].to_string()));
        }

        let pos = Position {
            board,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        };
        pos.check_invariants()?;
        Ok(pos)
    }

    pub fn to_fen(&self) -> String {
        let mut out = String::with_capacity(90);

        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match sq(file, rank).and_then(|s| self.piece_at(s)) {
                    Some(pc) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push(pc.to_fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
            if rank > 0 {
                out.push('/');
            }
        }

        out.push(' ');
        out.push(match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        });

        out.push(' ');
        if self.castling.is_empty() {
            out.push('-');
        } else {
            for (held, c) in [
                (self.castling.wk, 'K'),
                (self.castling.wq, 'Q'),
                (self.castling.bk, 'k'),
                (self.castling.bq, 'q'),
            ] {
                if held {
                    out.push(c);
                }
            }
        }

        out.push(' ');
        match self.en_passant {
            Some(s) => out.push_str(&sq_to_coord(s)),
            None => out.push('-'),
        }

        out.push_str(&format!(" {} {}", self.halfmove_clock, self.fullmove_number));
        out
    }

    fn check_invariants(&self) -> Result<(), FenError> {
        for color in [Color::White, Color::Black] {
            let count = self
                .pieces()
                .filter(|(_, pc)| *pc == Piece::new(color, PieceKind::King))
                .count();
            if count != 1 {
                return Err(FenError::KingCount { color, count });
            }
        }
        if let Some((s, _)) = self
            .pieces()
            .find(|(s, pc)| pc.kind == PieceKind::Pawn && (rank_of(*s) == 0 || rank_of(*s) == 7))
        {
            return Err(FenError::PawnOnBackRank(sq_to_coord(s)));
        }
        Ok(())
    }
}

fn parse_placement(field: &str) -> Result<[Option<Piece>; 64], FenError> {
    let bad = |why: &str| FenError::Placement(format!("{why} in {field:?}"));

    let ranks: Vec<&str> = field.split('/').collect();
    if ranks.len() != 8 {
        return Err(bad("expected 8 ranks"));
    }

    let mut board = [None; 64];
    for (rank_idx, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - rank_idx as i8; // FEN lists rank 8 .. 1
        let mut file: i8 = 0;
        for ch in rank_str.chars() {
            if let Some(d) = ch.to_digit(10) {
                if d == 0 || d > 8 {
                    return Err(bad("empty-square count out of range"));
                }
                file += d as i8;
            } else {
                let pc = Piece::from_fen_char(ch).ok_or_else(|| bad("unknown piece letter"))?;
                let s = sq(file, rank).ok_or_else(|| bad("too many squares in a rank"))?;
                board[s as usize] = Some(pc);
                file += 1;
            }
            if file > 8 {
                return Err(bad("too many squares in a rank"));
            }
        }
        if file != 8 {
            return Err(bad("too few squares in a rank"));
        }
    }
    Ok(board)
}

fn parse_castling(field: &str) -> Result<CastlingRights, FenError> {
    let mut castling = CastlingRights::NONE;
    if field == "-" {
        return Ok(castling);
    }
    for c in field.chars() {
        let flag = match c {
            'K' => &mut castling.wk,
            'Q' => &mut castling.wq,
            'k' => &mut castling.bk,
            'q' => &mut castling.bq,
            _ => return Err(FenError::Castling(field.to_string())),
        };
        if *flag {
            return Err(FenError::Castling(field.to_string()));
        }
        *flag = true;
    }
    Ok(castling)
}

fn parse_counter(field: &str) -> Result<u32, FenError> {
    field
        .parse()
        .map_err(|_| FenError::Counter(field.to_string()))
}

#[cfg(test)]
#[path = "fen_tests.rs"]
mod fen_tests;
