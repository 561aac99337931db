use std::fmt;

use crate::attacks::attacks;
use crate::error::IllegalMoveError;
use crate::types::*;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CastlingRights {
    pub wk: bool,
    pub wq: bool,
    pub bk: bool,
    pub bq: bool,
}

impl CastlingRights {
    pub const ALL: CastlingRights = CastlingRights {
        wk: true,
        wq: true,
        bk: true,
        bq: true,
    };
    pub const NONE: CastlingRights = CastlingRights {
        wk: false,
        wq: false,
        bk: false,
        bq: false,
    };

    pub fn has(&self, color: Color, side: CastleSide) -> bool {
        match (color, side) {
            (Color::White, CastleSide::KingSide) => self.wk,
            (Color::White, CastleSide::QueenSide) => self.wq,
            (Color::Black, CastleSide::KingSide) => self.bk,
            (Color::Black, CastleSide::QueenSide) => self.bq,
        }
    }

    pub fn revoke(&mut self, color: Color, side: CastleSide) {
        match (color, side) {
            (Color::White, CastleSide::KingSide) => self.wk = false,
            (Color::White, CastleSide::QueenSide) => self.wq = false,
            (Color::Black, CastleSide::KingSide) => self.bk = false,
            (Color::Black, CastleSide::QueenSide) => self.bq = false,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.wk || self.wq || self.bk || self.bq)
    }
}

/// Squares involved in a castling move: (king_from, king_to, rook_from, rook_to).
pub fn castle_squares(color: Color, side: CastleSide) -> (u8, u8, u8, u8) {
    match (color, side) {
        (Color::White, CastleSide::KingSide) => (4, 6, 7, 5),
        (Color::White, CastleSide::QueenSide) => (4, 2, 0, 3),
        (Color::Black, CastleSide::KingSide) => (60, 62, 63, 61),
        (Color::Black, CastleSide::QueenSide) => (60, 58, 56, 59),
    }
}

/// Which castling right a rook standing on `sq` guards, if any.
fn rook_home_right(sq: u8) -> Option<(Color, CastleSide)> {
    match sq {
        0 => Some((Color::White, CastleSide::QueenSide)),
        7 => Some((Color::White, CastleSide::KingSide)),
        56 => Some((Color::Black, CastleSide::QueenSide)),
        63 => Some((Color::Black, CastleSide::KingSide)),
        _ => None,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    pub board: [Option<Piece>; 64],
    pub side_to_move: Color,
    pub castling: CastlingRights,
    pub en_passant: Option<u8>, // square behind a pawn that just advanced 2
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

/// The part of a position that decides whether two positions repeat:
/// placement, side to move, castling rights and en-passant target.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RepetitionKey {
    board: [Option<Piece>; 64],
    side_to_move: Color,
    castling: CastlingRights,
    en_passant: Option<u8>,
}

#[derive(Clone, Debug)]
pub struct Undo {
    pub captured: Option<Piece>,
    pub castling: CastlingRights,
    pub en_passant: Option<u8>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
    pub moved_piece: Piece,
    pub rook_move: Option<(u8, u8)>, // (rook_from, rook_to) for castling
    pub ep_captured_sq: Option<u8>,  // square actually captured in en-passant
}

impl Position {
    pub fn startpos() -> Self {
        let mut p = Position {
            board: [None; 64],
            side_to_move: Color::White,
            castling: CastlingRights::ALL,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        };

        let back = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        for (f, &kind) in back.iter().enumerate() {
            p.board[f] = Some(Piece::new(Color::White, kind));
            p.board[8 + f] = Some(Piece::new(Color::White, PieceKind::Pawn));
            p.board[48 + f] = Some(Piece::new(Color::Black, PieceKind::Pawn));
            p.board[56 + f] = Some(Piece::new(Color::Black, kind));
        }
        p
    }

    pub fn piece_at(&self, sq: u8) -> Option<Piece> {
        self.board[sq as usize]
    }

    pub fn set_piece(&mut self, sq: u8, pc: Option<Piece>) {
        self.board[sq as usize] = pc;
    }

    pub fn king_sq(&self, c: Color) -> Option<u8> {
        (0..64u8).find(|&s| self.piece_at(s) == Some(Piece::new(c, PieceKind::King)))
    }

    /// Iterate over occupied squares.
    pub fn pieces(&self) -> impl Iterator<Item = (u8, Piece)> + '_ {
        self.board
            .iter()
            .enumerate()
            .filter_map(|(i, pc)| pc.map(|pc| (i as u8, pc)))
    }

    pub fn in_check(&self, c: Color) -> bool {
        match self.king_sq(c) {
            Some(ksq) => attacks(self, ksq, c.other()),
            None => false,
        }
    }

    pub fn is_square_attacked(&self, target: u8, by: Color) -> bool {
        attacks(self, target, by)
    }

    /// 100 halfmoves without a pawn move or capture.
    pub fn is_fifty_move_draw(&self) -> bool {
        self.halfmove_clock >= 100
    }

    /// Neither side can ever deliver mate: bare kings, a single minor piece,
    /// or only bishops that all stand on one square colour.
    pub fn is_insufficient_material(&self) -> bool {
        let mut minors: Vec<(u8, PieceKind)> = Vec::new();
        for (s, pc) in self.pieces() {
            match pc.kind {
                PieceKind::King => {}
                k if k.is_minor() => minors.push((s, k)),
                _ => return false,
            }
        }
        if minors.len() <= 1 {
            return true;
        }
        let all_bishops = minors.iter().all(|&(_, k)| k == PieceKind::Bishop);
        let shade = is_light_square(minors[0].0);
        all_bishops && minors.iter().all(|&(s, _)| is_light_square(s) == shade)
    }

    pub fn repetition_key(&self) -> RepetitionKey {
        RepetitionKey {
            board: self.board,
            side_to_move: self.side_to_move,
            castling: self.castling,
            en_passant: self.en_passant,
        }
    }

    /// Return the position after `mv`, leaving `self` untouched.
    ///
    /// Callers are expected to have validated the move against
    /// [`crate::legal_moves`]; the checks here only refuse moves that would
    /// corrupt the position.
    pub fn apply(&self, mv: Move) -> Result<Position, IllegalMoveError> {
        let reject = |reason| Err(IllegalMoveError::new(mv.to_string(), reason));

        if mv.from > 63 || mv.to > 63 || mv.from == mv.to {
            return reject("origin and destination must be two distinct squares");
        }
        let Some(moved) = self.piece_at(mv.from) else {
            return reject("origin square is empty");
        };
        if moved.color != self.side_to_move {
            return reject("origin piece does not belong to the side to move");
        }
        if let Some(target) = self.piece_at(mv.to) {
            if target.color == moved.color {
                return reject("destination holds a friendly piece");
            }
            if target.kind == PieceKind::King {
                return reject("kings cannot be captured");
            }
        }

        let reaches_last_rank = rank_of(mv.to) == moved.color.other().back_rank();
        match mv.promo {
            Some(PieceKind::Pawn | PieceKind::King) => {
                return reject("promotion must be to a queen, rook, bishop or knight");
            }
            Some(_) if moved.kind != PieceKind::Pawn || !reaches_last_rank => {
                return reject("only a pawn reaching the last rank promotes");
            }
            _ => {}
        }

        if moved.kind == PieceKind::Pawn
            && file_of(mv.from) != file_of(mv.to)
            && self.piece_at(mv.to).is_none()
            && !(mv.is_en_passant && self.en_passant == Some(mv.to))
        {
            return reject("diagonal pawn move needs something to capture");
        }
        if moved.kind == PieceKind::Pawn
            && file_of(mv.from) == file_of(mv.to)
            && self.piece_at(mv.to).is_some()
        {
            return reject("pawns capture diagonally, not straight ahead");
        }
        if mv.is_en_passant && (moved.kind != PieceKind::Pawn || self.en_passant != Some(mv.to)) {
            return reject("no en-passant capture available");
        }

        if moved.kind == PieceKind::King && (file_of(mv.from) - file_of(mv.to)).abs() == 2 {
            let Some(side) = mv.castle else {
                return reject("king moves two squares only when castling");
            };
            let (king_from, king_to, rook_from, _) = castle_squares(moved.color, side);
            if mv.from != king_from
                || mv.to != king_to
                || !self.castling.has(moved.color, side)
                || self.piece_at(rook_from) != Some(Piece::new(moved.color, PieceKind::Rook))
            {
                return reject("castling is not available");
            }
        } else if mv.castle.is_some() {
            return reject("castling move does not match the king");
        }

        let mut next = self.clone();
        next.make_move(mv);
        if next.in_check(moved.color) {
            return reject("move leaves own king in check");
        }
        Ok(next)
    }

    /// Play `mv` in place and return what is needed to take it back.
    ///
    /// # Panics
    /// Panics if the origin square is empty; only call with generated moves.
    pub fn make_move(&mut self, mv: Move) -> Undo {
        let from = mv.from;
        let to = mv.to;
        let moved = self
            .piece_at(from)
            .expect("make_move called with an empty origin square");
        let mut captured = self.piece_at(to);
        let prev_castling = self.castling;
        let prev_ep = self.en_passant;
        let prev_hmc = self.halfmove_clock;
        let prev_fmn = self.fullmove_number;

        self.en_passant = None;

        let mut ep_captured_sq = None;
        if mv.is_en_passant {
            // The captured pawn sits beside the origin, on the destination file.
            if let Some(cs) = sq(file_of(to), rank_of(from)) {
                captured = self.piece_at(cs);
                self.set_piece(cs, None);
                ep_captured_sq = Some(cs);
            }
        }

        self.set_piece(from, None);
        self.set_piece(to, Some(moved));

        if moved.kind == PieceKind::Pawn && rank_of(to) == moved.color.other().back_rank() {
            let promo = mv.promo.unwrap_or(PieceKind::Queen);
            self.set_piece(to, Some(Piece::new(moved.color, promo)));
        }

        let mut rook_move = None;
        if let Some(side) = mv.castle {
            let (_, _, rf, rt) = castle_squares(moved.color, side);
            if let Some(rook) = self.piece_at(rf) {
                self.set_piece(rf, None);
                self.set_piece(rt, Some(rook));
                rook_move = Some((rf, rt));
            }
        }

        if moved.kind == PieceKind::King {
            self.castling.revoke(moved.color, CastleSide::KingSide);
            self.castling.revoke(moved.color, CastleSide::QueenSide);
        }
        if moved.kind == PieceKind::Rook
            && let Some((color, side)) = rook_home_right(from)
            && color == moved.color
        {
            self.castling.revoke(color, side);
        }
        // A rook taken on its home square takes the right with it.
        if let Some(cp) = captured
            && cp.kind == PieceKind::Rook
            && let Some((color, side)) = rook_home_right(to)
            && color == cp.color
        {
            self.castling.revoke(color, side);
        }

        if moved.kind == PieceKind::Pawn && (rank_of(to) - rank_of(from)).abs() == 2 {
            self.en_passant = sq(file_of(from), (rank_of(from) + rank_of(to)) / 2);
        }

        self.halfmove_clock = if moved.kind == PieceKind::Pawn || captured.is_some() {
            0
        } else {
            self.halfmove_clock + 1
        };

        if self.side_to_move == Color::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = self.side_to_move.other();

        Undo {
            captured,
            castling: prev_castling,
            en_passant: prev_ep,
            halfmove_clock: prev_hmc,
            fullmove_number: prev_fmn,
            moved_piece: moved,
            rook_move,
            ep_captured_sq,
        }
    }

    pub fn unmake_move(&mut self, mv: Move, undo: Undo) {
        self.side_to_move = self.side_to_move.other();
        self.castling = undo.castling;
        self.en_passant = undo.en_passant;
        self.halfmove_clock = undo.halfmove_clock;
        self.fullmove_number = undo.fullmove_number;

        if let Some((rf, rt)) = undo.rook_move {
            let rook = self.piece_at(rt);
            self.set_piece(rt, None);
            self.set_piece(rf, rook);
        }

        // Whatever stands on the destination goes back as the piece that moved,
        // which also turns a promoted piece back into its pawn.
        self.set_piece(mv.to, None);
        self.set_piece(mv.from, Some(undo.moved_piece));

        match undo.ep_captured_sq {
            Some(cs) => self.set_piece(cs, undo.captured),
            None => self.set_piece(mv.to, undo.captured),
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

/// Plain-text diagram, rank 8 at the top, `.` for empty squares.
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                let c = sq(file, rank)
                    .and_then(|s| self.piece_at(s))
                    .map(Piece::to_fen_char)
                    .unwrap_or('.');
                write!(f, " {c}")?;
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}

#[cfg(test)]
#[path = "board_tests.rs"]
mod board_tests;
