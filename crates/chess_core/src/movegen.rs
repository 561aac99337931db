use crate::attacks::{DIAGONALS, KING_STEPS, KNIGHT_STEPS, ORTHOGONALS};
use crate::board::{Position, castle_squares};
use crate::types::*;

/// Generate all legal moves, returning a freshly allocated vector.
/// Internally delegates to `legal_moves_into`, cloning the position only once.
pub fn legal_moves(pos: &Position) -> Vec<Move> {
    let mut tmp = pos.clone();
    let mut out = Vec::with_capacity(64);
    legal_moves_into(&mut tmp, &mut out);
    out
}

/// Generate all legal moves into the provided buffer, reusing it across calls.
pub fn legal_moves_into(pos: &mut Position, out: &mut Vec<Move>) {
    out.clear();
    pseudo_moves(pos, out);

    let mover = pos.side_to_move;
    // Filter illegal moves in-place by playing them on the mutable position.
    out.retain(|&mv| {
        let undo = pos.make_move(mv);
        let illegal = pos.in_check(mover);
        pos.unmake_move(mv, undo);
        !illegal
    });
}

/// Is `mv` (compared by squares and promotion) among the legal moves?
pub fn is_legal(pos: &Position, mv: &Move) -> bool {
    legal_moves(pos).iter().any(|m| m.same_action(mv))
}

/// Look up the generated move for `from`→`to`.
///
/// Without an explicit promotion piece a promoting move resolves to the queen
/// promotion; with one, only that exact promotion matches.
pub fn find_legal(legal: &[Move], from: u8, to: u8, promo: Option<PieceKind>) -> Option<Move> {
    let wanted = promo.or_else(|| {
        legal
            .iter()
            .any(|m| m.from == from && m.to == to && m.promo.is_some())
            .then_some(PieceKind::Queen)
    });
    legal
        .iter()
        .copied()
        .find(|m| m.from == from && m.to == to && m.promo == wanted)
}

fn pseudo_moves(pos: &Position, out: &mut Vec<Move>) {
    for (from, pc) in pos.pieces() {
        if pc.color != pos.side_to_move {
            continue;
        }
        match pc.kind {
            PieceKind::Pawn => gen_pawn(pos, from, pc.color, out),
            PieceKind::Knight => gen_steps(pos, from, pc.color, &KNIGHT_STEPS, out),
            PieceKind::Bishop => gen_slider(pos, from, pc.color, &DIAGONALS, out),
            PieceKind::Rook => gen_slider(pos, from, pc.color, &ORTHOGONALS, out),
            PieceKind::Queen => {
                gen_slider(pos, from, pc.color, &DIAGONALS, out);
                gen_slider(pos, from, pc.color, &ORTHOGONALS, out);
            }
            PieceKind::King => {
                gen_steps(pos, from, pc.color, &KING_STEPS, out);
                gen_castle(pos, from, pc.color, out);
            }
        }
    }
}

/// Push a pawn move, expanding it into the four promotions on the last rank.
fn push_pawn_move(mv: Move, c: Color, out: &mut Vec<Move>) {
    if rank_of(mv.to) == c.other().back_rank() {
        out.extend(PieceKind::PROMOTIONS.iter().map(|&pk| mv.with_promo(pk)));
    } else {
        out.push(mv);
    }
}

fn gen_pawn(pos: &Position, from: u8, c: Color, out: &mut Vec<Move>) {
    let f = file_of(from);
    let r = rank_of(from);
    let dir = c.forward();
    let start_rank = c.back_rank() + dir;

    // Forward pushes never capture.
    if let Some(to) = sq(f, r + dir)
        && pos.piece_at(to).is_none()
    {
        push_pawn_move(Move::new(from, to), c, out);

        if r == start_rank
            && let Some(to2) = sq(f, r + 2 * dir)
            && pos.piece_at(to2).is_none()
        {
            out.push(Move::new(from, to2));
        }
    }

    for df in [-1, 1] {
        let Some(to) = sq(f + df, r + dir) else {
            continue;
        };
        match pos.piece_at(to) {
            Some(tpc) if tpc.color != c => {
                let mut mv = Move::new(from, to);
                mv.is_capture = true;
                push_pawn_move(mv, c, out);
            }
            None if pos.en_passant == Some(to) => {
                let mut mv = Move::new(from, to);
                mv.is_capture = true;
                mv.is_en_passant = true;
                out.push(mv);
            }
            _ => {}
        }
    }
}

fn gen_steps(pos: &Position, from: u8, c: Color, steps: &[(i8, i8)], out: &mut Vec<Move>) {
    let f = file_of(from);
    let r = rank_of(from);
    for &(df, dr) in steps {
        if let Some(to) = sq(f + df, r + dr) {
            match pos.piece_at(to) {
                None => out.push(Move::new(from, to)),
                Some(pc) if pc.color != c => {
                    let mut mv = Move::new(from, to);
                    mv.is_capture = true;
                    out.push(mv);
                }
                _ => {}
            }
        }
    }
}

fn gen_slider(pos: &Position, from: u8, c: Color, dirs: &[(i8, i8)], out: &mut Vec<Move>) {
    let f0 = file_of(from);
    let r0 = rank_of(from);
    for &(df, dr) in dirs {
        let mut f = f0 + df;
        let mut r = r0 + dr;
        while let Some(to) = sq(f, r) {
            match pos.piece_at(to) {
                None => out.push(Move::new(from, to)),
                Some(pc) if pc.color != c => {
                    let mut mv = Move::new(from, to);
                    mv.is_capture = true;
                    out.push(mv);
                    break;
                }
                _ => break,
            }
            f += df;
            r += dr;
        }
    }
}

fn gen_castle(pos: &Position, from: u8, c: Color, out: &mut Vec<Move>) {
    // Can't castle out of check.
    if pos.in_check(c) {
        return;
    }
    let enemy = c.other();

    for side in [CastleSide::KingSide, CastleSide::QueenSide] {
        let (king_from, king_to, rook_from, rook_to) = castle_squares(c, side);
        if from != king_from
            || !pos.castling.has(c, side)
            || pos.piece_at(rook_from) != Some(Piece::new(c, PieceKind::Rook))
        {
            continue;
        }

        // Every square strictly between king and rook must be empty.
        let (lo, hi) = (king_from.min(rook_from), king_from.max(rook_from));
        if (lo + 1..hi).any(|s| pos.piece_at(s).is_some()) {
            continue;
        }

        // The king may not pass through or land on an attacked square.
        // It passes over the rook's destination on the way.
        if pos.is_square_attacked(rook_to, enemy) || pos.is_square_attacked(king_to, enemy) {
            continue;
        }

        let mut mv = Move::new(king_from, king_to);
        mv.castle = Some(side);
        out.push(mv);
    }
}

#[cfg(test)]
#[path = "movegen_tests.rs"]
mod movegen_tests;
