//! Square attack detection on the mailbox board.
//!
//! Also home of the step and ray direction tables shared with the move
//! generator.

use crate::board::Position;
use crate::types::*;

pub const KNIGHT_STEPS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (-1, 2),
    (-2, 1),
    (1, -2),
    (2, -1),
    (-1, -2),
    (-2, -1),
];

pub const KING_STEPS: [(i8, i8); 8] = [
    (1, 1),
    (1, 0),
    (1, -1),
    (0, 1),
    (0, -1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

pub const DIAGONALS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
pub const ORTHOGONALS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Is `target` attacked by any piece of colour `by`?
///
/// Occupancy of `target` itself is ignored, so this answers both "is this
/// piece attacked" and "could a king step here".
pub fn attacks(pos: &Position, target: u8, by: Color) -> bool {
    let tf = file_of(target);
    let tr = rank_of(target);

    let holds = |s: u8, kinds: &[PieceKind]| {
        pos.piece_at(s)
            .is_some_and(|pc| pc.color == by && kinds.contains(&pc.kind))
    };

    // A pawn of `by` attacks diagonally forward, so look one rank behind the target.
    let behind = tr - by.forward();
    for df in [-1, 1] {
        if let Some(s) = sq(tf + df, behind)
            && holds(s, &[PieceKind::Pawn])
        {
            return true;
        }
    }

    for (df, dr) in KNIGHT_STEPS {
        if let Some(s) = sq(tf + df, tr + dr)
            && holds(s, &[PieceKind::Knight])
        {
            return true;
        }
    }

    for (df, dr) in KING_STEPS {
        if let Some(s) = sq(tf + df, tr + dr)
            && holds(s, &[PieceKind::King])
        {
            return true;
        }
    }

    let rays = [
        (&DIAGONALS, [PieceKind::Bishop, PieceKind::Queen]),
        (&ORTHOGONALS, [PieceKind::Rook, PieceKind::Queen]),
    ];
    for (dirs, sliders) in rays {
        for &(df, dr) in dirs {
            if let Some(s) = first_occupied(pos, target, df, dr)
                && holds(s, &sliders)
            {
                return true;
            }
        }
    }

    false
}

/// Walk from `from` (exclusive) in direction (df, dr) and return the first
/// occupied square.
fn first_occupied(pos: &Position, from: u8, df: i8, dr: i8) -> Option<u8> {
    let mut f = file_of(from) + df;
    let mut r = rank_of(from) + dr;
    while let Some(s) = sq(f, r) {
        if pos.piece_at(s).is_some() {
            return Some(s);
        }
        f += df;
        r += dr;
    }
    None
}

#[cfg(test)]
#[path = "attacks_tests.rs"]
mod attacks_tests;
