//! Legal move generation.
//!
//! Pipeline:
//!   1. Generate pseudo-legal moves (ignoring pins / check evasion).
//!   2. Filter: derive the successor, reject it if the mover's king is
//!      attacked.
//!
//! Sliders walk their capable ray directions square by square; knights,
//! kings, and pawns enumerate fixed offsets. Check detection walks outward
//! from the king instead of scanning every enemy piece.

use crate::engine::board::Position;
use crate::engine::types::{Color, Direction, Move, MoveFlags, Piece, PieceType, Square};

pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

pub const KING_OFFSETS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

// =========================================================================
// Public API
// =========================================================================

/// Generate all legal moves for the side to move.
pub fn legal_moves(pos: &Position) -> Vec<Move> {
    let pseudo = pseudo_legal_moves(pos);
    let mover = pos.turn();

    // Filter: after each move the mover's king must not be in check.
    let mut legal = Vec::with_capacity(pseudo.len());
    for mv in pseudo {
        let next = pos.successor(mv);
        if !is_in_check(&next, mover) {
            legal.push(mv);
        }
    }
    legal
}

/// Generate pseudo-legal moves for the side to move. Castling transit
/// squares are fully gated here; everything else defers king safety to the
/// legality filter.
pub fn pseudo_legal_moves(pos: &Position) -> Vec<Move> {
    let mut moves = Vec::with_capacity(64);
    let us = pos.turn();

    for (from, piece) in pos.pieces() {
        if !piece.is(us) {
            continue;
        }
        match piece.kind() {
            Some(PieceType::Pawn) => pawn_moves(pos, from, us, &mut moves),
            Some(PieceType::Knight) => offset_moves(pos, from, us, &KNIGHT_OFFSETS, &mut moves),
            Some(PieceType::King) => {
                offset_moves(pos, from, us, &KING_OFFSETS, &mut moves);
                castle_moves(pos, from, us, &mut moves);
            }
            Some(kind) => slider_moves(pos, from, us, kind, &mut moves),
            None => {}
        }
    }
    moves
}

/// Is `color`'s king attacked? A board without that king is never in check.
pub fn is_in_check(pos: &Position, color: Color) -> bool {
    match pos.king_square(color) {
        Some(king) => is_square_attacked(pos, king, !color),
        None => false,
    }
}

/// Is `sq` attacked by any piece of color `by`? Walks the 8 rays outward
/// from `sq` (the first occupied square decides each ray), then probes the
/// knight, king, and pawn offsets.
pub fn is_square_attacked(pos: &Position, sq: Square, by: Color) -> bool {
    // Ray walks: the nearest piece in each direction attacks iff it is an
    // enemy slider capable of that direction.
    for dir in Direction::ALL {
        let mut cur = sq;
        while let Some(next) = cur.step(dir) {
            cur = next;
            let piece = pos.get(cur);
            if piece.is_empty() {
                continue;
            }
            if piece.is(by) {
                if let Some(kind) = piece.kind() {
                    // The ray from the target outward is the reverse of the
                    // attacker's travel direction; capability is symmetric.
                    if kind.slides_along(dir) {
                        return true;
                    }
                }
            }
            break;
        }
    }

    let knight = Piece::new(by, PieceType::Knight);
    for (df, dr) in KNIGHT_OFFSETS {
        if let Some(from) = sq.offset(df, dr) {
            if pos.get(from) == knight {
                return true;
            }
        }
    }

    let king = Piece::new(by, PieceType::King);
    for dir in Direction::ALL {
        if let Some(from) = sq.step(dir) {
            if pos.get(from) == king {
                return true;
            }
        }
    }

    // A pawn of `by` attacks sq from one rank behind it (relative to `by`).
    let pawn = Piece::new(by, PieceType::Pawn);
    for df in [-1i8, 1] {
        if let Some(from) = sq.offset(df, -by.forward()) {
            if pos.get(from) == pawn {
                return true;
            }
        }
    }

    false
}

// =========================================================================
// Per-piece generators
// =========================================================================

fn slider_moves(pos: &Position, from: Square, us: Color, kind: PieceType, out: &mut Vec<Move>) {
    for dir in Direction::ALL {
        if !kind.slides_along(dir) {
            continue;
        }
        let mut cur = from;
        while let Some(next) = cur.step(dir) {
            cur = next;
            let target = pos.get(cur);
            if target.is_empty() {
                out.push(Move::new(from, cur));
                continue;
            }
            if !target.is(us) {
                if let Some(victim) = target.kind() {
                    out.push(Move::with_flags(from, cur, MoveFlags::capture(victim)));
                }
            }
            break;
        }
    }
}

fn offset_moves(pos: &Position, from: Square, us: Color, offsets: &[(i8, i8)], out: &mut Vec<Move>) {
    for &(df, dr) in offsets {
        let Some(to) = from.offset(df, dr) else {
            continue;
        };
        let target = pos.get(to);
        if target.is_empty() {
            out.push(Move::new(from, to));
        } else if !target.is(us) {
            if let Some(victim) = target.kind() {
                out.push(Move::with_flags(from, to, MoveFlags::capture(victim)));
            }
        }
    }
}

fn pawn_moves(pos: &Position, from: Square, us: Color, out: &mut Vec<Move>) {
    let forward = us.forward();
    let start_rank = match us {
        Color::White => 1,
        Color::Black => 6,
    };
    let promo_rank = match us {
        Color::White => 7,
        Color::Black => 0,
    };

    // Pushes.
    if let Some(one) = from.offset(0, forward) {
        if pos.get(one).is_empty() {
            push_pawn_move(from, one, MoveFlags::NONE, promo_rank, out);
            if from.rank() == start_rank {
                if let Some(two) = from.offset(0, 2 * forward) {
                    if pos.get(two).is_empty() {
                        out.push(Move::new(from, two));
                    }
                }
            }
        }
    }

    // Diagonal captures and en passant.
    for df in [-1i8, 1] {
        let Some(to) = from.offset(df, forward) else {
            continue;
        };
        let target = pos.get(to);
        if !target.is_empty() && !target.is(us) {
            if let Some(victim) = target.kind() {
                push_pawn_move(from, to, MoveFlags::capture(victim), promo_rank, out);
            }
        } else if pos.en_passant() == Some(to) {
            out.push(Move::with_flags(from, to, MoveFlags::EP_CAPTURE));
        }
    }
}

/// Emit a pawn move, expanding to four promotion moves on the last rank.
fn push_pawn_move(from: Square, to: Square, base: MoveFlags, promo_rank: u8, out: &mut Vec<Move>) {
    if to.rank() == promo_rank {
        for kind in MoveFlags::PROMOTION_ORDER {
            out.push(Move::with_flags(from, to, base | MoveFlags::promotion(kind)));
        }
    } else {
        out.push(Move::with_flags(from, to, base));
    }
}

fn castle_moves(pos: &Position, from: Square, us: Color, out: &mut Vec<Move>) {
    let home = match us {
        Color::White => 0,
        Color::Black => 7,
    };
    // The king must stand on its original square.
    if from != Square::from_file_rank(4, home) {
        return;
    }
    if is_square_attacked(pos, from, !us) {
        return;
    }
    let rights = pos.castling();
    let rook = Piece::new(us, PieceType::Rook);
    let them = !us;

    if rights.can_castle_kingside(us) && pos.get(Square::from_file_rank(7, home)) == rook {
        let f = Square::from_file_rank(5, home);
        let g = Square::from_file_rank(6, home);
        if pos.get(f).is_empty()
            && pos.get(g).is_empty()
            && !is_square_attacked(pos, f, them)
            && !is_square_attacked(pos, g, them)
        {
            out.push(Move::with_flags(from, g, MoveFlags::castle(false)));
        }
    }

    if rights.can_castle_queenside(us) && pos.get(Square::from_file_rank(0, home)) == rook {
        let b = Square::from_file_rank(1, home);
        let c = Square::from_file_rank(2, home);
        let d = Square::from_file_rank(3, home);
        if pos.get(b).is_empty()
            && pos.get(c).is_empty()
            && pos.get(d).is_empty()
            && !is_square_attacked(pos, c, them)
            && !is_square_attacked(pos, d, them)
        {
            out.push(Move::with_flags(from, c, MoveFlags::castle(true)));
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
