//! Static position evaluation.
//!
//! The default evaluator scores material balance plus middle-game
//! piece-square tables, and reports the result from the side-to-move
//! perspective as a [`Score`]. The `Evaluator` trait is the seam the
//! search uses, so callers can substitute their own heuristic.

use crate::ai::score::Score;
use crate::engine::board::Position;
use crate::engine::types::{Color, PieceType, Square};

/// Heuristic position scoring, from the side-to-move perspective.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, pos: &Position) -> Score;
}

// =========================================================================
// Material values (centipawns)
// =========================================================================

const PIECE_VALUE: [i32; 6] = [
    100, // Pawn
    320, // Knight
    330, // Bishop
    500, // Rook
    900, // Queen
    0,   // King (not counted in material balance)
];

// =========================================================================
// Piece-Square Tables (middle-game, from White's perspective)
//
// Indexed by square (LERF: a1=0 .. h8=63).
// Values are centipawn bonuses/penalties.
// =========================================================================

/// Pawn PST — encourages central pawns and advancement.
#[rustfmt::skip]
const PAWN_PST: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,   // rank 1 (never occupied)
     5, 10, 10,-20,-20, 10, 10,  5,   // rank 2
     5, -5,-10,  0,  0,-10, -5,  5,   // rank 3
     0,  0,  0, 20, 20,  0,  0,  0,   // rank 4
     5,  5, 10, 25, 25, 10,  5,  5,   // rank 5
    10, 10, 20, 30, 30, 20, 10, 10,   // rank 6
    50, 50, 50, 50, 50, 50, 50, 50,   // rank 7
     0,  0,  0,  0,  0,  0,  0,  0,   // rank 8 (promoted)
];

/// Knight PST — encourages centralization.
#[rustfmt::skip]
const KNIGHT_PST: [i32; 64] = [
    -50,-40,-30,-30,-30,-30,-40,-50,
    -40,-20,  0,  5,  5,  0,-20,-40,
    -30,  5, 10, 15, 15, 10,  5,-30,
    -30,  0, 15, 20, 20, 15,  0,-30,
    -30,  5, 15, 20, 20, 15,  5,-30,
    -30,  0, 10, 15, 15, 10,  0,-30,
    -40,-20,  0,  0,  0,  0,-20,-40,
    -50,-40,-30,-30,-30,-30,-40,-50,
];

/// Bishop PST — encourages long diagonals and avoids corners.
#[rustfmt::skip]
const BISHOP_PST: [i32; 64] = [
    -20,-10,-10,-10,-10,-10,-10,-20,
    -10,  5,  0,  0,  0,  0,  5,-10,
    -10, 10, 10, 10, 10, 10, 10,-10,
    -10,  0, 10, 10, 10, 10,  0,-10,
    -10,  5,  5, 10, 10,  5,  5,-10,
    -10,  0,  5, 10, 10,  5,  0,-10,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -20,-10,-10,-10,-10,-10,-10,-20,
];

/// Rook PST — encourages 7th rank and open files.
#[rustfmt::skip]
const ROOK_PST: [i32; 64] = [
      0,  0,  0,  5,  5,  0,  0,  0,
     -5,  0,  0,  0,  0,  0,  0, -5,
     -5,  0,  0,  0,  0,  0,  0, -5,
     -5,  0,  0,  0,  0,  0,  0, -5,
     -5,  0,  0,  0,  0,  0,  0, -5,
     -5,  0,  0,  0,  0,  0,  0, -5,
      5, 10, 10, 10, 10, 10, 10,  5,
      0,  0,  0,  0,  0,  0,  0,  0,
];

/// Queen PST — minor centralization bonus.
#[rustfmt::skip]
const QUEEN_PST: [i32; 64] = [
    -20,-10,-10, -5, -5,-10,-10,-20,
    -10,  0,  5,  0,  0,  0,  0,-10,
    -10,  5,  5,  5,  5,  5,  0,-10,
      0,  0,  5,  5,  5,  5,  0, -5,
     -5,  0,  5,  5,  5,  5,  0, -5,
    -10,  0,  5,  5,  5,  5,  0,-10,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -20,-10,-10, -5, -5,-10,-10,-20,
];

/// King PST (middle-game) — encourages castled position, penalizes center.
#[rustfmt::skip]
const KING_MG_PST: [i32; 64] = [
     20, 30, 10,  0,  0, 10, 30, 20,
     20, 20,  0,  0,  0,  0, 20, 20,
    -10,-20,-20,-20,-20,-20,-20,-10,
    -20,-30,-30,-40,-40,-30,-30,-20,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
];

const PST: [[i32; 64]; 6] = [
    PAWN_PST,
    KNIGHT_PST,
    BISHOP_PST,
    ROOK_PST,
    QUEEN_PST,
    KING_MG_PST,
];

// =========================================================================
// Default evaluator
// =========================================================================

/// Material + piece-square evaluation with a bishop-pair bonus.
#[derive(Clone, Copy, Debug, Default)]
pub struct MaterialEvaluator;

impl Evaluator for MaterialEvaluator {
    fn evaluate(&self, pos: &Position) -> Score {
        let cp = evaluate_white(pos);
        match pos.turn() {
            Color::White => Score::centipawns(cp),
            Color::Black => Score::centipawns(-cp),
        }
    }
}

/// Centipawn score from White's perspective.
pub fn evaluate_white(pos: &Position) -> i32 {
    let mut score = 0i32;
    let mut bishops = [0u32; 2];

    for (sq, piece) in pos.pieces() {
        let (Some(color), Some(kind)) = (piece.color(), piece.kind()) else {
            continue;
        };
        let idx = kind.index();
        match color {
            Color::White => {
                score += PIECE_VALUE[idx];
                score += PST[idx][sq.0 as usize];
            }
            Color::Black => {
                score -= PIECE_VALUE[idx];
                score -= PST[idx][mirror_square(sq) as usize];
            }
        }
        if kind == PieceType::Bishop {
            bishops[color.index()] += 1;
        }
    }

    // Bishop pair bonus.
    if bishops[Color::White.index()] >= 2 {
        score += 30;
    }
    if bishops[Color::Black.index()] >= 2 {
        score -= 30;
    }

    score
}

/// Mirror a square vertically (flip rank) for Black PST lookup.
#[inline]
fn mirror_square(sq: Square) -> u8 {
    sq.0 ^ 56 // XOR with 56 flips rank: rank 0 ↔ rank 7, rank 1 ↔ rank 6, etc.
}

// =========================================================================
// Tests
// =========================================================================
