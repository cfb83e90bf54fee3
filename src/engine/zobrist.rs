//! Zobrist keys for repetition detection.
//!
//! Each aspect of a position relevant to repetition equivalence (piece on
//! square, side to move, castling rights, en passant file) gets a random
//! 64-bit key; a position's repetition key is the XOR of all applicable
//! keys. The move clocks are deliberately not hashed: threefold repetition
//! compares layout, turn, castling, and en passant only.

use crate::engine::board::Position;
use crate::engine::types::{Color, PieceType, Square};

// ---------------------------------------------------------------------------
// Table dimensions
// ---------------------------------------------------------------------------

/// 16 possible castling-rights bitmasks (0..15).
const CASTLING_KEYS: usize = 16;
/// 8 en-passant files (a..h). Only the file is hashed, not the full square.
const EP_KEYS: usize = 8;
/// Total number of random keys.
#[cfg(test)]
const TOTAL_KEYS: usize = 2 * 6 * 64 + 1 + CASTLING_KEYS + EP_KEYS;

// ---------------------------------------------------------------------------
// ZobristKeys — immutable singleton
// ---------------------------------------------------------------------------

/// Pre-computed Zobrist random keys (generated once at startup via `OnceLock`).
pub struct ZobristKeys {
    /// piece\[color\]\[piece_type\]\[square\] — random key for a piece on a square.
    pub piece: [[[u64; 64]; 6]; 2],
    /// XOR this when it is Black's turn to move.
    pub side_to_move: u64,
    /// castling\[rights_as_u8\] — one key per possible castling bitmask (0..15).
    pub castling: [u64; CASTLING_KEYS],
    /// en_passant\[file\] — one key per possible en-passant file.
    pub en_passant: [u64; EP_KEYS],
}

/// Static singleton holding the Zobrist keys (initialised once).
static ZOBRIST: std::sync::OnceLock<ZobristKeys> = std::sync::OnceLock::new();

/// Get a reference to the global Zobrist keys.
pub fn keys() -> &'static ZobristKeys {
    ZOBRIST.get_or_init(ZobristKeys::init)
}

/// Repetition key for a position: piece layout, turn, castling rights, and
/// en passant file. Two positions with equal keys are treated as repeats;
/// halfmove and fullmove clocks never enter the hash.
pub fn repetition_key(pos: &Position) -> u64 {
    let k = keys();
    let mut hash = 0u64;

    for (sq, piece) in pos.pieces() {
        if let (Some(color), Some(kind)) = (piece.color(), piece.kind()) {
            hash ^= k.piece_key(color, kind, sq);
        }
    }
    if pos.turn() == Color::Black {
        hash ^= k.side_to_move;
    }
    hash ^= k.castling_key(pos.castling().0);
    if let Some(ep) = pos.en_passant() {
        hash ^= k.ep_key(ep.file());
    }
    hash
}

impl ZobristKeys {
    /// Generate all keys using a deterministic PRNG seeded with a fixed value.
    /// Using a fixed seed ensures reproducible hashes across runs.
    fn init() -> Self {
        let mut rng = Xorshift64::new(0x3243_F6A8_885A_308D); // π digits

        let mut piece = [[[0u64; 64]; 6]; 2];
        for color in &mut piece {
            for pt in color {
                for sq in pt {
                    *sq = rng.next_u64();
                }
            }
        }

        let side_to_move = rng.next_u64();

        let mut castling = [0u64; CASTLING_KEYS];
        for key in &mut castling {
            *key = rng.next_u64();
        }

        let mut en_passant = [0u64; EP_KEYS];
        for key in &mut en_passant {
            *key = rng.next_u64();
        }

        ZobristKeys {
            piece,
            side_to_move,
            castling,
            en_passant,
        }
    }

    // -----------------------------------------------------------------------
    // Convenience accessors
    // -----------------------------------------------------------------------

    /// Key for a specific piece on a specific square.
    #[inline]
    pub fn piece_key(&self, color: Color, piece: PieceType, sq: Square) -> u64 {
        self.piece[color.index()][piece.index()][sq.0 as usize]
    }

    /// Key for a specific en-passant file (0-7).
    #[inline]
    pub fn ep_key(&self, file: u8) -> u64 {
        self.en_passant[file as usize]
    }

    /// Key for a specific castling-rights bitmask.
    #[inline]
    pub fn castling_key(&self, rights: u8) -> u64 {
        self.castling[rights as usize]
    }
}

// ---------------------------------------------------------------------------
// Deterministic PRNG (xorshift64)
// ---------------------------------------------------------------------------

/// Minimal xorshift64 PRNG — deterministic, fast, good distribution.
struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    fn new(seed: u64) -> Self {
        // Ensure state is never zero (xorshift zero → always zero).
        Xorshift64 {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
