//! Incremental piece-encounter cache.
//!
//! For each of the 8 ray directions and each square, the cache stores the
//! nearest occupied square scanning outward in that direction (or none
//! before the edge). A full build walks every ray once; move application
//! touches only the squares between the changed square and the next blocker
//! on each ray, via the `vacate`/`occupy` primitives. A validity flag can
//! mark the whole cache stale, forcing a rebuild on the next `ensure`.

use tracing::debug;

use crate::engine::board::Position;
use crate::engine::types::{Direction, Move, PieceType, Square};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncounterCache {
    /// `nearest[dir][sq]`: first occupied square from `sq` along `dir`.
    nearest: [[Option<Square>; 64]; 8],
    valid: bool,
}

impl Default for EncounterCache {
    fn default() -> Self {
        EncounterCache {
            nearest: [[None; 64]; 8],
            valid: false,
        }
    }
}

impl EncounterCache {
    /// Build the cache for a position from scratch.
    pub fn build(pos: &Position) -> Self {
        let mut cache = EncounterCache::default();
        cache.rebuild(pos);
        cache
    }

    /// The nearest occupied square from `sq` along `dir`, exclusive of `sq`.
    #[inline]
    pub fn nearest(&self, dir: Direction, sq: Square) -> Option<Square> {
        self.nearest[dir.index()][sq.0 as usize]
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Mark the cache stale; the next `ensure` recomputes it.
    pub fn invalidate(&mut self) {
        debug!("encounter cache invalidated");
        self.valid = false;
    }

    /// Rebuild if the validity flag has been cleared.
    pub fn ensure(&mut self, pos: &Position) {
        if !self.valid {
            self.rebuild(pos);
        }
    }

    /// Full recomputation: walk each direction from its far edge inward,
    /// carrying the most recently seen occupied square.
    pub fn rebuild(&mut self, pos: &Position) {
        for dir in Direction::ALL {
            // Process squares so that `sq.step(dir)` is always visited
            // before `sq`; ordering by the ray coordinate does that.
            let (df, dr) = dir.delta();
            let mut order: Vec<Square> = Square::all().collect();
            order.sort_by_key(|s| {
                -(s.file() as i32 * df as i32 + s.rank() as i32 * dr as i32)
            });

            for sq in order {
                let entry = match sq.step(dir) {
                    None => None,
                    Some(next) => {
                        if !pos.get(next).is_empty() {
                            Some(next)
                        } else {
                            self.nearest(dir, next)
                        }
                    }
                };
                self.nearest[dir.index()][sq.0 as usize] = entry;
            }
        }
        self.valid = true;
    }

    /// Update the cache for a move already applied to `pos`. Handles the
    /// ordinary from/to pair plus the extra squares touched by en passant
    /// and castling. Cost is bounded by one ray walk per direction per
    /// changed square.
    pub fn apply_move(&mut self, pos: &Position, mv: Move) {
        if !self.valid {
            self.rebuild(pos);
            return;
        }

        // Clear every vacated square first so occupy walks see through them.
        self.vacate(pos, mv.from);
        if mv.flags.is_en_passant() {
            if let Some(color) = pos.get(mv.to).color() {
                if let Some(victim) = mv.to.offset(0, -color.forward()) {
                    self.vacate(pos, victim);
                }
            }
        }
        let rook_squares = if mv.flags.is_castle() {
            let rank = mv.to.rank();
            if mv.flags.is_queenside() {
                Some((Square::from_file_rank(0, rank), Square::from_file_rank(3, rank)))
            } else {
                Some((Square::from_file_rank(7, rank), Square::from_file_rank(5, rank)))
            }
        } else {
            None
        };
        if let Some((rook_from, _)) = rook_squares {
            self.vacate(pos, rook_from);
        }

        self.occupy(pos, mv.to);
        if let Some((_, rook_to)) = rook_squares {
            self.occupy(pos, rook_to);
        }
    }

    /// `sq` is no longer occupied: squares that saw it now see whatever it
    /// saw beyond itself, on every ray.
    pub fn vacate(&mut self, pos: &Position, sq: Square) {
        for dir in Direction::ALL {
            let beyond = self.nearest(dir, sq);
            let back = dir.reverse();
            let mut cur = sq;
            while let Some(prev) = cur.step(back) {
                cur = prev;
                if self.nearest(dir, cur) != Some(sq) {
                    break;
                }
                self.nearest[dir.index()][cur.0 as usize] = beyond;
                if !pos.get(cur).is_empty() {
                    break;
                }
            }
        }
    }

    /// `sq` has become occupied: it is now the nearest blocker for every
    /// square behind it on each ray, up to the previous blocker.
    pub fn occupy(&mut self, pos: &Position, sq: Square) {
        for dir in Direction::ALL {
            let back = dir.reverse();
            let mut cur = sq;
            while let Some(prev) = cur.step(back) {
                cur = prev;
                self.nearest[dir.index()][cur.0 as usize] = Some(sq);
                if !pos.get(cur).is_empty() {
                    break;
                }
            }
        }
    }
}
