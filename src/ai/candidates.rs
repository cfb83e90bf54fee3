//! Candidate move classification.
//!
//! The search does not expand raw legal-move lists; a classifier triages
//! them into a [`CandSet`] with three relevance tiers plus an untriaged
//! `legal` bucket. The buckets are disjoint by construction: each move
//! lands in exactly one.

use crate::engine::attacks;
use crate::engine::board::Position;
use crate::engine::cache::EncounterCache;
use crate::engine::movegen;
use crate::engine::types::{Color, Direction, Move, PieceType, Square};

/// Staged move lists for search expansion. Either `legal` is populated and
/// the tiers are empty, or the tiers partition the legal moves.
#[derive(Clone, Debug, Default)]
pub struct CandSet {
    /// Forcing moves: captures, promotions, checks.
    pub critical: Vec<Move>,
    /// Constructive quiet moves onto squares the mover is not losing.
    pub medial: Vec<Move>,
    /// Everything else ("closing" moves).
    pub closing: Vec<Move>,
    /// Untriaged legal moves, for callers that skip classification.
    pub legal: Vec<Move>,
}

impl CandSet {
    /// A set with every move in the untriaged bucket.
    pub fn from_legal(legal: Vec<Move>) -> Self {
        CandSet {
            legal,
            ..CandSet::default()
        }
    }

    /// Total candidate count: the legal list when populated, otherwise the
    /// sum of the three tiers.
    pub fn total(&self) -> usize {
        if !self.legal.is_empty() {
            self.legal.len()
        } else {
            self.critical.len() + self.medial.len() + self.closing.len()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Moves in expansion order: critical first, then medial, then closing;
    /// the untriaged bucket when the tiers are unused.
    pub fn ordered(&self) -> impl Iterator<Item = &Move> {
        self.critical
            .iter()
            .chain(self.medial.iter())
            .chain(self.closing.iter())
            .chain(self.legal.iter())
    }
}

/// External collaborator: triage a position's legal moves.
pub trait MoveClassifier: Send + Sync {
    fn classify(&self, pos: &Position) -> CandSet;
}

// =========================================================================
// Default classifier
// =========================================================================

/// Default triage: forcing moves are critical; quiet moves are medial when
/// the landing square is not simply lost (checked against the signed
/// control count and a cache-accelerated slider probe), closing otherwise.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreatClassifier;

impl MoveClassifier for ThreatClassifier {
    fn classify(&self, pos: &Position) -> CandSet {
        let mut set = CandSet::default();
        let cache = EncounterCache::build(pos);
        let us = pos.turn();

        for mv in movegen::legal_moves(pos) {
            if mv.flags.is_capture() || mv.flags.is_promotion() || gives_check(pos, mv) {
                set.critical.push(mv);
            } else if quiet_move_is_sound(pos, &cache, mv, us) {
                set.medial.push(mv);
            } else {
                set.closing.push(mv);
            }
        }
        set.critical
            .sort_by_key(|&m| std::cmp::Reverse(capture_order_key(pos, m)));
        set
    }
}

/// A quiet move is sound when the destination is not covered by an enemy
/// slider (nearest-encounter lookup per ray) and the signed control balance
/// there does not already favour the opponent.
fn quiet_move_is_sound(pos: &Position, cache: &EncounterCache, mv: Move, us: Color) -> bool {
    if slider_covers_via_cache(pos, cache, mv.to, !us) {
        return false;
    }
    let balance = attacks::control_count(pos, mv.to);
    match us {
        Color::White => balance >= 0,
        Color::Black => balance <= 0,
    }
}

/// Does any slider of `by` cover `sq`? The encounter cache gives the first
/// occupied square per ray in O(1), so this is 8 lookups instead of 8 walks.
pub fn slider_covers_via_cache(
    pos: &Position,
    cache: &EncounterCache,
    sq: Square,
    by: Color,
) -> bool {
    for dir in Direction::ALL {
        if let Some(blocker) = cache.nearest(dir, sq) {
            let piece = pos.get(blocker);
            if piece.is(by) && piece.kind().is_some_and(|k| k.slides_along(dir)) {
                return true;
            }
        }
    }
    false
}

fn gives_check(pos: &Position, mv: Move) -> bool {
    let next = pos.successor(mv);
    movegen::is_in_check(&next, next.turn())
}

/// Rough forcing-move ordering value for the critical bucket: most
/// valuable victim first, least valuable attacker breaking ties.
pub fn capture_order_key(pos: &Position, mv: Move) -> i32 {
    let victim = mv.flags.captured().map_or(0, PieceType::value);
    let attacker = pos.get(mv.from).kind().map_or(0, PieceType::value);
    victim * 10 - attacker
}

/// Convenience for tests and callers without a custom classifier.
pub fn classify(pos: &Position) -> CandSet {
    ThreatClassifier.classify(pos)
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    #[test]
    fn buckets_partition_the_legal_moves() {
        let fens = [
            crate::engine::board::START_FEN,
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        ];
        for fen in fens {
            let p = pos(fen);
            let set = classify(&p);
            let legal = movegen::legal_moves(&p);
            assert!(set.legal.is_empty());
            assert_eq!(set.total(), legal.len(), "partition lost moves in {fen}");

            // No move appears in two buckets.
            for mv in &set.critical {
                assert!(!set.medial.contains(mv));
                assert!(!set.closing.contains(mv));
            }
            for mv in &set.medial {
                assert!(!set.closing.contains(mv));
            }
        }
    }

    #[test]
    fn captures_promotions_and_checks_are_critical() {
        let p = pos("4k3/P7/8/3p4/4P3/8/8/R3K3 w Q - 0 1");
        let set = classify(&p);
        for mv in &set.critical {
            let forcing = mv.flags.is_capture()
                || mv.flags.is_promotion()
                || gives_check(&p, *mv);
            assert!(forcing, "{mv} in the critical bucket is not forcing");
        }
        // exd5 is a capture, a7a8 promotes, Ra8 does not check here but
        // promotion moves definitely appear.
        assert!(set.critical.iter().any(|m| m.flags.is_capture()));
        assert!(set.critical.iter().any(|m| m.flags.is_promotion()));
    }

    #[test]
    fn total_prefers_the_legal_bucket() {
        let moves = movegen::legal_moves(&Position::start());
        let n = moves.len();
        let set = CandSet::from_legal(moves);
        assert_eq!(set.total(), n);

        let mut mixed = set;
        mixed.critical.push(Move::new(sq("e2"), sq("e4")));
        // legal is still populated, so the tiers do not count.
        assert_eq!(mixed.total(), n);
    }

    #[test]
    fn ordered_yields_critical_first() {
        let p = pos("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1");
        let set = classify(&p);
        assert!(!set.critical.is_empty());
        let first = set.ordered().next().unwrap();
        assert!(set.critical.contains(first));
    }

    #[test]
    fn cache_probe_matches_direct_walks() {
        let fens = [
            "1k6/8/6R1/8/4Q3/2B5/8/1K6 w - - 0 1",
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        ];
        for fen in fens {
            let p = pos(fen);
            let cache = EncounterCache::build(&p);
            for target in Square::all() {
                for by in [Color::White, Color::Black] {
                    let via_cache = slider_covers_via_cache(&p, &cache, target, by);
                    let direct = p.pieces().any(|(from, piece)| {
                        piece.is(by)
                            && piece.kind().is_some_and(|k| k.is_slider())
                            && attacks::beta_covers(&p, from, target)
                    });
                    assert_eq!(
                        via_cache, direct,
                        "{fen}: cache and walk disagree on {target} for {by}"
                    );
                }
            }
        }
    }

    #[test]
    fn capture_ordering_prefers_big_victims() {
        let p = pos("3qk3/8/8/3r4/4P3/8/8/3QK3 w - - 0 1");
        let pawn_takes_rook = Move::with_flags(
            sq("e4"),
            sq("d5"),
            crate::engine::types::MoveFlags::capture(PieceType::Rook),
        );
        let queen_takes_rook = Move::with_flags(
            sq("d1"),
            sq("d5"),
            crate::engine::types::MoveFlags::capture(PieceType::Rook),
        );
        assert!(capture_order_key(&p, pawn_takes_rook) > capture_order_key(&p, queen_takes_rook));
    }
}
