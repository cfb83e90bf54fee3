//! Standard Algebraic Notation (SAN) generation and parsing.
//!
//! SAN examples: `e4`, `Nf3`, `Bxe5`, `O-O`, `e8=Q+`, `Raxd1#`.
//!
//! Rendering includes the check suffix: `+` when the move gives check, `#`
//! when it mates. Parsing matches input against the rendered text of each
//! legal move, then falls back to a coordinate form ("e2e4", "e7e8q").

use crate::engine::board::Position;
use crate::engine::movegen;
use crate::engine::types::{Color, EngineError, Move, PieceType, Square};

// =========================================================================
// SAN generation
// =========================================================================

/// Convert a legal move to SAN, check suffix included.
pub fn to_san(pos: &Position, mv: Move) -> String {
    let legal = movegen::legal_moves(pos);
    to_san_with(pos, mv, &legal)
}

/// Like [`to_san`], with the position's legal moves passed in to avoid
/// regenerating them per move.
pub fn to_san_with(pos: &Position, mv: Move, legal: &[Move]) -> String {
    let mut san = if mv.flags.is_castle() {
        if mv.flags.is_queenside() {
            "O-O-O".to_string()
        } else {
            "O-O".to_string()
        }
    } else {
        let piece = pos.get(mv.from);
        let kind = piece.kind().unwrap_or(PieceType::Pawn);
        let mut s = String::new();

        match kind {
            PieceType::Pawn => {
                if mv.flags.is_capture() {
                    s.push((b'a' + mv.from.file()) as char);
                    s.push('x');
                }
            }
            _ => {
                s.push(kind.to_char(Color::White));
                s.push_str(&disambiguation(pos, mv, kind, legal));
                if mv.flags.is_capture() {
                    s.push('x');
                }
            }
        }
        s.push_str(&mv.to.to_algebraic());
        if let Some(promo) = mv.flags.promotion_piece() {
            s.push('=');
            s.push(promo.to_char(Color::White));
        }
        s
    };

    san.push_str(check_suffix(pos, mv));
    san
}

/// Disambiguation text when another piece of the same kind can also reach
/// the destination: by file when the file suffices (preferred), by rank
/// when only the rank does, by full square otherwise.
fn disambiguation(pos: &Position, mv: Move, kind: PieceType, legal: &[Move]) -> String {
    let rivals: Vec<Square> = legal
        .iter()
        .filter(|m| {
            m.to == mv.to && m.from != mv.from && pos.get(m.from).kind() == Some(kind)
        })
        .map(|m| m.from)
        .collect();
    if rivals.is_empty() {
        return String::new();
    }
    let from = mv.from;
    let same_file = rivals.iter().any(|r| r.file() == from.file());
    let same_rank = rivals.iter().any(|r| r.rank() == from.rank());
    match (same_file, same_rank) {
        (false, _) => ((b'a' + from.file()) as char).to_string(),
        (true, false) => ((b'1' + from.rank()) as char).to_string(),
        (true, true) => from.to_algebraic(),
    }
}

/// `+` for check, `#` for mate, empty otherwise.
fn check_suffix(pos: &Position, mv: Move) -> &'static str {
    let next = pos.successor(mv);
    if !movegen::is_in_check(&next, next.turn()) {
        return "";
    }
    if movegen::legal_moves(&next).is_empty() {
        "#"
    } else {
        "+"
    }
}

// =========================================================================
// SAN parsing
// =========================================================================

/// Parse move text against the position's legal moves. Exact SAN matches
/// win (with or without the check suffix); a 4-5 character coordinate form
/// is accepted as a fallback. Anything else is an unknown move.
pub fn parse(pos: &Position, text: &str) -> Result<Move, EngineError> {
    let text = text.trim();
    let legal = movegen::legal_moves(pos);

    let bare = text.trim_end_matches(['+', '#']);
    for &mv in &legal {
        let san = to_san_with(pos, mv, &legal);
        if san == text || san.trim_end_matches(['+', '#']) == bare {
            return Ok(mv);
        }
    }

    // Coordinate fallback: origin + destination, optional promotion piece.
    if let Some(mv) = parse_coordinate(bare, &legal) {
        return Ok(mv);
    }

    Err(EngineError::UnknownMove(text.to_string()))
}

fn parse_coordinate(text: &str, legal: &[Move]) -> Option<Move> {
    // Byte-indexed slicing below requires single-byte characters.
    if !text.is_ascii() || (text.len() != 4 && text.len() != 5) {
        return None;
    }
    let from = Square::from_algebraic(&text[0..2])?;
    let to = Square::from_algebraic(&text[2..4])?;
    let promo = if text.len() == 5 {
        let (_, kind) = PieceType::from_char(text.as_bytes()[4] as char)?;
        Some(kind)
    } else {
        None
    };

    legal
        .iter()
        .copied()
        .find(|m| m.from == from && m.to == to && m.flags.promotion_piece() == promo)
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

    fn san_of(fen: &str, from: &str, to: &str) -> String {
        let p = pos(fen);
        let mv = movegen::legal_moves(&p)
            .into_iter()
            .find(|m| m.from == sq(from) && m.to == sq(to))
            .unwrap_or_else(|| panic!("{from}{to} not legal in {fen}"));
        to_san(&p, mv)
    }

    #[test]
    fn simple_moves() {
        let start = crate::engine::board::START_FEN;
        assert_eq!(san_of(start, "e2", "e4"), "e4");
        assert_eq!(san_of(start, "g1", "f3"), "Nf3");
    }

    #[test]
    fn captures() {
        assert_eq!(
            san_of("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1", "e4", "d5"),
            "exd5"
        );
        assert_eq!(
            san_of("4k3/8/8/3p4/8/8/8/3RK3 w - - 0 1", "d1", "d5"),
            "Rxd5"
        );
    }

    #[test]
    fn castling_text() {
        let p = pos("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        let legal = movegen::legal_moves(&p);
        let ks = legal.iter().find(|m| m.flags.is_castle() && !m.flags.is_queenside()).unwrap();
        let qs = legal.iter().find(|m| m.flags.is_castle() && m.flags.is_queenside()).unwrap();
        assert_eq!(to_san(&p, *ks), "O-O");
        assert_eq!(to_san(&p, *qs), "O-O-O");
    }

    #[test]
    fn promotion_text() {
        assert_eq!(san_of("4k3/P7/8/8/8/8/8/4K3 w - - 0 1", "a7", "a8"), "a8=Q");
    }

    #[test]
    fn check_and_mate_suffixes() {
        // Rook to e8 gives bare check.
        assert_eq!(
            san_of("4k3/8/8/8/8/8/8/R5K1 w - - 0 1", "a1", "a8"),
            "Ra8+"
        );
        // Back-rank mate.
        assert_eq!(
            san_of("6k1/5ppp/8/8/8/8/8/4R1K1 w - - 0 1", "e1", "e8"),
            "Re8#"
        );
    }

    #[test]
    fn knights_sharing_a_rank_disambiguate_by_file() {
        // Knights b1 and f1 both reach d2.
        assert_eq!(
            san_of("4k3/8/8/8/8/8/8/1N2KN2 w - - 0 1", "b1", "d2"),
            "Nbd2"
        );
    }

    #[test]
    fn knights_sharing_a_file_disambiguate_by_rank() {
        // Knights e2 and e6 both reach c... take d4.
        assert_eq!(
            san_of("4k3/8/4N3/8/8/8/4N3/4K3 w - - 0 1", "e2", "d4"),
            "N2d4"
        );
    }

    #[test]
    fn knights_sharing_neither_disambiguate_by_file() {
        // Knights b3 and f5, both reaching d4: file suffices.
        assert_eq!(
            san_of("4k3/8/8/5N2/8/1N6/8/4K3 w - - 0 1", "b3", "d4"),
            "Nbd4"
        );
    }

    #[test]
    fn three_way_ambiguity_needs_full_square() {
        // Queens b1, d1, and d5 all reach d3: d1 shares its file with d5
        // and its rank with b1, so only the full square disambiguates.
        let fen = "4k3/8/8/3Q4/8/8/8/1Q1Q3K w - - 0 1";
        assert_eq!(san_of(fen, "d1", "d3"), "Qd1d3");
    }

    #[test]
    fn parse_round_trips_every_legal_move() {
        let fens = [
            crate::engine::board::START_FEN,
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "4k3/P7/8/8/8/8/8/4K3 w - - 0 1",
        ];
        for fen in fens {
            let p = pos(fen);
            for mv in movegen::legal_moves(&p) {
                let text = to_san(&p, mv);
                let parsed = parse(&p, &text)
                    .unwrap_or_else(|e| panic!("failed to parse {text} in {fen}: {e}"));
                assert!(parsed.same_move(mv), "{text} parsed to a different move");
            }
        }
    }

    #[test]
    fn parse_accepts_suffixless_input() {
        let p = pos("4k3/8/8/8/8/8/8/R5K1 w - - 0 1");
        let mv = parse(&p, "Ra8").unwrap();
        assert_eq!(mv.to, sq("a8"));
    }

    #[test]
    fn parse_coordinate_fallback() {
        let p = Position::start();
        let mv = parse(&p, "e2e4").unwrap();
        assert_eq!((mv.from, mv.to), (sq("e2"), sq("e4")));

        // Promotion needs the fifth character.
        let p = pos("4k3/P7/8/8/8/8/8/4K3 w - - 0 1");
        let mv = parse(&p, "a7a8r").unwrap();
        assert_eq!(mv.flags.promotion_piece(), Some(PieceType::Rook));
    }

    #[test]
    fn parse_rejects_unknown_text() {
        let p = Position::start();
        for text in ["Qh5", "e5", "e2e5", "xyzzy", "i9i9", ""] {
            assert!(
                matches!(parse(&p, text), Err(EngineError::UnknownMove(_))),
                "accepted {text:?}"
            );
        }
    }

    #[test]
    fn parse_rejects_non_ascii_text_without_panicking() {
        // Multibyte characters must not trip the coordinate slicing.
        let p = Position::start();
        for text in ["e\u{20AC}4", "\u{00E9}2e4", "e2e\u{4E94}", "\u{265E}f3"] {
            assert!(
                matches!(parse(&p, text), Err(EngineError::UnknownMove(_))),
                "accepted {text:?}"
            );
        }
    }

    #[test]
    fn en_passant_renders_as_pawn_capture() {
        let p = pos("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1");
        let ep = movegen::legal_moves(&p)
            .into_iter()
            .find(|m| m.flags.is_en_passant())
            .unwrap();
        assert_eq!(to_san(&p, ep), "exd6");
        assert!(parse(&p, "exd6").unwrap().flags.is_en_passant());
    }
}
