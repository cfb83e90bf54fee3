//! Attack and control analysis.
//!
//! Three reachability notions per piece, increasing in reach:
//!   - *alpha*: empty squares the piece could keep moving onto
//!   - *beta*: alpha plus the first occupied square on each line
//!   - *gamma*: beta extended through friendly blockers that can themselves
//!     move in the same direction (x-ray through a battery)
//!
//! Sliders get all three via directional walks. Knights, kings, and pawns
//! enumerate fixed offsets for alpha and beta; gamma is not defined for them
//! and degrades to beta. On top of the coverage predicates sit signed
//! control counts, king-safety probes, flight-square ("king net") counting,
//! and pin detection into a fixed-capacity cache.

use crate::engine::board::{Position, Sneak};
use crate::engine::movegen::{KING_OFFSETS, KNIGHT_OFFSETS};
use crate::engine::types::{Color, Direction, EngineError, Move, Piece, PieceType, Square};

/// Reachability notion for coverage queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reach {
    Alpha,
    Beta,
    Gamma,
}

// =========================================================================
// Coverage predicates
// =========================================================================

pub fn alpha_covers(pos: &Position, from: Square, to: Square) -> bool {
    covers(pos, from, to, Reach::Alpha)
}

pub fn beta_covers(pos: &Position, from: Square, to: Square) -> bool {
    covers(pos, from, to, Reach::Beta)
}

pub fn gamma_covers(pos: &Position, from: Square, to: Square) -> bool {
    covers(pos, from, to, Reach::Gamma)
}

/// Does the piece on `from` reach `to` under the given notion? False when
/// `from` is empty or `to == from`.
pub fn covers(pos: &Position, from: Square, to: Square, reach: Reach) -> bool {
    let piece = pos.get(from);
    let (Some(color), Some(kind)) = (piece.color(), piece.kind()) else {
        return false;
    };
    if from == to {
        return false;
    }

    if kind.is_slider() {
        return slider_covers(pos, from, to, color, kind, reach);
    }

    // Offset pieces: alpha reaches empty targets, beta any target. Gamma
    // has no x-ray meaning without a sliding line and degrades to beta.
    let hits = offset_targets(kind, color, from).any(|t| t == to);
    match reach {
        Reach::Alpha => hits && pos.get(to).is_empty(),
        Reach::Beta | Reach::Gamma => hits,
    }
}

fn slider_covers(
    pos: &Position,
    from: Square,
    to: Square,
    color: Color,
    kind: PieceType,
    reach: Reach,
) -> bool {
    let Some(dir) = Direction::between(from, to) else {
        return false;
    };
    if !kind.slides_along(dir) {
        return false;
    }

    let mut cur = from;
    while let Some(next) = cur.step(dir) {
        cur = next;
        let occupant = pos.get(cur);
        if cur == to {
            return match reach {
                Reach::Alpha => occupant.is_empty(),
                Reach::Beta | Reach::Gamma => true,
            };
        }
        if occupant.is_empty() {
            continue;
        }
        // A blocker before the target. Only gamma can see through it, and
        // only when it is a friendly piece able to continue the line.
        match reach {
            Reach::Alpha | Reach::Beta => return false,
            Reach::Gamma => {
                let battery = occupant.is(color)
                    && occupant.kind().is_some_and(|k| k.slides_along(dir));
                if !battery {
                    return false;
                }
            }
        }
    }
    false
}

/// Number of squares the piece on `from` covers under the given notion.
pub fn control(pos: &Position, from: Square, reach: Reach) -> usize {
    Square::all().filter(|&to| covers(pos, from, to, reach)).count()
}

/// The fixed-offset attack squares of a knight, king, or pawn.
fn offset_targets(
    kind: PieceType,
    color: Color,
    from: Square,
) -> impl Iterator<Item = Square> {
    let offsets: &'static [(i8, i8)] = match kind {
        PieceType::Knight => &KNIGHT_OFFSETS,
        PieceType::King => &KING_OFFSETS,
        // Pawns control their two forward diagonals only.
        PieceType::Pawn => match color {
            Color::White => &[(-1, 1), (1, 1)],
            Color::Black => &[(-1, -1), (1, -1)],
        },
        _ => &[],
    };
    offsets.iter().filter_map(move |&(df, dr)| from.offset(df, dr))
}

// =========================================================================
// Signed control counts
// =========================================================================

/// Signed attacker count for a square: +1 per white attacker, -1 per black.
/// Sliding lines stop at the first blocker unless that blocker can itself
/// move in the probed direction, which extends the line through a battery.
pub fn control_count(pos: &Position, sq: Square) -> i32 {
    let mut count = 0i32;

    for dir in Direction::ALL {
        let mut cur = sq;
        while let Some(next) = cur.step(dir) {
            cur = next;
            let piece = pos.get(cur);
            if piece.is_empty() {
                continue;
            }
            let Some(kind) = piece.kind() else { break };
            if kind.slides_along(dir) {
                count += sign(piece);
                // Capable blockers pass the line on to pieces behind them.
                continue;
            }
            break;
        }
    }

    let mut probe_offsets = |kind: PieceType| {
        for color in [Color::White, Color::Black] {
            let attacker = Piece::new(color, kind);
            // A piece attacks sq if sq is among its offset targets; probe
            // from sq with the offsets reversed (pawn offsets are the only
            // asymmetric ones).
            let offsets: &[(i8, i8)] = match kind {
                PieceType::Knight => &KNIGHT_OFFSETS,
                PieceType::King => &KING_OFFSETS,
                PieceType::Pawn => match color {
                    Color::White => &[(-1, -1), (1, -1)],
                    Color::Black => &[(-1, 1), (1, 1)],
                },
                _ => &[],
            };
            for &(df, dr) in offsets {
                if let Some(from) = sq.offset(df, dr) {
                    if pos.get(from) == attacker {
                        count += sign(attacker);
                    }
                }
            }
        }
    };
    probe_offsets(PieceType::Knight);
    probe_offsets(PieceType::King);
    probe_offsets(PieceType::Pawn);

    count
}

fn sign(piece: Piece) -> i32 {
    match piece.color() {
        Some(Color::White) => 1,
        Some(Color::Black) => -1,
        None => 0,
    }
}

// =========================================================================
// King safety and flight squares
// =========================================================================

/// Is `sq` safe for a king of `color`? Unsafe when an enemy slider
/// gamma-reaches it (x-raying only through the slider's own pieces) or an
/// enemy knight, king, or pawn attacks it by offset.
pub fn safe_for_king(pos: &Position, sq: Square, color: Color) -> bool {
    let them = !color;

    for dir in Direction::ALL {
        let mut cur = sq;
        while let Some(next) = cur.step(dir) {
            cur = next;
            let piece = pos.get(cur);
            if piece.is_empty() {
                continue;
            }
            let Some(kind) = piece.kind() else { break };
            if piece.is(them) {
                if kind.slides_along(dir) {
                    return false;
                }
                break;
            }
            // Own piece shields the ray; enemy gamma cannot pass it.
            break;
        }
    }

    for &(df, dr) in &KNIGHT_OFFSETS {
        if let Some(from) = sq.offset(df, dr) {
            if pos.get(from).is_exactly(them, PieceType::Knight) {
                return false;
            }
        }
    }
    for &(df, dr) in &KING_OFFSETS {
        if let Some(from) = sq.offset(df, dr) {
            if pos.get(from).is_exactly(them, PieceType::King) {
                return false;
            }
        }
    }
    for df in [-1i8, 1] {
        if let Some(from) = sq.offset(df, -them.forward()) {
            if pos.get(from).is_exactly(them, PieceType::Pawn) {
                return false;
            }
        }
    }

    true
}

/// Would the mover's king stand safe after `mv`? Probes with a scoped
/// in-place mutation and restores the position before returning.
pub fn king_safe_after(pos: &mut Position, mv: Move, color: Color) -> bool {
    let guard = Sneak::new(pos, mv);
    match guard.position().king_square(color) {
        Some(king) => safe_for_king(guard.position(), king, color),
        None => true,
    }
}

/// Flight-square count ("king net"): how many of the king's neighbours are
/// empty-and-safe to step onto, or hold an undefended enemy piece. Probes
/// each empty neighbour by sneaking the king there, so the king's own body
/// never shields a ray from its escape square.
pub fn flight_squares(pos: &mut Position, color: Color) -> u32 {
    let Some(king) = pos.king_square(color) else {
        return 0;
    };
    let them = !color;
    let mut net = 0;

    for &(df, dr) in &KING_OFFSETS {
        let Some(to) = king.offset(df, dr) else {
            continue;
        };
        let occupant = pos.get(to);
        if occupant.is_empty() {
            if king_safe_after(pos, Move::new(king, to), color) {
                net += 1;
            }
        } else if occupant.is(them) && !is_defended(pos, to, them) {
            net += 1;
        }
    }
    net
}

/// Is the piece on `sq` defended by another piece of `color`? Counts any
/// attacker of the square, seeing through the occupant itself.
fn is_defended(pos: &Position, sq: Square, color: Color) -> bool {
    crate::engine::movegen::is_square_attacked(pos, sq, color)
}

// =========================================================================
// Pin detection
// =========================================================================

pub const PIN_CAPACITY: usize = 8;

/// One absolute pin: the pinned piece, the enemy slider pinning it, and the
/// ray direction from the king through both.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pin {
    pub pinned: Square,
    pub pinner: Square,
    pub direction: Direction,
}

impl Pin {
    /// A pinned piece may only move along the pin axis or its reverse.
    pub fn allows(&self, mv: Move) -> bool {
        match Direction::between(mv.from, mv.to) {
            Some(dir) => dir == self.direction || dir == self.direction.reverse(),
            None => false,
        }
    }
}

/// Fixed-capacity store of the pins against one king. A king has 8 rays, so
/// 8 simultaneous pins is the geometric maximum; overflow is reported as a
/// typed error rather than silently truncated.
#[derive(Clone, Copy, Debug, Default)]
pub struct PinCache {
    pins: [Option<Pin>; PIN_CAPACITY],
    len: usize,
}

impl PinCache {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pin> {
        self.pins[..self.len].iter().filter_map(|p| p.as_ref())
    }

    /// Linear scan for the pin on a given square.
    pub fn pin_on(&self, sq: Square) -> Option<&Pin> {
        self.iter().find(|p| p.pinned == sq)
    }

    fn push(&mut self, pin: Pin) -> Result<(), EngineError> {
        if self.len >= PIN_CAPACITY {
            return Err(EngineError::PinCapacity {
                found: self.len + 1,
                capacity: PIN_CAPACITY,
            });
        }
        self.pins[self.len] = Some(pin);
        self.len += 1;
        Ok(())
    }
}

/// Find every piece of `color` absolutely pinned to its king: walk each ray
/// from the king; exactly one friendly piece followed by an enemy slider
/// capable of that direction is a pin.
pub fn find_pins(pos: &Position, color: Color) -> Result<PinCache, EngineError> {
    let mut cache = PinCache::default();
    let Some(king) = pos.king_square(color) else {
        return Ok(cache);
    };

    for dir in Direction::ALL {
        let mut shield: Option<Square> = None;
        let mut cur = king;
        while let Some(next) = cur.step(dir) {
            cur = next;
            let piece = pos.get(cur);
            if piece.is_empty() {
                continue;
            }
            if piece.is(color) {
                if shield.is_some() {
                    // Two friendly pieces on the ray; nothing is pinned.
                    break;
                }
                shield = Some(cur);
                continue;
            }
            // Enemy piece: pins only when a single shield stands between.
            if let (Some(pinned), Some(kind)) = (shield, piece.kind()) {
                if kind.slides_along(dir) {
                    cache.push(Pin {
                        pinned,
                        pinner: cur,
                        direction: dir,
                    })?;
                }
            }
            break;
        }
    }
    Ok(cache)
}

// =========================================================================
// Tests
// =========================================================================
