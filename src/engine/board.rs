//! Board representation and mutation.
//!
//! `Position` is a 64-entry mailbox of packed [`Piece`] bytes plus a single
//! 32-bit configuration word holding the side to move, castling rights,
//! en passant file, and both clocks. Successor derivation is pure: applying
//! a move yields a new `Position`. The only in-place mutation offered to
//! callers is the scoped [`Sneak`] probe, which reverts itself on drop.

use std::fmt;

use crate::engine::types::{
    CastlingRights, Color, EngineError, Move, MoveFlags, Piece, PieceType, Square,
};

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

// Config word layout:
//   bit 0      side to move (set = black)
//   bits 1-4   castling rights (WK, WQ, BK, BQ)
//   bit 5      en passant present
//   bits 6-8   en passant file
//   bits 9-15  halfmove clock (saturates at 127)
//   bits 16-31 fullmove number
const TURN_BIT: u32 = 1;
const CASTLE_SHIFT: u32 = 1;
const CASTLE_MASK: u32 = 0b1111 << CASTLE_SHIFT;
const EP_PRESENT: u32 = 1 << 5;
const EP_FILE_SHIFT: u32 = 6;
const EP_FILE_MASK: u32 = 0b111 << EP_FILE_SHIFT;
const HALFMOVE_SHIFT: u32 = 9;
const HALFMOVE_MASK: u32 = 0x7F << HALFMOVE_SHIFT;
const FULLMOVE_SHIFT: u32 = 16;

/// Castling-right bits cleared when a piece moves from (or a capture lands
/// on) each square. Only the four corners and the two king squares matter.
fn castling_loss(sq: Square) -> u8 {
    match sq.0 {
        0 => CastlingRights::WHITE_QUEENSIDE,
        4 => CastlingRights::WHITE_KINGSIDE | CastlingRights::WHITE_QUEENSIDE,
        7 => CastlingRights::WHITE_KINGSIDE,
        56 => CastlingRights::BLACK_QUEENSIDE,
        60 => CastlingRights::BLACK_KINGSIDE | CastlingRights::BLACK_QUEENSIDE,
        63 => CastlingRights::BLACK_KINGSIDE,
        _ => 0,
    }
}

/// A chess position: piece placement plus the packed game configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct Position {
    pub squares: [Piece; 64],
    config: u32,
}

impl Position {
    /// An empty board, white to move, no castling rights.
    pub fn empty() -> Self {
        Position {
            squares: [Piece::EMPTY; 64],
            config: 1 << FULLMOVE_SHIFT,
        }
    }

    /// The standard starting position.
    pub fn start() -> Self {
        Position::from_fen(START_FEN).expect("start FEN is valid")
    }

    // -----------------------------------------------------------------------
    // Square access
    // -----------------------------------------------------------------------

    #[inline]
    pub fn get(&self, sq: Square) -> Piece {
        self.squares[sq.0 as usize]
    }

    #[inline]
    pub fn set(&mut self, sq: Square, piece: Piece) {
        self.squares[sq.0 as usize] = piece;
    }

    /// The square of `color`'s king, if present.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        let king = Piece::new(color, PieceType::King);
        Square::all().find(|&sq| self.get(sq) == king)
    }

    /// Iterate over occupied squares with their pieces.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all()
            .map(move |sq| (sq, self.get(sq)))
            .filter(|(_, p)| !p.is_empty())
    }

    // -----------------------------------------------------------------------
    // Config word
    // -----------------------------------------------------------------------

    #[inline]
    pub fn turn(&self) -> Color {
        if self.config & TURN_BIT != 0 {
            Color::Black
        } else {
            Color::White
        }
    }

    pub fn set_turn(&mut self, color: Color) {
        match color {
            Color::White => self.config &= !TURN_BIT,
            Color::Black => self.config |= TURN_BIT,
        }
    }

    #[inline]
    pub fn castling(&self) -> CastlingRights {
        CastlingRights(((self.config & CASTLE_MASK) >> CASTLE_SHIFT) as u8)
    }

    pub fn set_castling(&mut self, rights: CastlingRights) {
        self.config = (self.config & !CASTLE_MASK) | ((rights.0 as u32) << CASTLE_SHIFT);
    }

    /// The en passant target square, derived from the stored file and the
    /// side to move (rank 6 when white moves, rank 3 when black moves).
    pub fn en_passant(&self) -> Option<Square> {
        if self.config & EP_PRESENT == 0 {
            return None;
        }
        let file = ((self.config & EP_FILE_MASK) >> EP_FILE_SHIFT) as u8;
        let rank = match self.turn() {
            Color::White => 5,
            Color::Black => 2,
        };
        Some(Square::from_file_rank(file, rank))
    }

    pub fn set_en_passant(&mut self, sq: Option<Square>) {
        self.config &= !(EP_PRESENT | EP_FILE_MASK);
        if let Some(sq) = sq {
            self.config |= EP_PRESENT | ((sq.file() as u32) << EP_FILE_SHIFT);
        }
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        (self.config & HALFMOVE_MASK) >> HALFMOVE_SHIFT
    }

    pub fn set_halfmove_clock(&mut self, clock: u32) {
        let clamped = clock.min(127);
        self.config = (self.config & !HALFMOVE_MASK) | (clamped << HALFMOVE_SHIFT);
    }

    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.config >> FULLMOVE_SHIFT
    }

    pub fn set_fullmove_number(&mut self, n: u32) {
        self.config = (self.config & 0xFFFF) | (n.min(0xFFFF) << FULLMOVE_SHIFT);
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Apply a move to the board array only, trusting the move's flags for
    /// castling, en passant, and promotion. The config word is untouched.
    /// No validation is performed; legality is the generator's concern.
    pub fn mutate(&mut self, mv: Move) {
        let mut piece = self.get(mv.from);
        self.set(mv.from, Piece::EMPTY);

        if mv.flags.is_en_passant() {
            // The captured pawn sits behind the landing square.
            if let Some(color) = piece.color() {
                if let Some(victim) = mv.to.offset(0, -color.forward()) {
                    self.set(victim, Piece::EMPTY);
                }
            }
        }

        if let (Some(color), Some(promo)) = (piece.color(), mv.flags.promotion_piece()) {
            piece = Piece::new(color, promo);
        }
        self.set(mv.to, piece);

        if mv.flags.is_castle() {
            let rank = mv.to.rank();
            let (rook_from, rook_to) = if mv.flags.is_queenside() {
                (Square::from_file_rank(0, rank), Square::from_file_rank(3, rank))
            } else {
                (Square::from_file_rank(7, rank), Square::from_file_rank(5, rank))
            };
            let rook = self.get(rook_from);
            self.set(rook_from, Piece::EMPTY);
            self.set(rook_to, rook);
        }
    }

    /// Apply a move to the board array, re-deriving the special cases from
    /// board content instead of trusting the flags: a king moving two files
    /// is a castle, a pawn landing diagonally on an empty square captures
    /// en passant, and a pawn reaching the last rank promotes (to the flags'
    /// piece when given, otherwise to a queen).
    pub fn mutate_hard(&mut self, mv: Move) {
        let piece = self.get(mv.from);
        let mut flags = MoveFlags::NONE;

        match piece.kind() {
            Some(PieceType::King) => {
                let df = mv.to.file() as i8 - mv.from.file() as i8;
                if df.abs() == 2 {
                    flags = flags | MoveFlags::castle(df < 0);
                }
            }
            Some(PieceType::Pawn) => {
                if mv.from.file() != mv.to.file() && self.get(mv.to).is_empty() {
                    flags = flags | MoveFlags::EP_CAPTURE;
                }
                if mv.to.rank() == 0 || mv.to.rank() == 7 {
                    let promo = mv.flags.promotion_piece().unwrap_or(PieceType::Queen);
                    flags = flags | MoveFlags::promotion(promo);
                }
            }
            _ => {}
        }

        self.mutate(Move::with_flags(mv.from, mv.to, flags));
    }

    /// Derive the successor position: board mutation plus the full config
    /// update (turn, castling rights, en passant flag, both clocks).
    pub fn successor(&self, mv: Move) -> Position {
        let mut next = self.clone();
        next.apply(mv, false);
        next
    }

    /// Like [`successor`](Self::successor), but re-derives castling, en
    /// passant, and promotion from board content.
    pub fn successor_hard(&self, mv: Move) -> Position {
        let mut next = self.clone();
        next.apply(mv, true);
        next
    }

    fn apply(&mut self, mv: Move, hard: bool) {
        let mover = self.turn();
        let moved = self.get(mv.from);
        let is_pawn = moved.kind() == Some(PieceType::Pawn);
        let is_capture =
            !self.get(mv.to).is_empty() || (is_pawn && mv.from.file() != mv.to.file());

        if hard {
            self.mutate_hard(mv);
        } else {
            self.mutate(mv);
        }

        let mut rights = self.castling();
        rights.remove(castling_loss(mv.from));
        rights.remove(castling_loss(mv.to));
        self.set_castling(rights);

        // A double pawn push exposes the skipped square to en passant.
        let dr = mv.to.rank() as i8 - mv.from.rank() as i8;
        if is_pawn && dr.abs() == 2 {
            self.config = (self.config & !(EP_PRESENT | EP_FILE_MASK))
                | EP_PRESENT
                | ((mv.from.file() as u32) << EP_FILE_SHIFT);
        } else {
            self.config &= !(EP_PRESENT | EP_FILE_MASK);
        }

        if is_pawn || is_capture {
            self.set_halfmove_clock(0);
        } else {
            self.set_halfmove_clock(self.halfmove_clock() + 1);
        }
        if mover == Color::Black {
            self.set_fullmove_number(self.fullmove_number() + 1);
        }
        self.set_turn(!mover);
    }

    /// Probe a move in place; returns the undo record needed by `unsneak`.
    /// Board squares only, config untouched. Prefer the [`Sneak`] guard,
    /// which reverts automatically.
    pub fn sneak(&mut self, mv: Move) -> SneakUndo {
        let mut undo = SneakUndo::default();

        undo.push(mv.from, self.get(mv.from));
        undo.push(mv.to, self.get(mv.to));
        if mv.flags.is_en_passant() {
            if let Some(color) = self.get(mv.from).color() {
                if let Some(victim) = mv.to.offset(0, -color.forward()) {
                    undo.push(victim, self.get(victim));
                }
            }
        }
        if mv.flags.is_castle() {
            let rank = mv.to.rank();
            let (rook_from, rook_to) = if mv.flags.is_queenside() {
                (Square::from_file_rank(0, rank), Square::from_file_rank(3, rank))
            } else {
                (Square::from_file_rank(7, rank), Square::from_file_rank(5, rank))
            };
            undo.push(rook_from, self.get(rook_from));
            undo.push(rook_to, self.get(rook_to));
        }

        self.mutate(mv);
        undo
    }

    /// Revert a `sneak`. The undo record must come from the matching call.
    pub fn unsneak(&mut self, undo: SneakUndo) {
        for i in (0..undo.len).rev() {
            let (sq, piece) = undo.entries[i];
            self.set(sq, piece);
        }
    }

    // -----------------------------------------------------------------------
    // FEN
    // -----------------------------------------------------------------------

    /// Parse a 6-field FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, EngineError> {
        let err = || EngineError::InvalidFen(fen.to_string());
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(err());
        }

        let mut pos = Position::empty();

        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(err());
        }
        for (i, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - i as u8;
            let mut file = 0u8;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    if skip == 0 || skip > 8 {
                        return Err(err());
                    }
                    file += skip as u8;
                } else {
                    if file >= 8 {
                        return Err(err());
                    }
                    let piece = Piece::from_char(c).ok_or_else(err)?;
                    pos.set(Square::from_file_rank(file, rank), piece);
                    file += 1;
                }
                if file > 8 {
                    return Err(err());
                }
            }
            if file != 8 {
                return Err(err());
            }
        }

        match fields[1] {
            "w" => pos.set_turn(Color::White),
            "b" => pos.set_turn(Color::Black),
            _ => return Err(err()),
        }

        pos.set_castling(CastlingRights::from_fen(fields[2]).ok_or_else(err)?);

        if fields[3] != "-" {
            let ep = Square::from_algebraic(fields[3]).ok_or_else(err)?;
            let expected_rank = match pos.turn() {
                Color::White => 5,
                Color::Black => 2,
            };
            if ep.rank() != expected_rank {
                return Err(err());
            }
            pos.set_en_passant(Some(ep));
        }

        let halfmove: u32 = fields[4].parse().map_err(|_| err())?;
        if halfmove > 127 {
            return Err(err());
        }
        pos.set_halfmove_clock(halfmove);

        let fullmove: u32 = fields[5].parse().map_err(|_| err())?;
        if fullmove == 0 || fullmove > 0xFFFF {
            return Err(err());
        }
        pos.set_fullmove_number(fullmove);

        Ok(pos)
    }

    /// Render the 6-field FEN string.
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(80);
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                let piece = self.get(Square::from_file_rank(file, rank));
                match piece.to_char() {
                    Some(c) => {
                        if empty > 0 {
                            fen.push(char::from_digit(empty, 10).unwrap());
                            empty = 0;
                        }
                        fen.push(c);
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push(char::from_digit(empty, 10).unwrap());
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(match self.turn() {
            Color::White => 'w',
            Color::Black => 'b',
        });
        fen.push(' ');
        fen.push_str(&self.castling().to_fen());
        fen.push(' ');
        match self.en_passant() {
            Some(sq) => fen.push_str(&sq.to_algebraic()),
            None => fen.push('-'),
        }
        fen.push_str(&format!(" {} {}", self.halfmove_clock(), self.fullmove_number()));
        fen
    }

    /// ASCII board rendering for debugging, rank 8 first.
    pub fn board_string(&self) -> String {
        let mut s = String::with_capacity(72);
        for rank in (0..8).rev() {
            for file in 0..8 {
                let piece = self.get(Square::from_file_rank(file, rank));
                s.push(piece.to_char().unwrap_or('.'));
            }
            s.push('\n');
        }
        s
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Position({})", self.to_fen())
    }
}

// ---------------------------------------------------------------------------
// Sneak — scoped in-place probe
// ---------------------------------------------------------------------------

/// Undo record for a `sneak`: the original contents of every square the
/// probe touched. At most four squares change (castling).
#[derive(Clone, Copy)]
pub struct SneakUndo {
    entries: [(Square, Piece); 4],
    len: usize,
}

impl Default for SneakUndo {
    fn default() -> Self {
        SneakUndo {
            entries: [(Square(0), Piece::EMPTY); 4],
            len: 0,
        }
    }
}

impl SneakUndo {
    fn push(&mut self, sq: Square, piece: Piece) {
        self.entries[self.len] = (sq, piece);
        self.len += 1;
    }

    /// The piece that stood on the landing square before the probe.
    pub fn captured(&self) -> Piece {
        self.entries[1].1
    }
}

/// RAII probe: applies a move to a borrowed position and reverts it on
/// drop. Holding `&mut Position` makes overlapping probes unrepresentable.
pub struct Sneak<'a> {
    pos: &'a mut Position,
    undo: SneakUndo,
}

impl<'a> Sneak<'a> {
    pub fn new(pos: &'a mut Position, mv: Move) -> Self {
        let undo = pos.sneak(mv);
        Sneak { pos, undo }
    }

    /// The position with the probe applied.
    pub fn position(&self) -> &Position {
        self.pos
    }

    /// The piece displaced from the landing square, if any.
    pub fn captured(&self) -> Piece {
        self.undo.captured()
    }
}

impl Drop for Sneak<'_> {
    fn drop(&mut self) {
        self.pos.unsneak(self.undo);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
