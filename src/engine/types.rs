use std::fmt;

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// The two sides in a chess game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// Index for array lookups: White=0, Black=1.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Pawn push direction: +1 rank for White, -1 for Black.
    #[inline]
    pub const fn forward(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }
}

impl std::ops::Not for Color {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

// ---------------------------------------------------------------------------
// PieceType
// ---------------------------------------------------------------------------

/// The six piece kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceType {
    /// All piece types in order.
    pub const ALL: [PieceType; 6] = [
        PieceType::Pawn,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
        PieceType::King,
    ];

    /// Number of piece types.
    pub const COUNT: usize = 6;

    /// Index for array lookups: Pawn=0 .. King=5.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Non-zero tag used in the packed `Piece` byte (Pawn=1 .. King=6).
    #[inline]
    pub const fn tag(self) -> u8 {
        self as u8 + 1
    }

    #[inline]
    pub const fn from_tag(tag: u8) -> Option<PieceType> {
        match tag {
            1 => Some(PieceType::Pawn),
            2 => Some(PieceType::Knight),
            3 => Some(PieceType::Bishop),
            4 => Some(PieceType::Rook),
            5 => Some(PieceType::Queen),
            6 => Some(PieceType::King),
            _ => None,
        }
    }

    /// Is this a sliding piece (rook, bishop, queen)?
    #[inline]
    pub const fn is_slider(self) -> bool {
        matches!(self, PieceType::Rook | PieceType::Bishop | PieceType::Queen)
    }

    /// Can this piece move along `dir` as a slider? False for non-sliders.
    #[inline]
    pub const fn slides_along(self, dir: Direction) -> bool {
        match self {
            PieceType::Queen => true,
            PieceType::Rook => !dir.is_diagonal(),
            PieceType::Bishop => dir.is_diagonal(),
            _ => false,
        }
    }

    /// Material value in centipawns (the king has none).
    pub fn value(self) -> i32 {
        match self {
            PieceType::Pawn => 100,
            PieceType::Knight => 320,
            PieceType::Bishop => 330,
            PieceType::Rook => 500,
            PieceType::Queen => 900,
            PieceType::King => 0,
        }
    }

    /// Single letter: uppercase for white, lowercase for black.
    pub fn to_char(self, color: Color) -> char {
        let c = match self {
            PieceType::Pawn => 'p',
            PieceType::Knight => 'n',
            PieceType::Bishop => 'b',
            PieceType::Rook => 'r',
            PieceType::Queen => 'q',
            PieceType::King => 'k',
        };
        match color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    /// Parse a piece character; case decides the color.
    pub fn from_char(c: char) -> Option<(Color, PieceType)> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let piece = match c.to_ascii_lowercase() {
            'p' => PieceType::Pawn,
            'n' => PieceType::Knight,
            'b' => PieceType::Bishop,
            'r' => PieceType::Rook,
            'q' => PieceType::Queen,
            'k' => PieceType::King,
            _ => return None,
        };
        Some((color, piece))
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PieceType::Pawn => write!(f, "pawn"),
            PieceType::Knight => write!(f, "knight"),
            PieceType::Bishop => write!(f, "bishop"),
            PieceType::Rook => write!(f, "rook"),
            PieceType::Queen => write!(f, "queen"),
            PieceType::King => write!(f, "king"),
        }
    }
}

// ---------------------------------------------------------------------------
// Piece — packed (type tag | color bit), 0 = empty
// ---------------------------------------------------------------------------

/// A board occupant packed into one byte: bits 0-2 hold the type tag
/// (Pawn=1 .. King=6), bit 3 is the color bit (set = black). Zero means
/// empty, so kind and color are each recoverable without a table lookup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Piece(pub u8);

impl Piece {
    pub const EMPTY: Piece = Piece(0);

    const BLACK_BIT: u8 = 0b1000;

    #[inline]
    pub const fn new(color: Color, kind: PieceType) -> Piece {
        let color_bit = match color {
            Color::White => 0,
            Color::Black => Self::BLACK_BIT,
        };
        Piece(kind.tag() | color_bit)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The piece kind, or `None` for an empty square.
    #[inline]
    pub const fn kind(self) -> Option<PieceType> {
        PieceType::from_tag(self.0 & 0b0111)
    }

    /// The piece color, or `None` for an empty square.
    #[inline]
    pub const fn color(self) -> Option<Color> {
        if self.is_empty() {
            None
        } else if self.0 & Self::BLACK_BIT != 0 {
            Some(Color::Black)
        } else {
            Some(Color::White)
        }
    }

    /// Is this a non-empty piece of the given color?
    #[inline]
    pub fn is(self, color: Color) -> bool {
        self.color() == Some(color)
    }

    /// Is this exactly the given colored piece?
    #[inline]
    pub fn is_exactly(self, color: Color, kind: PieceType) -> bool {
        self == Piece::new(color, kind)
    }

    pub fn from_char(c: char) -> Option<Piece> {
        PieceType::from_char(c).map(|(color, kind)| Piece::new(color, kind))
    }

    pub fn to_char(self) -> Option<char> {
        match (self.color(), self.kind()) {
            (Some(c), Some(k)) => Some(k.to_char(c)),
            _ => None,
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_char() {
            Some(c) => write!(f, "{c}"),
            None => write!(f, "."),
        }
    }
}

// ---------------------------------------------------------------------------
// Square
// ---------------------------------------------------------------------------

/// A square on the chess board (0..63, little-endian rank-file: a1=0, h8=63).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(pub u8);

impl Square {
    pub const NUM: usize = 64;

    #[inline]
    pub fn new(index: u8) -> Self {
        debug_assert!(index < 64, "square index out of range");
        Square(index)
    }

    #[inline]
    pub fn file(self) -> u8 {
        self.0 & 7
    }

    #[inline]
    pub fn rank(self) -> u8 {
        self.0 >> 3
    }

    #[inline]
    pub fn from_file_rank(file: u8, rank: u8) -> Self {
        debug_assert!(file < 8 && rank < 8);
        Square(rank * 8 + file)
    }

    /// Step one square in a direction, or `None` off the board edge.
    #[inline]
    pub fn step(self, dir: Direction) -> Option<Square> {
        let (df, dr) = dir.delta();
        self.offset(df, dr)
    }

    /// Offset by arbitrary file/rank deltas, or `None` off the board.
    #[inline]
    pub fn offset(self, df: i8, dr: i8) -> Option<Square> {
        let file = self.file() as i8 + df;
        let rank = self.rank() as i8 + dr;
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Some(Square::from_file_rank(file as u8, rank as u8))
        } else {
            None
        }
    }

    /// All 64 squares, a1 first.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..64u8).map(Square)
    }

    /// Parse algebraic notation like "e4".
    pub fn from_algebraic(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let file = bytes[0].wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'1');
        if file < 8 && rank < 8 {
            Some(Square::from_file_rank(file, rank))
        } else {
            None
        }
    }

    /// Convert to algebraic notation like "e4".
    pub fn to_algebraic(self) -> String {
        let file = (b'a' + self.file()) as char;
        let rank = (b'1' + self.rank()) as char;
        format!("{file}{rank}")
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_algebraic())
    }
}

// ---------------------------------------------------------------------------
// Direction — the 8 ray directions
// ---------------------------------------------------------------------------

/// One of the 8 ray directions. `delta()` gives (file, rank) steps; ray
/// walkers dispatch on the enum with `match` rather than function pointers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    pub const COUNT: usize = 8;

    /// Index for array lookups (North=0 .. NorthWest=7).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub const fn delta(self) -> (i8, i8) {
        match self {
            Direction::North => (0, 1),
            Direction::NorthEast => (1, 1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, -1),
            Direction::South => (0, -1),
            Direction::SouthWest => (-1, -1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, 1),
        }
    }

    #[inline]
    pub const fn is_diagonal(self) -> bool {
        matches!(
            self,
            Direction::NorthEast
                | Direction::SouthEast
                | Direction::SouthWest
                | Direction::NorthWest
        )
    }

    #[inline]
    pub const fn reverse(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::NorthEast => Direction::SouthWest,
            Direction::East => Direction::West,
            Direction::SouthEast => Direction::NorthWest,
            Direction::South => Direction::North,
            Direction::SouthWest => Direction::NorthEast,
            Direction::West => Direction::East,
            Direction::NorthWest => Direction::SouthEast,
        }
    }

    /// Direction of the straight line from `from` to `to`, if one exists.
    pub fn between(from: Square, to: Square) -> Option<Direction> {
        if from == to {
            return None;
        }
        let df = to.file() as i8 - from.file() as i8;
        let dr = to.rank() as i8 - from.rank() as i8;
        if df != 0 && dr != 0 && df.abs() != dr.abs() {
            return None;
        }
        let step = (df.signum(), dr.signum());
        Direction::ALL.iter().copied().find(|d| d.delta() == step)
    }
}

// ---------------------------------------------------------------------------
// MoveFlags
// ---------------------------------------------------------------------------

/// Move metadata packed in a 32-bit word.
///
/// Layout:
///   bit 0      promotion present
///   bits 1-2   promotion piece as offset from queen (0=Q, 1=R, 2=B, 3=N)
///   bit 3      castle present
///   bit 4      castle side (set = queenside)
///   bit 5      en passant
///   bit 6      capture present
///   bits 7-9   captured piece type tag minus one
///   bit 10     search score present
///   bits 16-31 signed 16-bit search score
///
/// The promotion, castle-side, and captured fields carry no meaning unless
/// the corresponding presence bit is set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveFlags(pub u32);

impl MoveFlags {
    pub const NONE: MoveFlags = MoveFlags(0);

    const PROMOTION: u32 = 1;
    const PROMO_SHIFT: u32 = 1;
    const CASTLE: u32 = 1 << 3;
    const CASTLE_QUEENSIDE: u32 = 1 << 4;
    const EN_PASSANT: u32 = 1 << 5;
    const CAPTURE: u32 = 1 << 6;
    const CAPTURED_SHIFT: u32 = 7;
    const SCORE: u32 = 1 << 10;
    const SCORE_SHIFT: u32 = 16;

    /// Order used by the 2-bit promotion encoding.
    pub const PROMOTION_ORDER: [PieceType; 4] = [
        PieceType::Queen,
        PieceType::Rook,
        PieceType::Bishop,
        PieceType::Knight,
    ];

    /// En passant capture: always takes a pawn.
    pub const EP_CAPTURE: MoveFlags =
        MoveFlags(Self::EN_PASSANT | Self::CAPTURE | ((PieceType::Pawn.tag() as u32 - 1) << 7));

    pub fn promotion(kind: PieceType) -> MoveFlags {
        let offset = Self::PROMOTION_ORDER
            .iter()
            .position(|&p| p == kind)
            .expect("invalid promotion piece") as u32;
        MoveFlags(Self::PROMOTION | (offset << Self::PROMO_SHIFT))
    }

    pub fn castle(queenside: bool) -> MoveFlags {
        if queenside {
            MoveFlags(Self::CASTLE | Self::CASTLE_QUEENSIDE)
        } else {
            MoveFlags(Self::CASTLE)
        }
    }

    pub fn capture(victim: PieceType) -> MoveFlags {
        MoveFlags(Self::CAPTURE | ((victim.tag() as u32 - 1) << Self::CAPTURED_SHIFT))
    }

    // -- queries --

    #[inline]
    pub fn is_promotion(self) -> bool {
        self.0 & Self::PROMOTION != 0
    }

    /// The promotion piece; `None` unless `is_promotion()`.
    #[inline]
    pub fn promotion_piece(self) -> Option<PieceType> {
        if self.is_promotion() {
            Some(Self::PROMOTION_ORDER[((self.0 >> Self::PROMO_SHIFT) & 0b11) as usize])
        } else {
            None
        }
    }

    #[inline]
    pub fn is_castle(self) -> bool {
        self.0 & Self::CASTLE != 0
    }

    /// True for queenside castling; only meaningful when `is_castle()`.
    #[inline]
    pub fn is_queenside(self) -> bool {
        self.0 & Self::CASTLE_QUEENSIDE != 0
    }

    #[inline]
    pub fn is_en_passant(self) -> bool {
        self.0 & Self::EN_PASSANT != 0
    }

    #[inline]
    pub fn is_capture(self) -> bool {
        self.0 & Self::CAPTURE != 0
    }

    /// The captured piece type; `None` unless `is_capture()`.
    #[inline]
    pub fn captured(self) -> Option<PieceType> {
        if self.is_capture() {
            PieceType::from_tag(((self.0 >> Self::CAPTURED_SHIFT) & 0b111) as u8 + 1)
        } else {
            None
        }
    }

    #[inline]
    pub fn score(self) -> Option<i16> {
        if self.0 & Self::SCORE != 0 {
            Some((self.0 >> Self::SCORE_SHIFT) as u16 as i16)
        } else {
            None
        }
    }

    pub fn with_score(self, score: i16) -> MoveFlags {
        let low = self.0 & 0x0000_FFFF;
        MoveFlags(low | Self::SCORE | ((score as u16 as u32) << Self::SCORE_SHIFT))
    }

    /// The flag word with any attached score stripped.
    #[inline]
    pub fn without_score(self) -> MoveFlags {
        MoveFlags(self.0 & 0xFFFF & !Self::SCORE)
    }
}

impl std::ops::BitOr for MoveFlags {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        MoveFlags(self.0 | rhs.0)
    }
}

// ---------------------------------------------------------------------------
// Move
// ---------------------------------------------------------------------------

/// A chess move: from-square, to-square, and the packed flag word.
/// Generated moves always have `from != to`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub flags: MoveFlags,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Move {
            from,
            to,
            flags: MoveFlags::NONE,
        }
    }

    pub fn with_flags(from: Square, to: Square, flags: MoveFlags) -> Self {
        Move { from, to, flags }
    }

    /// Equality ignoring any attached search score.
    #[inline]
    pub fn same_move(self, other: Move) -> bool {
        self.from == other.from
            && self.to == other.to
            && self.flags.without_score() == other.flags.without_score()
    }

    /// Coordinate form like "e2e4" (promotion piece appended: "e7e8q").
    pub fn to_coordinate(self) -> String {
        let mut s = format!("{}{}", self.from, self.to);
        if let Some(promo) = self.flags.promotion_piece() {
            s.push(promo.to_char(Color::Black));
        }
        s
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_coordinate())
    }
}

// ---------------------------------------------------------------------------
// CastlingRights
// ---------------------------------------------------------------------------

/// Castling availability bitfield: bits 0-3 = WK, WQ, BK, BQ.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CastlingRights(pub u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const WHITE_KINGSIDE: u8 = 1;
    pub const WHITE_QUEENSIDE: u8 = 2;
    pub const BLACK_KINGSIDE: u8 = 4;
    pub const BLACK_QUEENSIDE: u8 = 8;
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    #[inline]
    pub fn has(self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    #[inline]
    pub fn remove(&mut self, flag: u8) {
        self.0 &= !flag;
    }

    #[inline]
    pub fn can_castle_kingside(self, color: Color) -> bool {
        match color {
            Color::White => self.has(Self::WHITE_KINGSIDE),
            Color::Black => self.has(Self::BLACK_KINGSIDE),
        }
    }

    #[inline]
    pub fn can_castle_queenside(self, color: Color) -> bool {
        match color {
            Color::White => self.has(Self::WHITE_QUEENSIDE),
            Color::Black => self.has(Self::BLACK_QUEENSIDE),
        }
    }

    /// Parse a FEN castling field (e.g. "KQkq", "-", "Kq").
    pub fn from_fen(s: &str) -> Option<Self> {
        if s == "-" {
            return Some(CastlingRights::NONE);
        }
        let mut rights = 0u8;
        for c in s.chars() {
            match c {
                'K' => rights |= Self::WHITE_KINGSIDE,
                'Q' => rights |= Self::WHITE_QUEENSIDE,
                'k' => rights |= Self::BLACK_KINGSIDE,
                'q' => rights |= Self::BLACK_QUEENSIDE,
                _ => return None,
            }
        }
        Some(CastlingRights(rights))
    }

    /// Render the FEN castling field.
    pub fn to_fen(self) -> String {
        if self.0 == 0 {
            return "-".to_string();
        }
        let mut s = String::with_capacity(4);
        if self.has(Self::WHITE_KINGSIDE) {
            s.push('K');
        }
        if self.has(Self::WHITE_QUEENSIDE) {
            s.push('Q');
        }
        if self.has(Self::BLACK_KINGSIDE) {
            s.push('k');
        }
        if self.has(Self::BLACK_QUEENSIDE) {
            s.push('q');
        }
        s
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen())
    }
}

// ---------------------------------------------------------------------------
// GameState
// ---------------------------------------------------------------------------

/// Classification of a position plus its history. Every state except
/// `Ongoing` ends the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    Ongoing,
    WhiteWon,
    BlackWon,
    DrawByStalemate,
    DrawByFiftyMoves,
    DrawByThreefold,
}

impl GameState {
    pub fn as_str(self) -> &'static str {
        match self {
            GameState::Ongoing => "ongoing",
            GameState::WhiteWon => "white_won",
            GameState::BlackWon => "black_won",
            GameState::DrawByStalemate => "draw_by_stalemate",
            GameState::DrawByFiftyMoves => "draw_by_fifty_moves",
            GameState::DrawByThreefold => "draw_by_threefold",
        }
    }

    pub fn is_terminal(self) -> bool {
        self != GameState::Ongoing
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EngineError
// ---------------------------------------------------------------------------

/// Domain errors for the engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid FEN string: {0}")]
    InvalidFen(String),

    #[error("move text matches no legal move: {0}")]
    UnknownMove(String),

    #[error("move is not legal: {0}")]
    IllegalMove(String),

    #[error("pin cache capacity exceeded: {found} pins, capacity {capacity}")]
    PinCapacity { found: usize, capacity: usize },

    #[error("search is already running")]
    AlreadyRunning,

    #[error("search results are unavailable in state {0}")]
    NotStopped(&'static str),

    #[error("engine-selected move {0} is no longer legal")]
    StaleBestMove(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_toggle() {
        assert_eq!(!Color::White, Color::Black);
        assert_eq!(!Color::Black, Color::White);
    }

    #[test]
    fn piece_packing_round_trip() {
        for color in [Color::White, Color::Black] {
            for &kind in &PieceType::ALL {
                let p = Piece::new(color, kind);
                assert!(!p.is_empty());
                assert_eq!(p.color(), Some(color));
                assert_eq!(p.kind(), Some(kind));
            }
        }
        assert!(Piece::EMPTY.is_empty());
        assert_eq!(Piece::EMPTY.color(), None);
        assert_eq!(Piece::EMPTY.kind(), None);
    }

    #[test]
    fn piece_color_is_one_bit() {
        for &kind in &PieceType::ALL {
            let w = Piece::new(Color::White, kind);
            let b = Piece::new(Color::Black, kind);
            assert_eq!(w.0 ^ b.0, 0b1000);
        }
    }

    #[test]
    fn piece_char_round_trip() {
        for c in ['P', 'n', 'B', 'r', 'Q', 'k'] {
            let p = Piece::from_char(c).unwrap();
            assert_eq!(p.to_char(), Some(c));
        }
        assert_eq!(Piece::from_char('x'), None);
    }

    #[test]
    fn square_algebraic_round_trip() {
        for i in 0..64 {
            let sq = Square(i);
            assert_eq!(Square::from_algebraic(&sq.to_algebraic()), Some(sq));
        }
    }

    #[test]
    fn square_from_algebraic_invalid() {
        assert_eq!(Square::from_algebraic(""), None);
        assert_eq!(Square::from_algebraic("a"), None);
        assert_eq!(Square::from_algebraic("a9"), None);
        assert_eq!(Square::from_algebraic("i1"), None);
        assert_eq!(Square::from_algebraic("abc"), None);
    }

    #[test]
    fn square_step_stops_at_edges() {
        let h4 = Square::from_algebraic("h4").unwrap();
        let a1 = Square::from_algebraic("a1").unwrap();
        let e4 = Square::from_algebraic("e4").unwrap();
        assert_eq!(h4.step(Direction::East), None);
        assert_eq!(a1.step(Direction::SouthWest), None);
        assert_eq!(e4.step(Direction::NorthEast), Square::from_algebraic("f5"));
    }

    #[test]
    fn direction_reverse_is_involution() {
        for d in Direction::ALL {
            assert_eq!(d.reverse().reverse(), d);
            let (df, dr) = d.delta();
            let (rf, rr) = d.reverse().delta();
            assert_eq!((df, dr), (-rf, -rr));
        }
    }

    #[test]
    fn direction_between() {
        let e4 = Square::from_algebraic("e4").unwrap();
        let e8 = Square::from_algebraic("e8").unwrap();
        let h7 = Square::from_algebraic("h7").unwrap();
        let f6 = Square::from_algebraic("f6").unwrap();
        assert_eq!(Direction::between(e4, e8), Some(Direction::North));
        assert_eq!(Direction::between(e8, e4), Some(Direction::South));
        assert_eq!(Direction::between(e4, h7), Some(Direction::NorthEast));
        assert_eq!(Direction::between(e4, f6), None);
        assert_eq!(Direction::between(e4, e4), None);
    }

    #[test]
    fn slider_capability() {
        assert!(PieceType::Rook.slides_along(Direction::North));
        assert!(!PieceType::Rook.slides_along(Direction::NorthEast));
        assert!(PieceType::Bishop.slides_along(Direction::SouthWest));
        assert!(!PieceType::Bishop.slides_along(Direction::East));
        for d in Direction::ALL {
            assert!(PieceType::Queen.slides_along(d));
            assert!(!PieceType::Knight.slides_along(d));
            assert!(!PieceType::Pawn.slides_along(d));
            assert!(!PieceType::King.slides_along(d));
        }
    }

    #[test]
    fn move_flags_promotion() {
        for &kind in &MoveFlags::PROMOTION_ORDER {
            let f = MoveFlags::promotion(kind);
            assert!(f.is_promotion());
            assert_eq!(f.promotion_piece(), Some(kind));
        }
        assert_eq!(MoveFlags::NONE.promotion_piece(), None);
    }

    #[test]
    fn move_flags_capture() {
        let f = MoveFlags::capture(PieceType::Rook);
        assert!(f.is_capture());
        assert_eq!(f.captured(), Some(PieceType::Rook));
        assert!(!f.is_en_passant());

        let ep = MoveFlags::EP_CAPTURE;
        assert!(ep.is_capture());
        assert!(ep.is_en_passant());
        assert_eq!(ep.captured(), Some(PieceType::Pawn));
    }

    #[test]
    fn move_flags_castle() {
        let ks = MoveFlags::castle(false);
        assert!(ks.is_castle());
        assert!(!ks.is_queenside());
        let qs = MoveFlags::castle(true);
        assert!(qs.is_castle());
        assert!(qs.is_queenside());
    }

    #[test]
    fn move_flags_score_round_trip() {
        let f = MoveFlags::capture(PieceType::Pawn).with_score(-1234);
        assert_eq!(f.score(), Some(-1234));
        assert!(f.is_capture());
        assert_eq!(f.captured(), Some(PieceType::Pawn));
        assert_eq!(MoveFlags::NONE.score(), None);
    }

    #[test]
    fn same_move_ignores_score() {
        let a = Move::with_flags(Square(12), Square(28), MoveFlags::NONE);
        let b = Move::with_flags(Square(12), Square(28), MoveFlags::NONE.with_score(77));
        assert!(a.same_move(b));
        assert_ne!(a, b);
    }

    #[test]
    fn move_coordinate_form() {
        let m = Move::new(
            Square::from_algebraic("e2").unwrap(),
            Square::from_algebraic("e4").unwrap(),
        );
        assert_eq!(m.to_string(), "e2e4");

        let promo = Move::with_flags(
            Square::from_algebraic("e7").unwrap(),
            Square::from_algebraic("e8").unwrap(),
            MoveFlags::promotion(PieceType::Queen),
        );
        assert_eq!(promo.to_string(), "e7e8q");
    }

    #[test]
    fn castling_rights_fen_round_trip() {
        for s in ["-", "K", "Kq", "KQkq", "kq", "Q"] {
            let cr = CastlingRights::from_fen(s).unwrap();
            assert_eq!(cr.to_fen(), s);
        }
        assert_eq!(CastlingRights::from_fen("Kx"), None);
    }

    #[test]
    fn castling_rights_flags() {
        let mut cr = CastlingRights::ALL;
        assert!(cr.can_castle_kingside(Color::White));
        cr.remove(CastlingRights::WHITE_KINGSIDE);
        assert!(!cr.can_castle_kingside(Color::White));
        assert!(cr.can_castle_queenside(Color::White));
        assert!(cr.can_castle_kingside(Color::Black));
    }

    #[test]
    fn game_state_terminal() {
        assert!(!GameState::Ongoing.is_terminal());
        for s in [
            GameState::WhiteWon,
            GameState::BlackWon,
            GameState::DrawByStalemate,
            GameState::DrawByFiftyMoves,
            GameState::DrawByThreefold,
        ] {
            assert!(s.is_terminal());
        }
    }
}
