//! Square and piece codec
//!
//! Squares are linearly indexed from 0 to 63. Row 0 is the eighth rank and column 0 is the
//! `a` file, so `a8` has index 0 and `h1` has index 63. Every part of the engine (and every
//! consumer that maps tiles to screen positions) relies on this single encoding.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error converting a raw index into [`Coord`]
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum CoordError {
    #[error("square index {0} is out of range")]
    OutOfRange(usize),
}

/// Error parsing [`Coord`] from its algebraic form
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum CoordParseError {
    #[error("unexpected file char {0:?}")]
    UnexpectedFileChar(char),
    #[error("unexpected rank char {0:?}")]
    UnexpectedRankChar(char),
    #[error("invalid string length")]
    BadLength,
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum CellParseError {
    #[error("unexpected cell char {0:?}")]
    UnexpectedChar(char),
    #[error("invalid string length")]
    BadLength,
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("unexpected color char {0:?}")]
    UnexpectedChar(char),
    #[error("invalid string length")]
    BadLength,
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum CastlingRightsParseError {
    #[error("unexpected char {0:?}")]
    UnexpectedChar(char),
    #[error("duplicate char {0:?}")]
    DuplicateChar(char),
    #[error("unexpected empty string")]
    EmptyString,
}

/// Board column, from `a` to `h`
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
#[repr(u8)]
pub enum File {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    E = 4,
    F = 5,
    G = 6,
    H = 7,
}

impl File {
    const ALL: [File; 8] = [
        File::A,
        File::B,
        File::C,
        File::D,
        File::E,
        File::F,
        File::G,
        File::H,
    ];

    pub const fn index(&self) -> usize {
        *self as u8 as usize
    }

    pub const fn from_index(val: usize) -> Self {
        assert!(val < 8, "file index must be between 0 and 7");
        Self::ALL[val]
    }

    pub fn iter() -> impl Iterator<Item = Self> {
        Self::ALL.into_iter()
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'a'..='h' => Some(Self::ALL[(u32::from(c) - u32::from('a')) as usize]),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        (b'a' + *self as u8) as char
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

/// Board row
///
/// Note that ranks are stored top-down: [`Rank::R8`] has index 0.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
#[repr(u8)]
pub enum Rank {
    R8 = 0,
    R7 = 1,
    R6 = 2,
    R5 = 3,
    R4 = 4,
    R3 = 5,
    R2 = 6,
    R1 = 7,
}

impl Rank {
    const ALL: [Rank; 8] = [
        Rank::R8,
        Rank::R7,
        Rank::R6,
        Rank::R5,
        Rank::R4,
        Rank::R3,
        Rank::R2,
        Rank::R1,
    ];

    pub const fn index(&self) -> usize {
        *self as u8 as usize
    }

    pub const fn from_index(val: usize) -> Self {
        assert!(val < 8, "rank index must be between 0 and 7");
        Self::ALL[val]
    }

    pub fn iter() -> impl Iterator<Item = Self> {
        Self::ALL.into_iter()
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '1'..='8' => Some(Self::ALL[(u32::from('8') - u32::from(c)) as usize]),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        (b'8' - *self as u8) as char
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

/// Square on the board
///
/// A `Coord` always holds a valid index in `0..64`, so it can be used to index board storage
/// without further checks. Use [`Coord::try_from_index()`] to validate raw indices coming from
/// the outside (e.g. from a picking buffer).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coord(u8);

impl Coord {
    pub const fn from_index(val: usize) -> Coord {
        assert!(val < 64, "coord must be between 0 and 63");
        Coord(val as u8)
    }

    pub const fn try_from_index(val: usize) -> Option<Coord> {
        if val < 64 {
            Some(Coord(val as u8))
        } else {
            None
        }
    }

    pub const fn from_parts(file: File, rank: Rank) -> Coord {
        Coord(((rank as u8) << 3) | file as u8)
    }

    pub const fn file(&self) -> File {
        File::from_index((self.0 & 7) as usize)
    }

    pub const fn rank(&self) -> Rank {
        Rank::from_index((self.0 >> 3) as usize)
    }

    /// Row of the square, `index / 8`
    pub const fn row(&self) -> usize {
        (self.0 >> 3) as usize
    }

    /// Column of the square, `index % 8`
    pub const fn column(&self) -> usize {
        (self.0 & 7) as usize
    }

    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    pub const fn flipped_rank(self) -> Coord {
        Coord(self.0 ^ 56)
    }

    /// Returns the square shifted by `delta_file` columns and `delta_rank` rows, or `None` if
    /// it falls off the board
    ///
    /// Positive `delta_rank` moves towards the first rank, as rows are counted from the top.
    pub fn try_shift(self, delta_file: isize, delta_rank: isize) -> Option<Coord> {
        let new_file = self.column().wrapping_add(delta_file as usize);
        let new_rank = self.row().wrapping_add(delta_rank as usize);
        if new_file >= 8 || new_rank >= 8 {
            return None;
        }
        Some(Coord(((new_rank as u8) << 3) | new_file as u8))
    }

    pub fn iter() -> impl Iterator<Item = Self> {
        (0_u8..64_u8).map(Coord)
    }
}

/// Row of `c`, see [`Coord::row()`]
#[inline]
pub const fn tile_row(c: Coord) -> usize {
    c.row()
}

/// Column of `c`, see [`Coord::column()`]
#[inline]
pub const fn tile_column(c: Coord) -> usize {
    c.column()
}

impl TryFrom<usize> for Coord {
    type Error = CoordError;

    fn try_from(val: usize) -> Result<Self, Self::Error> {
        Coord::try_from_index(val).ok_or(CoordError::OutOfRange(val))
    }
}

impl From<Coord> for usize {
    fn from(c: Coord) -> usize {
        c.index()
    }
}

impl fmt::Debug for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "Coord({})", self)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

impl FromStr for Coord {
    type Err = CoordParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (file_ch, rank_ch) = match (chars.next(), chars.next(), chars.next()) {
            (Some(file_ch), Some(rank_ch), None) => (file_ch, rank_ch),
            _ => return Err(CoordParseError::BadLength),
        };
        Ok(Coord::from_parts(
            File::from_char(file_ch).ok_or(CoordParseError::UnexpectedFileChar(file_ch))?,
            Rank::from_char(rank_ch).ok_or(CoordParseError::UnexpectedRankChar(rank_ch))?,
        ))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    /// Returns the opposite color
    pub const fn inv(&self) -> Color {
        match *self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    pub const fn index(&self) -> usize {
        *self as u8 as usize
    }

    pub fn as_char(&self) -> char {
        match *self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }

    pub fn from_char(c: char) -> Option<Color> {
        match c {
            'w' => Some(Color::White),
            'b' => Some(Color::Black),
            _ => None,
        }
    }
}

/// Same as [`Color::inv()`]
#[inline]
pub const fn opposite_color(c: Color) -> Color {
    c.inv()
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Color::from_char(ch).ok_or(ColorParseError::UnexpectedChar(ch)),
            _ => Err(ColorParseError::BadLength),
        }
    }
}

/// Kind of a chess piece
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Piece {
    Pawn = 0,
    King = 1,
    Knight = 2,
    Bishop = 3,
    Rook = 4,
    Queen = 5,
}

impl Piece {
    pub const ALL: [Piece; 6] = [
        Piece::Pawn,
        Piece::King,
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
    ];

    /// Returns `true` for bishops, rooks and queens
    pub const fn is_sliding(&self) -> bool {
        matches!(*self, Piece::Bishop | Piece::Rook | Piece::Queen)
    }
}

/// Contents of a single square
///
/// Either empty, or a piece of some color. Packed into one byte: `0` is empty, `1..=6` are
/// White pieces and `7..=12` are Black pieces, in the order of [`Piece`].
#[derive(Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Cell(u8);

impl Cell {
    pub const EMPTY: Cell = Cell(0);
    pub const COUNT: usize = 13;

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_occupied(&self) -> bool {
        self.0 != 0
    }

    pub const fn from_index(val: usize) -> Cell {
        assert!(val < Self::COUNT, "index too large");
        Cell(val as u8)
    }

    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    pub const fn from_parts(c: Color, p: Piece) -> Cell {
        Cell(match c {
            Color::White => 1 + p as u8,
            Color::Black => 7 + p as u8,
        })
    }

    pub const fn color(&self) -> Option<Color> {
        match self.0 {
            0 => None,
            1..=6 => Some(Color::White),
            _ => Some(Color::Black),
        }
    }

    pub const fn piece(&self) -> Option<Piece> {
        match self.0 {
            0 => None,
            x => Some(Piece::ALL[((x - 1) % 6) as usize]),
        }
    }

    /// Returns `true` if the cell holds a piece of color `c`
    pub const fn is_of(&self, c: Color) -> bool {
        match self.color() {
            Some(color) => color as u8 == c as u8,
            None => false,
        }
    }

    pub fn iter() -> impl Iterator<Item = Self> {
        (0..Self::COUNT as u8).map(Cell)
    }

    pub fn as_char(&self) -> char {
        b".PKNBRQpknbrq"[self.0 as usize] as char
    }

    pub fn from_char(c: char) -> Option<Self> {
        if c == '.' {
            return Some(Cell::EMPTY);
        }
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let piece = match c.to_ascii_lowercase() {
            'p' => Piece::Pawn,
            'k' => Piece::King,
            'n' => Piece::Knight,
            'b' => Piece::Bishop,
            'r' => Piece::Rook,
            'q' => Piece::Queen,
            _ => return None,
        };
        Some(Cell::from_parts(color, piece))
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "Cell({})", self.as_char())
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Cell {
    type Err = CellParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Cell::from_char(ch).ok_or(CellParseError::UnexpectedChar(ch)),
            _ => Err(CellParseError::BadLength),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CastlingSide {
    Queen = 0,
    King = 1,
}

/// Set of castling rights, one bit per color and side
#[derive(Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct CastlingRights(u8);

impl CastlingRights {
    const fn bit(c: Color, s: CastlingSide) -> u8 {
        1_u8 << (((c as u8) << 1) | s as u8)
    }

    pub const EMPTY: CastlingRights = CastlingRights(0);
    pub const FULL: CastlingRights = CastlingRights(15);

    pub const fn has(&self, c: Color, s: CastlingSide) -> bool {
        (self.0 & Self::bit(c, s)) != 0
    }

    pub const fn with(self, c: Color, s: CastlingSide) -> CastlingRights {
        CastlingRights(self.0 | Self::bit(c, s))
    }

    pub const fn without(self, c: Color, s: CastlingSide) -> CastlingRights {
        CastlingRights(self.0 & !Self::bit(c, s))
    }

    pub fn set(&mut self, c: Color, s: CastlingSide) {
        *self = self.with(c, s)
    }

    pub fn unset(&mut self, c: Color, s: CastlingSide) {
        *self = self.without(c, s)
    }

    pub fn unset_color(&mut self, c: Color) {
        self.unset(c, CastlingSide::King);
        self.unset(c, CastlingSide::Queen);
    }

    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "CastlingRights({})", self)
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        if *self == Self::EMPTY {
            return write!(f, "-");
        }
        for (color, side, ch) in [
            (Color::White, CastlingSide::King, 'K'),
            (Color::White, CastlingSide::Queen, 'Q'),
            (Color::Black, CastlingSide::King, 'k'),
            (Color::Black, CastlingSide::Queen, 'q'),
        ] {
            if self.has(color, side) {
                write!(f, "{}", ch)?;
            }
        }
        Ok(())
    }
}

impl FromStr for CastlingRights {
    type Err = CastlingRightsParseError;

    fn from_str(s: &str) -> Result<CastlingRights, Self::Err> {
        type Error = CastlingRightsParseError;
        if s == "-" {
            return Ok(CastlingRights::EMPTY);
        }
        if s.is_empty() {
            return Err(Error::EmptyString);
        }
        let mut res = CastlingRights::EMPTY;
        for ch in s.chars() {
            let (color, side) = match ch {
                'K' => (Color::White, CastlingSide::King),
                'Q' => (Color::White, CastlingSide::Queen),
                'k' => (Color::Black, CastlingSide::King),
                'q' => (Color::Black, CastlingSide::Queen),
                _ => return Err(Error::UnexpectedChar(ch)),
            };
            if res.has(color, side) {
                return Err(Error::DuplicateChar(ch));
            }
            res.set(color, side);
        }
        Ok(res)
    }
}
