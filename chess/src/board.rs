//! Board and related things

use crate::bitboard::Bitboard;
use crate::moves::{self, Move};
use crate::movegen::{self, MoveList};
use crate::types::{
    self, CastlingRights, CastlingSide, Cell, Color, Coord, DrawReason, File, Outcome, Piece, Rank,
    WinReason,
};
use crate::{castling, geometry};

use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::num::ParseIntError;
use std::str::FromStr;

use thiserror::Error;

/// Reason why a [`RawBoard`] doesn't hold a playable position
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ValidateError {
    /// En passant pawn is not on the rank reached by a double step
    #[error("en passant pawn {0} is on a wrong rank")]
    InvalidEnpassant(Coord),
    /// More than 16 pieces of one color
    #[error("{0:?} has more than 16 pieces")]
    TooManyPieces(Color),
    #[error("{0:?} has no king")]
    NoKing(Color),
    #[error("{0:?} has several kings")]
    TooManyKings(Color),
    /// Pawn on the first or the last rank
    #[error("pawn on back rank at {0}")]
    InvalidPawn(Coord),
    /// The side not to move is in check
    #[error("side not to move is in check")]
    OpponentKingAttacked,
}

/// Error in the piece placement field of FEN
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum CellsParseError {
    #[error("rank {0} is longer than 8 squares")]
    RankOverflow(Rank),
    #[error("rank {0} is shorter than 8 squares")]
    RankUnderflow(Rank),
    #[error("more than 8 ranks")]
    Overflow,
    #[error("less than 8 ranks")]
    Underflow,
    /// Neither a piece letter nor a digit from 1 to 8
    #[error("bad placement char {0:?}")]
    UnexpectedChar(char),
}

/// Error parsing [`RawBoard`] from FEN
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum RawFenParseError {
    #[error("FEN must be ASCII")]
    NonAscii,
    /// The string is empty or holds only whitespace
    #[error("empty FEN")]
    NoBoard,
    #[error("piece placement: {0}")]
    Board(#[from] CellsParseError),
    #[error("side to move: {0}")]
    MoveSide(#[from] types::ColorParseError),
    /// Side to move is given, but castling rights are not
    #[error("castling field missing")]
    NoCastling,
    #[error("castling field: {0}")]
    Castling(#[from] types::CastlingRightsParseError),
    /// Castling rights are given, but en passant square is not
    #[error("en passant field missing")]
    NoEnpassant,
    #[error("en passant field: {0}")]
    Enpassant(#[from] types::CoordParseError),
    /// En passant square is not right behind a double-stepped pawn
    #[error("en passant square on rank {0}")]
    InvalidEnpassantRank(Rank),
    #[error("half-move counter: {0}")]
    MoveCounter(ParseIntError),
    #[error("move number: {0}")]
    MoveNumber(ParseIntError),
    #[error("trailing fields after move number")]
    ExtraData,
}

/// Error loading [`Board`] from FEN
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum FenParseError {
    #[error("malformed FEN: {0}")]
    Fen(#[from] RawFenParseError),
    #[error("illegal position: {0}")]
    Valid(#[from] ValidateError),
}

/// Chess position without any guarantees
///
/// Every field is public, so the position can be set up or edited freely. Nothing is checked
/// until the board is turned into [`Board`] with [`Board::try_from()`].
///
/// # Example
///
/// ```
/// # use tilechess::{Board, Cell, Color, Coord, Piece, RawBoard};
/// #
/// let mut raw = RawBoard::empty();
/// raw.put(Coord::from_index(4), Cell::from_parts(Color::Black, Piece::King));
/// raw.put(Coord::from_index(12), Cell::from_parts(Color::White, Piece::Queen));
/// raw.put(Coord::from_index(60), Cell::from_parts(Color::White, Piece::King));
/// raw.side = Color::Black;
///
/// let board = Board::try_from(raw).unwrap();
/// assert!(board.is_check());
/// assert_eq!(board.as_fen(), "4k3/4Q3/8/8/8/8/8/4K3 b - - 0 1");
///
/// raw.side = Color::White;
/// assert!(Board::try_from(raw).is_err());
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RawBoard {
    /// Contents of the board, indexed by [`Coord::index()`]
    ///
    /// Index 0 is a8 and index 63 is h1.
    pub cells: [Cell; 64],
    /// Side to move
    pub side: Color,
    /// Castling rights
    pub castling: CastlingRights,
    /// En passant source square
    ///
    /// It is equal to `None` if no enpassant is allowed. Otherwise, it contains
    /// the square with the pawn which can be captured by enpassant.
    ///
    /// If you want to obtain the destination square for the possible enpassant, see
    /// [`RawBoard::ep_dest()`].
    pub ep_source: Option<Coord>,
    /// Number of half-moves without pawn moves or captures
    pub move_counter: u16,
    /// Move number
    ///
    /// Note that this is move number, not half-move number. It is incremented after each
    /// move by Black.
    pub move_number: u16,
}

impl RawBoard {
    /// Returns an empty `RawBoard`
    ///
    /// Does the same as [`RawBoard::default()`], except that this function is `const`.
    #[inline]
    pub const fn empty() -> RawBoard {
        RawBoard {
            cells: [Cell::EMPTY; 64],
            side: Color::White,
            castling: CastlingRights::EMPTY,
            ep_source: None,
            move_counter: 0,
            move_number: 1,
        }
    }

    /// Returns a board with the initial position
    pub fn initial() -> RawBoard {
        let mut res = RawBoard {
            castling: CastlingRights::FULL,
            ..RawBoard::empty()
        };
        const BACK_RANK: [Piece; 8] = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];
        for (file, piece) in File::iter().zip(BACK_RANK) {
            for color in [Color::White, Color::Black] {
                res.put2(
                    file,
                    geometry::castling_rank(color),
                    Cell::from_parts(color, piece),
                );
                res.put2(
                    file,
                    geometry::double_move_src_rank(color),
                    Cell::from_parts(color, Piece::Pawn),
                );
            }
        }
        res
    }

    /// Parses a board from FEN
    ///
    /// Does the same as [`RawBoard::from_str`]. See there for the accepted forms.
    #[inline]
    pub fn from_fen(fen: &str) -> Result<RawBoard, RawFenParseError> {
        RawBoard::from_str(fen)
    }

    /// Returns the contents of the square with coordinate `c`
    #[inline]
    pub fn get(&self, c: Coord) -> Cell {
        self.cells[c.index()]
    }

    /// Returns the contents of the square with file `file` and rank `rank`
    #[inline]
    pub fn get2(&self, file: File, rank: Rank) -> Cell {
        self.get(Coord::from_parts(file, rank))
    }

    /// Puts `cell` to the square with coordinate `c`
    #[inline]
    pub fn put(&mut self, c: Coord, cell: Cell) {
        self.cells[c.index()] = cell;
    }

    /// Puts `cell` to the square with file `file` and rank `rank`
    #[inline]
    pub fn put2(&mut self, file: File, rank: Rank, cell: Cell) {
        self.put(Coord::from_parts(file, rank), cell);
    }

    /// Returns `None` if no enpassant is allowed. Otherwise, returns the destination
    /// square for the possible enpassant.
    ///
    /// If the rank of `self.ep_source` is not a valid rank for enpassant source (i.e not
    /// equal to [`Rank::R5`] for White and [`Rank::R4`] for Black), then the function just
    /// returns the result as if the rank was valid.
    #[inline]
    pub fn ep_dest(&self) -> Option<Coord> {
        let p = self.ep_source?;
        Some(Coord::from_parts(
            p.file(),
            geometry::enpassant_dst_rank(self.side),
        ))
    }

    /// Returns a printable diagram of the board
    ///
    /// # Example
    ///
    /// ```
    /// # use tilechess::RawBoard;
    /// #
    /// let diagram = r#"
    ///   +-----------------+
    /// 8 | r n b q k b n r |
    /// 7 | p p p p p p p p |
    /// 6 | . . . . . . . . |
    /// 5 | . . . . . . . . |
    /// 4 | . . . . . . . . |
    /// 3 | . . . . . . . . |
    /// 2 | P P P P P P P P |
    /// 1 | R N B Q K B N R |
    ///   +-----------------+
    ///     a b c d e f g h
    /// White to move
    /// "#;
    /// assert_eq!(RawBoard::initial().pretty().to_string().trim(), diagram.trim());
    /// ```
    #[inline]
    pub fn pretty(&self) -> Pretty<'_> {
        Pretty(self)
    }

    /// Converts the board into a FEN string
    #[inline]
    pub fn as_fen(&self) -> String {
        self.to_string()
    }
}

impl Default for RawBoard {
    #[inline]
    fn default() -> RawBoard {
        RawBoard::empty()
    }
}

/// Board that contains a valid position
///
/// This board always contains a valid chess position. It is used for every chess operation:
/// move generation, making and validating moves, verifying for check and checkmate.
///
/// It contains a [`RawBoard`] alongside with the positions of both kings. The board is `Copy`, so
/// trying out a move is just making it on a copy.
///
/// The board must be always valid (i. e. `Ok(b) == Board::try_from(*b.raw())` must always hold).
/// The only allowed exception is attack on the opponent's king after making a pseudo-legal move
/// on a scratch copy inside the move generator. Such copies never leave the crate.
#[derive(Debug, Copy, Clone)]
pub struct Board {
    pub(crate) r: RawBoard,
    pub(crate) kings: [Coord; 2],
}

impl Board {
    /// Returns a board with the initial position
    pub fn initial() -> Board {
        Board {
            r: RawBoard::initial(),
            kings: [
                castling::king_src(Color::White),
                castling::king_src(Color::Black),
            ],
        }
    }

    /// Parses a board from FEN
    ///
    /// Does the same as [`Board::from_str`]. It is recommended to use this function instead of
    /// `from_str()` for better readability.
    pub fn from_fen(fen: &str) -> Result<Board, FenParseError> {
        Board::from_str(fen)
    }

    /// Returns a view over the raw board
    #[inline]
    pub fn raw(&self) -> &RawBoard {
        &self.r
    }

    /// Returns the contents of the square with coordinate `c`
    #[inline]
    pub fn get(&self, c: Coord) -> Cell {
        self.r.get(c)
    }

    /// Returns the contents of the square with file `file` and rank `rank`
    #[inline]
    pub fn get2(&self, file: File, rank: Rank) -> Cell {
        self.r.get2(file, rank)
    }

    #[inline]
    pub(crate) fn cells(&self) -> &[Cell; 64] {
        &self.r.cells
    }

    /// Returns side to move
    #[inline]
    pub fn side(&self) -> Color {
        self.r.side
    }

    /// Returns the position of the king of color `c`
    #[inline]
    pub fn king_pos(&self, c: Color) -> Coord {
        self.kings[c.index()]
    }

    /// Returns all the squares occupied by pieces of color `c`
    pub fn color(&self, c: Color) -> Bitboard {
        Coord::iter().filter(|&p| self.get(p).is_of(c)).collect()
    }

    /// Returns `true` if the king of color `c` is under attack
    #[inline]
    pub fn is_king_attacked(&self, c: Color) -> bool {
        movegen::is_cell_attacked(self, self.king_pos(c), c.inv())
    }

    /// Returns `true` if the opponent's king is under attack
    ///
    /// This never holds for a board obtained through the public API.
    #[inline]
    pub fn is_opponent_king_attacked(&self) -> bool {
        self.is_king_attacked(self.r.side.inv())
    }

    /// Returns `true` if the current side is in check
    #[inline]
    pub fn is_check(&self) -> bool {
        self.is_king_attacked(self.r.side)
    }

    /// Returns all the pieces that give check currently
    #[inline]
    pub fn checkers(&self) -> Bitboard {
        let c = self.r.side;
        movegen::cell_attackers(self, self.king_pos(c), c.inv())
    }

    /// Returns `true` if the current side has at least one legal move
    #[inline]
    pub fn has_legal_moves(&self) -> bool {
        movegen::has_legal_moves(self)
    }

    /// Returns `true` if the side to move has no legal moves, either by checkmate or stalemate
    #[inline]
    pub fn is_game_over(&self) -> bool {
        !self.has_legal_moves()
    }

    /// Calculates the current outcome on the board
    ///
    /// Only checkmate and stalemate are detected. The result is not cached, and computing it
    /// requires running the move generator.
    pub fn calc_outcome(&self) -> Option<Outcome> {
        if self.has_legal_moves() {
            return None;
        }
        if self.is_check() {
            Some(Outcome::Win {
                side: self.r.side.inv(),
                reason: WinReason::Checkmate,
            })
        } else {
            Some(Outcome::Draw(DrawReason::Stalemate))
        }
    }

    /// Returns the legal moves of the piece on `c`
    ///
    /// See [`movegen::legal::gen_from()`] for details.
    #[inline]
    pub fn moves_from(&self, c: Coord) -> MoveList {
        movegen::legal::gen_from(self, c)
    }

    /// Returns all the legal moves of the side to move
    #[inline]
    pub fn legal_moves(&self) -> Vec<Move> {
        movegen::legal::gen_all(self)
    }

    /// Validates the move `mv` and returns the board after it, leaving `self` unchanged
    pub fn make_move(&self, mv: Move) -> Result<Board, moves::ValidateError> {
        let (mv, kind) = moves::validate(self, mv)?;
        let mut res = *self;
        moves::make_move_unchecked(&mut res, mv, kind);
        Ok(res)
    }

    /// Returns a copy of the board with `c` to move and no enpassant
    ///
    /// The result is used only to look at the moves of the side not to move, so it may violate
    /// the board invariants.
    pub(crate) fn with_side(&self, c: Color) -> Board {
        let mut res = *self;
        if res.r.side != c {
            res.r.side = c;
            res.r.ep_source = None;
        }
        res
    }

    /// Returns a printable diagram of the board, see [`RawBoard::pretty()`]
    #[inline]
    pub fn pretty(&self) -> Pretty<'_> {
        self.r.pretty()
    }

    /// Converts the board into a FEN string
    #[inline]
    pub fn as_fen(&self) -> String {
        self.to_string()
    }
}

impl Default for Board {
    #[inline]
    fn default() -> Board {
        Board::initial()
    }
}

impl PartialEq for Board {
    #[inline]
    fn eq(&self, other: &Board) -> bool {
        self.r == other.r
    }
}

impl Eq for Board {}

impl Hash for Board {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.r.hash(state)
    }
}

impl TryFrom<RawBoard> for Board {
    type Error = ValidateError;

    fn try_from(mut raw: RawBoard) -> Result<Board, ValidateError> {
        // Check enpassant
        if let Some(p) = raw.ep_source {
            if p.rank() != geometry::enpassant_src_rank(raw.side) {
                return Err(ValidateError::InvalidEnpassant(p));
            }

            // Reset enpassant if either there is no pawn or the cell on the pawn's path is occupied
            let pp = Coord::from_parts(p.file(), geometry::enpassant_dst_rank(raw.side));
            if raw.get(p) != Cell::from_parts(raw.side.inv(), Piece::Pawn)
                || raw.get(pp).is_occupied()
            {
                raw.ep_source = None;
            }
        }

        // Reset bad castling flags
        for color in [Color::White, Color::Black] {
            let king = Cell::from_parts(color, Piece::King);
            let rook = Cell::from_parts(color, Piece::Rook);
            for side in [CastlingSide::Queen, CastlingSide::King] {
                if raw.get(castling::king_src(color)) != king
                    || raw.get(castling::rook_src(color, side)) != rook
                {
                    raw.castling.unset(color, side);
                }
            }
        }

        // Check TooManyPieces, NoKing, TooManyKings
        let mut counts = [0_usize; 2];
        let mut kings: [Option<Coord>; 2] = [None, None];
        let mut pawns = Bitboard::EMPTY;
        for coord in Coord::iter() {
            let cell = raw.get(coord);
            let (color, piece) = match (cell.color(), cell.piece()) {
                (Some(color), Some(piece)) => (color, piece),
                _ => continue,
            };
            counts[color.index()] += 1;
            match piece {
                Piece::King => {
                    if kings[color.index()].replace(coord).is_some() {
                        return Err(ValidateError::TooManyKings(color));
                    }
                }
                Piece::Pawn => pawns.set(coord),
                _ => {}
            }
        }
        for color in [Color::White, Color::Black] {
            if counts[color.index()] > 16 {
                return Err(ValidateError::TooManyPieces(color));
            }
        }
        let white_king = kings[Color::White.index()].ok_or(ValidateError::NoKing(Color::White))?;
        let black_king = kings[Color::Black.index()].ok_or(ValidateError::NoKing(Color::Black))?;

        // Check InvalidPawn
        let bad_pawns = pawns & (Bitboard::rank(Rank::R1) | Bitboard::rank(Rank::R8));
        if let Some(p) = bad_pawns.first() {
            return Err(ValidateError::InvalidPawn(p));
        }

        // Check OpponentKingAttacked
        let res = Board {
            r: raw,
            kings: [white_king, black_king],
        };
        if res.is_opponent_king_attacked() {
            return Err(ValidateError::OpponentKingAttacked);
        }

        Ok(res)
    }
}

impl TryFrom<&RawBoard> for Board {
    type Error = ValidateError;

    fn try_from(raw: &RawBoard) -> Result<Board, ValidateError> {
        (*raw).try_into()
    }
}

/// Text diagram of the board, with White at the bottom
pub struct Pretty<'a>(&'a RawBoard);

impl<'a> Display for Pretty<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        const BORDER: &str = "  +-----------------+";
        writeln!(f, "{}", BORDER)?;
        for rank in Rank::iter() {
            write!(f, "{} |", rank)?;
            for file in File::iter() {
                write!(f, " {}", self.0.get2(file, rank).as_char())?;
            }
            writeln!(f, " |")?;
        }
        writeln!(f, "{}", BORDER)?;
        write!(f, "   ")?;
        for file in File::iter() {
            write!(f, " {}", file)?;
        }
        let side = match self.0.side {
            Color::White => "White",
            Color::Black => "Black",
        };
        writeln!(f)?;
        writeln!(f, "{} to move", side)
    }
}

fn parse_cells(s: &str) -> Result<[Cell; 64], CellsParseError> {
    let mut cells = [Cell::EMPTY; 64];
    let mut rows = s.split('/');
    for rank in Rank::iter() {
        let row = rows.next().ok_or(CellsParseError::Underflow)?;
        let mut file = 0_usize;
        for c in row.chars() {
            if matches!(c, '1'..='8') {
                file += c as usize - '0' as usize;
            } else {
                let cell = match c {
                    'a'..='z' | 'A'..='Z' => Cell::from_char(c),
                    _ => None,
                }
                .ok_or(CellsParseError::UnexpectedChar(c))?;
                if file < 8 {
                    cells[Coord::from_parts(File::from_index(file), rank).index()] = cell;
                }
                file += 1;
            }
            if file > 8 {
                return Err(CellsParseError::RankOverflow(rank));
            }
        }
        if file < 8 {
            return Err(CellsParseError::RankUnderflow(rank));
        }
    }
    if rows.next().is_some() {
        return Err(CellsParseError::Overflow);
    }
    Ok(cells)
}

fn parse_ep_source(s: &str, side: Color) -> Result<Option<Coord>, RawFenParseError> {
    if s == "-" {
        return Ok(None);
    }
    let enpassant = Coord::from_str(s)?;
    if enpassant.rank() != geometry::enpassant_dst_rank(side) {
        return Err(RawFenParseError::InvalidEnpassantRank(enpassant.rank()));
    }
    Ok(Some(Coord::from_parts(
        enpassant.file(),
        geometry::enpassant_src_rank(side),
    )))
}

/// Parses the board from FEN
///
/// Two forms are accepted. The first one is a full FEN record, where the half-move counter and
/// the move number may be omitted (they default to `0` and `1`). The second one is the piece
/// placement alone, as in `"8/8/8/8/8/8/8/K6k"`. In this case White is to move, there is no
/// enpassant, and all castling rights are granted; converting the result into [`Board`] keeps only
/// the rights for which the king and the rook stand on their initial squares.
impl FromStr for RawBoard {
    type Err = RawFenParseError;

    fn from_str(s: &str) -> Result<RawBoard, Self::Err> {
        type Error = RawFenParseError;

        if !s.is_ascii() {
            return Err(Error::NonAscii);
        }
        let mut fields = s.split_ascii_whitespace();
        let cells = parse_cells(fields.next().ok_or(Error::NoBoard)?)?;
        let side: Color = match fields.next() {
            Some(side) => side.parse()?,
            None => {
                return Ok(RawBoard {
                    cells,
                    castling: CastlingRights::FULL,
                    ..RawBoard::empty()
                })
            }
        };
        let castling: CastlingRights = fields.next().ok_or(Error::NoCastling)?.parse()?;
        let ep_source = parse_ep_source(fields.next().ok_or(Error::NoEnpassant)?, side)?;
        let move_counter = fields
            .next()
            .map_or(Ok(0), u16::from_str)
            .map_err(Error::MoveCounter)?;
        let move_number = fields
            .next()
            .map_or(Ok(1), u16::from_str)
            .map_err(Error::MoveNumber)?;
        if fields.next().is_some() {
            return Err(Error::ExtraData);
        }

        Ok(RawBoard {
            cells,
            side,
            castling,
            ep_source,
            move_counter,
            move_number,
        })
    }
}

impl FromStr for Board {
    type Err = FenParseError;

    fn from_str(s: &str) -> Result<Board, Self::Err> {
        Ok(RawBoard::from_str(s)?.try_into()?)
    }
}

fn write_placement(cells: &[Cell; 64], f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
    for (i, row) in cells.chunks(8).enumerate() {
        if i != 0 {
            write!(f, "/")?;
        }
        let mut gap = 0;
        for cell in row {
            if cell.is_empty() {
                gap += 1;
                continue;
            }
            if gap != 0 {
                write!(f, "{}", gap)?;
                gap = 0;
            }
            write!(f, "{}", cell.as_char())?;
        }
        if gap != 0 {
            write!(f, "{}", gap)?;
        }
    }
    Ok(())
}

impl Display for RawBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write_placement(&self.cells, f)?;
        write!(f, " {} {} ", self.side, self.castling)?;
        match self.ep_dest() {
            Some(dst) => write!(f, "{}", dst)?,
            None => write!(f, "-")?,
        }
        write!(f, " {} {}", self.move_counter, self.move_number)
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        self.r.fmt(f)
    }
}
