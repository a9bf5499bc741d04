use crate::board::Board;
use crate::types::{CastlingRights, CastlingSide, Cell, Color, Coord, Piece};
use crate::{castling, geometry, movegen};

use std::fmt;

use thiserror::Error;

/// Move kind
///
/// The kind is not stored in [`Move`], it is derived from the board on which the move is made.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MoveKind {
    /// Non-pawn move or capture (except castling)
    Simple = 0,
    /// Kingside castling
    CastlingKingside = 1,
    /// Queenside castling
    CastlingQueenside = 2,
    /// Single pawn move (either non-capture or capture), except promotion
    PawnSimple = 3,
    /// Double pawn move
    PawnDouble = 4,
    /// Enpassant
    Enpassant = 5,
    /// Pawn reaches the last rank (either non-capture or capture)
    Promote = 6,
}

impl MoveKind {
    pub const fn castling_side(&self) -> Option<CastlingSide> {
        match *self {
            Self::CastlingKingside => Some(CastlingSide::King),
            Self::CastlingQueenside => Some(CastlingSide::Queen),
            _ => None,
        }
    }

    /// Determines the kind of the move from `src` to `dst` made by the piece on `src`
    ///
    /// Returns `None` if `src` is empty.
    pub fn classify(b: &Board, src: Coord, dst: Coord) -> Option<MoveKind> {
        let cell = b.get(src);
        let color = cell.color()?;
        Some(match cell.piece()? {
            Piece::Pawn => {
                if dst.rank() == geometry::promote_rank(color) {
                    MoveKind::Promote
                } else if src.row().abs_diff(dst.row()) == 2 {
                    MoveKind::PawnDouble
                } else if src.file() != dst.file() && b.get(dst).is_empty() {
                    MoveKind::Enpassant
                } else {
                    MoveKind::PawnSimple
                }
            }
            Piece::King if src == castling::king_src(color) => {
                if dst == castling::king_dst(color, CastlingSide::King) {
                    MoveKind::CastlingKingside
                } else if dst == castling::king_dst(color, CastlingSide::Queen) {
                    MoveKind::CastlingQueenside
                } else {
                    MoveKind::Simple
                }
            }
            _ => MoveKind::Simple,
        })
    }
}

/// Target piece for promotion
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PromotePiece {
    Knight = 2,
    Bishop = 3,
    Rook = 4,
    Queen = 5,
}

impl PromotePiece {
    pub fn as_char(&self) -> char {
        match *self {
            Self::Knight => 'n',
            Self::Bishop => 'b',
            Self::Rook => 'r',
            Self::Queen => 'q',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'n' => Some(Self::Knight),
            'b' => Some(Self::Bishop),
            'r' => Some(Self::Rook),
            'q' => Some(Self::Queen),
            _ => None,
        }
    }
}

impl Default for PromotePiece {
    #[inline]
    fn default() -> Self {
        Self::Queen
    }
}

impl From<PromotePiece> for Piece {
    #[inline]
    fn from(p: PromotePiece) -> Self {
        match p {
            PromotePiece::Knight => Piece::Knight,
            PromotePiece::Bishop => Piece::Bishop,
            PromotePiece::Rook => Piece::Rook,
            PromotePiece::Queen => Piece::Queen,
        }
    }
}

impl TryFrom<Piece> for PromotePiece {
    type Error = ();

    #[inline]
    fn try_from(p: Piece) -> Result<Self, Self::Error> {
        match p {
            Piece::Knight => Ok(PromotePiece::Knight),
            Piece::Bishop => Ok(PromotePiece::Bishop),
            Piece::Rook => Ok(PromotePiece::Rook),
            Piece::Queen => Ok(PromotePiece::Queen),
            _ => Err(()),
        }
    }
}

/// Chess move
///
/// A move is just a pair of squares plus the promotion choice. It carries no information about
/// the position it was created for: castling is a king move by two files, and enpassant is a
/// diagonal pawn move onto an empty square. The exact kind is recovered by [`MoveKind::classify()`]
/// when the move is validated against a board.
///
/// `promote` is `None` for all the moves except a pawn reaching the last rank. Moves produced by
/// the move generator carry [`PromotePiece::Queen`] there; use [`Move::with_promote()`] to pick
/// another piece.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    src: Coord,
    dst: Coord,
    promote: Option<PromotePiece>,
}

/// Error indicating that move is invalid
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ValidateError {
    /// There is no piece on the source square
    #[error("no piece on source square")]
    EmptySource,
    /// The piece on the source square belongs to the side not to move
    #[error("piece doesn't belong to the side to move")]
    WrongSide,
    /// Promotion piece is given for a move which doesn't promote
    #[error("unexpected promotion")]
    BadPromote,
    /// Move is not legal
    #[error("move is not legal")]
    NotLegal,
}

impl Move {
    #[inline]
    pub const fn new(src: Coord, dst: Coord) -> Move {
        Move {
            src,
            dst,
            promote: None,
        }
    }

    #[inline]
    pub const fn with_promote(self, promote: PromotePiece) -> Move {
        Move {
            src: self.src,
            dst: self.dst,
            promote: Some(promote),
        }
    }

    #[inline]
    pub const fn src(&self) -> Coord {
        self.src
    }

    #[inline]
    pub const fn dst(&self) -> Coord {
        self.dst
    }

    #[inline]
    pub const fn promote(&self) -> Option<PromotePiece> {
        self.promote
    }

    /// Returns `true` if the move is legal in position `b`
    pub fn is_legal(&self, b: &Board) -> bool {
        validate(b, *self).is_ok()
    }

    pub fn validate(&self, b: &Board) -> Result<(), ValidateError> {
        validate(b, *self).map(|_| ())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}{}", self.src, self.dst)?;
        if let Some(p) = self.promote {
            write!(f, "{}", p.as_char())?;
        }
        Ok(())
    }
}

/// Checks that `mv` is legal in `b` and returns the move in canonical form together with its kind
///
/// The canonical form has `promote` set to Queen if the move promotes and no piece was chosen.
pub(crate) fn validate(b: &Board, mv: Move) -> Result<(Move, MoveKind), ValidateError> {
    let cell = b.get(mv.src);
    let color = cell.color().ok_or(ValidateError::EmptySource)?;
    if color != b.side() {
        return Err(ValidateError::WrongSide);
    }
    let kind = MoveKind::classify(b, mv.src, mv.dst).ok_or(ValidateError::EmptySource)?;
    let mv = match (kind, mv.promote) {
        (MoveKind::Promote, None) => mv.with_promote(PromotePiece::Queen),
        (MoveKind::Promote, Some(_)) => mv,
        (_, None) => mv,
        (_, Some(_)) => return Err(ValidateError::BadPromote),
    };
    let legal = movegen::legal::gen_from(b, mv.src)
        .iter()
        .any(|m| m.dst == mv.dst);
    if !legal {
        return Err(ValidateError::NotLegal);
    }
    Ok((mv, kind))
}

/// Metadata necessary to undo the applied move
///
/// Holds only what cannot be recomputed from the position after the move: the previous
/// occupant of the destination and the flags which the move may have overwritten.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RawUndo {
    kind: MoveKind,
    dst_cell: Cell,
    castling: CastlingRights,
    ep_source: Option<Coord>,
    move_counter: u16,
    move_number: u16,
}

impl RawUndo {
    #[inline]
    pub fn kind(&self) -> MoveKind {
        self.kind
    }

    #[inline]
    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    #[inline]
    pub fn ep_source(&self) -> Option<Coord> {
        self.ep_source
    }
}

fn update_castling(b: &mut Board, src: Coord, dst: Coord) {
    let change = crate::bitboard::Bitboard::from_coord(src).with(dst);
    if (change & castling::ALL_SRCS).is_empty() {
        return;
    }
    for c in [Color::White, Color::Black] {
        for s in [CastlingSide::Queen, CastlingSide::King] {
            if (change & castling::srcs(c, s)).is_nonempty() {
                b.r.castling.unset(c, s);
            }
        }
    }
}

fn enpassant_taken(color: Color, dst: Coord) -> Coord {
    Coord::from_parts(dst.file(), geometry::enpassant_src_rank(color))
}

fn do_make_castling(b: &mut Board, color: Color, side: CastlingSide, inv: bool) {
    let king = Cell::from_parts(color, Piece::King);
    let rook = Cell::from_parts(color, Piece::Rook);
    let (king_src, king_dst) = (castling::king_src(color), castling::king_dst(color, side));
    let (rook_src, rook_dst) = (
        castling::rook_src(color, side),
        castling::rook_dst(color, side),
    );
    if inv {
        b.r.put(king_dst, Cell::EMPTY);
        b.r.put(rook_dst, Cell::EMPTY);
        b.r.put(king_src, king);
        b.r.put(rook_src, rook);
        b.kings[color.index()] = king_src;
    } else {
        b.r.put(king_src, Cell::EMPTY);
        b.r.put(rook_src, Cell::EMPTY);
        b.r.put(king_dst, king);
        b.r.put(rook_dst, rook);
        b.kings[color.index()] = king_dst;
        b.r.castling.unset_color(color);
    }
}

/// Makes the move `mv` of kind `kind` for the side to move on `b`
///
/// The move must be at least pseudo-legal for the side to move, and `kind` must be the one
/// returned by [`MoveKind::classify()`]. The mover's king may remain attacked afterwards; the
/// caller is responsible for checking that.
pub(crate) fn make_move_unchecked(b: &mut Board, mv: Move, kind: MoveKind) -> RawUndo {
    let color = b.r.side;
    let src_cell = b.get(mv.src);
    let dst_cell = b.get(mv.dst);
    let undo = RawUndo {
        kind,
        dst_cell,
        castling: b.r.castling,
        ep_source: b.r.ep_source,
        move_counter: b.r.move_counter,
        move_number: b.r.move_number,
    };
    b.r.ep_source = None;

    match kind {
        MoveKind::Simple | MoveKind::PawnSimple | MoveKind::PawnDouble => {
            b.r.put(mv.src, Cell::EMPTY);
            b.r.put(mv.dst, src_cell);
            if src_cell == Cell::from_parts(color, Piece::King) {
                b.kings[color.index()] = mv.dst;
            }
            if kind == MoveKind::PawnDouble {
                b.r.ep_source = Some(mv.dst);
            }
        }
        MoveKind::Promote => {
            let piece = mv.promote.unwrap_or_default();
            b.r.put(mv.src, Cell::EMPTY);
            b.r.put(mv.dst, Cell::from_parts(color, piece.into()));
        }
        MoveKind::Enpassant => {
            b.r.put(mv.src, Cell::EMPTY);
            b.r.put(mv.dst, src_cell);
            b.r.put(enpassant_taken(color, mv.dst), Cell::EMPTY);
        }
        MoveKind::CastlingKingside => do_make_castling(b, color, CastlingSide::King, false),
        MoveKind::CastlingQueenside => do_make_castling(b, color, CastlingSide::Queen, false),
    }
    update_castling(b, mv.src, mv.dst);

    let is_capture = dst_cell.is_occupied() || kind == MoveKind::Enpassant;
    if is_capture || src_cell == Cell::from_parts(color, Piece::Pawn) {
        b.r.move_counter = 0;
    } else {
        b.r.move_counter = b.r.move_counter.saturating_add(1);
    }
    b.r.side = color.inv();
    if color == Color::Black {
        b.r.move_number = b.r.move_number.saturating_add(1);
    }

    undo
}

/// Unmakes the move `mv` on `b`, which must be the last move made with [`make_move_unchecked()`]
/// that returned `u`
pub(crate) fn unmake_move_unchecked(b: &mut Board, mv: Move, u: RawUndo) {
    let color = b.r.side.inv();
    let pawn = Cell::from_parts(color, Piece::Pawn);

    match u.kind {
        MoveKind::Simple | MoveKind::PawnSimple | MoveKind::PawnDouble => {
            let moved = b.get(mv.dst);
            b.r.put(mv.src, moved);
            b.r.put(mv.dst, u.dst_cell);
            if moved == Cell::from_parts(color, Piece::King) {
                b.kings[color.index()] = mv.src;
            }
        }
        MoveKind::Promote => {
            b.r.put(mv.src, pawn);
            b.r.put(mv.dst, u.dst_cell);
        }
        MoveKind::Enpassant => {
            b.r.put(mv.src, pawn);
            b.r.put(mv.dst, Cell::EMPTY);
            b.r.put(
                enpassant_taken(color, mv.dst),
                Cell::from_parts(color.inv(), Piece::Pawn),
            );
        }
        MoveKind::CastlingKingside => do_make_castling(b, color, CastlingSide::King, true),
        MoveKind::CastlingQueenside => do_make_castling(b, color, CastlingSide::Queen, true),
    }

    b.r.castling = u.castling;
    b.r.ep_source = u.ep_source;
    b.r.move_counter = u.move_counter;
    b.r.move_number = u.move_number;
    b.r.side = color;
}

/// Returns the piece removed from the board by the move which produced `u`
pub(crate) fn captured(u: &RawUndo, mover: Color) -> Cell {
    match u.kind {
        MoveKind::Enpassant => Cell::from_parts(mover.inv(), Piece::Pawn),
        _ => u.dst_cell,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use std::mem;

    fn mv(s: &str) -> Move {
        Move::from_uci(s).unwrap()
    }

    fn make_undo_cycle(fen: &str, cases: &[(&str, &str)]) {
        let mut b = Board::from_fen(fen).unwrap();
        let b_copy = b;
        for &(mv_str, fen_str) in cases {
            let (m, kind) = validate(&b, mv(mv_str)).unwrap();
            let u = make_move_unchecked(&mut b, m, kind);
            assert_eq!(b.as_fen(), fen_str);
            assert_eq!(Board::try_from(*b.raw()), Ok(b));
            unmake_move_unchecked(&mut b, m, u);
            assert_eq!(b, b_copy);
            assert_eq!(b.king_pos(Color::White), b_copy.king_pos(Color::White));
            assert_eq!(b.king_pos(Color::Black), b_copy.king_pos(Color::Black));
        }
    }

    #[test]
    fn test_size() {
        assert_eq!(mem::size_of::<Move>(), 3);
    }

    #[test]
    fn test_simple() {
        let mut b = Board::initial();
        for (mv_str, fen_str) in [
            (
                "e2e4",
                "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
            ),
            (
                "b8c6",
                "r1bqkbnr/pppppppp/2n5/8/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 1 2",
            ),
            (
                "g1f3",
                "r1bqkbnr/pppppppp/2n5/8/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 2 2",
            ),
            (
                "e7e5",
                "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq e6 0 3",
            ),
            (
                "f1b5",
                "r1bqkbnr/pppp1ppp/2n5/1B2p3/4P3/5N2/PPPP1PPP/RNBQK2R b KQkq - 1 3",
            ),
            (
                "g8f6",
                "r1bqkb1r/pppp1ppp/2n2n2/1B2p3/4P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 2 4",
            ),
            (
                "e1g1",
                "r1bqkb1r/pppp1ppp/2n2n2/1B2p3/4P3/5N2/PPPP1PPP/RNBQ1RK1 b kq - 3 4",
            ),
            (
                "f6e4",
                "r1bqkb1r/pppp1ppp/2n5/1B2p3/4n3/5N2/PPPP1PPP/RNBQ1RK1 w kq - 0 5",
            ),
        ] {
            b = b.make_move(mv(mv_str)).unwrap();
            assert_eq!(b.as_fen(), fen_str);
            assert_eq!(Board::try_from(*b.raw()), Ok(b));
        }
    }

    #[test]
    fn test_promote() {
        make_undo_cycle(
            "1b1b1K2/2P5/8/8/7k/8/8/8 w - - 0 1",
            &[
                ("c7c8q", "1bQb1K2/8/8/8/7k/8/8/8 b - - 0 1"),
                ("c7b8n", "1N1b1K2/8/8/8/7k/8/8/8 b - - 0 1"),
                ("c7d8r", "1b1R1K2/8/8/8/7k/8/8/8 b - - 0 1"),
                ("c7c8", "1bQb1K2/8/8/8/7k/8/8/8 b - - 0 1"),
            ],
        );
    }

    #[test]
    fn test_undo() {
        make_undo_cycle(
            "r1bqk2r/ppp2ppp/2np1n2/1Bb1p3/4P3/2PP1N2/PP3PPP/RNBQK2R w KQkq - 0 6",
            &[
                (
                    "e1g1",
                    "r1bqk2r/ppp2ppp/2np1n2/1Bb1p3/4P3/2PP1N2/PP3PPP/RNBQ1RK1 b kq - 1 6",
                ),
                (
                    "f3e5",
                    "r1bqk2r/ppp2ppp/2np1n2/1Bb1N3/4P3/2PP4/PP3PPP/RNBQK2R b KQkq - 0 6",
                ),
                (
                    "b2b4",
                    "r1bqk2r/ppp2ppp/2np1n2/1Bb1p3/1P2P3/2PP1N2/P4PPP/RNBQK2R b KQkq b3 0 6",
                ),
                (
                    "h1g1",
                    "r1bqk2r/ppp2ppp/2np1n2/1Bb1p3/4P3/2PP1N2/PP3PPP/RNBQK1R1 b Qkq - 1 6",
                ),
                (
                    "e1e2",
                    "r1bqk2r/ppp2ppp/2np1n2/1Bb1p3/4P3/2PP1N2/PP2KPPP/RNBQ3R b kq - 1 6",
                ),
            ],
        );
    }

    #[test]
    fn test_castling_queenside() {
        make_undo_cycle(
            "r3k2r/pppq1ppp/2npbn2/2b1p3/2B1P3/2NPBN2/PPPQ1PPP/R3K2R b KQkq - 4 8",
            &[
                (
                    "e8c8",
                    "2kr3r/pppq1ppp/2npbn2/2b1p3/2B1P3/2NPBN2/PPPQ1PPP/R3K2R w KQ - 5 9",
                ),
                (
                    "e8g8",
                    "r4rk1/pppq1ppp/2npbn2/2b1p3/2B1P3/2NPBN2/PPPQ1PPP/R3K2R w KQ - 5 9",
                ),
                (
                    "a8b8",
                    "1r2k2r/pppq1ppp/2npbn2/2b1p3/2B1P3/2NPBN2/PPPQ1PPP/R3K2R w KQk - 5 9",
                ),
            ],
        );
    }

    #[test]
    fn test_pawns() {
        make_undo_cycle(
            "3K4/3p4/8/3PpP2/8/5p2/6P1/2k5 w - e6 0 1",
            &[
                ("g2g3", "3K4/3p4/8/3PpP2/8/5pP1/8/2k5 b - - 0 1"),
                ("g2g4", "3K4/3p4/8/3PpP2/6P1/5p2/8/2k5 b - g3 0 1"),
                ("g2f3", "3K4/3p4/8/3PpP2/8/5P2/8/2k5 b - - 0 1"),
                ("d5e6", "3K4/3p4/4P3/5P2/8/5p2/6P1/2k5 b - - 0 1"),
                ("f5e6", "3K4/3p4/4P3/3P4/8/5p2/6P1/2k5 b - - 0 1"),
            ],
        );
    }

    #[test]
    fn test_rook_capture_drops_rights() {
        make_undo_cycle(
            "r3k2r/8/8/8/8/8/6B1/R3K2R w KQkq - 0 1",
            &[("g2a8", "B3k2r/8/8/8/8/8/8/R3K2R b KQk - 0 1")],
        );
    }

    #[test]
    fn test_validate() {
        let b =
            Board::from_fen("r1bqk2r/ppp2ppp/2np1n2/1Bb1p3/4P3/2PP1N2/PP3PPP/RNBQK2R w KQkq - 0 6")
                .unwrap();

        assert_eq!(mv("e1c1").validate(&b), Err(ValidateError::NotLegal));
        assert_eq!(mv("b5e8").validate(&b), Err(ValidateError::NotLegal));
        assert_eq!(mv("a3a4").validate(&b), Err(ValidateError::EmptySource));
        assert_eq!(mv("e1d1").validate(&b), Err(ValidateError::NotLegal));
        assert_eq!(mv("c6d4").validate(&b), Err(ValidateError::WrongSide));
        assert_eq!(mv("e1g1q").validate(&b), Err(ValidateError::BadPromote));
        assert_eq!(mv("c3c5").validate(&b), Err(ValidateError::NotLegal));
        assert!(mv("e1g1").is_legal(&b));
        assert!(mv("c3c4").is_legal(&b));
    }

    #[test]
    fn test_counters_restored() {
        make_undo_cycle(
            "4k3/8/8/8/8/8/8/4K3 b - - 65535 65535",
            &[
                ("e8d8", "3k4/8/8/8/8/8/8/4K3 w - - 65535 65535"),
                ("e8f7", "8/5k2/8/8/8/8/8/4K3 w - - 65535 65535"),
            ],
        );
        make_undo_cycle(
            "4k3/8/8/8/8/8/8/4K3 w - - 65535 65535",
            &[("e1e2", "4k3/8/8/8/8/8/4K3/8 b - - 65535 65535")],
        );
    }

    #[test]
    fn test_classify() {
        let b = Board::from_fen("4k3/1P6/8/3pP3/8/8/P7/R3K2R w KQ d6 0 1").unwrap();
        let kind = |s: &str| {
            let m = mv(s);
            MoveKind::classify(&b, m.src(), m.dst())
        };
        assert_eq!(kind("a2a3"), Some(MoveKind::PawnSimple));
        assert_eq!(kind("a2a4"), Some(MoveKind::PawnDouble));
        assert_eq!(kind("e5d6"), Some(MoveKind::Enpassant));
        assert_eq!(kind("b7b8"), Some(MoveKind::Promote));
        assert_eq!(kind("e1g1"), Some(MoveKind::CastlingKingside));
        assert_eq!(kind("e1c1"), Some(MoveKind::CastlingQueenside));
        assert_eq!(kind("e1f1"), Some(MoveKind::Simple));
        assert_eq!(kind("a1a2"), Some(MoveKind::Simple));
        assert_eq!(kind("c3c4"), None);
    }
}
