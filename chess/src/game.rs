//! Game state with reversible history
//!
//! [`Game`] owns the current position together with the list of moves that led to it. This is
//! the type an interface layer talks to: it asks for the contents of a square, for the moves of
//! the piece on it, applies the chosen move and may take moves back.

use crate::board::{self, Board};
use crate::movegen::{self, MoveList};
use crate::moves::{self, uci, Move, RawUndo, ValidateError};
use crate::types::{Cell, Color, Coord, Outcome, Piece};

use std::fmt;

use thiserror::Error;

/// Error applying a list of moves in coordinate notation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot apply move #{}: {}", .pos + 1, .source)]
pub struct UciParseError {
    /// Zero-based index of the offending move in the list
    pub pos: usize,
    pub source: uci::ParseError,
}

/// Entry of the game history
///
/// Holds everything needed to take the move back.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Record {
    mv: Move,
    captured: Cell,
    undo: RawUndo,
}

impl Record {
    /// Returns the move as it was applied
    ///
    /// For promotions, the promotion piece is always present, even if it was omitted when
    /// applying the move.
    #[inline]
    pub fn mv(&self) -> Move {
        self.mv
    }

    /// Returns the piece removed from the board by the move, or an empty cell
    ///
    /// For enpassant, this is the captured pawn, though it didn't stand on the destination.
    #[inline]
    pub fn captured(&self) -> Cell {
        self.captured
    }

    /// Returns the data used to take the move back
    #[inline]
    pub fn undo(&self) -> &RawUndo {
        &self.undo
    }
}

/// Chess game: current position plus the history of applied moves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    board: Board,
    history: Vec<Record>,
}

impl Game {
    /// Creates a game from the initial position
    pub fn new() -> Game {
        Game::from_board(Board::initial())
    }

    /// Creates a game starting from position `b`
    pub fn from_board(b: Board) -> Game {
        Game {
            board: b,
            history: Vec::new(),
        }
    }

    /// Creates a game starting from the position given in FEN
    pub fn from_fen(s: &str) -> Result<Game, board::FenParseError> {
        Ok(Game::from_board(Board::from_fen(s)?))
    }

    /// Creates a game from position `b` and applies the moves from `uci_list`
    pub fn from_uci_list(b: Board, uci_list: &str) -> Result<Game, UciParseError> {
        let mut res = Game::from_board(b);
        res.apply_uci_list(uci_list)?;
        Ok(res)
    }

    /// Returns the current position
    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the side to move
    #[inline]
    pub fn side(&self) -> Color {
        self.board.side()
    }

    /// Returns the applied moves, oldest first
    #[inline]
    pub fn history(&self) -> &[Record] {
        &self.history
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Move> + '_ {
        self.history.iter().map(|r| r.mv)
    }

    /// Returns the contents of the square `c`
    #[inline]
    pub fn get_tile(&self, c: Coord) -> Cell {
        self.board.get(c)
    }

    /// Returns the color of the piece on `c`, or `None` if the square is empty
    #[inline]
    pub fn get_color(&self, c: Coord) -> Option<Color> {
        self.board.get(c).color()
    }

    /// Returns the kind of the piece on `c`, or `None` if the square is empty
    #[inline]
    pub fn get_type(&self, c: Coord) -> Option<Piece> {
        self.board.get(c).piece()
    }

    /// Returns the legal moves of the piece on `c`
    ///
    /// Works for the pieces of both sides. Only the moves of the side to move can be applied,
    /// though.
    #[inline]
    pub fn generate_moves(&self, c: Coord) -> MoveList {
        movegen::legal::gen_from(&self.board, c)
    }

    /// Validates and applies the move `mv`
    ///
    /// On error, the game is not changed.
    pub fn apply(&mut self, mv: Move) -> Result<(), ValidateError> {
        let (mv, kind) = moves::validate(&self.board, mv)?;
        let mover = self.board.side();
        let undo = moves::make_move_unchecked(&mut self.board, mv, kind);
        self.history.push(Record {
            mv,
            captured: moves::captured(&undo, mover),
            undo,
        });
        self.self_check();
        Ok(())
    }

    /// Parses the move in coordinate notation, and applies it
    ///
    /// Returns the applied move.
    pub fn apply_uci(&mut self, s: &str) -> Result<Move, uci::ParseError> {
        let mv = Move::from_uci_legal(s, &self.board)?;
        self.apply(mv)?;
        Ok(mv)
    }

    /// Applies space-separated moves in coordinate notation
    ///
    /// On error, the moves before the offending one stay applied.
    pub fn apply_uci_list(&mut self, uci_list: &str) -> Result<(), UciParseError> {
        for (pos, token) in uci_list.split_ascii_whitespace().enumerate() {
            self.apply_uci(token)
                .map_err(|source| UciParseError { pos, source })?;
        }
        Ok(())
    }

    /// Takes back the last move and returns it
    ///
    /// Returns `None` and does nothing if there are no moves in the history.
    pub fn unmake_last(&mut self) -> Option<Move> {
        let r = self.history.pop()?;
        moves::unmake_move_unchecked(&mut self.board, r.mv, r.undo);
        self.self_check();
        Some(r.mv)
    }

    /// Returns `true` if the side to move has no legal moves
    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.board.is_game_over()
    }

    /// Returns the outcome of the game, or `None` if it's not over yet
    #[inline]
    pub fn outcome(&self) -> Option<Outcome> {
        self.board.calc_outcome()
    }

    #[inline]
    pub fn is_check(&self) -> bool {
        self.board.is_check()
    }

    /// Replaces the position and clears the history
    ///
    /// `None` stands for the initial position. Otherwise, `fen` is either a full FEN or the piece
    /// placement alone (see [`RawBoard`](crate::RawBoard) for the details). If `fen` cannot be
    /// parsed or describes an invalid position, the game is not changed.
    pub fn load_position(&mut self, fen: Option<&str>) -> Result<(), board::FenParseError> {
        let board = match fen {
            Some(fen) => Board::from_fen(fen)?,
            None => Board::initial(),
        };
        self.board = board;
        self.history.clear();
        Ok(())
    }

    /// Returns the game to the initial position
    pub fn reset(&mut self) {
        *self = Game::new();
    }

    /// Returns a wrapper to display the applied moves in coordinate notation, space-separated
    pub fn uci_list(&self) -> UciList<'_> {
        UciList(self)
    }

    #[cfg(feature = "selftest")]
    fn self_check(&self) {
        let checked = Board::try_from(*self.board.raw());
        assert_eq!(checked.as_ref(), Ok(&self.board));
        if let Ok(checked) = checked {
            for c in [Color::White, Color::Black] {
                assert_eq!(checked.king_pos(c), self.board.king_pos(c));
            }
        }
    }

    #[cfg(not(feature = "selftest"))]
    #[inline]
    fn self_check(&self) {}
}

impl Default for Game {
    fn default() -> Game {
        Game::new()
    }
}

pub struct UciList<'a>(&'a Game);

impl<'a> fmt::Display for UciList<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for (i, m) in self.0.iter().enumerate() {
            if i != 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", m)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::PromotePiece;
    use crate::strategy::{RandomStrategy, Strategy};
    use crate::types::{DrawReason, File, Rank, WinReason};
    use rand_core::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn sq(s: &str) -> Coord {
        s.parse().unwrap()
    }

    fn mv(s: &str) -> Move {
        Move::from_uci(s).unwrap()
    }

    #[test]
    fn test_start() {
        let g = Game::new();
        assert_eq!(g.side(), Color::White);
        assert!(g.is_empty());
        assert_eq!(g.get_type(Coord::from_index(0)), Some(Piece::Rook));
        assert_eq!(g.get_color(Coord::from_index(0)), Some(Color::Black));
        assert_eq!(g.get_type(Coord::from_index(63)), Some(Piece::Rook));
        assert_eq!(g.get_color(Coord::from_index(63)), Some(Color::White));
        assert_eq!(g.get_tile(sq("e4")), Cell::EMPTY);
        assert_eq!(g.get_color(sq("e4")), None);
        assert_eq!(g.get_type(sq("e4")), None);
        for c in [Color::White, Color::Black] {
            let count = Coord::iter().filter(|&p| g.get_color(p) == Some(c)).count();
            assert_eq!(count, 16);
        }
        let total: usize = Coord::iter()
            .filter(|&p| g.get_color(p) == Some(Color::White))
            .map(|p| g.generate_moves(p).len())
            .sum();
        assert_eq!(total, 20);
        assert!(!g.is_game_over());
        assert_eq!(g.outcome(), None);
    }

    #[test]
    fn test_apply_and_undo() {
        let mut g = Game::new();
        g.apply_uci_list("e2e4 d7d5").unwrap();
        let before = g.clone();

        g.apply(mv("e4d5")).unwrap();
        assert_eq!(g.get_tile(sq("d5")), Cell::from_parts(Color::White, Piece::Pawn));
        assert_eq!(g.get_tile(sq("e4")), Cell::EMPTY);
        assert_eq!(g.side(), Color::Black);
        let last = g.history().last().unwrap();
        assert_eq!(last.mv(), mv("e4d5"));
        assert_eq!(last.captured(), Cell::from_parts(Color::Black, Piece::Pawn));

        assert_eq!(g.unmake_last(), Some(mv("e4d5")));
        assert_eq!(g, before);
        assert_eq!(g.get_tile(sq("d5")), Cell::from_parts(Color::Black, Piece::Pawn));
        assert_eq!(g.uci_list().to_string(), "e2e4 d7d5");

        assert_eq!(g.unmake_last(), Some(mv("d7d5")));
        assert_eq!(g.unmake_last(), Some(mv("e2e4")));
        assert_eq!(g, Game::new());
        assert_eq!(g.unmake_last(), None);
        assert_eq!(g, Game::new());
    }

    #[test]
    fn test_rejected() {
        let mut g = Game::new();
        let before = g.clone();
        assert_eq!(g.apply(mv("e3e4")), Err(ValidateError::EmptySource));
        assert_eq!(g.apply(mv("e7e5")), Err(ValidateError::WrongSide));
        assert_eq!(g.apply(mv("e2e5")), Err(ValidateError::NotLegal));
        assert_eq!(g.apply(mv("e2e4q")), Err(ValidateError::BadPromote));
        assert_eq!(g.apply(mv("e1e2")), Err(ValidateError::NotLegal));
        assert!(matches!(
            g.apply_uci("e2e"),
            Err(uci::ParseError::Parse(uci::RawParseError::BadLength))
        ));
        assert_eq!(g, before);

        let err = Game::from_uci_list(Board::initial(), "e2e4 e7e5 e4e5").unwrap_err();
        assert_eq!(err.pos, 2);
        assert_eq!(
            err.source,
            uci::ParseError::Validate(ValidateError::NotLegal)
        );
    }

    #[test]
    fn test_promotion() {
        let mut g = Game::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();
        assert_eq!(
            g.generate_moves(sq("a7")).as_slice(),
            &[mv("a7a8q")]
        );
        g.apply(mv("a7a8")).unwrap();
        assert_eq!(g.get_tile(sq("a8")), Cell::from_parts(Color::White, Piece::Queen));
        assert_eq!(g.history()[0].mv(), mv("a7a8q"));
        g.unmake_last();
        assert_eq!(g.get_tile(sq("a7")), Cell::from_parts(Color::White, Piece::Pawn));
        assert_eq!(g.get_tile(sq("a8")), Cell::EMPTY);

        g.apply(mv("a7a8").with_promote(PromotePiece::Knight)).unwrap();
        assert_eq!(g.get_tile(sq("a8")), Cell::from_parts(Color::White, Piece::Knight));
        assert_eq!(g.board(), &Board::from_fen("N7/7k/8/8/8/8/8/K7 b - - 0 1").unwrap());
    }

    #[test]
    fn test_checkmate() {
        let mut g = Game::new();
        g.apply_uci_list("f2f3 e7e5 g2g4").unwrap();
        assert!(!g.is_game_over());
        g.apply_uci("d8h4").unwrap();
        assert!(g.is_check());
        assert!(g.is_game_over());
        assert_eq!(
            g.outcome(),
            Some(Outcome::Win {
                side: Color::Black,
                reason: WinReason::Checkmate,
            })
        );
        let total: usize = Coord::iter()
            .filter(|&p| g.get_color(p) == Some(Color::White))
            .map(|p| g.generate_moves(p).len())
            .sum();
        assert_eq!(total, 0);

        g.unmake_last();
        assert!(!g.is_game_over());
    }

    #[test]
    fn test_stalemate() {
        let mut g = Game::from_fen("k7/8/8/2Q5/8/8/8/7K w - - 0 1").unwrap();
        g.apply_uci("c5b6").unwrap();
        assert!(g.is_game_over());
        assert!(!g.is_check());
        assert_eq!(g.outcome(), Some(Outcome::Draw(DrawReason::Stalemate)));
    }

    #[test]
    fn test_enpassant() {
        let mut g = Game::new();
        g.apply_uci_list("e2e4 a7a6 e4e5 d7d5").unwrap();
        assert!(g.generate_moves(sq("e5")).find_dst(sq("d6")).is_some());
        let before = g.clone();

        g.apply_uci("e5d6").unwrap();
        assert_eq!(g.get_tile(sq("d5")), Cell::EMPTY);
        assert_eq!(g.get_tile(sq("d6")), Cell::from_parts(Color::White, Piece::Pawn));
        assert_eq!(
            g.history().last().map(Record::captured),
            Some(Cell::from_parts(Color::Black, Piece::Pawn))
        );
        g.unmake_last();
        assert_eq!(g, before);

        // The right is lost after one move
        g.apply_uci_list("h2h3 h7h6").unwrap();
        assert!(g.generate_moves(sq("e5")).find_dst(sq("d6")).is_none());
    }

    #[test]
    fn test_castling() {
        let mut g = Game::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let before = g.clone();
        g.apply_uci("e1g1").unwrap();
        assert_eq!(g.get_tile(sq("g1")), Cell::from_parts(Color::White, Piece::King));
        assert_eq!(g.get_tile(sq("f1")), Cell::from_parts(Color::White, Piece::Rook));
        assert_eq!(g.get_tile(sq("h1")), Cell::EMPTY);
        g.apply_uci("e8c8").unwrap();
        assert_eq!(g.get_tile(sq("c8")), Cell::from_parts(Color::Black, Piece::King));
        assert_eq!(g.get_tile(sq("d8")), Cell::from_parts(Color::Black, Piece::Rook));
        assert_eq!(g.board().as_fen(), "2kr3r/8/8/8/8/8/8/R4RK1 w - - 2 2");
        g.unmake_last();
        g.unmake_last();
        assert_eq!(g, before);

        // Through check
        let mut g = Game::from_fen("r3k2r/8/8/8/8/8/6r1/R3K2R w KQkq - 0 1").unwrap();
        let before = g.clone();
        assert_eq!(g.apply(mv("e1g1")), Err(ValidateError::NotLegal));
        assert_eq!(g, before);
        g.apply_uci("e1c1").unwrap();

        // Moving the rook drops the right
        let mut g = Game::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        g.apply_uci_list("h1h2 a8a7 h2h1 a7a8").unwrap();
        assert!(g.generate_moves(sq("e1")).find_dst(sq("g1")).is_none());
        assert!(g.generate_moves(sq("e1")).find_dst(sq("c1")).is_some());
        assert!(g.generate_moves(sq("e8")).find_dst(sq("c8")).is_none());
    }

    #[test]
    fn test_load_position() {
        let mut g = Game::new();
        g.apply_uci_list("e2e4 e7e5").unwrap();
        let before = g.clone();

        for bad in [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNRR",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNX",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQ1BNR",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1 extra",
            "P3k3/8/8/8/8/8/8/4K3",
        ] {
            assert!(g.load_position(Some(bad)).is_err(), "{}", bad);
            assert_eq!(g, before);
        }
        assert!(matches!(
            g.load_position(Some("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQ1BNR")),
            Err(board::FenParseError::Valid(board::ValidateError::NoKing(
                Color::White
            )))
        ));

        g.load_position(Some("4k3/8/8/8/8/8/8/R3K3")).unwrap();
        assert!(g.is_empty());
        assert_eq!(g.side(), Color::White);
        assert_eq!(
            g.get_tile(Coord::from_parts(File::A, Rank::R1)),
            Cell::from_parts(Color::White, Piece::Rook)
        );
        assert!(g.generate_moves(sq("e1")).find_dst(sq("c1")).is_some());

        g.load_position(Some("4k3/8/8/8/8/8/8/R3K3 b - - 5 40")).unwrap();
        assert_eq!(g.side(), Color::Black);
        assert_eq!(g.board().raw().move_number, 40);

        g.load_position(None).unwrap();
        assert_eq!(g, Game::new());
    }

    #[test]
    fn test_random_playouts() {
        let rng = Xoshiro256PlusPlus::seed_from_u64(0x5eed);
        let mut strategy = RandomStrategy::new(rng);
        for _ in 0..20 {
            let mut g = Game::new();
            let mut boards = vec![*g.board()];
            for _ in 0..200 {
                if g.is_game_over() {
                    assert!(g.outcome().is_some());
                    break;
                }
                let before = *g.board();
                let mv = strategy.select(g.board()).unwrap();
                g.apply(mv).unwrap();
                assert_eq!(Board::try_from(*g.board().raw()), Ok(*g.board()));

                g.unmake_last();
                assert_eq!(*g.board(), before);
                g.apply(mv).unwrap();
                boards.push(*g.board());
            }
            while let Some(b) = boards.pop() {
                assert_eq!(*g.board(), b);
                g.unmake_last();
            }
            assert_eq!(g, Game::new());
        }
    }
}
