//! Chess rules and game state engine
//!
//! The crate owns the authoritative position of a chess game: it tells which piece stands on each
//! square, which moves the piece may make, applies and takes back moves, and reports when the game
//! is over. Squares are indexed from 0 (a8) to 63 (h1), so an interface layer can map its tiles
//! onto [`Coord`] directly.
//!
//! # Example
//!
//! ```
//! use tilechess::{Coord, Game, Move};
//!
//! let mut game = Game::new();
//! let e2: Coord = "e2".parse().unwrap();
//! let moves = game.generate_moves(e2);
//! assert_eq!(moves.len(), 2);
//!
//! game.apply(moves[1]).unwrap();
//! game.apply(Move::from_uci("e7e5").unwrap()).unwrap();
//! assert_eq!(game.len(), 2);
//!
//! game.unmake_last();
//! assert_eq!(game.len(), 1);
//! assert!(!game.is_game_over());
//! ```

pub mod attack;
pub mod board;
pub mod castling;
pub mod game;
pub mod movegen;
pub mod moves;
pub mod strategy;
pub mod types;

pub use tilechess_base::{bitboard, geometry};

pub use bitboard::Bitboard;
pub use board::{Board, RawBoard};
pub use game::{Game, Record};
pub use movegen::MoveList;
pub use moves::{Move, PromotePiece};
pub use strategy::{RandomStrategy, Strategy};
pub use types::{
    tile_column, tile_row, CastlingRights, CastlingSide, Cell, Color, Coord, DrawReason, File,
    Outcome, Piece, Rank, WinReason,
};
