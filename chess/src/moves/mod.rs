//! Moves and their application to the board

mod base;

pub mod uci;

pub use base::{Move, MoveKind, PromotePiece, RawUndo, ValidateError};

pub(crate) use base::{captured, make_move_unchecked, unmake_move_unchecked, validate};
