//! Core chess types

pub use tilechess_base::types::{
    opposite_color, tile_column, tile_row, CastlingRights, CastlingRightsParseError,
    CastlingSide, Cell, CellParseError, Color, ColorParseError, Coord, CoordError,
    CoordParseError, File, Piece, Rank,
};

use std::fmt;

/// Reason for a game won by one of the sides
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum WinReason {
    Checkmate,
}

/// Reason for a drawn game
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DrawReason {
    Stalemate,
}

/// Result of a finished game
///
/// The engine only detects the outcomes which follow from the rules alone, i.e. the side to
/// move has no legal moves. Resignation, agreed draws and clocks belong to the caller.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Outcome {
    Win { side: Color, reason: WinReason },
    Draw(DrawReason),
}

impl Outcome {
    pub fn winner(&self) -> Option<Color> {
        match *self {
            Self::Win { side, .. } => Some(side),
            Self::Draw(_) => None,
        }
    }

    pub fn is_checkmate(&self) -> bool {
        matches!(
            *self,
            Self::Win {
                reason: WinReason::Checkmate,
                ..
            }
        )
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match *self {
            Self::Win {
                side: Color::White,
                reason: WinReason::Checkmate,
            } => write!(f, "White wins by checkmate"),
            Self::Win {
                side: Color::Black,
                reason: WinReason::Checkmate,
            } => write!(f, "Black wins by checkmate"),
            Self::Draw(DrawReason::Stalemate) => write!(f, "draw by stalemate"),
        }
    }
}
