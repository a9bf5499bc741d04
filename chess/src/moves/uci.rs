//! Moves in coordinate notation
//!
//! A move is written as its source and destination squares, followed by the promotion piece if
//! any: `e2e4`, `e1g1` (castling), `e7e8q`. This is the same form as used by UCI.

use super::base::{Move, PromotePiece, ValidateError};
use crate::board::Board;
use crate::types::{Coord, CoordParseError};

use std::str::FromStr;

use thiserror::Error;

/// Error parsing a move from coordinate notation
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum RawParseError {
    /// Bad string length
    #[error("bad string length")]
    BadLength,
    /// Bad source square
    #[error("bad source: {0}")]
    BadSrc(CoordParseError),
    /// Bad destination square
    #[error("bad destination: {0}")]
    BadDst(CoordParseError),
    /// Bad promote character
    #[error("bad promote char {0:?}")]
    BadPromote(char),
}

/// Error parsing a move from coordinate notation and checking it against the position
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ParseError {
    /// Error parsing move
    #[error("cannot parse move: {0}")]
    Parse(#[from] RawParseError),
    /// Move is not legal
    #[error("invalid move: {0}")]
    Validate(#[from] ValidateError),
}

impl FromStr for Move {
    type Err = RawParseError;

    fn from_str(s: &str) -> Result<Move, Self::Err> {
        if !s.is_ascii() || !matches!(s.len(), 4 | 5) {
            return Err(RawParseError::BadLength);
        }
        let src = Coord::from_str(&s[0..2]).map_err(RawParseError::BadSrc)?;
        let dst = Coord::from_str(&s[2..4]).map_err(RawParseError::BadDst)?;
        let mv = Move::new(src, dst);
        match s.as_bytes().get(4) {
            Some(&b) => PromotePiece::from_char(b as char)
                .map(|p| mv.with_promote(p))
                .ok_or(RawParseError::BadPromote(b as char)),
            None => Ok(mv),
        }
    }
}

impl Move {
    /// Parses the move from coordinate notation, without looking at any position
    #[inline]
    pub fn from_uci(s: &str) -> Result<Move, RawParseError> {
        Move::from_str(s)
    }

    /// Parses the move from coordinate notation and checks that it's legal in `b`
    ///
    /// A pawn move onto the last rank without promotion char is taken as promotion to queen,
    /// and the returned move has `promote` filled in.
    pub fn from_uci_legal(s: &str, b: &Board) -> Result<Move, ParseError> {
        let mv = Move::from_str(s)?;
        let (mv, _) = super::base::validate(b, mv)?;
        Ok(mv)
    }
}
