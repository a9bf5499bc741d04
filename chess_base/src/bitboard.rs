//! Sets of squares
//!
//! The engine keeps its position in a flat array of cells, so bitboards are not the primary
//! storage. They are used for attack maps and for bulk checks over the whole board.

use crate::types::{Coord, Rank};
use derive_more::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};
use std::fmt;

/// Set of squares, bit `i` stands for the square with index `i`
#[derive(
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    BitAnd,
    BitAndAssign,
    BitOr,
    BitOrAssign,
    BitXor,
    BitXorAssign,
    Not,
)]
pub struct Bitboard(u64);

impl Bitboard {
    pub const EMPTY: Bitboard = Bitboard(0);
    pub const FULL: Bitboard = Bitboard(!0);

    pub const fn from_raw(val: u64) -> Bitboard {
        Bitboard(val)
    }

    pub const fn from_coord(coord: Coord) -> Bitboard {
        Bitboard(1_u64 << coord.index())
    }

    /// Returns all the squares on rank `r`
    pub const fn rank(r: Rank) -> Bitboard {
        Bitboard(0xff_u64 << (r.index() * 8))
    }

    pub const fn with(self, coord: Coord) -> Bitboard {
        Bitboard(self.0 | (1_u64 << coord.index()))
    }

    pub const fn without(self, coord: Coord) -> Bitboard {
        Bitboard(self.0 & !(1_u64 << coord.index()))
    }

    pub fn set(&mut self, coord: Coord) {
        *self = self.with(coord);
    }

    pub fn unset(&mut self, coord: Coord) {
        *self = self.without(coord);
    }

    pub const fn has(&self, coord: Coord) -> bool {
        ((self.0 >> coord.index()) & 1) != 0
    }

    pub const fn as_raw(&self) -> u64 {
        self.0
    }

    pub const fn len(&self) -> u32 {
        self.0.count_ones()
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_nonempty(&self) -> bool {
        self.0 != 0
    }

    pub fn first(&self) -> Option<Coord> {
        self.into_iter().next()
    }
}

impl From<Bitboard> for u64 {
    fn from(b: Bitboard) -> u64 {
        b.0
    }
}

impl From<u64> for Bitboard {
    fn from(u: u64) -> Bitboard {
        Bitboard(u)
    }
}

impl FromIterator<Coord> for Bitboard {
    fn from_iter<I: IntoIterator<Item = Coord>>(iter: I) -> Self {
        iter.into_iter().fold(Bitboard::EMPTY, Bitboard::with)
    }
}

impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "Bitboard({})", self)
    }
}

/// Formats the set rank by rank from the eighth one, `1` for members
impl fmt::Display for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for row in 0..8 {
            if row != 0 {
                write!(f, "/")?;
            }
            for col in 0..8 {
                let bit = (self.0 >> (row * 8 + col)) & 1;
                write!(f, "{}", bit)?;
            }
        }
        Ok(())
    }
}

pub struct Iter(u64);

impl Iterator for Iter {
    type Item = Coord;

    fn next(&mut self) -> Option<Coord> {
        if self.0 == 0 {
            return None;
        }
        let bit = self.0.trailing_zeros();
        self.0 &= self.0.wrapping_sub(1_u64);
        Some(Coord::from_index(bit as usize))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.0.count_ones() as usize;
        (len, Some(len))
    }
}

impl ExactSizeIterator for Iter {}

impl IntoIterator for Bitboard {
    type Item = Coord;
    type IntoIter = Iter;

    fn into_iter(self) -> Iter {
        Iter(self.0)
    }
}
