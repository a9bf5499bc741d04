//! Raw attack patterns
//!
//! These functions describe which squares a piece standing on a given square attacks, regardless
//! of whose turn it is and of whether the move would expose its own king. Sliding pieces walk
//! their rays over the cell array and stop on the first occupied square, which is included.

use crate::bitboard::Bitboard;
use crate::geometry;
use crate::types::{Cell, Color, Coord};

const KNIGHT_OFFSETS: [(isize, isize); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_OFFSETS: [(isize, isize); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

pub(crate) const DIAG_DIRS: [(isize, isize); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];
pub(crate) const LINE_DIRS: [(isize, isize); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

fn leaper(coord: Coord, offsets: &[(isize, isize)]) -> Bitboard {
    offsets
        .iter()
        .filter_map(|&(df, dr)| coord.try_shift(df, dr))
        .collect()
}

fn slider(coord: Coord, dirs: &[(isize, isize)], cells: &[Cell; 64]) -> Bitboard {
    let mut res = Bitboard::EMPTY;
    for &(df, dr) in dirs {
        let mut cur = coord;
        while let Some(next) = cur.try_shift(df, dr) {
            res.set(next);
            if cells[next.index()].is_occupied() {
                break;
            }
            cur = next;
        }
    }
    res
}

#[inline]
pub fn knight(coord: Coord) -> Bitboard {
    leaper(coord, &KNIGHT_OFFSETS)
}

#[inline]
pub fn king(coord: Coord) -> Bitboard {
    leaper(coord, &KING_OFFSETS)
}

/// Squares attacked by a pawn of color `color` standing on `coord`
///
/// Only diagonal captures are attacks. Forward pushes are generated separately.
#[inline]
pub fn pawn(color: Color, coord: Coord) -> Bitboard {
    let forward = geometry::pawn_forward_delta(color);
    leaper(coord, &[(-1, forward), (1, forward)])
}

#[inline]
pub fn bishop(coord: Coord, cells: &[Cell; 64]) -> Bitboard {
    slider(coord, &DIAG_DIRS, cells)
}

#[inline]
pub fn rook(coord: Coord, cells: &[Cell; 64]) -> Bitboard {
    slider(coord, &LINE_DIRS, cells)
}

#[inline]
pub fn queen(coord: Coord, cells: &[Cell; 64]) -> Bitboard {
    bishop(coord, cells) | rook(coord, cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{File, Piece, Rank};

    fn sq(s: &str) -> Coord {
        s.parse().unwrap()
    }

    #[test]
    fn test_leapers() {
        assert_eq!(knight(sq("a1")).len(), 2);
        assert_eq!(knight(sq("e4")).len(), 8);
        assert!(knight(sq("g1")).has(sq("f3")));
        assert!(knight(sq("g1")).has(sq("h3")));
        assert!(knight(sq("g1")).has(sq("e2")));
        assert_eq!(king(sq("h8")).len(), 3);
        assert_eq!(king(sq("d4")).len(), 8);
    }

    #[test]
    fn test_pawn() {
        let white = pawn(Color::White, sq("e4"));
        assert_eq!(white, Bitboard::EMPTY.with(sq("d5")).with(sq("f5")));
        let black = pawn(Color::Black, sq("a7"));
        assert_eq!(black, Bitboard::from_coord(sq("b6")));
    }

    #[test]
    fn test_sliders() {
        let mut cells = [Cell::EMPTY; 64];
        assert_eq!(queen(sq("d4"), &cells).len(), 27);
        assert_eq!(rook(sq("a1"), &cells).len(), 14);
        assert_eq!(bishop(sq("a1"), &cells).len(), 7);

        cells[sq("d6").index()] = Cell::from_parts(Color::Black, Piece::Pawn);
        cells[sq("f4").index()] = Cell::from_parts(Color::White, Piece::Pawn);
        let r = rook(sq("d4"), &cells);
        assert!(r.has(sq("d5")));
        assert!(r.has(sq("d6")));
        assert!(!r.has(sq("d7")));
        assert!(r.has(sq("f4")));
        assert!(!r.has(sq("g4")));
        assert_eq!(
            r.into_iter()
                .filter(|c| c.file() == File::D && c.rank() > Rank::R4)
                .count(),
            3
        );
    }
}
