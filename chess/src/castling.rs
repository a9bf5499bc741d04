use crate::bitboard::Bitboard;
use crate::geometry;
use crate::types::{CastlingSide, Color, Coord, File};

const fn on_back_rank(c: Color, x: u64) -> Bitboard {
    Bitboard::from_raw(match c {
        Color::White => x << 56,
        Color::Black => x,
    })
}

/// Squares between the king and the rook, which must be empty
#[inline]
pub const fn pass(c: Color, s: CastlingSide) -> Bitboard {
    on_back_rank(
        c,
        match s {
            CastlingSide::King => 0x60,
            CastlingSide::Queen => 0x0e,
        },
    )
}

/// Squares the king stands on, crosses or lands on, which must not be attacked
#[inline]
pub const fn safe(c: Color, s: CastlingSide) -> Bitboard {
    on_back_rank(
        c,
        match s {
            CastlingSide::King => 0x70,
            CastlingSide::Queen => 0x1c,
        },
    )
}

/// Initial squares of the king and the rook
///
/// A move from or onto any of them drops the corresponding right.
#[inline]
pub const fn srcs(c: Color, s: CastlingSide) -> Bitboard {
    on_back_rank(
        c,
        match s {
            CastlingSide::King => 0x90,
            CastlingSide::Queen => 0x11,
        },
    )
}

pub const ALL_SRCS: Bitboard = Bitboard::from_raw(0x91 | (0x91 << 56));

pub const fn king_src(c: Color) -> Coord {
    Coord::from_parts(File::E, geometry::castling_rank(c))
}

pub const fn king_dst(c: Color, s: CastlingSide) -> Coord {
    let file = match s {
        CastlingSide::King => File::G,
        CastlingSide::Queen => File::C,
    };
    Coord::from_parts(file, geometry::castling_rank(c))
}

pub const fn rook_src(c: Color, s: CastlingSide) -> Coord {
    let file = match s {
        CastlingSide::King => File::H,
        CastlingSide::Queen => File::A,
    };
    Coord::from_parts(file, geometry::castling_rank(c))
}

pub const fn rook_dst(c: Color, s: CastlingSide) -> Coord {
    let file = match s {
        CastlingSide::King => File::F,
        CastlingSide::Queen => File::D,
    };
    Coord::from_parts(file, geometry::castling_rank(c))
}
