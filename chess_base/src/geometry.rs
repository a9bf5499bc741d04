use crate::types::{Color, Rank};

/// Rank on which the king and rooks of color `c` start
pub const fn castling_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R1,
        Color::Black => Rank::R8,
    }
}

/// Rank from which pawns of color `c` may advance two squares
pub const fn double_move_src_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R2,
        Color::Black => Rank::R7,
    }
}

pub const fn double_move_dst_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R4,
        Color::Black => Rank::R5,
    }
}

/// Rank on which pawns of color `c` promote
pub const fn promote_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R8,
        Color::Black => Rank::R1,
    }
}

/// Rank of an enemy pawn that can be captured en passant by color `c`
pub const fn enpassant_src_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R5,
        Color::Black => Rank::R4,
    }
}

/// Rank on which a pawn of color `c` lands after capturing en passant
pub const fn enpassant_dst_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R6,
        Color::Black => Rank::R3,
    }
}

/// Row delta of a pawn step for color `c`
///
/// Rows grow towards the first rank, so White pawns move by `-1`.
pub const fn pawn_forward_delta(c: Color) -> isize {
    match c {
        Color::White => -1,
        Color::Black => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Coord, File};

    #[test]
    fn test_pawn_geometry() {
        for color in [Color::White, Color::Black] {
            let src = Coord::from_parts(File::E, double_move_src_rank(color));
            let delta = pawn_forward_delta(color);
            let dst = src.try_shift(0, 2 * delta).unwrap();
            assert_eq!(dst.rank(), double_move_dst_rank(color));

            let ep_src = Coord::from_parts(File::D, enpassant_src_rank(color));
            let ep_dst = ep_src.try_shift(0, delta).unwrap();
            assert_eq!(ep_dst.rank(), enpassant_dst_rank(color));

            assert_eq!(promote_rank(color), castling_rank(color.inv()));
        }
    }
}
