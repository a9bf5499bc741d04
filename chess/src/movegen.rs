//! Move generation
//!
//! Moves are generated per origin square. Pseudo-legal ("semilegal") moves follow the movement
//! rules of the piece, while legal moves additionally don't leave the mover's king under attack.
//! Legality is checked by making the move on a copy of the board.

use crate::attack;
use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::castling;
use crate::geometry;
use crate::moves::{self, Move, MoveKind, PromotePiece};
use crate::types::{CastlingSide, Cell, Color, Coord, Piece};

use std::convert::Infallible;
use std::ops::Deref;
use std::slice;

use arrayvec::ArrayVec;

/// Maximum number of moves from one square
///
/// This is the number of squares attacked by a queen in the center of an empty board.
pub const MAX_MOVES_FROM: usize = 27;

/// Returns `true` if the square `coord` is attacked by any piece of color `color`
pub fn is_cell_attacked(b: &Board, coord: Coord, color: Color) -> bool {
    let cells = b.cells();
    let holds = |sq: Coord, p: Piece| cells[sq.index()] == Cell::from_parts(color, p);

    // Here, we use black attack map for white, as we need to trace the attack from destination piece,
    // not from the source one
    attack::pawn(color.inv(), coord)
        .into_iter()
        .any(|sq| holds(sq, Piece::Pawn))
        || attack::knight(coord)
            .into_iter()
            .any(|sq| holds(sq, Piece::Knight))
        || attack::king(coord)
            .into_iter()
            .any(|sq| holds(sq, Piece::King))
        || attack::bishop(coord, cells)
            .into_iter()
            .any(|sq| holds(sq, Piece::Bishop) || holds(sq, Piece::Queen))
        || attack::rook(coord, cells)
            .into_iter()
            .any(|sq| holds(sq, Piece::Rook) || holds(sq, Piece::Queen))
}

/// Returns all the pieces of color `color` which attack the square `coord`
pub fn cell_attackers(b: &Board, coord: Coord, color: Color) -> Bitboard {
    let cells = b.cells();
    let holds = |sq: &Coord, p: Piece| cells[sq.index()] == Cell::from_parts(color, p);

    let pawns = attack::pawn(color.inv(), coord)
        .into_iter()
        .filter(|sq| holds(sq, Piece::Pawn));
    let knights = attack::knight(coord)
        .into_iter()
        .filter(|sq| holds(sq, Piece::Knight));
    let kings = attack::king(coord)
        .into_iter()
        .filter(|sq| holds(sq, Piece::King));
    let diag = attack::bishop(coord, cells)
        .into_iter()
        .filter(|sq| holds(sq, Piece::Bishop) || holds(sq, Piece::Queen));
    let line = attack::rook(coord, cells)
        .into_iter()
        .filter(|sq| holds(sq, Piece::Rook) || holds(sq, Piece::Queen));
    pawns.chain(knights).chain(kings).chain(diag).chain(line).collect()
}

trait MaybeMovePush {
    type Err;

    fn push(&mut self, m: Move) -> Result<(), Self::Err>;
}

/// List of moves from a single square
///
/// It never holds more than [`MAX_MOVES_FROM`] moves, so it lives on the stack.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct MoveList(ArrayVec<Move, MAX_MOVES_FROM>);

impl Deref for MoveList {
    type Target = ArrayVec<Move, MAX_MOVES_FROM>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for MoveList {
    type Item = Move;
    type IntoIter = arrayvec::IntoIter<Move, MAX_MOVES_FROM>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl MoveList {
    pub fn new() -> MoveList {
        MoveList(ArrayVec::new())
    }

    /// Returns the move to `dst`, if any
    pub fn find_dst(&self, dst: Coord) -> Option<Move> {
        self.0.iter().copied().find(|m| m.dst() == dst)
    }
}

pub trait MovePush {
    fn push(&mut self, m: Move);
}

impl MovePush for MoveList {
    fn push(&mut self, m: Move) {
        self.0.push(m);
    }
}

impl MovePush for Vec<Move> {
    fn push(&mut self, m: Move) {
        self.push(m);
    }
}

impl<T: MovePush> MaybeMovePush for T {
    type Err = Infallible;

    fn push(&mut self, m: Move) -> Result<(), Self::Err> {
        <Self as MovePush>::push(self, m);
        Ok(())
    }
}

/// Passes through only the moves after which the mover's king is not attacked
///
/// `board` must have the mover's color as the side to move.
struct LegalFilter<'a, P> {
    board: Board,
    inner: &'a mut P,
}

impl<'a, P: MaybeMovePush> LegalFilter<'a, P> {
    fn new(board: Board, inner: &'a mut P) -> Self {
        Self { board, inner }
    }
}

impl<'a, P: MaybeMovePush> MaybeMovePush for LegalFilter<'a, P> {
    type Err = P::Err;

    fn push(&mut self, mv: Move) -> Result<(), Self::Err> {
        let kind = match MoveKind::classify(&self.board, mv.src(), mv.dst()) {
            Some(kind) => kind,
            None => return Ok(()),
        };
        let mut next = self.board;
        moves::make_move_unchecked(&mut next, mv, kind);
        match next.is_opponent_king_attacked() {
            false => self.inner.push(mv),
            true => Ok(()),
        }
    }
}

struct ErrOnFirst;

impl MaybeMovePush for ErrOnFirst {
    type Err = ();

    fn push(&mut self, _mv: Move) -> Result<(), ()> {
        Err(())
    }
}

/// Generates pseudo-legal moves for the side to move of `board`
struct MoveGenImpl<'a, P> {
    board: &'a Board,
    dst: &'a mut P,
    color: Color,
}

impl<'a, P: MaybeMovePush> MoveGenImpl<'a, P> {
    fn new(board: &'a Board, dst: &'a mut P) -> Self {
        MoveGenImpl {
            board,
            dst,
            color: board.side(),
        }
    }

    fn add_move(&mut self, src: Coord, dst: Coord) -> Result<(), P::Err> {
        self.dst.push(Move::new(src, dst))
    }

    fn add_pawn_move(&mut self, src: Coord, dst: Coord) -> Result<(), P::Err> {
        if dst.rank() == geometry::promote_rank(self.color) {
            self.dst
                .push(Move::new(src, dst).with_promote(PromotePiece::default()))
        } else {
            self.add_move(src, dst)
        }
    }

    fn gen_pawn(&mut self, src: Coord) -> Result<(), P::Err> {
        let c = self.color;
        let forward = geometry::pawn_forward_delta(c);

        if let Some(one) = src.try_shift(0, forward) {
            if self.board.get(one).is_empty() {
                self.add_pawn_move(src, one)?;
                if src.rank() == geometry::double_move_src_rank(c) {
                    if let Some(two) = one.try_shift(0, forward) {
                        if self.board.get(two).is_empty() {
                            self.add_move(src, two)?;
                        }
                    }
                }
            }
        }

        let ep_dest = self.board.raw().ep_dest();
        for dst in attack::pawn(c, src) {
            let target = self.board.get(dst);
            if target.is_of(c.inv()) && target.piece() != Some(Piece::King) {
                self.add_pawn_move(src, dst)?;
            } else if Some(dst) == ep_dest {
                // We assume that the cell behind the pawn that made double move is empty, so don't check it
                self.add_move(src, dst)?;
            }
        }
        Ok(())
    }

    fn gen_attacks(&mut self, src: Coord, attack: Bitboard) -> Result<(), P::Err> {
        // Kings are attacked, but never captured
        let own = self.color;
        for dst in attack {
            let target = self.board.get(dst);
            if !target.is_of(own) && target.piece() != Some(Piece::King) {
                self.add_move(src, dst)?;
            }
        }
        Ok(())
    }

    fn gen_castling(&mut self) -> Result<(), P::Err> {
        let c = self.color;
        let rook = Cell::from_parts(c, Piece::Rook);
        for side in [CastlingSide::King, CastlingSide::Queen] {
            if !self.board.raw().castling.has(c, side)
                || self.board.get(castling::rook_src(c, side)) != rook
            {
                continue;
            }
            let occupied = castling::pass(c, side)
                .into_iter()
                .any(|p| self.board.get(p).is_occupied());
            if occupied {
                continue;
            }
            let attacked = castling::safe(c, side)
                .into_iter()
                .any(|p| is_cell_attacked(self.board, p, c.inv()));
            if attacked {
                continue;
            }
            self.add_move(castling::king_src(c), castling::king_dst(c, side))?;
        }
        Ok(())
    }

    fn gen_from(&mut self, src: Coord) -> Result<(), P::Err> {
        let cell = self.board.get(src);
        if !cell.is_of(self.color) {
            return Ok(());
        }
        let cells = self.board.cells();
        match cell.piece() {
            Some(Piece::Pawn) => self.gen_pawn(src),
            Some(Piece::Knight) => self.gen_attacks(src, attack::knight(src)),
            Some(Piece::Bishop) => self.gen_attacks(src, attack::bishop(src, cells)),
            Some(Piece::Rook) => self.gen_attacks(src, attack::rook(src, cells)),
            Some(Piece::Queen) => self.gen_attacks(src, attack::queen(src, cells)),
            Some(Piece::King) => {
                self.gen_attacks(src, attack::king(src))?;
                if src == castling::king_src(self.color) {
                    self.gen_castling()?;
                }
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn gen_all(&mut self) -> Result<(), P::Err> {
        for src in Coord::iter() {
            self.gen_from(src)?;
        }
        Ok(())
    }
}

/// Pseudo-legal move generation
///
/// The moves follow the movement rules, but may leave the mover's king under attack.
pub mod semilegal {
    use super::{MoveGenImpl, MoveList, MovePush};
    use crate::board::Board;
    use crate::moves::Move;
    use crate::types::Coord;

    /// Adds the pseudo-legal moves of the piece on `src` to `dst`
    ///
    /// The piece may be of either color. For the side not to move, enpassant is never generated.
    pub fn gen_from_into<P: MovePush>(b: &Board, src: Coord, dst: &mut P) {
        let color = match b.get(src).color() {
            Some(color) => color,
            None => return,
        };
        let view = b.with_side(color);
        let _ = MoveGenImpl::new(&view, dst).gen_from(src);
    }

    pub fn gen_from(b: &Board, src: Coord) -> MoveList {
        let mut res = MoveList::new();
        gen_from_into(b, src, &mut res);
        res
    }

    /// Adds all the pseudo-legal moves of the side to move to `dst`
    pub fn gen_all_into<P: MovePush>(b: &Board, dst: &mut P) {
        let _ = MoveGenImpl::new(b, dst).gen_all();
    }

    pub fn gen_all(b: &Board) -> Vec<Move> {
        let mut res = Vec::new();
        gen_all_into(b, &mut res);
        res
    }
}

/// Legal move generation
pub mod legal {
    use super::{LegalFilter, MoveGenImpl, MoveList, MovePush};
    use crate::board::Board;
    use crate::moves::Move;
    use crate::types::Coord;

    /// Adds the legal moves of the piece on `src` to `dst`
    ///
    /// The piece may be of either color. For the side not to move, the moves are those it would
    /// have if it were its turn, except enpassant.
    pub fn gen_from_into<P: MovePush>(b: &Board, src: Coord, dst: &mut P) {
        let color = match b.get(src).color() {
            Some(color) => color,
            None => return,
        };
        let view = b.with_side(color);
        let mut p = LegalFilter::new(view, dst);
        let _ = MoveGenImpl::new(&view, &mut p).gen_from(src);
    }

    /// Returns the legal moves of the piece on `src`
    ///
    /// The result is empty if `src` is empty. Promotions appear once, with
    /// [`PromotePiece::Queen`](crate::moves::PromotePiece::Queen).
    pub fn gen_from(b: &Board, src: Coord) -> MoveList {
        let mut res = MoveList::new();
        gen_from_into(b, src, &mut res);
        res
    }

    /// Adds all the legal moves of the side to move to `dst`
    pub fn gen_all_into<P: MovePush>(b: &Board, dst: &mut P) {
        let mut p = LegalFilter::new(*b, dst);
        let _ = MoveGenImpl::new(b, &mut p).gen_all();
    }

    /// Returns all the legal moves of the side to move
    pub fn gen_all(b: &Board) -> Vec<Move> {
        let mut res = Vec::new();
        gen_all_into(b, &mut res);
        res
    }
}

/// Returns `true` if the side to move has at least one legal move
///
/// Stops on the first legal move found.
pub fn has_legal_moves(b: &Board) -> bool {
    let mut err_on_first = ErrOnFirst;
    let mut p = LegalFilter::new(*b, &mut err_on_first);
    MoveGenImpl::new(b, &mut p).gen_all().is_err()
}
