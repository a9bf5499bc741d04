//! Move selection for a computer opponent
//!
//! The rules engine never picks moves by itself. A strategy looks at the position and returns
//! one of the legal moves, and the caller applies it.

use crate::board::Board;
use crate::game::Game;
use crate::movegen;
use crate::moves::Move;

use rand::seq::SliceRandom;
use rand::Rng;

/// Chooses a move in the given position
pub trait Strategy {
    /// Returns the move to play, or `None` if there are no legal moves
    ///
    /// The returned move must be legal in `board`.
    fn select(&mut self, board: &Board) -> Option<Move>;

    /// Selects a move for the side to move in `game` and applies it
    fn play(&mut self, game: &mut Game) -> Option<Move> {
        let mv = self.select(game.board())?;
        game.apply(mv).ok()?;
        Some(mv)
    }
}

/// Picks a legal move uniformly at random
#[derive(Debug, Clone)]
pub struct RandomStrategy<R> {
    rng: R,
}

impl<R: Rng> RandomStrategy<R> {
    pub fn new(rng: R) -> Self {
        RandomStrategy { rng }
    }

    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl<R: Rng> Strategy for RandomStrategy<R> {
    fn select(&mut self, board: &Board) -> Option<Move> {
        movegen::legal::gen_all(board)
            .choose(&mut self.rng)
            .copied()
    }
}

/// Always picks the first legal move in generation order
///
/// Useful for reproducible games without a random generator.
#[derive(Debug, Default, Copy, Clone)]
pub struct FirstMove;

impl Strategy for FirstMove {
    fn select(&mut self, board: &Board) -> Option<Move> {
        movegen::legal::gen_all(board).first().copied()
    }
}
