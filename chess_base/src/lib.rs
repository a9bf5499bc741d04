//! # Base types for tilechess
//!
//! This is an auxiliary crate for `tilechess`, which contains the square and piece codec and
//! a few helpers over it. It is kept separate so that the encoding stays the same for the rules
//! engine and for any presentation layer that only needs to name squares and pieces.
//!
//! Normally you don't want to use this crate directly. Use `tilechess` instead.

pub mod bitboard;
pub mod geometry;
pub mod types;
