//! Board engine for the 2048 sliding-tile game.
//!
//! [`field::Field`] is an immutable square board: every move yields a new
//! value. [`game::Game`] wraps it into a session with score accounting and
//! win/loss flags. All randomness comes from a caller-supplied [`rand::Rng`].

pub mod field;
pub mod game;
pub mod rules;
