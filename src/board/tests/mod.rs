//! Board module tests.
//!
//! - `perft.rs` - move generation counts, standard and Chess960
//! - `draw.rs` - repetition, fifty-move rule and insufficient material
//! - `make_unmake.rs` - make/unmake and castling mechanics
//! - `proptest.rs` - property-based tests over random games

mod make_unmake;
mod perft;
mod proptest;
