//! Chess board representation and game rules.
//!
//! Uses bitboards for move generation and a mailbox for piece lookup.
//! Supports full chess rules including castling (standard and Chess960),
//! en passant, promotions, repetition and the fifty-move rule.
//!
//! # Example
//! ```
//! use chess_analysis::board::Board;
//!
//! let mut board = Board::new();
//! let moves = board.generate_moves();
//! assert_eq!(moves.len(), 20);
//! ```

mod attack_tables;
mod error;
mod eval;
mod fen;
mod make_unmake;
mod movegen;
mod state;
mod types;

#[cfg(test)]
mod tests;

pub use error::{FenError, SquareError};
pub use eval::{PAWN_VALUE_EG, PAWN_VALUE_MG};
pub use fen::START_FEN;
pub use state::{Board, StateInfo};
pub use types::{
    Bitboard, BitboardIter, CastlingRights, Color, Move, MoveKind, MoveList, Piece, Square, MAX_PLY,
};

pub(crate) use state::castling_targets;

/// Build every static table used by move generation, hashing and evaluation.
pub(crate) fn init() {
    attack_tables::init();
    eval::init();
}

/// Count leaf nodes of the legal move tree to `depth`
pub fn perft(board: &mut Board, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = board.generate_moves();
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut nodes = 0;
    for &mv in &moves {
        let info = board.make_move(mv);
        nodes += perft(board, depth - 1);
        board.unmake_move(mv, info);
    }
    nodes
}
