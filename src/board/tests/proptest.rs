//! Property-based tests using proptest.

use proptest::prelude::*;
use rand::prelude::*;
use rand::Rng;

use crate::board::{Board, Move, StateInfo};

fn random_walk(seed: u64, num_moves: usize) -> (Board, Vec<(Move, StateInfo)>) {
    let mut board = Board::new();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut played = Vec::new();
    for _ in 0..num_moves {
        let moves = board.generate_moves();
        if moves.is_empty() {
            break;
        }
        let mv = moves[rng.gen_range(0..moves.len())];
        let info = board.make_move(mv);
        played.push((mv, info));
    }
    (board, played)
}

proptest! {
    /// make_move followed by unmake_move restores the board exactly
    #[test]
    fn prop_make_unmake_restores_state(seed in any::<u64>(), num_moves in 1..=30usize) {
        let initial = Board::new();
        let (mut board, mut played) = random_walk(seed, num_moves);
        while let Some((mv, info)) = played.pop() {
            board.unmake_move(mv, info);
        }
        prop_assert_eq!(board.hash(), initial.hash());
        prop_assert_eq!(board.to_fen(), initial.to_fen());
    }

    /// The incrementally updated key always matches a full recomputation
    #[test]
    fn prop_hash_consistency(seed in any::<u64>(), num_moves in 1..=30usize) {
        let (board, _) = random_walk(seed, num_moves);
        prop_assert_eq!(board.hash(), board.compute_hash());
    }

    /// Reparsing the FEN of any reachable position yields the same key
    #[test]
    fn prop_fen_roundtrip(seed in any::<u64>(), num_moves in 1..=30usize) {
        let (board, _) = random_walk(seed, num_moves);
        let reparsed = Board::from_fen(&board.to_fen(), false).unwrap();
        prop_assert_eq!(reparsed.hash(), board.hash());
        prop_assert_eq!(reparsed.to_fen(), board.to_fen());
    }
}
