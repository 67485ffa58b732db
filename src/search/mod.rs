//! Alpha-beta search with iterative deepening.
//!
//! Features:
//! - Iterative deepening with multi-PV and aspiration windows
//! - Principal variation search with null move pruning and LMR
//! - Quiescence search with check evasions
//! - Move ordering (TT move, MVV-LVA, killers, history)
//! - Mate distance pruning and contempt-aware draw scores
//! - Tablebase probing inside the tree
//! - Lazy SMP over a persistent thread pool

mod ordering;
mod pool;
mod worker;

use std::time::Instant;

use crate::board::{Move, MAX_PLY};

pub use pool::ThreadPool;
pub use worker::Worker;

pub const VALUE_ZERO: i32 = 0;
pub const VALUE_DRAW: i32 = 0;
pub const VALUE_MATE: i32 = 32000;
pub const VALUE_INFINITE: i32 = 32001;
pub const VALUE_NONE: i32 = 32002;

/// Scores at or beyond this are mate scores
pub const VALUE_MATE_IN_MAX_PLY: i32 = VALUE_MATE - MAX_PLY as i32;
pub const VALUE_MATED_IN_MAX_PLY: i32 = -VALUE_MATE_IN_MAX_PLY;

/// Score for delivering mate `ply` half-moves from the root
#[inline]
#[must_use]
pub const fn mate_in(ply: usize) -> i32 {
    VALUE_MATE - ply as i32
}

/// Score for being mated `ply` half-moves from the root
#[inline]
#[must_use]
pub const fn mated_in(ply: usize) -> i32 {
    -VALUE_MATE + ply as i32
}

/// Convert a score to "distance from this node" before storing it
#[inline]
pub(crate) fn value_to_tt(value: i32, ply: usize) -> i32 {
    if value >= VALUE_MATE_IN_MAX_PLY {
        value + ply as i32
    } else if value <= VALUE_MATED_IN_MAX_PLY {
        value - ply as i32
    } else {
        value
    }
}

/// Inverse of [`value_to_tt`]
#[inline]
pub(crate) fn value_from_tt(value: i32, ply: usize) -> i32 {
    if value >= VALUE_MATE_IN_MAX_PLY {
        value - ply as i32
    } else if value <= VALUE_MATED_IN_MAX_PLY {
        value + ply as i32
    } else {
        value
    }
}

/// Limits for one search. Unset fields are unconstrained.
#[derive(Clone, Copy, Debug)]
pub struct SearchLimits {
    /// Maximum iteration depth of the main thread
    pub depth: Option<i32>,
    /// Node ceiling summed over every thread
    pub nodes: Option<u64>,
    /// Wall-clock ceiling in milliseconds
    pub movetime: Option<u64>,
    pub start_time: Instant,
}

impl Default for SearchLimits {
    fn default() -> Self {
        SearchLimits {
            depth: None,
            nodes: None,
            movetime: None,
            start_time: Instant::now(),
        }
    }
}

impl SearchLimits {
    /// Milliseconds since `start_time`
    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }
}

/// A legal move at the root and what the search learned about it.
#[derive(Clone, Debug)]
pub struct RootMove {
    /// Score from the latest search of this move, `-VALUE_INFINITE` when it
    /// failed to raise alpha
    pub score: i32,
    /// Score at the start of the current iteration
    pub previous_score: i32,
    pub sel_depth: i32,
    pub tb_rank: i32,
    pub tb_score: i32,
    /// The move itself followed by the expected continuation
    pub pv: Vec<Move>,
}

impl RootMove {
    #[must_use]
    pub fn new(mv: Move) -> Self {
        RootMove {
            score: -VALUE_INFINITE,
            previous_score: -VALUE_INFINITE,
            sel_depth: 0,
            tb_rank: 0,
            tb_score: 0,
            pv: vec![mv],
        }
    }

    #[inline]
    #[must_use]
    pub fn mv(&self) -> Move {
        self.pv[0]
    }
}

/// Stable sort, best first by score then by previous score
pub(crate) fn sort_root_moves(moves: &mut [RootMove]) {
    moves.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| b.previous_score.cmp(&a.previous_score))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Square;

    #[test]
    fn test_tt_value_round_trip_for_mates() {
        let mate = mate_in(7);
        let stored = value_to_tt(mate, 3);
        assert_eq!(stored, mate_in(4));
        assert_eq!(value_from_tt(stored, 3), mate);

        let mated = mated_in(6);
        assert_eq!(value_from_tt(value_to_tt(mated, 2), 2), mated);
        assert_eq!(value_to_tt(150, 9), 150);
    }

    #[test]
    fn test_mate_values_are_beyond_threshold() {
        assert!(mate_in(MAX_PLY) >= VALUE_MATE_IN_MAX_PLY);
        assert!(mated_in(1) <= VALUE_MATED_IN_MAX_PLY);
        assert!(VALUE_INFINITE > VALUE_MATE);
    }

    #[test]
    fn test_sort_root_moves_is_stable() {
        let mk = |file: usize, score, prev| RootMove {
            score,
            previous_score: prev,
            ..RootMove::new(Move::new(Square::from_index(8 + file), Square::from_index(16 + file)))
        };
        let mut moves = vec![mk(0, -VALUE_INFINITE, 10), mk(1, 30, 0), mk(2, -VALUE_INFINITE, 10), mk(3, 30, 5)];
        sort_root_moves(&mut moves);
        let files: Vec<usize> = moves.iter().map(|rm| rm.mv().from().file()).collect();
        assert_eq!(files, vec![3, 1, 0, 2]);
    }
}
