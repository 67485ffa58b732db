//! Turns the main worker's root moves into an [`AnalysisResult`].

use super::codec;
use super::types::{AnalysisResult, PrincipalVariation};
use crate::board::PAWN_VALUE_EG;
use crate::options::EngineConfig;
use crate::search::{RootMove, ThreadPool, Worker, VALUE_INFINITE, VALUE_MATE, VALUE_MATE_IN_MAX_PLY};

/// External score: centipawns, or signed moves to mate.
///
/// # Panics
/// If `value` is not strictly inside `±VALUE_INFINITE`.
#[must_use]
pub fn normalize_score(value: i32) -> i32 {
    assert!(
        -VALUE_INFINITE < value && value < VALUE_INFINITE,
        "score {value} outside the search window"
    );
    if value.abs() < VALUE_MATE_IN_MAX_PLY {
        value * 100 / PAWN_VALUE_EG
    } else if value > 0 {
        (VALUE_MATE - value + 1) / 2
    } else {
        (-VALUE_MATE - value) / 2
    }
}

/// Read the outcome of the last search out of `pool`.
pub fn translate(pool: &ThreadPool, config: &EngineConfig, chess960: bool) -> AnalysisResult {
    let nodes_searched = pool.nodes_searched();
    let tb_hits = pool.tb_hits();
    pool.with_main_worker(|main| {
        let root_moves = main.root_moves();
        let tablebase_hits = if main.root_in_tb() {
            tb_hits + root_moves.len() as u64
        } else {
            tb_hits
        };
        AnalysisResult {
            elapsed_ms: main.elapsed_ms().max(1),
            nodes_searched,
            tablebase_hits,
            variations: variations(&RootState::of(main), config.multi_pv, chess960),
        }
    })
    .unwrap_or(AnalysisResult {
        elapsed_ms: 1,
        nodes_searched,
        tablebase_hits: tb_hits,
        variations: Vec::new(),
    })
}

/// Where the main worker stood when the search ended
struct RootState<'a> {
    root_moves: &'a [RootMove],
    root_depth: i32,
    pv_idx: usize,
    root_in_tb: bool,
}

impl<'a> RootState<'a> {
    fn of(main: &'a Worker) -> Self {
        RootState {
            root_moves: main.root_moves(),
            root_depth: main.root_depth(),
            pv_idx: main.pv_idx(),
            root_in_tb: main.root_in_tb(),
        }
    }
}

/// One line per slot up to `multi_pv`. A slot the last iteration did not
/// reach reports the previous iteration, or nothing during the first one.
fn variations(root: &RootState<'_>, multi_pv: usize, chess960: bool) -> Vec<PrincipalVariation> {
    let depth = root.root_depth;
    root.root_moves
        .iter()
        .take(multi_pv.min(root.root_moves.len()))
        .enumerate()
        .filter_map(|(i, rm)| {
            let updated = i <= root.pv_idx && rm.score != -VALUE_INFINITE;
            if depth == 1 && !updated {
                return None;
            }
            Some(line(rm, updated, depth, root.root_in_tb, chess960))
        })
        .collect()
}

fn line(rm: &RootMove, updated: bool, depth: i32, root_in_tb: bool, chess960: bool) -> PrincipalVariation {
    let mut value = if updated { rm.score } else { rm.previous_score };
    if root_in_tb && value.abs() < VALUE_MATE_IN_MAX_PLY {
        value = rm.tb_score;
    }
    PrincipalVariation {
        depth: if updated { depth } else { depth - 1 },
        selective_depth: rm.sel_depth,
        score: normalize_score(value),
        moves: rm.pv.iter().map(|&mv| codec::encode(mv, chess960)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Move, Square};

    #[test]
    fn test_normalize_centipawns() {
        assert_eq!(normalize_score(0), 0);
        assert_eq!(normalize_score(PAWN_VALUE_EG), 100);
        assert_eq!(normalize_score(-PAWN_VALUE_EG), -100);
        assert_eq!(normalize_score(PAWN_VALUE_EG / 2), 50);
    }

    #[test]
    fn test_normalize_mate_scores() {
        // Mate delivered on ply 1, 3 and 5: one, two and three moves
        assert_eq!(normalize_score(VALUE_MATE - 1), 1);
        assert_eq!(normalize_score(VALUE_MATE - 3), 2);
        assert_eq!(normalize_score(VALUE_MATE - 5), 3);
        // Mated on ply 2 and 4
        assert_eq!(normalize_score(-VALUE_MATE + 2), -1);
        assert_eq!(normalize_score(-VALUE_MATE + 4), -2);
        assert_eq!(normalize_score(-VALUE_MATE), 0);
    }

    #[test]
    #[should_panic(expected = "outside the search window")]
    fn test_normalize_rejects_infinite() {
        let _ = normalize_score(-VALUE_INFINITE);
    }

    #[test]
    fn test_line_uses_previous_score_when_not_updated() {
        crate::init();
        let mut rm = RootMove::new(Move::new(Square::E1, Square::F1));
        rm.score = -VALUE_INFINITE;
        rm.previous_score = 2 * PAWN_VALUE_EG;
        rm.sel_depth = 7;
        let pv = line(&rm, false, 6, false, false);
        assert_eq!(pv.depth, 5);
        assert_eq!(pv.score, 200);
        assert_eq!(pv.selective_depth, 7);
        assert_eq!(pv.moves.len(), 1);

        rm.score = PAWN_VALUE_EG;
        let pv = line(&rm, true, 6, false, false);
        assert_eq!(pv.depth, 6);
        assert_eq!(pv.score, 100);
    }

    #[test]
    fn test_line_prefers_tablebase_score_for_non_mates() {
        let mut rm = RootMove::new(Move::new(Square::E1, Square::F1));
        rm.score = 35;
        rm.tb_score = VALUE_MATE_IN_MAX_PLY - 1;
        let pv = line(&rm, true, 3, true, false);
        assert_eq!(pv.score, (VALUE_MATE_IN_MAX_PLY - 1) * 100 / PAWN_VALUE_EG);

        rm.score = VALUE_MATE - 3;
        assert_eq!(line(&rm, true, 3, true, false).score, 2);
    }

    fn root_move(from: Square, to: Square, score: i32, previous_score: i32) -> RootMove {
        let mut rm = RootMove::new(Move::new(from, to));
        rm.score = score;
        rm.previous_score = previous_score;
        rm
    }

    #[test]
    fn test_first_iteration_drops_unreached_slots() {
        let root_moves = [
            root_move(Square::E1, Square::F1, PAWN_VALUE_EG, -VALUE_INFINITE),
            root_move(Square::E1, Square::D1, -VALUE_INFINITE, -VALUE_INFINITE),
            root_move(Square::E1, Square::from_index(12), -VALUE_INFINITE, -VALUE_INFINITE),
        ];
        let root = RootState {
            root_moves: &root_moves,
            root_depth: 1,
            pv_idx: 1,
            root_in_tb: false,
        };
        let lines = variations(&root, 3, false);
        assert_eq!(lines.len(), 1);
        assert_eq!((lines[0].depth, lines[0].score), (1, 100));
    }

    #[test]
    fn test_unreached_slots_report_previous_iteration() {
        let root_moves = [
            root_move(Square::E1, Square::F1, 2 * PAWN_VALUE_EG, PAWN_VALUE_EG),
            // Searched in this iteration without raising alpha
            root_move(Square::E1, Square::D1, -VALUE_INFINITE, PAWN_VALUE_EG / 2),
            // Beyond the line in progress
            root_move(Square::E1, Square::from_index(12), -PAWN_VALUE_EG, -3 * PAWN_VALUE_EG),
        ];
        let root = RootState {
            root_moves: &root_moves,
            root_depth: 7,
            pv_idx: 1,
            root_in_tb: false,
        };
        let lines = variations(&root, 3, false);
        let summary: Vec<(i32, i32)> = lines.iter().map(|pv| (pv.depth, pv.score)).collect();
        assert_eq!(summary, [(7, 200), (6, 50), (6, -300)]);

        // Capped by the requested line count
        assert_eq!(variations(&root, 2, false).len(), 2);
    }

    #[test]
    fn test_tablebase_root_overrides_scores() {
        let mut rm = root_move(Square::E1, Square::F1, 40, 30);
        rm.tb_score = 0;
        let root_moves = [rm];
        let root = RootState {
            root_moves: &root_moves,
            root_depth: 4,
            pv_idx: 1,
            root_in_tb: true,
        };
        assert_eq!(variations(&root, 1, false)[0].score, 0);
    }

    #[test]
    fn test_translate_without_threads_is_empty() {
        crate::init();
        let pool = ThreadPool::new(0, 1).unwrap();
        let result = translate(&pool, &EngineConfig::default(), Board::new().is_chess960());
        assert_eq!(result.elapsed_ms, 1);
        assert!(result.variations.is_empty());
    }
}
