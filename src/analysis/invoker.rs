//! Dispatch one analysis and block until it finishes.

use std::time::Instant;

use log::debug;

use super::session::Session;
use super::types::AnalysisLimit;
use super::AnalysisError;
use crate::board::Board;
use crate::options::EngineConfig;
use crate::search::{SearchLimits, ThreadPool};

fn search_limits(limit: AnalysisLimit) -> Result<SearchLimits, AnalysisError> {
    let mut limits = SearchLimits::default();
    match limit {
        AnalysisLimit::Depth(0) => {
            return Err(AnalysisError::InvalidLimit("depth must be at least 1".into()));
        }
        AnalysisLimit::Depth(depth) => limits.depth = Some(depth.min(i32::MAX as u32) as i32),
        AnalysisLimit::Nodes(nodes) => limits.nodes = Some(nodes),
        AnalysisLimit::MoveTime(ms) => limits.movetime = Some(ms),
    }
    Ok(limits)
}

/// Stamp the start time and search. Elapsed time counts from here.
fn dispatch(pool: &mut ThreadPool, board: &Board, mut limits: SearchLimits, config: &EngineConfig) {
    limits.start_time = Instant::now();
    pool.start_thinking(board, limits, config);
    pool.wait_for_search_finished();
}

/// Load `fen` into `session`, search it under `limit` and wait.
///
/// The limit and the position are validated before the session is touched.
/// An empty pool is regrown to `config.threads` first.
pub fn start_analysis(
    session: &mut Session,
    pool: &mut ThreadPool,
    config: &EngineConfig,
    fen: &str,
    limit: AnalysisLimit,
) -> Result<(), AnalysisError> {
    let limits = search_limits(limit)?;
    session.set_position(fen, config.chess960)?;

    if pool.size() == 0 {
        pool.set_size(config.threads)?;
    }
    debug!("analysing {fen} with {limit:?}");
    dispatch(pool, session.board(), limits, config);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::search::Worker;

    #[test]
    fn test_exactly_one_limit_is_set() {
        let limits = search_limits(AnalysisLimit::Depth(7)).unwrap();
        assert_eq!((limits.depth, limits.nodes, limits.movetime), (Some(7), None, None));
        let limits = search_limits(AnalysisLimit::Nodes(5000)).unwrap();
        assert_eq!((limits.depth, limits.nodes, limits.movetime), (None, Some(5000), None));
        let limits = search_limits(AnalysisLimit::MoveTime(100)).unwrap();
        assert_eq!((limits.depth, limits.nodes, limits.movetime), (None, None, Some(100)));
    }

    #[test]
    fn test_zero_depth_is_rejected() {
        assert!(matches!(
            search_limits(AnalysisLimit::Depth(0)),
            Err(AnalysisError::InvalidLimit(_))
        ));
    }

    #[test]
    fn test_clock_starts_at_dispatch() {
        crate::init();
        let mut pool = ThreadPool::new(1, 1).unwrap();
        let config = EngineConfig::default().with_threads(1).with_hash_mb(1);
        let mut limits = search_limits(AnalysisLimit::Depth(1)).unwrap();
        // A stale stamp from validation must not count as search time
        limits.start_time = Instant::now()
            .checked_sub(Duration::from_secs(10))
            .unwrap_or(limits.start_time);
        let before = Instant::now();
        dispatch(&mut pool, &Board::new(), limits, &config);
        let elapsed = pool.with_main_worker(Worker::elapsed_ms).unwrap();
        assert!(elapsed <= before.elapsed().as_millis() as u64);
        assert!(elapsed < 10_000);
    }

    #[test]
    fn test_bad_fen_leaves_session_untouched() {
        crate::init();
        let mut session = Session::new(false);
        let before = session.board().to_fen();
        let mut pool = ThreadPool::new(1, 1).unwrap();
        let config = EngineConfig::default().with_threads(1).with_hash_mb(1);
        let err = start_analysis(&mut session, &mut pool, &config, "not a position", AnalysisLimit::Depth(1));
        assert!(matches!(err, Err(AnalysisError::InvalidFen(_))));
        assert_eq!(session.board().to_fen(), before);
    }

    #[test]
    fn test_empty_pool_is_regrown() {
        crate::init();
        let mut session = Session::new(false);
        let mut pool = ThreadPool::new(0, 1).unwrap();
        let config = EngineConfig::default().with_threads(2).with_hash_mb(1);
        start_analysis(
            &mut session,
            &mut pool,
            &config,
            "4k3/8/8/8/8/8/8/4K2R w K - 0 1",
            AnalysisLimit::Depth(2),
        )
        .unwrap();
        assert_eq!(pool.size(), 2);
        assert!(pool.nodes_searched() > 0);
        assert_eq!(pool.with_main_worker(|w| w.root_depth()), Some(2));
    }
}
