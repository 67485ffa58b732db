//! Analysis sessions sharing one engine.

use std::collections::HashMap;
use std::fmt;

use log::{info, warn};

use super::types::{AnalysisLimit, AnalysisResult};
use super::{invoker, translate, AnalysisError};
use crate::board::{Board, FenError, StateInfo, START_FEN};
use crate::options::{EngineConfig, OptionChange};
use crate::search::ThreadPool;
use crate::tablebase::Tablebases;

/// Handle to a live session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The position one caller analyses and its state history.
#[derive(Debug)]
pub struct Session {
    board: Board,
    /// Snapshots of the loaded position, oldest first. The search works on
    /// a clone of `board`; this history is for callers inspecting the
    /// session and restarts with every analysis.
    states: Vec<StateInfo>,
}

impl Session {
    pub(crate) fn new(chess960: bool) -> Self {
        let board = Board::from_fen(START_FEN, chess960).unwrap_or_default();
        let states = vec![board.state_info()];
        Session { board, states }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn states(&self) -> &[StateInfo] {
        &self.states
    }

    /// Replace the position and start a fresh state history.
    /// On error the previous position is kept.
    pub(crate) fn set_position(&mut self, fen: &str, chess960: bool) -> Result<(), FenError> {
        let board = Board::from_fen(fen, chess960)?;
        self.states.clear();
        self.states.push(board.state_info());
        self.board = board;
        Ok(())
    }
}

/// Owns the engine configuration, the search threads and every session.
///
/// All sessions share one thread pool, transposition table and option set.
/// The pool shrinks to zero threads when the last session is destroyed and
/// grows back on the next analysis.
pub struct SessionManager {
    config: EngineConfig,
    pool: ThreadPool,
    sessions: HashMap<SessionId, Session>,
    next_id: u64,
}

impl SessionManager {
    /// Engine with default options and no sessions
    pub fn new() -> Result<Self, AnalysisError> {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Result<Self, AnalysisError> {
        crate::init();
        let mut pool = ThreadPool::new(config.threads, config.hash_mb)?;
        if config.syzygy_path.is_some() {
            pool.set_tablebases(Tablebases::from_config(&config)?);
        }
        Ok(SessionManager {
            config,
            pool,
            sessions: HashMap::new(),
            next_id: 1,
        })
    }

    /// Configure the shared engine and open a session.
    ///
    /// A non-zero `contempt` applies to both colours; zero turns analysis
    /// contempt off. Threads are set last.
    pub fn create(
        &mut self,
        threads: usize,
        hash_mb: usize,
        contempt: i32,
        multi_pv: usize,
    ) -> Result<SessionId, AnalysisError> {
        self.set_option("Hash", &hash_mb.to_string())?;
        if contempt != 0 {
            self.set_option("Analysis Contempt", "Both")?;
            self.set_option("Contempt", &contempt.to_string())?;
        } else {
            self.set_option("Analysis Contempt", "Off")?;
        }
        self.set_option("UCI_AnalyseMode", "true")?;
        self.set_option("MultiPV", &multi_pv.to_string())?;
        self.set_option("Threads", &threads.to_string())?;
        self.pool.set_size(self.config.threads)?;
        Ok(self.create_session())
    }

    /// Open a session with the current options
    pub fn create_session(&mut self) -> SessionId {
        let id = SessionId(self.next_id);
        self.next_id += 1;
        self.sessions.insert(id, Session::new(self.config.chess960));
        info!("session {id} created ({} live)", self.sessions.len());
        id
    }

    /// Set an engine option by name and carry out its side effect.
    ///
    /// The change is kept only once its side effect succeeded. Rejected
    /// options are logged and leave the configuration unchanged.
    pub fn set_option(&mut self, name: &str, value: &str) -> Result<(), AnalysisError> {
        let mut next = self.config.clone();
        let result = next
            .set_option(name, value)
            .map_err(AnalysisError::from)
            .and_then(|change| self.apply(change, &next));
        if let Err(err) = &result {
            warn!("option {name} = {value} rejected: {err}");
            return result;
        }
        self.config = next;
        Ok(())
    }

    fn apply(&mut self, change: Option<OptionChange>, next: &EngineConfig) -> Result<(), AnalysisError> {
        match change {
            Some(OptionChange::ResizeThreads(threads)) => {
                // An empty pool regrows on the next analysis
                if self.pool.size() > 0 {
                    self.pool.set_size(threads)?;
                }
            }
            Some(OptionChange::ResizeHash(mb)) => {
                if self.pool.tt().size_mb() != mb {
                    self.pool.resize_tt(mb);
                }
            }
            Some(OptionChange::ClearHash) => self.pool.clear(),
            Some(OptionChange::ReloadTablebases) => {
                let tablebases = Tablebases::from_config(next)?;
                self.pool.set_tablebases(tablebases);
            }
            None => {}
        }
        Ok(())
    }

    /// Forget everything learned by earlier searches
    pub fn reset(&mut self) {
        self.pool.clear();
    }

    /// Close a session. The last one closed stops every search thread.
    pub fn destroy(&mut self, id: SessionId) -> Result<(), AnalysisError> {
        self.sessions.remove(&id).ok_or(AnalysisError::UnknownSession(id))?;
        info!("session {id} destroyed ({} live)", self.sessions.len());
        if self.sessions.is_empty() {
            self.pool.set_size(0)?;
        }
        Ok(())
    }

    /// Search `fen` under `limit` and return the result. Blocks.
    pub fn analyze(&mut self, id: SessionId, fen: &str, limit: AnalysisLimit) -> Result<AnalysisResult, AnalysisError> {
        let session = self.sessions.get_mut(&id).ok_or(AnalysisError::UnknownSession(id))?;
        invoker::start_analysis(session, &mut self.pool, &self.config, fen, limit)?;
        Ok(translate::translate(&self.pool, &self.config, session.board().is_chess960()))
    }

    pub fn analyze_by_depth(&mut self, id: SessionId, fen: &str, depth: u32) -> Result<AnalysisResult, AnalysisError> {
        self.analyze(id, fen, AnalysisLimit::Depth(depth))
    }

    pub fn analyze_by_nodes(&mut self, id: SessionId, fen: &str, nodes: u64) -> Result<AnalysisResult, AnalysisError> {
        self.analyze(id, fen, AnalysisLimit::Nodes(nodes))
    }

    pub fn analyze_by_time(&mut self, id: SessionId, fen: &str, ms: u64) -> Result<AnalysisResult, AnalysisError> {
        self.analyze(id, fen, AnalysisLimit::MoveTime(ms))
    }

    #[must_use]
    pub fn session(&self, id: SessionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Live search threads
    #[must_use]
    pub fn thread_count(&self) -> usize {
        self.pool.size()
    }

    /// Transposition table occupancy in permille
    #[must_use]
    pub fn hashfull(&self) -> u32 {
        self.pool.tt().hashfull()
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        if let Err(err) = self.pool.set_size(0) {
            warn!("stopping search threads: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::AnalysisContempt;

    fn manager() -> SessionManager {
        SessionManager::with_config(EngineConfig::default().with_threads(1).with_hash_mb(1)).unwrap()
    }

    #[test]
    fn test_create_applies_options() {
        let mut mgr = manager();
        let id = mgr.create(2, 2, 0, 3).unwrap();
        assert_eq!(mgr.config().threads, 2);
        assert_eq!(mgr.config().hash_mb, 2);
        assert_eq!(mgr.config().multi_pv, 3);
        assert_eq!(mgr.config().analysis_contempt, AnalysisContempt::Off);
        assert!(mgr.config().analyse_mode);
        assert_eq!(mgr.thread_count(), 2);
        assert!(mgr.session(id).is_some());

        mgr.create(1, 2, 30, 1).unwrap();
        assert_eq!(mgr.config().analysis_contempt, AnalysisContempt::Both);
        assert_eq!(mgr.config().contempt, 30);
        assert_eq!(mgr.session_count(), 2);
    }

    #[test]
    fn test_unknown_option_leaves_config() {
        let mut mgr = manager();
        let before = mgr.config().clone();
        assert!(matches!(mgr.set_option("Ponder", "true"), Err(AnalysisError::Option(_))));
        assert!(matches!(mgr.set_option("Threads", "many"), Err(AnalysisError::Option(_))));
        assert_eq!(mgr.config(), &before);
    }

    #[test]
    fn test_failed_side_effect_leaves_config() {
        let mut mgr = manager();
        let before = mgr.config().clone();
        // No such directory, with or without Syzygy support compiled in
        assert!(matches!(
            mgr.set_option("SyzygyPath", "/nonexistent/tablebases"),
            Err(AnalysisError::Tablebase(_))
        ));
        assert_eq!(mgr.config(), &before);
        assert_eq!(mgr.config().syzygy_path, None);

        // Later tablebase options still apply
        mgr.set_option("Syzygy50MoveRule", "false").unwrap();
        assert!(!mgr.config().syzygy_50_move_rule);
        mgr.set_option("SyzygyPath", "<empty>").unwrap();
        assert_eq!(mgr.config().syzygy_path, None);
    }

    #[test]
    fn test_destroy_last_session_stops_threads() {
        let mut mgr = manager();
        let a = mgr.create_session();
        let b = mgr.create_session();
        assert_ne!(a, b);
        mgr.destroy(a).unwrap();
        assert_eq!(mgr.thread_count(), 1);
        assert!(matches!(mgr.destroy(a), Err(AnalysisError::UnknownSession(_))));
        mgr.destroy(b).unwrap();
        assert_eq!(mgr.thread_count(), 0);
        assert_eq!(mgr.session_count(), 0);
    }

    #[test]
    fn test_analyze_unknown_session() {
        let mut mgr = manager();
        let id = mgr.create_session();
        mgr.destroy(id).unwrap();
        assert!(matches!(
            mgr.analyze_by_depth(id, crate::board::START_FEN, 1),
            Err(AnalysisError::UnknownSession(_))
        ));
    }

    #[test]
    fn test_session_position_follows_analysis() {
        let mut mgr = manager();
        let id = mgr.create_session();
        let fen = "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1";
        mgr.analyze_by_depth(id, fen, 1).unwrap();
        let session = mgr.session(id).unwrap();
        assert_eq!(session.board().to_fen(), fen);
        assert_eq!(session.states().len(), 1);
    }
}
