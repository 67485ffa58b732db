//! Endgame tablebase probing.
//!
//! Probers answer win/draw/loss queries for positions with few pieces. The
//! search uses them in two places: [`Tablebases::rank_root_moves`] adjudicates
//! every root move before the search starts, and [`Tablebases::probe_wdl`] is
//! consulted inside the tree right after captures and pawn moves.
//!
//! A built-in [`MaterialDraws`] prober is always present. Syzygy tables are
//! available with the `syzygy` feature.

#[cfg(feature = "syzygy")]
mod syzygy;

use log::{debug, info};
use thiserror::Error;

use crate::board::Board;
use crate::options::EngineConfig;
use crate::search::{RootMove, VALUE_DRAW, VALUE_MATE_IN_MAX_PLY};

#[cfg(feature = "syzygy")]
pub use syzygy::SyzygyProber;

/// Error type for tablebase loading
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TablebaseError {
    #[error("cannot load tablebases from '{path}': {reason}")]
    Directory { path: String, reason: String },
    #[error("no tablebase files found in '{0}'")]
    Empty(String),
    #[error("syzygy support is not compiled in (enable the `syzygy` feature)")]
    Unsupported,
}

/// Win/draw/loss from the side to move's point of view.
///
/// `CursedWin` and `BlessedLoss` are wins and losses that the fifty-move
/// rule turns into draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Wdl {
    Loss,
    BlessedLoss,
    Draw,
    CursedWin,
    Win,
}

impl Wdl {
    #[must_use]
    pub fn negate(self) -> Wdl {
        match self {
            Wdl::Loss => Wdl::Win,
            Wdl::BlessedLoss => Wdl::CursedWin,
            Wdl::Draw => Wdl::Draw,
            Wdl::CursedWin => Wdl::BlessedLoss,
            Wdl::Win => Wdl::Loss,
        }
    }

    /// `-2..=2`, loss to win
    #[must_use]
    pub fn signum2(self) -> i32 {
        self as i32 - 2
    }

    /// Ranking used to order root moves
    fn rank(self) -> i32 {
        match self {
            Wdl::Loss => -1000,
            Wdl::BlessedLoss => -899,
            Wdl::Draw => 0,
            Wdl::CursedWin => 899,
            Wdl::Win => 1000,
        }
    }

    /// Score reported for a root move with this outcome
    fn root_value(self, use_rule50: bool) -> i32 {
        let wdl = if use_rule50 {
            self
        } else {
            match self {
                Wdl::CursedWin => Wdl::Win,
                Wdl::BlessedLoss => Wdl::Loss,
                other => other,
            }
        };
        match wdl {
            Wdl::Loss => -VALUE_MATE_IN_MAX_PLY + 1,
            Wdl::BlessedLoss => VALUE_DRAW - 2,
            Wdl::Draw => VALUE_DRAW,
            Wdl::CursedWin => VALUE_DRAW + 2,
            Wdl::Win => VALUE_MATE_IN_MAX_PLY - 1,
        }
    }

    /// Score and bound for an in-search probe at `ply`
    pub(crate) fn search_value(self, ply: usize, use_rule50: bool) -> (i32, ProbeBound) {
        let draw_score = i32::from(use_rule50);
        let wdl = self.signum2();
        if wdl < -draw_score {
            (-VALUE_MATE_IN_MAX_PLY + ply as i32 + 1, ProbeBound::Upper)
        } else if wdl > draw_score {
            (VALUE_MATE_IN_MAX_PLY - ply as i32 - 1, ProbeBound::Lower)
        } else {
            (VALUE_DRAW + 2 * wdl * draw_score, ProbeBound::Exact)
        }
    }
}

/// Which way an in-search tablebase score bounds the true value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ProbeBound {
    Exact,
    Lower,
    Upper,
}

/// A source of exact win/draw/loss knowledge.
pub trait TablebaseProber: Send + Sync {
    fn name(&self) -> &str;

    /// Largest piece count (kings included) this prober can answer for
    fn max_pieces(&self) -> u32;

    /// Outcome for the side to move, `None` when the position is not covered
    fn probe_wdl(&self, board: &Board) -> Option<Wdl>;
}

/// Exact draws by material: no side can ever deliver mate.
#[derive(Clone, Copy, Debug, Default)]
pub struct MaterialDraws;

impl TablebaseProber for MaterialDraws {
    fn name(&self) -> &str {
        "material draws"
    }

    fn max_pieces(&self) -> u32 {
        4
    }

    fn probe_wdl(&self, board: &Board) -> Option<Wdl> {
        (board.piece_count() <= self.max_pieces() && board.is_insufficient_material()).then_some(Wdl::Draw)
    }
}

/// Per-search probing limits derived from the configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProbeSettings {
    /// Largest piece count probed inside the tree, 0 disables probing
    pub cardinality: u32,
    /// Minimum remaining depth for probes at exactly `cardinality` pieces
    pub probe_depth: i32,
    pub use_rule50: bool,
}

/// The set of loaded probers.
pub struct Tablebases {
    probers: Vec<Box<dyn TablebaseProber>>,
}

impl Default for Tablebases {
    fn default() -> Self {
        Tablebases {
            probers: vec![Box::new(MaterialDraws)],
        }
    }
}

impl Tablebases {
    /// Built-in probers plus whatever `config.syzygy_path` points to
    pub fn from_config(config: &EngineConfig) -> Result<Self, TablebaseError> {
        let mut tablebases = Tablebases::default();
        if let Some(path) = config.syzygy_path.as_deref() {
            tablebases.load_syzygy(path)?;
        }
        Ok(tablebases)
    }

    #[cfg(feature = "syzygy")]
    fn load_syzygy(&mut self, path: &str) -> Result<(), TablebaseError> {
        let prober = SyzygyProber::open(path)?;
        info!("loaded {} tablebases up to {} pieces", prober.name(), prober.max_pieces());
        self.add_prober(Box::new(prober));
        Ok(())
    }

    #[cfg(not(feature = "syzygy"))]
    fn load_syzygy(&mut self, path: &str) -> Result<(), TablebaseError> {
        log::warn!("ignoring SyzygyPath '{path}': built without syzygy support");
        Err(TablebaseError::Unsupported)
    }

    pub fn add_prober(&mut self, prober: Box<dyn TablebaseProber>) {
        self.probers.push(prober);
    }

    /// Largest piece count any prober answers for
    #[must_use]
    pub fn max_pieces(&self) -> u32 {
        self.probers.iter().map(|p| p.max_pieces()).max().unwrap_or(0)
    }

    /// Limits for the next search
    #[must_use]
    pub fn settings(&self, config: &EngineConfig) -> ProbeSettings {
        let limit = config.syzygy_probe_limit;
        let max = self.max_pieces();
        // Capped by the loaded tables: probe at any depth
        let (cardinality, probe_depth) = if limit > max {
            (max, 0)
        } else {
            (limit, config.syzygy_probe_depth)
        };
        ProbeSettings {
            cardinality,
            probe_depth,
            use_rule50: config.syzygy_50_move_rule,
        }
    }

    /// First answer from a prober covering this many pieces
    #[must_use]
    pub fn probe_wdl(&self, board: &Board) -> Option<Wdl> {
        let pieces = board.piece_count();
        self.probers
            .iter()
            .filter(|p| pieces <= p.max_pieces())
            .find_map(|p| p.probe_wdl(board))
    }

    /// Rank every root move by its tablebase outcome.
    ///
    /// Returns true when all root moves were adjudicated. Moves are then
    /// stably sorted best first and carry a `tb_score`. Once the root is
    /// known not to be winning, in-search probing is switched off through
    /// `settings.cardinality`.
    pub fn rank_root_moves(
        &self,
        board: &mut Board,
        root_moves: &mut [RootMove],
        settings: &mut ProbeSettings,
    ) -> bool {
        let in_tb = settings.cardinality >= board.piece_count()
            && board.castling_rights().is_empty()
            && !root_moves.is_empty()
            && self.probe_root(board, root_moves, settings.use_rule50);

        if in_tb {
            root_moves.sort_by(|a, b| b.tb_rank.cmp(&a.tb_rank));
            if root_moves[0].tb_score <= VALUE_DRAW {
                settings.cardinality = 0;
            }
            debug!(
                "root in tablebases: best rank {} score {}",
                root_moves[0].tb_rank, root_moves[0].tb_score
            );
        } else {
            for rm in root_moves.iter_mut() {
                rm.tb_rank = 0;
            }
        }
        in_tb
    }

    fn probe_root(&self, board: &mut Board, root_moves: &mut [RootMove], use_rule50: bool) -> bool {
        for rm in root_moves.iter_mut() {
            let mv = rm.pv[0];
            let info = board.make_move(mv);
            let wdl = self.probe_wdl(board).map(Wdl::negate);
            board.unmake_move(mv, info);
            let Some(wdl) = wdl else {
                return false;
            };
            rm.tb_rank = wdl.rank();
            rm.tb_score = wdl.root_value(use_rule50);
        }
        true
    }
}
