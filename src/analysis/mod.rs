//! Session-based analysis on top of the search.
//!
//! A [`SessionManager`] owns the shared engine. Callers open sessions, hand
//! in a FEN and one [`AnalysisLimit`], and get an [`AnalysisResult`] back
//! with one [`PrincipalVariation`] per analysed line.
//!
//! # Example
//! ```no_run
//! use chess_analysis::analysis::{format_move_sequence, SessionManager};
//!
//! let mut engine = SessionManager::new()?;
//! let id = engine.create(1, 16, 0, 3)?;
//! let result = engine.analyze_by_depth(id, chess_analysis::board::START_FEN, 8)?;
//! for pv in &result.variations {
//!     println!("{} {}", pv.score, format_move_sequence(&pv.moves));
//! }
//! engine.destroy(id)?;
//! # Ok::<(), chess_analysis::analysis::AnalysisError>(())
//! ```

pub mod codec;
mod invoker;
mod session;
mod translate;
mod types;

use std::io;

use thiserror::Error;

use crate::board::FenError;
use crate::options::OptionError;
use crate::tablebase::TablebaseError;

pub use invoker::start_analysis;
pub use session::{Session, SessionId, SessionManager};
pub use translate::{normalize_score, translate};
pub use types::{
    format_move_sequence, format_promotion, AnalysisLimit, AnalysisMove, AnalysisResult, PrincipalVariation,
    Promotion, SQUARE_NONE,
};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("unknown session {0}")]
    UnknownSession(SessionId),
    #[error("invalid position: {0}")]
    InvalidFen(#[from] FenError),
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    #[error(transparent)]
    Option(#[from] OptionError),
    #[error(transparent)]
    Tablebase(#[from] TablebaseError),
    #[error("failed to start search threads: {0}")]
    ThreadSpawn(#[from] io::Error),
}
