//! Embeddable chess position analysis.
//!
//! The [`analysis`] module is the entry point: it runs a multi-threaded
//! alpha-beta search over a FEN position and reports the best lines with
//! scores in centipawns or moves to mate.

pub mod analysis;
pub mod board;
pub mod options;
pub mod search;
pub mod sync;
pub mod tablebase;
pub mod tt;
pub mod zobrist;

use std::sync::Once;

pub use analysis::{
    AnalysisError, AnalysisLimit, AnalysisMove, AnalysisResult, PrincipalVariation, Promotion, SessionId,
    SessionManager,
};
pub use board::{Board, Color, Move, Piece, Square};
pub use options::EngineConfig;
pub use tt::TranspositionTable;

/// Build the static attack, hashing and evaluation tables.
///
/// Runs once per process; later calls return immediately.
/// [`SessionManager`] calls it on construction.
pub fn init() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        board::init();
        zobrist::init();
    });
}
