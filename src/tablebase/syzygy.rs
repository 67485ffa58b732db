//! Syzygy tables through `shakmaty-syzygy`.

use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess};
use shakmaty_syzygy::{Tablebase, Wdl as SyzygyWdl};

use super::{TablebaseError, TablebaseProber, Wdl};
use crate::board::Board;

pub struct SyzygyProber {
    tables: Tablebase<Chess>,
    max_pieces: u32,
}

impl SyzygyProber {
    /// Load every table found in `paths`, separated like the `PATH` variable
    pub fn open(paths: &str) -> Result<Self, TablebaseError> {
        let mut tables = Tablebase::new();
        let mut found = 0;
        for dir in std::env::split_paths(paths) {
            found += tables.add_directory(&dir).map_err(|err| TablebaseError::Directory {
                path: dir.display().to_string(),
                reason: err.to_string(),
            })?;
        }
        if found == 0 {
            return Err(TablebaseError::Empty(paths.to_string()));
        }
        let max_pieces = tables.max_pieces() as u32;
        Ok(SyzygyProber { tables, max_pieces })
    }

    fn to_position(board: &Board) -> Option<Chess> {
        let fen: Fen = board.to_fen().parse().ok()?;
        fen.into_position(CastlingMode::Chess960).ok()
    }
}

impl TablebaseProber for SyzygyProber {
    fn name(&self) -> &str {
        "syzygy"
    }

    fn max_pieces(&self) -> u32 {
        self.max_pieces
    }

    fn probe_wdl(&self, board: &Board) -> Option<Wdl> {
        let pos = Self::to_position(board)?;
        let wdl = self.tables.probe_wdl_after_zeroing(&pos).ok()?;
        Some(match wdl {
            SyzygyWdl::Loss => Wdl::Loss,
            SyzygyWdl::BlessedLoss => Wdl::BlessedLoss,
            SyzygyWdl::Draw => Wdl::Draw,
            SyzygyWdl::CursedWin => Wdl::CursedWin,
            SyzygyWdl::Win => Wdl::Win,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_directory_is_an_error() {
        assert!(SyzygyProber::open("/nonexistent/syzygy/tables").is_err());
    }

    #[test]
    fn test_board_converts_to_position() {
        let board: Board = "8/8/8/8/8/3k4/8/K1R5 w - - 0 1".parse().unwrap();
        assert!(SyzygyProber::to_position(&board).is_some());
    }
}
