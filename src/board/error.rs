//! Error types for chess board operations.

use thiserror::Error;

/// Error type for FEN parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    /// FEN string has too few fields (needs at least 4)
    #[error("FEN must have at least 4 fields, found {found}")]
    TooFewParts { found: usize },
    /// Invalid piece character in the placement field
    #[error("invalid piece character '{char}' in FEN")]
    InvalidPiece { char: char },
    /// Placement field does not describe exactly 8 ranks
    #[error("FEN placement must have 8 ranks, found {found}")]
    WrongRankCount { found: usize },
    /// A rank does not describe exactly 8 files
    #[error("rank {rank} describes {files} files, expected 8")]
    WrongFileCount { rank: usize, files: usize },
    /// Each side needs exactly one king
    #[error("{color} must have exactly one king, found {found}")]
    KingCount { color: &'static str, found: u32 },
    /// Pawns on the first or last rank
    #[error("pawn on back rank at {square}")]
    PawnOnBackRank { square: String },
    /// Invalid side to move (must be 'w' or 'b')
    #[error("invalid side to move '{found}', expected 'w' or 'b'")]
    InvalidSideToMove { found: String },
    /// Castling character that names no usable rook
    #[error("invalid castling character '{char}' in FEN")]
    InvalidCastling { char: char },
    /// Invalid en passant square
    #[error("invalid en passant square '{found}'")]
    InvalidEnPassant { found: String },
    /// Half-move clock or move number is not a number
    #[error("invalid move counter '{found}'")]
    InvalidCounter { found: String },
    /// The side not to move is in check
    #[error("side not to move is in check")]
    OpponentInCheck,
}

/// Error type for square parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SquareError {
    #[error("invalid square notation '{notation}'")]
    InvalidNotation { notation: String },
    #[error("square index {index} out of bounds (0-63)")]
    IndexOutOfBounds { index: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fen_error_display() {
        let err = FenError::TooFewParts { found: 2 };
        assert_eq!(err.to_string(), "FEN must have at least 4 fields, found 2");
        let err = FenError::InvalidCastling { char: 'X' };
        assert!(err.to_string().contains('X'));
    }

    #[test]
    fn test_square_error_display() {
        let err = SquareError::IndexOutOfBounds { index: 99 };
        assert!(err.to_string().contains("99"));
    }
}
