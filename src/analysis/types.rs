//! Engine-independent result types handed to callers.

use std::fmt::{self, Write as _};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::board::Square;

/// Square value meaning "no square"
pub const SQUARE_NONE: u8 = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Promotion {
    #[default]
    None,
    Knight,
    Bishop,
    Rook,
    Queen,
}

/// A move as reported to callers.
///
/// Squares are numbered `0..=63` from a1 to h8, or [`SQUARE_NONE`]. Under
/// standard rules a castling move goes to the king's landing square; under
/// Chess960 rules it goes to the castling rook's square.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnalysisMove {
    pub from: u8,
    pub to: u8,
    pub promotion: Promotion,
}

impl AnalysisMove {
    /// "No move": both squares are `SQUARE_NONE`
    pub const NONE: AnalysisMove = AnalysisMove {
        from: SQUARE_NONE,
        to: SQUARE_NONE,
        promotion: Promotion::None,
    };

    #[must_use]
    pub const fn new(from: u8, to: u8, promotion: Promotion) -> Self {
        AnalysisMove { from, to, promotion }
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        self.from == SQUARE_NONE && self.to == SQUARE_NONE
    }
}

fn write_square(f: &mut impl fmt::Write, sq: u8) -> fmt::Result {
    if sq < SQUARE_NONE {
        write!(f, "{}", Square::from_index(sq as usize))
    } else {
        f.write_char('-')
    }
}

impl fmt::Display for AnalysisMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_square(f, self.from)?;
        write_square(f, self.to)?;
        f.write_str(format_promotion(self.promotion))
    }
}

/// Promotion letter: `""`, `"Q"`, `"R"`, `"N"` or `"B"`
#[must_use]
pub fn format_promotion(promotion: Promotion) -> &'static str {
    match promotion {
        Promotion::None => "",
        Promotion::Queen => "Q",
        Promotion::Rook => "R",
        Promotion::Knight => "N",
        Promotion::Bishop => "B",
    }
}

/// Each move as origin, destination and promotion letter, followed by a
/// single space (the last one included)
#[must_use]
pub fn format_move_sequence(moves: &[AnalysisMove]) -> String {
    let mut out = String::with_capacity(moves.len() * 6);
    for mv in moves {
        let _ = write!(out, "{mv} ");
    }
    out
}

/// One analysed line
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PrincipalVariation {
    /// Completed iterations, in plies
    pub depth: i32,
    pub selective_depth: i32,
    /// Centipawns, or moves to mate (negative when being mated) for mate scores
    pub score: i32,
    pub moves: Vec<AnalysisMove>,
}

impl PrincipalVariation {
    #[must_use]
    pub fn moves_to_string(&self) -> String {
        format_move_sequence(&self.moves)
    }
}

/// Snapshot of a finished analysis
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnalysisResult {
    /// Always at least 1
    pub elapsed_ms: u64,
    pub nodes_searched: u64,
    pub tablebase_hits: u64,
    /// Best line first
    pub variations: Vec<PrincipalVariation>,
}

impl AnalysisResult {
    /// Nodes per second
    #[must_use]
    pub fn nps(&self) -> u64 {
        self.nodes_searched * 1000 / self.elapsed_ms.max(1)
    }

    /// The primary line, if any
    #[must_use]
    pub fn best(&self) -> Option<&PrincipalVariation> {
        self.variations.first()
    }
}

/// How long to search. Exactly one limit per analysis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AnalysisLimit {
    /// Iterations (plies), at least 1
    Depth(u32),
    /// Nodes summed over every search thread
    Nodes(u64),
    /// Wall-clock milliseconds
    MoveTime(u64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_promotion_letters() {
        assert_eq!(format_promotion(Promotion::None), "");
        assert_eq!(format_promotion(Promotion::Queen), "Q");
        assert_eq!(format_promotion(Promotion::Rook), "R");
        assert_eq!(format_promotion(Promotion::Knight), "N");
        assert_eq!(format_promotion(Promotion::Bishop), "B");
    }

    #[test]
    fn test_format_move_sequence() {
        assert_eq!(format_move_sequence(&[]), "");
        let e2e4 = AnalysisMove::new(12, 28, Promotion::None);
        assert_eq!(format_move_sequence(&[e2e4]), "e2e4 ");
        let promo = AnalysisMove::new(52, 60, Promotion::Queen);
        assert_eq!(format_move_sequence(&[e2e4, promo]), "e2e4 e7e8Q ");
        assert_eq!(format_move_sequence(&[AnalysisMove::NONE]), "-- ");
    }

    #[test]
    fn test_moves_to_string_matches_sequence() {
        let pv = PrincipalVariation {
            depth: 3,
            selective_depth: 5,
            score: 20,
            moves: vec![AnalysisMove::new(6, 21, Promotion::None)],
        };
        assert_eq!(pv.moves_to_string(), "g1f3 ");
    }

    #[test]
    fn test_nps_guards_zero_elapsed() {
        let result = AnalysisResult {
            elapsed_ms: 0,
            nodes_searched: 5000,
            tablebase_hits: 0,
            variations: Vec::new(),
        };
        assert_eq!(result.nps(), 5_000_000);
        let result = AnalysisResult {
            elapsed_ms: 250,
            ..result
        };
        assert_eq!(result.nps(), 20_000);
        assert!(result.best().is_none());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_result_json_shape() {
        let result = AnalysisResult {
            elapsed_ms: 12,
            nodes_searched: 3400,
            tablebase_hits: 0,
            variations: vec![PrincipalVariation {
                depth: 2,
                selective_depth: 3,
                score: -35,
                moves: vec![AnalysisMove::new(52, 60, Promotion::Rook)],
            }],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["elapsed_ms"], 12);
        assert_eq!(json["variations"][0]["score"], -35);
        assert_eq!(json["variations"][0]["moves"][0]["promotion"], "Rook");
        let back: AnalysisResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn test_none_move() {
        assert!(AnalysisMove::NONE.is_none());
        assert!(!AnalysisMove::new(0, SQUARE_NONE, Promotion::None).is_none());
    }
}
