//! Conversion between internal moves and [`AnalysisMove`].

use super::types::{AnalysisMove, Promotion};
use crate::board::{Board, Move, Piece, Square};

fn promotion_of(piece: Piece) -> Promotion {
    match piece {
        Piece::Knight => Promotion::Knight,
        Piece::Bishop => Promotion::Bishop,
        Piece::Rook => Promotion::Rook,
        Piece::Queen => Promotion::Queen,
        Piece::Pawn | Piece::King => Promotion::None,
    }
}

/// External form of an internal move.
///
/// Castling is stored king-takes-rook. Under standard rules the destination
/// becomes the king's landing square (g- or c-file on the king's rank);
/// under Chess960 rules the rook square is kept.
#[must_use]
pub fn encode(mv: Move, chess960: bool) -> AnalysisMove {
    if mv == Move::NONE || mv == Move::NULL {
        return AnalysisMove::NONE;
    }
    let from = mv.from();
    let mut to = mv.to();
    if mv.is_castling() && !chess960 {
        let file = if to.file() > from.file() { 6 } else { 2 };
        to = Square::at(from.rank(), file);
    }
    let promotion = mv.promotion_piece().map_or(Promotion::None, promotion_of);
    AnalysisMove::new(from.index() as u8, to.index() as u8, promotion)
}

/// The legal move of `board` that `mv` denotes.
///
/// Castling is accepted both as king-to-landing-square and as
/// king-takes-rook, whatever the board's castling rules.
#[must_use]
pub fn decode(mv: AnalysisMove, board: &Board) -> Option<Move> {
    if mv.is_none() {
        return None;
    }
    let mut board = board.clone();
    let chess960 = board.is_chess960();
    let legal = board.generate_moves();
    legal
        .iter()
        .copied()
        .find(|&m| encode(m, chess960) == mv)
        .or_else(|| legal.iter().copied().find(|&m| m.is_castling() && encode(m, !chess960) == mv))
}
