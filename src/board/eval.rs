//! Static evaluation: tapered material and piece-square tables.
//!
//! Scores are in internal value units where a pawn in the endgame is worth
//! [`PAWN_VALUE_EG`]. Conversion to centipawns happens at the reporting layer.

use once_cell::sync::Lazy;

use super::state::Board;
use super::types::{Color, Piece, Square};

pub const PAWN_VALUE_MG: i32 = 136;
pub const PAWN_VALUE_EG: i32 = 208;

/// Middlegame and endgame material, indexed by `Piece::index`
const MATERIAL: [(i32, i32); 6] = [
    (PAWN_VALUE_MG, PAWN_VALUE_EG),
    (782, 865),
    (830, 918),
    (1289, 1378),
    (2529, 2687),
    (0, 0),
];

const PHASE_WEIGHT: [i32; 6] = [0, 1, 1, 2, 4, 0];
const MAX_PHASE: i32 = 24;
const BISHOP_PAIR: (i32, i32) = (50, 70);
const TEMPO: i32 = 28;

/// Distance from the centre, 1 (d4/e5 ring) to 7 (edges)
fn centre_distance(sq: Square) -> i32 {
    let f = (sq.file() as i32 * 2 - 7).abs();
    let r = (sq.rank() as i32 * 2 - 7).abs();
    f.max(r)
}

fn square_bonus(piece: Piece, sq: Square) -> (i32, i32) {
    let rank = sq.rank() as i32;
    let file = sq.file();
    let dist = centre_distance(sq);
    match piece {
        Piece::Pawn => {
            let central = if (3..=4).contains(&file) && (2..=4).contains(&rank) { 20 } else { 0 };
            ((rank - 1) * 6 + central, (rank - 1) * 14)
        }
        Piece::Knight => (40 - dist * 12, 30 - dist * 10),
        Piece::Bishop => (20 - dist * 6, 20 - dist * 6),
        Piece::Rook => {
            let seventh = if rank == 6 { 30 } else { 0 };
            let central = if (2..=5).contains(&file) { 8 } else { 0 };
            (seventh + central, seventh * 2 / 3)
        }
        Piece::Queen => (10 - dist * 3, 30 - dist * 8),
        Piece::King => {
            let shelter = match (rank, file) {
                (0, 0..=2 | 6..=7) => 20,
                (0, _) => 0,
                _ => -(40 * rank).min(150),
            };
            (shelter, 50 - dist * 14)
        }
    }
}

/// `[piece][square]` tables from White's point of view, material included
static PIECE_SQUARE: Lazy<[[(i32, i32); 64]; 6]> = Lazy::new(|| {
    let mut table = [[(0, 0); 64]; 6];
    for piece in Piece::ALL {
        let (mg, eg) = MATERIAL[piece.index()];
        for (idx, slot) in table[piece.index()].iter_mut().enumerate() {
            let (bmg, beg) = square_bonus(piece, Square::from_index(idx));
            *slot = (mg + bmg, eg + beg);
        }
    }
    table
});

pub(crate) fn init() {
    Lazy::force(&PIECE_SQUARE);
}

impl Board {
    /// Static evaluation from the side to move's point of view
    #[must_use]
    pub fn evaluate(&self) -> i32 {
        if self.is_insufficient_material() {
            return 0;
        }

        let mut mg = 0;
        let mut eg = 0;
        let mut phase = 0;
        for color in Color::BOTH {
            let sign = if color == Color::White { 1 } else { -1 };
            for piece in Piece::ALL {
                let bb = self.pieces(color, piece);
                phase += PHASE_WEIGHT[piece.index()] * bb.popcount() as i32;
                for sq in bb {
                    let sq = if color == Color::White { sq } else { sq.flip_vertical() };
                    let (m, e) = PIECE_SQUARE[piece.index()][sq.index()];
                    mg += sign * m;
                    eg += sign * e;
                }
            }
            if self.pieces(color, Piece::Bishop).more_than_one() {
                mg += sign * BISHOP_PAIR.0;
                eg += sign * BISHOP_PAIR.1;
            }
        }

        let phase = phase.min(MAX_PHASE);
        let score = (mg * phase + eg * (MAX_PHASE - phase)) / MAX_PHASE;
        let score = if self.side_to_move == Color::White { score } else { -score };
        score + TEMPO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_position_is_balanced() {
        let board = Board::new();
        assert_eq!(board.evaluate(), TEMPO);
    }

    #[test]
    fn test_eval_is_color_symmetric() {
        let white: Board = "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1".parse().unwrap();
        let black: Board = "4k3/4p3/8/8/8/8/8/4K3 b - - 0 1".parse().unwrap();
        assert_eq!(white.evaluate(), black.evaluate());
    }

    #[test]
    fn test_extra_queen_is_winning() {
        let board: Board = "4k3/8/8/8/8/8/8/3QK3 w - - 0 1".parse().unwrap();
        assert!(board.evaluate() > 2000);
    }

    #[test]
    fn test_dead_draw_is_zero() {
        let board: Board = "4k3/8/8/8/8/8/8/3NK3 w - - 0 1".parse().unwrap();
        assert_eq!(board.evaluate(), 0);
    }
}
