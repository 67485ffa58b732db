//! Zobrist hashing for chess positions.
//!
//! Provides incrementally-updatable 64-bit position keys for the
//! transposition table and repetition detection.

use once_cell::sync::Lazy;
use rand::prelude::*;

use crate::board::{CastlingRights, Color, Piece, Square};

pub(crate) struct ZobristKeys {
    /// `piece_keys[color][piece][square]`
    piece_keys: [[[u64; 64]; 6]; 2],
    black_to_move: u64,
    /// One key per castling-rights bitmask (16 combinations)
    castling_keys: [u64; 16],
    /// En passant keys by file
    en_passant_keys: [u64; 8],
}

impl ZobristKeys {
    fn new() -> Self {
        // Fixed seed: keys must be identical across runs and threads
        let mut rng = StdRng::seed_from_u64(1_234_567_890_u64);
        let mut piece_keys = [[[0u64; 64]; 6]; 2];
        for color in &mut piece_keys {
            for piece in color.iter_mut() {
                for key in piece.iter_mut() {
                    *key = rng.gen();
                }
            }
        }
        let black_to_move = rng.gen();

        // Combined rights hash as the XOR of their single-right keys
        let single: [u64; 4] = rng.gen();
        let mut castling_keys = [0u64; 16];
        for (mask, key) in castling_keys.iter_mut().enumerate() {
            for (bit, single_key) in single.iter().enumerate() {
                if mask & (1 << bit) != 0 {
                    *key ^= single_key;
                }
            }
        }

        let en_passant_keys = rng.gen();

        ZobristKeys {
            piece_keys,
            black_to_move,
            castling_keys,
            en_passant_keys,
        }
    }

    #[inline]
    pub(crate) fn piece(&self, color: Color, piece: Piece, sq: Square) -> u64 {
        self.piece_keys[color.index()][piece.index()][sq.index()]
    }

    #[inline]
    pub(crate) fn side(&self) -> u64 {
        self.black_to_move
    }

    #[inline]
    pub(crate) fn castling(&self, rights: CastlingRights) -> u64 {
        self.castling_keys[rights.as_u8() as usize]
    }

    #[inline]
    pub(crate) fn en_passant(&self, sq: Square) -> u64 {
        self.en_passant_keys[sq.file()]
    }
}

pub(crate) static ZOBRIST: Lazy<ZobristKeys> = Lazy::new(ZobristKeys::new);

pub(crate) fn init() {
    Lazy::force(&ZOBRIST);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_castling_keys_compose() {
        let keys = &*ZOBRIST;
        assert_eq!(keys.castling_keys[0], 0);
        assert_eq!(
            keys.castling_keys[0b0011],
            keys.castling_keys[0b0001] ^ keys.castling_keys[0b0010]
        );
    }

    #[test]
    fn test_piece_keys_distinct() {
        let keys = &*ZOBRIST;
        let a = keys.piece(Color::White, Piece::Pawn, Square::A1);
        let b = keys.piece(Color::Black, Piece::Pawn, Square::A1);
        let c = keys.piece(Color::White, Piece::Knight, Square::A1);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }
}
