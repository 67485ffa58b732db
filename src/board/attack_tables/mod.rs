//! Attack tables for move generation.
//!
//! Uses Hyperbola Quintessence for sliding piece attacks (bishop, rook, queen).
//! This is a fast, branch-free algorithm that uses the `o^(o-2r)` trick.

#![allow(clippy::needless_range_loop)]

mod tables;

use once_cell::sync::Lazy;

use self::tables::{KING_ATTACKS, KNIGHT_ATTACKS, PAWN_ATTACKS};
use super::types::{Bitboard, Color, Piece, Square};

const FILE_A: u64 = 0x0101_0101_0101_0101;

fn ray_mask(sq: usize, dr: isize, df: isize) -> u64 {
    let mut mask = 1u64 << sq;
    for sign in [1, -1] {
        let mut r = (sq / 8) as isize + dr * sign;
        let mut f = (sq % 8) as isize + df * sign;
        while (0..8).contains(&r) && (0..8).contains(&f) {
            mask |= 1u64 << (r * 8 + f);
            r += dr * sign;
            f += df * sign;
        }
    }
    mask
}

/// Diagonal masks (a1-h8 direction) including the square itself
static DIAG_MASKS: Lazy<[u64; 64]> = Lazy::new(|| {
    let mut masks = [0u64; 64];
    for sq in 0..64 {
        masks[sq] = ray_mask(sq, 1, 1);
    }
    masks
});

/// Anti-diagonal masks (h1-a8 direction) including the square itself
static ANTI_MASKS: Lazy<[u64; 64]> = Lazy::new(|| {
    let mut masks = [0u64; 64];
    for sq in 0..64 {
        masks[sq] = ray_mask(sq, 1, -1);
    }
    masks
});

/// Rank attack lookup: `[8 * occupancy_6bit + file]` -> attacks on rank 1
static RANK_ATTACKS: Lazy<[u64; 512]> = Lazy::new(|| {
    let mut attacks = [0u64; 512];
    for occ_6bit in 0..64 {
        for file in 0..8 {
            let occupied = |f: usize| (1..=6).contains(&f) && occ_6bit & (1 << (f - 1)) != 0;
            let mut attack = 0u64;
            for f in (file + 1)..8 {
                attack |= 1u64 << f;
                if occupied(f) {
                    break;
                }
            }
            for f in (0..file).rev() {
                attack |= 1u64 << f;
                if occupied(f) {
                    break;
                }
            }
            attacks[8 * occ_6bit + file] = attack;
        }
    }
    attacks
});

/// Force every table so the first search does not pay for initialization.
pub(crate) fn init() {
    Lazy::force(&DIAG_MASKS);
    Lazy::force(&ANTI_MASKS);
    Lazy::force(&RANK_ATTACKS);
    Lazy::force(&KNIGHT_ATTACKS);
    Lazy::force(&KING_ATTACKS);
    Lazy::force(&PAWN_ATTACKS);
}

#[inline(always)]
fn hyp_quint(occupied: u64, mask: u64, square: usize) -> u64 {
    let piece_bit = 1u64 << square;
    let mask = mask & !piece_bit;
    let forward = occupied & mask;
    let backward = forward.swap_bytes();
    let forward_attacks = forward.wrapping_sub(piece_bit.wrapping_mul(2));
    let backward_attacks = backward
        .wrapping_sub(piece_bit.swap_bytes().wrapping_mul(2))
        .swap_bytes();
    (forward_attacks ^ backward_attacks) & mask
}

#[inline(always)]
fn rank_attacks(occupied: u64, square: usize) -> u64 {
    let rank = square / 8;
    let file = square % 8;
    let occ_6bit = ((occupied >> (rank * 8 + 1)) & 63) as usize;
    RANK_ATTACKS[8 * occ_6bit + file] << (rank * 8)
}

#[inline]
pub(crate) fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    let s = sq.index();
    Bitboard(hyp_quint(occupied.0, DIAG_MASKS[s], s) | hyp_quint(occupied.0, ANTI_MASKS[s], s))
}

#[inline]
pub(crate) fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    let s = sq.index();
    Bitboard(hyp_quint(occupied.0, FILE_A << (s % 8), s) | rank_attacks(occupied.0, s))
}

#[inline]
pub(crate) fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    bishop_attacks(sq, occupied) | rook_attacks(sq, occupied)
}

#[inline]
pub(crate) fn knight_attacks(sq: Square) -> Bitboard {
    Bitboard(KNIGHT_ATTACKS[sq.index()])
}

#[inline]
pub(crate) fn king_attacks(sq: Square) -> Bitboard {
    Bitboard(KING_ATTACKS[sq.index()])
}

/// Squares a pawn of `color` standing on `sq` attacks
#[inline]
pub(crate) fn pawn_attacks(color: Color, sq: Square) -> Bitboard {
    Bitboard(PAWN_ATTACKS[color.index()][sq.index()])
}

/// Attacks of a non-pawn piece
#[inline]
pub(crate) fn piece_attacks(piece: Piece, sq: Square, occupied: Bitboard) -> Bitboard {
    match piece {
        Piece::Knight => knight_attacks(sq),
        Piece::Bishop => bishop_attacks(sq, occupied),
        Piece::Rook => rook_attacks(sq, occupied),
        Piece::Queen => queen_attacks(sq, occupied),
        Piece::King => king_attacks(sq),
        Piece::Pawn => Bitboard::EMPTY,
    }
}
