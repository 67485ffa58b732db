//! Move types and move list.

use std::fmt;
use std::ops::Index;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::piece::Piece;
use super::square::Square;

/// Maximum search depth in plies
pub const MAX_PLY: usize = 128;

/// Upper bound on legal moves in any chess position
const MAX_MOVES: usize = 256;

const KIND_NORMAL: u16 = 0;
const KIND_PROMOTION: u16 = 1;
const KIND_EN_PASSANT: u16 = 2;
const KIND_CASTLING: u16 = 3;

/// What a move does beyond relocating one piece
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveKind {
    Normal,
    Promotion,
    EnPassant,
    Castling,
}

/// Compact 16-bit move representation.
///
/// Encoding:
/// - bits 0-5:   from square (0-63)
/// - bits 6-11:  to square (0-63)
/// - bits 12-13: promotion piece (knight, bishop, rook, queen)
/// - bits 14-15: move kind
///
/// Castling is stored as "king captures own rook": `to` is the origin square
/// of the castling rook. This encoding covers standard chess and Chess960
/// alike; the king's landing square is derived when the move is played.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Move(u16);

impl Move {
    /// Absence of a move
    pub const NONE: Move = Move(0);
    /// The "pass" used by null-move pruning (b1 to b1)
    pub const NULL: Move = Move(1 | (1 << 6));

    #[inline]
    const fn with_kind(from: Square, to: Square, kind: u16, promo: u16) -> Self {
        Move(from.index() as u16 | ((to.index() as u16) << 6) | (promo << 12) | (kind << 14))
    }

    /// Create a move that relocates one piece, capturing or not
    #[inline]
    #[must_use]
    pub const fn new(from: Square, to: Square) -> Self {
        Move::with_kind(from, to, KIND_NORMAL, 0)
    }

    /// Create a pawn promotion move
    #[inline]
    #[must_use]
    pub const fn promotion(from: Square, to: Square, piece: Piece) -> Self {
        let promo = match piece {
            Piece::Knight => 0,
            Piece::Bishop => 1,
            Piece::Rook => 2,
            _ => 3,
        };
        Move::with_kind(from, to, KIND_PROMOTION, promo)
    }

    /// Create an en passant capture
    #[inline]
    #[must_use]
    pub const fn en_passant(from: Square, to: Square) -> Self {
        Move::with_kind(from, to, KIND_EN_PASSANT, 0)
    }

    /// Create a castling move from the king square and the castling rook's square
    #[inline]
    #[must_use]
    pub const fn castling(king_from: Square, rook_from: Square) -> Self {
        Move::with_kind(king_from, rook_from, KIND_CASTLING, 0)
    }

    /// Get the source square
    #[inline]
    #[must_use]
    pub const fn from(self) -> Square {
        Square::from_index((self.0 & 0x3F) as usize)
    }

    /// Get the destination square (the rook's origin for castling)
    #[inline]
    #[must_use]
    pub const fn to(self) -> Square {
        Square::from_index(((self.0 >> 6) & 0x3F) as usize)
    }

    #[inline]
    #[must_use]
    pub const fn kind(self) -> MoveKind {
        match self.0 >> 14 {
            KIND_NORMAL => MoveKind::Normal,
            KIND_PROMOTION => MoveKind::Promotion,
            KIND_EN_PASSANT => MoveKind::EnPassant,
            _ => MoveKind::Castling,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_castling(self) -> bool {
        self.0 >> 14 == KIND_CASTLING
    }

    #[inline]
    #[must_use]
    pub const fn is_en_passant(self) -> bool {
        self.0 >> 14 == KIND_EN_PASSANT
    }

    #[inline]
    #[must_use]
    pub const fn is_promotion(self) -> bool {
        self.0 >> 14 == KIND_PROMOTION
    }

    /// Get the promotion piece, if this is a promotion move
    #[inline]
    #[must_use]
    pub const fn promotion_piece(self) -> Option<Piece> {
        if !self.is_promotion() {
            return None;
        }
        Some(match (self.0 >> 12) & 0x3 {
            0 => Piece::Knight,
            1 => Piece::Bishop,
            2 => Piece::Rook,
            _ => Piece::Queen,
        })
    }

    /// True for anything other than `NONE` and `NULL`
    #[inline]
    #[must_use]
    pub const fn is_ok(self) -> bool {
        self.from().index() != self.to().index()
    }

    /// Get the raw 16-bit encoding
    #[inline]
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Reconstruct a move from its raw encoding
    #[inline]
    #[must_use]
    pub const fn from_u16(value: u16) -> Self {
        Move(value)
    }
}

impl Default for Move {
    fn default() -> Self {
        Move::NONE
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            MoveKind::Castling => write!(f, "Move({}{} castling)", self.from(), self.to()),
            MoveKind::EnPassant => write!(f, "Move({}{} ep)", self.from(), self.to()),
            _ => write!(f, "Move({self})"),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Move::NONE {
            return write!(f, "(none)");
        }
        if *self == Move::NULL {
            return write!(f, "0000");
        }
        write!(f, "{}{}", self.from(), self.to())?;
        if let Some(piece) = self.promotion_piece() {
            write!(f, "{}", piece.to_char())?;
        }
        Ok(())
    }
}

/// Fixed-capacity move list, stack allocated.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; MAX_MOVES],
    len: usize,
}

impl MoveList {
    #[must_use]
    pub fn new() -> Self {
        MoveList {
            moves: [Move::NONE; MAX_MOVES],
            len: 0,
        }
    }

    #[inline]
    pub(crate) fn push(&mut self, mv: Move) {
        debug_assert!(self.len < MAX_MOVES);
        self.moves[self.len] = mv;
        self.len += 1;
    }

    /// Remove the move at `idx` by swapping in the last one
    #[inline]
    pub(crate) fn swap_remove(&mut self, idx: usize) {
        self.len -= 1;
        self.moves[idx] = self.moves[self.len];
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.as_slice().iter()
    }

    #[must_use]
    pub fn contains(&self, mv: Move) -> bool {
        self.as_slice().contains(&mv)
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MoveList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Index<usize> for MoveList {
    type Output = Move;

    fn index(&self, idx: usize) -> &Self::Output {
        &self.as_slice()[idx]
    }
}
