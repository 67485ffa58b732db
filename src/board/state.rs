//! Board state and queries.

use super::attack_tables::{
    bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks,
};
use super::types::{Bitboard, CastlingRights, Color, Piece, Square};
use crate::zobrist::ZOBRIST;

/// Snapshot of the irreversible parts of a position.
///
/// Returned by [`Board::make_move`] and consumed by [`Board::unmake_move`].
/// A session keeps a stack of these for the position it currently holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateInfo {
    pub(crate) captured: Option<Piece>,
    pub(crate) castling: CastlingRights,
    pub(crate) en_passant: Option<Square>,
    pub(crate) halfmove_clock: u32,
    pub(crate) hash: u64,
}

impl StateInfo {
    #[must_use]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[must_use]
    pub fn captured(&self) -> Option<Piece> {
        self.captured
    }
}

/// A chess position with bitboards, a mailbox and incremental Zobrist hashing.
#[derive(Clone, Debug)]
pub struct Board {
    pub(crate) pieces: [[Bitboard; 6]; 2],
    pub(crate) colors: [Bitboard; 2],
    pub(crate) occupied: Bitboard,
    pub(crate) mailbox: [Option<(Color, Piece)>; 64],
    pub(crate) side_to_move: Color,
    pub(crate) castling: CastlingRights,
    /// Origin square of the rook for each castling right, by `CastlingRights::slot`
    pub(crate) castling_rooks: [Option<Square>; 4],
    /// Rights lost when a piece leaves or enters a square
    pub(crate) castling_rights_mask: [u8; 64],
    pub(crate) en_passant: Option<Square>,
    pub(crate) halfmove_clock: u32,
    pub(crate) fullmove_number: u32,
    pub(crate) hash: u64,
    pub(crate) chess960: bool,
    /// Keys of the positions before each move played on this board
    pub(crate) history: Vec<u64>,
}

impl Board {
    pub(crate) fn empty() -> Self {
        Board {
            pieces: [[Bitboard::EMPTY; 6]; 2],
            colors: [Bitboard::EMPTY; 2],
            occupied: Bitboard::EMPTY,
            mailbox: [None; 64],
            side_to_move: Color::White,
            castling: CastlingRights::none(),
            castling_rooks: [None; 4],
            castling_rights_mask: [0; 64],
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            hash: 0,
            chess960: false,
            history: Vec::with_capacity(256),
        }
    }

    #[inline]
    #[must_use]
    pub fn piece_at(&self, sq: Square) -> Option<(Color, Piece)> {
        self.mailbox[sq.index()]
    }

    #[inline]
    #[must_use]
    pub fn pieces(&self, color: Color, piece: Piece) -> Bitboard {
        self.pieces[color.index()][piece.index()]
    }

    #[inline]
    #[must_use]
    pub fn color_bb(&self, color: Color) -> Bitboard {
        self.colors[color.index()]
    }

    #[inline]
    #[must_use]
    pub fn occupied(&self) -> Bitboard {
        self.occupied
    }

    #[inline]
    #[must_use]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    #[must_use]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling
    }

    /// Origin square of the rook a castling right refers to
    #[must_use]
    pub fn castling_rook(&self, color: Color, kingside: bool) -> Option<Square> {
        if self.castling.has(color, kingside) {
            self.castling_rooks[CastlingRights::slot(color, kingside)]
        } else {
            None
        }
    }

    #[inline]
    #[must_use]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline]
    #[must_use]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    #[must_use]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Zobrist key of the position
    #[inline]
    #[must_use]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    #[must_use]
    pub fn is_chess960(&self) -> bool {
        self.chess960
    }

    /// Snapshot of the current irreversible state
    #[must_use]
    pub fn state_info(&self) -> StateInfo {
        StateInfo {
            captured: None,
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            hash: self.hash,
        }
    }

    #[inline]
    #[must_use]
    pub fn king_square(&self, color: Color) -> Square {
        let kings = self.pieces(color, Piece::King);
        debug_assert!(!kings.is_empty());
        Square::from_index(kings.0.trailing_zeros() as usize & 63)
    }

    /// Number of pieces on the board, kings included
    #[inline]
    #[must_use]
    pub fn piece_count(&self) -> u32 {
        self.occupied.popcount()
    }

    #[must_use]
    pub fn has_non_pawn_material(&self, color: Color) -> bool {
        let c = color.index();
        !(self.pieces[c][Piece::Knight.index()]
            | self.pieces[c][Piece::Bishop.index()]
            | self.pieces[c][Piece::Rook.index()]
            | self.pieces[c][Piece::Queen.index()])
        .is_empty()
    }

    /// All pieces of either color attacking `sq` given an occupancy
    #[must_use]
    pub(crate) fn attackers_to(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        let [w, b] = [Color::White.index(), Color::Black.index()];
        let bishops_queens = self.pieces[w][Piece::Bishop.index()]
            | self.pieces[b][Piece::Bishop.index()]
            | self.pieces[w][Piece::Queen.index()]
            | self.pieces[b][Piece::Queen.index()];
        let rooks_queens = self.pieces[w][Piece::Rook.index()]
            | self.pieces[b][Piece::Rook.index()]
            | self.pieces[w][Piece::Queen.index()]
            | self.pieces[b][Piece::Queen.index()];
        let knights = self.pieces[w][Piece::Knight.index()] | self.pieces[b][Piece::Knight.index()];
        let kings = self.pieces[w][Piece::King.index()] | self.pieces[b][Piece::King.index()];

        (pawn_attacks(Color::Black, sq) & self.pieces[w][Piece::Pawn.index()])
            | (pawn_attacks(Color::White, sq) & self.pieces[b][Piece::Pawn.index()])
            | (knight_attacks(sq) & knights)
            | (king_attacks(sq) & kings)
            | (bishop_attacks(sq, occupied) & bishops_queens)
            | (rook_attacks(sq, occupied) & rooks_queens)
    }

    /// Whether any piece of `by` attacks `sq`
    #[inline]
    #[must_use]
    pub fn is_attacked_by(&self, sq: Square, by: Color) -> bool {
        !(self.attackers_to(sq, self.occupied) & self.color_bb(by)).is_empty()
    }

    /// Whether the side to move is in check
    #[inline]
    #[must_use]
    pub fn in_check(&self) -> bool {
        let us = self.side_to_move;
        self.is_attacked_by(self.king_square(us), us.opponent())
    }

    /// Whether the current position already occurred with the same side to
    /// move since the last irreversible move.
    #[must_use]
    pub fn is_repetition(&self) -> bool {
        let len = self.history.len();
        let window = (self.halfmove_clock as usize).min(len);
        (2..=window)
            .step_by(2)
            .any(|back| self.history[len - back] == self.hash)
    }

    /// Draw by the fifty-move rule or by repetition
    #[must_use]
    pub fn is_draw(&self) -> bool {
        self.halfmove_clock >= 100 || self.is_repetition()
    }

    /// Neither side can ever deliver mate
    #[must_use]
    pub fn is_insufficient_material(&self) -> bool {
        let heavy = Piece::ALL
            .iter()
            .filter(|p| matches!(p, Piece::Pawn | Piece::Rook | Piece::Queen))
            .any(|&p| !(self.pieces(Color::White, p) | self.pieces(Color::Black, p)).is_empty());
        if heavy {
            return false;
        }
        let knights = self.pieces(Color::White, Piece::Knight) | self.pieces(Color::Black, Piece::Knight);
        let bishops = self.pieces(Color::White, Piece::Bishop) | self.pieces(Color::Black, Piece::Bishop);
        let minors = knights.popcount() + bishops.popcount();
        if minors <= 1 {
            return true;
        }
        // Any number of bishops all on one square color
        knights.is_empty()
            && ((bishops & Bitboard::LIGHT_SQUARES).is_empty()
                || (bishops & !Bitboard::LIGHT_SQUARES).is_empty())
    }

    #[inline]
    pub(crate) fn put_piece(&mut self, color: Color, piece: Piece, sq: Square) {
        let bb = Bitboard::from_square(sq);
        self.pieces[color.index()][piece.index()] |= bb;
        self.colors[color.index()] |= bb;
        self.occupied |= bb;
        self.mailbox[sq.index()] = Some((color, piece));
        self.hash ^= ZOBRIST.piece(color, piece, sq);
    }

    #[inline]
    pub(crate) fn remove_piece(&mut self, sq: Square) -> Option<(Color, Piece)> {
        let (color, piece) = self.mailbox[sq.index()]?;
        let bb = Bitboard::from_square(sq);
        self.pieces[color.index()][piece.index()] ^= bb;
        self.colors[color.index()] ^= bb;
        self.occupied ^= bb;
        self.mailbox[sq.index()] = None;
        self.hash ^= ZOBRIST.piece(color, piece, sq);
        Some((color, piece))
    }

    /// Recompute the Zobrist key from scratch
    pub(crate) fn compute_hash(&self) -> u64 {
        let mut hash = 0u64;
        for (idx, slot) in self.mailbox.iter().enumerate() {
            if let Some((color, piece)) = *slot {
                hash ^= ZOBRIST.piece(color, piece, Square::from_index(idx));
            }
        }
        if self.side_to_move == Color::Black {
            hash ^= ZOBRIST.side();
        }
        hash ^= ZOBRIST.castling(self.castling);
        if let Some(ep) = self.en_passant {
            hash ^= ZOBRIST.en_passant(ep);
        }
        hash
    }

    /// Whether a pawn of the side to move could capture on `ep`
    pub(crate) fn en_passant_capturable(&self, ep: Square, capturer: Color) -> bool {
        !(pawn_attacks(capturer.opponent(), ep) & self.pieces(capturer, Piece::Pawn)).is_empty()
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

/// King and rook landing squares for a castling move
#[inline]
pub(crate) fn castling_targets(color: Color, kingside: bool) -> (Square, Square) {
    let rank = color.back_rank();
    if kingside {
        (Square::at(rank, 6), Square::at(rank, 5))
    } else {
        (Square::at(rank, 2), Square::at(rank, 3))
    }
}
