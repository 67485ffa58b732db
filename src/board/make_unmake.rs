//! Making and unmaking moves.

use super::state::{castling_targets, Board, StateInfo};
use super::types::{Color, Move, MoveKind, Piece, Square};
use crate::zobrist::ZOBRIST;

impl Board {
    /// Play `mv`, which must be pseudo-legal in this position.
    ///
    /// Returns the state needed to take the move back with [`Board::unmake_move`].
    pub fn make_move(&mut self, mv: Move) -> StateInfo {
        let mut info = self.state_info();
        self.history.push(self.hash);

        let us = self.side_to_move;
        let them = us.opponent();
        let from = mv.from();
        let to = mv.to();

        if let Some(ep) = self.en_passant.take() {
            self.hash ^= ZOBRIST.en_passant(ep);
        }
        self.halfmove_clock += 1;

        if mv.kind() == MoveKind::Castling {
            let (king_to, rook_to) = castling_targets(us, to.file() > from.file());
            self.remove_piece(from);
            self.remove_piece(to);
            self.put_piece(us, Piece::King, king_to);
            self.put_piece(us, Piece::Rook, rook_to);
        } else {
            let captured = if mv.kind() == MoveKind::EnPassant {
                self.remove_piece(to.with_rank(from.rank()))
            } else {
                self.remove_piece(to)
            };
            if let Some((_, piece)) = captured {
                info.captured = Some(piece);
                self.halfmove_clock = 0;
            }

            if let Some((_, piece)) = self.remove_piece(from) {
                self.put_piece(us, mv.promotion_piece().unwrap_or(piece), to);
                if piece == Piece::Pawn {
                    self.halfmove_clock = 0;
                    if from.rank().abs_diff(to.rank()) == 2 {
                        let ep = from.with_rank((from.rank() + to.rank()) / 2);
                        if self.en_passant_capturable(ep, them) {
                            self.en_passant = Some(ep);
                            self.hash ^= ZOBRIST.en_passant(ep);
                        }
                    }
                }
            }
        }

        let lost = self.castling_rights_mask[from.index()] | self.castling_rights_mask[to.index()];
        if lost & self.castling.as_u8() != 0 {
            self.hash ^= ZOBRIST.castling(self.castling);
            self.castling.remove_mask(lost);
            self.hash ^= ZOBRIST.castling(self.castling);
        }

        if us == Color::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = them;
        self.hash ^= ZOBRIST.side();
        info
    }

    /// Take back `mv`, restoring the state captured by [`Board::make_move`].
    pub fn unmake_move(&mut self, mv: Move, info: StateInfo) {
        let us = self.side_to_move.opponent();
        let from = mv.from();
        let to = mv.to();
        self.side_to_move = us;
        if us == Color::Black {
            self.fullmove_number -= 1;
        }

        if mv.kind() == MoveKind::Castling {
            let (king_to, rook_to) = castling_targets(us, to.file() > from.file());
            self.remove_piece(king_to);
            self.remove_piece(rook_to);
            self.put_piece(us, Piece::King, from);
            self.put_piece(us, Piece::Rook, to);
        } else {
            if let Some((_, piece)) = self.remove_piece(to) {
                let original = if mv.is_promotion() { Piece::Pawn } else { piece };
                self.put_piece(us, original, from);
            }
            if let Some(captured) = info.captured {
                let capture_sq: Square = if mv.is_en_passant() {
                    to.with_rank(from.rank())
                } else {
                    to
                };
                self.put_piece(us.opponent(), captured, capture_sq);
            }
        }

        self.castling = info.castling;
        self.en_passant = info.en_passant;
        self.halfmove_clock = info.halfmove_clock;
        self.hash = info.hash;
        self.history.pop();
    }

    /// Pass the turn without moving (used by null-move pruning)
    pub fn make_null_move(&mut self) -> StateInfo {
        let info = self.state_info();
        self.history.push(self.hash);
        if let Some(ep) = self.en_passant.take() {
            self.hash ^= ZOBRIST.en_passant(ep);
        }
        self.halfmove_clock += 1;
        self.side_to_move = self.side_to_move.opponent();
        self.hash ^= ZOBRIST.side();
        info
    }

    pub fn unmake_null_move(&mut self, info: StateInfo) {
        self.side_to_move = self.side_to_move.opponent();
        self.en_passant = info.en_passant;
        self.halfmove_clock = info.halfmove_clock;
        self.hash = info.hash;
        self.history.pop();
    }
}
