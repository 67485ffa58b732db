//! Move generation.
//!
//! Pseudo-legal moves are generated from bitboards and filtered for legality
//! by playing each move and testing whether the mover's king is attacked.

use super::attack_tables::{pawn_attacks, piece_attacks};
use super::state::{castling_targets, Board};
use super::types::{Bitboard, Color, Move, MoveList, Piece, Square, PROMOTION_PIECES};

impl Board {
    /// All legal moves in this position
    pub fn generate_moves(&mut self) -> MoveList {
        let mut list = MoveList::new();
        self.generate_pseudo_legal(&mut list, false);
        self.retain_legal(&mut list);
        list
    }

    /// Legal captures and queen promotions, for quiescence search
    pub fn generate_captures(&mut self) -> MoveList {
        let mut list = MoveList::new();
        self.generate_pseudo_legal(&mut list, true);
        self.retain_legal(&mut list);
        list
    }

    /// Whether the side to move has at least one legal move
    pub fn has_legal_moves(&mut self) -> bool {
        let mut list = MoveList::new();
        self.generate_pseudo_legal(&mut list, false);
        list.iter().any(|&mv| self.is_legal(mv))
    }

    /// Whether pseudo-legal `mv` leaves the mover's king safe
    pub fn is_legal(&mut self, mv: Move) -> bool {
        let us = self.side_to_move;
        let info = self.make_move(mv);
        let legal = !self.is_attacked_by(self.king_square(us), us.opponent());
        self.unmake_move(mv, info);
        legal
    }

    fn retain_legal(&mut self, list: &mut MoveList) {
        let mut i = 0;
        while i < list.len() {
            if self.is_legal(list[i]) {
                i += 1;
            } else {
                list.swap_remove(i);
            }
        }
    }

    pub(crate) fn generate_pseudo_legal(&self, list: &mut MoveList, captures_only: bool) {
        let us = self.side_to_move;
        let them = self.color_bb(us.opponent());
        let targets = if captures_only { them } else { !self.color_bb(us) };

        self.generate_pawn_moves(list, captures_only);

        for piece in [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen, Piece::King] {
            for from in self.pieces(us, piece) {
                for to in piece_attacks(piece, from, self.occupied) & targets {
                    list.push(Move::new(from, to));
                }
            }
        }

        if !captures_only && !self.castling.is_empty() {
            self.generate_castling(list);
        }
    }

    fn generate_pawn_moves(&self, list: &mut MoveList, captures_only: bool) {
        let us = self.side_to_move;
        let them = self.color_bb(us.opponent());
        let promo_rank = us.pawn_promotion_rank();
        let forward: isize = if us == Color::White { 1 } else { -1 };

        for from in self.pieces(us, Piece::Pawn) {
            let one_rank = (from.rank() as isize + forward) as usize;
            let one = from.with_rank(one_rank);

            if !self.occupied.contains(one) {
                if one_rank == promo_rank {
                    push_promotions(list, from, one, captures_only);
                } else if !captures_only {
                    list.push(Move::new(from, one));
                    if from.rank() == us.pawn_start_rank() {
                        let two = from.with_rank((one_rank as isize + forward) as usize);
                        if !self.occupied.contains(two) {
                            list.push(Move::new(from, two));
                        }
                    }
                }
            }

            let attacks = pawn_attacks(us, from);
            for to in attacks & them {
                if to.rank() == promo_rank {
                    push_promotions(list, from, to, captures_only);
                } else {
                    list.push(Move::new(from, to));
                }
            }
            if let Some(ep) = self.en_passant {
                if attacks.contains(ep) {
                    list.push(Move::en_passant(from, ep));
                }
            }
        }
    }

    /// Castling for standard chess and Chess960 alike: every square the king
    /// and rook pass over or land on must be empty apart from the two
    /// castling pieces, and the king may not start on, cross or land on an
    /// attacked square.
    fn generate_castling(&self, list: &mut MoveList) {
        let us = self.side_to_move;
        let king = self.king_square(us);
        for kingside in [true, false] {
            let Some(rook) = self.castling_rook(us, kingside) else {
                continue;
            };
            let (king_to, rook_to) = castling_targets(us, kingside);
            let movers = Bitboard::from_square(king) | Bitboard::from_square(rook);
            let path = (Bitboard::rank_span(king, king_to) | Bitboard::rank_span(rook, rook_to)) & !movers;
            if !(path & self.occupied).is_empty() {
                continue;
            }
            let king_path = Bitboard::rank_span(king, king_to);
            if king_path
                .iter()
                .any(|sq| self.is_attacked_by(sq, us.opponent()))
            {
                continue;
            }
            list.push(Move::castling(king, rook));
        }
    }
}

fn push_promotions(list: &mut MoveList, from: Square, to: Square, queen_only: bool) {
    if queen_only {
        list.push(Move::promotion(from, to, Piece::Queen));
        return;
    }
    for piece in PROMOTION_PIECES {
        list.push(Move::promotion(from, to, piece));
    }
}
