//! FEN parsing and serialization.
//!
//! Castling fields accept the classic `KQkq` letters as well as Shredder and
//! X-FEN file letters (`HAha`, `Bg`, ...), which identify the castling rook
//! by its file. Both forms work for standard chess and Chess960.

use std::str::FromStr;

use super::error::FenError;
use super::state::Board;
use super::types::{Bitboard, CastlingRights, Color, Piece, Square};

/// FEN of the standard starting position
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl Board {
    /// The standard starting position
    #[must_use]
    pub fn new() -> Self {
        Board::from_fen(START_FEN, false).expect("start position FEN is valid")
    }

    /// Parse a FEN string. `chess960` marks the position as using Chess960
    /// castling conventions for move output.
    pub fn from_fen(fen: &str, chess960: bool) -> Result<Self, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(FenError::TooFewParts { found: parts.len() });
        }

        let mut board = Board::empty();
        board.chess960 = chess960;
        parse_placement(&mut board, parts[0])?;

        board.side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(FenError::InvalidSideToMove {
                    found: other.to_string(),
                })
            }
        };

        parse_castling(&mut board, parts[2])?;

        if parts[3] != "-" {
            let ep: Square = parts[3].parse().map_err(|_| FenError::InvalidEnPassant {
                found: parts[3].to_string(),
            })?;
            let expected_rank = if board.side_to_move == Color::White { 5 } else { 2 };
            if ep.rank() != expected_rank {
                return Err(FenError::InvalidEnPassant {
                    found: parts[3].to_string(),
                });
            }
            // Only keep the square when a capture is possible so equal
            // positions hash equally
            if board.en_passant_capturable(ep, board.side_to_move) {
                board.en_passant = Some(ep);
            }
        }

        board.halfmove_clock = parse_counter(parts.get(4).copied(), 0)?;
        board.fullmove_number = parse_counter(parts.get(5).copied(), 1)?.max(1);

        let them = board.side_to_move.opponent();
        if board.is_attacked_by(board.king_square(them), board.side_to_move) {
            return Err(FenError::OpponentInCheck);
        }

        board.hash = board.compute_hash();
        Ok(board)
    }

    /// Serialize the position to FEN
    #[must_use]
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(90);
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match self.piece_at(Square::at(rank, file)) {
                    Some((color, piece)) => {
                        if empty > 0 {
                            fen.push(char::from(b'0' + empty));
                            empty = 0;
                        }
                        fen.push(piece.to_fen_char(color));
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push(char::from(b'0' + empty));
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(if self.side_to_move == Color::White { 'w' } else { 'b' });
        fen.push(' ');

        let mut any = false;
        for color in Color::BOTH {
            for kingside in [true, false] {
                if let Some(rook) = self.castling_rook(color, kingside) {
                    fen.push(self.castling_char(color, kingside, rook));
                    any = true;
                }
            }
        }
        if !any {
            fen.push('-');
        }

        fen.push(' ');
        match self.en_passant {
            Some(ep) => fen.push_str(&ep.to_string()),
            None => fen.push('-'),
        }
        fen.push_str(&format!(" {} {}", self.halfmove_clock, self.fullmove_number));
        fen
    }

    /// `K`/`Q` when the rook is the outermost one on its wing, else its file
    fn castling_char(&self, color: Color, kingside: bool, rook: Square) -> char {
        let rooks = self.pieces(color, Piece::Rook) & Bitboard::rank_mask(color.back_rank());
        let outermost = if kingside { rooks.msb() } else { rooks.lsb() };
        let c = if outermost == Some(rook) {
            if kingside {
                'k'
            } else {
                'q'
            }
        } else {
            char::from(b'a' + rook.file() as u8)
        };
        if color == Color::White {
            c.to_ascii_uppercase()
        } else {
            c
        }
    }
}

impl FromStr for Board {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Board::from_fen(s, false)
    }
}

fn parse_placement(board: &mut Board, placement: &str) -> Result<(), FenError> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::WrongRankCount { found: ranks.len() });
    }
    for (i, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - i;
        let mut file = 0usize;
        for c in rank_str.chars() {
            if let Some(skip) = c.to_digit(10) {
                file += skip as usize;
                continue;
            }
            let piece = Piece::from_char(c).ok_or(FenError::InvalidPiece { char: c })?;
            if file >= 8 {
                return Err(FenError::WrongFileCount { rank: rank + 1, files: file + 1 });
            }
            let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
            let sq = Square::at(rank, file);
            if piece == Piece::Pawn && (rank == 0 || rank == 7) {
                return Err(FenError::PawnOnBackRank { square: sq.to_string() });
            }
            board.put_piece(color, piece, sq);
            file += 1;
        }
        if file != 8 {
            return Err(FenError::WrongFileCount { rank: rank + 1, files: file });
        }
    }
    for (color, name) in [(Color::White, "white"), (Color::Black, "black")] {
        let found = board.pieces(color, Piece::King).popcount();
        if found != 1 {
            return Err(FenError::KingCount { color: name, found });
        }
    }
    Ok(())
}

fn parse_castling(board: &mut Board, field: &str) -> Result<(), FenError> {
    if field == "-" {
        return Ok(());
    }
    for c in field.chars() {
        let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
        let back_rank = color.back_rank();
        let king = board.king_square(color);
        if king.rank() != back_rank {
            return Err(FenError::InvalidCastling { char: c });
        }
        let rooks = board.pieces(color, Piece::Rook) & Bitboard::rank_mask(back_rank);

        let rook = match c.to_ascii_lowercase() {
            'k' => rooks.iter().filter(|r| r.file() > king.file()).last(),
            'q' => rooks.iter().find(|r| r.file() < king.file()),
            f @ 'a'..='h' => {
                let sq = Square::at(back_rank, (f as u8 - b'a') as usize);
                rooks.contains(sq).then_some(sq)
            }
            _ => None,
        }
        .ok_or(FenError::InvalidCastling { char: c })?;

        if rook.file() == king.file() {
            return Err(FenError::InvalidCastling { char: c });
        }
        let kingside = rook.file() > king.file();
        board.castling.set(color, kingside);
        board.castling_rooks[CastlingRights::slot(color, kingside)] = Some(rook);
        let bit = CastlingRights::bit_for(color, kingside);
        board.castling_rights_mask[king.index()] |= bit;
        board.castling_rights_mask[rook.index()] |= bit;
    }
    Ok(())
}

fn parse_counter(field: Option<&str>, default: u32) -> Result<u32, FenError> {
    match field {
        None => Ok(default),
        Some(s) => s.parse().map_err(|_| FenError::InvalidCounter { found: s.to_string() }),
    }
}
