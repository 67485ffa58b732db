//! Make/unmake and castling mechanics.

use crate::board::{Board, Color, Move, Piece, Square};

fn sq(name: &str) -> Square {
    name.parse().unwrap()
}

#[test]
fn test_standard_castling_both_wings() {
    let mut board: Board = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1".parse().unwrap();
    let moves = board.generate_moves();
    let short = Move::castling(Square::E1, Square::H1);
    let long = Move::castling(Square::E1, Square::A1);
    assert!(moves.contains(short));
    assert!(moves.contains(long));

    let before = board.to_fen();
    let info = board.make_move(short);
    assert_eq!(board.piece_at(Square::G1), Some((Color::White, Piece::King)));
    assert_eq!(board.piece_at(Square::F1), Some((Color::White, Piece::Rook)));
    assert_eq!(board.piece_at(Square::H1), None);
    assert!(!board.castling_rights().has(Color::White, true));
    assert!(!board.castling_rights().has(Color::White, false));
    assert!(board.castling_rights().has(Color::Black, true));
    assert_eq!(board.hash(), board.compute_hash());
    board.unmake_move(short, info);
    assert_eq!(board.to_fen(), before);
}

#[test]
fn test_castling_blocked_by_attack() {
    // Black rook on f8 covers f1
    let mut board: Board = "4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1".parse().unwrap();
    let moves = board.generate_moves();
    assert!(!moves.contains(Move::castling(Square::E1, Square::H1)));
    assert!(moves.contains(Move::castling(Square::E1, Square::A1)));
}

#[test]
fn test_chess960_castling_king_next_to_rook() {
    let mut board = Board::from_fen("4k3/8/8/8/8/8/8/RK6 w A - 0 1", true).unwrap();
    let castle = Move::castling(sq("b1"), Square::A1);
    assert!(board.generate_moves().contains(castle));
    let info = board.make_move(castle);
    assert_eq!(board.piece_at(Square::C1), Some((Color::White, Piece::King)));
    assert_eq!(board.piece_at(Square::D1), Some((Color::White, Piece::Rook)));
    assert_eq!(board.piece_at(Square::A1), None);
    assert_eq!(board.piece_at(sq("b1")), None);
    board.unmake_move(castle, info);
    assert_eq!(board.to_fen(), "4k3/8/8/8/8/8/8/RK6 w Q - 0 1");
}

#[test]
fn test_chess960_castling_king_already_on_target() {
    // King on g1, rook on h1: castling only moves the rook to f1
    let mut board = Board::from_fen("4k3/8/8/8/8/8/8/R5KR w HA - 0 1", true).unwrap();
    let castle = Move::castling(Square::G1, Square::H1);
    assert!(board.generate_moves().contains(castle));
    let info = board.make_move(castle);
    assert_eq!(board.piece_at(Square::G1), Some((Color::White, Piece::King)));
    assert_eq!(board.piece_at(Square::F1), Some((Color::White, Piece::Rook)));
    board.unmake_move(castle, info);
    assert_eq!(board.piece_at(Square::H1), Some((Color::White, Piece::Rook)));
}

#[test]
fn test_shredder_castling_letters_round_trip() {
    let fen = "bqnb1rkr/pp3ppp/3ppn2/2p5/5P2/P2P4/NPP1P1PP/BQ1BNRKR w HFhf - 2 9";
    let board = Board::from_fen(fen, true).unwrap();
    assert_eq!(board.castling_rook(Color::White, true), Some(Square::H1));
    assert_eq!(board.castling_rook(Color::White, false), Some(Square::F1));
    assert_eq!(board.to_fen(), "bqnb1rkr/pp3ppp/3ppn2/2p5/5P2/P2P4/NPP1P1PP/BQ1BNRKR w KQkq - 2 9");
}

#[test]
fn test_en_passant_capture_and_restore() {
    let mut board: Board = "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3"
        .parse()
        .unwrap();
    assert_eq!(board.en_passant(), Some(sq("f6")));
    let ep = Move::en_passant(sq("e5"), sq("f6"));
    assert!(board.generate_moves().contains(ep));
    let before = board.to_fen();
    let info = board.make_move(ep);
    assert_eq!(info.captured(), Some(Piece::Pawn));
    assert_eq!(board.piece_at(sq("f5")), None);
    assert_eq!(board.hash(), board.compute_hash());
    board.unmake_move(ep, info);
    assert_eq!(board.to_fen(), before);
}

#[test]
fn test_null_move_round_trip() {
    let mut board = Board::new();
    let hash = board.hash();
    let info = board.make_null_move();
    assert_eq!(board.side_to_move(), Color::Black);
    assert_ne!(board.hash(), hash);
    board.unmake_null_move(info);
    assert_eq!(board.hash(), hash);
    assert_eq!(board.side_to_move(), Color::White);
}

#[test]
fn test_fen_rejects_malformed_input() {
    for fen in [
        "",
        "8/8/8/8 w - -",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNZ w KQkq - 0 1",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQQBNR w - - 0 1",
        "rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        "4k3/8/8/8/8/8/8/4K3 w K - 0 1",
        "4k3/8/8/8/8/8/4R3/4K3 w - - 0 1",
    ] {
        assert!(Board::from_fen(fen, false).is_err(), "accepted {fen:?}");
    }
}
