//! Properties of the external move and score encodings over random games.

use proptest::prelude::*;
use rand::prelude::*;

use chess_analysis::analysis::codec::{decode, encode};
use chess_analysis::analysis::{format_move_sequence, normalize_score, Promotion};
use chess_analysis::board::{Board, PAWN_VALUE_EG, START_FEN};
use chess_analysis::search::{VALUE_MATE, VALUE_MATE_IN_MAX_PLY};

const CASTLING_FEN: &str = "r3k2r/pppq1ppp/2np1n2/2b1p1B1/2B1P1b1/2NP1N2/PPPQ1PPP/R3K2R w KQkq - 0 1";

fn seed_strategy() -> impl Strategy<Value = u64> {
    any::<u64>()
}

/// Play up to `plies` random legal moves from `fen`, checking every legal
/// move of every visited position with `check`.
fn walk(fen: &str, chess960: bool, seed: u64, plies: usize, mut check: impl FnMut(&mut Board)) {
    let mut board = Board::from_fen(fen, chess960).unwrap();
    let mut rng = StdRng::seed_from_u64(seed);
    for _ in 0..plies {
        check(&mut board);
        let moves = board.generate_moves();
        let Some(&mv) = moves.as_slice().choose(&mut rng) else {
            break;
        };
        board.make_move(mv);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every legal move survives encode then decode against its own position
    #[test]
    fn prop_legal_moves_decode_to_themselves(seed in seed_strategy(), chess960 in any::<bool>()) {
        chess_analysis::init();
        for fen in [START_FEN, CASTLING_FEN] {
            walk(fen, chess960, seed, 40, |board| {
                let moves = board.generate_moves();
                for &mv in moves.iter() {
                    let external = encode(mv, chess960);
                    assert!(external.from < 64 && external.to < 64);
                    assert_eq!(decode(external, board), Some(mv), "fen {}", board.to_fen());
                }
            });
        }
    }

    /// Standard castling lands on the g- or c-file, Chess960 castling on the rook
    #[test]
    fn prop_castling_destination(seed in seed_strategy()) {
        chess_analysis::init();
        walk(CASTLING_FEN, false, seed, 12, |board| {
            let moves = board.generate_moves();
            for &mv in moves.iter().filter(|m| m.is_castling()) {
                let standard = encode(mv, false);
                let rank = standard.from / 8;
                assert!(standard.to == rank * 8 + 6 || standard.to == rank * 8 + 2);
                assert_eq!(encode(mv, true).to as usize, mv.to().index());
            }
        });
    }

    #[test]
    fn prop_non_mate_scores_are_centipawns(value in -(VALUE_MATE_IN_MAX_PLY - 1)..VALUE_MATE_IN_MAX_PLY) {
        prop_assert_eq!(normalize_score(value), value * 100 / PAWN_VALUE_EG);
    }

    #[test]
    fn prop_mate_scores_count_moves(ply in 0..(VALUE_MATE - VALUE_MATE_IN_MAX_PLY)) {
        let winning = normalize_score(VALUE_MATE - ply);
        let losing = normalize_score(-VALUE_MATE + ply);
        prop_assert!(winning >= 1 || ply == 0);
        prop_assert_eq!(winning, (ply + 1) / 2);
        prop_assert_eq!(losing, -ply / 2);
        prop_assert!(losing <= 0);
    }

    #[test]
    fn prop_move_sequence_layout(squares in prop::collection::vec((0u8..64, 0u8..64), 0..12)) {
        let moves: Vec<_> = squares
            .iter()
            .map(|&(from, to)| chess_analysis::AnalysisMove::new(from, to, Promotion::None))
            .collect();
        let text = format_move_sequence(&moves);
        prop_assert_eq!(text.len(), moves.len() * 5);
        prop_assert_eq!(text.split_terminator(' ').count(), moves.len());
        prop_assert!(text.is_empty() || text.ends_with(' '));
    }
}
