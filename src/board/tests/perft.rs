//! Perft (performance test) for move generation correctness.

use crate::board::{perft, Board};

struct TestPosition {
    name: &'static str,
    fen: &'static str,
    chess960: bool,
    depths: &'static [(u32, u64)],
}

const TEST_POSITIONS: &[TestPosition] = &[
    TestPosition {
        name: "Initial Position",
        fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        chess960: false,
        depths: &[(1, 20), (2, 400), (3, 8902)],
    },
    TestPosition {
        name: "Kiwipete",
        fen: "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        chess960: false,
        depths: &[(1, 48), (2, 2039), (3, 97862)],
    },
    TestPosition {
        name: "Position 3",
        fen: "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        chess960: false,
        depths: &[(1, 14), (2, 191), (3, 2812), (4, 43238)],
    },
    TestPosition {
        name: "Position 4",
        fen: "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        chess960: false,
        depths: &[(1, 6), (2, 264), (3, 9467)],
    },
    TestPosition {
        name: "Position 5",
        fen: "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        chess960: false,
        depths: &[(1, 44), (2, 1486), (3, 62379)],
    },
    TestPosition {
        name: "Castling",
        fen: "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1",
        chess960: false,
        depths: &[(1, 26), (2, 568), (3, 13744)],
    },
    TestPosition {
        name: "Chess960 Position 1",
        fen: "bqnb1rkr/pp3ppp/3ppn2/2p5/5P2/P2P4/NPP1P1PP/BQ1BNRKR w HFhf - 2 9",
        chess960: true,
        depths: &[(1, 21), (2, 528), (3, 12189)],
    },
];

#[test]
fn test_perft_positions() {
    for pos in TEST_POSITIONS {
        let mut board = Board::from_fen(pos.fen, pos.chess960).unwrap();
        for &(depth, expected) in pos.depths {
            let nodes = perft(&mut board, depth);
            assert_eq!(nodes, expected, "{} depth {depth}", pos.name);
        }
        assert_eq!(board.to_fen(), Board::from_fen(pos.fen, pos.chess960).unwrap().to_fen());
    }
}
