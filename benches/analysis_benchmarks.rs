//! Benchmarks for move generation and analysis throughput.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use chess_analysis::analysis::SessionManager;
use chess_analysis::board::{perft, Board, START_FEN};
use chess_analysis::options::EngineConfig;

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
const MIDDLEGAME: &str = "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4";

fn bench_perft(c: &mut Criterion) {
    chess_analysis::init();
    let mut group = c.benchmark_group("perft");

    let mut board = Board::new();
    for depth in 1..=4 {
        group.bench_with_input(BenchmarkId::new("startpos", depth), &depth, |b, &depth| {
            b.iter(|| perft(&mut board, black_box(depth)))
        });
    }

    let mut kiwipete = Board::from_fen(KIWIPETE, false).unwrap();
    for depth in 1..=3 {
        group.bench_with_input(BenchmarkId::new("kiwipete", depth), &depth, |b, &depth| {
            b.iter(|| perft(&mut kiwipete, black_box(depth)))
        });
    }

    group.finish();
}

fn bench_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis");
    group.sample_size(10);

    let mut engine = SessionManager::with_config(EngineConfig::default().with_hash_mb(16)).unwrap();
    let id = engine.create(1, 16, 0, 1).unwrap();
    for (name, fen) in [("startpos", START_FEN), ("middlegame", MIDDLEGAME), ("kiwipete", KIWIPETE)] {
        for depth in [4, 6] {
            group.bench_with_input(BenchmarkId::new(name, depth), &depth, |b, &depth| {
                b.iter(|| {
                    engine.reset();
                    black_box(engine.analyze_by_depth(id, fen, depth).unwrap())
                })
            });
        }
    }

    let id = engine.create(1, 16, 0, 4).unwrap();
    group.bench_function("startpos_multipv4", |b| {
        b.iter(|| {
            engine.reset();
            black_box(engine.analyze_by_depth(id, START_FEN, 5).unwrap())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_perft, bench_analysis);
criterion_main!(benches);
