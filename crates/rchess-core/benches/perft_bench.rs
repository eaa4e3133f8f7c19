//! perftベンチマーク（指し手生成とmake/undoのスループット）

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rchess_core::perft::perft;
use rchess_core::Position;

fn perft_startpos(c: &mut Criterion) {
    c.bench_function("perft3_startpos", |b| {
        let mut pos = Position::startpos();
        b.iter(|| black_box(perft(&mut pos, 3)));
    });
}

fn perft_middlegame(c: &mut Criterion) {
    c.bench_function("perft2_kiwipete", |b| {
        let mut pos = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        b.iter(|| black_box(perft(&mut pos, 2)));
    });
}

criterion_group!(benches, perft_startpos, perft_middlegame);
criterion_main!(benches);
