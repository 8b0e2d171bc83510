// SPDX-License-Identifier: MIT OR Apache-2.0
//! Benchmarks for tree construction, lookup, and snapshot round-trips

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use openbook::tree::Repertoire;

/// Build a book of `lines` independent lines, each `depth` moves deep
fn build_book(lines: usize, depth: usize) -> Repertoire {
    let mut book = Repertoire::new("K0");
    for line in 0..lines {
        let mut parent = "K0".to_string();
        for ply in 0..depth {
            let key = format!("K{line}-{ply}");
            book.insert_move(&parent, &key, &format!("m{line}-{ply}"))
                .expect("parent always present");
            parent = key;
        }
    }
    book
}

fn bench_insert(c: &mut Criterion) {
    c.bench_function("insert_1k_nodes", |b| {
        b.iter(|| build_book(black_box(50), black_box(20)));
    });
}

fn bench_lookup(c: &mut Criterion) {
    let book = build_book(50, 20);
    let path: Vec<String> = (0..20).map(|ply| format!("m25-{ply}")).collect();

    c.bench_function("find_by_path_depth_20", |b| {
        b.iter(|| book.find_by_path(black_box(&path)));
    });
    c.bench_function("find_by_key", |b| {
        b.iter(|| book.find_by_key(black_box("K25-19")));
    });
}

fn bench_round_trip(c: &mut Criterion) {
    let book = build_book(50, 20);
    let body = book.serialize().expect("serializable");

    c.bench_function("serialize_1k_nodes", |b| {
        b.iter(|| book.serialize().expect("serializable"));
    });
    c.bench_function("deserialize_1k_nodes", |b| {
        b.iter(|| Repertoire::deserialize(black_box(&body), "K0"));
    });
}

criterion_group!(benches, bench_insert, bench_lookup, bench_round_trip);
criterion_main!(benches);
