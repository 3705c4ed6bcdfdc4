use askdocs::chunking::{ChunkingConfig, chunk_text};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn build_corpus() -> String {
    (0..2_000)
        .map(|i| {
            format!(
                "Sentence number {} explains how the retrieval pipeline handles topic {}. ",
                i,
                i % 37
            )
        })
        .collect()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let corpus = build_corpus();
    let config = ChunkingConfig::default();
    c.bench_function("chunking", |b| {
        b.iter(|| chunk_text(black_box(&corpus), black_box(&config)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
