use criterion::{black_box, criterion_group, criterion_main, Criterion};

use substring_score::alphabet::ASCII_LOWERCASE;
use substring_score::max_substring_score;

fn periodic_text(pattern: &[u8], len: usize) -> Vec<u8> {
    pattern.iter().cycle().take(len).cloned().collect()
}

fn pseudo_random_text(len: usize, symbols: &[u8]) -> Vec<u8> {
    // Deterministic xorshift so runs are comparable.
    let mut state: u64 = 0x9e37_79b9_7f4a_7c15;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            symbols[(state % symbols.len() as u64) as usize]
        })
        .collect()
}

fn benchmark(c: &mut Criterion) {
    let periodic = periodic_text(b"abcab", 10_000);
    let random = pseudo_random_text(10_000, ASCII_LOWERCASE.symbols());
    let single_run = periodic_text(b"a", 10_000);

    c.bench_function("periodic 10k", |b| {
        b.iter(|| max_substring_score(black_box(&periodic)))
    });
    c.bench_function("random lowercase 10k", |b| {
        b.iter(|| max_substring_score(black_box(&random)))
    });
    c.bench_function("single symbol 10k", |b| {
        b.iter(|| max_substring_score(black_box(&single_run)))
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = benchmark
}

criterion_main!(benches);
