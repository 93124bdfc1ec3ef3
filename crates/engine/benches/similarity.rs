//! Benchmarks for matrix construction and neighbor search
//!
//! Run with: cargo bench --package engine
//!
//! Uses a seeded synthetic rating set roughly the size of ml-latest-small.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use data_loader::Rating;
use engine::{DuplicatePolicy, Metric, RatingMatrix};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn synthetic_ratings(count: usize) -> Vec<Rating> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..count)
        .map(|_| {
            Rating::new(
                rng.random_range(1..=610),
                rng.random_range(1..=9_000),
                rng.random_range(1..=10) as f32 / 2.0,
            )
        })
        .collect()
}

fn bench_build_matrix(c: &mut Criterion) {
    let ratings = synthetic_ratings(100_000);

    c.bench_function("build_rating_matrix", |b| {
        b.iter(|| {
            let matrix = RatingMatrix::build(black_box(&ratings), DuplicatePolicy::default());
            black_box(matrix)
        })
    });
}

fn bench_find_similar(c: &mut Criterion) {
    let ratings = synthetic_ratings(100_000);
    let matrix = RatingMatrix::build(&ratings, DuplicatePolicy::default())
        .expect("Failed to build matrix");
    let movie_id = matrix.movies().ids()[0];

    c.bench_function("find_similar_cosine_k10", |b| {
        b.iter(|| {
            let similar = matrix.find_similar(black_box(movie_id), black_box(10), &Metric::Cosine);
            black_box(similar)
        })
    });
}

criterion_group!(benches, bench_build_matrix, bench_find_similar);
criterion_main!(benches);
