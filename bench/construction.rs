use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use merkle_multiproof::{commit, KeccakTree, LeafSet};
use sha3::Keccak256;

pub fn generate_random_leaves(count: usize) -> Vec<[u8; 32]> {
    (0..count)
        .map(|_| {
            let mut leaf = [0u8; 32];
            for byte in leaf.iter_mut() {
                *byte = rand::random();
            }
            leaf
        })
        .collect()
}

fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("Tree Construction");

    for size in [16, 256, 4096, 16384] {
        let leaves = generate_random_leaves(size);

        // Benchmark canonicalization alone
        group.bench_with_input(BenchmarkId::new("Canonicalize", size), &leaves, |b, leaves| {
            b.iter(|| black_box(LeafSet::<32, Keccak256>::new(leaves.iter().copied())).unwrap())
        });

        // Benchmark tree levels without the proof
        group.bench_with_input(BenchmarkId::new("Build Tree", size), &leaves, |b, leaves| {
            b.iter(|| black_box(KeccakTree::from_leaves(leaves.iter().copied())).unwrap())
        });

        // Benchmark the full commitment
        group.bench_with_input(BenchmarkId::new("Commit", size), &leaves, |b, leaves| {
            b.iter(|| black_box(commit::<32, Keccak256>(leaves.iter().copied())).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_construction);
criterion_main!(benches);
