use criterion::{black_box, criterion_group, criterion_main, Criterion};
use merkle_multiproof::{CommitmentError, KeccakTree, MultiProof};
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

fn setup_tree(num_leaves: usize) -> (KeccakTree, Vec<usize>) {
    let tree = KeccakTree::from_leaves(generate_random_leaves(num_leaves)).unwrap();
    // every third leaf, so the proof mixes derived and supplied siblings
    let subset = (0..num_leaves).step_by(3).collect();
    (tree, subset)
}

fn bench_proof_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("Multi-Proof Generation");

    // Setup tree with 300 leaves
    let (tree, subset) = setup_tree(300);

    // Benchmark proving every leaf
    group.bench_function("All Leaves", |b| {
        b.iter(|| black_box(tree.multi_proof_all()).unwrap())
    });

    // Benchmark proving a third of the leaves
    group.bench_function("Subset", |b| {
        b.iter(|| black_box(MultiProof::build(&tree, &subset)).unwrap())
    });

    group.finish();
}

fn bench_proof_verification(c: &mut Criterion) {
    let mut group = c.benchmark_group("Multi-Proof Verification");

    let (tree, subset) = setup_tree(300);
    let root = tree.root();
    let all_proof = tree.multi_proof_all().unwrap();
    let subset_proof = MultiProof::<32, Keccak256>::build(&tree, &subset).unwrap();
    let subset_leaves: Vec<_> = subset
        .iter()
        .map(|&index| (index, tree.leaves()[index]))
        .collect();

    group.bench_function("All Leaves", |b| {
        b.iter(|| {
            black_box::<Result<(), CommitmentError>>(all_proof.verify(tree.leaves(), &root))
                .unwrap()
        })
    });

    group.bench_function("Subset", |b| {
        b.iter(|| {
            black_box::<Result<(), CommitmentError>>(subset_proof.verify_subset(
                tree.leaf_count(),
                &subset_leaves,
                &root,
            ))
            .unwrap()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_proof_generation, bench_proof_verification);
criterion_main!(benches);
