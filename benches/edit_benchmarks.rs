use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rank_tree::SequenceTree;

const N: usize = 10_000;

// ─── Helper functions to generate edit positions ────────────────────────────

/// Deterministic pseudo-random positions from a simple LCG; `positions[i]` is
/// reduced modulo the sequence length at step i by the caller.
fn random_seeds(n: usize) -> Vec<usize> {
    let mut seeds = Vec::with_capacity(n);
    let mut x: u64 = 12345;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        seeds.push((x >> 33) as usize);
    }
    seeds
}

fn letter(i: usize) -> char {
    char::from_u32('a' as u32 + (i % 26) as u32).expect("ascii letter")
}

// ─── Edit benchmarks ────────────────────────────────────────────────────────

fn bench_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("append");

    group.bench_function(BenchmarkId::new("SequenceTree", N), |b| {
        b.iter(|| {
            let mut tree = SequenceTree::new();
            for i in 0..N {
                tree.push(letter(i));
            }
            tree
        });
    });

    group.bench_function(BenchmarkId::new("Vec<char>", N), |b| {
        b.iter(|| {
            let mut vec = Vec::new();
            for i in 0..N {
                vec.push(letter(i));
            }
            vec
        });
    });

    group.finish();
}

fn bench_insert_random(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_random");
    let seeds = random_seeds(N);

    group.bench_function(BenchmarkId::new("SequenceTree", N), |b| {
        b.iter(|| {
            let mut tree = SequenceTree::new();
            for (i, seed) in seeds.iter().enumerate() {
                let pos = seed % (tree.len() + 1);
                tree.insert(letter(i), pos).expect("position in range");
            }
            tree
        });
    });

    group.bench_function(BenchmarkId::new("Vec<char>", N), |b| {
        b.iter(|| {
            let mut vec: Vec<char> = Vec::new();
            for (i, seed) in seeds.iter().enumerate() {
                let pos = seed % (vec.len() + 1);
                vec.insert(pos, letter(i));
            }
            vec
        });
    });

    group.finish();
}

fn bench_remove_random(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove_random");
    let seeds = random_seeds(N);
    let text: String = (0..N).map(letter).collect();

    group.bench_function(BenchmarkId::new("SequenceTree", N), |b| {
        b.iter(|| {
            let mut tree = SequenceTree::from_text(&text);
            for seed in &seeds {
                let pos = seed % tree.len();
                tree.remove(pos).expect("position in range");
            }
            tree
        });
    });

    group.bench_function(BenchmarkId::new("Vec<char>", N), |b| {
        b.iter(|| {
            let mut vec: Vec<char> = text.chars().collect();
            for seed in &seeds {
                let pos = seed % vec.len();
                vec.remove(pos);
            }
            vec
        });
    });

    group.finish();
}

fn bench_bulk_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("bulk_build");
    let text: String = (0..N).map(letter).collect();

    group.bench_function(BenchmarkId::new("from_text", N), |b| {
        b.iter(|| SequenceTree::from_text(&text));
    });

    group.bench_function(BenchmarkId::new("repeated_push", N), |b| {
        b.iter(|| {
            let mut tree = SequenceTree::new();
            for ch in text.chars() {
                tree.push(ch);
            }
            tree
        });
    });

    group.finish();
}

fn bench_positional_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("positional_reads");
    let text: String = (0..N).map(letter).collect();
    let tree = SequenceTree::from_text(&text);
    let seeds = random_seeds(N);

    group.bench_function(BenchmarkId::new("get", N), |b| {
        b.iter(|| {
            let mut out = 0u32;
            for seed in &seeds {
                out = out.wrapping_add(tree.get(seed % tree.len()).expect("position in range") as u32);
            }
            out
        });
    });

    group.bench_function(BenchmarkId::new("range_64", N), |b| {
        b.iter(|| {
            let mut total = 0usize;
            for seed in &seeds[..256] {
                let pos = seed % (tree.len() - 64);
                total += tree.range(pos, 64).expect("range in bounds").len();
            }
            total
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_append,
    bench_insert_random,
    bench_remove_random,
    bench_bulk_build,
    bench_positional_reads
);
criterion_main!(benches);
