// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Rect, Vec2};
use understory_dbvh::{Tree, TreeConfig};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn gen_random_rects(count: usize, world: f64, size: f64) -> Vec<Rect> {
    let mut out = Vec::with_capacity(count);
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    for _ in 0..count {
        let x0 = rng.next_f64() * (world - size).max(1.0);
        let y0 = rng.next_f64() * (world - size).max(1.0);
        out.push(Rect::new(x0, y0, x0 + size, y0 + size));
    }
    out
}

fn gen_velocities(count: usize, speed: f64) -> Vec<Vec2> {
    let mut rng = Rng::new(0xBADC_F00D_1234_5678);
    (0..count)
        .map(|_| {
            Vec2::new(
                (rng.next_f64() - 0.5) * 2.0 * speed,
                (rng.next_f64() - 0.5) * 2.0 * speed,
            )
        })
        .collect()
}

fn build(rects: &[Rect], config: TreeConfig) -> Tree<u32> {
    let mut tree = Tree::with_config(config).unwrap();
    for (i, r) in rects.iter().copied().enumerate() {
        tree.insert(i as u32, r).unwrap();
    }
    tree
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    for &n in &[256usize, 1024, 4096] {
        let rects = gen_random_rects(n, 2000.0, 12.0);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("random_n{}", n), |b| {
            b.iter(|| black_box(build(&rects, TreeConfig::default()).node_count()));
        });
    }
    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("update");
    let n = 1024;
    let rects = gen_random_rects(n, 2000.0, 12.0);
    let vels = gen_velocities(n, 4.0);
    group.throughput(Throughput::Elements(n as u64));
    for (label, rotate) in [("step_rotate", true), ("step_no_rotate", false)] {
        let config = TreeConfig::default().with_rotate_on_update(rotate);
        group.bench_function(label, |b| {
            b.iter_batched(
                || build(&rects, config),
                |mut tree| {
                    let mut rebuilt = 0;
                    for (i, (r, v)) in rects.iter().zip(&vels).enumerate() {
                        // One step of motion along v.
                        let mut moved = *r;
                        moved.x0 += v.x;
                        moved.x1 += v.x;
                        moved.y0 += v.y;
                        moved.y1 += v.y;
                        if tree.update(&(i as u32), moved, *v).unwrap() {
                            rebuilt += 1;
                        }
                    }
                    black_box(rebuilt);
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");
    let n = 4096;
    let rects = gen_random_rects(n, 2000.0, 12.0);
    let tree = build(&rects, TreeConfig::default());
    group.throughput(Throughput::Elements(n as u64));
    group.bench_function("all_leaves", |b| {
        b.iter(|| {
            let mut hits = 0;
            for i in 0..n as u32 {
                tree.query_with(&i, |_| hits += 1).unwrap();
            }
            black_box(hits)
        });
    });
    group.bench_function("collision_pairs", |b| {
        b.iter(|| black_box(tree.collision_pairs().len()));
    });
    group.bench_function("brute_force_pairs", |b| {
        let fat: Vec<Rect> = tree.iter().map(|(_, r)| r).collect();
        b.iter(|| {
            let mut hits = 0;
            for (i, a) in fat.iter().enumerate() {
                for bb in &fat[i + 1..] {
                    if a.x0 <= bb.x1 && bb.x0 <= a.x1 && a.y0 <= bb.y1 && bb.y0 <= a.y1 {
                        hits += 1;
                    }
                }
            }
            black_box(hits)
        });
    });
    group.finish();
}

fn bench_optimize(c: &mut Criterion) {
    let mut group = c.benchmark_group("optimize");
    let n = 4096;
    let rects = gen_random_rects(n, 2000.0, 12.0);
    let config = TreeConfig::default().with_rotate_on_update(false);
    group.bench_function("single_pass", |b| {
        b.iter_batched(
            || build(&rects, config),
            |mut tree| black_box(tree.optimize()),
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_insert, bench_update, bench_query, bench_optimize);
criterion_main!(benches);
