use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use layout_regions::prelude::*;
mod test_shapes;
use test_shapes::*;

fn merge_group(c: &mut Criterion) {
    let mut group = c.benchmark_group("region_merge");
    for &n in &[10, 30, 100] {
        let region = overlapping_grid(n);
        group.bench_with_input(BenchmarkId::new("overlapping_grid", n * n), &region, |b, r| {
            b.iter(|| r.merged())
        });
    }
    group.finish();
}

fn boolean_group(c: &mut Criterion) {
    let mut group = c.benchmark_group("region_boolean");
    for &n in &[10, 30, 100] {
        let a = overlapping_grid(n);
        let b = spaced_grid(n);
        group.bench_with_input(BenchmarkId::new("and", n * n), &(&a, &b), |bench, (a, b)| {
            bench.iter(|| *a & *b)
        });
        group.bench_with_input(BenchmarkId::new("xor", n * n), &(&a, &b), |bench, (a, b)| {
            bench.iter(|| *a ^ *b)
        });
    }
    group.finish();
}

fn check_group(c: &mut Criterion) {
    let mut group = c.benchmark_group("region_check");
    let options = RegionCheckOptions::new();
    for &n in &[10, 30, 100] {
        let region = spaced_grid(n);
        group.bench_with_input(BenchmarkId::new("space_check", n * n), &region, |b, r| {
            b.iter(|| r.space_check(20, &options))
        });
        group.bench_with_input(BenchmarkId::new("width_check", n * n), &region, |b, r| {
            b.iter(|| r.width_check(25, &options))
        });
    }
    group.finish();
}

criterion_group!(region_ops, merge_group, boolean_group, check_group);
criterion_main!(region_ops);
