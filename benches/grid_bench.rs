//! Grid build and comparison throughput at the largest supported grid.
//!
//! Run with: `cargo bench --bench grid`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use cdr_heatmap::grid::{build_grid, compare, CombatLength, CompareMode, FallbackPolicy, SampleGridSpec};
use cdr_heatmap::model::WeaponParams;

fn bench_grid(c: &mut Criterion) {
    let left = WeaponParams::new(45.0, 2, 7.5).expect("valid params");
    let right = WeaponParams::new(30.0, 3, 6.0).expect("valid params");

    let mut group = c.benchmark_group("grid");
    group.sample_size(100);

    for length in [CombatLength::EndAtStorm, CombatLength::Full] {
        let spec = SampleGridSpec::new(101, length).expect("valid spec");
        group.throughput(Throughput::Elements((spec.rows() * spec.columns()) as u64));
        group.bench_with_input(
            BenchmarkId::new("build", spec.columns()),
            &spec,
            |b, spec| b.iter(|| black_box(build_grid(spec, &left))),
        );
    }

    let spec = SampleGridSpec::new(101, CombatLength::Full).expect("valid spec");
    let a = build_grid(&spec, &left).expect("grid");
    let b_grid = build_grid(&spec, &right).expect("grid");
    for mode in [CompareMode::Absolute, CompareMode::Relative] {
        group.bench_with_input(
            BenchmarkId::new("compare", format!("{mode:?}")),
            &mode,
            |b, &mode| b.iter(|| black_box(compare(&a, &b_grid, mode, FallbackPolicy::default()))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_grid);
criterion_main!(benches);
