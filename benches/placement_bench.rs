//! Benchmarks for placement
//!
//! Measures region resolution and the full pipeline on square and
//! L-shaped parcels at a few sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use polyhouse_planner::core::config::{OrientationStrategy, PlannerConfig};
use polyhouse_planner::core::types::Vec2;
use polyhouse_planner::orientation::EastWestGutterPolicy;
use polyhouse_planner::parcel::LandParcel;
use polyhouse_planner::placement::{CancelToken, NoProgress};
use polyhouse_planner::planning::{optimize, PlanningInput};
use polyhouse_planner::region::resolve_buildable_region;

fn square(size: f64) -> LandParcel {
    LandParcel::from_planar(
        "Square",
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(size, 0.0),
            Vec2::new(size, size),
            Vec2::new(0.0, size),
        ],
        18.5,
    )
    .expect("valid parcel")
}

fn l_shape(size: f64) -> LandParcel {
    let half = size / 2.0;
    LandParcel::from_planar(
        "L",
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(size, 0.0),
            Vec2::new(size, half),
            Vec2::new(half, half),
            Vec2::new(half, size),
            Vec2::new(0.0, size),
        ],
        18.5,
    )
    .expect("valid parcel")
}

fn bench_region(c: &mut Criterion) {
    let parcel = l_shape(300.0);
    let config = PlannerConfig::default();
    c.bench_function("resolve_region_l_300", |b| {
        b.iter(|| resolve_buildable_region(black_box(&parcel), &[], None, &config))
    });
}

fn bench_optimize(c: &mut Criterion) {
    let mut group = c.benchmark_group("optimize");
    group.sample_size(10);

    let policy = EastWestGutterPolicy::default();
    for &size in &[100.0, 200.0, 300.0] {
        for (label, parcel) in [("square", square(size)), ("l_shape", l_shape(size))] {
            let config = PlannerConfig::default();
            group.bench_with_input(
                BenchmarkId::new(label, size as u32),
                &(parcel, config),
                |b, (parcel, config)| {
                    b.iter(|| {
                        let input = PlanningInput {
                            parcel,
                            zones: &[],
                            terrain: None,
                            config,
                        };
                        black_box(optimize(&input, &policy, &CancelToken::new(), &NoProgress))
                    })
                },
            );
        }
    }
    group.finish();
}

fn bench_optimized_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("optimized_sweep");
    group.sample_size(10);

    let parcel = l_shape(200.0);
    let config = PlannerConfig {
        orientation_strategy: OrientationStrategy::Optimized,
        ..Default::default()
    };
    let policy = EastWestGutterPolicy::default();
    group.bench_function("l_shape_200", |b| {
        b.iter(|| {
            let input = PlanningInput {
                parcel: &parcel,
                zones: &[],
                terrain: None,
                config: &config,
            };
            black_box(optimize(&input, &policy, &CancelToken::new(), &NoProgress))
        })
    });
    group.finish();
}

criterion_group!(benches, bench_region, bench_optimize, bench_optimized_sweep);
criterion_main!(benches);
