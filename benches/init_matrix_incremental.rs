//! Measure building a matrix through the resumable initialiser, sliced the
//! way a frame budget would slice it
//!

use std::time::Duration;

use bevy::prelude::*;
use bevy_navgrid_plugin::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Step an initialiser to completion in 1ms slices
fn init_incrementally(columns: usize, rows: usize) {
	let probe = FnGroundProbe::new(|p: Vec3| (p.x * 0.2).sin(), |_p: Vec3, _r: f32| false);
	let config = MatrixConfig::new(Vec3::ZERO, columns, rows, 1.0)
		.with_height_mode(HeightMode::Standard)
		.with_lookup_strategy(HeightLookupStrategy::QuadTree {
			max_depth: 6,
			leaf_capacity: 32,
		});
	let mut initialiser = CellMatrix::create_incrementally(config);
	while !run_bounded_slice(Duration::from_millis(1), || initialiser.step(&probe)).finished {}
	let _matrix = initialiser.finish();
}

pub fn criterion_benchmark(c: &mut Criterion) {
	let mut group = c.benchmark_group("data_initialisation");
	group.significance_level(0.05).sample_size(20);
	group.bench_function("init_matrix_incremental", |b| {
		b.iter(|| init_incrementally(black_box(150), black_box(150)))
	});
	group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
