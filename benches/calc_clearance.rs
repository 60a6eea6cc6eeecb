//! Measure the two pass clearance sweep over a cluttered matrix
//!

use bevy::prelude::*;
use bevy_navgrid_plugin::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

pub fn criterion_benchmark(c: &mut Criterion) {
	let probe = FnGroundProbe::new(
		|_p: Vec3| 0.0,
		|p: Vec3, _r: f32| ((p.x * 3.1).sin() * (p.z * 1.7).cos()) > 0.8,
	);
	let config = MatrixConfig::new(Vec3::ZERO, 300, 300, 1.0);
	let matrix = CellMatrix::create(config, &probe);
	let mut group = c.benchmark_group("algorithm_use");
	group.significance_level(0.05).sample_size(30);
	group.bench_function("calc_clearance", |b| {
		b.iter(|| {
			let mut m = black_box(matrix.clone());
			ClearanceProvider::calculate(&mut m);
		})
	});
	group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
