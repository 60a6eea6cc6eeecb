//! Compare filling and reading the dense and quad tree height lattices
//!

use bevy_navgrid_plugin::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Lattice size along each side
const SIDE: usize = 400;

/// Fill a lookup with a plateau in one quarter and read every slot back
fn fill_and_read<L: HeightLookup>(mut lookup: L) -> f32 {
	for z in 0..SIDE {
		for x in 0..SIDE {
			if x < SIDE / 2 && z < SIDE / 2 {
				lookup.add(x, z, 4.0);
			}
		}
	}
	lookup.cleanup();
	let mut total = 0.0;
	for z in 0..SIDE {
		for x in 0..SIDE {
			total += lookup.try_get_height(x, z).unwrap_or(0.0);
		}
	}
	total
}

pub fn criterion_benchmark(c: &mut Criterion) {
	let mut group = c.benchmark_group("height_lookup");
	group.significance_level(0.05).sample_size(20);
	group.bench_function("dense", |b| {
		b.iter(|| fill_and_read(black_box(DenseHeightLookup::new(SIDE, SIDE))))
	});
	group.bench_function("quad_tree", |b| {
		b.iter(|| fill_and_read(black_box(QuadTreeHeightLookup::new(SIDE, SIDE, 8, 16))))
	});
	group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
