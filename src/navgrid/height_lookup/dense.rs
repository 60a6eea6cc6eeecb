//! Hash map backed [HeightLookup]
//!

use std::collections::HashMap;

use crate::prelude::*;

/// Stores every recorded lattice slot in a hash map
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DenseHeightLookup {
	/// Recorded heights keyed by `(x, z)` lattice coords
	heights: HashMap<(usize, usize), f32>,
	/// Lattice samples along `x`
	lattice_columns: usize,
	/// Lattice samples along `z`
	lattice_rows: usize,
	/// Area replaced when this lookup is merged as a scratch lookup
	update_bounds: Option<MatrixBounds>,
}

impl DenseHeightLookup {
	/// Create a new instance of [DenseHeightLookup] for a lattice of the
	/// given size
	pub fn new(lattice_columns: usize, lattice_rows: usize) -> Self {
		DenseHeightLookup {
			heights: HashMap::new(),
			lattice_columns,
			lattice_rows,
			update_bounds: None,
		}
	}
}

impl HeightLookup for DenseHeightLookup {
	fn add(&mut self, x: usize, z: usize, height: f32) -> bool {
		if x >= self.lattice_columns || z >= self.lattice_rows {
			return false;
		}
		if let std::collections::hash_map::Entry::Vacant(e) = self.heights.entry((x, z)) {
			e.insert(height);
			true
		} else {
			false
		}
	}
	fn try_get_height(&self, x: usize, z: usize) -> Option<f32> {
		self.heights.get(&(x, z)).copied()
	}
	fn cleanup(&mut self) {
		self.heights.shrink_to_fit();
	}
	fn prepare_for_update(&self, suggested: MatrixBounds) -> (Self, Option<MatrixBounds>) {
		let lattice = MatrixBounds::full(self.lattice_columns, self.lattice_rows);
		let actual = suggested.intersection(&lattice);
		let mut scratch = DenseHeightLookup::new(self.lattice_columns, self.lattice_rows);
		scratch.update_bounds = actual;
		(scratch, actual)
	}
	fn finish_update(&mut self, scratch: Self) {
		if let Some(bounds) = scratch.update_bounds {
			self.heights
				.retain(|(x, z), _| !bounds.contains(MatrixCoord::new(*x, *z)));
		}
		for (key, height) in scratch.heights {
			self.heights.insert(key, height);
		}
	}
	fn entry_count(&self) -> usize {
		self.heights.len()
	}
	fn entries(&self) -> Vec<HeightEntry> {
		let mut entries: Vec<HeightEntry> = self
			.heights
			.iter()
			.map(|((x, z), h)| HeightEntry::new(*x, *z, *h))
			.collect();
		entries.sort_by_key(|e| (e.z, e.x));
		entries
	}
}

// #[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn add_outside_lattice() {
		let mut lookup = DenseHeightLookup::new(4, 4);
		assert!(!lookup.add(4, 0, 1.0));
		assert!(lookup.add(3, 3, 1.0));
		assert_eq!(1, lookup.entry_count());
	}
	#[test]
	fn prepare_clamps_to_lattice() {
		let lookup = DenseHeightLookup::new(4, 4);
		let (_scratch, actual) = lookup.prepare_for_update(MatrixBounds::new(2, 9, 1, 2));
		assert_eq!(Some(MatrixBounds::new(2, 3, 1, 2)), actual);
	}
	#[test]
	fn prepare_outside_lattice_keeps_heights() {
		let mut lookup = DenseHeightLookup::new(8, 8);
		for x in 0..8 {
			for z in 0..8 {
				lookup.add(x, z, 1.0);
			}
		}
		let (scratch, actual) = lookup.prepare_for_update(MatrixBounds::new(20, 22, 20, 22));
		assert_eq!(None, actual);
		lookup.finish_update(scratch);
		assert_eq!(64, lookup.entry_count());
	}
	#[test]
	fn entries_sorted_row_major() {
		let mut lookup = DenseHeightLookup::new(4, 4);
		lookup.add(3, 0, 1.0);
		lookup.add(0, 1, 2.0);
		lookup.add(1, 0, 3.0);
		let result: Vec<(usize, usize)> = lookup.entries().iter().map(|e| (e.x, e.z)).collect();
		assert_eq!(vec![(1, 0), (3, 0), (0, 1)], result);
	}
}
