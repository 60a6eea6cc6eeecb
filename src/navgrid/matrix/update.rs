//! Refreshes part of a [CellMatrix] after the scene changed.
//!
//! The lattice inside the affected area is resampled into a scratch lookup
//! which replaces the live samples in one go once complete. Cells are then
//! moved to their new ground height and probed again for obstacles, the
//! neighbour pairs around them are reclassified and finally clearance is
//! swept across the whole matrix. Cells whose clearance moved during the
//! sweep are reported as changed alongside the re-derived cells, wherever
//! they lie.
//!

use bevy::prelude::*;

use crate::prelude::*;

/// Phase of an update
#[derive(Debug, Clone, PartialEq)]
enum UpdatePhase {
	/// Resampling the lattice into the scratch lookup
	Lattice,
	/// Re-deriving cell heights and blocked flags
	Cells,
	/// Reclassifying neighbour pairs
	HeightSettings(HeightSettingsProvider),
	/// Sweeping clearance
	Clearance(ClearanceProvider),
	/// Update complete
	Done,
}

/// Resumable refresh of the cells beneath a world space rectangle
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixUpdate {
	/// World area that changed
	extent: WorldBounds,
	/// Cells whose height and blocked state get re-derived
	cell_bounds: Option<MatrixBounds>,
	/// Lattice samples replaced by the scratch lookup
	lattice_bounds: Option<MatrixBounds>,
	/// Lookup receiving the resampled lattice
	scratch: Option<HeightLookupKind>,
	/// Clearance of every cell before the sweep started
	clearance_before: Vec<Option<f32>>,
	/// Cells whose clearance differs after the sweep
	clearance_changed: Option<MatrixBounds>,
	/// Current phase
	phase: UpdatePhase,
	/// Position within the current phase
	cursor: usize,
}

impl MatrixUpdate {
	/// Create a new instance of [MatrixUpdate] for the cells of `matrix`
	/// beneath `extent`. The same matrix must be passed to every
	/// [MatrixUpdate::step]. An extent missing the matrix produces an update
	/// with nothing to do
	pub fn new(matrix: &CellMatrix, extent: WorldBounds) -> Self {
		let Some(cells) = matrix.get_matrix_bounds_of(&extent) else {
			trace!("Update extent {:?} misses the matrix", extent);
			return MatrixUpdate {
				extent,
				cell_bounds: None,
				lattice_bounds: None,
				scratch: None,
				clearance_before: Vec::new(),
				clearance_changed: None,
				phase: UpdatePhase::Done,
				cursor: 0,
			};
		};
		let suggested = matrix.lattice_bounds(&cells);
		let (scratch, actual) = matrix.heights().prepare_for_update(suggested);
		let cell_bounds = match actual {
			Some(lattice) => cells.combine(&matrix.cell_bounds_of_lattice(&lattice)),
			None => cells,
		};
		MatrixUpdate {
			extent,
			cell_bounds: Some(cell_bounds),
			lattice_bounds: actual,
			scratch: Some(scratch),
			clearance_before: Vec::new(),
			clearance_changed: None,
			phase: UpdatePhase::Lattice,
			cursor: 0,
		}
	}
	/// World area being refreshed
	pub fn extent(&self) -> WorldBounds {
		self.extent
	}
	/// Cells whose navigation data may change, the re-derived cells plus the
	/// ring of neighbours sharing pairs with them plus any cell whose
	/// clearance moved. [None] when the extent missed the matrix
	pub fn changed_bounds(&self, matrix: &CellMatrix) -> Option<MatrixBounds> {
		let around = self
			.cell_bounds
			.map(|b| b.expand(1, matrix.columns(), matrix.rows()));
		MatrixBounds::combine_optional(around, self.clearance_changed)
	}
	/// Whether every phase has completed
	pub fn is_finished(&self) -> bool {
		self.phase == UpdatePhase::Done
	}
	/// Do one unit of work. Returns `false` once the update is complete
	pub fn step<P: GroundProbe + ?Sized>(&mut self, matrix: &mut CellMatrix, probe: &P) -> bool {
		match &mut self.phase {
			UpdatePhase::Lattice => {
				let Some(lattice) = self.lattice_bounds else {
					self.scratch = None;
					self.phase = UpdatePhase::Cells;
					self.cursor = 0;
					return true;
				};
				let lx = lattice.min_column + self.cursor % lattice.columns();
				let lz = lattice.min_row + self.cursor / lattice.columns();
				let height = probe.sample_ground_height(matrix.lattice_position(lx, lz));
				if height != matrix.origin().y {
					if let Some(scratch) = self.scratch.as_mut() {
						scratch.add(lx, lz, height);
					}
				}
				self.cursor += 1;
				if self.cursor == lattice.count() {
					if let Some(scratch) = self.scratch.take() {
						matrix.heights_mut().finish_update(scratch);
					}
					self.phase = UpdatePhase::Cells;
					self.cursor = 0;
				}
				true
			}
			UpdatePhase::Cells => {
				let Some(cells) = self.cell_bounds else {
					self.phase = UpdatePhase::Done;
					return false;
				};
				let coord = MatrixCoord::new(
					cells.min_column + self.cursor % cells.columns(),
					cells.min_row + self.cursor / cells.columns(),
				);
				let mut centre = matrix.cell_centre(coord);
				centre.y = matrix.ground_height(centre);
				let blocked = probe.is_blocked(centre, matrix.config().obstacle_sensitivity_range);
				let cell = &mut matrix[coord];
				cell.set_height(centre.y);
				cell.set_permanently_blocked(blocked);
				self.cursor += 1;
				if self.cursor == cells.count() {
					let around = cells.expand(1, matrix.columns(), matrix.rows());
					self.phase = UpdatePhase::HeightSettings(HeightSettingsProvider::new(matrix, around));
				}
				true
			}
			UpdatePhase::HeightSettings(provider) => {
				if !provider.step(matrix) {
					if matrix.config().generate_clearance {
						self.clearance_before = matrix.cells().iter().map(|c| c.clearance()).collect();
					}
					self.phase = UpdatePhase::Clearance(ClearanceProvider::new(matrix));
				}
				true
			}
			UpdatePhase::Clearance(provider) => {
				if provider.step(matrix) {
					true
				} else {
					self.clearance_changed = clearance_diff(matrix, &self.clearance_before);
					self.clearance_before = Vec::new();
					debug!(
						"Updated cells {:?}, clearance changed in {:?}",
						self.cell_bounds, self.clearance_changed
					);
					self.phase = UpdatePhase::Done;
					false
				}
			}
			UpdatePhase::Done => false,
		}
	}
}

/// Bounds of the cells whose clearance differs from `before`
fn clearance_diff(matrix: &CellMatrix, before: &[Option<f32>]) -> Option<MatrixBounds> {
	let mut changed: Option<MatrixBounds> = None;
	for (cell, old) in matrix.cells().iter().zip(before) {
		if cell.clearance() != *old {
			let single = MatrixBounds::single(cell.coord());
			changed = MatrixBounds::combine_optional(changed, Some(single));
		}
	}
	changed
}

// #[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;
	/// A probe with a 2 unit tall box at the world origin when `raised`
	fn probe(raised: bool) -> impl GroundProbe {
		FnGroundProbe::new(
			move |p: Vec3| {
				if raised && p.x.abs() <= 1.0 && p.z.abs() <= 1.0 {
					2.0
				} else {
					0.0
				}
			},
			move |p: Vec3, _r: f32| raised && p.x.abs() <= 0.5 && p.z.abs() <= 0.5,
		)
	}
	/// 12x12 matrix of unit cells
	fn config() -> MatrixConfig {
		MatrixConfig::new(Vec3::ZERO, 12, 12, 1.0)
	}
	#[test]
	fn update_matches_fresh_build() {
		let mut m = CellMatrix::create(config(), &probe(false));
		let raised = probe(true);
		let extent = WorldBounds::new(Vec3::ZERO, 3.0, 3.0);
		let mut update = MatrixUpdate::new(&m, extent);
		while update.step(&mut m, &raised) {}
		assert!(update.is_finished());
		let fresh = CellMatrix::create(config(), &raised);
		assert_eq!(fresh.heights().entries(), m.heights().entries());
		assert_eq!(fresh.cells(), m.cells());
	}
	#[test]
	fn quad_tree_update_matches_fresh_build() {
		let config = config().with_lookup_strategy(HeightLookupStrategy::QuadTree {
			max_depth: 3,
			leaf_capacity: 8,
		});
		let mut m = CellMatrix::create(config.clone(), &probe(false));
		let raised = probe(true);
		let mut update = MatrixUpdate::new(&m, WorldBounds::new(Vec3::ZERO, 3.0, 3.0));
		while update.step(&mut m, &raised) {}
		let fresh = CellMatrix::create(config, &raised);
		assert_eq!(fresh.heights().entries(), m.heights().entries());
		assert_eq!(fresh.cells(), m.cells());
	}
	#[test]
	fn cells_follow_new_ground() {
		let mut m = CellMatrix::create(config(), &probe(false));
		let mut update = MatrixUpdate::new(&m, WorldBounds::new(Vec3::ZERO, 2.0, 2.0));
		while update.step(&mut m, &probe(true)) {}
		let centre = m.get_cell(Vec3::new(0.5, 0.0, 0.5), false).map(|c| c.position().y);
		assert_eq!(Some(2.0), centre);
		assert!(m.get_cell(Vec3::new(0.1, 0.0, 0.1), false).is_some_and(|c| c.is_permanently_blocked()));
	}
	#[test]
	fn extent_outside_finishes_on_first_step() {
		let mut m = CellMatrix::create(config(), &probe(false));
		let before = m.clone();
		let mut update = MatrixUpdate::new(&m, WorldBounds::new(Vec3::new(100.0, 0.0, 0.0), 2.0, 2.0));
		assert!(!update.step(&mut m, &probe(true)));
		assert_eq!(None, update.changed_bounds(&m));
		assert_eq!(before, m);
	}
	#[test]
	fn changed_bounds_cover_distant_clearance() {
		let config = MatrixConfig::new(Vec3::ZERO, 20, 20, 1.0);
		let mut m = CellMatrix::create(config, &probe(false));
		let far = MatrixCoord::new(5, 5);
		let before = m[far].clearance();
		let mut update = MatrixUpdate::new(&m, WorldBounds::new(Vec3::ZERO, 1.0, 1.0));
		while update.step(&mut m, &probe(true)) {}
		assert_ne!(before, m[far].clearance());
		let changed = update.changed_bounds(&m);
		assert!(changed.is_some_and(|b| b.contains(far)));
	}
	#[test]
	fn live_lookup_untouched_until_commit() {
		let mut m = CellMatrix::create(config(), &probe(false));
		let mut update = MatrixUpdate::new(&m, WorldBounds::new(Vec3::ZERO, 2.0, 2.0));
		let raised = probe(true);
		// a few samples in and nothing has landed yet
		for _ in 0..5 {
			update.step(&mut m, &raised);
		}
		assert_eq!(0, m.heights().entry_count());
		while update.step(&mut m, &raised) {}
		assert!(m.heights().entry_count() > 0);
	}
}
