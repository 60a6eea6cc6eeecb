//! Builds a [CellMatrix] one unit of work at a time so that populating a
//! large grid can be spread across many frames.
//!
//! Population runs through four phases:
//!
//! 1. sample every lattice point (or decode it from baked data)
//! 2. create every cell at its ground height and probe whether it is blocked
//! 3. classify the height of every neighbour pair
//! 4. sweep clearance column by column
//!

use bevy::prelude::*;

use crate::prelude::*;

/// Phase of population
#[derive(Debug, Clone, PartialEq)]
enum InitialisePhase {
	/// Filling the height lattice
	Lattice,
	/// Creating cells
	Cells,
	/// Classifying neighbour pairs
	HeightSettings(HeightSettingsProvider),
	/// Sweeping clearance
	Clearance(ClearanceProvider),
	/// Matrix complete
	Done,
}

/// Resumable construction of a [CellMatrix]
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixInitialiser {
	/// The matrix under construction
	matrix: CellMatrix,
	/// Baked lattice and blocked cells used instead of probing
	baked: Option<BakedGridData>,
	/// Current phase
	phase: InitialisePhase,
	/// Position within the current phase
	cursor: usize,
	/// Produces the configured cell variant
	factory: CellFactory,
	/// Units of work done so far
	steps: usize,
}

impl MatrixInitialiser {
	/// Create a new instance of [MatrixInitialiser]. Baked data that does
	/// not fit the config is discarded and every sample falls back to the
	/// origin height with no blocked cells
	pub(crate) fn new(config: MatrixConfig, data: Option<BakedGridData>) -> Self {
		let baked = data.map(|mut d| {
			if d.is_valid_for(&config) {
				d.blocked_indices.sort_unstable();
				d
			} else {
				error!(
					"Baked grid data does not fit a {}x{} matrix with {} lattice samples, using default heights",
					config.columns,
					config.rows,
					config.lattice_count()
				);
				BakedGridData::default()
			}
		});
		let factory = cell_factory(&config);
		MatrixInitialiser {
			matrix: CellMatrix::empty(config),
			baked,
			phase: InitialisePhase::Lattice,
			cursor: 0,
			factory,
			steps: 0,
		}
	}
	/// Do one unit of work. Returns `false` once the matrix is complete.
	/// The probe is not consulted when populating from baked data
	pub fn step<P: GroundProbe + ?Sized>(&mut self, probe: &P) -> bool {
		match &mut self.phase {
			InitialisePhase::Lattice => {
				self.sample_lattice(probe);
				self.cursor += 1;
				if self.cursor == self.matrix.config().lattice_count() {
					self.matrix.heights_mut().cleanup();
					trace!(
						"Lattice sampled with {} recorded heights",
						self.matrix.heights().entry_count()
					);
					self.phase = InitialisePhase::Cells;
					self.cursor = 0;
				}
			}
			InitialisePhase::Cells => {
				self.create_cell(probe);
				self.cursor += 1;
				if self.matrix.is_populated() {
					let bounds = self.matrix.bounds();
					self.phase = InitialisePhase::HeightSettings(HeightSettingsProvider::new(
						&self.matrix,
						bounds,
					));
				}
			}
			InitialisePhase::HeightSettings(provider) => {
				if !provider.step(&mut self.matrix) {
					self.phase = InitialisePhase::Clearance(ClearanceProvider::new(&self.matrix));
				}
			}
			InitialisePhase::Clearance(provider) => {
				if !provider.step(&mut self.matrix) {
					debug!(
						"Initialised {}x{} matrix in {} steps",
						self.matrix.columns(),
						self.matrix.rows(),
						self.steps
					);
					self.phase = InitialisePhase::Done;
					return false;
				}
			}
			InitialisePhase::Done => return false,
		}
		self.steps += 1;
		true
	}
	/// Whether every phase has completed
	pub fn is_finished(&self) -> bool {
		self.phase == InitialisePhase::Done
	}
	/// Units of work done so far
	pub fn steps_taken(&self) -> usize {
		self.steps
	}
	/// Config of the matrix being built
	pub fn config(&self) -> &MatrixConfig {
		self.matrix.config()
	}
	/// Take the finished matrix. Panics if population is incomplete
	pub fn finish(self) -> CellMatrix {
		if !self.is_finished() {
			panic!(
				"Matrix initialisation is incomplete after {} steps, keep stepping until it reports no more work",
				self.steps
			);
		}
		self.matrix
	}
	/// Sample lattice point `cursor` in row-major order
	fn sample_lattice<P: GroundProbe + ?Sized>(&mut self, probe: &P) {
		let config = self.matrix.config();
		let origin_height = config.origin.y;
		let lx = self.cursor % config.lattice_columns();
		let lz = self.cursor / config.lattice_columns();
		let height = match &self.baked {
			Some(data) => data.height_at(self.cursor).unwrap_or(origin_height),
			None => probe.sample_ground_height(self.matrix.lattice_position(lx, lz)),
		};
		if height != origin_height {
			self.matrix.heights_mut().add(lx, lz, height);
		}
	}
	/// Create cell `cursor` in row-major order
	fn create_cell<P: GroundProbe + ?Sized>(&mut self, probe: &P) {
		let config = self.matrix.config();
		let coord = MatrixCoord::new(self.cursor % config.columns, self.cursor / config.columns);
		let mut centre = self.matrix.cell_centre(coord);
		centre.y = self.matrix.ground_height(centre);
		let blocked = match &self.baked {
			Some(data) => data.blocked_indices.binary_search(&self.cursor).is_ok(),
			None => probe.is_blocked(centre, config.obstacle_sensitivity_range),
		};
		let cell = (self.factory)(config, coord, centre, blocked);
		self.matrix.push_cell(cell);
	}
}
