//! Classifies the height difference between each pair of neighbouring
//! cells.
//!
//! A cell owns the pairs it forms towards East, NorthEast, North and
//! NorthWest, the other four directions belong to the neighbour on the far
//! side. For each pair the lattice is sampled from one cell centre to the
//! other along three parallel lines, the centre line and a line either side
//! of it offset by the obstacle sensitivity range:
//!
//! ```text
//!     .  .  .  .  .
//!  A  o--o--o--o--o  B
//!     .  .  .  .  .
//! ```
//!
//! Consecutive rises add up to a climb and consecutive falls to a drop,
//! anything within the ledge threshold is treated as noise and breaks the
//! run. The steepest single step is converted into a slope angle.
//!

use bevy::prelude::*;

use crate::prelude::*;

/// Resumable height classification over a rectangle of cells, each step
/// measures one pair of neighbours
#[derive(Debug, Clone, PartialEq)]
pub struct HeightSettingsProvider {
	/// Cells whose owned pairs are measured, [None] when there is nothing to
	/// do
	bounds: Option<MatrixBounds>,
	/// Row-major position of the current cell within the bounds
	cursor: usize,
	/// Index into [Direction::OWNED] of the next pair of the current cell
	direction: usize,
}

impl HeightSettingsProvider {
	/// Create a new instance of [HeightSettingsProvider] over `bounds`. Flat
	/// matrices and capabilities that ignore height produce a provider that
	/// finishes immediately
	pub fn new(matrix: &CellMatrix, bounds: MatrixBounds) -> Self {
		let config = matrix.config();
		let skip = config.height_mode == HeightMode::Flat || config.capabilities.ignores_height();
		let bounds = if skip {
			None
		} else {
			bounds.intersection(&matrix.bounds())
		};
		HeightSettingsProvider {
			bounds,
			cursor: 0,
			direction: 0,
		}
	}
	/// Run every remaining step
	pub fn calculate(matrix: &mut CellMatrix, bounds: MatrixBounds) {
		let mut provider = HeightSettingsProvider::new(matrix, bounds);
		while provider.step(matrix) {}
	}
	/// Measure the next pair. Returns `false` once every pair is done
	pub fn step(&mut self, matrix: &mut CellMatrix) -> bool {
		let Some(bounds) = self.bounds else {
			return false;
		};
		while self.cursor < bounds.count() {
			let coord = MatrixCoord::new(
				bounds.min_column + self.cursor % bounds.columns(),
				bounds.min_row + self.cursor / bounds.columns(),
			);
			while self.direction < Direction::OWNED.len() {
				let direction = Direction::OWNED[self.direction];
				self.direction += 1;
				if let Some(neighbour) = matrix.neighbour(coord, direction) {
					apply_pair(matrix, coord, direction, neighbour);
					return true;
				}
			}
			self.cursor += 1;
			self.direction = 0;
		}
		self.bounds = None;
		false
	}
	/// Whether every neighbour pair has been classified
	pub fn is_finished(&self) -> bool {
		self.bounds.is_none()
	}
}

/// Measure the pair and store the outcome on both cells
fn apply_pair(matrix: &mut CellMatrix, owner: MatrixCoord, direction: Direction, neighbour: MatrixCoord) {
	let record = measure_pair(matrix, owner, neighbour);
	let capabilities = matrix.config().capabilities;
	match matrix[owner].height_data_mut() {
		CellHeightData::Standard(mask) => {
			mask.set(direction, !capabilities.allows(&record));
		}
		CellHeightData::Rich(records) => {
			records[direction.index()] = record;
		}
		CellHeightData::Flat => {}
	}
	if let CellHeightData::Standard(mask) = matrix[neighbour].height_data_mut() {
		mask.set(direction.opposite(), !capabilities.allows(&record.reversed()));
	}
}

/// Measure slope, climb and drop travelling from the centre of `from` to
/// the centre of `to`
pub fn measure_pair(matrix: &CellMatrix, from: MatrixCoord, to: MatrixCoord) -> HeightRecord {
	let config = matrix.config();
	let a = matrix.cell_centre(from);
	let b = matrix.cell_centre(to);
	let span = Vec2::new(b.x - a.x, b.z - a.z);
	let length = span.length();
	if length <= 0.0 {
		return HeightRecord::default();
	}
	let perpendicular = Vec2::new(-span.y, span.x) / length;
	let steps = (length / config.height_granularity).ceil().max(1.0) as usize;
	let segment = length / steps as f32;
	let range = config.obstacle_sensitivity_range;
	let mut max_delta: f32 = 0.0;
	let mut max_climb: f32 = 0.0;
	let mut max_drop: f32 = 0.0;
	for offset in [0.0, range, -range] {
		let shift = perpendicular * offset;
		let point = |i: usize| {
			let t = i as f32 / steps as f32;
			Vec3::new(a.x + span.x * t + shift.x, a.y, a.z + span.y * t + shift.y)
		};
		let mut previous = matrix.ground_height(point(0));
		let mut climb = 0.0;
		let mut drop = 0.0;
		for i in 1..=steps {
			let height = matrix.ground_height(point(i));
			let delta = height - previous;
			max_delta = max_delta.max(delta.abs());
			if delta.abs() <= config.ledge_threshold {
				climb = 0.0;
				drop = 0.0;
			} else if delta > 0.0 {
				climb += delta;
				drop = 0.0;
				max_climb = max_climb.max(climb);
			} else {
				drop -= delta;
				climb = 0.0;
				max_drop = max_drop.max(drop);
			}
			previous = height;
		}
	}
	let slope_angle = (max_delta / segment).atan().to_degrees();
	HeightRecord::new(slope_angle, max_climb, max_drop)
}
