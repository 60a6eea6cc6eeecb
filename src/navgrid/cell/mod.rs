//! A [Cell] is one square of a [crate::prelude::CellMatrix]. Each cell
//! shares the same base record and differs only in its height payload and
//! whether it tracks clearance:
//!
//! ```text
//!               | no clearance     | clearance
//! --------------|------------------|-------------------
//! Flat          | flat             | flat + clearance
//! Standard      | direction mask   | mask + clearance
//! Rich          | 4 height records | records + clearance
//! ```
//!
//! The variant of a matrix is picked once from [cell_factory] and never
//! changes.
//!

pub mod height_record;
pub mod obstacles;

use bevy::prelude::*;

use crate::prelude::*;

/// Height payload of a [Cell]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum CellHeightData {
	/// Height is not modelled
	Flat,
	/// Directions in which the matrix wide [HeightCapabilities] are exceeded
	Standard(DirectionMask),
	/// Records for the owned directions `[East, NorthEast, North, NorthWest]`,
	/// the remaining directions are read from the neighbour that owns them
	Rich([HeightRecord; 4]),
}

/// A single square of the matrix
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
	/// Column and row within the matrix
	coord: MatrixCoord,
	/// World position of the cell centre, `y` follows the ground
	position: Vec3,
	/// Static geometry blocks the cell for every unit
	permanently_blocked: bool,
	/// Traversal cost, `1.0` is the baseline
	cost: f32,
	/// Grid neighbours that exist inside the matrix
	neighbours: DirectionMask,
	/// Attributes excluded by the dynamic obstacles covering the cell
	exclusion: AttributeMask,
	/// Dynamic obstacles covering the cell and their exception masks
	obstacles: Vec<(ObstacleId, AttributeMask)>,
	/// Height payload
	height: CellHeightData,
	/// Distance to the nearest blocked cell, [None] when the matrix does not
	/// track clearance
	clearance: Option<f32>,
}

impl Cell {
	/// Create a new instance of [Cell]
	pub fn new(
		coord: MatrixCoord,
		position: Vec3,
		permanently_blocked: bool,
		neighbours: DirectionMask,
		height: CellHeightData,
		clearance: Option<f32>,
	) -> Self {
		Cell {
			coord,
			position,
			permanently_blocked,
			cost: 1.0,
			neighbours,
			exclusion: AttributeMask::NONE,
			obstacles: Vec::new(),
			height,
			clearance,
		}
	}
	/// Column and row of the cell
	pub fn coord(&self) -> MatrixCoord {
		self.coord
	}
	/// World position of the cell centre
	pub fn position(&self) -> Vec3 {
		self.position
	}
	/// Move the cell to a new ground height
	pub fn set_height(&mut self, y: f32) {
		self.position.y = y;
	}
	/// Whether scene geometry occupies the cell
	pub fn is_permanently_blocked(&self) -> bool {
		self.permanently_blocked
	}
	/// Mark whether scene geometry occupies the cell
	pub fn set_permanently_blocked(&mut self, blocked: bool) {
		self.permanently_blocked = blocked;
	}
	/// Traversal cost multiplier
	pub fn cost(&self) -> f32 {
		self.cost
	}
	/// Set the traversal cost multiplier
	pub fn set_cost(&mut self, cost: f32) {
		self.cost = cost;
	}
	/// Grid neighbours that exist
	pub fn neighbours(&self) -> DirectionMask {
		self.neighbours
	}
	/// Whether a grid neighbour exists in `direction`
	pub fn has_neighbour(&self, direction: Direction) -> bool {
		self.neighbours.contains(direction)
	}
	/// Aggregated exclusion mask from dynamic obstacles
	pub fn exclusion_mask(&self) -> AttributeMask {
		self.exclusion
	}
	/// Whether a dynamic obstacle blocks a unit with `attributes`
	pub fn is_blocked_for(&self, attributes: AttributeMask) -> bool {
		self.exclusion.intersects(attributes)
	}
	/// Height information of the cell's mode
	pub fn height_data(&self) -> &CellHeightData {
		&self.height
	}
	/// Mutable height information of the cell's mode
	pub fn height_data_mut(&mut self) -> &mut CellHeightData {
		&mut self.height
	}
	/// The stored record of an owned direction, [None] for unowned
	/// directions and non-rich cells
	pub fn owned_record(&self, direction: Direction) -> Option<HeightRecord> {
		match &self.height {
			CellHeightData::Rich(records) if direction.is_owned() => Some(records[direction.index()]),
			_ => None,
		}
	}
	/// Whether the cell tracks clearance
	pub fn has_clearance(&self) -> bool {
		self.clearance.is_some()
	}
	/// Distance to the nearest blocked cell, [None] when not tracked
	pub fn clearance(&self) -> Option<f32> {
		self.clearance
	}
	/// Set the clearance, ignored when the cell does not track it
	pub fn set_clearance(&mut self, value: f32) {
		if let Some(c) = self.clearance.as_mut() {
			*c = value;
		}
	}
	/// Whether `position` lies within the square of side `cell_size`
	/// centred on this cell
	pub fn contains(&self, position: Vec3, cell_size: f32) -> bool {
		let half = cell_size / 2.0;
		(position.x - self.position.x).abs() <= half && (position.z - self.position.z).abs() <= half
	}
}

/// Produces the configured variant of [Cell] from its coordinate, centre
/// and blocked state
pub type CellFactory = fn(&MatrixConfig, MatrixCoord, Vec3, bool) -> Cell;

/// Factories indexed by `[height mode][clearance]`
static CELL_FACTORIES: [[CellFactory; 2]; 3] = [
	[flat_cell, flat_cell_with_clearance],
	[standard_cell, standard_cell_with_clearance],
	[rich_cell, rich_cell_with_clearance],
];

/// Select the factory for the height mode and clearance setting of `config`
pub fn cell_factory(config: &MatrixConfig) -> CellFactory {
	CELL_FACTORIES[config.height_mode.index()][config.generate_clearance as usize]
}

/// The directions in which a neighbour exists for `coord`
fn existing_neighbours(config: &MatrixConfig, coord: MatrixCoord) -> DirectionMask {
	let mut mask = DirectionMask::NONE;
	for d in Direction::ALL {
		let (dx, dz) = d.offset();
		if coord.offset(dx, dz, config.columns, config.rows).is_some() {
			mask.set(d, true);
		}
	}
	mask
}

/// Flat cell
fn flat_cell(config: &MatrixConfig, coord: MatrixCoord, position: Vec3, blocked: bool) -> Cell {
	let neighbours = existing_neighbours(config, coord);
	Cell::new(coord, position, blocked, neighbours, CellHeightData::Flat, None)
}

/// Flat cell with clearance
fn flat_cell_with_clearance(
	config: &MatrixConfig,
	coord: MatrixCoord,
	position: Vec3,
	blocked: bool,
) -> Cell {
	let neighbours = existing_neighbours(config, coord);
	Cell::new(coord, position, blocked, neighbours, CellHeightData::Flat, Some(0.0))
}

/// Standard cell
fn standard_cell(config: &MatrixConfig, coord: MatrixCoord, position: Vec3, blocked: bool) -> Cell {
	let neighbours = existing_neighbours(config, coord);
	let height = CellHeightData::Standard(DirectionMask::NONE);
	Cell::new(coord, position, blocked, neighbours, height, None)
}

/// Standard cell with clearance
fn standard_cell_with_clearance(
	config: &MatrixConfig,
	coord: MatrixCoord,
	position: Vec3,
	blocked: bool,
) -> Cell {
	let neighbours = existing_neighbours(config, coord);
	let height = CellHeightData::Standard(DirectionMask::NONE);
	Cell::new(coord, position, blocked, neighbours, height, Some(0.0))
}

/// Rich cell
fn rich_cell(config: &MatrixConfig, coord: MatrixCoord, position: Vec3, blocked: bool) -> Cell {
	let neighbours = existing_neighbours(config, coord);
	let height = CellHeightData::Rich([HeightRecord::default(); 4]);
	Cell::new(coord, position, blocked, neighbours, height, None)
}

/// Rich cell with clearance
fn rich_cell_with_clearance(
	config: &MatrixConfig,
	coord: MatrixCoord,
	position: Vec3,
	blocked: bool,
) -> Cell {
	let neighbours = existing_neighbours(config, coord);
	let height = CellHeightData::Rich([HeightRecord::default(); 4]);
	Cell::new(coord, position, blocked, neighbours, height, Some(0.0))
}

// #[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn factory_table_variants() {
		let base = MatrixConfig::new(Vec3::ZERO, 4, 4, 1.0);
		let coord = MatrixCoord::new(1, 1);
		for (mode, clearance) in [
			(HeightMode::Flat, false),
			(HeightMode::Flat, true),
			(HeightMode::Standard, false),
			(HeightMode::Standard, true),
			(HeightMode::Rich, false),
			(HeightMode::Rich, true),
		] {
			let config = base.clone().with_height_mode(mode).with_clearance(clearance);
			let cell = cell_factory(&config)(&config, coord, Vec3::ZERO, false);
			assert_eq!(clearance, cell.has_clearance());
			let result = match cell.height_data() {
				CellHeightData::Flat => HeightMode::Flat,
				CellHeightData::Standard(_) => HeightMode::Standard,
				CellHeightData::Rich(_) => HeightMode::Rich,
			};
			assert_eq!(mode, result);
		}
	}
	#[test]
	fn corner_neighbours() {
		let config = MatrixConfig::new(Vec3::ZERO, 4, 4, 1.0);
		let cell = cell_factory(&config)(&config, MatrixCoord::new(0, 0), Vec3::ZERO, false);
		let result: Vec<Direction> = cell.neighbours().iter().collect();
		let actual = vec![Direction::East, Direction::NorthEast, Direction::North];
		assert_eq!(actual, result);
	}
	#[test]
	fn interior_neighbours() {
		let config = MatrixConfig::new(Vec3::ZERO, 4, 4, 1.0);
		let cell = cell_factory(&config)(&config, MatrixCoord::new(2, 1), Vec3::ZERO, false);
		assert_eq!(DirectionMask::ALL, cell.neighbours());
	}
	#[test]
	fn clearance_ignored_without_tracking() {
		let config = MatrixConfig::new(Vec3::ZERO, 4, 4, 1.0).with_clearance(false);
		let mut cell = cell_factory(&config)(&config, MatrixCoord::new(2, 1), Vec3::ZERO, false);
		cell.set_clearance(4.0);
		assert_eq!(None, cell.clearance());
	}
	#[test]
	fn owned_records_only() {
		let config = MatrixConfig::new(Vec3::ZERO, 4, 4, 1.0).with_height_mode(HeightMode::Rich);
		let cell = cell_factory(&config)(&config, MatrixCoord::new(2, 1), Vec3::ZERO, false);
		assert_eq!(Some(HeightRecord::default()), cell.owned_record(Direction::North));
		assert_eq!(None, cell.owned_record(Direction::South));
	}
	#[test]
	fn contains_own_square() {
		let config = MatrixConfig::new(Vec3::ZERO, 4, 4, 2.0);
		let cell = cell_factory(&config)(&config, MatrixCoord::new(2, 1), Vec3::new(1.0, 0.0, -1.0), false);
		assert!(cell.contains(Vec3::new(0.1, 5.0, -1.9), 2.0));
		assert!(!cell.contains(Vec3::new(2.1, 0.0, -1.0), 2.0));
	}
}
