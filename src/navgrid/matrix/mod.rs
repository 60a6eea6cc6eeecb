//! The [CellMatrix] owns every [Cell] of a grid along with the height
//! lattice sampled beneath it.
//!
//! The matrix is centred on its origin, world space `x` maps to columns and
//! `z` maps to rows, cell `(0, 0)` being the `(-x, -z)` corner:
//!
//! ```text
//!  z
//!  ^ ___________________
//!  ||(0,2)|(1,2)|(2,2)|
//!  ||_____|_____|_____|
//!  ||(0,1)|(1,1)|(2,1)|
//!  ||_____|__o__|_____|
//!  ||(0,0)|(1,0)|(2,0)|
//!  ||_____|_____|_____|
//!  +--------------------> x
//! ```
//!
//! A matrix is built once, either all at once or incrementally through a
//! [MatrixInitialiser], and afterwards refreshed region by region with a
//! [MatrixUpdate]. It is never resized.
//!

pub mod initialiser;
pub mod update;

use std::ops::{Index, IndexMut};

use bevy::prelude::*;

use crate::prelude::*;

/// Grid of navigation cells plus the height lattice beneath them
#[derive(Debug, Clone, PartialEq)]
pub struct CellMatrix {
	/// Shape and classification settings
	config: MatrixConfig,
	/// World position of the `(-x, -z)` corner
	start: Vec3,
	/// Cells in row-major order, `z * columns + x`
	cells: Vec<Cell>,
	/// Sampled ground heights
	heights: HeightLookupKind,
}

impl CellMatrix {
	/// A matrix with no cells yet, filled in by the initialiser
	pub(crate) fn empty(config: MatrixConfig) -> Self {
		config.validate();
		let start = config.start();
		let heights = HeightLookupKind::new(&config);
		let cells = Vec::with_capacity(config.columns * config.rows);
		CellMatrix {
			config,
			start,
			cells,
			heights,
		}
	}
	/// Build a matrix in one go by probing the scene
	pub fn create<P: GroundProbe + ?Sized>(config: MatrixConfig, probe: &P) -> Self {
		let mut initialiser = CellMatrix::create_incrementally(config);
		while initialiser.step(probe) {}
		initialiser.finish()
	}
	/// Build a matrix in one go from previously baked data, the scene is not
	/// probed
	pub fn create_from_baked(config: MatrixConfig, data: BakedGridData) -> Self {
		let probe = FlatGroundProbe::new(config.origin.y);
		let mut initialiser = CellMatrix::create_incrementally_from_baked(config, data);
		while initialiser.step(&probe) {}
		initialiser.finish()
	}
	/// Begin building a matrix one unit of work at a time
	pub fn create_incrementally(config: MatrixConfig) -> MatrixInitialiser {
		MatrixInitialiser::new(config, None)
	}
	/// Begin building a matrix from baked data one unit of work at a time
	pub fn create_incrementally_from_baked(
		config: MatrixConfig,
		data: BakedGridData,
	) -> MatrixInitialiser {
		MatrixInitialiser::new(config, Some(data))
	}
	/// Settings the matrix was built with
	pub fn config(&self) -> &MatrixConfig {
		&self.config
	}
	/// Number of cells along `x`
	pub fn columns(&self) -> usize {
		self.config.columns
	}
	/// Number of cells along `z`
	pub fn rows(&self) -> usize {
		self.config.rows
	}
	/// Length of a cell side
	pub fn cell_size(&self) -> f32 {
		self.config.cell_size
	}
	/// World position of the matrix centre
	pub fn origin(&self) -> Vec3 {
		self.config.origin
	}
	/// World position of the `(-x, -z)` corner
	pub fn start(&self) -> Vec3 {
		self.start
	}
	/// The world space rectangle covered by the matrix
	pub fn world_bounds(&self) -> WorldBounds {
		self.config.world_bounds()
	}
	/// Bounds spanning every cell
	pub fn bounds(&self) -> MatrixBounds {
		MatrixBounds::full(self.columns(), self.rows())
	}
	/// The height lattice
	pub fn heights(&self) -> &HeightLookupKind {
		&self.heights
	}
	/// Mutable access to the lattice for population and updates
	pub(crate) fn heights_mut(&mut self) -> &mut HeightLookupKind {
		&mut self.heights
	}
	/// Append the next cell in row-major order
	pub(crate) fn push_cell(&mut self, cell: Cell) {
		self.cells.push(cell);
	}
	/// Whether every cell has been created
	pub(crate) fn is_populated(&self) -> bool {
		self.cells.len() == self.columns() * self.rows()
	}
	/// Every cell in row-major order
	pub fn cells(&self) -> &[Cell] {
		&self.cells
	}
	/// Position of `(x, z)` within the cell storage
	fn index_of(&self, x: usize, z: usize) -> usize {
		if x >= self.columns() || z >= self.rows() {
			panic!(
				"Cell ({}, {}) is outside of the {}x{} matrix",
				x,
				z,
				self.columns(),
				self.rows()
			);
		}
		z * self.columns() + x
	}
	/// Get the cell at column `x` and row `z`. Panics when out of range
	pub fn cell(&self, x: usize, z: usize) -> &Cell {
		&self.cells[self.index_of(x, z)]
	}
	/// Get mutable access to the cell at column `x` and row `z`. Panics when
	/// out of range
	pub fn cell_mut(&mut self, x: usize, z: usize) -> &mut Cell {
		let i = self.index_of(x, z);
		&mut self.cells[i]
	}
	/// Get the cell at `coord`, [None] when out of range
	pub fn try_cell(&self, coord: MatrixCoord) -> Option<&Cell> {
		if coord.x >= self.columns() || coord.z >= self.rows() {
			return None;
		}
		self.cells.get(coord.z * self.columns() + coord.x)
	}
	/// World position of a cell centre at the origin height
	pub fn cell_centre(&self, coord: MatrixCoord) -> Vec3 {
		let cs = self.cell_size();
		Vec3::new(
			self.start.x + coord.x as f32 * cs + cs / 2.0,
			self.start.y,
			self.start.z + coord.z as f32 * cs + cs / 2.0,
		)
	}
	/// Nearest lattice sample to `position`, clamped to the lattice
	pub fn lattice_coord(&self, position: Vec3) -> (usize, usize) {
		let g = self.config.height_granularity;
		let lx = ((position.x - self.start.x) / g).round().max(0.0) as usize;
		let lz = ((position.z - self.start.z) / g).round().max(0.0) as usize;
		(
			lx.min(self.config.lattice_columns() - 1),
			lz.min(self.config.lattice_rows() - 1),
		)
	}
	/// World position of a lattice sample at the origin height
	pub fn lattice_position(&self, lx: usize, lz: usize) -> Vec3 {
		let g = self.config.height_granularity;
		Vec3::new(
			self.start.x + lx as f32 * g,
			self.start.y,
			self.start.z + lz as f32 * g,
		)
	}
	/// Height of a lattice sample, unrecorded samples sit at the origin
	/// height
	pub fn sample_lattice(&self, lx: usize, lz: usize) -> f32 {
		self.heights
			.try_get_height(lx, lz)
			.unwrap_or(self.config.origin.y)
	}
	/// Ground height beneath `position` read from the nearest lattice sample
	pub fn ground_height(&self, position: Vec3) -> f32 {
		let (lx, lz) = self.lattice_coord(position);
		self.sample_lattice(lx, lz)
	}
	/// Lattice samples covering the squares of the cells in `bounds`
	pub fn lattice_bounds(&self, bounds: &MatrixBounds) -> MatrixBounds {
		let ratio = self.cell_size() / self.config.height_granularity;
		let max_x = self.config.lattice_columns() - 1;
		let max_z = self.config.lattice_rows() - 1;
		let min_lx = ((bounds.min_column as f32 * ratio).floor() as usize).min(max_x);
		let max_lx = (((bounds.max_column + 1) as f32 * ratio).ceil() as usize).min(max_x);
		let min_lz = ((bounds.min_row as f32 * ratio).floor() as usize).min(max_z);
		let max_lz = (((bounds.max_row + 1) as f32 * ratio).ceil() as usize).min(max_z);
		MatrixBounds::new(min_lx, max_lx, min_lz, max_lz)
	}
	/// Cells whose squares touch the lattice samples in `lattice`
	pub fn cell_bounds_of_lattice(&self, lattice: &MatrixBounds) -> MatrixBounds {
		let ratio = self.config.height_granularity / self.cell_size();
		let to_min = |l: usize, limit: usize| {
			(((l as f32 * ratio - BOUNDS_EPSILON).floor()).max(0.0) as usize).min(limit - 1)
		};
		let to_max = |l: usize, limit: usize| ((l as f32 * ratio).floor() as usize).min(limit - 1);
		MatrixBounds::new(
			to_min(lattice.min_column, self.columns()),
			to_max(lattice.max_column, self.columns()),
			to_min(lattice.min_row, self.rows()),
			to_max(lattice.max_row, self.rows()),
		)
	}
	/// Column and row containing `position`. Outside the matrix this is
	/// [None] unless `adjust_to_bounds` clamps it to the nearest edge cell
	pub fn get_cell_coord(&self, position: Vec3, adjust_to_bounds: bool) -> Option<MatrixCoord> {
		let cs = self.cell_size();
		let x = ((position.x - self.start.x) / cs).floor() as i64;
		let z = ((position.z - self.start.z) / cs).floor() as i64;
		let columns = self.columns() as i64;
		let rows = self.rows() as i64;
		if x < 0 || z < 0 || x >= columns || z >= rows {
			if !adjust_to_bounds {
				return None;
			}
			let x = x.clamp(0, columns - 1) as usize;
			let z = z.clamp(0, rows - 1) as usize;
			return Some(MatrixCoord::new(x, z));
		}
		Some(MatrixCoord::new(x as usize, z as usize))
	}
	/// The cell containing `position`, see [CellMatrix::get_cell_coord]
	pub fn get_cell(&self, position: Vec3, adjust_to_bounds: bool) -> Option<&Cell> {
		self.get_cell_coord(position, adjust_to_bounds)
			.map(|c| &self[c])
	}
	/// Convert a world space rectangle centred on `position` into the
	/// inclusive bounds of the cells it covers.
	///
	/// With a `min_overlap_to_include` of zero a cell that merely touches
	/// the positive edge of the rectangle is left out. With a positive
	/// overlap a cell has to overlap the rectangle by at least that much,
	/// overlapping by exactly that much is enough.
	///
	/// When `adjust_to_bounds` is `false` the result is clipped to the
	/// matrix and [None] if nothing remains, otherwise each edge is clamped
	/// to the nearest cell
	pub fn get_matrix_bounds(
		&self,
		position: Vec3,
		radius_x: f32,
		radius_z: f32,
		min_overlap_to_include: f32,
		adjust_to_bounds: bool,
	) -> Option<MatrixBounds> {
		let cs = self.cell_size();
		let fx = position.x - self.start.x;
		let fz = position.z - self.start.z;
		let rx = radius_x.abs();
		let rz = radius_z.abs();
		let overlap = min_overlap_to_include.max(0.0);
		let (min_x, mut max_x, min_z, mut max_z) = if overlap == 0.0 {
			(
				((fx - rx) / cs).floor() as i64,
				((fx + rx - BOUNDS_EPSILON) / cs).floor() as i64,
				((fz - rz) / cs).floor() as i64,
				((fz + rz - BOUNDS_EPSILON) / cs).floor() as i64,
			)
		} else {
			(
				((fx - rx + overlap - BOUNDS_EPSILON) / cs).floor() as i64,
				((fx + rx - overlap + BOUNDS_EPSILON) / cs).floor() as i64,
				((fz - rz + overlap - BOUNDS_EPSILON) / cs).floor() as i64,
				((fz + rz - overlap + BOUNDS_EPSILON) / cs).floor() as i64,
			)
		};
		if overlap == 0.0 {
			// a degenerate rectangle still covers the cell under its centre
			max_x = max_x.max(min_x);
			max_z = max_z.max(min_z);
		}
		if min_x > max_x || min_z > max_z {
			return None;
		}
		let columns = self.columns() as i64;
		let rows = self.rows() as i64;
		if adjust_to_bounds {
			let clamp_x = |v: i64| v.clamp(0, columns - 1) as usize;
			let clamp_z = |v: i64| v.clamp(0, rows - 1) as usize;
			return Some(MatrixBounds::new(
				clamp_x(min_x),
				clamp_x(max_x),
				clamp_z(min_z),
				clamp_z(max_z),
			));
		}
		if max_x < 0 || max_z < 0 || min_x >= columns || min_z >= rows {
			return None;
		}
		Some(MatrixBounds::new(
			min_x.max(0) as usize,
			max_x.min(columns - 1) as usize,
			min_z.max(0) as usize,
			max_z.min(rows - 1) as usize,
		))
	}
	/// Matrix bounds covered by a world rectangle, see
	/// [CellMatrix::get_matrix_bounds]
	pub fn get_matrix_bounds_of(&self, world: &WorldBounds) -> Option<MatrixBounds> {
		self.get_matrix_bounds(world.center, world.radius_x, world.radius_z, 0.0, false)
	}
	/// The grid neighbour of `coord` in `direction`
	pub fn neighbour(&self, coord: MatrixCoord, direction: Direction) -> Option<MatrixCoord> {
		let (dx, dz) = direction.offset();
		coord.offset(dx, dz, self.columns(), self.rows())
	}
	/// Cells forming the square ring `radius` cells away from `coord`, rows
	/// ascending then columns ascending. Parts of the ring outside of the
	/// matrix are skipped
	pub fn get_concentric_neighbours(&self, coord: MatrixCoord, radius: usize) -> Vec<MatrixCoord> {
		let min_x = coord.x.saturating_sub(radius);
		let max_x = (coord.x + radius).min(self.columns() - 1);
		let min_z = coord.z.saturating_sub(radius);
		let max_z = (coord.z + radius).min(self.rows() - 1);
		let mut ring = Vec::new();
		for z in min_z..=max_z {
			for x in min_x..=max_x {
				let c = MatrixCoord::new(x, z);
				if c.cell_distance(coord) == radius {
					ring.push(c);
				}
			}
		}
		ring
	}
	/// Cells inside `bounds`, clipped to the matrix. Rows ascending then
	/// columns ascending
	pub fn get_range(&self, bounds: &MatrixBounds) -> Vec<&Cell> {
		let Some(clipped) = bounds.intersection(&self.bounds()) else {
			return Vec::new();
		};
		let mut cells = Vec::with_capacity(clipped.count());
		for z in clipped.min_row..=clipped.max_row {
			for x in clipped.min_column..=clipped.max_column {
				cells.push(self.cell(x, z));
			}
		}
		cells
	}
	/// Cells whose centre lies within `radius` of `position` on the `x-z`
	/// plane
	pub fn get_cells_in_radius(&self, position: Vec3, radius: f32) -> Vec<&Cell> {
		let Some(bounds) = self.get_matrix_bounds(position, radius, radius, 0.0, false) else {
			return Vec::new();
		};
		let r2 = radius * radius;
		self.get_range(&bounds)
			.into_iter()
			.filter(|c| {
				let p = c.position();
				let dx = p.x - position.x;
				let dz = p.z - position.z;
				dx * dx + dz * dz <= r2
			})
			.collect()
	}
	/// Whether a unit with `attributes` may stand on `coord`
	pub fn is_walkable(&self, coord: MatrixCoord, attributes: AttributeMask) -> bool {
		match self.try_cell(coord) {
			Some(cell) => !cell.is_permanently_blocked() && !cell.is_blocked_for(attributes),
			None => false,
		}
	}
	/// Whether a unit with `attributes` and `radius` fits on `coord`. Cells
	/// without clearance only check walkability
	pub fn is_walkable_with_clearance(
		&self,
		coord: MatrixCoord,
		attributes: AttributeMask,
		radius: f32,
	) -> bool {
		if !self.is_walkable(coord, attributes) {
			return false;
		}
		self.try_cell(coord)
			.and_then(|c| c.clearance())
			.is_none_or(|clearance| clearance >= radius)
	}
	/// Height record for travelling from `from` in `direction`. Only rich
	/// cells hold records, unowned directions are read back from the
	/// neighbour that owns them
	pub fn height_record(&self, from: MatrixCoord, direction: Direction) -> Option<HeightRecord> {
		let cell = self.try_cell(from)?;
		if !matches!(cell.height_data(), CellHeightData::Rich(_)) {
			return None;
		}
		if direction.is_owned() {
			return cell.owned_record(direction);
		}
		let neighbour = self.neighbour(from, direction)?;
		self[neighbour]
			.owned_record(direction.opposite())
			.map(|r| r.reversed())
	}
	/// Whether the height difference between `from` and its neighbour in
	/// `direction` is within tolerance. Standard cells use the matrix wide
	/// capabilities they were classified with, rich cells are evaluated
	/// against `capabilities`
	pub fn is_height_walkable(
		&self,
		from: MatrixCoord,
		direction: Direction,
		capabilities: &HeightCapabilities,
	) -> bool {
		let Some(cell) = self.try_cell(from) else {
			return false;
		};
		if !cell.has_neighbour(direction) {
			return false;
		}
		match cell.height_data() {
			CellHeightData::Flat => true,
			CellHeightData::Standard(mask) => !mask.contains(direction),
			CellHeightData::Rich(_) => {
				if capabilities.ignores_height() {
					return true;
				}
				self.height_record(from, direction)
					.is_some_and(|r| capabilities.allows(&r))
			}
		}
	}
	/// Grid neighbours of `coord` that `unit` can step onto
	pub fn get_walkable_neighbours(&self, coord: MatrixCoord, unit: &UnitProfile) -> Vec<MatrixCoord> {
		let Some(cell) = self.try_cell(coord) else {
			return Vec::new();
		};
		let mut walkable = Vec::new();
		for direction in cell.neighbours().iter() {
			let Some(n) = self.neighbour(coord, direction) else {
				continue;
			};
			if self.is_walkable_with_clearance(n, unit.attributes, unit.radius)
				&& self.is_height_walkable(coord, direction, &unit.capabilities)
			{
				walkable.push(n);
			}
		}
		walkable
	}
	/// Move dynamic obstacle `id` from `old_bounds` to `new_bounds`. Cells
	/// inside the new coverage gain the obstacle, cells only in the old
	/// coverage lose it. Returns the bounds of the cells whose exclusion
	/// mask changed
	pub fn update_dynamic_obstacle(
		&mut self,
		id: ObstacleId,
		exceptions: AttributeMask,
		old_bounds: Option<MatrixBounds>,
		new_bounds: Option<MatrixBounds>,
	) -> Option<MatrixBounds> {
		let combined = MatrixBounds::combine_optional(old_bounds, new_bounds)?;
		let combined = combined.intersection(&self.bounds())?;
		let mut changed: Option<MatrixBounds> = None;
		for coord in combined.iter() {
			let in_new = new_bounds.is_some_and(|b| b.contains(coord));
			let in_old = old_bounds.is_some_and(|b| b.contains(coord));
			let cell = self.cell_mut(coord.x, coord.z);
			let did_change = if in_new {
				cell.add_dynamic_obstacle(id, exceptions)
			} else if in_old {
				cell.remove_dynamic_obstacle(id)
			} else {
				false
			};
			if did_change {
				changed = MatrixBounds::combine_optional(changed, Some(MatrixBounds::single(coord)));
			}
		}
		if let Some(b) = changed {
			trace!("Obstacle {:?} changed cells {:?}", id, b);
		}
		changed
	}
}

impl Index<MatrixCoord> for CellMatrix {
	type Output = Cell;
	fn index(&self, coord: MatrixCoord) -> &Self::Output {
		self.cell(coord.x, coord.z)
	}
}

impl IndexMut<MatrixCoord> for CellMatrix {
	fn index_mut(&mut self, coord: MatrixCoord) -> &mut Self::Output {
		self.cell_mut(coord.x, coord.z)
	}
}

// #[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;
	/// 10x10 flat matrix of 2 unit cells centred on the world origin
	fn matrix() -> CellMatrix {
		let config = MatrixConfig::new(Vec3::ZERO, 10, 10, 2.0).with_height_mode(HeightMode::Flat);
		CellMatrix::create(config, &FlatGroundProbe::new(0.0))
	}
	#[test]
	fn cell_centres() {
		let m = matrix();
		assert_eq!(Vec3::new(-10.0, 0.0, -10.0), m.start());
		assert_eq!(Vec3::new(-9.0, 0.0, -9.0), m.cell(0, 0).position());
		assert_eq!(Vec3::new(9.0, 0.0, 7.0), m.cell(9, 8).position());
	}
	#[test]
	#[should_panic]
	fn index_out_of_range() {
		let m = matrix();
		m.cell(10, 0);
	}
	#[test]
	fn get_cell_inside() {
		let m = matrix();
		let result = m.get_cell(Vec3::new(0.5, 3.0, -0.5), false).map(|c| c.coord());
		assert_eq!(Some(MatrixCoord::new(5, 4)), result);
	}
	#[test]
	fn get_cell_outside() {
		let m = matrix();
		assert!(m.get_cell(Vec3::new(10.5, 0.0, 0.0), false).is_none());
		let result = m.get_cell(Vec3::new(10.5, 0.0, -30.0), true).map(|c| c.coord());
		assert_eq!(Some(MatrixCoord::new(9, 0)), result);
	}
	#[test]
	fn bounds_zero_overlap_excludes_touching_edge() {
		let m = matrix();
		// rectangle spans x in [-4, 0], the right edge touches cell 5
		let result = m.get_matrix_bounds(Vec3::new(-2.0, 0.0, -2.0), 2.0, 2.0, 0.0, false);
		assert_eq!(Some(MatrixBounds::new(3, 4, 3, 4)), result);
	}
	#[test]
	fn bounds_positive_overlap_includes_exact() {
		let m = matrix();
		// rectangle spans x in [-3, 1], cell 3 and cell 5 overlap by exactly 1
		let result = m.get_matrix_bounds(Vec3::new(-1.0, 0.0, -1.0), 2.0, 2.0, 1.0, false);
		assert_eq!(Some(MatrixBounds::new(3, 5, 3, 5)), result);
		// half a unit more and the edge cells fall short
		let result = m.get_matrix_bounds(Vec3::new(-1.0, 0.0, -1.0), 2.0, 2.0, 1.5, false);
		assert_eq!(Some(MatrixBounds::new(4, 4, 4, 4)), result);
	}
	#[test]
	fn bounds_clip_and_clamp() {
		let m = matrix();
		let result = m.get_matrix_bounds(Vec3::new(9.0, 0.0, 9.0), 4.0, 4.0, 0.0, false);
		assert_eq!(Some(MatrixBounds::new(7, 9, 7, 9)), result);
		let result = m.get_matrix_bounds(Vec3::new(40.0, 0.0, 40.0), 1.0, 1.0, 0.0, false);
		assert_eq!(None, result);
		let result = m.get_matrix_bounds(Vec3::new(40.0, 0.0, 40.0), 1.0, 1.0, 0.0, true);
		assert_eq!(Some(MatrixBounds::new(9, 9, 9, 9)), result);
	}
	#[test]
	fn concentric_ring_clamps() {
		let m = matrix();
		let result = m.get_concentric_neighbours(MatrixCoord::new(0, 0), 1);
		let actual = vec![MatrixCoord::new(1, 0), MatrixCoord::new(0, 1), MatrixCoord::new(1, 1)];
		assert_eq!(actual, result);
		assert_eq!(16, m.get_concentric_neighbours(MatrixCoord::new(5, 5), 2).len());
		assert_eq!(vec![MatrixCoord::new(5, 5)], m.get_concentric_neighbours(MatrixCoord::new(5, 5), 0));
	}
	#[test]
	fn range_clips_without_wrapping() {
		let m = matrix();
		let result: Vec<MatrixCoord> = m
			.get_range(&MatrixBounds::new(8, 12, 0, 1))
			.iter()
			.map(|c| c.coord())
			.collect();
		let actual = vec![
			MatrixCoord::new(8, 0),
			MatrixCoord::new(9, 0),
			MatrixCoord::new(8, 1),
			MatrixCoord::new(9, 1),
		];
		assert_eq!(actual, result);
		assert!(m.get_range(&MatrixBounds::new(20, 22, 0, 1)).is_empty());
	}
	#[test]
	fn cells_in_radius() {
		let m = matrix();
		// centres at (+-1, +-1) are all within 1.5
		let result = m.get_cells_in_radius(Vec3::ZERO, 1.5);
		assert_eq!(4, result.len());
	}
	#[test]
	fn walkability_respects_obstacles_and_clearance() {
		let mut m = matrix();
		let c = MatrixCoord::new(5, 5);
		let walker = AttributeMask::attribute(0);
		assert!(m.is_walkable(c, walker));
		let changed = m.update_dynamic_obstacle(
			ObstacleId(1),
			AttributeMask::NONE,
			None,
			Some(MatrixBounds::single(c)),
		);
		assert_eq!(Some(MatrixBounds::single(c)), changed);
		assert!(!m.is_walkable(c, walker));
		// perimeter clearance is half a cell
		assert!(m.is_walkable_with_clearance(MatrixCoord::new(0, 3), walker, 1.0));
		assert!(!m.is_walkable_with_clearance(MatrixCoord::new(0, 3), walker, 1.5));
	}
	#[test]
	fn moving_obstacle_only_touches_difference() {
		let mut m = matrix();
		let id = ObstacleId(4);
		let old = MatrixBounds::new(1, 3, 1, 3);
		let new = MatrixBounds::new(2, 4, 1, 3);
		m.update_dynamic_obstacle(id, AttributeMask::NONE, None, Some(old));
		let changed = m.update_dynamic_obstacle(id, AttributeMask::NONE, Some(old), Some(new));
		assert_eq!(Some(MatrixBounds::new(1, 4, 1, 3)), changed);
		assert!(!m.cell(1, 2).has_dynamic_obstacle(id));
		assert!(m.cell(4, 2).has_dynamic_obstacle(id));
		assert!(m.cell(2, 2).has_dynamic_obstacle(id));
	}
	#[test]
	fn walkable_neighbours_of_corner() {
		let m = matrix();
		let unit = UnitProfile::default();
		let result = m.get_walkable_neighbours(MatrixCoord::new(0, 0), &unit);
		assert_eq!(3, result.len());
	}
	#[test]
	fn lattice_round_trip() {
		let config = MatrixConfig::new(Vec3::ZERO, 4, 4, 1.0).with_height_granularity(0.5);
		let m = CellMatrix::create(config, &FlatGroundProbe::new(0.0));
		let p = m.lattice_position(3, 5);
		assert_eq!((3, 5), m.lattice_coord(p));
		let lattice = m.lattice_bounds(&MatrixBounds::new(1, 1, 2, 3));
		assert_eq!(MatrixBounds::new(2, 4, 4, 8), lattice);
		let cells = m.cell_bounds_of_lattice(&lattice);
		assert_eq!(MatrixBounds::new(0, 2, 1, 3), cells);
	}
}
