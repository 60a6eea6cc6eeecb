//! Rectangles in matrix index space and in world space
//!

use bevy::prelude::*;

/// ID of a cell within a matrix, `x` is the column and `z` the row
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash, Reflect)]
pub struct MatrixCoord {
	/// Column
	pub x: usize,
	/// Row
	pub z: usize,
}

impl MatrixCoord {
	/// Create a new instance of [MatrixCoord]
	pub fn new(x: usize, z: usize) -> Self {
		MatrixCoord { x, z }
	}
	/// Step `(dx, dz)` away from this coord, [None] if that would leave the
	/// `columns x rows` matrix
	pub fn offset(&self, dx: i32, dz: i32, columns: usize, rows: usize) -> Option<MatrixCoord> {
		let x = self.x as i64 + dx as i64;
		let z = self.z as i64 + dz as i64;
		if x < 0 || z < 0 || x >= columns as i64 || z >= rows as i64 {
			None
		} else {
			Some(MatrixCoord::new(x as usize, z as usize))
		}
	}
	/// Chebyshev distance in cells
	pub fn cell_distance(&self, other: MatrixCoord) -> usize {
		self.x.abs_diff(other.x).max(self.z.abs_diff(other.z))
	}
}

/// Inclusive rectangle of indices. Used for both cells of a matrix and
/// samples of a height lattice
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Reflect)]
pub struct MatrixBounds {
	/// Smallest column
	pub min_column: usize,
	/// Largest column
	pub max_column: usize,
	/// Smallest row
	pub min_row: usize,
	/// Largest row
	pub max_row: usize,
}

impl MatrixBounds {
	/// Create a new instance of [MatrixBounds]. Panics if the minimums
	/// exceed the maximums
	pub fn new(min_column: usize, max_column: usize, min_row: usize, max_row: usize) -> Self {
		if min_column > max_column || min_row > max_row {
			panic!(
				"Invalid MatrixBounds, columns {}..={}, rows {}..={}",
				min_column, max_column, min_row, max_row
			);
		}
		MatrixBounds {
			min_column,
			max_column,
			min_row,
			max_row,
		}
	}
	/// Bounds spanning every index of a `columns x rows` area
	pub fn full(columns: usize, rows: usize) -> Self {
		MatrixBounds::new(0, columns - 1, 0, rows - 1)
	}
	/// Bounds of a single coord
	pub fn single(coord: MatrixCoord) -> Self {
		MatrixBounds::new(coord.x, coord.x, coord.z, coord.z)
	}
	/// Number of columns spanned
	pub fn columns(&self) -> usize {
		self.max_column - self.min_column + 1
	}
	/// Number of rows spanned
	pub fn rows(&self) -> usize {
		self.max_row - self.min_row + 1
	}
	/// Number of indices spanned
	pub fn count(&self) -> usize {
		self.columns() * self.rows()
	}
	/// Whether `coord` lies inside the bounds
	pub fn contains(&self, coord: MatrixCoord) -> bool {
		coord.x >= self.min_column
			&& coord.x <= self.max_column
			&& coord.z >= self.min_row
			&& coord.z <= self.max_row
	}
	/// Whether the two bounds share any index
	pub fn intersects(&self, other: &MatrixBounds) -> bool {
		self.min_column <= other.max_column
			&& other.min_column <= self.max_column
			&& self.min_row <= other.max_row
			&& other.min_row <= self.max_row
	}
	/// The overlapping area of two bounds
	pub fn intersection(&self, other: &MatrixBounds) -> Option<MatrixBounds> {
		if !self.intersects(other) {
			return None;
		}
		Some(MatrixBounds::new(
			self.min_column.max(other.min_column),
			self.max_column.min(other.max_column),
			self.min_row.max(other.min_row),
			self.max_row.min(other.max_row),
		))
	}
	/// The smallest bounds covering both
	pub fn combine(&self, other: &MatrixBounds) -> MatrixBounds {
		MatrixBounds::new(
			self.min_column.min(other.min_column),
			self.max_column.max(other.max_column),
			self.min_row.min(other.min_row),
			self.max_row.max(other.max_row),
		)
	}
	/// Combine two optional bounds, either side may be absent
	pub fn combine_optional(a: Option<MatrixBounds>, b: Option<MatrixBounds>) -> Option<MatrixBounds> {
		match (a, b) {
			(Some(a), Some(b)) => Some(a.combine(&b)),
			(Some(a), None) => Some(a),
			(None, Some(b)) => Some(b),
			(None, None) => None,
		}
	}
	/// Grow the bounds by `amount` in every direction without leaving a
	/// `columns x rows` area
	pub fn expand(&self, amount: usize, columns: usize, rows: usize) -> MatrixBounds {
		MatrixBounds::new(
			self.min_column.saturating_sub(amount),
			(self.max_column + amount).min(columns - 1),
			self.min_row.saturating_sub(amount),
			(self.max_row + amount).min(rows - 1),
		)
	}
	/// Iterate over each coord, columns in the outer loop and rows in the
	/// inner loop
	pub fn iter(&self) -> impl Iterator<Item = MatrixCoord> + '_ {
		(self.min_column..=self.max_column)
			.flat_map(move |x| (self.min_row..=self.max_row).map(move |z| MatrixCoord::new(x, z)))
	}
}

/// Axis aligned rectangle on the `x-z` plane in world space
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, PartialEq, Debug, Default, Reflect)]
pub struct WorldBounds {
	/// Centre of the rectangle, `y` is ignored
	pub center: Vec3,
	/// Half of the length along `x`
	pub radius_x: f32,
	/// Half of the length along `z`
	pub radius_z: f32,
}

impl WorldBounds {
	/// Create a new instance of [WorldBounds]
	pub fn new(center: Vec3, radius_x: f32, radius_z: f32) -> Self {
		WorldBounds {
			center,
			radius_x: radius_x.abs(),
			radius_z: radius_z.abs(),
		}
	}
	/// Smallest `x`
	pub fn min_x(&self) -> f32 {
		self.center.x - self.radius_x
	}
	/// Largest `x`
	pub fn max_x(&self) -> f32 {
		self.center.x + self.radius_x
	}
	/// Smallest `z`
	pub fn min_z(&self) -> f32 {
		self.center.z - self.radius_z
	}
	/// Largest `z`
	pub fn max_z(&self) -> f32 {
		self.center.z + self.radius_z
	}
	/// Whether `position` lies inside, edges included
	pub fn contains(&self, position: Vec3) -> bool {
		position.x >= self.min_x()
			&& position.x <= self.max_x()
			&& position.z >= self.min_z()
			&& position.z <= self.max_z()
	}
	/// Whether the two rectangles overlap
	pub fn intersects(&self, other: &WorldBounds) -> bool {
		self.min_x() <= other.max_x()
			&& other.min_x() <= self.max_x()
			&& self.min_z() <= other.max_z()
			&& other.min_z() <= self.max_z()
	}
}

// #[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn combine_disjoint() {
		let a = MatrixBounds::new(0, 2, 0, 2);
		let b = MatrixBounds::new(5, 6, 4, 7);
		let result = a.combine(&b);
		let actual = MatrixBounds::new(0, 6, 0, 7);
		assert_eq!(actual, result);
		assert!(!a.intersects(&b));
		assert_eq!(None, a.intersection(&b));
	}
	#[test]
	fn intersection_overlap() {
		let a = MatrixBounds::new(0, 4, 0, 4);
		let b = MatrixBounds::new(3, 6, 2, 7);
		let result = a.intersection(&b);
		let actual = Some(MatrixBounds::new(3, 4, 2, 4));
		assert_eq!(actual, result);
	}
	#[test]
	fn expand_clamps() {
		let a = MatrixBounds::new(0, 3, 2, 9);
		let result = a.expand(2, 5, 10);
		let actual = MatrixBounds::new(0, 4, 0, 9);
		assert_eq!(actual, result);
	}
	#[test]
	fn iterate_column_major() {
		let b = MatrixBounds::new(1, 2, 3, 4);
		let result: Vec<MatrixCoord> = b.iter().collect();
		let actual = vec![
			MatrixCoord::new(1, 3),
			MatrixCoord::new(1, 4),
			MatrixCoord::new(2, 3),
			MatrixCoord::new(2, 4),
		];
		assert_eq!(actual, result);
		assert_eq!(4, b.count());
	}
	#[test]
	#[should_panic]
	fn inverted_bounds() {
		MatrixBounds::new(4, 3, 0, 0);
	}
	#[test]
	fn coord_offset_leaves_matrix() {
		let c = MatrixCoord::new(0, 4);
		assert_eq!(None, c.offset(-1, 0, 5, 5));
		assert_eq!(None, c.offset(0, 1, 5, 5));
		assert_eq!(Some(MatrixCoord::new(1, 3)), c.offset(1, -1, 5, 5));
	}
	#[test]
	fn world_bounds_contains() {
		let b = WorldBounds::new(Vec3::new(1.0, 5.0, 1.0), 1.0, 2.0);
		assert!(b.contains(Vec3::new(2.0, 0.0, -1.0)));
		assert!(!b.contains(Vec3::new(2.1, 0.0, 0.0)));
	}
}
