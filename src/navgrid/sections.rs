//! Coarse rectangles of a grid recording the revision at which something
//! inside them last changed. Consumers holding derived data, such as a path
//! cache, remember the revision they computed against and compare it with
//! the sections they rely on.
//!
//! ```text
//!  ___________ ___________ _____
//! |           |           |     |
//! |   (0,1)   |   (1,1)   |(2,1)|
//! |___________|___________|_____|
//! |           |           |     |
//! |   (0,0)   |   (1,0)   |(2,0)|
//! |           |           |     |
//! |___________|___________|_____|
//! ```
//!
//! Sections along the positive edges are clipped to the matrix.
//!

use bevy::prelude::*;

use crate::prelude::*;

/// A rectangle of cells and the revision it last changed at
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub struct GridSection {
	/// Cells covered by the section
	bounds: MatrixBounds,
	/// Revision of the most recent change, `0` if never changed
	last_changed: u64,
}

impl GridSection {
	/// Create a new instance of [GridSection]
	pub fn new(bounds: MatrixBounds) -> Self {
		GridSection {
			bounds,
			last_changed: 0,
		}
	}
	/// Cells covered by the section
	pub fn bounds(&self) -> MatrixBounds {
		self.bounds
	}
	/// Revision of the most recent change
	pub fn last_changed(&self) -> u64 {
		self.last_changed
	}
}

/// Every section of a grid
#[derive(Debug, Clone, PartialEq)]
pub struct GridSections {
	/// Cells along one side of a section
	section_size: usize,
	/// Sections along `x`
	section_columns: usize,
	/// Sections in row-major order
	sections: Vec<GridSection>,
}

impl GridSections {
	/// Divide a `columns x rows` matrix into sections of `section_size`
	/// cells a side
	pub fn new(columns: usize, rows: usize, section_size: usize) -> Self {
		if section_size == 0 {
			panic!("Grid sections must span at least one cell");
		}
		let section_columns = columns.div_ceil(section_size);
		let section_rows = rows.div_ceil(section_size);
		let mut sections = Vec::with_capacity(section_columns * section_rows);
		for sz in 0..section_rows {
			for sx in 0..section_columns {
				let min_column = sx * section_size;
				let min_row = sz * section_size;
				sections.push(GridSection::new(MatrixBounds::new(
					min_column,
					(min_column + section_size).min(columns) - 1,
					min_row,
					(min_row + section_size).min(rows) - 1,
				)));
			}
		}
		GridSections {
			section_size,
			section_columns,
			sections,
		}
	}
	/// Sections sized for `config`
	pub fn from_config(config: &MatrixConfig) -> Self {
		GridSections::new(config.columns, config.rows, config.section_size)
	}
	pub fn get(&self) -> &[GridSection] {
		&self.sections
	}
	/// The section containing `coord`
	pub fn section_at(&self, coord: MatrixCoord) -> Option<&GridSection> {
		let sx = coord.x / self.section_size;
		let sz = coord.z / self.section_size;
		if sx >= self.section_columns {
			return None;
		}
		self.sections.get(sz * self.section_columns + sx)
	}
	/// Stamp every section overlapping `bounds` with `revision`. Returns the
	/// number of sections touched
	pub fn touch(&mut self, bounds: &MatrixBounds, revision: u64) -> usize {
		let mut touched = 0;
		for section in self.sections.iter_mut() {
			if section.bounds.intersects(bounds) {
				section.last_changed = section.last_changed.max(revision);
				touched += 1;
			}
		}
		touched
	}
	/// Whether any section overlapping `bounds` changed after `revision`
	pub fn changed_since(&self, bounds: &MatrixBounds, revision: u64) -> bool {
		self.sections
			.iter()
			.any(|s| s.bounds.intersects(bounds) && s.last_changed > revision)
	}
}
