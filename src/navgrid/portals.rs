//! Virtual neighbours link cells that are not adjacent on a grid, possibly
//! on different grids, so that a path search can step through a portal as
//! if it were an ordinary neighbour. Links live in a side table rather than
//! on the cells themselves and are always bidirectional
//!

use std::collections::HashMap;

use bevy::prelude::*;

use crate::prelude::*;

/// Identifies a cell across every grid of a registry
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Reflect)]
pub struct CellRef {
	/// Grid the cell belongs to
	pub grid: GridId,
	/// Column and row within that grid
	pub coord: MatrixCoord,
}

impl CellRef {
	/// Create a new instance of [CellRef]
	pub fn new(grid: GridId, coord: MatrixCoord) -> Self {
		CellRef { grid, coord }
	}
}

/// Side table of portal links
#[derive(Debug, Default, Clone, PartialEq)]
pub struct VirtualNeighbours {
	/// Linked cells of each cell with at least one link
	links: HashMap<CellRef, Vec<CellRef>>,
}

impl VirtualNeighbours {
	/// Link `a` and `b` in both directions. Returns `false` if they are the
	/// same cell or already linked
	pub fn register(&mut self, a: CellRef, b: CellRef) -> bool {
		if a == b || self.neighbours(a).contains(&b) {
			return false;
		}
		self.links.entry(a).or_default().push(b);
		self.links.entry(b).or_default().push(a);
		true
	}
	/// Remove the link between `a` and `b`. Returns `false` if there was none
	pub fn unregister(&mut self, a: CellRef, b: CellRef) -> bool {
		let removed = self.unlink(a, b);
		self.unlink(b, a);
		removed
	}
	/// Remove `to` from the links of `from`
	fn unlink(&mut self, from: CellRef, to: CellRef) -> bool {
		let Some(list) = self.links.get_mut(&from) else {
			return false;
		};
		let before = list.len();
		list.retain(|c| *c != to);
		let removed = list.len() != before;
		if list.is_empty() {
			self.links.remove(&from);
		}
		removed
	}
	/// Cells linked to `cell`
	pub fn neighbours(&self, cell: CellRef) -> &[CellRef] {
		self.links.get(&cell).map(|v| v.as_slice()).unwrap_or(&[])
	}
	/// Drop every link touching `grid`. Returns the number of links removed
	pub fn remove_grid(&mut self, grid: GridId) -> usize {
		let doomed: Vec<(CellRef, CellRef)> = self
			.links
			.iter()
			.filter(|(from, _)| from.grid == grid)
			.flat_map(|(from, to)| to.iter().map(|t| (*from, *t)))
			.collect();
		let mut removed = 0;
		for (from, to) in doomed {
			if self.unregister(from, to) {
				removed += 1;
			}
		}
		removed
	}
	/// Number of bidirectional links
	pub fn link_count(&self) -> usize {
		self.links.values().map(|v| v.len()).sum::<usize>() / 2
	}
}

// #[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;
	/// Shorthand for a cell reference
	fn cell(grid: u32, x: usize, z: usize) -> CellRef {
		CellRef::new(GridId(grid), MatrixCoord::new(x, z))
	}
	#[test]
	fn links_are_bidirectional() {
		let mut portals = VirtualNeighbours::default();
		assert!(portals.register(cell(0, 1, 1), cell(1, 4, 4)));
		assert_eq!(&[cell(1, 4, 4)], portals.neighbours(cell(0, 1, 1)));
		assert_eq!(&[cell(0, 1, 1)], portals.neighbours(cell(1, 4, 4)));
		assert_eq!(1, portals.link_count());
	}
	#[test]
	fn duplicate_and_self_links_rejected() {
		let mut portals = VirtualNeighbours::default();
		assert!(!portals.register(cell(0, 1, 1), cell(0, 1, 1)));
		assert!(portals.register(cell(0, 1, 1), cell(0, 5, 5)));
		assert!(!portals.register(cell(0, 5, 5), cell(0, 1, 1)));
		assert_eq!(1, portals.link_count());
	}
	#[test]
	fn unregister_both_sides() {
		let mut portals = VirtualNeighbours::default();
		portals.register(cell(0, 1, 1), cell(0, 5, 5));
		assert!(portals.unregister(cell(0, 5, 5), cell(0, 1, 1)));
		assert!(portals.neighbours(cell(0, 1, 1)).is_empty());
		assert!(!portals.unregister(cell(0, 5, 5), cell(0, 1, 1)));
	}
	#[test]
	fn removing_grid_drops_its_links() {
		let mut portals = VirtualNeighbours::default();
		portals.register(cell(0, 1, 1), cell(1, 0, 0));
		portals.register(cell(0, 2, 2), cell(2, 0, 0));
		portals.register(cell(2, 3, 3), cell(3, 0, 0));
		assert_eq!(2, portals.remove_grid(GridId(0)));
		assert_eq!(1, portals.link_count());
		assert!(portals.neighbours(cell(1, 0, 0)).is_empty());
	}
}
