//! Quad tree backed [HeightLookup]. The root covers a power-of-two square
//! enclosing the lattice, each branch splits its square into four quadrants
//! down to `max_depth`. Leaves hold a short list of samples, once a leaf is
//! completely covered by a single height it is replaced by a uniform node so
//! large plateaus cost a single node.
//!
//! ```text
//!  ___________ ___________
//! |     |     |           |
//! |__2__|__3__|     3     |
//! |     |     |           |
//! |__0__|__1__|___________|
//! |           |           |
//! |     0     |     1     |
//! |           |           |
//! |___________|___________|
//! ```
//!

use crate::prelude::*;

/// A square area of the lattice covered by a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Region {
	/// Smallest lattice column
	x: usize,
	/// Smallest lattice row
	z: usize,
	/// Side length
	size: usize,
}

impl Region {
	/// Index of the quadrant containing `(x, z)`
	fn child_index(&self, x: usize, z: usize) -> usize {
		let half = self.size / 2;
		let east = (x >= self.x + half) as usize;
		let north = (z >= self.z + half) as usize;
		east | (north << 1)
	}
	/// Region of quadrant `index`
	fn child(&self, index: usize) -> Region {
		let half = self.size / 2;
		Region {
			x: self.x + (index & 1) * half,
			z: self.z + (index >> 1) * half,
			size: half,
		}
	}
	/// The part of the region inside a `columns x rows` lattice
	fn clipped(&self, columns: usize, rows: usize) -> Option<MatrixBounds> {
		if self.x >= columns || self.z >= rows {
			return None;
		}
		Some(MatrixBounds::new(
			self.x,
			(self.x + self.size).min(columns) - 1,
			self.z,
			(self.z + self.size).min(rows) - 1,
		))
	}
}

/// A node of the tree
#[derive(Debug, Clone, PartialEq)]
enum QuadNode {
	/// Explicit samples
	Leaf(Vec<HeightEntry>),
	/// Every lattice slot of the region has this height
	Uniform(f32),
	/// Four quadrants, indexed as `east | north << 1`
	Branch(Box<[QuadNode; 4]>),
}

impl QuadNode {
	/// A branch of four empty leaves
	fn empty_branch() -> QuadNode {
		QuadNode::Branch(Box::new([
			QuadNode::Leaf(Vec::new()),
			QuadNode::Leaf(Vec::new()),
			QuadNode::Leaf(Vec::new()),
			QuadNode::Leaf(Vec::new()),
		]))
	}
	/// A branch of four uniform quadrants
	fn uniform_branch(height: f32) -> QuadNode {
		QuadNode::Branch(Box::new([
			QuadNode::Uniform(height),
			QuadNode::Uniform(height),
			QuadNode::Uniform(height),
			QuadNode::Uniform(height),
		]))
	}
}

/// Depth bounded quad tree of lattice samples
#[derive(Debug, Clone, PartialEq)]
pub struct QuadTreeHeightLookup {
	/// Root of the tree
	root: QuadNode,
	/// Side length of the root square, a power of two
	root_size: usize,
	/// Lattice samples along `x`
	lattice_columns: usize,
	/// Lattice samples along `z`
	lattice_rows: usize,
	/// Deepest level a leaf may sit at
	max_depth: u8,
	/// Samples a leaf holds before splitting
	leaf_capacity: usize,
	/// Area replaced when this lookup is merged as a scratch lookup
	update_bounds: Option<MatrixBounds>,
}

impl QuadTreeHeightLookup {
	/// Create a new instance of [QuadTreeHeightLookup] for a lattice of the
	/// given size
	pub fn new(
		lattice_columns: usize,
		lattice_rows: usize,
		max_depth: u8,
		leaf_capacity: usize,
	) -> Self {
		let root_size = lattice_columns.max(lattice_rows).max(1).next_power_of_two();
		QuadTreeHeightLookup {
			root: QuadNode::Leaf(Vec::new()),
			root_size,
			lattice_columns,
			lattice_rows,
			max_depth,
			leaf_capacity: leaf_capacity.max(1),
			update_bounds: None,
		}
	}
	/// Region covered by the root
	fn root_region(&self) -> Region {
		Region {
			x: 0,
			z: 0,
			size: self.root_size,
		}
	}
	/// Side length of a node at `max_depth`, updates are aligned to it
	pub fn leaf_alignment(&self) -> usize {
		(self.root_size >> self.max_depth.min(63)).max(1)
	}
	/// Number of nodes in the tree, used to observe compaction
	pub fn node_count(&self) -> usize {
		/// Count recursively
		fn count(node: &QuadNode) -> usize {
			match node {
				QuadNode::Branch(children) => 1 + children.iter().map(count).sum::<usize>(),
				_ => 1,
			}
		}
		count(&self.root)
	}
	/// Recursively insert `entry`, splitting leaves that exceed the capacity
	fn insert(&self, node: &mut QuadNode, region: Region, depth: u8, entry: HeightEntry) -> bool {
		match node {
			QuadNode::Branch(children) => {
				let i = region.child_index(entry.x, entry.z);
				self.insert(&mut children[i], region.child(i), depth + 1, entry)
			}
			QuadNode::Uniform(_) => false,
			QuadNode::Leaf(items) => {
				if items.iter().any(|e| e.x == entry.x && e.z == entry.z) {
					return false;
				}
				items.push(entry);
				if items.len() > self.leaf_capacity && depth < self.max_depth && region.size > 1 {
					let items = std::mem::take(items);
					let mut branch = QuadNode::empty_branch();
					for item in items {
						self.insert(&mut branch, region, depth, item);
					}
					*node = branch;
				}
				true
			}
		}
	}
	/// Recursively collapse fully covered single height regions
	fn compact(&self, node: &mut QuadNode, region: Region) {
		match node {
			QuadNode::Uniform(_) => {}
			QuadNode::Leaf(items) => {
				items.shrink_to_fit();
				let Some(area) = region.clipped(self.lattice_columns, self.lattice_rows) else {
					return;
				};
				if let Some(first) = items.first() {
					let height = first.height;
					if items.len() == area.count() && items.iter().all(|e| e.height == height) {
						*node = QuadNode::Uniform(height);
					}
				}
			}
			QuadNode::Branch(children) => {
				for (i, child) in children.iter_mut().enumerate() {
					self.compact(child, region.child(i));
				}
				// quadrants entirely outside of the lattice never hold data
				let mut uniform: Option<f32> = None;
				let mut all_uniform = true;
				let mut leaf_items = 0;
				let mut all_leaves = true;
				for (i, child) in children.iter().enumerate() {
					let inside = region
						.child(i)
						.clipped(self.lattice_columns, self.lattice_rows)
						.is_some();
					match child {
						QuadNode::Uniform(h) => {
							all_leaves = false;
							match uniform {
								Some(u) if u != *h => all_uniform = false,
								_ => uniform = Some(*h),
							}
						}
						QuadNode::Leaf(items) => {
							leaf_items += items.len();
							if inside {
								all_uniform = false;
							}
						}
						QuadNode::Branch(_) => {
							all_uniform = false;
							all_leaves = false;
						}
					}
				}
				if all_uniform {
					if let Some(height) = uniform {
						*node = QuadNode::Uniform(height);
						return;
					}
				}
				if all_leaves && leaf_items <= self.leaf_capacity {
					let mut merged = Vec::with_capacity(leaf_items);
					for child in children.iter_mut() {
						if let QuadNode::Leaf(items) = child {
							merged.append(items);
						}
					}
					*node = QuadNode::Leaf(merged);
				}
			}
		}
	}
	/// Recursively forget every slot inside `bounds`
	fn remove_region(&self, node: &mut QuadNode, region: Region, depth: u8, bounds: &MatrixBounds) {
		let Some(area) = region.clipped(self.lattice_columns, self.lattice_rows) else {
			return;
		};
		if !area.intersects(bounds) {
			return;
		}
		match node {
			QuadNode::Leaf(items) => {
				items.retain(|e| !bounds.contains(MatrixCoord::new(e.x, e.z)));
			}
			QuadNode::Branch(children) => {
				for (i, child) in children.iter_mut().enumerate() {
					self.remove_region(child, region.child(i), depth + 1, bounds);
				}
			}
			QuadNode::Uniform(height) => {
				let height = *height;
				if bounds.intersection(&area) == Some(area) {
					*node = QuadNode::Leaf(Vec::new());
				} else if depth < self.max_depth && region.size > 1 {
					*node = QuadNode::uniform_branch(height);
					self.remove_region(node, region, depth, bounds);
				} else {
					let items = area
						.iter()
						.filter(|c| !bounds.contains(*c))
						.map(|c| HeightEntry::new(c.x, c.z, height))
						.collect();
					*node = QuadNode::Leaf(items);
				}
			}
		}
	}
	/// Recursively gather every recorded slot
	fn collect(&self, node: &QuadNode, region: Region, out: &mut Vec<HeightEntry>) {
		match node {
			QuadNode::Leaf(items) => out.extend(items.iter().copied()),
			QuadNode::Uniform(height) => {
				if let Some(area) = region.clipped(self.lattice_columns, self.lattice_rows) {
					out.extend(area.iter().map(|c| HeightEntry::new(c.x, c.z, *height)));
				}
			}
			QuadNode::Branch(children) => {
				for (i, child) in children.iter().enumerate() {
					self.collect(child, region.child(i), out);
				}
			}
		}
	}
}

impl HeightLookup for QuadTreeHeightLookup {
	fn add(&mut self, x: usize, z: usize, height: f32) -> bool {
		if x >= self.lattice_columns || z >= self.lattice_rows {
			return false;
		}
		let mut root = std::mem::replace(&mut self.root, QuadNode::Leaf(Vec::new()));
		let added = self.insert(&mut root, self.root_region(), 0, HeightEntry::new(x, z, height));
		self.root = root;
		added
	}
	fn try_get_height(&self, x: usize, z: usize) -> Option<f32> {
		if x >= self.lattice_columns || z >= self.lattice_rows {
			return None;
		}
		let mut node = &self.root;
		let mut region = self.root_region();
		loop {
			match node {
				QuadNode::Uniform(height) => return Some(*height),
				QuadNode::Leaf(items) => {
					return items
						.iter()
						.find(|e| e.x == x && e.z == z)
						.map(|e| e.height)
				}
				QuadNode::Branch(children) => {
					let i = region.child_index(x, z);
					region = region.child(i);
					node = &children[i];
				}
			}
		}
	}
	fn cleanup(&mut self) {
		let mut root = std::mem::replace(&mut self.root, QuadNode::Leaf(Vec::new()));
		self.compact(&mut root, self.root_region());
		self.root = root;
	}
	fn prepare_for_update(&self, suggested: MatrixBounds) -> (Self, Option<MatrixBounds>) {
		let alignment = self.leaf_alignment();
		let lattice = MatrixBounds::full(self.lattice_columns, self.lattice_rows);
		let actual = suggested.intersection(&lattice).map(|clamped| {
			MatrixBounds::new(
				clamped.min_column / alignment * alignment,
				((clamped.max_column / alignment + 1) * alignment - 1).min(self.lattice_columns - 1),
				clamped.min_row / alignment * alignment,
				((clamped.max_row / alignment + 1) * alignment - 1).min(self.lattice_rows - 1),
			)
		});
		let mut scratch = QuadTreeHeightLookup::new(
			self.lattice_columns,
			self.lattice_rows,
			self.max_depth,
			self.leaf_capacity,
		);
		scratch.update_bounds = actual;
		(scratch, actual)
	}
	fn finish_update(&mut self, scratch: Self) {
		let mut root = std::mem::replace(&mut self.root, QuadNode::Leaf(Vec::new()));
		let region = self.root_region();
		if let Some(bounds) = scratch.update_bounds {
			self.remove_region(&mut root, region, 0, &bounds);
		}
		for entry in scratch.entries() {
			let inside = scratch
				.update_bounds
				.is_some_and(|b| b.contains(MatrixCoord::new(entry.x, entry.z)));
			if !inside {
				// last write wins for slots outside the prepared region
				let slot = MatrixBounds::single(MatrixCoord::new(entry.x, entry.z));
				self.remove_region(&mut root, region, 0, &slot);
			}
			self.insert(&mut root, region, 0, entry);
		}
		self.compact(&mut root, region);
		self.root = root;
	}
	fn entry_count(&self) -> usize {
		self.entries().len()
	}
	fn entries(&self) -> Vec<HeightEntry> {
		let mut out = Vec::new();
		self.collect(&self.root, self.root_region(), &mut out);
		out.sort_by_key(|e| (e.z, e.x));
		out
	}
}
