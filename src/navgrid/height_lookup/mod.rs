//! The height lattice is a grid of ground elevation samples, generally finer
//! than the cells of the matrix. Most samples of a typical scene sit at the
//! same height as the matrix origin so only samples that differ are
//! recorded, anything not recorded resolves to the origin height.
//!
//! Two storage strategies are offered:
//!
//! * [DenseHeightLookup] - hash map, constant time access, memory grows with
//!   every recorded sample
//! * [QuadTreeHeightLookup] - depth bounded quadrant subdivision, regions of
//!   a single height collapse into one node, slower access
//!
//! Updating a region is a two phase affair. [HeightLookup::prepare_for_update]
//! hands out an empty scratch lookup which gets filled while the live lookup
//! keeps serving reads, [HeightLookup::finish_update] then merges the scratch
//! region into the live lookup in one go so that a reader never observes a
//! half updated region
//!

pub mod dense;
pub mod quad_tree;

use bevy::prelude::*;

use crate::prelude::*;

/// A recorded lattice sample
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightEntry {
	/// Lattice column
	pub x: usize,
	/// Lattice row
	pub z: usize,
	/// Elevation
	pub height: f32,
}

impl HeightEntry {
	/// Create a new instance of [HeightEntry]
	pub fn new(x: usize, z: usize, height: f32) -> Self {
		HeightEntry { x, z, height }
	}
}

/// Defines the required access to a height lattice
pub trait HeightLookup {
	/// Record the height of a lattice slot. Returns `false` and leaves the
	/// lookup unchanged if the slot already holds a height or lies outside
	/// the lattice
	fn add(&mut self, x: usize, z: usize, height: f32) -> bool;
	/// Height recorded at a slot, [None] if nothing was recorded
	fn try_get_height(&self, x: usize, z: usize) -> Option<f32>;
	/// Finalise the storage after bulk loading
	fn cleanup(&mut self);
	/// Produce an empty, independently writable lookup for refreshing the
	/// `suggested` lattice bounds. The second element is the area the
	/// scratch lookup will replace on [HeightLookup::finish_update], it may be
	/// larger than suggested to suit the storage layout. [None] when
	/// `suggested` misses the lattice, finishing then replaces nothing
	fn prepare_for_update(&self, suggested: MatrixBounds) -> (Self, Option<MatrixBounds>)
	where
		Self: Sized;
	/// Replace the prepared region with the contents of `scratch`. Slots
	/// written by the scratch win over the live values
	fn finish_update(&mut self, scratch: Self)
	where
		Self: Sized;
	/// Number of recorded slots
	fn entry_count(&self) -> usize;
	/// Every recorded slot
	fn entries(&self) -> Vec<HeightEntry>;
}

/// The strategy chosen for a matrix, dispatches to the underlying lookup
#[derive(Debug, Clone, PartialEq)]
pub enum HeightLookupKind {
	/// Hash map strategy
	Dense(DenseHeightLookup),
	/// Quad tree strategy
	QuadTree(QuadTreeHeightLookup),
}

impl HeightLookupKind {
	/// Create the lookup described by `config`
	pub fn new(config: &MatrixConfig) -> Self {
		let columns = config.lattice_columns();
		let rows = config.lattice_rows();
		match config.lookup_strategy {
			HeightLookupStrategy::Dense => {
				HeightLookupKind::Dense(DenseHeightLookup::new(columns, rows))
			}
			HeightLookupStrategy::QuadTree {
				max_depth,
				leaf_capacity,
			} => HeightLookupKind::QuadTree(QuadTreeHeightLookup::new(
				columns,
				rows,
				max_depth,
				leaf_capacity,
			)),
		}
	}
}

impl HeightLookup for HeightLookupKind {
	fn add(&mut self, x: usize, z: usize, height: f32) -> bool {
		match self {
			HeightLookupKind::Dense(l) => l.add(x, z, height),
			HeightLookupKind::QuadTree(l) => l.add(x, z, height),
		}
	}
	fn try_get_height(&self, x: usize, z: usize) -> Option<f32> {
		match self {
			HeightLookupKind::Dense(l) => l.try_get_height(x, z),
			HeightLookupKind::QuadTree(l) => l.try_get_height(x, z),
		}
	}
	fn cleanup(&mut self) {
		match self {
			HeightLookupKind::Dense(l) => l.cleanup(),
			HeightLookupKind::QuadTree(l) => l.cleanup(),
		}
	}
	fn prepare_for_update(&self, suggested: MatrixBounds) -> (Self, Option<MatrixBounds>) {
		match self {
			HeightLookupKind::Dense(l) => {
				let (scratch, bounds) = l.prepare_for_update(suggested);
				(HeightLookupKind::Dense(scratch), bounds)
			}
			HeightLookupKind::QuadTree(l) => {
				let (scratch, bounds) = l.prepare_for_update(suggested);
				(HeightLookupKind::QuadTree(scratch), bounds)
			}
		}
	}
	fn finish_update(&mut self, scratch: Self) {
		match (self, scratch) {
			(HeightLookupKind::Dense(l), HeightLookupKind::Dense(s)) => l.finish_update(s),
			(HeightLookupKind::QuadTree(l), HeightLookupKind::QuadTree(s)) => l.finish_update(s),
			_ => error!("Cannot merge a scratch height lookup of a different strategy"),
		}
	}
	fn entry_count(&self) -> usize {
		match self {
			HeightLookupKind::Dense(l) => l.entry_count(),
			HeightLookupKind::QuadTree(l) => l.entry_count(),
		}
	}
	fn entries(&self) -> Vec<HeightEntry> {
		match self {
			HeightLookupKind::Dense(l) => l.entries(),
			HeightLookupKind::QuadTree(l) => l.entries(),
		}
	}
}
