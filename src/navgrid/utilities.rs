//! Useful structures and tools used across the matrix
//!

use bevy::prelude::*;

/// Tolerance used when converting world rectangles into matrix indices so
/// that a boundary sitting exactly on a cell edge resolves deterministically
pub const BOUNDS_EPSILON: f32 = 0.0001;

/// Default number of cells along one side of a [crate::prelude::GridSection]
pub const DEFAULT_SECTION_SIZE: usize = 10;

/// The 8 compass points of a cell. East is `+x` and North is `+z` in world
/// space.
///
/// The first four variants are the directions a cell *owns* when storing
/// per-direction height data, the last four are derived from the neighbour
/// that owns the reciprocal record
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Reflect)]
pub enum Direction {
	East,
	NorthEast,
	North,
	NorthWest,
	West,
	SouthWest,
	South,
	SouthEast,
}

impl Direction {
	/// Every direction, in bit order
	pub const ALL: [Direction; 8] = [
		Direction::East,
		Direction::NorthEast,
		Direction::North,
		Direction::NorthWest,
		Direction::West,
		Direction::SouthWest,
		Direction::South,
		Direction::SouthEast,
	];
	/// Directions whose height records are stored on the cell itself
	pub const OWNED: [Direction; 4] = [
		Direction::East,
		Direction::NorthEast,
		Direction::North,
		Direction::NorthWest,
	];
	/// Index of the direction within [Direction::ALL]
	pub fn index(&self) -> usize {
		*self as usize
	}
	/// The bit representing this direction within a [DirectionMask]
	pub fn bit(&self) -> u8 {
		1 << self.index()
	}
	/// `(dx, dz)` step taken to reach the neighbour in this direction
	pub fn offset(&self) -> (i32, i32) {
		match self {
			Direction::East => (1, 0),
			Direction::NorthEast => (1, 1),
			Direction::North => (0, 1),
			Direction::NorthWest => (-1, 1),
			Direction::West => (-1, 0),
			Direction::SouthWest => (-1, -1),
			Direction::South => (0, -1),
			Direction::SouthEast => (1, -1),
		}
	}
	/// Returns the opposite [Direction] of the current
	pub fn opposite(&self) -> Direction {
		Direction::ALL[(self.index() + 4) % 8]
	}
	/// Whether the direction is one of the 4 stored on the cell itself
	pub fn is_owned(&self) -> bool {
		self.index() < 4
	}
	/// Whether the direction moves along both axes
	pub fn is_diagonal(&self) -> bool {
		let (dx, dz) = self.offset();
		dx != 0 && dz != 0
	}
	/// For two cells next to each other find the [Direction] pointing from
	/// the `source` to the `target`. [None] if they are not adjacent
	pub fn from_offset(dx: i32, dz: i32) -> Option<Direction> {
		Direction::ALL
			.iter()
			.find(|d| d.offset() == (dx, dz))
			.copied()
	}
}

/// Bitset of [Direction]s, used both for the neighbours a cell has and for
/// the directions blocked by height
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Default, PartialEq, Eq, Hash, Clone, Copy, Reflect)]
pub struct DirectionMask(u8);

impl DirectionMask {
	/// No directions set
	pub const NONE: DirectionMask = DirectionMask(0);
	/// All 8 directions set
	pub const ALL: DirectionMask = DirectionMask(u8::MAX);
	/// Create a mask from raw bits
	pub fn from_bits(bits: u8) -> Self {
		DirectionMask(bits)
	}
	/// Raw bits of the mask
	pub fn bits(&self) -> u8 {
		self.0
	}
	/// Whether `direction` is present
	pub fn contains(&self, direction: Direction) -> bool {
		self.0 & direction.bit() != 0
	}
	/// Set or clear `direction`
	pub fn set(&mut self, direction: Direction, value: bool) {
		if value {
			self.0 |= direction.bit();
		} else {
			self.0 &= !direction.bit();
		}
	}
	/// Whether no direction is set
	pub fn is_empty(&self) -> bool {
		self.0 == 0
	}
	/// Iterate over the set directions
	pub fn iter(&self) -> impl Iterator<Item = Direction> + '_ {
		Direction::ALL.into_iter().filter(|d| self.contains(*d))
	}
}

/// Bitmask of unit attributes. Dynamic obstacles carry an *exception* mask
/// (units with any of these attributes ignore the obstacle) and cells carry
/// an aggregated *exclusion* mask
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Reflect)]
pub struct AttributeMask(u32);

impl AttributeMask {
	/// No attributes
	pub const NONE: AttributeMask = AttributeMask(0);
	/// Every attribute
	pub const ALL: AttributeMask = AttributeMask(u32::MAX);
	/// Create a mask from raw bits
	pub fn from_bits(bits: u32) -> Self {
		AttributeMask(bits)
	}
	/// Create a mask with the single attribute at `index` set
	pub fn attribute(index: u32) -> Self {
		if index >= 32 {
			panic!("Attribute index {} is out of range, masks hold 32 attributes", index);
		}
		AttributeMask(1 << index)
	}
	/// Raw bits of the mask
	pub fn bits(&self) -> u32 {
		self.0
	}
	/// Whether no attribute is set
	pub fn is_empty(&self) -> bool {
		self.0 == 0
	}
	/// Whether the two masks share any attribute
	pub fn intersects(&self, other: AttributeMask) -> bool {
		self.0 & other.0 != 0
	}
}

impl std::ops::BitOr for AttributeMask {
	type Output = AttributeMask;
	fn bitor(self, rhs: Self) -> Self::Output {
		AttributeMask(self.0 | rhs.0)
	}
}

impl std::ops::BitOrAssign for AttributeMask {
	fn bitor_assign(&mut self, rhs: Self) {
		self.0 |= rhs.0;
	}
}

impl std::ops::BitAnd for AttributeMask {
	type Output = AttributeMask;
	fn bitand(self, rhs: Self) -> Self::Output {
		AttributeMask(self.0 & rhs.0)
	}
}

impl std::ops::Not for AttributeMask {
	type Output = AttributeMask;
	fn not(self) -> Self::Output {
		AttributeMask(!self.0)
	}
}
