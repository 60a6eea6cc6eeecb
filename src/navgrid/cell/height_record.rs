//! Measured height difference when travelling from one cell to a neighbour
//!

use bevy::prelude::*;

/// Slope, climb and drop measured along the path from a cell centre to the
/// centre of a neighbour. Travelling the other way yields the
/// [HeightRecord::reversed] record
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Reflect)]
pub struct HeightRecord {
	/// Steepest slope between two consecutive lattice samples, in degrees
	pub slope_angle: f32,
	/// Tallest contiguous rise
	pub climb: f32,
	/// Deepest contiguous fall
	pub drop: f32,
}

impl HeightRecord {
	/// Create a new instance of [HeightRecord]
	pub fn new(slope_angle: f32, climb: f32, drop: f32) -> Self {
		HeightRecord {
			slope_angle,
			climb,
			drop,
		}
	}
	/// The record for travelling in the opposite direction, what was a climb
	/// becomes a drop
	pub fn reversed(&self) -> Self {
		HeightRecord {
			slope_angle: self.slope_angle,
			climb: self.drop,
			drop: self.climb,
		}
	}
}

// #[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn reversed_swaps_climb_and_drop() {
		let record = HeightRecord::new(12.0, 0.3, 1.1);
		let result = record.reversed();
		let actual = HeightRecord::new(12.0, 1.1, 0.3);
		assert_eq!(actual, result);
		assert_eq!(record, result.reversed());
	}
}
