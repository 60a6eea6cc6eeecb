//! Dynamic obstacles covering a cell. Every obstacle carries an exception
//! mask, units owning any of those attributes ignore it. The exclusion mask
//! of a cell is the union of the negated exception masks of the obstacles
//! covering it and is always rebuilt from the full covering set whenever it
//! changes
//!

use bevy::prelude::*;

use crate::prelude::*;

/// Unique ID of a dynamic obstacle
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Reflect)]
pub struct ObstacleId(pub u64);

impl From<Entity> for ObstacleId {
	fn from(entity: Entity) -> Self {
		ObstacleId(entity.to_bits())
	}
}

impl Cell {
	/// Register `id` as covering this cell. Adding an obstacle that is
	/// already present only refreshes its exception mask. Returns whether the
	/// exclusion mask changed
	pub fn add_dynamic_obstacle(&mut self, id: ObstacleId, exceptions: AttributeMask) -> bool {
		match self.obstacles.iter_mut().find(|(o, _)| *o == id) {
			Some(existing) => existing.1 = exceptions,
			None => self.obstacles.push((id, exceptions)),
		}
		self.recompute_exclusion()
	}
	/// Remove `id` from the covering set. Returns whether the exclusion mask
	/// changed, removing an absent obstacle changes nothing
	pub fn remove_dynamic_obstacle(&mut self, id: ObstacleId) -> bool {
		let before = self.obstacles.len();
		self.obstacles.retain(|(o, _)| *o != id);
		if self.obstacles.len() == before {
			return false;
		}
		self.recompute_exclusion()
	}
	/// Whether `id` currently covers this cell
	pub fn has_dynamic_obstacle(&self, id: ObstacleId) -> bool {
		self.obstacles.iter().any(|(o, _)| *o == id)
	}
	/// Number of obstacles covering this cell
	pub fn dynamic_obstacle_count(&self) -> usize {
		self.obstacles.len()
	}
	/// Rebuild the exclusion mask from the covering set
	fn recompute_exclusion(&mut self) -> bool {
		let mut mask = AttributeMask::NONE;
		for (_, exceptions) in self.obstacles.iter() {
			mask |= !*exceptions;
		}
		let changed = mask != self.exclusion;
		self.exclusion = mask;
		changed
	}
}

// #[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;
	/// A lone flat cell
	fn cell() -> Cell {
		let config = MatrixConfig::new(Vec3::ZERO, 3, 3, 1.0).with_height_mode(HeightMode::Flat);
		cell_factory(&config)(&config, MatrixCoord::new(1, 1), Vec3::ZERO, false)
	}
	#[test]
	fn add_twice_is_idempotent() {
		let mut c = cell();
		let id = ObstacleId(3);
		let flyer = AttributeMask::attribute(1);
		assert!(c.add_dynamic_obstacle(id, flyer));
		let mask = c.exclusion_mask();
		assert!(!c.add_dynamic_obstacle(id, flyer));
		assert_eq!(mask, c.exclusion_mask());
		assert_eq!(1, c.dynamic_obstacle_count());
	}
	#[test]
	fn remove_absent_is_noop() {
		let mut c = cell();
		assert!(!c.remove_dynamic_obstacle(ObstacleId(9)));
		assert_eq!(AttributeMask::NONE, c.exclusion_mask());
	}
	#[test]
	fn exceptions_let_units_through() {
		let mut c = cell();
		let flyer = AttributeMask::attribute(1);
		c.add_dynamic_obstacle(ObstacleId(1), flyer);
		assert!(!c.is_blocked_for(flyer));
		assert!(c.is_blocked_for(AttributeMask::attribute(0)));
	}
	#[test]
	fn overlapping_obstacles_recompute() {
		let mut c = cell();
		let a = AttributeMask::attribute(0);
		let b = AttributeMask::attribute(1);
		c.add_dynamic_obstacle(ObstacleId(1), a);
		c.add_dynamic_obstacle(ObstacleId(2), b);
		// each obstacle blocks whoever the other one lets through
		assert!(c.is_blocked_for(a));
		assert!(c.is_blocked_for(b));
		assert!(c.remove_dynamic_obstacle(ObstacleId(2)));
		assert!(!c.is_blocked_for(a));
		assert!(c.remove_dynamic_obstacle(ObstacleId(1)));
		assert_eq!(AttributeMask::NONE, c.exclusion_mask());
	}
	#[test]
	fn refresh_exceptions() {
		let mut c = cell();
		c.add_dynamic_obstacle(ObstacleId(1), AttributeMask::NONE);
		assert!(c.is_blocked_for(AttributeMask::attribute(4)));
		assert!(c.add_dynamic_obstacle(ObstacleId(1), AttributeMask::attribute(4)));
		assert!(!c.is_blocked_for(AttributeMask::attribute(4)));
	}
	#[test]
	fn obstacle_id_from_entity() {
		let entity = Entity::from_raw(7);
		let id = ObstacleId::from(entity);
		assert_eq!(entity.to_bits(), id.0);
	}
}
