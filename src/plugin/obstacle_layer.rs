//! Logic for mirroring [DynamicObstacle] entities onto the grids of the
//! [GridRegistry]
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Marks an entity as a temporary blocker covering an axis aligned rectangle
/// centred on its [GlobalTransform]
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct DynamicObstacle {
	/// Half the footprint along `x` and `z`
	pub half_extents: Vec2,
	/// Units with any of these attributes ignore the obstacle
	pub exceptions: AttributeMask,
}

impl DynamicObstacle {
	/// Create a new instance of [DynamicObstacle]
	pub fn new(half_extents: Vec2, exceptions: AttributeMask) -> Self {
		DynamicObstacle {
			half_extents,
			exceptions,
		}
	}
	/// World space footprint when centred on `position`
	pub fn footprint(&self, position: Vec3) -> WorldBounds {
		WorldBounds::new(position, self.half_extents.x, self.half_extents.y)
	}
}

/// Apply new or moved [DynamicObstacle]s to the grids
#[cfg(not(tarpaulin_include))]
pub fn track_dynamic_obstacles(
	query: Query<
		(Entity, &DynamicObstacle, &GlobalTransform),
		Or<(Changed<DynamicObstacle>, Changed<GlobalTransform>)>,
	>,
	mut registry: ResMut<GridRegistry>,
	mut event_changed: EventWriter<EventGridChanged>,
) {
	for (entity, obstacle, transform) in query.iter() {
		let footprint = obstacle.footprint(transform.translation());
		let changes = registry.update_obstacle(ObstacleId::from(entity), footprint, obstacle.exceptions);
		for (grid, bounds) in changes {
			trace!("Obstacle {:?} changed {:?} of grid {:?}", entity, bounds, grid);
			event_changed.write(EventGridChanged { grid, bounds });
		}
	}
}

/// Clear despawned or removed [DynamicObstacle]s from the grids
#[cfg(not(tarpaulin_include))]
pub fn remove_dynamic_obstacles(
	mut removed: RemovedComponents<DynamicObstacle>,
	mut registry: ResMut<GridRegistry>,
	mut event_changed: EventWriter<EventGridChanged>,
) {
	for entity in removed.read() {
		for (grid, bounds) in registry.remove_obstacle(ObstacleId::from(entity)) {
			event_changed.write(EventGridChanged { grid, bounds });
		}
	}
}
