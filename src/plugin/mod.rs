//! Defines the Bevy [Plugin] for navigation grids
//!

use crate::prelude::*;
use bevy::prelude::*;

pub mod build_layer;
pub mod obstacle_layer;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum OrderingSet {
	Track,
	Process,
}

pub struct NavGridPlugin;

impl Plugin for NavGridPlugin {
	#[cfg(not(tarpaulin_include))]
	fn build(&self, app: &mut App) {
		app.register_type::<Direction>()
			.register_type::<DirectionMask>()
			.register_type::<AttributeMask>()
			.register_type::<MatrixCoord>()
			.register_type::<MatrixBounds>()
			.register_type::<WorldBounds>()
			.register_type::<HeightMode>()
			.register_type::<HeightLookupStrategy>()
			.register_type::<HeightCapabilities>()
			.register_type::<UnitProfile>()
			.register_type::<MatrixConfig>()
			.register_type::<HeightRecord>()
			.register_type::<CellHeightData>()
			.register_type::<ObstacleId>()
			.register_type::<GridId>()
			.register_type::<CellRef>()
			.register_type::<GridSection>()
			.register_type::<NavGridBudget>()
			.register_type::<DynamicObstacle>()
			.init_resource::<GridRegistry>()
			.init_resource::<NavGridBudget>()
			.add_event::<build_layer::EventInitialiseGrid>()
			.add_event::<build_layer::EventUpdateGridRegion>()
			.add_event::<build_layer::EventGridInitialised>()
			.add_event::<build_layer::EventGridChanged>()
			.configure_sets(Update, (OrderingSet::Track, OrderingSet::Process).chain())
			.add_systems(
				Update,
				(
					(
						obstacle_layer::remove_dynamic_obstacles,
						obstacle_layer::track_dynamic_obstacles,
					)
						.chain()
						.in_set(OrderingSet::Track),
					(
						build_layer::queue_grid_requests,
						build_layer::process_grid_work,
					)
						.chain()
						.in_set(OrderingSet::Process),
				),
			);
	}
}
