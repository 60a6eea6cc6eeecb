//! Logic for queueing grid construction and region refreshes and stepping
//! them a slice at a time each frame
//!

use std::time::Duration;

use crate::prelude::*;
use bevy::prelude::*;

/// Caps the time spent stepping grid work each frame
#[derive(Resource, Debug, Clone, Copy, Reflect)]
#[reflect(Resource)]
pub struct NavGridBudget {
	/// Milliseconds of grid work allowed per frame
	pub max_millis_per_frame: u64,
}

impl Default for NavGridBudget {
	fn default() -> Self {
		NavGridBudget {
			max_millis_per_frame: 4,
		}
	}
}

impl NavGridBudget {
	/// Create a new instance of [NavGridBudget]
	pub fn new(max_millis_per_frame: u64) -> Self {
		NavGridBudget {
			max_millis_per_frame,
		}
	}
	/// The budget as a [Duration]
	pub fn duration(&self) -> Duration {
		Duration::from_millis(self.max_millis_per_frame)
	}
}

/// The world's ground, inserted by the host application. Without it grids are
/// built against flat ground at height zero
#[derive(Resource)]
pub struct GroundProbeResource(pub Box<dyn GroundProbe + Send + Sync>);

impl GroundProbeResource {
	/// Create a new instance of [GroundProbeResource]
	pub fn new<P: GroundProbe + Send + Sync + 'static>(probe: P) -> Self {
		GroundProbeResource(Box::new(probe))
	}
}

/// Request that a grid is built
#[derive(Event, Debug, Clone)]
pub struct EventInitialiseGrid(pub MatrixConfig);

/// Request that every grid beneath an area re-samples the ground
#[derive(Event, Debug, Clone, Copy)]
pub struct EventUpdateGridRegion(pub WorldBounds);

/// A grid finished building and is available in the [GridRegistry]
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventGridInitialised(pub GridId);

/// Navigation data of some cells changed
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventGridChanged {
	/// The grid
	pub grid: GridId,
	/// Cells which may differ
	pub bounds: MatrixBounds,
}

/// Read [EventInitialiseGrid] and [EventUpdateGridRegion] and queue the work
#[cfg(not(tarpaulin_include))]
pub fn queue_grid_requests(
	mut init_events: EventReader<EventInitialiseGrid>,
	mut update_events: EventReader<EventUpdateGridRegion>,
	mut registry: ResMut<GridRegistry>,
) {
	for event in init_events.read() {
		let id = registry.begin_grid(event.0.clone());
		info!("Building grid {:?} at {}", id, event.0.origin);
	}
	for event in update_events.read() {
		let grids = registry.queue_update_at(event.0);
		if grids.is_empty() {
			debug!("Region update {:?} hit no grids", event.0);
		}
	}
}

/// Step queued grid work within the [NavGridBudget] and announce the results
#[cfg(not(tarpaulin_include))]
pub fn process_grid_work(
	mut registry: ResMut<GridRegistry>,
	budget: Res<NavGridBudget>,
	probe: Option<Res<GroundProbeResource>>,
	mut event_initialised: EventWriter<EventGridInitialised>,
	mut event_changed: EventWriter<EventGridChanged>,
) {
	if registry.pending_count() == 0 {
		return;
	}
	let outcomes = match probe {
		Some(probe) => registry.process_pending(probe.0.as_ref(), budget.duration()),
		None => registry.process_pending(&FlatGroundProbe::default(), budget.duration()),
	};
	for outcome in outcomes {
		match outcome {
			GridWorkOutcome::Initialised(grid) => {
				event_initialised.write(EventGridInitialised(grid));
			}
			GridWorkOutcome::Changed { grid, bounds } => {
				event_changed.write(EventGridChanged { grid, bounds });
			}
		}
	}
}

// #[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn budget_duration() {
		let budget = NavGridBudget::new(12);
		assert_eq!(Duration::from_millis(12), budget.duration());
	}
	#[test]
	fn boxed_probe_samples() {
		let probe = GroundProbeResource::new(FlatGroundProbe::new(3.0));
		assert_eq!(3.0, probe.0.sample_ground_height(Vec3::ZERO));
	}
}
