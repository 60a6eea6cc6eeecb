//! Run the plugin systems on a bare app
//!

use bevy::prelude::*;
use bevy_navgrid_plugin::prelude::*;

/// App with the plugin and a generous budget
fn app() -> App {
	let mut app = App::new();
	app.add_plugins(NavGridPlugin);
	app.insert_resource(NavGridBudget::new(50));
	app
}

/// Update until the registry holds a grid, returning the update count
fn update_until_built(app: &mut App) -> usize {
	for i in 1..1000 {
		app.update();
		if app.world().resource::<GridRegistry>().grids().count() > 0 {
			return i;
		}
	}
	panic!("grid never finished building");
}

#[test]
fn grid_built_from_event() {
	let mut app = app();
	app.insert_resource(GroundProbeResource::new(FlatGroundProbe::new(2.0)));
	app.world_mut()
		.send_event(EventInitialiseGrid(MatrixConfig::new(Vec3::new(0.0, 2.0, 0.0), 8, 8, 1.0)));
	update_until_built(&mut app);
	let events = app.world().resource::<Events<EventGridInitialised>>();
	assert_eq!(1, events.iter_current_update_events().count());
	let registry = app.world().resource::<GridRegistry>();
	let heights: Vec<f32> = registry
		.grids()
		.flat_map(|g| g.matrix().cells().iter().map(|c| c.position().y))
		.collect();
	assert!(heights.iter().all(|h| *h == 2.0));
}

#[test]
fn obstacle_entities_follow_lifecycle() {
	let mut app = app();
	app.world_mut()
		.send_event(EventInitialiseGrid(MatrixConfig::new(Vec3::ZERO, 10, 10, 1.0)));
	update_until_built(&mut app);
	let entity = app
		.world_mut()
		.spawn((
			DynamicObstacle::new(Vec2::splat(0.5), AttributeMask::NONE),
			GlobalTransform::from_translation(Vec3::new(0.5, 0.0, 0.5)),
		))
		.id();
	app.update();
	let registry = app.world().resource::<GridRegistry>();
	assert_eq!(1, registry.obstacle_count());
	let walkable = registry
		.grids()
		.next()
		.map(|g| g.matrix().is_walkable(MatrixCoord::new(5, 5), AttributeMask::attribute(0)));
	assert_eq!(Some(false), walkable);
	let changed = app.world().resource::<Events<EventGridChanged>>();
	assert!(changed.iter_current_update_events().count() > 0);
	app.world_mut().despawn(entity);
	app.update();
	let registry = app.world().resource::<GridRegistry>();
	assert_eq!(0, registry.obstacle_count());
	let walkable = registry
		.grids()
		.next()
		.map(|g| g.matrix().is_walkable(MatrixCoord::new(5, 5), AttributeMask::attribute(0)));
	assert_eq!(Some(true), walkable);
}

#[test]
fn region_update_reports_change() {
	let mut app = app();
	app.world_mut()
		.send_event(EventInitialiseGrid(MatrixConfig::new(Vec3::ZERO, 10, 10, 1.0)));
	update_until_built(&mut app);
	app.world_mut()
		.send_event(EventUpdateGridRegion(WorldBounds::new(Vec3::ZERO, 1.0, 1.0)));
	app.update();
	let changed = app.world().resource::<Events<EventGridChanged>>();
	let bounds: Vec<MatrixBounds> = changed.iter_current_update_events().map(|e| e.bounds).collect();
	assert_eq!(vec![MatrixBounds::new(2, 7, 2, 7)], bounds);
}
