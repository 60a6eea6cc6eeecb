//! Dynamic obstacles on a single matrix and across a registry
//!

use std::time::Duration;

use bevy::prelude::*;
use bevy_navgrid_plugin::prelude::*;

/// Attribute of an ordinary walker
const WALKER: u32 = 0;
/// Attribute of a unit allowed through gates
const GATEKEEPER: u32 = 1;

/// Every exclusion mask of the matrix
fn masks(matrix: &CellMatrix) -> Vec<AttributeMask> {
	matrix.cells().iter().map(|c| c.exclusion_mask()).collect()
}

#[test]
fn add_then_remove_restores_masks() {
	let config = MatrixConfig::new(Vec3::ZERO, 10, 10, 1.0);
	let mut matrix = CellMatrix::create(config, &FlatGroundProbe::new(0.0));
	let before = masks(&matrix);
	let id = ObstacleId(9);
	let footprint = MatrixBounds::new(3, 5, 3, 5);
	let changed = matrix.update_dynamic_obstacle(id, AttributeMask::NONE, None, Some(footprint));
	assert_eq!(Some(footprint), changed);
	for coord in footprint.iter() {
		assert!(!matrix.is_walkable(coord, AttributeMask::attribute(WALKER)));
	}
	// adding again changes nothing
	let changed = matrix.update_dynamic_obstacle(id, AttributeMask::NONE, None, Some(footprint));
	assert_eq!(None, changed);
	let changed = matrix.update_dynamic_obstacle(id, AttributeMask::NONE, Some(footprint), None);
	assert_eq!(Some(footprint), changed);
	assert_eq!(before, masks(&matrix));
	// removing an absent obstacle changes nothing
	let changed = matrix.update_dynamic_obstacle(id, AttributeMask::NONE, Some(footprint), None);
	assert_eq!(None, changed);
}

#[test]
fn exceptions_let_units_through() {
	let config = MatrixConfig::new(Vec3::ZERO, 6, 6, 1.0);
	let mut matrix = CellMatrix::create(config, &FlatGroundProbe::new(0.0));
	let gate = MatrixBounds::new(2, 2, 0, 5);
	matrix.update_dynamic_obstacle(ObstacleId(1), AttributeMask::attribute(GATEKEEPER), None, Some(gate));
	let coord = MatrixCoord::new(2, 3);
	assert!(!matrix.is_walkable(coord, AttributeMask::attribute(WALKER)));
	assert!(matrix.is_walkable(coord, AttributeMask::attribute(GATEKEEPER)));
	// a second, stricter obstacle overlapping the gate blocks everyone
	matrix.update_dynamic_obstacle(ObstacleId(2), AttributeMask::NONE, None, Some(MatrixBounds::single(coord)));
	assert!(!matrix.is_walkable(coord, AttributeMask::attribute(GATEKEEPER)));
	matrix.update_dynamic_obstacle(ObstacleId(2), AttributeMask::NONE, Some(MatrixBounds::single(coord)), None);
	assert!(matrix.is_walkable(coord, AttributeMask::attribute(GATEKEEPER)));
}

#[test]
fn moving_obstacle_only_touches_difference() {
	let config = MatrixConfig::new(Vec3::ZERO, 10, 10, 1.0);
	let mut matrix = CellMatrix::create(config, &FlatGroundProbe::new(0.0));
	let id = ObstacleId(4);
	let first = MatrixBounds::new(0, 2, 0, 2);
	let second = MatrixBounds::new(1, 3, 0, 2);
	matrix.update_dynamic_obstacle(id, AttributeMask::NONE, None, Some(first));
	let changed = matrix.update_dynamic_obstacle(id, AttributeMask::NONE, Some(first), Some(second));
	// column 0 cleared and column 3 covered
	assert_eq!(Some(MatrixBounds::new(0, 3, 0, 2)), changed);
	assert!(matrix.is_walkable(MatrixCoord::new(0, 1), AttributeMask::attribute(WALKER)));
	assert!(!matrix.is_walkable(MatrixCoord::new(3, 1), AttributeMask::attribute(WALKER)));
}

#[test]
fn registry_obstacles_stamp_sections() {
	let mut registry = GridRegistry::new();
	let config = MatrixConfig::new(Vec3::ZERO, 20, 20, 1.0).with_section_size(10);
	let id = registry.begin_grid(config);
	while registry.pending_count() > 0 {
		registry.process_pending(&FlatGroundProbe::new(0.0), Duration::from_millis(2));
	}
	let start = registry.revision();
	// a footprint in the (-x, -z) quarter
	let changes = registry.update_obstacle(
		ObstacleId(3),
		WorldBounds::new(Vec3::new(-5.0, 0.0, -5.0), 1.0, 1.0),
		AttributeMask::NONE,
	);
	assert_eq!(1, changes.len());
	let sections = registry.grid(id).map(|g| g.sections().clone());
	let Some(sections) = sections else {
		panic!("grid missing");
	};
	assert!(sections.changed_since(&MatrixBounds::new(0, 9, 0, 9), start));
	assert!(!sections.changed_since(&MatrixBounds::new(10, 19, 10, 19), start));
	registry.remove_obstacle(ObstacleId(3));
	let walkable = registry
		.grid(id)
		.map(|g| g.matrix().is_walkable(MatrixCoord::new(5, 5), AttributeMask::attribute(WALKER)));
	assert_eq!(Some(true), walkable);
}
