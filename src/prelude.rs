//! `use bevy_navgrid_plugin::prelude::*;` to import common structures and methods
//!

#[doc(hidden)]
pub use crate::navgrid::{
	baked::*,
	bounds::*,
	cell::{height_record::*, obstacles::*, *},
	config::*,
	height_lookup::{dense::*, quad_tree::*, *},
	matrix::{initialiser::*, update::*, *},
	portals::*,
	probe::*,
	providers::{clearance::*, height_settings::*},
	registry::*,
	sections::*,
	task::*,
	utilities::*,
};

#[doc(hidden)]
pub use crate::plugin::{build_layer::*, obstacle_layer::*, *};
