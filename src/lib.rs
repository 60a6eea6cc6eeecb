//! This is a plugin for Bevy game engine to build and maintain navigation
//! grids describing where units can walk, how terrain height constrains them
//! and how much room they have
//!

pub mod navgrid;
pub mod plugin;

pub mod prelude;
