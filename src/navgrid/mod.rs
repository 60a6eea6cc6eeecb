//! A navigation grid is a rectangular matrix of cells laid over a world. Each
//! cell records whether it can be stood on, how the ground between it and its
//! neighbours rises and falls, and how much free space surrounds it.
//!
//! The matrix is positioned by its centre, the `origin`, with cells indexed
//! from the `(-x, -z)` corner in row-major order.
//!
//! ```text
//!  ___________________________
//! |(0,2)  |(1,2)  |(2,2)  |   |
//! |_______|_______|_______|___|
//! |(0,1)  |(1,1)  |(2,1)  |   |
//! |_______|_______|_______|___|
//! |(0,0)  |(1,0)  |(2,0)  |   |
//! |_______|_______|_______|___|
//!  ^
//!  start, (-x, -z) corner
//! ```
//!
//! Definitions:
//!
//! * Lattice - ground heights sampled every `height_granularity` across the
//! matrix, both edges included. Stored by a [HeightLookup]
//! * Height record - slope, climb and drop between two adjacent cells,
//! recorded by the cell owning the pair in `Rich` mode
//! * Clearance - distance from a cell centre to the nearest blocked cell or
//! matrix edge, used to fit larger units
//! * Dynamic obstacle - a temporary blocker which units with matching
//! exception attributes may ignore
//! * Section - a coarse rectangle of cells stamped with the revision it last
//! changed at
//! * Portal - a virtual neighbour link between two cells, possibly on
//! different grids
//!
//! Construction, and refreshing a region after the world changes, both run as
//! resumable steps so that large grids can be spread across many frames.
//!

pub mod baked;
pub mod bounds;
pub mod cell;
pub mod config;
pub mod height_lookup;
pub mod matrix;
pub mod portals;
pub mod probe;
pub mod providers;
pub mod registry;
pub mod sections;
pub mod task;
pub mod utilities;
