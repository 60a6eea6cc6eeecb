//! Passes that derive per-cell navigation data once the lattice and cells
//! exist. Each provider is a small resumable state machine advanced one unit
//! of work per `step`
//!

pub mod clearance;
pub mod height_settings;
