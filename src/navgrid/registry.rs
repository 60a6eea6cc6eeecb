//! The [GridRegistry] owns every navigation grid of a world together with
//! the work queued against them, the dynamic obstacles covering them and the
//! portal links between them.
//!
//! Grid construction and region updates are queued and processed in order,
//! a slice at a time, by [GridRegistry::process_pending]. Obstacle changes
//! are applied immediately since recomputing an exclusion mask is cheap.
//!
//! Each change bumps a registry wide revision which is stamped onto the
//! [GridSections] containing the change.
//!

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::time::{Duration, Instant};

use bevy::prelude::*;

use crate::prelude::*;

/// Unique ID of a grid within a registry
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Reflect)]
pub struct GridId(pub u32);

/// A matrix and its change tracking
#[derive(Debug, Clone, PartialEq)]
pub struct NavGrid {
	/// ID within the registry
	id: GridId,
	/// The cells
	matrix: CellMatrix,
	/// Change tracking rectangles
	sections: GridSections,
	/// Revision of the latest change anywhere on the grid
	revision: u64,
}

impl NavGrid {
	/// Create a new instance of [NavGrid]
	fn new(id: GridId, matrix: CellMatrix, revision: u64) -> Self {
		let sections = GridSections::from_config(matrix.config());
		NavGrid {
			id,
			matrix,
			sections,
			revision,
		}
	}
	pub fn id(&self) -> GridId {
		self.id
	}
	pub fn matrix(&self) -> &CellMatrix {
		&self.matrix
	}
	pub fn sections(&self) -> &GridSections {
		&self.sections
	}
	/// Revision of the latest change anywhere on the grid
	pub fn revision(&self) -> u64 {
		self.revision
	}
	/// Stamp `bounds` with `revision`
	fn mark_changed(&mut self, bounds: &MatrixBounds, revision: u64) {
		self.sections.touch(bounds, revision);
		self.revision = revision;
	}
}

/// Result of finishing a piece of queued work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridWorkOutcome {
	/// A grid finished building and is now available
	Initialised(GridId),
	/// Cells of a grid changed
	Changed {
		/// The grid
		grid: GridId,
		/// Cells whose navigation data may differ
		bounds: MatrixBounds,
	},
}

/// Work waiting to be stepped
#[derive(Debug, Clone)]
enum PendingWork {
	/// Building a grid
	Initialise {
		/// Grid being built
		grid: GridId,
		/// Resumable construction
		initialiser: Box<MatrixInitialiser>,
	},
	/// Refreshing part of a grid
	Update {
		/// Grid being refreshed
		grid: GridId,
		/// World area to refresh
		extent: WorldBounds,
		/// Created once the update reaches the front of the queue
		update: Option<Box<MatrixUpdate>>,
	},
}

impl PendingWork {
	/// Grid the work targets
	fn grid(&self) -> GridId {
		match self {
			PendingWork::Initialise { grid, .. } | PendingWork::Update { grid, .. } => *grid,
		}
	}
}

/// A dynamic obstacle and the cells it covers on each grid
#[derive(Debug, Clone)]
struct ObstacleRecord {
	/// Units with any of these attributes ignore the obstacle
	exceptions: AttributeMask,
	/// World space footprint
	footprint: WorldBounds,
	/// Covered cells per grid
	coverage: HashMap<GridId, MatrixBounds>,
}

/// Owns all navigation grids of a world
#[derive(Resource, Debug, Default)]
pub struct GridRegistry {
	/// Finished grids
	grids: BTreeMap<GridId, NavGrid>,
	/// Construction and updates in submission order
	pending: VecDeque<PendingWork>,
	/// Known dynamic obstacles
	obstacles: HashMap<ObstacleId, ObstacleRecord>,
	/// Portal links
	portals: VirtualNeighbours,
	/// ID handed to the next grid
	next_id: u32,
	/// Latest change revision
	revision: u64,
}

impl GridRegistry {
	/// Create an empty [GridRegistry]
	pub fn new() -> Self {
		GridRegistry::default()
	}
	/// Reserve the next grid ID
	fn allocate_id(&mut self) -> GridId {
		let id = GridId(self.next_id);
		self.next_id += 1;
		id
	}
	/// Advance and return the change revision
	fn next_revision(&mut self) -> u64 {
		self.revision += 1;
		self.revision
	}
	/// Latest change revision
	pub fn revision(&self) -> u64 {
		self.revision
	}
	/// Register an already built matrix
	pub fn add_grid(&mut self, matrix: CellMatrix) -> GridId {
		let id = self.allocate_id();
		self.insert_grid(id, matrix);
		id
	}
	/// Queue construction of a grid, it becomes available once
	/// [GridRegistry::process_pending] reports it initialised
	pub fn begin_grid(&mut self, config: MatrixConfig) -> GridId {
		let id = self.allocate_id();
		debug!("Queued initialisation of grid {:?}", id);
		self.pending.push_back(PendingWork::Initialise {
			grid: id,
			initialiser: Box::new(CellMatrix::create_incrementally(config)),
		});
		id
	}
	/// Queue construction of a grid from baked data
	pub fn begin_grid_from_baked(&mut self, config: MatrixConfig, data: BakedGridData) -> GridId {
		let id = self.allocate_id();
		self.pending.push_back(PendingWork::Initialise {
			grid: id,
			initialiser: Box::new(CellMatrix::create_incrementally_from_baked(config, data)),
		});
		id
	}
	/// Store a finished matrix and cover it with the known obstacles
	fn insert_grid(&mut self, id: GridId, matrix: CellMatrix) {
		let mut grid = NavGrid::new(id, matrix, self.revision);
		for (obstacle, record) in self.obstacles.iter_mut() {
			let Some(bounds) = grid.matrix.get_matrix_bounds_of(&record.footprint) else {
				continue;
			};
			grid.matrix
				.update_dynamic_obstacle(*obstacle, record.exceptions, None, Some(bounds));
			record.coverage.insert(id, bounds);
		}
		self.grids.insert(id, grid);
	}
	/// Remove a grid along with its queued work, portal links and obstacle
	/// coverage
	pub fn remove_grid(&mut self, id: GridId) -> Option<NavGrid> {
		self.pending.retain(|w| w.grid() != id);
		self.portals.remove_grid(id);
		for record in self.obstacles.values_mut() {
			record.coverage.remove(&id);
		}
		self.grids.remove(&id)
	}
	pub fn grid(&self, id: GridId) -> Option<&NavGrid> {
		self.grids.get(&id)
	}
	/// Every finished grid in ID order
	pub fn grids(&self) -> impl Iterator<Item = &NavGrid> {
		self.grids.values()
	}
	/// The first grid whose area contains `position`
	pub fn grid_at(&self, position: Vec3) -> Option<GridId> {
		self.grids
			.values()
			.find(|g| g.matrix.world_bounds().contains(position))
			.map(|g| g.id)
	}
	/// Whether `id` is still queued for construction
	pub fn is_initialising(&self, id: GridId) -> bool {
		self.pending
			.iter()
			.any(|w| matches!(w, PendingWork::Initialise { grid, .. } if *grid == id))
	}
	/// Number of queued pieces of work
	pub fn pending_count(&self) -> usize {
		self.pending.len()
	}
	/// Queue a refresh of the cells of `grid` beneath `extent`. Returns
	/// `false` if the grid is unknown
	pub fn queue_update(&mut self, grid: GridId, extent: WorldBounds) -> bool {
		if !self.grids.contains_key(&grid) && !self.is_initialising(grid) {
			warn!("Cannot queue an update for unknown grid {:?}", grid);
			return false;
		}
		self.pending.push_back(PendingWork::Update {
			grid,
			extent,
			update: None,
		});
		true
	}
	/// Queue a refresh of every grid, finished or initialising, overlapping
	/// `extent`, returning the grids queued
	pub fn queue_update_at(&mut self, extent: WorldBounds) -> Vec<GridId> {
		let finished = self
			.grids
			.values()
			.filter(|g| g.matrix.world_bounds().intersects(&extent))
			.map(|g| g.id);
		let initialising = self.pending.iter().filter_map(|w| match w {
			PendingWork::Initialise { grid, initialiser }
				if initialiser.config().world_bounds().intersects(&extent) =>
			{
				Some(*grid)
			}
			_ => None,
		});
		let ids: Vec<GridId> = finished.chain(initialising).collect();
		for id in ids.iter() {
			self.queue_update(*id, extent);
		}
		ids
	}
	/// Step queued work in submission order until `budget` is spent. At
	/// least one step is taken per call
	pub fn process_pending<P: GroundProbe + ?Sized>(
		&mut self,
		probe: &P,
		budget: Duration,
	) -> Vec<GridWorkOutcome> {
		let start = Instant::now();
		let mut outcomes = Vec::new();
		while let Some(work) = self.pending.pop_front() {
			let remaining = budget.saturating_sub(start.elapsed());
			match work {
				PendingWork::Initialise {
					grid,
					mut initialiser,
				} => {
					let slice = run_bounded_slice(remaining, || initialiser.step(probe));
					if !slice.finished {
						self.pending.push_front(PendingWork::Initialise { grid, initialiser });
						break;
					}
					self.insert_grid(grid, (*initialiser).finish());
					debug!("Grid {:?} initialised", grid);
					outcomes.push(GridWorkOutcome::Initialised(grid));
				}
				PendingWork::Update {
					grid,
					extent,
					update,
				} => {
					let Some(nav) = self.grids.get_mut(&grid) else {
						warn!("Dropping update of missing grid {:?}", grid);
						continue;
					};
					let mut update =
						update.unwrap_or_else(|| Box::new(MatrixUpdate::new(&nav.matrix, extent)));
					let slice = run_bounded_slice(remaining, || update.step(&mut nav.matrix, probe));
					if !slice.finished {
						self.pending.push_front(PendingWork::Update {
							grid,
							extent,
							update: Some(update),
						});
						break;
					}
					if let Some(bounds) = update.changed_bounds(&nav.matrix) {
						let revision = self.next_revision();
						if let Some(nav) = self.grids.get_mut(&grid) {
							nav.mark_changed(&bounds, revision);
						}
						outcomes.push(GridWorkOutcome::Changed { grid, bounds });
					}
				}
			}
			if start.elapsed() >= budget {
				break;
			}
		}
		outcomes
	}
	/// Place or move dynamic obstacle `id` onto `footprint`. Returns the
	/// cells whose exclusion changed on each grid
	pub fn update_obstacle(
		&mut self,
		id: ObstacleId,
		footprint: WorldBounds,
		exceptions: AttributeMask,
	) -> Vec<(GridId, MatrixBounds)> {
		let mut record = self.obstacles.remove(&id).unwrap_or_else(|| ObstacleRecord {
			exceptions,
			footprint,
			coverage: HashMap::new(),
		});
		let refreshed = record.exceptions != exceptions;
		record.exceptions = exceptions;
		record.footprint = footprint;
		let mut changes = Vec::new();
		for grid in self.grids.values_mut() {
			let old = record.coverage.get(&grid.id).copied();
			let new = grid.matrix.get_matrix_bounds_of(&footprint);
			if old == new && !refreshed {
				continue;
			}
			let changed = grid.matrix.update_dynamic_obstacle(id, exceptions, old, new);
			match new {
				Some(b) => record.coverage.insert(grid.id, b),
				None => record.coverage.remove(&grid.id),
			};
			if let Some(bounds) = changed {
				changes.push((grid.id, bounds));
			}
		}
		self.obstacles.insert(id, record);
		self.apply_changes(&changes);
		changes
	}
	/// Forget dynamic obstacle `id`. Returns the cells whose exclusion
	/// changed on each grid
	pub fn remove_obstacle(&mut self, id: ObstacleId) -> Vec<(GridId, MatrixBounds)> {
		let Some(record) = self.obstacles.remove(&id) else {
			return Vec::new();
		};
		let mut changes = Vec::new();
		for (grid_id, old) in record.coverage {
			let Some(grid) = self.grids.get_mut(&grid_id) else {
				continue;
			};
			if let Some(bounds) =
				grid.matrix
					.update_dynamic_obstacle(id, record.exceptions, Some(old), None)
			{
				changes.push((grid_id, bounds));
			}
		}
		self.apply_changes(&changes);
		changes
	}
	/// Stamp obstacle changes onto the sections of their grids
	fn apply_changes(&mut self, changes: &[(GridId, MatrixBounds)]) {
		if changes.is_empty() {
			return;
		}
		let revision = self.next_revision();
		for (grid_id, bounds) in changes {
			if let Some(grid) = self.grids.get_mut(grid_id) {
				grid.mark_changed(bounds, revision);
			}
		}
	}
	/// Number of known dynamic obstacles
	pub fn obstacle_count(&self) -> usize {
		self.obstacles.len()
	}
	/// Link two cells with a portal. Both cells must exist on finished grids
	pub fn register_portal(&mut self, a: CellRef, b: CellRef) -> bool {
		if !self.cell_exists(a) || !self.cell_exists(b) {
			warn!("Cannot link portal between {:?} and {:?}", a, b);
			return false;
		}
		self.portals.register(a, b)
	}
	/// Remove the portal between two cells
	pub fn unregister_portal(&mut self, a: CellRef, b: CellRef) -> bool {
		self.portals.unregister(a, b)
	}
	/// Cells linked to `cell` by portals
	pub fn virtual_neighbours(&self, cell: CellRef) -> &[CellRef] {
		self.portals.neighbours(cell)
	}
	/// Whether `cell` exists on a finished grid
	fn cell_exists(&self, cell: CellRef) -> bool {
		self.grids
			.get(&cell.grid)
			.is_some_and(|g| g.matrix.try_cell(cell.coord).is_some())
	}
}
