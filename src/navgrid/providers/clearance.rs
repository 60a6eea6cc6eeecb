//! Approximate distance from each cell to the nearest blocked cell.
//!
//! Two sweeps over the interior relax each cell against its neighbours. The
//! first travels left to right looking at the neighbours already visited,
//! the second travels right to left looking at all eight:
//!
//! ```text
//! first sweep         second sweep
//!  _____ _____         _____ _____ _____
//! |  x  |     |       |  x  |  x  |  x  |
//! |_____|_____|       |_____|_____|_____|
//! |  x  |  o  |       |  x  |  o  |  x  |
//! |_____|_____|       |_____|_____|_____|
//! |  x  |  x  |       |  x  |  x  |  x  |
//! |_____|_____|       |_____|_____|_____|
//! ```
//!
//! A blocked neighbour counts as `-cell_size / 2` so that a cell beside an
//! obstacle ends up with half a cell of clearance. The field is global, any
//! change anywhere requires sweeping the whole matrix again.
//!
//! Both sweeps advance column by column, so one step of
//! [ClearanceProvider] handles a full column of cells
//!

use crate::prelude::*;

/// Neighbours already relaxed when the first sweep reaches a cell
const VISITED: [Direction; 4] = [
	Direction::SouthWest,
	Direction::West,
	Direction::NorthWest,
	Direction::South,
];

/// Stage of the sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClearancePhase {
	/// Seed the perimeter and reset the interior
	Reset,
	/// Left to right over visited neighbours
	Forward,
	/// Right to left over every neighbour
	Backward,
	/// Nothing left to do
	Done,
}

/// Resumable clearance calculation, each step processes one column
#[derive(Debug, Clone, PartialEq)]
pub struct ClearanceProvider {
	/// Current stage
	phase: ClearancePhase,
	/// Column processed by the next step
	column: usize,
}

impl ClearanceProvider {
	/// Create a new instance of [ClearanceProvider] for `matrix`. Finishes
	/// immediately when the matrix does not track clearance
	pub fn new(matrix: &CellMatrix) -> Self {
		let phase = if matrix.config().generate_clearance {
			ClearancePhase::Reset
		} else {
			ClearancePhase::Done
		};
		ClearanceProvider { phase, column: 0 }
	}
	/// Run every remaining step
	pub fn calculate(matrix: &mut CellMatrix) {
		let mut provider = ClearanceProvider::new(matrix);
		while provider.step(matrix) {}
	}
	/// Whether both sweeps have completed
	pub fn is_finished(&self) -> bool {
		self.phase == ClearancePhase::Done
	}
	/// Process one column. Returns `false` once the field is complete
	pub fn step(&mut self, matrix: &mut CellMatrix) -> bool {
		let columns = matrix.columns();
		match self.phase {
			ClearancePhase::Reset => {
				self.reset_column(matrix, self.column);
				self.column += 1;
				if self.column == columns {
					if columns > 2 && matrix.rows() > 2 {
						self.phase = ClearancePhase::Forward;
						self.column = 1;
					} else {
						self.phase = ClearancePhase::Done;
					}
				}
				true
			}
			ClearancePhase::Forward => {
				self.relax_column(matrix, self.column, &VISITED);
				self.column += 1;
				if self.column == columns - 1 {
					self.phase = ClearancePhase::Backward;
					self.column = columns - 2;
				}
				true
			}
			ClearancePhase::Backward => {
				self.relax_column(matrix, self.column, &Direction::ALL);
				if self.column == 1 {
					self.phase = ClearancePhase::Done;
				} else {
					self.column -= 1;
				}
				true
			}
			ClearancePhase::Done => false,
		}
	}
	/// Seed the perimeter with half a cell and reset the interior
	fn reset_column(&self, matrix: &mut CellMatrix, x: usize) {
		let half = matrix.cell_size() / 2.0;
		let columns = matrix.columns();
		let rows = matrix.rows();
		for z in 0..rows {
			let perimeter = x == 0 || z == 0 || x == columns - 1 || z == rows - 1;
			let cell = matrix.cell_mut(x, z);
			let value = if cell.is_permanently_blocked() {
				0.0
			} else if perimeter {
				half
			} else {
				f32::INFINITY
			};
			cell.set_clearance(value);
		}
	}
	/// Relax the interior cells of column `x` against `directions`
	fn relax_column(&self, matrix: &mut CellMatrix, x: usize, directions: &[Direction]) {
		let cs = matrix.cell_size();
		let half = cs / 2.0;
		let capabilities = matrix.config().capabilities;
		for z in 1..matrix.rows() - 1 {
			let coord = MatrixCoord::new(x, z);
			if matrix[coord].is_permanently_blocked() {
				continue;
			}
			let mut nearest = f32::INFINITY;
			for d in directions {
				let Some(n) = matrix.neighbour(coord, *d) else {
					continue;
				};
				let neighbour = &matrix[n];
				let value = if neighbour.is_permanently_blocked()
					|| !matrix.is_height_walkable(coord, *d, &capabilities)
				{
					-half
				} else {
					neighbour.clearance().unwrap_or(f32::INFINITY)
				};
				nearest = nearest.min(value);
			}
			let candidate = nearest + cs;
			let cell = &mut matrix[coord];
			let current = cell.clearance().unwrap_or(f32::INFINITY);
			cell.set_clearance(current.min(candidate));
		}
	}
}
