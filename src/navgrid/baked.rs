//! Grid data captured from a finished [CellMatrix] so that a later build can
//! skip probing the scene.
//!
//! Lattice heights are run-length encoded in row-major order. Each entry of
//! `height_indices` is the first lattice index at which `heights` of the
//! same position begins, the run lasts until the next index:
//!
//! ```text
//! lattice      0.0 0.0 0.0 2.0 2.0 0.0 0.0 ...
//! indices      0           3       5
//! heights      0.0         2.0     0.0
//! ```
//!

use crate::prelude::*;

/// Persisted heights and blocked cells of a matrix
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BakedGridData {
	/// Lattice index at which each run starts, strictly increasing
	pub height_indices: Vec<usize>,
	/// Height of each run
	pub heights: Vec<f32>,
	/// Row-major indices, `z * columns + x`, of permanently blocked cells
	pub blocked_indices: Vec<usize>,
}

impl BakedGridData {
	/// Capture the lattice and blocked cells of `matrix`
	pub fn from_matrix(matrix: &CellMatrix) -> Self {
		let config = matrix.config();
		let lattice_columns = config.lattice_columns();
		let mut data = BakedGridData::default();
		let mut previous: Option<f32> = None;
		for index in 0..config.lattice_count() {
			let height = matrix.sample_lattice(index % lattice_columns, index / lattice_columns);
			if previous != Some(height) {
				data.height_indices.push(index);
				data.heights.push(height);
				previous = Some(height);
			}
		}
		data.blocked_indices = matrix
			.cells()
			.iter()
			.enumerate()
			.filter(|(_, c)| c.is_permanently_blocked())
			.map(|(i, _)| i)
			.collect();
		data
	}
	/// Number of height runs
	pub fn run_count(&self) -> usize {
		self.height_indices.len()
	}
	/// Height of the run covering lattice `index`, [None] before the first
	/// run
	pub fn height_at(&self, index: usize) -> Option<f32> {
		let run = self.height_indices.partition_point(|start| *start <= index);
		if run == 0 {
			return None;
		}
		self.heights.get(run - 1).copied()
	}
	/// Whether the data describes a matrix built from `config`
	pub fn is_valid_for(&self, config: &MatrixConfig) -> bool {
		if self.height_indices.len() != self.heights.len() {
			return false;
		}
		if self.height_indices.first().is_some_and(|first| *first != 0) {
			return false;
		}
		if !self.height_indices.windows(2).all(|w| w[0] < w[1]) {
			return false;
		}
		if self
			.height_indices
			.last()
			.is_some_and(|last| *last >= config.lattice_count())
		{
			return false;
		}
		let cell_count = config.columns * config.rows;
		self.blocked_indices.iter().all(|i| *i < cell_count)
	}
	/// From a `ron` file generate the [BakedGridData]
	#[cfg(feature = "ron")]
	pub fn from_ron(path: String) -> Self {
		let file = std::fs::File::open(&path).expect("Failed opening BakedGridData file");
		match ron::de::from_reader(file) {
			Ok(data) => data,
			Err(e) => panic!("Failed deserializing BakedGridData {}: {}", path, e),
		}
	}
	/// Serialise into a pretty `ron` string, [None] if serialisation fails
	#[cfg(feature = "ron")]
	pub fn to_ron_string(&self) -> Option<String> {
		match ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
			Ok(s) => Some(s),
			Err(e) => {
				bevy::log::error!("Failed serializing BakedGridData: {}", e);
				None
			}
		}
	}
	/// Create [BakedGridData] from a csv of lattice heights, one line per
	/// lattice row starting at the `-z` edge of the matrix. No cells are
	/// blocked
	#[cfg(feature = "csv")]
	pub fn from_csv(path: String, config: &MatrixConfig) -> Self {
		let file = std::fs::File::open(&path).expect("Failed opening csv");
		let mut rdr = csv::ReaderBuilder::new().has_headers(false).from_reader(file);
		let mut data = BakedGridData::default();
		let mut previous: Option<f32> = None;
		let mut index = 0;
		let mut rows = 0;
		for record in rdr.records() {
			let record = match record {
				Ok(r) => r,
				Err(e) => panic!("Failed reading csv {}: {}", path, e),
			};
			if record.len() != config.lattice_columns() {
				panic!(
					"CSV {} row {} has {} heights, expected {}",
					path,
					rows,
					record.len(),
					config.lattice_columns()
				);
			}
			for value in record.iter() {
				let height: f32 = value.trim().parse().expect("CSV expects f32 values");
				if previous != Some(height) {
					data.height_indices.push(index);
					data.heights.push(height);
					previous = Some(height);
				}
				index += 1;
			}
			rows += 1;
		}
		if rows != config.lattice_rows() {
			panic!(
				"CSV {} has {} rows, expected {}",
				path,
				rows,
				config.lattice_rows()
			);
		}
		data
	}
}
