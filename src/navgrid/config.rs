//! Describes the shape of a [crate::prelude::CellMatrix] and how its cells
//! are classified
//!

use bevy::prelude::*;

use crate::prelude::*;

/// How a matrix models the height difference between neighbouring cells
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum HeightMode {
	/// No height data, every neighbour is reachable regardless of elevation
	Flat,
	/// A single bitmask per cell of the directions blocked for the matrix
	/// wide [HeightCapabilities]
	#[default]
	Standard,
	/// A full slope/climb/drop record per direction, evaluated against the
	/// capabilities of each unit at query time
	Rich,
}

impl HeightMode {
	/// Row of the cell factory table
	pub(crate) fn index(&self) -> usize {
		match self {
			HeightMode::Flat => 0,
			HeightMode::Standard => 1,
			HeightMode::Rich => 2,
		}
	}
}

/// Storage strategy of the height lattice
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum HeightLookupStrategy {
	/// Hash map lookup, memory proportional to the number of recorded
	/// samples, constant time access
	#[default]
	Dense,
	/// Depth bounded quad tree, compacts uniform regions and is best suited
	/// to large flat areas
	QuadTree {
		/// Maximum number of subdivisions below the root
		max_depth: u8,
		/// Number of samples a leaf holds before it subdivides
		leaf_capacity: usize,
	},
}

/// Height tolerances of a traveling unit
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct HeightCapabilities {
	/// Steepest slope in degrees a unit can walk up or down
	pub max_slope_angle: f32,
	/// Tallest contiguous ledge a unit can climb
	pub max_climb_height: f32,
	/// Deepest contiguous ledge a unit can drop down
	pub max_drop_height: f32,
}

impl Default for HeightCapabilities {
	fn default() -> Self {
		HeightCapabilities {
			max_slope_angle: 30.0,
			max_climb_height: 0.5,
			max_drop_height: 1.0,
		}
	}
}

impl HeightCapabilities {
	/// Create a new instance of [HeightCapabilities]
	pub fn new(max_slope_angle: f32, max_climb_height: f32, max_drop_height: f32) -> Self {
		HeightCapabilities {
			max_slope_angle,
			max_climb_height,
			max_drop_height,
		}
	}
	/// Whether a slope of 90 degrees or more is tolerated, which means
	/// height never blocks movement
	pub fn ignores_height(&self) -> bool {
		self.max_slope_angle >= 90.0
	}
	/// Whether the measured `record` is within these tolerances
	pub fn allows(&self, record: &HeightRecord) -> bool {
		record.slope_angle <= self.max_slope_angle
			&& record.climb <= self.max_climb_height
			&& record.drop <= self.max_drop_height
	}
}

/// What a traveling unit brings to a walkability query
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Reflect)]
pub struct UnitProfile {
	/// Attributes of the unit, dynamic obstacles excepting any of them are
	/// ignored
	pub attributes: AttributeMask,
	/// Radius of the unit, cells with less clearance are rejected
	pub radius: f32,
	/// Height tolerances, evaluated against rich cells
	pub capabilities: HeightCapabilities,
}

impl UnitProfile {
	/// Create a new instance of [UnitProfile]
	pub fn new(attributes: AttributeMask, radius: f32, capabilities: HeightCapabilities) -> Self {
		UnitProfile {
			attributes,
			radius,
			capabilities,
		}
	}
}

/// Immutable description of a matrix
#[cfg_attr(
	feature = "serde",
	derive(serde::Deserialize, serde::Serialize),
	serde(default)
)]
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct MatrixConfig {
	/// World position of the centre of the matrix. The `y` component is the
	/// default height of any lattice sample that has not been recorded
	pub origin: Vec3,
	/// Number of cells along `x`
	pub columns: usize,
	/// Number of cells along `z`
	pub rows: usize,
	/// Length of a cell side in world units
	pub cell_size: f32,
	/// Distance between height lattice samples, at most `cell_size`
	pub height_granularity: f32,
	/// Radius used when probing a cell for blocking geometry, also the
	/// perpendicular offset of the side lines sampled for height settings
	pub obstacle_sensitivity_range: f32,
	/// How height differences are classified
	pub height_mode: HeightMode,
	/// How the height lattice is stored
	pub lookup_strategy: HeightLookupStrategy,
	/// Whether cells carry a clearance value
	pub generate_clearance: bool,
	/// Matrix wide tolerances, used by [HeightMode::Standard] and by the
	/// clearance provider
	pub capabilities: HeightCapabilities,
	/// Height deltas between consecutive lattice samples at or below this
	/// are treated as noise rather than a climb or drop
	pub ledge_threshold: f32,
	/// Number of cells along one side of a grid section
	pub section_size: usize,
}

impl Default for MatrixConfig {
	fn default() -> Self {
		MatrixConfig {
			origin: Vec3::ZERO,
			columns: 10,
			rows: 10,
			cell_size: 1.0,
			height_granularity: 0.5,
			obstacle_sensitivity_range: 0.25,
			height_mode: HeightMode::default(),
			lookup_strategy: HeightLookupStrategy::default(),
			generate_clearance: true,
			capabilities: HeightCapabilities::default(),
			ledge_threshold: 0.05,
			section_size: DEFAULT_SECTION_SIZE,
		}
	}
}

impl MatrixConfig {
	/// Create a new instance of [MatrixConfig] centred on `origin`. Panics
	/// if the matrix would be empty or the cell size is not positive
	pub fn new(origin: Vec3, columns: usize, rows: usize, cell_size: f32) -> Self {
		let config = MatrixConfig {
			origin,
			columns,
			rows,
			cell_size,
			height_granularity: cell_size / 2.0,
			obstacle_sensitivity_range: cell_size / 4.0,
			..Default::default()
		};
		config.validate();
		config
	}
	/// Set the lattice sampling distance
	pub fn with_height_granularity(mut self, granularity: f32) -> Self {
		self.height_granularity = granularity;
		self.validate();
		self
	}
	/// Set the probe radius and side line offset
	pub fn with_obstacle_sensitivity_range(mut self, range: f32) -> Self {
		self.obstacle_sensitivity_range = range;
		self
	}
	/// Set how height is classified
	pub fn with_height_mode(mut self, mode: HeightMode) -> Self {
		self.height_mode = mode;
		self
	}
	/// Set how the lattice is stored
	pub fn with_lookup_strategy(mut self, strategy: HeightLookupStrategy) -> Self {
		self.lookup_strategy = strategy;
		self
	}
	/// Enable or disable clearance
	pub fn with_clearance(mut self, generate_clearance: bool) -> Self {
		self.generate_clearance = generate_clearance;
		self
	}
	/// Set the matrix wide height tolerances
	pub fn with_capabilities(mut self, capabilities: HeightCapabilities) -> Self {
		self.capabilities = capabilities;
		self
	}
	/// Set the noise threshold for ledges
	pub fn with_ledge_threshold(mut self, threshold: f32) -> Self {
		self.ledge_threshold = threshold;
		self
	}
	/// Set the side length of grid sections
	pub fn with_section_size(mut self, section_size: usize) -> Self {
		self.section_size = section_size;
		self.validate();
		self
	}
	/// Panics when the config cannot describe a matrix
	pub fn validate(&self) {
		if self.columns == 0 || self.rows == 0 {
			panic!(
				"Matrix dimensions `({}, {})` are invalid, a matrix needs at least one column and one row",
				self.columns, self.rows
			);
		}
		if self.cell_size <= 0.0 {
			panic!("Cell size must be positive, found {}", self.cell_size);
		}
		if self.height_granularity <= 0.0 || self.height_granularity > self.cell_size {
			panic!(
				"Height granularity must be in the range (0, {}], found {}",
				self.cell_size, self.height_granularity
			);
		}
		if self.section_size == 0 {
			panic!("Grid sections must span at least one cell");
		}
	}
	/// World position of the `(-x, -z)` corner of the matrix
	pub fn start(&self) -> Vec3 {
		Vec3::new(
			self.origin.x - self.columns as f32 * self.cell_size / 2.0,
			self.origin.y,
			self.origin.z - self.rows as f32 * self.cell_size / 2.0,
		)
	}
	/// Number of lattice samples along `x`, both matrix edges included
	pub fn lattice_columns(&self) -> usize {
		(self.columns as f32 * self.cell_size / self.height_granularity).ceil() as usize + 1
	}
	/// Number of lattice samples along `z`, both matrix edges included
	pub fn lattice_rows(&self) -> usize {
		(self.rows as f32 * self.cell_size / self.height_granularity).ceil() as usize + 1
	}
	/// Total number of lattice samples
	pub fn lattice_count(&self) -> usize {
		self.lattice_columns() * self.lattice_rows()
	}
	/// The world space rectangle covered by the matrix
	pub fn world_bounds(&self) -> WorldBounds {
		WorldBounds::new(
			self.origin,
			self.columns as f32 * self.cell_size / 2.0,
			self.rows as f32 * self.cell_size / 2.0,
		)
	}
	/// From a `ron` file generate the [MatrixConfig]
	#[cfg(feature = "ron")]
	pub fn from_ron(path: String) -> Self {
		let file = std::fs::File::open(&path).expect("Failed opening MatrixConfig file");
		let config: MatrixConfig = match ron::de::from_reader(file) {
			Ok(config) => config,
			Err(e) => panic!("Failed deserializing MatrixConfig {}: {}", path, e),
		};
		config.validate();
		config
	}
}

// #[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn valid_config() {
		let config = MatrixConfig::new(Vec3::ZERO, 10, 20, 2.0);
		assert_eq!(Vec3::new(-10.0, 0.0, -20.0), config.start());
	}
	#[test]
	#[should_panic]
	fn zero_columns() {
		MatrixConfig::new(Vec3::ZERO, 0, 20, 2.0);
	}
	#[test]
	#[should_panic]
	fn negative_cell_size() {
		MatrixConfig::new(Vec3::ZERO, 5, 5, -1.0);
	}
	#[test]
	#[should_panic]
	fn granularity_larger_than_cell() {
		MatrixConfig::new(Vec3::ZERO, 5, 5, 1.0).with_height_granularity(1.5);
	}
	#[test]
	fn lattice_dimensions() {
		let config = MatrixConfig::new(Vec3::ZERO, 10, 4, 2.0).with_height_granularity(0.5);
		assert_eq!(41, config.lattice_columns());
		assert_eq!(17, config.lattice_rows());
		assert_eq!(41 * 17, config.lattice_count());
	}
	#[test]
	fn capabilities_ignore_height_at_ninety() {
		let caps = HeightCapabilities::new(90.0, 0.0, 0.0);
		assert!(caps.ignores_height());
		assert!(!HeightCapabilities::default().ignores_height());
	}
	#[test]
	fn capabilities_allow_record() {
		let caps = HeightCapabilities::new(30.0, 0.5, 1.0);
		let record = HeightRecord::new(20.0, 0.4, 0.9);
		assert!(caps.allows(&record));
		let record = HeightRecord::new(20.0, 0.6, 0.0);
		assert!(!caps.allows(&record));
		let record = HeightRecord::new(45.0, 0.0, 0.0);
		assert!(!caps.allows(&record));
	}
	#[test]
	#[cfg(feature = "ron")]
	fn config_file_ron() {
		let path = env!("CARGO_MANIFEST_DIR").to_string() + "/assets/matrix_config.ron";
		let config = MatrixConfig::from_ron(path);
		assert_eq!(20, config.columns);
		assert_eq!(HeightMode::Rich, config.height_mode);
		assert_eq!(Vec3::new(0.0, 2.0, -12.0), config.start());
		// unspecified fields keep their defaults
		assert_eq!(DEFAULT_SECTION_SIZE, config.section_size);
	}
}
