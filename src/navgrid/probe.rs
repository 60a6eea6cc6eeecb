//! The matrix never looks at scene geometry directly, instead it asks a
//! [GroundProbe] for the height of the ground and whether a spot is blocked.
//! Hosts back the probe with their collision world (ray casts, capsule
//! checks, etc).
//!

use bevy::prelude::*;

/// Answers geometry questions about the scene. Answers must be
/// deterministic for the same input so that incremental and all-at-once
/// construction agree
pub trait GroundProbe {
	/// Height of the ground below/at `position`
	fn sample_ground_height(&self, position: Vec3) -> f32;
	/// Whether an obstacle occupies the area within `threshold_radius` of
	/// `position`
	fn is_blocked(&self, position: Vec3, threshold_radius: f32) -> bool;
}

impl<P: GroundProbe + ?Sized> GroundProbe for &P {
	fn sample_ground_height(&self, position: Vec3) -> f32 {
		(**self).sample_ground_height(position)
	}
	fn is_blocked(&self, position: Vec3, threshold_radius: f32) -> bool {
		(**self).is_blocked(position, threshold_radius)
	}
}

impl<P: GroundProbe + ?Sized> GroundProbe for Box<P> {
	fn sample_ground_height(&self, position: Vec3) -> f32 {
		(**self).sample_ground_height(position)
	}
	fn is_blocked(&self, position: Vec3, threshold_radius: f32) -> bool {
		(**self).is_blocked(position, threshold_radius)
	}
}

/// A probe describing an endless flat plane at `height` with no obstacles
#[derive(Debug, Default, Clone, Copy)]
pub struct FlatGroundProbe {
	/// Height of the plane
	pub height: f32,
}

impl FlatGroundProbe {
	/// Create a new instance of [FlatGroundProbe]
	pub fn new(height: f32) -> Self {
		FlatGroundProbe { height }
	}
}

impl GroundProbe for FlatGroundProbe {
	fn sample_ground_height(&self, _position: Vec3) -> f32 {
		self.height
	}
	fn is_blocked(&self, _position: Vec3, _threshold_radius: f32) -> bool {
		false
	}
}

/// Adapts a pair of closures into a [GroundProbe]
pub struct FnGroundProbe<H, B>
where
	H: Fn(Vec3) -> f32,
	B: Fn(Vec3, f32) -> bool,
{
	/// Height sampling
	height: H,
	/// Obstacle test
	blocked: B,
}

impl<H, B> FnGroundProbe<H, B>
where
	H: Fn(Vec3) -> f32,
	B: Fn(Vec3, f32) -> bool,
{
	/// Create a new instance of [FnGroundProbe]
	pub fn new(height: H, blocked: B) -> Self {
		FnGroundProbe { height, blocked }
	}
}

impl<H, B> GroundProbe for FnGroundProbe<H, B>
where
	H: Fn(Vec3) -> f32,
	B: Fn(Vec3, f32) -> bool,
{
	fn sample_ground_height(&self, position: Vec3) -> f32 {
		(self.height)(position)
	}
	fn is_blocked(&self, position: Vec3, threshold_radius: f32) -> bool {
		(self.blocked)(position, threshold_radius)
	}
}

/// A probe reading heights from a greyscale image where white is the
/// highest point. Anything above `blocked_above` counts as an obstacle
#[cfg(feature = "heightmap")]
#[derive(Debug, Clone)]
pub struct HeightmapProbe {
	/// Heights in row-major order, row `0` is the `-z` edge of the world
	heights: Vec<f32>,
	/// Pixel columns
	width: usize,
	/// Pixel rows
	depth: usize,
	/// World position of the `(-x, -z)` corner of the image
	start: Vec3,
	/// World length and depth the image is stretched over
	world_size: Vec2,
	/// Heights above this block movement
	blocked_above: f32,
}

#[cfg(feature = "heightmap")]
impl HeightmapProbe {
	/// Create a [HeightmapProbe] from a greyscale image. The image is centred
	/// on `origin` and stretched over `world_size`, black maps to
	/// `origin.y` and white to `origin.y + max_height`
	pub fn from_image(
		path: String,
		origin: Vec3,
		world_size: Vec2,
		max_height: f32,
		blocked_above: f32,
	) -> Self {
		use photon_rs::native::open_image;
		let img = open_image(&path).expect("Failed to open heightmap");
		let width = img.get_width() as usize;
		let depth = img.get_height() as usize;
		let raw_pixels = img.get_raw_pixels();
		// raw pixels are arranged from the top left of the image and come in sets of either 3 or 4 (if alpha channel is inlcuded)
		let chunk_size = if width * depth * 4 == raw_pixels.len() {
			4
		} else {
			3
		};
		let mut heights = Vec::with_capacity(width * depth);
		for px in raw_pixels.chunks(chunk_size) {
			let colour_avg = (px[0] as f32 + px[1] as f32 + px[2] as f32) / 3.0;
			heights.push(origin.y + colour_avg / 255.0 * max_height);
		}
		debug!("Loaded heightmap {} with {}x{} pixels", path, width, depth);
		HeightmapProbe {
			heights,
			width,
			depth,
			start: Vec3::new(
				origin.x - world_size.x / 2.0,
				origin.y,
				origin.z - world_size.y / 2.0,
			),
			world_size,
			blocked_above,
		}
	}
	/// The pixel under `position`, clamped to the image
	fn pixel(&self, position: Vec3) -> (usize, usize) {
		let u = ((position.x - self.start.x) / self.world_size.x * self.width as f32).floor();
		let v = ((position.z - self.start.z) / self.world_size.y * self.depth as f32).floor();
		let column = (u.max(0.0) as usize).min(self.width - 1);
		let row = (v.max(0.0) as usize).min(self.depth - 1);
		(column, row)
	}
}

#[cfg(feature = "heightmap")]
impl GroundProbe for HeightmapProbe {
	fn sample_ground_height(&self, position: Vec3) -> f32 {
		let (column, row) = self.pixel(position);
		self.heights[row * self.width + column]
	}
	fn is_blocked(&self, position: Vec3, threshold_radius: f32) -> bool {
		// test the centre and the four extremes of the radius
		let offsets = [
			Vec3::ZERO,
			Vec3::new(threshold_radius, 0.0, 0.0),
			Vec3::new(-threshold_radius, 0.0, 0.0),
			Vec3::new(0.0, 0.0, threshold_radius),
			Vec3::new(0.0, 0.0, -threshold_radius),
		];
		offsets
			.iter()
			.any(|o| self.sample_ground_height(position + *o) > self.blocked_above)
	}
}

// #[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn flat_probe() {
		let probe = FlatGroundProbe::new(3.0);
		assert_eq!(3.0, probe.sample_ground_height(Vec3::new(100.0, 0.0, -4.0)));
		assert!(!probe.is_blocked(Vec3::ZERO, 10.0));
	}
	#[test]
	fn closure_probe() {
		let probe = FnGroundProbe::new(|p: Vec3| p.x * 2.0, |p: Vec3, _r: f32| p.z > 1.0);
		assert_eq!(4.0, probe.sample_ground_height(Vec3::new(2.0, 0.0, 0.0)));
		assert!(probe.is_blocked(Vec3::new(0.0, 0.0, 2.0), 0.5));
		assert!(!probe.is_blocked(Vec3::new(0.0, 0.0, 0.5), 0.5));
	}
	#[test]
	fn boxed_probe_delegates() {
		let probe: Box<dyn GroundProbe> = Box::new(FlatGroundProbe::new(-1.0));
		assert_eq!(-1.0, probe.sample_ground_height(Vec3::ZERO));
	}
}
