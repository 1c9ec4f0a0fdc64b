//! Map raster and calibration
//!
//! Maps use the ROS map_server layout: a descriptor `map.yaml` next to the
//! raster it names.
//!
//! ```yaml
//! image: map_small_warehouse.png
//! resolution: 0.05        # meters per pixel
//! origin: [-6.0, -6.0, 0.0]
//! ```
//!
//! ## Calibration convention
//!
//! Simulation coordinates are mapped to pixel space by subtracting the
//! origin, dividing by the resolution, keeping (x, y), and flipping the
//! vertical axis against the image height: `py = height - y`. Image rows
//! grow downwards while simulation y grows upwards.

use std::path::{Path, PathBuf};

use image::RgbImage;
use serde::Deserialize;
use tracing::debug;

use crate::{Error, Result};

/// Descriptor file name inside a map directory.
pub const MAP_DESCRIPTOR: &str = "map.yaml";

/// Map descriptor (ROS map_server format).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MapDescriptor {
    /// Raster file name, relative to the descriptor
    pub image: String,
    /// Meters per pixel
    pub resolution: f64,
    /// World coordinates of the bottom-left pixel (`[x, y, yaw]`)
    pub origin: Vec<f64>,
}

/// Simulation → pixel transform of one map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    resolution: f64,
    origin: [f64; 2],
    height: f64,
}

impl Calibration {
    /// Create a calibration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the resolution is not positive.
    pub fn new(resolution: f64, origin: [f64; 2], height: f64) -> Result<Self> {
        if !(resolution > 0.0 && resolution.is_finite()) {
            return Err(Error::InvalidInput(format!(
                "Map resolution must be positive, got {resolution}"
            )));
        }
        Ok(Self {
            resolution,
            origin,
            height,
        })
    }

    /// Meters per pixel.
    #[must_use]
    pub const fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Image height in pixels used for the vertical flip.
    #[must_use]
    pub const fn height(&self) -> f64 {
        self.height
    }

    /// Convert a simulation coordinate (`[x, y, ...]`) to pixel space.
    ///
    /// Components past the second are ignored. Returns `None` for
    /// coordinates with fewer than two components.
    #[must_use]
    pub fn to_pixel(&self, coord: &[f64]) -> Option<(f64, f64)> {
        let (&x, &y) = (coord.first()?, coord.get(1)?);
        let px = (x - self.origin[0]) / self.resolution;
        let py = (y - self.origin[1]) / self.resolution;
        Some((px, self.height - py))
    }

    /// Convert every coordinate of a trajectory, skipping malformed ones.
    #[must_use]
    pub fn path_to_pixels(&self, path: &[Vec<f64>]) -> Vec<(f64, f64)> {
        path.iter().filter_map(|c| self.to_pixel(c)).collect()
    }

    /// Convert a length in meters to pixels.
    #[must_use]
    pub fn meters_to_pixels(&self, meters: f64) -> f64 {
        meters / self.resolution
    }
}

/// Map raster plus calibration.
#[derive(Debug, Clone)]
pub struct Map {
    name: String,
    pixels: RgbImage,
    calibration: Calibration,
}

impl Map {
    /// Create a map from an in-memory raster.
    ///
    /// # Errors
    ///
    /// Returns error if the resolution is not positive.
    pub fn from_image(
        name: impl Into<String>,
        pixels: RgbImage,
        resolution: f64,
        origin: [f64; 2],
    ) -> Result<Self> {
        let calibration = Calibration::new(resolution, origin, f64::from(pixels.height()))?;
        Ok(Self {
            name: name.into(),
            pixels,
            calibration,
        })
    }

    /// Load `<maps_dir>/<name>/map.yaml` and its raster.
    ///
    /// # Errors
    ///
    /// Returns error if the descriptor or image cannot be read, or the
    /// origin has fewer than two components.
    pub fn load<P: AsRef<Path>>(maps_dir: P, name: &str) -> Result<Self> {
        let map_dir: PathBuf = maps_dir.as_ref().join(name);
        let descriptor_path = map_dir.join(MAP_DESCRIPTOR);
        let content = std::fs::read_to_string(&descriptor_path).map_err(|e| {
            Error::Config(format!(
                "Failed to read map descriptor {}: {e}",
                descriptor_path.display()
            ))
        })?;
        let descriptor: MapDescriptor = serde_yaml::from_str(&content)?;

        let [ox, oy] = match descriptor.origin.as_slice() {
            [x, y, ..] => [*x, *y],
            _ => {
                return Err(Error::Config(format!(
                    "Map origin needs at least two components: {:?}",
                    descriptor.origin
                )))
            }
        };

        let image_path = map_dir.join(&descriptor.image);
        let pixels = image::open(&image_path)?.into_rgb8();
        debug!(
            map = name,
            width = pixels.width(),
            height = pixels.height(),
            resolution = descriptor.resolution,
            "Loaded map"
        );

        Self::from_image(name, pixels, descriptor.resolution, [ox, oy])
    }

    /// Get the map name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the raster.
    #[must_use]
    pub const fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    /// Get the calibration.
    #[must_use]
    pub const fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Raster size in pixels.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_pixel_subtracts_origin_and_flips() {
        let cal = Calibration::new(0.5, [-1.0, -2.0], 100.0).unwrap();
        let (px, py) = cal.to_pixel(&[1.0, 3.0, 0.7]).unwrap();
        assert!((px - 4.0).abs() < 1e-12);
        assert!((py - 90.0).abs() < 1e-12);
    }

    #[test]
    fn test_to_pixel_is_pure_and_does_not_accumulate_offset() {
        let cal = Calibration::new(1.0, [0.0, 0.0], 50.0).unwrap();
        let point = [7.0, 12.0];

        let once = cal.to_pixel(&point).unwrap();
        assert_eq!(cal.to_pixel(&point).unwrap(), once);

        // Flipping the flipped point lands back on the input, so the
        // height offset is applied exactly once per call.
        let twice = cal.to_pixel(&[once.0, once.1]).unwrap();
        assert_eq!(twice, (7.0, 12.0));
    }

    #[test]
    fn test_to_pixel_needs_two_components() {
        let cal = Calibration::new(1.0, [0.0, 0.0], 10.0).unwrap();
        assert!(cal.to_pixel(&[1.0]).is_none());
        assert_eq!(cal.path_to_pixels(&[vec![1.0], vec![1.0, 1.0]]), vec![(1.0, 9.0)]);
    }

    #[test]
    fn test_calibration_rejects_bad_resolution() {
        assert!(Calibration::new(0.0, [0.0, 0.0], 10.0).is_err());
        assert!(Calibration::new(f64::NAN, [0.0, 0.0], 10.0).is_err());
    }

    #[test]
    fn test_load_map_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let map_dir = dir.path().join("arena");
        std::fs::create_dir_all(&map_dir).unwrap();
        RgbImage::new(8, 6).save(map_dir.join("arena.png")).unwrap();
        std::fs::write(
            map_dir.join(MAP_DESCRIPTOR),
            "image: arena.png\nresolution: 0.25\norigin: [1.0, 1.0, 0.0]\n",
        )
        .unwrap();

        let map = Map::load(dir.path(), "arena").unwrap();
        assert_eq!(map.dimensions(), (8, 6));
        assert_eq!(map.calibration().to_pixel(&[1.0, 1.0]), Some((0.0, 6.0)));
    }
}
