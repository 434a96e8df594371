//! Heightmap Seed
//!
//! Optional grayscale image used as an extra elevation layer under the
//! procedural noise. Pixel luma maps to [0, 1] and the image is stretched over
//! a world-space rectangle centered on the origin. Loading problems are never
//! fatal: callers get `None` and the terrain stays purely procedural.

use std::path::Path;

use glam::Vec2;
use image::DynamicImage;

use crate::error::{ConfigError, TerrainError};
use crate::telemetry::{Telemetry, TelemetryEvent};

/// Normalized elevation samples decoded from an image.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightmapSeed {
    width: u32,
    height: u32,
    values: Vec<f32>,
    /// World size covered by the image (x, z)
    extent: Vec2,
}

impl HeightmapSeed {
    /// Read and decode an image file.
    pub fn load(path: impl AsRef<Path>, extent: Vec2) -> Result<Self, TerrainError> {
        Self::validate_extent(extent)?;
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_bytes(&bytes, extent)
    }

    /// Decode an in-memory PNG or JPEG.
    pub fn from_bytes(bytes: &[u8], extent: Vec2) -> Result<Self, TerrainError> {
        let image = image::load_from_memory(bytes)?;
        Self::from_image(&image, extent)
    }

    pub fn from_image(image: &DynamicImage, extent: Vec2) -> Result<Self, TerrainError> {
        Self::validate_extent(extent)?;
        let luma = image.to_luma16();
        let (width, height) = luma.dimensions();
        if width == 0 || height == 0 {
            return Err(TerrainError::EmptyHeightmap { width, height });
        }
        let values = luma
            .pixels()
            .map(|p| p.0[0] as f32 / u16::MAX as f32)
            .collect();
        log::info!("heightmap seed loaded: {width}x{height}");
        Ok(Self {
            width,
            height,
            values,
            extent,
        })
    }

    /// The world rectangle must have positive, finite sides.
    pub fn validate_extent(extent: Vec2) -> Result<(), ConfigError> {
        if extent.is_finite() && extent.x > 0.0 && extent.y > 0.0 {
            Ok(())
        } else {
            Err(ConfigError::Invalid(format!(
                "heightmap extent must be positive, got {} x {}",
                extent.x, extent.y
            )))
        }
    }

    /// Try to load `path`; on failure report it and return `None`.
    pub fn load_or_report(
        path: impl AsRef<Path>,
        extent: Vec2,
        telemetry: &mut dyn Telemetry,
    ) -> Option<Self> {
        match Self::load(path.as_ref(), extent) {
            Ok(seed) => Some(seed),
            Err(err) => {
                telemetry.record(TelemetryEvent::HeightmapFallback(format!(
                    "{}: {err}",
                    path.as_ref().display()
                )));
                None
            }
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn pixel(&self, px: u32, py: u32) -> f32 {
        let i = py.min(self.height - 1) as usize * self.width as usize + px.min(self.width - 1) as usize;
        self.values.get(i).copied().unwrap_or(0.0)
    }

    /// Bilinear sample in [0, 1] at world (x, z); edges extend outward.
    pub fn sample(&self, x: f32, z: f32) -> f32 {
        let u = (x / self.extent.x + 0.5).clamp(0.0, 1.0);
        let v = (z / self.extent.y + 0.5).clamp(0.0, 1.0);
        let fx = u * (self.width - 1) as f32;
        let fy = v * (self.height - 1) as f32;
        let x0 = fx.floor() as u32;
        let y0 = fy.floor() as u32;
        let tx = fx - x0 as f32;
        let ty = fy - y0 as f32;

        let top = self.pixel(x0, y0) + (self.pixel(x0 + 1, y0) - self.pixel(x0, y0)) * tx;
        let bottom = self.pixel(x0, y0 + 1) + (self.pixel(x0 + 1, y0 + 1) - self.pixel(x0, y0 + 1)) * tx;
        top + (bottom - top) * ty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::RecordingTelemetry;
    use image::{GrayImage, Luma};

    fn gradient_image() -> DynamicImage {
        // Brightness grows with x: 0 on the left column, 255 on the right
        DynamicImage::ImageLuma8(GrayImage::from_fn(5, 3, |x, _| Luma([(x * 255 / 4) as u8])))
    }

    #[test]
    fn test_luma_normalized() {
        let seed = HeightmapSeed::from_image(&gradient_image(), Vec2::splat(10.0)).unwrap();
        assert_eq!(seed.dimensions(), (5, 3));
        assert!(seed.sample(-5.0, 0.0).abs() < 1e-6);
        assert!((seed.sample(5.0, 0.0) - 1.0).abs() < 1e-6);
        assert!((seed.sample(0.0, 0.0) - 127.0 / 255.0).abs() < 1e-2);
    }

    #[test]
    fn test_sample_clamps_outside_extent() {
        let seed = HeightmapSeed::from_image(&gradient_image(), Vec2::splat(10.0)).unwrap();
        assert_eq!(seed.sample(50.0, 50.0), seed.sample(5.0, 5.0));
    }

    #[test]
    fn test_rejects_degenerate_extent() {
        for extent in [Vec2::ZERO, Vec2::new(10.0, 0.0), Vec2::new(-1.0, 4.0), Vec2::splat(f32::NAN)] {
            let result = HeightmapSeed::from_image(&gradient_image(), extent);
            assert!(
                matches!(result, Err(TerrainError::Config(ConfigError::Invalid(_)))),
                "extent {extent} should be rejected"
            );
        }
        assert!(HeightmapSeed::validate_extent(Vec2::new(0.5, 2.0)).is_ok());
    }

    #[test]
    fn test_zero_extent_load_is_reported() {
        let mut telemetry = RecordingTelemetry::new();
        let seed = HeightmapSeed::load_or_report("unused.png", Vec2::ZERO, &mut telemetry);
        assert!(seed.is_none());
        assert!(matches!(
            telemetry.events.as_slice(),
            [TelemetryEvent::HeightmapFallback(msg)] if msg.contains("extent")
        ));
    }

    #[test]
    fn test_garbage_bytes_fail() {
        let result = HeightmapSeed::from_bytes(b"not an image", Vec2::ONE);
        assert!(matches!(result, Err(TerrainError::Image(_))));
    }

    #[test]
    fn test_missing_file_reports_fallback() {
        let mut telemetry = RecordingTelemetry::new();
        let seed = HeightmapSeed::load_or_report(
            "/definitely/not/here/heightmap.png",
            Vec2::ONE,
            &mut telemetry,
        );
        assert!(seed.is_none());
        assert!(matches!(
            telemetry.events.as_slice(),
            [TelemetryEvent::HeightmapFallback(_)]
        ));
    }
}
