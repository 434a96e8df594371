//! Height Field
//!
//! Dense row-major elevation grid. Rows run along world Z, columns along
//! world X, and the [`GridTransform`] it carries is the same one the mesh and
//! the collision heightfield are built from.

use glam::Vec2;

use crate::error::BridgeError;
use crate::world::GridTransform;

/// Anything that can answer "how high is the ground at (x, z)".
pub trait TerrainQuery {
    fn height_at(&self, x: f32, z: f32) -> f32;

    /// Central-difference gradient `(dh/dx, dh/dz)` using four samples.
    fn gradient_at(&self, x: f32, z: f32, epsilon: f32) -> Vec2 {
        let e = epsilon.max(1e-5);
        let hx0 = self.height_at(x - e, z);
        let hx1 = self.height_at(x + e, z);
        let hz0 = self.height_at(x, z - e);
        let hz1 = self.height_at(x, z + e);
        Vec2::new((hx1 - hx0) / (2.0 * e), (hz1 - hz0) / (2.0 * e))
    }
}

/// Synthesized elevation samples on a grid.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightField {
    grid: GridTransform,
    samples: Vec<f32>,
}

impl HeightField {
    /// Evaluate `height(x, z)` at every grid vertex.
    pub fn from_fn(grid: GridTransform, mut height: impl FnMut(f32, f32) -> f32) -> Self {
        let mut samples = Vec::with_capacity(grid.sample_count());
        for row in 0..grid.rows {
            for col in 0..grid.cols {
                let p = grid.world_position(row, col);
                samples.push(height(p.x, p.y));
            }
        }
        Self { grid, samples }
    }

    /// Constant-height field.
    pub fn flat(grid: GridTransform, height: f32) -> Self {
        Self {
            samples: vec![height; grid.sample_count()],
            grid,
        }
    }

    /// Wrap samples after checking shape and values.
    pub fn from_samples(grid: GridTransform, samples: Vec<f32>) -> Result<Self, BridgeError> {
        let field = Self { grid, samples };
        field.validate()?;
        Ok(field)
    }

    /// Build from nested rows, centered on the origin.
    pub fn from_rows(rows: &[Vec<f32>], cell_size: f32) -> Result<Self, BridgeError> {
        let cols = rows.first().map_or(0, Vec::len);
        let expected = rows.len() * cols;
        let actual: usize = rows.iter().map(Vec::len).sum();
        if rows.iter().any(|r| r.len() != cols) {
            return Err(BridgeError::NonRectangular { expected, actual });
        }
        let grid = GridTransform::centered(cols, rows.len(), cell_size);
        Self::from_samples(grid, rows.concat())
    }

    /// Wrap samples without any checks. The bridge validates before use.
    pub fn from_raw(grid: GridTransform, samples: Vec<f32>) -> Self {
        Self { grid, samples }
    }

    /// Shape and value checks required before building a collision shape.
    pub fn validate(&self) -> Result<(), BridgeError> {
        let expected = self.grid.sample_count();
        if self.samples.len() != expected {
            return Err(BridgeError::NonRectangular {
                expected,
                actual: self.samples.len(),
            });
        }
        if self.grid.rows < 2 || self.grid.cols < 2 {
            return Err(BridgeError::TooSmall {
                rows: self.grid.rows,
                cols: self.grid.cols,
            });
        }
        if let Some(i) = self.samples.iter().position(|h| !h.is_finite()) {
            return Err(BridgeError::NonFinite {
                row: i / self.grid.cols,
                col: i % self.grid.cols,
            });
        }
        Ok(())
    }

    pub fn grid(&self) -> &GridTransform {
        &self.grid
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample at vertex (row, col), `None` outside the grid.
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.grid.rows || col >= self.grid.cols {
            return None;
        }
        self.samples.get(self.grid.index(row, col)).copied()
    }

    /// Bilinear interpolation at world (x, z), clamped to the grid edges.
    pub fn sample_at(&self, x: f32, z: f32) -> f32 {
        if self.grid.rows == 0 || self.grid.cols == 0 || self.samples.is_empty() {
            return 0.0;
        }
        let max_col = (self.grid.cols - 1) as f32;
        let max_row = (self.grid.rows - 1) as f32;
        let g = self.grid.grid_coords(x, z);
        let gx = g.x.clamp(0.0, max_col);
        let gz = g.y.clamp(0.0, max_row);

        let c0 = gx.floor() as usize;
        let r0 = gz.floor() as usize;
        let c1 = (c0 + 1).min(self.grid.cols - 1);
        let r1 = (r0 + 1).min(self.grid.rows - 1);
        let tx = gx - c0 as f32;
        let tz = gz - r0 as f32;

        let h = |r, c| self.get(r, c).unwrap_or(0.0);
        let top = h(r0, c0) + (h(r0, c1) - h(r0, c0)) * tx;
        let bottom = h(r1, c0) + (h(r1, c1) - h(r1, c0)) * tx;
        top + (bottom - top) * tz
    }

    pub fn min_height(&self) -> f32 {
        self.samples.iter().copied().fold(f32::INFINITY, f32::min)
    }

    pub fn max_height(&self) -> f32 {
        self.samples.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }
}

impl TerrainQuery for HeightField {
    fn height_at(&self, x: f32, z: f32) -> f32 {
        self.sample_at(x, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> HeightField {
        // h = x, so the gradient is (1, 0) everywhere
        HeightField::from_fn(GridTransform::square(9, 0.5), |x, _| x)
    }

    #[test]
    fn test_from_fn_row_major() {
        let grid = GridTransform::centered(3, 2, 1.0);
        let field = HeightField::from_fn(grid, |x, z| x * 10.0 + z);
        assert_eq!(field.samples().len(), 6);
        assert_eq!(field.get(0, 2), Some(1.0 * 10.0 - 0.5));
        assert_eq!(field.get(1, 0), Some(-10.0 + 0.5));
        assert_eq!(field.get(2, 0), None);
    }

    #[test]
    fn test_bilinear_matches_vertices() {
        let field = ramp();
        let grid = *field.grid();
        for (row, col) in [(0, 0), (3, 5), (8, 8)] {
            let p = grid.world_position(row, col);
            assert!((field.sample_at(p.x, p.y) - field.get(row, col).unwrap()).abs() < 1e-6);
        }
        assert!((field.sample_at(0.25, 0.0) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_sample_clamps_outside() {
        let field = ramp();
        assert!((field.sample_at(100.0, 0.0) - 2.0).abs() < 1e-6);
        assert!((field.sample_at(-100.0, 0.0) + 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_gradient_on_ramp() {
        let g = ramp().gradient_at(0.3, -0.7, 0.05);
        assert!((g.x - 1.0).abs() < 1e-4);
        assert!(g.y.abs() < 1e-4);
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        let rows = vec![vec![0.0, 0.0, 0.0], vec![0.0, 0.0]];
        assert_eq!(
            HeightField::from_rows(&rows, 1.0),
            Err(BridgeError::NonRectangular {
                expected: 6,
                actual: 5
            })
        );
    }

    #[test]
    fn test_validate_errors() {
        let grid = GridTransform::square(3, 1.0);
        let mut samples = vec![0.0; 9];
        samples[5] = f32::NAN;
        assert_eq!(
            HeightField::from_raw(grid, samples).validate(),
            Err(BridgeError::NonFinite { row: 1, col: 2 })
        );

        let tiny = GridTransform::square(1, 1.0);
        assert_eq!(
            HeightField::from_raw(tiny, vec![0.0]).validate(),
            Err(BridgeError::TooSmall { rows: 1, cols: 1 })
        );
    }

    #[test]
    fn test_min_max() {
        let field = ramp();
        assert_eq!(field.min_height(), -2.0);
        assert_eq!(field.max_height(), 2.0);
    }
}
