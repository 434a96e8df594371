//! Grid Transform Module
//!
//! The one place that maps between height-field grid indices and world
//! space. Both the terrain mesh and the collision heightfield are built from
//! the same [`GridTransform`], so the visible and the collidable terrain can
//! never disagree on origin or spacing.
//!
//! ## Conventions
//! - Row index runs along world Z, column index along world X
//! - Vertex `(row, col)` sits at `origin + (col * cell_size, row * cell_size)`
//! - A centered grid has `origin = -((n - 1) * cell_size) / 2` on both axes

use glam::{Vec2, Vec3};

/// Grid-to-world mapping shared by mesh construction and the physics bridge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridTransform {
    /// Vertices along X
    pub cols: usize,
    /// Vertices along Z
    pub rows: usize,
    /// World units between neighbouring vertices
    pub cell_size: f32,
    /// World-space (x, z) of vertex (0, 0)
    pub origin: Vec2,
}

impl Default for GridTransform {
    fn default() -> Self {
        Self::square(65, 1.0)
    }
}

impl GridTransform {
    /// Create a grid centered on the world origin.
    pub fn centered(cols: usize, rows: usize, cell_size: f32) -> Self {
        Self {
            cols,
            rows,
            cell_size,
            origin: Vec2::new(
                centered_origin(cols, cell_size),
                centered_origin(rows, cell_size),
            ),
        }
    }

    /// Square centered grid with `resolution` vertices per side.
    pub fn square(resolution: usize, cell_size: f32) -> Self {
        Self::centered(resolution, resolution, cell_size)
    }

    /// Square centered grid covering `size` world units per side.
    pub fn covering(size: f32, resolution: usize) -> Self {
        let cells = resolution.saturating_sub(1).max(1);
        Self::square(resolution, size / cells as f32)
    }

    pub fn sample_count(&self) -> usize {
        self.cols * self.rows
    }

    /// World-space size of the grid (x extent, z extent).
    pub fn extent(&self) -> Vec2 {
        Vec2::new(
            self.cols.saturating_sub(1) as f32 * self.cell_size,
            self.rows.saturating_sub(1) as f32 * self.cell_size,
        )
    }

    /// World-space (x, z) of the grid center.
    pub fn center(&self) -> Vec2 {
        self.origin + self.extent() * 0.5
    }

    /// Row-major sample index of vertex (row, col).
    #[inline]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    /// World-space (x, z) of vertex (row, col).
    #[inline]
    pub fn world_position(&self, row: usize, col: usize) -> Vec2 {
        Vec2::new(
            self.origin.x + col as f32 * self.cell_size,
            self.origin.y + row as f32 * self.cell_size,
        )
    }

    /// World-space position of vertex (row, col) lifted to `height`.
    pub fn world_point(&self, row: usize, col: usize, height: f32) -> Vec3 {
        let p = self.world_position(row, col);
        Vec3::new(p.x, height, p.y)
    }

    /// Fractional grid coordinates (col, row) of a world-space point.
    #[inline]
    pub fn grid_coords(&self, x: f32, z: f32) -> Vec2 {
        Vec2::new(
            (x - self.origin.x) / self.cell_size,
            (z - self.origin.y) / self.cell_size,
        )
    }

    /// Whether (x, z) lies inside the grid footprint.
    pub fn contains(&self, x: f32, z: f32) -> bool {
        let g = self.grid_coords(x, z);
        g.x >= 0.0
            && g.y >= 0.0
            && g.x <= self.cols.saturating_sub(1) as f32
            && g.y <= self.rows.saturating_sub(1) as f32
    }

    /// Clamp a world-space (x, z) into the grid footprint.
    pub fn clamp_to_bounds(&self, p: Vec2) -> Vec2 {
        let max = self.origin + self.extent();
        Vec2::new(
            p.x.clamp(self.origin.x, max.x),
            p.y.clamp(self.origin.y, max.y),
        )
    }
}

/// Origin offset that centers `resolution` vertices spaced by `cell_size`.
pub fn centered_origin(resolution: usize, cell_size: f32) -> f32 {
    -(resolution.saturating_sub(1) as f32 * cell_size) / 2.0
}
