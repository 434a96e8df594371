//! Terrain Mesh
//!
//! Render-side view of a [`HeightField`]: one shared vertex per grid sample,
//! two triangles per cell, ready for GPU upload through `bytemuck`.
//!
//! Vertex `(row, col)` is placed by the same [`GridTransform`] the collision
//! heightfield uses, so mesh vertices and collision samples coincide.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use static_assertions::const_assert_eq;

use super::heightfield::HeightField;
use crate::world::GridTransform;

/// Vertex layout for the terrain pipeline.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 3],
}

const_assert_eq!(std::mem::size_of::<TerrainVertex>(), 36);

/// Base colours blended by slope and height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainPalette {
    pub low: [f32; 3],
    pub high: [f32; 3],
    pub steep: [f32; 3],
}

impl Default for TerrainPalette {
    fn default() -> Self {
        Self {
            low: [0.18, 0.32, 0.10],
            high: [0.55, 0.48, 0.38],
            steep: [0.32, 0.29, 0.26],
        }
    }
}

impl TerrainPalette {
    /// Colour for a vertex at relative height `t` in [0, 1] with `normal`.
    pub fn color(&self, t: f32, normal: Vec3) -> [f32; 3] {
        let slope = 1.0 - normal.y.abs();
        let by_height = blend_colors(&self.low, &self.high, t.clamp(0.0, 1.0));
        blend_colors(&by_height, &self.steep, smooth_step(0.25, 0.6, slope))
    }
}

/// Indexed triangle mesh over a height grid.
#[derive(Clone, Debug)]
pub struct TerrainMesh {
    grid: GridTransform,
    palette: TerrainPalette,
    pub vertices: Vec<TerrainVertex>,
    pub indices: Vec<u32>,
}

impl TerrainMesh {
    pub fn from_heightfield(field: &HeightField) -> Self {
        Self::with_palette(field, TerrainPalette::default())
    }

    pub fn with_palette(field: &HeightField, palette: TerrainPalette) -> Self {
        let grid = *field.grid();
        let mut vertices = Vec::with_capacity(grid.sample_count());
        for row in 0..grid.rows {
            for col in 0..grid.cols {
                let h = field.get(row, col).unwrap_or(0.0);
                vertices.push(TerrainVertex {
                    position: grid.world_point(row, col, h).to_array(),
                    normal: [0.0, 1.0, 0.0],
                    color: palette.low,
                });
            }
        }

        let cells = grid.rows.saturating_sub(1) * grid.cols.saturating_sub(1);
        let mut indices = Vec::with_capacity(cells * 6);
        for row in 0..grid.rows.saturating_sub(1) {
            for col in 0..grid.cols.saturating_sub(1) {
                let i00 = grid.index(row, col) as u32;
                let i01 = grid.index(row, col + 1) as u32;
                let i10 = grid.index(row + 1, col) as u32;
                let i11 = grid.index(row + 1, col + 1) as u32;
                // Counter-clockwise seen from +Y
                indices.extend_from_slice(&[i00, i10, i11, i00, i11, i01]);
            }
        }

        let mut mesh = Self {
            grid,
            palette,
            vertices,
            indices,
        };
        mesh.recompute_normals();
        mesh
    }

    pub fn grid(&self) -> &GridTransform {
        &self.grid
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Current Y of vertex (row, col).
    pub fn vertex_height(&self, row: usize, col: usize) -> Option<f32> {
        self.vertex_index(row, col)
            .map(|i| self.vertices[i].position[1])
    }

    /// Move vertex (row, col) to height `h` and refresh the shading around it.
    /// Returns `false` when the index is outside the grid.
    pub fn set_vertex_height(&mut self, row: usize, col: usize, h: f32) -> bool {
        let Some(i) = self.vertex_index(row, col) else {
            return false;
        };
        self.vertices[i].position[1] = h;

        let (min_h, max_h) = self.height_range();
        for r in row.saturating_sub(1)..=(row + 1).min(self.grid.rows - 1) {
            for c in col.saturating_sub(1)..=(col + 1).min(self.grid.cols - 1) {
                self.shade_vertex(r, c, min_h, max_h);
            }
        }
        true
    }

    /// Recompute every normal and colour from the current heights.
    pub fn recompute_normals(&mut self) {
        let (min_h, max_h) = self.height_range();
        for row in 0..self.grid.rows {
            for col in 0..self.grid.cols {
                self.shade_vertex(row, col, min_h, max_h);
            }
        }
    }

    /// Raw vertex bytes for a GPU buffer.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    fn vertex_index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.grid.rows && col < self.grid.cols).then(|| self.grid.index(row, col))
    }

    fn height(&self, row: usize, col: usize) -> f32 {
        self.vertices[self.grid.index(row, col)].position[1]
    }

    fn height_range(&self) -> (f32, f32) {
        self.vertices
            .iter()
            .map(|v| v.position[1])
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), h| (lo.min(h), hi.max(h)))
    }

    fn normal_at(&self, row: usize, col: usize) -> Vec3 {
        let c0 = col.saturating_sub(1);
        let c1 = (col + 1).min(self.grid.cols - 1);
        let r0 = row.saturating_sub(1);
        let r1 = (row + 1).min(self.grid.rows - 1);

        let dx = (c1 - c0).max(1) as f32 * self.grid.cell_size;
        let dz = (r1 - r0).max(1) as f32 * self.grid.cell_size;
        let slope_x = (self.height(row, c1) - self.height(row, c0)) / dx;
        let slope_z = (self.height(r1, col) - self.height(r0, col)) / dz;

        Vec3::new(-slope_x, 1.0, -slope_z).normalize()
    }

    fn shade_vertex(&mut self, row: usize, col: usize, min_h: f32, max_h: f32) {
        let normal = self.normal_at(row, col);
        let i = self.grid.index(row, col);
        let span = (max_h - min_h).max(1e-6);
        let t = (self.vertices[i].position[1] - min_h) / span;
        self.vertices[i].normal = normal.to_array();
        self.vertices[i].color = self.palette.color(t, normal);
    }
}

/// Smooth step function for natural transitions
pub fn smooth_step(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Helper to blend two colors
pub fn blend_colors(a: &[f32; 3], b: &[f32; 3], t: f32) -> [f32; 3] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}
