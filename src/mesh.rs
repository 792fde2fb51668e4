//! Tile mesh buffers and the per-cell layout contract.
//!
//! Every cell owns a fixed-size window of each buffer, addressed purely by its
//! cell index: vertices `[i * V, (i + 1) * V)` and index slots
//! `[i * T, (i + 1) * T)` where `V`/`T` come from the [`TileVariant`]. Windows
//! never overlap, so cells can be filled in any order or in parallel.

mod generator;
mod synthesis;

pub use generator::{CELLS_PER_TASK, GenerationRequest, cell_rng};
pub use synthesis::{
    CellInput, compute_normal, synthesize_cell, vertex_base, write_cell_color, write_cell_normals,
    write_degenerate_indices, write_hollow_indices, write_hollow_vertices, write_solid_indices,
    write_solid_vertices,
};

use bevy::prelude::Reflect;

/// Vertices of a filled hexagon: center plus six corners.
pub const SOLID_VERTS: usize = 7;
/// Index slots of a filled hexagon: six fan triangles.
pub const SOLID_INDICES: usize = 18;
/// Vertices of a hollow hexagon: inner and outer rings.
pub const HOLLOW_VERTS: usize = 12;
/// Index slots of a hollow hexagon: two triangles per side.
pub const HOLLOW_INDICES: usize = 36;

/// Geometry template used for every cell of one generation request.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum TileVariant {
    /// Filled hexagon fanned from its center.
    #[default]
    Solid,
    /// Hexagonal ring between an inner and the outer rim.
    Hollow,
}

impl TileVariant {
    /// `Hollow` when `hollow` is set, otherwise `Solid`.
    pub const fn from_hollow(hollow: bool) -> Self {
        if hollow { Self::Hollow } else { Self::Solid }
    }

    /// Vertices written per cell.
    pub const fn verts_per_tile(self) -> usize {
        match self {
            Self::Solid => SOLID_VERTS,
            Self::Hollow => HOLLOW_VERTS,
        }
    }

    /// Triangle index slots written per cell.
    pub const fn indices_per_tile(self) -> usize {
        match self {
            Self::Solid => SOLID_INDICES,
            Self::Hollow => HOLLOW_INDICES,
        }
    }
}

/// Variant plus the inner-rim ratio used by hollow tiles.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct TileStyle {
    /// Template for every cell.
    pub variant: TileVariant,
    /// Inner rim radius as a fraction of the outer rim, `0..=1`. Ignored by solid tiles.
    pub inner_radius: f32,
}

impl Default for TileStyle {
    fn default() -> Self {
        Self {
            variant: TileVariant::Solid,
            inner_radius: 0.7,
        }
    }
}

/// The four parallel output buffers of one generation request.
///
/// Zero-initialised on allocation. An inactive cell keeps zero positions, normals,
/// and colors; its index slots all point at its own first vertex.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TileMeshBuffers {
    /// Vertex positions.
    pub positions: Vec<[f32; 3]>,
    /// Triangle list, three absolute vertex indices per triangle.
    pub indices: Vec<u32>,
    /// Per-vertex normals.
    pub normals: Vec<[f32; 3]>,
    /// Per-vertex RGBA in `[0, 1]`.
    pub colors: Vec<[f32; 4]>,
    variant: TileVariant,
}

impl TileMeshBuffers {
    /// Zeroed buffers sized for `cell_count` cells of `variant`.
    pub fn allocate(cell_count: usize, variant: TileVariant) -> Self {
        let verts = cell_count * variant.verts_per_tile();
        let indices = cell_count * variant.indices_per_tile();
        Self {
            positions: vec![[0.0; 3]; verts],
            indices: vec![0; indices],
            normals: vec![[0.0; 3]; verts],
            colors: vec![[0.0; 4]; verts],
            variant,
        }
    }

    /// Template the buffers were sized for.
    pub fn variant(&self) -> TileVariant {
        self.variant
    }

    /// Number of cell windows.
    pub fn cell_count(&self) -> usize {
        self.positions.len() / self.variant.verts_per_tile()
    }

    /// Whether there are no cells at all.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Vertex range owned by cell `cell`.
    pub fn vertex_range(&self, cell: usize) -> std::ops::Range<usize> {
        let v = self.variant.verts_per_tile();
        cell * v..(cell + 1) * v
    }

    /// Triangle index slots owned by cell `cell`.
    pub fn cell_indices(&self, cell: usize) -> &[u32] {
        let t = self.variant.indices_per_tile();
        &self.indices[cell * t..(cell + 1) * t]
    }

    /// Colors owned by cell `cell`.
    pub fn cell_colors(&self, cell: usize) -> &[[f32; 4]] {
        &self.colors[self.vertex_range(cell)]
    }

    /// Splits the buffers into consecutive batches of up to `cells_per_batch` cells.
    pub fn batches_mut(&mut self, cells_per_batch: usize) -> impl Iterator<Item = CellBatch<'_>> {
        let cells_per_batch = cells_per_batch.max(1);
        let variant = self.variant;
        let v = variant.verts_per_tile() * cells_per_batch;
        let t = variant.indices_per_tile() * cells_per_batch;
        self.positions
            .chunks_mut(v)
            .zip(self.indices.chunks_mut(t))
            .zip(self.normals.chunks_mut(v))
            .zip(self.colors.chunks_mut(v))
            .enumerate()
            .map(
                move |(batch, (((positions, indices), normals), colors))| CellBatch {
                    first_cell: batch * cells_per_batch,
                    variant,
                    positions,
                    indices,
                    normals,
                    colors,
                },
            )
    }
}

/// A run of consecutive cell windows, handed to one worker.
#[derive(Debug)]
pub struct CellBatch<'a> {
    first_cell: usize,
    variant: TileVariant,
    positions: &'a mut [[f32; 3]],
    indices: &'a mut [u32],
    normals: &'a mut [[f32; 3]],
    colors: &'a mut [[f32; 4]],
}

impl<'a> CellBatch<'a> {
    /// Cell index of the first window in this batch.
    pub fn first_cell(&self) -> usize {
        self.first_cell
    }

    /// Splits the batch into one [`CellSlice`] per cell.
    pub fn into_cells(self) -> impl Iterator<Item = CellSlice<'a>> {
        let CellBatch {
            first_cell,
            variant,
            positions,
            indices,
            normals,
            colors,
        } = self;
        let v = variant.verts_per_tile();
        let t = variant.indices_per_tile();
        positions
            .chunks_exact_mut(v)
            .zip(indices.chunks_exact_mut(t))
            .zip(normals.chunks_exact_mut(v))
            .zip(colors.chunks_exact_mut(v))
            .enumerate()
            .map(
                move |(offset, (((positions, indices), normals), colors))| CellSlice {
                    index: first_cell + offset,
                    positions,
                    indices,
                    normals,
                    colors,
                },
            )
    }
}

/// One cell's disjoint window into each output buffer.
#[derive(Debug)]
pub struct CellSlice<'a> {
    /// Sequential cell index; determines the absolute vertex numbers written to `indices`.
    pub index: usize,
    /// `verts_per_tile` positions.
    pub positions: &'a mut [[f32; 3]],
    /// `indices_per_tile` triangle index slots.
    pub indices: &'a mut [u32],
    /// `verts_per_tile` normals.
    pub normals: &'a mut [[f32; 3]],
    /// `verts_per_tile` colors.
    pub colors: &'a mut [[f32; 4]],
}
