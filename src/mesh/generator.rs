//! Data-parallel mesh generation over a task pool.
//!
//! Cells are numbered by their position in the grid's sorted key list. Each
//! worker receives a batch of consecutive cell windows plus the matching
//! coordinates, so workers never share an output element.

use bevy::log::{debug, info, trace};
use bevy::tasks::TaskPool;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{
    CellBatch, CellInput, CellSlice, TileMeshBuffers, TileStyle, synthesize_cell, vertex_base,
    write_degenerate_indices,
};
use crate::activation::ActivationGrid;
use crate::axial::AxialCoord;
use crate::layout::MapTransform;

/// Cells handed to one spawned task.
pub const CELLS_PER_TASK: usize = 64;

/// Random stream for one cell, independent of scheduling.
pub fn cell_rng(seed: u32, cell_index: usize) -> StdRng {
    StdRng::seed_from_u64((u64::from(seed) << 32) ^ cell_index as u64)
}

/// Everything needed to turn a grid into tile mesh buffers.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    /// Cells to build; inactive entries keep zeroed windows.
    pub grid: &'a ActivationGrid,
    /// Projection of the map.
    pub transform: &'a MapTransform,
    /// Tile template.
    pub style: TileStyle,
}

impl<'a> GenerationRequest<'a> {
    /// Bundles the request inputs.
    pub fn new(grid: &'a ActivationGrid, transform: &'a MapTransform, style: TileStyle) -> Self {
        Self {
            grid,
            transform,
            style,
        }
    }

    /// Builds every cell on `pool` and returns the filled buffers.
    ///
    /// Blocks until every task has finished. Output is identical for any
    /// pool size.
    pub fn run(&self, pool: &TaskPool) -> TileMeshBuffers {
        let keys = self.grid.sorted_keys();
        let mut buffers = self.allocate(&keys);

        let request = *self;
        let keys_ref = keys.as_slice();
        let batches = buffers.batches_mut(CELLS_PER_TASK);
        pool.scope(|scope| {
            for batch in batches {
                let first = batch.first_cell();
                let last = (first + CELLS_PER_TASK).min(keys_ref.len());
                let coords = &keys_ref[first..last];
                scope.spawn(async move { request.fill_batch(coords, batch) });
            }
        });

        self.finish(keys, buffers)
    }

    /// Builds every cell on the calling thread.
    pub fn run_sequential(&self) -> TileMeshBuffers {
        let keys = self.grid.sorted_keys();
        let mut buffers = self.allocate(&keys);
        for batch in buffers.batches_mut(CELLS_PER_TASK) {
            let first = batch.first_cell();
            self.fill_batch(&keys[first..], batch);
        }
        self.finish(keys, buffers)
    }

    fn allocate(&self, keys: &[AxialCoord]) -> TileMeshBuffers {
        info!(
            "Generating {:?} tiles: {} cells ({} active), seed {}",
            self.style.variant,
            keys.len(),
            self.grid.active_count(),
            self.grid.seed()
        );
        let buffers = TileMeshBuffers::allocate(keys.len(), self.style.variant);
        debug!(
            "Allocated {} vertices, {} indices",
            buffers.positions.len(),
            buffers.indices.len()
        );
        buffers
    }

    fn finish(&self, keys: Vec<AxialCoord>, buffers: TileMeshBuffers) -> TileMeshBuffers {
        drop(keys);
        debug_assert!(
            buffers
                .indices
                .iter()
                .all(|&i| (i as usize) < buffers.positions.len()),
            "triangle index past the vertex buffer"
        );
        debug!("Tile generation done: {} cells", buffers.cell_count());
        buffers
    }

    fn fill_batch(&self, coords: &[AxialCoord], batch: CellBatch<'_>) {
        for (cell, &coord) in batch.into_cells().zip(coords) {
            self.fill_cell(coord, cell);
        }
    }

    fn fill_cell(&self, coord: AxialCoord, mut cell: CellSlice<'_>) {
        if !self.grid.is_active(coord) {
            trace!("Skipping inactive cell {coord}");
            if let Some(base) = vertex_base(cell.index, cell.positions.len()) {
                write_degenerate_indices(base, cell.indices);
            }
            return;
        }
        let input = CellInput {
            coord,
            transform: self.transform,
            style: self.style,
        };
        let mut rng = cell_rng(self.grid.seed(), cell.index);
        synthesize_cell(&input, &mut cell, &mut rng);
    }
}
