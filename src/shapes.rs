//! Grid shape generator: enumerates the cells of a map for a shape and size.

use bevy::prelude::Reflect;
use serde::{Deserialize, Serialize};

use crate::activation::ActivationGrid;
use crate::axial::AxialCoord;
use crate::events::HexMapEvents;

/// Fill pattern for a generated map.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
#[cfg_attr(feature = "native", derive(clap::ValueEnum))]
pub enum GridShape {
    /// Every `(q, r)` with `|q|, |r| <= n`: a skewed block in planar space.
    Rectangle,
    /// Filled hexagon of radius `n` around the origin.
    #[default]
    Hexagon,
    /// `q, r >= 0` and `q + r <= n`.
    Triangle,
    /// Cells of the square range with `|q + r| == n`.
    ///
    /// This is the coordinate-sum isoline, not the full ring at hex distance
    /// `n`: cells such as `(n, -1)` are left out.
    HexagonRing,
}

impl GridShape {
    /// Whether `coord` belongs to this shape at `size`.
    pub fn admits(self, size: i32, coord: AxialCoord) -> bool {
        let AxialCoord { q, r } = coord;
        let square = (-size..=size).contains(&q) && (-size..=size).contains(&r);
        match self {
            Self::Rectangle => square,
            Self::Hexagon => square && (-size..=size).contains(&(q + r)),
            Self::Triangle => q >= 0 && r >= 0 && r <= size - q,
            Self::HexagonRing => square && (q + r).abs() == size,
        }
    }

    /// Every admitted cell, `q` outer and `r` inner, ascending.
    ///
    /// Negative sizes yield nothing.
    pub fn coords(self, size: i32) -> impl Iterator<Item = AxialCoord> {
        let lo = match self {
            Self::Triangle => 0,
            _ => -size,
        };
        (lo..=size)
            .flat_map(move |q| (lo..=size).map(move |r| AxialCoord::new(q, r)))
            .filter(move |&c| self.admits(size, c))
    }

    /// Cell count for `size` without enumerating.
    pub fn cell_count(self, size: i32) -> usize {
        if size < 0 {
            return 0;
        }
        let n = size as usize;
        match self {
            Self::Rectangle => (2 * n + 1).pow(2),
            Self::Hexagon => 3 * n * (n + 1) + 1,
            Self::Triangle => (n + 1) * (n + 2) / 2,
            Self::HexagonRing if n == 0 => 1,
            // q + r == n and q + r == -n each give n + 1 cells in the square.
            Self::HexagonRing => 2 * (n + 1),
        }
    }
}

/// Inserts every cell of `shape` at `size` into `grid` with flag `1`.
///
/// Each admitted cell is reported to `events` as it is created. Returns the
/// number of admitted cells.
pub fn populate_grid(
    grid: &mut ActivationGrid,
    shape: GridShape,
    size: i32,
    mut events: Option<&mut HexMapEvents>,
) -> usize {
    let mut admitted = 0;
    for coord in shape.coords(size) {
        grid.activate(coord);
        if let Some(events) = events.as_deref_mut() {
            events.notify_created(coord);
        }
        admitted += 1;
    }
    admitted
}

/// Builds a fresh grid for `shape` at `size`.
///
/// `seed` of `None` derives one from the clock.
pub fn build_grid(
    shape: GridShape,
    size: i32,
    seed: Option<u32>,
    events: Option<&mut HexMapEvents>,
) -> ActivationGrid {
    let mut grid = match seed {
        Some(seed) => ActivationGrid::new(seed),
        None => ActivationGrid::with_time_seed(),
    };
    populate_grid(&mut grid, shape, size, events);
    grid
}
