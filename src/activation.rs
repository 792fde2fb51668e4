//! Sparse activation grid: which cells exist in a map.

use std::time::{SystemTime, UNIX_EPOCH};

use bevy::platform::collections::HashMap;
use bevy::prelude::Reflect;

use crate::axial::AxialCoord;

/// Inclusive axial bounding box of every inserted cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub struct AxialBounds {
    /// Smallest `q` and smallest `r` seen (not necessarily a cell).
    pub min: AxialCoord,
    /// Largest `q` and largest `r` seen.
    pub max: AxialCoord,
}

impl AxialBounds {
    /// Bounds containing only `coord`.
    pub const fn point(coord: AxialCoord) -> Self {
        Self {
            min: coord,
            max: coord,
        }
    }

    /// Widens the box to include `coord`.
    pub fn include(&mut self, coord: AxialCoord) {
        self.min.q = self.min.q.min(coord.q);
        self.min.r = self.min.r.min(coord.r);
        self.max.q = self.max.q.max(coord.q);
        self.max.r = self.max.r.max(coord.r);
    }

    /// Whether `coord` lies inside the box.
    pub fn contains(&self, coord: AxialCoord) -> bool {
        (self.min.q..=self.max.q).contains(&coord.q) && (self.min.r..=self.max.r).contains(&coord.r)
    }
}

/// Mapping from cell to a one-byte activation flag, plus the map's random seed.
///
/// Built once per generation request, read-only afterwards. Lookups of cells
/// that were never inserted report inactive rather than failing.
#[derive(Debug, Clone, Default)]
pub struct ActivationGrid {
    cells: HashMap<AxialCoord, u8>,
    seed: u32,
    bounds: Option<AxialBounds>,
}

impl ActivationGrid {
    /// Empty grid with an explicit seed.
    pub fn new(seed: u32) -> Self {
        Self {
            cells: HashMap::new(),
            seed,
            bounds: None,
        }
    }

    /// Empty grid seeded from the wall clock, for run-to-run variety only.
    pub fn with_time_seed() -> Self {
        Self::new(time_seed())
    }

    /// Sets the flag for `coord` and widens the bounds. Re-inserting overwrites.
    pub fn insert(&mut self, coord: AxialCoord, flag: u8) {
        self.cells.insert(coord, flag);
        match &mut self.bounds {
            Some(bounds) => bounds.include(coord),
            None => self.bounds = Some(AxialBounds::point(coord)),
        }
    }

    /// Marks `coord` active.
    pub fn activate(&mut self, coord: AxialCoord) {
        self.insert(coord, 1);
    }

    /// Raw flag byte; `0` for cells never inserted.
    pub fn flag(&self, coord: AxialCoord) -> u8 {
        self.cells.get(&coord).copied().unwrap_or(0)
    }

    /// Whether `coord` is present with a non-zero flag.
    pub fn is_active(&self, coord: AxialCoord) -> bool {
        self.flag(coord) != 0
    }

    /// Whether `coord` has an entry, active or not.
    pub fn contains(&self, coord: AxialCoord) -> bool {
        self.cells.contains_key(&coord)
    }

    /// Number of entries, including inactive ones.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the grid has no entries.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of entries with a non-zero flag.
    pub fn active_count(&self) -> usize {
        self.cells.values().filter(|&&flag| flag != 0).count()
    }

    /// Seed for per-cell randomization.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Bounding box of all entries, `None` while empty.
    pub fn bounds(&self) -> Option<AxialBounds> {
        self.bounds
    }

    /// Every entry, in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (AxialCoord, u8)> + '_ {
        self.cells.iter().map(|(&coord, &flag)| (coord, flag))
    }

    /// Every key sorted by `(q, r)`; a key's position is its cell index.
    pub fn sorted_keys(&self) -> Vec<AxialCoord> {
        let mut keys: Vec<AxialCoord> = self.cells.keys().copied().collect();
        keys.sort_unstable();
        keys
    }
}

fn time_seed() -> u32 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    // Fold the high bits in so consecutive runs differ in more than the low word.
    (nanos ^ (nanos >> 32)) as u32
}
