//! Axial hex coordinates and their integer arithmetic.
//!
//! A cell is addressed by `(q, r)`; the cube coordinate `s = -q - r` is always
//! derived, never stored, so `q + r + s == 0` holds by construction.

use std::fmt;
use std::ops::{Add, Neg, Sub};

use bevy::prelude::Reflect;

/// Integer axial coordinate of a hex cell.
///
/// Ordering is lexicographic on `(q, r)`, which the mesh generator relies on to
/// give every cell a stable processing index.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect)]
pub struct AxialCoord {
    /// Column axis.
    pub q: i32,
    /// Row axis.
    pub r: i32,
}

impl AxialCoord {
    /// The origin cell `(0, 0)`.
    pub const ZERO: Self = Self::new(0, 0);

    /// The six unit directions, indexed `0..6` in rim order.
    pub const DIRECTIONS: [Self; 6] = [
        Self::new(1, 0),
        Self::new(1, -1),
        Self::new(0, -1),
        Self::new(-1, 0),
        Self::new(-1, 1),
        Self::new(0, 1),
    ];

    /// Creates a coordinate from its two axial components.
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Derived third cube component.
    pub const fn s(self) -> i32 {
        -self.q - self.r
    }

    /// Component-wise multiplication by `k`.
    pub const fn scale(self, k: i32) -> Self {
        Self::new(self.q * k, self.r * k)
    }

    /// Step count from the origin to this cell.
    pub const fn length(self) -> i32 {
        (self.q.abs() + self.r.abs() + self.s().abs()) / 2
    }

    /// Hex step distance between two cells (not Euclidean).
    pub const fn distance(self, other: Self) -> i32 {
        Self::new(self.q - other.q, self.r - other.r).length()
    }

    /// Unit vector for `direction`, or [`AxialCoord::ZERO`] when the index is
    /// outside `0..6`.
    pub const fn direction(direction: i32) -> Self {
        match direction {
            0..=5 => Self::DIRECTIONS[direction as usize],
            _ => Self::ZERO,
        }
    }

    /// The adjacent cell in `direction`. Out-of-range directions return `self`.
    pub const fn neighbor(self, direction: i32) -> Self {
        let d = Self::direction(direction);
        Self::new(self.q + d.q, self.r + d.r)
    }

    /// All six adjacent cells, in direction order.
    pub fn neighbors(self) -> [Self; 6] {
        Self::DIRECTIONS.map(|d| self + d)
    }
}

impl Add for AxialCoord {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.q + rhs.q, self.r + rhs.r)
    }
}

impl Sub for AxialCoord {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.q - rhs.q, self.r - rhs.r)
    }
}

impl Neg for AxialCoord {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.q, -self.r)
    }
}

impl fmt::Display for AxialCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.q, self.r, self.s())
    }
}

impl From<hexx::Hex> for AxialCoord {
    fn from(hex: hexx::Hex) -> Self {
        Self::new(hex.x, hex.y)
    }
}

impl From<AxialCoord> for hexx::Hex {
    fn from(coord: AxialCoord) -> Self {
        hexx::Hex::new(coord.q, coord.r)
    }
}

/// Real-valued axial coordinate produced by inverse projection.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FractionalAxialCoord {
    /// Column axis.
    pub q: f32,
    /// Row axis.
    pub r: f32,
}

impl FractionalAxialCoord {
    /// Creates a fractional coordinate.
    pub const fn new(q: f32, r: f32) -> Self {
        Self { q, r }
    }

    /// Derived third cube component.
    pub fn s(self) -> f32 {
        -self.q - self.r
    }

    /// Snaps to the nearest integer cell.
    ///
    /// Each cube component is rounded on its own; the one with the largest
    /// rounding error is then rebuilt from the other two. Ties resolve in the
    /// order `q`, then `r`, then `s`, so the result is stable for points that
    /// sit exactly on a cell boundary. Midpoints round to even.
    pub fn round(self) -> AxialCoord {
        let (fq, fr, fs) = (self.q, self.r, self.s());
        let mut q = fq.round_ties_even();
        let mut r = fr.round_ties_even();
        let s = fs.round_ties_even();

        let q_diff = (q - fq).abs();
        let r_diff = (r - fr).abs();
        let s_diff = (s - fs).abs();

        if q_diff > r_diff && q_diff > s_diff {
            q = -r - s;
        } else if r_diff > s_diff {
            r = -q - s;
        }
        // Otherwise `s` absorbs the error and is simply dropped.

        AxialCoord::new(q as i32, r as i32)
    }
}
