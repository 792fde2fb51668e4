//! Orientation matrices and the axial <-> planar projection of a map.

use std::f32::consts::TAU;

use bevy::prelude::{Reflect, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::axial::{AxialCoord, FractionalAxialCoord};

const SQRT_3: f32 = 1.732_050_8;

/// Which way the hexagons point.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum OrientationKind {
    /// A corner points up the planar `y` axis.
    #[default]
    PointyTop,
    /// An edge lies flat along the top.
    FlatTop,
}

/// Forward and inverse 2x2 projection matrices plus the corner start angle.
///
/// Matrices are stored row-major: `[m00, m01, m10, m11]`.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct Orientation {
    /// Axial -> planar.
    pub forward: [f32; 4],
    /// Planar -> axial, the inverse of `forward`.
    pub inverse: [f32; 4],
    /// Angle of corner 0, in sixths of a turn.
    pub start_angle: f32,
}

impl Orientation {
    /// Pointy-top hexagons.
    pub const POINTY_TOP: Self = Self {
        forward: [SQRT_3, SQRT_3 / 2.0, 0.0, 3.0 / 2.0],
        inverse: [SQRT_3 / 3.0, -1.0 / 3.0, 0.0, 2.0 / 3.0],
        start_angle: 0.5,
    };

    /// Flat-top hexagons.
    pub const FLAT_TOP: Self = Self {
        forward: [3.0 / 2.0, 0.0, SQRT_3 / 2.0, SQRT_3],
        inverse: [2.0 / 3.0, 0.0, -1.0 / 3.0, SQRT_3 / 3.0],
        start_angle: 0.0,
    };

    /// The fixed matrix pair for `kind`.
    pub const fn from_kind(kind: OrientationKind) -> Self {
        match kind {
            OrientationKind::PointyTop => Self::POINTY_TOP,
            OrientationKind::FlatTop => Self::FLAT_TOP,
        }
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self::POINTY_TOP
    }
}

/// The single affine mapping between axial cells and planar positions of one map.
///
/// Planar `(x, y)` lies on the world XZ plane: `x` stays `x`, planar `y` runs
/// along `-z`, and the map sits at height `origin.z`.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct MapTransform {
    /// Projection matrices.
    pub orientation: Orientation,
    /// Per-axis cell size.
    pub scale: Vec2,
    /// Planar offset in `x`/`y`, map height in `z`.
    pub origin: Vec3,
}

impl Default for MapTransform {
    fn default() -> Self {
        Self {
            orientation: Orientation::POINTY_TOP,
            scale: Vec2::ONE,
            origin: Vec3::ZERO,
        }
    }
}

impl MapTransform {
    /// Builds a transform from an orientation kind, scale, and origin.
    pub const fn new(kind: OrientationKind, scale: Vec2, origin: Vec3) -> Self {
        Self {
            orientation: Orientation::from_kind(kind),
            scale,
            origin,
        }
    }

    /// Planar center of `coord`.
    pub fn axial_to_planar(&self, coord: AxialCoord) -> Vec2 {
        let [f0, f1, f2, f3] = self.orientation.forward;
        let (q, r) = (coord.q as f32, coord.r as f32);
        Vec2::new(
            (f0 * q + f1 * r) * self.scale.x + self.origin.x,
            (f2 * q + f3 * r) * self.scale.y + self.origin.y,
        )
    }

    /// Unrounded axial position of a planar point.
    ///
    /// A zero scale component divides by zero; the resulting non-finite
    /// components round to cell `0` on that axis.
    pub fn planar_to_fractional(&self, point: Vec2) -> FractionalAxialCoord {
        let [b0, b1, b2, b3] = self.orientation.inverse;
        let x = (point.x - self.origin.x) / self.scale.x;
        let y = (point.y - self.origin.y) / self.scale.y;
        FractionalAxialCoord::new(b0 * x + b1 * y, b2 * x + b3 * y)
    }

    /// The cell containing a planar point.
    pub fn planar_to_axial(&self, point: Vec2) -> AxialCoord {
        self.planar_to_fractional(point).round()
    }

    /// Offset of corner `corner` from a cell center at `radius` (1.0 = full cell).
    ///
    /// Corners `0..6` walk the rim counter-clockwise in planar space.
    pub fn corner_offset(&self, corner: usize, radius: f32) -> Vec2 {
        let angle = TAU * (self.orientation.start_angle + corner as f32) / 6.0;
        Vec2::new(
            angle.cos() * radius * self.scale.x,
            angle.sin() * radius * self.scale.y,
        )
    }

    /// The six planar corners of `coord` at full radius.
    pub fn polygon_corners(&self, coord: AxialCoord) -> [Vec2; 6] {
        let center = self.axial_to_planar(coord);
        std::array::from_fn(|i| center + self.corner_offset(i, 1.0))
    }

    /// Lifts a planar point onto the world map plane.
    pub fn planar_to_world(&self, planar: Vec2) -> Vec3 {
        Vec3::new(planar.x, self.origin.z, -planar.y)
    }

    /// World-space center of `coord`.
    pub fn cell_center(&self, coord: AxialCoord) -> Vec3 {
        self.planar_to_world(self.axial_to_planar(coord))
    }

    /// Inverse of [`MapTransform::planar_to_world`]; height is ignored.
    pub fn world_to_axial(&self, world: Vec3) -> AxialCoord {
        self.planar_to_axial(Vec2::new(world.x, -world.z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transforms() -> Vec<MapTransform> {
        vec![
            MapTransform::default(),
            MapTransform::new(OrientationKind::FlatTop, Vec2::ONE, Vec3::ZERO),
            MapTransform::new(
                OrientationKind::PointyTop,
                Vec2::new(2.5, 0.75),
                Vec3::new(-13.0, 4.25, 1.0),
            ),
            MapTransform::new(
                OrientationKind::FlatTop,
                Vec2::new(0.3, 3.0),
                Vec3::new(100.0, -7.5, -2.0),
            ),
        ]
    }

    // ── orientation ─────────────────────────────────────────────────

    #[test]
    fn inverse_matrices_invert_forward() {
        for o in [Orientation::POINTY_TOP, Orientation::FLAT_TOP] {
            let [f0, f1, f2, f3] = o.forward;
            let [b0, b1, b2, b3] = o.inverse;
            let product = [
                b0 * f0 + b1 * f2,
                b0 * f1 + b1 * f3,
                b2 * f0 + b3 * f2,
                b2 * f1 + b3 * f3,
            ];
            for (got, want) in product.iter().zip([1.0_f32, 0.0, 0.0, 1.0]) {
                assert!((got - want).abs() < 1e-6, "{o:?} gives {product:?}");
            }
        }
    }

    // ── projection ──────────────────────────────────────────────────

    #[test]
    fn origin_cell_projects_to_origin() {
        let t = transforms()[2];
        let p = t.axial_to_planar(AxialCoord::ZERO);
        assert_eq!(p, Vec2::new(t.origin.x, t.origin.y));
    }

    #[test]
    fn pointy_top_neighbor_spacing() {
        let t = MapTransform::default();
        let p = t.axial_to_planar(AxialCoord::new(1, 0));
        assert!((p.x - SQRT_3).abs() < 1e-6);
        assert!(p.y.abs() < 1e-6);
        let p = t.axial_to_planar(AxialCoord::new(0, 1));
        assert!((p.x - SQRT_3 / 2.0).abs() < 1e-6);
        assert!((p.y - 1.5).abs() < 1e-6);
    }

    #[test]
    fn planar_roundtrip_for_every_transform() {
        for t in transforms() {
            for q in -20..=20 {
                for r in -20..=20 {
                    let c = AxialCoord::new(q, r);
                    let back = t.planar_to_axial(t.axial_to_planar(c));
                    assert_eq!(back, c, "roundtrip failed for {c} under {t:?}");
                }
            }
        }
    }

    #[test]
    fn nudged_points_stay_in_their_cell() {
        let t = transforms()[2];
        let c = AxialCoord::new(3, -5);
        let center = t.axial_to_planar(c);
        for corner in 0..6 {
            let near_corner = center + t.corner_offset(corner, 0.4);
            assert_eq!(t.planar_to_axial(near_corner), c);
        }
    }

    #[test]
    fn world_roundtrip_ignores_height() {
        let t = transforms()[3];
        let c = AxialCoord::new(-4, 9);
        let world = t.cell_center(c);
        assert_eq!(world.y, t.origin.z);
        assert_eq!(t.world_to_axial(world + Vec3::Y * 50.0), c);
    }

    #[test]
    fn zero_scale_is_degenerate_not_fatal() {
        let t = MapTransform::new(OrientationKind::PointyTop, Vec2::ZERO, Vec3::ZERO);
        assert_eq!(t.axial_to_planar(AxialCoord::new(5, 5)), Vec2::ZERO);
        // Division by zero yields non-finite components; rounding must not panic.
        let _ = t.planar_to_axial(Vec2::new(1.0, 1.0));
    }

    // ── corners ─────────────────────────────────────────────────────

    #[test]
    fn pointy_corner_zero_is_at_thirty_degrees() {
        let t = MapTransform::default();
        let c0 = t.corner_offset(0, 1.0);
        assert!((c0.x - SQRT_3 / 2.0).abs() < 1e-6);
        assert!((c0.y - 0.5).abs() < 1e-6);
        let c1 = t.corner_offset(1, 1.0);
        assert!(c1.x.abs() < 1e-6);
        assert!((c1.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn flat_corner_zero_is_on_x_axis() {
        let t = transforms()[1];
        let c0 = t.corner_offset(0, 2.0);
        assert!((c0 - Vec2::new(2.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn corner_offset_scales_per_axis() {
        let t = MapTransform::new(OrientationKind::FlatTop, Vec2::new(2.0, 3.0), Vec3::ZERO);
        let unit = transforms()[1];
        for i in 0..6 {
            let a = t.corner_offset(i, 0.5);
            let b = unit.corner_offset(i, 0.5) * Vec2::new(2.0, 3.0);
            assert!((a - b).length() < 1e-6);
        }
    }

    #[test]
    fn polygon_corners_are_distinct_and_equidistant() {
        let t = MapTransform::default();
        let center = t.axial_to_planar(AxialCoord::new(2, -1));
        let corners = t.polygon_corners(AxialCoord::new(2, -1));
        for i in 0..6 {
            assert!((corners[i].distance(center) - 1.0).abs() < 1e-5);
            for j in (i + 1)..6 {
                assert_ne!(corners[i], corners[j], "corners {i} and {j} coincide");
            }
        }
    }

    #[test]
    fn adjacent_cells_share_corners() {
        // Corner 5 of a pointy cell coincides with corner 1 of its (1, -1) neighbor.
        let t = MapTransform::default();
        let a = t.polygon_corners(AxialCoord::ZERO);
        let b = t.polygon_corners(AxialCoord::new(1, -1));
        assert!(a[5].distance(b[1]) < 1e-5);
    }
}
