//! Per-cell geometry: writes one cell's vertices, triangles, normals, and color.
//!
//! All functions here touch only the window they are handed. Triangle entries
//! are absolute vertex numbers, `cell_index * verts_per_tile + local`.

use bevy::log::warn;
use bevy::prelude::{Vec2, Vec3};
use rand::Rng;

use super::{
    CellSlice, HOLLOW_INDICES, HOLLOW_VERTS, SOLID_INDICES, SOLID_VERTS, TileStyle, TileVariant,
};
use crate::axial::AxialCoord;
use crate::layout::MapTransform;

/// Read-only inputs for synthesizing one cell.
#[derive(Debug, Clone, Copy)]
pub struct CellInput<'a> {
    /// The cell being built.
    pub coord: AxialCoord,
    /// Map projection shared by every cell.
    pub transform: &'a MapTransform,
    /// Variant and inner radius shared by every cell.
    pub style: TileStyle,
}

/// Computes the face normal of a triangle defined by three vertices.
///
/// Uses the cross product of edges `(v1 - v0)` and `(v2 - v0)`.
/// Returns `Vec3::ZERO` if the triangle is degenerate (collinear points).
pub fn compute_normal(v0: Vec3, v1: Vec3, v2: Vec3) -> Vec3 {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    edge1.cross(edge2).normalize_or_zero()
}

/// Planar corner offset -> world delta on the map plane.
fn lift(offset: Vec2) -> Vec3 {
    Vec3::new(offset.x, 0.0, -offset.y)
}

/// First absolute vertex number of cell `cell_index`.
///
/// `None` when the cell's last vertex does not fit a `u32` index.
pub fn vertex_base(cell_index: usize, verts_per_tile: usize) -> Option<u32> {
    let base = cell_index.checked_mul(verts_per_tile)?;
    let last = base.checked_add(verts_per_tile.checked_sub(1)?)?;
    u32::try_from(last).ok()?;
    u32::try_from(base).ok()
}

/// Center at slot 0, full-radius corners at slots 1..=6.
pub fn write_solid_vertices(center: Vec3, transform: &MapTransform, positions: &mut [[f32; 3]]) {
    debug_assert_eq!(positions.len(), SOLID_VERTS);
    positions[0] = center.to_array();
    for corner in 0..6 {
        positions[corner + 1] = (center + lift(transform.corner_offset(corner, 1.0))).to_array();
    }
}

/// Six triangles fanned from the center: `(center, corner i, corner i+1)`.
pub fn write_solid_indices(base: u32, indices: &mut [u32]) {
    debug_assert_eq!(indices.len(), SOLID_INDICES);
    let corner = |i: usize| base + 1 + (i % 6) as u32;
    for (i, tri) in indices.chunks_exact_mut(3).enumerate() {
        tri.copy_from_slice(&[base, corner(i), corner(i + 1)]);
    }
}

/// Inner rim at slots 0..6 (`inner_radius`), outer rim at slots 6..12 (radius 1).
pub fn write_hollow_vertices(
    center: Vec3,
    inner_radius: f32,
    transform: &MapTransform,
    positions: &mut [[f32; 3]],
) {
    debug_assert_eq!(positions.len(), HOLLOW_VERTS);
    for corner in 0..6 {
        positions[corner] =
            (center + lift(transform.corner_offset(corner, inner_radius))).to_array();
        positions[corner + 6] = (center + lift(transform.corner_offset(corner, 1.0))).to_array();
    }
}

/// Two triangles per side, bridging inner corner `i`/`i+1` and outer corner `i`/`i+1`.
pub fn write_hollow_indices(base: u32, indices: &mut [u32]) {
    debug_assert_eq!(indices.len(), HOLLOW_INDICES);
    let inner = |i: usize| base + (i % 6) as u32;
    let outer = |i: usize| base + 6 + (i % 6) as u32;
    for (i, quad) in indices.chunks_exact_mut(6).enumerate() {
        quad.copy_from_slice(&[
            inner(i),
            outer(i),
            inner(i + 1),
            outer(i),
            outer(i + 1),
            inner(i + 1),
        ]);
    }
}

/// Points every triangle slot at the cell's own first vertex.
///
/// Used for inactive cells: their zero-area triangles stay inside their own window.
pub fn write_degenerate_indices(base: u32, indices: &mut [u32]) {
    indices.fill(base);
}

/// Draws one RGB triple (alpha 1) and paints every vertex of the cell with it.
///
/// Consumes exactly three values from `rng`, in red, green, blue order.
pub fn write_cell_color<R: Rng + ?Sized>(colors: &mut [[f32; 4]], rng: &mut R) -> [f32; 4] {
    let color: [f32; 4] = [
        rng.gen_range(0.0..1.0),
        rng.gen_range(0.0..1.0),
        rng.gen_range(0.0..1.0),
        1.0,
    ];
    colors.fill(color);
    color
}

/// Fills the cell's normals with its face normal.
///
/// The normal comes from the first non-degenerate triangle; a cell whose
/// triangles all have zero area gets zero normals.
pub fn write_cell_normals(
    base: u32,
    positions: &[[f32; 3]],
    indices: &[u32],
    normals: &mut [[f32; 3]],
) {
    let vertex = |i: u32| Vec3::from_array(positions[(i - base) as usize]);
    let normal = indices
        .chunks_exact(3)
        .map(|tri| compute_normal(vertex(tri[0]), vertex(tri[1]), vertex(tri[2])))
        .find(|n| *n != Vec3::ZERO)
        .unwrap_or(Vec3::ZERO);
    normals.fill(normal.to_array());
}

/// Writes the complete geometry of one cell into its window.
///
/// A cell whose vertices cannot be addressed with `u32` indices is left
/// untouched and logged.
pub fn synthesize_cell<R: Rng + ?Sized>(
    input: &CellInput<'_>,
    out: &mut CellSlice<'_>,
    rng: &mut R,
) {
    let Some(base) = vertex_base(out.index, out.positions.len()) else {
        warn!(
            "Cell {} ({}) is past the u32 vertex index range, skipping",
            out.index, input.coord
        );
        return;
    };
    let center = input.transform.cell_center(input.coord);
    match input.style.variant {
        TileVariant::Solid => {
            write_solid_vertices(center, input.transform, out.positions);
            write_solid_indices(base, out.indices);
        }
        TileVariant::Hollow => {
            write_hollow_vertices(
                center,
                input.style.inner_radius,
                input.transform,
                out.positions,
            );
            write_hollow_indices(base, out.indices);
        }
    }
    write_cell_normals(base, out.positions, out.indices, out.normals);
    write_cell_color(out.colors, rng);
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::layout::OrientationKind;
    use crate::mesh::TileMeshBuffers;

    fn approx(a: [f32; 3], b: Vec3) -> bool {
        (Vec3::from_array(a) - b).length() < 1e-5
    }

    fn build_one(variant: TileVariant, cell_index: usize, coord: AxialCoord) -> TileMeshBuffers {
        let transform = MapTransform::default();
        let mut buffers = TileMeshBuffers::allocate(cell_index + 1, variant);
        let input = CellInput {
            coord,
            transform: &transform,
            style: TileStyle {
                variant,
                inner_radius: 0.5,
            },
        };
        let mut rng = StdRng::seed_from_u64(5);
        for batch in buffers.batches_mut(cell_index + 1) {
            if let Some(mut cell) = batch.into_cells().nth(cell_index) {
                synthesize_cell(&input, &mut cell, &mut rng);
            }
        }
        buffers
    }

    // ── compute_normal ──────────────────────────────────────────────

    #[test]
    fn normal_of_xy_plane_triangle() {
        let n = compute_normal(Vec3::ZERO, Vec3::X, Vec3::Y);
        assert!((n - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn degenerate_triangle_returns_zero() {
        let n = compute_normal(Vec3::ZERO, Vec3::X, Vec3::X * 2.0);
        assert_eq!(n, Vec3::ZERO);
    }

    // ── solid ───────────────────────────────────────────────────────

    #[test]
    fn solid_tile_has_seven_vertices_and_six_triangles() {
        let b = build_one(TileVariant::Solid, 0, AxialCoord::ZERO);
        assert_eq!(b.positions.len(), 7);
        assert_eq!(b.indices.len(), 18);
        assert!(b.indices.iter().all(|&i| i < 7));
    }

    #[test]
    fn solid_fan_layout() {
        let mut indices = [0; SOLID_INDICES];
        write_solid_indices(0, &mut indices);
        assert_eq!(
            indices,
            [0, 1, 2, 0, 2, 3, 0, 3, 4, 0, 4, 5, 0, 5, 6, 0, 6, 1]
        );
    }

    #[test]
    fn solid_indices_are_offset_by_cell() {
        let mut indices = [0; SOLID_INDICES];
        write_solid_indices(vertex_base(3, SOLID_VERTS).unwrap(), &mut indices);
        assert!(indices.iter().all(|&i| (21..28).contains(&i)));
        assert_eq!(indices[0], 21);
    }

    #[test]
    fn solid_vertices_surround_center() {
        let t = MapTransform::default();
        let coord = AxialCoord::new(2, -1);
        let b = build_one(TileVariant::Solid, 0, coord);
        let center = t.cell_center(coord);
        assert!(approx(b.positions[0], center));
        for corner in 1..7 {
            let d = Vec3::from_array(b.positions[corner]).distance(center);
            assert!((d - 1.0).abs() < 1e-5, "corner {corner} at {d}");
        }
    }

    #[test]
    fn solid_triangles_face_up() {
        let b = build_one(TileVariant::Solid, 0, AxialCoord::ZERO);
        for n in &b.normals {
            assert!(approx(*n, Vec3::Y), "normal {n:?}");
        }
    }

    // ── hollow ──────────────────────────────────────────────────────

    #[test]
    fn hollow_tile_has_twelve_vertices_and_twelve_triangles() {
        let b = build_one(TileVariant::Hollow, 0, AxialCoord::ZERO);
        assert_eq!(b.positions.len(), 12);
        assert_eq!(b.indices.len(), 36);
        assert!(b.indices.iter().all(|&i| i < 12));
    }

    #[test]
    fn hollow_quad_layout() {
        let mut indices = [0; HOLLOW_INDICES];
        write_hollow_indices(0, &mut indices);
        assert_eq!(&indices[..6], &[0, 6, 1, 6, 7, 1]);
        assert_eq!(&indices[30..], &[5, 11, 0, 11, 6, 0]);
    }

    #[test]
    fn hollow_rims_use_inner_and_outer_radius() {
        let coord = AxialCoord::new(-1, 3);
        let b = build_one(TileVariant::Hollow, 0, coord);
        let center = MapTransform::default().cell_center(coord);
        for i in 0..6 {
            let inner = Vec3::from_array(b.positions[i]).distance(center);
            let outer = Vec3::from_array(b.positions[i + 6]).distance(center);
            assert!((inner - 0.5).abs() < 1e-5);
            assert!((outer - 1.0).abs() < 1e-5);
        }
        for n in &b.normals {
            assert!(approx(*n, Vec3::Y));
        }
    }

    #[test]
    fn hollow_with_zero_inner_radius_still_gets_normals() {
        let transform = MapTransform::new(OrientationKind::FlatTop, Vec2::ONE, Vec3::ZERO);
        let mut positions = [[0.0; 3]; HOLLOW_VERTS];
        let mut indices = [0; HOLLOW_INDICES];
        let mut normals = [[0.0; 3]; HOLLOW_VERTS];
        write_hollow_vertices(Vec3::ZERO, 0.0, &transform, &mut positions);
        write_hollow_indices(0, &mut indices);
        write_cell_normals(0, &positions, &indices, &mut normals);
        assert!(normals.iter().all(|n| approx(*n, Vec3::Y)));
    }

    #[test]
    fn hollow_normals_read_the_cell_window() {
        let base = vertex_base(1, HOLLOW_VERTS).unwrap();
        let mut positions = [[0.0; 3]; HOLLOW_VERTS];
        let mut indices = [0; HOLLOW_INDICES];
        let mut normals = [[0.0; 3]; HOLLOW_VERTS];
        write_hollow_vertices(Vec3::ZERO, 0.5, &MapTransform::default(), &mut positions);
        write_hollow_indices(base, &mut indices);
        assert!(indices.iter().all(|&i| (12..24).contains(&i)));
        write_cell_normals(base, &positions, &indices, &mut normals);
        assert!(normals.iter().all(|n| approx(*n, Vec3::Y)));
    }

    // ── vertex base ─────────────────────────────────────────────────

    #[test]
    fn vertex_base_is_index_times_stride() {
        assert_eq!(vertex_base(0, SOLID_VERTS), Some(0));
        assert_eq!(vertex_base(3, SOLID_VERTS), Some(21));
        assert_eq!(vertex_base(2, HOLLOW_VERTS), Some(24));
    }

    #[test]
    fn vertex_base_rejects_cells_past_u32() {
        // 613_566_756 * 7 == u32::MAX + 1 - 4: the base fits, the last corner does not.
        assert_eq!(vertex_base(613_566_755, SOLID_VERTS), Some(4_294_967_285));
        assert_eq!(vertex_base(613_566_756, SOLID_VERTS), None);
        assert_eq!(vertex_base(usize::MAX, HOLLOW_VERTS), None);
    }

    #[test]
    fn unaddressable_cell_is_left_untouched() {
        let transform = MapTransform::default();
        let input = CellInput {
            coord: AxialCoord::new(1, 1),
            transform: &transform,
            style: TileStyle::default(),
        };
        let mut positions = [[0.0; 3]; SOLID_VERTS];
        let mut indices = [0; SOLID_INDICES];
        let mut normals = [[0.0; 3]; SOLID_VERTS];
        let mut colors = [[0.0; 4]; SOLID_VERTS];
        let mut cell = CellSlice {
            index: 613_566_756,
            positions: &mut positions,
            indices: &mut indices,
            normals: &mut normals,
            colors: &mut colors,
        };
        let mut rng = StdRng::seed_from_u64(1);
        synthesize_cell(&input, &mut cell, &mut rng);
        assert!(positions.iter().all(|p| *p == [0.0; 3]));
        assert!(indices.iter().all(|&i| i == 0));
        assert!(normals.iter().all(|n| *n == [0.0; 3]));
        assert!(colors.iter().all(|c| *c == [0.0; 4]));
    }

    #[test]
    fn degenerate_indices_stay_on_the_first_vertex() {
        let mut indices = [9; SOLID_INDICES];
        write_degenerate_indices(vertex_base(4, SOLID_VERTS).unwrap(), &mut indices);
        assert!(indices.iter().all(|&i| i == 28));
    }

    // ── window sizes ────────────────────────────────────────────────

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic]
    fn solid_vertices_reject_a_hollow_window() {
        let mut positions = [[0.0; 3]; HOLLOW_VERTS];
        write_solid_vertices(Vec3::ZERO, &MapTransform::default(), &mut positions);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic]
    fn solid_indices_reject_a_hollow_window() {
        let mut indices = [0; HOLLOW_INDICES];
        write_solid_indices(0, &mut indices);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic]
    fn hollow_indices_reject_a_solid_window() {
        let mut indices = [0; SOLID_INDICES];
        write_hollow_indices(0, &mut indices);
    }

    // ── color ───────────────────────────────────────────────────────

    #[test]
    fn color_is_flat_across_the_cell() {
        let mut colors = [[0.0; 4]; SOLID_VERTS];
        let mut rng = StdRng::seed_from_u64(11);
        let c = write_cell_color(&mut colors, &mut rng);
        assert_eq!(c[3], 1.0);
        assert!(c[..3].iter().all(|v| (0.0..1.0).contains(v)));
        assert!(colors.iter().all(|v| *v == c));
    }

    #[test]
    fn color_consumes_three_draws() {
        let mut colors = [[0.0; 4]; 1];
        let mut a = StdRng::seed_from_u64(3);
        let mut b = StdRng::seed_from_u64(3);
        write_cell_color(&mut colors, &mut a);
        let expected: [f32; 3] = [
            b.gen_range(0.0..1.0),
            b.gen_range(0.0..1.0),
            b.gen_range(0.0..1.0),
        ];
        assert_eq!(&colors[0][..3], &expected);
        assert_eq!(a.gen_range(0.0..1.0_f32), b.gen_range(0.0..1.0_f32));
    }
}
