use bevy::asset::RenderAssetUsages;
use bevy::mesh::Indices;
use bevy::prelude::*;
use bevy::render::render_resource::PrimitiveTopology;
use bevy::tasks::{ComputeTaskPool, TaskPool};
use bevy_egui::egui;

use super::HexMapConfig;
use super::entities::{
    BuildHexMap, DrawMeshTag, GenerateMeshTag, HexCreated, HexMap, HexMapRoot, HexSelected,
    MapCamera, PendingTileMesh, SelectHex,
};
use crate::events::HexMapEvents;
use crate::mesh::{GenerationRequest, TileMeshBuffers};
use crate::shapes::build_grid;

// ── Startup ─────────────────────────────────────────────────────────

/// Spawns the map root with a vertex-colored material and requests the first build.
pub fn spawn_hex_map(
    mut commands: Commands,
    mut materials: ResMut<Assets<StandardMaterial>>,
    config: Res<HexMapConfig>,
    mut build: MessageWriter<BuildHexMap>,
) {
    let tile_material = materials.add(StandardMaterial {
        base_color: Color::WHITE,
        unlit: true,
        cull_mode: None,
        ..default()
    });
    commands.spawn((
        HexMapRoot,
        Name::new("HexMap"),
        MeshMaterial3d(tile_material),
        Transform::default(),
        Visibility::default(),
    ));
    build.write(BuildHexMap {
        config: config.clone(),
    });
}

// ── Update: build → generate → draw ────────────────────────────────

/// Rebuilds the grid of every map root from the latest [`BuildHexMap`].
///
/// Earlier requests in the same frame are superseded.
pub fn build_requested_maps(
    mut commands: Commands,
    mut requests: MessageReader<BuildHexMap>,
    mut config: ResMut<HexMapConfig>,
    mut events: ResMut<HexMapEvents>,
    mut created: MessageWriter<HexCreated>,
    roots: Query<Entity, With<HexMapRoot>>,
) {
    let Some(request) = requests.read().last() else {
        return;
    };
    let cfg = &request.config;
    let grid = build_grid(cfg.shape, cfg.size, cfg.seed, Some(&mut *events));
    info!(
        "Built {:?} grid of size {}: {} cells, seed {}",
        cfg.shape,
        cfg.size,
        grid.len(),
        grid.seed()
    );
    for coord in grid.sorted_keys() {
        created.write(HexCreated(coord));
    }
    for root in &roots {
        commands.entity(root).insert((
            HexMap {
                grid: grid.clone(),
                transform: cfg.transform(),
                style: cfg.style(),
            },
            GenerateMeshTag,
        ));
    }
    config.set_if_neq(cfg.clone());
}

/// Runs tile generation on the compute pool for every tagged map.
pub fn generate_tile_meshes(
    mut commands: Commands,
    maps: Query<(Entity, &HexMap), With<GenerateMeshTag>>,
) {
    if maps.is_empty() {
        return;
    }
    let pool = ComputeTaskPool::get_or_init(TaskPool::default);
    for (entity, map) in &maps {
        let buffers = GenerationRequest::new(&map.grid, &map.transform, map.style).run(pool);
        commands
            .entity(entity)
            .remove::<GenerateMeshTag>()
            .insert((PendingTileMesh(buffers), DrawMeshTag));
    }
}

/// Moves pending buffers into a new mesh on their entity, then drops the pending data.
pub fn draw_tile_meshes(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut pending: Query<(Entity, &mut PendingTileMesh), With<DrawMeshTag>>,
) {
    for (entity, mut pending) in &mut pending {
        let buffers = std::mem::take(&mut pending.0);
        let mut entity_commands = commands.entity(entity);
        entity_commands.remove::<(DrawMeshTag, PendingTileMesh)>();

        if buffers.is_empty() {
            debug!("Hex map {entity} has no cells, clearing its mesh");
            entity_commands.remove::<Mesh3d>();
            continue;
        }
        if let Some(index) = first_out_of_range_index(&buffers) {
            warn!(
                "Hex map {entity}: triangle index {index} is past the {} generated vertices, skipping upload",
                buffers.positions.len()
            );
            continue;
        }
        debug!(
            "Uploading hex map {entity}: {} vertices, {} indices",
            buffers.positions.len(),
            buffers.indices.len()
        );
        entity_commands.insert(Mesh3d(meshes.add(tile_mesh(buffers))));
    }
}

/// Applies [`SelectHex`] requests to the session and announces them.
pub fn apply_selection(
    mut requests: MessageReader<SelectHex>,
    mut events: ResMut<HexMapEvents>,
    mut selected: MessageWriter<HexSelected>,
) {
    for SelectHex(coord) in requests.read() {
        events.select(*coord);
        selected.write(HexSelected(*coord));
    }
}

/// Draws `q, r, s` over every active cell as a screen-projected egui label.
pub fn draw_hex_labels(
    mut egui_ctx: Query<&mut bevy_egui::EguiContext>,
    camera_q: Query<(&Camera, &GlobalTransform), With<MapCamera>>,
    maps: Query<(&HexMap, &GlobalTransform)>,
    events: Res<HexMapEvents>,
    mut ready: Local<bool>,
) {
    if !*ready {
        *ready = true;
        return;
    }
    let Ok((camera, cam_gt)) = camera_q.single() else {
        return;
    };
    let Ok(mut ctx) = egui_ctx.single_mut() else {
        return;
    };
    let selected = events.selected();

    let painter = ctx.get_mut().layer_painter(egui::LayerId::background());

    for (map, map_gt) in &maps {
        for (coord, flag) in map.grid.iter() {
            if flag == 0 {
                continue;
            }
            let world_pos = map_gt.transform_point(map.transform.cell_center(coord));
            let Ok(viewport) = camera.world_to_viewport(cam_gt, world_pos) else {
                continue;
            };
            let color = if coord == selected {
                egui::Color32::YELLOW
            } else {
                egui::Color32::WHITE
            };
            painter.text(
                egui::pos2(viewport.x, viewport.y),
                egui::Align2::CENTER_CENTER,
                format!("{}, {}, {}", coord.q, coord.r, coord.s()),
                egui::FontId::proportional(11.0),
                color,
            );
        }
    }
}

// ── Pure helpers ───────────────────────────────────────────────────

fn first_out_of_range_index(buffers: &TileMeshBuffers) -> Option<u32> {
    let vertex_count = buffers.positions.len();
    buffers
        .indices
        .iter()
        .copied()
        .find(|&i| i as usize >= vertex_count)
}

fn tile_mesh(buffers: TileMeshBuffers) -> Mesh {
    Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    )
    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, buffers.positions)
    .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, buffers.normals)
    .with_inserted_attribute(Mesh::ATTRIBUTE_COLOR, buffers.colors)
    .with_inserted_indices(Indices::U32(buffers.indices))
}
