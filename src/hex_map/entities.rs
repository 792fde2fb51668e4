use bevy::prelude::*;

use super::HexMapConfig;
use crate::activation::ActivationGrid;
use crate::axial::AxialCoord;
use crate::layout::MapTransform;
use crate::mesh::{TileMeshBuffers, TileStyle};

/// Marker on the entity that owns a map's grid and tile mesh.
#[derive(Component, Reflect, Default)]
pub struct HexMapRoot;

/// Marker on the camera used for coordinate labels.
#[derive(Component, Reflect, Default)]
pub struct MapCamera;

/// The built grid of a map root plus the projection and template it was built for.
#[derive(Component, Debug, Clone)]
pub struct HexMap {
    /// Cells of the map.
    pub grid: ActivationGrid,
    /// Projection shared by generation and labels.
    pub transform: MapTransform,
    /// Tile template.
    pub style: TileStyle,
}

/// Requests tile generation for a [`HexMap`].
#[derive(Component, Default)]
pub struct GenerateMeshTag;

/// Requests upload of the [`PendingTileMesh`] on the same entity.
#[derive(Component, Default)]
pub struct DrawMeshTag;

/// Generated buffers waiting for upload. Emptied by the upload.
#[derive(Component, Debug, Default)]
pub struct PendingTileMesh(pub TileMeshBuffers);

/// "Build the map now" with the given config.
#[derive(Message, Debug, Clone)]
pub struct BuildHexMap {
    /// Config for the new grid; its seed is used as given.
    pub config: HexMapConfig,
}

/// A cell was admitted while building a grid.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexCreated(pub AxialCoord);

/// Request to make a cell the current selection.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectHex(pub AxialCoord);

/// The current selection changed.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexSelected(pub AxialCoord);
