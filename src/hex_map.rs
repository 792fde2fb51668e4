//! Hex map plugin: configuration, the map entity, tile generation and upload.
//!
//! A [`BuildHexMap`] message rebuilds the activation grid of every map root.
//! Generation then runs on the compute task pool, and the finished buffers are
//! moved into a [`Mesh`] on the same entity.

mod entities;
mod systems;

pub use entities::{
    BuildHexMap, DrawMeshTag, GenerateMeshTag, HexCreated, HexMap, HexMapRoot, HexSelected,
    MapCamera, PendingTileMesh, SelectHex,
};

use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::GameState;
use crate::events::HexMapEvents;
use crate::layout::{MapTransform, OrientationKind};
use crate::mesh::{TileStyle, TileVariant};
use crate::shapes::GridShape;

/// Map configuration: projection, tile template, and grid shape.
#[derive(Resource, Clone, Debug, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct HexMapConfig {
    /// Pointy-top or flat-top hexagons.
    pub orientation: OrientationKind,
    /// Per-axis cell size.
    pub scale: [f32; 2],
    /// Planar offset `x, y` and map height `z`.
    pub origin: [f32; 3],
    /// Build ring tiles instead of filled ones.
    pub hollow: bool,
    /// Inner rim of hollow tiles as a fraction of the outer rim.
    pub inner_radius: f32,
    /// Fill pattern.
    pub shape: GridShape,
    /// Shape size; negative sizes give an empty map.
    pub size: i32,
    /// Fixed seed for cell colors; `None` draws one from the clock on each build.
    pub seed: Option<u32>,
}

impl Default for HexMapConfig {
    fn default() -> Self {
        Self {
            orientation: OrientationKind::PointyTop,
            scale: [1.0, 1.0],
            origin: [0.0, 0.0, 0.0],
            hollow: false,
            inner_radius: 0.7,
            shape: GridShape::Hexagon,
            size: 8,
            seed: None,
        }
    }
}

/// Failure to load a [`HexMapConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read map config {}: {source}", path.display())]
    Io {
        /// File that was requested.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The contents are not a valid RON map config.
    #[error("Failed to parse map config RON: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

impl HexMapConfig {
    /// The projection described by this config.
    pub fn transform(&self) -> MapTransform {
        MapTransform::new(
            self.orientation,
            Vec2::from_array(self.scale),
            Vec3::from_array(self.origin),
        )
    }

    /// The tile template described by this config. The inner radius is clamped to `0..=1`.
    pub fn style(&self) -> TileStyle {
        TileStyle {
            variant: TileVariant::from_hollow(self.hollow),
            inner_radius: self.inner_radius.clamp(0.0, 1.0),
        }
    }

    /// Parses a RON config. Missing fields take their defaults.
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        ron::Options::default()
            .from_str(source)
            .map_err(ConfigError::from)
    }

    /// Reads and parses a RON config file.
    pub fn from_ron_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&source)
    }
}

/// Hex map plugin: spawns a map root at startup and keeps its tile mesh in sync.
pub struct HexMapPlugin(pub HexMapConfig);

impl Plugin for HexMapPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<HexMapConfig>()
            .register_type::<HexMapRoot>()
            .register_type::<MapCamera>()
            .insert_resource(self.0.clone())
            .init_resource::<HexMapEvents>()
            .add_message::<BuildHexMap>()
            .add_message::<HexCreated>()
            .add_message::<SelectHex>()
            .add_message::<HexSelected>()
            .add_systems(Startup, systems::spawn_hex_map)
            .add_systems(
                Update,
                (
                    systems::build_requested_maps,
                    systems::generate_tile_meshes,
                    systems::draw_tile_meshes,
                )
                    .chain(),
            )
            .add_systems(Update, systems::apply_selection);

        app.add_systems(
            Update,
            systems::draw_hex_labels.run_if(in_state(GameState::Debugging)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_a_solid_pointy_hexagon() {
        let config = HexMapConfig::default();
        assert_eq!(config.transform(), MapTransform::default());
        assert_eq!(config.style(), TileStyle::default());
        assert_eq!(config.shape, GridShape::Hexagon);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn partial_ron_keeps_defaults() {
        let config = HexMapConfig::from_ron_str("(hollow: true, size: 3, seed: Some(17))").unwrap();
        assert!(config.hollow);
        assert_eq!(config.size, 3);
        assert_eq!(config.seed, Some(17));
        assert_eq!(config.inner_radius, 0.7);
        assert_eq!(config.style().variant, TileVariant::Hollow);
    }

    #[test]
    fn full_ron_config() {
        let source = r#"(
            orientation: FlatTop,
            scale: (2.0, 0.5),
            origin: (1.0, -1.0, 3.0),
            hollow: false,
            inner_radius: 0.25,
            shape: HexagonRing,
            size: 4,
            seed: None,
        )"#;
        let config = HexMapConfig::from_ron_str(source).unwrap();
        assert_eq!(config.orientation, OrientationKind::FlatTop);
        assert_eq!(config.shape, GridShape::HexagonRing);
        let t = config.transform();
        assert_eq!(t.scale, Vec2::new(2.0, 0.5));
        assert_eq!(t.origin, Vec3::new(1.0, -1.0, 3.0));
    }

    #[test]
    fn config_survives_ron_roundtrip() {
        let config = HexMapConfig {
            shape: GridShape::Triangle,
            seed: Some(9),
            ..default()
        };
        let text = ron::to_string(&config).unwrap();
        assert_eq!(HexMapConfig::from_ron_str(&text).unwrap(), config);
    }

    #[test]
    fn inner_radius_is_clamped() {
        let config = HexMapConfig {
            inner_radius: 1.7,
            ..default()
        };
        assert_eq!(config.style().inner_radius, 1.0);
    }

    #[test]
    fn bad_ron_is_a_parse_error() {
        let err = HexMapConfig::from_ron_str("(shape: Octagon)").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = HexMapConfig::from_ron_file("/nonexistent/map.ron").unwrap_err();
        match err {
            ConfigError::Io { path, .. } => assert_eq!(path, PathBuf::from("/nonexistent/map.ron")),
            other => panic!("expected Io, got {other:?}"),
        }
    }
}
