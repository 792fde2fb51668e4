//! Hex tile map viewer.
//!
//! Builds a map from a RON config and command-line overrides, renders it from
//! a fixed top-down camera, and rebuilds it with a fresh seed on `R`.

use bevy::app::AppExit;
use bevy::prelude::*;
use bevy_inspector_egui::quick::WorldInspectorPlugin;
use hex_tiles::GameState;
use hex_tiles::hex_map::{BuildHexMap, ConfigError, HexMapConfig, HexMapPlugin, MapCamera};

#[cfg(feature = "native")]
mod cli {
    use std::path::PathBuf;

    use hex_tiles::hex_map::{ConfigError, HexMapConfig};
    use hex_tiles::layout::OrientationKind;
    use hex_tiles::shapes::GridShape;

    /// Command-line overrides; each one beats the config file.
    #[derive(clap::Parser, Debug)]
    #[command(version, about = "Procedural hex tile map viewer")]
    pub struct Cli {
        /// RON map config to start from.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Grid fill pattern.
        #[arg(long, value_enum)]
        shape: Option<GridShape>,
        /// Shape size.
        #[arg(long)]
        size: Option<i32>,
        /// Build ring tiles.
        #[arg(long)]
        hollow: bool,
        /// Inner rim of ring tiles, 0..=1.
        #[arg(long)]
        inner_radius: Option<f32>,
        /// Flat-top hexagons.
        #[arg(long)]
        flat_top: bool,
        /// Fixed color seed.
        #[arg(long)]
        seed: Option<u32>,
    }

    impl Cli {
        /// Loads the config file (if any) and applies the overrides.
        ///
        /// A config file that fails to load is reported alongside the defaults.
        pub fn resolve(self) -> (HexMapConfig, Option<ConfigError>) {
            let (mut config, error) = match &self.config {
                Some(path) => match HexMapConfig::from_ron_file(path) {
                    Ok(config) => (config, None),
                    Err(err) => (HexMapConfig::default(), Some(err)),
                },
                None => (HexMapConfig::default(), None),
            };
            if let Some(shape) = self.shape {
                config.shape = shape;
            }
            if let Some(size) = self.size {
                config.size = size;
            }
            if self.hollow {
                config.hollow = true;
            }
            if let Some(inner_radius) = self.inner_radius {
                config.inner_radius = inner_radius;
            }
            if self.flat_top {
                config.orientation = OrientationKind::FlatTop;
            }
            if let Some(seed) = self.seed {
                config.seed = Some(seed);
            }
            (config, error)
        }
    }
}

/// Config load failure, reported once logging is up.
#[derive(Resource)]
struct StartupConfigError(Option<ConfigError>);

fn main() {
    #[cfg(feature = "native")]
    let (config, config_error) = {
        use clap::Parser;
        cli::Cli::parse().resolve()
    };
    #[cfg(not(feature = "native"))]
    let (config, config_error) = (HexMapConfig::default(), None);

    let camera_height = config.size.max(1) as f32 * 3.5 + 6.0;

    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Hex Tiles".into(),
            ..default()
        }),
        ..default()
    }))
    .register_type::<GameState>()
    .init_state::<GameState>()
    .insert_resource(ClearColor(Color::srgb(0.02, 0.02, 0.03)))
    .insert_resource(StartupConfigError(config_error))
    .add_plugins(bevy_egui::EguiPlugin::default())
    .add_plugins(HexMapPlugin(config))
    .add_systems(
        Startup,
        (report_config_error, move |commands: Commands| {
            spawn_camera(commands, camera_height)
        }),
    )
    .add_systems(Update, exit_on_esc)
    .add_systems(Update, toggle_inspector)
    .add_systems(Update, rebuild_on_r)
    .add_plugins(WorldInspectorPlugin::new().run_if(in_state(GameState::Debugging)));

    app.run();
}

fn report_config_error(mut startup_error: ResMut<StartupConfigError>) {
    if let Some(err) = startup_error.0.take() {
        error!("{err}; using the default map config");
    }
}

fn spawn_camera(mut commands: Commands, height: f32) {
    commands.spawn((
        Name::new("MapCamera"),
        MapCamera,
        Camera3d::default(),
        Transform::from_xyz(0.0, height, height * 0.35).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

fn toggle_inspector(
    keys: Res<ButtonInput<KeyCode>>,
    state: Res<State<GameState>>,
    mut next: ResMut<NextState<GameState>>,
) {
    if keys.just_pressed(KeyCode::Tab) {
        next.set(match state.get() {
            GameState::Running => GameState::Debugging,
            GameState::Debugging => GameState::Running,
        });
    }
}

/// `R` rebuilds the map with a clock-derived seed.
fn rebuild_on_r(
    keys: Res<ButtonInput<KeyCode>>,
    config: Res<HexMapConfig>,
    mut build: MessageWriter<BuildHexMap>,
) {
    if keys.just_pressed(KeyCode::KeyR) {
        build.write(BuildHexMap {
            config: HexMapConfig {
                seed: None,
                ..config.clone()
            },
        });
    }
}

fn exit_on_esc(keys: Res<ButtonInput<KeyCode>>, mut exit: MessageWriter<AppExit>) {
    if keys.just_pressed(KeyCode::Escape) {
        exit.write(AppExit::Success);
    }
}
