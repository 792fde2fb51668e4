#![warn(missing_docs)]
//! Procedural hexagonal tile maps.
//!
//! Picks the cells of a map from a grid shape, places them with an axial
//! projection, and fills solid or hollow tile mesh buffers in parallel. The
//! [`hex_map`] plugin drives the pipeline inside a Bevy app.

pub mod activation;
pub mod axial;
pub mod events;
pub mod hex_map;
pub mod layout;
pub mod mesh;
pub mod shapes;

use bevy::prelude::*;

/// Application-wide state, used for system scheduling.
#[derive(States, Default, Debug, Clone, PartialEq, Eq, Hash, Reflect)]
pub enum GameState {
    /// Map on screen.
    #[default]
    Running,
    /// Inspector and coordinate labels visible (Tab to toggle).
    Debugging,
}
