//! Tile Defense - a grid tower-defense game with a built-in level editor
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, paths, game loop)
//! - `renderer`: Draw pass that flattens the world into sprite instances
//! - `audio` / `damage_text` / `services`: Collaborators injected into the sim
//! - `profile`: Player profiles and session save/load
//! - `settings` / `tuning`: User preferences and data-driven game balance
//! - `assets`: Startup asset manifest checks

pub mod assets;
pub mod audio;
pub mod damage_text;
pub mod profile;
pub mod renderer;
pub mod services;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use profile::{PlayerProfile, ProfileStore};
pub use services::GameServices;
pub use settings::Settings;
pub use tuning::{LeakPolicy, Tuning};

use glam::{IVec2, Vec2};

/// Game configuration constants
pub mod consts {
    /// Edge length of one grid cell in world units
    pub const CELL_SIZE: f32 = 160.0;
    /// Frame step used by the headless runner (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;
    /// Playfield size in world units
    pub const WORLD_WIDTH: f32 = 1920.0;
    pub const WORLD_HEIGHT: f32 = 1080.0;
}

/// Grid cell containing a world position.
///
/// Truncates toward zero, so positions in (-CELL_SIZE, 0) map to cell 0.
#[inline]
pub fn cell_of(pos: Vec2) -> IVec2 {
    (pos / consts::CELL_SIZE).as_ivec2()
}

/// World-space center of a grid cell
#[inline]
pub fn cell_center(cell: IVec2) -> Vec2 {
    cell.as_vec2() * consts::CELL_SIZE + Vec2::splat(consts::CELL_SIZE / 2.0)
}

/// Sprite heading in degrees for a direction vector.
///
/// Sprites face +Y at 0°, angles grow clockwise in screen space and are
/// wrapped to [0, 360).
pub fn facing_degrees(dir: Vec2) -> f32 {
    if dir.x == 0.0 {
        return if dir.y > 0.0 { 0.0 } else { 180.0 };
    }
    let mut angle = dir.y.atan2(dir.x) - std::f32::consts::FRAC_PI_2;
    if angle < 0.0 {
        angle += std::f32::consts::TAU;
    }
    angle.to_degrees()
}
