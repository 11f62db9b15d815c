//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Seeded RNG only
//! - Stable iteration order (container insertion order)
//! - Side effects only through the injected `Services`
//! - No rendering or platform dependencies

pub mod collision;
pub mod entity;
pub mod path;
pub mod services;
pub mod state;
pub mod tick;

pub use collision::{Contact, contact, is_colliding, process_collision};
pub use entity::{Body, Entity, EntityId, Layers, Motion, PhysicsData, Shape, SpriteKind};
pub use path::{
    Path, PathNode, Tile, TileGrid, TileKind, TileOption, TilePalette, construct_paths,
};
pub use services::Services;
pub use state::{GameMode, GameState, Templates};
pub use tick::{TickInput, tick};
