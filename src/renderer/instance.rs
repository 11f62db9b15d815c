//! Instance data for textured sprite quads

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::sim::SpriteKind;

/// Which texture a sprite samples
pub mod textures {
    pub const TILE_SHEET: u32 = 0;
    pub const TOWER: u32 = 1;
    pub const ENEMY: u32 = 2;
    pub const PROJECTILE: u32 = 3;
}

/// One quad: centred at `position`, rotated by `rotation` degrees
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    pub position: [f32; 2],
    pub size: [f32; 2],
    pub rotation: f32,
    pub texture: u32,
    /// Cell of the 4x4 tile sheet (tile sheet only)
    pub sheet_cell: u32,
    pub color: [f32; 4],
}

impl SpriteInstance {
    pub fn new(texture: u32, position: Vec2, size: f32) -> Self {
        Self {
            position: position.to_array(),
            size: [size, size],
            rotation: 0.0,
            texture,
            sheet_cell: 0,
            color: colors::WHITE,
        }
    }

    pub fn rotated(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn sheet_cell(mut self, cell: u8) -> Self {
        self.sheet_cell = cell as u32;
        self
    }

    pub fn tinted(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }
}

pub fn texture_for(sprite: SpriteKind) -> u32 {
    match sprite {
        SpriteKind::Tower => textures::TOWER,
        SpriteKind::Enemy => textures::ENEMY,
        SpriteKind::Projectile => textures::PROJECTILE,
    }
}

/// Raw bytes ready for a vertex buffer upload
pub fn as_bytes(instances: &[SpriteInstance]) -> &[u8] {
    bytemuck::cast_slice(instances)
}

/// Colors for game elements
pub mod colors {
    pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const PLACE_OK: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
    pub const PLACE_BLOCKED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
    /// Editor cursor preview
    pub const GHOST: [f32; 4] = [1.0, 1.0, 1.0, 0.5];
    pub const GAME_OVER: [f32; 4] = [1.0, 0.2, 0.2, 1.0];
}
