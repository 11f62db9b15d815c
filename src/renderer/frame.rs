//! Draw pass
//!
//! Flattens the game state into sprite instances and text items in paint
//! order. Nothing here reads back from the output.

use glam::Vec2;

use super::instance::{SpriteInstance, colors, texture_for, textures};
use crate::consts::{CELL_SIZE, WORLD_HEIGHT, WORLD_WIDTH};
use crate::damage_text::DamageTextManager;
use crate::settings::Settings;
use crate::sim::{Entity, GameMode, GameState, TileKind};
use crate::{cell_center, cell_of};

/// Entity sprites are 16px art drawn at 5x
pub const ENTITY_SPRITE_SIZE: f32 = 80.0;

#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    pub text: String,
    pub position: Vec2,
    pub size: f32,
    pub color: [f32; 4],
}

/// Everything drawn in one frame
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub sprites: Vec<SpriteInstance>,
    pub texts: Vec<TextItem>,
}

impl Frame {
    fn tiles(&mut self, state: &GameState, kind: TileKind) {
        for tile in state.grid.tiles(kind) {
            self.sprites.push(
                SpriteInstance::new(textures::TILE_SHEET, tile.center(), CELL_SIZE)
                    .sheet_cell(tile.variant),
            );
        }
    }

    fn entities(&mut self, entities: &[Entity]) {
        for entity in entities {
            self.sprites.push(
                SpriteInstance::new(texture_for(entity.sprite), entity.position, ENTITY_SPRITE_SIZE)
                    .rotated(entity.rotation),
            );
        }
    }
}

/// HUD lines shown during play
pub fn hud_text(state: &GameState, settings: &Settings) -> String {
    let mut text = format!(
        "Difficulty: {:.6}\nPlayer's Gold: {}",
        state.difficulty, state.gold
    );
    if settings.show_gold_rate {
        text.push_str(&format!("\nGold Per Second: {:.6}", state.gold_per_second));
    }
    text
}

/// Build the frame for the current mode
pub fn build_frame(
    state: &GameState,
    damage_text: &DamageTextManager,
    cursor: Option<Vec2>,
    settings: &Settings,
) -> Frame {
    let mut frame = Frame::default();
    frame.tiles(state, TileKind::Aesthetic);

    match state.mode {
        GameMode::Play => {
            frame.entities(&state.towers);
            frame.entities(&state.enemies);
            frame.entities(&state.projectiles);

            for text in damage_text.iter() {
                frame.texts.push(TextItem {
                    text: text.amount.to_string(),
                    position: text.position,
                    size: 36.0,
                    color: [1.0, 1.0, 1.0, text.alpha()],
                });
            }

            if let Some(cursor) = cursor {
                let tint = if state.can_place_tower(cursor) {
                    colors::PLACE_OK
                } else {
                    colors::PLACE_BLOCKED
                };
                frame.sprites.push(
                    SpriteInstance::new(textures::TOWER, cursor, ENTITY_SPRITE_SIZE).tinted(tint),
                );
            }

            if state.is_game_over() {
                frame.texts.push(TextItem {
                    text: "GAME OVER".to_string(),
                    position: Vec2::new(WORLD_WIDTH / 2.0, WORLD_HEIGHT / 2.0),
                    size: 96.0,
                    color: colors::GAME_OVER,
                });
            }

            frame.texts.push(TextItem {
                text: hud_text(state, settings),
                position: Vec2::new(10.0, 10.0),
                size: 24.0,
                color: colors::WHITE,
            });
        }
        GameMode::LevelEditor => {
            if settings.draw_path {
                frame.tiles(state, TileKind::Spawn);
                frame.tiles(state, TileKind::End);
                frame.tiles(state, TileKind::Path);
            }

            if let Some(cursor) = cursor {
                let option = state.palette.selected();
                frame.sprites.push(
                    SpriteInstance::new(textures::TILE_SHEET, cell_center(cell_of(cursor)), CELL_SIZE)
                        .sheet_cell(option.variant)
                        .tinted(colors::GHOST),
                );
            }
        }
    }

    frame
}
