//! Startup asset manifest
//!
//! The three gameplay sprites are required; the tile sheet, the font and
//! every sound are optional and only produce a warning when absent.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::audio::{MUSIC_FILE, SoundEffect};

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("required texture {name} not found at {}", path.display())]
    MissingTexture { name: &'static str, path: PathBuf },
}

/// Required gameplay textures: (name, path under the asset root)
pub const REQUIRED_TEXTURES: [(&str, &str); 3] = [
    ("tower", "image/player.png"),
    ("enemy", "image/enemy.png"),
    ("projectile", "image/axe.png"),
];

pub const TILE_SHEET: &str = "image/TileMap.png";
pub const FONT: &str = "Fonts/Kreon-Medium.ttf";

/// Resolved asset paths
#[derive(Debug, Clone)]
pub struct Assets {
    pub root: PathBuf,
    pub tower_texture: PathBuf,
    pub enemy_texture: PathBuf,
    pub projectile_texture: PathBuf,
    pub tile_sheet: Option<PathBuf>,
    pub font: Option<PathBuf>,
    pub music: Option<PathBuf>,
    /// Sound effects that were found on disk
    pub sounds: Vec<(SoundEffect, PathBuf)>,
}

fn optional(root: &Path, relative: &str) -> Option<PathBuf> {
    let path = root.join(relative);
    if path.is_file() {
        Some(path)
    } else {
        log::warn!("Optional asset missing: {}", path.display());
        None
    }
}

impl Assets {
    /// Check the manifest under `root`
    pub fn load(root: &Path) -> Result<Self, AssetError> {
        let [tower_texture, enemy_texture, projectile_texture] = [0, 1, 2].map(|i| {
            let (name, relative) = REQUIRED_TEXTURES[i];
            let path = root.join(relative);
            if path.is_file() {
                Ok(path)
            } else {
                Err(AssetError::MissingTexture { name, path })
            }
        });
        let (tower_texture, enemy_texture, projectile_texture) =
            (tower_texture?, enemy_texture?, projectile_texture?);

        let sounds = SoundEffect::ALL
            .iter()
            .filter_map(|&effect| optional(root, effect.file()).map(|path| (effect, path)))
            .collect::<Vec<_>>();

        let assets = Self {
            root: root.to_path_buf(),
            tower_texture,
            enemy_texture,
            projectile_texture,
            tile_sheet: optional(root, TILE_SHEET),
            font: optional(root, FONT),
            music: optional(root, MUSIC_FILE),
            sounds,
        };
        log::info!(
            "Assets ready under {} ({} sounds)",
            root.display(),
            assets.sounds.len()
        );
        Ok(assets)
    }
}
