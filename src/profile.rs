//! Player profiles
//!
//! Profiles carry progression plus a snapshot of the last session: tower
//! placements, the tile layout and the first enemy route. The whole store
//! is persisted as one JSON file.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest accepted profile name, in characters
pub const MAX_NAME_LEN: usize = 20;

/// Profile store failures
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("profile file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed profile file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("a profile named {0:?} already exists")]
    DuplicateName(String),
    #[error("invalid profile name {0:?} (1-20 printable ASCII characters)")]
    InvalidName(String),
}

/// A placed tower, in grid cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TowerData {
    pub x: i32,
    pub y: i32,
    #[serde(rename = "type")]
    pub kind: i32,
    pub level: i32,
}

/// A route waypoint, in grid cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathPoint {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerProfile {
    pub name: String,
    pub level: i32,
    pub experience: i32,
    pub high_score: i32,
    pub saved_level: i32,
    pub saved_difficulty: f32,
    pub saved_gold: i32,
    pub saved_towers: Vec<TowerData>,
    /// Tile layout codes indexed `[y][x]`
    pub saved_map_layout: Vec<Vec<i32>>,
    pub saved_enemy_path: Vec<PathPoint>,
}

impl Default for PlayerProfile {
    fn default() -> Self {
        Self {
            name: String::new(),
            level: 1,
            experience: 0,
            high_score: 0,
            saved_level: 1,
            saved_difficulty: 1.0,
            saved_gold: 10,
            saved_towers: Vec::new(),
            saved_map_layout: Vec::new(),
            saved_enemy_path: Vec::new(),
        }
    }
}

impl PlayerProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// True once a session has been saved into this profile
    pub fn has_saved_session(&self) -> bool {
        !self.saved_map_layout.is_empty()
    }
}

fn is_valid_name(name: &str) -> bool {
    let len = name.chars().count();
    (1..=MAX_NAME_LEN).contains(&len) && name.chars().all(|c| matches!(c, ' '..='~'))
}

/// All known profiles plus the current selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileStore {
    profiles: Vec<PlayerProfile>,
    #[serde(skip)]
    current: Option<usize>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn profiles(&self) -> &[PlayerProfile] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Add a profile; names must be unique
    pub fn create(&mut self, name: &str) -> Result<usize, ProfileError> {
        if !is_valid_name(name) {
            return Err(ProfileError::InvalidName(name.to_string()));
        }
        if self.profiles.iter().any(|p| p.name == name) {
            return Err(ProfileError::DuplicateName(name.to_string()));
        }

        self.profiles.push(PlayerProfile::new(name));
        log::info!("Created profile {:?}", name);
        Ok(self.profiles.len() - 1)
    }

    /// Make `index` current. Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) {
        if let Some(profile) = self.profiles.get(index) {
            log::info!("Selected profile {:?}", profile.name);
            self.current = Some(index);
        }
    }

    /// Remove the profile at `index`. Out-of-range indices are ignored.
    pub fn delete(&mut self, index: usize) {
        if index >= self.profiles.len() {
            return;
        }

        let removed = self.profiles.remove(index);
        log::info!("Deleted profile {:?}", removed.name);
        self.current = match self.current {
            Some(current) if current == index => None,
            Some(current) if current > index => Some(current - 1),
            other => other,
        };
    }

    pub fn current(&self) -> Option<&PlayerProfile> {
        self.current.and_then(|i| self.profiles.get(i))
    }

    pub fn current_mut(&mut self) -> Option<&mut PlayerProfile> {
        self.current.and_then(|i| self.profiles.get_mut(i))
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Load the store from disk. A missing file yields an empty store.
    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No profile file at {}, starting fresh", path.display());
                return Ok(Self::new());
            }
            Err(e) => return Err(e.into()),
        };

        let store: Self = serde_json::from_str(&json)?;
        log::info!("Loaded {} profiles from {}", store.profiles.len(), path.display());
        Ok(store)
    }

    pub fn save(&self, path: &Path) -> Result<(), ProfileError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Saved {} profiles to {}", self.profiles.len(), path.display());
        Ok(())
    }
}
