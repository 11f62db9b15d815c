//! Game state and entity templates
//!
//! Everything one session needs lives in `GameState`: entity collections,
//! the tile grid and its routes, the economy counters and the seeded RNG
//! used for route assignment.

use glam::{IVec2, Vec2};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::collision::is_colliding;
use super::entity::{Body, Entity, EntityId, Layers, Motion, Shape, SpriteKind};
use super::path::{Path, Tile, TileGrid, TileKind, TilePalette, construct_paths};
use super::services::Services;
use crate::profile::{PathPoint, PlayerProfile, TowerData};
use crate::tuning::Tuning;
use crate::{cell_center, cell_of};

/// Top-level mode, toggled by the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameMode {
    #[default]
    Play,
    LevelEditor,
}

impl GameMode {
    pub fn toggled(self) -> Self {
        match self {
            GameMode::Play => GameMode::LevelEditor,
            GameMode::LevelEditor => GameMode::Play,
        }
    }
}

/// Preconfigured entities copied on spawn
#[derive(Debug, Clone)]
pub struct Templates {
    pub tower: Entity,
    pub enemy: Entity,
    pub projectile: Entity,
}

impl Templates {
    pub fn from_tuning(tuning: &Tuning) -> Self {
        let circle = Shape::Circle {
            radius: tuning.body_radius,
        };
        Self {
            tower: Entity::new(SpriteKind::Tower, Motion::Static, circle)
                .with_layers(Layers::TOWER)
                .with_attack_timer(tuning.tower_cooldown),
            enemy: Entity::new(SpriteKind::Enemy, Motion::Dynamic, circle)
                .with_layers(Layers::ENEMY)
                .with_health(tuning.enemy_health),
            projectile: Entity::new(SpriteKind::Projectile, Motion::Dynamic, circle)
                .with_layers(Layers::PROJECTILE)
                .ignoring_layers(Layers::PROJECTILE | Layers::TOWER)
                .with_ttl(tuning.projectile_ttl),
        }
    }
}

/// Tower type id written to profiles
pub const TOWER_TYPE_BASIC: i32 = 0;

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    pub tuning: Tuning,
    pub mode: GameMode,
    /// Pause flag as of the last tick
    pub paused: bool,
    pub templates: Templates,
    /// Collections iterate in insertion order; tie-breaks depend on it
    pub towers: Vec<Entity>,
    pub enemies: Vec<Entity>,
    pub projectiles: Vec<Entity>,
    pub grid: TileGrid,
    pub palette: TilePalette,
    /// Rebuilt from `grid` on every edit
    pub paths: Vec<Path>,

    // === Economy & difficulty ===
    pub gold: i32,
    pub health: i32,
    pub gold_gained_this_update: i32,
    pub time_in_play: f32,
    pub difficulty: f32,
    /// Smoothed gold income
    pub gold_per_second: f32,
    pub gold_rate_timer: f32,
    pub spawn_timer: f32,
    /// Game-over sound already played this session
    pub game_over_announced: bool,
    pub enemies_killed: u32,
    pub enemies_leaked: u32,

    seed: u64,
    rng: Pcg32,
    next_id: EntityId,
}

impl GameState {
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self {
            templates: Templates::from_tuning(&tuning),
            mode: GameMode::Play,
            paused: false,
            towers: Vec::new(),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            grid: TileGrid::new(),
            palette: TilePalette::new(),
            paths: Vec::new(),
            gold: tuning.initial_gold,
            health: tuning.initial_health,
            gold_gained_this_update: 0,
            time_in_play: 0.0,
            difficulty: 1.0,
            gold_per_second: 0.0,
            gold_rate_timer: 0.0,
            spawn_timer: 0.0,
            game_over_announced: false,
            enemies_killed: 0,
            enemies_leaked: 0,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
            tuning,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Start a new session on the current grid
    pub fn reset(&mut self) {
        self.towers.clear();
        self.enemies.clear();
        self.projectiles.clear();
        self.reset_counters();
        self.spawn_timer = 0.0;
        self.game_over_announced = false;
        self.enemies_killed = 0;
        self.enemies_leaked = 0;
        self.rng = Pcg32::seed_from_u64(self.seed);
    }

    /// Restore gold, health, difficulty and the income metric
    pub fn reset_counters(&mut self) {
        self.gold = self.tuning.initial_gold;
        self.health = self.tuning.initial_health;
        self.gold_gained_this_update = 0;
        self.time_in_play = 0.0;
        self.difficulty = 1.0;
        self.gold_per_second = 0.0;
        self.gold_rate_timer = 0.0;
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_game_over(&self) -> bool {
        self.health <= 0
    }

    /// Credit gold and count it toward the income metric
    pub fn add_gold(&mut self, amount: i32) {
        self.gold += amount;
        self.gold_gained_this_update += amount;
    }

    // === Grid editing ===

    /// Discard and re-enumerate every route
    pub fn rebuild_paths(&mut self) {
        self.paths = construct_paths(&self.grid);
        log::info!("Rebuilt paths: {} route(s)", self.paths.len());
    }

    /// Paint the selected palette tile at a world position
    pub fn place_tile(&mut self, pos: Vec2) -> bool {
        let option = self.palette.selected();
        let Some(kind) = option.kind else {
            return false;
        };
        self.grid.place(Tile::new(kind, cell_of(pos), option.variant));
        self.rebuild_paths();
        true
    }

    /// Erase the tile of the selected kind at a world position
    pub fn remove_tile(&mut self, pos: Vec2) -> bool {
        let Some(kind) = self.palette.selected().kind else {
            return false;
        };
        let removed = self.grid.remove(kind, cell_of(pos));
        if removed {
            self.rebuild_paths();
        }
        removed
    }

    // === Spawning ===

    /// Towers go on brick tiles only and never overlap each other
    pub fn can_place_tower(&self, pos: Vec2) -> bool {
        let probe = Body::circle(pos, 1.0);
        let on_brick = self
            .grid
            .tiles(TileKind::Aesthetic)
            .iter()
            .any(|tile| tile.is_buildable() && is_colliding(&probe, &tile.body()));
        if !on_brick {
            return false;
        }

        let footprint = Body {
            position: pos,
            shape: self.templates.tower.physics().shape(),
        };
        !self.towers.iter().any(|tower| is_colliding(&footprint, &tower.body()))
    }

    /// Buy and place a tower if affordable and the spot is free
    pub fn try_place_tower(&mut self, pos: Vec2, services: &mut dyn Services) -> bool {
        if self.gold < self.tuning.tower_cost || !self.can_place_tower(pos) {
            return false;
        }

        self.gold -= self.tuning.tower_cost;
        self.spawn_tower(pos);
        services.play_tower_place();
        true
    }

    pub fn spawn_tower(&mut self, pos: Vec2) -> EntityId {
        let id = self.next_entity_id();
        let tower = self.templates.tower.spawn(id, pos);
        self.towers.push(tower);
        id
    }

    /// Spawn an enemy at `pos` on a random route
    pub fn spawn_enemy(&mut self, pos: Vec2) -> Option<EntityId> {
        if self.paths.is_empty() {
            return None;
        }
        let id = self.next_entity_id();
        let mut enemy = self.templates.enemy.spawn(id, pos);
        enemy.path_index = self.rng.random_range(0..self.paths.len());
        log::debug!("Enemy {} spawned on route {}", id, enemy.path_index);
        self.enemies.push(enemy);
        Some(id)
    }

    pub fn spawn_projectile(&mut self, pos: Vec2, velocity: Vec2) -> EntityId {
        let id = self.next_entity_id();
        let mut projectile = self.templates.projectile.spawn(id, pos);
        projectile.set_velocity(velocity);
        self.projectiles.push(projectile);
        id
    }

    // === Profiles ===

    /// Snapshot towers, grid, first route, gold and difficulty
    pub fn save_to_profile(&self, profile: &mut PlayerProfile) {
        profile.saved_gold = self.gold;
        profile.saved_difficulty = self.difficulty;
        profile.saved_towers = self
            .towers
            .iter()
            .map(|tower| {
                let cell = cell_of(tower.position);
                TowerData {
                    x: cell.x,
                    y: cell.y,
                    kind: TOWER_TYPE_BASIC,
                    level: 1,
                }
            })
            .collect();
        profile.saved_map_layout = self.grid.to_layout();
        profile.saved_enemy_path = self
            .paths
            .first()
            .map(|path| path.cells().map(|c| PathPoint { x: c.x, y: c.y }).collect())
            .unwrap_or_default();
        log::info!(
            "Saved session to profile {:?} ({} towers)",
            profile.name,
            profile.saved_towers.len()
        );
    }

    /// Start a new session from a profile snapshot. Routes are rebuilt from
    /// the restored grid.
    pub fn restore_from_profile(&mut self, profile: &PlayerProfile) {
        self.reset();
        self.grid = TileGrid::from_layout(&profile.saved_map_layout);
        self.rebuild_paths();
        for tower in &profile.saved_towers {
            self.spawn_tower(cell_center(IVec2::new(tower.x, tower.y)));
        }
        self.gold = profile.saved_gold;
        self.difficulty = profile.saved_difficulty;
        log::info!(
            "Restored profile {:?} ({} towers)",
            profile.name,
            self.towers.len()
        );
    }
}
