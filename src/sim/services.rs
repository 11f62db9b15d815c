//! Side-effect interface the simulation calls into
//!
//! Audio and damage numbers are owned by the caller and passed into every
//! tick, so the sim itself holds no global state.

use glam::Vec2;

/// Fire-and-forget collaborators of the simulation
pub trait Services {
    /// Tower released a projectile
    fn play_hit(&mut self);
    fn play_enemy_death(&mut self);
    fn play_tower_place(&mut self);
    fn play_game_over(&mut self);
    /// Pause or resume background music
    fn set_music_paused(&mut self, paused: bool);
    /// Show a floating damage number at a world position
    fn add_damage_text(&mut self, amount: i32, position: Vec2);
    /// Advance damage number animations
    fn update_damage_text(&mut self, dt: f32);
}
