//! Concrete collaborators handed to the simulation every tick

use glam::Vec2;

use crate::audio::{AudioManager, SoundEffect};
use crate::damage_text::DamageTextManager;
use crate::settings::Settings;
use crate::sim::Services;

/// Owns the mixer and the damage numbers for one game window
#[derive(Debug, Clone, Default)]
pub struct GameServices {
    pub audio: AudioManager,
    pub damage_text: DamageTextManager,
}

impl GameServices {
    pub fn new(settings: &Settings) -> Self {
        let mut services = Self::default();
        services.apply_settings(settings);
        services
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.audio.set_master_volume(settings.master_volume);
        self.audio.set_music_volume(settings.music_volume);
        self.audio.set_sfx_volume(settings.sfx_volume);
        self.audio.set_muted(settings.muted);
    }
}

impl Services for GameServices {
    fn play_hit(&mut self) {
        self.audio.play(SoundEffect::Hit);
    }

    fn play_enemy_death(&mut self) {
        self.audio.play(SoundEffect::EnemyDeath);
    }

    fn play_tower_place(&mut self) {
        self.audio.play(SoundEffect::TowerPlace);
    }

    fn play_game_over(&mut self) {
        self.audio.stop_music();
        self.audio.play(SoundEffect::GameOver);
    }

    fn set_music_paused(&mut self, paused: bool) {
        if paused {
            self.audio.pause_music();
        } else {
            self.audio.resume_music();
        }
    }

    fn add_damage_text(&mut self, amount: i32, position: Vec2) {
        self.damage_text.add(amount, position);
    }

    fn update_damage_text(&mut self, dt: f32) {
        self.damage_text.update(dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::MusicState;

    #[test]
    fn test_game_over_stops_music() {
        let mut services = GameServices::new(&Settings::default());
        services.audio.play_music();
        services.play_game_over();
        assert_eq!(services.audio.music_state(), MusicState::Stopped);
        assert_eq!(services.audio.play_count(SoundEffect::GameOver), 1);
    }

    #[test]
    fn test_pause_round_trip() {
        let mut services = GameServices::default();
        services.audio.play_music();
        services.set_music_paused(true);
        assert_eq!(services.audio.music_state(), MusicState::Paused);
        services.set_music_paused(false);
        assert_eq!(services.audio.music_state(), MusicState::Playing);
    }

    #[test]
    fn test_settings_apply_to_mixer() {
        let settings = Settings {
            muted: true,
            ..Default::default()
        };
        let services = GameServices::new(&settings);
        assert_eq!(services.audio.effective_volume(), 0.0);
    }
}
