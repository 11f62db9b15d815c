//! Audio mixer state
//!
//! Tracks voice pools, background music and volumes. Playback itself is
//! left to whatever backend drains `AudioManager`; here each voice only
//! counts down its clip length so pool exhaustion behaves like a real mixer.

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Projectile leaves a tower
    Throw,
    /// Tower attack
    Hit,
    EnemyDeath,
    TowerPlace,
    GameOver,
}

impl SoundEffect {
    pub const ALL: [SoundEffect; 5] = [
        SoundEffect::Throw,
        SoundEffect::Hit,
        SoundEffect::EnemyDeath,
        SoundEffect::TowerPlace,
        SoundEffect::GameOver,
    ];

    /// Simultaneous voices available to this effect
    pub fn voices(self) -> usize {
        match self {
            SoundEffect::Throw => 8,
            SoundEffect::Hit => 5,
            SoundEffect::EnemyDeath => 3,
            SoundEffect::TowerPlace | SoundEffect::GameOver => 1,
        }
    }

    /// Nominal clip length in seconds
    pub fn duration(self) -> f32 {
        match self {
            SoundEffect::Throw => 0.35,
            SoundEffect::Hit => 0.25,
            SoundEffect::EnemyDeath => 0.6,
            SoundEffect::TowerPlace => 0.5,
            SoundEffect::GameOver => 2.5,
        }
    }

    /// Sound file under the asset root
    pub fn file(self) -> &'static str {
        match self {
            SoundEffect::Throw => "sound/axe_throw.wav",
            SoundEffect::Hit => "sound/axe_hit.wav",
            SoundEffect::EnemyDeath => "sound/enemy_death.wav",
            SoundEffect::TowerPlace => "sound/tower_place.wav",
            SoundEffect::GameOver => "sound/gameover.wav",
        }
    }

    fn index(self) -> usize {
        match self {
            SoundEffect::Throw => 0,
            SoundEffect::Hit => 1,
            SoundEffect::EnemyDeath => 2,
            SoundEffect::TowerPlace => 3,
            SoundEffect::GameOver => 4,
        }
    }
}

/// Looping background track
pub const MUSIC_FILE: &str = "sound/background.wav";

/// Background music transport state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MusicState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

#[derive(Debug, Clone)]
struct VoicePool {
    /// Seconds left on each voice, 0 when idle
    remaining: Vec<f32>,
    plays: u32,
}

impl VoicePool {
    fn new(voices: usize) -> Self {
        Self {
            remaining: vec![0.0; voices],
            plays: 0,
        }
    }

    fn busy(&self) -> usize {
        self.remaining.iter().filter(|r| **r > 0.0).count()
    }
}

/// Audio manager for the game
#[derive(Debug, Clone)]
pub struct AudioManager {
    pools: Vec<VoicePool>,
    music: MusicState,
    master_volume: f32,
    music_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        Self {
            pools: SoundEffect::ALL
                .iter()
                .map(|effect| VoicePool::new(effect.voices()))
                .collect(),
            music: MusicState::Stopped,
            master_volume: 1.0,
            music_volume: 0.5,
            sfx_volume: 0.7,
            muted: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set music volume (0.0 - 1.0)
    pub fn set_music_volume(&mut self, vol: f32) {
        self.music_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Get effective sound effect volume
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    pub fn effective_music_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.music_volume
        }
    }

    /// Start a sound effect. A pool with no idle voice restarts its first
    /// one; the tower-place sound is never restarted mid-clip.
    pub fn play(&mut self, effect: SoundEffect) {
        let pool = &mut self.pools[effect.index()];
        let voice = match pool.remaining.iter().position(|r| *r <= 0.0) {
            Some(idle) => idle,
            None if effect == SoundEffect::TowerPlace => return,
            None => 0,
        };
        pool.remaining[voice] = effect.duration();
        pool.plays += 1;
    }

    /// Advance every voice by `dt` seconds
    pub fn update(&mut self, dt: f32) {
        for pool in &mut self.pools {
            for remaining in &mut pool.remaining {
                *remaining = (*remaining - dt).max(0.0);
            }
        }
    }

    /// Voices of `effect` currently sounding
    pub fn active_voices(&self, effect: SoundEffect) -> usize {
        self.pools[effect.index()].busy()
    }

    /// Times `effect` has been started
    pub fn play_count(&self, effect: SoundEffect) -> u32 {
        self.pools[effect.index()].plays
    }

    // === Music ===

    pub fn music_state(&self) -> MusicState {
        self.music
    }

    /// Start the background loop unless it is already playing
    pub fn play_music(&mut self) {
        if self.music != MusicState::Playing {
            self.music = MusicState::Playing;
            log::debug!("Background music playing");
        }
    }

    pub fn pause_music(&mut self) {
        if self.music == MusicState::Playing {
            self.music = MusicState::Paused;
        }
    }

    pub fn resume_music(&mut self) {
        if self.music == MusicState::Paused {
            self.music = MusicState::Playing;
        }
    }

    pub fn stop_music(&mut self) {
        self.music = MusicState::Stopped;
    }
}
