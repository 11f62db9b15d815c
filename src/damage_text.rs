//! Floating damage numbers

use glam::Vec2;

/// Seconds a damage number stays on screen
pub const DAMAGE_TEXT_LIFE: f32 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct DamageText {
    pub amount: i32,
    pub position: Vec2,
    pub remaining: f32,
}

impl DamageText {
    /// Opacity, fading linearly from 1 to 0 over the text's life
    pub fn alpha(&self) -> f32 {
        (self.remaining / DAMAGE_TEXT_LIFE).clamp(0.0, 1.0)
    }
}

/// Live damage numbers in spawn order
#[derive(Debug, Clone, Default)]
pub struct DamageTextManager {
    texts: Vec<DamageText>,
}

impl DamageTextManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, amount: i32, position: Vec2) {
        self.texts.push(DamageText {
            amount,
            position,
            remaining: DAMAGE_TEXT_LIFE,
        });
    }

    /// Age every text and drop the expired ones
    pub fn update(&mut self, dt: f32) {
        for text in &mut self.texts {
            text.remaining -= dt;
        }
        self.texts.retain(|t| t.remaining > 0.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = &DamageText> {
        self.texts.iter()
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}
