//! Simulated objects and their physics data
//!
//! Towers, enemies and projectiles are all `Entity` values. New entities
//! are stamped out of preconfigured templates with [`Entity::spawn`].

use std::ops::BitOr;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::services::Services;
use crate::tuning::Tuning;

/// Stable entity handle, unique for the lifetime of a `GameState`
pub type EntityId = u32;

/// Collision layer bitmask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Layers(u32);

impl Layers {
    pub const NONE: Layers = Layers(0);
    pub const ENEMY: Layers = Layers(0b0001);
    pub const TOWER: Layers = Layers(0b0010);
    pub const PROJECTILE: Layers = Layers(0b0100);

    /// True if any bit is shared
    pub const fn intersects(self, other: Layers) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for Layers {
    type Output = Layers;

    fn bitor(self, rhs: Layers) -> Layers {
        Layers(self.0 | rhs.0)
    }
}

/// Collision shape, centered on the entity position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle { radius: f32 },
    /// Axis-aligned rectangle
    Rectangle { width: f32, height: f32 },
}

/// Motion class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Motion {
    /// Never moves, but other bodies still collide with it
    Static,
    /// Integrates velocity and impulse every physics step
    Dynamic,
}

/// Which sprite an entity draws with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpriteKind {
    Tower,
    Enemy,
    Projectile,
}

/// Positioned shape, the only thing the narrow phase looks at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub position: Vec2,
    pub shape: Shape,
}

impl Body {
    pub fn circle(position: Vec2, radius: f32) -> Self {
        Self {
            position,
            shape: Shape::Circle { radius },
        }
    }

    pub fn rectangle(position: Vec2, width: f32, height: f32) -> Self {
        Self {
            position,
            shape: Shape::Rectangle { width, height },
        }
    }
}

/// Physics state of an entity
#[derive(Debug, Clone)]
pub struct PhysicsData {
    shape: Shape,
    motion: Motion,
    layers: Layers,
    ignored_layers: Layers,
    /// Entities this one never collides with, whatever their layer
    ignored: Vec<EntityId>,
    /// Persistent velocity (units/s), rewritten by steering every frame
    velocity: Vec2,
    /// One-shot displacement, cleared after integration
    impulse: Vec2,
    /// Partners already resolved this physics step
    collided: Vec<EntityId>,
}

impl PhysicsData {
    fn new(motion: Motion, shape: Shape) -> Self {
        Self {
            shape,
            motion,
            layers: Layers::NONE,
            ignored_layers: Layers::NONE,
            ignored: Vec::new(),
            velocity: Vec2::ZERO,
            impulse: Vec2::ZERO,
            collided: Vec::new(),
        }
    }

    #[inline]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    #[inline]
    pub fn motion(&self) -> Motion {
        self.motion
    }

    #[inline]
    pub fn is_dynamic(&self) -> bool {
        self.motion == Motion::Dynamic
    }

    pub fn is_in_any_layer(&self, layers: Layers) -> bool {
        self.layers.intersects(layers)
    }

    pub fn impulse(&self) -> Vec2 {
        self.impulse
    }

    pub fn add_impulse(&mut self, impulse: Vec2) {
        self.impulse += impulse;
    }

    /// Return the accumulated impulse and reset it
    pub fn take_impulse(&mut self) -> Vec2 {
        std::mem::take(&mut self.impulse)
    }

    pub fn clear_collisions(&mut self) {
        self.collided.clear();
    }

    pub fn has_collided_with(&self, other: EntityId) -> bool {
        self.collided.contains(&other)
    }

    pub fn record_collision(&mut self, other: EntityId) {
        self.collided.push(other);
    }
}

/// A tower, enemy or projectile
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub position: Vec2,
    /// Sprite rotation in degrees
    pub rotation: f32,
    pub sprite: SpriteKind,
    physics: PhysicsData,
    health: i32,
    deletion_requested: bool,
    /// Index into the path list, assigned once at spawn (enemies)
    pub path_index: usize,
    /// Seconds until the next shot (towers)
    pub attack_timer: f32,
    /// Seconds left to live (projectiles)
    pub ttl: f32,
}

impl Entity {
    /// Create a template with a fixed shape and motion class
    pub fn new(sprite: SpriteKind, motion: Motion, shape: Shape) -> Self {
        Self {
            id: 0,
            position: Vec2::ZERO,
            rotation: 0.0,
            sprite,
            physics: PhysicsData::new(motion, shape),
            health: 0,
            deletion_requested: false,
            path_index: 0,
            attack_timer: 0.0,
            ttl: 0.0,
        }
    }

    pub fn with_layers(mut self, layers: Layers) -> Self {
        self.physics.layers = layers;
        self
    }

    pub fn ignoring_layers(mut self, layers: Layers) -> Self {
        self.physics.ignored_layers = layers;
        self
    }

    pub fn with_health(mut self, health: i32) -> Self {
        self.health = health;
        self
    }

    pub fn with_attack_timer(mut self, seconds: f32) -> Self {
        self.attack_timer = seconds;
        self
    }

    pub fn with_ttl(mut self, seconds: f32) -> Self {
        self.ttl = seconds;
        self
    }

    /// Copy this template into a live entity at `position`
    pub fn spawn(&self, id: EntityId, position: Vec2) -> Entity {
        let mut entity = self.clone();
        entity.id = id;
        entity.position = position;
        entity.physics.clear_collisions();
        entity
    }

    pub fn physics(&self) -> &PhysicsData {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut PhysicsData {
        &mut self.physics
    }

    pub fn body(&self) -> Body {
        Body {
            position: self.position,
            shape: self.physics.shape,
        }
    }

    pub fn velocity(&self) -> Vec2 {
        self.physics.velocity
    }

    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.physics.velocity = velocity;
    }

    /// Translate without any collision check
    #[inline]
    pub fn move_by(&mut self, offset: Vec2) {
        self.position += offset;
    }

    pub fn add_ignored_entity(&mut self, other: EntityId) {
        self.physics.ignored.push(other);
    }

    /// True if collisions against `other` are skipped entirely
    pub fn ignores(&self, other: &Entity) -> bool {
        self.physics.ignored.contains(&other.id)
            || other.physics.is_in_any_layer(self.physics.ignored_layers)
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn is_deletion_requested(&self) -> bool {
        self.deletion_requested
    }

    pub fn request_deletion(&mut self) {
        self.deletion_requested = true;
    }

    /// Subtract health and report the hit. Health is not clamped.
    pub fn deal_damage(&mut self, amount: i32, services: &mut dyn Services) {
        self.health -= amount;
        services.add_damage_text(amount, self.position);
        if self.health <= 0 {
            self.deletion_requested = true;
        }
    }

    /// React to touching `other`.
    ///
    /// Called once per ordering of a colliding pair, so only the receiver
    /// side of each rule is handled here. Entities awaiting deletion are inert.
    pub fn on_collision(&mut self, other: &mut Entity, tuning: &Tuning, services: &mut dyn Services) {
        if self.deletion_requested || other.deletion_requested {
            return;
        }

        if self.physics.is_in_any_layer(Layers::ENEMY)
            && other.physics.is_in_any_layer(Layers::PROJECTILE)
        {
            let away = (self.position - other.position).normalize_or_zero();
            self.physics.add_impulse(away * tuning.knockback_impulse);
            self.deal_damage(tuning.hit_damage, services);
            other.request_deletion();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::services::tests::Recorder;

    fn enemy() -> Entity {
        Entity::new(SpriteKind::Enemy, Motion::Dynamic, Shape::Circle { radius: 40.0 })
            .with_layers(Layers::ENEMY)
            .with_health(3)
    }

    fn projectile() -> Entity {
        Entity::new(SpriteKind::Projectile, Motion::Dynamic, Shape::Circle { radius: 40.0 })
            .with_layers(Layers::PROJECTILE)
            .ignoring_layers(Layers::PROJECTILE | Layers::TOWER)
    }

    #[test]
    fn test_layers() {
        let mask = Layers::TOWER | Layers::PROJECTILE;
        assert_eq!(mask, Layers::PROJECTILE | Layers::TOWER);
        assert!(mask.intersects(Layers::TOWER));
        assert!(!mask.intersects(Layers::ENEMY));
        assert!(!Layers::NONE.intersects(mask));
    }

    #[test]
    fn test_spawn_copies_template() {
        let template = enemy();
        let a = template.spawn(1, Vec2::new(10.0, 20.0));
        let b = template.spawn(2, Vec2::new(30.0, 40.0));
        assert_eq!(a.id, 1);
        assert_eq!(b.position, Vec2::new(30.0, 40.0));
        assert_eq!(a.health(), 3);
        assert_eq!(a.physics().shape(), b.physics().shape());
        assert_eq!(template.position, Vec2::ZERO);
    }

    #[test]
    fn test_collision_ledger() {
        let mut e = enemy().spawn(1, Vec2::ZERO);
        assert!(!e.physics().has_collided_with(7));
        e.physics_mut().record_collision(7);
        assert!(e.physics().has_collided_with(7));
        e.physics_mut().clear_collisions();
        assert!(!e.physics().has_collided_with(7));
    }

    #[test]
    fn test_ignores_by_layer_and_id() {
        let axe = projectile().spawn(1, Vec2::ZERO);
        let other_axe = projectile().spawn(2, Vec2::ZERO);
        let mut target = enemy().spawn(3, Vec2::ZERO);
        assert!(axe.ignores(&other_axe));
        assert!(!axe.ignores(&target));

        let friend = enemy().spawn(4, Vec2::ZERO);
        assert!(!target.ignores(&friend));
        target.add_ignored_entity(4);
        assert!(target.ignores(&friend));
    }

    #[test]
    fn test_deal_damage_requests_deletion() {
        let mut services = Recorder::default();
        let mut e = enemy().spawn(1, Vec2::new(5.0, 5.0));
        e.deal_damage(2, &mut services);
        assert_eq!(e.health(), 1);
        assert!(!e.is_deletion_requested());
        e.deal_damage(5, &mut services);
        assert_eq!(e.health(), -4);
        assert!(e.is_deletion_requested());
        assert_eq!(services.damage_texts, vec![(2, Vec2::new(5.0, 5.0)), (5, Vec2::new(5.0, 5.0))]);
    }

    #[test]
    fn test_projectile_hit_is_order_independent() {
        let tuning = Tuning::default();
        let mut services = Recorder::default();
        let mut target = enemy().spawn(1, Vec2::new(100.0, 0.0));
        let mut axe = projectile().spawn(2, Vec2::new(60.0, 0.0));

        // Projectile as receiver does nothing, enemy as receiver takes the hit
        axe.on_collision(&mut target, &tuning, &mut services);
        assert_eq!(target.health(), 3);
        target.on_collision(&mut axe, &tuning, &mut services);

        assert_eq!(target.health(), 2);
        assert!(axe.is_deletion_requested());
        assert_eq!(target.physics().impulse(), Vec2::new(80.0, 0.0));
    }

    #[test]
    fn test_spent_projectile_is_inert() {
        let tuning = Tuning::default();
        let mut services = Recorder::default();
        let mut target = enemy().spawn(1, Vec2::ZERO);
        let mut axe = projectile().spawn(2, Vec2::ZERO);
        axe.request_deletion();
        target.on_collision(&mut axe, &tuning, &mut services);
        assert_eq!(target.health(), 3);
        // Coincident centers give no knockback direction
        assert_eq!(target.physics().impulse(), Vec2::ZERO);
    }

    #[test]
    fn test_take_impulse_clears() {
        let mut e = enemy().spawn(1, Vec2::ZERO);
        e.physics_mut().add_impulse(Vec2::new(1.0, 2.0));
        e.physics_mut().add_impulse(Vec2::new(1.0, 0.0));
        assert_eq!(e.physics_mut().take_impulse(), Vec2::new(2.0, 2.0));
        assert_eq!(e.physics().impulse(), Vec2::ZERO);
    }
}
