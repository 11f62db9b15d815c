//! Collision detection and response
//!
//! Brute-force all-pairs narrow phase over circles and axis-aligned
//! rectangles, with minimum-translation push-apart. There is no broad phase.

use glam::Vec2;

use super::entity::{Body, Entity, Motion, Shape};
use super::services::Services;
use crate::tuning::Tuning;

/// Overlap between two bodies
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit direction that moves the first body out of the second
    /// (zero when the direction is undefined, e.g. coincident centers)
    pub normal: Vec2,
    /// Penetration depth
    pub depth: f32,
}

impl Contact {
    fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            depth: self.depth,
        }
    }
}

/// Narrow phase: contact between `a` and `b`, if they overlap
pub fn contact(a: &Body, b: &Body) -> Option<Contact> {
    match (a.shape, b.shape) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            circle_circle(a.position, ra, b.position, rb)
        }
        (Shape::Circle { radius }, Shape::Rectangle { width, height }) => {
            circle_rect(a.position, radius, b.position, Vec2::new(width, height))
        }
        (Shape::Rectangle { width, height }, Shape::Circle { radius }) => {
            circle_rect(b.position, radius, a.position, Vec2::new(width, height))
                .map(Contact::flipped)
        }
        (
            Shape::Rectangle {
                width: wa,
                height: ha,
            },
            Shape::Rectangle {
                width: wb,
                height: hb,
            },
        ) => rect_rect(a.position, Vec2::new(wa, ha), b.position, Vec2::new(wb, hb)),
    }
}

/// Overlap test only, no response
#[inline]
pub fn is_colliding(a: &Body, b: &Body) -> bool {
    contact(a, b).is_some()
}

fn circle_circle(pa: Vec2, ra: f32, pb: Vec2, rb: f32) -> Option<Contact> {
    let a_to_b = pb - pa;
    let distance = a_to_b.length();
    let radii = ra + rb;
    if distance < radii {
        Some(Contact {
            normal: -a_to_b.normalize_or_zero(),
            depth: radii - distance,
        })
    } else {
        None
    }
}

/// Contact normal points from the rectangle toward the circle
fn circle_rect(center: Vec2, radius: f32, rect_pos: Vec2, size: Vec2) -> Option<Contact> {
    let half = size / 2.0;
    let closest = center.clamp(rect_pos - half, rect_pos + half);
    let to_closest = closest - center;
    let distance = to_closest.length();
    if distance < radius {
        Some(Contact {
            normal: -to_closest.normalize_or_zero(),
            depth: radius - distance,
        })
    } else {
        None
    }
}

/// Resolves along the axis of lesser overlap only
fn rect_rect(pa: Vec2, size_a: Vec2, pb: Vec2, size_b: Vec2) -> Option<Contact> {
    let distance = (pa - pb).abs();
    let overlap = (size_a + size_b) / 2.0 - distance;
    if overlap.x <= 0.0 || overlap.y <= 0.0 {
        return None;
    }

    let contact = if overlap.x < overlap.y {
        let sign = if pa.x < pb.x { -1.0 } else { 1.0 };
        Contact {
            normal: Vec2::new(sign, 0.0),
            depth: overlap.x,
        }
    } else {
        let sign = if pa.y < pb.y { -1.0 } else { 1.0 };
        Contact {
            normal: Vec2::new(0.0, sign),
            depth: overlap.y,
        }
    };
    Some(contact)
}

/// Push two overlapping entities apart.
///
/// Against a static partner the dynamic one moves the full depth; two
/// dynamic entities split it. Static entities are never moved.
pub fn process_collision(a: &mut Entity, b: &mut Entity) {
    let Some(contact) = contact(&a.body(), &b.body()) else {
        return;
    };
    let push = contact.normal * contact.depth;

    match (a.physics().motion(), b.physics().motion()) {
        (Motion::Dynamic, Motion::Static) => a.move_by(push),
        (Motion::Static, Motion::Dynamic) => b.move_by(-push),
        (Motion::Dynamic, Motion::Dynamic) => {
            let half = push * 0.5;
            a.move_by(half);
            b.move_by(-half);
        }
        (Motion::Static, Motion::Static) => {}
    }
}

/// Mutable access to two distinct slice elements
fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    debug_assert_ne!(i, j);
    if i < j {
        let (head, tail) = items.split_at_mut(j);
        (&mut head[i], &mut tail[0])
    } else {
        let (head, tail) = items.split_at_mut(i);
        (&mut tail[0], &mut head[j])
    }
}

/// Advance every dynamic entity by one physics step and resolve overlaps.
///
/// `entities` order is the iteration order; callers pass towers, then
/// enemies, then projectiles. A colliding pair fires `on_collision` in both
/// directions at most once per step, while push-apart runs on every visit.
pub fn step(entities: &mut [&mut Entity], dt: f32, tuning: &Tuning, services: &mut dyn Services) {
    let dt = dt.min(tuning.max_physics_dt);

    for entity in entities.iter_mut() {
        entity.physics_mut().clear_collisions();
    }

    for i in 0..entities.len() {
        if !entities[i].physics().is_dynamic() {
            continue;
        }

        let entity = &mut *entities[i];
        let impulse = entity.physics_mut().take_impulse();
        let offset = entity.velocity() * dt + impulse;
        entity.move_by(offset);

        for j in 0..entities.len() {
            if i == j {
                continue;
            }
            let (entity, other) = pair_mut(entities, i, j);
            let (entity, other) = (&mut **entity, &mut **other);
            if entity.ignores(other) {
                continue;
            }

            if !entity.physics().has_collided_with(other.id)
                && is_colliding(&entity.body(), &other.body())
            {
                entity.on_collision(other, tuning, services);
                other.on_collision(entity, tuning, services);

                entity.physics_mut().record_collision(other.id);
                other.physics_mut().record_collision(entity.id);
            }
            process_collision(entity, other);
        }
    }
}
