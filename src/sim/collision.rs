//! Collision response
//!
//! World contacts come from the [`CollisionVolume`]; body-vs-body contacts are sphere
//! overlaps. Body pairs swap the velocity components along the contact normal and
//! split the overlap equally, which behaves like an elastic collision between equal
//! masses.

use glam::Vec3;

use super::pool::Projectile;
use super::state::PlayerBody;
use super::volume::CollisionVolume;
use crate::consts::*;
use crate::is_usable_normal;

/// Coincident centers give no usable normal
const MIN_PAIR_DISTANCE_SQ: f32 = 1e-12;

/// Reflect the normal component of `velocity`, scaled by `restitution`.
///
/// `restitution = 2.0` is a perfect mirror; 1.0 would only cancel the normal part.
#[inline]
pub fn bounce_velocity(velocity: Vec3, normal: Vec3, restitution: f32) -> Vec3 {
    velocity - normal * (normal.dot(velocity) * restitution)
}

/// Resolve the player capsule against level geometry.
///
/// Sets `on_floor` from the contact normal, slides along walls and ceilings, stops
/// downward motion into floors, and pushes the capsule out of the surface.
pub fn resolve_player_world(player: &mut PlayerBody, world: &dyn CollisionVolume) {
    player.on_floor = false;

    let Some(contact) = world.capsule_intersect(&player.capsule) else {
        return;
    };
    if !is_usable_normal(contact.normal) || !contact.depth.is_finite() {
        log::warn!("Ignoring degenerate player contact: {:?}", contact);
        return;
    }

    player.on_floor = contact.normal.y > 0.0;
    let into_surface = contact.normal.dot(player.velocity);
    // Walls and ceilings slide; floors only stop motion driving into them
    if !player.on_floor || into_surface < 0.0 {
        player.velocity -= contact.normal * into_surface;
    }
    if contact.depth >= MIN_CORRECTION_DEPTH {
        player.capsule.translate(contact.normal * contact.depth);
    }
}

/// Bounce a projectile off level geometry. Returns true if it touched the world.
pub fn resolve_projectile_world(sphere: &mut Projectile, world: &dyn CollisionVolume) -> bool {
    let Some(contact) = world.sphere_intersect(&sphere.collider()) else {
        return false;
    };
    if !is_usable_normal(contact.normal) || !contact.depth.is_finite() {
        log::warn!("Ignoring degenerate projectile contact: {:?}", contact);
        return false;
    }
    sphere.velocity = bounce_velocity(sphere.velocity, contact.normal, SPHERE_RESTITUTION);
    sphere.center += contact.normal * contact.depth;
    true
}

/// Swap the components of `a` and `b` along `normal`
#[inline]
fn exchange_normal_velocity(a: &mut Vec3, b: &mut Vec3, normal: Vec3) {
    let va = normal * normal.dot(*a);
    let vb = normal * normal.dot(*b);
    *a += vb - va;
    *b += va - vb;
}

/// Overlap test on squared distance; returns (normal from `b` to `a`, half overlap)
#[inline]
fn sphere_overlap(a: Vec3, b: Vec3, reach: f32) -> Option<(Vec3, f32)> {
    let offset = a - b;
    let d2 = offset.length_squared();
    if d2 >= reach * reach || d2 < MIN_PAIR_DISTANCE_SQ {
        return None;
    }
    let dist = d2.sqrt();
    Some((offset / dist, (reach - dist) * 0.5))
}

/// All pairs of live projectiles
pub fn resolve_projectile_pairs(slots: &mut [Projectile]) {
    for i in 0..slots.len() {
        let (head, tail) = slots.split_at_mut(i + 1);
        let s1 = &mut head[i];
        if !s1.active {
            continue;
        }
        for s2 in tail.iter_mut().filter(|s| s.active) {
            let Some((normal, half)) = sphere_overlap(s1.center, s2.center, s1.radius + s2.radius)
            else {
                continue;
            };
            exchange_normal_velocity(&mut s1.velocity, &mut s2.velocity, normal);
            s1.center += normal * half;
            s2.center -= normal * half;
        }
    }
}

/// Player against one projectile.
///
/// The capsule is approximated by spheres at its start, end and midpoint.
pub fn resolve_player_projectile(player: &mut PlayerBody, sphere: &mut Projectile) {
    if !sphere.active {
        return;
    }
    let reach = player.capsule.radius + sphere.radius;
    for sample in 0..3 {
        let point = match sample {
            0 => player.capsule.start,
            1 => player.capsule.end,
            _ => player.capsule.center(),
        };
        let Some((normal, half)) = sphere_overlap(point, sphere.center, reach) else {
            continue;
        };
        exchange_normal_velocity(&mut player.velocity, &mut sphere.velocity, normal);
        player.capsule.translate(normal * half);
        sphere.center -= normal * half;
    }
}
