//! Thrown-sphere pool
//!
//! A fixed ring of projectiles allocated once. Each throw takes the next slot in
//! order, even if that sphere is still flying: the oldest throw is recalled and
//! re-launched from the emitter. Inactive spheres are parked at
//! [`SPHERE_SENTINEL`] instead of being removed.

use glam::Vec3;

use super::volume::Sphere;
use crate::consts::*;

/// A pooled projectile
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub center: Vec3,
    pub radius: f32,
    pub velocity: Vec3,
    pub active: bool,
}

impl Projectile {
    fn parked(radius: f32) -> Self {
        Self {
            center: SPHERE_SENTINEL,
            radius,
            velocity: Vec3::ZERO,
            active: false,
        }
    }

    pub fn collider(&self) -> Sphere {
        Sphere::new(self.center, self.radius)
    }

    /// Move to the sentinel and stop
    pub fn park(&mut self) {
        self.center = SPHERE_SENTINEL;
        self.velocity = Vec3::ZERO;
        self.active = false;
    }
}

#[derive(Debug, Clone)]
pub struct ProjectilePool {
    slots: Vec<Projectile>,
    next: usize,
}

impl ProjectilePool {
    /// Allocate `capacity` parked spheres (capacity is clamped to at least 1)
    pub fn new(capacity: usize, radius: f32) -> Self {
        Self {
            slots: vec![Projectile::parked(radius); capacity.max(1)],
            next: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Slot the next throw will use
    pub fn next_slot(&self) -> usize {
        self.next
    }

    pub fn slots(&self) -> &[Projectile] {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut [Projectile] {
        &mut self.slots
    }

    pub fn active(&self) -> impl Iterator<Item = (usize, &Projectile)> {
        self.slots.iter().enumerate().filter(|(_, p)| p.active)
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|p| p.active).count()
    }

    /// Launch the next sphere from `origin` along `forward`.
    ///
    /// Returns the slot used, or `None` if `forward` has no direction.
    pub fn throw(&mut self, origin: Vec3, forward: Vec3) -> Option<usize> {
        let dir = forward.normalize_or_zero();
        if dir == Vec3::ZERO || !origin.is_finite() {
            log::debug!("Throw ignored: degenerate emitter pose");
            return None;
        }

        let slot = self.next;
        let sphere = &mut self.slots[slot];
        if sphere.active {
            log::trace!("Throw recalls in-flight sphere {}", slot);
        }
        sphere.center = origin + dir * THROW_OFFSET;
        sphere.velocity = dir * THROW_IMPULSE;
        sphere.active = true;

        self.next = (self.next + 1) % self.slots.len();
        Some(slot)
    }

    pub fn park(&mut self, slot: usize) {
        if let Some(sphere) = self.slots.get_mut(slot) {
            sphere.park();
        }
    }
}
