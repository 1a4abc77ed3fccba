//! Bomb objectives and power-up cubes

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::pool::ProjectilePool;
use crate::consts::*;

/// A bomb to defuse. `defused` never reverts.
#[derive(Debug, Clone, PartialEq)]
pub struct BombTarget {
    pub position: Vec3,
    pub defused: bool,
}

/// A power-up cube. `consumed` never reverts.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerCube {
    pub position: Vec3,
    pub consumed: bool,
}

/// Distance band of the nearest live bomb (HUD colour hint)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProximityBand {
    Critical,
    Warning,
    Safe,
}

impl ProximityBand {
    pub fn for_distance(distance: f32) -> Self {
        if distance < CRITICAL_DISTANCE {
            ProximityBand::Critical
        } else if distance < WARNING_DISTANCE {
            ProximityBand::Warning
        } else {
            ProximityBand::Safe
        }
    }
}

/// Nearest live bomb as seen from the player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BombProximity {
    pub index: usize,
    pub distance: f32,
    pub band: ProximityBand,
    pub interactable: bool,
}

#[derive(Debug, Clone)]
pub struct Objectives {
    bombs: Vec<BombTarget>,
    cubes: Vec<PowerCube>,
    nearest: Option<BombProximity>,
}

impl Objectives {
    pub fn new(bombs: &[Vec3], cubes: &[Vec3]) -> Self {
        Self {
            bombs: bombs
                .iter()
                .map(|&position| BombTarget {
                    position,
                    defused: false,
                })
                .collect(),
            cubes: cubes
                .iter()
                .map(|&position| PowerCube {
                    position,
                    consumed: false,
                })
                .collect(),
            nearest: None,
        }
    }

    pub fn bombs(&self) -> &[BombTarget] {
        &self.bombs
    }

    pub fn cubes(&self) -> &[PowerCube] {
        &self.cubes
    }

    pub fn remaining(&self) -> usize {
        self.bombs.iter().filter(|b| !b.defused).count()
    }

    pub fn all_defused(&self) -> bool {
        self.remaining() == 0
    }

    /// Result of the last [`Objectives::scan`]
    pub fn nearest(&self) -> Option<BombProximity> {
        self.nearest
    }

    /// Bomb currently in reach of the defuse action
    pub fn interactable(&self) -> Option<usize> {
        self.nearest.filter(|n| n.interactable).map(|n| n.index)
    }

    /// Recompute the nearest live bomb from `eye`
    pub fn scan(&mut self, eye: Vec3) -> Option<BombProximity> {
        self.nearest = self
            .bombs
            .iter()
            .enumerate()
            .filter(|(_, b)| !b.defused)
            .map(|(index, b)| (index, eye.distance(b.position)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, distance)| BombProximity {
                index,
                distance,
                band: ProximityBand::for_distance(distance),
                interactable: distance < INTERACT_DISTANCE,
            });
        self.nearest
    }

    /// Mark a bomb defused. Returns false if it already was (or does not exist).
    pub fn defuse(&mut self, index: usize) -> bool {
        match self.bombs.get_mut(index) {
            Some(bomb) if !bomb.defused => {
                bomb.defused = true;
                if self.nearest.is_some_and(|n| n.index == index) {
                    self.nearest = None;
                }
                log::info!("Bomb {} defused, {} remaining", index, self.remaining());
                true
            }
            _ => false,
        }
    }

    /// Defuse whatever is interactable right now
    pub fn defuse_interactable(&mut self) -> Option<usize> {
        let index = self.interactable()?;
        self.defuse(index).then_some(index)
    }

    /// Check live projectiles against unconsumed cubes.
    ///
    /// Each hit consumes the cube and parks the projectile. Returns the consumed
    /// cube indices; each one is a buff activation request.
    pub fn collect_pickups(&mut self, pool: &mut ProjectilePool) -> Vec<usize> {
        let mut consumed = Vec::new();
        for sphere in pool.slots_mut().iter_mut().filter(|p| p.active) {
            let reach = sphere.radius + PICKUP_MARGIN;
            let hit = self.cubes.iter().position(|c| {
                !c.consumed && c.position.distance_squared(sphere.center) < reach * reach
            });
            if let Some(index) = hit {
                self.cubes[index].consumed = true;
                sphere.park();
                consumed.push(index);
            }
        }
        consumed
    }
}
