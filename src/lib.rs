//! Maze Defuse - physics and game-state core for a first-person/VR maze game
//!
//! Core modules:
//! - `sim`: Simulation (integration, collisions, objectives, timers, input)
//! - `level`: Default maze layout and box geometry helpers
//! - `config`: Data-driven tunables loaded from JSON

pub mod config;
pub mod level;
pub mod sim;

pub use config::{ConfigError, SimConfig};
pub use level::LevelLayout;

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    use glam::Vec3;

    /// Maximum simulated time per rendered frame (stall clamp)
    pub const MAX_FRAME_DELTA: f32 = 0.05;
    /// Physics substeps per rendered frame
    pub const STEPS_PER_FRAME: u32 = 5;

    /// World gravity (units/s²)
    pub const GRAVITY: f32 = 50.0;

    /// Player capsule
    pub const PLAYER_RADIUS: f32 = 0.35;
    pub const PLAYER_HEIGHT: f32 = 0.65;
    /// Ground damping rate; airborne damping is scaled by `AIR_DAMPING_FACTOR`
    pub const PLAYER_DAMPING: f32 = 4.0;
    pub const AIR_DAMPING_FACTOR: f32 = 0.1;
    /// Vertical velocity set by a jump
    pub const JUMP_SPEED: f32 = 15.0;
    /// Movement gain per second (keyboard on floor / keyboard airborne / VR stick)
    pub const KEYBOARD_GROUND_ACCEL: f32 = 25.0;
    pub const KEYBOARD_AIR_ACCEL: f32 = 8.0;
    pub const CONTROLLER_ACCEL: f32 = 10.0;
    /// Minimum penetration depth that triggers positional correction
    pub const MIN_CORRECTION_DEPTH: f32 = 1e-10;

    /// Projectile pool
    pub const NUM_SPHERES: usize = 100;
    pub const SPHERE_RADIUS: f32 = 0.2;
    pub const SPHERE_DAMPING: f32 = 1.5;
    /// Bounce multiplier applied to the normal velocity component (> 1 is bouncier than a mirror)
    pub const SPHERE_RESTITUTION: f32 = 1.5;
    pub const THROW_IMPULSE: f32 = 20.0;
    pub const THROW_OFFSET: f32 = 0.5;
    /// Parking spot for inactive projectiles, far below the map
    pub const SPHERE_SENTINEL: Vec3 = Vec3::new(0.0, -100.0, 0.0);

    /// Objectives
    pub const INTERACT_DISTANCE: f32 = 2.5;
    pub const CRITICAL_DISTANCE: f32 = 5.0;
    pub const WARNING_DISTANCE: f32 = 15.0;
    pub const PICKUP_MARGIN: f32 = 1.5;

    /// Timers (seconds)
    pub const MISSION_SECONDS: u32 = 8 * 60;
    pub const DEFUSE_BONUS_SECONDS: u32 = 60;
    pub const BUFF_DURATION_SECONDS: u32 = 15;

    /// Buff effects
    pub const JUMP_BUFF_IMPULSE: f32 = 20.0;
    pub const JUMP_BUFF_GRAVITY_DELTA: f32 = -30.0;
    pub const SPEED_BUFF_MULTIPLIER: f32 = 2.0;

    /// Player eye height below which the player is teleported back to spawn
    pub const OUT_OF_BOUNDS_Y: f32 = -25.0;
}

/// Direction on the XZ plane for a look vector, or zero when looking straight up/down
#[inline]
pub fn planar_forward(look: Vec3) -> Vec3 {
    Vec3::new(look.x, 0.0, look.z).normalize_or_zero()
}

/// Right-hand side vector for a planar forward direction
#[inline]
pub fn planar_right(forward: Vec3) -> Vec3 {
    forward.cross(Vec3::Y)
}

/// True if `n` can be used as a contact normal
#[inline]
pub fn is_usable_normal(n: Vec3) -> bool {
    n.is_finite() && n.length_squared() > 1e-12
}
