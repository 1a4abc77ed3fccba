//! Kinematic integration
//!
//! Exponential damping plus gravity, advanced in fixed substeps so the feel does not
//! depend on frame rate and a long stall never injects more than the frame clamp of
//! simulated time.

use glam::{Vec2, Vec3};

use super::input::InputSource;
use super::pool::Projectile;
use super::state::PlayerBody;
use crate::consts::*;
use crate::{planar_forward, planar_right};

/// Substep schedule for one rendered frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStep {
    /// Duration of each substep
    pub dt: f32,
    pub substeps: u32,
}

impl FrameStep {
    /// Split `frame_delta` (clamped to `max_delta`) into `substeps` equal steps
    pub fn new(frame_delta: f32, max_delta: f32, substeps: u32) -> Self {
        let substeps = substeps.max(1);
        let frame_delta = if frame_delta.is_finite() { frame_delta.max(0.0) } else { 0.0 };
        Self {
            dt: frame_delta.min(max_delta) / substeps as f32,
            substeps,
        }
    }

    /// Total simulated time this frame
    pub fn total(&self) -> f32 {
        self.dt * self.substeps as f32
    }
}

/// `exp(-k*dt) - 1`, the per-step damping scale
#[inline]
fn damping(rate: f32, dt: f32) -> f32 {
    (-rate * dt).exp() - 1.0
}

/// Advance player velocity and position by one substep
pub fn integrate_player(player: &mut PlayerBody, gravity_delta: f32, dt: f32) {
    let mut scale = damping(PLAYER_DAMPING, dt);
    if !player.on_floor {
        player.velocity.y -= (GRAVITY + gravity_delta) * dt;
        // small air resistance
        scale *= AIR_DAMPING_FACTOR;
    }
    player.velocity += player.velocity * scale;
    player.capsule.translate(player.velocity * dt);
}

/// Move a projectile along its velocity
pub fn move_projectile(sphere: &mut Projectile, dt: f32) {
    sphere.center += sphere.velocity * dt;
}

/// Gravity when not touching the world, then damping
pub fn apply_projectile_forces(sphere: &mut Projectile, in_contact: bool, dt: f32) {
    if !in_contact {
        sphere.velocity.y -= GRAVITY * dt;
    }
    sphere.velocity += sphere.velocity * damping(SPHERE_DAMPING, dt);
}

/// Accelerate the player along the look direction.
///
/// `axis.y` is forward, `axis.x` is strafe right. Returns without effect when the
/// look direction is vertical.
pub fn apply_move_intent(
    player: &mut PlayerBody,
    axis: Vec2,
    look: Vec3,
    source: InputSource,
    speed_multiplier: f32,
    dt: f32,
) {
    let axis = axis.clamp(Vec2::NEG_ONE, Vec2::ONE);
    if axis == Vec2::ZERO {
        return;
    }
    let forward = planar_forward(look);
    if forward == Vec3::ZERO {
        return;
    }
    let gain = match source {
        InputSource::Keyboard if player.on_floor => KEYBOARD_GROUND_ACCEL,
        InputSource::Keyboard => KEYBOARD_AIR_ACCEL,
        InputSource::Controller => CONTROLLER_ACCEL,
    };
    let speed_delta = dt * gain * speed_multiplier;
    player.velocity += (forward * axis.y + planar_right(forward) * axis.x) * speed_delta;
}

/// Jump only from the floor
pub fn apply_jump(player: &mut PlayerBody) {
    if player.on_floor {
        player.velocity.y = JUMP_SPEED;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn airborne() -> PlayerBody {
        PlayerBody::at(Vec3::new(0.0, 10.0, 0.0))
    }

    #[test]
    fn test_frame_step_splits_delta() {
        let step = FrameStep::new(0.02, MAX_FRAME_DELTA, 5);
        assert!((step.dt - 0.004).abs() < 1e-7);
        assert_eq!(step.substeps, 5);
    }

    #[test]
    fn test_frame_step_clamps_stalls() {
        let step = FrameStep::new(3.0, MAX_FRAME_DELTA, 5);
        assert!((step.total() - MAX_FRAME_DELTA).abs() < 1e-6);
    }

    #[test]
    fn test_frame_step_rejects_garbage() {
        assert_eq!(FrameStep::new(f32::NAN, MAX_FRAME_DELTA, 5).dt, 0.0);
        assert_eq!(FrameStep::new(-1.0, MAX_FRAME_DELTA, 5).dt, 0.0);
        assert_eq!(FrameStep::new(0.01, MAX_FRAME_DELTA, 0).substeps, 1);
    }

    #[test]
    fn test_gravity_when_airborne() {
        let mut player = airborne();
        integrate_player(&mut player, 0.0, 0.01);
        assert!(player.velocity.y < 0.0);
        assert!((player.velocity.y + GRAVITY * 0.01).abs() < 0.01);
        assert!(player.capsule.start.y < 10.0);
    }

    #[test]
    fn test_gravity_delta_reduces_fall() {
        let mut normal = airborne();
        let mut floaty = airborne();
        integrate_player(&mut normal, 0.0, 0.01);
        integrate_player(&mut floaty, JUMP_BUFF_GRAVITY_DELTA, 0.01);
        assert!(floaty.velocity.y > normal.velocity.y);
    }

    #[test]
    fn test_ground_damping_slows_player() {
        let mut player = airborne();
        player.on_floor = true;
        player.velocity = Vec3::new(10.0, 0.0, 0.0);
        integrate_player(&mut player, 0.0, 0.01);
        let expected = 10.0 * (-PLAYER_DAMPING * 0.01f32).exp();
        assert!((player.velocity.x - expected).abs() < 1e-4);
        assert_eq!(player.velocity.y, 0.0);
    }

    #[test]
    fn test_projectile_gravity_only_without_contact() {
        let mut sphere = Projectile {
            center: Vec3::ZERO,
            radius: SPHERE_RADIUS,
            velocity: Vec3::ZERO,
            active: true,
        };
        apply_projectile_forces(&mut sphere, true, 0.01);
        assert_eq!(sphere.velocity, Vec3::ZERO);
        apply_projectile_forces(&mut sphere, false, 0.01);
        assert!(sphere.velocity.y < 0.0);
    }

    #[test]
    fn test_move_intent_follows_look() {
        let mut player = airborne();
        player.on_floor = true;
        apply_move_intent(
            &mut player,
            Vec2::new(0.0, 1.0),
            Vec3::new(1.0, -0.3, 0.0),
            InputSource::Keyboard,
            1.0,
            0.01,
        );
        assert!((player.velocity.x - KEYBOARD_GROUND_ACCEL * 0.01).abs() < 1e-5);
        assert_eq!(player.velocity.y, 0.0);
    }

    #[test]
    fn test_speed_multiplier_scales_intent() {
        let mut base = airborne();
        let mut fast = airborne();
        let axis = Vec2::new(1.0, 0.0);
        apply_move_intent(&mut base, axis, Vec3::NEG_Z, InputSource::Controller, 1.0, 0.01);
        apply_move_intent(&mut fast, axis, Vec3::NEG_Z, InputSource::Controller, 2.0, 0.01);
        assert!((fast.velocity.x - 2.0 * base.velocity.x).abs() < 1e-6);
        assert!(base.velocity.x > 0.0);
    }

    #[test]
    fn test_jump_requires_floor() {
        let mut player = airborne();
        apply_jump(&mut player);
        assert_eq!(player.velocity.y, 0.0);
        player.on_floor = true;
        apply_jump(&mut player);
        assert_eq!(player.velocity.y, JUMP_SPEED);
    }

    proptest! {
        #[test]
        fn prop_stall_clamp(frame in 0.0f32..100.0, substeps in 1u32..12) {
            let step = FrameStep::new(frame, MAX_FRAME_DELTA, substeps);
            prop_assert!(step.total() <= MAX_FRAME_DELTA + 1e-6);
            prop_assert!(step.dt >= 0.0);
        }
    }
}
