//! Frame tick
//!
//! One call per rendered frame. Physics runs in fixed substeps of the clamped frame
//! delta; the mission clock and buff timer are fed the raw delta afterwards.

use glam::Vec3;

use super::collision::{
    resolve_player_projectile, resolve_player_world, resolve_projectile_pairs,
    resolve_projectile_world,
};
use super::input::FrameInput;
use super::integrate::{
    FrameStep, apply_jump, apply_move_intent, apply_projectile_forces, integrate_player,
    move_projectile,
};
use super::output::FrameOutput;
use super::state::{GameEvent, GameOutcome, GameState};
use super::volume::CollisionVolume;
use crate::consts::*;

/// Where thrown spheres leave from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub forward: Vec3,
}

/// Inputs for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub intents: FrameInput,
    /// Camera look direction (movement is relative to it)
    pub look: Vec3,
    /// Controller pose; throws come from the eye along `look` when absent
    pub emitter: Option<Pose>,
}

/// Advance the game by one rendered frame.
///
/// `world` is `None` until level geometry has loaded; physics is skipped meanwhile
/// but timers still run.
pub fn tick(
    state: &mut GameState,
    world: Option<&dyn CollisionVolume>,
    input: &TickInput,
    frame_delta: f32,
) -> FrameOutput {
    state.frame += 1;
    let intents = &input.intents;

    if state.in_progress() {
        if intents.pause {
            state.paused = !state.paused;
            log::info!("{}", if state.paused { "Paused" } else { "Resumed" });
            state.push_event(if state.paused {
                GameEvent::Paused
            } else {
                GameEvent::Resumed
            });
        }
        if intents.menu_toggle && !state.paused {
            state.map_open = !state.map_open;
            state.push_event(GameEvent::MapToggled {
                open: state.map_open,
            });
        }
    }

    // Everything freezes, remaining time included
    if state.paused {
        return FrameOutput::capture(state);
    }

    let elapsed = if frame_delta.is_finite() {
        frame_delta.max(0.0)
    } else {
        0.0
    };
    let in_progress = state.in_progress();

    if in_progress {
        state.elapsed_secs += f64::from(elapsed);
        if intents.throw {
            throw(state, input);
        }
    }

    if let Some(world) = world {
        let step = FrameStep::new(frame_delta, state.config.max_frame_delta, state.config.substeps);
        let steer = in_progress && !state.map_open;
        for _ in 0..step.substeps {
            if steer {
                apply_move_intent(
                    &mut state.player,
                    intents.move_axis,
                    input.look,
                    intents.source,
                    state.buff.speed_multiplier(),
                    step.dt,
                );
                if intents.jump {
                    apply_jump(&mut state.player);
                }
            }
            substep(state, world, step.dt, in_progress);
        }
    }

    state.objectives.scan(state.player.eye());
    if in_progress {
        if intents.interact {
            if let Some(index) = state.objectives.defuse_interactable() {
                let bonus_secs = state.config.defuse_bonus_seconds;
                state.clock.add_bonus(bonus_secs);
                state.push_event(GameEvent::BombDefused { index, bonus_secs });
            }
        }
        if state.objectives.all_defused() {
            let elapsed_seconds = state.elapsed_secs.floor() as u32;
            state.conclude(GameOutcome::Won { elapsed_seconds });
        }
    }

    if state.in_progress() {
        if state.buff.advance(elapsed) {
            log::info!("Buff expired");
            state.push_event(GameEvent::BuffExpired);
        }
        if state.clock.advance(elapsed) {
            state.conclude(GameOutcome::Lost);
        }
    }

    FrameOutput::capture(state)
}

fn throw(state: &mut GameState, input: &TickInput) {
    let pose = input.emitter.unwrap_or(Pose {
        position: state.player.eye(),
        forward: input.look,
    });
    if let Some(slot) = state.pool.throw(pose.position, pose.forward) {
        state.push_event(GameEvent::Thrown { slot });
    }
}

/// One physics substep: world contacts first, then body-vs-body
fn substep(state: &mut GameState, world: &dyn CollisionVolume, dt: f32, in_progress: bool) {
    integrate_player(&mut state.player, state.buff.gravity_delta(), dt);
    resolve_player_world(&mut state.player, world);

    for sphere in state.pool.slots_mut().iter_mut().filter(|s| s.active) {
        move_projectile(sphere, dt);
        let touching = resolve_projectile_world(sphere, world);
        apply_projectile_forces(sphere, touching, dt);
    }
    for sphere in state.pool.slots_mut().iter_mut().filter(|s| s.active) {
        resolve_player_projectile(&mut state.player, sphere);
    }
    resolve_projectile_pairs(state.pool.slots_mut());

    if in_progress {
        for index in state.objectives.collect_pickups(&mut state.pool) {
            state.push_event(GameEvent::CubeConsumed { index });
            state.activate_random_buff();
        }
    }

    if state.player.eye().y < OUT_OF_BOUNDS_Y {
        log::info!("Player out of bounds, respawning");
        state.player.respawn(state.spawn);
        state.push_event(GameEvent::PlayerRespawned);
    }
    for sphere in state.pool.slots_mut().iter_mut() {
        if sphere.active && sphere.center.y < OUT_OF_BOUNDS_Y {
            sphere.park();
        }
    }
}
