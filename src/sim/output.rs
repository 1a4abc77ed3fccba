//! Per-frame snapshot handed to the presentation layer

use glam::Vec3;
use serde::Serialize;

use super::objective::BombProximity;
use super::state::{GameEvent, GameOutcome, GameState};
use super::timers::BuffStatus;
use super::volume::Capsule;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub capsule: Capsule,
    pub velocity: Vec3,
    pub on_floor: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectileView {
    pub slot: usize,
    pub center: Vec3,
    pub radius: f32,
}

/// Everything a renderer/HUD needs after one tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameOutput {
    pub player: PlayerView,
    /// Live projectiles only
    pub projectiles: Vec<ProjectileView>,
    pub nearest_bomb: Option<BombProximity>,
    pub bombs_remaining: usize,
    pub buff: Option<BuffStatus>,
    pub clock_remaining_secs: u32,
    pub outcome: GameOutcome,
    pub paused: bool,
    pub map_open: bool,
    pub events: Vec<GameEvent>,
}

impl FrameOutput {
    /// Snapshot `state`, taking its pending events
    pub fn capture(state: &mut GameState) -> Self {
        let events = state.drain_events();
        Self {
            player: PlayerView {
                capsule: state.player.capsule,
                velocity: state.player.velocity,
                on_floor: state.player.on_floor,
            },
            projectiles: state
                .pool
                .active()
                .map(|(slot, p)| ProjectileView {
                    slot,
                    center: p.center,
                    radius: p.radius,
                })
                .collect(),
            nearest_bomb: state.objectives.nearest(),
            bombs_remaining: state.objectives.remaining(),
            buff: state.buff.status(),
            clock_remaining_secs: state.clock.remaining_secs(),
            outcome: state.outcome,
            paused: state.paused,
            map_open: state.map_open,
            events,
        }
    }
}
