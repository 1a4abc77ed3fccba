//! Game state and core simulation types
//!
//! Everything the tick mutates lives in [`GameState`]; there is no global state.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::objective::Objectives;
use super::pool::ProjectilePool;
use super::timers::{Buff, BuffKind, MissionClock};
use super::volume::Capsule;
use crate::config::{ConfigError, SimConfig};
use crate::consts::*;
use crate::level::LevelLayout;

/// The player's collider and motion
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerBody {
    /// `start` is the feet sphere centre, `end` the head (camera) sphere centre
    pub capsule: Capsule,
    pub velocity: Vec3,
    pub on_floor: bool,
}

impl PlayerBody {
    /// Standing capsule with its bottom sphere centred on `base`
    pub fn at(base: Vec3) -> Self {
        Self {
            capsule: Capsule::new(base, base + Vec3::Y * PLAYER_HEIGHT, PLAYER_RADIUS),
            velocity: Vec3::ZERO,
            on_floor: false,
        }
    }

    /// Camera position
    pub fn eye(&self) -> Vec3 {
        self.capsule.end
    }

    /// Teleport back to `spawn`, at rest and at the default size
    pub fn respawn(&mut self, spawn: Vec3) {
        *self = Self::at(spawn);
    }
}

/// How the run ended, if it has
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameOutcome {
    #[default]
    InProgress,
    /// All bombs defused; time is whole seconds of unpaused play
    Won { elapsed_seconds: u32 },
    /// Mission clock ran out
    Lost,
}

impl GameOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameOutcome::InProgress)
    }
}

/// Things that happened during a tick, for audio/HUD/haptics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Thrown { slot: usize },
    BombDefused { index: usize, bonus_secs: u32 },
    CubeConsumed { index: usize },
    BuffActivated { kind: BuffKind },
    BuffExpired,
    PlayerRespawned,
    Paused,
    Resumed,
    MapToggled { open: bool },
    Won { elapsed_seconds: u32 },
    Lost,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: SimConfig,
    /// Respawn point
    pub spawn: Vec3,
    pub player: PlayerBody,
    pub pool: ProjectilePool,
    pub objectives: Objectives,
    pub clock: MissionClock,
    pub buff: Buff,
    pub outcome: GameOutcome,
    pub paused: bool,
    /// Map overlay open (movement is suspended)
    pub map_open: bool,
    /// Unpaused play time while in progress (seconds)
    pub elapsed_secs: f64,
    /// Rendered frames processed
    pub frame: u64,
    rng: Pcg32,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Fresh run. Fails if `config` does not pass [`SimConfig::validate`].
    pub fn new(config: &SimConfig, layout: &LevelLayout) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
            spawn: layout.spawn,
            player: PlayerBody::at(layout.spawn),
            pool: ProjectilePool::new(config.pool_size, SPHERE_RADIUS),
            objectives: Objectives::new(&layout.bombs, &layout.cubes),
            clock: MissionClock::new(config.mission_seconds),
            buff: Buff::default(),
            outcome: GameOutcome::InProgress,
            paused: false,
            map_open: false,
            elapsed_secs: 0.0,
            frame: 0,
            rng: Pcg32::seed_from_u64(config.seed),
            events: Vec::new(),
        })
    }

    pub fn in_progress(&self) -> bool {
        !self.outcome.is_terminal()
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Hand over the events queued since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Write a terminal outcome. Only the first one sticks.
    pub fn conclude(&mut self, outcome: GameOutcome) -> bool {
        if self.outcome.is_terminal() || !outcome.is_terminal() {
            return false;
        }
        self.outcome = outcome;
        self.clock.halt();
        // The run is over: physics settles under neutral gravity and speed
        if self.buff.is_active() {
            self.buff.expire();
            self.push_event(GameEvent::BuffExpired);
        }
        match outcome {
            GameOutcome::Won { elapsed_seconds } => {
                log::info!("All bombs defused in {}s", elapsed_seconds);
                self.push_event(GameEvent::Won { elapsed_seconds });
            }
            GameOutcome::Lost => {
                log::info!("Mission clock expired with {} bombs left", self.objectives.remaining());
                self.push_event(GameEvent::Lost);
            }
            GameOutcome::InProgress => {}
        }
        true
    }

    /// Grant a random power-up for a consumed cube. Ignored while one is live.
    pub fn activate_random_buff(&mut self) -> Option<BuffKind> {
        if self.buff.is_active() {
            log::debug!("Cube consumed while a buff is live; no effect");
            return None;
        }
        let kind = if self.rng.random_bool(0.5) {
            BuffKind::Jump
        } else {
            BuffKind::Speed
        };
        if !self.buff.activate(kind, self.config.buff_duration_seconds) {
            return None;
        }
        if kind == BuffKind::Jump {
            self.player.velocity.y += JUMP_BUFF_IMPULSE;
        }
        self.push_event(GameEvent::BuffActivated { kind });
        Some(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> GameState {
        GameState::new(&SimConfig::default(), &LevelLayout::default()).unwrap()
    }

    #[test]
    fn test_new_state() {
        let s = state();
        assert_eq!(s.player.capsule.start, Vec3::new(40.0, 1.0, 1.0));
        assert_eq!(s.player.eye().y, 1.0 + PLAYER_HEIGHT);
        assert_eq!(s.pool.capacity(), NUM_SPHERES);
        assert_eq!(s.objectives.remaining(), 10);
        assert_eq!(s.clock.remaining_secs(), MISSION_SECONDS);
        assert_eq!(s.outcome, GameOutcome::InProgress);
    }

    #[test]
    fn test_respawn_resets_body() {
        let mut player = PlayerBody::at(Vec3::ZERO);
        player.capsule.radius = 1.0;
        player.capsule.translate(Vec3::new(3.0, -40.0, 0.0));
        player.velocity = Vec3::new(1.0, -30.0, 0.0);
        player.respawn(Vec3::new(40.0, 1.0, 1.0));
        assert_eq!(player, PlayerBody::at(Vec3::new(40.0, 1.0, 1.0)));
        assert_eq!(player.capsule.radius, PLAYER_RADIUS);
    }

    #[test]
    fn test_outcome_is_written_once() {
        let mut s = state();
        assert!(s.conclude(GameOutcome::Lost));
        assert!(!s.clock.is_running());
        assert!(!s.conclude(GameOutcome::Won { elapsed_seconds: 3 }));
        assert!(!s.conclude(GameOutcome::InProgress));
        assert_eq!(s.outcome, GameOutcome::Lost);
        assert_eq!(s.drain_events(), vec![GameEvent::Lost]);
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn test_conclude_clears_live_buff() {
        for outcome in [GameOutcome::Lost, GameOutcome::Won { elapsed_seconds: 7 }] {
            let mut s = state();
            s.buff.activate(BuffKind::Jump, BUFF_DURATION_SECONDS);
            assert!(s.conclude(outcome));
            assert!(!s.buff.is_active());
            assert_eq!(s.buff.gravity_delta(), 0.0);
            assert_eq!(s.buff.speed_multiplier(), 1.0);
            assert!(s.drain_events().contains(&GameEvent::BuffExpired));
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let layout = LevelLayout::default();
        let no_clock = SimConfig {
            mission_seconds: 0,
            ..SimConfig::default()
        };
        assert!(matches!(
            GameState::new(&no_clock, &layout),
            Err(ConfigError::ZeroMissionTime)
        ));
        let no_steps = SimConfig {
            substeps: 0,
            ..SimConfig::default()
        };
        assert!(matches!(
            GameState::new(&no_steps, &layout),
            Err(ConfigError::ZeroSubsteps)
        ));
    }

    #[test]
    fn test_buff_activation_is_seeded() {
        let mut a = state();
        let mut b = state();
        assert_eq!(a.activate_random_buff(), b.activate_random_buff());
    }

    #[test]
    fn test_second_buff_ignored() {
        let mut s = state();
        let first = s.activate_random_buff();
        assert!(first.is_some());
        let v = s.player.velocity;
        assert_eq!(s.activate_random_buff(), None);
        assert_eq!(s.player.velocity, v);
        assert_eq!(s.drain_events().len(), 1);
    }

    #[test]
    fn test_jump_buff_kicks_upward() {
        // Try seeds until one rolls a jump buff
        let layout = LevelLayout::default();
        let jumped = (0..64).find_map(|seed| {
            let config = SimConfig {
                seed,
                ..SimConfig::default()
            };
            let mut s = GameState::new(&config, &layout).unwrap();
            (s.activate_random_buff() == Some(BuffKind::Jump)).then_some(s)
        });
        let s = jumped.expect("some seed yields a jump buff");
        assert_eq!(s.player.velocity.y, JUMP_BUFF_IMPULSE);
        assert_eq!(s.buff.gravity_delta(), JUMP_BUFF_GRAVITY_DELTA);
    }
}
