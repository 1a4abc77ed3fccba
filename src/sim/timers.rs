//! Mission countdown and power-up timers
//!
//! Both timers are pulled once per frame with the elapsed frame time and count whole
//! seconds through their own accumulator. Time that is never fed to them (pause,
//! finished run) simply does not exist for them, so remaining time is frozen rather
//! than lost.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Mission countdown clock
#[derive(Debug, Clone, PartialEq)]
pub struct MissionClock {
    remaining_secs: u32,
    running: bool,
    accum: f32,
}

impl MissionClock {
    pub fn new(start_secs: u32) -> Self {
        Self {
            remaining_secs: start_secs,
            running: start_secs > 0,
            accum: 0.0,
        }
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Add bonus seconds (uncapped)
    pub fn add_bonus(&mut self, secs: u32) {
        self.remaining_secs = self.remaining_secs.saturating_add(secs);
    }

    /// Stop for good (run ended)
    pub fn halt(&mut self) {
        self.running = false;
        self.accum = 0.0;
    }

    /// Feed elapsed time. Returns true on the call that reaches zero.
    pub fn advance(&mut self, dt: f32) -> bool {
        if !self.running || !(dt.is_finite() && dt > 0.0) {
            return false;
        }
        self.accum += dt;
        while self.accum >= 1.0 && self.remaining_secs > 0 {
            self.accum -= 1.0;
            self.remaining_secs -= 1;
        }
        if self.remaining_secs == 0 {
            self.halt();
            return true;
        }
        false
    }
}

/// Kind of power-up granted by a cube
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuffKind {
    /// Upward impulse plus reduced gravity
    Jump,
    /// Faster movement
    Speed,
}

/// Live power-up, if any
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum BuffState {
    #[default]
    None,
    Jump {
        gravity_delta: f32,
        seconds_remaining: u32,
    },
    Speed {
        multiplier: f32,
        seconds_remaining: u32,
    },
}

/// Snapshot for the HUD
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuffStatus {
    pub kind: BuffKind,
    pub seconds_remaining: u32,
}

/// Power-up state machine: Idle -> Active(kind) -> Idle, one live timer at most
#[derive(Debug, Clone, Default)]
pub struct Buff {
    state: BuffState,
    accum: f32,
}

impl Buff {
    pub fn state(&self) -> BuffState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != BuffState::None
    }

    pub fn status(&self) -> Option<BuffStatus> {
        match self.state {
            BuffState::None => None,
            BuffState::Jump {
                seconds_remaining, ..
            } => Some(BuffStatus {
                kind: BuffKind::Jump,
                seconds_remaining,
            }),
            BuffState::Speed {
                seconds_remaining, ..
            } => Some(BuffStatus {
                kind: BuffKind::Speed,
                seconds_remaining,
            }),
        }
    }

    /// Extra gravity while airborne (negative = floatier)
    pub fn gravity_delta(&self) -> f32 {
        match self.state {
            BuffState::Jump { gravity_delta, .. } => gravity_delta,
            _ => 0.0,
        }
    }

    /// Scale applied to movement intent
    pub fn speed_multiplier(&self) -> f32 {
        match self.state {
            BuffState::Speed { multiplier, .. } => multiplier,
            _ => 1.0,
        }
    }

    /// Start a power-up. No stacking and no refresh: returns false if one is live.
    pub fn activate(&mut self, kind: BuffKind, duration_secs: u32) -> bool {
        if self.is_active() || duration_secs == 0 {
            return false;
        }
        self.accum = 0.0;
        self.state = match kind {
            BuffKind::Jump => BuffState::Jump {
                gravity_delta: JUMP_BUFF_GRAVITY_DELTA,
                seconds_remaining: duration_secs,
            },
            BuffKind::Speed => BuffState::Speed {
                multiplier: SPEED_BUFF_MULTIPLIER,
                seconds_remaining: duration_secs,
            },
        };
        log::info!("Buff activated: {:?} for {}s", kind, duration_secs);
        true
    }

    /// Feed elapsed time. Returns true on the call that expires the buff.
    pub fn advance(&mut self, dt: f32) -> bool {
        if !self.is_active() || !(dt.is_finite() && dt > 0.0) {
            return false;
        }
        self.accum += dt;
        while self.accum >= 1.0 {
            self.accum -= 1.0;
            let remaining = match &mut self.state {
                BuffState::Jump {
                    seconds_remaining, ..
                }
                | BuffState::Speed {
                    seconds_remaining, ..
                } => seconds_remaining,
                BuffState::None => return false,
            };
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                self.expire();
                return true;
            }
        }
        false
    }

    /// Shared reset: neutral gravity and speed, whichever kind was live
    pub fn expire(&mut self) {
        self.state = BuffState::None;
        self.accum = 0.0;
    }
}
