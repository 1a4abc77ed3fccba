//! Input normalization
//!
//! Device snapshots (keyboard + pointer, right-hand VR gamepad) are decoded into a
//! single [`FrameInput`] per rendered frame. Buttons that act once (throw, interact,
//! pause, map) are turned into rising edges here so the simulation never sees the
//! same press twice.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Stick dead zone
pub const AXIS_DEAD_ZONE: f32 = 0.01;

/// Gamepad button indices on the right-hand controller
pub mod buttons {
    pub const TRIGGER: usize = 0;
    pub const GRIP: usize = 1;
    pub const A: usize = 4;
    pub const B: usize = 5;
    pub const COUNT: usize = 6;
}

/// Which device produced the movement this frame (selects acceleration gains)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InputSource {
    #[default]
    Keyboard,
    Controller,
}

/// Normalized per-frame intents
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameInput {
    /// x = strafe right, y = forward, each in -1..1
    pub move_axis: Vec2,
    pub source: InputSource,
    /// Held: jumps whenever the player is on the floor
    pub jump: bool,
    /// Edges: true for exactly one frame per press
    pub throw: bool,
    pub interact: bool,
    pub pause: bool,
    pub menu_toggle: bool,
}

/// Keys held this frame, plus the pointer-release event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyboardSnapshot {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub interact: bool,
    pub pause: bool,
    pub map: bool,
    /// Mouse button released while the pointer is locked
    pub pointer_released: bool,
}

/// Right-hand gamepad state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControllerSnapshot {
    pub axes: [f32; 4],
    pub buttons: [bool; buttons::COUNT],
}

impl ControllerSnapshot {
    /// Stick as (strafe, forward). Falls back to the second axis pair when the first is idle.
    pub fn stick(&self) -> Vec2 {
        let idle = |x: f32, y: f32| x.abs() < AXIS_DEAD_ZONE && y.abs() < AXIS_DEAD_ZONE;
        let [mut x, mut y, x2, y2] = self.axes.map(|a| if a.is_finite() { a } else { 0.0 });
        if idle(x, y) {
            x = x2;
            y = y2;
        }
        if idle(x, y) {
            return Vec2::ZERO;
        }
        // Pushing the stick forward reads negative
        Vec2::new(x, -y).clamp(Vec2::NEG_ONE, Vec2::ONE)
    }

    fn pressed(&self, button: usize) -> bool {
        self.buttons.get(button).copied().unwrap_or(false)
    }
}

/// Stateful decoder that turns held buttons into edges
#[derive(Debug, Clone, Default)]
pub struct InputDecoder {
    prev_keyboard: KeyboardSnapshot,
    prev_controller: ControllerSnapshot,
}

impl InputDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode this frame's devices. Missing devices count as idle.
    pub fn decode(
        &mut self,
        keyboard: Option<&KeyboardSnapshot>,
        controller: Option<&ControllerSnapshot>,
    ) -> FrameInput {
        let kb = keyboard.copied().unwrap_or_default();
        let pad = controller.copied().unwrap_or_default();
        let prev_kb = std::mem::replace(&mut self.prev_keyboard, kb);
        let prev_pad = std::mem::replace(&mut self.prev_controller, pad);

        let rose_key = |now: bool, before: bool| now && !before;
        let rose_pad = |b: usize| pad.pressed(b) && !prev_pad.pressed(b);

        let axis_of = |pos: bool, neg: bool| (pos as i8 - neg as i8) as f32;
        let keys = Vec2::new(axis_of(kb.right, kb.left), axis_of(kb.forward, kb.back));
        let stick = pad.stick();
        let (move_axis, source) = if stick != Vec2::ZERO {
            (stick, InputSource::Controller)
        } else {
            (keys, InputSource::Keyboard)
        };

        FrameInput {
            move_axis,
            source,
            jump: kb.jump || pad.pressed(buttons::GRIP),
            // One throw per frame no matter how many sources fired
            throw: rose_pad(buttons::TRIGGER) || kb.pointer_released,
            interact: rose_key(kb.interact, prev_kb.interact) || rose_pad(buttons::A),
            pause: rose_key(kb.pause, prev_kb.pause) || rose_pad(buttons::B),
            menu_toggle: rose_key(kb.map, prev_kb.map),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad_with(button: usize) -> ControllerSnapshot {
        let mut pad = ControllerSnapshot::default();
        pad.buttons[button] = true;
        pad
    }

    #[test]
    fn test_keyboard_axes() {
        let mut decoder = InputDecoder::new();
        let kb = KeyboardSnapshot {
            forward: true,
            left: true,
            ..Default::default()
        };
        let input = decoder.decode(Some(&kb), None);
        assert_eq!(input.move_axis, Vec2::new(-1.0, 1.0));
        assert_eq!(input.source, InputSource::Keyboard);

        let both = KeyboardSnapshot {
            forward: true,
            back: true,
            ..Default::default()
        };
        assert_eq!(decoder.decode(Some(&both), None).move_axis, Vec2::ZERO);
    }

    #[test]
    fn test_stick_fallback_axes() {
        let pad = ControllerSnapshot {
            axes: [0.0, 0.005, 0.5, -1.0],
            ..Default::default()
        };
        assert_eq!(pad.stick(), Vec2::new(0.5, 1.0));

        let idle = ControllerSnapshot::default();
        assert_eq!(idle.stick(), Vec2::ZERO);
    }

    #[test]
    fn test_stick_overrides_keys() {
        let mut decoder = InputDecoder::new();
        let kb = KeyboardSnapshot {
            forward: true,
            ..Default::default()
        };
        let pad = ControllerSnapshot {
            axes: [0.3, 0.0, 0.0, 0.0],
            ..Default::default()
        };
        let input = decoder.decode(Some(&kb), Some(&pad));
        assert_eq!(input.source, InputSource::Controller);
        assert_eq!(input.move_axis, Vec2::new(0.3, 0.0));
    }

    #[test]
    fn test_trigger_throws_once_per_press() {
        let mut decoder = InputDecoder::new();
        let held = pad_with(buttons::TRIGGER);
        assert!(decoder.decode(None, Some(&held)).throw);
        assert!(!decoder.decode(None, Some(&held)).throw);
        assert!(!decoder.decode(None, None).throw);
        assert!(decoder.decode(None, Some(&held)).throw);
    }

    #[test]
    fn test_grip_jumps_but_never_throws() {
        let mut decoder = InputDecoder::new();
        let input = decoder.decode(None, Some(&pad_with(buttons::GRIP)));
        assert!(input.jump);
        assert!(!input.throw);
    }

    #[test]
    fn test_pointer_release_throws() {
        let mut decoder = InputDecoder::new();
        let kb = KeyboardSnapshot {
            pointer_released: true,
            ..Default::default()
        };
        assert!(decoder.decode(Some(&kb), None).throw);
    }

    #[test]
    fn test_edges_for_interact_pause_and_map() {
        let mut decoder = InputDecoder::new();
        let kb = KeyboardSnapshot {
            interact: true,
            pause: true,
            map: true,
            ..Default::default()
        };
        let first = decoder.decode(Some(&kb), None);
        assert!(first.interact && first.pause && first.menu_toggle);
        let second = decoder.decode(Some(&kb), None);
        assert!(!second.interact && !second.pause && !second.menu_toggle);

        let a = decoder.decode(None, Some(&pad_with(buttons::A)));
        assert!(a.interact);
        let b = decoder.decode(None, Some(&pad_with(buttons::B)));
        assert!(b.pause);
    }
}
