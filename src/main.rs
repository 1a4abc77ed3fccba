//! Maze Defuse headless runner
//!
//! Drives the simulation over the demo arena with a simple autopilot that walks to
//! the nearest bomb and defuses it, then prints the final frame as JSON.
//!
//! Usage: `maze-defuse [config.json]`

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::Vec3;

    use maze_defuse::config::SimConfig;
    use maze_defuse::level::{self, LevelLayout};
    use maze_defuse::sim::{
        FrameOutput, GameState, InputDecoder, KeyboardSnapshot, Octree, TickInput, tick,
    };

    const FPS: f32 = 60.0;
    /// Ten minutes of frames
    const FRAME_CAP: u32 = 60 * 60 * 10;
    /// Throw a sphere every this many frames
    const THROW_EVERY: u32 = 120;

    fn load_config() -> SimConfig {
        let Some(path) = std::env::args().nth(1) else {
            return SimConfig::default();
        };
        match SimConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Could not load {}: {}; using defaults", path, e);
                SimConfig::default()
            }
        }
    }

    /// Look toward the nearest live bomb, flattened to the floor plane
    fn steer(state: &GameState) -> Vec3 {
        let eye = state.player.eye();
        state
            .objectives
            .nearest()
            .map(|n| state.objectives.bombs()[n.index].position - eye)
            .map(|d| Vec3::new(d.x, 0.0, d.z).normalize_or_zero())
            .filter(|d| *d != Vec3::ZERO)
            .unwrap_or(Vec3::NEG_Z)
    }

    pub fn run() -> Result<(), Box<dyn std::error::Error>> {
        let config = load_config();
        let layout = LevelLayout::default();
        let world = Octree::new(level::demo_geometry());
        let mut state = GameState::new(&config, &layout)?;
        let mut decoder = InputDecoder::new();
        let dt = 1.0 / FPS;

        log::info!(
            "Running {} bombs, {}s on the clock, seed {:#x}",
            layout.bombs.len(),
            config.mission_seconds,
            config.seed
        );

        // Prime the nearest-bomb scan
        let mut last: FrameOutput = tick(&mut state, Some(&world), &TickInput::default(), dt);
        for frame in 1..FRAME_CAP {
            if last.outcome.is_terminal() {
                break;
            }
            let in_reach = last.nearest_bomb.is_some_and(|n| n.interactable);
            let keys = KeyboardSnapshot {
                forward: !in_reach,
                // Release every other frame so a missed press can fire again
                interact: in_reach && frame % 2 == 0,
                pointer_released: frame % THROW_EVERY == 0,
                ..Default::default()
            };
            let input = TickInput {
                intents: decoder.decode(Some(&keys), None),
                look: steer(&state),
                emitter: None,
            };
            last = tick(&mut state, Some(&world), &input, dt);
            for event in &last.events {
                log::debug!("frame {}: {:?}", state.frame, event);
            }
        }

        log::info!("Finished after {} frames: {:?}", state.frame, last.outcome);
        println!("{}", serde_json::to_string_pretty(&last)?);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Maze Defuse (headless) starting...");
    if let Err(e) = headless::run() {
        log::error!("Run failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser builds drive the library from the host page
}
