//! Simulation module
//!
//! All gameplay logic lives here, with no rendering or device dependencies:
//! - Input arrives as a normalized [`FrameInput`]
//! - Level geometry arrives behind the [`CollisionVolume`] trait
//! - Randomness comes from the seeded RNG in [`GameState`]

pub mod collision;
pub mod input;
pub mod integrate;
pub mod objective;
pub mod output;
pub mod pool;
pub mod state;
pub mod tick;
pub mod timers;
pub mod volume;

pub use input::{ControllerSnapshot, FrameInput, InputDecoder, InputSource, KeyboardSnapshot};
pub use objective::{BombProximity, Objectives, ProximityBand};
pub use output::{FrameOutput, PlayerView, ProjectileView};
pub use pool::{Projectile, ProjectilePool};
pub use state::{GameEvent, GameOutcome, GameState, PlayerBody};
pub use tick::{Pose, TickInput, tick};
pub use timers::{Buff, BuffKind, BuffState, BuffStatus, MissionClock};
pub use volume::{Aabb, Capsule, CollisionVolume, Contact, Octree, Sphere, Triangle};
