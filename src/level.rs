//! Level layout and geometry helpers
//!
//! The maze mesh itself comes from the asset pipeline; this module only knows where
//! the objectives sit and how to build simple box geometry for tests and the demo.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::sim::Triangle;

/// Where the player starts and where objectives are placed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelLayout {
    /// Bottom of the player capsule at spawn (also the respawn point)
    pub spawn: Vec3,
    /// Bomb positions
    pub bombs: Vec<Vec3>,
    /// Power-up cube positions
    pub cubes: Vec<Vec3>,
}

impl Default for LevelLayout {
    fn default() -> Self {
        Self {
            spawn: Vec3::new(40.0, 1.0, 1.0),
            bombs: vec![
                Vec3::new(0.0, 0.0, 3.0),
                Vec3::new(18.0, 0.0, 0.0),
                Vec3::new(20.0, 0.0, 25.0),
                Vec3::new(-10.0, 0.0, -25.0),
                Vec3::new(30.0, 0.0, -11.0),
                Vec3::new(-10.0, 0.0, 20.0),
                Vec3::new(20.0, 0.0, 0.0),
                Vec3::new(-20.0, 0.0, 5.0),
                Vec3::new(-25.0, 0.0, 15.0),
                Vec3::new(-40.0, 0.0, 0.0),
            ],
            cubes: vec![
                Vec3::new(37.0, 3.2, -13.0),
                Vec3::new(12.2, 3.2, 0.0),
                Vec3::new(-27.0, 3.2, -20.0),
                Vec3::new(-20.0, 3.2, 0.0),
                Vec3::new(0.0, 3.2, 25.0),
            ],
        }
    }
}

/// The 12 outward-facing triangles of an axis-aligned box
pub fn box_triangles(min: Vec3, max: Vec3) -> [Triangle; 12] {
    // 0 picks the min coordinate on that axis, 1 the max
    let at = |x: u8, y: u8, z: u8| {
        Vec3::new(
            if x == 1 { max.x } else { min.x },
            if y == 1 { max.y } else { min.y },
            if z == 1 { max.z } else { min.z },
        )
    };
    // Quads wound counter-clockwise as seen from outside
    let quads = [
        [at(0, 0, 0), at(0, 0, 1), at(0, 1, 1), at(0, 1, 0)],
        [at(1, 0, 0), at(1, 1, 0), at(1, 1, 1), at(1, 0, 1)],
        [at(0, 0, 0), at(1, 0, 0), at(1, 0, 1), at(0, 0, 1)],
        [at(0, 1, 0), at(0, 1, 1), at(1, 1, 1), at(1, 1, 0)],
        [at(0, 0, 0), at(0, 1, 0), at(1, 1, 0), at(1, 0, 0)],
        [at(0, 0, 1), at(1, 0, 1), at(1, 1, 1), at(0, 1, 1)],
    ];
    let mut out = [Triangle::new(Vec3::ZERO, Vec3::ZERO, Vec3::ZERO); 12];
    for (i, [a, b, c, d]) in quads.into_iter().enumerate() {
        out[i * 2] = Triangle::new(a, b, c);
        out[i * 2 + 1] = Triangle::new(a, c, d);
    }
    out
}

/// Half-extent of the demo arena floor
pub const DEMO_ARENA_HALF: f32 = 60.0;
const DEMO_WALL_HEIGHT: f32 = 4.0;

/// A floored arena with perimeter walls, large enough for the default layout
pub fn demo_geometry() -> Vec<Triangle> {
    let h = DEMO_ARENA_HALF;
    let w = DEMO_WALL_HEIGHT;
    let boxes = [
        (Vec3::new(-h, -1.0, -h), Vec3::new(h, 0.0, h)),
        (Vec3::new(-h - 1.0, 0.0, -h), Vec3::new(-h, w, h)),
        (Vec3::new(h, 0.0, -h), Vec3::new(h + 1.0, w, h)),
        (Vec3::new(-h, 0.0, -h - 1.0), Vec3::new(h, w, -h)),
        (Vec3::new(-h, 0.0, h), Vec3::new(h, w, h + 1.0)),
    ];
    boxes
        .into_iter()
        .flat_map(|(min, max)| box_triangles(min, max))
        .collect()
}
