//! Static collision volume
//!
//! Level geometry is baked once into an [`Octree`] of triangles. The simulation only
//! ever talks to it through [`CollisionVolume`]: a capsule query for the player and a
//! sphere query for projectiles, each returning at most one combined [`Contact`].

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::is_usable_normal;

const EPSILON: f32 = 1e-6;

/// Octree subdivision limits
const MAX_DEPTH: u32 = 5;
const TRIANGLES_PER_LEAF: usize = 8;

/// Result of a volume query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit push-out direction (from the surface toward the query shape)
    pub normal: Vec3,
    /// Penetration depth along `normal` (>= 0)
    pub depth: f32,
}

/// A line segment swept by a radius
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Capsule {
    pub start: Vec3,
    pub end: Vec3,
    pub radius: f32,
}

impl Capsule {
    pub fn new(start: Vec3, end: Vec3, radius: f32) -> Self {
        Self { start, end, radius }
    }

    /// Midpoint of the segment
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.start + self.end) * 0.5
    }

    #[inline]
    pub fn translate(&mut self, delta: Vec3) {
        self.start += delta;
        self.end += delta;
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.start.min(self.end), self.start.max(self.end)).expand(self.radius)
    }
}

/// A sphere collider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.center, self.center).expand(self.radius)
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn expand(&self, margin: f32) -> Self {
        Self::new(self.min - Vec3::splat(margin), self.max + Vec3::splat(margin))
    }

    pub fn union(&self, other: &Aabb) -> Self {
        Self::new(self.min.min(other.min), self.max.max(other.max))
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
    }

    /// The eight child boxes of an even split
    fn octants(&self) -> [Aabb; 8] {
        let mid = (self.min + self.max) * 0.5;
        std::array::from_fn(|i| {
            let pick = |bit: usize, lo: f32, m: f32, hi: f32| {
                if i & bit == 0 { (lo, m) } else { (m, hi) }
            };
            let (x0, x1) = pick(1, self.min.x, mid.x, self.max.x);
            let (y0, y1) = pick(2, self.min.y, mid.y, self.max.y);
            let (z0, z1) = pick(4, self.min.z, mid.z, self.max.z);
            Aabb::new(Vec3::new(x0, y0, z0), Vec3::new(x1, y1, z1))
        })
    }
}

/// A single level triangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
}

impl Triangle {
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self { a, b, c }
    }

    /// Face normal (counter-clockwise winding), zero for degenerate triangles
    pub fn normal(&self) -> Vec3 {
        (self.b - self.a).cross(self.c - self.a).normalize_or_zero()
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(
            self.a.min(self.b).min(self.c),
            self.a.max(self.b).max(self.c),
        )
    }

    /// Closest point on the triangle to `p` (Voronoi region walk)
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        let (a, b, c) = (self.a, self.b, self.c);
        let ab = b - a;
        let ac = c - a;

        let ap = p - a;
        let d1 = ab.dot(ap);
        let d2 = ac.dot(ap);
        if d1 <= 0.0 && d2 <= 0.0 {
            return a;
        }

        let bp = p - b;
        let d3 = ab.dot(bp);
        let d4 = ac.dot(bp);
        if d3 >= 0.0 && d4 <= d3 {
            return b;
        }

        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            return a + ab * (d1 / (d1 - d3));
        }

        let cp = p - c;
        let d5 = ab.dot(cp);
        let d6 = ac.dot(cp);
        if d6 >= 0.0 && d5 <= d6 {
            return c;
        }

        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            return a + ac * (d2 / (d2 - d6));
        }

        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return b + (c - b) * w;
        }

        let denom = 1.0 / (va + vb + vc);
        a + ab * (vb * denom) + ac * (vc * denom)
    }

    fn edges(&self) -> [(Vec3, Vec3); 3] {
        [(self.a, self.b), (self.b, self.c), (self.c, self.a)]
    }
}

/// Closest points between segments `p1-q1` and `p2-q2`
fn closest_points_on_segments(p1: Vec3, q1: Vec3, p2: Vec3, q2: Vec3) -> (Vec3, Vec3) {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.length_squared();
    let e = d2.length_squared();
    let f = d2.dot(r);

    if a <= EPSILON && e <= EPSILON {
        return (p1, p2);
    }

    let (s, t) = if a <= EPSILON {
        (0.0, (f / e).clamp(0.0, 1.0))
    } else {
        let c = d1.dot(r);
        if e <= EPSILON {
            ((-c / a).clamp(0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(d2);
            let denom = a * e - b * b;
            let mut s = if denom.abs() > EPSILON {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let mut t = (b * s + f) / e;
            if t < 0.0 {
                t = 0.0;
                s = (-c / a).clamp(0.0, 1.0);
            } else if t > 1.0 {
                t = 1.0;
                s = ((b - c) / a).clamp(0.0, 1.0);
            }
            (s, t)
        }
    };

    (p1 + d1 * s, p2 + d2 * t)
}

/// Closest pair between a triangle and a segment; `None` if the segment pierces the face
fn segment_triangle_closest(tri: &Triangle, start: Vec3, end: Vec3) -> Option<(Vec3, Vec3)> {
    let n = tri.normal();
    let ds = n.dot(start - tri.a);
    let de = n.dot(end - tri.a);
    if ds * de < 0.0 {
        let t = ds / (ds - de);
        let hit = start + (end - start) * t;
        if tri.closest_point(hit).distance_squared(hit) < EPSILON * EPSILON {
            return None;
        }
    }

    let mut best = (start, tri.closest_point(start));
    let mut best_d2 = best.0.distance_squared(best.1);
    let mut consider = |seg: Vec3, on_tri: Vec3| {
        let d2 = seg.distance_squared(on_tri);
        if d2 < best_d2 {
            best_d2 = d2;
            best = (seg, on_tri);
        }
    };
    consider(end, tri.closest_point(end));
    for (e0, e1) in tri.edges() {
        let (seg, on_edge) = closest_points_on_segments(start, end, e0, e1);
        consider(seg, on_edge);
    }
    Some(best)
}

fn capsule_triangle_contact(capsule: &Capsule, tri: &Triangle) -> Option<Contact> {
    let n = tri.normal();
    if !is_usable_normal(n) {
        return None;
    }

    match segment_triangle_closest(tri, capsule.start, capsule.end) {
        Some((on_seg, on_tri)) => {
            let d2 = on_seg.distance_squared(on_tri);
            if d2 >= capsule.radius * capsule.radius {
                return None;
            }
            let dist = d2.sqrt();
            let normal = if dist > EPSILON {
                (on_seg - on_tri) / dist
            } else {
                face_toward(n, capsule.center() - tri.a)
            };
            Some(Contact {
                normal,
                depth: capsule.radius - dist,
            })
        }
        None => {
            // Segment passes through the face: push out toward the side holding more of it
            let ds = n.dot(capsule.start - tri.a);
            let de = n.dot(capsule.end - tri.a);
            let (normal, behind) = if ds.abs() >= de.abs() {
                (n * ds.signum(), de.abs())
            } else {
                (n * de.signum(), ds.abs())
            };
            Some(Contact {
                normal,
                depth: capsule.radius + behind,
            })
        }
    }
}

fn sphere_triangle_contact(sphere: &Sphere, tri: &Triangle) -> Option<Contact> {
    let n = tri.normal();
    if !is_usable_normal(n) {
        return None;
    }
    let closest = tri.closest_point(sphere.center);
    let d2 = closest.distance_squared(sphere.center);
    if d2 >= sphere.radius * sphere.radius {
        return None;
    }
    let dist = d2.sqrt();
    let normal = if dist > EPSILON {
        (sphere.center - closest) / dist
    } else {
        face_toward(n, sphere.center - tri.a)
    };
    Some(Contact {
        normal,
        depth: sphere.radius - dist,
    })
}

#[inline]
fn face_toward(n: Vec3, offset: Vec3) -> Vec3 {
    if n.dot(offset) < 0.0 { -n } else { n }
}

/// Combine accumulated push-outs into a single contact
fn combined_contact(total: Vec3, first: Option<Contact>) -> Option<Contact> {
    let first = first?;
    let depth = total.length();
    if depth > EPSILON {
        Some(Contact {
            normal: total / depth,
            depth,
        })
    } else {
        Some(Contact {
            normal: first.normal,
            depth: 0.0,
        })
    }
}

/// Intersection queries against static level geometry
pub trait CollisionVolume {
    /// Combined contact for a capsule, if it touches the geometry
    fn capsule_intersect(&self, capsule: &Capsule) -> Option<Contact>;
    /// Combined contact for a sphere, if it touches the geometry
    fn sphere_intersect(&self, sphere: &Sphere) -> Option<Contact>;
}

#[derive(Debug, Clone)]
struct Node {
    bounds: Aabb,
    triangles: Vec<u32>,
    children: Vec<Node>,
}

impl Node {
    fn build(bounds: Aabb, indices: Vec<u32>, triangles: &[Triangle], depth: u32) -> Self {
        if indices.len() <= TRIANGLES_PER_LEAF || depth >= MAX_DEPTH {
            return Self {
                bounds,
                triangles: indices,
                children: Vec::new(),
            };
        }

        let children = bounds
            .octants()
            .into_iter()
            .filter_map(|octant| {
                let inside: Vec<u32> = indices
                    .iter()
                    .copied()
                    .filter(|&i| octant.intersects(&triangles[i as usize].bounds()))
                    .collect();
                (!inside.is_empty()).then(|| Node::build(octant, inside, triangles, depth + 1))
            })
            .collect();

        Self {
            bounds,
            triangles: Vec::new(),
            children,
        }
    }

    fn collect(&self, query: &Aabb, out: &mut Vec<u32>) {
        if !self.bounds.intersects(query) {
            return;
        }
        out.extend_from_slice(&self.triangles);
        for child in &self.children {
            child.collect(query, out);
        }
    }
}

/// Triangle octree built once from level geometry
#[derive(Debug, Clone)]
pub struct Octree {
    triangles: Vec<Triangle>,
    root: Option<Node>,
}

impl Octree {
    /// Build from level triangles. Degenerate triangles are dropped.
    pub fn new(triangles: impl IntoIterator<Item = Triangle>) -> Self {
        let mut dropped = 0usize;
        let triangles: Vec<Triangle> = triangles
            .into_iter()
            .filter(|t| {
                let ok = is_usable_normal(t.normal());
                if !ok {
                    dropped += 1;
                }
                ok
            })
            .collect();
        if dropped > 0 {
            log::warn!("Octree: dropped {} degenerate triangles", dropped);
        }

        let root = triangles
            .iter()
            .map(Triangle::bounds)
            .reduce(|acc, b| acc.union(&b))
            .map(|bounds| {
                let indices = (0..triangles.len() as u32).collect();
                Node::build(bounds.expand(0.01), indices, &triangles, 0)
            });

        log::info!("Octree built: {} triangles", triangles.len());
        Self { triangles, root }
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Bounds of all geometry (None when empty)
    pub fn bounds(&self) -> Option<Aabb> {
        self.root.as_ref().map(|n| n.bounds)
    }

    /// Indices of triangles whose node overlaps `query`, deduplicated and sorted
    fn candidates(&self, query: &Aabb) -> Vec<u32> {
        let mut out = Vec::new();
        if let Some(root) = &self.root {
            root.collect(query, &mut out);
        }
        out.sort_unstable();
        out.dedup();
        out
    }
}

impl CollisionVolume for Octree {
    fn capsule_intersect(&self, capsule: &Capsule) -> Option<Contact> {
        let mut moved = *capsule;
        let mut first = None;
        for i in self.candidates(&capsule.bounds()) {
            if let Some(contact) = capsule_triangle_contact(&moved, &self.triangles[i as usize]) {
                first.get_or_insert(contact);
                moved.translate(contact.normal * contact.depth);
            }
        }
        combined_contact(moved.start - capsule.start, first)
    }

    fn sphere_intersect(&self, sphere: &Sphere) -> Option<Contact> {
        let mut moved = *sphere;
        let mut first = None;
        for i in self.candidates(&sphere.bounds()) {
            if let Some(contact) = sphere_triangle_contact(&moved, &self.triangles[i as usize]) {
                first.get_or_insert(contact);
                moved.center += contact.normal * contact.depth;
            }
        }
        combined_contact(moved.center - sphere.center, first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::box_triangles;

    fn floor() -> Octree {
        Octree::new(box_triangles(
            Vec3::new(-10.0, -1.0, -10.0),
            Vec3::new(10.0, 0.0, 10.0),
        ))
    }

    #[test]
    fn test_closest_point_regions() {
        let tri = Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Z);
        // Above the face interior
        let p = tri.closest_point(Vec3::new(0.25, 3.0, 0.25));
        assert!((p - Vec3::new(0.25, 0.0, 0.25)).length() < 1e-6);
        // Beyond vertex b
        assert_eq!(tri.closest_point(Vec3::new(5.0, 0.0, -1.0)), Vec3::X);
    }

    #[test]
    fn test_segment_closest_points_parallel() {
        let (a, b) = closest_points_on_segments(
            Vec3::ZERO,
            Vec3::X,
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
        );
        assert!((a.distance(b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_sphere_resting_in_floor() {
        let tree = floor();
        let contact = tree
            .sphere_intersect(&Sphere::new(Vec3::new(1.0, 0.1, 1.0), 0.2))
            .expect("sphere overlaps floor");
        assert!((contact.normal - Vec3::Y).length() < 1e-4);
        assert!((contact.depth - 0.1).abs() < 1e-4);
    }

    #[test]
    fn test_sphere_clear_of_floor() {
        let tree = floor();
        assert!(tree.sphere_intersect(&Sphere::new(Vec3::new(0.0, 1.0, 0.0), 0.2)).is_none());
    }

    #[test]
    fn test_capsule_sinking_into_floor() {
        let tree = floor();
        let capsule = Capsule::new(Vec3::new(2.0, 0.3, 2.0), Vec3::new(2.0, 0.95, 2.0), 0.35);
        let contact = tree.capsule_intersect(&capsule).expect("capsule overlaps floor");
        assert!(contact.normal.y > 0.99);
        assert!((contact.depth - 0.05).abs() < 1e-4);
    }

    #[test]
    fn test_capsule_against_wall() {
        let tree = Octree::new(box_triangles(
            Vec3::new(1.0, 0.0, -5.0),
            Vec3::new(2.0, 3.0, 5.0),
        ));
        let capsule = Capsule::new(Vec3::new(0.8, 1.0, 0.0), Vec3::new(0.8, 1.65, 0.0), 0.35);
        let contact = tree.capsule_intersect(&capsule).expect("touching wall");
        assert!(contact.normal.x < -0.99);
        assert!((contact.depth - 0.15).abs() < 1e-4);
    }

    #[test]
    fn test_empty_volume() {
        let tree = Octree::new(Vec::new());
        assert_eq!(tree.triangle_count(), 0);
        assert!(tree.bounds().is_none());
        assert!(tree.sphere_intersect(&Sphere::new(Vec3::ZERO, 1.0)).is_none());
    }

    #[test]
    fn test_degenerate_triangles_dropped() {
        let tree = Octree::new([Triangle::new(Vec3::ZERO, Vec3::X, Vec3::X * 2.0)]);
        assert_eq!(tree.triangle_count(), 0);
    }

    #[test]
    fn test_octree_subdivides_large_meshes() {
        let mut tris = Vec::new();
        for i in 0..20 {
            let x = i as f32 * 3.0;
            tris.extend(box_triangles(Vec3::new(x, 0.0, 0.0), Vec3::new(x + 1.0, 1.0, 1.0)));
        }
        let tree = Octree::new(tris);
        assert_eq!(tree.triangle_count(), 240);
        // A query near one box only sees a fraction of the mesh
        let near = tree.candidates(&Sphere::new(Vec3::new(0.5, 0.5, 0.5), 0.2).bounds());
        assert!(!near.is_empty() && near.len() < 240);
    }
}
