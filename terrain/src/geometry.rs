use serde::{Deserialize, Serialize};

// Point on the ground plane. `z` is the second planar axis, `y` is reserved for elevation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub z: f64,
}

impl Point2 {
    pub const fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }

    #[inline]
    pub fn distance(self, other: Point2) -> f64 {
        ((self.x - other.x).powi(2) + (self.z - other.z).powi(2)).sqrt()
    }
}

// Result of projecting a point onto a segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    // Position along the segment, clamped to [0, 1]
    pub t: f64,
    // Euclidean distance from the point to the clamped projection
    pub distance: f64,
}

// Project `p` onto the infinite line through `a`-`b`, clamp to the segment.
// A zero-length segment projects everything onto `a` with t = 0.
pub fn project_onto_segment(p: Point2, a: Point2, b: Point2) -> Projection {
    let dx = b.x - a.x;
    let dz = b.z - a.z;
    let length_sq = dx * dx + dz * dz;

    if length_sq == 0.0 {
        return Projection {
            t: 0.0,
            distance: p.distance(a),
        };
    }

    let t = (((p.x - a.x) * dx + (p.z - a.z) * dz) / length_sq).clamp(0.0, 1.0);
    let closest = Point2::new(a.x + t * dx, a.z + t * dz);
    Projection {
        t,
        distance: p.distance(closest),
    }
}

#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
