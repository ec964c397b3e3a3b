use crate::HeightSource;
use crate::error::MapError;
use crate::geometry::{Point2, lerp, project_onto_segment};
use crate::map::{ControlPoint, MapSpec, Pond};

// Amplitude of the ambient ground ripple
const GROUND_NOISE: f64 = 0.3;
// Pond bowl is deepened by this factor at the center
const POND_DEPTH_SCALE: f64 = 1.2;
// Multiplicative wobble applied to the pond bowl
const POND_NOISE: f64 = 0.05;
// Share of the ground ripple that survives inside the river bed
const RIVER_NOISE_SHARE: f64 = 0.3;
// Relative amplitude of the river width jitter
const WIDTH_JITTER: f64 = 0.15;

// Which carving rule produced an elevation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Surface {
    Pond {
        distance: f64,
    },
    River {
        segment: usize,
        distance: f64,
        // Jittered width at the closest point
        width: f64,
        depth: f64,
    },
    Ground,
}

// Closest river segment to a point, with width/depth interpolated at the projection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentHit {
    pub segment: usize,
    pub t: f64,
    pub distance: f64,
    pub width: f64,
    pub depth: f64,
}

#[inline]
fn ground_noise(x: f64, z: f64) -> f64 {
    (x * 0.1).sin() * (z * 0.1).cos() * GROUND_NOISE
}

#[inline]
fn width_jitter(x: f64, z: f64) -> f64 {
    1.0 + (x * 0.3 + z * 0.2).sin() * WIDTH_JITTER
}

#[inline]
fn edge_variation(x: f64, z: f64) -> f64 {
    0.9 + (x * 0.5).sin() * (z * 0.5).cos() * 0.1
}

// River path plus pond. Owns the elevation rules and the keep-out test used by scattering.
#[derive(Debug, Clone)]
pub struct RiverNetwork {
    path: Vec<ControlPoint>,
    pond: Pond,
    pond_buffer: f64,
    river_buffer: f64,
}

impl RiverNetwork {
    pub fn new(
        path: Vec<ControlPoint>,
        pond: Pond,
        pond_buffer: f64,
        river_buffer: f64,
    ) -> Result<Self, MapError> {
        if path.len() < 2 {
            return Err(MapError::RiverTooShort(path.len()));
        }
        if !(pond.radius > 0.0) {
            return Err(MapError::InvalidPond("radius must be positive"));
        }
        Ok(Self {
            path,
            pond,
            pond_buffer,
            river_buffer,
        })
    }

    pub fn from_spec(spec: &MapSpec) -> Result<Self, MapError> {
        Self::new(
            spec.river.clone(),
            spec.pond.clone(),
            spec.scatter.pond_buffer,
            spec.scatter.river_buffer,
        )
    }

    pub fn path(&self) -> &[ControlPoint] {
        &self.path
    }

    pub fn pond(&self) -> &Pond {
        &self.pond
    }

    fn segments(&self) -> impl Iterator<Item = (usize, &ControlPoint, &ControlPoint)> {
        self.path
            .windows(2)
            .enumerate()
            .map(|(i, w)| (i, &w[0], &w[1]))
    }

    fn hit(p: Point2, index: usize, a: &ControlPoint, b: &ControlPoint) -> SegmentHit {
        let proj = project_onto_segment(p, a.position(), b.position());
        SegmentHit {
            segment: index,
            t: proj.t,
            distance: proj.distance,
            width: lerp(a.width, b.width, proj.t),
            depth: lerp(a.depth, b.depth, proj.t),
        }
    }

    // Segment with the smallest point-to-segment distance. Ties keep the earlier segment.
    pub fn nearest_segment(&self, x: f64, z: f64) -> SegmentHit {
        let p = Point2::new(x, z);
        let mut best: Option<SegmentHit> = None;
        for (i, a, b) in self.segments() {
            let hit = Self::hit(p, i, a, b);
            if best.is_none_or(|cur| hit.distance < cur.distance) {
                best = Some(hit);
            }
        }
        // The constructor guarantees at least one segment
        best.unwrap_or(SegmentHit {
            segment: 0,
            t: 0.0,
            distance: f64::INFINITY,
            width: 0.0,
            depth: 0.0,
        })
    }

    // Which rule applies at (x, z). The pond is checked first so the river can never overwrite it.
    pub fn surface(&self, x: f64, z: f64) -> Surface {
        let dist_to_pond = Point2::new(x, z).distance(self.pond.center());
        if dist_to_pond < self.pond.radius {
            return Surface::Pond {
                distance: dist_to_pond,
            };
        }

        let hit = self.nearest_segment(x, z);
        let width = hit.width * width_jitter(x, z);
        if hit.distance < width / 2.0 {
            Surface::River {
                segment: hit.segment,
                distance: hit.distance,
                width,
                depth: hit.depth,
            }
        } else {
            Surface::Ground
        }
    }

    pub fn elevation(&self, x: f64, z: f64) -> f64 {
        let noise = ground_noise(x, z);
        match self.surface(x, z) {
            Surface::Pond { distance } => {
                let f = 1.0 - distance / self.pond.radius;
                let wobble = 1.0 + (noise / GROUND_NOISE) * POND_NOISE;
                -self.pond.depth * f * f * POND_DEPTH_SCALE * wobble
            }
            Surface::River {
                distance,
                width,
                depth,
                ..
            } => {
                let f = 1.0 - distance / (width / 2.0);
                -depth * f * f * edge_variation(x, z) + noise * RIVER_NOISE_SHARE
            }
            Surface::Ground => noise,
        }
    }

    // Keep-out test for scattering: pond plus buffer, or any segment's
    // un-jittered half width plus buffer.
    pub fn is_in_river(&self, x: f64, z: f64) -> bool {
        let p = Point2::new(x, z);
        if p.distance(self.pond.center()) < self.pond.radius + self.pond_buffer {
            return true;
        }
        self.segments().any(|(i, a, b)| {
            let hit = Self::hit(p, i, a, b);
            hit.distance < hit.width / 2.0 + self.river_buffer
        })
    }
}

impl HeightSource for RiverNetwork {
    fn height(&self, x: f64, z: f64) -> f64 {
        self.elevation(x, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jungle() -> RiverNetwork {
        RiverNetwork::from_spec(&MapSpec::jungle()).unwrap()
    }

    #[test]
    fn pond_center_is_deepest() {
        let r = jungle();
        let center = r.elevation(-10.0, 0.0);
        // -6.5 * 1.2 with the wobble at (−10, 0): sin(−1)·cos(0)·0.05
        let expected = -6.5 * 1.2 * (1.0 + (-1.0f64).sin() * 0.05);
        assert!((center - expected).abs() < 1e-9);
        assert!(center < r.elevation(-10.0, 20.0));
    }

    #[test]
    fn pond_takes_precedence() {
        let r = jungle();
        // Right on the river control point inside the pond
        assert!(matches!(r.surface(-10.0, 0.0), Surface::Pond { .. }));
        assert!(matches!(r.surface(-20.0, -20.0), Surface::Pond { .. }));
    }

    #[test]
    fn river_trench_is_below_ground() {
        let r = jungle();
        // Control point (-30, -45), width 25, depth 4.5
        match r.surface(-30.0, -45.0) {
            Surface::River { segment, depth, .. } => {
                assert!(segment == 1 || segment == 2);
                assert!((depth - 4.5).abs() < 1e-9);
            }
            other => panic!("expected river, got {:?}", other),
        }
        assert!(r.elevation(-30.0, -45.0) < -3.0);
    }

    #[test]
    fn far_ground_is_ambient_noise() {
        let r = jungle();
        let (x, z) = (90.0, 0.0);
        assert_eq!(r.surface(x, z), Surface::Ground);
        assert_eq!(r.elevation(x, z), ground_noise(x, z));
        assert!(r.elevation(x, z).abs() <= GROUND_NOISE);
    }

    #[test]
    fn nearest_segment_interpolates() {
        let r = jungle();
        // Midpoint of segment 0: (-60, -82.5), width 10.5, depth 1.75
        let hit = r.nearest_segment(-60.0, -82.5);
        assert_eq!(hit.segment, 0);
        assert!((hit.t - 0.5).abs() < 1e-9);
        assert!(hit.distance < 1e-9);
        assert!((hit.width - 10.5).abs() < 1e-9);
        assert!((hit.depth - 1.75).abs() < 1e-9);
    }

    #[test]
    fn containment_buffers() {
        let r = jungle();
        // 37 units from the pond center: outside the pond, inside the 3 unit buffer
        assert!(r.is_in_river(-10.0 + 37.0, 0.0));
        assert!(!r.is_in_river(90.0, 90.0));
        // Segment 0 starts at (-70, -95) with width 6: half width 3 + buffer 2.
        // Step perpendicular to its direction (20, 25).
        let (px, pz) = (25.0 / 41.0f64.sqrt() / 5.0, -20.0 / 41.0f64.sqrt() / 5.0);
        assert!(r.is_in_river(-70.0 + 4.5 * px, -95.0 + 4.5 * pz));
        assert!(!r.is_in_river(-70.0 + 5.5 * px, -95.0 + 5.5 * pz));
    }

    #[test]
    fn rejects_short_path() {
        let spec = MapSpec::jungle();
        let err = RiverNetwork::new(
            spec.river[..1].to_vec(),
            spec.pond.clone(),
            3.0,
            2.0,
        )
        .unwrap_err();
        assert!(matches!(err, MapError::RiverTooShort(1)));
    }
}
