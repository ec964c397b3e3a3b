// Rejection sampling of clustered features (rocks, trees).
//
// Candidates come from a `FractionSource` keyed by (zone, attempt) rather than
// a random generator, so the same map always yields the same placements.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::geometry::{Point2, lerp};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Z,
    Size,
}

// Pure function (zone, attempt) -> fraction in [0, 1).
pub trait FractionSource {
    fn fraction(&self, axis: Axis, zone: usize, attempt: usize) -> f64;
}

// ((zone·zone_mul + attempt·attempt_mul) mod modulus) / modulus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Modular {
    pub zone_mul: u64,
    pub attempt_mul: u64,
    pub modulus: u64,
}

impl Modular {
    pub const fn new(zone_mul: u64, attempt_mul: u64, modulus: u64) -> Self {
        Self {
            zone_mul,
            attempt_mul,
            modulus,
        }
    }

    #[inline]
    pub fn sample(&self, zone: usize, attempt: usize) -> f64 {
        let v = (zone as u64)
            .wrapping_mul(self.zone_mul)
            .wrapping_add((attempt as u64).wrapping_mul(self.attempt_mul))
            % self.modulus;
        v as f64 / self.modulus as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModularFractions {
    pub x: Modular,
    pub z: Modular,
    pub size: Modular,
}

impl ModularFractions {
    pub const fn rocks() -> Self {
        Self {
            x: Modular::new(800, 19, 983),
            z: Modular::new(1200, 23, 977),
            size: Modular::new(500, 11, 967),
        }
    }

    // Trees have a fixed size, the size axis only exists for symmetry with rocks
    pub const fn trees() -> Self {
        Self {
            x: Modular::new(1000, 13, 997),
            z: Modular::new(1500, 17, 991),
            size: Modular::new(500, 11, 967),
        }
    }
}

impl FractionSource for ModularFractions {
    fn fraction(&self, axis: Axis, zone: usize, attempt: usize) -> f64 {
        match axis {
            Axis::X => self.x.sample(zone, attempt),
            Axis::Z => self.z.sample(zone, attempt),
            Axis::Size => self.size.sample(zone, attempt),
        }
    }
}

// One accepted feature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub position: Point2,
    pub size: f64,
    pub height: f64,
    // Yaw in radians
    pub rotation: f64,
    // Index of the cluster that produced it
    pub zone: usize,
}

// Where and how many features a cluster asks for
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cluster {
    pub center: Point2,
    pub spread: f64,
    pub count: usize,
    pub size_range: [f64; 2],
}

// How sizes turn into placement heights and orientations
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    // Height = size · ratio, yaw derived from the draw
    Scaled { height_ratio: f64 },
    // Fixed height, no yaw
    Fixed { height: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterParams {
    pub min_distance: f64,
    pub attempts_per_feature: usize,
    pub shape: Shape,
}

// Result of scattering one cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterReport {
    pub zone: usize,
    pub requested: usize,
    pub placed: usize,
    pub attempts: usize,
}

impl ClusterReport {
    // Budget ran out before the target count. Expected on crowded maps.
    pub fn under_filled(&self) -> bool {
        self.placed < self.requested
    }
}

pub struct Scatterer<'a> {
    fractions: &'a dyn FractionSource,
    params: ScatterParams,
    placed: Vec<Placement>,
    reports: Vec<ClusterReport>,
}

impl<'a> Scatterer<'a> {
    pub fn new(fractions: &'a dyn FractionSource, params: ScatterParams) -> Self {
        Self {
            fractions,
            params,
            placed: Vec::new(),
            reports: Vec::new(),
        }
    }

    fn too_close(&self, p: Point2) -> bool {
        self.placed
            .iter()
            .any(|q| p.distance(q.position) < self.params.min_distance)
    }

    // Scatter one cluster. `excluded` rejects candidates (e.g. inside the river).
    // Spacing is checked against everything placed so far in this scatterer,
    // not just the current cluster.
    pub fn scatter(
        &mut self,
        zone: usize,
        cluster: &Cluster,
        excluded: impl Fn(Point2) -> bool,
    ) -> ClusterReport {
        let budget = cluster.count.saturating_mul(self.params.attempts_per_feature);
        let mut placed = 0;
        let mut attempts = 0;

        while placed < cluster.count && attempts < budget {
            let fx = self.fractions.fraction(Axis::X, zone, attempts);
            let fz = self.fractions.fraction(Axis::Z, zone, attempts);
            let fs = self.fractions.fraction(Axis::Size, zone, attempts);
            attempts += 1;

            let candidate = Point2::new(
                cluster.center.x + (fx - 0.5) * cluster.spread,
                cluster.center.z + (fz - 0.5) * cluster.spread,
            );
            if excluded(candidate) || self.too_close(candidate) {
                continue;
            }

            let size = lerp(cluster.size_range[0], cluster.size_range[1], fs);
            let (height, rotation) = match self.params.shape {
                Shape::Scaled { height_ratio } => (size * height_ratio, (fx + fz).fract() * TAU),
                Shape::Fixed { height } => (height, 0.0),
            };
            self.placed.push(Placement {
                position: candidate,
                size,
                height,
                rotation,
                zone,
            });
            placed += 1;
        }

        let report = ClusterReport {
            zone,
            requested: cluster.count,
            placed,
            attempts,
        };
        if report.under_filled() {
            log::debug!(
                "zone {} under-filled: {}/{} after {} attempts",
                zone,
                placed,
                cluster.count,
                attempts
            );
        }
        self.reports.push(report);
        report
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placed
    }

    pub fn reports(&self) -> &[ClusterReport] {
        &self.reports
    }

    pub fn finish(self) -> (Vec<Placement>, Vec<ClusterReport>) {
        (self.placed, self.reports)
    }
}
