use serde::{Deserialize, Serialize};

use crate::HeightSource;
use crate::utils::HeightMap2D;

// Regular (N+1)×(N+1) grid of elevations over [-size/2, size/2]².
// Row `j` runs along +z, column `i` along +x. Heights are stored row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightField {
    size: f64,
    segments: usize,
    heights: Vec<f32>,
}

impl HeightField {
    // Sample every vertex of the grid from `source`
    pub fn sample(source: &dyn HeightSource, size: f64, segments: usize) -> Self {
        let n = segments + 1;
        let mut heights = Vec::with_capacity(n * n);
        for j in 0..n {
            let z = Self::coord_of(size, segments, j);
            for i in 0..n {
                let x = Self::coord_of(size, segments, i);
                heights.push(source.height(x, z) as f32);
            }
        }
        Self {
            size,
            segments,
            heights,
        }
    }

    #[inline]
    fn coord_of(size: f64, segments: usize, i: usize) -> f64 {
        -size / 2.0 + size * i as f64 / segments as f64
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn segments(&self) -> usize {
        self.segments
    }

    // Vertices per side
    pub fn resolution(&self) -> usize {
        self.segments + 1
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    // World coordinate of grid line `i` on either axis
    pub fn coord(&self, i: usize) -> f64 {
        Self::coord_of(self.size, self.segments, i)
    }

    pub fn height_at(&self, i: usize, j: usize) -> f32 {
        self.heights[j * self.resolution() + i]
    }

    // World-space vertex (x, y, z)
    pub fn vertex(&self, i: usize, j: usize) -> [f32; 3] {
        [
            self.coord(i) as f32,
            self.height_at(i, j),
            self.coord(j) as f32,
        ]
    }

    pub fn vertices(&self) -> Vec<[f32; 3]> {
        let n = self.resolution();
        (0..n)
            .flat_map(|j| (0..n).map(move |i| (i, j)))
            .map(|(i, j)| self.vertex(i, j))
            .collect()
    }

    // Two counter-clockwise triangles per cell, seen from +y
    pub fn indices(&self) -> Vec<u32> {
        let n = self.resolution() as u32;
        let mut out = Vec::with_capacity(self.segments * self.segments * 6);
        for j in 0..n - 1 {
            for i in 0..n - 1 {
                let a = j * n + i;
                let b = a + 1;
                let c = a + n;
                let d = c + 1;
                out.extend_from_slice(&[a, c, b, b, c, d]);
            }
        }
        out
    }

    // Per-vertex normals from central differences (one-sided at the border)
    pub fn normals(&self) -> Vec<[f32; 3]> {
        let n = self.resolution();
        let step = (self.size / self.segments as f64) as f32;
        let mut out = Vec::with_capacity(n * n);
        for j in 0..n {
            for i in 0..n {
                let (l, r) = (i.saturating_sub(1), (i + 1).min(n - 1));
                let (d, u) = (j.saturating_sub(1), (j + 1).min(n - 1));
                let dydx = (self.height_at(r, j) - self.height_at(l, j)) / ((r - l) as f32 * step);
                let dydz = (self.height_at(i, u) - self.height_at(i, d)) / ((u - d) as f32 * step);
                let (nx, ny, nz) = (-dydx, 1.0, -dydz);
                let len = (nx * nx + ny * ny + nz * nz).sqrt();
                out.push([nx / len, ny / len, nz / len]);
            }
        }
        out
    }

    pub fn min_max(&self) -> (f32, f32) {
        self.heights
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), &h| (lo.min(h), hi.max(h)))
    }

    // Row-major 2D copy, `map[j][i]`
    pub fn to_height_map(&self) -> HeightMap2D {
        self.heights
            .chunks(self.resolution())
            .map(|row| row.to_vec())
            .collect()
    }
}
