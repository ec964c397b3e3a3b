use image::{Rgb, RgbImage};
use palette::{Gradient, LinSrgb};

use crate::heightfield::HeightField;
use crate::scatter::Placement;

// 2D height map: row‐major Vec<Vec<f32>>, access as `map[z][x]`
pub type HeightMap2D = Vec<Vec<f32>>;

// Lambertian hillshade with the light at 45° azimuth / 45° altitude.
// `z_scale` adjusts vertical exaggeration. Border cells stay dark.
pub fn hillshade(map: &HeightMap2D, z_scale: f32) -> HeightMap2D {
    let h = map.len();
    let w = map.first().map_or(0, |r| r.len());
    let mut shade = vec![vec![0.0; w]; h];
    let azimuth = std::f32::consts::FRAC_PI_4;
    let altitude = std::f32::consts::FRAC_PI_4;
    let (sin_alt, cos_alt) = altitude.sin_cos();
    let (lx, ly, lz) = (azimuth.cos() * cos_alt, azimuth.sin() * cos_alt, sin_alt);

    for y in 1..h.saturating_sub(1) {
        for x in 1..w.saturating_sub(1) {
            let dzdx = ((map[y][x + 1] - map[y][x - 1]) / 2.0) * z_scale;
            let dzdy = ((map[y + 1][x] - map[y - 1][x]) / 2.0) * z_scale;
            let (nx, ny, nz) = (-dzdx, -dzdy, 1.0);
            let len = (nx * nx + ny * ny + nz * nz).sqrt();
            shade[y][x] = ((nx * lx + ny * ly + nz * lz) / len).max(0.0);
        }
    }
    shade
}

// Top-down preview of a height-field: water below zero in blues, ground in
// greens/browns, hillshaded; placements drawn as single pixels on top.
pub struct Preview {
    // Output pixels per grid cell
    pub scale: u32,
    pub z_scale: f32,
}

impl Default for Preview {
    fn default() -> Self {
        Self {
            scale: 4,
            z_scale: 2.0,
        }
    }
}

impl Preview {
    pub fn render(&self, hf: &HeightField, rocks: &[Placement], trees: &[Placement]) -> RgbImage {
        let map = hf.to_height_map();
        let shade = hillshade(&map, self.z_scale);
        let (min, max) = hf.min_max();

        let water = Gradient::with_domain(vec![
            (0.0, LinSrgb::new(0.0, 0.05, 0.3)), // deep
            (1.0, LinSrgb::new(0.1, 0.45, 0.8)), // shallow
        ]);
        let land = Gradient::with_domain(vec![
            (0.0, LinSrgb::new(0.35, 0.45, 0.12)),
            (1.0, LinSrgb::new(0.45, 0.6, 0.2)),
        ]);

        let n = hf.resolution();
        let scale = self.scale.max(1);
        let side = n as u32 * scale;
        let mut img = RgbImage::new(side, side);

        for (j, row) in map.iter().enumerate() {
            for (i, &h) in row.iter().enumerate() {
                let col: LinSrgb = if h < 0.0 {
                    water.get(if min < 0.0 { 1.0 - h / min } else { 1.0 })
                } else {
                    land.get(if max > 0.0 { h / max } else { 0.0 })
                };
                let rgb = col.into_format::<u8>();
                let light = (shade[j][i] * 0.5 + 0.5).clamp(0.0, 1.0);
                let pixel = Rgb([
                    (rgb.red as f32 * light) as u8,
                    (rgb.green as f32 * light) as u8,
                    (rgb.blue as f32 * light) as u8,
                ]);
                for dy in 0..scale {
                    for dx in 0..scale {
                        img.put_pixel(i as u32 * scale + dx, j as u32 * scale + dy, pixel);
                    }
                }
            }
        }

        self.dots(&mut img, hf, rocks, Rgb([150, 150, 150]));
        self.dots(&mut img, hf, trees, Rgb([10, 60, 5]));
        img
    }

    fn dots(&self, img: &mut RgbImage, hf: &HeightField, placements: &[Placement], color: Rgb<u8>) {
        let side = img.width() as f64;
        for p in placements {
            let px = (p.position.x / hf.size() + 0.5) * side;
            let pz = (p.position.z / hf.size() + 0.5) * side;
            if px >= 0.0 && pz >= 0.0 && px < side && pz < side {
                img.put_pixel(px as u32, pz as u32, color);
            }
        }
    }
}
