// Static description of a playable map: river network, pond and the
// named landmarks that get scattered or placed on top of the ground.
// The built-in jungle map lives in `MapSpec::jungle()`; any other map can be
// loaded from a TOML file of the same shape.

use std::f64::consts::PI;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::MapError;
use crate::geometry::Point2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    pub x: f64,
    pub z: f64,
    pub width: f64,
    pub depth: f64,
}

impl ControlPoint {
    pub fn position(&self) -> Point2 {
        Point2::new(self.x, self.z)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pond {
    pub x: f64,
    pub z: f64,
    pub radius: f64,
    pub depth: f64,
}

impl Pond {
    pub fn center(&self) -> Point2 {
        Point2::new(self.x, self.z)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mountain {
    pub x: f64,
    pub z: f64,
    pub height: f64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bridge {
    pub x: f64,
    pub z: f64,
    // Yaw in radians
    pub rotation: f64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RockCluster {
    pub x: f64,
    pub z: f64,
    pub count: usize,
    pub size_range: [f64; 2],
    pub spread: f64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeZone {
    pub x: f64,
    pub z: f64,
    pub count: usize,
    pub spread: f64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrassArea {
    pub x: f64,
    pub z: f64,
    pub size: f64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct House {
    pub x: f64,
    pub z: f64,
    pub name: String,
}

// Side length and subdivision of the ground mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSettings {
    pub size: f64,
    pub segments: usize,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            size: 200.0,
            segments: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterSettings {
    pub min_rock_distance: f64,
    pub min_tree_distance: f64,
    // Draw budget per requested feature
    pub attempts_per_feature: usize,
    // Rock height as a fraction of its size
    pub rock_height_ratio: f64,
    // Keep-out margins around the visual water edge
    pub pond_buffer: f64,
    pub river_buffer: f64,
}

impl Default for ScatterSettings {
    fn default() -> Self {
        Self {
            min_rock_distance: 2.5,
            min_tree_distance: 4.0,
            attempts_per_feature: 10,
            rock_height_ratio: 0.9,
            pond_buffer: 3.0,
            river_buffer: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSpec {
    #[serde(default)]
    pub grid: GridSettings,
    #[serde(default)]
    pub scatter: ScatterSettings,
    pub pond: Pond,
    pub river: Vec<ControlPoint>,
    #[serde(default)]
    pub mountains: Vec<Mountain>,
    #[serde(default)]
    pub bridges: Vec<Bridge>,
    #[serde(default)]
    pub rock_clusters: Vec<RockCluster>,
    #[serde(default)]
    pub tree_zones: Vec<TreeZone>,
    #[serde(default)]
    pub grass_areas: Vec<GrassArea>,
    #[serde(default)]
    pub houses: Vec<House>,
}

fn cp(x: f64, z: f64, width: f64, depth: f64) -> ControlPoint {
    ControlPoint { x, z, width, depth }
}

fn rocks(x: f64, z: f64, count: usize, lo: f64, hi: f64, name: &str) -> RockCluster {
    RockCluster {
        x,
        z,
        count,
        size_range: [lo, hi],
        spread: 15.0,
        name: name.to_string(),
    }
}

fn trees(x: f64, z: f64, count: usize, name: &str) -> TreeZone {
    TreeZone {
        x,
        z,
        count,
        spread: 25.0,
        name: name.to_string(),
    }
}

fn grass(x: f64, z: f64, size: f64, name: &str) -> GrassArea {
    GrassArea {
        x,
        z,
        size,
        name: name.to_string(),
    }
}

impl MapSpec {
    // The 200×200 jungle map: a river running north to south through a central pond
    pub fn jungle() -> Self {
        let river = vec![
            cp(-70.0, -95.0, 6.0, 1.0),
            cp(-50.0, -70.0, 15.0, 2.5),
            cp(-30.0, -45.0, 25.0, 4.5),
            cp(-20.0, -20.0, 12.0, 2.0),
            cp(-10.0, 0.0, 50.0, 6.0),
            cp(-15.0, 25.0, 14.0, 2.5),
            cp(-5.0, 50.0, 22.0, 3.5),
            cp(10.0, 70.0, 7.0, 1.2),
            cp(25.0, 95.0, 14.0, 2.5),
        ];

        let mountains = [
            (-70.0, -70.0, 25.0, "North Mountain"),
            (85.0, -40.0, 30.0, "East Peak"),
            (-85.0, 60.0, 20.0, "West Ridge"),
            (50.0, 75.0, 22.0, "South Hill"),
        ]
        .into_iter()
        .map(|(x, z, height, name)| Mountain {
            x,
            z,
            height,
            name: name.to_string(),
        })
        .collect();

        let bridges = [
            (-40.0, -57.0, PI / 3.0, "North Bridge"),
            (-25.0, -32.0, PI / 4.0, "North-Center Bridge"),
            (-10.0, 37.0, -PI / 6.0, "South-Center Bridge"),
            (17.0, 82.0, PI / 4.0, "South Bridge"),
        ]
        .into_iter()
        .map(|(x, z, rotation, name)| Bridge {
            x,
            z,
            rotation,
            name: name.to_string(),
        })
        .collect();

        let rock_clusters = vec![
            rocks(-30.0, -70.0, 8, 1.0, 3.0, "North Rocks"),
            rocks(70.0, -45.0, 10, 1.5, 4.0, "East Boulders"),
            rocks(-75.0, 10.0, 7, 1.0, 2.5, "West Rocks"),
            rocks(35.0, 70.0, 9, 1.2, 3.5, "South Boulders"),
            rocks(5.0, 15.0, 6, 0.8, 2.0, "Center Rocks"),
            rocks(-55.0, -40.0, 5, 2.0, 5.0, "Large NW Rocks"),
            rocks(55.0, 30.0, 7, 1.0, 3.0, "East Field Rocks"),
            rocks(-40.0, 60.0, 6, 1.5, 4.0, "Valley Boulders"),
            rocks(25.0, -35.0, 8, 0.7, 2.0, "Small Rocks North"),
            rocks(-65.0, -70.0, 5, 2.5, 5.0, "Mountain Base Rocks"),
            rocks(80.0, -65.0, 6, 2.0, 4.5, "Peak Base Rocks"),
            rocks(15.0, 50.0, 4, 1.0, 2.5, "River Rocks"),
        ];

        let tree_zones = vec![
            trees(-50.0, -30.0, 25, "North Forest"),
            trees(30.0, -60.0, 30, "East Woods"),
            trees(-40.0, 30.0, 20, "West Grove"),
            trees(10.0, 60.0, 25, "South Forest"),
            trees(-10.0, -10.0, 15, "Center Trees"),
            trees(-70.0, -50.0, 18, "NW Forest"),
            trees(60.0, -30.0, 22, "NE Woods"),
            trees(-60.0, 50.0, 20, "SW Grove"),
            trees(45.0, 45.0, 18, "SE Forest"),
            trees(0.0, -80.0, 12, "Far North Trees"),
            trees(-80.0, 0.0, 15, "Far West Woods"),
            trees(80.0, 20.0, 16, "Far East Forest"),
        ];

        let grass_areas = vec![
            grass(0.0, -70.0, 15.0, "North Field"),
            grass(60.0, 0.0, 12.0, "East Meadow"),
            grass(-60.0, -20.0, 10.0, "West Field"),
            grass(20.0, 40.0, 14.0, "South Meadow"),
            grass(-20.0, 70.0, 8.0, "Valley Grass"),
            grass(-45.0, -60.0, 10.0, "NW Field"),
            grass(50.0, -50.0, 12.0, "NE Meadow"),
            grass(-70.0, 35.0, 9.0, "SW Grass"),
            grass(65.0, 55.0, 11.0, "SE Field"),
            grass(15.0, -40.0, 8.0, "North Plains"),
            grass(-35.0, 0.0, 10.0, "West Plains"),
            grass(40.0, 10.0, 9.0, "East Plains"),
            grass(0.0, 30.0, 13.0, "Central Meadow"),
            grass(-50.0, -80.0, 7.0, "Far NW Grass"),
            grass(75.0, -75.0, 8.0, "Far NE Field"),
            grass(-80.0, 70.0, 9.0, "Far SW Meadow"),
            grass(70.0, 80.0, 10.0, "Far SE Grass"),
            grass(30.0, -20.0, 6.0, "Small Field 1"),
            grass(-25.0, -45.0, 7.0, "Small Field 2"),
            grass(10.0, 75.0, 8.0, "Small Field 3"),
        ];

        let houses = [
            (-60.0, -60.0, "North House"),
            (70.0, -70.0, "East House"),
            (-75.0, 20.0, "West House"),
            (40.0, 65.0, "South House"),
            (10.0, -30.0, "Center House"),
            (-30.0, 80.0, "Valley House"),
        ]
        .into_iter()
        .map(|(x, z, name)| House {
            x,
            z,
            name: name.to_string(),
        })
        .collect();

        Self {
            grid: GridSettings::default(),
            scatter: ScatterSettings::default(),
            pond: Pond {
                x: -10.0,
                z: 0.0,
                radius: 35.0,
                depth: 6.5,
            },
            river,
            mountains,
            bridges,
            rock_clusters,
            tree_zones,
            grass_areas,
            houses,
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, MapError> {
        let spec: MapSpec = toml::from_str(s)?;
        spec.validate()?;
        Ok(spec)
    }

    pub fn load(path: &Path) -> Result<Self, MapError> {
        let s = fs::read_to_string(path).map_err(|source| MapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&s)
    }

    pub fn to_toml_string(&self) -> Result<String, MapError> {
        Ok(toml::to_string(self)?)
    }

    // Reject maps the generator cannot build. Called before anything is emitted.
    pub fn validate(&self) -> Result<(), MapError> {
        if self.river.len() < 2 {
            return Err(MapError::RiverTooShort(self.river.len()));
        }
        for (index, p) in self.river.iter().enumerate() {
            let reason = if !(p.x.is_finite() && p.z.is_finite()) {
                Some("position is not finite")
            } else if !(p.width.is_finite() && p.width > 0.0) {
                Some("width must be positive")
            } else if !(p.depth.is_finite() && p.depth >= 0.0) {
                Some("depth must be non-negative")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(MapError::InvalidControlPoint { index, reason });
            }
        }

        if !(self.pond.x.is_finite() && self.pond.z.is_finite()) {
            return Err(MapError::InvalidPond("center is not finite"));
        }
        if !(self.pond.radius.is_finite() && self.pond.radius > 0.0) {
            return Err(MapError::InvalidPond("radius must be positive"));
        }
        if !(self.pond.depth.is_finite() && self.pond.depth >= 0.0) {
            return Err(MapError::InvalidPond("depth must be non-negative"));
        }

        if !(self.grid.size.is_finite() && self.grid.size > 0.0) {
            return Err(MapError::InvalidGrid("size must be positive"));
        }
        if self.grid.segments == 0 {
            return Err(MapError::InvalidGrid("segments must be at least 1"));
        }

        let s = &self.scatter;
        if s.attempts_per_feature == 0 {
            return Err(MapError::InvalidScatter(
                "attempts_per_feature must be at least 1".into(),
            ));
        }
        for (label, v) in [
            ("min_rock_distance", s.min_rock_distance),
            ("min_tree_distance", s.min_tree_distance),
            ("rock_height_ratio", s.rock_height_ratio),
            ("pond_buffer", s.pond_buffer),
            ("river_buffer", s.river_buffer),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(MapError::InvalidScatter(format!(
                    "{label} must be non-negative, got {v}"
                )));
            }
        }
        for c in &self.rock_clusters {
            let [lo, hi] = c.size_range;
            if !(lo.is_finite() && hi.is_finite() && lo > 0.0 && lo <= hi) {
                return Err(MapError::InvalidScatter(format!(
                    "rock cluster '{}' has size range [{lo}, {hi}]",
                    c.name
                )));
            }
            if !(c.spread.is_finite() && c.spread >= 0.0) {
                return Err(MapError::InvalidScatter(format!(
                    "rock cluster '{}' has negative spread",
                    c.name
                )));
            }
        }
        for z in &self.tree_zones {
            if !(z.spread.is_finite() && z.spread >= 0.0) {
                return Err(MapError::InvalidScatter(format!(
                    "tree zone '{}' has negative spread",
                    z.name
                )));
            }
        }
        Ok(())
    }
}

impl Default for MapSpec {
    fn default() -> Self {
        Self::jungle()
    }
}
