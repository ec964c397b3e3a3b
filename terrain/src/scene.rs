// Renderer- and physics-agnostic primitives emitted by the map builder.
// The caller owns whatever consumes them; the builder only appends.

use serde::{Deserialize, Serialize};

use crate::heightfield::HeightField;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    // 0xRRGGBB
    pub color: u32,
    pub roughness: f32,
    pub metalness: f32,
    pub opacity: f32,
}

impl Material {
    pub const fn standard(color: u32, roughness: f32, metalness: f32) -> Self {
        Self {
            color,
            roughness,
            metalness,
            opacity: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Geometry {
    Terrain(HeightField),
    Sphere {
        radius: f64,
        segments: u32,
    },
    Cone {
        radius: f64,
        height: f64,
        radial_segments: u32,
    },
    Cylinder {
        radius_top: f64,
        radius_bottom: f64,
        height: f64,
        radial_segments: u32,
    },
    Cuboid {
        width: f64,
        height: f64,
        depth: f64,
    },
    Dodecahedron {
        radius: f64,
    },
    Disc {
        radius: f64,
        segments: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: [f64; 3],
    // Euler angles in radians, applied X then Y then Z
    pub rotation: [f64; 3],
    pub scale: [f64; 3],
}

impl Transform {
    pub const fn at(x: f64, y: f64, z: f64) -> Self {
        Self {
            translation: [x, y, z],
            rotation: [0.0; 3],
            scale: [1.0; 3],
        }
    }

    pub const fn with_rotation(mut self, rx: f64, ry: f64, rz: f64) -> Self {
        self.rotation = [rx, ry, rz];
        self
    }

    pub const fn with_scale(mut self, sx: f64, sy: f64, sz: f64) -> Self {
        self.scale = [sx, sy, sz];
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshPrimitive {
    pub geometry: Geometry,
    pub material: Material,
    pub transform: Transform,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

// Labelled debug pole for a named landmark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub x: f64,
    pub z: f64,
    pub color: u32,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Collider {
    // Infinite plane, normal along the body's local +z
    Plane,
    Cuboid {
        half_extents: [f64; 3],
    },
    Cylinder {
        radius_top: f64,
        radius_bottom: f64,
        height: f64,
        segments: u32,
    },
}

// Massless body that never moves
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaticBody {
    pub collider: Collider,
    pub position: [f64; 3],
    // Euler angles in radians, applied X then Y then Z
    pub rotation: [f64; 3],
}

impl StaticBody {
    pub const fn at(collider: Collider, x: f64, y: f64, z: f64) -> Self {
        Self {
            collider,
            position: [x, y, z],
            rotation: [0.0; 3],
        }
    }

    pub const fn with_rotation(mut self, rx: f64, ry: f64, rz: f64) -> Self {
        self.rotation = [rx, ry, rz];
        self
    }
}

pub trait SceneSink {
    fn add_mesh(&mut self, mesh: MeshPrimitive);

    // Markers are an optional debug overlay
    fn add_marker(&mut self, _marker: Marker) {}
}

pub trait PhysicsSink {
    fn add_body(&mut self, body: StaticBody);
}

// Collects everything into vectors. Handy for tests and for dumping to JSON.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SceneCollector {
    pub meshes: Vec<MeshPrimitive>,
    pub markers: Vec<Marker>,
}

impl SceneSink for SceneCollector {
    fn add_mesh(&mut self, mesh: MeshPrimitive) {
        self.meshes.push(mesh);
    }

    fn add_marker(&mut self, marker: Marker) {
        self.markers.push(marker);
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct PhysicsCollector {
    pub bodies: Vec<StaticBody>,
}

impl PhysicsSink for PhysicsCollector {
    fn add_body(&mut self, body: StaticBody) {
        self.bodies.push(body);
    }
}
