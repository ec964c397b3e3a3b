use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use serde::Serialize;

use crate::error::MapError;
use crate::geometry::Point2;
use crate::heightfield::HeightField;
use crate::map::{Bridge, GrassArea, House, MapSpec, Mountain};
use crate::river::RiverNetwork;
use crate::scatter::{
    Cluster, ClusterReport, FractionSource, ModularFractions, Placement, ScatterParams, Scatterer,
    Shape,
};
use crate::scene::{
    Collider, Geometry, Marker, Material, MeshPrimitive, PhysicsSink, SceneSink, StaticBody,
    Transform,
};

const GROUND: Material = Material::standard(0x6B8E23, 0.9, 0.0);
const MOUNTAIN: Material = Material::standard(0x654321, 0.9, 0.1);
const ROCK: Material = Material::standard(0x696969, 0.8, 0.1);
const TRUNK: Material = Material::standard(0x3d2817, 0.9, 0.0);
const FOLIAGE: Material = Material::standard(0x1a4d0a, 0.8, 0.0);
const DECK: Material = Material::standard(0x8B6914, 0.8, 0.0);
const RAIL: Material = Material::standard(0x654321, 0.7, 0.0);
const PILLAR: Material = Material::standard(0x654321, 0.9, 0.0);
const GRASS: Material = Material::standard(0x7CFC00, 1.0, 0.0);
const WALLS: Material = Material::standard(0x8B7355, 0.8, 0.0);
const ROOF: Material = Material::standard(0x8B0000, 0.7, 0.0);

const MARK_RIVER: u32 = 0x00aaff;
const MARK_MOUNTAIN: u32 = 0x8B4513;
const MARK_BRIDGE: u32 = 0xDEB887;
const MARK_ROCKS: u32 = 0x808080;
const MARK_TREES: u32 = 0x00ff00;
const MARK_GRASS: u32 = 0x90EE90;
const MARK_HOUSE: u32 = 0xff0000;

const TRUNK_HEIGHT: f64 = 8.0;
const TRUNK_RADIUS: f64 = 0.8;
const FOLIAGE_RADIUS: f64 = 4.0;

const BRIDGE_LENGTH: f64 = 12.0;
const BRIDGE_WIDTH: f64 = 4.0;
const BRIDGE_THICKNESS: f64 = 0.5;
const BRIDGE_DECK_Y: f64 = 1.0;

const HOUSE_WIDTH: f64 = 6.0;
const HOUSE_HEIGHT: f64 = 5.0;
const HOUSE_DEPTH: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloorOptions {
    // Emit labelled poles for every named landmark
    pub markers: bool,
}

impl Default for FloorOptions {
    fn default() -> Self {
        Self { markers: true }
    }
}

// Counts of what a build emitted, for logging and dumps
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FloorSummary {
    pub meshes: usize,
    pub bodies: usize,
    pub markers: usize,
    pub rocks: usize,
    pub trees: usize,
    pub grass_patches: usize,
}

// Counting wrappers so the summary does not depend on the sinks
struct Counted<'a, S: ?Sized> {
    inner: &'a mut S,
    count: usize,
    markers: usize,
}

impl<'a, S: ?Sized> Counted<'a, S> {
    fn new(inner: &'a mut S) -> Self {
        Self {
            inner,
            count: 0,
            markers: 0,
        }
    }
}

impl<S: SceneSink + ?Sized> SceneSink for Counted<'_, S> {
    fn add_mesh(&mut self, mesh: MeshPrimitive) {
        self.count += 1;
        self.inner.add_mesh(mesh);
    }

    fn add_marker(&mut self, marker: Marker) {
        self.markers += 1;
        self.inner.add_marker(marker);
    }
}

impl<S: PhysicsSink + ?Sized> PhysicsSink for Counted<'_, S> {
    fn add_body(&mut self, body: StaticBody) {
        self.count += 1;
        self.inner.add_body(body);
    }
}

// The generated jungle map. Built once; placements never change afterwards.
#[derive(Debug, Clone)]
pub struct JungleFloor {
    river: RiverNetwork,
    height_field: HeightField,
    rocks: Vec<Placement>,
    trees: Vec<Placement>,
    rock_reports: Vec<ClusterReport>,
    tree_reports: Vec<ClusterReport>,
    summary: FloorSummary,
}

impl JungleFloor {
    // Build with the default modular fraction strategies
    pub fn build(
        spec: &MapSpec,
        options: FloorOptions,
        scene: &mut dyn SceneSink,
        physics: &mut dyn PhysicsSink,
    ) -> Result<Self, MapError> {
        Self::build_with(
            spec,
            options,
            &ModularFractions::rocks(),
            &ModularFractions::trees(),
            scene,
            physics,
        )
    }

    // Build with caller-supplied fraction strategies for rocks and trees
    pub fn build_with(
        spec: &MapSpec,
        options: FloorOptions,
        rock_fractions: &dyn FractionSource,
        tree_fractions: &dyn FractionSource,
        scene: &mut dyn SceneSink,
        physics: &mut dyn PhysicsSink,
    ) -> Result<Self, MapError> {
        spec.validate()?;
        let river = RiverNetwork::from_spec(spec)?;

        let mut scene = Counted::new(scene);
        let mut physics = Counted::new(physics);
        let mut builder = Builder {
            spec,
            river: &river,
            options,
            scene: &mut scene,
            physics: &mut physics,
        };

        let height_field = builder.ground();
        builder.river_markers();
        builder.bridges();
        builder.mountains();
        let (rocks, rock_reports) = builder.rocks(rock_fractions);
        let (trees, tree_reports) = builder.trees(tree_fractions);
        let grass_patches = builder.grass();
        builder.houses();

        let summary = FloorSummary {
            meshes: scene.count,
            bodies: physics.count,
            markers: scene.markers,
            rocks: rocks.len(),
            trees: trees.len(),
            grass_patches,
        };
        log::info!(
            "jungle floor built: {} meshes, {} bodies, {} rocks, {} trees, {} grass patches",
            summary.meshes,
            summary.bodies,
            summary.rocks,
            summary.trees,
            summary.grass_patches
        );

        Ok(Self {
            river,
            height_field,
            rocks,
            trees,
            rock_reports,
            tree_reports,
            summary,
        })
    }

    pub fn river(&self) -> &RiverNetwork {
        &self.river
    }

    pub fn height_field(&self) -> &HeightField {
        &self.height_field
    }

    pub fn rocks(&self) -> &[Placement] {
        &self.rocks
    }

    pub fn trees(&self) -> &[Placement] {
        &self.trees
    }

    pub fn rock_reports(&self) -> &[ClusterReport] {
        &self.rock_reports
    }

    pub fn tree_reports(&self) -> &[ClusterReport] {
        &self.tree_reports
    }

    pub fn summary(&self) -> &FloorSummary {
        &self.summary
    }

    pub fn elevation(&self, x: f64, z: f64) -> f64 {
        self.river.elevation(x, z)
    }

    pub fn is_in_river(&self, x: f64, z: f64) -> bool {
        self.river.is_in_river(x, z)
    }
}

struct Builder<'a, 's> {
    spec: &'a MapSpec,
    river: &'a RiverNetwork,
    options: FloorOptions,
    scene: &'s mut dyn SceneSink,
    physics: &'s mut dyn PhysicsSink,
}

impl Builder<'_, '_> {
    fn marker(&mut self, x: f64, z: f64, color: u32, label: String) {
        if self.options.markers {
            self.scene.add_marker(Marker { x, z, color, label });
        }
    }

    fn mesh(&mut self, geometry: Geometry, material: Material, transform: Transform, cast: bool) {
        self.scene.add_mesh(MeshPrimitive {
            geometry,
            material,
            transform,
            cast_shadow: cast,
            receive_shadow: true,
        });
    }

    // Carved height-field for rendering, flat plane for collision
    fn ground(&mut self) -> HeightField {
        let grid = &self.spec.grid;
        let hf = HeightField::sample(self.river, grid.size, grid.segments);
        self.mesh(
            Geometry::Terrain(hf.clone()),
            GROUND,
            Transform::at(0.0, 0.0, 0.0),
            false,
        );
        self.physics
            .add_body(StaticBody::at(Collider::Plane, 0.0, 0.0, 0.0).with_rotation(-FRAC_PI_2, 0.0, 0.0));
        hf
    }

    fn river_markers(&mut self) {
        let river = self.river;
        let pond = river.pond();
        for p in river.path() {
            let label = if p.position().distance(pond.center()) < f64::EPSILON {
                format!("Pond (R:{} D:{})", pond.radius, pond.depth)
            } else {
                format!("River (W:{} D:{})", p.width, p.depth)
            };
            self.marker(p.x, p.z, MARK_RIVER, label);
        }
    }

    fn bridges(&mut self) {
        let spec = self.spec;
        for Bridge {
            x,
            z,
            rotation,
            name,
        } in &spec.bridges
        {
            self.marker(*x, *z, MARK_BRIDGE, name.clone());
            self.bridge(*x, *z, *rotation);
        }
    }

    fn bridge(&mut self, x: f64, z: f64, yaw: f64) {
        let (sin, cos) = yaw.sin_cos();
        // Rotate a local (dx, dz) offset about +y
        let local = |dx: f64, dz: f64| (x + dx * cos + dz * sin, z - dx * sin + dz * cos);

        self.mesh(
            Geometry::Cuboid {
                width: BRIDGE_LENGTH,
                height: BRIDGE_THICKNESS,
                depth: BRIDGE_WIDTH,
            },
            DECK,
            Transform::at(x, BRIDGE_DECK_Y, z).with_rotation(0.0, yaw, 0.0),
            true,
        );

        for side in [1.0, -1.0] {
            let (rx, rz) = local(0.0, side * BRIDGE_WIDTH / 2.0);
            self.mesh(
                Geometry::Cuboid {
                    width: BRIDGE_LENGTH,
                    height: 0.3,
                    depth: 0.2,
                },
                RAIL,
                Transform::at(rx, 1.8, rz).with_rotation(0.0, yaw, 0.0),
                true,
            );
        }

        for i in [-1.0, 1.0] {
            for j in [-1.0, 1.0] {
                let (px, pz) = local(i * BRIDGE_LENGTH / 3.0, j * BRIDGE_WIDTH / 3.0);
                self.mesh(
                    Geometry::Cylinder {
                        radius_top: 0.3,
                        radius_bottom: 0.4,
                        height: 2.0,
                        radial_segments: 8,
                    },
                    PILLAR,
                    Transform::at(px, 0.5, pz),
                    true,
                );
            }
        }

        self.physics.add_body(
            StaticBody::at(
                Collider::Cuboid {
                    half_extents: [BRIDGE_LENGTH / 2.0, BRIDGE_THICKNESS / 2.0, BRIDGE_WIDTH / 2.0],
                },
                x,
                BRIDGE_DECK_Y,
                z,
            )
            .with_rotation(0.0, yaw, 0.0),
        );
    }

    fn mountains(&mut self) {
        let spec = self.spec;
        for Mountain { x, z, height, name } in &spec.mountains {
            self.marker(*x, *z, MARK_MOUNTAIN, name.clone());
            let base = height * 1.2;
            self.mesh(
                Geometry::Cone {
                    radius: base,
                    height: *height,
                    radial_segments: 8,
                },
                MOUNTAIN,
                Transform::at(*x, height / 2.0, *z),
                true,
            );
            self.physics.add_body(StaticBody::at(
                Collider::Cylinder {
                    radius_top: 0.1,
                    radius_bottom: base,
                    height: *height,
                    segments: 8,
                },
                *x,
                height / 2.0,
                *z,
            ));
        }
    }

    // Rock clusters do not consult the river mask, so rocks can end up in the water
    fn rocks(&mut self, fractions: &dyn FractionSource) -> (Vec<Placement>, Vec<ClusterReport>) {
        let spec = self.spec;
        let settings = &spec.scatter;
        let mut scatterer = Scatterer::new(
            fractions,
            ScatterParams {
                min_distance: settings.min_rock_distance,
                attempts_per_feature: settings.attempts_per_feature,
                shape: Shape::Scaled {
                    height_ratio: settings.rock_height_ratio,
                },
            },
        );

        for (zone, c) in spec.rock_clusters.iter().enumerate() {
            self.marker(c.x, c.z, MARK_ROCKS, c.name.clone());
            let cluster = Cluster {
                center: Point2::new(c.x, c.z),
                spread: c.spread,
                count: c.count,
                size_range: c.size_range,
            };
            let before = scatterer.placements().len();
            scatterer.scatter(zone, &cluster, |_| false);
            let fresh: Vec<Placement> = scatterer.placements()[before..].to_vec();
            for rock in &fresh {
                self.rock(rock);
            }
        }
        scatterer.finish()
    }

    fn rock(&mut self, p: &Placement) {
        let Point2 { x, z } = p.position;
        self.mesh(
            Geometry::Dodecahedron { radius: p.size },
            ROCK,
            Transform::at(x, p.height / 2.0, z)
                .with_rotation(0.0, p.rotation, 0.0)
                .with_scale(1.0, p.height / p.size, 1.0),
            true,
        );
        self.physics.add_body(
            StaticBody::at(
                Collider::Cuboid {
                    half_extents: [p.size, p.height / 2.0, p.size],
                },
                x,
                p.height / 2.0,
                z,
            )
            .with_rotation(0.0, p.rotation, 0.0),
        );
    }

    fn trees(&mut self, fractions: &dyn FractionSource) -> (Vec<Placement>, Vec<ClusterReport>) {
        let spec = self.spec;
        let settings = &spec.scatter;
        let mut scatterer = Scatterer::new(
            fractions,
            ScatterParams {
                min_distance: settings.min_tree_distance,
                attempts_per_feature: settings.attempts_per_feature,
                shape: Shape::Fixed {
                    height: TRUNK_HEIGHT,
                },
            },
        );

        let river = self.river;
        for (zone, t) in spec.tree_zones.iter().enumerate() {
            self.marker(t.x, t.z, MARK_TREES, t.name.clone());
            let cluster = Cluster {
                center: Point2::new(t.x, t.z),
                spread: t.spread,
                count: t.count,
                size_range: [TRUNK_RADIUS, TRUNK_RADIUS],
            };
            let before = scatterer.placements().len();
            scatterer.scatter(zone, &cluster, |p| river.is_in_river(p.x, p.z));
            let fresh: Vec<Placement> = scatterer.placements()[before..].to_vec();
            for tree in &fresh {
                self.tree(tree);
            }
        }
        scatterer.finish()
    }

    fn tree(&mut self, p: &Placement) {
        let Point2 { x, z } = p.position;
        self.mesh(
            Geometry::Cylinder {
                radius_top: p.size,
                radius_bottom: p.size * 1.2,
                height: p.height,
                radial_segments: 8,
            },
            TRUNK,
            Transform::at(x, p.height / 2.0, z),
            true,
        );
        self.mesh(
            Geometry::Sphere {
                radius: FOLIAGE_RADIUS,
                segments: 8,
            },
            FOLIAGE,
            Transform::at(x, p.height + 3.0, z),
            true,
        );
        self.physics.add_body(StaticBody::at(
            Collider::Cylinder {
                radius_top: p.size,
                radius_bottom: p.size,
                height: p.height,
                segments: 8,
            },
            x,
            p.height / 2.0,
            z,
        ));
    }

    // Grass discs are cosmetic: no collision, skipped when the centre is wet
    fn grass(&mut self) -> usize {
        let spec = self.spec;
        let mut placed = 0;
        for GrassArea { x, z, size, name } in &spec.grass_areas {
            if self.river.is_in_river(*x, *z) {
                log::debug!("skipping grass area '{}' inside the river", name);
                continue;
            }
            self.marker(*x, *z, MARK_GRASS, name.clone());
            self.scene.add_mesh(MeshPrimitive {
                geometry: Geometry::Disc {
                    radius: *size,
                    segments: 16,
                },
                material: GRASS,
                transform: Transform::at(*x, 0.05, *z).with_rotation(-FRAC_PI_2, 0.0, 0.0),
                cast_shadow: false,
                receive_shadow: true,
            });
            placed += 1;
        }
        placed
    }

    fn houses(&mut self) {
        let spec = self.spec;
        for House { x, z, name } in &spec.houses {
            self.marker(*x, *z, MARK_HOUSE, name.clone());
            self.mesh(
                Geometry::Cuboid {
                    width: HOUSE_WIDTH,
                    height: HOUSE_HEIGHT,
                    depth: HOUSE_DEPTH,
                },
                WALLS,
                Transform::at(*x, HOUSE_HEIGHT / 2.0, *z),
                true,
            );
            self.mesh(
                Geometry::Cone {
                    radius: HOUSE_WIDTH * 0.8,
                    height: 3.0,
                    radial_segments: 4,
                },
                ROOF,
                Transform::at(*x, HOUSE_HEIGHT + 1.5, *z).with_rotation(0.0, FRAC_PI_4, 0.0),
                true,
            );
            self.physics.add_body(StaticBody::at(
                Collider::Cuboid {
                    half_extents: [HOUSE_WIDTH / 2.0, HOUSE_HEIGHT / 2.0, HOUSE_DEPTH / 2.0],
                },
                *x,
                HOUSE_HEIGHT / 2.0,
                *z,
            ));
        }
    }
}
