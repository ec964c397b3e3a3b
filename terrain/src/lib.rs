// terrain holds the map description, river carving, feature scattering
// and the jungle floor builder
pub mod error;
pub mod geometry;
pub mod heightfield;
pub mod jungle;
pub mod map;
pub mod river;
pub mod scatter;
pub mod scene;
pub mod utils;

pub use error::MapError;
pub use geometry::Point2;
pub use heightfield::HeightField;
pub use jungle::{FloorOptions, FloorSummary, JungleFloor};
pub use map::MapSpec;
pub use river::{RiverNetwork, Surface};
pub use scatter::{FractionSource, ModularFractions, Placement};
pub use scene::{PhysicsCollector, PhysicsSink, SceneCollector, SceneSink};
pub use utils::Preview;

// Anything that can be sampled as ground elevation at a planar point
pub trait HeightSource {
    fn height(&self, x: f64, z: f64) -> f64;
}
