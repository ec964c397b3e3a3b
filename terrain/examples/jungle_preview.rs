use std::path::Path;

use terrain::utils::Preview;
use terrain::{FloorOptions, JungleFloor, MapSpec, PhysicsCollector, SceneCollector};

fn main() {
    // Build the built-in jungle map
    let spec = MapSpec::jungle();
    let mut scene = SceneCollector::default();
    let mut physics = PhysicsCollector::default();
    let floor = JungleFloor::build(&spec, FloorOptions::default(), &mut scene, &mut physics)
        .expect("built-in map is valid");

    // Hillshaded top-down view with rocks and trees dotted on top
    let img = Preview::default().render(floor.height_field(), floor.rocks(), floor.trees());

    let path = Path::new("jungle_preview.png");
    img.save(path).unwrap();
    println!(
        "Saved {:?}: {} rocks, {} trees, {} meshes, {} bodies",
        path,
        floor.rocks().len(),
        floor.trees().len(),
        scene.meshes.len(),
        physics.bodies.len()
    );
}
