//! Fleet scene demo
//!
//! Builds a small fleet hierarchy, animates it for a few frames, saves the
//! fleet as a prefab and as a scene file, then loads both back and prints
//! the resulting trees.
//!
//! Usage: `scene_demo [config.toml|config.ron]`

use std::path::Path;

use rand::Rng;
use scene_engine::config::ConfigError;
use scene_engine::foundation::logging;
use scene_engine::foundation::math::constants::DEG_TO_RAD;
use scene_engine::prelude::*;

/// Demo errors
#[derive(thiserror::Error, Debug)]
enum DemoError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

const ESCORT_COUNT: usize = 4;
const FRAMES: usize = 30;

struct FleetDemo {
    scene: Scene,
    mothership: EntityKey,
    escorts: Vec<EntityKey>,
}

impl FleetDemo {
    fn new(config: SceneConfig) -> Self {
        let mut scene = Scene::with_config(config);
        let mut rng = rand::thread_rng();

        let mothership = scene.create_entity_named("Mothership");
        if let Some(entity) = scene.get_mut(mothership) {
            let light = entity.add_component::<Light>();
            light.light_type = LightType::Point;
            light.range = 40.0;
            entity.add_component::<RigidBody>().mass = 5000.0;
            entity.add_component::<Collider>();
        }

        let bridge = scene.create_entity_named("Bridge");
        scene.set_parent(bridge, Some(mothership));
        scene.set_position(bridge, Vec3::new(0.0, 3.0, -2.0));
        if let Some(entity) = scene.get_mut(bridge) {
            entity.add_component::<Camera>();
            entity.add_component::<AudioListener>();
        }

        let mut escorts = Vec::with_capacity(ESCORT_COUNT);
        for i in 0..ESCORT_COUNT {
            let escort = scene.create_entity_named(format!("Escort {i}"));
            scene.set_parent(escort, Some(mothership));
            scene.set_position(
                escort,
                Vec3::new(
                    rng.gen_range(-20.0..20.0),
                    rng.gen_range(-5.0..5.0),
                    rng.gen_range(-20.0..20.0),
                ),
            );
            if let Some(entity) = scene.get_mut(escort) {
                entity.add_component::<MeshFilter>().set_mesh("models/escort.obj");
                entity.add_component::<MeshRenderer>();
                entity.add_component::<Script>().set_script_path("scripts/escort.rs");
            }
            escorts.push(escort);
        }

        // The first escort carries a drone, which is then handed to the bridge
        let drone = scene.create_entity_named("Drone");
        scene.set_parent(drone, Some(escorts[0]));
        scene.set_parent(drone, Some(bridge));

        log::info!("Built fleet with {} entities", scene.len());
        Self {
            scene,
            mothership,
            escorts,
        }
    }

    fn run(&mut self) {
        self.scene.start();

        let spin = Quat::from_axis_angle(&Vec3::y_axis(), 3.0 * DEG_TO_RAD);
        for frame in 0..FRAMES {
            if let Some(transform) = self.scene.transform_mut(self.mothership) {
                transform.rotate(spin);
                transform.translate(Vec3::new(0.0, 0.0, -0.5));
            }
            self.scene.update();

            if frame % 10 == 0 {
                log::debug!("Frame {frame}");
            }
        }

        if let Some(lead) = self.escorts.first().copied() {
            if let Some(position) = self.scene.world_position(lead) {
                log::info!("Lead escort ended at {:?}", position);
            }
        }
    }

    fn save_and_reload(&mut self, dir: &Path) -> Result<(), DemoError> {
        std::fs::create_dir_all(dir)?;

        let prefab = self.scene.save_prefab(self.mothership, dir.join("fleet"))?;
        let level = self.scene.save_scene(dir.join("level"))?;

        let copy = self.scene.load_prefab(&prefab)?;
        self.scene.set_position(copy, Vec3::new(100.0, 0.0, 0.0));
        self.scene.update();
        println!("After instantiating {}:", prefab.display());
        print_tree(&mut self.scene);

        let mut reloaded = Scene::with_config(self.scene.config().clone());
        reloaded.load_scene(&level)?;
        reloaded.update();
        println!("Reloaded {}:", level.display());
        print_tree(&mut reloaded);

        Ok(())
    }
}

fn print_tree(scene: &mut Scene) {
    for root in scene.roots() {
        print_node(scene, root, 0);
    }
}

fn print_node(scene: &mut Scene, key: EntityKey, depth: usize) {
    let position = scene.world_position(key).unwrap_or_else(Vec3::zeros);
    if let Some(entity) = scene.get(key) {
        let components: Vec<_> = entity.components().map(|c| c.component_type().as_str()).collect();
        println!(
            "{:indent$}{} ({:.1}, {:.1}, {:.1}) [{}]",
            "",
            entity.name(),
            position.x,
            position.y,
            position.z,
            components.join(", "),
            indent = depth * 2
        );
    }

    for child in scene.children_of(key).to_vec() {
        print_node(scene, child, depth + 1);
    }
}

fn load_config() -> Result<SceneConfig, DemoError> {
    match std::env::args().nth(1) {
        Some(path) => Ok(SceneConfig::load_validated(&path)?),
        None => Ok(SceneConfig::default()),
    }
}

fn main() {
    let config = match load_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };
    logging::init_with_filter(&config.log_filter);

    log::info!("Starting fleet scene demo");
    let mut demo = FleetDemo::new(config);
    demo.run();

    let dir = std::env::temp_dir().join("scene_demo");
    if let Err(err) = demo.save_and_reload(&dir) {
        log::error!("{err}");
        std::process::exit(1);
    }
}
