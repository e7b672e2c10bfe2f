//! Scene-graph transform inspector.
//!
//! Loads a JSON scene (or a built-in demo scene), spawns it into a
//! `bevy_ecs` world and prints every node's global transform. With `--trace`
//! it also runs one draw traversal over a software matrix stack and prints
//! each draw call with the stack depth it ran at.
//!
//! # Running
//!
//! ```sh
//! cargo run -- --scene scene.json --config transform.ini --trace
//! ```

use std::path::PathBuf;

use bevy_ecs::prelude::*;
use clap::Parser;
use log::{info, warn};
use rustc_hash::FxHashMap;

use scenegraph2d::components::globaltransform2d::GlobalTransform2D;
use scenegraph2d::components::nodename::NodeName;
use scenegraph2d::resources::matrixstack::SoftwareMatrixStack;
use scenegraph2d::resources::rendercontext::RenderContext;
use scenegraph2d::resources::scenedescription::{NodeDescription, SceneDescription};
use scenegraph2d::resources::transformconfig::TransformConfig;
use scenegraph2d::systems::hierarchy::global_transform;
use scenegraph2d::systems::render::draw_hierarchy;

/// 2D scene-graph transform inspector
#[derive(Parser)]
#[command(version, about = "Print the world-space transforms of a 2D scene graph")]
struct Cli {
    /// JSON scene description. A small demo scene is used when omitted.
    #[arg(long, value_name = "PATH")]
    scene: Option<PathBuf>,

    /// INI file with a [transform] section.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print global transforms as JSON.
    #[arg(long)]
    json: bool,

    /// Run a draw traversal and print every draw call.
    #[arg(long)]
    trace: bool,
}

fn demo_scene() -> SceneDescription {
    SceneDescription {
        nodes: vec![
            NodeDescription::new("ship").with_position(10.0, 0.0).with_rotation(90.0),
            NodeDescription::new("turret").with_parent("ship").with_position(5.0, 0.0),
            NodeDescription::new("barrel")
                .with_parent("turret")
                .with_position(2.0, 0.0)
                .with_scale(0.5, 0.5),
            NodeDescription::new("buoy").with_position(-4.0, 3.0),
        ],
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match cli.config {
        Some(path) => {
            let mut config = TransformConfig::with_path(path);
            if let Err(e) = config.load_from_file() {
                warn!("{e}, using defaults");
            }
            config
        }
        None => TransformConfig::new(),
    };

    let scene = match cli.scene {
        Some(path) => match SceneDescription::load(&path) {
            Ok(scene) => scene,
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        },
        None => {
            info!("No scene given, using the demo scene");
            demo_scene()
        }
    };

    let mut world = World::new();
    world.insert_resource(config);
    world.insert_resource(RenderContext::new(SoftwareMatrixStack::new()));

    let spawned = match scene.spawn(&mut world) {
        Ok(spawned) => spawned,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let mut globals: Vec<(String, GlobalTransform2D)> = Vec::with_capacity(scene.nodes.len());
    for node in &scene.nodes {
        let entity = spawned[node.name.as_str()];
        match global_transform(&world, entity) {
            Ok(gt) => globals.push((node.name.clone(), gt)),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
    }

    if cli.json {
        let map: FxHashMap<&str, &GlobalTransform2D> =
            globals.iter().map(|(name, gt)| (name.as_str(), gt)).collect();
        match serde_json::to_string_pretty(&map) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
    } else {
        for (name, gt) in &globals {
            println!(
                "{:<12} position=({:.3}, {:.3}) rotation={:.3} scale=({:.3}, {:.3})",
                name, gt.position.x, gt.position.y, gt.rotation_degrees, gt.scale.x, gt.scale.y
            );
        }
    }

    if cli.trace {
        let result = draw_hierarchy(&mut world, |world, entity, stack| {
            let name = world
                .get::<NodeName>(entity)
                .map(|n| n.as_str().to_string())
                .unwrap_or_else(|| entity.to_string());
            println!("{}draw {} (depth {})", "  ".repeat(stack.depth()), name, stack.depth());
        });
        if let Err(e) = result {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
