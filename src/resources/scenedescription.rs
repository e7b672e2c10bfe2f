//! JSON scene descriptions.
//!
//! A scene is a flat list of named nodes, each optionally naming a parent:
//!
//! ```json
//! {
//!   "nodes": [
//!     { "name": "ship", "position": [10.0, 0.0] },
//!     { "name": "turret", "parent": "ship", "position": [5.0, 0.0], "rotation": 90.0 }
//!   ]
//! }
//! ```
//!
//! Nodes may be listed before their parents. Missing fields default to the
//! identity transform.

use std::path::Path;

use bevy_ecs::hierarchy::ChildOf;
use bevy_ecs::prelude::*;
use glam::Vec2;
use log::info;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::components::nodename::NodeName;
use crate::components::transform::TransformComponent;
use crate::error::TransformError;

fn default_scale() -> Vec2 {
    Vec2::ONE
}

/// One node of a scene description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeDescription {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub position: Vec2,
    /// Degrees.
    #[serde(default)]
    pub rotation: f32,
    #[serde(default = "default_scale")]
    pub scale: Vec2,
}

impl NodeDescription {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            position: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = Vec2::new(x, y);
        self
    }

    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn with_scale(mut self, sx: f32, sy: f32) -> Self {
        self.scale = Vec2::new(sx, sy);
        self
    }

    fn transform(&self) -> TransformComponent {
        TransformComponent::from_parts(self.position, self.rotation, self.scale)
    }
}

/// A whole scene, ready to be spawned into a [`World`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    pub nodes: Vec<NodeDescription>,
}

/// Name to entity map returned by [`SceneDescription::spawn`].
pub type SpawnedScene = FxHashMap<String, Entity>;

impl SceneDescription {
    pub fn from_json(text: &str) -> Result<Self, TransformError> {
        serde_json::from_str(text).map_err(|e| TransformError::Scene(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TransformError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            TransformError::Scene(format!("failed to read {}: {}", path.display(), e))
        })?;
        let scene = Self::from_json(&text)?;
        info!("Loaded scene {} with {} nodes", path.display(), scene.nodes.len());
        Ok(scene)
    }

    pub fn to_json(&self) -> Result<String, TransformError> {
        serde_json::to_string_pretty(self).map_err(|e| TransformError::Scene(e.to_string()))
    }

    /// Check names are unique, parents exist and parent links do not loop.
    pub fn validate(&self) -> Result<(), TransformError> {
        let mut parents: FxHashMap<&str, Option<&str>> = FxHashMap::default();
        for node in &self.nodes {
            if parents
                .insert(node.name.as_str(), node.parent.as_deref())
                .is_some()
            {
                return Err(TransformError::Scene(format!(
                    "duplicate node name '{}'",
                    node.name
                )));
            }
        }

        for node in &self.nodes {
            let mut steps = 0;
            let mut current = node.parent.as_deref();
            while let Some(name) = current {
                let Some(next) = parents.get(name) else {
                    return Err(TransformError::UnknownEntity {
                        name: name.to_string(),
                    });
                };
                steps += 1;
                if steps > self.nodes.len() {
                    return Err(TransformError::Scene(format!(
                        "parent chain of '{}' contains a cycle",
                        node.name
                    )));
                }
                current = *next;
            }
        }
        Ok(())
    }

    /// Spawn every node with a [`TransformComponent`] and a [`NodeName`],
    /// then wire up [`ChildOf`] links.
    pub fn spawn(&self, world: &mut World) -> Result<SpawnedScene, TransformError> {
        self.validate()?;

        let mut spawned = SpawnedScene::default();
        for node in &self.nodes {
            let entity = world
                .spawn((node.transform(), NodeName::new(node.name.clone())))
                .id();
            spawned.insert(node.name.clone(), entity);
        }

        for node in &self.nodes {
            if let Some(parent) = node.parent.as_deref() {
                let child = spawned[node.name.as_str()];
                let parent = spawned[parent];
                world.entity_mut(child).insert(ChildOf(parent));
            }
        }
        world.flush();

        info!("Spawned {} scene nodes", spawned.len());
        Ok(spawned)
    }
}
