//! Human-readable node name.
//!
//! Scene descriptions refer to nodes by name; the loader attaches a
//! [`NodeName`] so tools and logs can print something better than an entity id.

use bevy_ecs::prelude::Component;

#[derive(Component, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeName(pub String);

impl NodeName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
