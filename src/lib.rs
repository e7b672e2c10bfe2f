//! 2D scene-graph transforms for `bevy_ecs` worlds.
//!
//! Each entity carries a local [`TransformComponent`]; world-space values are
//! composed on demand by walking the `ChildOf` chain. Drawing code attaches a
//! transform to a [`MatrixStack`] through a scope guard so pushes and pops
//! always balance.
//!
//! [`TransformComponent`]: components::transform::TransformComponent
//! [`MatrixStack`]: resources::matrixstack::MatrixStack

pub mod components;
pub mod error;
pub mod resources;
pub mod systems;
