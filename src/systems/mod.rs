//! Functions and ECS systems operating on the transform hierarchy.
//!
//! Submodules overview:
//! - [`hierarchy`] – live global reads/writes and reparenting
//! - [`propagate_transforms`] – opt-in per-frame snapshot of global transforms
//! - [`render`] – depth-first draw traversal with scoped transforms

pub mod hierarchy;
pub mod propagate_transforms;
pub mod render;
