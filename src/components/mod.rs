//! ECS components and the transform primitive they own.
//!
//! Submodules overview:
//! - [`transformation`] – local position/rotation/scale with relative mutators
//! - [`transform`] – the per-entity transform component and its stack scope
//! - [`globaltransform2d`] – composed world-space transform
//! - [`nodename`] – display name for scene nodes

pub mod globaltransform2d;
pub mod nodename;
pub mod transform;
pub mod transformation;
