//! World-space transform of an entity in a hierarchy.
//!
//! A [`GlobalTransform2D`] is the composition of a
//! [`TransformComponent`](super::transform::TransformComponent) with the
//! global transform of its parent. Live reads through
//! [`crate::systems::hierarchy`] build it on demand. The
//! [`propagate_transforms`](crate::systems::propagate_transforms::propagate_transforms)
//! system can also store it on entities as a per-frame snapshot.

use bevy_ecs::prelude::*;
use glam::{Mat3, Vec2};
use serde::{Deserialize, Serialize};

use super::transformation::Transformation;

/// World-space transform for hierarchical entities.
///
/// For root entities (no parent) it mirrors the local transform.
/// For child entities it contains the composed result of the full ancestor chain.
#[derive(Component, Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlobalTransform2D {
    /// World-space position.
    pub position: Vec2,
    /// World-space rotation in degrees.
    pub rotation_degrees: f32,
    /// World-space scale.
    pub scale: Vec2,
    /// World-space affine matrix.
    pub matrix: Mat3,
}

impl Default for GlobalTransform2D {
    fn default() -> Self {
        Self::from_local(&Transformation::IDENTITY)
    }
}

impl GlobalTransform2D {
    /// Global transform of a root entity: identical to its local transform.
    pub fn from_local(local: &Transformation) -> Self {
        Self {
            position: local.position(),
            rotation_degrees: local.rotation(),
            scale: local.scale(),
            matrix: local.matrix(),
        }
    }

    /// Compose a child's local transform into this (parent) frame.
    ///
    /// Position goes through the full parent matrix, rotation adds, scale
    /// multiplies component-wise and matrices compose parent-then-local.
    pub fn compose(&self, local: &Transformation) -> Self {
        Self {
            position: self.matrix.transform_point2(local.position()),
            rotation_degrees: self.rotation_degrees + local.rotation(),
            scale: self.scale * local.scale(),
            matrix: self.matrix * local.matrix(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_default_values() {
        let gt = GlobalTransform2D::default();
        assert!(approx_eq(gt.position.x, 0.0));
        assert!(approx_eq(gt.position.y, 0.0));
        assert!(approx_eq(gt.rotation_degrees, 0.0));
        assert!(approx_eq(gt.scale.x, 1.0));
        assert!(approx_eq(gt.scale.y, 1.0));
        assert_eq!(gt.matrix, Mat3::IDENTITY);
    }

    #[test]
    fn test_compose_rotated_and_scaled_parent() {
        let mut parent = Transformation::new();
        parent.rotate(90.0);
        parent.zoom_xy(2.0, 1.0);
        let parent_gt = GlobalTransform2D::from_local(&parent);

        let mut child = Transformation::new();
        child.translate_xy(10.0, 0.0);
        let gt = parent_gt.compose(&child);

        // Offset (10, 0) scaled by (2, 1) => (20, 0), rotated 90deg => (0, 20)
        assert!(approx_eq(gt.position.x, 0.0), "got {}", gt.position.x);
        assert!(approx_eq(gt.position.y, 20.0), "got {}", gt.position.y);
        assert!(approx_eq(gt.rotation_degrees, 90.0));
        assert!(approx_eq(gt.scale.x, 2.0));
        assert!(approx_eq(gt.scale.y, 1.0));
    }

    #[test]
    fn test_compose_position_matches_matrix_translation() {
        let mut parent = Transformation::new();
        parent.translate_xy(3.0, -2.0);
        parent.rotate(30.0);
        let mut child = Transformation::new();
        child.translate_xy(4.0, 1.0);
        child.rotate(15.0);

        let gt = GlobalTransform2D::from_local(&parent).compose(&child);
        assert!(approx_eq(gt.position.x, gt.matrix.z_axis.x));
        assert!(approx_eq(gt.position.y, gt.matrix.z_axis.y));
    }
}
