//! Local affine transform primitive.
//!
//! A [`Transformation`] holds a position, a rotation in degrees and a scale.
//! It is only ever changed through relative operations ([`translate`],
//! [`rotate`], [`zoom`]); callers that want to assign a value compute the
//! delta themselves. The composed matrix is derived on every read.
//!
//! [`translate`]: Transformation::translate
//! [`rotate`]: Transformation::rotate
//! [`zoom`]: Transformation::zoom

use glam::{Mat3, Vec2};
use serde::{Deserialize, Serialize};

/// Position, rotation (degrees) and scale relative to a parent frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transformation {
    position: Vec2,
    rotation_degrees: f32,
    scale: Vec2,
}

impl Default for Transformation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transformation {
    pub const IDENTITY: Self = Self {
        position: Vec2::ZERO,
        rotation_degrees: 0.0,
        scale: Vec2::ONE,
    };

    pub fn new() -> Self {
        Self::IDENTITY
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Rotation in degrees.
    pub fn rotation(&self) -> f32 {
        self.rotation_degrees
    }

    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    /// Add `delta` to the position.
    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    pub fn translate_xy(&mut self, dx: f32, dy: f32) {
        self.translate(Vec2::new(dx, dy));
    }

    /// Add `delta_degrees` to the rotation. No wrapping is applied.
    pub fn rotate(&mut self, delta_degrees: f32) {
        self.rotation_degrees += delta_degrees;
    }

    /// Multiply the scale component-wise by `factor`.
    ///
    /// A zero component is accepted and leaves the matrix non-invertible.
    pub fn zoom(&mut self, factor: Vec2) {
        self.scale *= factor;
    }

    pub fn zoom_xy(&mut self, fx: f32, fy: f32) {
        self.zoom(Vec2::new(fx, fy));
    }

    /// `T(position) * R(rotation) * S(scale)`, column-vector convention.
    ///
    /// This is the matrix a post-multiplying stack ends up with after
    /// `translate`, `rotate`, `scale` in that order.
    pub fn matrix(&self) -> Mat3 {
        Mat3::from_scale_angle_translation(
            self.scale,
            self.rotation_degrees.to_radians(),
            self.position,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn vec_approx_eq(a: Vec2, b: Vec2) -> bool {
        approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
    }

    #[test]
    fn test_default_is_identity() {
        let t = Transformation::default();
        assert_eq!(t.position(), Vec2::ZERO);
        assert_eq!(t.rotation(), 0.0);
        assert_eq!(t.scale(), Vec2::ONE);
        assert_eq!(t.matrix(), Mat3::IDENTITY);
    }

    #[test]
    fn test_translate_accumulates() {
        let mut t = Transformation::new();
        t.translate(Vec2::new(3.0, 4.0));
        t.translate_xy(-1.0, 1.0);
        assert_eq!(t.position(), Vec2::new(2.0, 5.0));
    }

    #[test]
    fn test_rotate_does_not_wrap() {
        let mut t = Transformation::new();
        t.rotate(300.0);
        t.rotate(120.0);
        assert!(approx_eq(t.rotation(), 420.0));
    }

    #[test]
    fn test_zoom_is_multiplicative() {
        let mut t = Transformation::new();
        t.zoom(Vec2::new(2.0, 3.0));
        t.zoom_xy(0.5, 2.0);
        assert_eq!(t.scale(), Vec2::new(1.0, 6.0));
    }

    #[test]
    fn test_zoom_by_zero_is_accepted() {
        let mut t = Transformation::new();
        t.zoom(Vec2::new(0.0, 1.0));
        assert_eq!(t.scale(), Vec2::new(0.0, 1.0));
        assert!(approx_eq(t.matrix().determinant(), 0.0));
    }

    #[test]
    fn test_matrix_applies_scale_then_rotation_then_translation() {
        let mut t = Transformation::new();
        t.translate_xy(10.0, 0.0);
        t.rotate(90.0);
        t.zoom_xy(2.0, 2.0);
        // (1, 0) scaled => (2, 0), rotated 90 => (0, 2), translated => (10, 2)
        let p = t.matrix().transform_point2(Vec2::new(1.0, 0.0));
        assert!(vec_approx_eq(p, Vec2::new(10.0, 2.0)), "got {p:?}");
    }

    #[test]
    fn test_matrix_tracks_every_mutation() {
        let mut t = Transformation::new();
        let before = t.matrix();
        t.translate_xy(1.0, 0.0);
        assert_ne!(before, t.matrix());
    }
}
