//! Matrix-stack collaborators used by the draw traversal.
//!
//! [`MatrixStack`] is the narrow contract the transform component needs from a
//! rendering context: save/restore of the current transform plus in-place
//! translate, rotate and scale. Two backends are provided:
//!
//! - [`SoftwareMatrixStack`] – a `glam` implementation for headless runs and
//!   tests. It can record every call for inspection.
//! - [`RlglMatrixStack`] – forwards to raylib's rlgl (feature `raylib`).

use glam::{Mat3, Vec2};
use log::error;

/// Stack-based 2D affine accumulation, graphics-API style.
///
/// Every transform call post-multiplies the current matrix, so
/// `translate; rotate; scale` yields `T * R * S`.
pub trait MatrixStack {
    /// Save the current transform.
    fn push_matrix(&mut self);
    /// Restore the most recently saved transform.
    fn pop_matrix(&mut self);
    fn translate(&mut self, x: f32, y: f32);
    /// Rotate by `degrees` around the current origin.
    fn rotate(&mut self, degrees: f32);
    fn scale(&mut self, x: f32, y: f32);
    /// Number of saved transforms currently on the stack.
    fn depth(&self) -> usize;
}

/// A single recorded call on a [`SoftwareMatrixStack`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StackOp {
    Push,
    Pop,
    Translate(f32, f32),
    Rotate(f32),
    Scale(f32, f32),
}

/// CPU matrix stack backed by `glam::Mat3`.
#[derive(Debug, Clone)]
pub struct SoftwareMatrixStack {
    current: Mat3,
    saved: Vec<Mat3>,
    recording: Option<Vec<StackOp>>,
}

impl Default for SoftwareMatrixStack {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftwareMatrixStack {
    pub fn new() -> Self {
        Self {
            current: Mat3::IDENTITY,
            saved: Vec::new(),
            recording: None,
        }
    }

    /// Builder-style: record every call made on this stack.
    pub fn with_recording(mut self) -> Self {
        self.recording = Some(Vec::new());
        self
    }

    /// The transform currently in effect.
    pub fn current(&self) -> Mat3 {
        self.current
    }

    /// Map a point through the current transform.
    pub fn transform_point(&self, point: Vec2) -> Vec2 {
        self.current.transform_point2(point)
    }

    /// Recorded calls, empty when recording is off.
    pub fn ops(&self) -> &[StackOp] {
        self.recording.as_deref().unwrap_or(&[])
    }

    /// Drain the recorded calls, keeping recording enabled.
    pub fn take_ops(&mut self) -> Vec<StackOp> {
        match self.recording.as_mut() {
            Some(ops) => std::mem::take(ops),
            None => Vec::new(),
        }
    }

    fn record(&mut self, op: StackOp) {
        if let Some(ops) = self.recording.as_mut() {
            ops.push(op);
        }
    }
}

impl MatrixStack for SoftwareMatrixStack {
    fn push_matrix(&mut self) {
        self.record(StackOp::Push);
        self.saved.push(self.current);
    }

    fn pop_matrix(&mut self) {
        self.record(StackOp::Pop);
        match self.saved.pop() {
            Some(m) => self.current = m,
            // Same as rlgl: popping an empty stack leaves the transform alone.
            None => error!("pop_matrix called on an empty matrix stack"),
        }
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.record(StackOp::Translate(x, y));
        self.current *= Mat3::from_translation(Vec2::new(x, y));
    }

    fn rotate(&mut self, degrees: f32) {
        self.record(StackOp::Rotate(degrees));
        self.current *= Mat3::from_angle(degrees.to_radians());
    }

    fn scale(&mut self, x: f32, y: f32) {
        self.record(StackOp::Scale(x, y));
        self.current *= Mat3::from_scale(Vec2::new(x, y));
    }

    fn depth(&self) -> usize {
        self.saved.len()
    }
}

/// raylib rlgl matrix stack.
///
/// rlgl keeps the stack itself; the depth is tracked here because rlgl does
/// not expose it. Only use inside a raylib drawing scope on the main thread.
#[cfg(feature = "raylib")]
#[derive(Debug, Default)]
pub struct RlglMatrixStack {
    depth: usize,
}

#[cfg(feature = "raylib")]
impl RlglMatrixStack {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(feature = "raylib")]
impl MatrixStack for RlglMatrixStack {
    fn push_matrix(&mut self) {
        unsafe { raylib::ffi::rlPushMatrix() };
        self.depth += 1;
    }

    fn pop_matrix(&mut self) {
        if self.depth == 0 {
            error!("pop_matrix called on an empty rlgl matrix stack");
            return;
        }
        unsafe { raylib::ffi::rlPopMatrix() };
        self.depth -= 1;
    }

    fn translate(&mut self, x: f32, y: f32) {
        unsafe { raylib::ffi::rlTranslatef(x, y, 0.0) };
    }

    fn rotate(&mut self, degrees: f32) {
        unsafe { raylib::ffi::rlRotatef(degrees, 0.0, 0.0, 1.0) };
    }

    fn scale(&mut self, x: f32, y: f32) {
        unsafe { raylib::ffi::rlScalef(x, y, 1.0) };
    }

    fn depth(&self) -> usize {
        self.depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn vec_approx_eq(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < EPSILON && (a.y - b.y).abs() < EPSILON
    }

    #[test]
    fn test_new_stack_is_identity_and_empty() {
        let stack = SoftwareMatrixStack::new();
        assert_eq!(stack.current(), Mat3::IDENTITY);
        assert_eq!(stack.depth(), 0);
        assert!(stack.ops().is_empty());
    }

    #[test]
    fn test_push_pop_restores_current() {
        let mut stack = SoftwareMatrixStack::new();
        stack.translate(5.0, 5.0);
        let before = stack.current();
        stack.push_matrix();
        stack.rotate(45.0);
        stack.scale(3.0, 3.0);
        assert_eq!(stack.depth(), 1);
        stack.pop_matrix();
        assert_eq!(stack.depth(), 0);
        assert_eq!(stack.current(), before);
    }

    #[test]
    fn test_operations_post_multiply() {
        let mut stack = SoftwareMatrixStack::new();
        stack.translate(10.0, 0.0);
        stack.rotate(90.0);
        stack.scale(2.0, 2.0);
        let p = stack.transform_point(Vec2::new(1.0, 0.0));
        assert!(vec_approx_eq(p, Vec2::new(10.0, 2.0)), "got {p:?}");
    }

    #[test]
    fn test_pop_on_empty_stack_keeps_transform() {
        let mut stack = SoftwareMatrixStack::new();
        stack.translate(1.0, 2.0);
        let before = stack.current();
        stack.pop_matrix();
        assert_eq!(stack.current(), before);
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_recording_captures_calls_in_order() {
        let mut stack = SoftwareMatrixStack::new().with_recording();
        stack.push_matrix();
        stack.translate(1.0, 2.0);
        stack.rotate(30.0);
        stack.scale(2.0, 3.0);
        stack.pop_matrix();
        assert_eq!(
            stack.take_ops(),
            vec![
                StackOp::Push,
                StackOp::Translate(1.0, 2.0),
                StackOp::Rotate(30.0),
                StackOp::Scale(2.0, 3.0),
                StackOp::Pop,
            ]
        );
        assert!(stack.ops().is_empty());
    }
}
