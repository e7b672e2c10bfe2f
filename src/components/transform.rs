//! Transform component for entities in the scene graph.
//!
//! A [`TransformComponent`] owns one [`Transformation`] holding the entity's
//! local position, rotation and scale. Setters never assign fields directly:
//! they compute the difference between the requested and the current value and
//! feed it through `translate`, `rotate` or `zoom`. The same path serves the
//! global setters, which compute their delta against the composed
//! [`GlobalTransform2D`] of the parent.
//!
//! World-level reads that need the parent chain live in
//! [`crate::systems::hierarchy`].
//!
//! # Drawing
//!
//! [`TransformComponent::attach`] pushes the local transform onto a
//! [`MatrixStack`] and returns a [`TransformScope`] that pops it again when
//! dropped. Children attach through the scope, so nesting always balances.

use std::ops::{Deref, DerefMut};

use bevy_ecs::prelude::Component;
use glam::{Mat3, Vec2};
use log::{debug, error, warn};

use super::globaltransform2d::GlobalTransform2D;
use super::transformation::Transformation;
use crate::error::TransformError;
use crate::resources::matrixstack::MatrixStack;
use crate::resources::transformconfig::{DegeneratePolicy, TransformConfig};

/// Local transform of an entity, expressed in its parent's frame.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct TransformComponent {
    transformation: Transformation,
}

impl TransformComponent {
    /// Identity transform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style: start from a given local position, rotation and scale.
    pub fn from_parts(position: Vec2, rotation_degrees: f32, scale: Vec2) -> Self {
        let mut t = Transformation::new();
        t.translate(position);
        t.rotate(rotation_degrees);
        t.zoom(scale);
        Self { transformation: t }
    }

    /// Builder-style: return a copy translated to `(x, y)`.
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.set_position(Vec2::new(x, y));
        self
    }

    /// Builder-style: return a copy with the given rotation in degrees.
    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.set_rotation(degrees);
        self
    }

    /// Builder-style: return a copy zoomed by `(sx, sy)`.
    ///
    /// Multiplies the current scale, like [`zoom_xy`](Self::zoom_xy). Starting
    /// from [`new`](Self::new) the result has scale `(sx, sy)`.
    pub fn with_zoom(mut self, sx: f32, sy: f32) -> Self {
        self.zoom_xy(sx, sy);
        self
    }

    pub fn transformation(&self) -> &Transformation {
        &self.transformation
    }

    // ==================== LOCAL PROPERTIES ====================

    pub fn position(&self) -> Vec2 {
        self.transformation.position()
    }

    pub fn set_position(&mut self, position: Vec2) {
        let delta = position - self.position();
        self.transformation.translate(delta);
    }

    /// Local rotation in degrees.
    pub fn rotation(&self) -> f32 {
        self.transformation.rotation()
    }

    pub fn set_rotation(&mut self, degrees: f32) {
        let delta = degrees - self.rotation();
        self.transformation.rotate(delta);
    }

    pub fn scale(&self) -> Vec2 {
        self.transformation.scale()
    }

    /// Set the local scale using the default (rejecting) policy.
    ///
    /// Fails if the current scale has a near-zero component, since the
    /// multiplicative delta cannot be computed.
    pub fn set_scale(&mut self, scale: Vec2) -> Result<(), TransformError> {
        self.set_scale_with(scale, &TransformConfig::default())
    }

    pub fn set_scale_with(
        &mut self,
        scale: Vec2,
        config: &TransformConfig,
    ) -> Result<(), TransformError> {
        let target = guard_target_scale(scale, config)?;
        let factor = scale_factor(target, self.scale(), config)?;
        self.transformation.zoom(factor);
        Ok(())
    }

    /// Local matrix, `T * R * S`.
    pub fn matrix(&self) -> Mat3 {
        self.transformation.matrix()
    }

    // ==================== RELATIVE MUTATORS ====================

    pub fn translate(&mut self, delta: Vec2) {
        self.transformation.translate(delta);
    }

    pub fn translate_xy(&mut self, dx: f32, dy: f32) {
        self.transformation.translate_xy(dx, dy);
    }

    pub fn rotate(&mut self, delta_degrees: f32) {
        self.transformation.rotate(delta_degrees);
    }

    pub fn zoom(&mut self, factor: Vec2) {
        self.transformation.zoom(factor);
    }

    pub fn zoom_xy(&mut self, fx: f32, fy: f32) {
        self.transformation.zoom_xy(fx, fy);
    }

    // ==================== GLOBAL PROPERTIES ====================

    /// Compose this local transform into the parent's global frame.
    /// `None` means the entity is a root and global equals local.
    pub fn global_in(&self, parent: Option<&GlobalTransform2D>) -> GlobalTransform2D {
        match parent {
            Some(p) => p.compose(&self.transformation),
            None => GlobalTransform2D::from_local(&self.transformation),
        }
    }

    /// Move the entity so its global position becomes `position`.
    ///
    /// The world-space delta is mapped into the parent's frame through the
    /// inverse of the parent's linear part, then applied with `translate`.
    pub fn set_global_position_in(
        &mut self,
        parent: Option<&GlobalTransform2D>,
        position: Vec2,
        config: &TransformConfig,
    ) -> Result<(), TransformError> {
        let Some(p) = parent else {
            self.set_position(position);
            return Ok(());
        };
        let delta = position - self.global_in(parent).position;
        let det = p.matrix.determinant();
        if config.is_degenerate(p.scale.x)
            || config.is_degenerate(p.scale.y)
            || !det.is_finite()
            || det == 0.0
        {
            warn!("set_global_position rejected: parent frame is not invertible");
            return Err(TransformError::degenerate(
                "parent global matrix is not invertible",
            ));
        }
        let local_delta = p.matrix.inverse().transform_vector2(delta);
        self.transformation.translate(local_delta);
        Ok(())
    }

    pub fn set_global_rotation_in(
        &mut self,
        parent: Option<&GlobalTransform2D>,
        degrees: f32,
    ) {
        let delta = degrees - self.global_in(parent).rotation_degrees;
        self.transformation.rotate(delta);
    }

    pub fn set_global_scale_in(
        &mut self,
        parent: Option<&GlobalTransform2D>,
        scale: Vec2,
        config: &TransformConfig,
    ) -> Result<(), TransformError> {
        let target = guard_target_scale(scale, config)?;
        let current = self.global_in(parent).scale;
        let factor = scale_factor(target, current, config)?;
        self.transformation.zoom(factor);
        Ok(())
    }

    // ==================== MATRIX STACK ====================

    /// Push the local transform onto `stack`: save, then translate, rotate
    /// and scale in that order.
    ///
    /// The returned scope pops the stack when it goes out of scope. It
    /// dereferences to the stack so children can attach inside it.
    pub fn attach<'s, S: MatrixStack + ?Sized>(
        &self,
        stack: &'s mut S,
    ) -> TransformScope<'s, S> {
        let depth = stack.depth();
        stack.push_matrix();
        let p = self.position();
        let s = self.scale();
        stack.translate(p.x, p.y);
        stack.rotate(self.rotation());
        stack.scale(s.x, s.y);
        debug!("attached transform at stack depth {}", depth + 1);
        TransformScope { stack, depth }
    }

    /// Run `f` with this transform attached, detaching afterwards.
    pub fn with_attached<S, R>(&self, stack: &mut S, f: impl FnOnce(&mut S) -> R) -> R
    where
        S: MatrixStack + ?Sized,
    {
        let mut scope = self.attach(stack);
        f(&mut scope)
    }
}

/// Reject or clamp a requested scale according to `config`.
fn guard_target_scale(scale: Vec2, config: &TransformConfig) -> Result<Vec2, TransformError> {
    if !config.is_degenerate(scale.x) && !config.is_degenerate(scale.y) {
        return Ok(scale);
    }
    match config.degenerate_policy {
        DegeneratePolicy::Reject => {
            warn!("rejected degenerate target scale {:?}", scale);
            Err(TransformError::degenerate(format!(
                "target scale {scale:?} has a near-zero component"
            )))
        }
        DegeneratePolicy::Clamp => {
            if !scale.is_finite() {
                return Err(TransformError::degenerate(format!(
                    "target scale {scale:?} is not finite"
                )));
            }
            let clamped = Vec2::new(
                clamp_away_from_zero(scale.x, config.scale_epsilon),
                clamp_away_from_zero(scale.y, config.scale_epsilon),
            );
            warn!("clamped degenerate target scale {:?} to {:?}", scale, clamped);
            Ok(clamped)
        }
    }
}

fn clamp_away_from_zero(v: f32, epsilon: f32) -> f32 {
    if v.abs() < epsilon {
        epsilon.copysign(v)
    } else {
        v
    }
}

/// `target / current`, refusing a degenerate divisor.
fn scale_factor(
    target: Vec2,
    current: Vec2,
    config: &TransformConfig,
) -> Result<Vec2, TransformError> {
    if config.is_degenerate(current.x) || config.is_degenerate(current.y) {
        warn!("cannot rescale from degenerate scale {:?}", current);
        return Err(TransformError::degenerate(format!(
            "current scale {current:?} has a near-zero component"
        )));
    }
    Ok(target / current)
}

/// Attached transform on a matrix stack. Pops the stack when dropped.
#[must_use = "the transform is detached as soon as the scope is dropped"]
pub struct TransformScope<'s, S: MatrixStack + ?Sized> {
    stack: &'s mut S,
    /// Depth before the matching push.
    depth: usize,
}

impl<S: MatrixStack + ?Sized> TransformScope<'_, S> {
    /// Detach explicitly. Equivalent to dropping the scope.
    pub fn detach(self) {}
}

impl<S: MatrixStack + ?Sized> Deref for TransformScope<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.stack
    }
}

impl<S: MatrixStack + ?Sized> DerefMut for TransformScope<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.stack
    }
}

impl<S: MatrixStack + ?Sized> Drop for TransformScope<'_, S> {
    fn drop(&mut self) {
        let depth = self.stack.depth();
        if depth <= self.depth {
            error!(
                "detach found matrix stack at depth {}, expected more than {}",
                depth, self.depth
            );
            return;
        }
        // Unwind pushes a draw callback left behind inside this scope.
        while self.stack.depth() > self.depth + 1 {
            error!("unbalanced push inside attached transform, popping");
            self.stack.pop_matrix();
        }
        self.stack.pop_matrix();
        debug!("detached transform, stack depth {}", self.depth);
    }
}
