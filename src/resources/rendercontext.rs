//! Rendering-context resource.
//!
//! Holds the matrix stack that transforms are attached to while drawing.
//! Systems resolve it from the world by type; the draw traversal takes it out
//! of the world for the whole pass so nothing else can touch the stack
//! mid-frame.

use bevy_ecs::prelude::Resource;

use super::matrixstack::MatrixStack;

/// Boxed stack type held by the [`RenderContext`].
pub type DynMatrixStack = dyn MatrixStack + Send + Sync;

/// ECS resource owning the active matrix stack.
#[derive(Resource)]
pub struct RenderContext {
    stack: Box<DynMatrixStack>,
}

impl RenderContext {
    pub fn new(stack: impl MatrixStack + Send + Sync + 'static) -> Self {
        Self {
            stack: Box::new(stack),
        }
    }

    pub fn stack(&self) -> &DynMatrixStack {
        self.stack.as_ref()
    }

    pub fn stack_mut(&mut self) -> &mut DynMatrixStack {
        self.stack.as_mut()
    }

    /// Replace the stack, returning the previous one.
    pub fn replace(
        &mut self,
        stack: impl MatrixStack + Send + Sync + 'static,
    ) -> Box<DynMatrixStack> {
        std::mem::replace(&mut self.stack, Box::new(stack))
    }
}
