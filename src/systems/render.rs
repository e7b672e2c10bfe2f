//! Depth-first draw traversal over the transform hierarchy.
//!
//! Every root (an entity with a [`TransformComponent`] and no [`ChildOf`]) is
//! visited in query order. Each entity attaches its local transform on the
//! [`RenderContext`] stack, is drawn, recurses into its [`Children`] in order
//! and is detached again when its scope ends. Because children attach inside their
//! parent's scope, the stack holds the full world transform at draw time.

use bevy_ecs::hierarchy::{ChildOf, Children};
use bevy_ecs::prelude::*;
use log::{debug, error};

use crate::components::transform::TransformComponent;
use crate::error::TransformError;
use crate::resources::rendercontext::{DynMatrixStack, RenderContext};

/// Stack type seen by draw callbacks.
pub type DrawStack = DynMatrixStack;

/// Draw every entity of the hierarchy with its transform attached.
///
/// `draw` is called once per entity, after the entity's own transform has been
/// pushed and before its children are visited. Fails with `StackImbalance` if
/// a callback leaves the stack at a different depth than it found it (the
/// scope guards have already repaired the stack by then).
///
/// # Panics
///
/// Panics if the world has no [`RenderContext`] resource.
pub fn draw_hierarchy<F>(world: &mut World, mut draw: F) -> Result<(), TransformError>
where
    F: FnMut(&World, Entity, &mut DrawStack),
{
    let roots: Vec<Entity> = world
        .query_filtered::<Entity, (With<TransformComponent>, Without<ChildOf>)>()
        .iter(world)
        .collect();

    world.resource_scope(|world, mut ctx: Mut<RenderContext>| {
        let stack = ctx.stack_mut();
        let expected = stack.depth();
        let mut first_error = None;

        for root in roots {
            if let Err(e) = draw_entity(world, root, stack, &mut draw) {
                error!("draw traversal of {} failed: {}", root, e);
                first_error.get_or_insert(e);
            }
        }

        let actual = stack.depth();
        if actual != expected {
            return Err(TransformError::StackImbalance { expected, actual });
        }
        first_error.map_or(Ok(()), Err)
    })
}

fn draw_entity<F>(
    world: &World,
    entity: Entity,
    stack: &mut DrawStack,
    draw: &mut F,
) -> Result<(), TransformError>
where
    F: FnMut(&World, Entity, &mut DrawStack),
{
    let transform = world
        .get::<TransformComponent>(entity)
        .ok_or(TransformError::MissingComponent { entity })?;

    let mut scope = transform.attach(stack);
    let depth = scope.depth();
    debug!("drawing {} at stack depth {}", entity, depth);
    draw(world, entity, &mut *scope);
    if scope.depth() != depth {
        return Err(TransformError::StackImbalance {
            expected: depth,
            actual: scope.depth(),
        });
    }

    let children: Vec<Entity> = world
        .get::<Children>(entity)
        .map(|c| c.to_vec())
        .unwrap_or_default();
    for child in children {
        draw_entity(world, child, &mut *scope, draw)?;
    }
    Ok(())
}
