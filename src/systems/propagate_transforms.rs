//! Snapshot propagation of world-space transforms.
//!
//! Live reads in [`crate::systems::hierarchy`] are the source of truth. This
//! system is the opt-in cached variant: it stores a [`GlobalTransform2D`] on
//! every entity with a [`TransformComponent`], composed from the same algebra,
//! so systems that only need a per-frame snapshot (collision, culling) can read
//! a component instead of walking the hierarchy.
//!
//! # Schedule position
//!
//! Run **after** every system that mutates transforms or reparents entities
//! and **before** the systems reading the snapshot. Any mutation after it
//! leaves the snapshot stale until the next run.

use bevy_ecs::hierarchy::{ChildOf, Children};
use bevy_ecs::prelude::*;

use crate::components::globaltransform2d::GlobalTransform2D;
use crate::components::transform::TransformComponent;

/// Propagate transforms from roots down through the hierarchy.
///
/// For each root entity (has [`TransformComponent`] but no [`ChildOf`]):
/// 1. Compute its [`GlobalTransform2D`] from the local transform.
/// 2. Recursively traverse children, composing transforms at each level.
///
/// Entities that already have a `GlobalTransform2D` are updated in place.
/// Entities missing the component get it inserted via deferred [`Commands`].
/// Children without a `TransformComponent` are skipped along with their
/// subtree.
pub fn propagate_transforms(
    roots: Query<(Entity, &TransformComponent, Option<&Children>), Without<ChildOf>>,
    children_query: Query<(&TransformComponent, Option<&Children>), With<ChildOf>>,
    mut globals: Query<&mut GlobalTransform2D>,
    mut commands: Commands,
) {
    for (root_entity, transform, children) in roots.iter() {
        let root_gt = transform.global_in(None);
        store(root_entity, root_gt, &mut globals, &mut commands);

        if let Some(children) = children {
            propagate_children(
                &root_gt,
                children,
                &children_query,
                &mut globals,
                &mut commands,
            );
        }
    }
}

fn store(
    entity: Entity,
    gt: GlobalTransform2D,
    globals: &mut Query<&mut GlobalTransform2D>,
    commands: &mut Commands,
) {
    if let Ok(mut existing) = globals.get_mut(entity) {
        *existing = gt;
    } else {
        commands.entity(entity).insert(gt);
    }
}

fn propagate_children(
    parent_gt: &GlobalTransform2D,
    children: &Children,
    children_query: &Query<(&TransformComponent, Option<&Children>), With<ChildOf>>,
    globals: &mut Query<&mut GlobalTransform2D>,
    commands: &mut Commands,
) {
    for child_entity in children.iter() {
        let Ok((transform, maybe_grandchildren)) = children_query.get(child_entity) else {
            continue;
        };

        let child_gt = transform.global_in(Some(parent_gt));
        store(child_entity, child_gt, globals, commands);

        if let Some(grandchildren) = maybe_grandchildren {
            propagate_children(&child_gt, grandchildren, children_query, globals, commands);
        }
    }
}
