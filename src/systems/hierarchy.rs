//! Live global-transform reads and writes over the entity hierarchy.
//!
//! Entities live in the `bevy_ecs` [`World`] arena and point at their parent
//! with [`ChildOf`]. Nothing here is cached: every global read walks the
//! current ancestor chain, so reparenting or editing an ancestor is visible on
//! the next read without any invalidation step.
//!
//! Reads are generic over [`TransformLookup`] so the same code runs against a
//! `&World` or against a [`TransformQuery`] inside a system. Writes take
//! `&mut World`.

use bevy_ecs::hierarchy::ChildOf;
use bevy_ecs::prelude::*;
use glam::{Mat3, Vec2};
use log::debug;
use smallvec::SmallVec;

use crate::components::globaltransform2d::GlobalTransform2D;
use crate::components::transform::TransformComponent;
use crate::error::TransformError;
use crate::resources::transformconfig::TransformConfig;

/// Read access to transforms and parent links.
pub trait TransformLookup {
    fn transform(&self, entity: Entity) -> Option<&TransformComponent>;
    fn parent(&self, entity: Entity) -> Option<Entity>;
}

impl TransformLookup for World {
    fn transform(&self, entity: Entity) -> Option<&TransformComponent> {
        self.get::<TransformComponent>(entity)
    }

    fn parent(&self, entity: Entity) -> Option<Entity> {
        self.get::<ChildOf>(entity).map(|c| c.parent())
    }
}

/// Query shape for reading global transforms from inside a system.
pub type TransformQuery<'w, 's> =
    Query<'w, 's, (&'static TransformComponent, Option<&'static ChildOf>)>;

impl TransformLookup for TransformQuery<'_, '_> {
    fn transform(&self, entity: Entity) -> Option<&TransformComponent> {
        self.get(entity).ok().map(|(t, _)| t)
    }

    fn parent(&self, entity: Entity) -> Option<Entity> {
        self.get(entity)
            .ok()
            .and_then(|(_, child_of)| child_of.map(|c| c.parent()))
    }
}

/// `entity` followed by its ancestors, nearest first.
fn lineage<L: TransformLookup + ?Sized>(
    lookup: &L,
    entity: Entity,
) -> Result<SmallVec<[Entity; 8]>, TransformError> {
    let mut chain: SmallVec<[Entity; 8]> = SmallVec::new();
    let mut current = Some(entity);
    while let Some(e) = current {
        if chain.contains(&e) {
            return Err(TransformError::HierarchyCycle { entity: e });
        }
        chain.push(e);
        current = lookup.parent(e);
    }
    Ok(chain)
}

/// Composed world-space transform of `entity`. O(depth).
pub fn global_transform<L: TransformLookup + ?Sized>(
    lookup: &L,
    entity: Entity,
) -> Result<GlobalTransform2D, TransformError> {
    let chain = lineage(lookup, entity)?;
    let mut frame: Option<GlobalTransform2D> = None;
    for &e in chain.iter().rev() {
        let t = lookup
            .transform(e)
            .ok_or(TransformError::MissingComponent { entity: e })?;
        frame = Some(t.global_in(frame.as_ref()));
    }
    frame.ok_or(TransformError::MissingComponent { entity })
}

/// Global transform of the entity's parent, `None` for a root.
pub fn parent_frame<L: TransformLookup + ?Sized>(
    lookup: &L,
    entity: Entity,
) -> Result<Option<GlobalTransform2D>, TransformError> {
    match lookup.parent(entity) {
        Some(parent) => global_transform(lookup, parent).map(Some),
        None => Ok(None),
    }
}

pub fn global_position<L: TransformLookup + ?Sized>(
    lookup: &L,
    entity: Entity,
) -> Result<Vec2, TransformError> {
    global_transform(lookup, entity).map(|gt| gt.position)
}

/// Global rotation in degrees.
pub fn global_rotation<L: TransformLookup + ?Sized>(
    lookup: &L,
    entity: Entity,
) -> Result<f32, TransformError> {
    global_transform(lookup, entity).map(|gt| gt.rotation_degrees)
}

pub fn global_scale<L: TransformLookup + ?Sized>(
    lookup: &L,
    entity: Entity,
) -> Result<Vec2, TransformError> {
    global_transform(lookup, entity).map(|gt| gt.scale)
}

pub fn global_matrix<L: TransformLookup + ?Sized>(
    lookup: &L,
    entity: Entity,
) -> Result<Mat3, TransformError> {
    global_transform(lookup, entity).map(|gt| gt.matrix)
}

fn config_of(world: &World) -> TransformConfig {
    world
        .get_resource::<TransformConfig>()
        .cloned()
        .unwrap_or_default()
}

/// Run `f` on the transform of `entity` with its parent frame and the active config.
fn with_transform_mut<R>(
    world: &mut World,
    entity: Entity,
    f: impl FnOnce(
        &mut TransformComponent,
        Option<&GlobalTransform2D>,
        &TransformConfig,
    ) -> Result<R, TransformError>,
) -> Result<R, TransformError> {
    let parent = parent_frame(&*world, entity)?;
    let config = config_of(world);
    let mut transform = world
        .get_mut::<TransformComponent>(entity)
        .ok_or(TransformError::MissingComponent { entity })?;
    f(&mut transform, parent.as_ref(), &config).map_err(|e| e.on_entity(entity))
}

/// Move `entity` so that its global position becomes `position`.
pub fn set_global_position(
    world: &mut World,
    entity: Entity,
    position: Vec2,
) -> Result<(), TransformError> {
    with_transform_mut(world, entity, |t, parent, cfg| {
        t.set_global_position_in(parent, position, cfg)
    })
}

pub fn set_global_rotation(
    world: &mut World,
    entity: Entity,
    degrees: f32,
) -> Result<(), TransformError> {
    with_transform_mut(world, entity, |t, parent, _| {
        t.set_global_rotation_in(parent, degrees);
        Ok(())
    })
}

pub fn set_global_scale(
    world: &mut World,
    entity: Entity,
    scale: Vec2,
) -> Result<(), TransformError> {
    with_transform_mut(world, entity, |t, parent, cfg| {
        t.set_global_scale_in(parent, scale, cfg)
    })
}

/// Set the local scale of `entity`, honouring the world's [`TransformConfig`].
pub fn set_local_scale(
    world: &mut World,
    entity: Entity,
    scale: Vec2,
) -> Result<(), TransformError> {
    with_transform_mut(world, entity, |t, _, cfg| t.set_scale_with(scale, cfg))
}

/// Local transform that places `transform` at world transform `target` under
/// `parent`. Works on a copy, so a failure leaves the caller's value as it was.
fn rebased(
    transform: &TransformComponent,
    parent: Option<&GlobalTransform2D>,
    target: &GlobalTransform2D,
    config: &TransformConfig,
) -> Result<TransformComponent, TransformError> {
    let mut t = *transform;
    t.set_global_scale_in(parent, target.scale, config)?;
    t.set_global_rotation_in(parent, target.rotation_degrees);
    t.set_global_position_in(parent, target.position, config)?;
    Ok(t)
}

/// Rebased local transform of `child` that keeps its current world transform
/// once `new_parent` is its frame.
fn keep_global_under(
    world: &World,
    child: Entity,
    new_parent: Option<&GlobalTransform2D>,
) -> Result<TransformComponent, TransformError> {
    let current = world
        .get::<TransformComponent>(child)
        .ok_or(TransformError::MissingComponent { entity: child })?;
    let target = global_transform(world, child)?;
    rebased(current, new_parent, &target, &config_of(world)).map_err(|e| e.on_entity(child))
}

/// Make `child` a child of `parent`.
///
/// With `keep_global` the child's local transform is rewritten so it stays
/// where it was in world space; otherwise its local values are kept and it
/// moves with the new parent. Fails with `HierarchyCycle` if `parent` is
/// `child` or one of its descendants. On error the hierarchy and the child's
/// transform are left unchanged.
pub fn set_parent(
    world: &mut World,
    child: Entity,
    parent: Entity,
    keep_global: bool,
) -> Result<(), TransformError> {
    if lineage(&*world, parent)?.contains(&child) {
        return Err(TransformError::HierarchyCycle { entity: child });
    }
    if world.get::<TransformComponent>(parent).is_none() {
        return Err(TransformError::MissingComponent { entity: parent });
    }
    let local = if keep_global {
        let frame = global_transform(&*world, parent)?;
        Some(keep_global_under(world, child, Some(&frame))?)
    } else {
        None
    };

    let mut entity = world
        .get_entity_mut(child)
        .map_err(|_| TransformError::MissingComponent { entity: child })?;
    entity.insert(ChildOf(parent));
    if let Some(local) = local {
        entity.insert(local);
    }
    world.flush();
    debug!("set parent of {} to {}", child, parent);
    Ok(())
}

/// Detach `child` from its parent, making it a root.
///
/// With `keep_global` the child's local transform snaps to its former world
/// transform. On error the child stays attached and unchanged.
pub fn remove_parent(
    world: &mut World,
    child: Entity,
    keep_global: bool,
) -> Result<(), TransformError> {
    if world.get::<ChildOf>(child).is_none() {
        return Ok(());
    }
    let local = if keep_global {
        Some(keep_global_under(world, child, None)?)
    } else {
        None
    };

    let mut entity = world
        .get_entity_mut(child)
        .map_err(|_| TransformError::MissingComponent { entity: child })?;
    entity.remove::<ChildOf>();
    if let Some(local) = local {
        entity.insert(local);
    }
    world.flush();
    debug!("removed parent of {}", child);
    Ok(())
}
