//! Integration tests for the scoped draw traversal.
//!
//! # Usage
//!
//! ```sh
//! cargo test --test render_integration
//! ```

use std::sync::{Arc, Mutex};

use bevy_ecs::hierarchy::ChildOf;
use bevy_ecs::prelude::*;
use glam::{Mat3, Vec2};

use scenegraph2d::components::transform::TransformComponent;
use scenegraph2d::error::TransformError;
use scenegraph2d::resources::matrixstack::{MatrixStack, SoftwareMatrixStack, StackOp};
use scenegraph2d::resources::rendercontext::RenderContext;
use scenegraph2d::resources::scenedescription::{NodeDescription, SceneDescription};
use scenegraph2d::systems::hierarchy::global_matrix;
use scenegraph2d::systems::render::draw_hierarchy;

const EPSILON: f32 = 1e-4;

/// Software stack that mirrors its current matrix into a shared slot so the
/// test can observe it from inside draw callbacks.
#[derive(Clone)]
struct ObservedStack {
    inner: SoftwareMatrixStack,
    current: Arc<Mutex<Mat3>>,
    ops: Arc<Mutex<Vec<StackOp>>>,
}

impl ObservedStack {
    fn new() -> Self {
        Self {
            inner: SoftwareMatrixStack::new().with_recording(),
            current: Arc::new(Mutex::new(Mat3::IDENTITY)),
            ops: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn sync(&mut self) {
        *self.current.lock().unwrap() = self.inner.current();
        self.ops.lock().unwrap().extend(self.inner.take_ops());
    }
}

impl MatrixStack for ObservedStack {
    fn push_matrix(&mut self) {
        self.inner.push_matrix();
        self.sync();
    }

    fn pop_matrix(&mut self) {
        self.inner.pop_matrix();
        self.sync();
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.inner.translate(x, y);
        self.sync();
    }

    fn rotate(&mut self, degrees: f32) {
        self.inner.rotate(degrees);
        self.sync();
    }

    fn scale(&mut self, x: f32, y: f32) {
        self.inner.scale(x, y);
        self.sync();
    }

    fn depth(&self) -> usize {
        self.inner.depth()
    }
}

fn demo_world() -> (World, ObservedStack, Vec<Entity>) {
    let mut world = World::new();
    let stack = ObservedStack::new();
    world.insert_resource(RenderContext::new(stack.clone()));

    let scene = SceneDescription {
        nodes: vec![
            NodeDescription::new("ship").with_position(10.0, 0.0).with_rotation(90.0),
            NodeDescription::new("turret")
                .with_parent("ship")
                .with_position(5.0, 0.0)
                .with_scale(2.0, 2.0),
            NodeDescription::new("barrel")
                .with_parent("turret")
                .with_position(1.0, 0.0)
                .with_rotation(-30.0),
            NodeDescription::new("buoy").with_position(-4.0, 3.0),
        ],
    };
    let spawned = scene.spawn(&mut world).unwrap();
    let order = ["ship", "turret", "barrel", "buoy"]
        .iter()
        .map(|n| spawned[*n])
        .collect();
    (world, stack, order)
}

#[test]
fn traversal_draws_every_entity_with_its_world_matrix() {
    let (mut world, stack, entities) = demo_world();
    let mut drawn: Vec<(Entity, Mat3, usize)> = Vec::new();

    draw_hierarchy(&mut world, |_, entity, s| {
        drawn.push((entity, *stack.current.lock().unwrap(), s.depth()));
    })
    .unwrap();

    assert_eq!(drawn.len(), entities.len());
    for (entity, matrix, _) in &drawn {
        let expected = global_matrix(&world, *entity).unwrap();
        assert!(
            matrix.abs_diff_eq(expected, EPSILON),
            "entity {entity}: expected {expected:?}, got {matrix:?}"
        );
    }

    let depth_of = |e: Entity| drawn.iter().find(|(d, _, _)| *d == e).map(|(_, _, depth)| *depth);
    assert_eq!(depth_of(entities[0]), Some(1));
    assert_eq!(depth_of(entities[1]), Some(2));
    assert_eq!(depth_of(entities[2]), Some(3));
    assert_eq!(depth_of(entities[3]), Some(1));
}

#[test]
fn traversal_visits_parents_before_children() {
    let (mut world, _stack, entities) = demo_world();
    let mut order: Vec<Entity> = Vec::new();
    draw_hierarchy(&mut world, |_, entity, _| order.push(entity)).unwrap();

    let index = |e: Entity| order.iter().position(|&x| x == e).unwrap();
    assert!(index(entities[0]) < index(entities[1]));
    assert!(index(entities[1]) < index(entities[2]));
}

#[test]
fn traversal_restores_stack_to_pre_traversal_state() {
    let (mut world, stack, _) = demo_world();
    world.resource_mut::<RenderContext>().stack_mut().translate(7.0, 7.0);
    let before = *stack.current.lock().unwrap();

    draw_hierarchy(&mut world, |_, _, _| {}).unwrap();

    assert_eq!(*stack.current.lock().unwrap(), before);
    assert_eq!(world.resource::<RenderContext>().stack().depth(), 0);

    let ops = stack.ops.lock().unwrap();
    let pushes = ops.iter().filter(|op| **op == StackOp::Push).count();
    let pops = ops.iter().filter(|op| **op == StackOp::Pop).count();
    assert_eq!(pushes, 4);
    assert_eq!(pops, 4);
}

#[test]
fn attach_ops_follow_translate_rotate_scale_order() {
    let mut world = World::new();
    let stack = ObservedStack::new();
    world.insert_resource(RenderContext::new(stack.clone()));
    world.spawn(TransformComponent::from_parts(
        Vec2::new(3.0, 4.0),
        45.0,
        Vec2::new(2.0, 0.5),
    ));

    draw_hierarchy(&mut world, |_, _, _| {}).unwrap();

    assert_eq!(
        *stack.ops.lock().unwrap(),
        vec![
            StackOp::Push,
            StackOp::Translate(3.0, 4.0),
            StackOp::Rotate(45.0),
            StackOp::Scale(2.0, 0.5),
            StackOp::Pop,
        ]
    );
}

#[test]
fn unbalanced_draw_callback_is_reported_and_repaired() {
    let (mut world, stack, _) = demo_world();

    let result = draw_hierarchy(&mut world, |_, _, s| s.push_matrix());

    assert!(
        matches!(result, Err(TransformError::StackImbalance { .. })),
        "unexpected result {result:?}"
    );
    assert_eq!(world.resource::<RenderContext>().stack().depth(), 0);
    assert_eq!(*stack.current.lock().unwrap(), Mat3::IDENTITY);
}

#[test]
fn child_without_transform_is_reported() {
    let mut world = World::new();
    world.insert_resource(RenderContext::new(SoftwareMatrixStack::new()));
    let root = world.spawn(TransformComponent::new()).id();
    let bare = world.spawn(ChildOf(root)).id();
    world.flush();

    let result = draw_hierarchy(&mut world, |_, _, _| {});
    assert_eq!(result, Err(TransformError::MissingComponent { entity: bare }));
    assert_eq!(world.resource::<RenderContext>().stack().depth(), 0);
}

#[test]
fn empty_world_draws_nothing() {
    let mut world = World::new();
    world.insert_resource(RenderContext::new(SoftwareMatrixStack::new()));
    let mut calls = 0;
    draw_hierarchy(&mut world, |_, _, _| calls += 1).unwrap();
    assert_eq!(calls, 0);
}
