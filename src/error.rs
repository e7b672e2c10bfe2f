//! Error type shared by the transform hierarchy, the draw traversal and the
//! scene loader.

use bevy_ecs::prelude::Entity;
use thiserror::Error;

/// Failures reported by hierarchy reads, property setters and traversals.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    /// The entity (or one of its ancestors) has no `TransformComponent`.
    #[error("entity {entity} has no TransformComponent")]
    MissingComponent { entity: Entity },

    /// A zero or near-zero scale divisor, or a parent frame that cannot be
    /// inverted.
    #[error("degenerate transform{}: {reason}", fmt_entity(.entity))]
    DegenerateTransform {
        entity: Option<Entity>,
        reason: String,
    },

    /// The matrix stack depth after a traversal differs from the depth before it.
    #[error("matrix stack imbalance: expected depth {expected}, found {actual}")]
    StackImbalance { expected: usize, actual: usize },

    /// Following `ChildOf` links returned to an entity already visited.
    #[error("parent chain of entity {entity} contains a cycle")]
    HierarchyCycle { entity: Entity },

    /// A scene description referenced a node name that was never declared.
    #[error("unknown scene node '{name}'")]
    UnknownEntity { name: String },

    /// Malformed scene description.
    #[error("scene description error: {0}")]
    Scene(String),
}

fn fmt_entity(entity: &Option<Entity>) -> String {
    match entity {
        Some(e) => format!(" on entity {e}"),
        None => String::new(),
    }
}

impl TransformError {
    pub(crate) fn degenerate(reason: impl Into<String>) -> Self {
        TransformError::DegenerateTransform {
            entity: None,
            reason: reason.into(),
        }
    }

    /// Attach the offending entity to a `DegenerateTransform` raised by a
    /// component-level setter.
    pub(crate) fn on_entity(self, on: Entity) -> Self {
        match self {
            TransformError::DegenerateTransform { entity: None, reason } => {
                TransformError::DegenerateTransform {
                    entity: Some(on),
                    reason,
                }
            }
            other => other,
        }
    }
}
