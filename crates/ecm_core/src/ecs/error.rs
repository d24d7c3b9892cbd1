use crate::ecs::{ComponentTypeId, Entity};
use std::fmt;
use thiserror::Error;

/// Which side of a view's valid/invalid split an operation required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    Valid,
    Invalid,
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Partition::Valid => f.write_str("valid"),
            Partition::Invalid => f.write_str("invalid"),
        }
    }
}

/// Errors surfaced by the store, its views, and the facade.
///
/// Absent or tombstoned components are not errors; they show up as
/// `None`/`false` or as silent no-ops.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EcmError {
    #[error("entity {0} was never created by this store")]
    UnknownEntity(Entity),

    #[error("view key must name at least one component type")]
    EmptyViewKey,

    #[error("component id 0 is reserved and cannot appear in a view key")]
    InvalidComponentType,

    #[error("component {id} appears more than once in a view key")]
    DuplicateComponentType { id: ComponentTypeId },

    #[error("entity {entity} is not in the {expected} partition of the view")]
    ViewPartition { entity: Entity, expected: Partition },

    #[error("component record {id} does not hold a `{expected}`")]
    ComponentTypeMismatch {
        id: ComponentTypeId,
        expected: &'static str,
    },

    #[error("slot {slot} is out of range for entity {entity} ({len} records)")]
    SlotOutOfRange {
        entity: Entity,
        slot: usize,
        len: usize,
    },
}
