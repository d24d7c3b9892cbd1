//! Standard component kinds
//!
//! Ids are fixed and match across builds; new kinds must pick an unused,
//! non-zero id.

use crate::define_component;
use glam::IVec3;

/// Integer quaternion stored as `w, x, y, z`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Quaternioni {
    pub w: i32,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Quaternioni {
    pub const IDENTITY: Self = Self { w: 1, x: 0, y: 0, z: 0 };
}

/// Name of the entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Name {
    pub name: String,
}

/// Marks an entity as a world.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorldMarker;

/// Whether an entity is static.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Static {
    pub is_static: bool,
}

/// Pose: position plus orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pose {
    pub position: IVec3,
    pub orientation: Quaternioni,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: IVec3::ZERO,
            orientation: Quaternioni::IDENTITY,
        }
    }
}

/// Pose in world coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorldPose(pub Pose);

macro_rules! vector_component {
    ($(#[$doc:meta])* $ty:ident, $id:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $ty {
            pub data: IVec3,
        }

        impl $ty {
            pub const fn new(data: IVec3) -> Self {
                Self { data }
            }
        }

        define_component!($ty, $id, stringify!($ty));
    };
}

define_component!(Name, 1, "Name");
define_component!(WorldMarker, 2, "World");
define_component!(Static, 3, "Static");
vector_component!(
    /// Position of the entity.
    Position, 4
);
vector_component!(
    /// Position in world coordinates.
    WorldPosition, 5
);
vector_component!(
    /// Linear velocity.
    LinearVelocity, 6
);
vector_component!(
    /// Linear velocity in world coordinates.
    WorldLinearVelocity, 7
);
vector_component!(
    /// Angular velocity.
    AngularVelocity, 8
);
vector_component!(
    /// Angular velocity in world coordinates.
    WorldAngularVelocity, 9
);
vector_component!(
    /// Linear acceleration.
    LinearAcceleration, 10
);
vector_component!(
    /// Linear acceleration in world coordinates.
    WorldLinearAcceleration, 11
);
define_component!(Pose, 12, "Pose");
define_component!(WorldPose, 13, "WorldPose");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::Component;

    #[test]
    fn ids_are_distinct_and_nonzero() {
        let ids = [
            Name::ID,
            WorldMarker::ID,
            Static::ID,
            Position::ID,
            WorldPosition::ID,
            LinearVelocity::ID,
            WorldLinearVelocity::ID,
            AngularVelocity::ID,
            WorldAngularVelocity::ID,
            LinearAcceleration::ID,
            WorldLinearAcceleration::ID,
            Pose::ID,
            WorldPose::ID,
        ];
        for (i, id) in ids.iter().enumerate() {
            assert_ne!(*id, 0);
            assert!(!ids[..i].contains(id), "duplicate id {id}");
        }
        assert_eq!(ids, [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13]);
    }

    #[test]
    fn vector_components_use_type_name() {
        assert_eq!(LinearAcceleration::NAME, "LinearAcceleration");
        assert_eq!(WorldMarker::NAME, "World");
    }
}
