//! Entity component manager core types.
//!
//! Components live in a per-entity slot array owned by the
//! [`ComponentStore`]. Iteration goes through cached [`View`]s, one per
//! ordered component list, which the [`Ecm`] facade keeps coherent with the
//! store as components are added and removed.

mod component;
mod component_set;
mod ecm;
mod entity;
mod error;
mod store;
mod view;
mod view_cache;

pub use component::{
    meta_of, name_of, register_component, Component, ComponentMeta, ComponentTypeId,
    INVALID_COMPONENT,
};
pub use component_set::{ComponentSet, ViewKey};
pub use ecm::{counters, Ecm};
pub use entity::Entity;
pub use error::{EcmError, Partition};
pub use store::{AddOutcome, ComponentRecord, ComponentStore, RemoveOutcome};
pub use view::{SlotRow, View};
pub use view_cache::{ViewCache, ViewLookup, ViewUpdates};

/// Create an entity and attach every listed component to it.
///
/// # Example
/// ```ignore
/// let entity = spawn!(ecm, Position::default(), LinearVelocity::default())?;
/// ```
#[macro_export]
macro_rules! spawn {
    ($ecm:expr $(, $component:expr)+ $(,)?) => {{
        let entity = $ecm.create_entity();
        (|| -> ::std::result::Result<$crate::ecs::Entity, $crate::ecs::EcmError> {
            $(
                $ecm.add_component(entity, $component)?;
            )+
            Ok(entity)
        })()
    }};
}
