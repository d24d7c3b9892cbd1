// component.rs - Component declaration and runtime registry
//
// Components are identified by explicit u64 IDs, not Rust TypeIds.
// ID 0 is reserved as the invalid sentinel.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::mem::{align_of, size_of};
use std::sync::{PoisonError, RwLock};

pub type ComponentTypeId = u64;

/// Sentinel id that no component kind may use.
pub const INVALID_COMPONENT: ComponentTypeId = 0;

/// Metadata describing a component kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentMeta {
    pub id: ComponentTypeId,
    pub name: &'static str,
    pub size: usize,
    pub align: usize,
}

/// Process-wide registry of every component kind the store has seen.
static REGISTRY: Lazy<RwLock<HashMap<ComponentTypeId, ComponentMeta>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Record a component kind's metadata.
///
/// Id uniqueness is the caller's responsibility: a conflicting
/// re-registration is logged and the newer metadata wins.
pub fn register_component(meta: ComponentMeta) {
    {
        let map = REGISTRY.read().unwrap_or_else(PoisonError::into_inner);
        if map.get(&meta.id) == Some(&meta) {
            return;
        }
    }

    let mut map = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
    if let Some(prev) = map.insert(meta.id, meta.clone()) {
        if prev != meta {
            tracing::warn!(
                id = meta.id,
                previous = prev.name,
                current = meta.name,
                "component id registered twice with different layouts"
            );
        }
    }
}

/// Look up component metadata by ID.
pub fn meta_of(id: ComponentTypeId) -> Option<ComponentMeta> {
    REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&id)
        .cloned()
}

/// Human-readable name for an id, for diagnostics.
pub fn name_of(id: ComponentTypeId) -> &'static str {
    meta_of(id).map_or("<unregistered>", |meta| meta.name)
}

/// Trait for component kinds that can be attached to entities.
///
/// Implementors must carry a distinct, non-zero `ID`. Use
/// [`define_component!`](crate::define_component) so that a zero id is
/// rejected at compile time.
pub trait Component: 'static + Sized + Send + Sync {
    /// Globally unique component ID.
    const ID: ComponentTypeId;

    /// Human-readable name for debugging.
    const NAME: &'static str;

    fn meta() -> ComponentMeta {
        ComponentMeta {
            id: Self::ID,
            name: Self::NAME,
            size: size_of::<Self>(),
            align: align_of::<Self>(),
        }
    }

    /// Register this component's layout with the global registry.
    fn ensure_registered() {
        register_component(Self::meta());
    }
}

/// Helper macro to implement the Component trait.
///
/// # Example
/// ```ignore
/// #[derive(Clone, Copy)]
/// struct Position { x: i32, y: i32 }
///
/// define_component!(Position, 4, "Position");
/// ```
#[macro_export]
macro_rules! define_component {
    ($ty:ty, $id:expr, $name:expr) => {
        impl $crate::ecs::Component for $ty {
            const ID: $crate::ecs::ComponentTypeId = {
                assert!(
                    $id != $crate::ecs::INVALID_COMPONENT,
                    "component id 0 is reserved"
                );
                $id
            };
            const NAME: &'static str = $name;
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Mass(#[allow(dead_code)] f32);
    crate::define_component!(Mass, 900, "Mass");

    #[test]
    fn registration_exposes_meta() {
        Mass::ensure_registered();
        let meta = meta_of(900).expect("registered");
        assert_eq!(meta.name, "Mass");
        assert_eq!(meta.size, size_of::<Mass>());
        assert_eq!(name_of(900), "Mass");
    }

    #[test]
    fn unknown_ids_have_placeholder_name() {
        assert_eq!(meta_of(901), None);
        assert_eq!(name_of(901), "<unregistered>");
    }

    #[test]
    fn conflicting_registration_keeps_latest() {
        register_component(ComponentMeta { id: 902, name: "A", size: 4, align: 4 });
        register_component(ComponentMeta { id: 902, name: "B", size: 8, align: 8 });
        assert_eq!(name_of(902), "B");
    }
}
