//! Cached joins over an ordered list of component types.
//!
//! A [`View`] remembers, for every entity that satisfies its key, the row of
//! slot indices locating each required component inside the
//! [`ComponentStore`](crate::ecs::ComponentStore). Rows are resolved into
//! references only when the view is iterated.
//!
//! Each entity known to a view sits in exactly one of these states:
//!
//! | State   | Where                         | Visible to `each` |
//! |---------|-------------------------------|-------------------|
//! | Pending | `new_entities`                | no (next drain)   |
//! | Valid   | `valid_data` and `entities`   | yes               |
//! | Invalid | `invalid_data` and `missing`  | no                |
//!
//! Removing a required component demotes a valid row to the invalid side
//! without discarding it; re-adding every missing component promotes the
//! same row back. Rows are moved between maps, never rebuilt.

use crate::ecs::{ComponentTypeId, EcmError, Entity, Partition, ViewKey};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Slot indices of one entity's components, in view key order.
pub type SlotRow = Box<[usize]>;

#[derive(Debug)]
pub struct View {
    key: ViewKey,
    comp_types: HashSet<ComponentTypeId>,
    valid_data: HashMap<Entity, SlotRow>,
    invalid_data: HashMap<Entity, SlotRow>,
    missing_comp_tracker: HashMap<Entity, HashSet<ComponentTypeId>>,
    entities: BTreeSet<Entity>,
    new_entities: BTreeSet<Entity>,
}

impl View {
    pub fn new(key: ViewKey) -> Self {
        let comp_types = key.as_slice().iter().copied().collect();
        Self {
            key,
            comp_types,
            valid_data: HashMap::new(),
            invalid_data: HashMap::new(),
            missing_comp_tracker: HashMap::new(),
            entities: BTreeSet::new(),
            new_entities: BTreeSet::new(),
        }
    }

    #[inline]
    pub fn key(&self) -> &ViewKey {
        &self.key
    }

    /// True if `id` is one of the view's required types.
    #[inline]
    pub fn has_component(&self, id: ComponentTypeId) -> bool {
        self.comp_types.contains(&id)
    }

    /// Entities currently satisfying every required type, in handle order.
    #[inline]
    pub fn entities(&self) -> &BTreeSet<Entity> {
        &self.entities
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    #[inline]
    pub fn has_entity(&self, entity: Entity) -> bool {
        self.entities.contains(&entity)
    }

    #[inline]
    pub fn has_new_entity(&self, entity: Entity) -> bool {
        self.new_entities.contains(&entity)
    }

    /// True if the view holds a row for `entity`, valid or not.
    #[inline]
    pub fn has_component_data(&self, entity: Entity) -> bool {
        self.valid_data.contains_key(&entity) || self.invalid_data.contains_key(&entity)
    }

    #[inline]
    pub fn is_invalid(&self, entity: Entity) -> bool {
        self.invalid_data.contains_key(&entity)
    }

    pub fn new_entities(&self) -> &BTreeSet<Entity> {
        &self.new_entities
    }

    /// Types an invalid entity still lacks.
    pub fn missing_components(&self, entity: Entity) -> Option<&HashSet<ComponentTypeId>> {
        self.missing_comp_tracker.get(&entity)
    }

    /// Queue `entity` for materialization on the next use of the view.
    ///
    /// Ignored if the entity is already queued or already has a row.
    pub fn add_new_entity(&mut self, entity: Entity) -> bool {
        if self.has_component_data(entity) {
            return false;
        }
        self.new_entities.insert(entity)
    }

    pub(crate) fn take_new_entities(&mut self) -> BTreeSet<Entity> {
        std::mem::take(&mut self.new_entities)
    }

    /// Cached row of a valid entity.
    pub fn entity_component_data(&self, entity: Entity) -> Result<&[usize], EcmError> {
        self.valid_data
            .get(&entity)
            .map(|row| &**row)
            .ok_or(EcmError::ViewPartition {
                entity,
                expected: Partition::Valid,
            })
    }

    /// Insert a row for an entity that satisfies the view.
    pub fn add_entity(&mut self, entity: Entity, slots: SlotRow) {
        debug_assert_eq!(slots.len(), self.key.len(), "row width must match view key");
        debug_assert!(!self.invalid_data.contains_key(&entity));
        self.valid_data.insert(entity, slots);
        self.entities.insert(entity);
    }

    /// A missing component of an invalid entity came back.
    ///
    /// Returns `true` when that was the last missing type and the entity's
    /// row moved back to the valid side.
    pub fn notify_component_addition(
        &mut self,
        entity: Entity,
        id: ComponentTypeId,
    ) -> Result<bool, EcmError> {
        let not_invalid = EcmError::ViewPartition {
            entity,
            expected: Partition::Invalid,
        };
        let missing = self
            .missing_comp_tracker
            .get_mut(&entity)
            .ok_or_else(|| not_invalid.clone())?;
        missing.remove(&id);
        if !missing.is_empty() {
            return Ok(false);
        }

        let row = self.invalid_data.remove(&entity).ok_or(not_invalid)?;
        self.valid_data.insert(entity, row);
        self.entities.insert(entity);
        self.missing_comp_tracker.remove(&entity);
        tracing::debug!(%entity, view = %self.key, "entity promoted");
        Ok(true)
    }

    /// A required component of a valid entity was removed.
    pub fn notify_component_removal(
        &mut self,
        entity: Entity,
        id: ComponentTypeId,
    ) -> Result<(), EcmError> {
        let row = self
            .valid_data
            .remove(&entity)
            .ok_or(EcmError::ViewPartition {
                entity,
                expected: Partition::Valid,
            })?;
        self.invalid_data.insert(entity, row);
        self.entities.remove(&entity);
        self.missing_comp_tracker.insert(entity, HashSet::from([id]));
        tracing::debug!(%entity, view = %self.key, "entity demoted");
        Ok(())
    }

    /// Another required component of an already invalid entity was removed.
    pub fn mark_missing(&mut self, entity: Entity, id: ComponentTypeId) -> Result<(), EcmError> {
        self.missing_comp_tracker
            .get_mut(&entity)
            .ok_or(EcmError::ViewPartition {
                entity,
                expected: Partition::Invalid,
            })?
            .insert(id);
        Ok(())
    }
}
