// store.rs - Per-entity heterogeneous component storage
//
// Every entity owns a slot array of type-erased records plus a map from
// component id to slot. Removal only tombstones a record, so slot indices
// handed to views stay valid for the lifetime of the store.

use crate::ecs::{Component, ComponentTypeId, EcmError, Entity};
use std::any::Any;
use std::collections::HashMap;

/// A single component instance attached to an entity.
pub struct ComponentRecord {
    type_id: ComponentTypeId,
    payload: Box<dyn Any + Send + Sync>,
    ignore: bool,
}

impl ComponentRecord {
    fn new<T: Component>(value: T) -> Self {
        Self {
            type_id: T::ID,
            payload: Box::new(value),
            ignore: false,
        }
    }

    #[inline]
    pub fn type_id(&self) -> ComponentTypeId {
        self.type_id
    }

    /// True once the component has been removed and not yet re-added.
    #[inline]
    pub fn is_ignored(&self) -> bool {
        self.ignore
    }

    /// Downcast the payload. Returns `None` unless the record's id is `T::ID`.
    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        if self.type_id != T::ID {
            return None;
        }
        self.payload.downcast_ref::<T>()
    }

    /// Downcast the payload mutably. Returns `None` unless the record's id is `T::ID`.
    pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        if self.type_id != T::ID {
            return None;
        }
        self.payload.downcast_mut::<T>()
    }

    /// Overwrite the payload in place and clear the tombstone.
    fn revive<T: Component>(&mut self, value: T) {
        match self.payload.downcast_mut::<T>() {
            Some(slot) => *slot = value,
            None => self.payload = Box::new(value),
        }
        self.ignore = false;
    }
}

impl std::fmt::Debug for ComponentRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRecord")
            .field("type_id", &self.type_id)
            .field("ignore", &self.ignore)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
struct EntityComponents {
    records: Vec<ComponentRecord>,
    index: HashMap<ComponentTypeId, usize>,
}

impl EntityComponents {
    /// Slot of a live (non-tombstoned) record.
    #[inline]
    fn valid_slot(&self, id: ComponentTypeId) -> Option<usize> {
        let slot = *self.index.get(&id)?;
        (!self.records[slot].ignore).then_some(slot)
    }
}

/// What `add_component` did to the entity's slot array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new record was appended.
    Inserted { slot: usize },
    /// A live record of this type already existed; nothing changed.
    AlreadyPresent,
    /// A tombstoned record was overwritten and re-enabled.
    Revived { slot: usize },
}

/// What `remove_component` did to the entity's slot array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// No live record of this type existed.
    Absent,
    /// The record at `slot` is now tombstoned.
    Tombstoned { slot: usize },
}

/// Owns all component data for every entity.
#[derive(Debug, Default)]
pub struct ComponentStore {
    entities: Vec<EntityComponents>,
}

impl ComponentStore {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
        }
    }

    /// Allocate the next entity handle.
    pub fn create_entity(&mut self) -> Entity {
        let entity = Entity::from_raw(self.entities.len() as u64);
        self.entities.push(EntityComponents::default());
        entity
    }

    /// Number of entities ever created.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.slots(entity).is_ok()
    }

    /// Every entity ever created, in creation order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        (0..self.entities.len() as u64).map(Entity::from_raw)
    }

    fn slots(&self, entity: Entity) -> Result<&EntityComponents, EcmError> {
        entity
            .index()
            .and_then(|idx| self.entities.get(idx))
            .ok_or(EcmError::UnknownEntity(entity))
    }

    fn slots_mut(&mut self, entity: Entity) -> Result<&mut EntityComponents, EcmError> {
        entity
            .index()
            .and_then(|idx| self.entities.get_mut(idx))
            .ok_or(EcmError::UnknownEntity(entity))
    }

    /// Attach `value` to `entity`.
    ///
    /// The first add of a type wins until it is removed: adding over a live
    /// record is a no-op. Adding over a tombstoned record revives it in place.
    pub fn add_component<T: Component>(
        &mut self,
        entity: Entity,
        value: T,
    ) -> Result<AddOutcome, EcmError> {
        let comps = self.slots_mut(entity)?;

        if let Some(&slot) = comps.index.get(&T::ID) {
            let record = &mut comps.records[slot];
            if !record.ignore {
                return Ok(AddOutcome::AlreadyPresent);
            }
            record.revive(value);
            tracing::trace!(%entity, component = T::NAME, slot, "revived component");
            return Ok(AddOutcome::Revived { slot });
        }

        T::ensure_registered();
        let slot = comps.records.len();
        comps.records.push(ComponentRecord::new(value));
        comps.index.insert(T::ID, slot);
        tracing::trace!(%entity, component = T::NAME, slot, "inserted component");
        Ok(AddOutcome::Inserted { slot })
    }

    /// Tombstone the live `T` record of `entity`, if any.
    pub fn remove_component<T: Component>(
        &mut self,
        entity: Entity,
    ) -> Result<RemoveOutcome, EcmError> {
        let comps = self.slots_mut(entity)?;
        let Some(slot) = comps.valid_slot(T::ID) else {
            return Ok(RemoveOutcome::Absent);
        };
        comps.records[slot].ignore = true;
        tracing::trace!(%entity, component = T::NAME, slot, "tombstoned component");
        Ok(RemoveOutcome::Tombstoned { slot })
    }

    /// Live component of type `T`, or `None` if absent, tombstoned, or the
    /// entity is unknown.
    pub fn component<T: Component>(&self, entity: Entity) -> Option<&T> {
        let comps = self.slots(entity).ok()?;
        let slot = comps.valid_slot(T::ID)?;
        comps.records[slot].downcast_ref::<T>()
    }

    pub fn component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        let comps = self.slots_mut(entity).ok()?;
        let slot = comps.valid_slot(T::ID)?;
        comps.records[slot].downcast_mut::<T>()
    }

    /// True if `entity` holds a live record of `id`.
    pub fn has_component(&self, entity: Entity, id: ComponentTypeId) -> bool {
        self.slots(entity)
            .is_ok_and(|comps| comps.valid_slot(id).is_some())
    }

    /// True if every id in `ids` resolves to a live record of `entity`.
    pub fn has_all_valid_components(&self, entity: Entity, ids: &[ComponentTypeId]) -> bool {
        self.slots(entity)
            .is_ok_and(|comps| ids.iter().all(|&id| comps.valid_slot(id).is_some()))
    }

    /// Slot indices of `ids` in order, or `None` unless all are live.
    pub fn valid_slots(&self, entity: Entity, ids: &[ComponentTypeId]) -> Option<Box<[usize]>> {
        let comps = self.slots(entity).ok()?;
        ids.iter().map(|&id| comps.valid_slot(id)).collect()
    }

    /// Raw slot array of an entity, tombstones included.
    pub fn records(&self, entity: Entity) -> Result<&[ComponentRecord], EcmError> {
        Ok(&self.slots(entity)?.records)
    }

    pub(crate) fn records_mut(
        &mut self,
        entity: Entity,
    ) -> Result<&mut [ComponentRecord], EcmError> {
        Ok(&mut self.slots_mut(entity)?.records)
    }
}
