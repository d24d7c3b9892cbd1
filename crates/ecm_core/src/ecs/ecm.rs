// ecm.rs - Entity component manager facade
//
// Owns the component store and the view cache and keeps them coherent:
// every add/remove goes through the store first, then its outcome is routed
// to the views that require the touched component type.
//
// The manager is single-owner and synchronous. It is `Send` but offers no
// internal locking; share it across threads only behind external
// synchronization.

use crate::ecs::{
    AddOutcome, Component, ComponentSet, ComponentStore, ComponentTypeId, EcmError, Entity,
    RemoveOutcome, View, ViewCache, ViewKey, ViewLookup, ViewUpdates,
};
use ecm_metrics::Counter;

/// Counter names recorded by [`Ecm`].
pub mod counters {
    pub const VIEWS_CREATED: &str = "views_created";
    pub const VIEW_HITS: &str = "view_hits";
    pub const ENTITIES_DRAINED: &str = "entities_drained";
    pub const ENTITIES_QUEUED: &str = "entities_queued";
    pub const PROMOTIONS: &str = "promotions";
    pub const DEMOTIONS: &str = "demotions";
}

/// The main entity component manager.
#[derive(Debug, Default)]
pub struct Ecm {
    store: ComponentStore,
    views: ViewCache,
    counters: Counter,
}

impl Ecm {
    pub fn new() -> Self {
        Self {
            store: ComponentStore::new(),
            views: ViewCache::new(),
            counters: Counter::new(),
        }
    }

    /// Create an entity with no components.
    pub fn create_entity(&mut self) -> Entity {
        self.store.create_entity()
    }

    /// Number of entities ever created.
    pub fn entity_count(&self) -> usize {
        self.store.entity_count()
    }

    /// Attach a component to an existing entity.
    ///
    /// Adding a type the entity already holds is a no-op; the first value
    /// stays until the component is removed.
    pub fn add_component<T: Component>(&mut self, entity: Entity, value: T) -> Result<(), EcmError> {
        let updates = match self.store.add_component(entity, value)? {
            AddOutcome::AlreadyPresent => return Ok(()),
            AddOutcome::Inserted { .. } => {
                self.views.component_inserted(&self.store, entity, T::ID)?
            }
            AddOutcome::Revived { .. } => {
                self.views.component_revived(&self.store, entity, T::ID)?
            }
        };
        self.record(updates);
        Ok(())
    }

    /// Remove a component from an entity. Absent components are ignored.
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Result<(), EcmError> {
        match self.store.remove_component::<T>(entity)? {
            RemoveOutcome::Absent => Ok(()),
            RemoveOutcome::Tombstoned { .. } => {
                let updates = self.views.component_removed(entity, T::ID)?;
                self.record(updates);
                Ok(())
            }
        }
    }

    pub fn component<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.store.component::<T>(entity)
    }

    pub fn component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.store.component_mut::<T>(entity)
    }

    pub fn has_component(&self, entity: Entity, id: ComponentTypeId) -> bool {
        self.store.has_component(entity, id)
    }

    /// Invoke `f` on every entity holding all components in `S`.
    ///
    /// Iteration stops as soon as `f` returns `false`. Component references
    /// are mutable; writes are visible to later calls immediately. The set
    /// of visited entities is fixed when the call starts, since the store
    /// cannot be mutated while the callback runs.
    ///
    /// # Example
    /// ```ignore
    /// ecm.each::<(Position, LinearVelocity), _>(|_entity, (pos, vel)| {
    ///     pos.data += vel.data;
    ///     true
    /// })?;
    /// ```
    pub fn each<S, F>(&mut self, mut f: F) -> Result<(), EcmError>
    where
        S: ComponentSet,
        F: for<'a> FnMut(Entity, S::Refs<'a>) -> bool,
    {
        let key = ViewKey::of::<S>()?;
        let (view, lookup) = self.views.find_view(&key, &self.store);

        match lookup {
            ViewLookup::Created { .. } => self.counters.increment(counters::VIEWS_CREATED, 1),
            ViewLookup::Reused { drained } => {
                self.counters.increment(counters::VIEW_HITS, 1);
                self.counters.increment(counters::ENTITIES_DRAINED, drained);
            }
        }

        for &entity in view.entities() {
            let slots = view.entity_component_data(entity)?;
            let records = self.store.records_mut(entity)?;
            if !f(entity, S::fetch(entity, records, slots)?) {
                break;
            }
        }
        Ok(())
    }

    /// Number of distinct ordered component lists ever iterated.
    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    /// Cached view for `S`, if one was built. Pending entities are not drained.
    pub fn view<S: ComponentSet>(&self) -> Option<&View> {
        self.views.get(&ViewKey::of::<S>().ok()?)
    }

    pub fn store(&self) -> &ComponentStore {
        &self.store
    }

    /// Cache bookkeeping counters (always zero without the `metrics` feature).
    pub fn counters(&self) -> &Counter {
        &self.counters
    }

    fn record(&mut self, updates: ViewUpdates) {
        self.counters.increment(counters::ENTITIES_QUEUED, updates.queued);
        self.counters.increment(counters::PROMOTIONS, updates.promoted);
        self.counters.increment(counters::DEMOTIONS, updates.demoted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{LinearAcceleration, LinearVelocity, Position};
    use glam::IVec3;

    fn seeded(count: i32) -> (Ecm, Vec<Entity>) {
        let mut ecm = Ecm::new();
        let entities = (0..count)
            .map(|i| {
                let e = ecm.create_entity();
                ecm.add_component(e, Position::new(IVec3::splat(i))).unwrap();
                ecm.add_component(e, LinearVelocity::new(IVec3::splat(i))).unwrap();
                e
            })
            .collect();
        (ecm, entities)
    }

    macro_rules! visited {
        ($ecm:expr, $set:ty) => {{
            let mut seen = Vec::new();
            $ecm.each::<$set, _>(|entity, _| {
                seen.push(entity);
                true
            })
            .unwrap();
            seen
        }};
    }

    #[test]
    fn each_visits_join_members() {
        let (mut ecm, entities) = seeded(3);
        ecm.add_component(entities[2], LinearAcceleration::new(IVec3::ONE)).unwrap();

        assert_eq!(visited!(ecm, (Position, LinearVelocity)), entities);
        assert_eq!(
            visited!(ecm, (Position, LinearAcceleration)),
            vec![entities[2]]
        );
    }

    #[test]
    fn each_writes_are_visible() {
        let (mut ecm, entities) = seeded(2);
        ecm.each::<(Position, LinearVelocity), _>(|_, (pos, vel)| {
            pos.data += vel.data;
            true
        })
        .unwrap();
        assert_eq!(ecm.component::<Position>(entities[1]).unwrap().data, IVec3::splat(2));
    }

    #[test]
    fn each_stops_when_callback_returns_false() {
        let (mut ecm, _) = seeded(5);
        let mut calls = 0;
        ecm.each::<(Position,), _>(|_, _| {
            calls += 1;
            calls < 2
        })
        .unwrap();
        assert_eq!(calls, 2);
    }

    #[test]
    fn new_entities_appear_on_next_each() {
        let (mut ecm, mut entities) = seeded(1);
        assert_eq!(visited!(ecm, (Position, LinearVelocity)).len(), 1);

        let late = ecm.create_entity();
        ecm.add_component(late, LinearVelocity::default()).unwrap();
        ecm.add_component(late, Position::default()).unwrap();
        assert!(ecm.view::<(Position, LinearVelocity)>().unwrap().has_new_entity(late));

        entities.push(late);
        assert_eq!(visited!(ecm, (Position, LinearVelocity)), entities);
        assert_eq!(ecm.view_count(), 1);
    }

    #[test]
    fn duplicate_types_are_rejected() {
        let (mut ecm, _) = seeded(1);
        let err = ecm.each::<(Position, Position), _>(|_, _| true).unwrap_err();
        assert_eq!(err, EcmError::DuplicateComponentType { id: Position::ID });
        assert_eq!(ecm.view_count(), 0);
    }

    #[test]
    fn unknown_entity_is_rejected() {
        let mut ecm = Ecm::new();
        let ghost = Entity::from_raw(10);
        assert_eq!(
            ecm.add_component(ghost, Position::default()),
            Err(EcmError::UnknownEntity(ghost))
        );
        assert_eq!(
            ecm.remove_component::<Position>(ghost),
            Err(EcmError::UnknownEntity(ghost))
        );
        assert!(!ecm.has_component(ghost, Position::ID));
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn counters_track_cache_activity() {
        let (mut ecm, entities) = seeded(2);
        visited!(ecm, (Position, LinearVelocity));
        ecm.remove_component::<LinearVelocity>(entities[0]).unwrap();
        ecm.add_component(entities[0], LinearVelocity::default()).unwrap();
        visited!(ecm, (Position, LinearVelocity));

        let stats = ecm.counters();
        assert_eq!(stats.get(counters::VIEWS_CREATED), 1);
        assert_eq!(stats.get(counters::VIEW_HITS), 1);
        assert_eq!(stats.get(counters::DEMOTIONS), 1);
        assert_eq!(stats.get(counters::PROMOTIONS), 1);
    }
}
