// view_cache.rs - Registry of views keyed by ordered component lists
//
// Views are created on first request and never evicted. A reverse index
// from component id to the views that require it keeps mutation routing
// proportional to the number of interested views.

use crate::ecs::{ComponentStore, ComponentTypeId, EcmError, Entity, View, ViewKey};
use std::collections::HashMap;

/// How `find_view` satisfied a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewLookup {
    /// A new view was built by scanning every entity.
    Created { populated: usize },
    /// An existing view was reused after materializing pending entities.
    Reused { drained: usize },
}

/// Per-mutation summary of view bookkeeping, used for counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewUpdates {
    pub queued: usize,
    pub promoted: usize,
    pub demoted: usize,
}

#[derive(Debug, Default)]
pub struct ViewCache {
    views: Vec<View>,
    by_key: HashMap<ViewKey, usize>,
    by_component: HashMap<ComponentTypeId, Vec<usize>>,
}

impl ViewCache {
    pub fn new() -> Self {
        Self {
            views: Vec::new(),
            by_key: HashMap::new(),
            by_component: HashMap::new(),
        }
    }

    /// Number of distinct keys ever registered.
    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Existing view for `key`, without draining pending entities.
    pub fn get(&self, key: &ViewKey) -> Option<&View> {
        self.by_key.get(key).map(|&idx| &self.views[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &View> {
        self.views.iter()
    }

    /// Return the view for `key`, building it on first request.
    ///
    /// A reused view first materializes its pending entities; a new view is
    /// populated by testing every entity ever created.
    pub fn find_view(&mut self, key: &ViewKey, store: &ComponentStore) -> (&View, ViewLookup) {
        if let Some(&idx) = self.by_key.get(key) {
            let drained = drain_new_entities(&mut self.views[idx], store);
            return (&self.views[idx], ViewLookup::Reused { drained });
        }

        let mut view = View::new(key.clone());
        for entity in store.entities() {
            if !store.has_all_valid_components(entity, key.as_slice()) {
                continue;
            }
            if let Some(slots) = store.valid_slots(entity, key.as_slice()) {
                view.add_entity(entity, slots);
            }
        }
        let populated = view.len();
        tracing::debug!(view = %key, populated, "created view");

        let idx = self.views.len();
        self.views.push(view);
        self.by_key.insert(key.clone(), idx);
        for &id in key.as_slice() {
            self.by_component.entry(id).or_default().push(idx);
        }
        (&self.views[idx], ViewLookup::Created { populated })
    }

    fn for_each_view_with<F>(&mut self, id: ComponentTypeId, mut f: F) -> Result<(), EcmError>
    where
        F: FnMut(&mut View) -> Result<(), EcmError>,
    {
        let Some(indices) = self.by_component.get(&id) else {
            return Ok(());
        };
        for &idx in indices {
            f(&mut self.views[idx])?;
        }
        Ok(())
    }

    /// A brand new record of `id` was appended to `entity`.
    pub fn component_inserted(
        &mut self,
        store: &ComponentStore,
        entity: Entity,
        id: ComponentTypeId,
    ) -> Result<ViewUpdates, EcmError> {
        let mut updates = ViewUpdates::default();
        self.for_each_view_with(id, |view| {
            if queue_if_satisfied(view, store, entity) {
                updates.queued += 1;
            }
            Ok(())
        })?;
        Ok(updates)
    }

    /// A tombstoned record of `id` on `entity` was revived.
    pub fn component_revived(
        &mut self,
        store: &ComponentStore,
        entity: Entity,
        id: ComponentTypeId,
    ) -> Result<ViewUpdates, EcmError> {
        let mut updates = ViewUpdates::default();
        self.for_each_view_with(id, |view| {
            if view.is_invalid(entity) {
                if view.notify_component_addition(entity, id)? {
                    updates.promoted += 1;
                }
            } else if queue_if_satisfied(view, store, entity) {
                updates.queued += 1;
            }
            Ok(())
        })?;
        Ok(updates)
    }

    /// The record of `id` on `entity` was tombstoned.
    ///
    /// Pending entities are left queued; the drain re-checks them.
    pub fn component_removed(
        &mut self,
        entity: Entity,
        id: ComponentTypeId,
    ) -> Result<ViewUpdates, EcmError> {
        let mut updates = ViewUpdates::default();
        self.for_each_view_with(id, |view| {
            if view.has_entity(entity) {
                view.notify_component_removal(entity, id)?;
                updates.demoted += 1;
            } else if view.is_invalid(entity) {
                view.mark_missing(entity, id)?;
            }
            Ok(())
        })?;
        Ok(updates)
    }
}

fn queue_if_satisfied(view: &mut View, store: &ComponentStore, entity: Entity) -> bool {
    !view.has_component_data(entity)
        && !view.has_new_entity(entity)
        && store.has_all_valid_components(entity, view.key().as_slice())
        && view.add_new_entity(entity)
}

/// Materialize queued entities that still satisfy the view.
fn drain_new_entities(view: &mut View, store: &ComponentStore) -> usize {
    let pending = view.take_new_entities();
    if pending.is_empty() {
        return 0;
    }

    let mut drained = 0;
    for entity in pending {
        match store.valid_slots(entity, view.key().as_slice()) {
            Some(slots) => {
                view.add_entity(entity, slots);
                drained += 1;
            }
            None => {
                tracing::debug!(%entity, view = %view.key(), "dropped stale pending entity");
            }
        }
    }
    tracing::debug!(view = %view.key(), drained, "drained pending entities");
    drained
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::define_component;
    use crate::ecs::Component;

    #[derive(Debug)]
    struct Red(u8);
    define_component!(Red, 600, "Red");

    #[derive(Debug)]
    struct Blue(u8);
    define_component!(Blue, 601, "Blue");

    fn key(ids: &[ComponentTypeId]) -> ViewKey {
        ViewKey::new(ids.to_vec()).unwrap()
    }

    #[test]
    fn build_scans_existing_entities_once() {
        let mut store = ComponentStore::new();
        let a = store.create_entity();
        let b = store.create_entity();
        store.add_component(a, Red(1)).unwrap();
        store.add_component(a, Blue(1)).unwrap();
        store.add_component(b, Red(2)).unwrap();

        let mut cache = ViewCache::new();
        let (view, lookup) = cache.find_view(&key(&[600, 601]), &store);
        assert_eq!(lookup, ViewLookup::Created { populated: 1 });
        assert!(view.has_entity(a));
        assert!(!view.has_entity(b));

        let (_, lookup) = cache.find_view(&key(&[600, 601]), &store);
        assert_eq!(lookup, ViewLookup::Reused { drained: 0 });
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn inserted_components_queue_then_drain() {
        let mut store = ComponentStore::new();
        let mut cache = ViewCache::new();
        let k = key(&[600, 601]);
        cache.find_view(&k, &store);

        let e = store.create_entity();
        store.add_component(e, Red(1)).unwrap();
        let updates = cache.component_inserted(&store, e, Red::ID).unwrap();
        assert_eq!(updates.queued, 0);

        store.add_component(e, Blue(1)).unwrap();
        let updates = cache.component_inserted(&store, e, Blue::ID).unwrap();
        assert_eq!(updates.queued, 1);
        assert!(cache.get(&k).unwrap().has_new_entity(e));
        assert!(!cache.get(&k).unwrap().has_entity(e));

        let (view, lookup) = cache.find_view(&k, &store);
        assert_eq!(lookup, ViewLookup::Reused { drained: 1 });
        assert!(view.has_entity(e));
        assert!(view.new_entities().is_empty());
    }

    #[test]
    fn stale_pending_entities_are_dropped_on_drain() {
        let mut store = ComponentStore::new();
        let mut cache = ViewCache::new();
        let k = key(&[600]);
        cache.find_view(&k, &store);

        let e = store.create_entity();
        store.add_component(e, Red(1)).unwrap();
        cache.component_inserted(&store, e, Red::ID).unwrap();
        store.remove_component::<Red>(e).unwrap();
        cache.component_removed(e, Red::ID).unwrap();

        let (view, lookup) = cache.find_view(&k, &store);
        assert_eq!(lookup, ViewLookup::Reused { drained: 0 });
        assert!(!view.has_entity(e));
        assert!(!view.has_component_data(e));

        store.add_component(e, Red(2)).unwrap();
        let updates = cache.component_revived(&store, e, Red::ID).unwrap();
        assert_eq!(updates.queued, 1);
        let (view, _) = cache.find_view(&k, &store);
        assert!(view.has_entity(e));
    }

    #[test]
    fn removal_and_revival_route_to_interested_views() {
        let mut store = ComponentStore::new();
        let e = store.create_entity();
        store.add_component(e, Red(1)).unwrap();
        store.add_component(e, Blue(1)).unwrap();

        let mut cache = ViewCache::new();
        let both = key(&[600, 601]);
        let blue = key(&[601]);
        cache.find_view(&both, &store);
        cache.find_view(&blue, &store);

        store.remove_component::<Red>(e).unwrap();
        let updates = cache.component_removed(e, Red::ID).unwrap();
        assert_eq!(updates.demoted, 1);
        assert!(cache.get(&both).unwrap().is_invalid(e));
        assert!(cache.get(&blue).unwrap().has_entity(e));

        store.add_component(e, Red(5)).unwrap();
        let updates = cache.component_revived(&store, e, Red::ID).unwrap();
        assert_eq!(updates.promoted, 1);
        assert!(cache.get(&both).unwrap().has_entity(e));
        assert_eq!(store.component::<Red>(e).map(|red| red.0), Some(5));
    }

    #[test]
    fn removal_reaches_only_views_requiring_the_type() {
        let mut store = ComponentStore::new();
        let e = store.create_entity();
        store.add_component(e, Red(1)).unwrap();
        store.add_component(e, Blue(3)).unwrap();

        let mut cache = ViewCache::new();
        for k in [key(&[600]), key(&[601]), key(&[600, 601]), key(&[601, 600])] {
            cache.find_view(&k, &store);
        }

        store.remove_component::<Blue>(e).unwrap();
        let updates = cache.component_removed(e, Blue::ID).unwrap();
        assert_eq!(updates.demoted, 3);

        let demoted = cache.iter().filter(|view| view.is_invalid(e)).count();
        let untouched: Vec<_> = cache
            .iter()
            .filter(|view| view.has_entity(e))
            .map(|view| view.key().clone())
            .collect();
        assert_eq!(demoted, 3);
        assert_eq!(untouched, vec![key(&[600])]);

        store.add_component(e, Blue(4)).unwrap();
        cache.component_revived(&store, e, Blue::ID).unwrap();
        assert!(cache.iter().all(|view| view.has_entity(e)));
        assert_eq!(store.component::<Blue>(e).map(|blue| blue.0), Some(4));
    }
}
