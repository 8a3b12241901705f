//! The [`World`] is the top-level container. It owns the entity allocator,
//! the component registry, component storage, and the published per-component
//! indices that systems iterate.
//!
//! Entities go through two phases. After [`World::create_entity`] an entity is
//! *pending*: components can be attached and read back, but it is invisible
//! to [`World::entities_with`]. [`World::refresh`] *publishes* it, snapshotting
//! its component signature into the indices. Components attached after a
//! refresh stay out of the indices until the next refresh.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::component::{ComponentColumn, ComponentRegistry, ComponentTypeId};
use crate::entity::{EntityAllocator, EntityId};
use crate::journal::{WorldEvent, WorldJournal};
use crate::EcsError;

// ---------------------------------------------------------------------------
// WorldConfig
// ---------------------------------------------------------------------------

/// Construction-time settings for a [`World`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Maximum number of simultaneously alive entities. `None` is unbounded.
    pub max_entities: Option<usize>,
    /// Record a [`WorldJournal`] of lifecycle events.
    pub journal: bool,
}

// ---------------------------------------------------------------------------
// EntityRecord
// ---------------------------------------------------------------------------

/// Per-entity bookkeeping: the attached component set and the signature that
/// was last published, if any.
#[derive(Debug, Default)]
struct EntityRecord {
    components: BTreeSet<ComponentTypeId>,
    published: Option<Vec<ComponentTypeId>>,
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// The host entity container.
pub struct World {
    allocator: EntityAllocator,
    registry: ComponentRegistry,
    /// Indexed by `ComponentTypeId.0`.
    columns: Vec<ComponentColumn>,
    entities: HashMap<EntityId, EntityRecord>,
    /// Published entities per component type.
    indices: HashMap<ComponentTypeId, BTreeSet<EntityId>>,
    journal: Option<WorldJournal>,
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("entity_count", &self.entities.len())
            .field("published_count", &self.published_count())
            .field("component_types", &self.registry.len())
            .finish()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Create a new, empty, unbounded world without a journal.
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Create a world from explicit settings.
    pub fn with_config(config: WorldConfig) -> Self {
        Self {
            allocator: EntityAllocator::with_capacity_limit(config.max_entities),
            registry: ComponentRegistry::new(),
            columns: Vec::new(),
            entities: HashMap::new(),
            indices: HashMap::new(),
            journal: config.journal.then(WorldJournal::new),
        }
    }

    /// Read-only access to the component registry.
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Register a component type under a friendly name.
    ///
    /// Registration is optional; unregistered types are registered under
    /// their Rust type name the first time they are attached.
    pub fn register_component<T: 'static>(
        &mut self,
        name: &str,
    ) -> Result<ComponentTypeId, EcsError> {
        self.registry.register::<T>(name)
    }

    /// The lifecycle journal, if enabled.
    pub fn journal(&self) -> Option<&WorldJournal> {
        self.journal.as_ref()
    }

    /// Mutable access to the lifecycle journal, if enabled.
    pub fn journal_mut(&mut self) -> Option<&mut WorldJournal> {
        self.journal.as_mut()
    }

    fn record(&mut self, event: WorldEvent) {
        if let Some(journal) = self.journal.as_mut() {
            journal.record(event);
        }
    }

    fn column_mut(&mut self, id: ComponentTypeId) -> &mut ComponentColumn {
        let idx = id.0 as usize;
        if idx >= self.columns.len() {
            self.columns.resize_with(idx + 1, ComponentColumn::default);
        }
        &mut self.columns[idx]
    }

    fn live_record(&mut self, entity: EntityId) -> Result<&mut EntityRecord, EcsError> {
        if !self.allocator.is_alive(entity) {
            return Err(EcsError::StaleEntity(entity));
        }
        self.entities
            .get_mut(&entity)
            .ok_or(EcsError::StaleEntity(entity))
    }

    // -- entity lifecycle ---------------------------------------------------

    /// Allocate a fresh, unpublished entity.
    ///
    /// # Errors
    ///
    /// [`EcsError::CapacityExhausted`] when the configured entity limit has
    /// been reached.
    pub fn create_entity(&mut self) -> Result<EntityId, EcsError> {
        let entity = self.allocator.allocate()?;
        self.entities.insert(entity, EntityRecord::default());
        trace!(%entity, "entity created");
        self.record(WorldEvent::Created { entity });
        Ok(entity)
    }

    /// Borrow a write handle on a live entity.
    pub fn entity_mut(&mut self, entity: EntityId) -> Result<EntityMut<'_>, EcsError> {
        self.live_record(entity)?;
        Ok(EntityMut {
            world: self,
            entity,
        })
    }

    /// Publish an entity: recompute its signature and its index membership.
    ///
    /// Refreshing an already-published entity republishes its current
    /// component set.
    pub fn refresh(&mut self, entity: EntityId) -> Result<(), EcsError> {
        let record = self.live_record(entity)?;
        let signature: Vec<ComponentTypeId> = record.components.iter().copied().collect();
        let previous = record.published.replace(signature.clone());

        for tid in previous.into_iter().flatten() {
            if let Some(index) = self.indices.get_mut(&tid) {
                index.remove(&entity);
            }
        }
        for tid in &signature {
            self.indices.entry(*tid).or_default().insert(entity);
        }

        trace!(%entity, components = signature.len(), "entity refreshed");
        self.record(WorldEvent::Refreshed { entity });
        Ok(())
    }

    /// Remove an entity and all of its components, recycling its index.
    pub fn despawn(&mut self, entity: EntityId) -> Result<(), EcsError> {
        self.live_record(entity)?;
        let record = self
            .entities
            .remove(&entity)
            .ok_or(EcsError::StaleEntity(entity))?;

        for tid in &record.components {
            self.column_mut(*tid).remove(entity);
        }
        for tid in record.published.iter().flatten() {
            if let Some(index) = self.indices.get_mut(tid) {
                index.remove(&entity);
            }
        }
        self.allocator.deallocate(entity);

        trace!(%entity, "entity despawned");
        self.record(WorldEvent::Despawned { entity });
        Ok(())
    }

    /// Entities that were created but never published, sorted by id.
    ///
    /// These are left behind when construction fails partway.
    pub fn orphans(&self) -> Vec<EntityId> {
        let mut orphans: Vec<EntityId> = self
            .entities
            .iter()
            .filter(|(_, record)| record.published.is_none())
            .map(|(entity, _)| *entity)
            .collect();
        orphans.sort();
        orphans
    }

    /// Despawn every orphan. Returns how many were removed.
    pub fn reap_orphans(&mut self) -> usize {
        let orphans = self.orphans();
        for entity in &orphans {
            // Orphans come from the live entity table, so despawn cannot fail.
            let _ = self.despawn(*entity);
        }
        if !orphans.is_empty() {
            debug!(count = orphans.len(), "reaped orphaned entities");
        }
        orphans.len()
    }

    // -- component access ---------------------------------------------------

    /// Attach a component to a live entity, overwriting any previous value of
    /// the same type.
    pub fn add_component<T: 'static>(
        &mut self,
        entity: EntityId,
        value: T,
    ) -> Result<(), EcsError> {
        self.live_record(entity)?;
        let tid = self.registry.ensure::<T>();
        self.column_mut(tid).insert(entity, value);
        if let Some(record) = self.entities.get_mut(&entity) {
            record.components.insert(tid);
        }

        if self.journal.is_some() {
            let component = self.registry.name_of(tid).to_owned();
            self.record(WorldEvent::ComponentAdded { entity, component });
        }
        Ok(())
    }

    /// Detach a component. Returns whether the entity had it.
    ///
    /// Like attaching, detaching only reaches the indices on the next
    /// [`refresh`](Self::refresh).
    pub fn remove_component<T: 'static>(&mut self, entity: EntityId) -> Result<bool, EcsError> {
        self.live_record(entity)?;
        let Some(tid) = self.registry.lookup::<T>() else {
            return Ok(false);
        };
        if let Some(record) = self.entities.get_mut(&entity) {
            record.components.remove(&tid);
        }
        Ok(self.column_mut(tid).remove(entity))
    }

    /// Get an immutable reference to a component on an entity.
    pub fn get_component<T: 'static>(&self, entity: EntityId) -> Option<&T> {
        if !self.allocator.is_alive(entity) {
            return None;
        }
        let tid = self.registry.lookup::<T>()?;
        self.columns.get(tid.0 as usize)?.get::<T>(entity)
    }

    /// Get a mutable reference to a component on an entity.
    pub fn get_component_mut<T: 'static>(&mut self, entity: EntityId) -> Option<&mut T> {
        if !self.allocator.is_alive(entity) {
            return None;
        }
        let tid = self.registry.lookup::<T>()?;
        self.columns.get_mut(tid.0 as usize)?.get_mut::<T>(entity)
    }

    /// Check whether an entity has a given component type.
    pub fn has_component<T: 'static>(&self, entity: EntityId) -> bool {
        let Some(tid) = self.registry.lookup::<T>() else {
            return false;
        };
        self.allocator.is_alive(entity)
            && self
                .columns
                .get(tid.0 as usize)
                .is_some_and(|column| column.contains(entity))
    }

    // -- indices --------------------------------------------------------------

    /// Published entities whose signature contains `T`, sorted by id.
    pub fn entities_with<T: 'static>(&self) -> Vec<EntityId> {
        self.registry
            .lookup::<T>()
            .and_then(|tid| self.indices.get(&tid))
            .map(|index| index.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Returns `true` if the entity is alive.
    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.allocator.is_alive(entity)
    }

    /// Returns `true` if the entity is alive and has been refreshed at least
    /// once.
    pub fn is_published(&self, entity: EntityId) -> bool {
        self.allocator.is_alive(entity)
            && self
                .entities
                .get(&entity)
                .is_some_and(|record| record.published.is_some())
    }

    /// Total number of alive entities, published or not.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Number of alive entities that have been published.
    pub fn published_count(&self) -> usize {
        self.entities
            .values()
            .filter(|record| record.published.is_some())
            .count()
    }
}

// ---------------------------------------------------------------------------
// EntityMut
// ---------------------------------------------------------------------------

/// Write handle on a single entity, used while composing it.
///
/// Holds the world mutably for its lifetime, so nothing else can observe the
/// entity half-built.
pub struct EntityMut<'w> {
    world: &'w mut World,
    entity: EntityId,
}

impl std::fmt::Debug for EntityMut<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityMut").field("entity", &self.entity).finish()
    }
}

impl EntityMut<'_> {
    /// The entity being composed.
    pub fn id(&self) -> EntityId {
        self.entity
    }

    /// Read-only access to the owning world.
    pub fn world(&self) -> &World {
        self.world
    }

    /// Attach a component, overwriting any previous value of the same type.
    pub fn add_component<T: 'static>(&mut self, value: T) -> Result<(), EcsError> {
        self.world.add_component(self.entity, value)
    }

    /// Read a component attached to this entity.
    pub fn get_component<T: 'static>(&self) -> Option<&T> {
        self.world.get_component::<T>(self.entity)
    }

    /// Mutably access a component attached to this entity.
    pub fn get_component_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.world.get_component_mut::<T>(self.entity)
    }

    /// Whether a component of type `T` is attached.
    pub fn has_component<T: 'static>(&self) -> bool {
        self.world.has_component::<T>(self.entity)
    }

    /// Publish this entity. See [`World::refresh`].
    pub fn refresh(&mut self) -> Result<(), EcsError> {
        self.world.refresh(self.entity)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Health(u32);

    #[test]
    fn pending_entity_is_readable_but_not_indexed() {
        let mut world = World::new();
        let e = world.create_entity().unwrap();
        world.add_component(e, Position { x: 1.0, y: 2.0 }).unwrap();

        assert_eq!(
            world.get_component::<Position>(e),
            Some(&Position { x: 1.0, y: 2.0 })
        );
        assert!(world.entities_with::<Position>().is_empty());
        assert!(!world.is_published(e));

        world.refresh(e).unwrap();
        assert_eq!(world.entities_with::<Position>(), vec![e]);
        assert!(world.is_published(e));
    }

    #[test]
    fn components_added_after_refresh_wait_for_next_refresh() {
        let mut world = World::new();
        let e = world.create_entity().unwrap();
        world.add_component(e, Position { x: 0.0, y: 0.0 }).unwrap();
        world.refresh(e).unwrap();

        world.add_component(e, Health(10)).unwrap();
        assert!(world.has_component::<Health>(e));
        assert!(world.entities_with::<Health>().is_empty());

        world.refresh(e).unwrap();
        assert_eq!(world.entities_with::<Health>(), vec![e]);
    }

    #[test]
    fn removed_component_leaves_index_on_refresh() {
        let mut world = World::new();
        let e = world.create_entity().unwrap();
        world.add_component(e, Health(3)).unwrap();
        world.refresh(e).unwrap();

        assert!(world.remove_component::<Health>(e).unwrap());
        assert_eq!(world.entities_with::<Health>(), vec![e]);
        world.refresh(e).unwrap();
        assert!(world.entities_with::<Health>().is_empty());
    }

    #[test]
    fn refresh_with_no_components_still_publishes() {
        let mut world = World::new();
        let e = world.create_entity().unwrap();
        world.refresh(e).unwrap();
        assert!(world.is_published(e));
        assert_eq!(world.published_count(), 1);
    }

    #[test]
    fn add_component_overwrites() {
        let mut world = World::new();
        let e = world.create_entity().unwrap();
        world.add_component(e, Health(1)).unwrap();
        world.add_component(e, Health(2)).unwrap();
        assert_eq!(world.get_component::<Health>(e), Some(&Health(2)));
    }

    #[test]
    fn despawn_removes_components_and_index_entries() {
        let mut world = World::new();
        let e = world.create_entity().unwrap();
        world.add_component(e, Health(5)).unwrap();
        world.refresh(e).unwrap();

        world.despawn(e).unwrap();
        assert!(!world.is_alive(e));
        assert_eq!(world.get_component::<Health>(e), None);
        assert!(world.entities_with::<Health>().is_empty());
        assert!(matches!(world.despawn(e), Err(EcsError::StaleEntity(_))));
    }

    #[test]
    fn stale_handle_cannot_see_recycled_slot() {
        let mut world = World::new();
        let old = world.create_entity().unwrap();
        world.despawn(old).unwrap();
        let new = world.create_entity().unwrap();
        world.add_component(new, Health(9)).unwrap();

        assert_eq!(new.index(), old.index());
        assert_eq!(world.get_component::<Health>(old), None);
        assert!(world.add_component(old, Health(1)).is_err());
    }

    #[test]
    fn orphans_are_listed_and_reaped() {
        let mut world = World::new();
        let published = world.create_entity().unwrap();
        world.refresh(published).unwrap();
        let orphan = world.create_entity().unwrap();
        world.add_component(orphan, Health(1)).unwrap();

        assert_eq!(world.orphans(), vec![orphan]);
        assert_eq!(world.reap_orphans(), 1);
        assert!(world.orphans().is_empty());
        assert!(world.is_alive(published));
        assert!(!world.is_alive(orphan));
    }

    #[test]
    fn capacity_limit_from_config() {
        let mut world = World::with_config(WorldConfig {
            max_entities: Some(1),
            ..Default::default()
        });
        world.create_entity().unwrap();
        assert!(matches!(
            world.create_entity(),
            Err(EcsError::CapacityExhausted { limit: 1 })
        ));
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: WorldConfig = serde_json::from_str(r#"{ "max_entities": 64 }"#).unwrap();
        assert_eq!(config.max_entities, Some(64));
        assert!(!config.journal);
    }

    #[test]
    fn entity_mut_handle_reads_and_writes() {
        let mut world = World::new();
        let e = world.create_entity().unwrap();
        {
            let mut handle = world.entity_mut(e).unwrap();
            handle.add_component(Health(40)).unwrap();
            if let Some(health) = handle.get_component_mut::<Health>() {
                health.0 += 2;
            }
            assert_eq!(handle.get_component::<Health>(), Some(&Health(42)));
            handle.refresh().unwrap();
        }
        assert!(world.is_published(e));
    }

    #[test]
    fn registered_names_appear_in_journal() {
        let mut world = World::with_config(WorldConfig {
            journal: true,
            ..Default::default()
        });
        world.register_component::<Health>("health").unwrap();
        let e = world.create_entity().unwrap();
        world.add_component(e, Health(1)).unwrap();

        let journal = world.journal().unwrap();
        assert_eq!(
            journal.all_events()[1],
            WorldEvent::ComponentAdded {
                entity: e,
                component: "health".to_owned()
            }
        );
    }
}
