//! Ordered record of entity lifecycle events.
//!
//! When enabled through [`WorldConfig::journal`](crate::world::WorldConfig),
//! the [`World`](crate::world::World) appends one [`WorldEvent`] per
//! allocation, component attach, publish, and despawn. Tests use it to check
//! that construction follows create, then attach, then publish.
//!
//! # Example
//!
//! ```
//! use kiln_ecs::prelude::*;
//!
//! let mut world = World::with_config(WorldConfig { journal: true, ..Default::default() });
//! let e = world.create_entity().unwrap();
//! world.add_component(e, 7u32).unwrap();
//! world.refresh(e).unwrap();
//!
//! let journal = world.journal().unwrap();
//! assert_eq!(journal.events_for(e).count(), 3);
//! assert!(matches!(journal.all_events().last(), Some(WorldEvent::Refreshed { .. })));
//! ```

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

// ---------------------------------------------------------------------------
// WorldEvent
// ---------------------------------------------------------------------------

/// A single lifecycle event recorded by the world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorldEvent {
    /// A fresh, unpublished entity was allocated.
    Created {
        /// The new entity.
        entity: EntityId,
    },
    /// A component was attached (or overwritten) on an entity.
    ComponentAdded {
        /// The entity receiving the component.
        entity: EntityId,
        /// Registered name of the component type.
        component: String,
    },
    /// The entity's component signature was published to the indices.
    Refreshed {
        /// The published entity.
        entity: EntityId,
    },
    /// The entity and all its components were removed.
    Despawned {
        /// The removed entity.
        entity: EntityId,
    },
}

impl WorldEvent {
    /// The entity this event concerns.
    pub fn entity(&self) -> EntityId {
        match self {
            WorldEvent::Created { entity }
            | WorldEvent::ComponentAdded { entity, .. }
            | WorldEvent::Refreshed { entity }
            | WorldEvent::Despawned { entity } => *entity,
        }
    }
}

// ---------------------------------------------------------------------------
// WorldJournal
// ---------------------------------------------------------------------------

/// Append-only log of [`WorldEvent`]s in the order they happened.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldJournal {
    events: Vec<WorldEvent>,
}

impl WorldJournal {
    /// Create a new, empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    pub fn record(&mut self, event: WorldEvent) {
        self.events.push(event);
    }

    /// Returns the number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if no events have been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// All recorded events in insertion order.
    pub fn all_events(&self) -> &[WorldEvent] {
        &self.events
    }

    /// Events concerning a single entity, in insertion order.
    pub fn events_for(&self, entity: EntityId) -> impl Iterator<Item = &WorldEvent> {
        self.events.iter().filter(move |e| e.entity() == entity)
    }

    /// Remove all recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Take every recorded event, leaving the journal empty.
    pub fn drain(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.events)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_for_filters_by_entity() {
        let a = EntityId::new(0, 0);
        let b = EntityId::new(1, 0);
        let mut journal = WorldJournal::new();
        journal.record(WorldEvent::Created { entity: a });
        journal.record(WorldEvent::Created { entity: b });
        journal.record(WorldEvent::Refreshed { entity: a });

        let for_a: Vec<_> = journal.events_for(a).cloned().collect();
        assert_eq!(
            for_a,
            vec![
                WorldEvent::Created { entity: a },
                WorldEvent::Refreshed { entity: a }
            ]
        );
        assert_eq!(journal.len(), 3);
    }

    #[test]
    fn drain_empties_the_journal() {
        let mut journal = WorldJournal::new();
        journal.record(WorldEvent::Despawned {
            entity: EntityId::new(3, 1),
        });
        let drained = journal.drain();
        assert_eq!(drained.len(), 1);
        assert!(journal.is_empty());
    }
}
