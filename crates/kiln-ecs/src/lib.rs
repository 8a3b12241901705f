//! Kiln ECS -- minimal host entity system with an explicit publish step.
//!
//! Entities are minted by the [`World`](world::World) as generational
//! [`EntityId`](entity::EntityId)s, composed by attaching components, and
//! then *published* with a refresh. Only published entities appear in the
//! per-component indices that systems iterate, so an entity is never seen
//! half-built.
//!
//! # Quick Start
//!
//! ```
//! use kiln_ecs::prelude::*;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Position { x: f32, y: f32 }
//!
//! let mut world = World::new();
//! world.register_component::<Position>("position").unwrap();
//!
//! let entity = world.create_entity().unwrap();
//! world.add_component(entity, Position { x: 0.0, y: 0.0 }).unwrap();
//! assert!(world.entities_with::<Position>().is_empty());
//!
//! world.refresh(entity).unwrap();
//! assert_eq!(world.entities_with::<Position>(), vec![entity]);
//! assert_eq!(world.get_component::<Position>(entity), Some(&Position { x: 0.0, y: 0.0 }));
//! ```

#![deny(unsafe_code)]

pub mod component;
pub mod entity;
pub mod journal;
pub mod world;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by world operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EcsError {
    /// The entity does not exist (stale generation or never allocated).
    #[error("entity {0:?} does not exist (stale or never allocated)")]
    StaleEntity(entity::EntityId),

    /// The world refused to allocate another entity.
    #[error("entity capacity exhausted: at most {limit} entities may be alive")]
    CapacityExhausted {
        /// The configured limit.
        limit: usize,
    },

    /// A component name was registered twice for different types.
    #[error("component name '{name}' is already registered for a different type")]
    DuplicateComponentName {
        /// The contested name.
        name: String,
    },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::component::{ComponentInfo, ComponentRegistry, ComponentTypeId};
    pub use crate::entity::{EntityAllocator, EntityId};
    pub use crate::journal::{WorldEvent, WorldJournal};
    pub use crate::world::{EntityMut, World, WorldConfig};
    pub use crate::EcsError;
}
