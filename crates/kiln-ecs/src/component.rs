//! Component type registration and type-erased storage.
//!
//! Every component type attached to an entity is known to the
//! [`ComponentRegistry`], which hands out a [`ComponentTypeId`] and keeps a
//! human-readable name for journals and error messages. Types are registered
//! automatically the first time they are attached; registering explicitly
//! just chooses a friendlier name.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use crate::entity::EntityId;
use crate::EcsError;

// ---------------------------------------------------------------------------
// ComponentTypeId
// ---------------------------------------------------------------------------

/// Opaque, lightweight identifier for a registered component type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentTypeId(pub(crate) u32);

impl fmt::Debug for ComponentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentTypeId({})", self.0)
    }
}

// ---------------------------------------------------------------------------
// ComponentInfo
// ---------------------------------------------------------------------------

/// Metadata about a registered component type.
#[derive(Debug, Clone)]
pub struct ComponentInfo {
    /// Unique ID assigned at registration time.
    pub id: ComponentTypeId,
    /// Human-readable name.
    pub name: String,
    /// Rust `TypeId` for runtime type checking.
    pub type_id: TypeId,
}

// ---------------------------------------------------------------------------
// ComponentRegistry
// ---------------------------------------------------------------------------

/// Registry mapping Rust types to [`ComponentTypeId`]s and their metadata.
///
/// A type can only be registered once; subsequent registrations of the same
/// Rust `TypeId` return the existing [`ComponentTypeId`].
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    by_type: HashMap<TypeId, ComponentTypeId>,
    by_name: HashMap<String, ComponentTypeId>,
    /// Indexed by ComponentTypeId.0.
    infos: Vec<ComponentInfo>,
}

impl ComponentRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component type under the given `name`.
    ///
    /// If the type has already been registered, the existing
    /// [`ComponentTypeId`] is returned and `name` is ignored.
    ///
    /// # Errors
    ///
    /// [`EcsError::DuplicateComponentName`] if `name` already belongs to a
    /// different type.
    pub fn register<T: 'static>(&mut self, name: &str) -> Result<ComponentTypeId, EcsError> {
        let rust_type_id = TypeId::of::<T>();
        if let Some(&existing) = self.by_type.get(&rust_type_id) {
            return Ok(existing);
        }
        if self.by_name.contains_key(name) {
            return Err(EcsError::DuplicateComponentName {
                name: name.to_owned(),
            });
        }

        let id = ComponentTypeId(self.infos.len() as u32);
        self.infos.push(ComponentInfo {
            id,
            name: name.to_owned(),
            type_id: rust_type_id,
        });
        self.by_type.insert(rust_type_id, id);
        self.by_name.insert(name.to_owned(), id);
        Ok(id)
    }

    /// Return the id for `T`, registering it under its Rust type name if it
    /// has not been seen before.
    pub fn ensure<T: 'static>(&mut self) -> ComponentTypeId {
        if let Some(id) = self.lookup::<T>() {
            return id;
        }
        let id = ComponentTypeId(self.infos.len() as u32);
        let name = std::any::type_name::<T>().to_owned();
        self.infos.push(ComponentInfo {
            id,
            name: name.clone(),
            type_id: TypeId::of::<T>(),
        });
        self.by_type.insert(TypeId::of::<T>(), id);
        self.by_name.entry(name).or_insert(id);
        id
    }

    /// Look up a component type by its Rust `TypeId`.
    pub fn lookup<T: 'static>(&self) -> Option<ComponentTypeId> {
        self.by_type.get(&TypeId::of::<T>()).copied()
    }

    /// Look up a component type by its registered name.
    pub fn lookup_by_name(&self, name: &str) -> Option<ComponentTypeId> {
        self.by_name.get(name).copied()
    }

    /// Get the [`ComponentInfo`] for a registered component type ID.
    pub fn get_info(&self, id: ComponentTypeId) -> Option<&ComponentInfo> {
        self.infos.get(id.0 as usize)
    }

    /// Name of a registered component type, or `"<unknown>"`.
    pub fn name_of(&self, id: ComponentTypeId) -> &str {
        self.get_info(id).map_or("<unknown>", |info| info.name.as_str())
    }

    /// Total number of registered component types.
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    /// Whether any component types have been registered.
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }
}

// ---------------------------------------------------------------------------
// ComponentColumn
// ---------------------------------------------------------------------------

/// Type-erased storage for every value of one component type.
#[derive(Default)]
pub(crate) struct ComponentColumn {
    values: HashMap<EntityId, Box<dyn Any>>,
}

impl ComponentColumn {
    /// Insert or overwrite. Returns `true` when the entity had no value yet.
    pub(crate) fn insert<T: 'static>(&mut self, entity: EntityId, value: T) -> bool {
        self.values.insert(entity, Box::new(value)).is_none()
    }

    pub(crate) fn get<T: 'static>(&self, entity: EntityId) -> Option<&T> {
        self.values.get(&entity)?.downcast_ref::<T>()
    }

    pub(crate) fn get_mut<T: 'static>(&mut self, entity: EntityId) -> Option<&mut T> {
        self.values.get_mut(&entity)?.downcast_mut::<T>()
    }

    pub(crate) fn contains(&self, entity: EntityId) -> bool {
        self.values.contains_key(&entity)
    }

    pub(crate) fn remove(&mut self, entity: EntityId) -> bool {
        self.values.remove(&entity).is_some()
    }
}

impl fmt::Debug for ComponentColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentColumn")
            .field("len", &self.values.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Pos {
        x: f32,
        y: f32,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Vel {
        dx: f32,
        dy: f32,
    }

    #[test]
    fn register_and_lookup() {
        let mut reg = ComponentRegistry::new();
        let id = reg.register::<Pos>("position").unwrap();
        assert_eq!(reg.lookup::<Pos>(), Some(id));
        assert_eq!(reg.lookup_by_name("position"), Some(id));
        assert_eq!(reg.name_of(id), "position");
    }

    #[test]
    fn same_type_same_id() {
        let mut reg = ComponentRegistry::new();
        let id1 = reg.register::<Pos>("position").unwrap();
        let id2 = reg.register::<Pos>("position_again").unwrap();
        assert_eq!(id1, id2);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn name_collision_is_an_error() {
        let mut reg = ComponentRegistry::new();
        reg.register::<Pos>("motion").unwrap();
        let err = reg.register::<Vel>("motion").unwrap_err();
        assert!(matches!(err, EcsError::DuplicateComponentName { .. }));
    }

    #[test]
    fn ensure_uses_rust_type_name() {
        let mut reg = ComponentRegistry::new();
        let id = reg.ensure::<Vel>();
        assert!(reg.name_of(id).ends_with("Vel"));
        assert_eq!(reg.ensure::<Vel>(), id);
    }

    #[test]
    fn column_insert_overwrite_and_downcast() {
        let mut column = ComponentColumn::default();
        let e = EntityId::new(0, 0);
        assert!(column.insert(e, Pos { x: 1.0, y: 2.0 }));
        assert!(!column.insert(e, Pos { x: 3.0, y: 4.0 }));
        assert_eq!(column.get::<Pos>(e), Some(&Pos { x: 3.0, y: 4.0 }));
        assert_eq!(column.get::<Vel>(e), None);
        assert!(column.remove(e));
        assert!(!column.contains(e));
    }
}
