//! The [`EntityTemplate`] and [`Behavior`] abstractions.
//!
//! A template is a named recipe: given a write handle on a fresh entity and a
//! parameter view, it reads the keys it knows about and attaches the
//! corresponding components. Each template owns a *defaults* bag. Reading the
//! defaults is free; editing them requires exclusive access through
//! [`EntityTemplate::editable_defaults`] and changes every later
//! instantiation of that template. Once a template is shared behind an `Rc`
//! (for example stored as another template's parameter) its defaults are
//! frozen.

use kiln_ecs::prelude::{EcsError, EntityId, EntityMut, World};

use crate::bag::{ParameterBag, Parameters};
use crate::factory::FactoryError;
use crate::param::{ParamError, ParamValue};

// ---------------------------------------------------------------------------
// TemplateError
// ---------------------------------------------------------------------------

/// Errors raised while applying a template or running a behaviour.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// A parameter was missing or had the wrong shape.
    #[error(transparent)]
    Param(#[from] ParamError),

    /// The world rejected a component operation.
    #[error(transparent)]
    Ecs(#[from] EcsError),

    /// A nested instantiation failed.
    #[error("nested instantiation failed: {0}")]
    Nested(#[source] Box<FactoryError>),

    /// Template- or behaviour-specific failure.
    #[error("{0}")]
    Custom(String),
}

impl TemplateError {
    pub fn custom(message: impl Into<String>) -> Self {
        TemplateError::Custom(message.into())
    }
}

impl From<FactoryError> for TemplateError {
    fn from(err: FactoryError) -> Self {
        TemplateError::Nested(Box::new(err))
    }
}

/// Last path segment of a type name.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

// ---------------------------------------------------------------------------
// EntityTemplate
// ---------------------------------------------------------------------------

/// A reusable recipe that composes components onto an entity.
///
/// Applying a template must not change its defaults; any scratch state used
/// during [`apply_with`](Self::apply_with) belongs to that call.
///
/// `apply_with` only sees the entity being composed, so it cannot instantiate
/// other entities. Spawning belongs in a [`Behavior`], which runs after
/// publish with the whole world at hand.
pub trait EntityTemplate {
    /// Name used in logs and errors. Defaults to the type name.
    fn name(&self) -> &'static str {
        short_type_name::<Self>()
    }

    /// The template's own defaults bag, by reference.
    fn defaults(&self) -> &ParameterBag;

    /// Mutable access to the defaults. Edits affect every future
    /// instantiation of this template.
    fn editable_defaults(&mut self) -> &mut ParameterBag;

    /// Apply using the template's defaults as the only parameter source.
    fn apply(&self, entity: &mut EntityMut<'_>) -> Result<(), TemplateError> {
        self.apply_with(entity, self.defaults())
    }

    /// Read this template's keys from `params` and attach components.
    fn apply_with(
        &self,
        entity: &mut EntityMut<'_>,
        params: &dyn Parameters,
    ) -> Result<(), TemplateError>;
}

/// Builder helpers for owned templates.
pub trait TemplateExt: EntityTemplate + Sized {
    /// Set a default and return the template, for level-specific variants of
    /// a stock template.
    fn with_default(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.editable_defaults().put(key, value);
        self
    }
}

impl<T: EntityTemplate> TemplateExt for T {}

// ---------------------------------------------------------------------------
// Behavior
// ---------------------------------------------------------------------------

/// A scripted behaviour attached to an entity and run by the script system.
pub trait Behavior {
    fn name(&self) -> &'static str {
        short_type_name::<Self>()
    }

    /// Run once for `entity`. The behaviour may read and mutate the world,
    /// including instantiating new entities.
    fn update(&self, world: &mut World, entity: EntityId) -> Result<(), TemplateError>;
}

impl<F> Behavior for F
where
    F: Fn(&mut World, EntityId) -> Result<(), TemplateError>,
{
    fn name(&self) -> &'static str {
        "closure"
    }

    fn update(&self, world: &mut World, entity: EntityId) -> Result<(), TemplateError> {
        self(world, entity)
    }
}

/// A behaviour that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBehavior;

impl Behavior for NoopBehavior {
    fn update(&self, _world: &mut World, _entity: EntityId) -> Result<(), TemplateError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
