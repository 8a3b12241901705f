//! The [`EntityFactory`]: create, apply, publish.
//!
//! Every instantiation runs three steps in a fixed order:
//!
//! 1. ask the world for a fresh, unpublished entity;
//! 2. let the template attach its components;
//! 3. refresh the entity so the world's indices pick it up.
//!
//! If the world refuses to allocate, nothing else happens. If the template
//! fails partway, the entity keeps whatever it already received and is left
//! unpublished; there is no rollback. Such orphans can be listed and removed
//! with [`World::orphans`] and [`World::reap_orphans`].
//!
//! Caller bags are never copied or mutated. When a caller supplies a bag, it
//! is layered over the template's defaults with an [`OverlayBag`] that lives
//! on the stack for the duration of the call.
//!
//! # Reentrancy
//!
//! The factory keeps no per-call state, so nested instantiation is safe
//! wherever a `&mut World` is available. A [`Behavior`](crate::template::Behavior)
//! receives one in `update` and may build its own factory there. A template
//! cannot: [`EntityTemplate::apply_with`] only gets an
//! [`EntityMut`](kiln_ecs::prelude::EntityMut), which hands out `&World`,
//! so instantiating from inside `apply_with` is rejected at compile time.
//!
//! ```compile_fail
//! use kiln_template::prelude::*;
//!
//! struct Nesting {
//!     defaults: ParameterBag,
//! }
//!
//! impl EntityTemplate for Nesting {
//!     fn defaults(&self) -> &ParameterBag {
//!         &self.defaults
//!     }
//!
//!     fn editable_defaults(&mut self) -> &mut ParameterBag {
//!         &mut self.defaults
//!     }
//!
//!     fn apply_with(
//!         &self,
//!         entity: &mut EntityMut<'_>,
//!         _params: &dyn Parameters,
//!     ) -> Result<(), TemplateError> {
//!         EntityFactory::new(entity.world()).instantiate(&ProjectileTemplate::new())?;
//!         Ok(())
//!     }
//! }
//! ```

use kiln_ecs::prelude::{EcsError, EntityId, World};
use tracing::{debug, warn};

use crate::bag::Parameters;
use crate::overlay::OverlayBag;
use crate::template::{EntityTemplate, TemplateError};

// ---------------------------------------------------------------------------
// FactoryError
// ---------------------------------------------------------------------------

/// Errors raised by [`EntityFactory`].
#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    /// The world refused to create an entity. Nothing was published.
    #[error("world refused to allocate an entity: {0}")]
    Allocation(#[source] EcsError),

    /// The template failed while composing `entity`, which is left
    /// unpublished with whatever components it already received.
    #[error("template '{template}' failed while composing entity {entity}: {source}")]
    Apply {
        template: &'static str,
        entity: EntityId,
        #[source]
        source: TemplateError,
    },

    /// The created entity could not be composed or published.
    #[error("failed to publish entity {entity}: {source}")]
    Publish {
        entity: EntityId,
        #[source]
        source: EcsError,
    },
}

impl FactoryError {
    /// The entity left behind by a failed instantiation, if one was created.
    pub fn orphan(&self) -> Option<EntityId> {
        match self {
            FactoryError::Allocation(_) => None,
            FactoryError::Apply { entity, .. } | FactoryError::Publish { entity, .. } => {
                Some(*entity)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// EntityFactory
// ---------------------------------------------------------------------------

/// Builds entities from templates inside a borrowed [`World`].
///
/// The factory is cheap to construct and holds no state besides the world
/// borrow, so build one wherever a `&mut World` is at hand.
#[derive(Debug)]
pub struct EntityFactory<'w> {
    world: &'w mut World,
}

impl<'w> EntityFactory<'w> {
    pub fn new(world: &'w mut World) -> Self {
        Self { world }
    }

    pub fn world(&self) -> &World {
        self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.world
    }

    /// Instantiate `template` using only its defaults.
    pub fn instantiate<T>(&mut self, template: &T) -> Result<EntityId, FactoryError>
    where
        T: EntityTemplate + ?Sized,
    {
        self.instantiate_from(template, template.defaults())
    }

    /// Instantiate `template` with `params` layered over its defaults.
    ///
    /// Keys missing from `params` resolve through the defaults for required
    /// reads. Defaulted reads (`value_or`) see `params` only.
    pub fn instantiate_with<T>(
        &mut self,
        template: &T,
        params: &dyn Parameters,
    ) -> Result<EntityId, FactoryError>
    where
        T: EntityTemplate + ?Sized,
    {
        let overlay = OverlayBag::over(params, template.defaults());
        self.instantiate_from(template, &overlay)
    }

    fn instantiate_from<T>(
        &mut self,
        template: &T,
        params: &dyn Parameters,
    ) -> Result<EntityId, FactoryError>
    where
        T: EntityTemplate + ?Sized,
    {
        let entity = self.world.create_entity().map_err(FactoryError::Allocation)?;
        // The entity exists at this point; losing it before apply is a
        // publish failure, not an allocation one.
        let mut handle = self
            .world
            .entity_mut(entity)
            .map_err(|source| FactoryError::Publish { entity, source })?;

        if let Err(source) = template.apply_with(&mut handle, params) {
            warn!(
                template = template.name(),
                %entity,
                error = %source,
                "template failed; entity left unpublished"
            );
            return Err(FactoryError::Apply {
                template: template.name(),
                entity,
                source,
            });
        }

        handle
            .refresh()
            .map_err(|source| FactoryError::Publish { entity, source })?;
        debug!(template = template.name(), %entity, "entity instantiated");
        Ok(entity)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
