//! Kiln Template -- data-driven entity composition on top of [`kiln_ecs`].
//!
//! Entities are built from [`EntityTemplate`](template::EntityTemplate)s: named
//! recipes that read a [`ParameterBag`](bag::ParameterBag) and attach
//! components. Callers may pass their own bag to
//! [`EntityFactory::instantiate_with`](factory::EntityFactory::instantiate_with);
//! it is layered over the template's defaults with an
//! [`OverlayBag`](overlay::OverlayBag) for the duration of the call.
//!
//! # Quick Start
//!
//! ```
//! use kiln_template::prelude::*;
//!
//! let mut world = World::new();
//! let bullet = ProjectileTemplate::new();
//!
//! let caller = ParameterBag::new().with(keys::DAMAGE, 560.0);
//! let entity = EntityFactory::new(&mut world)
//!     .instantiate_with(&bullet, &caller)
//!     .unwrap();
//!
//! let damage = world.get_component::<DamageComponent>(entity).unwrap();
//! assert_eq!(damage.damage(), 560.0);
//! // `position` was not supplied, so the template's default was used.
//! let spatial = world.get_component::<SpatialComponent>(entity).unwrap();
//! assert_eq!(spatial.position(), Vector2::ZERO);
//! ```
//!
//! # Threading
//!
//! Everything here is single-threaded: bags hold `Rc` references and the
//! factory borrows the world mutably. Use one world and factory per thread.

#![deny(unsafe_code)]

pub mod bag;
pub mod components;
pub mod factory;
pub mod overlay;
pub mod param;
pub mod prefabs;
pub mod template;
pub mod value;

/// Re-export the ECS crate for convenience.
pub use kiln_ecs;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use kiln_ecs::prelude::*;

    pub use crate::bag::{ParameterBag, Parameters, ParametersExt, ParametersMut};
    pub use crate::components::{
        run_scripts, DamageComponent, HealthComponent, ScriptComponent, SpatialComponent,
        WeaponComponent,
    };
    pub use crate::factory::{EntityFactory, FactoryError};
    pub use crate::overlay::{OverlayBag, OverlayBagMut};
    pub use crate::param::{FromParam, ParamError, ParamValue};
    pub use crate::prefabs::{keys, ActorTemplate, ProjectileTemplate, WeaponTemplate};
    pub use crate::template::{Behavior, EntityTemplate, NoopBehavior, TemplateError, TemplateExt};
    pub use crate::value::{Container, Vector2};
}
