//! Stock templates: an actor, a weapon, and the projectile a weapon fires.
//!
//! Value-shaped parameters (scalars, vectors, the health pair) are copied
//! into the components they configure, so later edits to a bag never reach
//! an entity. Reference-shaped parameters (the weapon's script and bullet
//! template) are installed as the same `Rc` the bag holds.

use std::rc::Rc;

use kiln_ecs::prelude::EntityMut;

use crate::bag::{ParameterBag, Parameters, ParametersExt};
use crate::components::{
    DamageComponent, HealthComponent, ScriptComponent, SpatialComponent, WeaponComponent,
};
use crate::param::ParamValue;
use crate::template::{Behavior, EntityTemplate, NoopBehavior, TemplateError};
use crate::value::{Container, Vector2};

/// Parameter keys read by the stock templates.
pub mod keys {
    pub const X: &str = "x";
    pub const Y: &str = "y";
    pub const HEALTH: &str = "health";
    pub const DAMAGE: &str = "damage";
    pub const BULLET_TEMPLATE: &str = "bulletTemplate";
    pub const SCRIPT: &str = "script";
    pub const POSITION: &str = "position";
}

// ---------------------------------------------------------------------------
// ActorTemplate
// ---------------------------------------------------------------------------

/// A positioned entity with health.
///
/// Reads `x` and `y` with a hard-coded default of `0` and a required
/// `health` container. Stock defaults: `health = (100, 100)`.
#[derive(Debug, Clone)]
pub struct ActorTemplate {
    defaults: ParameterBag,
}

impl ActorTemplate {
    pub fn new() -> Self {
        Self {
            defaults: ParameterBag::new().with(keys::HEALTH, Container::full(100.0)),
        }
    }
}

impl Default for ActorTemplate {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityTemplate for ActorTemplate {
    fn defaults(&self) -> &ParameterBag {
        &self.defaults
    }

    fn editable_defaults(&mut self) -> &mut ParameterBag {
        &mut self.defaults
    }

    fn apply_with(
        &self,
        entity: &mut EntityMut<'_>,
        params: &dyn Parameters,
    ) -> Result<(), TemplateError> {
        let x = params.value_or::<f32>(keys::X, 0.0)?;
        let y = params.value_or::<f32>(keys::Y, 0.0)?;
        let health = params.value::<Container>(keys::HEALTH)?;

        entity.add_component(SpatialComponent::new(x, y, 1.0, 1.0, 0.0))?;
        entity.add_component(HealthComponent::new(Container::new(
            health.current,
            health.total,
        )))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// WeaponTemplate
// ---------------------------------------------------------------------------

/// A scripted weapon that knows which bullet template it fires.
///
/// Reads `damage`, `position` and `script` (all required) and an optional
/// `bulletTemplate`. Stock defaults: `damage = 5`, `position = (0, 0)`, a
/// script that does nothing, and no bullet template.
#[derive(Clone)]
pub struct WeaponTemplate {
    defaults: ParameterBag,
}

impl WeaponTemplate {
    pub fn new() -> Self {
        Self {
            defaults: ParameterBag::new()
                .with(keys::DAMAGE, 5.0)
                .with(keys::SCRIPT, ParamValue::behavior(NoopBehavior))
                .with(keys::POSITION, Vector2::ZERO),
        }
    }
}

impl Default for WeaponTemplate {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityTemplate for WeaponTemplate {
    fn defaults(&self) -> &ParameterBag {
        &self.defaults
    }

    fn editable_defaults(&mut self) -> &mut ParameterBag {
        &mut self.defaults
    }

    fn apply_with(
        &self,
        entity: &mut EntityMut<'_>,
        params: &dyn Parameters,
    ) -> Result<(), TemplateError> {
        let damage = params.value::<f32>(keys::DAMAGE)?;
        let bullet_template = params.value_opt::<Rc<dyn EntityTemplate>>(keys::BULLET_TEMPLATE)?;
        let script = params.value::<Rc<dyn Behavior>>(keys::SCRIPT)?;
        let position = params.value::<Vector2>(keys::POSITION)?;

        entity.add_component(WeaponComponent::new(damage, bullet_template))?;
        entity.add_component(SpatialComponent::unit_at(position))?;
        entity.add_component(ScriptComponent::new(script))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ProjectileTemplate
// ---------------------------------------------------------------------------

/// A bullet: damage and a position.
///
/// Stock defaults: `damage = 5`, `position = (0, 0)`.
#[derive(Debug, Clone)]
pub struct ProjectileTemplate {
    defaults: ParameterBag,
}

impl ProjectileTemplate {
    pub fn new() -> Self {
        Self {
            defaults: ParameterBag::new()
                .with(keys::DAMAGE, 5.0)
                .with(keys::POSITION, Vector2::ZERO),
        }
    }
}

impl Default for ProjectileTemplate {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityTemplate for ProjectileTemplate {
    fn defaults(&self) -> &ParameterBag {
        &self.defaults
    }

    fn editable_defaults(&mut self) -> &mut ParameterBag {
        &mut self.defaults
    }

    fn apply_with(
        &self,
        entity: &mut EntityMut<'_>,
        params: &dyn Parameters,
    ) -> Result<(), TemplateError> {
        let damage = params.value::<f32>(keys::DAMAGE)?;
        let position = params.value::<Vector2>(keys::POSITION)?;

        entity.add_component(DamageComponent::new(damage))?;
        entity.add_component(SpatialComponent::unit_at(position))?;
        Ok(())
    }
}
