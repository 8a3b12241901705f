//! Stock components built by the prefab templates, and the script system.

use std::fmt;
use std::rc::Rc;

use kiln_ecs::prelude::World;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::template::{Behavior, EntityTemplate, TemplateError};
use crate::value::{Container, Vector2};

/// Position, size and rotation in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpatialComponent {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub angle: f32,
}

impl SpatialComponent {
    pub fn new(x: f32, y: f32, width: f32, height: f32, angle: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            angle,
        }
    }

    /// A unit-sized, unrotated spatial at `position`.
    pub fn unit_at(position: Vector2) -> Self {
        Self::new(position.x, position.y, 1.0, 1.0, 0.0)
    }

    pub fn position(&self) -> Vector2 {
        Vector2::new(self.x, self.y)
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthComponent {
    health: Container,
}

impl HealthComponent {
    pub fn new(health: Container) -> Self {
        Self { health }
    }

    pub fn health(&self) -> &Container {
        &self.health
    }

    pub fn health_mut(&mut self) -> &mut Container {
        &mut self.health
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageComponent {
    damage: f32,
}

impl DamageComponent {
    pub fn new(damage: f32) -> Self {
        Self { damage }
    }

    pub fn damage(&self) -> f32 {
        self.damage
    }
}

/// A weapon: how hard it hits and what it fires.
///
/// The bullet template is held by reference; it is the same template the
/// weapon was configured with.
#[derive(Clone)]
pub struct WeaponComponent {
    damage: f32,
    bullet_template: Option<Rc<dyn EntityTemplate>>,
}

impl WeaponComponent {
    pub fn new(damage: f32, bullet_template: Option<Rc<dyn EntityTemplate>>) -> Self {
        Self {
            damage,
            bullet_template,
        }
    }

    pub fn damage(&self) -> f32 {
        self.damage
    }

    pub fn bullet_template(&self) -> Option<&Rc<dyn EntityTemplate>> {
        self.bullet_template.as_ref()
    }
}

impl fmt::Debug for WeaponComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeaponComponent")
            .field("damage", &self.damage)
            .field("bullet_template", &self.bullet_template.as_ref().map(|t| t.name()))
            .finish()
    }
}

/// Holds the behaviour the script system runs for this entity.
#[derive(Clone)]
pub struct ScriptComponent {
    script: Rc<dyn Behavior>,
}

impl ScriptComponent {
    pub fn new(script: Rc<dyn Behavior>) -> Self {
        Self { script }
    }

    pub fn script(&self) -> &Rc<dyn Behavior> {
        &self.script
    }
}

impl fmt::Debug for ScriptComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptComponent")
            .field("script", &self.script.name())
            .finish()
    }
}

/// Run every published entity's script once, in entity order.
///
/// Scripts are collected before any runs, so entities spawned by a script
/// are not updated until the next pass. An entity despawned by an earlier
/// script in the same pass is skipped. Returns how many scripts ran; stops
/// at the first failing script.
pub fn run_scripts(world: &mut World) -> Result<usize, TemplateError> {
    let scripted: Vec<_> = world
        .entities_with::<ScriptComponent>()
        .into_iter()
        .filter_map(|entity| {
            world
                .get_component::<ScriptComponent>(entity)
                .map(|component| (entity, Rc::clone(component.script())))
        })
        .collect();

    let mut ran = 0;
    for (entity, script) in &scripted {
        if !world.is_published(*entity) {
            trace!(%entity, script = script.name(), "entity gone; script skipped");
            continue;
        }
        trace!(%entity, script = script.name(), "running script");
        script.update(world, *entity)?;
        ran += 1;
    }
    Ok(ran)
}
