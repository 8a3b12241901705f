//! Armory: a turret that fires bullets from a script.
//!
//! Builds a weapon from JSON-configured defaults, runs the script system a
//! few times, and prints the bullets it spawned.
//!
//! Run with: `RUST_LOG=debug cargo run -p kiln-template --example armory`

use std::rc::Rc;

use kiln_template::prelude::*;

/// Fires one bullet per update from the weapon's position.
struct FireOnce;

impl Behavior for FireOnce {
    fn update(&self, world: &mut World, weapon: EntityId) -> Result<(), TemplateError> {
        let (damage, template) = {
            let component = world
                .get_component::<WeaponComponent>(weapon)
                .ok_or_else(|| TemplateError::custom("not a weapon"))?;
            let template = component
                .bullet_template()
                .cloned()
                .ok_or_else(|| TemplateError::custom("weapon has nothing to fire"))?;
            (component.damage(), template)
        };
        let position = world
            .get_component::<SpatialComponent>(weapon)
            .map(SpatialComponent::position)
            .unwrap_or_default();

        let params = ParameterBag::new()
            .with(keys::DAMAGE, damage)
            .with(keys::POSITION, position);
        EntityFactory::new(world).instantiate_with(template.as_ref(), &params)?;
        Ok(())
    }
}

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut bullet = ProjectileTemplate::new();
    *bullet.editable_defaults() = ParameterBag::from_json(&serde_json::json!({
        "damage": 12,
        "position": {"x": 0, "y": 0},
    }))?;
    let bullet: Rc<dyn EntityTemplate> = Rc::new(bullet);

    let mut world = World::with_config(WorldConfig {
        max_entities: Some(16),
        journal: true,
    });

    let turret = ParameterBag::new()
        .with(keys::DAMAGE, 30.0)
        .with(keys::POSITION, Vector2::new(750.0, 125.0))
        .with(keys::BULLET_TEMPLATE, bullet)
        .with(keys::SCRIPT, ParamValue::behavior(FireOnce));
    let weapon = EntityFactory::new(&mut world).instantiate_with(&WeaponTemplate::new(), &turret)?;
    tracing::info!(%weapon, "turret ready");

    for round in 1..=3 {
        let ran = run_scripts(&mut world)?;
        tracing::info!(round, scripts = ran, "script pass complete");
    }

    for entity in world.entities_with::<DamageComponent>() {
        let damage = world
            .get_component::<DamageComponent>(entity)
            .map(DamageComponent::damage)
            .unwrap_or_default();
        let position = world
            .get_component::<SpatialComponent>(entity)
            .map(SpatialComponent::position)
            .unwrap_or_default();
        println!("bullet {entity}: damage {damage} at ({}, {})", position.x, position.y);
    }

    if let Some(journal) = world.journal() {
        println!("{} lifecycle events recorded", journal.len());
    }
    Ok(())
}
