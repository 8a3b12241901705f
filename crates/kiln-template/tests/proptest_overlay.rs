//! Property tests for overlay resolution and bag immutability under
//! instantiation.

use kiln_template::prelude::*;
use proptest::prelude::*;

const KEYS: [&str; 5] = ["a", "b", "c", "damage", "position"];

fn finite_f32() -> impl Strategy<Value = f32> {
    (-100_000i32..100_000i32).prop_map(|v| v as f32 * 0.01)
}

fn param_value() -> impl Strategy<Value = ParamValue> {
    prop_oneof![
        finite_f32().prop_map(ParamValue::Scalar),
        (finite_f32(), finite_f32()).prop_map(|(x, y)| ParamValue::Vector(Vector2::new(x, y))),
        (finite_f32(), finite_f32())
            .prop_map(|(c, t)| ParamValue::Container(Container::new(c, t))),
        "[a-z]{0,6}".prop_map(ParamValue::Text),
    ]
}

fn bag() -> impl Strategy<Value = ParameterBag> {
    prop::collection::vec((prop::sample::select(KEYS.to_vec()), param_value()), 0..6)
        .prop_map(|entries| entries.into_iter().collect())
}

/// Reads every key in both forms and records what it saw, touching nothing
/// but the entity.
struct ProbeTemplate {
    defaults: ParameterBag,
}

#[derive(Debug, PartialEq)]
struct Seen(Vec<(Option<ParamValue>, ParamValue)>);

impl EntityTemplate for ProbeTemplate {
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
        let fallback = ParamValue::Text("default".to_owned());
        let seen = KEYS
            .iter()
            .map(|key| -> Result<_, ParamError> {
                Ok((
                    params.value_opt::<ParamValue>(key)?,
                    params.value_or::<ParamValue>(key, fallback.clone())?,
                ))
            })
            .collect::<Result<Vec<_>, ParamError>>()?;
        entity.add_component(Seen(seen))?;
        Ok(())
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1_000))]

    #[test]
    fn overlay_resolves_primary_then_fallback(primary in bag(), fallback in bag()) {
        let overlay = OverlayBag::over(&primary, &fallback);
        for key in KEYS {
            let expected = primary.get(key).or_else(|| fallback.get(key));
            prop_assert_eq!(Parameters::get(&overlay, key), expected);
        }
    }

    #[test]
    fn defaulted_reads_ignore_fallback(
        primary in bag(),
        fallback in bag(),
        default in param_value(),
    ) {
        let overlay = OverlayBag::over(&primary, &fallback);
        for key in KEYS {
            prop_assert_eq!(overlay.get_or(key, &default), primary.get_or(key, &default));
            prop_assert_eq!(
                overlay.value_or::<ParamValue>(key, default.clone()),
                primary.value_or::<ParamValue>(key, default.clone())
            );
        }
    }

    #[test]
    fn instantiation_leaves_bags_untouched(defaults in bag(), caller in bag()) {
        let template = ProbeTemplate { defaults };
        let defaults_before = template.defaults().fingerprint();
        let caller_before = caller.fingerprint();

        let mut world = World::new();
        let mut factory = EntityFactory::new(&mut world);
        factory.instantiate(&template).unwrap();
        factory.instantiate_with(&template, &caller).unwrap();

        prop_assert_eq!(template.defaults().fingerprint(), defaults_before);
        prop_assert_eq!(caller.fingerprint(), caller_before);
    }

    #[test]
    fn instantiate_with_sees_the_overlay(defaults in bag(), caller in bag()) {
        let template = ProbeTemplate { defaults };
        let mut world = World::new();
        let entity = EntityFactory::new(&mut world)
            .instantiate_with(&template, &caller)
            .unwrap();

        let overlay = OverlayBag::over(&caller, template.defaults());
        let seen = &world.get_component::<Seen>(entity).unwrap().0;
        for (key, (full, defaulted)) in KEYS.iter().zip(seen) {
            prop_assert_eq!(full.as_ref(), overlay.get(key));
            let expected = caller
                .get(key)
                .cloned()
                .unwrap_or_else(|| ParamValue::Text("default".to_owned()));
            prop_assert_eq!(defaulted, &expected);
        }
    }
}
