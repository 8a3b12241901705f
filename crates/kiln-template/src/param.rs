//! Heterogeneous parameter values and typed extraction.
//!
//! A [`ParamValue`] is a tagged variant over the shapes templates read:
//! scalars, vectors, current/total pairs, text, and three reference shapes
//! (nested templates, behaviours, and opaque user payloads). Value shapes are
//! copied out on read; reference shapes hand back a clone of the same `Rc`,
//! so identity survives the round trip through a bag.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::template::{Behavior, EntityTemplate};
use crate::value::{Container, Vector2};

// ---------------------------------------------------------------------------
// ParamError
// ---------------------------------------------------------------------------

/// Errors raised while reading parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamError {
    /// Neither the bag nor any fallback holds the key.
    #[error("missing required parameter '{key}'")]
    Missing { key: String },

    /// The stored value has a different shape than the reader asserted.
    #[error("parameter '{key}' holds a {found} value, expected {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A JSON value has no parameter representation.
    #[error("parameter '{key}' cannot be built from JSON: {details}")]
    UnsupportedJson { key: String, details: String },
}

// ---------------------------------------------------------------------------
// ParamValue
// ---------------------------------------------------------------------------

/// A single value stored in a parameter bag.
#[derive(Clone)]
pub enum ParamValue {
    Scalar(f32),
    Vector(Vector2),
    Container(Container),
    Text(String),
    /// A nested template, installed by reference.
    Template(Rc<dyn EntityTemplate>),
    /// A scripted behaviour, installed by reference.
    Behavior(Rc<dyn Behavior>),
    /// Any other user payload, recovered by downcasting.
    Opaque(Rc<dyn Any>),
}

impl ParamValue {
    /// Wrap a template by reference.
    pub fn template<T: EntityTemplate + 'static>(template: T) -> Self {
        ParamValue::Template(Rc::new(template))
    }

    /// Wrap a behaviour by reference.
    pub fn behavior<B: Behavior + 'static>(behavior: B) -> Self {
        ParamValue::Behavior(Rc::new(behavior))
    }

    /// Wrap an arbitrary payload by reference.
    pub fn opaque<T: Any>(value: T) -> Self {
        ParamValue::Opaque(Rc::new(value))
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ParamValue::Scalar(_) => "scalar",
            ParamValue::Vector(_) => "vector",
            ParamValue::Container(_) => "container",
            ParamValue::Text(_) => "text",
            ParamValue::Template(_) => "template",
            ParamValue::Behavior(_) => "behavior",
            ParamValue::Opaque(_) => "opaque",
        }
    }

    /// Whether the value is installed by reference rather than copied.
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            ParamValue::Template(_) | ParamValue::Behavior(_) | ParamValue::Opaque(_)
        )
    }

    /// Build a value from JSON.
    ///
    /// Numbers become scalars, strings become text, `{x, y}` objects become
    /// vectors and `{current, total}` objects become containers. `key` is
    /// only used for error reporting.
    pub fn from_json(key: &str, json: &serde_json::Value) -> Result<Self, ParamError> {
        use serde_json::Value;

        let unsupported = |details: String| ParamError::UnsupportedJson {
            key: key.to_owned(),
            details,
        };

        match json {
            Value::Number(n) => n
                .as_f64()
                .map(|v| v as f32)
                .filter(|v| v.is_finite())
                .map(ParamValue::Scalar)
                .ok_or_else(|| unsupported(format!("number {n} does not fit a scalar"))),
            Value::String(s) => Ok(ParamValue::Text(s.clone())),
            Value::Object(map) if map.contains_key("x") => {
                serde_json::from_value::<Vector2>(json.clone())
                    .map(ParamValue::Vector)
                    .map_err(|e| unsupported(e.to_string()))
            }
            Value::Object(map) if map.contains_key("current") => {
                serde_json::from_value::<Container>(json.clone())
                    .map(ParamValue::Container)
                    .map_err(|e| unsupported(e.to_string()))
            }
            other => Err(unsupported(format!("no parameter shape for {other}"))),
        }
    }

    /// Address of the referenced object for reference shapes.
    pub(crate) fn reference_addr(&self) -> Option<usize> {
        match self {
            ParamValue::Template(rc) => Some(Rc::as_ptr(rc) as *const () as usize),
            ParamValue::Behavior(rc) => Some(Rc::as_ptr(rc) as *const () as usize),
            ParamValue::Opaque(rc) => Some(Rc::as_ptr(rc) as *const () as usize),
            _ => None,
        }
    }
}

impl fmt::Debug for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Scalar(v) => f.debug_tuple("Scalar").field(v).finish(),
            ParamValue::Vector(v) => f.debug_tuple("Vector").field(v).finish(),
            ParamValue::Container(v) => f.debug_tuple("Container").field(v).finish(),
            ParamValue::Text(v) => f.debug_tuple("Text").field(v).finish(),
            ParamValue::Template(t) => f.debug_tuple("Template").field(&t.name()).finish(),
            ParamValue::Behavior(b) => f.debug_tuple("Behavior").field(&b.name()).finish(),
            ParamValue::Opaque(_) => f.write_str("Opaque(..)"),
        }
    }
}

/// Value shapes compare by value, reference shapes by identity.
impl PartialEq for ParamValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ParamValue::Scalar(a), ParamValue::Scalar(b)) => a == b,
            (ParamValue::Vector(a), ParamValue::Vector(b)) => a == b,
            (ParamValue::Container(a), ParamValue::Container(b)) => a == b,
            (ParamValue::Text(a), ParamValue::Text(b)) => a == b,
            (a, b) if a.is_reference() && b.is_reference() => {
                a.kind() == b.kind() && a.reference_addr() == b.reference_addr()
            }
            _ => false,
        }
    }
}

impl From<f32> for ParamValue {
    fn from(v: f32) -> Self {
        ParamValue::Scalar(v)
    }
}

/// Narrowed to `f32`, so unsuffixed float literals work with `put`.
impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Scalar(v as f32)
    }
}

impl From<Vector2> for ParamValue {
    fn from(v: Vector2) -> Self {
        ParamValue::Vector(v)
    }
}

impl From<Container> for ParamValue {
    fn from(v: Container) -> Self {
        ParamValue::Container(v)
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_owned())
    }
}

impl From<Rc<dyn EntityTemplate>> for ParamValue {
    fn from(v: Rc<dyn EntityTemplate>) -> Self {
        ParamValue::Template(v)
    }
}

impl From<Rc<dyn Behavior>> for ParamValue {
    fn from(v: Rc<dyn Behavior>) -> Self {
        ParamValue::Behavior(v)
    }
}

// ---------------------------------------------------------------------------
// FromParam
// ---------------------------------------------------------------------------

/// Types that can be read out of a [`ParamValue`].
pub trait FromParam: Sized {
    /// Variant name reported on a mismatch.
    const EXPECTED: &'static str;

    /// Extract `Self`, or `None` if the value has another shape.
    fn from_param(value: &ParamValue) -> Option<Self>;

    /// Extract `Self`, reporting a mismatch against `key`.
    fn read(key: &str, value: &ParamValue) -> Result<Self, ParamError> {
        Self::from_param(value).ok_or_else(|| ParamError::TypeMismatch {
            key: key.to_owned(),
            expected: Self::EXPECTED,
            found: value.kind(),
        })
    }
}

impl FromParam for f32 {
    const EXPECTED: &'static str = "scalar";

    fn from_param(value: &ParamValue) -> Option<Self> {
        match value {
            ParamValue::Scalar(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromParam for Vector2 {
    const EXPECTED: &'static str = "vector";

    fn from_param(value: &ParamValue) -> Option<Self> {
        match value {
            ParamValue::Vector(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromParam for Container {
    const EXPECTED: &'static str = "container";

    fn from_param(value: &ParamValue) -> Option<Self> {
        match value {
            ParamValue::Container(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromParam for String {
    const EXPECTED: &'static str = "text";

    fn from_param(value: &ParamValue) -> Option<Self> {
        match value {
            ParamValue::Text(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl FromParam for Rc<dyn EntityTemplate> {
    const EXPECTED: &'static str = "template";

    fn from_param(value: &ParamValue) -> Option<Self> {
        match value {
            ParamValue::Template(t) => Some(Rc::clone(t)),
            _ => None,
        }
    }
}

impl FromParam for Rc<dyn Behavior> {
    const EXPECTED: &'static str = "behavior";

    fn from_param(value: &ParamValue) -> Option<Self> {
        match value {
            ParamValue::Behavior(b) => Some(Rc::clone(b)),
            _ => None,
        }
    }
}

impl FromParam for ParamValue {
    const EXPECTED: &'static str = "any";

    fn from_param(value: &ParamValue) -> Option<Self> {
        Some(value.clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalar_read_rejects_vector() {
        let value = ParamValue::from(Vector2::new(1.0, 2.0));
        let err = f32::read("damage", &value).unwrap_err();
        assert_eq!(
            err,
            ParamError::TypeMismatch {
                key: "damage".to_owned(),
                expected: "scalar",
                found: "vector",
            }
        );
    }

    #[test]
    fn opaque_values_compare_by_identity() {
        let a = ParamValue::opaque(5u8);
        let b = a.clone();
        let c = ParamValue::opaque(5u8);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn json_shapes() {
        assert_eq!(
            ParamValue::from_json("damage", &json!(5)).unwrap(),
            ParamValue::Scalar(5.0)
        );
        assert_eq!(
            ParamValue::from_json("position", &json!({"x": 750, "y": 125})).unwrap(),
            ParamValue::Vector(Vector2::new(750.0, 125.0))
        );
        assert_eq!(
            ParamValue::from_json("health", &json!({"current": 53, "total": 250})).unwrap(),
            ParamValue::Container(Container::new(53.0, 250.0))
        );
        assert_eq!(
            ParamValue::from_json("label", &json!("boss")).unwrap(),
            ParamValue::Text("boss".to_owned())
        );
    }

    #[test]
    fn json_rejects_unknown_shapes() {
        for bad in [json!(true), json!([1, 2]), json!({"x": 1}), json!(null)] {
            let err = ParamValue::from_json("k", &bad).unwrap_err();
            assert!(matches!(err, ParamError::UnsupportedJson { .. }), "{bad}");
        }
    }

    #[test]
    fn json_numbers_outside_f32_range_are_rejected() {
        for big in [json!(1e40), json!(-1e40)] {
            let err = ParamValue::from_json("damage", &big).unwrap_err();
            assert!(matches!(err, ParamError::UnsupportedJson { .. }), "{big}");
        }
        assert_eq!(
            ParamValue::from_json("damage", &json!(f32::MAX as f64)).unwrap(),
            ParamValue::Scalar(f32::MAX)
        );
    }
}
