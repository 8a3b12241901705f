//! Parameter bags: string-keyed, heterogeneous, and read through traits.
//!
//! [`Parameters`] is the read surface every bag shares, including the
//! [`OverlayBag`](crate::overlay::OverlayBag). It has two lookups:
//!
//! - [`get`](Parameters::get) resolves a key through every layer the bag is
//!   composed of.
//! - [`get_own`](Parameters::get_own) resolves only in the bag's own
//!   (primary) layer. Defaulted reads ([`Parameters::get_or`],
//!   [`ParametersExt::value_or`]) go through this one, so a hard-coded
//!   default in a template wins over whatever a fallback layer holds.
//!
//! Typed reads live on [`ParametersExt`], which is implemented for every
//! `Parameters`, trait objects included.

use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;

use crate::param::{FromParam, ParamError, ParamValue};

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Read access to a parameter bag.
pub trait Parameters {
    /// Full lookup: the stored value, or `None` when no layer holds `key`.
    fn get(&self, key: &str) -> Option<&ParamValue>;

    /// Lookup restricted to this bag's own layer.
    fn get_own(&self, key: &str) -> Option<&ParamValue>;

    /// The value stored in this bag's own layer, or `default` verbatim.
    ///
    /// Never consults fallback layers.
    fn get_or<'a>(&'a self, key: &str, default: &'a ParamValue) -> &'a ParamValue {
        self.get_own(key).unwrap_or(default)
    }

    /// Whether any layer holds `key`.
    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// Write access to a parameter bag.
pub trait ParametersMut: Parameters {
    /// Store `value` under `key`, overwriting any previous value.
    fn put(&mut self, key: String, value: ParamValue);
}

/// Typed reads over any [`Parameters`].
pub trait ParametersExt: Parameters {
    /// Required read through every layer.
    ///
    /// # Errors
    ///
    /// [`ParamError::Missing`] if no layer holds `key`,
    /// [`ParamError::TypeMismatch`] if the value is not a `T`.
    fn value<T: FromParam>(&self, key: &str) -> Result<T, ParamError> {
        let value = self.get(key).ok_or_else(|| ParamError::Missing {
            key: key.to_owned(),
        })?;
        T::read(key, value)
    }

    /// Optional read through every layer: `Ok(None)` when absent.
    fn value_opt<T: FromParam>(&self, key: &str) -> Result<Option<T>, ParamError> {
        self.get(key).map(|value| T::read(key, value)).transpose()
    }

    /// Defaulted read from this bag's own layer only.
    ///
    /// Returns `default` when the own layer lacks `key`, even if a fallback
    /// layer holds it.
    fn value_or<T: FromParam>(&self, key: &str, default: T) -> Result<T, ParamError> {
        match self.get_own(key) {
            Some(value) => T::read(key, value),
            None => Ok(default),
        }
    }

    /// Downcast an [`Opaque`](ParamValue::Opaque) payload.
    fn opaque<T: Any>(&self, key: &str) -> Result<Rc<T>, ParamError> {
        let mismatch = |found| ParamError::TypeMismatch {
            key: key.to_owned(),
            expected: std::any::type_name::<T>(),
            found,
        };
        match self.value::<ParamValue>(key)? {
            ParamValue::Opaque(payload) => payload.downcast::<T>().map_err(|_| mismatch("opaque")),
            other => Err(mismatch(other.kind())),
        }
    }
}

impl<P: Parameters + ?Sized> ParametersExt for P {}

// ---------------------------------------------------------------------------
// ParameterBag
// ---------------------------------------------------------------------------

/// The plain, single-layer bag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterBag {
    values: HashMap<String, ParamValue>,
}

impl ParameterBag {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`put`](Self::put).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.put(key, value);
        self
    }

    /// Store `value` under `key`. No type check; overwrites.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// The stored value, or `None`.
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    /// Mutable access to a stored value.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut ParamValue> {
        self.values.get_mut(key)
    }

    /// Remove and return the value under `key`.
    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.values.remove(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Keys in unspecified order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Build a bag from a JSON object, converting each member with
    /// [`ParamValue::from_json`].
    pub fn from_json(json: &serde_json::Value) -> Result<Self, ParamError> {
        let object = json.as_object().ok_or_else(|| ParamError::UnsupportedJson {
            key: String::new(),
            details: format!("expected an object of parameters, found {json}"),
        })?;
        let mut bag = Self::new();
        for (key, value) in object {
            bag.put(key.clone(), ParamValue::from_json(key, value)?);
        }
        Ok(bag)
    }

    /// Hex BLAKE3 digest of the bag's contents.
    ///
    /// Keys are hashed in sorted order. Value shapes contribute their bits,
    /// reference shapes contribute the address they point at, so two bags
    /// with the same fingerprint hold equal values and the same references.
    pub fn fingerprint(&self) -> String {
        let mut keys: Vec<&String> = self.values.keys().collect();
        keys.sort();

        let mut hasher = blake3::Hasher::new();
        for key in keys {
            let value = &self.values[key];
            hasher.update(&(key.len() as u64).to_le_bytes());
            hasher.update(key.as_bytes());
            hasher.update(value.kind().as_bytes());
            match value {
                ParamValue::Scalar(v) => {
                    hasher.update(&v.to_bits().to_le_bytes());
                }
                ParamValue::Vector(v) => {
                    hasher.update(&v.x.to_bits().to_le_bytes());
                    hasher.update(&v.y.to_bits().to_le_bytes());
                }
                ParamValue::Container(c) => {
                    hasher.update(&c.current.to_bits().to_le_bytes());
                    hasher.update(&c.total.to_bits().to_le_bytes());
                }
                ParamValue::Text(s) => {
                    hasher.update(&(s.len() as u64).to_le_bytes());
                    hasher.update(s.as_bytes());
                }
                reference => {
                    let addr = reference.reference_addr().unwrap_or_default();
                    hasher.update(&(addr as u64).to_le_bytes());
                }
            }
        }
        hasher.finalize().to_hex().to_string()
    }
}

impl Parameters for ParameterBag {
    fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    fn get_own(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }
}

impl ParametersMut for ParameterBag {
    fn put(&mut self, key: String, value: ParamValue) {
        self.values.insert(key, value);
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for ParameterBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bag = Self::new();
        for (key, value) in iter {
            bag.put(key, value);
        }
        bag
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
