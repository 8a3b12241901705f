//! Two-layer parameter views.
//!
//! An overlay places a *primary* bag (the caller's overrides) over a
//! *fallback* bag (a template's defaults):
//!
//! - [`get`](Parameters::get) consults the primary, then the fallback.
//! - [`get_own`](Parameters::get_own), and therefore every defaulted read,
//!   consults the primary only. A template asking for `x` with a hard-coded
//!   default of `0` gets `0` when the caller omitted `x`, even if the
//!   template's own defaults carry an `x`. Downstream users who expect the
//!   defaults to win there should read `x` without a default instead.
//! - Writes go to the primary; the fallback is never mutated through an
//!   overlay.
//!
//! Overlays only borrow their layers, so they cost two references and are
//! built fresh for every instantiation.

use crate::bag::{Parameters, ParametersMut};
use crate::param::ParamValue;

// ---------------------------------------------------------------------------
// OverlayBag
// ---------------------------------------------------------------------------

/// Read-only overlay of a primary bag over a fallback bag.
///
/// Either slot may be empty; an overlay with neither slot installed resolves
/// every key to absence.
#[derive(Clone, Copy, Default)]
pub struct OverlayBag<'p, 'f> {
    primary: Option<&'p dyn Parameters>,
    fallback: Option<&'f dyn Parameters>,
}

impl<'p, 'f> OverlayBag<'p, 'f> {
    /// An overlay with both slots empty.
    pub fn new() -> Self {
        Self {
            primary: None,
            fallback: None,
        }
    }

    /// An overlay of `primary` over `fallback`.
    pub fn over(primary: &'p dyn Parameters, fallback: &'f dyn Parameters) -> Self {
        Self {
            primary: Some(primary),
            fallback: Some(fallback),
        }
    }

    pub fn set_primary(&mut self, primary: &'p dyn Parameters) {
        self.primary = Some(primary);
    }

    pub fn set_fallback(&mut self, fallback: &'f dyn Parameters) {
        self.fallback = Some(fallback);
    }
}

impl std::fmt::Debug for OverlayBag<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayBag")
            .field("has_primary", &self.primary.is_some())
            .field("has_fallback", &self.fallback.is_some())
            .finish()
    }
}

impl Parameters for OverlayBag<'_, '_> {
    fn get(&self, key: &str) -> Option<&ParamValue> {
        self.primary
            .and_then(|primary| primary.get(key))
            .or_else(|| self.fallback.and_then(|fallback| fallback.get(key)))
    }

    fn get_own(&self, key: &str) -> Option<&ParamValue> {
        self.primary.and_then(|primary| primary.get_own(key))
    }
}

// ---------------------------------------------------------------------------
// OverlayBagMut
// ---------------------------------------------------------------------------

/// Overlay with an exclusively borrowed primary, so it can be written to.
pub struct OverlayBagMut<'p, 'f> {
    primary: &'p mut dyn ParametersMut,
    fallback: Option<&'f dyn Parameters>,
}

impl<'p, 'f> OverlayBagMut<'p, 'f> {
    pub fn new(primary: &'p mut dyn ParametersMut, fallback: &'f dyn Parameters) -> Self {
        Self {
            primary,
            fallback: Some(fallback),
        }
    }

    /// Overlay without a fallback; behaves like the primary alone.
    pub fn without_fallback(primary: &'p mut dyn ParametersMut) -> Self {
        Self {
            primary,
            fallback: None,
        }
    }

    pub fn set_fallback(&mut self, fallback: &'f dyn Parameters) {
        self.fallback = Some(fallback);
    }
}

impl Parameters for OverlayBagMut<'_, '_> {
    fn get(&self, key: &str) -> Option<&ParamValue> {
        self.primary
            .get(key)
            .or_else(|| self.fallback.and_then(|fallback| fallback.get(key)))
    }

    fn get_own(&self, key: &str) -> Option<&ParamValue> {
        self.primary.get_own(key)
    }
}

impl ParametersMut for OverlayBagMut<'_, '_> {
    fn put(&mut self, key: String, value: ParamValue) {
        self.primary.put(key, value);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
