//! Plain value types carried by parameter bags and components.

use serde::{Deserialize, Serialize};

/// A 2D vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A current/total pair, e.g. hit points out of a maximum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Container {
    pub current: f32,
    pub total: f32,
}

impl Container {
    pub fn new(current: f32, total: f32) -> Self {
        Self { current, total }
    }

    /// A container filled to capacity.
    pub fn full(total: f32) -> Self {
        Self::new(total, total)
    }

    /// `current / total`, or zero for an empty container.
    pub fn fraction(&self) -> f32 {
        if self.total == 0.0 {
            0.0
        } else {
            self.current / self.total
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_fraction() {
        assert_eq!(Container::new(25.0, 100.0).fraction(), 0.25);
        assert_eq!(Container::new(5.0, 0.0).fraction(), 0.0);
        assert_eq!(Container::full(30.0), Container::new(30.0, 30.0));
    }

    #[test]
    fn vector_rejects_unknown_fields() {
        let ok: Vector2 = serde_json::from_str(r#"{"x": 1.5, "y": -2}"#).unwrap();
        assert_eq!(ok, Vector2::new(1.5, -2.0));
        assert!(serde_json::from_str::<Vector2>(r#"{"x": 1, "y": 2, "z": 3}"#).is_err());
    }
}
