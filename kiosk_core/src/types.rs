//! Fundamental types used across the entire workspace.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use tuio_models::{ClassId, SessionId};

// ---------------------------------------------------------------------------
// Map-space coordinates (projected map units, e.g. EPSG:3857 meters)
// ---------------------------------------------------------------------------

/// A coordinate in map space.
pub type Coordinate = Point2<f64>;

// ---------------------------------------------------------------------------
// Identifier types
// ---------------------------------------------------------------------------

/// Stable identifier of a map feature. GeoJSON allows numbers or strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureId {
    Number(i64),
    Text(String),
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureId::Number(n) => write!(f, "{n}"),
            FeatureId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for FeatureId {
    fn from(n: i64) -> Self {
        FeatureId::Number(n)
    }
}

impl From<&str> for FeatureId {
    fn from(s: &str) -> Self {
        FeatureId::Text(s.to_string())
    }
}

/// Identifier of a UI element returned by hit-testing (DOM id).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The step number embedded in a step region id: `"step3"` → `Some(3)`.
    pub fn step_number(&self) -> Option<u8> {
        self.0.strip_prefix("step")?.parse().ok()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_number_from_region_id() {
        assert_eq!(ElementId::new("step1").step_number(), Some(1));
        assert_eq!(ElementId::new("step5").step_number(), Some(5));
        assert_eq!(ElementId::new("stepX").step_number(), None);
        assert_eq!(ElementId::new("map").step_number(), None);
    }

    #[test]
    fn feature_id_accepts_numbers_and_strings() {
        let ids: Vec<FeatureId> = serde_json::from_str(r#"[12, "site-7"]"#).unwrap();
        assert_eq!(ids, vec![FeatureId::Number(12), FeatureId::from("site-7")]);
        assert_eq!(ids[1].to_string(), "site-7");
    }
}
