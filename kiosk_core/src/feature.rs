//! Map features ("sites") built once from GeoJSON records.

use crate::{
    error::{KioskError, Result},
    geometry::{Extent, Geometry, RawGeometry},
    types::{Coordinate, FeatureId},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Attribute map of a feature (geometry excluded).
pub type Properties = Map<String, Value>;

/// A GeoJSON `Feature` record as loaded from disk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawFeature {
    #[serde(rename = "type", default = "feature_type")]
    pub kind: String,
    #[serde(default)]
    pub id: Option<FeatureId>,
    pub geometry: RawGeometry,
    #[serde(default)]
    pub properties: Properties,
}

fn feature_type() -> String {
    "Feature".to_string()
}

/// A GeoJSON `FeatureCollection`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type", default = "collection_type")]
    pub kind: String,
    pub features: Vec<RawFeature>,
}

fn collection_type() -> String {
    "FeatureCollection".to_string()
}

impl FeatureCollection {
    pub fn new(features: Vec<RawFeature>) -> Self {
        Self {
            kind: collection_type(),
            features,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }
}

/// An immutable site feature.
#[derive(Clone, Debug, PartialEq)]
pub struct Feature {
    pub id: FeatureId,
    pub properties: Properties,
    pub geometry: Geometry,
    pub extent: Extent,
    pub center: Coordinate,
}

impl Feature {
    /// Build from a raw record. Fails on missing id or malformed geometry.
    pub fn from_raw(raw: &RawFeature) -> Result<Self> {
        let id = raw.id.clone().ok_or(KioskError::MissingFeatureId)?;
        let geometry = Geometry::try_from(&raw.geometry)?;
        let extent = geometry.extent();
        let mut properties = raw.properties.clone();
        properties.remove("geometry");
        Ok(Self {
            id,
            properties,
            center: extent.center(),
            extent,
            geometry,
        })
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Serializable projection for the sync channel.
    pub fn summary(&self) -> FeatureSummary {
        FeatureSummary {
            id: self.id.clone(),
            properties: self.properties.clone(),
            centerpoint: [self.center.x, self.center.y],
        }
    }
}

/// A feature without its geometry, as sent to the infoscreen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureSummary {
    pub id: FeatureId,
    pub properties: Properties,
    pub centerpoint: [f64; 2],
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_feature_without_geometry_property() {
        let raw: RawFeature = serde_json::from_value(json!({
            "type": "Feature",
            "id": 3,
            "geometry": {"type": "Polygon", "coordinates": [[[0,0],[4,0],[4,2],[0,2],[0,0]]]},
            "properties": {"area": 1200, "geometry": "dropped", "name": "Harbour"}
        }))
        .unwrap();
        let feature = Feature::from_raw(&raw).unwrap();
        assert_eq!(feature.id, FeatureId::Number(3));
        assert_eq!(feature.center, Coordinate::new(2.0, 1.0));
        assert!(feature.property("geometry").is_none());
        assert_eq!(feature.summary().centerpoint, [2.0, 1.0]);
    }

    #[test]
    fn missing_id_is_an_error() {
        let raw: RawFeature = serde_json::from_value(json!({
            "geometry": {"type": "Point", "coordinates": [1, 2]}
        }))
        .unwrap();
        assert!(matches!(Feature::from_raw(&raw), Err(KioskError::MissingFeatureId)));
    }
}
