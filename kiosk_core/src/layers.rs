//! Map layer configuration: a tagged variant per layer kind, validated at
//! construction.
//!
//! Each kind has its own required fields:
//! - `WMS`: `source.wmsParams` (tiled when `TILED` is truthy)
//! - `Vector`, `Heatmap`: `source.format` naming a known vector format
//! - `OSM`, `Tile`: nothing beyond the common fields

use crate::{
    error::{KioskError, Result},
    feature::Properties,
    numeric::{is_truthy, to_number},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

const DEFAULT_GRADIENT: [&str; 4] = ["#0ff", "#0f0", "#ff0", "#f00"];
const DEFAULT_HEATMAP_RADIUS: f64 = 16.0;
const DEFAULT_HEATMAP_BLUR: f64 = 30.0;

// ---------------------------------------------------------------------------
// Raw configuration (as found in config.json)
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerType {
    #[serde(rename = "OSM")]
    Osm,
    Tile,
    #[serde(rename = "WMS")]
    Wms,
    Vector,
    Heatmap,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wms_params: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wms_projection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// One entry of `baseLayers` / `topicLayers`. Style keys are accepted and ignored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerConfig {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(rename = "type")]
    pub layer_type: LayerType,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_attribute_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blur: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub selectable: bool,
}

fn default_visible() -> bool {
    true
}

impl LayerConfig {
    /// Minimal vector layer entry.
    pub fn vector(name: &str, url: &str, format: &str) -> Self {
        Self {
            name: name.to_string(),
            display_name: name.to_string(),
            layer_type: LayerType::Vector,
            source: SourceConfig {
                url: Some(url.to_string()),
                format: Some(format.to_string()),
                ..Default::default()
            },
            category: None,
            weight_attribute: None,
            weight_attribute_max: None,
            gradient: None,
            radius: None,
            blur: None,
            opacity: None,
            z_index: None,
            visible: true,
            selectable: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Validated layers
// ---------------------------------------------------------------------------

/// Vector formats a layer source may declare.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VectorFormat {
    GeoJson,
    Kml,
    Gpx,
    TopoJson,
    Wkt,
    Mvt,
    EsriJson,
    Igc,
    Polyline,
    Gml,
}

impl FromStr for VectorFormat {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, ()> {
        Ok(match s {
            "GeoJSON" => VectorFormat::GeoJson,
            "KML" => VectorFormat::Kml,
            "GPX" => VectorFormat::Gpx,
            "TopoJSON" => VectorFormat::TopoJson,
            "WKT" => VectorFormat::Wkt,
            "MVT" => VectorFormat::Mvt,
            "EsriJSON" => VectorFormat::EsriJson,
            "IGC" => VectorFormat::Igc,
            "Polyline" => VectorFormat::Polyline,
            "GML" => VectorFormat::Gml,
            _ => return Err(()),
        })
    }
}

/// Heatmap point weight: `attribute / max`, or 1 without an attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct HeatmapWeight {
    pub attribute: Option<String>,
    pub max: f64,
}

impl HeatmapWeight {
    pub fn weight(&self, properties: &Properties) -> f64 {
        match &self.attribute {
            Some(attr) => to_number(properties.get(attr)) / self.max,
            None => 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum LayerKind {
    Osm {
        url: Option<String>,
    },
    Tile {
        url: Option<String>,
        projection: Option<String>,
    },
    Wms {
        url: Option<String>,
        params: Map<String, Value>,
        tiled: bool,
        projection: Option<String>,
    },
    Vector {
        url: Option<String>,
        format: VectorFormat,
    },
    Heatmap {
        url: Option<String>,
        format: VectorFormat,
        weight: HeatmapWeight,
        gradient: Vec<String>,
        radius: f64,
        blur: f64,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    pub name: String,
    pub display_name: String,
    pub kind: LayerKind,
    pub opacity: f64,
    pub z_index: Option<i32>,
    pub visible: bool,
    pub selectable: bool,
}

fn vector_format(config: &LayerConfig) -> Result<VectorFormat> {
    let format = config
        .source
        .format
        .as_deref()
        .ok_or_else(|| KioskError::MissingVectorFormat(config.name.clone()))?;
    format
        .parse()
        .map_err(|_| KioskError::UnknownVectorFormat {
            layer: config.name.clone(),
            format: format.to_string(),
        })
}

impl TryFrom<&LayerConfig> for Layer {
    type Error = KioskError;

    fn try_from(config: &LayerConfig) -> Result<Self> {
        let src = &config.source;
        let kind = match config.layer_type {
            LayerType::Osm => LayerKind::Osm {
                url: src.url.clone(),
            },
            LayerType::Tile => LayerKind::Tile {
                url: src.url.clone(),
                projection: src.projection.clone(),
            },
            LayerType::Wms => {
                let params = src
                    .wms_params
                    .clone()
                    .ok_or_else(|| KioskError::MissingWmsParams(config.name.clone()))?;
                let tiled = params.get("TILED").is_some_and(is_truthy);
                LayerKind::Wms {
                    url: src.url.clone(),
                    params,
                    tiled,
                    projection: src.wms_projection.clone(),
                }
            }
            LayerType::Vector => LayerKind::Vector {
                url: src.url.clone(),
                format: vector_format(config)?,
            },
            LayerType::Heatmap => LayerKind::Heatmap {
                url: src.url.clone(),
                format: vector_format(config)?,
                weight: HeatmapWeight {
                    attribute: config.weight_attribute.clone(),
                    max: config.weight_attribute_max.unwrap_or(1.0),
                },
                gradient: match &config.gradient {
                    Some(g) if g.len() > 1 => g.clone(),
                    _ => DEFAULT_GRADIENT.iter().map(|s| s.to_string()).collect(),
                },
                radius: config.radius.unwrap_or(DEFAULT_HEATMAP_RADIUS),
                blur: config.blur.unwrap_or(DEFAULT_HEATMAP_BLUR),
            },
        };
        Ok(Self {
            name: config.name.clone(),
            display_name: config.display_name.clone(),
            kind,
            opacity: config.opacity.unwrap_or(1.0),
            z_index: config.z_index,
            visible: config.visible,
            selectable: config.selectable,
        })
    }
}

impl Layer {
    pub fn is_vector(&self) -> bool {
        matches!(self.kind, LayerKind::Vector { .. })
    }
}

/// Validate a list of layer entries, failing on the first malformed one.
pub fn build_layers(configs: &[LayerConfig]) -> Result<Vec<Layer>> {
    configs.iter().map(Layer::try_from).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> LayerConfig {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn wms_requires_params() {
        let cfg = parse(json!({"name": "dop", "type": "WMS", "source": {"url": "http://x"}}));
        assert!(matches!(Layer::try_from(&cfg), Err(KioskError::MissingWmsParams(n)) if n == "dop"));

        let cfg = parse(json!({
            "name": "dop", "type": "WMS",
            "source": {"url": "http://x", "wmsParams": {"LAYERS": "a", "TILED": true}}
        }));
        let layer = Layer::try_from(&cfg).unwrap();
        assert!(matches!(layer.kind, LayerKind::Wms { tiled: true, .. }));
    }

    #[test]
    fn vector_requires_known_format() {
        let missing = parse(json!({"name": "sites", "type": "Vector", "source": {}}));
        assert!(matches!(
            Layer::try_from(&missing),
            Err(KioskError::MissingVectorFormat(_))
        ));
        let unknown = parse(json!({"name": "sites", "type": "Vector", "source": {"format": "Shapefile"}}));
        assert!(matches!(
            Layer::try_from(&unknown),
            Err(KioskError::UnknownVectorFormat { .. })
        ));
        let ok = LayerConfig::vector("sites", "sites.json", "GeoJSON");
        assert!(Layer::try_from(&ok).unwrap().is_vector());
    }

    #[test]
    fn heatmap_defaults_and_weight() {
        let cfg = parse(json!({
            "name": "density", "type": "Heatmap",
            "source": {"format": "GeoJSON"},
            "weightAttribute": "visitors", "weightAttributeMax": 200.0,
            "gradient": ["#fff"]
        }));
        let layer = Layer::try_from(&cfg).unwrap();
        match layer.kind {
            LayerKind::Heatmap { weight, gradient, radius, blur, .. } => {
                assert_eq!(gradient.len(), 4, "single stop falls back to default gradient");
                assert_eq!(radius, 16.0);
                assert_eq!(blur, 30.0);
                let props = json!({"visitors": 50}).as_object().unwrap().clone();
                assert_eq!(weight.weight(&props), 0.25);
            }
            other => panic!("expected heatmap, got {other:?}"),
        }
    }

    #[test]
    fn style_keys_are_ignored() {
        let cfg = parse(json!({
            "name": "osm", "type": "OSM", "visible": false,
            "style": {"fill": {"color": "red"}}, "scaleAttribute": "x"
        }));
        let layer = Layer::try_from(&cfg).unwrap();
        assert!(!layer.visible);
        assert_eq!(layer.opacity, 1.0);
    }
}
