//! Kiosk configuration: marker ids, search criteria, layers, interaction tuning.
//!
//! Loaded read-only from the same `config.json` the touchscreen uses. Layer
//! entries are kept raw and validated when built, so a malformed layer fails
//! at the point of use.

use crate::{
    error::{KioskError, Result},
    layers::{build_layers, Layer, LayerConfig},
    types::ClassId,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the topic layer holding the selectable sites.
pub const SITES_LAYER: &str = "sites";

/// One weighted search criterion and the parameter marker that adjusts it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchCriterion {
    /// Feature attribute key
    pub key: String,
    #[serde(rename = "name_en-US", default)]
    pub name_en: String,
    #[serde(rename = "name_de-DE", default)]
    pub name_de: String,
    #[serde(rename = "markerID")]
    pub marker_id: ClassId,
    /// Display color as an `r, g, b` triple
    #[serde(default)]
    pub color: String,
}

impl SearchCriterion {
    pub fn new(key: &str, marker_id: i32, color: &str) -> Self {
        Self {
            key: key.to_string(),
            name_en: key.to_string(),
            name_de: key.to_string(),
            marker_id: ClassId(marker_id),
            color: color.to_string(),
        }
    }

    /// Localized display name; falls back to the key.
    pub fn display_name(&self, locale: &str) -> &str {
        let name = match locale {
            "de-DE" => &self.name_de,
            _ => &self.name_en,
        };
        if name.is_empty() {
            &self.key
        } else {
            name
        }
    }
}

/// Step layout and gesture tuning of the touchscreen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InteractionConfig {
    /// Number of application steps (1-based)
    pub step_count: u8,
    /// Step in which parameter markers set criterion weights
    pub criteria_step: u8,
    /// Step in which the selection marker queries and locks sites
    pub selection_step: u8,
    /// Terminal step that announces the best match
    pub final_step: u8,
    /// Steps showing the map
    pub map_steps: Vec<u8>,
    /// Steps showing the criteria canvas
    pub canvas_steps: Vec<u8>,
    /// Distance (map units) the selection marker may drift from a site
    /// while a lock gesture is in progress
    pub lock_buffer: f64,
    pub fly_to_zoom_out: f64,
    pub fly_to_zoom_in: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            step_count: 5,
            criteria_step: 2,
            selection_step: 3,
            final_step: 5,
            map_steps: vec![1, 3, 4, 5],
            canvas_steps: vec![2],
            lock_buffer: 100.0,
            fly_to_zoom_out: 13.0,
            fly_to_zoom_in: 17.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KioskConfig {
    #[serde(default)]
    pub base_layers: Vec<LayerConfig>,
    #[serde(default)]
    pub topic_layers: Vec<LayerConfig>,
    #[serde(rename = "progressMarkerID")]
    pub progress_marker_id: ClassId,
    #[serde(rename = "selectionMarkerID")]
    pub selection_marker_id: ClassId,
    pub search_criteria: Vec<SearchCriterion>,
    #[serde(default = "default_true")]
    pub enable_tuio: bool,
    /// Raise pointer events for TUIO cursors
    #[serde(default = "default_true")]
    pub tuio_cursor_events: bool,
    #[serde(default = "default_socket_url")]
    pub socket_url: String,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default)]
    pub interaction: InteractionConfig,
}

fn default_true() -> bool {
    true
}

fn default_socket_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_locale() -> String {
    "en-US".to_string()
}

impl KioskConfig {
    pub fn new(
        search_criteria: Vec<SearchCriterion>,
        progress_marker_id: ClassId,
        selection_marker_id: ClassId,
    ) -> Self {
        Self {
            base_layers: Vec::new(),
            topic_layers: Vec::new(),
            progress_marker_id,
            selection_marker_id,
            search_criteria,
            enable_tuio: true,
            tuio_cursor_events: true,
            socket_url: default_socket_url(),
            locale: default_locale(),
            interaction: InteractionConfig::default(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn criterion(&self, key: &str) -> Option<&SearchCriterion> {
        self.search_criteria.iter().find(|c| c.key == key)
    }

    pub fn criterion_by_marker(&self, marker_id: ClassId) -> Option<&SearchCriterion> {
        self.search_criteria.iter().find(|c| c.marker_id == marker_id)
    }

    pub fn criteria_keys(&self) -> Vec<String> {
        self.search_criteria.iter().map(|c| c.key.clone()).collect()
    }

    pub fn base_layers(&self) -> Result<Vec<Layer>> {
        build_layers(&self.base_layers)
    }

    pub fn topic_layers(&self) -> Result<Vec<Layer>> {
        build_layers(&self.topic_layers)
    }

    /// The validated `sites` topic layer; must be a Vector layer.
    pub fn sites_layer(&self) -> Result<Layer> {
        let raw = self
            .topic_layers
            .iter()
            .find(|l| l.name == SITES_LAYER)
            .ok_or(KioskError::MissingSitesLayer)?;
        let layer = Layer::try_from(raw)?;
        if !layer.is_vector() {
            return Err(KioskError::SitesLayerNotVector);
        }
        Ok(layer)
    }

    /// Hostname of the tracking socket, used as the default TUIO source.
    pub fn default_source(&self) -> Result<String> {
        hostname_of(&self.socket_url)
    }
}

static HOSTNAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r".+://([^/:]+)").expect("valid hostname pattern"));

/// Hostname part of a URL (`scheme://host[:port][/path]`).
pub fn hostname_of(url: &str) -> Result<String> {
    HOSTNAME_PATTERN
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| KioskError::InvalidSocketUrl(url.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"{
        "baseLayers": [{"name": "osm", "type": "OSM", "visible": true}],
        "topicLayers": [
            {"name": "sites", "type": "Vector", "visible": true, "selectable": true,
             "source": {"url": "assets/sites.json", "format": "GeoJSON"}},
            {"name": "noise", "type": "WMS", "visible": false, "source": {"url": "http://wms"}}
        ],
        "progressMarkerID": 1,
        "selectionMarkerID": 2,
        "searchCriteria": [
            {"key": "area", "name_en-US": "Area", "name_de-DE": "Fläche", "markerID": 10, "color": "255, 0, 0"},
            {"key": "price", "name_en-US": "Price", "name_de-DE": "Preis", "markerID": 11, "color": "0, 0, 255"}
        ],
        "enableTuio": true,
        "socketUrl": "http://tuio-bridge.local:5000/socket"
    }"#;

    #[test]
    fn parses_original_config_keys() {
        let cfg = KioskConfig::from_json(CONFIG).unwrap();
        assert_eq!(cfg.progress_marker_id, ClassId(1));
        assert_eq!(cfg.selection_marker_id, ClassId(2));
        assert!(cfg.tuio_cursor_events, "defaults to true when absent");
        assert_eq!(cfg.criteria_keys(), vec!["area", "price"]);
        assert_eq!(cfg.criterion_by_marker(ClassId(11)).unwrap().key, "price");
        assert_eq!(cfg.criterion("area").unwrap().display_name("de-DE"), "Fläche");
        assert_eq!(cfg.interaction, InteractionConfig::default());
    }

    #[test]
    fn sites_layer_validated_lazily() {
        let cfg = KioskConfig::from_json(CONFIG).unwrap();
        assert!(cfg.sites_layer().unwrap().is_vector());
        // The malformed WMS layer only fails once the topic layers are built.
        assert!(matches!(cfg.topic_layers(), Err(KioskError::MissingWmsParams(_))));
        assert_eq!(cfg.base_layers().unwrap().len(), 1);
    }

    #[test]
    fn default_source_is_socket_hostname() {
        let cfg = KioskConfig::from_json(CONFIG).unwrap();
        assert_eq!(cfg.default_source().unwrap(), "tuio-bridge.local");
        assert_eq!(hostname_of("ws://10.0.0.5").unwrap(), "10.0.0.5");
        assert!(matches!(
            hostname_of("localhost:5000"),
            Err(KioskError::InvalidSocketUrl(_))
        ));
    }

    #[test]
    fn hostname_pattern_is_shared() {
        assert_eq!(hostname_of("http://a.example:5000/x").unwrap(), "a.example");
        let first = Lazy::get(&HOSTNAME_PATTERN).map(|r| r as *const Regex);
        assert!(first.is_some(), "compiled on first use");
        assert_eq!(hostname_of("wss://b.example").unwrap(), "b.example");
        let second = Lazy::get(&HOSTNAME_PATTERN).map(|r| r as *const Regex);
        assert_eq!(first, second, "not recompiled per call");
    }
}
