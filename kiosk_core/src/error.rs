//! Error taxonomy of the kiosk core.
//!
//! Expected no-ops (coordinate outside the view, no feature under a marker,
//! duplicate or non-bundle packets) are not errors and never show up here.

use crate::types::FeatureId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KioskError {
    // === Preconditions ===
    #[error("max values are not defined; load features and calculate max values first")]
    NotReady,

    // === Capability gaps ===
    #[error("surface does not support pointer events; disable tuioCursorEvents")]
    PointerEventsUnsupported,

    // === Malformed configuration / data ===
    #[error("no WMS params defined for layer {0}")]
    MissingWmsParams(String),
    #[error("no vector format provided for layer {0}")]
    MissingVectorFormat(String),
    #[error("unknown vector format {format:?} for layer {layer}")]
    UnknownVectorFormat { layer: String, format: String },
    #[error("topic layer 'sites' is missing")]
    MissingSitesLayer,
    #[error("topic layer 'sites' must be a Vector layer")]
    SitesLayerNotVector,
    #[error("feature without id")]
    MissingFeatureId,
    #[error("malformed geometry: {0}")]
    MalformedGeometry(String),
    #[error("cannot extract hostname from socket url {0:?}")]
    InvalidSocketUrl(String),
    #[error("unknown search criterion {0:?}")]
    UnknownCriterion(String),
    #[error("unknown feature {0}")]
    UnknownFeature(FeatureId),

    // === Wrappers ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, KioskError>;
