//! `kiosk_core` — Touchscreen logic of a tangible-marker kiosk.
//!
//! # Module layout
//! - [`types`]        — Fundamental types (coordinates, feature / element ids)
//! - [`error`]        — Error taxonomy
//! - [`numeric`]      — Attribute coercion for loosely typed properties
//! - [`geometry`]     — GeoJSON geometry, extents, hit-testing
//! - [`feature`]      — Sites built from GeoJSON records
//! - [`layers`]       — Map layer configuration, validated per kind
//! - [`config`]       — Kiosk configuration (markers, criteria, interaction)
//! - [`criteria`]     — Radar-chart vectors (target and per-site profiles)
//! - [`ranking`]      — Max values, normalization, best match, locked sites
//! - [`decoder`]      — TUIO packets → cursor / object lifecycle events
//! - [`dispatch`]     — Lifecycle events → DOM events on a hit-tested surface
//! - [`classifier`]   — Marker classification by class id
//! - [`map`]          — Map view seam and an in-process site map
//! - [`interaction`]  — Step machine, criterion weights, lock gesture
//! - [`sync`]         — Cross-window publish / subscribe channel
//! - [`infoscreen`]   — Receiving side of the sync channel
//! - [`session`]      — Packet → decoder → dispatcher → controller orchestrator
//! - [`metrics`]      — Packet / event / error counters

pub mod classifier;
pub mod config;
pub mod criteria;
pub mod decoder;
pub mod dispatch;
pub mod error;
pub mod feature;
pub mod geometry;
pub mod infoscreen;
pub mod interaction;
pub mod layers;
pub mod map;
pub mod metrics;
pub mod numeric;
pub mod ranking;
pub mod session;
pub mod sync;
pub mod types;

pub use config::{KioskConfig, SearchCriterion};
pub use criteria::RadarChartData;
pub use decoder::{DecodeOutcome, PacketDisposition, TuioDecoder, TuioEvent};
pub use dispatch::{DomEvent, EventDispatcher, RegionSurface, Surface, Viewport};
pub use error::{KioskError, Result};
pub use feature::{Feature, FeatureCollection, FeatureSummary, RawFeature};
pub use interaction::InteractionController;
pub use map::{MapView, SiteMap};
pub use ranking::RankingEngine;
pub use session::{KioskSession, SessionOutput};
pub use sync::{SyncBus, SyncEndpoint, SyncMessage};
pub use types::{ClassId, Coordinate, ElementId, FeatureId, SessionId};
