//! Kiosk setup shared by scenarios and replay logs, and the batch runner
//! that drives a packet stream through a full touchscreen session.

use kiosk_core::{
    feature::RawFeature,
    geometry::Extent,
    infoscreen::InfoscreenState,
    metrics::SessionMetrics,
    types::FeatureId,
    KioskConfig, KioskSession, RankingEngine, RegionSurface, SiteMap, SyncBus, SyncEndpoint,
    Viewport,
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, sync::Arc};
use tuio_models::TuioPacket;

/// Everything a touchscreen needs besides the packet stream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KioskSetup {
    pub config: KioskConfig,
    pub sites: Vec<RawFeature>,
    /// Map extent shown across the whole window
    pub view: Extent,
    pub viewport: Viewport,
}

impl KioskSetup {
    /// Ranking engine over the sites, maxima already computed.
    pub fn engine(&self) -> kiosk_core::Result<RankingEngine> {
        let mut engine = RankingEngine::new(&self.config);
        engine.load_features(&self.sites)?;
        engine.calculate_max_values();
        Ok(engine)
    }

    pub fn surface(&self) -> RegionSurface {
        RegionSurface::touchscreen(self.viewport, self.config.interaction.step_count)
    }

    /// Normalized window position of a map coordinate.
    pub fn window_position(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.view.min.x) / self.view.width(),
            (self.view.max.y - y) / self.view.height(),
        )
    }

    pub fn session(&self, sync: SyncEndpoint) -> kiosk_core::Result<KioskSession<RegionSurface, SiteMap>> {
        let engine = self.engine()?;
        let map = SiteMap::new(self.view, engine.features().to_vec());
        KioskSession::new(Arc::new(self.config.clone()), engine, self.surface(), map, sync)
    }

    /// Run `packets` through a fresh session with an infoscreen listening.
    pub fn run(&self, packets: &[TuioPacket]) -> kiosk_core::Result<RunReport> {
        let bus = SyncBus::new();
        let infoscreen = bus.endpoint();
        let mut session = self.session(bus.endpoint())?;

        let mut errors = Vec::new();
        for packet in packets {
            let output = session.process_packet(packet);
            errors.extend(output.errors.iter().map(|e| e.to_string()));
        }

        let mut info = InfoscreenState::new();
        let mut sync_messages = BTreeMap::new();
        for event in infoscreen.drain() {
            if let Some(message) = info.receive(&event) {
                *sync_messages.entry(message.kind().to_string()).or_default() += 1;
            }
        }

        let controller = session.controller();
        let engine = controller.engine();
        let report = RunReport {
            metrics: session.metrics().clone(),
            step: controller.current_step(),
            announced: controller.announced(),
            best_match: controller.best_match().map(|f| f.id.clone()),
            locked: engine.top_features().iter().map(|f| f.id.clone()).collect(),
            target: engine
                .target()
                .axes
                .iter()
                .map(|a| (a.name.clone(), a.value))
                .collect(),
            infoscreen_progress: info.progress,
            infoscreen_top_features: info.top_features.iter().map(|f| f.id.clone()).collect(),
            sync_messages,
            errors,
        };
        tracing::info!(
            packets = report.metrics.packets,
            step = ?report.step,
            best_match = ?report.best_match,
            locked = report.locked.len(),
            "session run finished"
        );
        Ok(report)
    }
}

/// Outcome of a batch run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunReport {
    pub metrics: SessionMetrics,
    pub step: Option<u8>,
    pub announced: bool,
    pub best_match: Option<FeatureId>,
    pub locked: Vec<FeatureId>,
    /// Final target weights by criterion key
    pub target: BTreeMap<String, f64>,
    /// Step as last seen by the infoscreen
    pub infoscreen_progress: u8,
    pub infoscreen_top_features: Vec<FeatureId>,
    /// Sync messages received by the infoscreen, by kind
    pub sync_messages: BTreeMap<String, u64>,
    pub errors: Vec<String>,
}

impl RunReport {
    pub fn sync_count(&self, kind: &str) -> u64 {
        self.sync_messages.get(kind).copied().unwrap_or(0)
    }
}
