//! Session orchestrator: runs one packet through the whole touchscreen stack.
//!
//! # Processing per packet
//! 1. Decode into cursor / object lifecycle events
//! 2. Raise DOM events at the hit-tested targets
//! 3. Hand every DOM event to the interaction controller
//!
//! A failing handler does not stop the packet: the error is logged and
//! reported in the output, and the remaining events are still handled.

use crate::{
    config::KioskConfig,
    decoder::{PacketDisposition, TuioDecoder},
    dispatch::{DomEvent, EventDispatcher, Surface},
    error::{KioskError, Result},
    interaction::InteractionController,
    map::MapView,
    metrics::SessionMetrics,
    ranking::RankingEngine,
    sync::SyncEndpoint,
};
use std::{sync::Arc, time::Instant};
use tuio_models::TuioPacket;

/// Outputs of one packet.
#[derive(Debug)]
pub struct SessionOutput {
    pub disposition: PacketDisposition,
    /// DOM events raised, in order
    pub dom_events: Vec<DomEvent>,
    /// Errors raised by event handlers
    pub errors: Vec<KioskError>,
    /// Application step after the packet
    pub step: Option<u8>,
    /// Wall-clock time of processing
    pub total_time_us: u64,
}

pub struct KioskSession<S: Surface, M: MapView> {
    config: Arc<KioskConfig>,
    decoder: TuioDecoder,
    dispatcher: EventDispatcher<S>,
    controller: InteractionController<M>,
    metrics: SessionMetrics,
}

impl<S: Surface, M: MapView> KioskSession<S, M> {
    /// Fails on a socket URL without hostname, or when cursor events are
    /// enabled on a surface without pointer-event support.
    pub fn new(
        config: Arc<KioskConfig>,
        engine: RankingEngine,
        surface: S,
        map: M,
        sync: SyncEndpoint,
    ) -> Result<Self> {
        let decoder = TuioDecoder::from_socket_url(&config.socket_url)?;
        let dispatcher = EventDispatcher::new(surface, config.tuio_cursor_events)?;
        let controller = InteractionController::new(Arc::clone(&config), engine, map, sync);
        tracing::info!(
            source = decoder.default_source(),
            cursor_events = config.tuio_cursor_events,
            "kiosk session started"
        );
        Ok(Self {
            config,
            decoder,
            dispatcher,
            controller,
            metrics: SessionMetrics::default(),
        })
    }

    pub fn process_packet(&mut self, packet: &TuioPacket) -> SessionOutput {
        let start = Instant::now();

        let (disposition, dom_events) = if self.config.enable_tuio {
            let decoded = self.decoder.process_packet(packet);
            let dom = self.dispatcher.dispatch_all(&decoded.events);
            (decoded.disposition, dom)
        } else {
            (PacketDisposition::Disabled, Vec::new())
        };

        let mut errors = Vec::new();
        for event in &dom_events {
            if let Err(err) = self.controller.handle_event(event) {
                tracing::error!(event = event.name(), target = ?event.target, %err, "event handler failed");
                errors.push(err);
            }
        }

        let output = SessionOutput {
            disposition,
            dom_events,
            errors,
            step: self.controller.current_step(),
            total_time_us: start.elapsed().as_micros() as u64,
        };
        self.metrics.accumulate(&output);
        output
    }

    /// Process a whole packet stream; returns the outputs in order.
    pub fn run<'a>(&mut self, packets: impl IntoIterator<Item = &'a TuioPacket>) -> Vec<SessionOutput> {
        packets.into_iter().map(|p| self.process_packet(p)).collect()
    }

    /// Transport disconnect: every tracked cursor and object is forgotten,
    /// along with the controller's gestures and active markers.
    pub fn disconnect(&mut self) {
        tracing::info!("tracking transport disconnected");
        self.decoder.reset();
        self.controller.reset_markers();
    }

    pub fn decoder(&self) -> &TuioDecoder {
        &self.decoder
    }

    pub fn dispatcher(&self) -> &EventDispatcher<S> {
        &self.dispatcher
    }

    pub fn controller(&self) -> &InteractionController<M> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut InteractionController<M> {
        &mut self.controller
    }

    pub fn metrics(&self) -> &SessionMetrics {
        &self.metrics
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
