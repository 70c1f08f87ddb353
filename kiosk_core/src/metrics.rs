//! Session metrics: packet dispositions, event counts, handler errors, timing.

use crate::{decoder::PacketDisposition, session::SessionOutput};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Accumulated statistics over a kiosk session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionMetrics {
    /// Packets received, whatever their disposition
    pub packets: u64,
    pub processed_packets: u64,
    pub duplicate_packets: u64,
    pub non_bundle_packets: u64,
    /// Packets dropped because TUIO input is disabled
    pub disabled_packets: u64,
    /// DOM events raised, by event name
    pub events: BTreeMap<String, u64>,
    pub handler_errors: u64,
    /// Number of step changes observed
    pub step_changes: u64,
    /// Sum of per-packet processing time
    pub total_time_us: u64,
    #[serde(skip)]
    last_step: Option<u8>,
}

impl SessionMetrics {
    pub fn accumulate(&mut self, output: &SessionOutput) {
        self.packets += 1;
        match output.disposition {
            PacketDisposition::Processed => self.processed_packets += 1,
            PacketDisposition::Duplicate => self.duplicate_packets += 1,
            PacketDisposition::NotBundle => self.non_bundle_packets += 1,
            PacketDisposition::Disabled => self.disabled_packets += 1,
        }
        for event in &output.dom_events {
            *self.events.entry(event.name().to_string()).or_default() += 1;
        }
        self.handler_errors += output.errors.len() as u64;
        if output.step.is_some() && output.step != self.last_step {
            self.step_changes += 1;
            self.last_step = output.step;
        }
        self.total_time_us += output.total_time_us;
    }

    pub fn event_count(&self, name: &str) -> u64 {
        self.events.get(name).copied().unwrap_or(0)
    }

    pub fn total_events(&self) -> u64 {
        self.events.values().sum()
    }

    /// Fraction of packets flagged as duplicates.
    pub fn duplicate_rate(&self) -> f64 {
        if self.packets == 0 {
            0.0
        } else {
            self.duplicate_packets as f64 / self.packets as f64
        }
    }

    pub fn mean_packet_time_us(&self) -> f64 {
        if self.packets == 0 {
            0.0
        } else {
            self.total_time_us as f64 / self.packets as f64
        }
    }
}
