//! Cross-window sync channel between the touchscreen and the infoscreen.
//!
//! # Delivery contract
//! - One well-known key (`message`); a publish writes the JSON payload and
//!   immediately clears it, so every other endpoint sees two storage events:
//!   the value, then `None`
//! - The publishing endpoint never sees its own events
//! - Best effort, last write wins, no replay for endpoints created later

use crate::{
    criteria::RadarChartData,
    error::Result,
    feature::FeatureSummary,
};
use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

/// Storage key carrying the messages.
pub const MESSAGE_KEY: &str = "message";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SyncMessage {
    SetProgress {
        step: u8,
    },
    #[serde(rename_all = "camelCase")]
    SetCriteria {
        chart_data: RadarChartData,
    },
    #[serde(rename_all = "camelCase")]
    SelectFeature {
        feature: FeatureSummary,
        chart_data: RadarChartData,
    },
    #[serde(rename_all = "camelCase")]
    SetTopFeatures {
        top_features: Vec<FeatureSummary>,
        chart_datas: Vec<RadarChartData>,
    },
    /// Best-match announcement
    #[serde(rename_all = "camelCase")]
    ComputerSagt {
        feature: FeatureSummary,
        chart_data: RadarChartData,
    },
}

impl SyncMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            SyncMessage::SetProgress { .. } => "setProgress",
            SyncMessage::SetCriteria { .. } => "setCriteria",
            SyncMessage::SelectFeature { .. } => "selectFeature",
            SyncMessage::SetTopFeatures { .. } => "setTopFeatures",
            SyncMessage::ComputerSagt { .. } => "computerSagt",
        }
    }
}

/// Change notification for one storage key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    /// `None` when the key was cleared
    pub new_value: Option<String>,
}

// ---------------------------------------------------------------------------
// Bus
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct BusInner {
    next_id: u64,
    subscribers: Vec<(u64, Sender<StorageEvent>)>,
}

/// Shared broadcast medium; cheap to clone, endpoints may live on other threads.
#[derive(Clone, Debug, Default)]
pub struct SyncBus {
    inner: Arc<Mutex<BusInner>>,
}

impl SyncBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BusInner> {
        // Critical sections are single Vec operations.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Attach a new window. It only sees events published after this call.
    pub fn endpoint(&self) -> SyncEndpoint {
        let (tx, rx) = unbounded();
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push((id, tx));
        SyncEndpoint {
            id,
            bus: self.clone(),
            rx,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    fn broadcast(&self, from: u64, event: &StorageEvent) {
        self.lock()
            .subscribers
            .retain(|(id, tx)| *id == from || tx.send(event.clone()).is_ok());
    }

    fn detach(&self, id: u64) {
        self.lock().subscribers.retain(|(sid, _)| *sid != id);
    }
}

/// One window's view of the bus.
#[derive(Debug)]
pub struct SyncEndpoint {
    id: u64,
    bus: SyncBus,
    rx: Receiver<StorageEvent>,
}

impl SyncEndpoint {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Write the message under [`MESSAGE_KEY`], then clear the key.
    pub fn publish(&self, message: &SyncMessage) -> Result<()> {
        let json = serde_json::to_string(message)?;
        tracing::debug!(kind = message.kind(), bytes = json.len(), "sync publish");
        self.bus.broadcast(
            self.id,
            &StorageEvent {
                key: MESSAGE_KEY.to_string(),
                new_value: Some(json),
            },
        );
        self.bus.broadcast(
            self.id,
            &StorageEvent {
                key: MESSAGE_KEY.to_string(),
                new_value: None,
            },
        );
        Ok(())
    }

    pub fn try_recv(&self) -> Option<StorageEvent> {
        self.rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<StorageEvent> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// All events received so far.
    pub fn drain(&self) -> Vec<StorageEvent> {
        self.rx.try_iter().collect()
    }
}

impl Drop for SyncEndpoint {
    fn drop(&mut self) {
        self.bus.detach(self.id);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
