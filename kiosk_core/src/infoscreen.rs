//! Receiving side of the sync channel: the infoscreen's display state.

use crate::{
    criteria::RadarChartData,
    feature::FeatureSummary,
    sync::{StorageEvent, SyncMessage, MESSAGE_KEY},
};

/// Number of locked sites shown side by side.
pub const TOP_FEATURES_SHOWN: usize = 3;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct InfoscreenState {
    pub progress: u8,
    pub selected_feature: Option<FeatureSummary>,
    pub selected_chart: Option<RadarChartData>,
    pub top_features: Vec<FeatureSummary>,
    pub top_features_to_display: Vec<FeatureSummary>,
    pub top_feature_charts: Vec<RadarChartData>,
    pub target_chart: Option<RadarChartData>,
}

impl InfoscreenState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one storage event. Returns the decoded message if it changed
    /// anything; other keys, cleared values and garbage are ignored.
    pub fn receive(&mut self, event: &StorageEvent) -> Option<SyncMessage> {
        if event.key != MESSAGE_KEY {
            return None;
        }
        let raw = event.new_value.as_deref()?;
        let message: SyncMessage = match serde_json::from_str(raw) {
            Ok(m) => m,
            Err(err) => {
                tracing::warn!(%err, "dropping undecodable sync payload");
                return None;
            }
        };
        self.apply(&message);
        Some(message)
    }

    pub fn apply(&mut self, message: &SyncMessage) {
        match message {
            SyncMessage::SetProgress { step } => self.progress = *step,
            SyncMessage::SelectFeature {
                feature,
                chart_data,
            }
            | SyncMessage::ComputerSagt {
                feature,
                chart_data,
            } => {
                self.selected_feature = Some(feature.clone());
                self.selected_chart = Some(chart_data.clone());
            }
            SyncMessage::SetTopFeatures {
                top_features,
                chart_datas,
            } => {
                self.top_features = top_features.clone();
                self.top_features_to_display = top_features
                    .iter()
                    .take(TOP_FEATURES_SHOWN)
                    .cloned()
                    .collect();
                self.top_feature_charts = chart_datas.clone();
            }
            SyncMessage::SetCriteria { chart_data } => {
                self.target_chart = Some(chart_data.clone());
            }
        }
    }

    pub fn is_selected_feature_locked(&self) -> bool {
        self.selected_feature
            .as_ref()
            .is_some_and(|sel| self.top_features.iter().any(|f| f.id == sel.id))
    }
}
