//! Marker classification by fiducial class id.
//!
//! Priority, first match wins: parameter criterion (`markerID`), progress
//! marker, selection marker. Anything else is tracked but not actionable.

use crate::{
    config::{KioskConfig, SearchCriterion},
    types::ClassId,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MarkerKind<'a> {
    /// Adjusts the weight of one search criterion
    Parameter(&'a SearchCriterion),
    /// Switches application steps
    Progress,
    /// Queries and locks sites on the map
    Selection,
    Unknown,
}

impl MarkerKind<'_> {
    pub fn label(&self) -> &'static str {
        match self {
            MarkerKind::Parameter(_) => "parameter",
            MarkerKind::Progress => "progress",
            MarkerKind::Selection => "selection",
            MarkerKind::Unknown => "unknown",
        }
    }
}

pub fn classify(config: &KioskConfig, class_id: ClassId) -> MarkerKind<'_> {
    if let Some(criterion) = config.criterion_by_marker(class_id) {
        MarkerKind::Parameter(criterion)
    } else if class_id == config.progress_marker_id {
        MarkerKind::Progress
    } else if class_id == config.selection_marker_id {
        MarkerKind::Selection
    } else {
        MarkerKind::Unknown
    }
}
