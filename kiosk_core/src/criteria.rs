//! Radar-chart vectors: the user-adjustable target criteria and per-feature
//! normalized value profiles.
//!
//! A [`RadarChartData`] is a value. Updating an axis yields a new vector so
//! observers can detect the change by comparing against what they hold.

use crate::config::SearchCriterion;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// Class name of the target vector.
pub const TARGET_CLASS: &str = "target-values";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartAxis {
    /// Criterion key
    pub name: String,
    pub display_name: String,
    pub color: String,
    /// Normalized value, [0, 1] for targets
    pub value: f64,
    pub slider_value: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarChartData {
    pub class_name: String,
    pub axes: Vec<ChartAxis>,
}

impl RadarChartData {
    pub fn new(class_name: impl Into<String>, axes: Vec<ChartAxis>) -> Self {
        Self {
            class_name: class_name.into(),
            axes,
        }
    }

    /// All-zero target vector, one axis per criterion, in criterion order.
    pub fn zero_target(criteria: &[SearchCriterion], locale: &str) -> Self {
        let axes = criteria
            .iter()
            .map(|c| ChartAxis {
                name: c.key.clone(),
                display_name: c.display_name(locale).to_string(),
                color: c.color.clone(),
                value: 0.0,
                slider_value: 0.0,
            })
            .collect();
        Self::new(TARGET_CLASS, axes)
    }

    pub fn find_axis(&self, key: &str) -> Option<&ChartAxis> {
        self.axes.iter().find(|a| a.name == key)
    }

    /// A copy with one axis value replaced. `None` if the key is unknown.
    pub fn with_value(&self, key: &str, value: f64) -> Option<Self> {
        let idx = self.axes.iter().position(|a| a.name == key)?;
        let mut axes = self.axes.clone();
        axes[idx].value = value;
        axes[idx].slider_value = value;
        Some(Self::new(self.class_name.clone(), axes))
    }

    /// Axis values looked up by key, in the order of `keys`.
    /// Unknown keys read as NaN.
    pub fn values_for(&self, keys: &[String]) -> DVector<f64> {
        DVector::from_iterator(
            keys.len(),
            keys.iter()
                .map(|k| self.find_axis(k).map(|a| a.value).unwrap_or(f64::NAN)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criteria() -> Vec<SearchCriterion> {
        vec![
            SearchCriterion::new("a", 10, "255, 0, 0"),
            SearchCriterion::new("b", 11, "0, 255, 0"),
        ]
    }

    #[test]
    fn with_value_returns_new_vector() {
        let target = RadarChartData::zero_target(&criteria(), "en-US");
        let updated = target.with_value("b", 0.75).unwrap();
        assert_eq!(target.find_axis("b").unwrap().value, 0.0, "original untouched");
        assert_eq!(updated.find_axis("b").unwrap().value, 0.75);
        assert_eq!(updated.find_axis("b").unwrap().slider_value, 0.75);
        assert_eq!(updated.class_name, TARGET_CLASS);
        assert!(target.with_value("zzz", 1.0).is_none());
    }

    #[test]
    fn values_follow_key_order() {
        let target = RadarChartData::zero_target(&criteria(), "en-US")
            .with_value("a", 0.2)
            .unwrap();
        let v = target.values_for(&["b".to_string(), "a".to_string()]);
        assert_eq!(v.as_slice(), &[0.0, 0.2]);
    }
}
