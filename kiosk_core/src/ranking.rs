//! Similarity ranking: normalize site attributes against observed maxima and
//! find the site closest to the target criteria vector.
//!
//! # Scoring
//! For every criterion key `k`:
//! ```text
//! max[k]        = max over sites of (parseInt(site[k]) || 0), starting at 0
//! normalized[k] = site[k] / max[k]            (∞ / NaN when max[k] = 0)
//! distance      = ‖normalized − target‖₂
//! ```
//! The best match is the first site with the strictly smallest distance.
//! The scan is brute force over all sites; distances are computed in
//! parallel, the winner is picked sequentially so ties stay deterministic.

use crate::{
    config::{KioskConfig, SearchCriterion},
    criteria::{ChartAxis, RadarChartData},
    error::{KioskError, Result},
    feature::{Feature, RawFeature},
    numeric::{parse_int_or_zero, to_number},
    types::FeatureId,
};
use nalgebra::DVector;
use rayon::prelude::*;
use std::{cmp::Ordering, collections::BTreeMap, sync::Arc};

/// Criterion key → maximum observed value.
pub type MaxValues = BTreeMap<String, f64>;

/// Owns the working set of sites, their maxima, the target vector and the
/// locked ("top") sites.
#[derive(Clone, Debug)]
pub struct RankingEngine {
    criteria: Vec<SearchCriterion>,
    keys: Vec<String>,
    all_features: Vec<Arc<Feature>>,
    top_features: Vec<Arc<Feature>>,
    max_values: Option<MaxValues>,
    target: Arc<RadarChartData>,
}

fn cmp_distance(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.total_cmp(&b),
    }
}

impl RankingEngine {
    pub fn new(config: &KioskConfig) -> Self {
        Self {
            criteria: config.search_criteria.clone(),
            keys: config.criteria_keys(),
            all_features: Vec::new(),
            top_features: Vec::new(),
            max_values: None,
            target: Arc::new(RadarChartData::zero_target(
                &config.search_criteria,
                &config.locale,
            )),
        }
    }

    // -----------------------------------------------------------------------
    // Working set
    // -----------------------------------------------------------------------

    /// Replace the working set. Locked sites and maxima are kept.
    pub fn set_features(&mut self, features: Vec<Feature>) {
        self.all_features = features.into_iter().map(Arc::new).collect();
    }

    /// Build sites from raw records and replace the working set.
    pub fn load_features(&mut self, raw: &[RawFeature]) -> Result<usize> {
        let features = raw.iter().map(Feature::from_raw).collect::<Result<Vec<_>>>()?;
        let n = features.len();
        self.set_features(features);
        tracing::debug!(features = n, "site working set replaced");
        Ok(n)
    }

    pub fn features(&self) -> &[Arc<Feature>] {
        &self.all_features
    }

    pub fn find_feature(&self, id: &FeatureId) -> Option<&Arc<Feature>> {
        self.all_features.iter().find(|f| &f.id == id)
    }

    pub fn criteria_keys(&self) -> &[String] {
        &self.keys
    }

    // -----------------------------------------------------------------------
    // Maxima & normalization
    // -----------------------------------------------------------------------

    /// Fold the current working set into the maxima. Values never decrease
    /// across reloads.
    pub fn calculate_max_values(&mut self) -> &MaxValues {
        let mut maxima = self.max_values.take().unwrap_or_default();
        for key in &self.keys {
            let observed = self
                .all_features
                .iter()
                .map(|f| parse_int_or_zero(f.property(key)))
                .fold(0.0_f64, f64::max);
            let entry = maxima.entry(key.clone()).or_insert(0.0);
            *entry = entry.max(observed);
        }
        tracing::debug!(?maxima, "max values calculated");
        self.max_values.insert(maxima)
    }

    pub fn max_values(&self) -> Option<&MaxValues> {
        self.max_values.as_ref()
    }

    /// Maxima covering every criterion, or `NotReady`.
    fn ready_maxima(&self) -> Result<&MaxValues> {
        match &self.max_values {
            Some(m) if self.keys.iter().all(|k| m.contains_key(k)) => Ok(m),
            _ => Err(KioskError::NotReady),
        }
    }

    fn normalized_with(&self, maxima: &MaxValues, feature: &Feature) -> DVector<f64> {
        DVector::from_iterator(
            self.keys.len(),
            self.keys.iter().map(|k| {
                let max = maxima.get(k).copied().unwrap_or(f64::NAN);
                to_number(feature.property(k)) / max
            }),
        )
    }

    /// Per-criterion `value / max`, in criterion order.
    pub fn normalize(&self, feature: &Feature) -> Result<DVector<f64>> {
        let maxima = self.ready_maxima()?;
        Ok(self.normalized_with(maxima, feature))
    }

    /// Euclidean distance between the site's normalized values and the target.
    pub fn distance(&self, feature: &Feature) -> Result<f64> {
        let target = self.target.values_for(&self.keys);
        Ok((self.normalize(feature)? - target).norm())
    }

    fn all_distances(&self) -> Result<Vec<f64>> {
        let maxima = self.ready_maxima()?;
        let target = self.target.values_for(&self.keys);
        Ok(self
            .all_features
            .par_iter()
            .map(|f| (self.normalized_with(maxima, f) - &target).norm())
            .collect())
    }

    // -----------------------------------------------------------------------
    // Ranking
    // -----------------------------------------------------------------------

    /// The site closest to the target vector. `None` for an empty working set
    /// or when no distance is a number.
    pub fn best_match(&self) -> Result<Option<Arc<Feature>>> {
        let distances = self.all_distances()?;
        let mut best: Option<(usize, f64)> = None;
        for (i, &d) in distances.iter().enumerate() {
            if d < best.map_or(f64::INFINITY, |(_, bd)| bd) {
                best = Some((i, d));
            }
        }
        Ok(best.map(|(i, d)| {
            let winner = Arc::clone(&self.all_features[i]);
            tracing::debug!(feature = %winner.id, distance = d, "best match");
            winner
        }))
    }

    /// Sites by ascending distance (stable, NaN last), at most `n`.
    pub fn ranked(&self, n: usize) -> Result<Vec<(Arc<Feature>, f64)>> {
        let distances = self.all_distances()?;
        let mut ranked: Vec<(Arc<Feature>, f64)> = self
            .all_features
            .iter()
            .cloned()
            .zip(distances)
            .collect();
        ranked.sort_by(|a, b| cmp_distance(a.1, b.1));
        ranked.truncate(n);
        Ok(ranked)
    }

    // -----------------------------------------------------------------------
    // Target criteria
    // -----------------------------------------------------------------------

    pub fn target(&self) -> &Arc<RadarChartData> {
        &self.target
    }

    /// Replace one axis of the target vector; returns the new vector.
    pub fn update_target_criteria(&mut self, key: &str, value: f64) -> Result<Arc<RadarChartData>> {
        let updated = self
            .target
            .with_value(key, value)
            .ok_or_else(|| KioskError::UnknownCriterion(key.to_string()))?;
        self.target = Arc::new(updated);
        Ok(Arc::clone(&self.target))
    }

    /// Radar profile of a site: `<id>-values` with its normalized values.
    pub fn chart_data_for(&self, feature: &Feature) -> Result<RadarChartData> {
        let normalized = self.normalize(feature)?;
        let axes = self
            .criteria
            .iter()
            .zip(normalized.iter())
            .map(|(c, &value)| ChartAxis {
                name: c.key.clone(),
                display_name: String::new(),
                color: c.color.clone(),
                value,
                slider_value: value,
            })
            .collect();
        Ok(RadarChartData::new(format!("{}-values", feature.id), axes))
    }

    // -----------------------------------------------------------------------
    // Locked sites
    // -----------------------------------------------------------------------

    /// Append a site to the locked list. No membership check: locking twice
    /// inserts twice, callers check [`is_locked`](Self::is_locked) first.
    pub fn lock_feature(&mut self, id: &FeatureId) -> Result<()> {
        let feature = self
            .find_feature(id)
            .cloned()
            .ok_or_else(|| KioskError::UnknownFeature(id.clone()))?;
        self.top_features.push(feature);
        Ok(())
    }

    /// Remove the first locked entry with this id. Returns false if none.
    pub fn unlock_feature(&mut self, id: &FeatureId) -> bool {
        match self.top_features.iter().position(|f| &f.id == id) {
            Some(idx) => {
                self.top_features.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn is_locked(&self, id: &FeatureId) -> bool {
        self.top_features.iter().any(|f| &f.id == id)
    }

    pub fn top_features(&self) -> &[Arc<Feature>] {
        &self.top_features
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::RawGeometry;
    use crate::types::ClassId;
    use serde_json::{json, Value};

    fn config(keys: &[&str]) -> KioskConfig {
        let criteria = keys
            .iter()
            .enumerate()
            .map(|(i, k)| SearchCriterion::new(k, 10 + i as i32, "0, 0, 0"))
            .collect();
        KioskConfig::new(criteria, ClassId(1), ClassId(2))
    }

    fn raw(id: i64, props: Value) -> RawFeature {
        RawFeature {
            kind: "Feature".into(),
            id: Some(FeatureId::Number(id)),
            geometry: RawGeometry::Point(vec![id as f64, 0.0]),
            properties: props.as_object().cloned().unwrap_or_default(),
        }
    }

    fn engine(keys: &[&str], features: Vec<RawFeature>) -> RankingEngine {
        let mut engine = RankingEngine::new(&config(keys));
        engine.load_features(&features).unwrap();
        engine
    }

    #[test]
    fn two_site_scenario_picks_exact_match() {
        let mut engine = engine(
            &["a", "b"],
            vec![raw(1, json!({"a": 10, "b": 0})), raw(2, json!({"a": 0, "b": 10}))],
        );
        let maxima = engine.calculate_max_values().clone();
        assert_eq!(maxima["a"], 10.0);
        assert_eq!(maxima["b"], 10.0);

        engine.update_target_criteria("a", 1.0).unwrap();
        let f1 = Arc::clone(&engine.features()[0]);
        assert_eq!(engine.normalize(&f1).unwrap().as_slice(), &[1.0, 0.0]);
        assert_eq!(engine.distance(&f1).unwrap(), 0.0);
        assert_eq!(engine.best_match().unwrap().unwrap().id, FeatureId::Number(1));
    }

    #[test]
    fn maxima_use_parse_int_and_ignore_garbage() {
        let mut engine = engine(
            &["a"],
            vec![
                raw(1, json!({"a": "12.9 ha"})),
                raw(2, json!({"a": "n/a"})),
                raw(3, json!({})),
                raw(4, json!({"a": -40})),
            ],
        );
        assert_eq!(engine.calculate_max_values()["a"], 12.0);
    }

    #[test]
    fn maxima_of_empty_set_are_zero() {
        let mut engine = engine(&["a", "b"], vec![]);
        let maxima = engine.calculate_max_values();
        assert_eq!(maxima["a"], 0.0);
        assert_eq!(maxima["b"], 0.0);
        assert!(engine.best_match().unwrap().is_none());
    }

    #[test]
    fn maxima_never_decrease_across_reloads() {
        let mut engine = engine(&["a"], vec![raw(1, json!({"a": 50}))]);
        engine.calculate_max_values();
        engine.load_features(&[raw(2, json!({"a": 5}))]).unwrap();
        assert_eq!(engine.calculate_max_values()["a"], 50.0);
    }

    #[test]
    fn zero_maximum_propagates_infinity_and_nan() {
        let mut engine = engine(
            &["a"],
            vec![raw(1, json!({"a": 0})), raw(2, json!({"a": "0.5"}))],
        );
        engine.calculate_max_values();
        let n1 = engine.normalize(&engine.features()[0]).unwrap();
        let n2 = engine.normalize(&engine.features()[1]).unwrap();
        assert!(n1[0].is_nan(), "0 / 0");
        assert_eq!(n2[0], f64::INFINITY, "0.5 / 0");
        assert!(engine.best_match().unwrap().is_none(), "no finite distance wins");
    }

    #[test]
    fn normalize_before_maxima_is_not_ready() {
        let engine = engine(&["a"], vec![raw(1, json!({"a": 3}))]);
        assert!(matches!(
            engine.normalize(&engine.features()[0]),
            Err(KioskError::NotReady)
        ));
        assert!(matches!(engine.best_match(), Err(KioskError::NotReady)));
        assert!(matches!(engine.ranked(3), Err(KioskError::NotReady)));
    }

    #[test]
    fn exact_ties_go_to_first_site() {
        let mut engine = engine(
            &["a"],
            vec![
                raw(7, json!({"a": 5})),
                raw(8, json!({"a": 5})),
                raw(9, json!({"a": 10})),
            ],
        );
        engine.calculate_max_values();
        engine.update_target_criteria("a", 0.5).unwrap();
        assert_eq!(engine.best_match().unwrap().unwrap().id, FeatureId::Number(7));
        let ranked = engine.ranked(2).unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].0.id, FeatureId::Number(7));
        assert_eq!(ranked[1].0.id, FeatureId::Number(8));
    }

    #[test]
    fn target_updates_produce_new_values() {
        let mut engine = engine(&["a", "b"], vec![]);
        let before = Arc::clone(engine.target());
        let after = engine.update_target_criteria("b", 0.3).unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_ne!(*before, *after);
        assert_eq!(before.find_axis("b").unwrap().value, 0.0);
        assert!(matches!(
            engine.update_target_criteria("nope", 0.1),
            Err(KioskError::UnknownCriterion(_))
        ));
    }

    #[test]
    fn lock_then_unlock_restores_order() {
        let mut engine = engine(
            &["a"],
            vec![raw(1, json!({})), raw(2, json!({})), raw(3, json!({}))],
        );
        engine.lock_feature(&FeatureId::Number(1)).unwrap();
        engine.lock_feature(&FeatureId::Number(3)).unwrap();
        engine.lock_feature(&FeatureId::Number(2)).unwrap();
        assert!(engine.unlock_feature(&FeatureId::Number(3)));
        let order: Vec<_> = engine.top_features().iter().map(|f| f.id.clone()).collect();
        assert_eq!(order, vec![FeatureId::Number(1), FeatureId::Number(2)]);
        assert!(!engine.unlock_feature(&FeatureId::Number(3)), "already unlocked");
        assert!(engine.lock_feature(&FeatureId::Number(99)).is_err());
    }

    #[test]
    fn double_lock_inserts_duplicate() {
        let mut engine = engine(&["a"], vec![raw(1, json!({}))]);
        engine.lock_feature(&FeatureId::Number(1)).unwrap();
        engine.lock_feature(&FeatureId::Number(1)).unwrap();
        assert_eq!(engine.top_features().len(), 2);
    }

    #[test]
    fn chart_data_names_feature_values() {
        let mut engine = engine(&["a", "b"], vec![raw(4, json!({"a": 2, "b": 8}))]);
        engine.calculate_max_values();
        let chart = engine.chart_data_for(&engine.features()[0]).unwrap();
        assert_eq!(chart.class_name, "4-values");
        assert_eq!(chart.find_axis("a").unwrap().value, 1.0);
        assert_eq!(chart.find_axis("b").unwrap().value, 1.0);
    }
}
