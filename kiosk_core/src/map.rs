//! Map view seam: screen-to-map conversion, feature queries and the few
//! map-side effects the interaction logic triggers.

use crate::{
    feature::Feature,
    geometry::Extent,
    types::{Coordinate, FeatureId},
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, sync::Arc};

/// The map display (external collaborator).
pub trait MapView {
    /// Map coordinate under a normalized window position, `None` unless it
    /// lies strictly inside the current view extent.
    fn coordinate_from_xy(&self, x: f64, y: f64) -> Option<Coordinate>;

    /// Selectable features whose geometry contains the coordinate, topmost first.
    fn features_at(&self, coordinate: &Coordinate) -> Vec<Arc<Feature>>;

    /// Mark a feature as selected (everything else deselected).
    fn select_feature(&mut self, feature: &Feature, coordinate: Coordinate);

    /// Show or clear the locked highlight of a feature.
    fn set_locked(&mut self, id: &FeatureId, locked: bool);

    /// Zoom out, fly to `center`, zoom in.
    fn fly_to(&mut self, center: Coordinate, zoom_out: f64, zoom_in: f64);
}

/// Camera move recorded by [`SiteMap::fly_to`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlyTo {
    pub center: Coordinate,
    pub zoom_out: f64,
    pub zoom_in: f64,
}

/// In-process map over a fixed view extent and the loaded sites.
#[derive(Clone, Debug, Default)]
pub struct SiteMap {
    view: Option<Extent>,
    sites: Vec<Arc<Feature>>,
    selected: Option<FeatureId>,
    locked: BTreeSet<FeatureId>,
    flights: Vec<FlyTo>,
}

impl SiteMap {
    pub fn new(view: Extent, sites: Vec<Arc<Feature>>) -> Self {
        Self {
            view: Some(view),
            sites,
            ..Default::default()
        }
    }

    pub fn view(&self) -> Option<Extent> {
        self.view
    }

    pub fn set_sites(&mut self, sites: Vec<Arc<Feature>>) {
        self.sites = sites;
    }

    pub fn selected(&self) -> Option<&FeatureId> {
        self.selected.as_ref()
    }

    pub fn is_locked(&self, id: &FeatureId) -> bool {
        self.locked.contains(id)
    }

    pub fn flights(&self) -> &[FlyTo] {
        &self.flights
    }

    /// Normalized window position of a map coordinate (inverse of
    /// [`MapView::coordinate_from_xy`]).
    pub fn xy_from_coordinate(&self, c: &Coordinate) -> Option<(f64, f64)> {
        let view = self.view?;
        Some((
            (c.x - view.min.x) / view.width(),
            (view.max.y - c.y) / view.height(),
        ))
    }
}

impl MapView for SiteMap {
    fn coordinate_from_xy(&self, x: f64, y: f64) -> Option<Coordinate> {
        let view = self.view?;
        // Window y grows downwards, map y upwards.
        let c = Coordinate::new(view.min.x + x * view.width(), view.max.y - y * view.height());
        view.contains_strict(&c).then_some(c)
    }

    fn features_at(&self, coordinate: &Coordinate) -> Vec<Arc<Feature>> {
        self.sites
            .iter()
            .rev()
            .filter(|f| f.extent.contains(coordinate) && f.geometry.contains_coordinate(coordinate))
            .cloned()
            .collect()
    }

    fn select_feature(&mut self, feature: &Feature, _coordinate: Coordinate) {
        self.selected = Some(feature.id.clone());
    }

    fn set_locked(&mut self, id: &FeatureId, locked: bool) {
        if locked {
            self.locked.insert(id.clone());
        } else {
            self.locked.remove(id);
        }
    }

    fn fly_to(&mut self, center: Coordinate, zoom_out: f64, zoom_in: f64) {
        self.view = self.view.map(|v| v.recentered(center));
        self.flights.push(FlyTo {
            center,
            zoom_out,
            zoom_in,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{feature::RawFeature, geometry::RawGeometry};

    fn square(id: i64, x: f64, y: f64, size: f64) -> Arc<Feature> {
        let raw = RawFeature {
            kind: "Feature".into(),
            id: Some(FeatureId::Number(id)),
            geometry: RawGeometry::Polygon(vec![vec![
                vec![x, y],
                vec![x + size, y],
                vec![x + size, y + size],
                vec![x, y + size],
                vec![x, y],
            ]]),
            properties: Default::default(),
        };
        Arc::new(Feature::from_raw(&raw).unwrap())
    }

    #[test]
    fn screen_to_map_is_strict_and_flips_y() {
        let map = SiteMap::new(Extent::new(0.0, 0.0, 1000.0, 500.0), vec![]);
        assert_eq!(map.coordinate_from_xy(0.25, 0.2), Some(Coordinate::new(250.0, 400.0)));
        assert_eq!(map.coordinate_from_xy(0.0, 0.5), None, "left edge is outside");
        assert_eq!(map.coordinate_from_xy(1.2, 0.5), None);
        assert_eq!(map.xy_from_coordinate(&Coordinate::new(250.0, 400.0)), Some((0.25, 0.2)));
    }

    #[test]
    fn features_at_returns_topmost_first() {
        let map = SiteMap::new(
            Extent::new(0.0, 0.0, 1000.0, 1000.0),
            vec![square(1, 0.0, 0.0, 100.0), square(2, 50.0, 50.0, 100.0)],
        );
        let hits: Vec<_> = map
            .features_at(&Coordinate::new(75.0, 75.0))
            .iter()
            .map(|f| f.id.clone())
            .collect();
        assert_eq!(hits, vec![FeatureId::Number(2), FeatureId::Number(1)]);
        assert!(map.features_at(&Coordinate::new(500.0, 500.0)).is_empty());
    }

    #[test]
    fn fly_to_recenters_view() {
        let mut map = SiteMap::new(Extent::new(0.0, 0.0, 100.0, 100.0), vec![]);
        map.fly_to(Coordinate::new(500.0, 500.0), 13.0, 17.0);
        assert_eq!(map.view(), Some(Extent::new(450.0, 450.0, 550.0, 550.0)));
        assert_eq!(map.flights().len(), 1);
        map.set_locked(&FeatureId::Number(3), true);
        assert!(map.is_locked(&FeatureId::Number(3)));
        map.set_locked(&FeatureId::Number(3), false);
        assert!(!map.is_locked(&FeatureId::Number(3)));
    }
}
