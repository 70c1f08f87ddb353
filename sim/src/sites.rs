//! Synthetic site datasets: a grid of square parcels with random attributes.

use kiosk_core::{
    feature::{FeatureCollection, RawFeature},
    geometry::{Extent, RawGeometry},
    types::FeatureId,
};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Layout of the site grid, in map units.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SiteGrid {
    pub columns: usize,
    pub rows: usize,
    /// Side length of each square site
    pub size: f64,
    /// Distance between the lower-left corners of neighbouring sites
    pub spacing: f64,
    pub origin: [f64; 2],
    /// Criterion attributes are drawn uniformly from `0..=max_value`
    pub max_value: i64,
}

impl Default for SiteGrid {
    fn default() -> Self {
        Self {
            columns: 4,
            rows: 3,
            size: 100.0,
            spacing: 150.0,
            origin: [0.0, 0.0],
            max_value: 100,
        }
    }
}

impl SiteGrid {
    pub fn len(&self) -> usize {
        self.columns * self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lower-left corner of site `index` (row-major from the origin).
    pub fn corner(&self, index: usize) -> [f64; 2] {
        let col = (index % self.columns.max(1)) as f64;
        let row = (index / self.columns.max(1)) as f64;
        [
            self.origin[0] + col * self.spacing,
            self.origin[1] + row * self.spacing,
        ]
    }

    pub fn center(&self, index: usize) -> [f64; 2] {
        let [x, y] = self.corner(index);
        [x + self.size / 2.0, y + self.size / 2.0]
    }

    /// Bounds of the whole grid.
    pub fn extent(&self) -> Extent {
        let width = (self.columns.max(1) - 1) as f64 * self.spacing + self.size;
        let height = (self.rows.max(1) - 1) as f64 * self.spacing + self.size;
        Extent::new(
            self.origin[0],
            self.origin[1],
            self.origin[0] + width,
            self.origin[1] + height,
        )
    }
}

/// Generate the grid's sites with ids `1..=len`. Every fifth site carries its
/// attributes as strings, the way hand-edited GeoJSON often does.
pub fn generate_sites(grid: &SiteGrid, criteria: &[String], seed: u64) -> Vec<RawFeature> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..grid.len())
        .map(|i| {
            let [x, y] = grid.corner(i);
            let s = grid.size;
            let mut properties = Map::new();
            properties.insert("name".into(), json!(format!("Site {}", i + 1)));
            for key in criteria {
                let v = rng.gen_range(0..=grid.max_value);
                let value = if i % 5 == 4 { json!(v.to_string()) } else { json!(v) };
                properties.insert(key.clone(), value);
            }
            RawFeature {
                kind: "Feature".into(),
                id: Some(FeatureId::Number(i as i64 + 1)),
                geometry: RawGeometry::Polygon(vec![vec![
                    vec![x, y],
                    vec![x + s, y],
                    vec![x + s, y + s],
                    vec![x, y + s],
                    vec![x, y],
                ]]),
                properties,
            }
        })
        .collect()
}

pub fn site_collection(grid: &SiteGrid, criteria: &[String], seed: u64) -> FeatureCollection {
    FeatureCollection::new(generate_sites(grid, criteria, seed))
}

/// Attribute value of a generated site, as a number.
pub fn attribute(feature: &RawFeature, key: &str) -> Option<f64> {
    match feature.properties.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
