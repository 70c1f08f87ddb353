//! Feature geometry: GeoJSON parsing, extents, buffering and hit-testing.
//!
//! # Hit-test rules
//! - Polygons: even-odd ray casting on the exterior ring, holes excluded
//! - Points: exact coordinate match
//! - Lines: never hit (no width in map units)

use crate::{
    error::{KioskError, Result},
    types::Coordinate,
};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Raw GeoJSON geometry (positions may carry a z / m component)
// ---------------------------------------------------------------------------

type Position = Vec<f64>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum RawGeometry {
    Point(Position),
    MultiPoint(Vec<Position>),
    LineString(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
    Polygon(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
}

// ---------------------------------------------------------------------------
// Typed geometry
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    pub exterior: Vec<Coordinate>,
    pub holes: Vec<Vec<Coordinate>>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    Point(Coordinate),
    MultiPoint(Vec<Coordinate>),
    LineString(Vec<Coordinate>),
    MultiLineString(Vec<Vec<Coordinate>>),
    Polygon(Polygon),
    MultiPolygon(Vec<Polygon>),
}

fn to_coordinate(pos: &[f64]) -> Result<Coordinate> {
    match pos {
        [x, y, ..] if x.is_finite() && y.is_finite() => Ok(Coordinate::new(*x, *y)),
        _ => Err(KioskError::MalformedGeometry(format!(
            "position {pos:?} needs two finite numbers"
        ))),
    }
}

fn to_line(positions: &[Position]) -> Result<Vec<Coordinate>> {
    positions.iter().map(|p| to_coordinate(p)).collect()
}

fn to_polygon(rings: &[Vec<Position>]) -> Result<Polygon> {
    let (exterior, holes) = rings
        .split_first()
        .ok_or_else(|| KioskError::MalformedGeometry("polygon without rings".into()))?;
    let exterior = to_line(exterior)?;
    if exterior.len() < 3 {
        return Err(KioskError::MalformedGeometry(
            "polygon ring needs at least three positions".into(),
        ));
    }
    Ok(Polygon {
        exterior,
        holes: holes.iter().map(|r| to_line(r)).collect::<Result<_>>()?,
    })
}

impl TryFrom<&RawGeometry> for Geometry {
    type Error = KioskError;

    fn try_from(raw: &RawGeometry) -> Result<Self> {
        let geometry = match raw {
            RawGeometry::Point(p) => Geometry::Point(to_coordinate(p)?),
            RawGeometry::MultiPoint(ps) => Geometry::MultiPoint(to_line(ps)?),
            RawGeometry::LineString(ps) => Geometry::LineString(to_line(ps)?),
            RawGeometry::MultiLineString(ls) => {
                Geometry::MultiLineString(ls.iter().map(|l| to_line(l)).collect::<Result<_>>()?)
            }
            RawGeometry::Polygon(rings) => Geometry::Polygon(to_polygon(rings)?),
            RawGeometry::MultiPolygon(polys) => Geometry::MultiPolygon(
                polys.iter().map(|p| to_polygon(p)).collect::<Result<_>>()?,
            ),
        };
        if geometry.coordinates().next().is_none() {
            return Err(KioskError::MalformedGeometry("empty geometry".into()));
        }
        Ok(geometry)
    }
}

fn ring_contains(ring: &[Coordinate], p: &Coordinate) -> bool {
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

impl Polygon {
    pub fn contains(&self, p: &Coordinate) -> bool {
        ring_contains(&self.exterior, p)
            && !self
                .holes
                .iter()
                .any(|h| h.len() >= 3 && ring_contains(h, p))
    }
}

impl Geometry {
    /// Every vertex of the geometry.
    pub fn coordinates(&self) -> Box<dyn Iterator<Item = &Coordinate> + '_> {
        match self {
            Geometry::Point(p) => Box::new(std::iter::once(p)),
            Geometry::MultiPoint(ps) | Geometry::LineString(ps) => Box::new(ps.iter()),
            Geometry::MultiLineString(ls) => Box::new(ls.iter().flatten()),
            Geometry::Polygon(poly) => Box::new(poly.exterior.iter()),
            Geometry::MultiPolygon(polys) => Box::new(polys.iter().flat_map(|p| p.exterior.iter())),
        }
    }

    /// Bounding box. Construction guarantees at least one vertex.
    pub fn extent(&self) -> Extent {
        Extent::from_coordinates(self.coordinates()).unwrap_or_else(Extent::empty)
    }

    pub fn contains_coordinate(&self, c: &Coordinate) -> bool {
        match self {
            Geometry::Point(p) => p == c,
            Geometry::MultiPoint(ps) => ps.iter().any(|p| p == c),
            Geometry::LineString(_) | Geometry::MultiLineString(_) => false,
            Geometry::Polygon(poly) => poly.contains(c),
            Geometry::MultiPolygon(polys) => polys.iter().any(|p| p.contains(c)),
        }
    }
}

// ---------------------------------------------------------------------------
// Extent
// ---------------------------------------------------------------------------

/// Axis-aligned bounding box `[min, max]` in map units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min: Coordinate,
    pub max: Coordinate,
}

impl Extent {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min: Coordinate::new(min_x, min_y),
            max: Coordinate::new(max_x, max_y),
        }
    }

    /// Inverted extent that contains nothing.
    pub fn empty() -> Self {
        Self::new(f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY)
    }

    pub fn from_coordinates<'a>(coords: impl IntoIterator<Item = &'a Coordinate>) -> Option<Self> {
        let mut iter = coords.into_iter();
        let first = iter.next()?;
        let mut extent = Self {
            min: *first,
            max: *first,
        };
        for c in iter {
            extent.min.x = extent.min.x.min(c.x);
            extent.min.y = extent.min.y.min(c.y);
            extent.max.x = extent.max.x.max(c.x);
            extent.max.y = extent.max.y.max(c.y);
        }
        Some(extent)
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Coordinate {
        nalgebra::center(&self.min, &self.max)
    }

    /// Grow the extent by `distance` on every side.
    pub fn buffer(&self, distance: f64) -> Self {
        Self::new(
            self.min.x - distance,
            self.min.y - distance,
            self.max.x + distance,
            self.max.y + distance,
        )
    }

    /// Inclusive containment (edges count as inside).
    pub fn contains(&self, c: &Coordinate) -> bool {
        self.min.x <= c.x && c.x <= self.max.x && self.min.y <= c.y && c.y <= self.max.y
    }

    /// Strict containment (edges count as outside).
    pub fn contains_strict(&self, c: &Coordinate) -> bool {
        self.min.x < c.x && c.x < self.max.x && self.min.y < c.y && c.y < self.max.y
    }

    /// Same size, recentred on `center`.
    pub fn recentered(&self, center: Coordinate) -> Self {
        let (hw, hh) = (self.width() / 2.0, self.height() / 2.0);
        Self::new(center.x - hw, center.y - hh, center.x + hw, center.y + hh)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
