#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! In-memory spatial index for geodesic point-radius queries.
//!
//! Intersections and selected camera sites are stored as points in an
//! R-tree keyed by `[lon, lat]`. A radius query first intersects a
//! degree-padded bounding envelope against the tree, then applies the
//! exact haversine distance to each candidate, keeping per-query cost
//! well below a linear scan for city-scale datasets.

use rstar::{AABB, RTree, RTreeObject};

/// Mean Earth radius in meters used by the haversine formula.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Widens the query envelope beyond the exact degree extent of the
/// radius so candidates just past a naive bound are not missed before
/// the exact distance filter runs. Must stay >= 1.
const ENVELOPE_PADDING: f64 = 1.1;

/// Great-circle distance in meters between two coordinate pairs.
#[must_use]
pub fn haversine_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let to_rad = std::f64::consts::PI / 180.0;
    let d_lat = (lat2 - lat1) * to_rad;
    let d_lon = (lon2 - lon1) * to_rad;
    let a = (d_lat / 2.0).sin().powi(2)
        + (lat1 * to_rad).cos() * (lat2 * to_rad).cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

/// A keyed point stored in the R-tree.
struct PointEntry {
    key: usize,
    lat: f64,
    lon: f64,
}

impl RTreeObject for PointEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.lon, self.lat])
    }
}

/// Mutable spatial index over keyed points.
///
/// Supports "which registered keys lie within R meters of (lat, lon)?"
/// with true geodesic distance for the final accept/reject decision.
/// Not designed for concurrent mutation; each computation run owns its
/// own instances.
#[derive(Default)]
pub struct PointIndex {
    tree: RTree<PointEntry>,
}

impl PointIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a point under the given key. Keys are opaque to the
    /// index; duplicates are stored as distinct points.
    pub fn insert(&mut self, key: usize, lat: f64, lon: f64) {
        self.tree.insert(PointEntry { key, lat, lon });
    }

    /// Keys of all points within `radius_m` meters of the query point
    /// (inclusive).
    #[must_use]
    pub fn within_radius(&self, lat: f64, lon: f64, radius_m: f64) -> Vec<usize> {
        self.candidates(lat, lon, radius_m)
            .filter(|entry| haversine_meters(lat, lon, entry.lat, entry.lon) <= radius_m)
            .map(|entry| entry.key)
            .collect()
    }

    /// Whether any point lies strictly closer than `radius_m` meters to
    /// the query point. Used for minimum-separation checks, where a site
    /// exactly at the threshold distance is allowed.
    #[must_use]
    pub fn any_within(&self, lat: f64, lon: f64, radius_m: f64) -> bool {
        self.candidates(lat, lon, radius_m)
            .any(|entry| haversine_meters(lat, lon, entry.lat, entry.lon) < radius_m)
    }

    /// Number of stored points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Whether the index holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Coarse envelope pass: every stored point whose position falls in
    /// the degree-padded bounding box of the radius around the query.
    fn candidates(&self, lat: f64, lon: f64, radius_m: f64) -> impl Iterator<Item = &PointEntry> {
        let envelope = query_envelope(lat, lon, radius_m);
        self.tree.locate_in_envelope_intersecting(&envelope)
    }
}

/// Bounding box in degrees around a query point, sized to the radius
/// with the safety padding applied. Longitude extent is widened by the
/// latitude cosine (clamped away from zero so polar queries degrade to a
/// full scan instead of dividing by zero).
fn query_envelope(lat: f64, lon: f64, radius_m: f64) -> AABB<[f64; 2]> {
    let d_lat = radius_m / EARTH_RADIUS_M * (180.0 / std::f64::consts::PI) * ENVELOPE_PADDING;
    let cos_lat = (lat * std::f64::consts::PI / 180.0).cos().abs().max(0.01);
    let d_lon = d_lat / cos_lat;
    AABB::from_corners([lon - d_lon, lat - d_lat], [lon + d_lon, lat + d_lat])
}
