//! Geographic coordinate and geometry types.
//!
//! `GeoPoint` uses `f64` latitude/longitude: route geometry round-trips
//! through the document store and must survive unchanged, so single-precision
//! is not an option here.
//!
//! `Geometry` mirrors the GeoJSON shapes stored on traffic incident documents
//! (`{"type": "Point", "coordinates": [lon, lat]}` and polygon equivalents).

use serde::{Deserialize, Serialize};

/// A WGS-84 geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        const R: f64 = 6_371_000.0; // mean Earth radius, metres

        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        R * c
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

// ── Geometry ──────────────────────────────────────────────────────────────────

/// How close a route point must pass to a `Point` geometry to count as
/// intersecting it, in metres.
pub const POINT_TOLERANCE_M: f64 = 25.0;

/// A GeoJSON-style geometry as stored on traffic incident documents.
///
/// Coordinates follow the GeoJSON convention: `[longitude, latitude]`.
/// Polygons carry one or more linear rings; only the first (outer) ring is
/// evaluated by [`Geometry::covers`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point([f64; 2]),
    Polygon(Vec<Vec<[f64; 2]>>),
}

impl Geometry {
    /// True if `p` lies within this geometry: inside the outer ring for a
    /// polygon, or within [`POINT_TOLERANCE_M`] for a point.
    pub fn covers(&self, p: GeoPoint) -> bool {
        match self {
            Geometry::Point([lon, lat]) => {
                GeoPoint::new(*lat, *lon).distance_m(p) <= POINT_TOLERANCE_M
            }
            Geometry::Polygon(rings) => match rings.first() {
                Some(ring) => point_in_ring(p, ring),
                None => false,
            },
        }
    }

    /// Axis-aligned bounding box as `([min_lon, min_lat], [max_lon, max_lat])`,
    /// padded for point tolerance.  Used as a cheap pre-filter by spatial
    /// indexes before the exact [`covers`](Self::covers) check.
    pub fn bbox(&self) -> ([f64; 2], [f64; 2]) {
        match self {
            Geometry::Point([lon, lat]) => {
                // ~1e-4 deg ≈ 11 m at the equator; generous for the 25 m tolerance.
                let pad = 5.0 * 1e-4;
                ([lon - pad, lat - pad], [lon + pad, lat + pad])
            }
            Geometry::Polygon(rings) => {
                let mut min = [f64::INFINITY, f64::INFINITY];
                let mut max = [f64::NEG_INFINITY, f64::NEG_INFINITY];
                for [lon, lat] in rings.iter().flatten() {
                    min[0] = min[0].min(*lon);
                    min[1] = min[1].min(*lat);
                    max[0] = max[0].max(*lon);
                    max[1] = max[1].max(*lat);
                }
                (min, max)
            }
        }
    }
}

/// Ray-casting point-in-polygon test against a single `[lon, lat]` ring.
fn point_in_ring(p: GeoPoint, ring: &[[f64; 2]]) -> bool {
    let (x, y) = (p.lon, p.lat);
    let mut inside = false;
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let [xi, yi] = ring[i];
        let [xj, yj] = ring[j];
        if ((yi > y) != (yj > y)) && (x < (xj - xi) * (y - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
        j = i;
    }
    inside
}
