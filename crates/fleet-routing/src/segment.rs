//! Route segments: the immutable geometric/temporal slices of a route.

use fleet_core::GeoPoint;
use serde::{Deserialize, Serialize};

/// One contiguous slice of a route.
///
/// Geometry is stored as parallel `lats`/`lons`/`eles` arrays — one entry per
/// point, all three the same length — matching the layout of stored route
/// documents.  A valid segment has at least 2 points; assembly drops anything
/// shorter (see [`Route::from_path`](crate::Route::from_path)).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteSegment {
    pub lats: Vec<f64>,
    pub lons: Vec<f64>,
    pub eles: Vec<f64>,

    /// Milliseconds needed to traverse the segment.
    #[serde(rename = "timeMs")]
    pub time_ms: f64,

    /// Length of the segment in metres.
    #[serde(rename = "distanceMeters")]
    pub distance_m: f64,

    /// Maneuver annotation code (turn / instruction type) from the path engine.
    pub annotation: i32,
}

impl RouteSegment {
    /// Build a segment from parallel coordinate arrays.
    ///
    /// # Panics
    /// Debug builds panic if the arrays differ in length.
    pub fn new(
        lats: Vec<f64>,
        lons: Vec<f64>,
        eles: Vec<f64>,
        time_ms: f64,
        distance_m: f64,
        annotation: i32,
    ) -> Self {
        debug_assert_eq!(lats.len(), lons.len());
        debug_assert_eq!(lats.len(), eles.len());
        Self { lats, lons, eles, time_ms, distance_m, annotation }
    }

    /// Number of points in the segment.
    #[inline]
    pub fn point_count(&self) -> usize {
        self.lats.len()
    }

    /// The `i`-th point of the segment.
    #[inline]
    pub fn point(&self, i: usize) -> GeoPoint {
        GeoPoint::new(self.lats[i], self.lons[i])
    }

    /// First point of the segment.
    pub fn first_point(&self) -> GeoPoint {
        self.point(0)
    }

    /// Last point of the segment.
    pub fn last_point(&self) -> GeoPoint {
        self.point(self.point_count() - 1)
    }

    /// All points of the segment in driving order.
    pub fn points(&self) -> impl Iterator<Item = GeoPoint> + '_ {
        (0..self.point_count()).map(|i| self.point(i))
    }

    /// Total positive and negative elevation change across the segment's
    /// points, in metres.  Used when route aggregates must be recomputed from
    /// segments rather than taken from a path summary.
    pub fn ascend_descend(&self) -> (f64, f64) {
        let mut ascend = 0.0;
        let mut descend = 0.0;
        for w in self.eles.windows(2) {
            let delta = w[1] - w[0];
            if delta > 0.0 {
                ascend += delta;
            } else {
                descend -= delta;
            }
        }
        (ascend, descend)
    }
}
