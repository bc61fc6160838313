//! The `Route` type and its assembly paths.

use fleet_core::{GeoPoint, RouteId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{PathEngine, PathResult, RouteError, RouteResult, RouteSegment};

/// An ordered, annotated path between two geographic positions.
///
/// Immutable after assembly, with one exception: the store id is backfilled
/// via [`set_id`](Self::set_id) when the route was rehydrated from a document
/// (documents carry the id in their `_id` key, outside the body this type
/// deserializes from).
///
/// Aggregate fields hold the sum of the corresponding per-segment values;
/// [`from_path`](Self::from_path) takes them verbatim from the engine's
/// summary, [`from_segments`](Self::from_segments) recomputes them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Store id; `None` until assigned or backfilled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RouteId>,

    pub start: GeoPoint,
    pub goal: GeoPoint,

    /// Segments in driving order.  Never reordered, never empty after
    /// successful assembly.
    pub segments: Vec<RouteSegment>,

    /// Approximate milliseconds needed to drive the route.
    #[serde(rename = "timeMs")]
    pub time_ms: f64,

    /// Total route length in metres.
    #[serde(rename = "distanceMeters")]
    pub distance_m: f64,

    /// Total climb in metres.
    #[serde(rename = "ascend")]
    pub ascend_m: f64,

    /// Total descent in metres.
    #[serde(rename = "descend")]
    pub descend_m: f64,
}

impl Route {
    /// Assemble a route from an externally computed [`PathResult`].
    ///
    /// Segments are exactly the path's instructions with two or more points,
    /// in original order.  Single-point instructions carry no drivable
    /// geometry and are dropped — deliberate policy, logged rather than
    /// raised.  Aggregates are taken verbatim from the path summary.
    ///
    /// Fails with [`RouteError::NoSegments`] if nothing survives the drop.
    pub fn from_path(start: GeoPoint, goal: GeoPoint, path: PathResult) -> RouteResult<Route> {
        let mut segments = Vec::with_capacity(path.instructions.len());
        for inst in &path.instructions {
            if inst.points.len() < 2 {
                debug!(points = inst.points.len(), "dropped degenerate path instruction");
                continue;
            }
            let mut lats = Vec::with_capacity(inst.points.len());
            let mut lons = Vec::with_capacity(inst.points.len());
            let mut eles = Vec::with_capacity(inst.points.len());
            for p in &inst.points {
                lats.push(p.lat);
                lons.push(p.lon);
                eles.push(p.ele);
            }
            segments.push(RouteSegment::new(
                lats, lons, eles, inst.time_ms, inst.distance_m, inst.sign,
            ));
        }
        if segments.is_empty() {
            return Err(RouteError::NoSegments);
        }
        Ok(Route {
            id: None,
            start,
            goal,
            segments,
            time_ms: path.time_ms,
            distance_m: path.distance_m,
            ascend_m: path.ascend_m,
            descend_m: path.descend_m,
        })
    }

    /// Compute the best path between `start` and `goal` via `engine` and
    /// assemble it.  An engine error surfaces as [`RouteError::Unroutable`].
    pub fn compute<E: PathEngine + ?Sized>(
        engine: &E,
        start: GeoPoint,
        goal: GeoPoint,
    ) -> RouteResult<Route> {
        let path = engine.best_path(start, goal)?;
        Route::from_path(start, goal, path)
    }

    /// Build a route directly from an ordered segment sequence (rehydration
    /// path).  `start` and `goal` are derived — first point of the first
    /// segment and last point of the last — and aggregates are recomputed as
    /// per-segment sums.
    ///
    /// Fails with [`RouteError::NoSegments`] if `segments` is empty.
    pub fn from_segments(segments: Vec<RouteSegment>) -> RouteResult<Route> {
        let (first, last) = match (segments.first(), segments.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => return Err(RouteError::NoSegments),
        };
        let start = first.first_point();
        let goal = last.last_point();

        let mut time_ms = 0.0;
        let mut distance_m = 0.0;
        let mut ascend_m = 0.0;
        let mut descend_m = 0.0;
        for seg in &segments {
            time_ms += seg.time_ms;
            distance_m += seg.distance_m;
            let (a, d) = seg.ascend_descend();
            ascend_m += a;
            descend_m += d;
        }

        Ok(Route {
            id: None,
            start,
            goal,
            segments,
            time_ms,
            distance_m,
            ascend_m,
            descend_m,
        })
    }

    /// Backfill the store id after a document fetch.
    pub fn set_id(&mut self, id: RouteId) {
        self.id = Some(id);
    }

    /// Number of segments.
    #[inline]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// The `i`-th segment in driving order.
    #[inline]
    pub fn segment(&self, i: usize) -> &RouteSegment {
        &self.segments[i]
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.start, self.goal)
    }
}
