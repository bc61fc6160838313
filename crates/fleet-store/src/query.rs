//! Geo-intersection query shape.

use fleet_core::{GeoPoint, Geometry};

/// The route-lookup query built for one traffic incident: two *independent*
/// intersection constraints, not one combined shape.
///
/// A route matches when at least one of its segments has geometry
/// intersecting the incident's start geometry **and** at least one segment
/// intersecting its end geometry.  Backends answer with route ids only — full
/// route bodies are never fetched for association.
#[derive(Clone, Debug, PartialEq)]
pub struct GeoIntersection {
    pub start: Geometry,
    pub end: Geometry,
}

impl GeoIntersection {
    pub fn new(start: Geometry, end: Geometry) -> Self {
        Self { start, end }
    }

    /// Evaluate one constraint against a run of segment points.
    pub fn start_hits(&self, points: impl IntoIterator<Item = GeoPoint>) -> bool {
        points.into_iter().any(|p| self.start.covers(p))
    }

    /// Evaluate the other constraint against a run of segment points.
    pub fn end_hits(&self, points: impl IntoIterator<Item = GeoPoint>) -> bool {
        points.into_iter().any(|p| self.end.covers(p))
    }
}
