//! Traffic incidents and their route association.

use fleet_core::{Geometry, RouteId};
use fleet_store::IncidentRecord;

/// A geo-scoped hazard, associated at load time with the routes it affects.
///
/// Only constructed for incidents whose geometries intersect at least one
/// route of the simulation — zero-match incidents are discarded during
/// assembly and never reach this type.  Immutable once associated.
#[derive(Clone, Debug)]
pub struct TrafficIncident {
    /// Where the incident begins.
    pub start: Geometry,
    /// Where the incident ends.
    pub end: Geometry,
    pub active: bool,
    /// Ids of the simulation's routes with segments crossing both geometries.
    pub routes: Vec<RouteId>,
}

impl TrafficIncident {
    /// Associate a loaded incident record with the routes it affects.
    ///
    /// Callers guarantee `routes` is non-empty; association with an empty
    /// route list has no meaning.
    pub fn from_record(rec: IncidentRecord, routes: Vec<RouteId>) -> Self {
        debug_assert!(!routes.is_empty());
        Self {
            start: rec.start,
            end: rec.end,
            active: rec.active,
            routes,
        }
    }

    /// True if this incident affects `route`.
    pub fn affects(&self, route: &RouteId) -> bool {
        self.routes.contains(route)
    }
}
