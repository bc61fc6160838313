//! In-memory `SimulationStore` backed by an R-tree spatial index.
//!
//! Geo-intersection queries run in two stages, the way a real backend with a
//! 2d index would: an `rstar` envelope query over per-segment bounding boxes
//! prunes candidates, then the exact [`Geometry::covers`] check decides.
//!
//! The store also offers failure injection (`fail_next_trucks_query`,
//! `fail_route_queries`) and per-route fetch counters so tests can exercise
//! the orchestrator's abort and memoization paths.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

use rstar::{AABB, RTree, RTreeObject};

use fleet_core::{GeoPoint, RouteId, SimulationId};
use fleet_routing::Route;

use crate::{
    GeoIntersection, IncidentRecord, SimulationStore, StoreError, StoreResult, TruckRecord,
};

// ── Spatial index entry ───────────────────────────────────────────────────────

/// One route segment's bounding box, tagged with its owning route and
/// simulation for scoped queries.
struct SegmentEnvelope {
    bbox: AABB<[f64; 2]>,
    route: RouteId,
    simulation: SimulationId,
    /// Segment points for the exact check after the envelope pre-filter.
    points: Vec<GeoPoint>,
}

impl RTreeObject for SegmentEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.bbox
    }
}

// ── MemoryStore ───────────────────────────────────────────────────────────────

#[derive(Default)]
struct Inner {
    trucks: Vec<TruckRecord>,
    routes: HashMap<RouteId, Route>,
    incidents: Vec<IncidentRecord>,
    index: RTree<SegmentEnvelope>,

    route_fetches: HashMap<RouteId, usize>,
    fail_trucks_once: HashSet<SimulationId>,
    fail_routes: HashSet<RouteId>,
}

/// In-process [`SimulationStore`] for tests and single-process runs.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock only means a panicking test; the data is still usable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Seeding ───────────────────────────────────────────────────────────

    pub fn add_truck(&self, record: TruckRecord) {
        self.lock().trucks.push(record);
    }

    /// Store a route document under `id`, scoped to `sim`, and index its
    /// segments for geo-intersection queries.
    pub fn add_route(&self, sim: &SimulationId, id: &RouteId, route: Route) {
        let mut inner = self.lock();
        for seg in &route.segments {
            let points: Vec<GeoPoint> = seg.points().collect();
            let mut min = [f64::INFINITY, f64::INFINITY];
            let mut max = [f64::NEG_INFINITY, f64::NEG_INFINITY];
            for p in &points {
                min[0] = min[0].min(p.lon);
                min[1] = min[1].min(p.lat);
                max[0] = max[0].max(p.lon);
                max[1] = max[1].max(p.lat);
            }
            inner.index.insert(SegmentEnvelope {
                bbox: AABB::from_corners(min, max),
                route: id.clone(),
                simulation: sim.clone(),
                points,
            });
        }
        inner.routes.insert(id.clone(), route);
    }

    pub fn add_incident(&self, record: IncidentRecord) {
        self.lock().incidents.push(record);
    }

    // ── Failure injection & instrumentation ───────────────────────────────

    /// Make the next `find_trucks(sim)` call fail (one-shot).
    pub fn fail_next_trucks_query(&self, sim: &SimulationId) {
        self.lock().fail_trucks_once.insert(sim.clone());
    }

    /// Make every `find_route` call for `route` fail.
    pub fn fail_route_queries(&self, route: &RouteId) {
        self.lock().fail_routes.insert(route.clone());
    }

    /// How many times `find_route` was called for `route`.
    pub fn route_fetch_count(&self, route: &RouteId) -> usize {
        self.lock().route_fetches.get(route).copied().unwrap_or(0)
    }

    // ── Query internals ───────────────────────────────────────────────────

    fn query_trucks(&self, sim: &SimulationId) -> StoreResult<Vec<TruckRecord>> {
        let mut inner = self.lock();
        if inner.fail_trucks_once.remove(sim) {
            return Err(StoreError::Backend("trucks query failed".to_owned()));
        }
        Ok(inner
            .trucks
            .iter()
            .filter(|t| &t.simulation == sim)
            .cloned()
            .collect())
    }

    fn query_route(&self, route: &RouteId) -> StoreResult<Option<Route>> {
        let mut inner = self.lock();
        *inner.route_fetches.entry(route.clone()).or_insert(0) += 1;
        if inner.fail_routes.contains(route) {
            return Err(StoreError::Backend(format!("route query failed: {route}")));
        }
        Ok(inner.routes.get(route).cloned())
    }

    fn query_incidents(&self, sim: &SimulationId) -> StoreResult<Vec<IncidentRecord>> {
        Ok(self
            .lock()
            .incidents
            .iter()
            .filter(|i| &i.simulation == sim && i.active)
            .cloned()
            .collect())
    }

    fn query_intersections(
        &self,
        sim: &SimulationId,
        query: &GeoIntersection,
    ) -> StoreResult<Vec<RouteId>> {
        let inner = self.lock();

        let hits = |geom_bbox: ([f64; 2], [f64; 2]), covers: &dyn Fn(&SegmentEnvelope) -> bool| {
            let envelope = AABB::from_corners(geom_bbox.0, geom_bbox.1);
            inner
                .index
                .locate_in_envelope_intersecting(&envelope)
                .filter(|seg| &seg.simulation == sim)
                .filter(|seg| covers(seg))
                .map(|seg| seg.route.clone())
                .collect::<HashSet<RouteId>>()
        };

        let start_routes = hits(query.start.bbox(), &|seg| {
            query.start_hits(seg.points.iter().copied())
        });
        let end_routes = hits(query.end.bbox(), &|seg| {
            query.end_hits(seg.points.iter().copied())
        });

        // Both constraints must hold.  Sorted for deterministic results.
        let mut ids: Vec<RouteId> = start_routes.intersection(&end_routes).cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

// ── SimulationStore impl ──────────────────────────────────────────────────────

impl SimulationStore for MemoryStore {
    fn find_trucks(
        &self,
        sim: &SimulationId,
    ) -> impl Future<Output = StoreResult<Vec<TruckRecord>>> + Send {
        std::future::ready(self.query_trucks(sim))
    }

    fn find_route(
        &self,
        route: &RouteId,
    ) -> impl Future<Output = StoreResult<Option<Route>>> + Send {
        std::future::ready(self.query_route(route))
    }

    fn find_active_incidents(
        &self,
        sim: &SimulationId,
    ) -> impl Future<Output = StoreResult<Vec<IncidentRecord>>> + Send {
        std::future::ready(self.query_incidents(sim))
    }

    fn find_intersecting_routes(
        &self,
        sim: &SimulationId,
        query: &GeoIntersection,
    ) -> impl Future<Output = StoreResult<Vec<RouteId>>> + Send {
        std::future::ready(self.query_intersections(sim, query))
    }
}
