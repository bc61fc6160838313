//! The async store trait and its error type.

use std::future::Future;

use fleet_core::{RouteId, SimulationId};
use fleet_routing::Route;
use thiserror::Error;

use crate::{GeoIntersection, IncidentRecord, TruckRecord};

/// Async access to the simulator's document collections.
///
/// All methods return `Send` futures so assembly tasks can run them on any
/// runtime worker.  Implementations wrap a real document-store client in
/// production; [`MemoryStore`](crate::MemoryStore) serves tests and
/// single-process runs.
pub trait SimulationStore: Send + Sync + 'static {
    /// All truck records belonging to `sim`.
    fn find_trucks(
        &self,
        sim: &SimulationId,
    ) -> impl Future<Output = StoreResult<Vec<TruckRecord>>> + Send;

    /// Single-record lookup of a route document by id.  `Ok(None)` when the
    /// id references nothing.
    fn find_route(
        &self,
        route: &RouteId,
    ) -> impl Future<Output = StoreResult<Option<Route>>> + Send;

    /// All incident records for `sim` with `active = true`.
    fn find_active_incidents(
        &self,
        sim: &SimulationId,
    ) -> impl Future<Output = StoreResult<Vec<IncidentRecord>>> + Send;

    /// Ids of `sim`'s routes with at least one segment intersecting both of
    /// the query's geometries (id-only projection).
    fn find_intersecting_routes(
        &self,
        sim: &SimulationId,
        query: &GeoIntersection,
    ) -> impl Future<Output = StoreResult<Vec<RouteId>>> + Send;
}

/// Errors surfaced by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
