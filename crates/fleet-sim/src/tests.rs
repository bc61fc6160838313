//! Integration tests for the orchestrator and simulation assembly.
//!
//! Lifecycle behavior (conflicts, idempotent stop, registry rollback) is
//! tested end-to-end through an [`OrchestratorHandle`]; data-loading details
//! (route memoization, per-truck status, incident association) drive the
//! assembly task directly against a seeded [`MemoryStore`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use fleet_core::{Geometry, OrchestratorConfig, RouteId, SimulationId, TruckId};
use fleet_routing::{Route, RouteSegment};
use fleet_store::{IncidentRecord, MemoryStore, SimulationRecord, TruckRecord};

use crate::orchestrator::assemble;
use crate::{
    OrchestratorError, OrchestratorHandle, RouteStatus, Simulation, SimulationOrchestrator,
    StatusRegistry,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// A one-segment route running along `lat` from `lon0` to `lon1`.
fn route_along(lat: f64, lon0: f64, lon1: f64) -> Route {
    let seg = RouteSegment::new(
        vec![lat, lat, lat],
        vec![lon0, (lon0 + lon1) / 2.0, lon1],
        vec![500.0, 500.0, 500.0],
        60_000.0,
        10_000.0,
        0,
    );
    Route::from_segments(vec![seg]).unwrap()
}

fn square_around(lat: f64, lon: f64) -> Geometry {
    let d = 0.25;
    Geometry::Polygon(vec![vec![
        [lon - d, lat - d],
        [lon + d, lat - d],
        [lon + d, lat + d],
        [lon - d, lat + d],
        [lon - d, lat - d],
    ]])
}

fn truck(id: &str, sim: &str, route: &str) -> TruckRecord {
    TruckRecord {
        id: id.into(),
        license_plate: format!("M-TX {id}"),
        truck_type: 1,
        year: 2014,
        mass_empty: 7_500,
        surface: 9.5,
        cw: 0.7,
        route: route.into(),
        simulation: sim.into(),
    }
}

fn spawn_orchestrator(store: Arc<MemoryStore>) -> (OrchestratorHandle, StatusRegistry) {
    let registry = StatusRegistry::new();
    let (orchestrator, handle) =
        SimulationOrchestrator::new(store, registry.clone(), OrchestratorConfig::default());
    tokio::spawn(orchestrator.run());
    (handle, registry)
}

/// Run assembly for `sim_id` directly and return the simulation for
/// inspection.  Panics if the truck fetch fails.
async fn assemble_direct(store: Arc<MemoryStore>, sim_id: &SimulationId) -> Arc<Simulation> {
    let sim = Arc::new(Simulation::new(
        sim_id.clone(),
        &OrchestratorConfig::default(),
        false,
    ));
    let registry = StatusRegistry::new();
    registry.try_mark_running(sim_id);
    let (events, _rx) = mpsc::channel(8);
    let (reply, accepted) = oneshot::channel();

    assemble(store, registry, events, Arc::clone(&sim), reply).await;
    accepted.await.unwrap().unwrap();
    sim
}

/// Poll `cond` until it holds or a timeout expires.  Assembly subtasks run on
/// spawned tasks, so tests wait for their effects instead of assuming order.
async fn wait_until(what: &str, cond: impl Fn() -> bool) {
    for _ in 0..500 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("timed out waiting for {what}");
}

// ── Lifecycle through the handle ──────────────────────────────────────────────

#[cfg(test)]
mod lifecycle {
    use super::*;

    #[tokio::test]
    async fn status_of_unknown_id_is_false() {
        let (handle, _) = spawn_orchestrator(Arc::new(MemoryStore::new()));
        assert!(!handle.status("never-started".into()).await.unwrap());
    }

    #[tokio::test]
    async fn start_marks_running() {
        let store = Arc::new(MemoryStore::new());
        store.add_truck(truck("t-1", "sim-1", "r-a"));
        let (handle, registry) = spawn_orchestrator(store);

        handle.start(SimulationRecord::new("sim-1")).await.unwrap();
        assert!(handle.status("sim-1".into()).await.unwrap());
        assert!(registry.is_running(&"sim-1".into()));
    }

    #[tokio::test]
    async fn duplicate_start_conflicts() {
        let store = Arc::new(MemoryStore::new());
        store.add_truck(truck("t-1", "sim-1", "r-a"));
        let (handle, _) = spawn_orchestrator(store);

        handle.start(SimulationRecord::new("sim-1")).await.unwrap();
        let err = handle
            .start(SimulationRecord::new("sim-1"))
            .await
            .unwrap_err();

        assert!(matches!(err, OrchestratorError::AlreadyRunning(_)));
        assert_eq!(err.code(), 400);
        assert!(err.to_string().contains("already running"));
        // First instance unaffected.
        assert!(handle.status("sim-1".into()).await.unwrap());
    }

    #[tokio::test]
    async fn stop_of_unknown_id_is_noop() {
        let (handle, _) = spawn_orchestrator(Arc::new(MemoryStore::new()));
        handle.stop("ghost".into()).await.unwrap();
        assert!(!handle.status("ghost".into()).await.unwrap());
    }

    #[tokio::test]
    async fn stop_marks_not_running_and_allows_restart() {
        let store = Arc::new(MemoryStore::new());
        store.add_truck(truck("t-1", "sim-1", "r-a"));
        let (handle, _) = spawn_orchestrator(store);

        handle.start(SimulationRecord::new("sim-1")).await.unwrap();
        handle.stop("sim-1".into()).await.unwrap();
        assert!(!handle.status("sim-1".into()).await.unwrap());

        // The id is free again.
        handle.start(SimulationRecord::new("sim-1")).await.unwrap();
        assert!(handle.status("sim-1".into()).await.unwrap());
    }

    #[tokio::test]
    async fn truck_fetch_failure_aborts_start() {
        let store = Arc::new(MemoryStore::new());
        store.add_truck(truck("t-1", "sim-1", "r-a"));
        store.fail_next_trucks_query(&"sim-1".into());
        let (handle, registry) = spawn_orchestrator(Arc::clone(&store));

        let err = handle
            .start(SimulationRecord::new("sim-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::DataSource(_)));
        assert_eq!(err.code(), 500);

        // Registry claim rolled back; the failure was one-shot, so a retry
        // goes through cleanly.
        assert!(!registry.is_running(&"sim-1".into()));
        handle.start(SimulationRecord::new("sim-1")).await.unwrap();
        assert!(handle.status("sim-1".into()).await.unwrap());
    }

    #[tokio::test]
    async fn ended_clears_entry() {
        let store = Arc::new(MemoryStore::new());
        store.add_truck(truck("t-1", "sim-1", "r-a"));
        let (handle, registry) = spawn_orchestrator(store);

        handle.start(SimulationRecord::new("sim-1")).await.unwrap();
        handle.ended("sim-1".into()).await;

        wait_until("ended simulation cleared", || {
            !registry.is_running(&"sim-1".into())
        })
        .await;
        assert!(!handle.status("sim-1".into()).await.unwrap());
    }
}

// ── Assembly ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod assembly {
    use super::*;

    #[tokio::test]
    async fn trucks_and_routes_loaded() {
        let store = Arc::new(MemoryStore::new());
        let sim_id = SimulationId::new("sim-1");
        store.add_truck(truck("t-1", "sim-1", "r-a"));
        store.add_truck(truck("t-2", "sim-1", "r-b"));
        store.add_route(&sim_id, &"r-a".into(), route_along(48.0, 11.0, 11.4));
        store.add_route(&sim_id, &"r-b".into(), route_along(49.0, 11.0, 11.4));

        let sim = assemble_direct(Arc::clone(&store), &sim_id).await;
        assert!(sim.is_running(), "activation must not wait for routes");

        wait_until("both routes attached", || sim.state().routes.len() == 2).await;

        let state = sim.state();
        assert_eq!(state.expected_trucks, Some(2));
        assert_eq!(state.trucks.len(), 2);
        assert!(state.trucks.values().all(|t| t.has_route()));
        // Route ids were backfilled during attachment.
        assert_eq!(
            state.routes[&RouteId::new("r-a")].id,
            Some(RouteId::new("r-a"))
        );
        // The table holds only ids referenced by the trucks.
        for id in state.routes.keys() {
            assert!(state.trucks.values().any(|t| &t.route_id == id));
        }
    }

    #[tokio::test]
    async fn failed_route_fetch_leaves_truck_unrouted() {
        let store = Arc::new(MemoryStore::new());
        let sim_id = SimulationId::new("sim-1");
        store.add_truck(truck("t-1", "sim-1", "r-a"));
        store.add_truck(truck("t-2", "sim-1", "r-b"));
        store.add_route(&sim_id, &"r-a".into(), route_along(48.0, 11.0, 11.4));
        store.fail_route_queries(&"r-b".into());

        let sim = assemble_direct(Arc::clone(&store), &sim_id).await;

        wait_until("route statuses settled", || {
            let state = sim.state();
            state.trucks.values().all(|t| t.route_status != RouteStatus::Pending)
        })
        .await;

        let state = sim.state();
        assert_eq!(state.expected_trucks, Some(2));
        assert_eq!(
            state.trucks[&TruckId::new("t-1")].route_status,
            RouteStatus::Resolved
        );
        assert_eq!(
            state.trucks[&TruckId::new("t-2")].route_status,
            RouteStatus::Failed
        );
        assert_eq!(state.routes.len(), 1);
        assert!(sim.is_running(), "partial routing must not block the run");
    }

    #[tokio::test]
    async fn shared_route_fetched_once() {
        let store = Arc::new(MemoryStore::new());
        let sim_id = SimulationId::new("sim-1");
        store.add_truck(truck("t-1", "sim-1", "r-a"));
        store.add_truck(truck("t-2", "sim-1", "r-a"));
        store.add_truck(truck("t-3", "sim-1", "r-a"));
        store.add_route(&sim_id, &"r-a".into(), route_along(48.0, 11.0, 11.4));

        let sim = assemble_direct(Arc::clone(&store), &sim_id).await;

        wait_until("all trucks resolved", || {
            sim.state().trucks.values().all(|t| t.has_route())
        })
        .await;
        assert_eq!(store.route_fetch_count(&"r-a".into()), 1);
        assert_eq!(sim.state().routes.len(), 1);
    }

    #[tokio::test]
    async fn missing_route_document_marks_failed() {
        let store = Arc::new(MemoryStore::new());
        let sim_id = SimulationId::new("sim-1");
        store.add_truck(truck("t-1", "sim-1", "r-gone"));

        let sim = assemble_direct(Arc::clone(&store), &sim_id).await;

        wait_until("missing route marked failed", || {
            sim.state().trucks[&TruckId::new("t-1")].route_status == RouteStatus::Failed
        })
        .await;
        assert!(sim.state().routes.is_empty());
    }
}

// ── Incident association ──────────────────────────────────────────────────────

#[cfg(test)]
mod incidents {
    use super::*;

    #[tokio::test]
    async fn incident_associated_with_intersecting_routes_only() {
        let store = Arc::new(MemoryStore::new());
        let sim_id = SimulationId::new("sim-1");
        // r-1 and r-3 run along latitude 48 and cross both incident squares;
        // r-2 runs along latitude 50, far away.
        store.add_truck(truck("t-1", "sim-1", "r-1"));
        store.add_truck(truck("t-2", "sim-1", "r-2"));
        store.add_truck(truck("t-3", "sim-1", "r-3"));
        store.add_route(&sim_id, &"r-1".into(), route_along(48.0, 11.0, 11.4));
        store.add_route(&sim_id, &"r-2".into(), route_along(50.0, 11.0, 11.4));
        store.add_route(&sim_id, &"r-3".into(), route_along(48.0, 10.9, 11.5));
        store.add_incident(IncidentRecord {
            start: square_around(48.0, 11.0),
            end: square_around(48.0, 11.4),
            active: true,
            simulation: sim_id.clone(),
        });

        let sim = assemble_direct(Arc::clone(&store), &sim_id).await;

        wait_until("incident associated", || !sim.state().incidents.is_empty()).await;

        let state = sim.state();
        assert_eq!(state.expected_incidents, Some(1));
        assert_eq!(state.incidents.len(), 1);
        let incident = &state.incidents[0];
        assert!(incident.affects(&"r-1".into()));
        assert!(incident.affects(&"r-3".into()));
        assert!(!incident.affects(&"r-2".into()));
        assert_eq!(incident.routes.len(), 2);
    }

    #[tokio::test]
    async fn zero_match_incident_discarded() {
        let store = Arc::new(MemoryStore::new());
        let sim_id = SimulationId::new("sim-1");
        store.add_truck(truck("t-1", "sim-1", "r-1"));
        store.add_route(&sim_id, &"r-1".into(), route_along(48.0, 11.0, 11.4));
        // Geometries nowhere near the route.
        store.add_incident(IncidentRecord {
            start: square_around(55.0, 20.0),
            end: square_around(55.0, 20.4),
            active: true,
            simulation: sim_id.clone(),
        });

        let sim = assemble_direct(Arc::clone(&store), &sim_id).await;

        wait_until("incident pass completed", || {
            sim.state().expected_incidents == Some(1)
        })
        .await;
        // Give the association task a moment past the count update; the
        // zero-match incident must never appear.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(sim.state().incidents.is_empty());
    }

    #[tokio::test]
    async fn incidents_scoped_to_their_simulation() {
        let store = Arc::new(MemoryStore::new());
        let sim_id = SimulationId::new("sim-1");
        store.add_truck(truck("t-1", "sim-1", "r-1"));
        store.add_route(&sim_id, &"r-1".into(), route_along(48.0, 11.0, 11.4));
        // Same geometry but belongs to another simulation.
        store.add_incident(IncidentRecord {
            start: square_around(48.0, 11.0),
            end: square_around(48.0, 11.4),
            active: true,
            simulation: "sim-other".into(),
        });

        let sim = assemble_direct(Arc::clone(&store), &sim_id).await;

        wait_until("incident pass completed", || {
            sim.state().expected_incidents == Some(0)
        })
        .await;
        assert!(sim.state().incidents.is_empty());
    }
}
