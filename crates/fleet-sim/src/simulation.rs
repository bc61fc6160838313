//! One running scenario and its assembly state.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use fleet_core::{OrchestratorConfig, RouteId, SimulationId, TelemetryTarget, TruckId};
use fleet_routing::Route;

use crate::{RouteStatus, TrafficIncident, Truck};

/// Everything assembly populates: trucks, the route table, associated
/// incidents, and the expected counts the tick loop uses to detect
/// completion.
#[derive(Default)]
pub struct AssemblyState {
    /// Trucks keyed by id.
    pub trucks: HashMap<TruckId, Truck>,
    /// Routes keyed by route id.  Only ever contains ids referenced by at
    /// least one truck: assembly fetches referenced routes and nothing else.
    pub routes: HashMap<RouteId, Route>,
    /// Incidents associated with this simulation's routes.
    pub incidents: Vec<TrafficIncident>,
    /// Truck count reported by the store, set once the truck fetch completes.
    pub expected_trucks: Option<usize>,
    /// Active-incident count, set once the incident fetch completes.
    pub expected_incidents: Option<usize>,
}

/// A single running simulation: owned entities plus lifecycle state.
///
/// Shared as `Arc<Simulation>` between the orchestrator's active table and
/// the assembly tasks still loading data for it.  Fetch completions arriving
/// after [`stop`](Self::stop) write into an instance nothing reads anymore —
/// harmless by construction.
pub struct Simulation {
    pub id: SimulationId,

    /// Wall-clock milliseconds between ticks.
    pub tick_interval_ms: u64,
    /// Publish telemetry every N ticks.
    pub publish_interval_ticks: u32,
    /// Endless mode: trucks restart their routes on arrival.
    pub endless: bool,
    /// Where the tick loop publishes telemetry.
    pub telemetry: TelemetryTarget,

    state: Mutex<AssemblyState>,
    running: AtomicBool,
}

impl Simulation {
    /// Construct an empty simulation configured from the orchestrator.
    pub fn new(id: SimulationId, config: &OrchestratorConfig, endless: bool) -> Self {
        Self {
            id,
            tick_interval_ms: config.tick_interval_ms,
            publish_interval_ticks: config.publish_interval_ticks,
            endless,
            telemetry: config.telemetry.clone(),
            state: Mutex::new(AssemblyState::default()),
            running: AtomicBool::new(false),
        }
    }

    /// Lock the assembly state for inspection or mutation.
    pub fn state(&self) -> MutexGuard<'_, AssemblyState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Assembly mutations ────────────────────────────────────────────────

    pub fn set_expected_trucks(&self, count: usize) {
        self.state().expected_trucks = Some(count);
    }

    pub fn set_expected_incidents(&self, count: usize) {
        self.state().expected_incidents = Some(count);
    }

    pub fn add_truck(&self, truck: Truck) {
        self.state().trucks.insert(truck.id.clone(), truck);
    }

    /// Insert a resolved route into the route table and mark every truck
    /// referencing it as resolved.
    ///
    /// `route.id` must be backfilled before attaching.
    pub fn attach_route(&self, route: Route) {
        let Some(route_id) = route.id.clone() else {
            warn!(simulation = %self.id, "attach_route called without a backfilled id");
            return;
        };
        let mut state = self.state();
        for truck in state.trucks.values_mut() {
            if truck.route_id == route_id {
                truck.route_status = RouteStatus::Resolved;
            }
        }
        debug!(simulation = %self.id, route = %route_id, "route attached");
        state.routes.insert(route_id, route);
    }

    /// Record that `route_id` could not be resolved; every truck referencing
    /// it stays without a usable route for this run.
    pub fn mark_route_failed(&self, route_id: &RouteId) {
        let mut state = self.state();
        for truck in state.trucks.values_mut() {
            if &truck.route_id == route_id {
                truck.route_status = RouteStatus::Failed;
            }
        }
    }

    pub fn add_incident(&self, incident: TrafficIncident) {
        self.state().incidents.push(incident);
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Activate the tick loop (which lives outside this crate).  Called once
    /// trucks are attached; routes and incidents may still be loading.
    pub fn start(&self) {
        self.running.store(true, Ordering::SeqCst);
        info!(simulation = %self.id, endless = self.endless, "simulation started");
    }

    /// Stop ticking.  In-flight fetches are not cancelled; their completions
    /// land in this instance and are never read.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        info!(simulation = %self.id, "simulation stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}
