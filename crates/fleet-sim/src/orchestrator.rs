//! The simulation lifecycle orchestrator.
//!
//! One orchestrator task owns the local table of active simulations and
//! processes commands sequentially from an `mpsc` channel; callers hold a
//! cloneable [`OrchestratorHandle`].  Assembly runs on spawned tasks that
//! report failures back through the same channel, so the table is only ever
//! touched from the orchestrator task.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use fleet_core::{OrchestratorConfig, RouteId, SimulationId};
use fleet_store::{GeoIntersection, SimulationRecord, SimulationStore};

use crate::{
    OrchestratorError, OrchestratorResult, Simulation, StatusRegistry, TrafficIncident, Truck,
};

const COMMAND_BUFFER: usize = 64;

// ── Commands ──────────────────────────────────────────────────────────────────

pub(crate) enum Command {
    Start {
        record: SimulationRecord,
        reply: oneshot::Sender<OrchestratorResult<()>>,
    },
    Stop {
        id: SimulationId,
        reply: oneshot::Sender<()>,
    },
    Status {
        id: SimulationId,
        reply: oneshot::Sender<bool>,
    },
    /// Self-reported natural completion of a simulation.
    Ended { id: SimulationId },
    /// Internal: assembly aborted after a failed truck fetch; drop the local
    /// entry.  The registry claim was already released by the assembly task.
    Aborted { id: SimulationId },
}

// ── Handle ────────────────────────────────────────────────────────────────────

/// Cloneable command-channel endpoint for a running orchestrator.
#[derive(Clone)]
pub struct OrchestratorHandle {
    tx: mpsc::Sender<Command>,
}

impl OrchestratorHandle {
    /// Start the simulation described by `record`.
    ///
    /// Resolves `Ok` once the simulation's trucks are loaded (routes and
    /// incidents continue loading in the background), or with
    /// [`OrchestratorError::AlreadyRunning`] / [`OrchestratorError::DataSource`].
    pub async fn start(&self, record: SimulationRecord) -> OrchestratorResult<()> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Start { record, reply })
            .await
            .map_err(|_| OrchestratorError::ChannelClosed)?;
        rx.await.map_err(|_| OrchestratorError::ChannelClosed)?
    }

    /// Stop a simulation.  A no-op (not an error) if `id` is not active in
    /// this orchestrator — it may be running in another instance.
    pub async fn stop(&self, id: SimulationId) -> OrchestratorResult<()> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Stop { id, reply })
            .await
            .map_err(|_| OrchestratorError::ChannelClosed)?;
        rx.await.map_err(|_| OrchestratorError::ChannelClosed)
    }

    /// Running state of `id` as recorded in the shared registry.  Never
    /// fails at the command level; ids never started read as `false`.
    pub async fn status(&self, id: SimulationId) -> OrchestratorResult<bool> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Status { id, reply })
            .await
            .map_err(|_| OrchestratorError::ChannelClosed)?;
        rx.await.map_err(|_| OrchestratorError::ChannelClosed)
    }

    /// Fire-and-forget notification that a simulation finished on its own.
    pub async fn ended(&self, id: SimulationId) {
        let _ = self.tx.send(Command::Ended { id }).await;
    }
}

// ── Orchestrator ──────────────────────────────────────────────────────────────

/// Receives lifecycle commands and drives asynchronous simulation assembly.
///
/// Generic over the store, the way the tick loop is generic over its path
/// engine: swap [`MemoryStore`](fleet_store::MemoryStore) for a real backend
/// client without touching orchestration logic.
pub struct SimulationOrchestrator<S: SimulationStore> {
    store: Arc<S>,
    registry: StatusRegistry,
    config: OrchestratorConfig,
    /// Local table of simulations active in *this* instance.
    simulations: HashMap<SimulationId, Arc<Simulation>>,
    rx: mpsc::Receiver<Command>,
    /// Sender handed to assembly tasks for internal abort/ended events.
    tx: mpsc::Sender<Command>,
}

impl<S: SimulationStore> SimulationOrchestrator<S> {
    /// Create an orchestrator and the handle callers use to reach it.
    ///
    /// The orchestrator must then be driven via [`run`](Self::run), typically
    /// on its own task.
    pub fn new(
        store: Arc<S>,
        registry: StatusRegistry,
        config: OrchestratorConfig,
    ) -> (Self, OrchestratorHandle) {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let handle = OrchestratorHandle { tx: tx.clone() };
        let orchestrator = Self {
            store,
            registry,
            config,
            simulations: HashMap::new(),
            rx,
            tx,
        };
        (orchestrator, handle)
    }

    /// Process commands until the process shuts down.
    pub async fn run(mut self) {
        info!("simulation orchestrator started");
        while let Some(cmd) = self.rx.recv().await {
            match cmd {
                Command::Start { record, reply } => self.handle_start(record, reply),
                Command::Stop { id, reply } => {
                    self.remove_simulation(&id, "stop command");
                    let _ = reply.send(());
                }
                Command::Status { id, reply } => {
                    let _ = reply.send(self.registry.is_running(&id));
                }
                Command::Ended { id } => self.remove_simulation(&id, "simulation ended"),
                Command::Aborted { id } => {
                    // Registry already rolled back where the failure happened.
                    self.simulations.remove(&id);
                }
            }
        }
    }

    /// Claim the registry entry, table the simulation, and hand the rest to
    /// an assembly task.  The reply is sent from that task once the truck
    /// fetch settles.
    fn handle_start(
        &mut self,
        record: SimulationRecord,
        reply: oneshot::Sender<OrchestratorResult<()>>,
    ) {
        let id = record.id.clone();
        if !self.registry.try_mark_running(&id) {
            warn!(simulation = %id, "start rejected: already running");
            let _ = reply.send(Err(OrchestratorError::AlreadyRunning(id)));
            return;
        }

        let sim = Arc::new(Simulation::new(id.clone(), &self.config, record.endless));
        self.simulations.insert(id.clone(), Arc::clone(&sim));
        info!(simulation = %id, endless = record.endless, "start accepted, assembling");

        tokio::spawn(assemble(
            Arc::clone(&self.store),
            self.registry.clone(),
            self.tx.clone(),
            sim,
            reply,
        ));
    }

    /// Shared removal path for `stop` and `ended`: idempotent, silent when
    /// the id is not active locally.
    fn remove_simulation(&mut self, id: &SimulationId, cause: &'static str) {
        if let Some(sim) = self.simulations.remove(id) {
            info!(simulation = %id, cause, "removing simulation");
            sim.stop();
            self.registry.mark_stopped(id);
        }
    }
}

// ── Assembly ──────────────────────────────────────────────────────────────────

/// Load a simulation's trucks, then resolve routes and associate incidents
/// concurrently, then activate.
pub(crate) async fn assemble<S: SimulationStore>(
    store: Arc<S>,
    registry: StatusRegistry,
    events: mpsc::Sender<Command>,
    sim: Arc<Simulation>,
    reply: oneshot::Sender<OrchestratorResult<()>>,
) {
    let records = match store.find_trucks(&sim.id).await {
        Ok(records) => records,
        Err(e) => {
            warn!(simulation = %sim.id, error = %e, "truck fetch failed, aborting start");
            registry.mark_stopped(&sim.id);
            let _ = events.send(Command::Aborted { id: sim.id.clone() }).await;
            let _ = reply.send(Err(OrchestratorError::DataSource(e)));
            return;
        }
    };

    // Trucks are loaded; the start is committed.  Everything after this point
    // is best-effort and never reaches the caller.
    let _ = reply.send(Ok(()));
    sim.set_expected_trucks(records.len());

    // Distinct route ids in first-seen order: trucks sharing a route trigger
    // one fetch and share the assembled Route.
    let mut seen = HashSet::new();
    let mut route_ids: Vec<RouteId> = Vec::new();
    for rec in records {
        debug!(simulation = %sim.id, truck = %rec.id, route = %rec.route, "truck attached");
        if seen.insert(rec.route.clone()) {
            route_ids.push(rec.route.clone());
        }
        sim.add_truck(Truck::from(rec));
    }

    for route_id in route_ids {
        tokio::spawn(resolve_route(
            Arc::clone(&store),
            Arc::clone(&sim),
            route_id,
        ));
    }
    tokio::spawn(associate_incidents(store, Arc::clone(&sim)));

    // Activate without waiting for routes or incidents; the tick loop treats
    // unresolved routes and late incidents as normal transient states.
    sim.start();
}

/// Fetch one route document and attach it to the simulation.  Failures are
/// absorbed: the referencing trucks are tagged `Failed` and skipped by the
/// tick loop.
async fn resolve_route<S: SimulationStore>(store: Arc<S>, sim: Arc<Simulation>, route_id: RouteId) {
    match store.find_route(&route_id).await {
        Ok(Some(mut route)) => {
            route.set_id(route_id);
            sim.attach_route(route);
        }
        Ok(None) => {
            warn!(simulation = %sim.id, route = %route_id, "route document not found");
            sim.mark_route_failed(&route_id);
        }
        Err(e) => {
            warn!(simulation = %sim.id, route = %route_id, error = %e, "route fetch failed");
            sim.mark_route_failed(&route_id);
        }
    }
}

/// Fetch active incidents and associate each with the routes whose segments
/// intersect both of its geometries.  Zero-match incidents are discarded.
async fn associate_incidents<S: SimulationStore>(store: Arc<S>, sim: Arc<Simulation>) {
    let records = match store.find_active_incidents(&sim.id).await {
        Ok(records) => records,
        Err(e) => {
            warn!(simulation = %sim.id, error = %e, "incident fetch failed");
            return;
        }
    };
    sim.set_expected_incidents(records.len());

    for rec in records {
        let query = GeoIntersection::new(rec.start.clone(), rec.end.clone());
        match store.find_intersecting_routes(&sim.id, &query).await {
            Ok(routes) if !routes.is_empty() => {
                debug!(simulation = %sim.id, affected = routes.len(), "incident associated");
                sim.add_incident(TrafficIncident::from_record(rec, routes));
            }
            Ok(_) => {
                debug!(simulation = %sim.id, "incident intersects no routes, discarded");
            }
            Err(e) => {
                warn!(simulation = %sim.id, error = %e, "intersection query failed");
            }
        }
    }
}
