//! `fleet-sim` — simulation lifecycle orchestration for the fleetsim truck
//! simulator.
//!
//! # Command flow
//!
//! ```text
//! start {_id, endless?}
//!   ① claim registry entry (atomic set-if-not-running) — conflict ⇒ 400
//!   ② construct Simulation, insert into local active table
//!   ③ spawn assembly:
//!        fetch trucks ──failure──▶ release claim, drop simulation, reply 500
//!             │ok
//!        reply Ok, attach trucks
//!        per distinct route id ──▶ fetch + attach route   (concurrent)
//!        fetch incidents ────────▶ geo-associate routes   (concurrent)
//!        activate simulation (without waiting for either)
//! stop {_id}    — idempotent local removal + registry not-running
//! status id     — pure registry read; absent ⇒ false
//! ended {id}    — self-reported completion; same removal as stop
//! ```
//!
//! | Module           | Contents                                     |
//! |------------------|----------------------------------------------|
//! | [`truck`]        | `Truck`, `RouteStatus`                       |
//! | [`incident`]     | `TrafficIncident`                            |
//! | [`simulation`]   | `Simulation` and its assembly state          |
//! | [`status`]       | `StatusRegistry`                             |
//! | [`orchestrator`] | `SimulationOrchestrator`, `OrchestratorHandle` |
//! | [`error`]        | `OrchestratorError`                          |

pub mod error;
pub mod incident;
pub mod orchestrator;
pub mod simulation;
pub mod status;
pub mod truck;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{OrchestratorError, OrchestratorResult};
pub use incident::TrafficIncident;
pub use orchestrator::{OrchestratorHandle, SimulationOrchestrator};
pub use simulation::Simulation;
pub use status::StatusRegistry;
pub use truck::{RouteStatus, Truck};
