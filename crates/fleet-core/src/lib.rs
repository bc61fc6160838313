//! `fleet-core` — foundational types for the fleetsim truck simulator.
//!
//! This crate is a dependency of every other `fleet-*` crate.  It has no
//! `fleet-*` dependencies and only `serde` as an external one.
//!
//! # What lives here
//!
//! | Module      | Contents                                              |
//! |-------------|-------------------------------------------------------|
//! | [`ids`]     | `SimulationId`, `RouteId`, `TruckId`                  |
//! | [`geo`]     | `GeoPoint`, `Geometry`, haversine distance            |
//! | [`config`]  | `OrchestratorConfig`, `TelemetryTarget`               |

pub mod config;
pub mod geo;
pub mod ids;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{OrchestratorConfig, TelemetryTarget};
pub use geo::{GeoPoint, Geometry};
pub use ids::{RouteId, SimulationId, TruckId};
