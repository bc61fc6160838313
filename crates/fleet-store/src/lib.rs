//! `fleet-store` — the document-store seam of the fleetsim truck simulator.
//!
//! The real deployment keeps trucks, routes, and traffic incidents in an
//! external document store.  Query execution and connection management belong
//! to that store's client; this crate only defines
//!
//! - the async [`SimulationStore`] trait the orchestrator loads through,
//! - the persisted record shapes ([`TruckRecord`], [`IncidentRecord`],
//!   [`SimulationRecord`]) with their exact document field names, and
//! - the [`GeoIntersection`] query shape for incident-to-route association.
//!
//! [`MemoryStore`] is a complete in-process implementation backed by an
//! `rstar` R-tree over route-segment bounding boxes.  Tests and
//! single-process runs use it in place of a real backend.

pub mod memory;
pub mod query;
pub mod records;
pub mod store;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use memory::MemoryStore;
pub use query::GeoIntersection;
pub use records::{IncidentRecord, SimulationRecord, TruckRecord};
pub use store::{SimulationStore, StoreError, StoreResult};
