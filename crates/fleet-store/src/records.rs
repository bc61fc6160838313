//! Persisted document shapes.
//!
//! Field names and renames mirror the stored documents exactly; these types
//! deserialize straight from store query results and from command payloads.

use fleet_core::{Geometry, RouteId, SimulationId, TruckId};
use serde::{Deserialize, Serialize};

/// A document from the `trucks` collection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TruckRecord {
    #[serde(rename = "_id")]
    pub id: TruckId,

    #[serde(rename = "licensePlate")]
    pub license_plate: String,

    /// Vehicle-type code.
    #[serde(rename = "truckType")]
    pub truck_type: i32,

    /// Model year.
    pub year: i32,

    /// Empty mass in kilograms.
    #[serde(rename = "massEmpty")]
    pub mass_empty: i32,

    /// Frontal surface area in m².
    pub surface: f64,

    /// Drag coefficient.
    pub cw: f64,

    /// Reference to the truck's route document (not ownership).
    pub route: RouteId,

    /// The simulation this truck belongs to.
    pub simulation: SimulationId,
}

/// A document from the `traffic` collection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IncidentRecord {
    /// Geographic shape where the incident begins.
    pub start: Geometry,

    /// Geographic shape where the incident ends.
    pub end: Geometry,

    pub active: bool,

    /// The simulation this incident belongs to.
    pub simulation: SimulationId,
}

/// A simulation descriptor, as carried by the `start` command payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationRecord {
    #[serde(rename = "_id")]
    pub id: SimulationId,

    /// Endless mode: trucks restart their routes on arrival.
    #[serde(default)]
    pub endless: bool,
}

impl SimulationRecord {
    pub fn new(id: impl Into<SimulationId>) -> Self {
        Self { id: id.into(), endless: false }
    }
}
