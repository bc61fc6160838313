//! The simulated vehicle and its route-resolution state.

use fleet_core::{RouteId, TruckId};
use fleet_store::TruckRecord;

/// Where a truck stands in asynchronous route resolution.
///
/// Assembly resolves routes after the simulation is already active, so the
/// tick loop must treat `Pending` as a normal transient state and skip the
/// truck until it resolves.  `Failed` is terminal for the run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RouteStatus {
    Pending,
    Resolved,
    Failed,
}

/// A simulated vehicle's static attributes.
///
/// The route is referenced by id, not owned — the `Simulation`'s route table
/// holds the `Route` and is looked up per tick.
#[derive(Clone, Debug)]
pub struct Truck {
    pub id: TruckId,
    pub license_plate: String,
    /// Vehicle-type code.
    pub truck_type: i32,
    /// Model year.
    pub year: i32,
    /// Empty mass in kilograms.
    pub mass_empty: i32,
    /// Frontal surface area in m².
    pub surface: f64,
    /// Drag coefficient.
    pub cw: f64,
    pub route_id: RouteId,
    pub route_status: RouteStatus,
}

impl Truck {
    /// True once the truck's route is in the simulation's route table.
    pub fn has_route(&self) -> bool {
        self.route_status == RouteStatus::Resolved
    }
}

impl From<TruckRecord> for Truck {
    fn from(rec: TruckRecord) -> Self {
        Self {
            id: rec.id,
            license_plate: rec.license_plate,
            truck_type: rec.truck_type,
            year: rec.year,
            mass_empty: rec.mass_empty,
            surface: rec.surface,
            cw: rec.cw,
            route_id: rec.route,
            route_status: RouteStatus::Pending,
        }
    }
}
