//! Orchestrator and telemetry-target configuration.
//!
//! Typically loaded from a JSON config file by the application crate.  All
//! fields carry the deployment defaults of the original service, so an empty
//! `{}` document yields a working local configuration.

use serde::{Deserialize, Serialize};

/// Where the tick loop publishes telemetry.
///
/// This subsystem never talks to the message bus itself; it only carries the
/// target descriptor into each simulation it assembles.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryTarget {
    /// Broker connection string.
    pub connection_string: String,
    /// Topic for periodic truck position updates.
    pub position_topic: String,
    /// Topic for truck arrival events.
    pub arrival_topic: String,
    /// Topic for simulation-start events.
    pub start_topic: String,
    /// Master switch — when false, nothing is published.
    pub enabled: bool,
}

impl Default for TelemetryTarget {
    fn default() -> Self {
        Self {
            connection_string: "localhost:9092".to_owned(),
            position_topic:    "simulation".to_owned(),
            arrival_topic:     "truckarrived".to_owned(),
            start_topic:       "truckstart".to_owned(),
            enabled:           false,
        }
    }
}

/// Per-orchestrator simulation settings, applied to every simulation it
/// starts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Wall-clock milliseconds between simulation ticks.
    pub tick_interval_ms: u64,
    /// Publish telemetry every N ticks.
    pub publish_interval_ticks: u32,
    /// Telemetry target handed to each simulation.
    pub telemetry: TelemetryTarget,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms:       1_000,
            publish_interval_ticks: 1,
            telemetry:              TelemetryTarget::default(),
        }
    }
}
