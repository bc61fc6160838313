//! Raw path results and the path-engine seam.
//!
//! The actual path computation (road graph, shortest path, elevation) is an
//! external black box.  This module defines the shape of what it returns and
//! the [`PathEngine`] trait the rest of the simulator calls through, so the
//! engine can be swapped without touching route assembly.

use fleet_core::GeoPoint;
use thiserror::Error;

/// A single point of a path instruction, with elevation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PathPoint {
    pub lat: f64,
    pub lon: f64,
    pub ele: f64,
}

/// One instruction of a computed path: a stretch of geometry driven under a
/// single maneuver.
#[derive(Clone, Debug, PartialEq)]
pub struct PathInstruction {
    /// Geometry of the stretch, in driving order.
    pub points: Vec<PathPoint>,
    /// Length of the stretch in metres.
    pub distance_m: f64,
    /// Milliseconds needed to drive the stretch.
    pub time_ms: f64,
    /// Maneuver sign (e.g. negative for left turns, 0 for continue).
    pub sign: i32,
}

/// The best path between two positions as reported by the engine, including
/// its own summary aggregates.
///
/// Route assembly takes the aggregates verbatim — they are the engine's
/// authoritative totals and are *not* recomputed from the instructions.
#[derive(Clone, Debug, PartialEq)]
pub struct PathResult {
    pub instructions: Vec<PathInstruction>,
    pub time_ms: f64,
    pub distance_m: f64,
    pub ascend_m: f64,
    pub descend_m: f64,
}

// ── PathEngine trait ──────────────────────────────────────────────────────────

/// Pluggable path computation engine.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync`; route computation may be invoked
/// from concurrent assembly tasks.
pub trait PathEngine: Send + Sync {
    /// Compute the best path from `start` to `goal`.
    fn best_path(&self, start: GeoPoint, goal: GeoPoint) -> Result<PathResult, PathEngineError>;
}

/// Errors reported by a [`PathEngine`].
#[derive(Debug, Error)]
pub enum PathEngineError {
    #[error("no path from {start} to {goal}: {reason}")]
    Unreachable {
        start: GeoPoint,
        goal: GeoPoint,
        reason: String,
    },

    #[error("path engine failure: {0}")]
    Engine(String),
}
