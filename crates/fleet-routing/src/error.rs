//! Routing-subsystem error type.

use thiserror::Error;

use crate::PathEngineError;

/// Errors produced by route assembly.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The path engine could not produce a usable path (e.g. unreachable
    /// coordinates).  No partial route is produced.
    #[error("could not compute route: {0}")]
    Unroutable(#[from] PathEngineError),

    /// Assembly was given no usable segments — an empty segment sequence, or
    /// a path whose instructions were all degenerate.
    #[error("route has no usable segments")]
    NoSegments,
}

pub type RouteResult<T> = Result<T, RouteError>;
