//! `fleet-routing` — route representation and assembly for the fleetsim
//! truck simulator.
//!
//! A [`Route`] is an ordered, annotated path between two positions, composed
//! of [`RouteSegment`]s.  Routes come into existence two ways:
//!
//! 1. **Computed**: a [`PathEngine`] (external black box) produces a raw
//!    [`PathResult`]; [`Route::from_path`] turns it into segments, dropping
//!    degenerate single-point instructions.
//! 2. **Rehydrated**: a previously stored route document is deserialized
//!    directly, or rebuilt from a caller-supplied segment sequence via
//!    [`Route::from_segments`].
//!
//! | Module      | Contents                                      |
//! |-------------|-----------------------------------------------|
//! | [`segment`] | `RouteSegment`                                |
//! | [`path`]    | `PathResult`, `PathInstruction`, `PathEngine` |
//! | [`route`]   | `Route` and its constructors                  |
//! | [`error`]   | `RouteError`, `RouteResult`                   |

pub mod error;
pub mod path;
pub mod route;
pub mod segment;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{RouteError, RouteResult};
pub use path::{PathEngine, PathEngineError, PathInstruction, PathPoint, PathResult};
pub use route::Route;
pub use segment::RouteSegment;
