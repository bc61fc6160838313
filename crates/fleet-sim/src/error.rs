//! Orchestrator error type.

use thiserror::Error;

use fleet_core::SimulationId;
use fleet_store::StoreError;

/// Errors replied to command callers.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// A start command for an id that is already marked running.  No state is
    /// mutated.
    #[error("simulation `{0}` is already running")]
    AlreadyRunning(SimulationId),

    /// The truck fetch failed during assembly; the start was aborted and the
    /// registry claim released.
    #[error("could not load trucks: {0}")]
    DataSource(#[from] StoreError),

    /// The orchestrator task is gone (its command channel closed).
    #[error("orchestrator is no longer running")]
    ChannelClosed,
}

impl OrchestratorError {
    /// Client-facing status code for the command-bus contract: 400-class for
    /// caller mistakes, 500-class for backend failures.
    pub fn code(&self) -> u16 {
        match self {
            OrchestratorError::AlreadyRunning(_) => 400,
            OrchestratorError::DataSource(_) => 500,
            OrchestratorError::ChannelClosed => 500,
        }
    }
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;
