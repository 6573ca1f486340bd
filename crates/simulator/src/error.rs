//! Error types for the simulator.

use ghostcomm_scheduler::CommError;
use thiserror::Error;

/// Errors during a simulation run.
#[derive(Debug, Error)]
pub enum SimulatorError {
    /// The communication scheduler failed.
    #[error("Communication failed: {0}")]
    Comm(#[from] CommError),

    /// The configuration cannot be run.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Latency histogram could not be created.
    #[error("Metrics error: {0}")]
    Metrics(String),
}
