//! Error types for communication scheduling.

use ghostcomm_core::ClusterError;
use thiserror::Error;

/// Errors surfaced by a [`CommScheduler`](crate::CommScheduler).
#[derive(Debug, Error)]
pub enum CommError {
    /// A ghost cluster failed while making progress.
    #[error(transparent)]
    Cluster(#[from] ClusterError),

    /// The background worker thread could not be started.
    #[error("Failed to spawn communication worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// The cluster collection was lost with a worker that never started.
    #[error("Ghost clusters are no longer available")]
    ClustersLost,

    /// Unrecognized strategy name.
    #[error("Unknown communication strategy: {0}")]
    UnknownStrategy(String),
}

/// Errors from pinning a worker thread to CPUs.
///
/// Pinning is best-effort; these are logged and otherwise ignored.
#[derive(Debug, Error)]
pub enum PinError {
    /// Every online CPU is already reserved for the caller.
    #[error("No free CPUs outside the {reserved} reserved for the caller")]
    NoFreeCpus {
        /// Number of CPUs reserved for the caller.
        reserved: usize,
    },

    /// The affinity syscall failed.
    #[error("Failed to set CPU affinity: {0}")]
    Affinity(#[source] std::io::Error),

    /// CPU pinning is not available on this platform.
    #[error("CPU pinning is not supported on this platform")]
    Unsupported,
}
