//! Error types for ghost clusters.

use ghostcomm_types::ClusterId;
use thiserror::Error;

/// Errors raised while a ghost cluster makes communication progress.
///
/// None of these are recoverable by the scheduler. Retransmission and
/// timeouts belong inside the cluster implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClusterError {
    /// The underlying transport failed.
    #[error("Transport failure in {cluster}: {reason}")]
    Transport {
        /// Cluster that observed the failure.
        cluster: ClusterId,
        /// Transport-specific description.
        reason: String,
    },

    /// A peer partition disappeared mid-cycle.
    #[error("Peer lost by {cluster}")]
    PeerLost {
        /// Cluster whose neighbor is gone.
        cluster: ClusterId,
    },
}

impl ClusterError {
    /// The cluster the error originated from.
    pub fn cluster(&self) -> ClusterId {
        match self {
            ClusterError::Transport { cluster, .. }
            | ClusterError::PeerLost { cluster } => *cluster,
        }
    }
}
