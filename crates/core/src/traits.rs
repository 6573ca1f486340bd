//! Core traits for ghost clusters.

use crate::ClusterError;
use ghostcomm_types::SyncTime;

/// A per-region communication state machine.
///
/// Each cluster exchanges ghost data for one region until it has reached its
/// current sync time. Clusters are owned exclusively by whichever scheduler
/// drives them, and only one execution context calls into a cluster at a
/// time. They must be `Send` because the background strategy moves the whole
/// collection onto its worker thread.
///
/// # Example
///
/// ```ignore
/// impl GhostCluster for MpiGhostCluster {
///     fn update_sync_time(&mut self, t: SyncTime) {
///         self.sync_time = t;
///     }
///
///     fn reset(&mut self) {
///         self.stage = Stage::PostReceives;
///     }
///
///     fn act(&mut self) -> Result<(), ClusterError> {
///         match self.stage {
///             Stage::PostReceives => self.post_receives(),
///             Stage::WaitForData => self.test_requests(),
///             Stage::Done => Ok(()),
///         }
///     }
///
///     fn synced(&self) -> bool {
///         self.stage == Stage::Done
///     }
/// }
/// ```
pub trait GhostCluster: Send {
    /// Set the time this cluster must reach in the current cycle.
    fn update_sync_time(&mut self, sync_time: SyncTime);

    /// Reinitialize progress state for a new cycle.
    ///
    /// Called after [`update_sync_time`](Self::update_sync_time). A cluster
    /// may decide here that no work is needed and report synced right away.
    fn reset(&mut self);

    /// Perform one unit of communication progress.
    ///
    /// # Guarantees
    ///
    /// - **Non-blocking**: returns as soon as the unit of work is done
    /// - **Idempotent when synced**: calling this on a synced cluster is a no-op
    fn act(&mut self) -> Result<(), ClusterError>;

    /// Whether this cluster has reached its current sync time.
    fn synced(&self) -> bool;
}

impl<C: GhostCluster + ?Sized> GhostCluster for Box<C> {
    fn update_sync_time(&mut self, sync_time: SyncTime) {
        (**self).update_sync_time(sync_time)
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn act(&mut self) -> Result<(), ClusterError> {
        (**self).act()
    }

    fn synced(&self) -> bool {
        (**self).synced()
    }
}
