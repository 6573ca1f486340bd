//! The owned ghost cluster collection and the operations every strategy shares.

use ghostcomm_core::{ClusterError, GhostCluster};
use ghostcomm_types::SyncTime;
use std::fmt;
use tracing::trace;

/// Ordered collection of exclusively owned ghost clusters.
pub type GhostClusters = Vec<Box<dyn GhostCluster>>;

/// Ghost clusters driven by a scheduler.
///
/// Order is fixed at construction and is the order clusters are reset and
/// polled in. Clusters are never added or removed afterwards.
pub struct ClusterSet {
    clusters: GhostClusters,
}

impl ClusterSet {
    /// Take ownership of an ordered cluster collection.
    pub fn new(clusters: GhostClusters) -> Self {
        Self { clusters }
    }

    /// Number of clusters.
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    /// Whether the collection has no clusters.
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Start a new cycle targeting `new_sync_time`.
    ///
    /// Every cluster, in order, first gets the new sync time and is then reset.
    pub fn reset(&mut self, new_sync_time: SyncTime) {
        for cluster in &mut self.clusters {
            cluster.update_sync_time(new_sync_time);
            cluster.reset();
        }
        trace!(clusters = self.clusters.len(), %new_sync_time, "Reset ghost clusters");
    }

    /// Make progress on every cluster and report whether all are synced.
    ///
    /// Each cluster's `act()` runs exactly once per call even when earlier
    /// clusters are already synced or not; there is no short-circuit. A
    /// cluster error is returned immediately and ends the pass.
    pub(crate) fn poll(&mut self) -> Result<bool, ClusterError> {
        let mut finished = true;
        for cluster in &mut self.clusters {
            cluster.act()?;
            finished = finished && cluster.synced();
        }
        Ok(finished)
    }

    /// Whether every cluster reports synced, without making progress.
    pub fn all_synced(&self) -> bool {
        self.clusters.iter().all(|cluster| cluster.synced())
    }
}

impl fmt::Debug for ClusterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterSet")
            .field("len", &self.clusters.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ghostcomm_test_helpers::{
        logged_clusters, scripted_clusters, CallLog, ClusterCall, ScriptedCluster,
    };
    use ghostcomm_types::ClusterId;

    #[test]
    fn test_reset_updates_then_resets_every_cluster() {
        let (clusters, probes) = scripted_clusters(&[1, 2, 3]);
        let mut set = ClusterSet::new(clusters);

        set.reset(SyncTime(2.5));

        for probe in &probes {
            assert_eq!(probe.sync_updates(), 1);
            assert_eq!(probe.resets(), 1);
            assert_eq!(probe.sync_time(), SyncTime(2.5));
        }
        assert!(!set.all_synced());
    }

    #[test]
    fn test_reset_order_is_update_then_reset_per_cluster() {
        let log = CallLog::new();
        let mut set = ClusterSet::new(logged_clusters(&[1, 1, 1], &log));
        let t = SyncTime(3.0);

        set.reset(t);

        assert_eq!(
            log.calls(),
            vec![
                ClusterCall::UpdateSyncTime(ClusterId(0), t),
                ClusterCall::Reset(ClusterId(0)),
                ClusterCall::UpdateSyncTime(ClusterId(1), t),
                ClusterCall::Reset(ClusterId(1)),
                ClusterCall::UpdateSyncTime(ClusterId(2), t),
                ClusterCall::Reset(ClusterId(2)),
            ]
        );
    }

    #[test]
    fn test_poll_acts_in_collection_order() {
        let log = CallLog::new();
        let mut set = ClusterSet::new(logged_clusters(&[2, 0, 1], &log));
        set.reset(SyncTime(1.0));
        log.clear();

        set.poll().unwrap();

        assert_eq!(
            log.calls(),
            vec![
                ClusterCall::Act(ClusterId(0)),
                ClusterCall::Act(ClusterId(1)),
                ClusterCall::Act(ClusterId(2)),
            ]
        );
    }

    #[test]
    fn test_poll_visits_every_cluster_once() {
        // First cluster syncs immediately; the others still have to be acted on
        let (clusters, probes) = scripted_clusters(&[0, 2, 5]);
        let mut set = ClusterSet::new(clusters);
        set.reset(SyncTime(1.0));

        for round in 1..=5u64 {
            let finished = set.poll().unwrap();
            for probe in &probes {
                assert_eq!(probe.acts(), round, "every act once per poll");
            }
            assert_eq!(finished, round >= 5);
        }
    }

    #[test]
    fn test_poll_propagates_cluster_error() {
        let failing = ScriptedCluster::new(1, 3).failing_on_act(1);
        let after = ScriptedCluster::new(2, 1);
        let after_probe = after.probe();
        let mut set = ClusterSet::new(vec![failing.boxed(), after.boxed()]);
        set.reset(SyncTime(1.0));

        let err = set.poll().unwrap_err();
        assert!(matches!(err, ClusterError::Transport { .. }));
        assert_eq!(after_probe.acts(), 0);
    }

    #[test]
    fn test_empty_set_is_synced() {
        let mut set = ClusterSet::new(Vec::new());
        assert!(set.is_empty());
        assert!(set.all_synced());
        set.reset(SyncTime(1.0));
        assert!(set.poll().unwrap());
    }
}
