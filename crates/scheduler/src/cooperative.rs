//! Cooperative scheduling on the caller's thread.

use crate::{ClusterSet, CommError, CommScheduler, CommStrategy, GhostClusters};
use ghostcomm_types::SyncTime;

/// Polls ghost clusters only when the caller asks it to.
///
/// No threads are involved: each `progression()` is one poll pass over every
/// cluster, and `check_if_finished()` asks every cluster again instead of
/// trusting a cached flag. Nothing else can change cluster state between
/// calls, so the answer is always current.
#[derive(Debug)]
pub struct CooperativeScheduler {
    clusters: ClusterSet,
}

impl CooperativeScheduler {
    /// Create a scheduler owning `clusters`.
    pub fn new(clusters: GhostClusters) -> Self {
        Self {
            clusters: ClusterSet::new(clusters),
        }
    }

    /// The driven clusters.
    pub fn clusters(&self) -> &ClusterSet {
        &self.clusters
    }
}

impl CommScheduler for CooperativeScheduler {
    fn reset(&mut self, new_sync_time: SyncTime) -> Result<(), CommError> {
        self.clusters.reset(new_sync_time);
        Ok(())
    }

    fn progression(&mut self) -> Result<(), CommError> {
        self.clusters.poll()?;
        Ok(())
    }

    fn check_if_finished(&self) -> bool {
        self.clusters.all_synced()
    }

    fn strategy(&self) -> CommStrategy {
        CommStrategy::Cooperative
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ghostcomm_core::ClusterError;
    use ghostcomm_test_helpers::{scripted_clusters, ScriptedCluster};

    #[test]
    fn test_finishes_after_slowest_cluster() {
        let (clusters, _) = scripted_clusters(&[1, 2, 3]);
        let mut comm = CooperativeScheduler::new(clusters);
        comm.reset(SyncTime(1.0)).unwrap();

        comm.progression().unwrap();
        assert!(!comm.check_if_finished());
        comm.progression().unwrap();
        assert!(!comm.check_if_finished());
        comm.progression().unwrap();
        assert!(comm.check_if_finished());
    }

    #[test]
    fn test_finished_iff_enough_progressions() {
        let acts = [4, 0, 7, 2, 7];
        let slowest = 7;
        let (clusters, _) = scripted_clusters(&acts);
        let mut comm = CooperativeScheduler::new(clusters);

        for cycle in 0..2 {
            comm.reset(SyncTime(cycle as f64)).unwrap();
            for calls in 1..=10u64 {
                comm.progression().unwrap();
                assert_eq!(comm.check_if_finished(), calls >= slowest);
            }
        }
    }

    #[test]
    fn test_every_cluster_acted_on_each_progression() {
        let (clusters, probes) = scripted_clusters(&[0, 1, 3]);
        let mut comm = CooperativeScheduler::new(clusters);
        comm.reset(SyncTime(1.0)).unwrap();

        for calls in 1..=4u64 {
            comm.progression().unwrap();
            assert!(probes.iter().all(|p| p.acts() == calls));
        }
    }

    #[test]
    fn test_check_does_not_make_progress() {
        let (clusters, probes) = scripted_clusters(&[2]);
        let mut comm = CooperativeScheduler::new(clusters);
        comm.reset(SyncTime(1.0)).unwrap();

        for _ in 0..5 {
            assert!(!comm.check_if_finished());
        }
        assert_eq!(probes[0].acts(), 0);
    }

    #[test]
    fn test_reset_after_completion_restarts() {
        let (clusters, probes) = scripted_clusters(&[1, 1]);
        let mut comm = CooperativeScheduler::new(clusters);

        comm.reset(SyncTime(1.0)).unwrap();
        comm.progression().unwrap();
        assert!(comm.check_if_finished());

        comm.reset(SyncTime(2.0)).unwrap();
        assert!(!comm.check_if_finished());
        assert!(probes.iter().all(|p| p.sync_time() == SyncTime(2.0)));
    }

    #[test]
    fn test_empty_collection_is_finished() {
        let mut comm = CooperativeScheduler::new(Vec::new());
        assert!(comm.check_if_finished());
        comm.reset(SyncTime(1.0)).unwrap();
        assert!(comm.check_if_finished());
        comm.progression().unwrap();
        assert!(comm.check_if_finished());
    }

    #[test]
    fn test_cluster_failure_propagates() {
        let cluster = ScriptedCluster::new(3, 5).failing_on_act(2);
        let mut comm = CooperativeScheduler::new(vec![cluster.boxed()]);
        comm.reset(SyncTime(1.0)).unwrap();

        comm.progression().unwrap();
        let err = comm.progression().unwrap_err();
        assert!(matches!(
            err,
            CommError::Cluster(ClusterError::Transport { .. })
        ));
        assert_eq!(comm.clusters().len(), 1);
    }
}
