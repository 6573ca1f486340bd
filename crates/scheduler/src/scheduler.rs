//! The scheduling contract shared by both strategies.

use crate::{
    BackgroundScheduler, CommConfig, CommError, CommStrategy, CooperativeScheduler, GhostClusters,
};
use ghostcomm_types::SyncTime;

/// Drives ghost cluster communication for a time-stepping solver.
///
/// The solver loop starts every communication cycle with [`reset`], keeps
/// computing while calling [`progression`] between chunks of work, and moves
/// on once [`check_if_finished`] reports true.
///
/// A scheduler is driven by a single logical caller. Every mutating
/// operation takes `&mut self`, so concurrent resets cannot happen.
///
/// # Example
///
/// ```ignore
/// let mut comm = build_scheduler(&CommConfig::background(), clusters);
/// let mut t = SyncTime::ZERO;
/// for _ in 0..steps {
///     t = t.advance(dt);
///     comm.reset(t)?;
///     for chunk in local_work.chunks() {
///         chunk.compute();
///         comm.progression()?;
///     }
///     while !comm.check_if_finished() {
///         comm.progression()?;
///     }
/// }
/// ```
///
/// [`reset`]: CommScheduler::reset
/// [`progression`]: CommScheduler::progression
/// [`check_if_finished`]: CommScheduler::check_if_finished
pub trait CommScheduler: Send {
    /// Start a new cycle in which every cluster must reach `new_sync_time`.
    ///
    /// Cancels whatever is left of the previous cycle. When this returns no
    /// cluster operation from an earlier cycle is still running.
    fn reset(&mut self, new_sync_time: SyncTime) -> Result<(), CommError>;

    /// Advance communication by one strategy-defined unit of work.
    fn progression(&mut self) -> Result<(), CommError>;

    /// Whether every cluster has reached the current sync time.
    ///
    /// Never blocks and has no side effects.
    fn check_if_finished(&self) -> bool;

    /// The strategy this scheduler implements.
    fn strategy(&self) -> CommStrategy;
}

/// Build the scheduler selected by `config`, taking ownership of `clusters`.
///
/// Call this from the solver thread: background pinning reserves the calling
/// thread's CPUs.
pub fn build_scheduler(config: &CommConfig, clusters: GhostClusters) -> Box<dyn CommScheduler> {
    match config.strategy {
        CommStrategy::Cooperative => Box::new(CooperativeScheduler::new(clusters)),
        CommStrategy::Background => Box::new(
            BackgroundScheduler::new(clusters, config.pinning.pinner())
                .with_thread_name(config.worker_thread_name.clone()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PinningMode;
    use ghostcomm_test_helpers::scripted_clusters;
    use std::time::{Duration, Instant};

    fn run_cycle(comm: &mut dyn CommScheduler, t: SyncTime) {
        comm.reset(t).unwrap();
        let deadline = Instant::now() + Duration::from_secs(10);
        while !comm.check_if_finished() {
            assert!(Instant::now() < deadline, "cycle did not finish");
            comm.progression().unwrap();
        }
    }

    #[test]
    fn test_build_selects_strategy() {
        let (clusters, _) = scripted_clusters(&[1]);
        let comm = build_scheduler(&CommConfig::cooperative(), clusters);
        assert_eq!(comm.strategy(), CommStrategy::Cooperative);

        let (clusters, _) = scripted_clusters(&[1]);
        let config = CommConfig::background().with_pinning(PinningMode::Disabled);
        let comm = build_scheduler(&config, clusters);
        assert_eq!(comm.strategy(), CommStrategy::Background);
    }

    #[test]
    fn test_same_solver_loop_drives_both_strategies() {
        for strategy in [CommStrategy::Cooperative, CommStrategy::Background] {
            let (clusters, probes) = scripted_clusters(&[2, 4, 1]);
            let config = CommConfig::default()
                .with_strategy(strategy)
                .with_pinning(PinningMode::Disabled);
            let mut comm = build_scheduler(&config, clusters);

            let mut t = SyncTime::ZERO;
            for _ in 0..3 {
                t = t.advance(0.1);
                run_cycle(comm.as_mut(), t);
            }

            for probe in &probes {
                assert_eq!(probe.resets(), 3, "{strategy}");
                assert_eq!(probe.sync_time(), t, "{strategy}");
                assert_eq!(probe.overlaps(), 0, "{strategy}");
            }
        }
    }
}
