//! Background scheduling on a dedicated worker thread.
//!
//! # Handoff
//!
//! The [`ClusterSet`] is moved into each worker and comes back out of its
//! join handle. While a worker runs, the scheduler holds nothing but the
//! handle, so no cluster can be touched from the caller's side until the
//! worker has been joined. The only state crossing the thread boundary is
//! the pair of flags in [`WorkerFlags`].

use crate::pinning::CpuPinner;
use crate::{ClusterSet, CommError, CommScheduler, CommStrategy, GhostClusters};
use ghostcomm_core::ClusterError;
use ghostcomm_types::SyncTime;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, trace, warn};

/// Flags shared between the caller and the worker.
#[derive(Debug, Default)]
struct WorkerFlags {
    /// Set by the caller to stop the worker. Checked once per poll.
    reset_requested: AtomicBool,
    /// Written by the worker after every poll; read by any caller.
    finished: AtomicBool,
}

/// What a worker hands back when it exits.
struct WorkerExit {
    clusters: ClusterSet,
    polls: u64,
    result: Result<(), ClusterError>,
}

enum Worker {
    /// No worker; the clusters are here.
    Idle(ClusterSet),
    /// A worker owns the clusters.
    Running(JoinHandle<WorkerExit>),
    /// The clusters went down with a worker that failed to spawn.
    Lost,
}

/// Polls ghost clusters on a dedicated thread.
///
/// Every [`reset`](CommScheduler::reset) stops and joins the current worker,
/// resets the clusters on the caller's thread, and launches a fresh worker
/// for the new cycle. The worker pins itself, then polls until every cluster
/// is synced or the next reset is requested.
///
/// [`progression`](CommScheduler::progression) never drives clusters. It
/// only reaps a worker that has already exited, so that a cluster failure
/// surfaces on the caller's thread without waiting for the next reset.
pub struct BackgroundScheduler {
    worker: Worker,
    flags: Arc<WorkerFlags>,
    pinner: Arc<dyn CpuPinner>,
    thread_name: String,
}

impl BackgroundScheduler {
    /// Create a scheduler owning `clusters`.
    ///
    /// No worker runs until the first reset. Each worker hands itself to
    /// `pinner` before its first poll.
    pub fn new(clusters: GhostClusters, pinner: Arc<dyn CpuPinner>) -> Self {
        let clusters = ClusterSet::new(clusters);
        let flags = WorkerFlags {
            reset_requested: AtomicBool::new(false),
            finished: AtomicBool::new(clusters.all_synced()),
        };

        Self {
            worker: Worker::Idle(clusters),
            flags: Arc::new(flags),
            pinner,
            thread_name: "ghost-comm".to_string(),
        }
    }

    /// Name worker threads `name`.
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Whether a worker is currently polling.
    pub fn is_worker_running(&self) -> bool {
        matches!(&self.worker, Worker::Running(handle) if !handle.is_finished())
    }

    /// Stop and join the worker without starting a new cycle.
    ///
    /// Returns the error the worker stopped on, if any. The scheduler can be
    /// reset again afterwards.
    pub fn shutdown(&mut self) -> Result<(), CommError> {
        self.flags.reset_requested.store(true, Ordering::Release);
        self.reap_worker(true)
    }

    /// Join the worker if `wait` is set or it has already exited.
    ///
    /// A panic on the worker is resumed on this thread.
    fn reap_worker(&mut self, wait: bool) -> Result<(), CommError> {
        let handle = match std::mem::replace(&mut self.worker, Worker::Lost) {
            Worker::Running(handle) if wait || handle.is_finished() => handle,
            other => {
                self.worker = other;
                return Ok(());
            }
        };

        let exit = match handle.join() {
            Ok(exit) => exit,
            Err(payload) => std::panic::resume_unwind(payload),
        };
        debug!(polls = exit.polls, "Joined comm worker");

        self.worker = Worker::Idle(exit.clusters);
        exit.result.map_err(CommError::from)
    }

    fn spawn_worker(&self, clusters: ClusterSet) -> Result<JoinHandle<WorkerExit>, CommError> {
        let flags = Arc::clone(&self.flags);
        let pinner = Arc::clone(&self.pinner);

        thread::Builder::new()
            .name(self.thread_name.clone())
            .spawn(move || run_worker(clusters, &flags, pinner.as_ref()))
            .map_err(CommError::WorkerSpawn)
    }
}

impl CommScheduler for BackgroundScheduler {
    fn reset(&mut self, new_sync_time: SyncTime) -> Result<(), CommError> {
        // Stop the current worker and wait until it has fully exited
        self.flags.reset_requested.store(true, Ordering::Release);
        self.reap_worker(true)?;

        self.flags.reset_requested.store(false, Ordering::Release);
        self.flags.finished.store(false, Ordering::Release);

        let Worker::Idle(mut clusters) = std::mem::replace(&mut self.worker, Worker::Lost) else {
            return Err(CommError::ClustersLost);
        };
        clusters.reset(new_sync_time);

        // Nothing to exchange this cycle
        if clusters.all_synced() {
            self.flags.finished.store(true, Ordering::Release);
            self.worker = Worker::Idle(clusters);
            debug!(%new_sync_time, "All clusters synced at reset, no worker launched");
            return Ok(());
        }

        self.worker = Worker::Running(self.spawn_worker(clusters)?);
        debug!(%new_sync_time, "Launched comm worker");
        Ok(())
    }

    fn progression(&mut self) -> Result<(), CommError> {
        self.reap_worker(false)
    }

    fn check_if_finished(&self) -> bool {
        self.flags.finished.load(Ordering::Acquire)
    }

    fn strategy(&self) -> CommStrategy {
        CommStrategy::Background
    }
}

impl Drop for BackgroundScheduler {
    fn drop(&mut self) {
        self.flags.reset_requested.store(true, Ordering::Release);
        if let Worker::Running(handle) = std::mem::replace(&mut self.worker, Worker::Lost) {
            match handle.join() {
                Ok(WorkerExit {
                    result: Err(e), ..
                }) => warn!(error = %e, "Comm worker had failed before shutdown"),
                Ok(_) => {}
                Err(_) => warn!("Comm worker panicked before shutdown"),
            }
        }
    }
}

/// Worker body: pin, then poll until finished or asked to stop.
fn run_worker(mut clusters: ClusterSet, flags: &WorkerFlags, pinner: &dyn CpuPinner) -> WorkerExit {
    if let Err(e) = pinner.pin_current_thread() {
        debug!(error = %e, "Comm worker left unpinned");
    }

    let mut polls = 0u64;
    while !flags.reset_requested.load(Ordering::Acquire) && !flags.finished.load(Ordering::Acquire)
    {
        polls += 1;
        match clusters.poll() {
            Ok(finished) => flags.finished.store(finished, Ordering::Release),
            Err(e) => {
                warn!(error = %e, polls, "Comm worker stopped on cluster failure");
                return WorkerExit {
                    clusters,
                    polls,
                    result: Err(e),
                };
            }
        }
        trace!(polls, "Comm worker polled");
    }

    WorkerExit {
        clusters,
        polls,
        result: Ok(()),
    }
}
