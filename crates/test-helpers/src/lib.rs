//! Instrumented ghost clusters for scheduler tests.
//!
//! [`ScriptedCluster`] becomes synced after a fixed number of `act()` calls
//! per cycle and reports everything that happens to it through a shared
//! [`ClusterProbe`]. The probe stays readable from the test thread while the
//! cluster itself is owned by a scheduler (and possibly a worker thread).
//! Clusters sharing a [`CallLog`] also record the order of their calls.

use ghostcomm_core::{ClusterError, GhostCluster};
use ghostcomm_types::{ClusterId, SyncTime};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// A single cluster call, as seen by a [`CallLog`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClusterCall {
    UpdateSyncTime(ClusterId, SyncTime),
    Reset(ClusterId),
    Act(ClusterId),
}

/// Call sequence shared across clusters.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<ClusterCall>>>,
}

impl CallLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls recorded so far, oldest first.
    pub fn calls(&self) -> Vec<ClusterCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn record(&self, call: ClusterCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

/// Observations shared between a [`ScriptedCluster`] and the test.
#[derive(Debug, Default)]
pub struct ClusterProbe {
    acts: AtomicU64,
    resets: AtomicU64,
    sync_updates: AtomicU64,
    sync_time_bits: AtomicU64,
    busy: AtomicBool,
    overlaps: AtomicU64,
}

impl ClusterProbe {
    /// Total `act()` calls across all cycles.
    pub fn acts(&self) -> u64 {
        self.acts.load(Ordering::Acquire)
    }

    /// Total `reset()` calls.
    pub fn resets(&self) -> u64 {
        self.resets.load(Ordering::Acquire)
    }

    /// Total `update_sync_time()` calls.
    pub fn sync_updates(&self) -> u64 {
        self.sync_updates.load(Ordering::Acquire)
    }

    /// Last sync time handed to the cluster.
    pub fn sync_time(&self) -> SyncTime {
        SyncTime(f64::from_bits(self.sync_time_bits.load(Ordering::Acquire)))
    }

    /// Number of cluster calls that started while another was in flight.
    ///
    /// Any non-zero value means two execution contexts touched the cluster
    /// at the same time.
    pub fn overlaps(&self) -> u64 {
        self.overlaps.load(Ordering::Acquire)
    }

    /// Whether a cluster call is executing right now.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn enter(&self) {
        if self.busy.swap(true, Ordering::AcqRel) {
            self.overlaps.fetch_add(1, Ordering::AcqRel);
        }
    }

    fn exit(&self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Ghost cluster that syncs after a fixed number of acts per cycle.
#[derive(Debug)]
pub struct ScriptedCluster {
    id: ClusterId,
    /// Acts needed per cycle; `None` never syncs.
    acts_to_sync: Option<u64>,
    acts_this_cycle: u64,
    act_delay: Duration,
    /// Fail on this (1-based) act of every cycle.
    fail_on_act: Option<u64>,
    probe: Arc<ClusterProbe>,
    log: Option<CallLog>,
}

impl ScriptedCluster {
    /// Cluster that becomes synced after `acts` calls to `act()` per cycle.
    ///
    /// Zero acts means the cluster reports synced straight after reset.
    pub fn new(id: u32, acts: u64) -> Self {
        Self {
            id: ClusterId(id),
            acts_to_sync: Some(acts),
            acts_this_cycle: 0,
            act_delay: Duration::ZERO,
            fail_on_act: None,
            probe: Arc::new(ClusterProbe::default()),
            log: None,
        }
    }

    /// Cluster that never reaches its sync time.
    pub fn never_syncs(id: u32) -> Self {
        Self {
            acts_to_sync: None,
            ..Self::new(id, 0)
        }
    }

    /// Sleep this long inside every `act()`.
    pub fn with_act_delay(mut self, delay: Duration) -> Self {
        self.act_delay = delay;
        self
    }

    /// Return a transport error from the `n`th act of each cycle.
    pub fn failing_on_act(mut self, n: u64) -> Self {
        self.fail_on_act = Some(n);
        self
    }

    /// Append every call to `log`.
    pub fn with_call_log(mut self, log: &CallLog) -> Self {
        self.log = Some(log.clone());
        self
    }

    /// Shared probe for observing this cluster.
    pub fn probe(&self) -> Arc<ClusterProbe> {
        Arc::clone(&self.probe)
    }

    /// Box the cluster for handing to a scheduler.
    pub fn boxed(self) -> Box<dyn GhostCluster> {
        Box::new(self)
    }

    fn record(&self, call: ClusterCall) {
        if let Some(log) = &self.log {
            log.record(call);
        }
    }
}

impl GhostCluster for ScriptedCluster {
    fn update_sync_time(&mut self, sync_time: SyncTime) {
        self.probe.enter();
        self.probe
            .sync_time_bits
            .store(sync_time.get().to_bits(), Ordering::Release);
        self.probe.sync_updates.fetch_add(1, Ordering::AcqRel);
        self.record(ClusterCall::UpdateSyncTime(self.id, sync_time));
        self.probe.exit();
    }

    fn reset(&mut self) {
        self.probe.enter();
        self.acts_this_cycle = 0;
        self.probe.resets.fetch_add(1, Ordering::AcqRel);
        self.record(ClusterCall::Reset(self.id));
        self.probe.exit();
    }

    fn act(&mut self) -> Result<(), ClusterError> {
        self.probe.enter();
        self.probe.acts.fetch_add(1, Ordering::AcqRel);
        self.record(ClusterCall::Act(self.id));
        if !self.act_delay.is_zero() {
            std::thread::sleep(self.act_delay);
        }

        let result = if self.synced() {
            Ok(())
        } else {
            self.acts_this_cycle += 1;
            match self.fail_on_act {
                Some(n) if n == self.acts_this_cycle => Err(ClusterError::Transport {
                    cluster: self.id,
                    reason: format!("injected failure on act {}", n),
                }),
                _ => Ok(()),
            }
        };

        self.probe.exit();
        result
    }

    fn synced(&self) -> bool {
        match self.acts_to_sync {
            Some(needed) => self.acts_this_cycle >= needed,
            None => false,
        }
    }
}

/// Build scripted clusters syncing after the given act counts, with probes.
pub fn scripted_clusters(acts: &[u64]) -> (Vec<Box<dyn GhostCluster>>, Vec<Arc<ClusterProbe>>) {
    acts.iter()
        .enumerate()
        .map(|(i, &n)| {
            let cluster = ScriptedCluster::new(i as u32, n);
            let probe = cluster.probe();
            (cluster.boxed(), probe)
        })
        .unzip()
}

/// Scripted clusters syncing after the given act counts, all logging to `log`.
pub fn logged_clusters(acts: &[u64], log: &CallLog) -> Vec<Box<dyn GhostCluster>> {
    acts.iter()
        .enumerate()
        .map(|(i, &n)| ScriptedCluster::new(i as u32, n).with_call_log(log).boxed())
        .collect()
}

/// Sum of `act()` calls across probes.
pub fn total_acts(probes: &[Arc<ClusterProbe>]) -> u64 {
    probes.iter().map(|p| p.acts()).sum()
}
