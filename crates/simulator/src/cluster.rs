//! Simulated ghost clusters with configurable exchange latency.

use crate::config::ExchangeConfig;
use ghostcomm_core::{ClusterError, GhostCluster};
use ghostcomm_types::{ClusterId, SyncTime};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::{Duration, Instant};

/// Ghost cluster that pretends to exchange boundary data with a neighbor.
///
/// Each cycle needs `stages` progress calls (posting sends and receives,
/// testing requests) and ghost data arrives only after the sampled latency
/// has elapsed. Once both hold, the cluster's local time jumps to the sync
/// time. A cluster whose local time already reaches the new sync time has
/// nothing to exchange and is synced straight after reset.
pub struct LatencyCluster {
    id: ClusterId,
    exchange: ExchangeConfig,
    rng: ChaCha8Rng,

    sync_time: SyncTime,
    /// Simulated time this cluster's ghost layer is valid for.
    local_time: f64,

    stages_done: u32,
    /// When the current cycle's data arrives.
    arrival: Option<Instant>,
    /// Completed reset cycles.
    cycles: u64,
}

impl LatencyCluster {
    /// Create a cluster with deterministic jitter derived from `seed`.
    pub fn new(id: ClusterId, exchange: ExchangeConfig, seed: u64) -> Self {
        Self {
            id,
            exchange,
            rng: ChaCha8Rng::seed_from_u64(seed ^ u64::from(id.0).wrapping_mul(0x9e37_79b9)),
            sync_time: SyncTime::ZERO,
            local_time: 0.0,
            stages_done: 0,
            arrival: None,
            cycles: 0,
        }
    }

    /// This cluster's identifier.
    pub fn id(&self) -> ClusterId {
        self.id
    }

    /// Simulated time the ghost layer is valid for.
    pub fn local_time(&self) -> f64 {
        self.local_time
    }

    fn sample_latency(&mut self) -> Duration {
        let jitter_us = self.exchange.jitter.as_micros() as u64;
        let extra = if jitter_us == 0 {
            0
        } else {
            self.rng.gen_range(0..=jitter_us)
        };
        self.exchange.latency + Duration::from_micros(extra)
    }
}

impl GhostCluster for LatencyCluster {
    fn update_sync_time(&mut self, sync_time: SyncTime) {
        self.sync_time = sync_time;
    }

    fn reset(&mut self) {
        self.cycles += 1;
        self.stages_done = 0;
        self.arrival = if self.synced() {
            None
        } else {
            Some(Instant::now() + self.sample_latency())
        };
    }

    fn act(&mut self) -> Result<(), ClusterError> {
        if self.synced() {
            return Ok(());
        }

        if let Some(limit) = self.exchange.fail_after_cycles {
            if self.cycles > limit {
                return Err(ClusterError::Transport {
                    cluster: self.id,
                    reason: format!("link dropped in cycle {}", self.cycles),
                });
            }
        }

        if self.stages_done < self.exchange.stages {
            self.stages_done += 1;
            return Ok(());
        }

        if self.arrival.is_some_and(|at| Instant::now() >= at) {
            self.local_time = self.sync_time.get();
            self.arrival = None;
        }
        Ok(())
    }

    fn synced(&self) -> bool {
        self.sync_time.is_reached_by(self.local_time)
    }
}
