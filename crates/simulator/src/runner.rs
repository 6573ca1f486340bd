//! Solver loop driving a communication scheduler.

use crate::cluster::LatencyCluster;
use crate::metrics::{MetricsCollector, SimulationReport};
use crate::{SimulatorConfig, SimulatorError};
use ghostcomm_core::GhostCluster;
use ghostcomm_scheduler::{build_scheduler, CommScheduler, GhostClusters};
use ghostcomm_types::{ClusterId, SyncTime};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Runs a time-stepping solver loop against simulated ghost clusters.
///
/// Each step resets the scheduler to the next sync time, burns the configured
/// compute time while calling `progression()` every `progress_interval`, then
/// spins until communication has finished. Only the time spent after compute
/// counts as exposed wait.
pub struct Simulator {
    config: SimulatorConfig,
}

impl Simulator {
    /// Create a simulator.
    pub fn new(config: SimulatorConfig) -> Result<Self, SimulatorError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration this simulator runs.
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Build the simulated cluster collection.
    pub fn build_clusters(&self) -> GhostClusters {
        (0..self.config.num_clusters)
            .map(|i| {
                Box::new(LatencyCluster::new(
                    ClusterId(i),
                    self.config.exchange.clone(),
                    self.config.seed,
                )) as Box<dyn GhostCluster>
            })
            .collect()
    }

    /// Run every step and report exposed wait.
    pub fn run(&self) -> Result<SimulationReport, SimulatorError> {
        let mut comm = build_scheduler(&self.config.comm, self.build_clusters());
        let mut metrics = MetricsCollector::new()?;

        info!(
            strategy = %comm.strategy(),
            clusters = self.config.num_clusters,
            steps = self.config.steps,
            "Starting simulation"
        );

        let start = Instant::now();
        let mut sync_time = SyncTime::ZERO;
        for step in 0..self.config.steps {
            sync_time = sync_time.advance(self.config.dt);
            comm.reset(sync_time)?;

            self.compute(comm.as_mut())?;
            let wait = wait_for_comm(comm.as_mut())?;
            metrics.record_step(wait);

            debug!(step, %sync_time, wait_us = wait.as_micros() as u64, "Step complete");
        }

        let report = metrics.finish(comm.strategy(), start.elapsed());
        info!(
            steps = report.steps,
            total_wait_ms = report.total_wait.as_millis() as u64,
            "Simulation complete"
        );
        Ok(report)
    }

    /// Busy compute phase, interleaved with progression calls.
    fn compute(&self, comm: &mut dyn CommScheduler) -> Result<(), SimulatorError> {
        let end = Instant::now() + self.config.compute_time;
        let mut next_progress = Instant::now();

        loop {
            let now = Instant::now();
            if now >= end {
                return Ok(());
            }
            if now >= next_progress {
                comm.progression()?;
                next_progress = now + self.config.progress_interval;
            }
            std::hint::spin_loop();
        }
    }
}

/// Drive progress until the cycle is finished; returns how long that took.
fn wait_for_comm(comm: &mut dyn CommScheduler) -> Result<Duration, SimulatorError> {
    let start = Instant::now();
    while !comm.check_if_finished() {
        comm.progression()?;
        std::hint::spin_loop();
    }
    Ok(start.elapsed())
}
