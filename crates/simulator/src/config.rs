//! Configuration types for the simulator.

use crate::SimulatorError;
use ghostcomm_scheduler::{CommConfig, CommStrategy, PinningMode};
use std::time::Duration;

/// Configuration for a simulation run.
#[derive(Clone, Debug)]
pub struct SimulatorConfig {
    /// Number of ghost clusters (neighboring regions).
    pub num_clusters: u32,

    /// Number of solver time steps.
    pub steps: u64,

    /// Simulated time advanced per step.
    pub dt: f64,

    /// Wall-clock compute time per step.
    pub compute_time: Duration,

    /// How often the solver calls `progression()` while computing.
    pub progress_interval: Duration,

    /// Exchange behavior of every cluster.
    pub exchange: ExchangeConfig,

    /// Communication scheduler configuration.
    pub comm: CommConfig,

    /// Random seed for deterministic latency jitter.
    pub seed: u64,
}

impl SimulatorConfig {
    /// Create a new simulator configuration.
    pub fn new(num_clusters: u32, steps: u64) -> Self {
        Self {
            num_clusters,
            steps,
            dt: 0.01,
            compute_time: Duration::from_millis(2),
            progress_interval: Duration::from_micros(100),
            exchange: ExchangeConfig::default(),
            comm: CommConfig::default(),
            seed: 12345,
        }
    }

    /// Set the simulated time step.
    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    /// Set the compute time per step.
    pub fn with_compute_time(mut self, compute_time: Duration) -> Self {
        self.compute_time = compute_time;
        self
    }

    /// Set how often the solver drives progress while computing.
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Set the exchange configuration.
    pub fn with_exchange(mut self, exchange: ExchangeConfig) -> Self {
        self.exchange = exchange;
        self
    }

    /// Set the communication strategy.
    pub fn with_strategy(mut self, strategy: CommStrategy) -> Self {
        self.comm = self.comm.with_strategy(strategy);
        self
    }

    /// Set the worker pinning mode.
    pub fn with_pinning(mut self, pinning: PinningMode) -> Self {
        self.comm = self.comm.with_pinning(pinning);
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check the configuration can be run.
    pub fn validate(&self) -> Result<(), SimulatorError> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(SimulatorError::InvalidConfig(format!(
                "time step must be positive, got {}",
                self.dt
            )));
        }
        if self.progress_interval.is_zero() {
            return Err(SimulatorError::InvalidConfig(
                "progress interval must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self::new(4, 100)
    }
}

/// How a simulated ghost exchange behaves.
#[derive(Clone, Debug)]
pub struct ExchangeConfig {
    /// Base one-way latency before ghost data arrives.
    pub latency: Duration,

    /// Uniform extra latency in `[0, jitter]` per cycle.
    pub jitter: Duration,

    /// Progress calls needed to post and complete the exchange.
    pub stages: u32,

    /// Inject a transport failure once this many cycles have completed.
    pub fail_after_cycles: Option<u64>,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            latency: Duration::from_millis(1),
            jitter: Duration::from_micros(500),
            stages: 2,
            fail_after_cycles: None,
        }
    }
}

impl ExchangeConfig {
    /// Set the base latency.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Set the latency jitter.
    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Set the number of progress stages.
    pub fn with_stages(mut self, stages: u32) -> Self {
        self.stages = stages;
        self
    }

    /// Fail every exchange after `cycles` successful cycles.
    pub fn failing_after(mut self, cycles: u64) -> Self {
        self.fail_after_cycles = Some(cycles);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_fields() {
        let config = SimulatorConfig::new(8, 10)
            .with_dt(0.5)
            .with_compute_time(Duration::from_millis(3))
            .with_strategy(CommStrategy::Cooperative)
            .with_pinning(PinningMode::Disabled)
            .with_seed(7);

        assert_eq!(config.num_clusters, 8);
        assert_eq!(config.steps, 10);
        assert_eq!(config.dt, 0.5);
        assert_eq!(config.comm.strategy, CommStrategy::Cooperative);
        assert_eq!(config.comm.pinning, PinningMode::Disabled);
        assert_eq!(config.seed, 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_step() {
        assert!(SimulatorConfig::default().with_dt(0.0).validate().is_err());
        assert!(SimulatorConfig::default()
            .with_dt(f64::NAN)
            .validate()
            .is_err());
        assert!(SimulatorConfig::default()
            .with_progress_interval(Duration::ZERO)
            .validate()
            .is_err());
    }
}
