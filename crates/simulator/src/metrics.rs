//! Exposed-wait metrics for simulation runs.
//!
//! The number that matters is how long the solver sits idle after finishing
//! its compute phase, waiting for ghost data. A strategy that hides latency
//! well keeps this close to zero.

use crate::SimulatorError;
use ghostcomm_scheduler::CommStrategy;
use hdrhistogram::Histogram;
use std::time::Duration;

/// Highest wait the histogram tracks, in microseconds.
const MAX_WAIT_US: u64 = 60_000_000;

/// Collects per-step wait times.
pub struct MetricsCollector {
    waits_us: Histogram<u64>,
    steps: u64,
    total_wait: Duration,
}

impl MetricsCollector {
    /// Create an empty collector.
    pub fn new() -> Result<Self, SimulatorError> {
        let waits_us = Histogram::new_with_bounds(1, MAX_WAIT_US, 3)
            .map_err(|e| SimulatorError::Metrics(e.to_string()))?;
        Ok(Self {
            waits_us,
            steps: 0,
            total_wait: Duration::ZERO,
        })
    }

    /// Record how long one step waited for communication after computing.
    pub fn record_step(&mut self, wait: Duration) {
        self.waits_us.saturating_record(wait.as_micros() as u64);
        self.steps += 1;
        self.total_wait += wait;
    }

    /// Number of steps recorded.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Produce the final report.
    pub fn finish(&self, strategy: CommStrategy, elapsed: Duration) -> SimulationReport {
        let percentile = |q: f64| Duration::from_micros(self.waits_us.value_at_quantile(q));
        SimulationReport {
            strategy,
            steps: self.steps,
            elapsed,
            total_wait: self.total_wait,
            mean_wait: Duration::from_micros(self.waits_us.mean() as u64),
            p50_wait: percentile(0.50),
            p99_wait: percentile(0.99),
            max_wait: Duration::from_micros(self.waits_us.max()),
        }
    }
}

/// Summary of a simulation run.
#[derive(Debug, Clone)]
pub struct SimulationReport {
    /// Strategy that drove communication.
    pub strategy: CommStrategy,
    /// Steps completed.
    pub steps: u64,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
    /// Time spent waiting for communication across all steps.
    pub total_wait: Duration,
    /// Mean wait per step.
    pub mean_wait: Duration,
    /// Median wait per step.
    pub p50_wait: Duration,
    /// 99th percentile wait per step.
    pub p99_wait: Duration,
    /// Worst wait of any step.
    pub max_wait: Duration,
}

impl SimulationReport {
    /// Fraction of wall time spent waiting for communication.
    pub fn wait_fraction(&self) -> f64 {
        if self.elapsed.is_zero() {
            return 0.0;
        }
        self.total_wait.as_secs_f64() / self.elapsed.as_secs_f64()
    }

    /// Print a human-readable summary to stdout.
    pub fn print(&self) {
        println!("Strategy:        {}", self.strategy);
        println!("Steps:           {}", self.steps);
        println!("Elapsed:         {:?}", self.elapsed);
        println!(
            "Waiting:         {:?} ({:.1}%)",
            self.total_wait,
            self.wait_fraction() * 100.0
        );
        println!("Wait mean:       {:?}", self.mean_wait);
        println!("Wait p50:        {:?}", self.p50_wait);
        println!("Wait p99:        {:?}", self.p99_wait);
        println!("Wait max:        {:?}", self.max_wait);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_percentiles() {
        let mut metrics = MetricsCollector::new().unwrap();
        for ms in 1..=100u64 {
            metrics.record_step(Duration::from_millis(ms));
        }

        let report = metrics.finish(CommStrategy::Cooperative, Duration::from_secs(10));
        assert_eq!(report.steps, 100);
        assert_eq!(report.total_wait, Duration::from_millis(5050));

        // hdrhistogram keeps 3 significant digits
        let p50 = report.p50_wait.as_millis();
        assert!((49..=51).contains(&p50), "p50 = {p50}ms");
        assert!(report.max_wait >= Duration::from_millis(99));
        assert!((report.wait_fraction() - 0.505).abs() < 1e-9);
    }

    #[test]
    fn test_empty_report() {
        let metrics = MetricsCollector::new().unwrap();
        let report = metrics.finish(CommStrategy::Background, Duration::ZERO);
        assert_eq!(report.steps, 0);
        assert_eq!(report.wait_fraction(), 0.0);
    }
}
