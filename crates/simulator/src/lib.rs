//! Ghostcomm Simulator
//!
//! Runs a time-stepping solver loop against simulated ghost clusters to show
//! how much exchange latency each communication strategy hides behind
//! computation.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                      Simulator                        │
//! │                                                       │
//! │   for each step:                                      │
//! │     reset(t + dt) ──► compute + progression() ──►     │
//! │     spin until check_if_finished() ──► record wait    │
//! └──────────────────────────┬────────────────────────────┘
//!                            │ Box<dyn CommScheduler>
//!                            ▼
//! ┌───────────────────────────────────────────────────────┐
//! │   LatencyCluster × N  (stages + sampled latency)      │
//! └───────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use ghostcomm_simulator::{Simulator, SimulatorConfig};
//! use ghostcomm_scheduler::CommStrategy;
//!
//! let config = SimulatorConfig::new(6, 200).with_strategy(CommStrategy::Background);
//! let report = Simulator::new(config)?.run()?;
//! report.print();
//! ```

pub mod cluster;
pub mod config;
mod error;
pub mod metrics;
pub mod runner;

pub use cluster::LatencyCluster;
pub use config::{ExchangeConfig, SimulatorConfig};
pub use error::SimulatorError;
pub use metrics::{MetricsCollector, SimulationReport};
pub use runner::Simulator;
