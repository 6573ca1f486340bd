//! Communication scheduler configuration.

use crate::pinning::{CpuPinner, FreeCpuPinner, NoPinning};
use crate::CommError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// How ghost cluster progress is driven.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommStrategy {
    /// The solver loop calls `progression()` itself.
    #[serde(alias = "serial")]
    Cooperative,

    /// A dedicated worker thread polls in the background.
    #[default]
    #[serde(alias = "threaded")]
    Background,
}

impl fmt::Display for CommStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommStrategy::Cooperative => write!(f, "cooperative"),
            CommStrategy::Background => write!(f, "background"),
        }
    }
}

impl FromStr for CommStrategy {
    type Err = CommError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cooperative" | "serial" => Ok(CommStrategy::Cooperative),
            "background" | "threaded" => Ok(CommStrategy::Background),
            other => Err(CommError::UnknownStrategy(other.to_string())),
        }
    }
}

/// Where the background worker runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PinningMode {
    /// Pin to online CPUs outside the constructing thread's affinity set.
    #[default]
    FreeCpus,

    /// Leave the worker wherever the OS schedules it.
    Disabled,
}

impl PinningMode {
    /// Build the pinner for this mode.
    ///
    /// `FreeCpus` captures the calling thread's affinity, so call this from
    /// the solver thread.
    pub fn pinner(self) -> Arc<dyn CpuPinner> {
        match self {
            PinningMode::FreeCpus => Arc::new(FreeCpuPinner::capture()),
            PinningMode::Disabled => Arc::new(NoPinning),
        }
    }
}

/// Configuration for the communication scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CommConfig {
    /// Scheduling strategy.
    pub strategy: CommStrategy,

    /// Background worker pinning.
    ///
    /// Ignored by the cooperative strategy.
    pub pinning: PinningMode,

    /// Name given to background worker threads.
    pub worker_thread_name: String,
}

impl Default for CommConfig {
    fn default() -> Self {
        Self {
            strategy: CommStrategy::Background,
            pinning: PinningMode::FreeCpus,
            worker_thread_name: "ghost-comm".to_string(),
        }
    }
}

impl CommConfig {
    /// Cooperative polling on the caller's thread.
    pub fn cooperative() -> Self {
        Self {
            strategy: CommStrategy::Cooperative,
            ..Default::default()
        }
    }

    /// Background polling on a dedicated worker.
    pub fn background() -> Self {
        Self::default()
    }

    /// Set the strategy.
    pub fn with_strategy(mut self, strategy: CommStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the pinning mode.
    pub fn with_pinning(mut self, pinning: PinningMode) -> Self {
        self.pinning = pinning;
        self
    }

    /// Set the worker thread name.
    pub fn with_worker_thread_name(mut self, name: impl Into<String>) -> Self {
        self.worker_thread_name = name.into();
        self
    }
}
