//! Domain-specific identifier types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ghost cluster identifier.
///
/// Assigned by whoever builds the cluster collection; the scheduler only uses
/// it for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterId(pub u32);

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cluster({})", self.0)
    }
}

/// Simulation time every ghost cluster must reach before a communication
/// cycle is complete.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncTime(pub f64);

impl SyncTime {
    /// Start of the simulation.
    pub const ZERO: Self = SyncTime(0.0);

    /// Get the raw value.
    pub fn get(self) -> f64 {
        self.0
    }

    /// Advance by one time step.
    pub fn advance(self, dt: f64) -> Self {
        SyncTime(self.0 + dt)
    }

    /// Whether `time` has reached this target.
    pub fn is_reached_by(self, time: f64) -> bool {
        time >= self.0
    }
}

impl fmt::Display for SyncTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_time_advance() {
        let t = SyncTime::ZERO.advance(0.5).advance(0.25);
        assert_eq!(t, SyncTime(0.75));
        assert!(t > SyncTime::ZERO);
    }

    #[test]
    fn test_sync_time_reached() {
        let target = SyncTime(1.0);
        assert!(!target.is_reached_by(0.999));
        assert!(target.is_reached_by(1.0));
        assert!(target.is_reached_by(2.0));
    }

    #[test]
    fn test_display() {
        assert_eq!(ClusterId(3).to_string(), "Cluster(3)");
        assert_eq!(SyncTime(1.5).to_string(), "t=1.5");
    }
}
