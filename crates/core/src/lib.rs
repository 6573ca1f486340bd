//! Core abstractions for ghost cluster communication.
//!
//! A ghost cluster is a per-region state machine that exchanges boundary
//! ("ghost") data with neighboring partitions. The scheduler never looks
//! inside one; it only drives the four operations of [`GhostCluster`].

mod error;
mod traits;

pub use error::ClusterError;
pub use traits::GhostCluster;

pub use ghostcomm_types::{ClusterId, SyncTime};
