//! Communication overlap scheduler.
//!
//! Drives a collection of ghost clusters so that the data exchange needed for
//! the next time step proceeds while the solver computes. Two strategies
//! implement the same [`CommScheduler`] contract:
//!
//! - [`CooperativeScheduler`]: the caller drives progress by calling
//!   `progression()` between chunks of computation. No extra threads.
//! - [`BackgroundScheduler`]: a dedicated worker polls the clusters until they
//!   are all synced or a reset is requested. `progression()` never drives
//!   clusters.
//!
//! # Cycle
//!
//! ```text
//!   reset(t) ──► progression() / check_if_finished() ──► ... ──► finished
//!      ▲                                                             │
//!      └─────────────────────────── next step ◄─────────────────────┘
//! ```
//!
//! # Background worker lifecycle
//!
//! ```text
//! ┌──────────┐  reset(t)   ┌──────────┐  all synced  ┌──────────┐
//! │ STOPPED  │────────────►│ RUNNING  │─────────────►│ FINISHED │
//! └──────────┘             └────┬─────┘              └────┬─────┘
//!      ▲                        │ reset requested         │
//!      │                        ▼                         │
//!      │   joined          ┌──────────┐                   │
//!      └───────────────────│ STOPPING │◄──────────────────┘
//!                          └──────────┘   next reset(t)
//! ```
//!
//! The cluster collection is moved onto the worker thread and handed back
//! through its join handle, so the caller cannot touch a cluster until the
//! worker has terminated.

mod background;
mod cluster_set;
mod config;
mod cooperative;
mod error;
mod pinning;
mod scheduler;

pub use background::BackgroundScheduler;
pub use cluster_set::{ClusterSet, GhostClusters};
pub use config::{CommConfig, CommStrategy, PinningMode};
pub use cooperative::CooperativeScheduler;
pub use error::{CommError, PinError};
pub use pinning::{CpuPinner, FreeCpuPinner, NoPinning};
pub use scheduler::{build_scheduler, CommScheduler};
