//! Core types shared by the ghost cluster communication crates.
//!
//! Kept free of behavior so that cluster implementations can depend on it
//! without pulling in the scheduler.

mod identifiers;

pub use identifiers::{ClusterId, SyncTime};
