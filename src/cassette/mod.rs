//! Cassettes: YAML recordings of port interactions.
//!
//! A recorded run can be replayed later to reproduce a resolution session
//! without touching the network or the disk.

pub mod config;
pub mod format;
pub mod recorder;
pub mod replayer;
pub mod session;
