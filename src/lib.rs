//! # filekeep
//!
//! Umbrella crate re-exporting the filekeep workspace members.

pub use filekeep_core as core;
pub use filekeep_sdk as sdk;
pub use filekeep_server as server;
