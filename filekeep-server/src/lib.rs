//! # filekeep-server
//!
//! Daemon side of filekeep: the polling loop that snapshots the working
//! directory on an interval, and an HTTP API exposing the engine to a UI.

pub mod api;
pub mod poller;
pub mod server;

pub use poller::{CycleOutcome, PollState, Poller, SharedPollState};
pub use server::FilekeepServer;
