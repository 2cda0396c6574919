//! # filekeep-core
//!
//! Core library for filekeep - automatic snapshots of a working directory,
//! stored as git commits, with per-file history, preview and restore.
//!
//! A [`Repository`] binds one working directory to a [`Backend`]. Change
//! detection, the commit engine, version history, the version accessor and the
//! ignore list are all methods on it.

pub mod access;
pub mod backend;
mod commit;
pub mod config;
pub mod error;
mod history;
pub mod ignore;
pub mod models;
pub mod repository;
pub mod scanner;

pub use access::Target;
pub use backend::{Backend, BackendError, GitCli, ScriptedBackend};
pub use config::{ConfigSource, EngineConfig, MemoryConfig, TomlConfig};
pub use error::{Error, Result};
pub use ignore::normalize_keyword;
pub use models::{ChangeRecord, ChangeStatus, StoreReport, Version};
pub use repository::{Repository, SharedRepository};
