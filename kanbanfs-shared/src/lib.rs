//! # kanbanfs Shared Library
//!
//! Storage core for kanbanfs: a per-user virtual filesystem of folders and
//! project files, where projects hold ordered boards and boards hold ordered
//! tasks.
//!
//! ## Module Organization
//!
//! - `db`: connection pool and migrations
//! - `models`: row types for nodes, boards and tasks
//! - `paths`: path ↔ node resolution and node create/rename/move/delete
//! - `ordering`: dense index maintenance for boards and tasks
//! - `error`: the `CoreError` type every operation returns

pub mod db;
pub mod error;
pub mod models;
pub mod ordering;
pub mod paths;

pub use error::{CoreError, CoreResult};

/// Current version of the kanbanfs shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
