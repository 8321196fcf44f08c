//! # kanbanfs API Server Library
//!
//! HTTP surface over the kanbanfs storage core: path resolution, folder and
//! file mutations, and ordered boards and tasks.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Caller identity
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
