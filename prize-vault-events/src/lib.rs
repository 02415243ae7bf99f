//! Prize vault event sync library.
//!
//! Loads a deployment from `config.toml`, refreshes per-user event caches
//! against a list of RPC endpoints with fallback, and stores each cache as
//! a JSON snapshot.

pub mod config;
pub mod snapshot;
pub mod sync;
