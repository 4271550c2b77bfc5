//! Stepviz Search: instrumented depth-first backtracking with replayable traces.
//!
//! This crate provides the search layer for stepviz. It depends only on
//! `stepviz_kernel`; it does NOT depend on `stepviz_harness`.
//!
//! # Crate dependency graph
//!
//! ```text
//! stepviz_kernel  ←  stepviz_search  ←  stepviz_harness
//! (steps, hashing)    (engine, dedupe)    (adapters, bundles, CLI)
//! ```
//!
//! # Key types
//!
//! - [`BacktrackWorld`] -- trait for candidate sources and predicates
//! - [`SearchConfig`] -- closure-backed world for ad-hoc problems
//! - [`RuntimeOptions`] -- stop policy, detail mode, step budget
//! - [`Snapshot`] -- immutable value view of the search state
//! - [`RunResult`] -- ordered trace steps plus the final snapshot
//! - [`symmetry::dedupe`] -- dihedral deduplication of board placements

#![forbid(unsafe_code)]

pub mod config;
pub mod contract;
pub mod emitter;
pub mod error;
pub mod policy;
pub mod search;
pub mod snapshot;
pub mod state;
pub mod symmetry;

pub use config::SearchConfig;
pub use contract::{BacktrackWorld, CallableFault};
pub use error::SearchError;
pub use policy::{DetailMode, RuntimeOptions};
pub use search::{run, RunResult};
pub use snapshot::{Snapshot, StopReason};
