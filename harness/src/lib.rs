//! Stepviz Harness: problem adapters, trace bundles, and the `stepviz` CLI.
//!
//! The harness runs a named problem through the search engine and packages
//! the result as a self-contained, verifiable bundle.
//!
//! Adapters own input parsing and post-processing only. Hashing and canonical
//! encoding are delegated to the kernel; the DFS itself lives in the search
//! crate.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod bundle;
pub mod bundle_dir;
pub mod contract;
pub mod input;
pub mod runner;
pub mod worlds;
