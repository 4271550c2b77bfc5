//! Stepviz Kernel: the deterministic trace substrate of stepviz.
//!
//! # API Surface
//!
//! - [`trace`] -- the generic step record (`TraceStep<S>`) every visualizer
//!   produces, plus its phase and complexity annotations
//! - [`proof::canon::canonical_json_bytes`] -- the single JSON canonicalizer
//! - [`proof::hash::canonical_hash`] -- domain-separated SHA-256 content hashing
//! - [`proof::step_chain::step_chain`] -- per-step hash chain over a trace
//!
//! # Module Dependency Direction
//!
//! `trace` ← `proof`
//!
//! One-way only. `trace` knows nothing about hashing; `proof` hashes bytes
//! and never interprets snapshot contents.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod proof;
pub mod trace;
