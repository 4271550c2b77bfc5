//! Proof module: canonical serialization, hashing, step chains.
//!
//! Depends on nothing else in the kernel. `trace` does not depend on `proof`.

pub mod canon;
pub mod hash;
pub mod step_chain;
