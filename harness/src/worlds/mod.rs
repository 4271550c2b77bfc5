//! Built-in problems for the harness runner.

pub mod n_queens;
pub mod permutations;
