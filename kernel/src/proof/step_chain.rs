//! Step hash chain: per-step commitments over a recorded trace.
//!
//! - `chain_0 = sha256(TraceStep || step_0_bytes)`
//! - `chain_i = sha256(TraceStepChain || raw(chain_{i-1}) || step_i_bytes)`
//!
//! `step_i_bytes` is the canonical JSON of step `i`. Two replays of the same
//! search agree on every link; the first differing link localizes the first
//! diverging step without diffing whole traces.

use crate::proof::hash::{canonical_hash, ContentHash, HashDomain};

/// Error during step chain computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepChainError {
    /// The trace has no steps (the chain needs a seed).
    EmptyTrace,
}

impl std::fmt::Display for StepChainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTrace => write!(f, "step chain requires at least one step"),
        }
    }
}

impl std::error::Error for StepChainError {}

/// Result of computing the step hash chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepChainResult {
    /// The final chain digest (last element of `chain`).
    pub digest: ContentHash,
    /// One digest per step, in order.
    pub chain: Vec<ContentHash>,
}

impl StepChainResult {
    /// Index of the first link where `self` and `other` disagree.
    ///
    /// A length mismatch with an identical common prefix reports the length
    /// of the shorter chain. Returns `None` when the chains are identical.
    #[must_use]
    pub fn first_divergence(&self, other: &StepChainResult) -> Option<usize> {
        let common = self.chain.len().min(other.chain.len());
        (0..common)
            .find(|&i| self.chain[i] != other.chain[i])
            .or_else(|| (self.chain.len() != other.chain.len()).then_some(common))
    }
}

/// Compute the step hash chain over canonical step encodings.
///
/// # Errors
///
/// Returns [`StepChainError::EmptyTrace`] if `steps` is empty.
pub fn step_chain<B: AsRef<[u8]>>(steps: &[B]) -> Result<StepChainResult, StepChainError> {
    let Some((first, rest)) = steps.split_first() else {
        return Err(StepChainError::EmptyTrace);
    };

    let mut chain: Vec<ContentHash> = Vec::with_capacity(steps.len());
    let mut prev = canonical_hash(HashDomain::TraceStep, first.as_ref());
    chain.push(prev.clone());

    for step in rest {
        let step = step.as_ref();
        // canonical_hash always yields lowercase hex; an undecodable digest
        // would only make the chain mismatch, never pass spuriously.
        let prev_raw = hex::decode(prev.hex_digest()).unwrap_or_default();

        let mut input = Vec::with_capacity(prev_raw.len() + step.len());
        input.extend_from_slice(&prev_raw);
        input.extend_from_slice(step);

        prev = canonical_hash(HashDomain::TraceStepChain, &input);
        chain.push(prev.clone());
    }

    Ok(StepChainResult {
        digest: prev,
        chain,
    })
}
