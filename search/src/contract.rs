//! Backtracking world contract trait.

use crate::snapshot::Snapshot;

/// A callable refused to produce a well-formed answer.
///
/// The adapter layer is expected to reject bad inputs before a run starts;
/// a `CallableFault` reaching the engine aborts the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallableFault {
    pub detail: String,
}

impl CallableFault {
    #[must_use]
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for CallableFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.detail)
    }
}

impl std::error::Error for CallableFault {}

/// Trait for problems the backtracking engine can search.
///
/// # Contract
///
/// - Every method must be a pure function of its arguments. Hidden state or
///   nondeterministic iteration order breaks trace reproducibility.
/// - `partial.len() == depth` on every call the engine makes.
/// - `candidates` order is the exploration order; the engine never sorts.
/// - Panics are caught and reported as malformed callables, not propagated.
pub trait BacktrackWorld {
    /// Stable identifier echoed into run reports.
    fn world_id(&self) -> &str;

    /// Maximum search depth. Must be positive.
    fn length(&self) -> usize;

    /// Candidate values to try at `depth`, in order.
    ///
    /// # Errors
    ///
    /// Returns [`CallableFault`] if no well-formed candidate list exists.
    fn candidates(&self, partial: &[i64], depth: usize) -> Result<Vec<i64>, CallableFault>;

    /// Whether `choice` may extend `partial` at `depth`.
    ///
    /// # Errors
    ///
    /// Returns [`CallableFault`] if the predicate cannot be evaluated.
    fn is_valid(&self, partial: &[i64], depth: usize, choice: i64) -> Result<bool, CallableFault>;

    /// Whether `partial` is a solution. Defaults to `depth == length()`.
    ///
    /// May hold below `length()`; the engine records such shallow solutions
    /// as-is.
    ///
    /// # Errors
    ///
    /// Returns [`CallableFault`] if the predicate cannot be evaluated.
    fn is_goal(&self, partial: &[i64], depth: usize) -> Result<bool, CallableFault> {
        let _ = partial;
        Ok(depth == self.length())
    }

    /// Attach domain-specific fields to a snapshot before it is recorded.
    fn enhance_snapshot(&self, snapshot: Snapshot) -> Snapshot {
        snapshot
    }
}
