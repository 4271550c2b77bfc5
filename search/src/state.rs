//! Mutable per-run search state.

use crate::policy::DetailMode;
use crate::snapshot::{Snapshot, StopReason};

/// State owned exclusively by one `run` invocation.
///
/// Counters only grow. The halt flag is set at most once and never cleared.
#[derive(Debug)]
pub struct SearchState {
    pub partial: Vec<i64>,
    pub solutions: Vec<Vec<i64>>,
    pub steps_emitted: u64,
    pub visited_nodes: u64,
    pub pruned: u64,
    halted: bool,
    stopped_by: StopReason,
    next_step_id: u64,
}

impl SearchState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            partial: Vec::new(),
            solutions: Vec::new(),
            steps_emitted: 0,
            visited_nodes: 0,
            pruned: 0,
            halted: false,
            stopped_by: StopReason::None,
            next_step_id: 1,
        }
    }

    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    #[must_use]
    pub fn stopped_by(&self) -> StopReason {
        self.stopped_by
    }

    /// Halt with `reason`. A second call is ignored.
    pub fn halt(&mut self, reason: StopReason) {
        if !self.halted {
            self.halted = true;
            self.stopped_by = reason;
        }
    }

    /// Halt after recording a solution under `stop_after_first`.
    ///
    /// The reason becomes `FirstSolution` even when the budget ran out while
    /// announcing that same solution: the solution is already stored, so the
    /// run did stop because of it.
    pub fn halt_after_solution(&mut self) {
        self.halted = true;
        self.stopped_by = StopReason::FirstSolution;
    }

    /// Allocate the next step id (1-based, strictly increasing).
    pub fn next_step_id(&mut self) -> u64 {
        let id = self.next_step_id;
        self.next_step_id += 1;
        id
    }

    /// Value copy of the current state.
    #[must_use]
    pub fn snapshot(
        &self,
        depth: usize,
        current_choice: Option<i64>,
        candidates: &[i64],
        detail_mode: DetailMode,
        message: Option<String>,
    ) -> Snapshot {
        Snapshot {
            depth,
            partial: self.partial.clone(),
            current_choice,
            candidates: candidates.to_vec(),
            detail_mode: Some(detail_mode),
            solutions: self.solutions.clone(),
            steps_emitted: self.steps_emitted,
            visited_nodes: self.visited_nodes,
            pruned: self.pruned,
            stopped_by: self.stopped_by,
            message,
            annotations: std::collections::BTreeMap::new(),
        }
    }
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new()
    }
}
