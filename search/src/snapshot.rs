//! Immutable search-state snapshots.

use std::collections::BTreeMap;

use crate::policy::DetailMode;

/// Why a run stopped early. Set at most once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// Ran to completion (or has not stopped yet).
    None,
    /// `stop_after_first` fired.
    FirstSolution,
    /// The step budget ran out.
    MaxSteps,
}

impl StopReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::FirstSolution => "first_solution",
            Self::MaxSteps => "max_steps",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Self::None),
            "first_solution" => Some(Self::FirstSolution),
            "max_steps" => Some(Self::MaxSteps),
            _ => None,
        }
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value copy of the search state at one instant.
///
/// Every field is owned. Later search activity can never reach back into a
/// recorded snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub depth: usize,
    pub partial: Vec<i64>,
    /// Candidate under consideration, if the step concerns one.
    pub current_choice: Option<i64>,
    /// Candidate list offered at `depth`.
    pub candidates: Vec<i64>,
    /// `None` only on fallback snapshots built outside a run.
    pub detail_mode: Option<DetailMode>,
    pub solutions: Vec<Vec<i64>>,
    pub steps_emitted: u64,
    pub visited_nodes: u64,
    pub pruned: u64,
    pub stopped_by: StopReason,
    pub message: Option<String>,
    /// Domain fields attached by a world's snapshot enhancer
    /// (e.g. `board_size`, `queen_cols`).
    pub annotations: BTreeMap<String, serde_json::Value>,
}

impl Snapshot {
    /// A zeroed snapshot carrying only a message. Used by fallback traces.
    #[must_use]
    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            depth: 0,
            partial: Vec::new(),
            current_choice: None,
            candidates: Vec::new(),
            detail_mode: None,
            solutions: Vec::new(),
            steps_emitted: 0,
            visited_nodes: 0,
            pruned: 0,
            stopped_by: StopReason::None,
            message: Some(message.into()),
            annotations: BTreeMap::new(),
        }
    }

    /// Builder-style annotation for snapshot enhancers.
    #[must_use]
    pub fn annotate(mut self, key: &str, value: serde_json::Value) -> Self {
        self.annotations.insert(key.to_string(), value);
        self
    }

    #[must_use]
    pub fn annotation(&self, key: &str) -> Option<&serde_json::Value> {
        self.annotations.get(key)
    }

    /// Compact status projection for presentation layers.
    #[must_use]
    pub fn summary(&self) -> SnapshotSummary {
        SnapshotSummary {
            depth: self.depth,
            solutions: self.solutions.len(),
            visited: self.visited_nodes,
            pruned: self.pruned,
            stopped_by: self.stopped_by,
        }
    }

    /// Convert to a `serde_json::Value` for canonical serialization.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        let annotations: serde_json::Map<String, serde_json::Value> = self
            .annotations
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        serde_json::json!({
            "annotations": annotations,
            "candidates": self.candidates,
            "current_choice": self.current_choice,
            "depth": self.depth,
            "detail_mode": self.detail_mode.map(DetailMode::as_str),
            "message": self.message,
            "partial": self.partial,
            "pruned": self.pruned,
            "solutions": self.solutions,
            "steps_emitted": self.steps_emitted,
            "stopped_by": self.stopped_by.as_str(),
            "visited_nodes": self.visited_nodes,
        })
    }
}

/// The five numbers a status bar shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotSummary {
    pub depth: usize,
    pub solutions: usize,
    pub visited: u64,
    pub pruned: u64,
    pub stopped_by: StopReason,
}
