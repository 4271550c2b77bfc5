//! Runtime options and the step emission policy.

use crate::error::SearchError;

/// Step density.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetailMode {
    /// Every search event becomes a step.
    Detailed,
    /// Only node entries and solutions become steps.
    Summary,
}

impl DetailMode {
    /// Whether events of `kind` produce a step in this mode.
    #[must_use]
    pub const fn admits(self, kind: EventKind) -> bool {
        match self {
            Self::Detailed => true,
            Self::Summary => matches!(kind, EventKind::Solution | EventKind::Enter),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Detailed => "detailed",
            Self::Summary => "summary",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "detailed" => Some(Self::Detailed),
            "summary" => Some(Self::Summary),
            _ => None,
        }
    }
}

/// Classification of search events for the emission policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A candidate is about to be tested.
    Choose,
    /// A candidate failed the validity predicate.
    Prune,
    /// The goal predicate held.
    Solution,
    /// A choice was undone after its subtree returned.
    Backtrack,
    /// A DFS node was entered.
    Enter,
}

/// Per-run options. Immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeOptions {
    /// Halt as soon as the first solution is recorded.
    pub stop_after_first: bool,
    pub detail_mode: DetailMode,
    /// Hard cap on emitted steps (the trailing completion step excluded).
    pub max_steps: u64,
}

impl RuntimeOptions {
    /// Pre-flight validation.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidOptions`] if `max_steps` is zero.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_steps == 0 {
            return Err(SearchError::InvalidOptions {
                detail: "max_steps must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Options echo for run reports and bundles.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "detail_mode": self.detail_mode.as_str(),
            "max_steps": self.max_steps,
            "stop_after_first": self.stop_after_first,
        })
    }
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            stop_after_first: true,
            detail_mode: DetailMode::Summary,
            max_steps: 200,
        }
    }
}
