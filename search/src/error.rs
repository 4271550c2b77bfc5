//! Typed search errors.
//!
//! `SearchError` covers pre-flight validation and faulty callables. Budget
//! exhaustion and first-solution stops are normal terminations expressed via
//! [`crate::snapshot::StopReason`] and always produce a full `RunResult`.

/// Which predicate misbehaved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateKind {
    Validity,
    Goal,
}

impl std::fmt::Display for PredicateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validity => f.write_str("validity predicate"),
            Self::Goal => f.write_str("goal predicate"),
        }
    }
}

/// Typed failure for a backtracking run.
///
/// Pre-flight variants are returned before any step is recorded. Malformed
/// callable variants abort the run in progress; the partial trace is
/// discarded and never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// Runtime options rejected before the run started.
    InvalidOptions { detail: String },
    /// World configuration rejected before the run started.
    InvalidConfig { detail: String },
    /// The candidate source failed or panicked.
    MalformedCandidates { depth: usize, detail: String },
    /// A predicate failed or panicked.
    MalformedPredicate {
        predicate: PredicateKind,
        depth: usize,
        detail: String,
    },
    /// The snapshot enhancer panicked.
    MalformedEnhancer { detail: String },
}

impl std::fmt::Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidOptions { detail } => write!(f, "invalid runtime options: {detail}"),
            Self::InvalidConfig { detail } => write!(f, "invalid search config: {detail}"),
            Self::MalformedCandidates { depth, detail } => {
                write!(f, "candidate source failed at depth {depth}: {detail}")
            }
            Self::MalformedPredicate {
                predicate,
                depth,
                detail,
            } => write!(f, "{predicate} failed at depth {depth}: {detail}"),
            Self::MalformedEnhancer { detail } => write!(f, "snapshot enhancer failed: {detail}"),
        }
    }
}

impl std::error::Error for SearchError {}

/// Render a caught panic payload as text.
pub(crate) fn panic_detail(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}
