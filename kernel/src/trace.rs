//! Generic step records shared by every visualizer.
//!
//! A trace is an ordered list of [`TraceStep`]s, each owning an immutable
//! snapshot of the visualized structure at that instant. The kernel is
//! generic over the snapshot type; it only fixes the step envelope.

/// Phase tag carried by every step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TracePhase {
    /// Entering a node or trying a choice.
    Enter,
    /// State changed in place (e.g., a choice was undone).
    Update,
    /// A candidate was rejected.
    Prune,
    /// A node or the whole run finished.
    Exit,
}

impl TracePhase {
    /// Stable lowercase name used in serialized traces.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enter => "enter",
            Self::Update => "update",
            Self::Prune => "prune",
            Self::Exit => "exit",
        }
    }

    /// Inverse of [`TracePhase::as_str`].
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "enter" => Some(Self::Enter),
            "update" => Some(Self::Update),
            "prune" => Some(Self::Prune),
            "exit" => Some(Self::Exit),
            _ => None,
        }
    }
}

impl std::fmt::Display for TracePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static worst-case complexity annotation. Descriptive only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceComplexity {
    pub time_worst: &'static str,
    pub space_worst: &'static str,
}

/// One recorded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceStep<S> {
    /// Unique within a trace, strictly increasing in emission order.
    pub id: u64,
    pub title: String,
    pub description: String,
    pub phase: TracePhase,
    /// Value copy of the visualized state; never shared with live state.
    pub snapshot: S,
    pub complexity: TraceComplexity,
    /// Set only on fallback steps that report an input or run failure.
    pub is_error: bool,
}

impl<S> TraceStep<S> {
    /// Convert to a `serde_json::Value`, delegating the snapshot encoding.
    pub fn to_json_value(&self, snapshot: impl FnOnce(&S) -> serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "complexity": {
                "space_worst": self.complexity.space_worst,
                "time_worst": self.complexity.time_worst,
            },
            "description": self.description,
            "id": self.id,
            "is_error": self.is_error,
            "phase": self.phase.as_str(),
            "snapshot": snapshot(&self.snapshot),
            "title": self.title,
        })
    }
}
