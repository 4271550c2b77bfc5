//! Problem adapter contract: how a named problem is configured and run.
//!
//! An adapter owns input parsing and validation, builds the world the engine
//! searches, and post-processes the result (e.g. symmetry collapse). Adapters
//! may NOT implement hashing or bundle assembly; those are runner concerns.

use stepviz_kernel::trace::{TracePhase, TraceStep};
use stepviz_search::emitter::COMPLEXITY;
use stepviz_search::snapshot::SnapshotSummary;
use stepviz_search::{RunResult, RuntimeOptions, SearchError, Snapshot};

/// Input text failed parsing or validation. Raised before the engine runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// The text is not JSON.
    NotJson { detail: String },
    /// The JSON is not an object.
    NotAnObject,
    /// A field is missing or out of range.
    InvalidField { field: &'static str, detail: String },
}

impl std::fmt::Display for InputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotJson { detail } => write!(f, "input is not valid JSON: {detail}"),
            Self::NotAnObject => f.write_str("input must be a JSON object"),
            Self::InvalidField { field, detail } => write!(f, "{field}: {detail}"),
        }
    }
}

impl std::error::Error for InputError {}

/// An adapter run failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    /// The input was rejected.
    Input(InputError),
    /// The engine refused or aborted the run.
    Search(SearchError),
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Input(e) => write!(f, "input error: {e}"),
            Self::Search(e) => write!(f, "search error: {e}"),
        }
    }
}

impl std::error::Error for RunError {}

impl From<InputError> for RunError {
    fn from(e: InputError) -> Self {
        Self::Input(e)
    }
}

impl From<SearchError> for RunError {
    fn from(e: SearchError) -> Self {
        Self::Search(e)
    }
}

/// The contract a named problem implements to be run by the harness.
pub trait ProblemAdapter {
    type Input: Clone + std::fmt::Debug;

    /// Stable identifier (e.g. `"backtracking-n-queens"`).
    fn id(&self) -> &'static str;

    fn title(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn default_input(&self) -> Self::Input;

    /// Parse and validate JSON input text.
    ///
    /// # Errors
    ///
    /// Returns [`InputError`] if the text is not an object or a field is
    /// invalid.
    fn parse_input_text(&self, text: &str) -> Result<Self::Input, InputError>;

    /// JSON echo of `input`; `parse_input_text` accepts its rendering.
    fn input_json(&self, input: &Self::Input) -> serde_json::Value;

    /// Runtime options carried by `input`.
    fn runtime_options(&self, input: &Self::Input) -> RuntimeOptions;

    /// Run the engine for `input`.
    ///
    /// # Errors
    ///
    /// Returns [`RunError`] if the engine rejects or aborts the run.
    fn run(&self, input: &Self::Input) -> Result<RunResult, RunError>;

    /// Pretty JSON text for editing.
    fn serialize_input(&self, input: &Self::Input) -> String {
        let value = self.input_json(input);
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
    }

    /// Compact status projection of a snapshot.
    fn summary(&self, snapshot: &Snapshot) -> SnapshotSummary {
        snapshot.summary()
    }

    /// Run, reporting failure as a one-step error trace instead of an `Err`.
    fn run_or_error_trace(&self, input: &Self::Input) -> RunResult {
        self.run(input).unwrap_or_else(|e| {
            log::warn!("{}: {e}", self.id());
            error_trace(self.id(), &e.to_string())
        })
    }

    /// Parse then run; parse failures also become an error trace.
    fn run_text(&self, text: &str) -> RunResult {
        match self.parse_input_text(text) {
            Ok(input) => self.run_or_error_trace(&input),
            Err(e) => {
                log::warn!("{}: {e}", self.id());
                error_trace(self.id(), &e.to_string())
            }
        }
    }
}

/// One-step fallback trace shown in place of a failed run.
///
/// The single step is phase `Prune`, flagged `is_error`, and carries an
/// empty snapshot whose message is `message`.
#[must_use]
pub fn error_trace(adapter_id: &str, message: &str) -> RunResult {
    let snapshot = Snapshot::empty(message);
    let step = TraceStep {
        id: 1,
        title: "Input error".into(),
        description: format!("[{adapter_id}] {message}"),
        phase: TracePhase::Prune,
        snapshot: snapshot.clone(),
        complexity: COMPLEXITY,
        is_error: true,
    };
    RunResult {
        steps: vec![step],
        final_snapshot: snapshot,
    }
}
