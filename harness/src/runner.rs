//! Harness runner: turns a finished run into a trace bundle.
//!
//! # Pipeline
//!
//! ```text
//! adapter.run(input) -> RunResult
//!   -> canonical step bytes -> step_chain()
//!   -> steps.json, final_snapshot.json, options.json, input.json
//!   -> run_report.json (digests + counters) -> build_bundle()
//! ```
//!
//! The runner never interprets snapshots beyond counters; digests come from
//! the kernel.

use stepviz_kernel::proof::canon::canonical_json_bytes;
use stepviz_kernel::proof::hash::{canonical_hash, HashDomain};
use stepviz_kernel::proof::step_chain::{step_chain, StepChainResult};
use stepviz_search::{RunResult, RuntimeOptions, Snapshot};

use crate::bundle::{
    build_bundle, BundleBuildError, TraceBundle, FINAL_SNAPSHOT_FILENAME, INPUT_FILENAME,
    OPTIONS_FILENAME, REPORT_FILENAME, STEPS_FILENAME, SUMMARY_FILENAME,
};
use crate::contract::{ProblemAdapter, RunError};

pub const RUN_REPORT_SCHEMA: &str = "stepviz_run_report.v1";

/// Error producing a bundle from a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerError {
    Run(RunError),
    CanonFailed { detail: String },
    /// The run produced no steps to chain.
    HashFailed { detail: String },
    BundleFailed(BundleBuildError),
}

impl std::fmt::Display for RunnerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Run(e) => write!(f, "{e}"),
            Self::CanonFailed { detail } => write!(f, "canonical JSON error: {detail}"),
            Self::HashFailed { detail } => write!(f, "step chain error: {detail}"),
            Self::BundleFailed(e) => write!(f, "bundle error: {e}"),
        }
    }
}

impl std::error::Error for RunnerError {}

impl From<RunError> for RunnerError {
    fn from(e: RunError) -> Self {
        Self::Run(e)
    }
}

/// Step chain over a run's canonical step bytes.
///
/// # Errors
///
/// Returns [`RunnerError`] if a step is not canonicalizable or the run has
/// no steps.
pub fn run_step_chain(result: &RunResult) -> Result<StepChainResult, RunnerError> {
    let step_bytes = result.canonical_step_bytes().map_err(canon_failed)?;
    step_chain(&step_bytes).map_err(|e| RunnerError::HashFailed {
        detail: e.to_string(),
    })
}

/// Run `adapter` on `input` and package the result.
///
/// # Errors
///
/// Returns [`RunnerError::Run`] if the run fails; other variants if
/// packaging fails.
pub fn run_adapter<A: ProblemAdapter>(
    adapter: &A,
    input: &A::Input,
) -> Result<(RunResult, TraceBundle), RunnerError> {
    let result = adapter.run(input)?;
    let bundle = build_trace_bundle(
        adapter.id(),
        &adapter.input_json(input),
        &adapter.runtime_options(input),
        &result,
    )?;
    log::info!(
        "{}: {} steps, {} solution(s), stopped_by={}, bundle {}",
        adapter.id(),
        result.steps.len(),
        result.solutions().len(),
        result.stopped_by(),
        bundle.digest
    );
    Ok((result, bundle))
}

/// Package a finished run as a [`TraceBundle`].
///
/// # Errors
///
/// Returns [`RunnerError`] on canonicalization, hashing, or bundle failure.
pub fn build_trace_bundle(
    adapter_id: &str,
    input: &serde_json::Value,
    options: &RuntimeOptions,
    result: &RunResult,
) -> Result<TraceBundle, RunnerError> {
    let steps_value = serde_json::Value::Array(
        result
            .steps
            .iter()
            .map(|s| s.to_json_value(Snapshot::to_json_value))
            .collect(),
    );
    let steps_bytes = canonical_json_bytes(&steps_value).map_err(canon_failed)?;
    let final_bytes =
        canonical_json_bytes(&result.final_snapshot.to_json_value()).map_err(canon_failed)?;
    let options_bytes = canonical_json_bytes(&options.to_json_value()).map_err(canon_failed)?;
    let input_bytes = canonical_json_bytes(input).map_err(canon_failed)?;

    let chain = run_step_chain(result)?;
    let snapshot = &result.final_snapshot;
    let report = serde_json::json!({
        "adapter_id": adapter_id,
        "final_snapshot_digest": canonical_hash(HashDomain::Snapshot, &final_bytes).as_str(),
        "options_digest": canonical_hash(HashDomain::RuntimeOptions, &options_bytes).as_str(),
        "pruned": snapshot.pruned,
        "schema_version": RUN_REPORT_SCHEMA,
        "solutions": snapshot.solutions.len(),
        "step_chain_digest": chain.digest.as_str(),
        "step_count": result.steps.len(),
        "steps_emitted": snapshot.steps_emitted,
        "stopped_by": snapshot.stopped_by.as_str(),
        "visited_nodes": snapshot.visited_nodes,
    });
    let report_bytes = canonical_json_bytes(&report).map_err(canon_failed)?;

    let summary = snapshot.summary();
    let summary_text = format!(
        "{adapter_id}\ndepth={} solutions={} visited={} pruned={} stopped_by={}\n{}\n",
        summary.depth,
        summary.solutions,
        summary.visited,
        summary.pruned,
        summary.stopped_by,
        snapshot.message.as_deref().unwrap_or_default(),
    );

    build_bundle(vec![
        (STEPS_FILENAME.into(), steps_bytes, true),
        (FINAL_SNAPSHOT_FILENAME.into(), final_bytes, true),
        (OPTIONS_FILENAME.into(), options_bytes, true),
        (INPUT_FILENAME.into(), input_bytes, true),
        (REPORT_FILENAME.into(), report_bytes, true),
        (SUMMARY_FILENAME.into(), summary_text.into_bytes(), false),
    ])
    .map_err(RunnerError::BundleFailed)
}

#[allow(clippy::needless_pass_by_value)]
fn canon_failed(e: stepviz_kernel::proof::canon::CanonError) -> RunnerError {
    RunnerError::CanonFailed {
        detail: e.to_string(),
    }
}
