//! Canonical runs shared by the in-process tests and the `trace_fixture`
//! binary, so both sides of the cross-process comparison build the exact
//! same searches.

use stepviz_harness::runner::run_step_chain;
use stepviz_harness::worlds::n_queens::NQueensWorld;
use stepviz_harness::worlds::permutations::permutation_config;
use stepviz_search::{run, DetailMode, RunResult, RuntimeOptions, SearchConfig};

/// Names accepted by [`canonical_run`], in the order the fixture prints them.
pub const CANONICAL_RUN_NAMES: &[&str] = &[
    "distinct_first",
    "distinct_budget",
    "generator_pairs",
    "queens4_first",
    "queens4_all",
];

#[must_use]
pub fn options(stop_after_first: bool, detail_mode: DetailMode, max_steps: u64) -> RuntimeOptions {
    RuntimeOptions {
        stop_after_first,
        detail_mode,
        max_steps,
    }
}

/// Depth 0 offers `[1, 2]`, deeper levels `[3]`; everything is valid.
#[must_use]
pub fn generator_pairs_config() -> SearchConfig {
    SearchConfig::new(2, vec![1, 2], |_, _, _| true)
        .with_generator(|_, depth, defaults| if depth == 0 { defaults.to_vec() } else { vec![3] })
        .with_world_id("generator_pairs")
}

/// Run one canonical scenario by name.
///
/// # Panics
///
/// Panics on an unknown name or a failed run; fixtures are test-only.
#[must_use]
pub fn canonical_run(name: &str) -> RunResult {
    let distinct = || permutation_config(3, vec![1, 2, 3]);
    let outcome = match name {
        "distinct_first" => run(&distinct(), &options(true, DetailMode::Summary, 200)),
        "distinct_budget" => run(&distinct(), &options(false, DetailMode::Detailed, 10)),
        "generator_pairs" => run(
            &generator_pairs_config(),
            &options(false, DetailMode::Detailed, 200),
        ),
        "queens4_first" => run(&NQueensWorld::new(4), &options(true, DetailMode::Summary, 400)),
        "queens4_all" => run(
            &NQueensWorld::new(4),
            &options(false, DetailMode::Detailed, 10_000),
        ),
        other => panic!("unknown canonical run: {other}"),
    };
    outcome.unwrap_or_else(|e| panic!("canonical run {name} failed: {e}"))
}

/// `key=value` lines describing a run: canonical byte length, step chain
/// head and tail, and the final counters.
///
/// # Panics
///
/// Panics if the run cannot be canonicalized.
#[must_use]
pub fn fingerprint_lines(name: &str, result: &RunResult) -> Vec<String> {
    let bytes = result
        .to_canonical_json_bytes()
        .unwrap_or_else(|e| panic!("{name}: {e}"));
    let chain = run_step_chain(result).unwrap_or_else(|e| panic!("{name}: {e}"));
    let snapshot = &result.final_snapshot;
    vec![
        format!("{name}.canonical_len={}", bytes.len()),
        format!("{name}.step_chain_0={}", chain.chain[0]),
        format!("{name}.step_chain_final={}", chain.digest),
        format!("{name}.steps={}", result.steps.len()),
        format!("{name}.solutions={:?}", snapshot.solutions),
        format!("{name}.stopped_by={}", snapshot.stopped_by),
        format!(
            "{name}.counters={},{},{}",
            snapshot.steps_emitted, snapshot.visited_nodes, snapshot.pruned
        ),
    ]
}
