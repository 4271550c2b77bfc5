//! In-process determinism.
//!
//! Proves:
//! 1. Repeated runs of every canonical scenario give identical canonical
//!    bytes and step chains
//! 2. Bundles built from identical runs share a digest
//! 3. A budget change shows up exactly where the shorter trace ends

use lock_tests::canonical_runs::{canonical_run, options, CANONICAL_RUN_NAMES};
use stepviz_harness::contract::ProblemAdapter;
use stepviz_harness::runner::{run_adapter, run_step_chain};
use stepviz_harness::worlds::n_queens::{NQueensAdapter, NQueensInput};
use stepviz_harness::worlds::permutations::permutation_config;
use stepviz_search::{run, DetailMode};

const N: usize = 10;

#[test]
fn canonical_runs_are_stable() {
    for name in CANONICAL_RUN_NAMES {
        let first = canonical_run(name);
        let bytes = first.to_canonical_json_bytes().unwrap();
        let chain = run_step_chain(&first).unwrap();
        for i in 1..N {
            let again = canonical_run(name);
            assert_eq!(
                bytes,
                again.to_canonical_json_bytes().unwrap(),
                "{name}: canonical bytes differ on run {i}"
            );
            assert_eq!(chain, run_step_chain(&again).unwrap(), "{name}: chain differs on run {i}");
        }
    }
}

#[test]
fn bundle_digest_is_stable() {
    let adapter = NQueensAdapter;
    let input = NQueensInput {
        n: 6,
        stop_after_first: false,
        dedupe_symmetry: true,
        ..NQueensInput::default()
    };
    let (_, first) = run_adapter(&adapter, &input).unwrap();
    for _ in 1..N {
        let (_, again) = run_adapter(&adapter, &input).unwrap();
        assert_eq!(first.digest, again.digest);
        assert_eq!(first.manifest, again.manifest);
    }
}

#[test]
fn budget_change_diverges_at_cutoff() {
    let config = permutation_config(3, vec![1, 2, 3]);
    let short = run(&config, &options(false, DetailMode::Detailed, 10)).unwrap();
    let long = run(&config, &options(false, DetailMode::Detailed, 12)).unwrap();
    assert_eq!(short.steps.len(), 10);
    assert_eq!(long.steps.len(), 12);

    let a = run_step_chain(&short).unwrap();
    let b = run_step_chain(&long).unwrap();
    assert_eq!(a.chain[..], b.chain[..10]);
    assert_eq!(a.first_divergence(&b), Some(10));
    assert_eq!(b.first_divergence(&a), Some(10));
}

#[test]
fn default_inputs_round_trip_through_text() {
    let adapter = NQueensAdapter;
    let input = adapter.default_input();
    let text = adapter.serialize_input(&input);
    let parsed = adapter.parse_input_text(&text).unwrap();
    let (_, a) = run_adapter(&adapter, &input).unwrap();
    let (_, b) = run_adapter(&adapter, &parsed).unwrap();
    assert_eq!(a.digest, b.digest);
}
