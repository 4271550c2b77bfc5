//! Property tests over randomly shaped searches.
//!
//! Proves, for arbitrary length, candidate sets, validity rules and options:
//! 1. The step budget bounds `steps_emitted`
//! 2. `stop_after_first` keeps at most one solution and reports it
//! 3. Every step's partial has exactly `depth` entries
//! 4. Step ids strictly increase from 1
//! 5. The search always unwinds to an empty partial
//! 6. Symmetry dedupe is idempotent and order-preserving

use proptest::prelude::*;
use stepviz_harness::worlds::n_queens::NQueensWorld;
use stepviz_search::symmetry::dedupe;
use stepviz_search::{run, DetailMode, RunResult, RuntimeOptions, SearchConfig, StopReason};

fn options_strategy() -> impl Strategy<Value = RuntimeOptions> {
    (any::<bool>(), any::<bool>(), 1u64..300).prop_map(|(stop_after_first, detailed, max_steps)| {
        RuntimeOptions {
            stop_after_first,
            detail_mode: if detailed {
                DetailMode::Detailed
            } else {
                DetailMode::Summary
            },
            max_steps,
        }
    })
}

/// Length, candidates and a modulus: `choice + depth` divisible by the
/// modulus is pruned (modulus 0 keeps everything).
fn config_strategy() -> impl Strategy<Value = (usize, Vec<i64>, i64)> {
    (
        1usize..=4,
        prop::collection::vec(-3i64..6, 1..5),
        0i64..4,
    )
}

fn build_config(length: usize, candidates: Vec<i64>, modulus: i64) -> SearchConfig {
    SearchConfig::new(length, candidates, move |_, depth, choice| {
        let depth = i64::try_from(depth).unwrap_or(i64::MAX);
        modulus == 0 || (choice + depth).rem_euclid(modulus) != 0
    })
}

fn check_trace(result: &RunResult, options: &RuntimeOptions) -> Result<(), TestCaseError> {
    let last = &result.final_snapshot;
    prop_assert!(last.steps_emitted <= options.max_steps);
    prop_assert!(result.steps.len() as u64 <= options.max_steps + 1);

    if options.stop_after_first {
        prop_assert!(last.solutions.len() <= 1);
        if !last.solutions.is_empty() {
            prop_assert_eq!(last.stopped_by, StopReason::FirstSolution);
        }
    }
    if last.stopped_by == StopReason::None {
        prop_assert!(!options.stop_after_first || last.solutions.is_empty());
    }

    let mut previous = 0;
    for step in &result.steps {
        prop_assert!(step.id > previous, "ids not increasing at {}", step.id);
        previous = step.id;
        prop_assert_eq!(step.snapshot.partial.len(), step.snapshot.depth);
    }
    prop_assert_eq!(result.steps.first().map(|s| s.id), Some(1));

    prop_assert!(last.partial.is_empty());
    prop_assert_eq!(last.depth, 0);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        failure_persistence: None,
        .. ProptestConfig::default()
    })]

    #[test]
    fn generic_searches_hold_invariants(
        (length, candidates, modulus) in config_strategy(),
        options in options_strategy(),
    ) {
        let result = run(&build_config(length, candidates, modulus), &options).unwrap();
        check_trace(&result, &options)?;
        for solution in result.solutions() {
            prop_assert_eq!(solution.len(), length);
        }
    }

    #[test]
    fn queens_searches_hold_invariants(n in 1usize..=6, options in options_strategy()) {
        let result = run(&NQueensWorld::new(n), &options).unwrap();
        check_trace(&result, &options)?;
    }

    #[test]
    fn summary_steps_are_a_subset_of_detailed(
        (length, candidates, modulus) in config_strategy(),
        stop_after_first in any::<bool>(),
    ) {
        let unbounded = |detail_mode: DetailMode| RuntimeOptions {
            stop_after_first,
            detail_mode,
            max_steps: 100_000,
        };
        let config = build_config(length, candidates, modulus);
        let summary = run(&config, &unbounded(DetailMode::Summary)).unwrap();
        let detailed = run(&config, &unbounded(DetailMode::Detailed)).unwrap();
        prop_assert!(summary.steps.len() <= detailed.steps.len());
        prop_assert_eq!(summary.solutions(), detailed.solutions());
        prop_assert_eq!(summary.final_snapshot.visited_nodes, detailed.final_snapshot.visited_nodes);
        prop_assert_eq!(summary.final_snapshot.pruned, detailed.final_snapshot.pruned);
    }

    #[test]
    fn dedupe_is_idempotent(
        n in 1usize..=6,
        solutions in prop::collection::vec(prop::collection::vec(0i64..6, 1..=6), 0..12),
    ) {
        let once = dedupe(&solutions, n);
        prop_assert_eq!(dedupe(&once, n), once.clone());
        prop_assert!(once.len() <= solutions.len());
        // Survivors keep encounter order.
        let mut cursor = solutions.iter();
        for kept in &once {
            prop_assert!(cursor.any(|s| s == kept));
        }
    }
}
