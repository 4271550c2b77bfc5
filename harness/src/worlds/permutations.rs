//! Permutations: sequences of `length` distinct values drawn from a list.

use stepviz_search::{DetailMode, RunResult, RuntimeOptions, SearchConfig};

use crate::contract::{InputError, ProblemAdapter, RunError};
use crate::input::{detail_mode, flag, int_list, parse_object, positive_int};

const DEFAULT_CANDIDATES: [i64; 4] = [1, 2, 3, 4];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermutationInput {
    pub length: usize,
    pub candidates: Vec<i64>,
    pub stop_after_first: bool,
    pub detail_mode: DetailMode,
    pub max_steps: u64,
}

impl Default for PermutationInput {
    fn default() -> Self {
        Self {
            length: 4,
            candidates: DEFAULT_CANDIDATES.to_vec(),
            stop_after_first: true,
            detail_mode: DetailMode::Summary,
            max_steps: 200,
        }
    }
}

/// Search config: no repeated value, full length is a solution.
#[must_use]
pub fn permutation_config(length: usize, candidates: Vec<i64>) -> SearchConfig {
    SearchConfig::new(length, candidates, |partial, _, choice| !partial.contains(&choice))
        .with_world_id("permutations")
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PermutationsAdapter;

impl ProblemAdapter for PermutationsAdapter {
    type Input = PermutationInput;

    fn id(&self) -> &'static str {
        "backtracking-permutations"
    }

    fn title(&self) -> &'static str {
        "Backtracking Permutations Trace"
    }

    fn description(&self) -> &'static str {
        "Enumerate sequences of distinct values by backtracking."
    }

    fn default_input(&self) -> PermutationInput {
        PermutationInput::default()
    }

    fn parse_input_text(&self, text: &str) -> Result<PermutationInput, InputError> {
        let obj = parse_object(text)?;
        let defaults = PermutationInput::default();
        let length = positive_int(&obj, "length", None)?;
        let length = usize::try_from(length).map_err(|_| InputError::InvalidField {
            field: "length",
            detail: "too large".into(),
        })?;
        Ok(PermutationInput {
            length,
            candidates: int_list(&obj, "candidates", &defaults.candidates)?,
            stop_after_first: flag(&obj, "stop_after_first", defaults.stop_after_first),
            detail_mode: detail_mode(&obj, "detail_mode", defaults.detail_mode),
            max_steps: positive_int(&obj, "max_steps", Some(defaults.max_steps))?,
        })
    }

    fn input_json(&self, input: &PermutationInput) -> serde_json::Value {
        serde_json::json!({
            "candidates": input.candidates,
            "detail_mode": input.detail_mode.as_str(),
            "length": input.length,
            "max_steps": input.max_steps,
            "stop_after_first": input.stop_after_first,
        })
    }

    fn runtime_options(&self, input: &PermutationInput) -> RuntimeOptions {
        RuntimeOptions {
            stop_after_first: input.stop_after_first,
            detail_mode: input.detail_mode,
            max_steps: input.max_steps,
        }
    }

    fn run(&self, input: &PermutationInput) -> Result<RunResult, RunError> {
        let config = permutation_config(input.length, input.candidates.clone());
        Ok(stepviz_search::run(&config, &self.runtime_options(input))?)
    }
}
