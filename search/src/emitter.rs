//! Step emitter: detail policy, budget enforcement, step materialization.

use std::panic::{catch_unwind, AssertUnwindSafe};

use stepviz_kernel::trace::{TraceComplexity, TracePhase, TraceStep};

use crate::contract::BacktrackWorld;
use crate::error::{panic_detail, SearchError};
use crate::policy::{EventKind, RuntimeOptions};
use crate::snapshot::{Snapshot, StopReason};
use crate::state::SearchState;

/// Worst-case cost of exhaustive backtracking: branching `b`, depth `d`.
pub const COMPLEXITY: TraceComplexity = TraceComplexity {
    time_worst: "O(b^d)",
    space_worst: "O(d)",
};

/// One search event offered to the emitter.
#[derive(Debug, Clone, Copy)]
pub struct StepEvent<'c> {
    pub kind: EventKind,
    pub depth: usize,
    pub choice: Option<i64>,
    pub candidates: &'c [i64],
}

impl StepEvent<'_> {
    const fn phase(&self) -> TracePhase {
        match self.kind {
            EventKind::Choose | EventKind::Enter => TracePhase::Enter,
            EventKind::Prune => TracePhase::Prune,
            EventKind::Solution => TracePhase::Exit,
            EventKind::Backtrack => TracePhase::Update,
        }
    }

    fn title_and_description(&self, solutions: usize) -> (String, String) {
        let depth = self.depth;
        let choice = self.choice.map_or_else(String::new, |c| c.to_string());
        match self.kind {
            EventKind::Enter => ("Enter".into(), format!("Entered depth {depth}")),
            EventKind::Choose => ("Choose".into(), format!("Try {choice} at depth {depth}")),
            EventKind::Prune => (
                "Prune".into(),
                format!("{choice} violates the constraints and is skipped"),
            ),
            EventKind::Solution => ("Solution".into(), format!("Found solution #{solutions}")),
            EventKind::Backtrack => ("Backtrack".into(), format!("Undo choice {choice}")),
        }
    }
}

/// Records steps for one run.
pub struct StepEmitter<'w> {
    world: &'w dyn BacktrackWorld,
    options: &'w RuntimeOptions,
    steps: Vec<TraceStep<Snapshot>>,
}

impl<'w> StepEmitter<'w> {
    pub fn new(world: &'w dyn BacktrackWorld, options: &'w RuntimeOptions) -> Self {
        Self {
            world,
            options,
            steps: Vec::new(),
        }
    }

    /// Offer an event. Nothing is recorded if the detail mode filters it,
    /// the run is halted, or the budget is spent (which halts the run).
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::MalformedEnhancer`] if the world's snapshot
    /// enhancer panics.
    pub fn emit(&mut self, state: &mut SearchState, event: StepEvent<'_>) -> Result<(), SearchError> {
        if !self.options.detail_mode.admits(event.kind) {
            return Ok(());
        }
        if state.is_halted() {
            return Ok(());
        }
        if state.steps_emitted >= self.options.max_steps {
            log::debug!(
                "step budget of {} reached at depth {}",
                self.options.max_steps,
                event.depth
            );
            state.halt(StopReason::MaxSteps);
            return Ok(());
        }

        let base = state.snapshot(
            event.depth,
            event.choice,
            event.candidates,
            self.options.detail_mode,
            None,
        );
        let snapshot = self.enhance(base)?;
        let (title, description) = event.title_and_description(state.solutions.len());
        let id = state.next_step_id();
        self.steps.push(TraceStep {
            id,
            title,
            description,
            phase: event.phase(),
            snapshot,
            complexity: COMPLEXITY,
            is_error: false,
        });
        state.steps_emitted += 1;
        Ok(())
    }

    /// Append the trailing completion step. Not counted in `steps_emitted`.
    pub fn finish(&mut self, state: &mut SearchState, final_snapshot: Snapshot) {
        let description = final_snapshot
            .message
            .clone()
            .unwrap_or_else(|| "Search finished.".into());
        let id = state.next_step_id();
        self.steps.push(TraceStep {
            id,
            title: "Search finished".into(),
            description,
            phase: TracePhase::Exit,
            snapshot: final_snapshot,
            complexity: COMPLEXITY,
            is_error: false,
        });
    }

    /// Apply the world's enhancer with panic isolation.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::MalformedEnhancer`] on panic.
    pub fn enhance(&self, snapshot: Snapshot) -> Result<Snapshot, SearchError> {
        let world = self.world;
        catch_unwind(AssertUnwindSafe(|| world.enhance_snapshot(snapshot))).map_err(|payload| {
            SearchError::MalformedEnhancer {
                detail: panic_detail(&*payload),
            }
        })
    }

    #[must_use]
    pub fn into_steps(self) -> Vec<TraceStep<Snapshot>> {
        self.steps
    }
}
