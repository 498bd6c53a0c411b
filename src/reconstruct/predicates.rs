// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Predicates of the witness search.
//!
//! The program is `ChooseVector* WitnessFound`: each round of [`ChooseVectorPredicate`]
//! selects one vector, and [`WitnessFoundPredicate`] suspends the engine once every credit is
//! satisfied.

use super::context::WitnessContext;
use crate::engine::{Predicate, PredicateResult, TerminalPredicate};
use crate::lattice::add;
use rand::seq::SliceRandom;

/// Candidates of one round, fixed when the round is first tried.
#[derive(Debug)]
struct Step {
    satisfied: Vec<u16>,
    candidates: Vec<usize>,
}

/// Select the next vector of the witness.
///
/// From satisfied credits `f` with table entry `(size, last)`, the candidates are the
/// vector indices below the current upper bound: first those in `last..upper_bound`, then
/// those under `last`, each group in random order. A candidate is accepted when the table
/// says the credits it leads to can be completed with the selection slots that remain.
/// Selected indices strictly decrease, so a witness never repeats a vector.
///
/// The table's sizes ignore the upper bound, so an accepted candidate can still dead-end.
/// Backtracking then tries the others, and since some optimal selection listed in
/// decreasing order passes every check, the search always completes.
#[derive(Debug, Default)]
pub struct ChooseVectorPredicate {
    steps: Vec<Step>,
}

impl ChooseVectorPredicate {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Predicate for ChooseVectorPredicate {
    fn try_pred(&mut self, ctx: &mut WitnessContext<'_>, round: usize) -> PredicateResult {
        let satisfied = ctx.satisfied();
        if satisfied.as_slice() == ctx.shape().capacity() {
            return PredicateResult::Success;
        }
        if ctx.remaining() == 0 {
            return PredicateResult::Failure;
        }

        let entry = match ctx.entry(&satisfied) {
            Ok(entry) => entry,
            Err(err) => return ctx.abort(err),
        };
        let upper = ctx.upper_bound();
        let last = entry.last.map_or(0, usize::from).min(upper);
        let mut candidates: Vec<usize> = (last..upper).collect();
        let mut fallback: Vec<usize> = (0..last).collect();
        candidates.shuffle(ctx.rng());
        fallback.shuffle(ctx.rng());
        candidates.append(&mut fallback);

        self.steps.truncate(round);
        let choices = candidates.len();
        self.steps.push(Step {
            satisfied,
            candidates,
        });

        if choices == 0 {
            PredicateResult::Failure
        } else {
            PredicateResult::Choices(choices)
        }
    }

    fn retry_pred(
        &mut self,
        ctx: &mut WitnessContext<'_>,
        round: usize,
        choice: usize,
    ) -> PredicateResult {
        let step = &self.steps[round];
        let index = step.candidates[choice];
        let capacity = ctx.shape().capacity();
        let next = add(&step.satisfied, ctx.catalog().contribution(index), capacity);

        let entry = match ctx.entry(&next) {
            Ok(entry) => entry,
            Err(err) => return ctx.abort(err),
        };
        if entry.size as usize >= ctx.remaining() || !ctx.push_selection(index) {
            return PredicateResult::Failure;
        }
        ctx.set_satisfied(&next);
        PredicateResult::SuccessSamePredicate
    }

    fn name(&self) -> &str {
        "ChooseVector"
    }
}

/// Suspend with a complete witness in the context.
#[derive(Debug)]
pub struct WitnessFoundPredicate;

impl Predicate for WitnessFoundPredicate {
    fn try_pred(&mut self, _ctx: &mut WitnessContext<'_>, _round: usize) -> PredicateResult {
        PredicateResult::Suspend
    }

    fn name(&self) -> &str {
        "WitnessFound"
    }
}

impl TerminalPredicate for WitnessFoundPredicate {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineBuilder;
    use crate::reconstruct::context::fixtures;

    #[test]
    fn test_single_step_witness() {
        // Canonical order: (1,1) #0, (1,0) #1, (0,1) #2.
        let fixture = fixtures::scenario();
        let mut rng = fixtures::rng();
        let mut ctx = fixture.context(&mut rng);

        let engine = EngineBuilder::new()
            .add(Box::new(ChooseVectorPredicate::new()))
            .terminal(Box::new(WitnessFoundPredicate))
            .build();
        let engine = engine.search(&mut ctx);

        assert!(engine.is_some());
        assert_eq!(ctx.selection(), vec![0]);
        assert_eq!(ctx.satisfied(), vec![1, 1]);
    }

    #[test]
    fn test_every_witness_is_minimal() {
        // Canonical order: (1,1,0) #0, (1,0,1) #1, (0,1,1) #2, (0,0,1) #3.
        let fixture = fixtures::build(
            vec![1, 1, 1],
            vec![vec![0, 0, 1], vec![0, 1, 1], vec![1, 0, 1], vec![1, 1, 0]],
        );
        let mut rng = fixtures::rng();
        let mut ctx = WitnessContext::new(&fixture.store, &[0, 0, 0], 2, &mut rng).unwrap();

        let mut found = Vec::new();
        let mut engine = EngineBuilder::new()
            .add(Box::new(ChooseVectorPredicate::new()))
            .terminal(Box::new(WitnessFoundPredicate))
            .build()
            .search(&mut ctx);
        while let Some(suspended) = engine {
            let mut selection = ctx.selection();
            assert_eq!(ctx.satisfied(), vec![1, 1, 1]);
            selection.sort_unstable();
            found.push(selection);
            engine = suspended.resume(&mut ctx);
        }
        assert!(ctx.take_error().is_none());

        found.sort();
        // Every pair covering all three categories, each found once.
        assert_eq!(
            found,
            vec![vec![0, 1], vec![0, 2], vec![0, 3], vec![1, 2]]
        );
    }
}
