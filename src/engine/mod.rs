// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Non-deterministic search engine.
//!
//! This module implements an iterative backtracking engine that runs predicates
//! in sequence. It coordinates with the trail to restore the search state on
//! backtracking, so predicates never undo their own changes.
//!
//! # Architecture
//!
//! The engine maintains a stack of predicate execution states. Each stack entry tracks:
//! - Which predicate is executing
//! - Current round number (for predicates that execute multiple times)
//! - Choice mode state (whether we're trying alternatives)
//! - Current choice index (when in choice mode)
//! - The trail checkpoint to rewind to before each call
//!
//! Execution model:
//! 1. Call try_pred(round) on each predicate
//! 2. If Success: advance to next predicate
//! 3. If SuccessSamePredicate: increment round, stay at same predicate
//! 4. If Choices(n): enter choice mode, call retry_pred(round, 0..n-1)
//! 5. If Failure: backtrack to previous stack entry
//! 6. If Suspend: pause and return control to caller
//! 7. If Abort: stop; the context holds the reason

pub mod predicate;

pub use predicate::{Predicate, PredicateResult, TerminalPredicate};

use crate::reconstruct::WitnessContext;

/// Initial capacity of the predicate stack.
const INITIAL_STACK_SIZE: usize = 64;

/// Stack entry tracking the state of one predicate execution.
#[derive(Debug)]
struct StackEntry {
    /// Index of the predicate in the predicates list.
    predicate_index: usize,

    /// Current round number (incremented by SuccessSamePredicate).
    round: usize,

    /// Whether we're in choice mode (exploring alternatives).
    in_choice_mode: bool,

    /// Next choice to try (when in_choice_mode is true).
    current_choice: usize,

    /// Total number of choices (when in_choice_mode is true).
    num_choices: usize,

    /// Trail checkpoint for this stack entry.
    trail_checkpoint: usize,
}

impl StackEntry {
    fn new(predicate_index: usize, round: usize, trail_checkpoint: usize) -> Self {
        Self {
            predicate_index,
            round,
            in_choice_mode: false,
            current_choice: 0,
            num_choices: 0,
            trail_checkpoint,
        }
    }
}

/// Search engine that coordinates predicate execution and backtracking.
#[derive(Debug)]
pub struct SearchEngine {
    /// List of predicates to execute in sequence. The last one is terminal.
    predicates: Vec<Box<dyn Predicate>>,

    /// Stack of predicate execution states.
    stack: Vec<StackEntry>,

    /// Statistics: number of try_pred calls.
    try_count: u64,

    /// Statistics: number of retry_pred calls.
    retry_count: u64,
}

/// Assembles a predicate sequence that always ends in a [`TerminalPredicate`].
#[derive(Debug, Default)]
pub struct EngineBuilder {
    predicates: Vec<Box<dyn Predicate>>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a predicate.
    pub fn add(mut self, predicate: Box<dyn Predicate>) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Append the terminal predicate and finish.
    pub fn terminal<T: TerminalPredicate + 'static>(mut self, predicate: Box<T>) -> EngineReady {
        self.predicates.push(predicate);
        EngineReady {
            predicates: self.predicates,
        }
    }
}

/// A complete predicate sequence.
#[derive(Debug)]
pub struct EngineReady {
    predicates: Vec<Box<dyn Predicate>>,
}

impl EngineReady {
    pub fn build(self) -> SearchEngine {
        SearchEngine {
            predicates: self.predicates,
            stack: Vec::with_capacity(INITIAL_STACK_SIZE),
            try_count: 0,
            retry_count: 0,
        }
    }
}

impl SearchEngine {
    /// Run the search until it suspends, aborts, or is exhausted.
    ///
    /// Consumes the engine and returns:
    /// - `Some(engine)` if suspended; call `resume` to look for the next solution
    /// - `None` if exhausted (backtracked past the first predicate) or aborted
    ///
    /// Solutions are reported through `ctx`, not through the return value.
    pub fn search(mut self, ctx: &mut WitnessContext<'_>) -> Option<Self> {
        self.stack.clear();
        self.try_count = 0;
        self.retry_count = 0;
        self.stack.push(StackEntry::new(0, 0, ctx.checkpoint()));
        self.run(ctx)
    }

    /// Continue a suspended search by backtracking out of the suspension point.
    pub fn resume(mut self, ctx: &mut WitnessContext<'_>) -> Option<Self> {
        self.stack.pop();
        self.run(ctx)
    }

    fn run(mut self, ctx: &mut WitnessContext<'_>) -> Option<Self> {
        loop {
            let entry = self.stack.last_mut()?;

            // Every call starts from the state this entry was entered with.
            ctx.rewind_to(entry.trail_checkpoint);

            let result = if !entry.in_choice_mode {
                self.try_count += 1;
                self.predicates[entry.predicate_index].try_pred(ctx, entry.round)
            } else {
                if entry.current_choice >= entry.num_choices {
                    self.stack.pop();
                    continue;
                }
                let choice = entry.current_choice;
                entry.current_choice += 1;
                self.retry_count += 1;
                let result =
                    self.predicates[entry.predicate_index].retry_pred(ctx, entry.round, choice);
                if matches!(
                    result,
                    PredicateResult::Choices(_) | PredicateResult::Suspend
                ) {
                    panic!("retry_pred returned invalid result: {:?}", result);
                }
                result
            };

            match result {
                PredicateResult::Success => {
                    self.close_deterministic();
                    self.push_next_predicate(ctx);
                }
                PredicateResult::SuccessSamePredicate => {
                    self.close_deterministic();
                    self.push_same_predicate(ctx);
                }
                PredicateResult::Failure => {
                    // In choice mode the loop tries the next choice.
                    if let Some(entry) = self.stack.last() {
                        if !entry.in_choice_mode {
                            self.stack.pop();
                        }
                    }
                }
                PredicateResult::Choices(n) => {
                    if let Some(entry) = self.stack.last_mut() {
                        entry.in_choice_mode = true;
                        entry.current_choice = 0;
                        entry.num_choices = n;
                        entry.trail_checkpoint = ctx.checkpoint();
                    }
                }
                PredicateResult::Suspend => return Some(self),
                PredicateResult::Abort => return None,
            }
        }
    }

    /// A try_pred that succeeded has no alternatives: backtracking into it must fail.
    fn close_deterministic(&mut self) {
        if let Some(entry) = self.stack.last_mut() {
            if !entry.in_choice_mode {
                entry.in_choice_mode = true;
                entry.current_choice = 0;
                entry.num_choices = 0;
            }
        }
    }

    /// Push a new stack entry for the next predicate in sequence.
    fn push_next_predicate(&mut self, ctx: &WitnessContext<'_>) {
        if let Some(current) = self.stack.last() {
            let next_index = current.predicate_index + 1;
            debug_assert!(next_index < self.predicates.len(), "terminal predicate succeeded");
            self.stack.push(StackEntry::new(next_index, 0, ctx.checkpoint()));
        }
    }

    /// Push a new stack entry for the same predicate with incremented round.
    fn push_same_predicate(&mut self, ctx: &WitnessContext<'_>) {
        if let Some(current) = self.stack.last() {
            let entry =
                StackEntry::new(current.predicate_index, current.round + 1, ctx.checkpoint());
            self.stack.push(entry);
        }
    }

    /// Returns (try_count, retry_count) since the last `search`.
    pub fn statistics(&self) -> (u64, u64) {
        (self.try_count, self.retry_count)
    }
}
