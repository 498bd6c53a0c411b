// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Predicate trait for non-deterministic search.
//!
//! The search engine works by trying predicates in sequence. Each predicate
//! represents a choice point in the search space. Predicates can succeed,
//! fail, offer choices, or stop the search.
//!
//! # Example
//!
//! ```
//! use credit_cover::engine::{Predicate, PredicateResult};
//! use credit_cover::reconstruct::WitnessContext;
//!
//! #[derive(Debug)]
//! struct TwoWays;
//!
//! impl Predicate for TwoWays {
//!     fn try_pred(&mut self, _ctx: &mut WitnessContext<'_>, _round: usize) -> PredicateResult {
//!         PredicateResult::Choices(2)
//!     }
//!
//!     fn retry_pred(
//!         &mut self,
//!         _ctx: &mut WitnessContext<'_>,
//!         _round: usize,
//!         choice: usize,
//!     ) -> PredicateResult {
//!         if choice == 0 {
//!             PredicateResult::Success
//!         } else {
//!             PredicateResult::Failure
//!         }
//!     }
//!
//!     fn name(&self) -> &str {
//!         "TwoWays"
//!     }
//! }
//! ```

use crate::reconstruct::WitnessContext;
use std::fmt::Debug;

/// Result of attempting a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateResult {
    /// Predicate succeeded. Move to next predicate in sequence.
    Success,

    /// Predicate succeeded but stay at same predicate with next round.
    /// Allows a single predicate to execute once per step of a variable-length walk.
    SuccessSamePredicate,

    /// Predicate has no (more) valid choices. Backtrack to previous predicate.
    Failure,

    /// Predicate has multiple choices to explore.
    /// Engine will call retry_pred(round, choice) for each choice in 0..n.
    Choices(usize),

    /// Suspend execution. Engine returns control with state preserved.
    Suspend,

    /// Stop the search. The predicate has left the reason in the context.
    Abort,
}

/// A terminal predicate that ends a program.
///
/// Terminal predicates never return Success, so the engine can never run off the end of
/// its predicate sequence. [`super::EngineBuilder::terminal`] only accepts these.
pub trait TerminalPredicate: Predicate {}

/// Trait for search predicates in the non-deterministic engine.
///
/// The engine calls `try_pred` to attempt the predicate for the first time, and
/// `retry_pred` for each alternative after `try_pred` returns `Choices(n)`.
///
/// # Trail Integration
///
/// Predicates change search state only through [`WitnessContext::assign`]. The engine
/// rewinds the trail to the entry's checkpoint before each call, so every choice starts
/// from the state the predicate was entered with.
pub trait Predicate: Debug {
    /// Try this predicate for a given round.
    ///
    /// The round starts at 0 and increments each time the predicate returns
    /// `SuccessSamePredicate`.
    fn try_pred(&mut self, ctx: &mut WitnessContext<'_>, round: usize) -> PredicateResult;

    /// Retry this predicate with a specific choice.
    ///
    /// Called after try_pred returns Choices(n), for each choice in 0..n until one does not
    /// fail. May return `Success`, `SuccessSamePredicate`, `Failure`, or `Abort`.
    #[allow(unused)]
    fn retry_pred(
        &mut self,
        ctx: &mut WitnessContext<'_>,
        round: usize,
        choice: usize,
    ) -> PredicateResult {
        // Predicates that return Choices must implement this.
        panic!("{}::retry_pred should never be called", self.name());
    }

    /// Name for logging. Defaults to the type name.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
