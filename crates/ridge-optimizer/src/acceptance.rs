//! Acceptance policies.
//!
//! A policy decides whether a scored candidate replaces the current position.
//! Tabu eligibility is a separate concern and lives in the tabu strategy.

use std::fmt::Debug;

use ridge_types::Score;

/// Decides whether a candidate replaces the current position.
pub trait AcceptancePolicy: Send + Sync + Debug {
    /// Returns true if a candidate scoring `candidate` should replace a
    /// current position scoring `current`.
    fn accept(&self, current: Score, candidate: Score) -> bool;

    fn name(&self) -> &str;
}

/// Greedy ascent: accepts only strictly better candidates.
///
/// Ties never move, so equally good points elsewhere cannot make equivalent
/// runs drift apart.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyAscent;

impl GreedyAscent {
    pub fn new() -> Self {
        Self
    }
}

impl AcceptancePolicy for GreedyAscent {
    fn accept(&self, current: Score, candidate: Score) -> bool {
        candidate > current
    }

    fn name(&self) -> &str {
        "greedy_ascent"
    }
}
