use serde::{Deserialize, Serialize};

use crate::position::{Position, Score};

/// One resolved evaluation: the position, the score the caller reported for
/// it, and the iteration at which it was resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub position: Position,
    pub score: Score,
    pub iteration: usize,
}

impl EvaluationRecord {
    pub fn new(position: Position, score: Score, iteration: usize) -> Self {
        Self {
            position,
            score,
            iteration,
        }
    }

    /// Whether this record should replace `other` as the best seen so far.
    ///
    /// Strictly higher score only, so on ties the earlier record stays.
    pub fn improves_on(&self, other: &EvaluationRecord) -> bool {
        self.score > other.score
    }
}
