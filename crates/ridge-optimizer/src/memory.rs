//! Evaluation history, best-so-far tracking and tabu window queries.

use std::collections::VecDeque;

use ridge_types::{EvaluationRecord, Position};

/// Record of every resolved evaluation, plus the best one seen.
///
/// With a history limit, old records fall out of the history buffer but the
/// best record is kept separately and never evicted.
#[derive(Debug, Clone, Default)]
pub struct PositionMemory {
    history: VecDeque<EvaluationRecord>,
    max_history: Option<usize>,
    best: Option<EvaluationRecord>,
    total_recorded: usize,
}

impl PositionMemory {
    /// Unbounded memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Memory keeping at most `max_history` records (`None` = unbounded).
    pub fn with_max_history(max_history: Option<usize>) -> Self {
        Self {
            history: VecDeque::new(),
            max_history,
            best: None,
            total_recorded: 0,
        }
    }

    /// Append a record, evicting the oldest one if the history is full.
    ///
    /// Returns `true` if the record became the new best.
    pub fn record(&mut self, record: EvaluationRecord) -> bool {
        let new_best = match &self.best {
            None => true,
            Some(best) => record.improves_on(best),
        };
        if new_best {
            self.best = Some(record.clone());
        }

        self.history.push_back(record);
        if let Some(limit) = self.max_history {
            while self.history.len() > limit {
                self.history.pop_front();
            }
        }
        self.total_recorded += 1;
        new_best
    }

    /// Highest score seen; the earliest record wins ties.
    pub fn best(&self) -> Option<&EvaluationRecord> {
        self.best.as_ref()
    }

    pub fn best_score(&self) -> Option<f64> {
        self.best.as_ref().map(|r| r.score)
    }

    /// True if `position` is among the last `window` recorded positions.
    pub fn is_tabu(&self, position: &Position, window: usize) -> bool {
        self.tabu_age(position, window).is_some()
    }

    /// How many records ago `position` last appeared within the last `window`
    /// records (0 = the most recent record), or `None` if it is not tabu.
    pub fn tabu_age(&self, position: &Position, window: usize) -> Option<usize> {
        self.history
            .iter()
            .rev()
            .take(window)
            .position(|r| &r.position == position)
    }

    /// Records currently held, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &EvaluationRecord> {
        self.history.iter()
    }

    pub fn last(&self) -> Option<&EvaluationRecord> {
        self.history.back()
    }

    /// Records currently held in the history buffer.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Records ever appended, evicted ones included.
    pub fn total_recorded(&self) -> usize {
        self.total_recorded
    }

    pub fn max_history(&self) -> Option<usize> {
        self.max_history
    }
}
