//! Tabu search over recently visited positions.

use ridge_types::{Position, Score};
use tracing::debug;

use super::{HillClimbing, Proposal, ProposalOrigin, ProposalStrategy, SearchContext};

/// Default number of neighbors drawn before falling back to a tabu one.
pub const DEFAULT_MAX_ATTEMPTS: usize = 20;

/// Hill climbing that avoids re-proposing any of the last `tabu_memory`
/// evaluated positions.
///
/// Eligibility is checked when proposing: up to `max_attempts` neighbors are
/// drawn until one is not tabu. If all of them are tabu, the least recently
/// visited one is proposed anyway. A full tabu neighborhood is not an error.
///
/// Aspiration: a scored candidate that beats the global best is always
/// accepted, tabu or not. Otherwise a tabu candidate is rejected and an
/// eligible one goes through the acceptance policy.
#[derive(Debug, Clone)]
pub struct TabuSearch {
    climber: HillClimbing,
    tabu_memory: usize,
    max_attempts: usize,
    fallbacks: usize,
}

impl TabuSearch {
    pub fn new(tabu_memory: usize) -> Self {
        Self::with_max_attempts(tabu_memory, DEFAULT_MAX_ATTEMPTS)
    }

    pub fn with_max_attempts(tabu_memory: usize, max_attempts: usize) -> Self {
        Self {
            climber: HillClimbing::new(),
            tabu_memory,
            max_attempts,
            fallbacks: 0,
        }
    }

    pub fn tabu_memory(&self) -> usize {
        self.tabu_memory
    }

    /// Number of proposals issued from a fully tabu neighborhood.
    pub fn fallbacks(&self) -> usize {
        self.fallbacks
    }
}

impl ProposalStrategy for TabuSearch {
    fn propose(&mut self, ctx: &mut SearchContext<'_>) -> Proposal {
        // Least recently visited tabu candidate seen so far; earliest wins ties.
        let mut oldest: Option<(Position, usize)> = None;

        for _ in 0..self.max_attempts {
            let candidate = ctx.neighbor_of_current();
            match ctx.memory.tabu_age(&candidate, self.tabu_memory) {
                None => return Proposal::neighbor(candidate),
                Some(age) => {
                    if oldest.as_ref().map_or(true, |(_, best_age)| age > *best_age) {
                        oldest = Some((candidate, age));
                    }
                }
            }
        }

        match oldest {
            Some((position, age)) => {
                self.fallbacks += 1;
                debug!(
                    "All {} sampled neighbors are tabu; proposing {} (last visited {} records ago)",
                    self.max_attempts, position, age
                );
                Proposal::new(position, ProposalOrigin::TabuFallback { age })
            }
            None => self.climber.propose(ctx),
        }
    }

    fn on_result(&mut self, ctx: &mut SearchContext<'_>, proposal: &Proposal, score: Score) -> bool {
        if ctx.beats_best(score) {
            return true;
        }
        if let ProposalOrigin::TabuFallback { .. } = proposal.origin {
            return false;
        }
        self.climber.on_result(ctx, proposal, score)
    }

    fn name(&self) -> &str {
        "tabu_search"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::SearchSpace;
    use crate::strategy::test_support::Fixture;
    use ridge_types::EvaluationRecord;

    fn binary_fixture() -> Fixture {
        // Two grid points; once both are visited every neighbor is tabu.
        let space = SearchSpace::builder().add_int("bit", 0, 1).build().unwrap();
        let mut fx = Fixture::new(space, 4);
        fx.memory
            .record(EvaluationRecord::new(Position::from([1.0]), -1.0, 0));
        fx.visit(EvaluationRecord::new(Position::from([0.0]), 0.0, 1));
        fx
    }

    #[test]
    fn prefers_non_tabu_neighbors() {
        let space = SearchSpace::builder().add_int("k", 0, 100).build().unwrap();
        let mut fx = Fixture::new(space, 8);
        fx.visit(EvaluationRecord::new(Position::from([50.0]), 0.0, 0));
        let mut tabu = TabuSearch::new(10);
        for _ in 0..30 {
            let p = tabu.propose(&mut fx.ctx());
            assert_ne!(p.position, Position::from([50.0]));
            assert_eq!(p.origin, ProposalOrigin::Neighbor);
        }
    }

    #[test]
    fn full_tabu_neighborhood_falls_back_to_oldest() {
        let mut fx = binary_fixture();
        let mut tabu = TabuSearch::with_max_attempts(5, 64);
        let p = tabu.propose(&mut fx.ctx());
        assert!(matches!(p.origin, ProposalOrigin::TabuFallback { .. }));
        assert_eq!(tabu.fallbacks(), 1);
        // [0] was visited most recently (age 0), [1] before it (age 1).
        // Each draw lands on [1] with probability 1/4, so 64 draws all but
        // certainly see it.
        assert_eq!(p.position, Position::from([1.0]));
        assert_eq!(p.origin, ProposalOrigin::TabuFallback { age: 1 });
    }

    #[test]
    fn aspiration_accepts_tabu_candidate_beating_best() {
        let mut fx = binary_fixture();
        let mut tabu = TabuSearch::new(5);
        let p = tabu.propose(&mut fx.ctx());
        assert!(matches!(p.origin, ProposalOrigin::TabuFallback { .. }));
        assert!(tabu.on_result(&mut fx.ctx(), &p, 3.0));
    }

    #[test]
    fn tabu_candidate_not_beating_best_is_rejected() {
        let mut fx = binary_fixture();
        let mut tabu = TabuSearch::new(5);
        let p = tabu.propose(&mut fx.ctx());
        assert!(!tabu.on_result(&mut fx.ctx(), &p, 0.0));
        assert!(!tabu.on_result(&mut fx.ctx(), &p, -0.5));
    }

    #[test]
    fn zero_memory_never_marks_tabu() {
        let mut fx = binary_fixture();
        let mut tabu = TabuSearch::new(0);
        for _ in 0..10 {
            let p = tabu.propose(&mut fx.ctx());
            assert_eq!(p.origin, ProposalOrigin::Neighbor);
        }
        assert_eq!(tabu.fallbacks(), 0);
    }
}
