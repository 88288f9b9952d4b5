//! Plain hill climbing.

use ridge_types::Score;

use super::{Proposal, ProposalStrategy, SearchContext};

/// Hill climbing: propose a random neighbor of the current position and move
/// there only if it scores strictly better.
///
/// A rejected candidate is never retried; the next proposal is a fresh
/// neighbor of the unchanged current position.
#[derive(Debug, Clone, Copy, Default)]
pub struct HillClimbing;

impl HillClimbing {
    pub fn new() -> Self {
        Self
    }
}

impl ProposalStrategy for HillClimbing {
    fn propose(&mut self, ctx: &mut SearchContext<'_>) -> Proposal {
        Proposal::neighbor(ctx.neighbor_of_current())
    }

    fn on_result(&mut self, ctx: &mut SearchContext<'_>, _proposal: &Proposal, score: Score) -> bool {
        ctx.accepts(score)
    }

    fn name(&self) -> &str {
        "hill_climbing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::SearchSpace;
    use crate::strategy::test_support::Fixture;
    use crate::strategy::ProposalOrigin;
    use ridge_types::{EvaluationRecord, Position};

    fn fixture() -> Fixture {
        let mut fx = Fixture::new(SearchSpace::from_bounds(&[(-10.0, 10.0)]).unwrap(), 1);
        fx.visit(EvaluationRecord::new(Position::from([5.0]), -25.0, 0));
        fx
    }

    #[test]
    fn proposes_nearby_neighbors() {
        let mut fx = fixture();
        let mut hc = HillClimbing::new();
        for _ in 0..50 {
            let proposal = hc.propose(&mut fx.ctx());
            assert_eq!(proposal.origin, ProposalOrigin::Neighbor);
            // radius = 0.1 * 20
            assert!((proposal.position[0] - 5.0).abs() <= 2.0 + 1e-12);
        }
    }

    #[test]
    fn accepts_only_strict_improvement() {
        let mut fx = fixture();
        let mut hc = HillClimbing::new();
        let proposal = hc.propose(&mut fx.ctx());
        assert!(hc.on_result(&mut fx.ctx(), &proposal, -24.0));
        assert!(!hc.on_result(&mut fx.ctx(), &proposal, -25.0));
        assert!(!hc.on_result(&mut fx.ctx(), &proposal, -30.0));
    }
}
