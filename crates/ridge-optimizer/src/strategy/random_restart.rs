//! Hill climbing with stagnation-triggered random restarts.

use ridge_types::Score;
use tracing::info;

use super::{HillClimbing, Proposal, ProposalOrigin, ProposalStrategy, SearchContext};

/// Hill climbing that jumps to a uniformly random position after
/// `stagnation_threshold` consecutive rejections, at most `n_restarts` times.
///
/// A restart candidate always becomes the current position once scored; it is
/// the only way the search leaves its neighborhood. With `n_restarts = 0` the
/// behavior, random draws included, is exactly that of [`HillClimbing`].
#[derive(Debug, Clone)]
pub struct RandomRestartHillClimbing {
    climber: HillClimbing,
    restarts_remaining: usize,
    stagnation_threshold: usize,
    stagnation: usize,
    restarts_done: usize,
}

impl RandomRestartHillClimbing {
    pub fn new(n_restarts: usize, stagnation_threshold: usize) -> Self {
        Self {
            climber: HillClimbing::new(),
            restarts_remaining: n_restarts,
            stagnation_threshold,
            stagnation: 0,
            restarts_done: 0,
        }
    }

    /// Consecutive rejected evaluations since the last acceptance or restart.
    pub fn stagnation(&self) -> usize {
        self.stagnation
    }

    pub fn restarts_remaining(&self) -> usize {
        self.restarts_remaining
    }

    pub fn restarts_done(&self) -> usize {
        self.restarts_done
    }

    fn should_restart(&self) -> bool {
        self.restarts_remaining > 0 && self.stagnation >= self.stagnation_threshold
    }
}

impl ProposalStrategy for RandomRestartHillClimbing {
    fn propose(&mut self, ctx: &mut SearchContext<'_>) -> Proposal {
        if !self.should_restart() {
            return self.climber.propose(ctx);
        }

        self.restarts_remaining -= 1;
        self.restarts_done += 1;
        self.stagnation = 0;
        info!(
            "Random restart {} after {} stagnant evaluations ({} restarts left)",
            self.restarts_done, self.stagnation_threshold, self.restarts_remaining
        );
        Proposal::new(ctx.random_position(), ProposalOrigin::Restart)
    }

    fn on_result(&mut self, ctx: &mut SearchContext<'_>, proposal: &Proposal, score: Score) -> bool {
        if proposal.origin == ProposalOrigin::Restart {
            self.stagnation = 0;
            return true;
        }

        let accepted = self.climber.on_result(ctx, proposal, score);
        if accepted {
            self.stagnation = 0;
        } else {
            self.stagnation += 1;
        }
        accepted
    }

    fn name(&self) -> &str {
        "random_restart_hill_climbing"
    }
}
