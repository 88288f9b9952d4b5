//! Proposal strategies: how the next candidate is chosen and how a scored
//! candidate is judged.

mod hill_climbing;
mod random_restart;
mod tabu;

use std::fmt::Debug;

use rand_chacha::ChaCha8Rng;
use ridge_types::{EvaluationRecord, Position, Score};
use serde::{Deserialize, Serialize};

use crate::acceptance::AcceptancePolicy;
use crate::memory::PositionMemory;
use crate::space::{NeighborDistribution, SearchSpace};

pub use hill_climbing::HillClimbing;
pub use random_restart::RandomRestartHillClimbing;
pub use tabu::{TabuSearch, DEFAULT_MAX_ATTEMPTS};

/// Where a proposal came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalOrigin {
    /// A caller-supplied or randomly drawn initial position.
    Initial,
    /// A random neighbor of the current position.
    Neighbor,
    /// A uniformly random position issued by a restart.
    Restart,
    /// A tabu neighbor issued because every sampled neighbor was tabu.
    /// `age` is how many records ago it was last visited.
    TabuFallback { age: usize },
}

/// A candidate position awaiting a score.
#[derive(Debug, Clone, PartialEq)]
pub struct Proposal {
    pub position: Position,
    pub origin: ProposalOrigin,
}

impl Proposal {
    pub fn new(position: Position, origin: ProposalOrigin) -> Self {
        Self { position, origin }
    }

    pub fn neighbor(position: Position) -> Self {
        Self::new(position, ProposalOrigin::Neighbor)
    }
}

/// Read access to the search state plus the random source, lent to a
/// strategy for the duration of one call.
pub struct SearchContext<'a> {
    pub space: &'a SearchSpace,
    pub memory: &'a PositionMemory,
    /// Current position and its score; `None` before the first evaluation.
    pub current: Option<&'a EvaluationRecord>,
    pub acceptance: &'a dyn AcceptancePolicy,
    pub step_scale: f64,
    pub distribution: NeighborDistribution,
    pub rng: &'a mut ChaCha8Rng,
}

impl SearchContext<'_> {
    /// A random neighbor of the current position (a random position if there
    /// is no current position yet).
    pub fn neighbor_of_current(&mut self) -> Position {
        match self.current {
            Some(current) => self.space.neighbor(
                &current.position,
                self.step_scale,
                self.distribution,
                &mut *self.rng,
            ),
            None => self.space.random_position(&mut *self.rng),
        }
    }

    pub fn random_position(&mut self) -> Position {
        self.space.random_position(&mut *self.rng)
    }

    /// Whether the acceptance policy would move to a candidate scoring `score`.
    /// Always true while there is no current position.
    pub fn accepts(&self, score: Score) -> bool {
        match self.current {
            Some(current) => self.acceptance.accept(current.score, score),
            None => true,
        }
    }

    /// Whether `score` is strictly above every score recorded so far.
    pub fn beats_best(&self, score: Score) -> bool {
        self.memory.best_score().map_or(true, |best| score > best)
    }
}

/// Common trait for all local search strategies.
///
/// The shared optimizer owns the protocol state; a strategy only decides what
/// to propose next and whether a scored proposal is accepted.
pub trait ProposalStrategy: Send + Debug {
    /// Produce the next candidate.
    fn propose(&mut self, ctx: &mut SearchContext<'_>) -> Proposal;

    /// Judge a scored proposal. Returns true if it becomes the current position.
    ///
    /// Called before the evaluation is recorded, so `ctx.memory` still reflects
    /// the state the proposal was made against.
    fn on_result(&mut self, ctx: &mut SearchContext<'_>, proposal: &Proposal, score: Score) -> bool;

    /// Human-readable strategy name.
    fn name(&self) -> &str;
}

impl ProposalStrategy for Box<dyn ProposalStrategy> {
    fn propose(&mut self, ctx: &mut SearchContext<'_>) -> Proposal {
        (**self).propose(ctx)
    }

    fn on_result(&mut self, ctx: &mut SearchContext<'_>, proposal: &Proposal, score: Score) -> bool {
        (**self).on_result(ctx, proposal, score)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use ridge_types::EvaluationRecord;

    use crate::acceptance::GreedyAscent;
    use crate::memory::PositionMemory;
    use crate::space::{NeighborDistribution, SearchSpace};

    use super::SearchContext;

    /// Owns everything a [`SearchContext`] borrows.
    pub(crate) struct Fixture {
        pub space: SearchSpace,
        pub memory: PositionMemory,
        pub current: Option<EvaluationRecord>,
        pub acceptance: GreedyAscent,
        pub step_scale: f64,
        pub rng: ChaCha8Rng,
    }

    impl Fixture {
        pub fn new(space: SearchSpace, seed: u64) -> Self {
            Self {
                space,
                memory: PositionMemory::new(),
                current: None,
                acceptance: GreedyAscent,
                step_scale: 0.1,
                rng: ChaCha8Rng::seed_from_u64(seed),
            }
        }

        /// Record an evaluation and make it current.
        pub fn visit(&mut self, record: EvaluationRecord) {
            self.memory.record(record.clone());
            self.current = Some(record);
        }

        pub fn ctx(&mut self) -> SearchContext<'_> {
            SearchContext {
                space: &self.space,
                memory: &self.memory,
                current: self.current.as_ref(),
                acceptance: &self.acceptance,
                step_scale: self.step_scale,
                distribution: NeighborDistribution::Uniform,
                rng: &mut self.rng,
            }
        }
    }
}
