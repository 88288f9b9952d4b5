//! The propose/evaluate state machine shared by all strategies.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use ridge_types::{
    ConfigError, EvaluationRecord, Position, ProtocolError, RidgeResult, Score,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::acceptance::{AcceptancePolicy, GreedyAscent};
use crate::config::OptimizerConfig;
use crate::memory::PositionMemory;
use crate::space::{NeighborDistribution, SearchSpace};
use crate::strategy::{Proposal, ProposalOrigin, ProposalStrategy, SearchContext};

/// Unique optimizer run identifier, carried in log lines.
pub type RunId = Uuid;

/// Lifecycle state of an [`Optimizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptimizerState {
    /// Constructed; no initial position handed out yet.
    Uninitialized,
    /// Some initial positions evaluated, more remain.
    Initializing,
    /// Ready for `iterate`.
    Ready,
    /// A proposal awaits `evaluate`.
    ProposalPending,
    /// `finish` was called.
    Terminal,
}

/// Outcome of resolving one proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// The iteration index the evaluation was recorded under.
    pub iteration: usize,
    /// The proposal became the current position.
    pub accepted: bool,
    /// The proposal became the global best.
    pub new_best: bool,
}

/// Search state shared by [`Optimizer`] and [`crate::BatchOptimizer`]:
/// everything except how pending proposals are stored.
#[derive(Debug)]
pub(crate) struct SearchCore<S> {
    run_id: RunId,
    seed: u64,
    space: SearchSpace,
    memory: PositionMemory,
    acceptance: Box<dyn AcceptancePolicy>,
    strategy: S,
    rng: ChaCha8Rng,
    current: Option<EvaluationRecord>,
    step_scale: f64,
    distribution: NeighborDistribution,
    initial_positions: Vec<Position>,
    n_initial: usize,
    iteration: usize,
}

impl<S: ProposalStrategy> SearchCore<S> {
    pub(crate) fn new(
        space: SearchSpace,
        config: OptimizerConfig,
        strategy: S,
    ) -> Result<Self, ConfigError> {
        config.validate(&space)?;

        let run_id = Uuid::new_v4();
        let seed = config.random_seed.unwrap_or_else(rand::random);
        info!(
            "Creating {} optimizer {} over {} dimensions (seed {}, {} initial positions)",
            strategy.name(),
            run_id,
            space.dimensions(),
            seed,
            config.n_initial()
        );

        Ok(Self {
            run_id,
            seed,
            memory: PositionMemory::with_max_history(config.max_history),
            acceptance: Box::new(GreedyAscent::new()),
            strategy,
            rng: ChaCha8Rng::seed_from_u64(seed),
            current: None,
            step_scale: config.step_scale,
            distribution: config.distribution,
            n_initial: config.n_initial(),
            initial_positions: config.initial_positions,
            iteration: 0,
            space,
        })
    }

    pub(crate) fn run_id(&self) -> RunId {
        self.run_id
    }

    pub(crate) fn n_initial(&self) -> usize {
        self.n_initial
    }

    pub(crate) fn iteration(&self) -> usize {
        self.iteration
    }

    pub(crate) fn has_current(&self) -> bool {
        self.current.is_some()
    }

    /// The `index`-th initial position: caller-supplied ones unchanged, then
    /// random draws.
    pub(crate) fn initial_proposal(&mut self, index: usize) -> Proposal {
        let position = match self.initial_positions.get(index) {
            Some(position) => position.clone(),
            None => self.space.random_position(&mut self.rng),
        };
        debug!("Run {}: initial position {} = {}", self.run_id, index, position);
        Proposal::new(position, ProposalOrigin::Initial)
    }

    pub(crate) fn propose(&mut self) -> Proposal {
        let mut ctx = SearchContext {
            space: &self.space,
            memory: &self.memory,
            current: self.current.as_ref(),
            acceptance: self.acceptance.as_ref(),
            step_scale: self.step_scale,
            distribution: self.distribution,
            rng: &mut self.rng,
        };
        let proposal = self.strategy.propose(&mut ctx);
        debug!(
            "Run {}: iteration {} proposes {} ({:?})",
            self.run_id, self.iteration, proposal.position, proposal.origin
        );
        proposal
    }

    /// Apply a score to a proposal: judge it, update the current position,
    /// record it and advance the iteration counter.
    pub(crate) fn resolve(&mut self, proposal: Proposal, score: Score) -> Verdict {
        let score = if score.is_nan() {
            warn!(
                "Run {}: NaN score for {} treated as -inf",
                self.run_id, proposal.position
            );
            f64::NEG_INFINITY
        } else {
            score
        };

        let accepted = {
            let mut ctx = SearchContext {
                space: &self.space,
                memory: &self.memory,
                current: self.current.as_ref(),
                acceptance: self.acceptance.as_ref(),
                step_scale: self.step_scale,
                distribution: self.distribution,
                rng: &mut self.rng,
            };
            self.strategy.on_result(&mut ctx, &proposal, score)
        };
        // The first evaluation always becomes current.
        let accepted = accepted || self.current.is_none();

        let iteration = self.iteration;
        let record = EvaluationRecord::new(proposal.position, score, iteration);
        if accepted {
            self.current = Some(record.clone());
        }
        let new_best = self.memory.record(record);
        self.iteration += 1;

        if new_best {
            info!(
                "Run {}: new best {} at iteration {}",
                self.run_id, score, iteration
            );
        } else {
            debug!(
                "Run {}: iteration {} scored {} (accepted: {})",
                self.run_id, iteration, score, accepted
            );
        }

        Verdict {
            iteration,
            accepted,
            new_best,
        }
    }

    pub(crate) fn best(&self) -> Option<&EvaluationRecord> {
        self.memory.best()
    }

    pub(crate) fn current(&self) -> Option<&EvaluationRecord> {
        self.current.as_ref()
    }
}

/// Local search optimizer driven through the propose/evaluate protocol.
///
/// The caller owns the objective function:
///
/// ```
/// use ridge_optimizer::{Optimizer, OptimizerConfig, SearchSpace, StrategyConfig};
///
/// let space = SearchSpace::from_bounds(&[(-10.0, 10.0)]).unwrap();
/// let config = OptimizerConfig::new(StrategyConfig::HillClimbing)
///     .with_initial_position([5.0])
///     .with_seed(7);
/// let mut opt = Optimizer::from_config(space, config).unwrap();
///
/// let objective = |x: f64| -(x * x);
/// for i in 0..opt.n_initial() {
///     let p = opt.init_pos(i).unwrap();
///     opt.evaluate(objective(p[0])).unwrap();
/// }
/// for i in opt.n_initial()..50 {
///     let p = opt.iterate(i).unwrap();
///     opt.evaluate(objective(p[0])).unwrap();
/// }
/// assert!(opt.best().unwrap().score > -25.0);
/// ```
///
/// Protocol misuse (iterating with a proposal pending, evaluating with none,
/// out-of-order indices) returns a [`ProtocolError`] and leaves the optimizer
/// unchanged.
#[derive(Debug)]
pub struct Optimizer<S: ProposalStrategy = Box<dyn ProposalStrategy>> {
    core: SearchCore<S>,
    state: OptimizerState,
    pending: Option<Proposal>,
    next_init: usize,
}

impl Optimizer {
    /// Build an optimizer running the strategy named in `config`.
    pub fn from_config(space: SearchSpace, config: OptimizerConfig) -> RidgeResult<Self> {
        let strategy = config.strategy.build(&space);
        Self::new(space, config, strategy)
    }
}

impl<S: ProposalStrategy> Optimizer<S> {
    /// Build an optimizer with an explicit strategy. `config.strategy` is only
    /// used for validation (e.g. the tabu window against the history limit).
    pub fn new(space: SearchSpace, config: OptimizerConfig, strategy: S) -> RidgeResult<Self> {
        Ok(Self {
            core: SearchCore::new(space, config, strategy)?,
            state: OptimizerState::Uninitialized,
            pending: None,
            next_init: 0,
        })
    }

    /// Hand out the `nth_init`-th initial position.
    ///
    /// Must be called once per initial position, in order from 0, each
    /// followed by `evaluate`, before the first `iterate`.
    pub fn init_pos(&mut self, nth_init: usize) -> RidgeResult<Position> {
        self.check_not_pending()?;
        if nth_init >= self.core.n_initial() {
            return Err(ProtocolError::InitIndexOutOfRange {
                index: nth_init,
                available: self.core.n_initial(),
            }
            .into());
        }
        if nth_init != self.next_init {
            return Err(ProtocolError::InitOutOfOrder {
                expected: self.next_init,
                got: nth_init,
            }
            .into());
        }

        let proposal = self.core.initial_proposal(nth_init);
        let position = proposal.position.clone();
        self.next_init += 1;
        self.pending = Some(proposal);
        self.state = OptimizerState::ProposalPending;
        Ok(position)
    }

    /// Propose the next candidate. `nth_iter` must equal [`iteration`](Self::iteration).
    pub fn iterate(&mut self, nth_iter: usize) -> RidgeResult<Position> {
        self.check_not_pending()?;
        if self.next_init < self.core.n_initial() {
            return Err(ProtocolError::InitializationIncomplete {
                remaining: self.core.n_initial() - self.next_init,
            }
            .into());
        }
        if nth_iter != self.core.iteration() {
            return Err(ProtocolError::IterationMismatch {
                expected: self.core.iteration(),
                got: nth_iter,
            }
            .into());
        }

        let proposal = self.core.propose();
        let position = proposal.position.clone();
        self.pending = Some(proposal);
        self.state = OptimizerState::ProposalPending;
        Ok(position)
    }

    /// Resolve the pending proposal with its score.
    pub fn evaluate(&mut self, score: Score) -> RidgeResult<Verdict> {
        if self.state == OptimizerState::Terminal {
            return Err(ProtocolError::Terminated.into());
        }
        let proposal = self.pending.take().ok_or(ProtocolError::NothingPending)?;

        let verdict = self.core.resolve(proposal, score);
        self.state = if self.next_init < self.core.n_initial() {
            OptimizerState::Initializing
        } else {
            OptimizerState::Ready
        };
        Ok(verdict)
    }

    /// Stop the run, discarding any pending proposal, and return the best
    /// record. Every later protocol call fails with [`ProtocolError::Terminated`].
    pub fn finish(&mut self) -> Option<EvaluationRecord> {
        if self.state != OptimizerState::Terminal {
            self.state = OptimizerState::Terminal;
            self.pending = None;
            match self.core.best() {
                Some(best) => info!(
                    "Run {} finished after {} evaluations; best {} at {}",
                    self.core.run_id,
                    self.core.iteration(),
                    best.score,
                    best.position
                ),
                None => info!("Run {} finished without evaluations", self.core.run_id),
            }
        }
        self.core.best().cloned()
    }

    fn check_not_pending(&self) -> Result<(), ProtocolError> {
        match self.state {
            OptimizerState::Terminal => Err(ProtocolError::Terminated),
            OptimizerState::ProposalPending => Err(ProtocolError::ProposalPending {
                iteration: self.core.iteration(),
            }),
            _ => Ok(()),
        }
    }

    /// Best record so far (highest score, earliest on ties).
    pub fn best(&self) -> Option<&EvaluationRecord> {
        self.core.best()
    }

    /// Current position and its score.
    pub fn current(&self) -> Option<&EvaluationRecord> {
        self.core.current()
    }

    /// Position awaiting a score, if any.
    pub fn pending(&self) -> Option<&Position> {
        self.pending.as_ref().map(|p| &p.position)
    }

    pub fn memory(&self) -> &PositionMemory {
        &self.core.memory
    }

    pub fn space(&self) -> &SearchSpace {
        &self.core.space
    }

    pub fn strategy(&self) -> &S {
        &self.core.strategy
    }

    /// Number of evaluations resolved so far; the index `iterate` expects next.
    pub fn iteration(&self) -> usize {
        self.core.iteration()
    }

    /// Total number of initial positions to hand out through `init_pos`.
    pub fn n_initial(&self) -> usize {
        self.core.n_initial()
    }

    pub fn state(&self) -> OptimizerState {
        self.state
    }

    pub fn run_id(&self) -> RunId {
        self.core.run_id
    }

    /// The seed the random source was created from.
    pub fn seed(&self) -> u64 {
        self.core.seed
    }
}
