//! # ridge-optimizer
//!
//! Black-box local search for Ridge.
//!
//! Provides search space definitions, position memory with a tabu window,
//! acceptance policies, and the propose/evaluate optimizer driving hill
//! climbing, random-restart hill climbing and tabu search. The caller owns the
//! objective: it asks for a position, scores it, and reports the score back.
//! `BatchOptimizer` does the same for several candidates at a time.

mod acceptance;
mod batch;
mod config;
mod memory;
mod optimizer;
mod space;
mod strategy;

pub use acceptance::{AcceptancePolicy, GreedyAscent};
pub use batch::{BatchOptimizer, ProposalId};
pub use config::{OptimizerConfig, StrategyConfig, DEFAULT_STEP_SCALE, STAGNATION_PER_DIMENSION};
pub use memory::PositionMemory;
pub use optimizer::{Optimizer, OptimizerState, RunId, Verdict};
pub use space::{Dimension, NeighborDistribution, SearchSpace, SearchSpaceBuilder};
pub use strategy::{
    HillClimbing, Proposal, ProposalOrigin, ProposalStrategy, RandomRestartHillClimbing,
    SearchContext, TabuSearch, DEFAULT_MAX_ATTEMPTS,
};

pub use ridge_types::{
    ConfigError, EvaluationRecord, Position, ProtocolError, RidgeError, RidgeResult, Score,
};
