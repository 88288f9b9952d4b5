//! Batch-parallel ask/tell front end over the same search core.

use std::collections::HashMap;
use std::fmt;

use parking_lot::Mutex;
use ridge_types::{EvaluationRecord, Position, ProtocolError, RidgeResult, Score};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::OptimizerConfig;
use crate::optimizer::{RunId, SearchCore, Verdict};
use crate::space::SearchSpace;
use crate::strategy::{Proposal, ProposalStrategy};

/// Opaque handle for an issued candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProposalId(u64);

impl ProposalId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug)]
struct BatchState<S> {
    core: SearchCore<S>,
    outstanding: HashMap<ProposalId, Proposal>,
    next_id: u64,
    next_init: usize,
    finished: bool,
}

impl<S: ProposalStrategy> BatchState<S> {
    fn issue(&mut self, proposal: Proposal) -> (ProposalId, Position) {
        let id = ProposalId(self.next_id);
        self.next_id += 1;
        let position = proposal.position.clone();
        self.outstanding.insert(id, proposal);
        (id, position)
    }
}

/// Optimizer variant that hands out several candidates at once and accepts
/// their scores in any order, from any thread.
///
/// Initial positions are issued first. Strategy proposals are only issued
/// once at least one score has been reported, since they are neighbors of the
/// current position. Each candidate is generated from the state at `ask` time
/// and judged against the state at `tell` time; iteration indices follow the
/// order in which scores arrive.
#[derive(Debug)]
pub struct BatchOptimizer<S: ProposalStrategy = Box<dyn ProposalStrategy>> {
    run_id: RunId,
    inner: Mutex<BatchState<S>>,
}

impl BatchOptimizer {
    pub fn from_config(space: SearchSpace, config: OptimizerConfig) -> RidgeResult<Self> {
        let strategy = config.strategy.build(&space);
        Self::new(space, config, strategy)
    }
}

impl<S: ProposalStrategy> BatchOptimizer<S> {
    pub fn new(space: SearchSpace, config: OptimizerConfig, strategy: S) -> RidgeResult<Self> {
        let core = SearchCore::new(space, config, strategy)?;
        Ok(Self {
            run_id: core.run_id(),
            inner: Mutex::new(BatchState {
                core,
                outstanding: HashMap::new(),
                next_id: 0,
                next_init: 0,
                finished: false,
            }),
        })
    }

    /// Issue up to `k` candidates. May return fewer (even none) while no
    /// score has been reported yet.
    pub fn ask(&self, k: usize) -> RidgeResult<Vec<(ProposalId, Position)>> {
        let mut state = self.inner.lock();
        if state.finished {
            return Err(ProtocolError::Terminated.into());
        }

        let mut issued = Vec::with_capacity(k);
        while issued.len() < k && state.next_init < state.core.n_initial() {
            let index = state.next_init;
            let proposal = state.core.initial_proposal(index);
            state.next_init += 1;
            issued.push(state.issue(proposal));
        }
        if state.core.has_current() {
            while issued.len() < k {
                let proposal = state.core.propose();
                issued.push(state.issue(proposal));
            }
        }

        debug!(
            "Run {}: issued {} of {} requested candidates ({} outstanding)",
            self.run_id,
            issued.len(),
            k,
            state.outstanding.len()
        );
        Ok(issued)
    }

    /// Report the score of an issued candidate.
    pub fn tell(&self, id: ProposalId, score: Score) -> RidgeResult<Verdict> {
        let mut state = self.inner.lock();
        if state.finished {
            return Err(ProtocolError::Terminated.into());
        }
        let proposal = state
            .outstanding
            .remove(&id)
            .ok_or(ProtocolError::UnknownProposal { id: id.as_u64() })?;
        Ok(state.core.resolve(proposal, score))
    }

    /// Ids of candidates issued but not yet scored, in issue order.
    pub fn pending(&self) -> Vec<ProposalId> {
        let state = self.inner.lock();
        let mut ids: Vec<ProposalId> = state.outstanding.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn best(&self) -> Option<EvaluationRecord> {
        self.inner.lock().core.best().cloned()
    }

    pub fn current(&self) -> Option<EvaluationRecord> {
        self.inner.lock().core.current().cloned()
    }

    /// Number of scores resolved so far.
    pub fn iteration(&self) -> usize {
        self.inner.lock().core.iteration()
    }

    pub fn n_initial(&self) -> usize {
        self.inner.lock().core.n_initial()
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Stop the run, dropping outstanding candidates, and return the best record.
    pub fn finish(&self) -> Option<EvaluationRecord> {
        let mut state = self.inner.lock();
        if !state.finished {
            state.finished = true;
            let dropped = state.outstanding.len();
            state.outstanding.clear();
            info!(
                "Run {} finished after {} evaluations ({} unscored candidates dropped)",
                self.run_id,
                state.core.iteration(),
                dropped
            );
        }
        state.core.best().cloned()
    }
}
