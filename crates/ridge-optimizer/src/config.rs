//! Optimizer and strategy configuration.

use ridge_types::{ConfigError, Position, RidgeResult};
use serde::{Deserialize, Serialize};

use crate::space::{NeighborDistribution, SearchSpace};
use crate::strategy::{
    HillClimbing, ProposalStrategy, RandomRestartHillClimbing, TabuSearch, DEFAULT_MAX_ATTEMPTS,
};

/// Default neighbor radius as a fraction of each dimension's width.
pub const DEFAULT_STEP_SCALE: f64 = 0.1;

/// Default stagnation threshold per search space dimension.
pub const STAGNATION_PER_DIMENSION: usize = 10;

fn default_max_attempts() -> usize {
    DEFAULT_MAX_ATTEMPTS
}

/// Which local search strategy to run, with its own settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategyConfig {
    HillClimbing,
    RandomRestart {
        /// Maximum number of restarts.
        n_restarts: usize,
        /// Rejections in a row before a restart. Defaults to
        /// `STAGNATION_PER_DIMENSION * dimensions`.
        #[serde(default)]
        stagnation_threshold: Option<usize>,
    },
    Tabu {
        /// Number of most recent positions that may not be re-proposed.
        tabu_memory: usize,
        /// Neighbors drawn before falling back to a tabu one.
        #[serde(default = "default_max_attempts")]
        max_attempts: usize,
    },
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self::HillClimbing
    }
}

impl StrategyConfig {
    pub fn random_restart(n_restarts: usize) -> Self {
        Self::RandomRestart {
            n_restarts,
            stagnation_threshold: None,
        }
    }

    pub fn tabu(tabu_memory: usize) -> Self {
        Self::Tabu {
            tabu_memory,
            max_attempts: default_max_attempts(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::HillClimbing => Ok(()),
            Self::RandomRestart {
                stagnation_threshold,
                ..
            } => match stagnation_threshold {
                Some(0) => Err(ConfigError::InvalidStagnationThreshold),
                _ => Ok(()),
            },
            Self::Tabu { max_attempts, .. } => {
                if *max_attempts == 0 {
                    Err(ConfigError::InvalidMaxAttempts)
                } else {
                    Ok(())
                }
            }
        }
    }

    /// The tabu window length, zero for non-tabu strategies.
    pub fn tabu_memory(&self) -> usize {
        match self {
            Self::Tabu { tabu_memory, .. } => *tabu_memory,
            _ => 0,
        }
    }

    /// Instantiate the configured strategy for `space`.
    pub fn build(&self, space: &SearchSpace) -> Box<dyn ProposalStrategy> {
        match self {
            Self::HillClimbing => Box::new(HillClimbing::new()),
            Self::RandomRestart {
                n_restarts,
                stagnation_threshold,
            } => {
                let threshold = stagnation_threshold
                    .unwrap_or(STAGNATION_PER_DIMENSION * space.dimensions());
                Box::new(RandomRestartHillClimbing::new(*n_restarts, threshold))
            }
            Self::Tabu {
                tabu_memory,
                max_attempts,
            } => Box::new(TabuSearch::with_max_attempts(*tabu_memory, *max_attempts)),
        }
    }
}

/// Top-level configuration for an optimizer run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Neighbor radius as a fraction of each dimension's width.
    pub step_scale: f64,

    /// How neighbor offsets are sampled.
    pub distribution: NeighborDistribution,

    pub strategy: StrategyConfig,

    /// Maximum number of records kept in the history (`None` = unbounded).
    pub max_history: Option<usize>,

    /// Seed for the random source. Drawn from the OS and logged when absent.
    pub random_seed: Option<u64>,

    /// Caller-supplied starting points, returned unchanged by `init_pos`.
    pub initial_positions: Vec<Position>,

    /// Extra random starting points requested after the explicit ones.
    pub n_random_init: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            step_scale: DEFAULT_STEP_SCALE,
            distribution: NeighborDistribution::Uniform,
            strategy: StrategyConfig::HillClimbing,
            max_history: None,
            random_seed: None,
            initial_positions: Vec::new(),
            n_random_init: 0,
        }
    }
}

impl OptimizerConfig {
    pub fn new(strategy: StrategyConfig) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    /// Parse a JSON configuration. Fields left out take their defaults.
    pub fn from_json(json: &str) -> RidgeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> RidgeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_step_scale(mut self, step_scale: f64) -> Self {
        self.step_scale = step_scale;
        self
    }

    pub fn with_distribution(mut self, distribution: NeighborDistribution) -> Self {
        self.distribution = distribution;
        self
    }

    pub fn with_strategy(mut self, strategy: StrategyConfig) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = Some(max_history);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_initial_position(mut self, position: impl Into<Position>) -> Self {
        self.initial_positions.push(position.into());
        self
    }

    pub fn with_initial_positions(mut self, positions: Vec<Position>) -> Self {
        self.initial_positions = positions;
        self
    }

    pub fn with_random_init(mut self, n: usize) -> Self {
        self.n_random_init = n;
        self
    }

    /// Total number of initial positions (explicit plus random).
    pub fn n_initial(&self) -> usize {
        self.initial_positions.len() + self.n_random_init
    }

    /// Check the configuration against the search space it will run on.
    pub fn validate(&self, space: &SearchSpace) -> Result<(), ConfigError> {
        if !self.step_scale.is_finite() || self.step_scale <= 0.0 {
            return Err(ConfigError::InvalidStepScale {
                step_scale: self.step_scale,
            });
        }

        self.strategy.validate()?;

        if let Some(max_history) = self.max_history {
            if max_history == 0 {
                return Err(ConfigError::InvalidMaxHistory);
            }
            let tabu_memory = self.strategy.tabu_memory();
            if max_history < tabu_memory {
                return Err(ConfigError::HistoryShorterThanTabu {
                    max_history,
                    tabu_memory,
                });
            }
        }

        if self.n_initial() == 0 {
            return Err(ConfigError::NoInitialPositions);
        }
        for (index, position) in self.initial_positions.iter().enumerate() {
            space.check_initial(index, position)?;
        }

        Ok(())
    }
}
