use thiserror::Error;

/// Main error type for the Ridge engine
#[derive(Error, Debug)]
pub enum RidgeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Invalid search space or optimizer settings, detected at construction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid bounds for dimension {dimension} ({name}): min {min} is greater than max {max}")]
    InvalidBounds {
        dimension: usize,
        name: String,
        min: f64,
        max: f64,
    },

    #[error("Non-finite bounds or width for dimension {dimension} ({name}): [{min}, {max}]")]
    NonFiniteBounds {
        dimension: usize,
        name: String,
        min: f64,
        max: f64,
    },

    #[error("Search space must have at least one dimension")]
    EmptySearchSpace,

    #[error("Invalid step for dimension {dimension} ({name}): {step} (must be finite and > 0)")]
    InvalidStep {
        dimension: usize,
        name: String,
        step: f64,
    },

    #[error("Invalid step scale: {step_scale} (must be finite and > 0)")]
    InvalidStepScale { step_scale: f64 },

    #[error("Stagnation threshold must be > 0")]
    InvalidStagnationThreshold,

    #[error("Tabu proposal attempts must be > 0")]
    InvalidMaxAttempts,

    #[error("History limit must be > 0 when set")]
    InvalidMaxHistory,

    #[error("History limit {max_history} is shorter than the tabu window {tabu_memory}")]
    HistoryShorterThanTabu {
        max_history: usize,
        tabu_memory: usize,
    },

    #[error("No initial positions: supply at least one explicit or random initial position")]
    NoInitialPositions,

    #[error("Initial position {index} has {actual} dimensions, search space has {expected}")]
    InitialPositionDimension {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Initial position {index}: value {value} in dimension {dimension} is outside [{min}, {max}]")]
    InitialPositionOutOfBounds {
        index: usize,
        dimension: usize,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Misuse of the propose/evaluate protocol by the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("A proposal is already pending at iteration {iteration}; call evaluate first")]
    ProposalPending { iteration: usize },

    #[error("No proposal is pending; call init_pos or iterate first")]
    NothingPending,

    #[error("Initial positions must be requested in order: expected index {expected}, got {got}")]
    InitOutOfOrder { expected: usize, got: usize },

    #[error("Initial position index {index} out of range: {available} available")]
    InitIndexOutOfRange { index: usize, available: usize },

    #[error("Initialization incomplete: {remaining} initial positions not yet evaluated")]
    InitializationIncomplete { remaining: usize },

    #[error("Iteration mismatch: expected {expected}, got {got}")]
    IterationMismatch { expected: usize, got: usize },

    #[error("Unknown or already resolved proposal: {id}")]
    UnknownProposal { id: u64 },

    #[error("Optimizer has been finished")]
    Terminated,
}

/// Result type alias for Ridge operations
pub type RidgeResult<T> = Result<T, RidgeError>;
