use thiserror::Error;

/// Rejected configuration. Fatal to the construction call that raised it,
/// nothing else.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("neuron count must be at least 1")]
    ZeroNeurons,
    #[error("sd_max must exceed the spread floor, got {0}")]
    InvalidSdMax(f64),
    #[error("spread must be positive and finite, got {0}")]
    InvalidSpread(f64),
    #[error("expected {expected} weights, got {got}")]
    WeightCount { expected: usize, got: usize },
    #[error("expected {expected} spreads, got {got}")]
    SpreadCount { expected: usize, got: usize },
    #[error("input range must be finite with min < max, got ({0}, {1})")]
    InvalidInputRange(f64, f64),
    #[error("training dataset is empty")]
    EmptyDataset,
    #[error("population size must be at least 1")]
    ZeroPopulation,
    #[error("iteration count must be at least 1")]
    ZeroIterations,
}
