use crate::core::heating_systems::air_source_heat_pump::PerformanceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AshpError {
    #[error("Request was considered invalid due to error: {0}")]
    InvalidRequest(#[from] anyhow::Error),
    #[error("Error identified during calculation: {0}")]
    FailureInCalculation(#[from] CalculationError),
    #[error("Error while writing results: {0}")]
    ErrorInOutput(OutputError),
}

/// A fatal error evaluating one operating point, carrying the position of that
/// operating point in the input.
#[derive(Debug, Error)]
#[error("operating point {index}: {error}")]
pub struct CalculationError {
    index: usize,
    #[source]
    error: PerformanceError,
}

impl CalculationError {
    pub(crate) fn new(index: usize, error: PerformanceError) -> Self {
        Self { index, error }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn error(&self) -> &PerformanceError {
        &self.error
    }
}

#[derive(Debug, Error)]
#[error(transparent)]
pub struct OutputError {
    error: anyhow::Error,
}

impl OutputError {
    pub fn new(error: anyhow::Error) -> Self {
        Self { error }
    }
}
