//! Error types for curve fitting and simulation runs
//!
//! Parameter validation is not an error: it returns a [`crate::distributions::Validation`]
//! value so callers can collect every problem at once.

use thiserror::Error;

/// Failure while estimating distribution parameters from observed data
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitError {
    #[error("no data points supplied for curve fitting")]
    NoData,

    #[error("{distribution} fit requires positive values, none were supplied")]
    NoPositiveValues { distribution: &'static str },

    #[error("{distribution} fit requires at least {required} usable data points, found {found}")]
    InsufficientData {
        distribution: &'static str,
        required: usize,
        found: usize,
    },

    #[error("{distribution} fit is degenerate: {reason}")]
    Degenerate {
        distribution: &'static str,
        reason: String,
    },
}

/// Failure while preparing or running one distribution's simulation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("configuration error for {id}: {message}")]
    Configuration { id: String, message: String },

    #[error("unknown distribution type '{name}' for {id}")]
    UnknownDistribution { id: String, name: String },

    #[error("invalid simulation settings for {id}: {}", errors.join("; "))]
    InvalidSettings { id: String, errors: Vec<String> },

    #[error("invalid parameters for {id}: {}", errors.join("; "))]
    Validation { id: String, errors: Vec<String> },

    #[error("curve fit failed for {id}: {source}")]
    Fit {
        id: String,
        #[source]
        source: FitError,
    },

    #[error("simulation failed for {id} at iteration {iteration}, year {year}: sampled non-finite value {value}")]
    Sampling {
        id: String,
        iteration: usize,
        year: u32,
        value: f64,
    },

    #[error("simulation for {id} was cancelled after {completed} iterations")]
    Cancelled { id: String, completed: usize },
}

impl SimulationError {
    /// Identifier of the distribution entry the error belongs to
    pub fn distribution_id(&self) -> &str {
        match self {
            SimulationError::Configuration { id, .. }
            | SimulationError::UnknownDistribution { id, .. }
            | SimulationError::InvalidSettings { id, .. }
            | SimulationError::Validation { id, .. }
            | SimulationError::Fit { id, .. }
            | SimulationError::Sampling { id, .. }
            | SimulationError::Cancelled { id, .. } => id,
        }
    }
}
