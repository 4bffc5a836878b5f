//! Monte Carlo Core - seeded simulation of yearly value distributions
//!
//! This library provides:
//! - Eleven parametric distributions with validation, curve fitting and metadata
//! - A per-distribution worker producing yearly percentile series and statistics
//! - An engine that isolates entries from each other (seeding and failures)
//! - Percentile and one-pass moment utilities

pub mod distributions;
pub mod error;
pub mod loader;
pub mod percentile;
pub mod rng;
pub mod simulation;

// Re-export commonly used types
pub use distributions::{DataPoint, Distribution, DistributionKind, Parameter, Parameters, Statistic, Validation};
pub use error::{FitError, SimulationError};
pub use simulation::{
    CancellationToken, DistributionConfig, EngineOptions, MonteCarloEngine, SimulationRequest,
    SimulationResponse, SimulationSettings,
};
