//! Simulation runs over a set of distributions
//!
//! - `settings`: request envelope and shared/per-entry settings
//! - `worker`: one distribution's iteration × year loop
//! - `stats`: running moments and statistics series
//! - `engine`: per-entry seeding, partial failure, optional parallelism
//! - `results`: response structures

mod engine;
mod results;
mod settings;
mod stats;
mod worker;

pub use engine::{CancellationToken, EngineOptions, MonteCarloEngine};
pub use results::{PercentileSeries, SimulationInfo, SimulationResponse};
pub use settings::{
    DistributionConfig, PercentileSpec, Seed, SettingsOverride, SimulationRequest,
    SimulationSettings,
};
pub use stats::{RunningStats, SeriesPoint, StatisticsSeries};
pub use worker::{InitializedWorker, ProcessedRun, SimulationWorker};
