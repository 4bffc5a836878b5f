//! Probability distributions sampled by the simulation worker
//!
//! Each variant lives in its own file and implements two traits:
//! - [`Distribution`]: the per-instance sampling contract used inside the
//!   iteration/year loop, plus optional analytic formula providers.
//! - [`DistributionFamily`]: the static side (construction, validation,
//!   curve fitting, metadata) dispatched through [`DistributionKind`].
//!
//! Path-dependent variants keep their running value in a caller-owned
//! [`PathState`], never inside the distribution itself.

mod parameters;
mod registry;

mod exponential;
mod fixed;
mod gamma;
mod gbm;
mod kaimal;
mod lognormal;
mod normal;
mod poisson;
mod triangular;
mod uniform;
mod weibull;

pub use parameters::{DataPoint, Parameter, Parameters, Validation};
pub use registry::DistributionKind;

pub use exponential::Exponential;
pub use fixed::Fixed;
pub use gamma::Gamma;
pub use gbm::Gbm;
pub use kaimal::Kaimal;
pub use lognormal::Lognormal;
pub use normal::Normal;
pub use poisson::Poisson;
pub use triangular::Triangular;
pub use uniform::Uniform;
pub use weibull::Weibull;

use crate::error::FitError;
use crate::rng::UnitSource;
use serde::Serialize;
use std::fmt;

/// Summary statistic reported per year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Statistic {
    Mean,
    StdDev,
    Min,
    Max,
    Skewness,
    Kurtosis,
}

impl Statistic {
    pub const ALL: [Statistic; 6] = [
        Statistic::Mean,
        Statistic::StdDev,
        Statistic::Min,
        Statistic::Max,
        Statistic::Skewness,
        Statistic::Kurtosis,
    ];
}

/// Analytic statistic for a parameter set at a given year (`None` = undefined)
pub type Formula = fn(&Parameters, u32) -> Option<f64>;

/// Simulation context for one iteration's path through the years
///
/// Created by [`Distribution::initialize`] at the start of every iteration and
/// threaded through `update_year`/`sample` for each year in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathState {
    /// Value simulated for the previous year, if any
    pub last_value: Option<f64>,
}

/// Sampling contract shared by every distribution variant
pub trait Distribution: fmt::Debug + Send + Sync {
    /// Registry entry this instance was built from
    fn kind(&self) -> DistributionKind;

    /// Parameters the instance samples with
    fn parameters(&self) -> &Parameters;

    /// Fresh path state for a new iteration
    fn initialize(&self) -> PathState {
        PathState::default()
    }

    /// Hook run once per (iteration, year) before `sample`
    fn update_year(&self, _year: u32, _state: &mut PathState) {}

    /// Draw one value for `year`, using `random` as the only source of randomness
    fn sample(&self, year: u32, state: &mut PathState, random: &mut dyn UnitSource) -> f64;

    /// Analytic provider for a statistic, if this variant has a closed form
    fn formula(&self, _statistic: Statistic) -> Option<Formula> {
        None
    }

    /// Evaluate the analytic provider for `statistic` at `year`
    ///
    /// Outer `None` means no provider (use the numeric fallback); inner `None`
    /// means the provider reports the statistic as undefined.
    fn analytic(&self, statistic: Statistic, year: u32) -> Option<Option<f64>> {
        self.formula(statistic)
            .map(|formula| formula(self.parameters(), year))
    }
}

/// Static operations every variant provides
pub trait DistributionFamily: Distribution + Sized {
    const KIND: DistributionKind;

    fn from_parameters(parameters: Parameters) -> Self;

    /// Check parameter presence, positivity and ordering constraints
    fn validate(parameters: &Parameters) -> Validation;

    /// Estimate parameters from observed `(year, value)` points
    fn fit_curve(points: &[DataPoint]) -> Result<Parameters, FitError>;

    fn metadata() -> Metadata;
}

/// Descriptive information about a distribution type
#[derive(Debug, Clone, Serialize)]
pub struct Metadata {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Vec<ParameterInfo>,
    pub examples: Vec<Example>,
}

/// One documented parameter of a distribution type
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<f64>,
}

impl ParameterInfo {
    pub(crate) fn required(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            required: true,
            default: None,
        }
    }

    pub(crate) fn optional(name: &'static str, description: &'static str, default: f64) -> Self {
        Self {
            name,
            description,
            required: false,
            default: Some(default),
        }
    }
}

/// Example parameter set shown alongside the metadata
#[derive(Debug, Clone, Serialize)]
pub struct Example {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Parameters,
}
