//! Static table of known distribution types
//!
//! Every dispatch below is an exhaustive `match`, so a new variant cannot be
//! added to [`DistributionKind`] without wiring all of its operations.

use super::{
    DataPoint, Distribution, DistributionFamily, Exponential, Fixed, Gamma, Gbm, Kaimal,
    Lognormal, Metadata, Normal, Parameters, Poisson, Triangular, Uniform, Validation, Weibull,
};
use crate::error::FitError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributionKind {
    Normal,
    Lognormal,
    Triangular,
    Uniform,
    Weibull,
    Exponential,
    Poisson,
    Fixed,
    Kaimal,
    Gbm,
    Gamma,
}

impl DistributionKind {
    pub const ALL: [DistributionKind; 11] = [
        DistributionKind::Normal,
        DistributionKind::Lognormal,
        DistributionKind::Triangular,
        DistributionKind::Uniform,
        DistributionKind::Weibull,
        DistributionKind::Exponential,
        DistributionKind::Poisson,
        DistributionKind::Fixed,
        DistributionKind::Kaimal,
        DistributionKind::Gbm,
        DistributionKind::Gamma,
    ];

    /// Registered type name
    pub fn name(self) -> &'static str {
        match self {
            DistributionKind::Normal => "normal",
            DistributionKind::Lognormal => "lognormal",
            DistributionKind::Triangular => "triangular",
            DistributionKind::Uniform => "uniform",
            DistributionKind::Weibull => "weibull",
            DistributionKind::Exponential => "exponential",
            DistributionKind::Poisson => "poisson",
            DistributionKind::Fixed => "fixed",
            DistributionKind::Kaimal => "kaimal",
            DistributionKind::Gbm => "gbm",
            DistributionKind::Gamma => "gamma",
        }
    }

    /// Look up a type by name, ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }

    /// Names of every registered type
    pub fn list() -> Vec<&'static str> {
        Self::ALL.iter().map(|kind| kind.name()).collect()
    }

    pub fn build(self, parameters: Parameters) -> Box<dyn Distribution> {
        match self {
            DistributionKind::Normal => Box::new(Normal::from_parameters(parameters)),
            DistributionKind::Lognormal => Box::new(Lognormal::from_parameters(parameters)),
            DistributionKind::Triangular => Box::new(Triangular::from_parameters(parameters)),
            DistributionKind::Uniform => Box::new(Uniform::from_parameters(parameters)),
            DistributionKind::Weibull => Box::new(Weibull::from_parameters(parameters)),
            DistributionKind::Exponential => Box::new(Exponential::from_parameters(parameters)),
            DistributionKind::Poisson => Box::new(Poisson::from_parameters(parameters)),
            DistributionKind::Fixed => Box::new(Fixed::from_parameters(parameters)),
            DistributionKind::Kaimal => Box::new(Kaimal::from_parameters(parameters)),
            DistributionKind::Gbm => Box::new(Gbm::from_parameters(parameters)),
            DistributionKind::Gamma => Box::new(Gamma::from_parameters(parameters)),
        }
    }

    pub fn validate(self, parameters: &Parameters) -> Validation {
        match self {
            DistributionKind::Normal => Normal::validate(parameters),
            DistributionKind::Lognormal => Lognormal::validate(parameters),
            DistributionKind::Triangular => Triangular::validate(parameters),
            DistributionKind::Uniform => Uniform::validate(parameters),
            DistributionKind::Weibull => Weibull::validate(parameters),
            DistributionKind::Exponential => Exponential::validate(parameters),
            DistributionKind::Poisson => Poisson::validate(parameters),
            DistributionKind::Fixed => Fixed::validate(parameters),
            DistributionKind::Kaimal => Kaimal::validate(parameters),
            DistributionKind::Gbm => Gbm::validate(parameters),
            DistributionKind::Gamma => Gamma::validate(parameters),
        }
    }

    pub fn fit_curve(self, points: &[DataPoint]) -> Result<Parameters, FitError> {
        match self {
            DistributionKind::Normal => Normal::fit_curve(points),
            DistributionKind::Lognormal => Lognormal::fit_curve(points),
            DistributionKind::Triangular => Triangular::fit_curve(points),
            DistributionKind::Uniform => Uniform::fit_curve(points),
            DistributionKind::Weibull => Weibull::fit_curve(points),
            DistributionKind::Exponential => Exponential::fit_curve(points),
            DistributionKind::Poisson => Poisson::fit_curve(points),
            DistributionKind::Fixed => Fixed::fit_curve(points),
            DistributionKind::Kaimal => Kaimal::fit_curve(points),
            DistributionKind::Gbm => Gbm::fit_curve(points),
            DistributionKind::Gamma => Gamma::fit_curve(points),
        }
    }

    pub fn metadata(self) -> Metadata {
        match self {
            DistributionKind::Normal => Normal::metadata(),
            DistributionKind::Lognormal => Lognormal::metadata(),
            DistributionKind::Triangular => Triangular::metadata(),
            DistributionKind::Uniform => Uniform::metadata(),
            DistributionKind::Weibull => Weibull::metadata(),
            DistributionKind::Exponential => Exponential::metadata(),
            DistributionKind::Poisson => Poisson::metadata(),
            DistributionKind::Fixed => Fixed::metadata(),
            DistributionKind::Kaimal => Kaimal::metadata(),
            DistributionKind::Gbm => Gbm::metadata(),
            DistributionKind::Gamma => Gamma::metadata(),
        }
    }
}

impl fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
