//! Poisson distribution sampled with Knuth's product method
//!
//! Uniforms are multiplied until the product drops to `e^-lambda`. Large rates
//! are absorbed in steps of [`STEP`] so `e^-lambda` never underflows; for
//! `lambda <= STEP` this is exactly Knuth's algorithm.

use super::parameters::{finite_values, mean_variance, Checks};
use super::{
    DataPoint, Distribution, DistributionFamily, DistributionKind, Example, Formula, Metadata,
    ParameterInfo, Parameters, PathState, Statistic, Validation,
};
use crate::error::FitError;
use crate::rng::UnitSource;

const STEP: f64 = 500.0;
const DEFAULT_LAMBDA: f64 = 1.0;

#[derive(Debug, Clone)]
pub struct Poisson {
    parameters: Parameters,
}

fn lambda(p: &Parameters, year: u32) -> f64 {
    p.value("lambda", year, DEFAULT_LAMBDA).max(0.0)
}

fn knuth(lambda: f64, random: &mut dyn UnitSource) -> u64 {
    let mut remaining = lambda;
    let mut product = 1.0;
    let mut k: u64 = 0;

    loop {
        k += 1;
        product *= random.next_unit();
        while product < 1.0 && remaining > 0.0 {
            if remaining > STEP {
                product *= STEP.exp();
                remaining -= STEP;
            } else {
                product *= remaining.exp();
                remaining = 0.0;
            }
        }
        if product <= 1.0 {
            return k - 1;
        }
    }
}

impl Distribution for Poisson {
    fn kind(&self) -> DistributionKind {
        Self::KIND
    }

    fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    fn sample(&self, year: u32, _state: &mut PathState, random: &mut dyn UnitSource) -> f64 {
        knuth(lambda(&self.parameters, year), random) as f64
    }

    fn formula(&self, statistic: Statistic) -> Option<Formula> {
        match statistic {
            Statistic::Mean => Some(|p, year| Some(lambda(p, year))),
            Statistic::StdDev => Some(|p, year| Some(lambda(p, year).sqrt())),
            Statistic::Skewness => Some(|p, year| {
                let l = lambda(p, year);
                (l > 0.0).then(|| 1.0 / l.sqrt())
            }),
            Statistic::Kurtosis => Some(|p, year| {
                let l = lambda(p, year);
                (l > 0.0).then(|| 1.0 / l)
            }),
            Statistic::Min | Statistic::Max => None,
        }
    }
}

impl DistributionFamily for Poisson {
    const KIND: DistributionKind = DistributionKind::Poisson;

    fn from_parameters(parameters: Parameters) -> Self {
        Self { parameters }
    }

    /// Zero is a valid rate (every draw is 0)
    fn validate(parameters: &Parameters) -> Validation {
        let mut checks = Checks::new(parameters);
        if checks.required("lambda") {
            checks.non_negative("lambda");
        }
        checks.finish()
    }

    fn fit_curve(points: &[DataPoint]) -> Result<Parameters, FitError> {
        let counts: Vec<f64> = finite_values(points)?
            .into_iter()
            .filter(|v| *v >= 0.0)
            .collect();
        if counts.is_empty() {
            return Err(FitError::Degenerate {
                distribution: "poisson",
                reason: "no non-negative counts in data".to_string(),
            });
        }
        let (mean, _) = mean_variance(&counts);
        Ok(Parameters::new().with("lambda", mean))
    }

    fn metadata() -> Metadata {
        Metadata {
            name: "Poisson",
            description: "Number of independent events per year at a constant average rate",
            parameters: vec![ParameterInfo::required("lambda", "Average events per year (>= 0)")],
            examples: vec![Example {
                name: "Major component failures",
                description: "On average 1.5 failures per year across the fleet",
                parameters: Parameters::new().with("lambda", 1.5),
            }],
        }
    }
}
