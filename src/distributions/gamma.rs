//! Gamma distribution (shape k, scale theta)
//!
//! Shape >= 1 uses the Marsaglia-Tsang rejection sampler. Shape < 1 draws
//! Gamma(k + 1) the same way and scales it by `exp(-E / k)`, E an exponential
//! draw, which equals the usual `U^(1/k)` boost. A sum of scaled exponentials
//! is exact only for integer shapes, so it is not used for the fractional case.

use super::parameters::{mean_variance, positive_values, Checks};
use super::{
    DataPoint, Distribution, DistributionFamily, DistributionKind, Example, Formula, Metadata,
    ParameterInfo, Parameters, PathState, Statistic, Validation,
};
use crate::error::FitError;
use crate::rng::{standard_normal, UnitSource};

const DEFAULT_SHAPE: f64 = 2.0;
const DEFAULT_SCALE: f64 = 1.0;
const FITTED_SHAPE_RANGE: (f64, f64) = (0.1, 100.0);
const MIN_FITTED_SCALE: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct Gamma {
    parameters: Parameters,
}

fn shape_scale(p: &Parameters, year: u32) -> (f64, f64) {
    (
        p.value("shape", year, DEFAULT_SHAPE),
        p.value("scale", year, DEFAULT_SCALE),
    )
}

/// Marsaglia-Tsang for shape >= 1
fn marsaglia_tsang(shape: f64, random: &mut dyn UnitSource) -> f64 {
    let d = shape - 1.0 / 3.0;
    let c = 1.0 / (9.0 * d).sqrt();

    loop {
        let x = standard_normal(random);
        let v = 1.0 + c * x;
        if v <= 0.0 {
            continue;
        }
        let v = v * v * v;
        let u = random.next_unit();

        // Squeeze, then the full log test
        if u < 1.0 - 0.0331 * x.powi(4) {
            return d * v;
        }
        if u.ln() < 0.5 * x * x + d * (1.0 - v + v.ln()) {
            return d * v;
        }
    }
}

/// Unit-scale gamma draw for any positive shape
pub(crate) fn standard_gamma(shape: f64, random: &mut dyn UnitSource) -> f64 {
    if shape <= 0.0 {
        return 0.0;
    }
    if shape >= 1.0 {
        return marsaglia_tsang(shape, random);
    }

    let boosted = marsaglia_tsang(shape + 1.0, random);
    let exponential = -random.next_unit().ln();
    boosted * (-exponential / shape).exp()
}

impl Distribution for Gamma {
    fn kind(&self) -> DistributionKind {
        Self::KIND
    }

    fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    fn sample(&self, year: u32, _state: &mut PathState, random: &mut dyn UnitSource) -> f64 {
        let (shape, scale) = shape_scale(&self.parameters, year);
        standard_gamma(shape, random) * scale
    }

    fn formula(&self, statistic: Statistic) -> Option<Formula> {
        match statistic {
            Statistic::Mean => Some(|p, year| {
                let (shape, scale) = shape_scale(p, year);
                Some(shape * scale)
            }),
            Statistic::StdDev => Some(|p, year| {
                let (shape, scale) = shape_scale(p, year);
                Some(shape.sqrt() * scale)
            }),
            Statistic::Skewness => Some(|p, year| {
                let (shape, _) = shape_scale(p, year);
                (shape > 0.0).then(|| 2.0 / shape.sqrt())
            }),
            Statistic::Kurtosis => Some(|p, year| {
                let (shape, _) = shape_scale(p, year);
                (shape > 0.0).then(|| 6.0 / shape)
            }),
            Statistic::Min | Statistic::Max => None,
        }
    }
}

impl DistributionFamily for Gamma {
    const KIND: DistributionKind = DistributionKind::Gamma;

    fn from_parameters(parameters: Parameters) -> Self {
        Self { parameters }
    }

    fn validate(parameters: &Parameters) -> Validation {
        let mut checks = Checks::new(parameters);
        for name in ["shape", "scale"] {
            if checks.required(name) {
                checks.positive(name);
            }
        }
        checks.finish()
    }

    /// Method of moments: `k = mean² / var`, `theta = var / mean`
    fn fit_curve(points: &[DataPoint]) -> Result<Parameters, FitError> {
        let values = positive_values(points, "gamma")?;
        let (mean, variance) = mean_variance(&values);

        let (lo, hi) = FITTED_SHAPE_RANGE;
        let shape = if variance > 0.0 {
            (mean * mean / variance).clamp(lo, hi)
        } else {
            hi
        };
        // Keep the fitted mean when the shape was clamped
        let scale = (mean / shape).max(MIN_FITTED_SCALE);
        if shape == lo || shape == hi {
            log::debug!("gamma fit clamped shape to {} (mean {}, variance {})", shape, mean, variance);
        }

        Ok(Parameters::new().with("shape", shape).with("scale", scale))
    }

    fn metadata() -> Metadata {
        Metadata {
            name: "Gamma",
            description: "Positive, right-skewed quantities such as repair durations or losses",
            parameters: vec![
                ParameterInfo::required("shape", "Shape parameter k (> 0)"),
                ParameterInfo::required("scale", "Scale parameter theta (> 0)"),
            ],
            examples: vec![Example {
                name: "Downtime days",
                description: "Mean of 10 days with moderate skew",
                parameters: Parameters::new().with("shape", 4.0).with("scale", 2.5),
            }],
        }
    }
}
