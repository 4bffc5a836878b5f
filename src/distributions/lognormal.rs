//! Lognormal distribution parameterised in log space (`mu`, `sigma`)

use super::parameters::{mean_variance, positive_values, Checks};
use super::{
    DataPoint, Distribution, DistributionFamily, DistributionKind, Example, Formula, Metadata,
    ParameterInfo, Parameters, PathState, Statistic, Validation,
};
use crate::error::FitError;
use crate::rng::{standard_normal, UnitSource};

const DEFAULT_MU: f64 = 0.0;
const DEFAULT_SIGMA: f64 = 0.5;
const MIN_FITTED_SIGMA: f64 = 1e-3;

#[derive(Debug, Clone)]
pub struct Lognormal {
    parameters: Parameters,
}

fn mu_sigma(p: &Parameters, year: u32) -> (f64, f64) {
    (
        p.value("mu", year, DEFAULT_MU),
        p.value("sigma", year, DEFAULT_SIGMA),
    )
}

impl Distribution for Lognormal {
    fn kind(&self) -> DistributionKind {
        Self::KIND
    }

    fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    fn sample(&self, year: u32, _state: &mut PathState, random: &mut dyn UnitSource) -> f64 {
        let (mu, sigma) = mu_sigma(&self.parameters, year);
        (mu + sigma * standard_normal(random)).exp()
    }

    fn formula(&self, statistic: Statistic) -> Option<Formula> {
        match statistic {
            Statistic::Mean => Some(|p, year| {
                let (mu, sigma) = mu_sigma(p, year);
                Some((mu + sigma * sigma / 2.0).exp())
            }),
            Statistic::StdDev => Some(|p, year| {
                let (mu, sigma) = mu_sigma(p, year);
                let s2 = sigma * sigma;
                Some(((s2.exp() - 1.0) * (2.0 * mu + s2).exp()).sqrt())
            }),
            Statistic::Skewness => Some(|p, year| {
                let (_, sigma) = mu_sigma(p, year);
                let e = (sigma * sigma).exp();
                Some((e + 2.0) * (e - 1.0).sqrt())
            }),
            Statistic::Kurtosis => Some(|p, year| {
                let (_, sigma) = mu_sigma(p, year);
                let s2 = sigma * sigma;
                Some((4.0 * s2).exp() + 2.0 * (3.0 * s2).exp() + 3.0 * (2.0 * s2).exp() - 6.0)
            }),
            Statistic::Min | Statistic::Max => None,
        }
    }
}

impl DistributionFamily for Lognormal {
    const KIND: DistributionKind = DistributionKind::Lognormal;

    fn from_parameters(parameters: Parameters) -> Self {
        Self { parameters }
    }

    fn validate(parameters: &Parameters) -> Validation {
        let mut checks = Checks::new(parameters);
        checks.required("mu");
        if checks.required("sigma") {
            checks.positive("sigma");
        }
        checks.finish()
    }

    fn fit_curve(points: &[DataPoint]) -> Result<Parameters, FitError> {
        let logs: Vec<f64> = positive_values(points, "lognormal")?
            .into_iter()
            .map(f64::ln)
            .collect();
        let (mu, variance) = mean_variance(&logs);
        let sigma = variance.sqrt().max(MIN_FITTED_SIGMA);
        Ok(Parameters::new().with("mu", mu).with("sigma", sigma))
    }

    fn metadata() -> Metadata {
        Metadata {
            name: "Lognormal",
            description: "Right-skewed positive values whose logarithm is normally distributed",
            parameters: vec![
                ParameterInfo::required("mu", "Mean of the underlying normal (log space)"),
                ParameterInfo::required("sigma", "Standard deviation of the underlying normal (log space)"),
            ],
            examples: vec![Example {
                name: "Repair cost",
                description: "Median cost of about 1,000 with heavy right tail",
                parameters: Parameters::new().with("mu", 6.9).with("sigma", 0.6),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SimulationRng;
    use approx::assert_relative_eq;

    #[test]
    fn test_samples_are_positive_and_converge() {
        let dist = Lognormal::from_parameters(Parameters::new().with("mu", 1.0).with("sigma", 0.25));
        let mut rng = SimulationRng::new(11);
        let mut state = dist.initialize();
        let draws: Vec<f64> = (0..40_000).map(|_| dist.sample(1, &mut state, &mut rng)).collect();
        assert!(draws.iter().all(|v| *v > 0.0));

        let (mean, _) = mean_variance(&draws);
        let expected = dist.analytic(Statistic::Mean, 1).flatten().unwrap();
        assert_relative_eq!(mean, expected, max_relative = 0.01);
    }

    #[test]
    fn test_fit_on_log_values() {
        let points: Vec<DataPoint> = [1.0f64, std::f64::consts::E, 0.0, -3.0]
            .iter()
            .enumerate()
            .map(|(i, &v)| DataPoint::new(i as u32 + 1, v))
            .collect();
        let fitted = Lognormal::fit_curve(&points).unwrap();
        // Non-positive values are discarded; ln values are 0 and 1
        assert_relative_eq!(fitted.scalar("mu").unwrap(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(fitted.scalar("sigma").unwrap(), 0.5f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_fit_requires_positive_values() {
        let points = [DataPoint::new(1, 0.0), DataPoint::new(2, -1.0)];
        assert_eq!(
            Lognormal::fit_curve(&points),
            Err(FitError::NoPositiveValues { distribution: "lognormal" })
        );
    }

    #[test]
    fn test_sigma_must_be_positive() {
        let v = Lognormal::validate(&Parameters::new().with("mu", 0.0).with("sigma", -0.1));
        assert!(!v.is_valid);
    }
}
