//! Normal distribution with standard deviation expressed as a percent of the mean
//!
//! `value = mean + stdDev/100 * mean * z`, z drawn with Box-Muller.

use super::parameters::{finite_values, mean_variance, Checks};
use super::{
    DataPoint, Distribution, DistributionFamily, DistributionKind, Example, Formula, Metadata,
    ParameterInfo, Parameters, PathState, Statistic, Validation,
};
use crate::error::FitError;
use crate::rng::{standard_normal, UnitSource};

const DEFAULT_MEAN: f64 = 0.0;
const DEFAULT_STD_DEV_PCT: f64 = 10.0;

#[derive(Debug, Clone)]
pub struct Normal {
    parameters: Parameters,
}

fn mean(p: &Parameters, year: u32) -> f64 {
    p.value("mean", year, DEFAULT_MEAN)
}

fn std_dev(p: &Parameters, year: u32) -> f64 {
    mean(p, year).abs() * p.value("stdDev", year, DEFAULT_STD_DEV_PCT) / 100.0
}

impl Distribution for Normal {
    fn kind(&self) -> DistributionKind {
        Self::KIND
    }

    fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    fn sample(&self, year: u32, _state: &mut PathState, random: &mut dyn UnitSource) -> f64 {
        let mean = mean(&self.parameters, year);
        let pct = self.parameters.value("stdDev", year, DEFAULT_STD_DEV_PCT);
        mean + pct / 100.0 * mean * standard_normal(random)
    }

    fn formula(&self, statistic: Statistic) -> Option<Formula> {
        match statistic {
            Statistic::Mean => Some(|p, year| Some(mean(p, year))),
            Statistic::StdDev => Some(|p, year| Some(std_dev(p, year))),
            Statistic::Skewness => Some(|_, _| Some(0.0)),
            Statistic::Kurtosis => Some(|_, _| Some(0.0)),
            Statistic::Min | Statistic::Max => None,
        }
    }
}

impl DistributionFamily for Normal {
    const KIND: DistributionKind = DistributionKind::Normal;

    fn from_parameters(parameters: Parameters) -> Self {
        Self { parameters }
    }

    fn validate(parameters: &Parameters) -> Validation {
        let mut checks = Checks::new(parameters);
        checks.required("mean");
        if checks.required("stdDev") {
            checks.positive("stdDev");
        }
        checks.finish()
    }

    fn fit_curve(points: &[DataPoint]) -> Result<Parameters, FitError> {
        let values = finite_values(points)?;
        let (mean, variance) = mean_variance(&values);
        if mean.abs() < f64::EPSILON {
            return Err(FitError::Degenerate {
                distribution: "normal",
                reason: "stdDev is a percent of the mean, which is zero".to_string(),
            });
        }
        // A constant series still needs a positive spread to validate
        let pct = (variance.sqrt() / mean.abs() * 100.0).max(1e-6);
        Ok(Parameters::new().with("mean", mean).with("stdDev", pct))
    }

    fn metadata() -> Metadata {
        Metadata {
            name: "Normal",
            description: "Symmetric bell curve around the mean; spread given as a percent of the mean",
            parameters: vec![
                ParameterInfo::required("mean", "Expected value"),
                ParameterInfo::required("stdDev", "Standard deviation as a percent of the mean"),
            ],
            examples: vec![Example {
                name: "Energy yield",
                description: "Annual production of 100 units with 10% variability",
                parameters: Parameters::new().with("mean", 100.0).with("stdDev", 10.0),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SimulationRng;

    fn normal(mean: f64, pct: f64) -> Normal {
        Normal::from_parameters(Parameters::new().with("mean", mean).with("stdDev", pct))
    }

    #[test]
    fn test_validate() {
        assert!(Normal::validate(&Parameters::new().with("mean", 100.0).with("stdDev", 10.0)).is_valid);

        let v = Normal::validate(&Parameters::new().with("mean", 100.0).with("stdDev", 0.0));
        assert!(!v.is_valid);
        assert!(v.errors[0].contains("stdDev must be positive"));

        let v = Normal::validate(&Parameters::new());
        assert_eq!(v.errors.len(), 2);
    }

    #[test]
    fn test_convergence_to_analytic_moments() {
        let dist = normal(100.0, 10.0);
        let mut rng = SimulationRng::new(2024);
        let mut state = dist.initialize();
        let n = 50_000;
        let draws: Vec<f64> = (0..n).map(|_| dist.sample(1, &mut state, &mut rng)).collect();
        let (mean, variance) = mean_variance(&draws);

        let expected_mean = dist.analytic(Statistic::Mean, 1).flatten().unwrap();
        let expected_sd = dist.analytic(Statistic::StdDev, 1).flatten().unwrap();
        assert_eq!(expected_mean, 100.0);
        assert_eq!(expected_sd, 10.0);
        assert!((mean - expected_mean).abs() / expected_mean < 0.01, "mean = {}", mean);
        assert!((variance.sqrt() - expected_sd).abs() / expected_sd < 0.01, "sd = {}", variance.sqrt());
    }

    #[test]
    fn test_fit_recovers_percent_spread() {
        let points: Vec<DataPoint> = [90.0, 100.0, 110.0]
            .iter()
            .enumerate()
            .map(|(i, &v)| DataPoint::new(i as u32 + 1, v))
            .collect();
        let fitted = Normal::fit_curve(&points).unwrap();
        assert_eq!(fitted.scalar("mean"), Some(100.0));
        assert!((fitted.scalar("stdDev").unwrap() - 10.0).abs() < 1e-9);
        assert!(Normal::validate(&fitted).is_valid);

        assert_eq!(Normal::fit_curve(&[]), Err(FitError::NoData));
    }

    #[test]
    fn test_zero_mean_fit_is_rejected() {
        let points = [DataPoint::new(1, -1.0), DataPoint::new(2, 1.0)];
        assert!(matches!(Normal::fit_curve(&points), Err(FitError::Degenerate { .. })));
    }
}
