//! Exponential distribution sampled by inverse CDF

use super::parameters::{mean_variance, positive_values, Checks};
use super::{
    DataPoint, Distribution, DistributionFamily, DistributionKind, Example, Formula, Metadata,
    ParameterInfo, Parameters, PathState, Statistic, Validation,
};
use crate::error::FitError;
use crate::rng::UnitSource;

/// Rates below this are raised to it before sampling
pub const MIN_LAMBDA: f64 = 1e-5;
const DEFAULT_LAMBDA: f64 = 1.0;

#[derive(Debug, Clone)]
pub struct Exponential {
    parameters: Parameters,
}

fn lambda(p: &Parameters, year: u32) -> f64 {
    p.value("lambda", year, DEFAULT_LAMBDA).max(MIN_LAMBDA)
}

impl Distribution for Exponential {
    fn kind(&self) -> DistributionKind {
        Self::KIND
    }

    fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    fn sample(&self, year: u32, _state: &mut PathState, random: &mut dyn UnitSource) -> f64 {
        let u = random.next_unit();
        -(1.0 - u).ln() / lambda(&self.parameters, year)
    }

    fn formula(&self, statistic: Statistic) -> Option<Formula> {
        match statistic {
            Statistic::Mean | Statistic::StdDev => Some(|p, year| Some(1.0 / lambda(p, year))),
            Statistic::Skewness => Some(|_, _| Some(2.0)),
            Statistic::Kurtosis => Some(|_, _| Some(6.0)),
            Statistic::Min | Statistic::Max => None,
        }
    }
}

impl DistributionFamily for Exponential {
    const KIND: DistributionKind = DistributionKind::Exponential;

    fn from_parameters(parameters: Parameters) -> Self {
        Self { parameters }
    }

    fn validate(parameters: &Parameters) -> Validation {
        let mut checks = Checks::new(parameters);
        if checks.required("lambda") {
            checks.positive("lambda");
        }
        checks.finish()
    }

    fn fit_curve(points: &[DataPoint]) -> Result<Parameters, FitError> {
        let values = positive_values(points, "exponential")?;
        let (mean, _) = mean_variance(&values);
        Ok(Parameters::new().with("lambda", (1.0 / mean).max(MIN_LAMBDA)))
    }

    fn metadata() -> Metadata {
        Metadata {
            name: "Exponential",
            description: "Waiting time between independent events occurring at a constant rate",
            parameters: vec![ParameterInfo::required("lambda", "Event rate (> 0)")],
            examples: vec![Example {
                name: "Time to failure",
                description: "Component failing on average once every 5 years",
                parameters: Parameters::new().with("lambda", 0.2),
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
    fn test_lambda_floor() {
        let dist = Exponential::from_parameters(Parameters::new().with("lambda", 0.0));
        assert_eq!(dist.analytic(Statistic::Mean, 1), Some(Some(1.0 / MIN_LAMBDA)));
        // Zero rate is still invalid input; the floor only keeps sampling finite
        assert!(!Exponential::validate(dist.parameters()).is_valid);
    }

    #[test]
    fn test_sample_mean_converges() {
        let dist = Exponential::from_parameters(Parameters::new().with("lambda", 0.5));
        let mut rng = SimulationRng::new(17);
        let mut state = dist.initialize();
        let draws: Vec<f64> = (0..50_000).map(|_| dist.sample(1, &mut state, &mut rng)).collect();
        assert!(draws.iter().all(|v| *v >= 0.0));
        let (mean, _) = mean_variance(&draws);
        assert_relative_eq!(mean, 2.0, max_relative = 0.02);
    }

    #[test]
    fn test_fit() {
        let points = [
            DataPoint::new(1, 2.0),
            DataPoint::new(2, 6.0),
            DataPoint::new(3, -1.0),
        ];
        let fitted = Exponential::fit_curve(&points).unwrap();
        assert_relative_eq!(fitted.scalar("lambda").unwrap(), 0.25);
        assert_eq!(Exponential::fit_curve(&[]), Err(FitError::NoData));
    }
}
