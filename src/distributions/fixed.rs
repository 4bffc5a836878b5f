//! Deterministic value with optional compound annual drift
//!
//! `value * (1 + drift/100)^(year - 1)`; year 1 is always the undrifted value.

use super::parameters::{finite_values, mean_variance, Checks};
use super::{
    DataPoint, Distribution, DistributionFamily, DistributionKind, Example, Formula, Metadata,
    ParameterInfo, Parameters, PathState, Statistic, Validation,
};
use crate::error::FitError;
use crate::rng::UnitSource;

const DEFAULT_VALUE: f64 = 0.0;
const DEFAULT_DRIFT: f64 = 0.0;
const FITTED_DRIFT_RANGE: (f64, f64) = (-99.0, 1000.0);

#[derive(Debug, Clone)]
pub struct Fixed {
    parameters: Parameters,
}

fn value_at(p: &Parameters, year: u32) -> f64 {
    let value = p.value("value", year, DEFAULT_VALUE);
    let drift = p.value("drift", year, DEFAULT_DRIFT);
    let periods = year.saturating_sub(1) as i32;
    value * (1.0 + drift / 100.0).powi(periods)
}

impl Distribution for Fixed {
    fn kind(&self) -> DistributionKind {
        Self::KIND
    }

    fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Consumes no random draws
    fn sample(&self, year: u32, _state: &mut PathState, _random: &mut dyn UnitSource) -> f64 {
        value_at(&self.parameters, year)
    }

    fn formula(&self, statistic: Statistic) -> Option<Formula> {
        match statistic {
            Statistic::Mean | Statistic::Min | Statistic::Max => {
                Some(|p, year| Some(value_at(p, year)))
            }
            Statistic::StdDev => Some(|_, _| Some(0.0)),
            Statistic::Skewness | Statistic::Kurtosis => None,
        }
    }
}

impl DistributionFamily for Fixed {
    const KIND: DistributionKind = DistributionKind::Fixed;

    fn from_parameters(parameters: Parameters) -> Self {
        Self { parameters }
    }

    fn validate(parameters: &Parameters) -> Validation {
        let mut checks = Checks::new(parameters);
        checks.required("value");
        if checks.optional("drift") {
            checks.at_least("drift", -100.0);
        }
        checks.finish()
    }

    /// Log-linear trend when at least two positive points in distinct years,
    /// otherwise the mean with no drift
    fn fit_curve(points: &[DataPoint]) -> Result<Parameters, FitError> {
        let values = finite_values(points)?;

        let trend: Vec<(f64, f64)> = points
            .iter()
            .filter(|p| p.value.is_finite() && p.value > 0.0)
            .map(|p| (p.year as f64, p.value.ln()))
            .collect();
        let distinct_years = {
            let mut years: Vec<u32> = points.iter().map(|p| p.year).collect();
            years.sort_unstable();
            years.dedup();
            years.len()
        };

        if trend.len() >= 2 && distinct_years >= 2 {
            let n = trend.len() as f64;
            let mean_x = trend.iter().map(|(x, _)| x).sum::<f64>() / n;
            let mean_y = trend.iter().map(|(_, y)| y).sum::<f64>() / n;
            let sxx: f64 = trend.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();
            let sxy: f64 = trend.iter().map(|(x, y)| (x - mean_x) * (y - mean_y)).sum();

            if sxx > 0.0 {
                let slope = sxy / sxx;
                let intercept = mean_y - slope * mean_x;
                let (lo, hi) = FITTED_DRIFT_RANGE;
                let drift = ((slope.exp() - 1.0) * 100.0).clamp(lo, hi);
                let value = (intercept + slope).exp();
                return Ok(Parameters::new().with("value", value).with("drift", drift));
            }
        }

        let (mean, _) = mean_variance(&values);
        Ok(Parameters::new().with("value", mean).with("drift", 0.0))
    }

    fn metadata() -> Metadata {
        Metadata {
            name: "Fixed",
            description: "Known value, optionally escalating by a fixed percent each year",
            parameters: vec![
                ParameterInfo::required("value", "Value in year 1"),
                ParameterInfo::optional("drift", "Annual escalation in percent", DEFAULT_DRIFT),
            ],
            examples: vec![Example {
                name: "Lease payment",
                description: "50 per year escalating 2% annually",
                parameters: Parameters::new().with("value", 50.0).with("drift", 2.0),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::testing::Scripted;
    use approx::assert_relative_eq;

    #[test]
    fn test_flat_value_every_year() {
        let dist = Fixed::from_parameters(Parameters::new().with("value", 50.0).with("drift", 0.0));
        let mut source = Scripted::new(&[0.5]);
        let mut state = dist.initialize();
        let path: Vec<f64> = (1..=5).map(|y| dist.sample(y, &mut state, &mut source)).collect();
        assert_eq!(path, vec![50.0; 5]);
        assert_eq!(source.consumed, 0);
    }

    #[test]
    fn test_drift_compounds_from_year_two() {
        let dist = Fixed::from_parameters(Parameters::new().with("value", 100.0).with("drift", 10.0));
        let mut source = Scripted::new(&[0.5]);
        let mut state = dist.initialize();
        assert_eq!(dist.sample(1, &mut state, &mut source), 100.0);
        assert_relative_eq!(dist.sample(3, &mut state, &mut source), 121.0, epsilon = 1e-9);
        assert_eq!(dist.analytic(Statistic::StdDev, 3), Some(Some(0.0)));
        assert_eq!(dist.analytic(Statistic::Skewness, 3), None);
    }

    #[test]
    fn test_validate() {
        assert!(Fixed::validate(&Parameters::new().with("value", 1.0)).is_valid);
        assert!(!Fixed::validate(&Parameters::new()).is_valid);
        assert!(!Fixed::validate(&Parameters::new().with("value", 1.0).with("drift", -150.0)).is_valid);
    }

    #[test]
    fn test_fit_recovers_growth() {
        let points: Vec<DataPoint> = (1..=5)
            .map(|year| DataPoint::new(year, 80.0 * 1.05f64.powi(year as i32 - 1)))
            .collect();
        let fitted = Fixed::fit_curve(&points).unwrap();
        assert_relative_eq!(fitted.scalar("value").unwrap(), 80.0, max_relative = 1e-9);
        assert_relative_eq!(fitted.scalar("drift").unwrap(), 5.0, max_relative = 1e-9);
    }

    #[test]
    fn test_fit_single_point_uses_mean() {
        let fitted = Fixed::fit_curve(&[DataPoint::new(4, -3.0)]).unwrap();
        assert_eq!(fitted.scalar("value"), Some(-3.0));
        assert_eq!(fitted.scalar("drift"), Some(0.0));
    }
}
