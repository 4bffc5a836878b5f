//! Continuous uniform distribution on [min, max]

use super::parameters::{finite_values, Checks};
use super::{
    DataPoint, Distribution, DistributionFamily, DistributionKind, Example, Formula, Metadata,
    ParameterInfo, Parameters, PathState, Statistic, Validation,
};
use crate::error::FitError;
use crate::rng::UnitSource;

const DEFAULT_MIN: f64 = 0.0;
const DEFAULT_MAX: f64 = 1.0;

#[derive(Debug, Clone)]
pub struct Uniform {
    parameters: Parameters,
}

fn bounds(p: &Parameters, year: u32) -> (f64, f64) {
    (
        p.value("min", year, DEFAULT_MIN),
        p.value("max", year, DEFAULT_MAX),
    )
}

impl Distribution for Uniform {
    fn kind(&self) -> DistributionKind {
        Self::KIND
    }

    fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    fn sample(&self, year: u32, _state: &mut PathState, random: &mut dyn UnitSource) -> f64 {
        let (min, max) = bounds(&self.parameters, year);
        let value = min + (max - min) * random.next_unit();
        // Rounding in `max - min` can overshoot by an ulp
        if min < max {
            value.min(max)
        } else {
            value
        }
    }

    fn formula(&self, statistic: Statistic) -> Option<Formula> {
        match statistic {
            Statistic::Mean => Some(|p, year| {
                let (min, max) = bounds(p, year);
                Some((min + max) / 2.0)
            }),
            Statistic::StdDev => Some(|p, year| {
                let (min, max) = bounds(p, year);
                Some((max - min) / 12f64.sqrt())
            }),
            Statistic::Min => Some(|p, year| Some(bounds(p, year).0)),
            Statistic::Max => Some(|p, year| Some(bounds(p, year).1)),
            Statistic::Skewness => Some(|_, _| Some(0.0)),
            Statistic::Kurtosis => Some(|_, _| Some(-1.2)),
        }
    }
}

impl DistributionFamily for Uniform {
    const KIND: DistributionKind = DistributionKind::Uniform;

    fn from_parameters(parameters: Parameters) -> Self {
        Self { parameters }
    }

    fn validate(parameters: &Parameters) -> Validation {
        let mut checks = Checks::new(parameters);
        checks.required("min");
        checks.required("max");
        if checks.has_errors() {
            return checks.finish();
        }

        for year in parameters.years_of(&["min", "max"]) {
            let (min, max) = bounds(parameters, year);
            if min >= max {
                checks.push(format!(
                    "uniform requires min < max (year {}: min={}, max={})",
                    year, min, max
                ));
            }
        }
        checks.finish()
    }

    fn fit_curve(points: &[DataPoint]) -> Result<Parameters, FitError> {
        let values = finite_values(points)?;
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        if min >= max {
            return Err(FitError::Degenerate {
                distribution: "uniform",
                reason: format!("all data points equal {}", min),
            });
        }
        Ok(Parameters::new().with("min", min).with("max", max))
    }

    fn metadata() -> Metadata {
        Metadata {
            name: "Uniform",
            description: "Every value between min and max is equally likely",
            parameters: vec![
                ParameterInfo::required("min", "Lower bound"),
                ParameterInfo::required("max", "Upper bound"),
            ],
            examples: vec![Example {
                name: "Price range",
                description: "Electricity price anywhere between 40 and 60",
                parameters: Parameters::new().with("min", 40.0).with("max", 60.0),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SimulationRng;
    use proptest::prelude::*;

    #[test]
    fn test_validate_ordering() {
        assert!(Uniform::validate(&Parameters::new().with("min", 1.0).with("max", 2.0)).is_valid);

        let v = Uniform::validate(&Parameters::new().with("min", 2.0).with("max", 2.0));
        assert!(!v.is_valid);
        assert!(v.errors[0].contains("min < max"));
    }

    #[test]
    fn test_fit_uses_data_range() {
        let points = [
            DataPoint::new(1, 4.0),
            DataPoint::new(2, -2.0),
            DataPoint::new(3, 7.5),
        ];
        let fitted = Uniform::fit_curve(&points).unwrap();
        assert_eq!(fitted.scalar("min"), Some(-2.0));
        assert_eq!(fitted.scalar("max"), Some(7.5));

        let flat = [DataPoint::new(1, 3.0), DataPoint::new(2, 3.0)];
        assert!(matches!(Uniform::fit_curve(&flat), Err(FitError::Degenerate { .. })));
    }

    proptest! {
        #[test]
        fn samples_stay_within_bounds(
            min in -1.0e3f64..1.0e3,
            width in 1e-6f64..1.0e3,
            seed in any::<u64>(),
        ) {
            let max = min + width;
            let dist = Uniform::from_parameters(Parameters::new().with("min", min).with("max", max));
            let mut rng = SimulationRng::new(seed);
            let mut state = dist.initialize();
            for _ in 0..200 {
                let v = dist.sample(1, &mut state, &mut rng);
                prop_assert!(v >= min && v <= max);
            }
        }
    }
}
