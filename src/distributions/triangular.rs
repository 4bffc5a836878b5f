//! Triangular distribution sampled by inverse CDF

use super::parameters::{finite_values, mean_variance, Checks};
use super::{
    DataPoint, Distribution, DistributionFamily, DistributionKind, Example, Formula, Metadata,
    ParameterInfo, Parameters, PathState, Statistic, Validation,
};
use crate::error::FitError;
use crate::rng::UnitSource;

const DEFAULT_MIN: f64 = 0.0;
const DEFAULT_MODE: f64 = 0.5;
const DEFAULT_MAX: f64 = 1.0;

#[derive(Debug, Clone)]
pub struct Triangular {
    parameters: Parameters,
}

fn bounds(p: &Parameters, year: u32) -> (f64, f64, f64) {
    (
        p.value("min", year, DEFAULT_MIN),
        p.value("mode", year, DEFAULT_MODE),
        p.value("max", year, DEFAULT_MAX),
    )
}

/// `a² + b² + c² - ab - ac - bc`, eighteen times the variance
fn spread(min: f64, mode: f64, max: f64) -> f64 {
    min * min + mode * mode + max * max - min * mode - min * max - mode * max
}

impl Distribution for Triangular {
    fn kind(&self) -> DistributionKind {
        Self::KIND
    }

    fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Inverse CDF, branching at the normalised mode
    ///
    /// Misordered bounds or a zero-width range return `min` without drawing.
    fn sample(&self, year: u32, _state: &mut PathState, random: &mut dyn UnitSource) -> f64 {
        let (min, mode, max) = bounds(&self.parameters, year);
        if !(min <= mode && mode <= max) || max <= min {
            return min;
        }

        let range = max - min;
        let c = (mode - min) / range;
        let u = random.next_unit();
        let value = if u < c {
            min + (u * range * (mode - min)).sqrt()
        } else {
            max - ((1.0 - u) * range * (max - mode)).sqrt()
        };
        value.clamp(min, max)
    }

    fn formula(&self, statistic: Statistic) -> Option<Formula> {
        match statistic {
            Statistic::Mean => Some(|p, year| {
                let (min, mode, max) = bounds(p, year);
                Some((min + mode + max) / 3.0)
            }),
            Statistic::StdDev => Some(|p, year| {
                let (min, mode, max) = bounds(p, year);
                Some((spread(min, mode, max) / 18.0).sqrt())
            }),
            Statistic::Min => Some(|p, year| Some(bounds(p, year).0)),
            Statistic::Max => Some(|p, year| Some(bounds(p, year).2)),
            Statistic::Skewness => Some(|p, year| {
                let (a, c, b) = bounds(p, year);
                let s = spread(a, c, b);
                if s <= 0.0 {
                    return None;
                }
                let numerator = std::f64::consts::SQRT_2
                    * (a + b - 2.0 * c)
                    * (2.0 * a - b - c)
                    * (a - 2.0 * b + c);
                Some(numerator / (5.0 * s.powf(1.5)))
            }),
            Statistic::Kurtosis => Some(|_, _| Some(-0.6)),
        }
    }
}

impl DistributionFamily for Triangular {
    const KIND: DistributionKind = DistributionKind::Triangular;

    fn from_parameters(parameters: Parameters) -> Self {
        Self { parameters }
    }

    fn validate(parameters: &Parameters) -> Validation {
        let mut checks = Checks::new(parameters);
        checks.required("min");
        checks.required("mode");
        checks.required("max");
        if checks.has_errors() {
            return checks.finish();
        }

        for year in parameters.years_of(&["min", "mode", "max"]) {
            let (min, mode, max) = bounds(parameters, year);
            if !(min <= mode && mode <= max) {
                checks.push(format!(
                    "triangular requires min <= mode <= max (year {}: min={}, mode={}, max={})",
                    year, min, mode, max
                ));
            }
        }
        checks.finish()
    }

    fn fit_curve(points: &[DataPoint]) -> Result<Parameters, FitError> {
        let values = finite_values(points)?;
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let (mean, _) = mean_variance(&values);
        // mean = (min + mode + max) / 3
        let mode = (3.0 * mean - min - max).clamp(min, max);
        Ok(Parameters::new()
            .with("min", min)
            .with("mode", mode)
            .with("max", max))
    }

    fn metadata() -> Metadata {
        Metadata {
            name: "Triangular",
            description: "Bounded estimate from a minimum, most likely and maximum value",
            parameters: vec![
                ParameterInfo::required("min", "Lower bound"),
                ParameterInfo::required("mode", "Most likely value"),
                ParameterInfo::required("max", "Upper bound"),
            ],
            examples: vec![Example {
                name: "Construction delay",
                description: "Between 0 and 12 months, most likely 3",
                parameters: Parameters::new()
                    .with("min", 0.0)
                    .with("mode", 3.0)
                    .with("max", 12.0),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::testing::Scripted;
    use crate::rng::SimulationRng;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn triangular(min: f64, mode: f64, max: f64) -> Triangular {
        Triangular::from_parameters(
            Parameters::new()
                .with("min", min)
                .with("mode", mode)
                .with("max", max),
        )
    }

    #[test]
    fn test_invalid_ordering_is_reported_and_sample_degrades() {
        let dist = triangular(10.0, 5.0, 1.0);
        let v = Triangular::validate(dist.parameters());
        assert!(!v.is_valid);
        assert!(v.errors[0].contains("min <= mode <= max"));

        let mut source = Scripted::new(&[0.3]);
        let mut state = dist.initialize();
        assert_eq!(dist.sample(1, &mut state, &mut source), 10.0);
        assert_eq!(source.consumed, 0);
    }

    #[test]
    fn test_inverse_cdf_branches() {
        let dist = triangular(0.0, 5.0, 10.0);
        let mut state = dist.initialize();
        // Below c = 0.5: sqrt(u * 10 * 5)
        let mut source = Scripted::new(&[0.02]);
        assert_relative_eq!(dist.sample(1, &mut state, &mut source), 1.0, epsilon = 1e-12);
        // At c the two branches meet at the mode
        let mut source = Scripted::new(&[0.5]);
        assert_relative_eq!(dist.sample(1, &mut state, &mut source), 5.0, epsilon = 1e-12);
        // Above c: 10 - sqrt((1 - u) * 10 * 5)
        let mut source = Scripted::new(&[0.98]);
        assert_relative_eq!(dist.sample(1, &mut state, &mut source), 9.0, epsilon = 1e-12);
    }

    #[test]
    fn test_symmetric_moments() {
        let dist = triangular(0.0, 5.0, 10.0);
        assert_eq!(dist.analytic(Statistic::Mean, 1), Some(Some(5.0)));
        assert_relative_eq!(dist.analytic(Statistic::Skewness, 1).flatten().unwrap(), 0.0);
        assert_eq!(dist.analytic(Statistic::Min, 1), Some(Some(0.0)));
        assert_eq!(dist.analytic(Statistic::Max, 1), Some(Some(10.0)));
    }

    #[test]
    fn test_fit_places_mode_inside_range() {
        let points: Vec<DataPoint> = [1.0, 2.0, 2.0, 3.0, 9.0]
            .iter()
            .enumerate()
            .map(|(i, &v)| DataPoint::new(i as u32 + 1, v))
            .collect();
        let fitted = Triangular::fit_curve(&points).unwrap();
        assert_eq!(fitted.scalar("min"), Some(1.0));
        assert_eq!(fitted.scalar("max"), Some(9.0));
        assert!(Triangular::validate(&fitted).is_valid);
    }

    proptest! {
        #[test]
        fn samples_stay_within_bounds(
            min in -100.0f64..100.0,
            width in 0.001f64..100.0,
            mode_frac in 0.0f64..=1.0,
            seed in any::<u64>(),
        ) {
            let max = min + width;
            let mode = min + width * mode_frac;
            let dist = triangular(min, mode, max);
            let mut rng = SimulationRng::new(seed);
            let mut state = dist.initialize();
            for _ in 0..200 {
                let v = dist.sample(1, &mut state, &mut rng);
                prop_assert!(v >= min && v <= max, "{} outside [{}, {}]", v, min, max);
            }
        }
    }
}
