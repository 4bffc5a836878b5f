//! Two-parameter Weibull distribution sampled by inverse CDF

use super::parameters::{mean_variance, positive_values, Checks};
use super::{
    DataPoint, Distribution, DistributionFamily, DistributionKind, Example, Formula, Metadata,
    ParameterInfo, Parameters, PathState, Statistic, Validation,
};
use crate::error::FitError;
use crate::rng::UnitSource;
use libm::tgamma;

const DEFAULT_SHAPE: f64 = 2.0;
const DEFAULT_SCALE: f64 = 1.0;
const FITTED_SHAPE_RANGE: (f64, f64) = (0.1, 50.0);

#[derive(Debug, Clone)]
pub struct Weibull {
    parameters: Parameters,
}

fn shape_scale(p: &Parameters, year: u32) -> (f64, f64) {
    (
        p.value("shape", year, DEFAULT_SHAPE),
        p.value("scale", year, DEFAULT_SCALE),
    )
}

/// Γ(1 + i/k) for i = 1..=4
fn gamma_terms(shape: f64) -> [f64; 4] {
    [1.0, 2.0, 3.0, 4.0].map(|i| tgamma(1.0 + i / shape))
}

impl Distribution for Weibull {
    fn kind(&self) -> DistributionKind {
        Self::KIND
    }

    fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    fn sample(&self, year: u32, _state: &mut PathState, random: &mut dyn UnitSource) -> f64 {
        let (shape, scale) = shape_scale(&self.parameters, year);
        let u = random.next_unit();
        scale * (-u.ln()).powf(1.0 / shape)
    }

    fn formula(&self, statistic: Statistic) -> Option<Formula> {
        match statistic {
            Statistic::Mean => Some(|p, year| {
                let (shape, scale) = shape_scale(p, year);
                Some(scale * tgamma(1.0 + 1.0 / shape))
            }),
            Statistic::StdDev => Some(|p, year| {
                let (shape, scale) = shape_scale(p, year);
                let [g1, g2, _, _] = gamma_terms(shape);
                Some(scale * (g2 - g1 * g1).max(0.0).sqrt())
            }),
            Statistic::Skewness => Some(|p, year| {
                let (shape, _) = shape_scale(p, year);
                let [g1, g2, g3, _] = gamma_terms(shape);
                let variance = g2 - g1 * g1;
                if variance <= 0.0 {
                    return None;
                }
                Some((2.0 * g1.powi(3) - 3.0 * g1 * g2 + g3) / variance.powf(1.5))
            }),
            Statistic::Kurtosis => Some(|p, year| {
                let (shape, _) = shape_scale(p, year);
                let [g1, g2, g3, g4] = gamma_terms(shape);
                let variance = g2 - g1 * g1;
                if variance <= 0.0 {
                    return None;
                }
                let numerator =
                    -6.0 * g1.powi(4) + 12.0 * g1 * g1 * g2 - 3.0 * g2 * g2 - 4.0 * g1 * g3 + g4;
                Some(numerator / (variance * variance))
            }),
            Statistic::Min | Statistic::Max => None,
        }
    }
}

impl DistributionFamily for Weibull {
    const KIND: DistributionKind = DistributionKind::Weibull;

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

    /// Moment fit using the Justus approximation `k = (sd / mean)^-1.086`
    fn fit_curve(points: &[DataPoint]) -> Result<Parameters, FitError> {
        let values = positive_values(points, "weibull")?;
        let (mean, variance) = mean_variance(&values);
        let cv = variance.sqrt() / mean;

        let (lo, hi) = FITTED_SHAPE_RANGE;
        let shape = if cv > 0.0 { cv.powf(-1.086).clamp(lo, hi) } else { hi };
        let scale = mean / tgamma(1.0 + 1.0 / shape);

        Ok(Parameters::new().with("shape", shape).with("scale", scale))
    }

    fn metadata() -> Metadata {
        Metadata {
            name: "Weibull",
            description: "Lifetimes and wind speeds; shape 1 reduces to the exponential",
            parameters: vec![
                ParameterInfo::required("shape", "Shape parameter k (> 0)"),
                ParameterInfo::required("scale", "Scale parameter lambda (> 0)"),
            ],
            examples: vec![Example {
                name: "Wind speed",
                description: "Typical onshore site, k = 2, scale 8 m/s",
                parameters: Parameters::new().with("shape", 2.0).with("scale", 8.0),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::{DistributionFamily, Exponential};
    use crate::rng::testing::Scripted;
    use crate::rng::SimulationRng;
    use approx::assert_relative_eq;

    fn weibull(shape: f64, scale: f64) -> Weibull {
        Weibull::from_parameters(Parameters::new().with("shape", shape).with("scale", scale))
    }

    #[test]
    fn test_inverse_cdf() {
        let dist = weibull(2.0, 3.0);
        let mut state = dist.initialize();
        let u = (-4.0f64).exp();
        let mut source = Scripted::new(&[u]);
        // 3 * (4)^(1/2)
        assert_relative_eq!(dist.sample(1, &mut state, &mut source), 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_shape_one_matches_exponential() {
        let scale = 4.0;
        let weibull = weibull(1.0, scale);
        let exponential =
            Exponential::from_parameters(Parameters::new().with("lambda", 1.0 / scale));

        // Shared draws: Weibull uses u, exponential uses 1 - u for the same quantile
        for &u in &[0.05, 0.3, 0.5, 0.77, 0.99] {
            let mut w_state = weibull.initialize();
            let mut e_state = exponential.initialize();
            let w = weibull.sample(1, &mut w_state, &mut Scripted::new(&[u]));
            let e = exponential.sample(1, &mut e_state, &mut Scripted::new(&[1.0 - u]));
            assert_relative_eq!(w, e, max_relative = 1e-9);
        }

        // Same analytic moments
        for stat in [Statistic::Mean, Statistic::StdDev, Statistic::Skewness, Statistic::Kurtosis] {
            let w = weibull.analytic(stat, 1).flatten().unwrap();
            let e = exponential.analytic(stat, 1).flatten().unwrap();
            assert_relative_eq!(w, e, max_relative = 1e-9);
        }

        // And the same sample mean in expectation
        let mut rng_w = SimulationRng::new(5);
        let mut rng_e = SimulationRng::new(5);
        let n = 20_000;
        let (mut sum_w, mut sum_e) = (0.0, 0.0);
        let mut w_state = weibull.initialize();
        let mut e_state = exponential.initialize();
        for _ in 0..n {
            sum_w += weibull.sample(1, &mut w_state, &mut rng_w);
            sum_e += exponential.sample(1, &mut e_state, &mut rng_e);
        }
        assert_relative_eq!(sum_w / n as f64, sum_e / n as f64, max_relative = 0.05);
    }

    #[test]
    fn test_samples_non_negative() {
        let dist = weibull(0.7, 2.0);
        let mut rng = SimulationRng::new(3);
        let mut state = dist.initialize();
        assert!((0..5_000).all(|_| dist.sample(1, &mut state, &mut rng) >= 0.0));
    }

    #[test]
    fn test_fit_clamps_shape() {
        let points = [DataPoint::new(1, 5.0), DataPoint::new(2, 5.0)];
        let fitted = Weibull::fit_curve(&points).unwrap();
        assert_eq!(fitted.scalar("shape"), Some(FITTED_SHAPE_RANGE.1));
        assert!(Weibull::validate(&fitted).is_valid);

        let points: Vec<DataPoint> = [3.0, 7.0, 9.0, 12.0, 5.5]
            .iter()
            .enumerate()
            .map(|(i, &v)| DataPoint::new(i as u32 + 1, v))
            .collect();
        let fitted = Weibull::fit_curve(&points).unwrap();
        let shape = fitted.scalar("shape").unwrap();
        assert!(shape > 1.0 && shape < 10.0, "shape = {}", shape);
        let mean = weibull(shape, fitted.scalar("scale").unwrap())
            .analytic(Statistic::Mean, 1)
            .flatten()
            .unwrap();
        assert_relative_eq!(mean, 7.3, max_relative = 1e-9);
    }
}
