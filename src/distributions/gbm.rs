//! Geometric Brownian motion path across years
//!
//! Year 1 is the initial value. Each later year advances the previous year's
//! value by `exp((mu - sigma²/2) * dt + sigma * sqrt(dt) * z)`, with `drift`
//! and `volatility` given in percent per year.

use super::parameters::{mean_variance, Checks};
use super::{
    DataPoint, Distribution, DistributionFamily, DistributionKind, Example, Formula, Metadata,
    ParameterInfo, Parameters, PathState, Statistic, Validation,
};
use crate::error::FitError;
use crate::rng::{standard_normal, UnitSource};

const DEFAULT_VALUE: f64 = 1.0;
const DEFAULT_DRIFT: f64 = 0.0;
const DEFAULT_VOLATILITY: f64 = 10.0;
const DEFAULT_TIME_STEP: f64 = 1.0;
const MIN_FITTED_VOLATILITY: f64 = 0.01;

#[derive(Debug, Clone)]
pub struct Gbm {
    parameters: Parameters,
}

fn initial_value(p: &Parameters) -> f64 {
    p.value("value", 1, DEFAULT_VALUE)
}

/// (mu, sigma, dt) as decimals for `year`
fn dynamics(p: &Parameters, year: u32) -> (f64, f64, f64) {
    (
        p.value("drift", year, DEFAULT_DRIFT) / 100.0,
        p.value("volatility", year, DEFAULT_VOLATILITY) / 100.0,
        p.value("timeStep", year, DEFAULT_TIME_STEP),
    )
}

/// Mean and standard deviation of the path value at `year`
fn path_moments(p: &Parameters, year: u32) -> (f64, f64) {
    let (mu, sigma, dt) = dynamics(p, year);
    let t = year.saturating_sub(1) as f64 * dt;
    let mean = initial_value(p) * (mu * t).exp();
    let sd = mean.abs() * ((sigma * sigma * t).exp() - 1.0).sqrt();
    (mean, sd)
}

impl Gbm {
    /// One step of the path recursion for a given standard normal draw
    pub fn step(&self, last_value: f64, year: u32, z: f64) -> f64 {
        let (mu, sigma, dt) = dynamics(&self.parameters, year);
        last_value * ((mu - sigma * sigma / 2.0) * dt + sigma * dt.sqrt() * z).exp()
    }
}

impl Distribution for Gbm {
    fn kind(&self) -> DistributionKind {
        Self::KIND
    }

    fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    fn initialize(&self) -> PathState {
        PathState {
            last_value: Some(initial_value(&self.parameters)),
        }
    }

    fn update_year(&self, year: u32, state: &mut PathState) {
        if year == 1 {
            state.last_value = Some(initial_value(&self.parameters));
        }
    }

    fn sample(&self, year: u32, state: &mut PathState, random: &mut dyn UnitSource) -> f64 {
        let last = state
            .last_value
            .unwrap_or_else(|| initial_value(&self.parameters));
        if year <= 1 {
            state.last_value = Some(last);
            return last;
        }

        let next = self.step(last, year, standard_normal(random));
        state.last_value = Some(next);
        next
    }

    fn formula(&self, statistic: Statistic) -> Option<Formula> {
        match statistic {
            Statistic::Mean => Some(|p, year| Some(path_moments(p, year).0)),
            Statistic::StdDev => Some(|p, year| Some(path_moments(p, year).1)),
            _ => None,
        }
    }
}

impl DistributionFamily for Gbm {
    const KIND: DistributionKind = DistributionKind::Gbm;

    fn from_parameters(parameters: Parameters) -> Self {
        Self { parameters }
    }

    fn validate(parameters: &Parameters) -> Validation {
        let mut checks = Checks::new(parameters);
        if checks.required("value") {
            checks.positive("value");
        }
        checks.required("drift");
        if checks.required("volatility") {
            checks.positive("volatility");
        }
        if checks.optional("timeStep") {
            checks.positive("timeStep");
        }
        checks.finish()
    }

    /// Drift and volatility from annualised log returns between consecutive points
    fn fit_curve(points: &[DataPoint]) -> Result<Parameters, FitError> {
        if points.is_empty() {
            return Err(FitError::NoData);
        }

        let mut path: Vec<DataPoint> = points
            .iter()
            .copied()
            .filter(|p| p.value.is_finite() && p.value > 0.0)
            .collect();
        if path.is_empty() {
            return Err(FitError::NoPositiveValues { distribution: "gbm" });
        }
        path.sort_by_key(|p| p.year);
        path.dedup_by_key(|p| p.year);
        if path.len() < 2 {
            return Err(FitError::InsufficientData {
                distribution: "gbm",
                required: 2,
                found: path.len(),
            });
        }

        let returns: Vec<f64> = path
            .windows(2)
            .map(|pair| (pair[1].value / pair[0].value).ln() / (pair[1].year - pair[0].year) as f64)
            .collect();
        let (mean_return, variance) = mean_variance(&returns);
        let sigma = variance.sqrt();
        let mu = mean_return + sigma * sigma / 2.0;

        Ok(Parameters::new()
            .with("value", path[0].value)
            .with("drift", mu * 100.0)
            .with("volatility", (sigma * 100.0).max(MIN_FITTED_VOLATILITY))
            .with("timeStep", DEFAULT_TIME_STEP))
    }

    fn metadata() -> Metadata {
        Metadata {
            name: "GBM",
            description: "Geometric Brownian motion: a price path with drift and volatility, continuous across years",
            parameters: vec![
                ParameterInfo::required("value", "Value in year 1 (> 0)"),
                ParameterInfo::required("drift", "Expected growth rate in percent per year"),
                ParameterInfo::required("volatility", "Volatility in percent per year (> 0)"),
                ParameterInfo::optional("timeStep", "Years between simulated points", DEFAULT_TIME_STEP),
            ],
            examples: vec![Example {
                name: "Merchant power price",
                description: "Starts at 45, grows 2% per year with 15% volatility",
                parameters: Parameters::new()
                    .with("value", 45.0)
                    .with("drift", 2.0)
                    .with("volatility", 15.0),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::testing::Scripted;
    use crate::rng::{standard_normal, SimulationRng};
    use approx::assert_relative_eq;

    fn gbm() -> Gbm {
        Gbm::from_parameters(
            Parameters::new()
                .with("value", 100.0)
                .with("drift", 5.0)
                .with("volatility", 20.0),
        )
    }

    #[test]
    fn test_path_continuity_with_exact_draws() {
        let dist = gbm();
        let draws = [0.2, 0.7, 0.9, 0.1, 0.45, 0.55];
        let mut source = Scripted::new(&draws);
        let mut state = dist.initialize();

        let mut path = Vec::new();
        for year in 1..=4 {
            dist.update_year(year, &mut state);
            path.push(dist.sample(year, &mut state, &mut source));
        }

        // Replay the same draws by hand
        let mut replay = Scripted::new(&draws);
        assert_eq!(path[0], 100.0);
        for year in 2..=4u32 {
            let z = standard_normal(&mut replay);
            let expected = dist.step(path[year as usize - 2], year, z);
            assert_eq!(path[year as usize - 1].to_bits(), expected.to_bits());
        }
        // Year 1 draws nothing, each later year draws two uniforms
        assert_eq!(source.consumed, 6);
    }

    #[test]
    fn test_year_one_resets_path() {
        let dist = gbm();
        let mut rng = SimulationRng::new(77);
        let mut state = dist.initialize();

        for year in 1..=5 {
            dist.update_year(year, &mut state);
            dist.sample(year, &mut state, &mut rng);
        }
        assert_ne!(state.last_value, Some(100.0));

        dist.update_year(1, &mut state);
        assert_eq!(state.last_value, Some(100.0));
        assert_eq!(dist.sample(1, &mut state, &mut rng), 100.0);
    }

    #[test]
    fn test_mean_path_converges() {
        let dist = gbm();
        let mut rng = SimulationRng::new(4);
        let n = 20_000;
        let mut sum_year_3 = 0.0;
        for _ in 0..n {
            let mut state = dist.initialize();
            for year in 1..=3 {
                dist.update_year(year, &mut state);
                let v = dist.sample(year, &mut state, &mut rng);
                if year == 3 {
                    sum_year_3 += v;
                }
            }
        }
        let expected = dist.analytic(Statistic::Mean, 3).flatten().unwrap();
        assert_relative_eq!(expected, 100.0 * (0.1f64).exp(), epsilon = 1e-9);
        assert_relative_eq!(sum_year_3 / n as f64, expected, max_relative = 0.02);
    }

    #[test]
    fn test_fit_from_constant_growth() {
        let points: Vec<DataPoint> = (1..=6)
            .map(|year| DataPoint::new(year, 50.0 * (0.03 * (year - 1) as f64).exp()))
            .collect();
        let fitted = Gbm::fit_curve(&points).unwrap();
        assert_eq!(fitted.scalar("value"), Some(50.0));
        assert_relative_eq!(fitted.scalar("drift").unwrap(), 3.0, epsilon = 1e-6);
        assert_eq!(fitted.scalar("volatility"), Some(MIN_FITTED_VOLATILITY));
        assert!(Gbm::validate(&fitted).is_valid);
    }

    #[test]
    fn test_fit_needs_two_points() {
        assert_eq!(
            Gbm::fit_curve(&[DataPoint::new(1, 10.0)]),
            Err(FitError::InsufficientData { distribution: "gbm", required: 2, found: 1 })
        );
    }
}
