//! One-pass running moments and per-year statistics series

use crate::distributions::{Distribution, Statistic};
use serde::{Deserialize, Serialize};

/// Sufficient statistics for one year of one distribution
///
/// Updated one value at a time with Welford's recurrence, extended to third
/// and fourth central moments (Terriberry's form), so no raw samples are
/// needed to derive mean, variance, skewness and excess kurtosis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunningStats {
    pub count: u64,
    pub sum: f64,
    pub mean: f64,
    pub m2: f64,
    pub m3: f64,
    pub m4: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for RunningStats {
    fn default() -> Self {
        Self::new()
    }
}

impl RunningStats {
    pub fn new() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            mean: 0.0,
            m2: 0.0,
            m3: 0.0,
            m4: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    pub fn push(&mut self, value: f64) {
        let n1 = self.count as f64;
        self.count += 1;
        let n = self.count as f64;

        let delta = value - self.mean;
        let delta_n = delta / n;
        let delta_n2 = delta_n * delta_n;
        // delta * (value - new_mean)
        let term1 = delta * delta_n * n1;

        self.mean += delta_n;
        self.m4 += term1 * delta_n2 * (n * n - 3.0 * n + 3.0) + 6.0 * delta_n2 * self.m2
            - 4.0 * delta_n * self.m3;
        self.m3 += term1 * delta_n * (n - 2.0) - 3.0 * delta_n * self.m2;
        self.m2 += term1;

        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn mean(&self) -> Option<f64> {
        (!self.is_empty()).then_some(self.mean)
    }

    /// Population variance `m2 / n`
    pub fn variance(&self) -> Option<f64> {
        (!self.is_empty()).then(|| self.m2 / self.count as f64)
    }

    pub fn std_dev(&self) -> Option<f64> {
        self.variance().map(f64::sqrt)
    }

    pub fn min(&self) -> Option<f64> {
        (!self.is_empty()).then_some(self.min)
    }

    pub fn max(&self) -> Option<f64> {
        (!self.is_empty()).then_some(self.max)
    }

    /// `(m3/n) / sd³`, undefined when the year has no spread
    pub fn skewness(&self) -> Option<f64> {
        let sd = self.spread()?;
        Some((self.m3 / self.count as f64) / sd.powi(3))
    }

    /// Excess kurtosis `(m4/n) / sd⁴ - 3`, undefined when the year has no spread
    pub fn kurtosis(&self) -> Option<f64> {
        let sd = self.spread()?;
        Some((self.m4 / self.count as f64) / sd.powi(4) - 3.0)
    }

    pub fn statistic(&self, statistic: Statistic) -> Option<f64> {
        match statistic {
            Statistic::Mean => self.mean(),
            Statistic::StdDev => self.std_dev(),
            Statistic::Min => self.min(),
            Statistic::Max => self.max(),
            Statistic::Skewness => self.skewness(),
            Statistic::Kurtosis => self.kurtosis(),
        }
    }

    fn spread(&self) -> Option<f64> {
        self.std_dev().filter(|sd| *sd > 0.0)
    }
}

/// Value for one year, `null` when undefined
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub year: u32,
    pub value: Option<f64>,
}

/// The six per-year summary series of one distribution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsSeries {
    pub mean: Vec<SeriesPoint>,
    pub std_dev: Vec<SeriesPoint>,
    pub min: Vec<SeriesPoint>,
    pub max: Vec<SeriesPoint>,
    pub skewness: Vec<SeriesPoint>,
    pub kurtosis: Vec<SeriesPoint>,
}

impl StatisticsSeries {
    /// Build the series from per-year moments (index 0 = year 1)
    ///
    /// An analytic formula supplied by the distribution replaces the numeric
    /// value for that statistic as-is. Years without samples are all `null`.
    pub fn from_moments(moments: &[RunningStats], distribution: &dyn Distribution) -> Self {
        let mut series = Self::default();

        for (index, stats) in moments.iter().enumerate() {
            let year = index as u32 + 1;
            for statistic in Statistic::ALL {
                let value = if stats.is_empty() {
                    None
                } else {
                    match distribution.analytic(statistic, year) {
                        Some(analytic) => analytic,
                        None => stats.statistic(statistic),
                    }
                };
                series.series_mut(statistic).push(SeriesPoint { year, value });
            }
        }

        series
    }

    pub fn series(&self, statistic: Statistic) -> &[SeriesPoint] {
        match statistic {
            Statistic::Mean => &self.mean,
            Statistic::StdDev => &self.std_dev,
            Statistic::Min => &self.min,
            Statistic::Max => &self.max,
            Statistic::Skewness => &self.skewness,
            Statistic::Kurtosis => &self.kurtosis,
        }
    }

    fn series_mut(&mut self, statistic: Statistic) -> &mut Vec<SeriesPoint> {
        match statistic {
            Statistic::Mean => &mut self.mean,
            Statistic::StdDev => &mut self.std_dev,
            Statistic::Min => &mut self.min,
            Statistic::Max => &mut self.max,
            Statistic::Skewness => &mut self.skewness,
            Statistic::Kurtosis => &mut self.kurtosis,
        }
    }
}
