//! Per-distribution simulation worker
//!
//! The lifecycle is encoded in the types: a [`SimulationWorker`] becomes an
//! [`InitializedWorker`] once its distribution is resolved and validated, and
//! is consumed by [`InitializedWorker::process`] to yield a [`ProcessedRun`].
//! Reprocessing requires building a new worker.

use super::engine::CancellationToken;
use super::results::PercentileSeries;
use super::settings::{DistributionConfig, SimulationSettings};
use super::stats::{RunningStats, SeriesPoint, StatisticsSeries};
use crate::distributions::{Distribution, DistributionKind, Parameters};
use crate::error::SimulationError;
use crate::percentile::percentiles;
use crate::rng::SimulationRng;
use log::debug;

/// Worker before its distribution has been resolved
#[derive(Debug, Clone)]
pub struct SimulationWorker {
    id: String,
    config: DistributionConfig,
    settings: SimulationSettings,
}

/// Worker with a validated distribution and a seeded generator
#[derive(Debug)]
pub struct InitializedWorker {
    id: String,
    settings: SimulationSettings,
    distribution: Box<dyn Distribution>,
    rng: SimulationRng,
}

/// Everything a completed run produced
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedRun {
    pub results: Vec<PercentileSeries>,
    pub statistics: StatisticsSeries,
    /// Parameters actually sampled with (fitted ones when data was supplied)
    pub parameters: Parameters,
}

impl SimulationWorker {
    /// `settings` should already carry the entry's overrides
    pub fn new(id: &str, config: DistributionConfig, settings: SimulationSettings) -> Self {
        Self {
            id: id.to_string(),
            config,
            settings,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Resolve, fit and validate the distribution, then seed the generator
    pub fn initialize(self, seed: u64) -> Result<InitializedWorker, SimulationError> {
        let id = self.id;

        let errors = self.settings.validate();
        if !errors.is_empty() {
            return Err(SimulationError::InvalidSettings { id, errors });
        }

        let name = match self.config.distribution_type.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => {
                return Err(SimulationError::Configuration {
                    id,
                    message: "distribution type is missing".to_string(),
                })
            }
        };
        let kind = match DistributionKind::from_name(name) {
            Some(kind) => kind,
            None => {
                return Err(SimulationError::UnknownDistribution {
                    name: name.to_string(),
                    id,
                })
            }
        };

        let parameters = match (&self.settings.fit_to_data, self.config.parameters) {
            (Some(points), given) => {
                let fitted = match kind.fit_curve(points) {
                    Ok(fitted) => fitted,
                    Err(source) => return Err(SimulationError::Fit { id, source }),
                };
                debug!("{}: fitted {} parameters to {} points", id, kind, points.len());
                // Fitted values replace given ones of the same name
                let mut merged = given.unwrap_or_default();
                for (name, value) in fitted.iter() {
                    merged.insert(name, value.clone());
                }
                merged
            }
            (None, Some(given)) => given,
            (None, None) => {
                return Err(SimulationError::Configuration {
                    id,
                    message: "parameters are missing".to_string(),
                })
            }
        };

        let validation = kind.validate(&parameters);
        if !validation.is_valid {
            return Err(SimulationError::Validation {
                id,
                errors: validation.errors,
            });
        }

        debug!("{}: initialized {} with seed {}", id, kind, seed);
        Ok(InitializedWorker {
            id,
            settings: self.settings,
            distribution: kind.build(parameters),
            rng: SimulationRng::new(seed),
        })
    }
}

impl InitializedWorker {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn distribution(&self) -> &dyn Distribution {
        self.distribution.as_ref()
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Run every iteration, then derive percentile and statistics series
    ///
    /// Each iteration walks years 1..=years in order on a fresh path state.
    /// A non-finite sample aborts the run before it reaches any accumulator.
    pub fn process(mut self, cancellation: &CancellationToken) -> Result<ProcessedRun, SimulationError> {
        let iterations = self.settings.iterations;
        let years = self.settings.years as usize;

        let mut samples: Vec<Vec<f64>> = (0..years).map(|_| Vec::with_capacity(iterations)).collect();
        let mut moments = vec![RunningStats::new(); years];

        for iteration in 0..iterations {
            if cancellation.is_cancelled() {
                return Err(SimulationError::Cancelled {
                    id: self.id,
                    completed: iteration,
                });
            }

            let mut state = self.distribution.initialize();
            for year in 1..=self.settings.years {
                self.distribution.update_year(year, &mut state);
                let value = self.distribution.sample(year, &mut state, &mut self.rng);
                if !value.is_finite() {
                    return Err(SimulationError::Sampling {
                        id: self.id,
                        iteration,
                        year,
                        value,
                    });
                }

                let index = (year - 1) as usize;
                samples[index].push(value);
                moments[index].push(value);
            }
        }

        let results = self.percentile_series(&samples);
        let statistics = StatisticsSeries::from_moments(&moments, self.distribution.as_ref());
        debug!("{}: processed {} iterations over {} years", self.id, iterations, years);

        Ok(ProcessedRun {
            results,
            statistics,
            parameters: self.distribution.parameters().clone(),
        })
    }

    fn percentile_series(&self, samples: &[Vec<f64>]) -> Vec<PercentileSeries> {
        let requested: Vec<f64> = self
            .settings
            .percentiles
            .iter()
            .map(|p| p.effective_value())
            .collect();

        // One sort per year, shared by every requested percentile
        let by_year: Vec<Vec<Option<f64>>> = samples
            .iter()
            .map(|values| percentiles(values, &requested))
            .collect();

        self.settings
            .percentiles
            .iter()
            .enumerate()
            .map(|(i, spec)| PercentileSeries {
                name: spec.label(),
                percentile: spec.clone(),
                data: by_year
                    .iter()
                    .enumerate()
                    .map(|(index, values)| SeriesPoint {
                        year: index as u32 + 1,
                        value: values[i],
                    })
                    .collect(),
            })
            .collect()
    }
}
