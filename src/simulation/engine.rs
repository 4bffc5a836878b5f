//! Monte Carlo engine: runs one worker per distribution entry
//!
//! Each entry gets its own generator seeded from the request seed and the
//! entry id, so an entry's output does not depend on which other entries are
//! in the request, their order, or whether they run in parallel. A failing
//! entry is reported in its own `errors` and never stops the others.

use super::results::{SimulationInfo, SimulationResponse};
use super::settings::{DistributionConfig, SimulationRequest, SimulationSettings};
use super::worker::SimulationWorker;
use crate::error::SimulationError;
use crate::rng::derive_seed;
use log::{info, warn};
use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Shared flag checked by workers between iterations
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Engine run options
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Run distribution entries on the rayon pool
    pub parallel: bool,
    pub cancellation: CancellationToken,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            cancellation: CancellationToken::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MonteCarloEngine {
    options: EngineOptions,
}

impl MonteCarloEngine {
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Simulate every distribution entry of `request`
    ///
    /// Results come back in request order. Entries without an id are named
    /// `distribution_<n>` by their 1-based position.
    pub fn run(&self, request: &SimulationRequest) -> SimulationResponse {
        let started = Instant::now();
        let settings = &request.simulation_settings;
        let seed = settings.seed.to_string();
        info!(
            "simulating {} distributions (seed {}, {} iterations, {} years)",
            request.distributions.len(),
            seed,
            settings.iterations,
            settings.years
        );

        let ids = assign_ids(&request.distributions);
        let duplicates = duplicate_ids(&ids);
        let entries: Vec<(&DistributionConfig, &String)> =
            request.distributions.iter().zip(ids.iter()).collect();

        let simulate = |(config, id): &(&DistributionConfig, &String)| {
            if duplicates.contains(id.as_str()) {
                let error = SimulationError::Configuration {
                    id: id.to_string(),
                    message: "distribution id is used more than once in the request".to_string(),
                };
                return self.failed(id, config, settings, derive_seed(&seed, id), error, 0.0);
            }
            self.run_distribution(id, config, settings, &seed)
        };

        let simulation_info: Vec<SimulationInfo> = if self.options.parallel {
            entries.par_iter().map(simulate).collect()
        } else {
            entries.iter().map(simulate).collect()
        };

        let response = SimulationResponse::new(simulation_info);
        info!(
            "simulation finished in {:.1} ms, success: {}",
            started.elapsed().as_secs_f64() * 1000.0,
            response.success
        );
        response
    }

    /// Simulate a single entry under the request's shared settings
    pub fn run_distribution(
        &self,
        id: &str,
        config: &DistributionConfig,
        settings: &SimulationSettings,
        request_seed: &str,
    ) -> SimulationInfo {
        let started = Instant::now();
        let settings = settings.merged(config.simulation_settings.as_ref());
        let seed = derive_seed(request_seed, id);

        let outcome = SimulationWorker::new(id, config.clone(), settings.clone())
            .initialize(seed)
            .and_then(|worker| worker.process(&self.options.cancellation));
        let elapsed = started.elapsed().as_secs_f64() * 1000.0;

        match outcome {
            Ok(run) => {
                let mut distribution = config.clone();
                distribution.id = Some(id.to_string());
                distribution.parameters = Some(run.parameters);
                SimulationInfo {
                    distribution,
                    iterations: settings.iterations,
                    seed,
                    years: settings.years,
                    time_elapsed: elapsed,
                    results: run.results,
                    errors: Vec::new(),
                    statistics: Some(run.statistics),
                }
            }
            Err(error) => self.failed(id, config, &settings, seed, error, elapsed),
        }
    }

    fn failed(
        &self,
        id: &str,
        config: &DistributionConfig,
        settings: &SimulationSettings,
        seed: u64,
        error: SimulationError,
        elapsed: f64,
    ) -> SimulationInfo {
        warn!("{}", error);
        let mut distribution = config.clone();
        distribution.id = Some(id.to_string());
        SimulationInfo {
            distribution,
            iterations: settings.iterations,
            seed,
            years: settings.years,
            time_elapsed: elapsed,
            results: Vec::new(),
            errors: vec![error.to_string()],
            statistics: None,
        }
    }
}

fn assign_ids(distributions: &[DistributionConfig]) -> Vec<String> {
    distributions
        .iter()
        .enumerate()
        .map(|(i, config)| match config.id.as_deref() {
            Some(id) if !id.trim().is_empty() => id.to_string(),
            _ => format!("distribution_{}", i + 1),
        })
        .collect()
}

fn duplicate_ids(ids: &[String]) -> HashSet<&str> {
    let mut seen = HashSet::new();
    ids.iter()
        .map(String::as_str)
        .filter(|id| !seen.insert(*id))
        .collect()
}
