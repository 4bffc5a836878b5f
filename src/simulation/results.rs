//! Output structures returned to the caller

use super::settings::{DistributionConfig, PercentileSpec};
use super::stats::{SeriesPoint, StatisticsSeries};
use serde::{Deserialize, Serialize};

/// One requested percentile traced across the simulated years
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentileSeries {
    /// Label such as `P50`
    pub name: String,
    pub percentile: PercentileSpec,
    pub data: Vec<SeriesPoint>,
}

/// Outcome for one distribution entry of the request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationInfo {
    /// Request entry, with its resolved id and any fitted parameters
    pub distribution: DistributionConfig,
    pub iterations: usize,
    /// Seed the worker's generator was created from
    pub seed: u64,
    pub years: u32,
    /// Wall time in milliseconds
    pub time_elapsed: f64,
    pub results: Vec<PercentileSeries>,
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<StatisticsSeries>,
}

impl SimulationInfo {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Id assigned to the distribution entry
    pub fn id(&self) -> &str {
        self.distribution.id.as_deref().unwrap_or_default()
    }

    /// Percentile series by label, e.g. `"P50"`
    pub fn series(&self, name: &str) -> Option<&PercentileSeries> {
        self.results.iter().find(|s| s.name == name)
    }
}

/// Response for a whole simulation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResponse {
    /// `false` if any distribution failed
    pub success: bool,
    pub simulation_info: Vec<SimulationInfo>,
}

impl SimulationResponse {
    pub fn new(simulation_info: Vec<SimulationInfo>) -> Self {
        Self {
            success: simulation_info.iter().all(SimulationInfo::is_success),
            simulation_info,
        }
    }

    pub fn get(&self, id: &str) -> Option<&SimulationInfo> {
        self.simulation_info.iter().find(|info| info.id() == id)
    }
}
