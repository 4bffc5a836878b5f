//! Request envelope: distribution entries and shared simulation settings

use crate::distributions::{DataPoint, DistributionKind, Parameters};
use serde::{Deserialize, Serialize};
use std::fmt;

fn default_iterations() -> usize { 1000 }
fn default_years() -> u32 { 10 }
fn default_percentiles() -> Vec<PercentileSpec> {
    vec![
        PercentileSpec::new(10.0, "P10"),
        PercentileSpec::new(25.0, "P25"),
        PercentileSpec::new(50.0, "P50 (median)"),
        PercentileSpec::new(75.0, "P75"),
        PercentileSpec::new(90.0, "P90"),
    ]
}

/// Request seed, given as any JSON number or a string
///
/// The number is kept as written (integer, negative, fractional or beyond
/// `i64`) so its text form, and with it every derived seed, is stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Seed {
    Number(serde_json::Number),
    Text(String),
}

impl Default for Seed {
    fn default() -> Self {
        Seed::Number(0.into())
    }
}

impl From<u64> for Seed {
    fn from(value: u64) -> Self {
        Seed::Number(value.into())
    }
}

impl From<&str> for Seed {
    fn from(value: &str) -> Self {
        Seed::Text(value.to_string())
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seed::Number(n) => write!(f, "{}", n),
            Seed::Text(s) => f.write_str(s),
        }
    }
}

/// A requested percentile on the 0-100 scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentileSpec {
    pub value: f64,

    #[serde(default)]
    pub description: String,

    /// Report `100 - value` instead, for outputs where lower is better
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub descending: bool,
}

impl PercentileSpec {
    pub fn new(value: f64, description: &str) -> Self {
        Self {
            value,
            description: description.to_string(),
            descending: false,
        }
    }

    pub fn descending(mut self) -> Self {
        self.descending = true;
        self
    }

    /// Percentile actually read from the sorted sample
    pub fn effective_value(&self) -> f64 {
        if self.descending {
            100.0 - self.value
        } else {
            self.value
        }
    }

    /// Series label, e.g. `P10`
    pub fn label(&self) -> String {
        format!("P{}", self.value)
    }
}

/// Settings shared by every distribution in a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSettings {
    #[serde(default = "default_iterations")]
    pub iterations: usize,

    #[serde(default)]
    pub seed: Seed,

    #[serde(default = "default_years")]
    pub years: u32,

    #[serde(default = "default_percentiles")]
    pub percentiles: Vec<PercentileSpec>,

    /// Observed points; when present, parameters are fitted to them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fit_to_data: Option<Vec<DataPoint>>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            seed: Seed::default(),
            years: default_years(),
            percentiles: default_percentiles(),
            fit_to_data: None,
        }
    }
}

impl SimulationSettings {
    /// Constraint violations, empty when the settings are usable
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.iterations == 0 {
            errors.push("iterations must be greater than 0".to_string());
        }
        if self.years == 0 {
            errors.push("years must be greater than 0".to_string());
        }
        if self.percentiles.is_empty() {
            errors.push("at least one percentile is required".to_string());
        }
        for p in &self.percentiles {
            if !(0.0..=100.0).contains(&p.value) {
                errors.push(format!("percentile {} must be between 0 and 100", p.value));
            }
        }
        errors
    }

    /// Settings with a distribution entry's overrides applied
    pub fn merged(&self, overrides: Option<&SettingsOverride>) -> Self {
        let mut settings = self.clone();
        if let Some(o) = overrides {
            if let Some(iterations) = o.iterations {
                settings.iterations = iterations;
            }
            if let Some(years) = o.years {
                settings.years = years;
            }
            if let Some(ref percentiles) = o.percentiles {
                settings.percentiles = percentiles.clone();
            }
            if let Some(ref points) = o.fit_to_data {
                settings.fit_to_data = Some(points.clone());
            }
        }
        settings
    }
}

/// Per-distribution replacements for the shared settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentiles: Option<Vec<PercentileSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fit_to_data: Option<Vec<DataPoint>>,
}

/// One distribution entry of a request
///
/// `type` and `parameters` are optional at the serde level so a malformed
/// entry is reported against that entry instead of rejecting the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub distribution_type: Option<String>,

    /// Informational only; series parameters are detected from their shape
    #[serde(default)]
    pub time_series_mode: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Parameters>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulation_settings: Option<SettingsOverride>,
}

impl DistributionConfig {
    pub fn new(kind: DistributionKind, parameters: Parameters) -> Self {
        let time_series_mode = parameters.iter().any(|(_, p)| p.is_time_series());
        Self {
            distribution_type: Some(kind.name().to_string()),
            time_series_mode,
            parameters: Some(parameters),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_settings(mut self, overrides: SettingsOverride) -> Self {
        self.simulation_settings = Some(overrides);
        self
    }
}

/// Validated simulation request handed to the engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRequest {
    pub distributions: Vec<DistributionConfig>,

    #[serde(default)]
    pub simulation_settings: SimulationSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_request_with_defaults() {
        let json = r#"{
            "distributions": [
                {"type": "normal", "parameters": {"mean": 100, "stdDev": 10}},
                {"id": "price", "type": "gbm", "timeSeriesMode": true,
                 "parameters": {"value": 45, "drift": [{"year": 1, "value": 2}], "volatility": 15},
                 "simulationSettings": {"years": 3}}
            ],
            "simulationSettings": {"iterations": 500, "seed": "abc", "years": 5,
                                   "percentiles": [{"value": 90, "description": "P90", "descending": true}]}
        }"#;
        let request: SimulationRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.distributions.len(), 2);
        assert_eq!(request.distributions[0].id, None);
        assert_eq!(request.distributions[0].distribution_type.as_deref(), Some("normal"));
        assert_eq!(request.simulation_settings.seed, Seed::Text("abc".to_string()));
        assert!(request.simulation_settings.percentiles[0].descending);
        assert_eq!(request.simulation_settings.percentiles[0].effective_value(), 10.0);

        let merged = request
            .simulation_settings
            .merged(request.distributions[1].simulation_settings.as_ref());
        assert_eq!(merged.years, 3);
        assert_eq!(merged.iterations, 500);
    }

    #[test]
    fn test_defaults_when_settings_absent() {
        let request: SimulationRequest =
            serde_json::from_str(r#"{"distributions": []}"#).unwrap();
        assert_eq!(request.simulation_settings, SimulationSettings::default());
        assert!(request.simulation_settings.validate().is_empty());
    }

    #[test]
    fn test_numeric_seed_text_form() {
        let settings: SimulationSettings = serde_json::from_str(r#"{"seed": 42}"#).unwrap();
        assert_eq!(settings.seed.to_string(), "42");
        assert_eq!(settings.seed, Seed::from(42));
        assert_eq!(Seed::default().to_string(), "0");
    }

    #[test]
    fn test_any_json_number_is_a_seed() {
        for (json, text) in [
            ("12345.5", "12345.5"),
            ("1e3", "1000.0"),
            ("-7", "-7"),
            ("18446744073709551615", "18446744073709551615"),
        ] {
            let body = format!(r#"{{"distributions": [], "simulationSettings": {{"seed": {}}}}}"#, json);
            let request: SimulationRequest = serde_json::from_str(&body).unwrap();
            assert!(matches!(request.simulation_settings.seed, Seed::Number(_)), "{}", json);
            assert_eq!(request.simulation_settings.seed.to_string(), text);
        }

        // Text and numeric forms stay distinct variants
        let settings: SimulationSettings = serde_json::from_str(r#"{"seed": "42"}"#).unwrap();
        assert_eq!(settings.seed, Seed::from("42"));
    }

    #[test]
    fn test_settings_validation() {
        let settings = SimulationSettings {
            iterations: 0,
            years: 0,
            percentiles: vec![PercentileSpec::new(120.0, "bad")],
            ..Default::default()
        };
        let errors = settings.validate();
        assert_eq!(errors.len(), 3);

        let empty = SimulationSettings {
            percentiles: Vec::new(),
            ..Default::default()
        };
        assert_eq!(empty.validate(), vec!["at least one percentile is required".to_string()]);
    }

    #[test]
    fn test_percentile_labels() {
        assert_eq!(PercentileSpec::new(10.0, "").label(), "P10");
        assert_eq!(PercentileSpec::new(2.5, "").label(), "P2.5");
    }
}
