//! Distribution parameters, validation results and shared fitting helpers

use crate::error::FitError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Observed or configured value for a given year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub year: u32,
    pub value: f64,
}

impl DataPoint {
    pub fn new(year: u32, value: f64) -> Self {
        Self { year, value }
    }
}

/// A distribution parameter: one constant or a sparse per-year series
///
/// Series lookup is by exact year; there is no interpolation between points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Parameter {
    Scalar(f64),
    TimeSeries(Vec<DataPoint>),
}

impl Parameter {
    /// Value in effect for `year`, `None` when a series has no point for it
    pub fn at(&self, year: u32) -> Option<f64> {
        match self {
            Parameter::Scalar(value) => Some(*value),
            Parameter::TimeSeries(points) => points
                .iter()
                .find(|point| point.year == year)
                .map(|point| point.value),
        }
    }

    pub fn is_time_series(&self) -> bool {
        matches!(self, Parameter::TimeSeries(_))
    }

    /// Every value the parameter can take, paired with its year (scalars have none)
    fn points(&self) -> Vec<(Option<u32>, f64)> {
        match self {
            Parameter::Scalar(value) => vec![(None, *value)],
            Parameter::TimeSeries(points) => {
                points.iter().map(|p| (Some(p.year), p.value)).collect()
            }
        }
    }
}

impl From<f64> for Parameter {
    fn from(value: f64) -> Self {
        Parameter::Scalar(value)
    }
}

impl From<Vec<DataPoint>> for Parameter {
    fn from(points: Vec<DataPoint>) -> Self {
        Parameter::TimeSeries(points)
    }
}

/// Named parameters for one distribution entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameters(BTreeMap<String, Parameter>);

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: &str, value: impl Into<Parameter>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<Parameter>) {
        self.0.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Parameter)> {
        self.0.iter()
    }

    /// Value for `year`, falling back to `default` when absent or unmatched
    pub fn value(&self, name: &str, year: u32, default: f64) -> f64 {
        self.get(name)
            .and_then(|parameter| parameter.at(year))
            .unwrap_or(default)
    }

    /// Scalar value, or `None` if missing or given as a series
    pub fn scalar(&self, name: &str) -> Option<f64> {
        match self.get(name) {
            Some(Parameter::Scalar(value)) => Some(*value),
            _ => None,
        }
    }

    /// Years named by any of the given series parameters, or `[1]` if all are scalar
    pub(crate) fn years_of(&self, names: &[&str]) -> Vec<u32> {
        let years: BTreeSet<u32> = names
            .iter()
            .filter_map(|name| match self.get(name) {
                Some(Parameter::TimeSeries(points)) => Some(points.iter().map(|p| p.year)),
                _ => None,
            })
            .flatten()
            .collect();

        if years.is_empty() {
            vec![1]
        } else {
            years.into_iter().collect()
        }
    }
}

/// Outcome of parameter validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl Validation {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// Collects constraint violations for one parameter set
pub(crate) struct Checks<'a> {
    parameters: &'a Parameters,
    errors: Vec<String>,
}

impl<'a> Checks<'a> {
    pub fn new(parameters: &'a Parameters) -> Self {
        Self {
            parameters,
            errors: Vec::new(),
        }
    }

    /// Parameter must be present with finite values and unique series years
    pub fn required(&mut self, name: &str) -> bool {
        match self.parameters.get(name) {
            None => {
                self.errors.push(format!("{} is required", name));
                false
            }
            Some(parameter) => self.well_formed(name, parameter),
        }
    }

    /// Optional parameter: checked only when present
    pub fn optional(&mut self, name: &str) -> bool {
        match self.parameters.get(name) {
            None => false,
            Some(parameter) => self.well_formed(name, parameter),
        }
    }

    /// Every value of a present parameter must be strictly positive
    pub fn positive(&mut self, name: &str) {
        self.pointwise(name, "must be positive", |value| value > 0.0);
    }

    pub fn non_negative(&mut self, name: &str) {
        self.pointwise(name, "must not be negative", |value| value >= 0.0);
    }

    pub fn at_least(&mut self, name: &str, floor: f64) {
        let message = format!("must be at least {}", floor);
        self.pointwise(name, &message, |value| value >= floor);
    }

    pub fn push(&mut self, message: String) {
        self.errors.push(message);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn finish(self) -> Validation {
        Validation::from_errors(self.errors)
    }

    fn well_formed(&mut self, name: &str, parameter: &Parameter) -> bool {
        let before = self.errors.len();

        if let Parameter::TimeSeries(points) = parameter {
            if points.is_empty() {
                self.errors
                    .push(format!("{} time series must contain at least one point", name));
            }
            let mut seen = BTreeSet::new();
            for point in points {
                if !seen.insert(point.year) {
                    self.errors
                        .push(format!("{} has duplicate year {} in time series", name, point.year));
                }
            }
        }

        for (year, value) in parameter.points() {
            if !value.is_finite() {
                self.errors
                    .push(format!("{} must be a finite number{}", name, year_suffix(year)));
            }
        }

        self.errors.len() == before
    }

    fn pointwise(&mut self, name: &str, message: &str, accept: impl Fn(f64) -> bool) {
        if let Some(parameter) = self.parameters.get(name) {
            for (year, value) in parameter.points() {
                if value.is_finite() && !accept(value) {
                    self.errors.push(format!(
                        "{} {}{}, got {}",
                        name,
                        message,
                        year_suffix(year),
                        value
                    ));
                }
            }
        }
    }
}

fn year_suffix(year: Option<u32>) -> String {
    match year {
        Some(year) => format!(" (year {})", year),
        None => String::new(),
    }
}

/// Finite values of the supplied points
pub(crate) fn finite_values(points: &[DataPoint]) -> Result<Vec<f64>, FitError> {
    if points.is_empty() {
        return Err(FitError::NoData);
    }
    let values: Vec<f64> = points
        .iter()
        .map(|p| p.value)
        .filter(|v| v.is_finite())
        .collect();
    if values.is_empty() {
        return Err(FitError::NoData);
    }
    Ok(values)
}

/// Strictly positive values, for variants whose support is positive
pub(crate) fn positive_values(
    points: &[DataPoint],
    distribution: &'static str,
) -> Result<Vec<f64>, FitError> {
    let values: Vec<f64> = finite_values(points)?
        .into_iter()
        .filter(|v| *v > 0.0)
        .collect();
    if values.is_empty() {
        return Err(FitError::NoPositiveValues { distribution });
    }
    Ok(values)
}

/// Mean and sample variance (n - 1 denominator, zero for a single value)
pub(crate) fn mean_variance(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, 0.0);
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, variance)
}
