//! Loaders for simulation requests (JSON) and observed data (CSV)

use crate::distributions::DataPoint;
use crate::simulation::SimulationRequest;
use csv::Reader;
use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Load `(year, value)` points from a CSV file with a `year,value` header
pub fn load_points<P: AsRef<Path>>(path: P) -> Result<Vec<DataPoint>, csv::Error> {
    let file = File::open(path)?;
    load_points_from_reader(file)
}

/// Load points from any reader (e.g., stdin, string buffer)
pub fn load_points_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<DataPoint>, csv::Error> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut points = Vec::new();

    for result in csv_reader.deserialize() {
        let point: DataPoint = result?;
        points.push(point);
    }

    Ok(points)
}

/// Load a simulation request from a JSON file
pub fn load_request<P: AsRef<Path>>(path: P) -> Result<SimulationRequest, Box<dyn Error + Send + Sync>> {
    let file = File::open(path)?;
    let request = serde_json::from_reader(BufReader::new(file))?;
    Ok(request)
}
