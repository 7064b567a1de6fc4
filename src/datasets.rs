//! Scouting-report datasets: labeled examples from JSON, CSV or the built-in fallback.
use crate::error::{ensure_finite, Result as CoreResult};
use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// One labeled training point: two features and a regression target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Example {
    /// Pitch speed (mph)
    #[serde(rename = "pitchSpeed", alias = "x1")]
    pub x1: f64,
    /// Launch angle (degrees)
    #[serde(rename = "launchAngle", alias = "x2")]
    pub x2: f64,
    /// Exit velocity (mph)
    #[serde(rename = "exitVelocity", alias = "y")]
    pub y: f64,
}

impl Example {
    pub fn new(x1: f64, x2: f64, y: f64) -> CoreResult<Self> {
        let example = Self { x1, x2, y };
        example.validate()?;
        Ok(example)
    }

    pub fn validate(&self) -> CoreResult<()> {
        ensure_finite("x1", self.x1)?;
        ensure_finite("x2", self.x2)?;
        ensure_finite("y", self.y)?;
        Ok(())
    }
}

pub type Dataset = Vec<Example>;

/// The five-example report used when no dataset can be loaded.
pub fn fallback_examples() -> Dataset {
    vec![
        Example { x1: 85.0, x2: 20.0, y: 95.0 },
        Example { x1: 90.0, x2: 25.0, y: 102.0 },
        Example { x1: 95.0, x2: 30.0, y: 108.0 },
        Example { x1: 88.0, x2: 22.0, y: 98.0 },
        Example { x1: 92.0, x2: 28.0, y: 105.0 },
    ]
}

fn validated(dataset: Dataset) -> Result<Dataset> {
    for (i, example) in dataset.iter().enumerate() {
        example
            .validate()
            .map_err(|e| anyhow!("example {}: {}", i, e))?;
    }
    Ok(dataset)
}

/// Parse a JSON array of `{pitchSpeed, launchAngle, exitVelocity}` records.
pub fn from_json_str(json: &str) -> Result<Dataset> {
    let dataset: Dataset = serde_json::from_str(json).context("JSON parse error")?;
    validated(dataset)
}

pub fn from_json_reader<R: Read>(reader: R) -> Result<Dataset> {
    let dataset: Dataset = serde_json::from_reader(reader).context("JSON parse error")?;
    validated(dataset)
}

/// Parse CSV with a `pitchSpeed,launchAngle,exitVelocity` header row.
pub fn from_csv_reader<R: Read>(reader: R) -> Result<Dataset> {
    let mut rdr = ReaderBuilder::new().has_headers(true).trim(csv::Trim::All).from_reader(reader);
    let mut dataset = Vec::new();
    for result in rdr.deserialize() {
        let example: Example = result.map_err(|e| anyhow!("CSV parse error: {}", e))?;
        dataset.push(example);
    }
    validated(dataset)
}

/// Load a dataset from disk, choosing the format from the file extension.
pub fn load_dataset<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| anyhow!("Failed to open {}: {}", path.display(), e))?;
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    let dataset = if is_csv {
        from_csv_reader(file)
    } else {
        from_json_reader(file)
    }
    .with_context(|| format!("loading {}", path.display()))?;
    info!(path = %path.display(), examples = dataset.len(), "scouting report loaded");
    Ok(dataset)
}

/// Load a dataset, falling back to [`fallback_examples`] on any failure.
pub fn load_or_fallback<P: AsRef<Path>>(path: P) -> Dataset {
    match load_dataset(&path) {
        Ok(dataset) => dataset,
        Err(err) => {
            warn!(error = %err, "using fallback scouting report");
            fallback_examples()
        }
    }
}
