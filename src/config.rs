//! Session configuration loaded from TOML.
//!
//! Every key is optional; missing keys fall back to the documented defaults.
//!
//! ```toml
//! [unit]
//! bias = 0.0
//! w1 = 1.0
//! w2 = 0.5
//! x1 = 90.0
//! x2 = 25.0
//! activation = "identity"
//!
//! [training]
//! learning_rate = 0.01
//! epochs = 10
//! pacing_ms = 50
//! dataset = "data/sample-data.json"
//! ```
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::activations::Activation;
use crate::trainer::DEFAULT_LEARNING_RATE;
use crate::unit::{DEFAULT_BIAS, DEFAULT_W1, DEFAULT_W2, DEFAULT_X1, DEFAULT_X2};

pub const DEFAULT_EPOCHS: usize = 10;

/// Initial state of the unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UnitConfig {
    pub bias: f64,
    pub w1: f64,
    pub w2: f64,
    pub x1: f64,
    pub x2: f64,
    pub activation: Activation,
}

impl Default for UnitConfig {
    fn default() -> Self {
        Self {
            bias: DEFAULT_BIAS,
            w1: DEFAULT_W1,
            w2: DEFAULT_W2,
            x1: DEFAULT_X1,
            x2: DEFAULT_X2,
            activation: Activation::Identity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainingConfig {
    pub learning_rate: f64,
    /// Epochs per training session requested by the host.
    pub epochs: usize,
    /// Delay between epochs, in milliseconds.
    pub pacing_ms: u64,
    /// Dataset file (JSON or CSV); the host falls back to the built-in report when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<PathBuf>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            learning_rate: DEFAULT_LEARNING_RATE,
            epochs: DEFAULT_EPOCHS,
            pacing_ms: 0,
            dataset: None,
        }
    }
}

impl TrainingConfig {
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub unit: UnitConfig,
    pub training: TrainingConfig,
}

impl SessionConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        contents
            .parse()
            .with_context(|| format!("parsing config {}", path.display()))
    }
}

impl FromStr for SessionConfig {
    type Err = anyhow::Error;

    fn from_str(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).context("invalid config")
    }
}
